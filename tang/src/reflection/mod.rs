//! The reflection adapter.
//!
//! Declarations stand in for runtime type information. This module parses
//! type expressions and answers the three questions the builder needs:
//! the erasure of a type, the target `X` of a one-parameter interface
//! `I<X>`, and nominal assignability.

mod adapter;
mod type_expr;

pub use adapter::Reflection;
pub use type_expr::{InvalidTypeExprError, TypeExpr, MAX_NESTING};
