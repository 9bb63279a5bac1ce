//! Binding validation.
//!
//! [`BindingValidator`] runs the eager checks behind every builder call:
//! node kind, set-ness of set-entry targets, and assignability of bound
//! classes. [`ConfigurationValidator`] re-runs the same checks over a built
//! configuration without touching it.

use std::sync::Arc;

use super::store::BindingValue;
use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::namespace::{Namespace, NamedParameterNode, Node};

pub(crate) const BIND: &str = "bind";
pub(crate) const BIND_IMPLEMENTATION: &str = "bind_implementation";
pub(crate) const BIND_CONSTRUCTOR: &str = "bind_constructor";
pub(crate) const BIND_NAMED_PARAMETER: &str = "bind_named_parameter";
pub(crate) const BIND_SET_ENTRY: &str = "bind_set_entry";

/// Checks candidate bindings against a namespace.
#[derive(Debug, Clone, Copy)]
pub struct BindingValidator<'a> {
    namespace: &'a Namespace,
}

impl<'a> BindingValidator<'a> {
    /// Creates a validator over `namespace`.
    #[must_use]
    pub const fn new(namespace: &'a Namespace) -> Self {
        Self { namespace }
    }

    /// Resolves `name` and requires a class node.
    ///
    /// # Errors
    ///
    /// Resolution errors, or `KindMismatch` for packages and named
    /// parameters.
    pub fn class(&self, operation: &'static str, name: &str) -> Result<Arc<Node>> {
        let node = self.namespace.get_node(name)?;
        if node.as_class().is_none() {
            return Err(kind_mismatch(operation, &node, "class"));
        }
        Ok(node)
    }

    /// Resolves `name` and requires a named-parameter node.
    ///
    /// # Errors
    ///
    /// Resolution errors, or `KindMismatch` for packages and classes.
    pub fn named_parameter(&self, operation: &'static str, name: &str) -> Result<Arc<Node>> {
        let node = self.namespace.get_node(name)?;
        parameter(operation, &node)?;
        Ok(node)
    }

    /// Resolves `name` and requires a set-valued named parameter.
    ///
    /// # Errors
    ///
    /// As [`Self::named_parameter`], plus `SetTypeMismatch` when the
    /// parameter's target is not a set.
    pub fn set_parameter(&self, operation: &'static str, name: &str) -> Result<Arc<Node>> {
        let node = self.named_parameter(operation, name)?;
        let np = parameter(operation, &node)?;
        if !np.is_set() {
            return Err(Error::SetTypeMismatch {
                operation,
                parameter: node.full_name().to_string(),
                target: np.target().to_string(),
            });
        }
        Ok(node)
    }

    /// Checks `implementation` may be bound to `key`.
    ///
    /// # Errors
    ///
    /// `KindMismatch` unless both are classes, `Assignability` unless
    /// `implementation` is a subtype of `key`.
    pub fn implementation(&self, key: &str, implementation: &str) -> Result<(Arc<Node>, Arc<Node>)> {
        let key = self.class(BIND_IMPLEMENTATION, key)?;
        let implementation = self.class(BIND_IMPLEMENTATION, implementation)?;
        self.require_assignable(BIND_IMPLEMENTATION, key.full_name(), &implementation)?;
        Ok((key, implementation))
    }

    /// Checks `constructor` may be bound as the factory of `key`.
    ///
    /// # Errors
    ///
    /// `KindMismatch` unless both are classes and `constructor` is an
    /// external constructor, `Assignability` unless the produced type is a
    /// subtype of `key`.
    pub fn constructor(&self, key: &str, constructor: &str) -> Result<(Arc<Node>, Arc<Node>)> {
        let key = self.class(BIND_CONSTRUCTOR, key)?;
        let constructor = self.class(BIND_CONSTRUCTOR, constructor)?;
        if !constructor
            .as_class()
            .is_some_and(|c| c.is_external_constructor())
        {
            return Err(kind_mismatch(BIND_CONSTRUCTOR, &constructor, "external constructor"));
        }

        let produced = self.namespace.produced_type(&constructor)?;
        if !self
            .namespace
            .reflection()
            .is_assignable(key.full_name(), produced.raw())
        {
            return Err(Error::Assignability {
                operation: BIND_CONSTRUCTOR,
                expected: key.full_name().to_string(),
                actual: format!("{} (produced by {})", produced, constructor.full_name()),
            });
        }
        Ok((key, constructor))
    }

    /// Checks class `implementation` may be the value of named parameter
    /// `key`; for set-valued parameters it must fit the element type.
    ///
    /// # Errors
    ///
    /// `KindMismatch` for the wrong node kinds, `Assignability` when the
    /// class does not fit.
    pub fn parameter_class(&self, key: &str, implementation: &str) -> Result<(Arc<Node>, Arc<Node>)> {
        let key = self.named_parameter(BIND_NAMED_PARAMETER, key)?;
        let implementation = self.class(BIND_NAMED_PARAMETER, implementation)?;
        let value_type = parameter(BIND_NAMED_PARAMETER, &key)?
            .value_type()
            .raw()
            .to_string();
        self.require_assignable(BIND_NAMED_PARAMETER, &value_type, &implementation)?;
        Ok((key, implementation))
    }

    /// Checks class `implementation` may be added to set parameter `key`.
    ///
    /// # Errors
    ///
    /// As [`Self::set_parameter`], plus `KindMismatch` if `implementation`
    /// is not a class and `Assignability` if it does not fit the element
    /// type.
    pub fn set_implementation(&self, key: &str, implementation: &str) -> Result<(Arc<Node>, Arc<Node>)> {
        let key = self.set_parameter(BIND_SET_ENTRY, key)?;
        let implementation = self.class(BIND_SET_ENTRY, implementation)?;
        let element = parameter(BIND_SET_ENTRY, &key)?
            .value_type()
            .raw()
            .to_string();
        self.require_assignable(BIND_SET_ENTRY, &element, &implementation)?;
        Ok((key, implementation))
    }

    /// Re-checks one stored binding.
    ///
    /// # Errors
    ///
    /// Whatever the builder call that produced `value` would return.
    pub fn check(&self, key: &str, value: &BindingValue) -> Result<()> {
        match value {
            BindingValue::Implementation(class) => self.implementation(key, class).map(drop),
            BindingValue::Constructor(class) => self.constructor(key, class).map(drop),
            BindingValue::Parameter(_) => {
                let node = self.namespace.get_node(key)?;
                if parameter(BIND_NAMED_PARAMETER, &node)?.is_set() {
                    return Err(kind_mismatch(
                        BIND_NAMED_PARAMETER,
                        &node,
                        "scalar named parameter",
                    ));
                }
                Ok(())
            }
            BindingValue::SetValue(_) => self.set_parameter(BIND_SET_ENTRY, key).map(drop),
            BindingValue::SetImplementation(class) => {
                self.set_implementation(key, class).map(drop)
            }
        }
    }

    fn require_assignable(&self, operation: &'static str, expected: &str, actual: &Node) -> Result<()> {
        if self
            .namespace
            .reflection()
            .is_assignable(expected, actual.full_name())
        {
            Ok(())
        } else {
            Err(Error::Assignability {
                operation,
                expected: expected.to_string(),
                actual: actual.full_name().to_string(),
            })
        }
    }
}

fn parameter<'n>(operation: &'static str, node: &'n Node) -> Result<&'n NamedParameterNode> {
    node.as_named_parameter()
        .ok_or_else(|| kind_mismatch(operation, node, "named parameter"))
}

fn kind_mismatch(operation: &'static str, node: &Node, expected: &'static str) -> Error {
    Error::KindMismatch {
        operation,
        name: node.full_name().to_string(),
        found: node.kind().describe(),
        expected,
    }
}

/// Validates built configurations.
///
/// # Examples
///
/// ```
/// use tang::builder::{ConfigurationBuilder, ConfigurationValidator};
///
/// let configuration = ConfigurationBuilder::new().build();
/// ConfigurationValidator::validate(&configuration).unwrap();
/// ```
pub struct ConfigurationValidator;

impl ConfigurationValidator {
    /// Checks every binding of `configuration` against its namespace.
    ///
    /// # Errors
    ///
    /// Returns the first failing check, in enumeration order.
    pub fn validate(configuration: &Configuration) -> Result<()> {
        let validator = BindingValidator::new(configuration.namespace());
        for (key, value) in configuration.entries() {
            validator.check(key, &value)?;
        }
        log::debug!("validated {} binding(s)", configuration.len());
        Ok(())
    }
}
