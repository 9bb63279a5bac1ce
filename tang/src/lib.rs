#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # tang
//!
//! A configuration builder and type-safe binding algebra for dependency
//! injection.
//!
//! Types are described by declarations on a [`Classpath`]. A
//! [`ConfigurationBuilder`] resolves declared names to nodes of a lazily
//! built [`Namespace`], validates each binding as it is made, and freezes
//! the result into an immutable [`Configuration`]. Configurations merge:
//! later ones override earlier singleton bindings and union set entries.
//!
//! ## Core Types
//!
//! - [`Classpath`] and [`ClasspathLoader`]: declarations and YAML loading
//! - [`Namespace`] and [`Node`]: the materialised class hierarchy
//! - [`ConfigurationBuilder`] and [`Configuration`]: binding and snapshots
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use tang::{ClasspathLoader, ConfigurationBuilder, ConfigurationMerger};
//!
//! let entry = ClasspathLoader::parse_str("inline", r"
//! declarations:
//!   - name: app.Timer
//!     kind: interface
//!   - name: app.SystemTimer
//!     implements: [app.Timer]
//!   - name: app.MockTimer
//!     implements: [app.Timer]
//! ").unwrap();
//!
//! let mut base = ConfigurationBuilder::from_entries([entry]).unwrap();
//! let mut test = base.clone();
//! base.bind_implementation("app.Timer", "app.SystemTimer").unwrap();
//! test.bind_implementation("app.Timer", "app.MockTimer").unwrap();
//!
//! let merged = ConfigurationMerger::merge(&[&base.build(), &test.build()]).unwrap();
//! assert_eq!(merged.bound_implementation("app.Timer"), Some("app.MockTimer"));
//! ```

pub mod builder;
pub mod classpath;
pub mod configuration;
pub mod error;
pub mod format;
pub mod logging;
pub mod namespace;
pub mod reflection;

// Re-export key types at crate root for convenience
pub use builder::{
    BindingStore, BindingValue, ConfigurationBuilder, ConfigurationMerger, ConfigurationValidator,
    SetEntry,
};
pub use classpath::{Classpath, ClasspathEntry, ClasspathEnvironment, ClasspathLoader, Declaration};
pub use configuration::Configuration;
pub use error::{Error, Result};
pub use format::{ConfigurationFormat, DocumentFormat, FormatKind, TextFormat};
pub use logging::{init_logger, LogLevel, Logger};
pub use namespace::{Namespace, Node, NodeId, NodeKind};
pub use reflection::{Reflection, TypeExpr};
