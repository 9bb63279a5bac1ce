//! Error types for the tang library.
//!
//! Every fallible operation in the crate returns [`Result`]. The binding
//! kinds (`NameResolution`, `KindMismatch`, `Assignability`,
//! `SetTypeMismatch`, `GenericsMismatch`, `MergeConflict`, `NotInjectable`)
//! are the recoverable "bind" failures; a builder that returns one of them
//! is left exactly as it was before the call.

use thiserror::Error;

/// Result type alias for operations that may fail with a tang error.
///
/// # Examples
///
/// ```
/// use tang::{Error, Result};
///
/// fn example_operation() -> Result<&'static str> {
///     Ok("com.example.Timer")
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the tang library.
#[derive(Debug, Error)]
pub enum Error {
    /// A type descriptor could not be resolved to a namespace node.
    #[error("cannot resolve '{name}': {reason}")]
    NameResolution {
        /// The descriptor that failed to resolve.
        name: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The declaration exists but can never be injected (anonymous or local).
    #[error("'{name}' is not injectable: {reason}")]
    NotInjectable {
        /// The offending declaration.
        name: String,
        /// Why it cannot be injected.
        reason: String,
    },

    /// An operation expected one node kind and got another.
    #[error("{operation} got '{name}' which resolved to a {found}; expected a {expected}")]
    KindMismatch {
        /// The builder operation that failed.
        operation: &'static str,
        /// Full name of the offending node.
        name: String,
        /// The node kind that was found.
        found: &'static str,
        /// The node kind the operation requires.
        expected: &'static str,
    },

    /// A sub-typing constraint was violated.
    #[error("{operation}: '{actual}' is not assignable to '{expected}'")]
    Assignability {
        /// The builder operation that failed.
        operation: &'static str,
        /// The type that was required.
        expected: String,
        /// The type that was supplied.
        actual: String,
    },

    /// A set-entry operation targeted a parameter that does not take a set.
    #[error("{operation} got named parameter '{parameter}' that takes '{target}'; expected Set<...>")]
    SetTypeMismatch {
        /// The builder operation that failed.
        operation: &'static str,
        /// The named parameter.
        parameter: String,
        /// The parameter's declared target type.
        target: String,
    },

    /// A generic target could not be recovered from a declaration.
    #[error("cannot recover {interface}<...> target of '{declaration}': {reason}")]
    GenericsMismatch {
        /// The one-parameter interface being queried.
        interface: String,
        /// The declaration being introspected.
        declaration: String,
        /// Why recovery failed.
        reason: String,
    },

    /// Merging namespaces or parser sets produced two identities for one name.
    #[error("merge conflict on '{name}': {details}")]
    MergeConflict {
        /// The contested name.
        name: String,
        /// Details about the conflict.
        details: String,
    },

    /// A value was absent where one is required.
    #[error("null value bound to named parameter '{parameter}'")]
    NullValue {
        /// The named parameter.
        parameter: String,
    },

    /// A declaration is malformed (bad type expression, cycle, bad default).
    #[error("invalid declaration '{name}': {reason}")]
    InvalidDeclaration {
        /// The declaration name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A serialised configuration could not be read.
    #[error("configuration format error at line {line}: {reason}")]
    Format {
        /// One-based line number.
        line: usize,
        /// What is wrong with the line.
        reason: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML document could not be parsed or rendered.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON document could not be parsed or rendered.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` for the recoverable binding failures.
    ///
    /// These are the errors a caller is expected to handle; the builder that
    /// produced them is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use tang::Error;
    ///
    /// let err = Error::NameResolution {
    ///     name: "com.example.Missing".into(),
    ///     reason: "not declared".into(),
    /// };
    /// assert!(err.is_bind_error());
    ///
    /// let err = Error::NullValue { parameter: "com.example.Port".into() };
    /// assert!(!err.is_bind_error());
    /// ```
    #[must_use]
    pub fn is_bind_error(&self) -> bool {
        matches!(
            self,
            Self::NameResolution { .. }
                | Self::NotInjectable { .. }
                | Self::KindMismatch { .. }
                | Self::Assignability { .. }
                | Self::SetTypeMismatch { .. }
                | Self::GenericsMismatch { .. }
                | Self::MergeConflict { .. }
        )
    }

    pub(crate) fn name_resolution(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NameResolution {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_declaration(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDeclaration {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn merge_conflict(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::MergeConflict {
            name: name.into(),
            details: details.into(),
        }
    }
}
