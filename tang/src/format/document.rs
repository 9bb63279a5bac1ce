//! Tagged-record documents rendered as YAML or JSON.

use serde::{Deserialize, Serialize};

use super::ConfigurationFormat;
use crate::builder::{BindingValue, ConfigurationBuilder};
use crate::configuration::Configuration;
use crate::error::{Error, Result};

/// One binding in a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingRecord {
    /// Class bound to an implementation.
    Implementation {
        /// Key full name.
        name: String,
        /// Implementation full name.
        value: String,
    },
    /// Class bound to an external constructor.
    Constructor {
        /// Key full name.
        name: String,
        /// Constructor full name.
        value: String,
    },
    /// Scalar named parameter.
    Parameter {
        /// Parameter full name.
        name: String,
        /// Raw value; `null` is rejected on read.
        value: Option<String>,
    },
    /// Value entry of a set parameter.
    SetValue {
        /// Parameter full name.
        name: String,
        /// Raw value; `null` is rejected on read.
        value: Option<String>,
    },
    /// Class entry of a set parameter.
    SetImplementation {
        /// Parameter full name.
        name: String,
        /// Class full name.
        value: String,
    },
}

impl BindingRecord {
    fn from_binding(name: &str, value: BindingValue) -> Self {
        let name = name.to_string();
        match value {
            BindingValue::Implementation(value) => Self::Implementation { name, value },
            BindingValue::Constructor(value) => Self::Constructor { name, value },
            BindingValue::Parameter(value) => Self::Parameter {
                name,
                value: Some(value),
            },
            BindingValue::SetValue(value) => Self::SetValue {
                name,
                value: Some(value),
            },
            BindingValue::SetImplementation(value) => Self::SetImplementation { name, value },
        }
    }

    /// Splits the record into a key and a binding value.
    ///
    /// # Errors
    ///
    /// Returns `NullValue` when a parameter record carries `null`.
    pub fn into_binding(self) -> Result<(String, BindingValue)> {
        let null = |parameter: String| Error::NullValue { parameter };
        Ok(match self {
            Self::Implementation { name, value } => (name, BindingValue::Implementation(value)),
            Self::Constructor { name, value } => (name, BindingValue::Constructor(value)),
            Self::Parameter { name, value } => match value {
                Some(value) => (name, BindingValue::Parameter(value)),
                None => return Err(null(name)),
            },
            Self::SetValue { name, value } => match value {
                Some(value) => (name, BindingValue::SetValue(value)),
                None => return Err(null(name)),
            },
            Self::SetImplementation { name, value } => {
                (name, BindingValue::SetImplementation(value))
            }
        })
    }
}

/// A serialised configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    /// Bindings in enumeration order.
    #[serde(default)]
    pub bindings: Vec<BindingRecord>,
}

impl Document {
    /// Projects `configuration` into records.
    #[must_use]
    pub fn from_configuration(configuration: &Configuration) -> Self {
        Self {
            bindings: configuration
                .entries()
                .into_iter()
                .map(|(name, value)| BindingRecord::from_binding(name, value))
                .collect(),
        }
    }

    /// Replays the records into `builder`; the builder is unchanged on
    /// error.
    ///
    /// # Errors
    ///
    /// `NullValue` for null parameter values, otherwise the first failing
    /// builder call.
    pub fn apply(self, builder: &mut ConfigurationBuilder) -> Result<()> {
        let mut staged = builder.clone();
        for record in self.bindings {
            let (name, value) = record.into_binding()?;
            staged.apply(&name, &value)?;
        }
        *builder = staged;
        Ok(())
    }
}

/// Reads and writes [`Document`]s.
///
/// # Examples
///
/// ```
/// use tang::builder::ConfigurationBuilder;
/// use tang::classpath::ClasspathLoader;
/// use tang::format::{ConfigurationFormat, DocumentFormat};
/// use tang::Error;
///
/// let entry = ClasspathLoader::parse_str("inline", r"
/// declarations:
///   - name: app.Retries
///     implements: ['Name<Integer>']
///     named_parameter: {}
/// ").unwrap();
/// let mut builder = ConfigurationBuilder::from_entries([entry]).unwrap();
///
/// let yaml = "bindings:\n  - kind: parameter\n    name: app.Retries\n    value: '3'\n";
/// DocumentFormat::Yaml.read_into(yaml, &mut builder).unwrap();
/// assert_eq!(builder.build().named_parameter("app.Retries"), Some("3"));
///
/// let json = r#"{"bindings":[{"kind":"parameter","name":"app.Retries","value":null}]}"#;
/// let err = DocumentFormat::Json.read_into(json, &mut builder).unwrap_err();
/// assert!(matches!(err, Error::NullValue { .. }));
/// assert!(!err.is_bind_error());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// YAML via `serde_yaml`.
    Yaml,
    /// Pretty-printed JSON via `serde_json`.
    Json,
}

impl ConfigurationFormat for DocumentFormat {
    fn write(&self, configuration: &Configuration) -> Result<String> {
        let document = Document::from_configuration(configuration);
        Ok(match self {
            Self::Yaml => serde_yaml::to_string(&document)?,
            Self::Json => serde_json::to_string_pretty(&document)?,
        })
    }

    fn read_into(&self, input: &str, builder: &mut ConfigurationBuilder) -> Result<()> {
        let document: Document = match self {
            Self::Yaml => serde_yaml::from_str(input)?,
            Self::Json => serde_json::from_str(input)?,
        };
        log::debug!("read {} record(s)", document.bindings.len());
        document.apply(builder)
    }
}
