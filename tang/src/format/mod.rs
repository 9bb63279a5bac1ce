//! Configuration serialisers.
//!
//! Serialisers project a [`Configuration`] to text and read it back by
//! replaying every binding through a [`ConfigurationBuilder`], so a read
//! document is validated exactly like hand-written builder calls. Reading is
//! transactional: on error the builder is unchanged.
//!
//! Two formats are provided:
//!
//! - [`TextFormat`]: one `full-name = value` line per binding.
//! - [`DocumentFormat`]: tagged records rendered as YAML or JSON.

mod document;
mod text;

use std::sync::Arc;

use crate::builder::ConfigurationBuilder;
use crate::configuration::Configuration;
use crate::namespace::Namespace;
use crate::Result;

pub use document::{BindingRecord, Document, DocumentFormat};
pub use text::TextFormat;

/// A way of writing configurations out and reading them back.
pub trait ConfigurationFormat {
    /// Render `configuration`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying encoder fails.
    fn write(&self, configuration: &Configuration) -> Result<String>;

    /// Replay the bindings in `input` into `builder`.
    ///
    /// # Errors
    ///
    /// Returns `Format` (or a decoder error) for malformed input and the
    /// builder's error for bindings that fail validation.
    fn read_into(&self, input: &str, builder: &mut ConfigurationBuilder) -> Result<()>;

    /// Read `input` into a fresh configuration over `namespace`.
    ///
    /// # Errors
    ///
    /// See [`Self::read_into`].
    fn read(&self, input: &str, namespace: Arc<Namespace>) -> Result<Configuration> {
        let mut builder = ConfigurationBuilder::with_namespace(namespace);
        self.read_into(input, &mut builder)?;
        Ok(builder.build())
    }
}

/// Available serialisation formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// `full-name = value` lines.
    Text,
    /// YAML document.
    Yaml,
    /// JSON document.
    Json,
}

impl FormatKind {
    /// Create a serialiser for this format.
    #[must_use]
    pub fn create_format(&self) -> Box<dyn ConfigurationFormat> {
        match self {
            Self::Text => Box::new(TextFormat),
            Self::Yaml => Box::new(DocumentFormat::Yaml),
            Self::Json => Box::new(DocumentFormat::Json),
        }
    }

    /// Guess the format from a file extension.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "conf" | "cfg" | "txt" => Some(Self::Text),
            _ => None,
        }
    }
}
