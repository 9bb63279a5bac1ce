//! Configuration merging.
//!
//! Merging replays bindings through the builder rather than copying stores,
//! so every merged binding is revalidated against the merged namespace.

use super::ConfigurationBuilder;
use crate::configuration::Configuration;
use crate::error::Result;

/// Merges configurations in precedence order.
///
/// # Examples
///
/// ```
/// use tang::builder::{ConfigurationBuilder, ConfigurationMerger};
/// use tang::classpath::ClasspathLoader;
///
/// let entry = ClasspathLoader::parse_str("inline", r"
/// declarations:
///   - name: app.Retries
///     implements: ['Name<Integer>']
///     named_parameter: {}
/// ").unwrap();
/// let mut low = ConfigurationBuilder::from_entries([entry]).unwrap();
/// let mut high = low.clone();
/// low.bind_named_parameter("app.Retries", "1").unwrap();
/// high.bind_named_parameter("app.Retries", "3").unwrap();
///
/// let merged = ConfigurationMerger::merge(&[&low.build(), &high.build()]).unwrap();
/// assert_eq!(merged.named_parameter("app.Retries"), Some("3"));
/// ```
pub struct ConfigurationMerger;

impl ConfigurationMerger {
    /// Merge configurations, lowest precedence first.
    ///
    /// Later singletons override earlier ones node by node; set entries are
    /// unioned as multisets.
    ///
    /// # Errors
    ///
    /// Returns `MergeConflict` when the namespaces disagree, or the first
    /// binding that fails revalidation.
    pub fn merge(configurations: &[&Configuration]) -> Result<Configuration> {
        Ok(ConfigurationBuilder::from_configurations(configurations)?.build())
    }

    /// Replays every binding of `configuration` into `builder`, in
    /// enumeration order.
    ///
    /// Stops at the first failure; callers that need atomicity replay into
    /// a staged copy.
    ///
    /// # Errors
    ///
    /// The first failing builder call.
    pub fn replay(builder: &mut ConfigurationBuilder, configuration: &Configuration) -> Result<()> {
        for (key, value) in configuration.entries() {
            builder.apply(key, &value)?;
        }
        log::debug!(
            "replayed {} binding(s) into builder",
            configuration.len()
        );
        Ok(())
    }
}
