//! Environment-driven classpath discovery.

use std::env;
use std::path::PathBuf;

use super::{Classpath, ClasspathLoader};
use crate::error::Result;

/// Environment variable listing classpath files and directories.
pub const CLASSPATH_VAR: &str = "TANG_CLASSPATH";

/// Reads `TANG_CLASSPATH`.
///
/// # Examples
///
/// ```no_run
/// use tang::classpath::ClasspathEnvironment;
///
/// let classpath = ClasspathEnvironment::from_env().unwrap();
/// println!("{} declarations", classpath.len());
/// ```
pub struct ClasspathEnvironment;

impl ClasspathEnvironment {
    /// The path list in `TANG_CLASSPATH`, empty when unset.
    #[must_use]
    pub fn paths() -> Vec<PathBuf> {
        env::var_os(CLASSPATH_VAR)
            .map(|value| {
                env::split_paths(&value)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Builds a classpath from every element of `TANG_CLASSPATH`.
    ///
    /// An unset variable yields the prelude-only classpath.
    ///
    /// # Errors
    ///
    /// Returns an error if any listed element is missing, unreadable,
    /// malformed, or conflicts with another.
    pub fn from_env() -> Result<Classpath> {
        let mut entries = Vec::new();
        for path in Self::paths() {
            entries.extend(ClasspathLoader::load_path(&path)?);
        }
        Classpath::from_entries(entries)
    }
}
