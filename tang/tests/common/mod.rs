//! Common test utilities for integration tests.
//!
//! The fixture classpath mirrors a small service:
//!
//! - `Timer` (interface) with implementations `SystemTimer`, `MockTimer`
//!   and `SlowTimer`, the unrelated class `Stopwatch`, and the external
//!   constructor `TimerFactory`
//! - named parameters `Numbers: Set<Number>`, `Retries: Integer`,
//!   `Timers: Set<Timer>` and the nested `Outer$Delay: Long`

use std::path::PathBuf;
use std::sync::Arc;

use tang::{Classpath, ClasspathLoader, ConfigurationBuilder, Namespace};

/// Package of every fixture declaration.
#[allow(dead_code)]
pub const PKG: &str = "com.example";

/// Full name of a fixture declaration.
#[allow(dead_code)]
pub fn fqn(simple: &str) -> String {
    format!("{PKG}.{simple}")
}

/// Path to the fixture classpath directory.
#[allow(dead_code)]
pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("classpath")
}

/// The fixture classpath.
#[allow(dead_code)]
pub fn classpath() -> Classpath {
    let entries = ClasspathLoader::load_dir(&fixture_dir()).unwrap();
    Classpath::from_entries(entries).unwrap()
}

/// A fresh namespace over the fixture classpath.
#[allow(dead_code)]
pub fn namespace() -> Arc<Namespace> {
    Arc::new(Namespace::from_classpath(classpath()))
}

/// An empty builder over its own fixture namespace.
#[allow(dead_code)]
pub fn builder() -> ConfigurationBuilder {
    ConfigurationBuilder::from_classpath(classpath())
}

/// Creates a temporary directory for testing.
///
/// The directory will be automatically cleaned up when the returned
/// `TempDir` is dropped.
#[allow(dead_code)]
pub fn create_temp_dir() -> std::io::Result<tempfile::TempDir> {
    tempfile::tempdir()
}
