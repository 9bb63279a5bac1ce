//! Integration tests for loading classpaths from disk and the environment.
//!
//! Tests that modify `TANG_CLASSPATH` are marked with `#[serial]`;
//! environment variables are process-global.

mod common;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tang::classpath::environment::CLASSPATH_VAR;
use tang::{Classpath, ClasspathEnvironment, ClasspathLoader, ConfigurationBuilder, Error};

use common::{create_temp_dir, fixture_dir, fqn};

/// Helper to create a declaration file.
fn write_file(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let path = dir.join(filename);
    fs::write(&path, content).unwrap();
    path
}

struct EnvGuard(Option<std::ffi::OsString>);

impl EnvGuard {
    fn set(value: impl AsRef<std::ffi::OsStr>) -> Self {
        let old = env::var_os(CLASSPATH_VAR);
        env::set_var(CLASSPATH_VAR, value);
        Self(old)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.0 {
            Some(v) => env::set_var(CLASSPATH_VAR, v),
            None => env::remove_var(CLASSPATH_VAR),
        }
    }
}

#[test]
fn test_fixture_dir_loads_in_order() {
    let entries = ClasspathLoader::load_dir(&fixture_dir()).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].origin.ends_with("10-timers.yaml"));
    assert!(entries[1].origin.ends_with("20-parameters.yaml"));

    let classpath = Classpath::from_entries(entries).unwrap();
    assert!(classpath.declaration(&fqn("Outer$Delay")).is_some());
    assert!(classpath.is_package("com.example"));
}

#[test]
fn test_load_dir_ignores_other_files() {
    let dir = create_temp_dir().unwrap();
    write_file(dir.path(), "a.yml", "declarations:\n  - name: x.A\n");
    write_file(dir.path(), "notes.txt", "not yaml at all: [");
    fs::create_dir(dir.path().join("nested.yaml")).unwrap();

    let entries = ClasspathLoader::load_dir(dir.path()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].declarations[0].name, "x.A");
}

#[test]
fn test_malformed_file_is_yaml_error() {
    let dir = create_temp_dir().unwrap();
    let path = write_file(dir.path(), "bad.yaml", "declarations:\n  - name: x.A\n    colour: red\n");
    assert!(matches!(
        ClasspathLoader::load_file(&path),
        Err(Error::Yaml(_))
    ));
}

#[test]
fn test_missing_path_is_io_error() {
    let dir = create_temp_dir().unwrap();
    assert!(matches!(
        ClasspathLoader::load_path(&dir.path().join("missing")),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_conflicting_files_are_rejected() {
    let dir = create_temp_dir().unwrap();
    write_file(dir.path(), "a.yaml", "declarations:\n  - name: x.A\n");
    write_file(
        dir.path(),
        "b.yaml",
        "declarations:\n  - name: x.A\n    kind: interface\n",
    );
    let entries = ClasspathLoader::load_dir(dir.path()).unwrap();
    assert!(matches!(
        Classpath::from_entries(entries),
        Err(Error::MergeConflict { .. })
    ));
}

#[test]
#[serial]
fn test_environment_classpath_feeds_builder() {
    let dir = create_temp_dir().unwrap();
    let extra = write_file(
        dir.path(),
        "extra.yaml",
        "declarations:\n  - name: org.extra.Flag\n    implements: ['Name<Boolean>']\n    named_parameter: { default: 'false' }\n",
    );
    let joined = env::join_paths([fixture_dir(), extra]).unwrap();
    let _guard = EnvGuard::set(&joined);

    assert_eq!(ClasspathEnvironment::paths().len(), 2);
    let classpath = ClasspathEnvironment::from_env().unwrap();
    let mut b = ConfigurationBuilder::from_classpath(classpath);
    b.bind_named_parameter("org.extra.Flag", "true")
        .unwrap()
        .bind_implementation(&fqn("Timer"), &fqn("MockTimer"))
        .unwrap();
    assert_eq!(b.len(), 2);
}

#[test]
#[serial]
fn test_environment_missing_element_fails() {
    let dir = create_temp_dir().unwrap();
    let _guard = EnvGuard::set(dir.path().join("nowhere.yaml"));
    assert!(matches!(
        ClasspathEnvironment::from_env(),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_bad_default_surfaces_on_lookup() {
    let dir = create_temp_dir().unwrap();
    write_file(
        dir.path(),
        "bad.yaml",
        "declarations:\n  - name: x.Port\n    implements: ['Name<Short>']\n    named_parameter: { default: '70000' }\n",
    );
    let classpath = Classpath::from_entries(ClasspathLoader::load_dir(dir.path()).unwrap()).unwrap();
    let mut b = ConfigurationBuilder::from_classpath(classpath);
    let err = b.bind_named_parameter("x.Port", "80").unwrap_err();
    assert!(matches!(err, Error::InvalidDeclaration { .. }));
    assert!(!err.is_bind_error());
}
