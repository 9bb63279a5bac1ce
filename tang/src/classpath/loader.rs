//! Classpath file discovery and loading.
//!
//! Declaration files are YAML documents with a single `declarations` list.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::declaration::Declaration;
use super::ClasspathEntry;
use crate::error::{Error, Result};

/// On-disk shape of a declaration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClasspathFile {
    /// Declared types.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

/// Loads classpath entries from YAML.
///
/// # Examples
///
/// ```no_run
/// use tang::classpath::{Classpath, ClasspathLoader};
/// use std::path::Path;
///
/// let entries = ClasspathLoader::load_dir(Path::new("declarations")).unwrap();
/// let classpath = Classpath::from_entries(entries).unwrap();
/// ```
pub struct ClasspathLoader;

impl ClasspathLoader {
    /// Parses one YAML document.
    ///
    /// # Errors
    ///
    /// Returns `Error::Yaml` if the document does not match [`ClasspathFile`].
    pub fn parse_str(origin: &str, contents: &str) -> Result<ClasspathEntry> {
        let file: ClasspathFile = serde_yaml::from_str(contents)?;
        Ok(ClasspathEntry::new(origin, file.declarations))
    }

    /// Loads one declaration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(path: &Path) -> Result<ClasspathEntry> {
        let contents = fs::read_to_string(path)?;
        Self::parse_str(&path.display().to_string(), &contents)
    }

    /// Loads every `*.yaml` / `*.yml` file directly inside `dir`, in lexical
    /// order of file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or any matching file cannot be read
    /// or parsed.
    pub fn load_dir(dir: &Path) -> Result<Vec<ClasspathEntry>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == "yaml" || e == "yml");
            if path.is_file() && is_yaml {
                paths.push(path);
            }
        }
        paths.sort();

        log::debug!("loading {} declaration file(s) from {}", paths.len(), dir.display());
        paths.iter().map(|p| Self::load_file(p)).collect()
    }

    /// Loads a file, or every declaration file in a directory.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the path does not exist.
    pub fn load_path(path: &Path) -> Result<Vec<ClasspathEntry>> {
        if path.is_dir() {
            Self::load_dir(path)
        } else if path.is_file() {
            Ok(vec![Self::load_file(path)?])
        } else {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("classpath element not found: {}", path.display()),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TIMER: &str = r"
declarations:
  - name: com.example.Timer
    kind: interface
  - name: com.example.SystemTimer
    implements: [com.example.Timer]
    constructors:
      - injectable: true
        args:
          - type: Integer
            named_parameter: com.example.Timeout
";

    #[test]
    fn test_parse_str() {
        let entry = ClasspathLoader::parse_str("inline", TIMER).unwrap();
        assert_eq!(entry.origin, "inline");
        assert_eq!(entry.declarations.len(), 2);
        let ctor = &entry.declarations[1].constructors[0];
        assert!(ctor.injectable);
        assert_eq!(
            ctor.args[0].named_parameter.as_deref(),
            Some("com.example.Timeout")
        );
    }

    #[test]
    fn test_parse_empty_document() {
        let entry = ClasspathLoader::parse_str("empty", "{}").unwrap();
        assert!(entry.declarations.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_type_expression() {
        let yaml = "declarations:\n  - name: a.B\n    extends: 'Set<'\n";
        assert!(matches!(
            ClasspathLoader::parse_str("bad", yaml),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn test_parse_rejects_deeply_nested_type_expression() {
        let depth = 5_000;
        let yaml = format!(
            "declarations:\n  - name: a.B\n    implements: ['{}Integer{}']\n",
            "Set<".repeat(depth),
            ">".repeat(depth)
        );
        assert!(matches!(
            ClasspathLoader::parse_str("deep", &yaml),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn test_load_dir_orders_and_filters() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("b.yaml"),
            "declarations:\n  - name: x.B\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("a.yml"),
            "declarations:\n  - name: x.A\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let entries = ClasspathLoader::load_dir(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].declarations[0].name, "x.A");
        assert_eq!(entries[1].declarations[0].name, "x.B");
    }

    #[test]
    fn test_load_path_missing() {
        let dir = TempDir::new().unwrap();
        let result = ClasspathLoader::load_path(&dir.path().join("missing.yaml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
