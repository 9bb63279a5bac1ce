//! The classpath: the set of declarations a namespace is built from.
//!
//! A [`Classpath`] always contains the built-in [`prelude`]. Further
//! declarations arrive as [`ClasspathEntry`] values, either constructed in
//! code or loaded from YAML files by [`ClasspathLoader`]:
//!
//! ```yaml
//! declarations:
//!   - name: com.example.Timer
//!     kind: interface
//!   - name: com.example.SystemTimer
//!     implements: [com.example.Timer]
//!   - name: com.example.Timeout
//!     implements: ['Name<Integer>']
//!     named_parameter:
//!       default: '10'
//! ```
//!
//! # Examples
//!
//! ```
//! use tang::classpath::{Classpath, ClasspathLoader};
//!
//! let entry = ClasspathLoader::parse_str(
//!     "inline",
//!     "declarations:\n  - name: com.example.Timer\n    kind: interface\n",
//! )
//! .unwrap();
//! let classpath = Classpath::from_entries([entry]).unwrap();
//! assert!(classpath.declaration("com.example.Timer").is_some());
//! assert!(classpath.is_package("com.example"));
//! ```

pub mod declaration;
pub mod environment;
pub mod loader;
pub mod prelude;

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

pub use declaration::{
    ConstructorArg, ConstructorDeclaration, Declaration, DeclarationKind, NamedParameterAttr,
};
pub use environment::ClasspathEnvironment;
pub use loader::ClasspathLoader;

/// A labelled group of declarations, typically one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClasspathEntry {
    /// Where the declarations came from (a path or a label).
    pub origin: String,
    /// The declarations.
    pub declarations: Vec<Declaration>,
}

impl ClasspathEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(origin: impl Into<String>, declarations: Vec<Declaration>) -> Self {
        Self {
            origin: origin.into(),
            declarations,
        }
    }
}

/// An indexed, conflict-free set of declarations.
#[derive(Debug, Clone)]
pub struct Classpath {
    declarations: BTreeMap<String, Declaration>,
    packages: BTreeSet<String>,
    origins: Vec<String>,
}

impl Classpath {
    /// A classpath holding only the prelude.
    #[must_use]
    pub fn new() -> Self {
        let mut classpath = Self {
            declarations: BTreeMap::new(),
            packages: BTreeSet::new(),
            origins: vec!["prelude".to_string()],
        };
        for decl in prelude::declarations() {
            classpath.insert(decl);
        }
        classpath
    }

    /// The prelude plus the given entries.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDeclaration` for malformed declarations and
    /// `MergeConflict` when two entries declare one name differently.
    pub fn from_entries(entries: impl IntoIterator<Item = ClasspathEntry>) -> Result<Self> {
        let mut classpath = Self::new();
        for entry in entries {
            classpath.add_entry(entry)?;
        }
        Ok(classpath)
    }

    /// Adds an entry; the classpath is unchanged if this fails.
    ///
    /// # Errors
    ///
    /// See [`Classpath::from_entries`].
    pub fn add_entry(&mut self, entry: ClasspathEntry) -> Result<()> {
        let mut staged: BTreeMap<&str, &Declaration> = BTreeMap::new();
        for decl in &entry.declarations {
            decl.validate()?;
            let existing = staged
                .get(decl.name.as_str())
                .copied()
                .or_else(|| self.declarations.get(&decl.name));
            if let Some(existing) = existing {
                if existing != decl {
                    return Err(Error::merge_conflict(
                        &decl.name,
                        format!("redeclared differently by {}", entry.origin),
                    ));
                }
            }
            staged.insert(&decl.name, decl);
        }

        log::debug!(
            "adding {} declaration(s) from {}",
            entry.declarations.len(),
            entry.origin
        );
        for decl in entry.declarations {
            self.insert(decl);
        }
        self.origins.push(entry.origin);
        Ok(())
    }

    fn insert(&mut self, decl: Declaration) {
        if let Some(package) = decl.package() {
            let mut end = 0;
            for segment in package.split('.') {
                end += segment.len();
                self.packages.insert(package[..end].to_string());
                end += 1;
            }
        }
        self.declarations.insert(decl.name.clone(), decl);
    }

    /// Combines two classpaths.
    ///
    /// # Errors
    ///
    /// Returns `MergeConflict` when both declare one name differently.
    pub fn union(&self, other: &Self) -> Result<Self> {
        let mut merged = self.clone();
        for (name, decl) in &other.declarations {
            match merged.declarations.get(name) {
                Some(existing) if existing != decl => {
                    return Err(Error::merge_conflict(
                        name,
                        "declared differently by the classpaths being merged",
                    ));
                }
                Some(_) => {}
                None => merged.insert(decl.clone()),
            }
        }
        for origin in &other.origins {
            if !merged.origins.contains(origin) {
                merged.origins.push(origin.clone());
            }
        }
        Ok(merged)
    }

    /// Looks up a declaration by full name.
    #[must_use]
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    /// Returns `true` if some declaration lives in (or below) `name`.
    #[must_use]
    pub fn is_package(&self, name: &str) -> bool {
        self.packages.contains(name)
    }

    /// All declarations, ordered by name.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }

    /// Labels of the entries that contributed declarations.
    #[must_use]
    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    /// Number of declarations, prelude included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Always `false`: the prelude is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl Default for Classpath {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Classpath {
    fn eq(&self, other: &Self) -> bool {
        self.declarations == other.declarations
    }
}

impl Eq for Classpath {}
