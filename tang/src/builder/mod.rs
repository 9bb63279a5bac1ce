//! The configuration builder.
//!
//! A [`ConfigurationBuilder`] accumulates bindings over a shared
//! [`Namespace`]. Every call resolves its arguments to nodes, validates the
//! candidate binding, and only then touches the [`BindingStore`], so a
//! failing call leaves the builder exactly as it was.
//!
//! Singleton bindings (implementations, constructors, scalar parameters) are
//! last-writer-wins; set entries accumulate as a multiset.
//!
//! # Examples
//!
//! ```
//! use tang::builder::{BindingValue, ConfigurationBuilder};
//! use tang::classpath::ClasspathLoader;
//!
//! let entry = ClasspathLoader::parse_str("inline", r"
//! declarations:
//!   - name: app.Timer
//!     kind: interface
//!   - name: app.SystemTimer
//!     implements: [app.Timer]
//!   - name: app.Timeout
//!     implements: ['Name<Integer>']
//!     named_parameter: { default: '10' }
//!   - name: app.Ports
//!     implements: ['Name<Set<Integer>>']
//!     named_parameter: {}
//! ").unwrap();
//!
//! let mut builder = ConfigurationBuilder::from_entries([entry]).unwrap();
//! builder
//!     .bind_implementation("app.Timer", "app.SystemTimer").unwrap()
//!     .bind_named_parameter("app.Timeout", "30").unwrap()
//!     .bind_set_entry("app.Ports", "80").unwrap()
//!     .bind_set_entry("app.Ports", "443").unwrap();
//!
//! let configuration = builder.build();
//! assert_eq!(configuration.bound_implementation("app.Timer"), Some("app.SystemTimer"));
//! assert_eq!(configuration.named_parameter("app.Timeout"), Some("30"));
//! assert_eq!(configuration.len(), 4);
//!
//! // Failures leave the builder untouched.
//! assert!(builder.bind_set_entry("app.Timeout", "1").is_err());
//! assert_eq!(builder.build(), configuration);
//! ```

pub mod merger;
pub mod store;
pub mod validator;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

use std::sync::Arc;

use crate::classpath::{Classpath, ClasspathEntry};
use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::namespace::{Namespace, NodeKind};

pub use merger::ConfigurationMerger;
pub use store::{BindingStore, BindingValue, SetEntry};
pub use validator::{BindingValidator, ConfigurationValidator};

use validator::{BIND, BIND_NAMED_PARAMETER, BIND_SET_ENTRY};

/// Accumulates validated bindings and freezes them into configurations.
///
/// Builders are single-writer; cloning one yields an independent builder
/// sharing the same namespace.
#[derive(Debug, Clone)]
pub struct ConfigurationBuilder {
    namespace: Arc<Namespace>,
    store: BindingStore,
}

impl ConfigurationBuilder {
    /// An empty builder over the prelude.
    #[must_use]
    pub fn new() -> Self {
        Self::with_namespace(Arc::new(Namespace::default()))
    }

    /// An empty builder over an existing namespace.
    #[must_use]
    pub fn with_namespace(namespace: Arc<Namespace>) -> Self {
        Self {
            namespace,
            store: BindingStore::new(),
        }
    }

    /// An empty builder over `classpath` with the built-in parsers.
    #[must_use]
    pub fn from_classpath(classpath: Classpath) -> Self {
        Self::with_namespace(Arc::new(Namespace::from_classpath(classpath)))
    }

    /// An empty builder over the prelude plus `entries`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDeclaration` or `MergeConflict` from classpath
    /// construction.
    pub fn from_entries(entries: impl IntoIterator<Item = ClasspathEntry>) -> Result<Self> {
        Ok(Self::from_classpath(Classpath::from_entries(entries)?))
    }

    /// A builder over `entries` plus the namespaces of `configurations`,
    /// with extra parser plug-ins, seeded by replaying `configurations`
    /// in order.
    ///
    /// # Errors
    ///
    /// Returns `MergeConflict` when the inputs disagree on a declaration or
    /// a parser, parser registration errors, and any error a replayed
    /// binding produces against the merged namespace.
    pub fn from_parts(
        entries: impl IntoIterator<Item = ClasspathEntry>,
        configurations: &[&Configuration],
        parsers: &[&str],
    ) -> Result<Self> {
        let classpath = Classpath::from_entries(entries)?;
        let namespaces: Vec<&Arc<Namespace>> =
            configurations.iter().map(|c| c.namespace()).collect();
        let namespace = Namespace::merge(&namespaces, Some(&classpath), parsers)?;
        let mut builder = Self::with_namespace(namespace);
        for configuration in configurations {
            ConfigurationMerger::replay(&mut builder, configuration)?;
        }
        Ok(builder)
    }

    /// A builder seeded by merging `configurations` left to right.
    ///
    /// # Errors
    ///
    /// See [`Self::from_parts`].
    pub fn from_configurations(configurations: &[&Configuration]) -> Result<Self> {
        if configurations.is_empty() {
            return Ok(Self::new());
        }
        let namespaces: Vec<&Arc<Namespace>> =
            configurations.iter().map(|c| c.namespace()).collect();
        let namespace = Namespace::merge(&namespaces, None, &[])?;
        let mut builder = Self::with_namespace(namespace);
        for configuration in configurations {
            ConfigurationMerger::replay(&mut builder, configuration)?;
        }
        Ok(builder)
    }

    /// Binds `key` to `value`, dispatching on the kind `key` resolves to.
    ///
    /// A class key takes an implementation, or an external constructor when
    /// `value` is one and `key` is not. A named-parameter key takes a class
    /// as its value.
    ///
    /// # Errors
    ///
    /// `NameResolution` when either side is unknown, `KindMismatch` for
    /// package keys or non-class values, `Assignability` when `value` does
    /// not fit.
    pub fn bind(&mut self, key: &str, value: &str) -> Result<&mut Self> {
        let key_node = self.namespace.get_node(key)?;
        match key_node.kind() {
            NodeKind::Class(class) => {
                let value_node = self.validator().class(BIND, value)?;
                let is_constructor = value_node
                    .as_class()
                    .is_some_and(|c| c.is_external_constructor());
                if is_constructor && !class.is_external_constructor() {
                    self.bind_constructor(key, value)
                } else {
                    self.bind_implementation(key, value)
                }
            }
            NodeKind::NamedParameter(_) => self.bind_named_parameter_class(key, value),
            NodeKind::Package => Err(Error::KindMismatch {
                operation: BIND,
                name: key_node.full_name().to_string(),
                found: key_node.kind().describe(),
                expected: "class or named parameter",
            }),
        }
    }

    /// Binds interface (or class) `key` to implementation class
    /// `implementation`.
    ///
    /// # Errors
    ///
    /// `KindMismatch` unless both sides are classes, `Assignability` unless
    /// `implementation` is a subtype of `key`.
    pub fn bind_implementation(&mut self, key: &str, implementation: &str) -> Result<&mut Self> {
        let (key, implementation) = self.validator().implementation(key, implementation)?;
        self.put(
            key.full_name(),
            BindingValue::Implementation(implementation.full_name().to_string()),
        );
        Ok(self)
    }

    /// Binds class `key` to the external constructor `constructor`.
    ///
    /// # Errors
    ///
    /// `KindMismatch` unless both sides are classes and `constructor` is an
    /// external constructor, `Assignability` unless what it produces is a
    /// subtype of `key`.
    pub fn bind_constructor(&mut self, key: &str, constructor: &str) -> Result<&mut Self> {
        let (key, constructor) = self.validator().constructor(key, constructor)?;
        self.put(
            key.full_name(),
            BindingValue::Constructor(constructor.full_name().to_string()),
        );
        Ok(self)
    }

    /// Binds named parameter `key` to the unparsed value `raw`.
    ///
    /// The value is stored as given. On a set-valued parameter this appends
    /// a set entry.
    ///
    /// # Errors
    ///
    /// `KindMismatch` unless `key` is a named parameter.
    pub fn bind_named_parameter(&mut self, key: &str, raw: &str) -> Result<&mut Self> {
        let node = self.validator().named_parameter(BIND_NAMED_PARAMETER, key)?;
        if node.as_named_parameter().is_some_and(|np| np.is_set()) {
            return self.bind_set_entry(key, raw);
        }
        self.put(node.full_name(), BindingValue::Parameter(raw.to_string()));
        Ok(self)
    }

    /// Binds named parameter `key` to class `implementation`.
    ///
    /// Scalar parameters record the class full name as their value; set
    /// parameters gain a class entry.
    ///
    /// # Errors
    ///
    /// `KindMismatch` for the wrong node kinds, `Assignability` unless
    /// `implementation` fits the parameter's (element) type.
    pub fn bind_named_parameter_class(
        &mut self,
        key: &str,
        implementation: &str,
    ) -> Result<&mut Self> {
        let (key, implementation) = self.validator().parameter_class(key, implementation)?;
        let name = implementation.full_name().to_string();
        if key.as_named_parameter().is_some_and(|np| np.is_set()) {
            self.add_set_entry(key.full_name(), SetEntry::Implementation(name));
        } else {
            self.put(key.full_name(), BindingValue::Parameter(name));
        }
        Ok(self)
    }

    /// Appends the unparsed value `raw` to set parameter `key`.
    ///
    /// # Errors
    ///
    /// `KindMismatch` unless `key` is a named parameter, `SetTypeMismatch`
    /// unless it takes a set.
    pub fn bind_set_entry(&mut self, key: &str, raw: &str) -> Result<&mut Self> {
        let node = self.validator().set_parameter(BIND_SET_ENTRY, key)?;
        self.add_set_entry(node.full_name(), SetEntry::Value(raw.to_string()));
        Ok(self)
    }

    /// Appends class `implementation` to set parameter `key`.
    ///
    /// # Errors
    ///
    /// As [`Self::bind_set_entry`], plus `KindMismatch` if `implementation`
    /// is not a class and `Assignability` unless it fits the element type.
    pub fn bind_set_entry_class(&mut self, key: &str, implementation: &str) -> Result<&mut Self> {
        let (key, implementation) = self.validator().set_implementation(key, implementation)?;
        self.add_set_entry(
            key.full_name(),
            SetEntry::Implementation(implementation.full_name().to_string()),
        );
        Ok(self)
    }

    /// Replays `configuration` into this builder, widening the namespace if
    /// the configuration was built over declarations this builder lacks.
    ///
    /// # Errors
    ///
    /// `MergeConflict` when the namespaces disagree, or the first replayed
    /// binding that fails; the builder is unchanged on error.
    pub fn add_configuration(&mut self, configuration: &Configuration) -> Result<&mut Self> {
        let namespace = Namespace::merge(&[&self.namespace, configuration.namespace()], None, &[])?;
        let mut staged = Self {
            namespace,
            store: self.store.clone(),
        };
        ConfigurationMerger::replay(&mut staged, configuration)?;
        *self = staged;
        Ok(self)
    }

    /// Re-applies a stored binding through the matching builder call.
    ///
    /// # Errors
    ///
    /// Whatever that call returns.
    pub fn apply(&mut self, key: &str, value: &BindingValue) -> Result<&mut Self> {
        match value {
            BindingValue::Implementation(class) => self.bind_implementation(key, class),
            BindingValue::Constructor(class) => self.bind_constructor(key, class),
            BindingValue::Parameter(raw) => self.bind_named_parameter(key, raw),
            BindingValue::SetValue(raw) => self.bind_set_entry(key, raw),
            BindingValue::SetImplementation(class) => self.bind_set_entry_class(key, class),
        }
    }

    /// Freezes the current bindings into a configuration.
    ///
    /// The builder stays usable; later calls do not affect the result.
    #[must_use]
    pub fn build(&self) -> Configuration {
        log::debug!("building configuration with {} binding(s)", self.store.len());
        Configuration::new(Arc::clone(&self.namespace), self.store.clone())
    }

    /// The namespace bindings are resolved against.
    #[must_use]
    pub fn namespace(&self) -> &Arc<Namespace> {
        &self.namespace
    }

    /// The bindings accumulated so far.
    #[must_use]
    pub fn store(&self) -> &BindingStore {
        &self.store
    }

    /// Number of bindings, counting each set entry occurrence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing is bound yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn validator(&self) -> BindingValidator<'_> {
        BindingValidator::new(&self.namespace)
    }

    fn put(&mut self, key: &str, value: BindingValue) {
        log::debug!("bound {key} to {value}");
        if let Some(previous) = self.store.put(key, value) {
            log::trace!("replaced {previous} on {key}");
        }
    }

    fn add_set_entry(&mut self, key: &str, entry: SetEntry) {
        log::debug!("added {:?} to {key}", entry.value());
        self.store.add_set_entry(key, entry);
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
