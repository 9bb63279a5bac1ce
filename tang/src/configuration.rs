//! Immutable configurations.
//!
//! A [`Configuration`] is produced by
//! [`ConfigurationBuilder::build`](crate::builder::ConfigurationBuilder::build).
//! It owns a frozen copy of the builder's bindings and shares the builder's
//! namespace. Configurations are `Send + Sync` and can be shared across
//! threads behind an `Arc` without locking.

use std::sync::Arc;

use crate::builder::{BindingStore, BindingValue, SetEntry};
use crate::namespace::{Namespace, Node};

/// A frozen set of bindings over a namespace.
///
/// Equality compares bindings only: two configurations with the same
/// logical content are equal even if built over different namespaces.
#[derive(Debug, Clone)]
pub struct Configuration {
    namespace: Arc<Namespace>,
    store: BindingStore,
}

impl Configuration {
    pub(crate) fn new(namespace: Arc<Namespace>, store: BindingStore) -> Self {
        Self { namespace, store }
    }

    /// The namespace the bindings were validated against.
    #[must_use]
    pub fn namespace(&self) -> &Arc<Namespace> {
        &self.namespace
    }

    /// The frozen bindings.
    #[must_use]
    pub fn store(&self) -> &BindingStore {
        &self.store
    }

    /// The singleton binding of `node`.
    #[must_use]
    pub fn binding(&self, node: &Node) -> Option<&BindingValue> {
        self.store.get(node.full_name())
    }

    /// The entries bound to set parameter `node`; empty if none.
    #[must_use]
    pub fn set_entries(&self, node: &Node) -> Vec<SetEntry> {
        self.store.set_entries(node.full_name())
    }

    /// The implementation bound to class `name`.
    #[must_use]
    pub fn bound_implementation(&self, name: &str) -> Option<&str> {
        match self.store.get(name) {
            Some(BindingValue::Implementation(class)) => Some(class),
            _ => None,
        }
    }

    /// The external constructor bound to class `name`.
    #[must_use]
    pub fn bound_constructor(&self, name: &str) -> Option<&str> {
        match self.store.get(name) {
            Some(BindingValue::Constructor(class)) => Some(class),
            _ => None,
        }
    }

    /// The raw value bound to scalar named parameter `name`.
    #[must_use]
    pub fn named_parameter(&self, name: &str) -> Option<&str> {
        match self.store.get(name) {
            Some(BindingValue::Parameter(raw)) => Some(raw),
            _ => None,
        }
    }

    /// Every binding as `(full name, value)` in a deterministic order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, BindingValue)> {
        self.store.entries()
    }

    /// Iterates over [`Self::entries`].
    pub fn iter(&self) -> impl Iterator<Item = (&str, BindingValue)> {
        self.entries().into_iter()
    }

    /// Number of bindings, counting each set entry occurrence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.store == other.store
    }
}

impl Eq for Configuration {}
