//! The binding store.
//!
//! Bindings are keyed by node full name, so two stores with the same logical
//! content compare equal and enumerate identically regardless of which
//! namespace (or insertion order) produced them.

use std::collections::BTreeMap;
use std::fmt;

/// A value bound to a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BindingValue {
    /// Class key bound to an implementation class.
    Implementation(String),
    /// Class key bound to an external constructor.
    Constructor(String),
    /// Scalar named parameter bound to an unparsed value.
    Parameter(String),
    /// One value entry of a set-valued parameter.
    SetValue(String),
    /// One class entry of a set-valued parameter.
    SetImplementation(String),
}

impl BindingValue {
    /// The bound class name or raw value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Implementation(v)
            | Self::Constructor(v)
            | Self::Parameter(v)
            | Self::SetValue(v)
            | Self::SetImplementation(v) => v,
        }
    }

    /// Returns `true` for set entries.
    #[must_use]
    pub fn is_set_entry(&self) -> bool {
        matches!(self, Self::SetValue(_) | Self::SetImplementation(_))
    }
}

impl fmt::Display for BindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Implementation(v) => write!(f, "implementation {v}"),
            Self::Constructor(v) => write!(f, "constructor {v}"),
            Self::Parameter(v) => write!(f, "value '{v}'"),
            Self::SetValue(v) => write!(f, "set value '{v}'"),
            Self::SetImplementation(v) => write!(f, "set implementation {v}"),
        }
    }
}

/// One entry of a set-valued parameter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SetEntry {
    /// An unparsed value.
    Value(String),
    /// A class name.
    Implementation(String),
}

impl SetEntry {
    /// The value or class name.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Value(v) | Self::Implementation(v) => v,
        }
    }
}

impl From<SetEntry> for BindingValue {
    fn from(entry: SetEntry) -> Self {
        match entry {
            SetEntry::Value(v) => Self::SetValue(v),
            SetEntry::Implementation(v) => Self::SetImplementation(v),
        }
    }
}

/// Singleton bindings plus a counted multiset of entries per set-valued
/// parameter.
///
/// # Examples
///
/// ```
/// use tang::builder::{BindingStore, BindingValue, SetEntry};
///
/// let mut a = BindingStore::new();
/// a.add_set_entry("app.Ports", SetEntry::Value("80".into()));
/// a.add_set_entry("app.Ports", SetEntry::Value("443".into()));
///
/// let mut b = BindingStore::new();
/// b.add_set_entry("app.Ports", SetEntry::Value("443".into()));
/// b.add_set_entry("app.Ports", SetEntry::Value("80".into()));
///
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingStore {
    singletons: BTreeMap<String, BindingValue>,
    sets: BTreeMap<String, BTreeMap<SetEntry, usize>>,
}

impl BindingStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the singleton binding of `key`, returning the one it replaced.
    pub fn put(&mut self, key: &str, value: BindingValue) -> Option<BindingValue> {
        debug_assert!(!value.is_set_entry());
        self.singletons.insert(key.to_string(), value)
    }

    /// Appends one entry to the set bound to `key`.
    pub fn add_set_entry(&mut self, key: &str, entry: SetEntry) {
        *self
            .sets
            .entry(key.to_string())
            .or_default()
            .entry(entry)
            .or_insert(0) += 1;
    }

    /// The singleton binding of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&BindingValue> {
        self.singletons.get(key)
    }

    /// The entries bound to `key`, duplicates repeated, in a stable order.
    #[must_use]
    pub fn set_entries(&self, key: &str) -> Vec<SetEntry> {
        self.sets
            .get(key)
            .map(|entries| {
                entries
                    .iter()
                    .flat_map(|(entry, count)| std::iter::repeat(entry.clone()).take(*count))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// How many times `entry` is bound to `key`.
    #[must_use]
    pub fn count(&self, key: &str, entry: &SetEntry) -> usize {
        self.sets
            .get(key)
            .and_then(|entries| entries.get(entry))
            .copied()
            .unwrap_or(0)
    }

    /// Every binding as `(full name, value)`, ordered by full name; set
    /// entries follow in their stable order with duplicates repeated.
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, BindingValue)> {
        let mut entries: Vec<(&str, BindingValue)> = self
            .singletons
            .iter()
            .map(|(key, value)| (key.as_str(), value.clone()))
            .collect();
        for (key, set) in &self.sets {
            for (entry, count) in set {
                for _ in 0..*count {
                    entries.push((key.as_str(), entry.clone().into()));
                }
            }
        }
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Full names with a singleton binding.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.singletons.keys().map(String::as_str)
    }

    /// Full names with at least one set entry.
    pub fn set_keys(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Number of bindings, counting each set entry occurrence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.singletons.len() + self.sets.values().flat_map(|s| s.values()).sum::<usize>()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.singletons.is_empty() && self.sets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_is_last_writer_wins() {
        let mut store = BindingStore::new();
        assert_eq!(
            store.put("app.Timer", BindingValue::Implementation("app.A".into())),
            None
        );
        let previous = store.put("app.Timer", BindingValue::Implementation("app.B".into()));
        assert_eq!(previous, Some(BindingValue::Implementation("app.A".into())));
        assert_eq!(
            store.get("app.Timer"),
            Some(&BindingValue::Implementation("app.B".into()))
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_entries_keep_duplicates() {
        let mut store = BindingStore::new();
        let three = SetEntry::Value("3".into());
        store.add_set_entry("app.P", three.clone());
        store.add_set_entry("app.P", three.clone());
        store.add_set_entry("app.P", SetEntry::Implementation("Integer".into()));

        assert_eq!(store.count("app.P", &three), 2);
        assert_eq!(store.set_entries("app.P").len(), 3);
        assert_eq!(store.len(), 3);
        assert!(store.set_entries("app.Other").is_empty());
    }

    #[test]
    fn test_entries_are_sorted_by_name() {
        let mut store = BindingStore::new();
        store.put("b.Key", BindingValue::Parameter("1".into()));
        store.add_set_entry("a.Set", SetEntry::Value("x".into()));
        store.put("c.Key", BindingValue::Constructor("c.Ctor".into()));

        let names: Vec<&str> = store.entries().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["a.Set", "b.Key", "c.Key"]);
        assert_eq!(store.entries()[0].1, BindingValue::SetValue("x".into()));
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let mut a = BindingStore::new();
        a.put("x.A", BindingValue::Parameter("1".into()));
        a.put("x.B", BindingValue::Parameter("2".into()));
        let mut b = BindingStore::new();
        b.put("x.B", BindingValue::Parameter("2".into()));
        b.put("x.A", BindingValue::Parameter("1".into()));
        assert_eq!(a, b);
        assert_eq!(a.entries(), b.entries());
    }

    #[test]
    fn test_binding_value_display() {
        assert_eq!(
            BindingValue::Parameter("10".into()).to_string(),
            "value '10'"
        );
        assert_eq!(
            BindingValue::from(SetEntry::Implementation("x.C".into())),
            BindingValue::SetImplementation("x.C".into())
        );
        assert_eq!(BindingValue::Constructor("x.K".into()).value(), "x.K");
    }
}
