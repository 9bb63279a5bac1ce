//! Generic-aware queries over the declarations of a classpath.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::TypeExpr;
use crate::classpath::{prelude, Classpath, Declaration};
use crate::error::{Error, Result};

/// Answers sub-typing and generic-target questions against a classpath.
///
/// # Examples
///
/// ```
/// use tang::classpath::{Classpath, ClasspathLoader};
/// use tang::reflection::{Reflection, TypeExpr};
///
/// let entry = ClasspathLoader::parse_str("inline", r"
/// declarations:
///   - name: app.Ports
///     implements: ['Name<Set<Integer>>']
///     named_parameter: {}
/// ").unwrap();
/// let classpath = Classpath::from_entries([entry]).unwrap();
/// let reflection = Reflection::new(&classpath);
///
/// let target = reflection.interface_target("Name", &TypeExpr::named("app.Ports")).unwrap();
/// assert_eq!(Reflection::raw_class(&target), "Set");
/// assert_eq!(reflection.element_type(&target).unwrap().raw(), "Integer");
/// assert!(reflection.is_assignable("Number", "Integer"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Reflection<'a> {
    classpath: &'a Classpath,
}

impl<'a> Reflection<'a> {
    /// Creates an adapter over `classpath`.
    #[must_use]
    pub const fn new(classpath: &'a Classpath) -> Self {
        Self { classpath }
    }

    /// The erasure of a type.
    #[must_use]
    pub fn raw_class(ty: &TypeExpr) -> &str {
        ty.raw()
    }

    /// The declaration behind a type's erasure, if it is declared.
    #[must_use]
    pub fn declaration(&self, ty: &TypeExpr) -> Option<&'a Declaration> {
        self.classpath.declaration(ty.raw())
    }

    fn bindings(decl: &Declaration, ty: &TypeExpr) -> HashMap<String, TypeExpr> {
        if ty.args().len() == decl.type_params.len() {
            decl.type_params
                .iter()
                .cloned()
                .zip(ty.args().iter().cloned())
                .collect()
        } else {
            HashMap::new()
        }
    }

    /// Every instantiated supertype of `ty`, `ty` included.
    ///
    /// Each declaration is expanded once, so cyclic hierarchies terminate.
    #[must_use]
    pub fn supertypes(&self, ty: &TypeExpr) -> Vec<TypeExpr> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut expanded = HashSet::new();
        let mut stack = vec![ty.clone()];

        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if expanded.insert(current.raw().to_string()) {
                if let Some(decl) = self.declaration(&current) {
                    let bindings = Self::bindings(decl, &current);
                    stack.extend(decl.supertypes().map(|s| s.substitute(&bindings)));
                }
            }
            found.push(current);
        }
        found
    }

    /// Recovers `X` from a type implementing the one-parameter interface
    /// `iface<X>`.
    ///
    /// # Errors
    ///
    /// Returns `GenericsMismatch` when `ty` does not implement `iface`,
    /// implements it with different arguments along different paths, uses it
    /// raw, or leaves `X` as an unbound type variable.
    pub fn interface_target(&self, iface: &str, ty: &TypeExpr) -> Result<TypeExpr> {
        let mismatch = |reason: &str| Error::GenericsMismatch {
            interface: iface.to_string(),
            declaration: ty.to_string(),
            reason: reason.to_string(),
        };

        let matches: BTreeSet<TypeExpr> = self
            .supertypes(ty)
            .into_iter()
            .filter(|t| t.raw() == iface)
            .collect();

        let mut iter = matches.into_iter();
        let found = match (iter.next(), iter.next()) {
            (None, _) => return Err(mismatch("does not implement it")),
            (Some(_), Some(_)) => return Err(mismatch("implements it ambiguously")),
            (Some(found), None) => found,
        };

        match found.args() {
            [target] if !target.contains_variable() => Ok(target.clone()),
            [_] => Err(mismatch("its type argument is an unbound type variable")),
            _ => Err(mismatch("implements it raw or with the wrong arity")),
        }
    }

    /// The element type of a `Set<E>` type.
    ///
    /// # Errors
    ///
    /// Returns `GenericsMismatch` if `set_type` is not a parameterised set.
    pub fn element_type(&self, set_type: &TypeExpr) -> Result<TypeExpr> {
        self.interface_target(prelude::SET, set_type)
    }

    /// Nominal sub-typing on erasures: can a `sub` be used where a `sup` is
    /// expected?
    #[must_use]
    pub fn is_assignable(&self, sup: &str, sub: &str) -> bool {
        if sup == sub || sup == prelude::OBJECT {
            return true;
        }
        self.supertypes(&TypeExpr::named(sub))
            .iter()
            .any(|t| t.raw() == sup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classpath::ClasspathLoader;

    fn classpath(yaml: &str) -> Classpath {
        Classpath::from_entries([ClasspathLoader::parse_str("test", yaml).unwrap()]).unwrap()
    }

    fn ty(text: &str) -> TypeExpr {
        TypeExpr::parse(text).unwrap()
    }

    const HIERARCHY: &str = r"
declarations:
  - name: app.Timer
    kind: interface
  - name: app.Clock
    kind: interface
    implements: [app.Timer]
  - name: app.BaseClock
    abstract: true
    implements: [app.Clock]
  - name: app.WallClock
    extends: app.BaseClock
  - name: app.Unrelated
  - name: app.AbstractCtor
    abstract: true
    type_params: [T]
    implements: ['ExternalConstructor<T>']
  - name: app.ClockCtor
    extends: 'app.AbstractCtor<app.WallClock>'
  - name: app.RawCtor
    extends: app.AbstractCtor
  - name: app.Confused
    implements: ['Name<Integer>', 'app.Named<String>']
  - name: app.Named
    kind: interface
    type_params: [T]
    implements: ['Name<T>']
";

    #[test]
    fn test_is_assignable_transitive() {
        let cp = classpath(HIERARCHY);
        let r = Reflection::new(&cp);
        assert!(r.is_assignable("app.Timer", "app.WallClock"));
        assert!(r.is_assignable("app.BaseClock", "app.WallClock"));
        assert!(r.is_assignable("app.WallClock", "app.WallClock"));
        assert!(r.is_assignable("Object", "app.Timer"));
        assert!(!r.is_assignable("app.WallClock", "app.Timer"));
        assert!(!r.is_assignable("app.Timer", "app.Unrelated"));
    }

    #[test]
    fn test_interface_target_through_generic_superclass() {
        let cp = classpath(HIERARCHY);
        let r = Reflection::new(&cp);
        let target = r
            .interface_target("ExternalConstructor", &ty("app.ClockCtor"))
            .unwrap();
        assert_eq!(target, ty("app.WallClock"));
    }

    #[test]
    fn test_interface_target_raw_use_is_mismatch() {
        let cp = classpath(HIERARCHY);
        let r = Reflection::new(&cp);
        let err = r
            .interface_target("ExternalConstructor", &ty("app.RawCtor"))
            .unwrap_err();
        assert!(matches!(err, Error::GenericsMismatch { .. }));
    }

    #[test]
    fn test_interface_target_missing() {
        let cp = classpath(HIERARCHY);
        let r = Reflection::new(&cp);
        assert!(matches!(
            r.interface_target("Name", &ty("app.WallClock")),
            Err(Error::GenericsMismatch { .. })
        ));
    }

    #[test]
    fn test_interface_target_ambiguous() {
        let cp = classpath(HIERARCHY);
        let r = Reflection::new(&cp);
        let err = r.interface_target("Name", &ty("app.Confused")).unwrap_err();
        assert!(format!("{err}").contains("ambiguously"));
    }

    #[test]
    fn test_element_type() {
        let cp = Classpath::new();
        let r = Reflection::new(&cp);
        assert_eq!(r.element_type(&ty("Set<Number>")).unwrap(), ty("Number"));
        assert!(r.element_type(&ty("Set")).is_err());
        assert!(r.element_type(&ty("Integer")).is_err());
    }

    #[test]
    fn test_cyclic_hierarchy_terminates() {
        let cp = classpath(
            "declarations:\n  - name: x.A\n    extends: x.B\n  - name: x.B\n    extends: x.A\n",
        );
        let r = Reflection::new(&cp);
        assert!(r.is_assignable("x.B", "x.A"));
        assert!(!r.is_assignable("x.C", "x.A"));
    }
}
