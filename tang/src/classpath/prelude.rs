//! Built-in declarations present in every classpath.

use super::declaration::Declaration;
use crate::reflection::TypeExpr;

/// Root of every class hierarchy.
pub const OBJECT: &str = "Object";
/// Set-valued parameter marker.
pub const SET: &str = "Set";
/// Named-parameter marker interface.
pub const NAME: &str = "Name";
/// Factory interface.
pub const EXTERNAL_CONSTRUCTOR: &str = "ExternalConstructor";
/// Abstract numeric supertype.
pub const NUMBER: &str = "Number";
/// Text.
pub const STRING: &str = "String";

/// Numeric scalar types, all subclasses of [`NUMBER`].
pub const NUMERIC_TYPES: &[&str] = &["Integer", "Long", "Short", "Byte", "Float", "Double"];

/// Non-numeric scalar types, direct subclasses of [`OBJECT`].
pub const OTHER_SCALARS: &[&str] = &[STRING, "Boolean", "Character"];

/// Builds the prelude declarations.
pub(crate) fn declarations() -> Vec<Declaration> {
    let object = TypeExpr::named(OBJECT);
    let mut decls = vec![
        Declaration::class(OBJECT),
        Declaration::class(NUMBER)
            .with_abstract()
            .with_extends(object.clone()),
        Declaration::interface(SET).with_type_params(&["E"]),
        Declaration::interface(NAME).with_type_params(&["T"]),
        Declaration::interface(EXTERNAL_CONSTRUCTOR).with_type_params(&["T"]),
    ];
    decls.extend(
        NUMERIC_TYPES
            .iter()
            .map(|n| Declaration::class(*n).with_extends(TypeExpr::named(NUMBER))),
    );
    decls.extend(
        OTHER_SCALARS
            .iter()
            .map(|n| Declaration::class(*n).with_extends(object.clone())),
    );
    decls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_is_well_formed() {
        let decls = declarations();
        for decl in &decls {
            decl.validate().unwrap();
        }
        assert_eq!(decls.len(), 5 + NUMERIC_TYPES.len() + OTHER_SCALARS.len());
    }

    #[test]
    fn test_marker_interfaces_take_one_parameter() {
        for name in [SET, NAME, EXTERNAL_CONSTRUCTOR] {
            let decl = declarations().into_iter().find(|d| d.name == name).unwrap();
            assert!(decl.is_interface());
            assert_eq!(decl.type_params.len(), 1);
        }
    }
}
