//! Declaration records: the host-agnostic description of a type.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::reflection::TypeExpr;

/// Whether a declaration is a class or an interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    /// A class (possibly abstract).
    #[default]
    Class,
    /// An interface.
    Interface,
}

/// One declared type.
///
/// # Examples
///
/// ```
/// use tang::classpath::Declaration;
/// use tang::reflection::TypeExpr;
///
/// let timer = Declaration::interface("com.example.Timer");
/// let system = Declaration::class("com.example.SystemTimer")
///     .with_implements(TypeExpr::named("com.example.Timer"));
/// assert!(system.validate().is_ok());
/// assert!(timer.is_interface());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Declaration {
    /// Full name (`.` between packages, `$` before nested names).
    pub name: String,

    /// Class or interface.
    #[serde(default)]
    pub kind: DeclarationKind,

    /// Names of the declaration's type variables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,

    /// Superclass, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<TypeExpr>,

    /// Implemented (or, for interfaces, extended) interfaces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<TypeExpr>,

    /// Declared constructors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<ConstructorDeclaration>,

    /// Abstract classes cannot be instantiated directly.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,

    /// Unit classes share one instance with their nested classes.
    #[serde(default)]
    pub unit: bool,

    /// Anonymous declarations are never injectable.
    #[serde(default)]
    pub anonymous: bool,

    /// Local (function-scoped) declarations are never injectable.
    #[serde(default)]
    pub local: bool,

    /// Marks this declaration as a named parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_parameter: Option<NamedParameterAttr>,
}

/// A declared constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstructorDeclaration {
    /// Whether the injector may call this constructor.
    #[serde(default)]
    pub injectable: bool,

    /// Constructor arguments in order.
    #[serde(default)]
    pub args: Vec<ConstructorArg>,
}

/// One constructor argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstructorArg {
    /// Declared argument type.
    #[serde(rename = "type")]
    pub ty: TypeExpr,

    /// Named parameter supplying this argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_parameter: Option<String>,
}

/// The named-parameter annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedParameterAttr {
    /// Default for scalar parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Defaults for set-valued parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_set: Vec<String>,

    /// Human-readable documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl Declaration {
    fn new(name: impl Into<String>, kind: DeclarationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_params: Vec::new(),
            extends: None,
            implements: Vec::new(),
            constructors: Vec::new(),
            is_abstract: false,
            unit: false,
            anonymous: false,
            local: false,
            named_parameter: None,
        }
    }

    /// A concrete class with no supertypes.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, DeclarationKind::Class)
    }

    /// An interface with no supertypes.
    #[must_use]
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, DeclarationKind::Interface)
    }

    /// A named parameter of the given target type.
    #[must_use]
    pub fn named_parameter(name: impl Into<String>, target: TypeExpr) -> Self {
        let mut decl = Self::class(name);
        decl.implements
            .push(TypeExpr::generic(super::prelude::NAME, vec![target]));
        decl.named_parameter = Some(NamedParameterAttr::default());
        decl
    }

    /// Sets the superclass.
    #[must_use]
    pub fn with_extends(mut self, superclass: TypeExpr) -> Self {
        self.extends = Some(superclass);
        self
    }

    /// Adds an implemented interface.
    #[must_use]
    pub fn with_implements(mut self, iface: TypeExpr) -> Self {
        self.implements.push(iface);
        self
    }

    /// Declares type variables.
    #[must_use]
    pub fn with_type_params(mut self, params: &[&str]) -> Self {
        self.type_params = params.iter().map(|p| (*p).to_string()).collect();
        self
    }

    /// Adds a constructor.
    #[must_use]
    pub fn with_constructor(mut self, constructor: ConstructorDeclaration) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Marks the class abstract.
    #[must_use]
    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Sets the scalar default of a named parameter.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.named_parameter
            .get_or_insert_with(NamedParameterAttr::default)
            .default = Some(value.into());
        self
    }

    /// Returns `true` for interfaces.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.kind == DeclarationKind::Interface
    }

    /// Returns `true` if the named-parameter annotation is present.
    #[must_use]
    pub fn is_named_parameter(&self) -> bool {
        self.named_parameter.is_some()
    }

    /// The declared supertypes with type variables bound.
    pub(crate) fn supertypes(&self) -> impl Iterator<Item = TypeExpr> + '_ {
        self.extends
            .iter()
            .chain(self.implements.iter())
            .map(|t| t.bind_variables(&self.type_params))
    }

    /// Checks the declaration is well formed on its own.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDeclaration` for malformed names, duplicate type
    /// variables, interfaces with constructors or superclasses, and named
    /// parameters carrying both scalar and set defaults.
    pub fn validate(&self) -> Result<()> {
        let parsed = TypeExpr::parse(&self.name)
            .map_err(|e| Error::invalid_declaration(&self.name, e.reason))?;
        if !parsed.args().is_empty() {
            return Err(Error::invalid_declaration(
                &self.name,
                "declaration names cannot carry type arguments",
            ));
        }
        if self.name.starts_with('$') || self.name.ends_with('$') || self.name.contains(".$") {
            return Err(Error::invalid_declaration(&self.name, "malformed nested name"));
        }

        for (i, param) in self.type_params.iter().enumerate() {
            if param.is_empty() || self.type_params[..i].contains(param) {
                return Err(Error::invalid_declaration(
                    &self.name,
                    format!("duplicate or empty type variable '{param}'"),
                ));
            }
        }

        if self.is_interface() {
            if !self.constructors.is_empty() {
                return Err(Error::invalid_declaration(
                    &self.name,
                    "interfaces cannot declare constructors",
                ));
            }
            if self.extends.is_some() {
                return Err(Error::invalid_declaration(
                    &self.name,
                    "interfaces extend through 'implements'",
                ));
            }
        }

        if let Some(attr) = &self.named_parameter {
            if attr.default.is_some() && !attr.default_set.is_empty() {
                return Err(Error::invalid_declaration(
                    &self.name,
                    "named parameter has both 'default' and 'default_set'",
                ));
            }
        }

        Ok(())
    }

    /// The enclosing class for nested declarations.
    #[must_use]
    pub fn outer_class(&self) -> Option<&str> {
        self.name.rfind('$').map(|i| &self.name[..i])
    }

    /// The package containing this declaration, if any.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        package_of(&self.name)
    }
}

/// The package part of a full name.
pub(crate) fn package_of(name: &str) -> Option<&str> {
    let top_level = name.split('$').next().unwrap_or(name);
    top_level.rfind('.').map(|i| &top_level[..i])
}

/// The last segment of a full name.
pub(crate) fn simple_name(name: &str) -> &str {
    let cut = name.rfind(|c| c == '.' || c == '$').map_or(0, |i| i + 1);
    &name[cut..]
}
