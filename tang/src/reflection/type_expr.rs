//! Type expressions: the textual type references used by declarations and
//! accepted as descriptors by the builder.
//!
//! Grammar:
//!
//! ```text
//! type  := ident ( '<' type ( ',' type )* '>' )?
//! ident := [A-Za-z0-9_.$]+
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A possibly-parameterised type reference.
///
/// # Examples
///
/// ```
/// use tang::reflection::TypeExpr;
///
/// let ty: TypeExpr = "Set<com.example.Timer>".parse().unwrap();
/// assert_eq!(ty.raw(), "Set");
/// assert_eq!(ty.args()[0].raw(), "com.example.Timer");
/// assert_eq!(ty.to_string(), "Set<com.example.Timer>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeExpr {
    /// A named type with zero or more type arguments.
    Named {
        /// The erasure (full name without arguments).
        raw: String,
        /// Type arguments, in declaration order.
        args: Vec<TypeExpr>,
    },
    /// An unbound type variable of the enclosing declaration.
    Variable(String),
}

/// Error returned when a type expression cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTypeExprError {
    /// The text that failed to parse.
    pub text: String,
    /// What went wrong.
    pub reason: String,
}

impl fmt::Display for InvalidTypeExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid type expression '{}': {}", self.text, self.reason)
    }
}

impl std::error::Error for InvalidTypeExprError {}

impl From<InvalidTypeExprError> for Error {
    fn from(err: InvalidTypeExprError) -> Self {
        Self::NameResolution {
            name: err.text,
            reason: err.reason,
        }
    }
}

impl TypeExpr {
    /// A type without arguments.
    #[must_use]
    pub fn named(raw: impl Into<String>) -> Self {
        Self::Named {
            raw: raw.into(),
            args: Vec::new(),
        }
    }

    /// A parameterised type.
    #[must_use]
    pub fn generic(raw: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        Self::Named {
            raw: raw.into(),
            args,
        }
    }

    /// Parses a type expression.
    ///
    /// # Errors
    ///
    /// Returns an error on empty identifiers, unbalanced brackets, trailing
    /// input, or type arguments nested deeper than [`MAX_NESTING`].
    pub fn parse(text: &str) -> Result<Self, InvalidTypeExprError> {
        let mut parser = Parser {
            text,
            chars: text.char_indices().peekable(),
            depth: 0,
        };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if let Some(&(at, c)) = parser.chars.peek() {
            return Err(parser.fail(format!("unexpected '{c}' at offset {at}")));
        }
        Ok(ty)
    }

    /// The erasure of this type.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Named { raw, .. } | Self::Variable(raw) => raw,
        }
    }

    /// The type arguments (empty for variables and raw types).
    #[must_use]
    pub fn args(&self) -> &[TypeExpr] {
        match self {
            Self::Named { args, .. } => args,
            Self::Variable(_) => &[],
        }
    }

    /// Returns `true` if this expression is, or contains, a type variable.
    #[must_use]
    pub fn contains_variable(&self) -> bool {
        match self {
            Self::Variable(_) => true,
            Self::Named { args, .. } => args.iter().any(Self::contains_variable),
        }
    }

    /// Reinterprets bare names listed in `params` as type variables.
    #[must_use]
    pub fn bind_variables(&self, params: &[String]) -> Self {
        match self {
            Self::Named { raw, args } if args.is_empty() && params.iter().any(|p| p == raw) => {
                Self::Variable(raw.clone())
            }
            Self::Named { raw, args } => Self::Named {
                raw: raw.clone(),
                args: args.iter().map(|a| a.bind_variables(params)).collect(),
            },
            Self::Variable(_) => self.clone(),
        }
    }

    /// Replaces bound type variables; unbound ones are left in place.
    #[must_use]
    pub fn substitute(&self, bindings: &HashMap<String, TypeExpr>) -> Self {
        match self {
            Self::Variable(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            Self::Named { raw, args } => Self::Named {
                raw: raw.clone(),
                args: args.iter().map(|a| a.substitute(bindings)).collect(),
            },
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => write!(f, "{name}"),
            Self::Named { raw, args } => {
                write!(f, "{raw}")?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for TypeExpr {
    type Err = InvalidTypeExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TypeExpr {
    type Error = InvalidTypeExprError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypeExpr> for String {
    fn from(value: TypeExpr) -> Self {
        value.to_string()
    }
}

/// Deepest type-argument nesting accepted by [`TypeExpr::parse`].
pub const MAX_NESTING: usize = 64;

struct Parser<'a> {
    text: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    depth: usize,
}

impl Parser<'_> {
    fn fail(&self, reason: impl Into<String>) -> InvalidTypeExprError {
        InvalidTypeExprError {
            text: self.text.to_string(),
            reason: reason.into(),
        }
    }

    fn skip_ws(&mut self) {
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
    }

    fn parse_type(&mut self) -> Result<TypeExpr, InvalidTypeExprError> {
        self.skip_ws();
        let mut raw = String::new();
        while let Some((_, c)) = self
            .chars
            .next_if(|&(_, c)| c.is_alphanumeric() || matches!(c, '_' | '.' | '$'))
        {
            raw.push(c);
        }
        if raw.is_empty() {
            return Err(self.fail("expected a type name"));
        }
        if raw.starts_with('.') || raw.ends_with('.') || raw.contains("..") {
            return Err(self.fail(format!("malformed name '{raw}'")));
        }

        self.skip_ws();
        let mut args = Vec::new();
        if self.chars.next_if(|&(_, c)| c == '<').is_some() {
            if self.depth == MAX_NESTING {
                return Err(self.fail(format!(
                    "type arguments nested deeper than {MAX_NESTING}"
                )));
            }
            self.depth += 1;
            loop {
                args.push(self.parse_type()?);
                self.skip_ws();
                match self.chars.next() {
                    Some((_, ',')) => continue,
                    Some((_, '>')) => break,
                    Some((at, c)) => {
                        return Err(self.fail(format!("unexpected '{c}' at offset {at}")))
                    }
                    None => return Err(self.fail("unterminated type argument list")),
                }
            }
            self.depth -= 1;
        }
        Ok(TypeExpr::Named { raw, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_name() {
        let ty = TypeExpr::parse("com.example.Timer").unwrap();
        assert_eq!(ty, TypeExpr::named("com.example.Timer"));
        assert!(ty.args().is_empty());
    }

    #[test]
    fn test_parse_nested_generics_with_spaces() {
        let ty = TypeExpr::parse(" Name< Set<Number> > ").unwrap();
        assert_eq!(ty.raw(), "Name");
        assert_eq!(ty.args()[0].raw(), "Set");
        assert_eq!(ty.args()[0].args()[0].raw(), "Number");
        assert_eq!(ty.to_string(), "Name<Set<Number>>");
    }

    #[test]
    fn test_parse_multiple_args() {
        let ty = TypeExpr::parse("Pair<A,B>").unwrap();
        assert_eq!(ty.args().len(), 2);
    }

    #[test]
    fn test_parse_nested_class_name() {
        let ty = TypeExpr::parse("com.example.Outer$Inner").unwrap();
        assert_eq!(ty.raw(), "com.example.Outer$Inner");
    }

    #[test]
    fn test_parse_errors() {
        assert!(TypeExpr::parse("").is_err());
        assert!(TypeExpr::parse("Set<").is_err());
        assert!(TypeExpr::parse("Set<Number").is_err());
        assert!(TypeExpr::parse("Set<Number>>").is_err());
        assert!(TypeExpr::parse("Set<>").is_err());
        assert!(TypeExpr::parse("com..example").is_err());
        assert!(TypeExpr::parse("a b").is_err());
    }

    #[test]
    fn test_bind_and_substitute_variables() {
        let params = vec!["T".to_string()];
        let ty = TypeExpr::parse("ExternalConstructor<Set<T>>")
            .unwrap()
            .bind_variables(&params);
        assert!(ty.contains_variable());

        let mut bindings = HashMap::new();
        bindings.insert("T".to_string(), TypeExpr::named("Integer"));
        let bound = ty.substitute(&bindings);
        assert!(!bound.contains_variable());
        assert_eq!(bound.to_string(), "ExternalConstructor<Set<Integer>>");
    }

    #[test]
    fn test_bind_variables_ignores_parameterised_names() {
        let params = vec!["T".to_string()];
        let ty = TypeExpr::parse("T<Integer>").unwrap().bind_variables(&params);
        assert!(!ty.contains_variable());
    }

    #[test]
    fn test_serde_as_string() {
        let ty = TypeExpr::parse("Set<Integer>").unwrap();
        let json = serde_json::to_string(&ty).unwrap();
        assert_eq!(json, "\"Set<Integer>\"");
        let back: TypeExpr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ty);
        assert!(serde_json::from_str::<TypeExpr>("\"Set<\"").is_err());
    }

    fn nested(depth: usize) -> String {
        format!("{}Integer{}", "Set<".repeat(depth), ">".repeat(depth))
    }

    #[test]
    fn test_nesting_limit() {
        assert!(TypeExpr::parse(&nested(MAX_NESTING)).is_ok());
        assert!(TypeExpr::parse(&nested(MAX_NESTING + 1)).is_err());
        assert!(TypeExpr::parse(&nested(30_000)).is_err());
        let json = serde_json::to_string(&nested(10_000)).unwrap();
        assert!(serde_json::from_str::<TypeExpr>(&json).is_err());
    }

    #[test]
    fn test_deep_descriptor_is_name_resolution() {
        let ns = crate::namespace::Namespace::default();
        let err = ns.get_node(&nested(10_000)).unwrap_err();
        assert!(matches!(err, Error::NameResolution { .. }));
    }

    #[test]
    fn test_error_converts_to_name_resolution() {
        let err: Error = TypeExpr::parse("Set<").unwrap_err().into();
        assert!(matches!(err, Error::NameResolution { .. }));
    }
}
