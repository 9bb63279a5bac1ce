//! Parameter parsers.
//!
//! Built-in parsers cover the prelude's scalar types. Plug-in parsers are
//! external-constructor declarations; registering one maps the type it
//! produces to the parser's name. Plug-ins are recorded, not executed.

use std::collections::BTreeMap;
use std::fmt;

use crate::classpath::{prelude, Classpath};
use crate::error::{Error, Result};
use crate::reflection::{Reflection, TypeExpr};

/// Which parser handles a type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParserRef {
    /// One of the built-in scalar parsers.
    Builtin(&'static str),
    /// A registered external-constructor declaration.
    Plugin(String),
}

impl fmt::Display for ParserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(name) => write!(f, "builtin:{name}"),
            Self::Plugin(name) => write!(f, "{name}"),
        }
    }
}

const BUILTIN: &[&str] = &[
    "String",
    "Integer",
    "Long",
    "Short",
    "Byte",
    "Float",
    "Double",
    "Boolean",
    "Character",
];

fn check_builtin(name: &str, raw: &str) -> std::result::Result<(), String> {
    fn parsed<T, E: fmt::Display>(r: std::result::Result<T, E>) -> std::result::Result<(), String> {
        r.map(|_| ()).map_err(|e| e.to_string())
    }

    match name {
        "Integer" => parsed(raw.parse::<i32>()),
        "Long" => parsed(raw.parse::<i64>()),
        "Short" => parsed(raw.parse::<i16>()),
        "Byte" => parsed(raw.parse::<i8>()),
        "Float" => parsed(raw.parse::<f32>()),
        "Double" => parsed(raw.parse::<f64>()),
        "Boolean" => {
            if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("false") {
                Ok(())
            } else {
                Err(format!("'{raw}' is not a boolean"))
            }
        }
        "Character" => {
            if raw.chars().count() == 1 {
                Ok(())
            } else {
                Err(format!("'{raw}' is not a single character"))
            }
        }
        _ => Ok(()),
    }
}

/// The parser set of a namespace.
///
/// # Examples
///
/// ```
/// use tang::namespace::{ParameterParser, ParserRef};
///
/// let parsers = ParameterParser::new();
/// assert_eq!(parsers.parser_for("Integer"), Some(ParserRef::Builtin("Integer")));
/// assert!(parsers.check("Integer", "42").is_ok());
/// assert!(parsers.check("Integer", "forty-two").is_err());
/// assert_eq!(parsers.parser_for("com.example.Timer"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterParser {
    plugins: BTreeMap<String, String>,
}

impl ParameterParser {
    /// A parser set with only the built-ins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an external-constructor declaration as the parser for the
    /// type it produces.
    ///
    /// # Errors
    ///
    /// Returns `NameResolution` if `parser` is not declared,
    /// `GenericsMismatch` if its produced type cannot be recovered, and
    /// `MergeConflict` if a different parser already handles that type.
    pub fn register(&mut self, classpath: &Classpath, parser: &str) -> Result<()> {
        if classpath.declaration(parser).is_none() {
            return Err(Error::name_resolution(parser, "parser is not declared"));
        }
        let target = Reflection::new(classpath)
            .interface_target(prelude::EXTERNAL_CONSTRUCTOR, &TypeExpr::named(parser))?;
        self.insert(target.raw(), parser)
    }

    fn insert(&mut self, target: &str, parser: &str) -> Result<()> {
        match self.plugins.get(target) {
            Some(existing) if existing != parser => Err(Error::merge_conflict(
                target,
                format!("parsed by both {existing} and {parser}"),
            )),
            Some(_) => Ok(()),
            None => {
                log::debug!("registered parser {parser} for {target}");
                self.plugins.insert(target.to_string(), parser.to_string());
                Ok(())
            }
        }
    }

    /// Union of two parser sets.
    ///
    /// # Errors
    ///
    /// Returns `MergeConflict` if both sets map one type to different parsers.
    pub fn merge(&self, other: &Self) -> Result<Self> {
        let mut merged = self.clone();
        for (target, parser) in &other.plugins {
            merged.insert(target, parser)?;
        }
        Ok(merged)
    }

    /// The parser for values of `type_name`; plug-ins win over built-ins.
    #[must_use]
    pub fn parser_for(&self, type_name: &str) -> Option<ParserRef> {
        if let Some(plugin) = self.plugins.get(type_name) {
            return Some(ParserRef::Plugin(plugin.clone()));
        }
        BUILTIN
            .iter()
            .find(|b| **b == type_name)
            .map(|b| ParserRef::Builtin(*b))
    }

    /// Checks that `raw` parses as `type_name`.
    ///
    /// Values handled by plug-ins are accepted as-is.
    ///
    /// # Errors
    ///
    /// Returns the built-in parser's message on failure, or a message saying
    /// no parser exists for `type_name`.
    pub fn check(&self, type_name: &str, raw: &str) -> std::result::Result<(), String> {
        match self.parser_for(type_name) {
            Some(ParserRef::Builtin(name)) => check_builtin(name, raw),
            Some(ParserRef::Plugin(_)) => Ok(()),
            None => Err(format!("no parser for {type_name}")),
        }
    }

    /// Registered plug-ins as `(target type, parser)` pairs.
    pub fn plugins(&self) -> impl Iterator<Item = (&str, &str)> {
        self.plugins.iter().map(|(t, p)| (t.as_str(), p.as_str()))
    }
}
