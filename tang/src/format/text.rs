//! The line-oriented text format.
//!
//! ```text
//! # comments start with '#'
//! app.Timer = app.SystemTimer
//! app.Clock => app.ClockFactory
//! app.Timeout = 30
//! app.Ports = 80
//! app.Ports = 443
//! ```
//!
//! Each line binds one full name. Constructor bindings use `=>`; every
//! other binding uses `=`. Set entries repeat the name once per entry.
//! Values escape `\\`, `\n`, `\r` and `\t`. A space at either end of a
//! value is written `\s`, and any other whitespace there as `\u{..}`.

use std::fmt::Write as _;

use super::ConfigurationFormat;
use crate::builder::{BindingValue, ConfigurationBuilder};
use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::namespace::Node;

/// Reads and writes `full-name = value` lines.
///
/// # Examples
///
/// ```
/// use tang::builder::ConfigurationBuilder;
/// use tang::classpath::ClasspathLoader;
/// use tang::format::{ConfigurationFormat, TextFormat};
///
/// let entry = ClasspathLoader::parse_str("inline", r"
/// declarations:
///   - name: app.Greeting
///     implements: ['Name<String>']
///     named_parameter: {}
/// ").unwrap();
/// let mut builder = ConfigurationBuilder::from_entries([entry]).unwrap();
/// builder.bind_named_parameter("app.Greeting", " hello\n").unwrap();
/// let configuration = builder.build();
///
/// let text = TextFormat.write(&configuration).unwrap();
/// assert_eq!(text, "app.Greeting = \\shello\\n\n");
///
/// let read = TextFormat.read(&text, configuration.namespace().clone()).unwrap();
/// assert_eq!(read, configuration);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormat;

impl ConfigurationFormat for TextFormat {
    fn write(&self, configuration: &Configuration) -> Result<String> {
        let mut out = String::new();
        for (name, value) in configuration.entries() {
            let op = match value {
                BindingValue::Constructor(_) => "=>",
                _ => "=",
            };
            // Writing to a String cannot fail.
            let _ = writeln!(out, "{name} {op} {}", escape(value.value()));
        }
        Ok(out)
    }

    fn read_into(&self, input: &str, builder: &mut ConfigurationBuilder) -> Result<()> {
        let mut staged = builder.clone();
        for (index, line) in input.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let (name, rest) = trimmed.split_once('=').ok_or_else(|| Error::Format {
                line: line_no,
                reason: "expected 'full-name = value'".into(),
            })?;
            let (constructor, raw) = match rest.strip_prefix('>') {
                Some(raw) => (true, raw),
                None => (false, rest),
            };
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::Format {
                    line: line_no,
                    reason: "missing full name".into(),
                });
            }
            let value = unescape(raw.trim()).map_err(|reason| Error::Format {
                line: line_no,
                reason,
            })?;

            log::trace!("line {line_no}: {name} = {value:?}");
            if constructor {
                let node = staged.namespace().get_node(name)?;
                if node.as_class().is_none() {
                    return Err(Error::Format {
                        line: line_no,
                        reason: format!("'=>' binds constructors, but '{name}' is not a class"),
                    });
                }
                staged.bind_constructor(name, &value)?;
            } else {
                replay_line(&mut staged, name, &value)?;
            }
        }
        *builder = staged;
        Ok(())
    }
}

fn replay_line(builder: &mut ConfigurationBuilder, name: &str, value: &str) -> Result<()> {
    let node = builder.namespace().get_node(name)?;
    let Some(np) = node.as_named_parameter() else {
        // Hand-written `=` lines may still name a constructor for the key.
        if is_implementation(builder, &node, value) {
            builder.bind_implementation(name, value)?;
        } else {
            builder.bind(name, value)?;
        }
        return Ok(());
    };
    if !np.is_set() {
        builder.bind_named_parameter(name, value)?;
    } else if is_class_entry(builder, &node, value) {
        builder.bind_set_entry_class(name, value)?;
    } else {
        builder.bind_set_entry(name, value)?;
    }
    Ok(())
}

/// `value` is a declared class assignable to class `node`.
fn is_implementation(builder: &ConfigurationBuilder, node: &Node, value: &str) -> bool {
    let namespace = builder.namespace();
    node.as_class().is_some()
        && namespace.classpath().declaration(value).is_some()
        && namespace.reflection().is_assignable(node.full_name(), value)
}

/// A set entry is read back as a class when the element type has no parser
/// and `value` names a class of that type.
fn is_class_entry(builder: &ConfigurationBuilder, node: &Node, value: &str) -> bool {
    let namespace = builder.namespace();
    let Some(element) = node.as_named_parameter().and_then(|np| np.element_type()) else {
        return false;
    };
    if namespace.parsers().parser_for(element.raw()).is_some() {
        return false;
    }
    namespace
        .classpath()
        .declaration(value)
        .is_some_and(|d| !d.is_named_parameter())
        && namespace.reflection().is_assignable(element.raw(), value)
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' ' if i == 0 || i == last => out.push_str("\\s"),
            c if (i == 0 || i == last) && c.is_whitespace() => {
                let _ = write!(out, "\\u{{{:x}}}", u32::from(c));
            }
            _ => out.push(c),
        }
    }
    out
}

fn unescape(value: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('s') => out.push(' '),
            Some('u') => out.push(unescape_code_point(&mut chars)?),
            Some(other) => return Err(format!("unknown escape '\\{other}'")),
            None => return Err("dangling '\\' at end of value".into()),
        }
    }
    Ok(out)
}

/// Reads the `{hex}` part of a `\u{hex}` escape.
fn unescape_code_point(chars: &mut std::str::Chars<'_>) -> std::result::Result<char, String> {
    if chars.next() != Some('{') {
        return Err("expected '{' after '\\u'".into());
    }
    let mut hex = String::new();
    loop {
        match chars.next() {
            Some('}') => break,
            Some(c) if c.is_ascii_hexdigit() && hex.len() < 6 => hex.push(c),
            Some(c) => return Err(format!("unexpected '{c}' in '\\u' escape")),
            None => return Err("unterminated '\\u' escape".into()),
        }
    }
    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("invalid code point '\\u{{{hex}}}'"))
}
