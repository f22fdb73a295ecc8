//! Placeholder substitution for command lines and recipe values.
//!
//! # Syntax
//!
//! - `{variable}` - replaced with the variable's value
//! - `{version[minimum]}` - same as `{version.minimum}`
//! - `{{` and `}}` - literal braces
//!
//! # Example
//!
//! ```
//! use irequire::config::{resolve_string, InterpolationContext, Variables};
//!
//! let mut recipe = Variables::new();
//! recipe.insert("pkg_name".to_string(), "ninja-build".to_string());
//!
//! let ctx = InterpolationContext::new().with_layer(&recipe);
//! let token = resolve_string("{pkg_name}", &ctx).unwrap();
//! assert_eq!(token, "ninja-build");
//! ```

use crate::error::{IrequireError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// A flat variable namespace.
pub type Variables = BTreeMap<String, String>;

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference, with index syntax already flattened to dots
    Variable(String),
}

/// Parse a string containing `{var}` placeholders.
///
/// # Errors
///
/// Returns `InvalidPlaceholder` for an unterminated `{`, a lone `}`, an
/// empty name, or malformed `[key]` indexing.
pub fn parse_interpolation(input: &str) -> Result<Vec<Segment>> {
    let invalid = |message: &str| IrequireError::InvalidPlaceholder {
        input: input.to_string(),
        message: message.to_string(),
    };

    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let mut current_literal = String::new();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                current_literal.push('{');
            }
            '{' => {
                let mut raw_name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => return Err(invalid("nested '{'")),
                        _ => raw_name.push(c),
                    }
                }
                if !closed {
                    return Err(invalid("unterminated placeholder"));
                }

                let name = normalize_name(&raw_name).ok_or_else(|| {
                    invalid(&format!("malformed placeholder name '{}'", raw_name))
                })?;

                if !current_literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut current_literal)));
                }
                segments.push(Segment::Variable(name));
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                current_literal.push('}');
            }
            '}' => return Err(invalid("single '}' (use '}}' for a literal brace)")),
            _ => current_literal.push(c),
        }
    }

    if !current_literal.is_empty() {
        segments.push(Segment::Literal(current_literal));
    }

    Ok(segments)
}

/// Flatten `a[b][c]` into `a.b.c`. `None` if the name is malformed.
fn normalize_name(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let (base, mut rest) = match raw.find('[') {
        Some(pos) => (&raw[..pos], &raw[pos..]),
        None => (raw, ""),
    };
    if base.is_empty() || base.contains(']') {
        return None;
    }

    let mut name = base.to_string();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let end = inner.find(']')?;
        let key = &inner[..end];
        if key.is_empty() || key.contains('[') {
            return None;
        }
        name.push('.');
        name.push_str(key);
        rest = &inner[end + 1..];
    }

    Some(name)
}

/// Extract all variable names from an interpolated string.
pub fn extract_variables(input: &str) -> Result<BTreeSet<String>> {
    Ok(parse_interpolation(input)?
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Variable(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect())
}

/// Check if a string contains any placeholder.
pub fn has_interpolation(input: &str) -> bool {
    parse_interpolation(input)
        .map(|segments| segments.iter().any(|s| matches!(s, Segment::Variable(_))))
        .unwrap_or(false)
}

/// Layered variable lookup.
///
/// Layers are consulted in the order they were added; the first layer
/// defining a name wins.
#[derive(Debug, Default, Clone)]
pub struct InterpolationContext<'a> {
    layers: Vec<&'a Variables>,
}

impl<'a> InterpolationContext<'a> {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a lower-priority layer.
    pub fn with_layer(mut self, layer: &'a Variables) -> Self {
        self.layers.push(layer);
        self
    }

    /// Resolve a variable name to its value.
    pub fn resolve(&self, name: &str) -> Option<&'a str> {
        self.layers
            .iter()
            .copied()
            .find_map(|layer| layer.get(name))
            .map(String::as_str)
    }
}

/// Resolve all placeholders in a string.
///
/// # Errors
///
/// Returns `InvalidPlaceholder` for malformed input and `UnknownVariable`
/// if a placeholder is not defined by any layer of `context`.
pub fn resolve_string(input: &str, context: &InterpolationContext<'_>) -> Result<String> {
    let mut result = String::new();

    for segment in parse_interpolation(input)? {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => match context.resolve(&name) {
                Some(value) => result.push_str(value),
                None => {
                    return Err(IrequireError::UnknownVariable {
                        name,
                        input: input.to_string(),
                    })
                }
            },
        }
    }

    Ok(result)
}

/// Resolve every token of a command line.
pub fn resolve_tokens(
    tokens: &[String],
    context: &InterpolationContext<'_>,
) -> Result<Vec<String>> {
    tokens
        .iter()
        .map(|token| resolve_string(token, context))
        .collect()
}
