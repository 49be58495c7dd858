#![deny(missing_docs)]

//! # Path Templates
//!
//! Route paths accept `{name}`, `<name>` and `<converter:name>` variables.
//! Documents always use the `{name}` form.
//!
//! | converter          | documented as        | accepts          |
//! |--------------------|----------------------|------------------|
//! | none, `string`     | `string`             | one segment      |
//! | `path`             | `string`             | the rest of path |
//! | `int`              | `integer`            | whole numbers    |
//! | `float`            | `number`             | numbers          |
//! | `uuid`             | `string` / `uuid`    | hyphenated uuids |

use crate::error::{SpecError, SpecResult};
use crate::type_mapping::TypeDescriptor;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Converter applied to a path variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// One non-empty segment.
    String,
    /// Remaining segments, slashes included.
    Path,
    /// Whole number.
    Int,
    /// Floating point number.
    Float,
    /// Hyphenated UUID.
    Uuid,
}

impl Converter {
    fn parse(name: Option<&str>) -> Option<Self> {
        match name {
            None | Some("string") | Some("default") => Some(Converter::String),
            Some("path") => Some(Converter::Path),
            Some("int") => Some(Converter::Int),
            Some("float") => Some(Converter::Float),
            Some("uuid") => Some(Converter::Uuid),
            Some(_) => None,
        }
    }

    /// Documented type of the variable.
    pub fn descriptor(self) -> TypeDescriptor {
        match self {
            Converter::String | Converter::Path => TypeDescriptor::new("string"),
            Converter::Int => TypeDescriptor::new("integer"),
            Converter::Float => TypeDescriptor::new("number"),
            Converter::Uuid => TypeDescriptor::formatted("string", "uuid"),
        }
    }

    fn accepts(self, value: &str) -> bool {
        static UUID_RE: OnceLock<Regex> = OnceLock::new();
        match self {
            Converter::String | Converter::Path => !value.is_empty(),
            Converter::Int => value.parse::<i64>().is_ok(),
            Converter::Float => value.parse::<f64>().is_ok(),
            Converter::Uuid => UUID_RE
                .get_or_init(|| {
                    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
                        .expect("Invalid regex")
                })
                .is_match(value),
        }
    }
}

/// One `/`-separated piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Fixed text.
    Literal(String),
    /// Captured variable.
    Variable {
        /// Variable name.
        name: String,
        /// How the value is matched and documented.
        converter: Converter,
    },
}

/// A parsed route path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parses `raw`.
    ///
    /// # Errors
    ///
    /// `PathTemplate` for unknown converters, malformed variables, repeated
    /// variable names or a `path` variable that is not the last segment.
    pub fn parse(raw: &str) -> SpecResult<Self> {
        static BRACE_RE: OnceLock<Regex> = OnceLock::new();
        static ANGLE_RE: OnceLock<Regex> = OnceLock::new();
        let brace = BRACE_RE.get_or_init(|| {
            Regex::new(r"^\{([A-Za-z_][A-Za-z0-9_]*)\}$").expect("Invalid regex")
        });
        let angle = ANGLE_RE.get_or_init(|| {
            Regex::new(r"^<(?:([A-Za-z_]+):)?([A-Za-z_][A-Za-z0-9_]*)>$").expect("Invalid regex")
        });

        let invalid = |reason: String| SpecError::PathTemplate(format!("'{}': {}", raw, reason));
        let mut segments = Vec::new();
        for part in raw.trim_start_matches('/').split('/') {
            let segment = if let Some(caps) = brace.captures(part) {
                Segment::Variable {
                    name: caps[1].to_string(),
                    converter: Converter::String,
                }
            } else if let Some(caps) = angle.captures(part) {
                let converter_name = caps.get(1).map(|m| m.as_str());
                let converter = Converter::parse(converter_name).ok_or_else(|| {
                    invalid(format!("unknown converter '{}'", converter_name.unwrap_or_default()))
                })?;
                Segment::Variable {
                    name: caps[2].to_string(),
                    converter,
                }
            } else if part.contains(['{', '}', '<', '>']) {
                return Err(invalid(format!("malformed segment '{}'", part)));
            } else {
                Segment::Literal(part.to_string())
            };

            if let Some(Segment::Variable { converter: Converter::Path, .. }) = segments.last() {
                return Err(invalid("a path variable must be the last segment".to_string()));
            }
            if let Segment::Variable { name, .. } = &segment {
                if segments
                    .iter()
                    .any(|s| matches!(s, Segment::Variable { name: other, .. } if other == name))
                {
                    return Err(invalid(format!("variable '{}' repeats", name)));
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The template as registered.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The template in `{name}` form.
    pub fn documented_path(&self) -> String {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.clone(),
                Segment::Variable { name, .. } => format!("{{{}}}", name),
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    /// Variables in template order with their documented types.
    pub fn variables(&self) -> impl Iterator<Item = (&str, TypeDescriptor)> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Variable { name, converter } => Some((name.as_str(), converter.descriptor())),
            Segment::Literal(_) => None,
        })
    }

    /// Matches a concrete path, returning the captured variables.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let mut parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        let mut captured = BTreeMap::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Variable {
                    name,
                    converter: Converter::Path,
                } => {
                    let rest = parts.get(i..)?.join("/");
                    if !Converter::Path.accepts(&rest) {
                        return None;
                    }
                    captured.insert(name.clone(), rest);
                    parts.truncate(i + 1);
                }
                Segment::Variable { name, converter } => {
                    let value = parts.get(i)?;
                    if !converter.accepts(value) {
                        return None;
                    }
                    captured.insert(name.clone(), value.to_string());
                }
                Segment::Literal(text) => {
                    if parts.get(i) != Some(&text.as_str()) {
                        return None;
                    }
                }
            }
        }
        (parts.len() == self.segments.len()).then_some(captured)
    }
}
