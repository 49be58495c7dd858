#![deny(missing_docs)]

//! # Field Declarations
//!
//! The capability every field schema implements: an ordered list of named,
//! typed fields. Used both as a request-parameter source and as a response
//! shape source.

use serde_json::Value;
use std::any::TypeId;
use std::fmt;

/// A type that declares an ordered set of fields.
///
/// ```
/// use swagplus_core::fields::{FieldSchema, FieldSpec};
///
/// struct AddressSchema;
///
/// impl FieldSchema for AddressSchema {
///     const NAME: &'static str = "AddressSchema";
///     fn fields() -> Vec<FieldSpec> {
///         vec![FieldSpec::string("street"), FieldSpec::string("country")]
///     }
/// }
/// ```
pub trait FieldSchema: 'static {
    /// Local (unqualified) schema name.
    const NAME: &'static str;

    /// Fields in declaration order.
    fn fields() -> Vec<FieldSpec>;
}

/// Declares a unit struct implementing [`FieldSchema`].
///
/// ```
/// use swagplus_core::field_schema;
/// use swagplus_core::fields::FieldSpec;
///
/// field_schema! {
///     pub struct UserForm {
///         FieldSpec::string("email").required(),
///         FieldSpec::string("name"),
///     }
/// }
/// ```
#[macro_export]
macro_rules! field_schema {
    ($(#[$meta:meta])* $vis:vis struct $name:ident { $($field:expr),* $(,)? }) => {
        $(#[$meta])*
        $vis struct $name;

        impl $crate::fields::FieldSchema for $name {
            const NAME: &'static str = stringify!($name);

            fn fields() -> Vec<$crate::fields::FieldSpec> {
                vec![$($field),*]
            }
        }
    };
}

/// Identity handle of a field schema.
///
/// Two handles are equal iff they were created from the same Rust type.
#[derive(Clone, Copy)]
pub struct SchemaDecl {
    id: TypeId,
    name: &'static str,
    fields: fn() -> Vec<FieldSpec>,
}

impl SchemaDecl {
    /// Handle for schema type `S`.
    pub fn of<S: FieldSchema>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: S::NAME,
            fields: S::fields,
        }
    }

    /// The type identity backing this declaration.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Local schema name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Enumerates the declared fields.
    pub fn fields(&self) -> Vec<FieldSpec> {
        (self.fields)()
    }
}

impl PartialEq for SchemaDecl {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SchemaDecl {}

impl std::hash::Hash for SchemaDecl {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for SchemaDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaDecl({})", self.name)
    }
}

/// The kind of a declared field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free text.
    String,
    /// Whole number.
    Integer,
    /// Floating point number.
    Float,
    /// Decimal number (documented as `number`).
    Decimal,
    /// `true` / `false`.
    Boolean,
    /// Calendar date, carried as text.
    Date,
    /// Timestamp, carried as text.
    DateTime,
    /// Arbitrary JSON object.
    Dict,
    /// Comma separated values, each processed as the inner kind.
    CsvList(Box<FieldKind>),
    /// JSON array of the inner kind.
    List(Box<FieldKind>),
    /// Another schema, emitted as its own definition.
    Nested(SchemaDecl),
    /// A consumer-defined kind resolved through the field type registry.
    Custom(String),
}

impl FieldKind {
    /// Nested schema kind for `S`.
    pub fn nested<S: FieldSchema>() -> Self {
        FieldKind::Nested(SchemaDecl::of::<S>())
    }

    /// JSON array of `item`.
    pub fn list(item: FieldKind) -> Self {
        FieldKind::List(Box::new(item))
    }

    /// Comma separated list of `item`.
    pub fn csv(item: FieldKind) -> Self {
        FieldKind::CsvList(Box::new(item))
    }

    /// Custom kind identified by `tag`.
    pub fn custom(tag: impl Into<String>) -> Self {
        FieldKind::Custom(tag.into())
    }

    /// Registry tag of this kind; `None` for structural kinds.
    pub fn tag(&self) -> Option<&str> {
        match self {
            FieldKind::String => Some("string"),
            FieldKind::Integer => Some("integer"),
            FieldKind::Float => Some("float"),
            FieldKind::Decimal => Some("decimal"),
            FieldKind::Boolean => Some("boolean"),
            FieldKind::Date => Some("date"),
            FieldKind::DateTime => Some("datetime"),
            FieldKind::Dict => Some("dict"),
            FieldKind::CsvList(_) => Some("csv_list"),
            FieldKind::Custom(tag) => Some(tag),
            FieldKind::List(_) | FieldKind::Nested(_) => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::List(inner) => write!(f, "list<{}>", inner),
            FieldKind::Nested(decl) => write!(f, "nested:{}", decl.name()),
            other => write!(f, "{}", other.tag().unwrap_or_default()),
        }
    }
}

/// Validation and documentation constraints attached to a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldConstraints {
    /// Value used when an optional field is absent.
    pub default: Option<Value>,
    /// Allowed values.
    pub allowed: Option<Vec<Value>>,
    /// Minimum text length (in characters).
    pub min_length: Option<usize>,
    /// Maximum text length (in characters).
    pub max_length: Option<usize>,
    /// Lower numeric bound.
    pub minimum: Option<f64>,
    /// Upper numeric bound.
    pub maximum: Option<f64>,
    /// Whether `minimum` itself is rejected.
    pub exclusive_minimum: bool,
    /// Whether `maximum` itself is rejected.
    pub exclusive_maximum: bool,
    /// Disables trimming of surrounding whitespace on text input.
    pub keep_whitespace: bool,
}

/// A single declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Field kind.
    pub kind: FieldKind,
    /// Whether the field must be present.
    pub required: bool,
    /// Human readable description.
    pub description: String,
    /// Constraints.
    pub constraints: FieldConstraints,
}

impl FieldSpec {
    /// Creates an optional field without description.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            description: String::new(),
            constraints: FieldConstraints::default(),
        }
    }

    /// Text field.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    /// Integer field.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// Float field.
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    /// Boolean field.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    /// Nested schema field.
    pub fn nested<S: FieldSchema>(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::nested::<S>())
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the default value for absent input.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.constraints.default = Some(value.into());
        self
    }

    /// Restricts the field to the given values.
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.constraints.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Minimum text length.
    pub fn min_length(mut self, len: usize) -> Self {
        self.constraints.min_length = Some(len);
        self
    }

    /// Maximum text length.
    pub fn max_length(mut self, len: usize) -> Self {
        self.constraints.max_length = Some(len);
        self
    }

    /// Inclusive lower bound.
    pub fn minimum(mut self, min: f64) -> Self {
        self.constraints.minimum = Some(min);
        self.constraints.exclusive_minimum = false;
        self
    }

    /// Inclusive upper bound.
    pub fn maximum(mut self, max: f64) -> Self {
        self.constraints.maximum = Some(max);
        self.constraints.exclusive_maximum = false;
        self
    }

    /// Exclusive lower bound.
    pub fn exclusive_minimum(mut self, min: f64) -> Self {
        self.constraints.minimum = Some(min);
        self.constraints.exclusive_minimum = true;
        self
    }

    /// Exclusive upper bound.
    pub fn exclusive_maximum(mut self, max: f64) -> Self {
        self.constraints.maximum = Some(max);
        self.constraints.exclusive_maximum = true;
        self
    }

    /// Keeps surrounding whitespace on text input.
    pub fn keep_whitespace(mut self) -> Self {
        self.constraints.keep_whitespace = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::field_schema! {
        struct Point {
            FieldSpec::integer("x").required(),
            FieldSpec::integer("y"),
        }
    }

    crate::field_schema! {
        struct Other {
            FieldSpec::integer("x"),
        }
    }

    #[test]
    fn test_macro_declares_schema() {
        assert_eq!(Point::NAME, "Point");
        let fields = Point::fields();
        assert_eq!(fields.len(), 2);
        assert!(fields[0].required);
        assert!(!fields[1].required);
    }

    #[test]
    fn test_schema_identity_by_type() {
        assert_eq!(SchemaDecl::of::<Point>(), SchemaDecl::of::<Point>());
        assert_ne!(SchemaDecl::of::<Point>(), SchemaDecl::of::<Other>());
        assert_eq!(SchemaDecl::of::<Point>().name(), "Point");
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(FieldKind::String.tag(), Some("string"));
        assert_eq!(FieldKind::csv(FieldKind::Integer).tag(), Some("csv_list"));
        assert_eq!(FieldKind::custom("uuid").tag(), Some("uuid"));
        assert_eq!(FieldKind::list(FieldKind::String).tag(), None);
        assert_eq!(FieldKind::nested::<Point>().to_string(), "nested:Point");
        assert_eq!(FieldKind::list(FieldKind::Float).to_string(), "list<float>");
    }

    #[test]
    fn test_builder_constraints() {
        let f = FieldSpec::integer("age")
            .required()
            .describe("age in years")
            .minimum(0.0)
            .exclusive_maximum(150.0)
            .default_value(18);
        assert!(f.required);
        assert_eq!(f.description, "age in years");
        assert_eq!(f.constraints.minimum, Some(0.0));
        assert!(!f.constraints.exclusive_minimum);
        assert!(f.constraints.exclusive_maximum);
        assert_eq!(f.constraints.default, Some(Value::from(18)));
    }
}
