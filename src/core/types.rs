//! Expression type descriptors and assignability rules
//!
//! Every slot in a block declares an [`ExpressionType`], and every expression
//! block reports one for its result. [`can_assign`] decides which expressions
//! may be placed in which slots. Types are either atomic tags, parameterized
//! forms (numbers with suffixes, enums, arrays, objects, promises), or an
//! ordered list of alternatives meaning "any one of these is acceptable".

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

use super::SelectOption;

/// A recursive expression type descriptor.
///
/// The alternative-list form ([`ExpressionType::OneOf`]) never nests directly
/// inside another alternative list; [`ExpressionType::one_of`] flattens on
/// construction and deserialization goes through it.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionType {
    /// Any value at all
    Any,
    Boolean,
    /// No value; the type of statements
    Void,
    /// A page element, addressed through the `$w` accessor
    Element,
    Color,
    Image,
    Link,
    /// Text (the host runtime's string type)
    Text,
    Number {
        /// Unit suffix appended to rendered values (e.g. "px")
        suffix: Option<String>,
        /// Restrict to whole numbers
        integer: bool,
    },
    Date,
    /// A closed set of named options
    Enum {
        name: String,
        options: Vec<SelectOption>,
    },
    Array {
        elements: Box<ExpressionType>,
    },
    /// A named record of typed entries
    Object {
        name: String,
        entries: BTreeMap<String, ExpressionType>,
    },
    /// An asynchronous operation resolving to the inner type
    Promise {
        of: Box<ExpressionType>,
    },
    /// Any one of the listed types is acceptable
    OneOf(Vec<ExpressionType>),
}

/// The tag of a type, ignoring its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Any,
    Boolean,
    Void,
    Element,
    Color,
    Image,
    Link,
    String,
    Number,
    Date,
    Enum,
    Array,
    Object,
    Promise,
}

impl TypeKey {
    /// Wire-format name of the tag.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKey::Any => "any",
            TypeKey::Boolean => "boolean",
            TypeKey::Void => "void",
            TypeKey::Element => "element",
            TypeKey::Color => "color",
            TypeKey::Image => "image",
            TypeKey::Link => "link",
            TypeKey::String => "string",
            TypeKey::Number => "number",
            TypeKey::Date => "date",
            TypeKey::Enum => "enum",
            TypeKey::Array => "array",
            TypeKey::Object => "object",
            TypeKey::Promise => "promise",
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tags whose values the host runtime treats as loosely interchangeable:
/// most primitive-ish values can flow into most primitive-ish slots.
pub const INTERCHANGEABLE: [TypeKey; 8] = [
    TypeKey::Any,
    TypeKey::Color,
    TypeKey::Element,
    TypeKey::Image,
    TypeKey::String,
    TypeKey::Enum,
    TypeKey::Number,
    TypeKey::Link,
];

impl ExpressionType {
    /// A plain number with no suffix or integer restriction.
    pub fn number() -> Self {
        ExpressionType::Number {
            suffix: None,
            integer: false,
        }
    }

    /// A whole number.
    pub fn whole_number() -> Self {
        ExpressionType::Number {
            suffix: None,
            integer: true,
        }
    }

    /// A number rendered with a unit suffix.
    pub fn suffixed_number(suffix: impl Into<String>) -> Self {
        ExpressionType::Number {
            suffix: Some(suffix.into()),
            integer: false,
        }
    }

    /// An array of `elements`.
    pub fn array_of(elements: ExpressionType) -> Self {
        ExpressionType::Array {
            elements: Box::new(elements),
        }
    }

    /// An asynchronous operation resolving to `of`.
    pub fn promise_of(of: ExpressionType) -> Self {
        ExpressionType::Promise { of: Box::new(of) }
    }

    /// Build an alternative list, flattening nested alternatives so the
    /// list form never directly contains another list. A single surviving
    /// alternative collapses to the alternative itself.
    pub fn one_of(options: impl IntoIterator<Item = ExpressionType>) -> Self {
        let mut flat = Vec::new();
        for option in options {
            match option {
                ExpressionType::OneOf(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            ExpressionType::OneOf(flat)
        }
    }

    /// The tag of this type. For an alternative list, the tag of its first
    /// member.
    pub fn key(&self) -> TypeKey {
        match self {
            ExpressionType::Any => TypeKey::Any,
            ExpressionType::Boolean => TypeKey::Boolean,
            ExpressionType::Void => TypeKey::Void,
            ExpressionType::Element => TypeKey::Element,
            ExpressionType::Color => TypeKey::Color,
            ExpressionType::Image => TypeKey::Image,
            ExpressionType::Link => TypeKey::Link,
            ExpressionType::Text => TypeKey::String,
            ExpressionType::Number { .. } => TypeKey::Number,
            ExpressionType::Date => TypeKey::Date,
            ExpressionType::Enum { .. } => TypeKey::Enum,
            ExpressionType::Array { .. } => TypeKey::Array,
            ExpressionType::Object { .. } => TypeKey::Object,
            ExpressionType::Promise { .. } => TypeKey::Promise,
            ExpressionType::OneOf(options) => {
                options.first().map(ExpressionType::key).unwrap_or(TypeKey::Any)
            }
        }
    }

    /// Human-readable name, recursively naming parameterized forms and
    /// joining alternatives with "or".
    pub fn name(&self) -> String {
        match self {
            ExpressionType::Any => "Any Value".to_string(),
            ExpressionType::Boolean => "Boolean".to_string(),
            ExpressionType::Void => "Nothing".to_string(),
            ExpressionType::Element => "Wix Element".to_string(),
            ExpressionType::Color => "Color".to_string(),
            ExpressionType::Image => "Image".to_string(),
            ExpressionType::Link => "Link".to_string(),
            ExpressionType::Text => "Text".to_string(),
            ExpressionType::Number { integer: true, .. } => "Whole Number".to_string(),
            ExpressionType::Number { .. } => "Number".to_string(),
            ExpressionType::Date => "Date".to_string(),
            ExpressionType::Enum { name, .. } => name.clone(),
            ExpressionType::Array { elements } => format!("Array of {}", elements.name()),
            ExpressionType::Object { name, .. } => name.clone(),
            ExpressionType::Promise { of } => {
                format!("Async Operation resulting in {}", of.name())
            }
            ExpressionType::OneOf(options) => options
                .iter()
                .map(ExpressionType::name)
                .collect::<Vec<_>>()
                .join(" or "),
        }
    }

    /// Convert to the wire representation: atomic tags and parameterless
    /// text/number/date as bare strings, parameterized forms as tagged maps,
    /// alternative lists as arrays.
    pub fn to_value(&self) -> JsonValue {
        match self {
            ExpressionType::Number { suffix, integer } if suffix.is_some() || *integer => {
                let mut map = Map::new();
                map.insert("type".into(), json!("number"));
                if let Some(suffix) = suffix {
                    map.insert("suffix".into(), json!(suffix));
                }
                if *integer {
                    map.insert("integer".into(), json!(true));
                }
                JsonValue::Object(map)
            }
            ExpressionType::Enum { name, options } => {
                json!({ "type": "enum", "name": name, "options": options })
            }
            ExpressionType::Array { elements } => {
                json!({ "type": "array", "elements": elements.to_value() })
            }
            ExpressionType::Object { name, entries } => {
                let entries: Map<String, JsonValue> = entries
                    .iter()
                    .map(|(key, ty)| (key.clone(), ty.to_value()))
                    .collect();
                json!({ "type": "object", "name": name, "entries": entries })
            }
            ExpressionType::Promise { of } => {
                json!({ "type": "promise", "of": of.to_value() })
            }
            ExpressionType::OneOf(options) => {
                JsonValue::Array(options.iter().map(ExpressionType::to_value).collect())
            }
            other => JsonValue::String(other.key().as_str().to_string()),
        }
    }

    /// Parse the wire representation produced by [`ExpressionType::to_value`].
    pub fn from_value(value: &JsonValue) -> Result<Self, TypeReprError> {
        match value {
            JsonValue::String(key) => Self::from_key(key),
            JsonValue::Array(options) => {
                let options = options
                    .iter()
                    .map(Self::from_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::one_of(options))
            }
            JsonValue::Object(map) => Self::from_map(map),
            other => Err(TypeReprError::Malformed(format!(
                "expected string, array or map, got {other}"
            ))),
        }
    }

    fn from_key(key: &str) -> Result<Self, TypeReprError> {
        match key {
            "any" => Ok(ExpressionType::Any),
            "boolean" => Ok(ExpressionType::Boolean),
            "void" => Ok(ExpressionType::Void),
            "element" => Ok(ExpressionType::Element),
            "color" => Ok(ExpressionType::Color),
            "image" => Ok(ExpressionType::Image),
            "link" => Ok(ExpressionType::Link),
            "string" => Ok(ExpressionType::Text),
            "number" => Ok(ExpressionType::number()),
            "date" => Ok(ExpressionType::Date),
            other => Err(TypeReprError::UnknownKey(other.to_string())),
        }
    }

    fn from_map(map: &Map<String, JsonValue>) -> Result<Self, TypeReprError> {
        let tag = map
            .get("type")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| TypeReprError::Malformed("missing `type` tag".to_string()))?;
        match tag {
            "string" => Ok(ExpressionType::Text),
            "date" => Ok(ExpressionType::Date),
            "number" => Ok(ExpressionType::Number {
                suffix: map
                    .get("suffix")
                    .and_then(JsonValue::as_str)
                    .map(str::to_string),
                integer: map.get("integer").and_then(JsonValue::as_bool).unwrap_or(false),
            }),
            "enum" => Ok(ExpressionType::Enum {
                name: required_str(map, "name")?,
                options: map
                    .get("options")
                    .cloned()
                    .map(serde_json::from_value)
                    .transpose()
                    .map_err(|err| TypeReprError::Malformed(err.to_string()))?
                    .unwrap_or_default(),
            }),
            "array" => Ok(ExpressionType::Array {
                elements: Box::new(Self::from_value(required(map, "elements")?)?),
            }),
            "object" => {
                let raw = required(map, "entries")?;
                let JsonValue::Object(raw) = raw else {
                    return Err(TypeReprError::Malformed("`entries` must be a map".to_string()));
                };
                let entries = raw
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), Self::from_value(value)?)))
                    .collect::<Result<BTreeMap<_, _>, TypeReprError>>()?;
                Ok(ExpressionType::Object {
                    name: required_str(map, "name")?,
                    entries,
                })
            }
            "promise" => Ok(ExpressionType::Promise {
                of: Box::new(Self::from_value(required(map, "of")?)?),
            }),
            other => Err(TypeReprError::UnknownKey(other.to_string())),
        }
    }
}

fn required<'a>(map: &'a Map<String, JsonValue>, field: &str) -> Result<&'a JsonValue, TypeReprError> {
    map.get(field)
        .ok_or_else(|| TypeReprError::Malformed(format!("missing `{field}`")))
}

fn required_str(map: &Map<String, JsonValue>, field: &str) -> Result<String, TypeReprError> {
    required(map, field)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| TypeReprError::Malformed(format!("`{field}` must be a string")))
}

/// Errors parsing a stored type descriptor
#[derive(Debug, thiserror::Error)]
pub enum TypeReprError {
    /// The tag does not name a known type
    #[error("unknown type key `{0}`")]
    UnknownKey(String),

    /// The descriptor shape is not valid
    #[error("malformed type descriptor: {0}")]
    Malformed(String),
}

impl Serialize for ExpressionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ExpressionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        ExpressionType::from_value(&value).map_err(DeError::custom)
    }
}

/// Whether an expression of type `value` may be placed in a slot declared as
/// `to`.
///
/// Alternative lists on either side match existentially: one acceptable
/// member is enough. Otherwise the tags are compared: equal tags always
/// match, and any two members of the [`INTERCHANGEABLE`] bucket match
/// regardless of exact tag.
pub fn can_assign(value: &ExpressionType, to: &ExpressionType) -> bool {
    if let ExpressionType::OneOf(options) = value {
        return options.iter().any(|option| can_assign(option, to));
    }
    if let ExpressionType::OneOf(options) = to {
        return options.iter().any(|option| can_assign(value, option));
    }
    are_similar(value.key(), to.key())
}

fn are_similar(first: TypeKey, second: TypeKey) -> bool {
    first == second || (INTERCHANGEABLE.contains(&first) && INTERCHANGEABLE.contains(&second))
}
