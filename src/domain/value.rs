use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{FieldDefinition, FieldKind};

/// Current values keyed by field key, in schema declaration order.
pub type Values = IndexMap<String, FieldValue>;

/// Error messages keyed by field key. An absent key means "no error".
pub type ErrorMap = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn empty_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Checkbox => FieldValue::Bool(false),
            kind if kind.is_multi_value() => FieldValue::List(Vec::new()),
            _ => FieldValue::Text(String::new()),
        }
    }

    /// Default value for a field: its declared default coerced to the field's
    /// kind, padded to the minimum number of list slots.
    pub fn default_for(field: &FieldDefinition) -> Self {
        let mut value = field
            .default
            .as_ref()
            .map(|raw| FieldValue::from_json(raw, field.kind))
            .unwrap_or_else(|| FieldValue::empty_for(field.kind));
        value.pad_to(field.list_bounds().min);
        value
    }

    /// Coerce a JSON value to the shape of the given kind.
    pub fn from_json(raw: &Value, kind: FieldKind) -> Self {
        match kind {
            FieldKind::Checkbox => FieldValue::Bool(match raw {
                Value::Bool(flag) => *flag,
                Value::String(text) => is_truthy(text),
                Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
                _ => false,
            }),
            kind if kind.is_multi_value() => FieldValue::List(match raw {
                Value::Array(items) => items.iter().map(scalar_to_string).collect(),
                Value::Null => Vec::new(),
                other => vec![scalar_to_string(other)],
            }),
            _ => FieldValue::Text(scalar_to_string(raw)),
        }
    }

    /// Reshape a written value to fit `field`: checkboxes hold a flag,
    /// multi-value kinds hold a list padded to `list.min`, anything else
    /// holds text.
    pub fn conform_to(self, field: &FieldDefinition) -> Self {
        let mut value = if field.kind == FieldKind::Checkbox {
            FieldValue::Bool(match self {
                FieldValue::Bool(flag) => flag,
                FieldValue::Text(text) => is_truthy(&text),
                list => !list.is_blank(),
            })
        } else if field.kind.is_multi_value() {
            FieldValue::List(match self {
                FieldValue::List(items) => items,
                FieldValue::Text(text) if text.trim().is_empty() => Vec::new(),
                scalar => vec![scalar.to_string()],
            })
        } else {
            match self {
                text @ FieldValue::Text(_) => text,
                other => FieldValue::Text(other.to_string()),
            }
        };
        value.pad_to(field.list_bounds().min);
        value
    }

    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Empty or falsy: blank text, an unchecked box, or a list without any
    /// non-blank entry.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Bool(flag) => !flag,
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::List(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether the value equals `literal`; lists match when any entry does.
    pub fn matches_literal(&self, literal: &str) -> bool {
        match self {
            FieldValue::Bool(flag) => literal == if *flag { "true" } else { "false" },
            FieldValue::Text(text) => text == literal,
            FieldValue::List(items) => items.iter().any(|item| item == literal),
        }
    }

    pub(crate) fn pad_to(&mut self, min: usize) {
        if let FieldValue::List(items) = self {
            while items.len() < min {
                items.push(String::new());
            }
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(flag) => write!(f, "{flag}"),
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::List(items) => {
                let mut first = true;
                for item in items.iter().filter(|item| !item.trim().is_empty()) {
                    if !first {
                        f.write_str(", ")?;
                    }
                    f.write_str(item)?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

fn is_truthy(text: &str) -> bool {
    matches!(text.trim(), "true" | "yes" | "1")
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}
