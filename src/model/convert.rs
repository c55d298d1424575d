//! Coercion of raw JSON values into typed nodes.

use crate::model::node::{ListNode, MapNode, Node, ObjectNode};
use crate::model::types::{KeyType, SlotType};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("cannot convert {found} to {expected}")]
    Mismatch { expected: String, found: &'static str },

    #[error("null is not a valid {expected}")]
    NullNotAllowed { expected: String },

    #[error("invalid key '{key}' for {expected} keys")]
    InvalidKey { key: String, expected: KeyType },

    #[error("at {path}: {source}")]
    Context {
        path: String,
        #[source]
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    fn mismatch(expected: &SlotType, value: &Value) -> Self {
        Self::Mismatch {
            expected: expected.to_string(),
            found: json_kind(value),
        }
    }

    #[must_use]
    fn with_segment(self, segment: &str) -> Self {
        match self {
            Self::Context { path, source } => Self::Context {
                path: format!("{segment}/{path}"),
                source,
            },
            source => Self::Context {
                path: segment.to_string(),
                source: Box::new(source),
            },
        }
    }

    /// Innermost error, without path context.
    pub fn leaf(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.leaf(),
            _ => self,
        }
    }
}

/// Convert `value` to a node of type `ty`.
///
/// Numbers and booleans convert to strings, numeric strings convert to
/// numbers, and integral floats convert to ints. Null converts to
/// [`Node::Null`] for every type except non-nullable value types. Unknown
/// members of an object value are ignored and missing ones keep their zero
/// value.
pub fn convert(value: &Value, ty: &SlotType) -> Result<Node, ConversionError> {
    if value.is_null() {
        return if ty.is_value_type() {
            Err(ConversionError::NullNotAllowed {
                expected: ty.to_string(),
            })
        } else {
            Ok(Node::Null)
        };
    }

    match ty {
        SlotType::Nullable(inner) => convert(value, inner),
        SlotType::Bool => match value {
            Value::Bool(b) => Ok(Node::Bool(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Node::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Node::Bool(false)),
            _ => Err(ConversionError::mismatch(ty, value)),
        },
        SlotType::Int => match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(Node::Int(i));
                }
                if n.is_u64() {
                    return Err(ConversionError::mismatch(ty, value));
                }
                // i64::MAX as f64 rounds up to 2^63, which does not fit.
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                        Ok(Node::Int(f as i64))
                    }
                    _ => Err(ConversionError::mismatch(ty, value)),
                }
            }
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Node::Int)
                .map_err(|_| ConversionError::mismatch(ty, value)),
            _ => Err(ConversionError::mismatch(ty, value)),
        },
        SlotType::Float => match value {
            Value::Number(n) => n
                .as_f64()
                .map(Node::Float)
                .ok_or_else(|| ConversionError::mismatch(ty, value)),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Node::Float(f)),
                _ => Err(ConversionError::mismatch(ty, value)),
            },
            _ => Err(ConversionError::mismatch(ty, value)),
        },
        SlotType::String => match value {
            Value::String(s) => Ok(Node::String(s.clone())),
            Value::Number(n) => Ok(Node::String(n.to_string())),
            Value::Bool(b) => Ok(Node::String(b.to_string())),
            _ => Err(ConversionError::mismatch(ty, value)),
        },
        SlotType::Any => Ok(Node::from_json(value)),
        SlotType::Dynamic => match value {
            Value::Object(_) => Ok(Node::from_json(value)),
            _ => Err(ConversionError::mismatch(ty, value)),
        },
        SlotType::List(item) => match value {
            Value::Array(values) => {
                let mut items = Vec::with_capacity(values.len());
                for (index, value) in values.iter().enumerate() {
                    let node =
                        convert(value, item).map_err(|err| err.with_segment(&index.to_string()))?;
                    items.push(node);
                }
                Ok(Node::List(ListNode::new((**item).clone(), items)))
            }
            _ => Err(ConversionError::mismatch(ty, value)),
        },
        SlotType::Map { key, value: item } => match value {
            Value::Object(members) => {
                let mut map = MapNode::new(*key, (**item).clone());
                for (raw_key, member) in members {
                    let canonical =
                        key.convert(raw_key)
                            .ok_or_else(|| ConversionError::InvalidKey {
                                key: raw_key.clone(),
                                expected: *key,
                            })?;
                    let node = convert(member, item).map_err(|err| err.with_segment(raw_key))?;
                    map.insert(canonical, node);
                }
                Ok(Node::Map(map))
            }
            _ => Err(ConversionError::mismatch(ty, value)),
        },
        SlotType::Object(object_type) => match value {
            Value::Object(members) => {
                let mut object = ObjectNode::new(object_type.clone());
                for (name, member) in members {
                    let Some(index) = object_type.find_slot(name) else {
                        continue;
                    };
                    let slot_ty = &object_type.slots()[index].ty;
                    let node = convert(member, slot_ty).map_err(|err| err.with_segment(name))?;
                    if let Some(slot) = object.value_mut(index) {
                        *slot = node;
                    }
                }
                Ok(Node::Object(object))
            }
            _ => Err(ConversionError::mismatch(ty, value)),
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
