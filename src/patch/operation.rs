use crate::patch::errors::{OperationFailure, PatchError};
use crate::pointer::JsonPointer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl OperationType {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationType::Add => "add",
            OperationType::Remove => "remove",
            OperationType::Replace => "replace",
            OperationType::Move => "move",
            OperationType::Copy => "copy",
            OperationType::Test => "test",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a patch document, as it appears on the wire.
///
/// `op` stays a string so an unknown operation fails that operation alone
/// instead of the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub op: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// `None` only when the field is absent; `"value": null` is `Some(Null)`.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Operation {
    fn new(op: OperationType, path: &str) -> Self {
        Self {
            op: op.as_str().to_string(),
            path: path.to_string(),
            from: None,
            value: None,
        }
    }

    pub fn add(path: &str, value: Value) -> Self {
        Self {
            value: Some(value),
            ..Self::new(OperationType::Add, path)
        }
    }

    pub fn remove(path: &str) -> Self {
        Self::new(OperationType::Remove, path)
    }

    pub fn replace(path: &str, value: Value) -> Self {
        Self {
            value: Some(value),
            ..Self::new(OperationType::Replace, path)
        }
    }

    pub fn move_from(from: &str, path: &str) -> Self {
        Self {
            from: Some(from.to_string()),
            ..Self::new(OperationType::Move, path)
        }
    }

    pub fn copy_from(from: &str, path: &str) -> Self {
        Self {
            from: Some(from.to_string()),
            ..Self::new(OperationType::Copy, path)
        }
    }

    pub fn test(path: &str, value: Value) -> Self {
        Self {
            value: Some(value),
            ..Self::new(OperationType::Test, path)
        }
    }

    /// Parse the `op` field. Matching is case-insensitive.
    pub fn kind(&self) -> Result<OperationType, OperationFailure> {
        let kind = match self.op.to_ascii_lowercase().as_str() {
            "add" => OperationType::Add,
            "remove" => OperationType::Remove,
            "replace" => OperationType::Replace,
            "move" => OperationType::Move,
            "copy" => OperationType::Copy,
            "test" => OperationType::Test,
            _ => {
                return Err(OperationFailure::InvalidOperation {
                    op: self.op.clone(),
                })
            }
        };
        Ok(kind)
    }

    /// Check that the operation is well formed without applying it.
    pub fn check(&self) -> Result<OperationType, OperationFailure> {
        let kind = self.kind()?;
        JsonPointer::parse(&self.path)?;
        match kind {
            OperationType::Add | OperationType::Replace | OperationType::Test => {
                self.required_value()?;
            }
            OperationType::Move | OperationType::Copy => {
                JsonPointer::parse(self.required_from()?)?;
            }
            OperationType::Remove => {}
        }
        Ok(kind)
    }

    pub(crate) fn required_value(&self) -> Result<&Value, OperationFailure> {
        self.value.as_ref().ok_or_else(|| OperationFailure::MissingValue {
            op: self.op.clone(),
        })
    }

    pub(crate) fn required_from(&self) -> Result<&str, OperationFailure> {
        self.from
            .as_deref()
            .ok_or_else(|| OperationFailure::MissingFrom {
                op: self.op.clone(),
            })
    }
}

/// An ordered list of operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument {
    operations: Vec<Operation>,
}

impl PatchDocument {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    pub fn from_json_str(input: &str) -> Result<Self, PatchError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn push(&mut self, operation: Operation) -> &mut Self {
        self.operations.push(operation);
        self
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl From<Vec<Operation>> for PatchDocument {
    fn from(operations: Vec<Operation>) -> Self {
        Self::new(operations)
    }
}

impl FromIterator<Operation> for PatchDocument {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
