use crate::adapters::AdapterError;
use crate::pointer::PointerError;
use thiserror::Error;

/// Call-level failures. These abort the whole `apply` call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("Value cannot be null. (Parameter '{name}')")]
    InvalidArgument { name: &'static str },

    #[error("invalid patch document: {message}")]
    Parse { message: String },
}

impl From<serde_json::Error> for PatchError {
    fn from(err: serde_json::Error) -> Self {
        PatchError::Parse {
            message: err.to_string(),
        }
    }
}

/// Why a single operation failed. Processing moves on to the next one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationFailure {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    InvalidPath(#[from] PointerError),

    #[error("Invalid JsonPatch operation '{op}'.")]
    InvalidOperation { op: String },

    #[error("The '{op}' operation requires a 'value'.")]
    MissingValue { op: String },

    #[error("The '{op}' operation requires a 'from' path.")]
    MissingFrom { op: String },
}

/// A failed operation as delivered to an error sink.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{op} {path}: {reason}")]
pub struct OperationError {
    /// Type name of the object the patch was applied to.
    pub affected_type: String,
    /// Position of the operation in the document.
    pub index: usize,
    pub op: String,
    pub path: String,
    #[source]
    pub reason: OperationFailure,
}

impl OperationError {
    /// The message recorded against the affected type.
    pub fn message(&self) -> String {
        self.reason.to_string()
    }
}
