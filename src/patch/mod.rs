pub mod applicator;
pub mod errors;
pub mod operation;
pub mod sink;

pub use applicator::{apply, apply_with_resolver, PatchReport};
pub use errors::{OperationError, OperationFailure, PatchError};
pub use operation::{Operation, OperationType, PatchDocument};
pub use sink::{apply_with_error_map, error_key, ErrorMap, ErrorSink};
