//! Where failed operations go.

use crate::adapters::AdapterFactory;
use crate::model::Node;
use crate::patch::applicator::{apply, PatchReport};
use crate::patch::errors::{OperationError, PatchError};
use crate::patch::operation::PatchDocument;
use std::collections::BTreeMap;

/// Receives every failed operation, in document order.
pub trait ErrorSink {
    fn report(&mut self, error: OperationError);
}

impl<F> ErrorSink for F
where
    F: FnMut(OperationError),
{
    fn report(&mut self, error: OperationError) {
        self(error)
    }
}

/// Error messages grouped by key, the way a model-validation layer
/// collects them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.entries.entry(key.into()).or_default().push(message.into());
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of messages across all keys.
    pub fn error_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, messages)| (key.as_str(), messages.as_slice()))
    }
}

impl ErrorSink for ErrorMap {
    fn report(&mut self, error: OperationError) {
        let message = error.message();
        self.add_error(error.affected_type, message);
    }
}

/// Key under which an error for `affected_type` is recorded.
pub fn error_key(prefix: &str, affected_type: &str) -> String {
    if prefix.is_empty() {
        affected_type.to_string()
    } else {
        format!("{prefix}.{affected_type}")
    }
}

/// Apply `document` and record every failure in `errors`, keyed by the
/// affected type name, optionally behind `prefix`.
pub fn apply_with_error_map(
    document: &PatchDocument,
    target: &mut Node,
    factory: &dyn AdapterFactory,
    errors: &mut ErrorMap,
    prefix: &str,
) -> Result<PatchReport, PatchError> {
    let mut sink = |error: OperationError| {
        errors.add_error(error_key(prefix, &error.affected_type), error.message());
    };
    apply(document, target, factory, &mut sink)
}
