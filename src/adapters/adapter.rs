use crate::adapters::errors::AdapterError;
use crate::model::{ContractResolver, Node};
use serde_json::Value;

/// Successful outcome of a mutating adapter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "Mutation tells whether the target actually changed"]
pub enum Mutation {
    /// The target was changed.
    Applied,
    /// A read-only marker accepted the edit without applying it.
    Suppressed,
}

impl Mutation {
    pub fn is_applied(self) -> bool {
        matches!(self, Mutation::Applied)
    }

    /// Outcome of two steps that together form one operation.
    pub fn combine(self, other: Mutation) -> Mutation {
        if self.is_applied() || other.is_applied() {
            Mutation::Applied
        } else {
            Mutation::Suppressed
        }
    }
}

pub type AdapterResult = Result<Mutation, AdapterError>;

/// Mutation strategy for one category of target shape.
///
/// Every method works on a single path segment relative to `target`; the
/// patch visitor is responsible for walking to the parent first.
pub trait Adapter {
    fn try_add(
        &self,
        target: &mut Node,
        segment: &str,
        resolver: &dyn ContractResolver,
        value: &Value,
    ) -> AdapterResult;

    fn try_remove(
        &self,
        target: &mut Node,
        segment: &str,
        resolver: &dyn ContractResolver,
    ) -> AdapterResult;

    fn try_replace(
        &self,
        target: &mut Node,
        segment: &str,
        resolver: &dyn ContractResolver,
        value: &Value,
    ) -> AdapterResult;

    fn try_get(
        &self,
        target: &Node,
        segment: &str,
        resolver: &dyn ContractResolver,
    ) -> Result<Value, AdapterError>;

    fn try_test(
        &self,
        target: &Node,
        segment: &str,
        resolver: &dyn ContractResolver,
        value: &Value,
    ) -> Result<(), AdapterError>;

    fn try_traverse<'t>(
        &self,
        target: &'t mut Node,
        segment: &str,
        resolver: &dyn ContractResolver,
    ) -> Result<&'t mut Node, AdapterError>;
}
