//! Applying a patch document to a node graph.
//!
//! Operations run in document order against the same graph, so each one
//! sees the effects of the ones before it. A failed operation is reported to
//! the sink and recorded in the report; nothing is rolled back and the next
//! operation still runs. Only contract violations abort the call.

use crate::adapters::{Adapter, AdapterError, AdapterFactory, AdapterVariant, Mutation};
use crate::model::{ContractResolver, DefaultContractResolver, Node};
use crate::patch::errors::{OperationError, OperationFailure, PatchError};
use crate::patch::operation::{Operation, OperationType, PatchDocument};
use crate::patch::sink::ErrorSink;
use crate::pointer::{JsonPointer, PointerError};
use serde_json::Value;
use tracing::{debug, warn};

/// Outcome of every operation of one `apply` call, in document order.
///
/// A passing `test` counts as applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchReport {
    outcomes: Vec<Result<Mutation, OperationError>>,
}

impl PatchReport {
    pub fn outcomes(&self) -> &[Result<Mutation, OperationError>] {
        &self.outcomes
    }

    pub fn applied(&self) -> usize {
        self.count(|outcome| matches!(outcome, Ok(Mutation::Applied)))
    }

    pub fn suppressed(&self) -> usize {
        self.count(|outcome| matches!(outcome, Ok(Mutation::Suppressed)))
    }

    pub fn failed(&self) -> usize {
        self.count(Result::is_err)
    }

    pub fn errors(&self) -> impl Iterator<Item = &OperationError> {
        self.outcomes.iter().filter_map(|outcome| outcome.as_ref().err())
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&Result<Mutation, OperationError>) -> bool) -> usize {
        self.outcomes.iter().filter(|outcome| pred(outcome)).count()
    }
}

/// Apply `document` to `target` using the node-derived contract resolver.
pub fn apply(
    document: &PatchDocument,
    target: &mut Node,
    factory: &dyn AdapterFactory,
    sink: &mut dyn ErrorSink,
) -> Result<PatchReport, PatchError> {
    apply_with_resolver(document, target, factory, &DefaultContractResolver, sink)
}

pub fn apply_with_resolver(
    document: &PatchDocument,
    target: &mut Node,
    factory: &dyn AdapterFactory,
    resolver: &dyn ContractResolver,
    sink: &mut dyn ErrorSink,
) -> Result<PatchReport, PatchError> {
    if target.is_null() {
        return Err(PatchError::InvalidArgument { name: "target" });
    }

    let affected_type = target.type_name().to_string();
    let visitor = Visitor { factory, resolver };
    let mut report = PatchReport::default();

    for (index, operation) in document.operations().iter().enumerate() {
        debug!(index, op = %operation.op, path = %operation.path, "applying operation");

        match visitor.run(operation, target) {
            Ok(mutation) => report.outcomes.push(Ok(mutation)),
            Err(Interrupt::Contract(err)) => return Err(err),
            Err(Interrupt::Failed(reason)) => {
                warn!(index, op = %operation.op, path = %operation.path, %reason, "operation failed");
                let error = OperationError {
                    affected_type: affected_type.clone(),
                    index,
                    op: operation.op.clone(),
                    path: operation.path.clone(),
                    reason,
                };
                sink.report(error.clone());
                report.outcomes.push(Err(error));
            }
        }
    }

    Ok(report)
}

/// Why an operation stopped early.
enum Interrupt {
    /// Abort the whole call.
    Contract(PatchError),
    /// Fail this operation and move on.
    Failed(OperationFailure),
}

impl From<PatchError> for Interrupt {
    fn from(err: PatchError) -> Self {
        Interrupt::Contract(err)
    }
}

impl From<OperationFailure> for Interrupt {
    fn from(failure: OperationFailure) -> Self {
        Interrupt::Failed(failure)
    }
}

impl From<AdapterError> for Interrupt {
    fn from(err: AdapterError) -> Self {
        Interrupt::Failed(err.into())
    }
}

impl From<PointerError> for Interrupt {
    fn from(err: PointerError) -> Self {
        Interrupt::Failed(err.into())
    }
}

struct Visitor<'a> {
    factory: &'a dyn AdapterFactory,
    resolver: &'a dyn ContractResolver,
}

impl<'a> Visitor<'a> {
    fn run(&self, operation: &Operation, root: &mut Node) -> Result<Mutation, Interrupt> {
        let path = JsonPointer::parse(&operation.path)?;

        match operation.kind()? {
            OperationType::Add => self.add(root, &path, operation.required_value()?),
            OperationType::Remove => self.remove(root, &path),
            OperationType::Replace => self.replace(root, &path, operation.required_value()?),
            OperationType::Move => {
                let from = JsonPointer::parse(operation.required_from()?)?;
                let value = self.get(root, &from)?;
                let removed = self.remove(root, &from)?;
                let added = self.add(root, &path, &value)?;
                Ok(removed.combine(added))
            }
            OperationType::Copy => {
                let from = JsonPointer::parse(operation.required_from()?)?;
                let value = self.get(root, &from)?;
                self.add(root, &path, &value)
            }
            OperationType::Test => {
                let value = operation.required_value()?;
                let (parent, last) = self.locate(root, &path)?;
                self.adapter(parent, last)?
                    .try_test(parent, last, self.resolver, value)?;
                Ok(Mutation::Applied)
            }
        }
    }

    fn add(&self, root: &mut Node, path: &JsonPointer, value: &Value) -> Result<Mutation, Interrupt> {
        let (parent, last) = self.locate(root, path)?;
        let adapter = self.adapter(parent, last)?;
        Ok(adapter.try_add(parent, last, self.resolver, value)?)
    }

    fn remove(&self, root: &mut Node, path: &JsonPointer) -> Result<Mutation, Interrupt> {
        let (parent, last) = self.locate(root, path)?;
        let adapter = self.adapter(parent, last)?;
        Ok(adapter.try_remove(parent, last, self.resolver)?)
    }

    fn replace(
        &self,
        root: &mut Node,
        path: &JsonPointer,
        value: &Value,
    ) -> Result<Mutation, Interrupt> {
        let (parent, last) = self.locate(root, path)?;
        let adapter = self.adapter(parent, last)?;
        Ok(adapter.try_replace(parent, last, self.resolver, value)?)
    }

    fn get(&self, root: &mut Node, path: &JsonPointer) -> Result<Value, Interrupt> {
        let (parent, last) = self.locate(root, path)?;
        let adapter = self.adapter(parent, last)?;
        Ok(adapter.try_get(parent, last, self.resolver)?)
    }

    /// Walk to the parent of the last segment of `path`.
    fn locate<'t, 'p>(
        &self,
        root: &'t mut Node,
        path: &'p JsonPointer,
    ) -> Result<(&'t mut Node, &'p str), Interrupt> {
        let Some((last, parents)) = path.split_last() else {
            return Err(AdapterError::target_location_not_found(path.as_string()).into());
        };

        let mut current = root;
        for segment in parents {
            let adapter = self.adapter(current, segment)?;
            current = adapter.try_traverse(current, segment, self.resolver)?;
        }
        Ok((current, last))
    }

    /// Adapter for `target`. A null intermediate cannot hold `segment`, so
    /// it is reported as a missing location rather than a contract violation.
    fn adapter(&self, target: &Node, segment: &str) -> Result<AdapterVariant<'a>, Interrupt> {
        if target.is_null() {
            return Err(AdapterError::target_location_not_found(segment).into());
        }
        Ok(self.factory.create(target, self.resolver)?)
    }
}
