//! Patch Aware: JSON Patch application over typed object graphs
//!
//! Applies sequences of JSON Patch operations (add, remove, replace, move,
//! copy, test) to an in-memory [`Node`] graph. Each operation is resolved
//! against the actual shape of the graph: slot-bearing objects, indexable
//! lists, keyed maps or dynamic objects. Failures are reported per operation
//! and never abort the rest of the patch.
//!
//! # Architecture
//!
//! Every operation is routed through an [`Adapter`] chosen by an
//! [`AdapterFactory`] for the parent of the last path segment. The object
//! adapter enforces the slot table of an [`ObjectType`]: writability,
//! readability, type conversion and read-only markers.
//!
//! # Read-only markers
//!
//! - A type-level marker silently turns add, remove and replace into no-ops
//! - A slot-level marker silently ignores add, but rejects remove and
//!   replace with a "could not be updated" error
//!
//! Suppressed edits come back as [`Mutation::Suppressed`], so they stay
//! distinguishable from both applied edits and failures.
//!
//! # Example
//!
//! ```
//! use patch_aware::{apply, Node, ObjectNode, ObjectType, Operation, OperationError, PatchDocument};
//! use patch_aware::{ReadOnlyAwareAdapterFactory, SlotDef, SlotType};
//! use serde_json::json;
//!
//! let ty = ObjectType::builder("Customer")
//!     .slot(SlotDef::new("name", SlotType::String))
//!     .slot(SlotDef::new("id", SlotType::Int).read_only())
//!     .build();
//! let mut target = Node::from(ObjectNode::new(ty).with("id", 7));
//!
//! let document = PatchDocument::new(vec![
//!     Operation::replace("/name", json!("Ada")),
//!     Operation::add("/id", json!(8)),
//! ]);
//!
//! let mut failures = Vec::new();
//! let report = apply(
//!     &document,
//!     &mut target,
//!     &ReadOnlyAwareAdapterFactory::new(),
//!     &mut |err: OperationError| failures.push(err),
//! )
//! .unwrap();
//!
//! assert_eq!(report.applied(), 1);
//! assert_eq!(report.suppressed(), 1);
//! assert_eq!(target.to_json(), json!({"name": "Ada", "id": 7}));
//! ```

pub mod adapters;
pub mod model;
pub mod patch;
pub mod pointer;
pub mod schema;

// Re-exports
pub use adapters::{
    Adapter, AdapterError, AdapterFactory, AdapterVariant, DefaultAdapterFactory, IgnoreMarkers,
    MarkerPolicy, Mutation, ObjectAdapter, ReadOnlyAwareAdapterFactory, ReadOnlyPolicy,
};
pub use model::{
    convert, Contract, ContractResolver, ConversionError, DefaultContractResolver, KeyType, Node,
    ObjectNode, ObjectType, SlotDef, SlotType,
};
pub use patch::{
    apply, apply_with_error_map, apply_with_resolver, ErrorMap, ErrorSink, Operation,
    OperationError, OperationFailure, PatchDocument, PatchError, PatchReport,
};
pub use pointer::{JsonPointer, PointerError};
pub use schema::{load_from_path, load_from_str, ConfigError, Schema};
