//! Contract descriptions: how a node's type is shaped for patching.

use crate::model::node::Node;
use crate::model::types::{KeyType, ObjectType, SlotDef, SlotType};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Contract {
    Primitive,
    Array,
    Dictionary { key: KeyType, value: SlotType },
    Dynamic,
    Object(Arc<ObjectType>),
}

/// Describes nodes to the adapter selector.
///
/// Returning `None` means the node cannot be described at all, which the
/// selector treats as a contract violation.
pub trait ContractResolver {
    fn resolve_contract(&self, node: &Node) -> Option<Contract>;
}

/// Derives the contract from the node itself. Null has no contract.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultContractResolver;

impl ContractResolver for DefaultContractResolver {
    fn resolve_contract(&self, node: &Node) -> Option<Contract> {
        let contract = match node {
            Node::Null => return None,
            Node::Bool(_) | Node::Int(_) | Node::Float(_) | Node::String(_) => Contract::Primitive,
            Node::List(_) => Contract::Array,
            Node::Map(map) => Contract::Dictionary {
                key: map.key_type(),
                value: map.value_type().clone(),
            },
            Node::Dynamic(_) => Contract::Dynamic,
            Node::Object(object) => Contract::Object(object.object_type().clone()),
        };
        Some(contract)
    }
}

/// A segment resolved against an object contract.
#[derive(Debug, Clone)]
pub struct Slot {
    pub owner: Arc<ObjectType>,
    pub index: usize,
}

impl Slot {
    pub fn def(&self) -> &SlotDef {
        &self.owner.slots()[self.index]
    }
}

/// Declared object type of `target`, if its contract describes one.
pub fn declared_type(target: &Node, resolver: &dyn ContractResolver) -> Option<Arc<ObjectType>> {
    match resolver.resolve_contract(target) {
        Some(Contract::Object(ty)) => Some(ty),
        _ => None,
    }
}

/// Property resolution: find the slot `segment` names on `ty`.
pub fn resolve_slot(ty: &Arc<ObjectType>, segment: &str) -> Option<Slot> {
    ty.find_slot(segment).map(|index| Slot {
        owner: ty.clone(),
        index,
    })
}
