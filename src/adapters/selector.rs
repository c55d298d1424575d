//! Adapter selection: which mutation strategy applies to a target.

use crate::adapters::adapter::{Adapter, AdapterResult};
use crate::adapters::dynamic::DynamicAdapter;
use crate::adapters::errors::AdapterError;
use crate::adapters::list::ListAdapter;
use crate::adapters::map::MapAdapter;
use crate::adapters::object::ObjectAdapter;
use crate::adapters::policy::{IgnoreMarkers, MarkerPolicy};
use crate::model::{Contract, ContractResolver, KeyType, Node, SlotType};
use crate::patch::PatchError;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum AdapterKind {
    List,
    KeyedMap { key: KeyType, value: SlotType },
    Dynamic,
    Object,
}

/// Pick the adapter kind for `target`.
///
/// A list node always gets the list adapter, whatever its contract says.
/// After that the contract decides: dictionary, then dynamic, and anything
/// else is treated as a slot-bearing object.
pub fn select(target: &Node, contract: Option<&Contract>) -> Result<AdapterKind, PatchError> {
    if target.is_null() {
        return Err(PatchError::InvalidArgument { name: "target" });
    }
    let Some(contract) = contract else {
        return Err(PatchError::InvalidArgument { name: "contract" });
    };

    let kind = match (target, contract) {
        (Node::List(_), _) => AdapterKind::List,
        (_, Contract::Dictionary { key, value }) => AdapterKind::KeyedMap {
            key: *key,
            value: value.clone(),
        },
        (_, Contract::Dynamic) => AdapterKind::Dynamic,
        _ => AdapterKind::Object,
    };
    Ok(kind)
}

/// Concrete adapter produced by a factory. The object variant borrows the
/// factory's object adapter so callers can plug in their own.
pub enum AdapterVariant<'a> {
    List(ListAdapter),
    KeyedMap(MapAdapter),
    Dynamic(DynamicAdapter),
    Object(&'a dyn Adapter),
}

impl AdapterVariant<'_> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AdapterVariant::List(_) => "list",
            AdapterVariant::KeyedMap(_) => "map",
            AdapterVariant::Dynamic(_) => "dynamic",
            AdapterVariant::Object(_) => "object",
        }
    }

    fn inner(&self) -> &dyn Adapter {
        match self {
            AdapterVariant::List(adapter) => adapter,
            AdapterVariant::KeyedMap(adapter) => adapter,
            AdapterVariant::Dynamic(adapter) => adapter,
            AdapterVariant::Object(adapter) => *adapter,
        }
    }
}

impl std::fmt::Debug for AdapterVariant<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AdapterVariant").field(&self.kind_name()).finish()
    }
}

impl Adapter for AdapterVariant<'_> {
    fn try_add(
        &self,
        target: &mut Node,
        segment: &str,
        resolver: &dyn ContractResolver,
        value: &Value,
    ) -> AdapterResult {
        self.inner().try_add(target, segment, resolver, value)
    }

    fn try_remove(
        &self,
        target: &mut Node,
        segment: &str,
        resolver: &dyn ContractResolver,
    ) -> AdapterResult {
        self.inner().try_remove(target, segment, resolver)
    }

    fn try_replace(
        &self,
        target: &mut Node,
        segment: &str,
        resolver: &dyn ContractResolver,
        value: &Value,
    ) -> AdapterResult {
        self.inner().try_replace(target, segment, resolver, value)
    }

    fn try_get(
        &self,
        target: &Node,
        segment: &str,
        resolver: &dyn ContractResolver,
    ) -> Result<Value, AdapterError> {
        self.inner().try_get(target, segment, resolver)
    }

    fn try_test(
        &self,
        target: &Node,
        segment: &str,
        resolver: &dyn ContractResolver,
        value: &Value,
    ) -> Result<(), AdapterError> {
        self.inner().try_test(target, segment, resolver, value)
    }

    fn try_traverse<'t>(
        &self,
        target: &'t mut Node,
        segment: &str,
        resolver: &dyn ContractResolver,
    ) -> Result<&'t mut Node, AdapterError> {
        self.inner().try_traverse(target, segment, resolver)
    }
}

/// Builds adapters for targets met while applying a patch.
///
/// Only the object adapter is required; list, map and dynamic selection is
/// shared by every factory unless `create` is overridden.
pub trait AdapterFactory {
    fn object_adapter(&self) -> &dyn Adapter;

    fn create<'f>(
        &'f self,
        target: &Node,
        resolver: &dyn ContractResolver,
    ) -> Result<AdapterVariant<'f>, PatchError> {
        let contract = resolver.resolve_contract(target);
        let variant = match select(target, contract.as_ref())? {
            AdapterKind::List => AdapterVariant::List(ListAdapter),
            AdapterKind::KeyedMap { key, value } => {
                AdapterVariant::KeyedMap(MapAdapter::new(key, value))
            }
            AdapterKind::Dynamic => AdapterVariant::Dynamic(DynamicAdapter),
            AdapterKind::Object => AdapterVariant::Object(self.object_adapter()),
        };
        Ok(variant)
    }
}

/// Factory whose object adapter ignores read-only markers.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAdapterFactory {
    object: ObjectAdapter<IgnoreMarkers>,
}

impl DefaultAdapterFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AdapterFactory for DefaultAdapterFactory {
    fn object_adapter(&self) -> &dyn Adapter {
        &self.object
    }
}

/// Factory whose object adapter honours read-only markers.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadOnlyAwareAdapterFactory {
    object: ObjectAdapter<MarkerPolicy>,
}

impl ReadOnlyAwareAdapterFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AdapterFactory for ReadOnlyAwareAdapterFactory {
    fn object_adapter(&self) -> &dyn Adapter {
        &self.object
    }
}
