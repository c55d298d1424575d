use crate::adapters::adapter::{Adapter, AdapterResult, Mutation};
use crate::adapters::errors::AdapterError;
use crate::model::{convert, ContractResolver, KeyType, MapNode, Node, SlotType};
use serde_json::Value;

/// Adapter for keyed maps, parameterized by the key and value types taken
/// from the map's contract.
#[derive(Debug, Clone, PartialEq)]
pub struct MapAdapter {
    key: KeyType,
    value: SlotType,
}

impl MapAdapter {
    pub fn new(key: KeyType, value: SlotType) -> Self {
        Self { key, value }
    }

    pub fn key_type(&self) -> KeyType {
        self.key
    }

    pub fn value_type(&self) -> &SlotType {
        &self.value
    }

    fn key(&self, segment: &str) -> Result<String, AdapterError> {
        self.key
            .convert(segment)
            .ok_or_else(|| AdapterError::invalid_path_segment(segment))
    }

    fn convert_value(&self, value: &Value) -> Result<Node, AdapterError> {
        convert(value, &self.value).map_err(|_| AdapterError::invalid_value_for_property(value))
    }
}

fn as_map<'t>(target: &'t Node, segment: &str) -> Result<&'t MapNode, AdapterError> {
    match target {
        Node::Map(map) => Ok(map),
        _ => Err(AdapterError::target_location_not_found(segment)),
    }
}

fn as_map_mut<'t>(target: &'t mut Node, segment: &str) -> Result<&'t mut MapNode, AdapterError> {
    match target {
        Node::Map(map) => Ok(map),
        _ => Err(AdapterError::target_location_not_found(segment)),
    }
}

impl Adapter for MapAdapter {
    fn try_add(
        &self,
        target: &mut Node,
        segment: &str,
        _resolver: &dyn ContractResolver,
        value: &Value,
    ) -> AdapterResult {
        let map = as_map_mut(target, segment)?;
        let key = self.key(segment)?;
        let converted = self.convert_value(value)?;
        map.insert(key, converted);
        Ok(Mutation::Applied)
    }

    fn try_remove(
        &self,
        target: &mut Node,
        segment: &str,
        _resolver: &dyn ContractResolver,
    ) -> AdapterResult {
        let map = as_map_mut(target, segment)?;
        let key = self.key(segment)?;
        map.entries_mut()
            .remove(&key)
            .map(|_| Mutation::Applied)
            .ok_or_else(|| AdapterError::target_location_not_found(segment))
    }

    fn try_replace(
        &self,
        target: &mut Node,
        segment: &str,
        _resolver: &dyn ContractResolver,
        value: &Value,
    ) -> AdapterResult {
        let map = as_map_mut(target, segment)?;
        let key = self.key(segment)?;
        let Some(entry) = map.entries_mut().get_mut(&key) else {
            return Err(AdapterError::target_location_not_found(segment));
        };
        *entry = self.convert_value(value)?;
        Ok(Mutation::Applied)
    }

    fn try_get(
        &self,
        target: &Node,
        segment: &str,
        _resolver: &dyn ContractResolver,
    ) -> Result<Value, AdapterError> {
        let map = as_map(target, segment)?;
        let key = self.key(segment)?;
        map.get(&key)
            .map(Node::to_json)
            .ok_or_else(|| AdapterError::target_location_not_found(segment))
    }

    fn try_test(
        &self,
        target: &Node,
        segment: &str,
        resolver: &dyn ContractResolver,
        value: &Value,
    ) -> Result<(), AdapterError> {
        let current = self.try_get(target, segment, resolver)?;
        let expected = self.convert_value(value)?.to_json();
        if current != expected {
            return Err(AdapterError::value_not_equal(&current, value, segment));
        }
        Ok(())
    }

    fn try_traverse<'t>(
        &self,
        target: &'t mut Node,
        segment: &str,
        _resolver: &dyn ContractResolver,
    ) -> Result<&'t mut Node, AdapterError> {
        let key = self.key(segment)?;
        as_map_mut(target, segment)?
            .entries_mut()
            .get_mut(&key)
            .ok_or_else(|| AdapterError::target_location_not_found(segment))
    }
}
