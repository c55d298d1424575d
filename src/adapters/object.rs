//! Adapter for slot-bearing objects.
//!
//! Add, remove and replace run the same sequence of checks:
//!
//! 1. object-level read-only check on the declared type (silent no-op),
//! 2. segment resolution (`TargetLocationNotFound`),
//! 3. slot-level checks: a read-only slot swallows an add but rejects a
//!    remove or replace with `CannotUpdateProperty`, as does a slot that is
//!    not writable,
//! 4. conversion of the incoming value (`InvalidValueForProperty`), or the
//!    slot's zero value for a remove,
//! 5. the write itself.
//!
//! Get, test and traverse are not gated by the policy.

use crate::adapters::adapter::{Adapter, AdapterResult, Mutation};
use crate::adapters::errors::AdapterError;
use crate::adapters::policy::{MarkerPolicy, ReadOnlyPolicy};
use crate::model::contract::{declared_type, resolve_slot, Slot};
use crate::model::{convert, ContractResolver, Node, ObjectType};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectAdapter<P = MarkerPolicy> {
    policy: P,
}

impl<P: ReadOnlyPolicy> ObjectAdapter<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    fn is_object_protected(&self, ty: Option<&Arc<ObjectType>>, segment: &str, op: &str) -> bool {
        match ty {
            Some(ty) if self.policy.is_object_protected(ty) => {
                debug!(object = ty.name(), segment, op, "read-only object, edit suppressed");
                true
            }
            _ => false,
        }
    }
}

fn resolve(ty: Option<&Arc<ObjectType>>, segment: &str) -> Result<Slot, AdapterError> {
    ty.and_then(|ty| resolve_slot(ty, segment))
        .ok_or_else(|| AdapterError::target_location_not_found(segment))
}

fn slot_value<'t>(target: &'t Node, slot: &Slot, segment: &str) -> Result<&'t Node, AdapterError> {
    target
        .as_object()
        .and_then(|object| object.value(slot.index))
        .ok_or_else(|| AdapterError::target_location_not_found(segment))
}

fn slot_value_mut<'t>(
    target: &'t mut Node,
    slot: &Slot,
    segment: &str,
) -> Result<&'t mut Node, AdapterError> {
    let value = match target {
        Node::Object(object) => object.value_mut(slot.index),
        _ => None,
    };
    value.ok_or_else(|| AdapterError::target_location_not_found(segment))
}

impl<P: ReadOnlyPolicy> Adapter for ObjectAdapter<P> {
    fn try_add(
        &self,
        target: &mut Node,
        segment: &str,
        resolver: &dyn ContractResolver,
        value: &Value,
    ) -> AdapterResult {
        let ty = declared_type(target, resolver);
        if self.is_object_protected(ty.as_ref(), segment, "add") {
            return Ok(Mutation::Suppressed);
        }

        let slot = resolve(ty.as_ref(), segment)?;
        let def = slot.def();
        if self.policy.is_slot_protected(def) {
            debug!(slot = %def.name, "read-only slot, add suppressed");
            return Ok(Mutation::Suppressed);
        }
        if !def.writable {
            return Err(AdapterError::cannot_update_property(segment));
        }

        let converted =
            convert(value, &def.ty).map_err(|_| AdapterError::invalid_value_for_property(value))?;
        *slot_value_mut(target, &slot, segment)? = converted;
        Ok(Mutation::Applied)
    }

    fn try_remove(
        &self,
        target: &mut Node,
        segment: &str,
        resolver: &dyn ContractResolver,
    ) -> AdapterResult {
        let ty = declared_type(target, resolver);
        if self.is_object_protected(ty.as_ref(), segment, "remove") {
            return Ok(Mutation::Suppressed);
        }

        let slot = resolve(ty.as_ref(), segment)?;
        let def = slot.def();
        if !def.writable || self.policy.is_slot_protected(def) {
            return Err(AdapterError::cannot_update_property(segment));
        }

        *slot_value_mut(target, &slot, segment)? = def.ty.zero_value();
        Ok(Mutation::Applied)
    }

    fn try_replace(
        &self,
        target: &mut Node,
        segment: &str,
        resolver: &dyn ContractResolver,
        value: &Value,
    ) -> AdapterResult {
        let ty = declared_type(target, resolver);
        if self.is_object_protected(ty.as_ref(), segment, "replace") {
            return Ok(Mutation::Suppressed);
        }

        let slot = resolve(ty.as_ref(), segment)?;
        let def = slot.def();
        if !def.writable || self.policy.is_slot_protected(def) {
            return Err(AdapterError::cannot_update_property(segment));
        }

        let converted =
            convert(value, &def.ty).map_err(|_| AdapterError::invalid_value_for_property(value))?;
        *slot_value_mut(target, &slot, segment)? = converted;
        Ok(Mutation::Applied)
    }

    fn try_get(
        &self,
        target: &Node,
        segment: &str,
        resolver: &dyn ContractResolver,
    ) -> Result<Value, AdapterError> {
        let slot = resolve(declared_type(target, resolver).as_ref(), segment)?;
        if !slot.def().readable {
            return Err(AdapterError::cannot_read_property(segment));
        }
        Ok(slot_value(target, &slot, segment)?.to_json())
    }

    fn try_test(
        &self,
        target: &Node,
        segment: &str,
        resolver: &dyn ContractResolver,
        value: &Value,
    ) -> Result<(), AdapterError> {
        let slot = resolve(declared_type(target, resolver).as_ref(), segment)?;
        let def = slot.def();
        if !def.readable {
            return Err(AdapterError::cannot_read_property(segment));
        }

        let current = slot_value(target, &slot, segment)?.to_json();
        let expected = convert(value, &def.ty)
            .map_err(|_| AdapterError::invalid_value_for_property(value))?
            .to_json();
        if current != expected {
            return Err(AdapterError::value_not_equal(&current, value, segment));
        }
        Ok(())
    }

    fn try_traverse<'t>(
        &self,
        target: &'t mut Node,
        segment: &str,
        resolver: &dyn ContractResolver,
    ) -> Result<&'t mut Node, AdapterError> {
        let slot = resolve(declared_type(target, resolver).as_ref(), segment)?;
        slot_value_mut(target, &slot, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::policy::IgnoreMarkers;
    use crate::model::{DefaultContractResolver, ObjectNode, SlotDef, SlotType};
    use serde_json::json;

    fn account_type(read_only: bool) -> Arc<ObjectType> {
        let mut builder = ObjectType::builder("Account")
            .slot(SlotDef::new("name", SlotType::String))
            .slot(SlotDef::new("owner", SlotType::String).read_only())
            .slot(SlotDef::new("id", SlotType::Int).with_writable(false))
            .slot(SlotDef::new("balance", SlotType::Int))
            .slot(SlotDef::new("limit", SlotType::nullable(SlotType::Int)))
            .slot(SlotDef::new("secret", SlotType::String).with_readable(false));
        if read_only {
            builder = builder.read_only();
        }
        builder.build()
    }

    fn account(read_only: bool) -> Node {
        Node::Object(
            ObjectNode::new(account_type(read_only))
                .with("name", "main")
                .with("owner", "ada")
                .with("id", 7)
                .with("balance", 100)
                .with("limit", 50),
        )
    }

    fn value_of<'a>(node: &'a Node, name: &str) -> &'a Node {
        node.as_object().and_then(|o| o.get(name)).unwrap()
    }

    const RESOLVER: DefaultContractResolver = DefaultContractResolver;

    #[test]
    fn read_only_object_swallows_every_edit() {
        let adapter = ObjectAdapter::new(MarkerPolicy);
        let mut node = account(true);
        let before = node.clone();

        let add = adapter.try_add(&mut node, "name", &RESOLVER, &json!("x"));
        let remove = adapter.try_remove(&mut node, "balance", &RESOLVER);
        let replace = adapter.try_replace(&mut node, "balance", &RESOLVER, &json!("bad"));
        let missing = adapter.try_replace(&mut node, "nope", &RESOLVER, &json!(1));

        assert_eq!(add, Ok(Mutation::Suppressed));
        assert_eq!(remove, Ok(Mutation::Suppressed));
        assert_eq!(replace, Ok(Mutation::Suppressed));
        assert_eq!(missing, Ok(Mutation::Suppressed));
        assert_eq!(node, before);
    }

    #[test]
    fn read_only_slot_suppresses_add_but_rejects_replace_and_remove() {
        let adapter = ObjectAdapter::new(MarkerPolicy);
        let mut node = account(false);

        assert_eq!(
            adapter.try_add(&mut node, "owner", &RESOLVER, &json!("bob")),
            Ok(Mutation::Suppressed)
        );
        assert_eq!(
            adapter.try_replace(&mut node, "owner", &RESOLVER, &json!("bob")),
            Err(AdapterError::cannot_update_property("owner"))
        );
        assert_eq!(
            adapter.try_remove(&mut node, "owner", &RESOLVER),
            Err(AdapterError::cannot_update_property("owner"))
        );
        assert_eq!(value_of(&node, "owner"), &Node::from("ada"));
    }

    #[test]
    fn read_only_slot_add_skips_conversion() {
        let ty = ObjectType::builder("Meter")
            .slot(SlotDef::new("reading", SlotType::Int).read_only())
            .build();
        let mut node = Node::Object(ObjectNode::new(ty));
        let adapter = ObjectAdapter::new(MarkerPolicy);

        let result = adapter.try_add(&mut node, "reading", &RESOLVER, &json!("not a number"));
        assert_eq!(result, Ok(Mutation::Suppressed));
    }

    #[test]
    fn replace_converts_or_reports_invalid_value() {
        let adapter = ObjectAdapter::new(MarkerPolicy);
        let mut node = account(false);

        assert_eq!(
            adapter.try_replace(&mut node, "balance", &RESOLVER, &json!("250")),
            Ok(Mutation::Applied)
        );
        assert_eq!(value_of(&node, "balance"), &Node::Int(250));

        assert_eq!(
            adapter.try_replace(&mut node, "balance", &RESOLVER, &json!("lots")),
            Err(AdapterError::InvalidValueForProperty {
                value: "lots".to_string()
            })
        );
        assert_eq!(value_of(&node, "balance"), &Node::Int(250));
    }

    #[test]
    fn remove_resets_to_zero_value() {
        let adapter = ObjectAdapter::new(MarkerPolicy);
        let mut node = account(false);

        assert_eq!(adapter.try_remove(&mut node, "balance", &RESOLVER), Ok(Mutation::Applied));
        assert_eq!(adapter.try_remove(&mut node, "limit", &RESOLVER), Ok(Mutation::Applied));
        assert_eq!(adapter.try_remove(&mut node, "name", &RESOLVER), Ok(Mutation::Applied));

        assert_eq!(value_of(&node, "balance"), &Node::Int(0));
        assert_eq!(value_of(&node, "limit"), &Node::Null);
        assert_eq!(value_of(&node, "name"), &Node::Null);
    }

    #[test]
    fn non_writable_slot_cannot_be_updated() {
        let adapter = ObjectAdapter::new(MarkerPolicy);
        let mut node = account(false);

        for result in [
            adapter.try_add(&mut node, "id", &RESOLVER, &json!(8)),
            adapter.try_replace(&mut node, "id", &RESOLVER, &json!(8)),
            adapter.try_remove(&mut node, "id", &RESOLVER),
        ] {
            assert_eq!(result, Err(AdapterError::cannot_update_property("id")));
        }
        assert_eq!(value_of(&node, "id"), &Node::Int(7));
    }

    #[test]
    fn unknown_segment_is_not_found() {
        let adapter = ObjectAdapter::new(MarkerPolicy);
        let mut node = account(false);
        let expected = Err(AdapterError::target_location_not_found("colour"));

        assert_eq!(adapter.try_add(&mut node, "colour", &RESOLVER, &json!(1)), expected);
        assert_eq!(adapter.try_remove(&mut node, "colour", &RESOLVER), expected);
        assert_eq!(adapter.try_replace(&mut node, "colour", &RESOLVER, &json!(1)), expected);
    }

    #[test]
    fn ignoring_markers_restores_plain_semantics() {
        let adapter = ObjectAdapter::new(IgnoreMarkers);
        let mut node = account(true);

        assert_eq!(
            adapter.try_replace(&mut node, "owner", &RESOLVER, &json!("bob")),
            Ok(Mutation::Applied)
        );
        assert_eq!(value_of(&node, "owner"), &Node::from("bob"));
    }

    #[test]
    fn get_and_test_respect_readability() {
        let adapter = ObjectAdapter::new(MarkerPolicy);
        let node = account(false);

        assert_eq!(adapter.try_get(&node, "Balance", &RESOLVER), Ok(json!(100)));
        assert_eq!(
            adapter.try_get(&node, "secret", &RESOLVER),
            Err(AdapterError::cannot_read_property("secret"))
        );
        assert_eq!(adapter.try_test(&node, "balance", &RESOLVER, &json!("100")), Ok(()));
        assert!(matches!(
            adapter.try_test(&node, "balance", &RESOLVER, &json!(99)),
            Err(AdapterError::ValueNotEqualToTestValue { .. })
        ));
    }

    #[test]
    fn traverse_reaches_nested_value() {
        let adapter = ObjectAdapter::new(MarkerPolicy);
        let mut node = account(true);

        let child = adapter.try_traverse(&mut node, "name", &RESOLVER).unwrap();
        assert_eq!(child, &Node::from("main"));
    }
}
