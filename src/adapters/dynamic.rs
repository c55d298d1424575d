use crate::adapters::adapter::{Adapter, AdapterResult, Mutation};
use crate::adapters::errors::AdapterError;
use crate::model::{ContractResolver, DynamicNode, Node};
use serde_json::Value;

/// Adapter for dynamic objects. Members are untyped, so values are stored
/// as given.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicAdapter;

fn as_dynamic<'t>(target: &'t Node, segment: &str) -> Result<&'t DynamicNode, AdapterError> {
    match target {
        Node::Dynamic(dynamic) => Ok(dynamic),
        _ => Err(AdapterError::target_location_not_found(segment)),
    }
}

fn member_mut<'t>(target: &'t mut Node, segment: &str) -> Result<&'t mut Node, AdapterError> {
    let member = match target {
        Node::Dynamic(dynamic) => dynamic.members_mut().get_mut(segment),
        _ => None,
    };
    member.ok_or_else(|| AdapterError::target_location_not_found(segment))
}

/// Structural equality where numbers compare by value, so `1` equals `1.0`.
fn json_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| json_eq(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, a)| b.get(key).is_some_and(|b| json_eq(a, b)))
        }
        _ => left == right,
    }
}

impl Adapter for DynamicAdapter {
    fn try_add(
        &self,
        target: &mut Node,
        segment: &str,
        _resolver: &dyn ContractResolver,
        value: &Value,
    ) -> AdapterResult {
        match target {
            Node::Dynamic(dynamic) => {
                dynamic.insert(segment, Node::from_json(value));
                Ok(Mutation::Applied)
            }
            _ => Err(AdapterError::target_location_not_found(segment)),
        }
    }

    fn try_remove(
        &self,
        target: &mut Node,
        segment: &str,
        _resolver: &dyn ContractResolver,
    ) -> AdapterResult {
        let removed = match target {
            Node::Dynamic(dynamic) => dynamic.members_mut().remove(segment),
            _ => None,
        };
        removed
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
        *member_mut(target, segment)? = Node::from_json(value);
        Ok(Mutation::Applied)
    }

    fn try_get(
        &self,
        target: &Node,
        segment: &str,
        _resolver: &dyn ContractResolver,
    ) -> Result<Value, AdapterError> {
        as_dynamic(target, segment)?
            .get(segment)
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
        if !json_eq(&current, value) {
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
        member_mut(target, segment)
    }
}
