use crate::adapters::adapter::{Adapter, AdapterResult, Mutation};
use crate::adapters::errors::AdapterError;
use crate::model::{convert, ContractResolver, ListNode, Node};
use serde_json::Value;

/// Adapter for ordered, indexable lists. `-` addresses the end of the list.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Index(usize),
    End,
}

fn parse_position(segment: &str) -> Result<Position, AdapterError> {
    if segment == "-" {
        return Ok(Position::End);
    }
    segment
        .parse::<usize>()
        .map(Position::Index)
        .map_err(|_| AdapterError::invalid_index_value(segment))
}

/// Index of an existing element; `-` means the last one.
fn existing_index(segment: &str, len: usize) -> Result<usize, AdapterError> {
    match parse_position(segment)? {
        Position::Index(index) if index < len => Ok(index),
        Position::End if len > 0 => Ok(len - 1),
        _ => Err(AdapterError::index_out_of_bounds(segment)),
    }
}

fn as_list<'t>(target: &'t Node, segment: &str) -> Result<&'t ListNode, AdapterError> {
    match target {
        Node::List(list) => Ok(list),
        _ => Err(AdapterError::target_location_not_found(segment)),
    }
}

fn as_list_mut<'t>(target: &'t mut Node, segment: &str) -> Result<&'t mut ListNode, AdapterError> {
    match target {
        Node::List(list) => Ok(list),
        _ => Err(AdapterError::target_location_not_found(segment)),
    }
}

impl Adapter for ListAdapter {
    fn try_add(
        &self,
        target: &mut Node,
        segment: &str,
        _resolver: &dyn ContractResolver,
        value: &Value,
    ) -> AdapterResult {
        let list = as_list_mut(target, segment)?;
        let position = parse_position(segment)?;
        if let Position::Index(index) = position {
            if index > list.items().len() {
                return Err(AdapterError::index_out_of_bounds(segment));
            }
        }

        let item = convert(value, list.item_type())
            .map_err(|_| AdapterError::invalid_value_for_property(value))?;
        match position {
            Position::Index(index) => list.items_mut().insert(index, item),
            Position::End => list.items_mut().push(item),
        }
        Ok(Mutation::Applied)
    }

    fn try_remove(
        &self,
        target: &mut Node,
        segment: &str,
        _resolver: &dyn ContractResolver,
    ) -> AdapterResult {
        let list = as_list_mut(target, segment)?;
        let index = existing_index(segment, list.items().len())?;
        list.items_mut().remove(index);
        Ok(Mutation::Applied)
    }

    fn try_replace(
        &self,
        target: &mut Node,
        segment: &str,
        _resolver: &dyn ContractResolver,
        value: &Value,
    ) -> AdapterResult {
        let list = as_list_mut(target, segment)?;
        let index = existing_index(segment, list.items().len())?;
        let item = convert(value, list.item_type())
            .map_err(|_| AdapterError::invalid_value_for_property(value))?;
        list.items_mut()[index] = item;
        Ok(Mutation::Applied)
    }

    fn try_get(
        &self,
        target: &Node,
        segment: &str,
        _resolver: &dyn ContractResolver,
    ) -> Result<Value, AdapterError> {
        let list = as_list(target, segment)?;
        let index = existing_index(segment, list.items().len())?;
        Ok(list.items()[index].to_json())
    }

    fn try_test(
        &self,
        target: &Node,
        segment: &str,
        _resolver: &dyn ContractResolver,
        value: &Value,
    ) -> Result<(), AdapterError> {
        let list = as_list(target, segment)?;
        let index = existing_index(segment, list.items().len())?;
        let current = list.items()[index].to_json();
        let expected = convert(value, list.item_type())
            .map_err(|_| AdapterError::invalid_value_for_property(value))?
            .to_json();
        if current != expected {
            return Err(AdapterError::value_not_equal_at(&current, value, index));
        }
        Ok(())
    }

    fn try_traverse<'t>(
        &self,
        target: &'t mut Node,
        segment: &str,
        _resolver: &dyn ContractResolver,
    ) -> Result<&'t mut Node, AdapterError> {
        let list = as_list_mut(target, segment)?;
        let Position::Index(index) = parse_position(segment)? else {
            return Err(AdapterError::invalid_index_value(segment));
        };
        list.items_mut()
            .get_mut(index)
            .ok_or_else(|| AdapterError::index_out_of_bounds(segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DefaultContractResolver, SlotType};
    use serde_json::json;

    const RESOLVER: DefaultContractResolver = DefaultContractResolver;

    fn numbers() -> Node {
        Node::List(ListNode::new(
            SlotType::Int,
            vec![Node::Int(1), Node::Int(2), Node::Int(3)],
        ))
    }

    #[test]
    fn add_inserts_and_appends() {
        let mut list = numbers();
        assert_eq!(ListAdapter.try_add(&mut list, "0", &RESOLVER, &json!(0)), Ok(Mutation::Applied));
        assert_eq!(ListAdapter.try_add(&mut list, "-", &RESOLVER, &json!("4")), Ok(Mutation::Applied));
        assert_eq!(ListAdapter.try_add(&mut list, "5", &RESOLVER, &json!(5)), Ok(Mutation::Applied));
        assert_eq!(list.to_json(), json!([0, 1, 2, 3, 4, 5]));
    }

    #[test]
    fn add_past_the_end_is_out_of_bounds() {
        let mut list = numbers();
        assert_eq!(
            ListAdapter.try_add(&mut list, "9", &RESOLVER, &json!(9)),
            Err(AdapterError::index_out_of_bounds("9"))
        );
        assert_eq!(
            ListAdapter.try_add(&mut list, "x", &RESOLVER, &json!(9)),
            Err(AdapterError::invalid_index_value("x"))
        );
    }

    #[test]
    fn remove_and_replace_existing_items() {
        let mut list = numbers();
        assert_eq!(ListAdapter.try_remove(&mut list, "-", &RESOLVER), Ok(Mutation::Applied));
        assert_eq!(
            ListAdapter.try_replace(&mut list, "0", &RESOLVER, &json!(10)),
            Ok(Mutation::Applied)
        );
        assert_eq!(list.to_json(), json!([10, 2]));
        assert_eq!(
            ListAdapter.try_remove(&mut list, "2", &RESOLVER),
            Err(AdapterError::index_out_of_bounds("2"))
        );
    }

    #[test]
    fn replace_with_wrong_item_type_fails() {
        let mut list = numbers();
        assert_eq!(
            ListAdapter.try_replace(&mut list, "1", &RESOLVER, &json!("two")),
            Err(AdapterError::invalid_value_for_property(&json!("two")))
        );
        assert_eq!(list.to_json(), json!([1, 2, 3]));
    }

    #[test]
    fn test_reports_position() {
        let list = numbers();
        assert_eq!(ListAdapter.try_test(&list, "1", &RESOLVER, &json!(2)), Ok(()));
        assert_eq!(
            ListAdapter.try_test(&list, "1", &RESOLVER, &json!(5)),
            Err(AdapterError::value_not_equal_at(&json!(2), &json!(5), 1))
        );
    }

    #[test]
    fn traverse_rejects_end_marker() {
        let mut list = numbers();
        assert_eq!(
            ListAdapter.try_traverse(&mut list, "-", &RESOLVER),
            Err(AdapterError::invalid_index_value("-"))
        );
        assert_eq!(
            ListAdapter.try_traverse(&mut list, "2", &RESOLVER),
            Ok(&mut Node::Int(3))
        );
    }
}
