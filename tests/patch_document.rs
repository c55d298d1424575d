//! End-to-end patch documents against schema-shaped graphs.

use patch_aware::adapters::{Adapter, AdapterFactory, ObjectAdapter};
use patch_aware::model::{Contract, ContractResolver, KeyType, MapNode, Node};
use patch_aware::{
    apply, apply_with_error_map, apply_with_resolver, DefaultContractResolver, ErrorMap,
    IgnoreMarkers, ObjectType, Operation, OperationError, PatchDocument, PatchError,
    ReadOnlyAwareAdapterFactory, SlotDef, SlotType,
};
use serde_json::json;
use std::sync::Arc;

fn order_type() -> Arc<ObjectType> {
    let line = ObjectType::builder("Line")
        .slot(SlotDef::new("sku", SlotType::String))
        .slot(SlotDef::new("qty", SlotType::Int))
        .build();
    ObjectType::builder("Order")
        .slot(SlotDef::new("id", SlotType::Int).read_only())
        .slot(SlotDef::new("note", SlotType::nullable(SlotType::String)))
        .slot(SlotDef::new("lines", SlotType::list(SlotType::Object(line))))
        .slot(SlotDef::new(
            "prices",
            SlotType::map(KeyType::Int, SlotType::Float),
        ))
        .slot(SlotDef::new("extra", SlotType::Dynamic))
        .build()
}

fn order() -> Node {
    patch_aware::convert(
        &json!({
            "id": 42,
            "note": "rush",
            "lines": [{"sku": "A-1", "qty": 2}],
            "prices": {"1": 9.5},
            "extra": {"channel": "web"}
        }),
        &SlotType::Object(order_type()),
    )
    .unwrap()
}

fn run(doc: &str, target: &mut Node) -> Vec<OperationError> {
    let mut errors = Vec::new();
    apply(
        &PatchDocument::from_json_str(doc).unwrap(),
        target,
        &ReadOnlyAwareAdapterFactory::new(),
        &mut |err: OperationError| errors.push(err),
    )
    .unwrap();
    errors
}

#[test]
fn operations_reach_every_container_shape() {
    let mut target = order();
    let errors = run(
        r#"[
            {"op": "add", "path": "/lines/-", "value": {"sku": "B-2", "qty": "3"}},
            {"op": "replace", "path": "/lines/0/qty", "value": 5},
            {"op": "add", "path": "/prices/02", "value": 4},
            {"op": "add", "path": "/extra/gift", "value": true},
            {"op": "remove", "path": "/note"}
        ]"#,
        &mut target,
    );

    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        target.to_json(),
        json!({
            "id": 42,
            "note": null,
            "lines": [{"sku": "A-1", "qty": 5}, {"sku": "B-2", "qty": 3}],
            "prices": {"1": 9.5, "2": 4.0},
            "extra": {"channel": "web", "gift": true}
        })
    );
}

#[test]
fn move_copy_and_test() {
    let mut target = order();
    let errors = run(
        r#"[
            {"op": "copy", "from": "/lines/0", "path": "/lines/0"},
            {"op": "move", "from": "/extra/channel", "path": "/note"},
            {"op": "test", "path": "/note", "value": "web"},
            {"op": "test", "path": "/lines/1/sku", "value": "A-1"}
        ]"#,
        &mut target,
    );

    assert!(errors.is_empty(), "{errors:?}");
    let json = target.to_json();
    assert_eq!(json["note"], json!("web"));
    assert_eq!(json["extra"], json!({}));
    assert_eq!(json["lines"].as_array().map(Vec::len), Some(2));
}

#[test]
fn null_values_from_the_wire_are_values() {
    let mut target = order();
    let errors = run(
        r#"[
            {"op": "replace", "path": "/note", "value": null},
            {"op": "test", "path": "/note", "value": null},
            {"op": "add", "path": "/extra/coupon", "value": null},
            {"op": "test", "path": "/extra/coupon", "value": null},
            {"op": "replace", "path": "/lines/0/qty", "value": null}
        ]"#,
        &mut target,
    );

    assert_eq!(errors.len(), 1, "{errors:?}");
    assert_eq!(errors[0].index, 4);
    assert_eq!(
        errors[0].message(),
        "The value 'null' is invalid for target location."
    );

    let json = target.to_json();
    assert_eq!(json["note"], json!(null));
    assert_eq!(json["extra"], json!({"channel": "web", "coupon": null}));
    assert_eq!(json["lines"][0]["qty"], json!(2));
}

#[test]
fn falsy_and_empty_values_are_applied() {
    let mut target = order();
    let errors = run(
        r#"[
            {"op": "replace", "path": "/lines/0/qty", "value": 0},
            {"op": "replace", "path": "/lines/0/sku", "value": ""},
            {"op": "add", "path": "/note", "value": ""},
            {"op": "add", "path": "/extra/gift", "value": false},
            {"op": "add", "path": "/extra/tags", "value": []},
            {"op": "add", "path": "/extra/meta", "value": {}},
            {"op": "test", "path": "/lines/0/qty", "value": 0},
            {"op": "test", "path": "/lines/0/sku", "value": ""},
            {"op": "test", "path": "/extra/gift", "value": false},
            {"op": "test", "path": "/extra/tags", "value": []}
        ]"#,
        &mut target,
    );

    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        target.to_json(),
        json!({
            "id": 42,
            "note": "",
            "lines": [{"sku": "", "qty": 0}],
            "prices": {"1": 9.5},
            "extra": {"channel": "web", "gift": false, "tags": [], "meta": {}}
        })
    );
}

#[test]
fn absent_value_is_still_missing() {
    let mut target = order();
    let errors = run(r#"[{"op": "replace", "path": "/note"}]"#, &mut target);
    assert_eq!(
        errors[0].message(),
        "The 'replace' operation requires a 'value'."
    );
    assert_eq!(target.to_json()["note"], json!("rush"));
}

#[test]
fn failing_test_reports_position_for_lists() {
    let mut target = order();
    let errors = run(
        r#"[{"op": "test", "path": "/lines/0/qty", "value": 3},
            {"op": "test", "path": "/lines/0", "value": {"sku": "A-1", "qty": 9}}]"#,
        &mut target,
    );

    assert_eq!(errors.len(), 2);
    assert_eq!(
        errors[0].message(),
        "The current value '2' at path 'qty' is not equal to the test value '3'."
    );
    assert!(errors[1].message().contains("at position '0'"));
}

#[test]
fn map_keys_must_convert() {
    let mut target = order();
    let errors = run(
        r#"[{"op": "add", "path": "/prices/abc", "value": 1.0}]"#,
        &mut target,
    );
    assert_eq!(
        errors[0].message(),
        "The provided path segment 'abc' cannot be converted to the target type."
    );
}

#[test]
fn moving_a_read_only_slot_fails_before_adding() {
    let mut target = order();
    let errors = run(
        r#"[{"op": "move", "from": "/id", "path": "/note"}]"#,
        &mut target,
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message(),
        "The property at path 'id' could not be updated."
    );
    assert_eq!(target.to_json()["note"], json!("rush"));
}

#[test]
fn errors_land_in_the_error_map() {
    let doc = PatchDocument::from_json_str(
        r#"[
            {"op": "replace", "path": "/id", "value": 1},
            {"op": "replace", "path": "/missing", "value": 1}
        ]"#,
    )
    .unwrap();

    let mut plain = ErrorMap::new();
    apply_with_error_map(
        &doc,
        &mut order(),
        &ReadOnlyAwareAdapterFactory::new(),
        &mut plain,
        "",
    )
    .unwrap();
    assert_eq!(plain.get("Order").map(<[String]>::len), Some(2));

    let mut prefixed = ErrorMap::new();
    apply_with_error_map(
        &doc,
        &mut order(),
        &ReadOnlyAwareAdapterFactory::new(),
        &mut prefixed,
        "model",
    )
    .unwrap();
    assert!(prefixed.get("Order").is_none());
    assert_eq!(
        prefixed.get("model.Order").unwrap()[1],
        "The target location specified by path segment 'missing' was not found."
    );
}

#[test]
fn error_map_is_an_error_sink() {
    let mut errors = ErrorMap::new();
    apply(
        &PatchDocument::new(vec![Operation::remove("/id")]),
        &mut order(),
        &ReadOnlyAwareAdapterFactory::new(),
        &mut errors,
    )
    .unwrap();
    assert_eq!(errors.error_count(), 1);
}

/// Refuses to describe maps.
struct NoMaps;

impl ContractResolver for NoMaps {
    fn resolve_contract(&self, node: &Node) -> Option<Contract> {
        match node {
            Node::Map(_) => None,
            other => DefaultContractResolver.resolve_contract(other),
        }
    }
}

#[test]
fn missing_contract_aborts_the_call() {
    let mut target = order();
    let result = apply_with_resolver(
        &PatchDocument::new(vec![
            Operation::replace("/note", json!("first")),
            Operation::add("/prices/3", json!(1.0)),
            Operation::replace("/note", json!("never")),
        ]),
        &mut target,
        &ReadOnlyAwareAdapterFactory::new(),
        &NoMaps,
        &mut |_: OperationError| {},
    );

    assert_eq!(result, Err(PatchError::InvalidArgument { name: "contract" }));
    assert_eq!(target.to_json()["note"], json!("first"));
}

/// Factory that plugs in a custom object adapter and leaves the rest alone.
struct Permissive {
    object: ObjectAdapter<IgnoreMarkers>,
}

impl AdapterFactory for Permissive {
    fn object_adapter(&self) -> &dyn Adapter {
        &self.object
    }
}

#[test]
fn custom_factories_keep_collection_selection() {
    let mut target = Node::Map(MapNode::new(KeyType::String, SlotType::Int));
    let factory = Permissive {
        object: ObjectAdapter::new(IgnoreMarkers),
    };
    let mut errors = Vec::new();
    apply(
        &PatchDocument::new(vec![Operation::add("/x", json!("12"))]),
        &mut target,
        &factory,
        &mut |err: OperationError| errors.push(err),
    )
    .unwrap();

    assert!(errors.is_empty());
    assert_eq!(target.to_json(), json!({"x": 12}));
}
