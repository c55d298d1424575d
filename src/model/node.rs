use crate::model::types::{KeyType, ObjectType, SlotType};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A value in the in-memory object graph that patches are applied to.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(ListNode),
    Map(MapNode),
    Dynamic(DynamicNode),
    Object(ObjectNode),
}

impl Node {
    /// Build an untyped node from JSON. Objects become dynamic nodes and
    /// arrays become lists of `any`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Node::Int(i),
                None => Node::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Node::String(s.clone()),
            Value::Array(items) => Node::List(ListNode::new(
                SlotType::Any,
                items.iter().map(Node::from_json).collect(),
            )),
            Value::Object(members) => Node::Dynamic(DynamicNode {
                members: members
                    .iter()
                    .map(|(name, value)| (name.clone(), Node::from_json(value)))
                    .collect(),
            }),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Int(i) => Value::Number((*i).into()),
            Node::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Node::String(s) => Value::String(s.clone()),
            Node::List(list) => Value::Array(list.items.iter().map(Node::to_json).collect()),
            Node::Map(map) => Value::Object(members_to_json(&map.entries)),
            Node::Dynamic(dynamic) => Value::Object(members_to_json(&dynamic.members)),
            Node::Object(object) => {
                let mut out = Map::new();
                for (slot, value) in object.ty.slots().iter().zip(&object.values) {
                    out.insert(slot.name.clone(), value.to_json());
                }
                Value::Object(out)
            }
        }
    }

    /// Name used when reporting errors against this node.
    pub fn type_name(&self) -> &str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Int(_) => "int",
            Node::Float(_) => "float",
            Node::String(_) => "string",
            Node::List(_) => "list",
            Node::Map(_) => "map",
            Node::Dynamic(_) => "dynamic",
            Node::Object(object) => object.ty.name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn object_type(&self) -> Option<&Arc<ObjectType>> {
        match self {
            Node::Object(object) => Some(&object.ty),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            Node::Object(object) => Some(object),
            _ => None,
        }
    }
}

fn members_to_json(members: &BTreeMap<String, Node>) -> Map<String, Value> {
    members
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect()
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Int(value)
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Node::Int(i64::from(value))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Float(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<ObjectNode> for Node {
    fn from(value: ObjectNode) -> Self {
        Node::Object(value)
    }
}

/// Ordered, indexable list whose items share a declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct ListNode {
    item: SlotType,
    items: Vec<Node>,
}

impl ListNode {
    pub fn new(item: SlotType, items: Vec<Node>) -> Self {
        Self { item, items }
    }

    pub fn item_type(&self) -> &SlotType {
        &self.item
    }

    pub fn items(&self) -> &[Node] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<Node> {
        &mut self.items
    }
}

/// Keyed map. Keys are kept in canonical string form for their [`KeyType`].
#[derive(Debug, Clone, PartialEq)]
pub struct MapNode {
    key: KeyType,
    value: SlotType,
    entries: BTreeMap<String, Node>,
}

impl MapNode {
    pub fn new(key: KeyType, value: SlotType) -> Self {
        Self {
            key,
            value,
            entries: BTreeMap::new(),
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.key
    }

    pub fn value_type(&self) -> &SlotType {
        &self.value
    }

    pub fn entries(&self) -> &BTreeMap<String, Node> {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut BTreeMap<String, Node> {
        &mut self.entries
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Node) -> Option<Node> {
        self.entries.insert(key.into(), value)
    }
}

/// Object with free-form, untyped members.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DynamicNode {
    members: BTreeMap<String, Node>,
}

impl DynamicNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &BTreeMap<String, Node> {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut BTreeMap<String, Node> {
        &mut self.members
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.members.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Node) -> Option<Node> {
        self.members.insert(name.into(), value)
    }
}

/// Instance of an [`ObjectType`]: one value per declared slot, in slot order.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    ty: Arc<ObjectType>,
    values: Vec<Node>,
}

impl ObjectNode {
    /// New instance with every slot at its zero value.
    pub fn new(ty: Arc<ObjectType>) -> Self {
        let values = ty.slots().iter().map(|slot| slot.ty.zero_value()).collect();
        Self { ty, values }
    }

    pub fn object_type(&self) -> &Arc<ObjectType> {
        &self.ty
    }

    pub fn values(&self) -> &[Node] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<&Node> {
        self.values.get(index)
    }

    pub fn value_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.values.get_mut(index)
    }

    /// Value of the slot that `name` resolves to.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.ty.find_slot(name).and_then(|index| self.values.get(index))
    }

    /// Overwrite a slot without any conversion or permission check.
    /// Returns `false` if no slot matches `name`.
    pub fn set(&mut self, name: &str, value: impl Into<Node>) -> bool {
        match self.ty.find_slot(name).and_then(|index| self.values.get_mut(index)) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<Node>) -> Self {
        self.set(name, value);
        self
    }
}
