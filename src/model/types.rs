//! Type metadata for slot-bearing objects.
//!
//! An [`ObjectType`] is the explicit metadata table for one kind of object:
//! its name, whether the whole type is read-only, and the ordered list of
//! slots it carries. It is built once (through [`ObjectTypeBuilder`] or the
//! schema loader) and shared behind an [`Arc`], so adapters never inspect a
//! value's shape more than once per operation.

use crate::model::node::Node;
use std::fmt;
use std::sync::Arc;

/// Declared type of a slot, list item or map value.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotType {
    Bool,
    Int,
    Float,
    String,
    /// Untyped value; anything JSON can express.
    Any,
    /// Fully dynamic object with free-form members.
    Dynamic,
    Nullable(Box<SlotType>),
    List(Box<SlotType>),
    Map {
        key: KeyType,
        value: Box<SlotType>,
    },
    Object(Arc<ObjectType>),
}

impl SlotType {
    pub fn nullable(inner: SlotType) -> Self {
        SlotType::Nullable(Box::new(inner))
    }

    pub fn list(item: SlotType) -> Self {
        SlotType::List(Box::new(item))
    }

    pub fn map(key: KeyType, value: SlotType) -> Self {
        SlotType::Map {
            key,
            value: Box::new(value),
        }
    }

    /// Value types cannot hold null unless wrapped in [`SlotType::Nullable`].
    pub fn is_value_type(&self) -> bool {
        matches!(self, SlotType::Bool | SlotType::Int | SlotType::Float)
    }

    /// The value a slot of this type holds after a remove.
    pub fn zero_value(&self) -> Node {
        match self {
            SlotType::Bool => Node::Bool(false),
            SlotType::Int => Node::Int(0),
            SlotType::Float => Node::Float(0.0),
            _ => Node::Null,
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotType::Bool => write!(f, "bool"),
            SlotType::Int => write!(f, "int"),
            SlotType::Float => write!(f, "float"),
            SlotType::String => write!(f, "string"),
            SlotType::Any => write!(f, "any"),
            SlotType::Dynamic => write!(f, "dynamic"),
            SlotType::Nullable(inner) => write!(f, "{inner}?"),
            SlotType::List(item) => write!(f, "list<{item}>"),
            SlotType::Map { key, value } => write!(f, "map<{key}, {value}>"),
            SlotType::Object(ty) => write!(f, "{}", ty.name()),
        }
    }
}

/// Key type of a keyed map. Keys are stored in their canonical string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    String,
    Int,
}

impl KeyType {
    /// Convert a path segment into the canonical key, if it is valid for
    /// this key type.
    pub fn convert(&self, segment: &str) -> Option<String> {
        match self {
            KeyType::String => Some(segment.to_string()),
            KeyType::Int => segment.trim().parse::<i64>().ok().map(|k| k.to_string()),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::String => write!(f, "string"),
            KeyType::Int => write!(f, "int"),
        }
    }
}

/// A named, typed location within an object.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotDef {
    pub name: String,
    pub ty: SlotType,
    pub writable: bool,
    pub readable: bool,
    /// Slot-level read-only marker.
    pub read_only: bool,
}

impl SlotDef {
    pub fn new(name: impl Into<String>, ty: SlotType) -> Self {
        Self {
            name: name.into(),
            ty,
            writable: true,
            readable: true,
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    pub fn with_readable(mut self, readable: bool) -> Self {
        self.readable = readable;
        self
    }
}

/// Metadata for a slot-bearing object type.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    name: String,
    read_only: bool,
    slots: Vec<SlotDef>,
}

impl ObjectType {
    pub fn builder(name: impl Into<String>) -> ObjectTypeBuilder {
        ObjectTypeBuilder {
            name: name.into(),
            read_only: false,
            slots: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type-level read-only marker.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn slots(&self) -> &[SlotDef] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&SlotDef> {
        self.slots.get(index)
    }

    /// Resolve a path segment to a slot index.
    ///
    /// An exact name match wins; otherwise the first case-insensitive match
    /// is used.
    pub fn find_slot(&self, segment: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.name == segment)
            .or_else(|| {
                self.slots
                    .iter()
                    .position(|slot| slot.name.eq_ignore_ascii_case(segment))
            })
    }
}

pub struct ObjectTypeBuilder {
    name: String,
    read_only: bool,
    slots: Vec<SlotDef>,
}

impl ObjectTypeBuilder {
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn slot(mut self, slot: SlotDef) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn build(self) -> Arc<ObjectType> {
        Arc::new(ObjectType {
            name: self.name,
            read_only: self.read_only,
            slots: self.slots,
        })
    }
}
