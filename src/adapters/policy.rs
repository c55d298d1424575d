//! Read-only policy for slot-bearing objects.
//!
//! The object-level check runs before a segment is resolved and looks only at
//! the target's declared type. The slot-level check runs after resolution and
//! looks only at the resolved slot. Neither consults the other.

use crate::model::{ObjectType, SlotDef};

pub trait ReadOnlyPolicy {
    fn is_object_protected(&self, ty: &ObjectType) -> bool;

    fn is_slot_protected(&self, slot: &SlotDef) -> bool;
}

/// Honours the read-only markers carried by the type metadata.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerPolicy;

impl ReadOnlyPolicy for MarkerPolicy {
    fn is_object_protected(&self, ty: &ObjectType) -> bool {
        ty.is_read_only()
    }

    fn is_slot_protected(&self, slot: &SlotDef) -> bool {
        slot.read_only
    }
}

/// Treats every object and slot as unprotected.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreMarkers;

impl ReadOnlyPolicy for IgnoreMarkers {
    fn is_object_protected(&self, _ty: &ObjectType) -> bool {
        false
    }

    fn is_slot_protected(&self, _slot: &SlotDef) -> bool {
        false
    }
}
