pub mod contract;
pub mod convert;
pub mod node;
pub mod types;

pub use contract::{Contract, ContractResolver, DefaultContractResolver, Slot};
pub use convert::{convert, ConversionError};
pub use node::{DynamicNode, ListNode, MapNode, Node, ObjectNode};
pub use types::{KeyType, ObjectType, ObjectTypeBuilder, SlotDef, SlotType};
