pub mod adapter;
pub mod dynamic;
pub mod errors;
pub mod list;
pub mod map;
pub mod object;
pub mod policy;
pub mod selector;

pub use adapter::{Adapter, AdapterResult, Mutation};
pub use dynamic::DynamicAdapter;
pub use errors::AdapterError;
pub use list::ListAdapter;
pub use map::MapAdapter;
pub use object::ObjectAdapter;
pub use policy::{IgnoreMarkers, MarkerPolicy, ReadOnlyPolicy};
pub use selector::{
    select, AdapterFactory, AdapterKind, AdapterVariant, DefaultAdapterFactory,
    ReadOnlyAwareAdapterFactory,
};
