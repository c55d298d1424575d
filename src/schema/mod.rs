pub mod config;
pub mod expr;
pub mod loader;

pub use config::{
    Metadata, Schema, SchemaConfig, SlotDefinition, TypeDefinition, ValidationError,
    ValidationIssue,
};
pub use expr::TypeExpr;
pub use loader::{load_from_path, load_from_str, ConfigError, Origin};
