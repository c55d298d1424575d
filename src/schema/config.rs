use crate::model::{ObjectType, SlotDef, SlotType};
use crate::schema::expr::TypeExpr;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct SchemaConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub types: Vec<TypeDefinition>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Type that documents are loaded as.
    #[serde(default)]
    pub root: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TypeDefinition {
    pub name: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub slots: Vec<SlotDefinition>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SlotDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default = "default_true")]
    pub writable: bool,
    #[serde(default = "default_true")]
    pub readable: bool,
}

fn default_true() -> bool {
    true
}

impl SchemaConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.types.is_empty() {
            issues.push(ValidationIssue::EmptyTypeList);
        }

        let mut seen_types = BTreeSet::new();
        for def in &self.types {
            if def.name.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    type_name: None,
                    field: "name",
                });
            } else if !seen_types.insert(def.name.as_str()) {
                issues.push(ValidationIssue::DuplicateType {
                    name: def.name.clone(),
                });
            }
        }

        for def in &self.types {
            let mut seen_slots = BTreeSet::new();
            for slot in &def.slots {
                if slot.name.trim().is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        type_name: Some(def.name.clone()),
                        field: "slots.name",
                    });
                    continue;
                }
                if !seen_slots.insert(slot.name.as_str()) {
                    issues.push(ValidationIssue::DuplicateSlot {
                        type_name: def.name.clone(),
                        slot: slot.name.clone(),
                    });
                }

                let expr = match TypeExpr::parse(&slot.ty) {
                    Ok(expr) => expr,
                    Err(message) => {
                        issues.push(ValidationIssue::InvalidType {
                            type_name: def.name.clone(),
                            slot: slot.name.clone(),
                            message,
                        });
                        continue;
                    }
                };
                for reference in expr.references() {
                    if !seen_types.contains(reference) {
                        issues.push(ValidationIssue::UnknownType {
                            type_name: def.name.clone(),
                            slot: slot.name.clone(),
                            reference: reference.to_string(),
                        });
                    }
                }
                for key in expr.invalid_keys() {
                    issues.push(ValidationIssue::InvalidKeyType {
                        type_name: def.name.clone(),
                        slot: slot.name.clone(),
                        key: key.to_string(),
                    });
                }
            }
        }

        if let Err(cycle) = self.build_order() {
            issues.push(ValidationIssue::CyclicReference { types: cycle });
        }

        if let Some(root) = &self.meta.root {
            if !seen_types.contains(root.as_str()) {
                issues.push(ValidationIssue::UnknownRoot { name: root.clone() });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Validate and build the object types.
    pub fn build(&self) -> Result<Schema, ValidationError> {
        self.validate()?;

        let order = self.build_order().map_err(|cycle| ValidationError {
            issues: vec![ValidationIssue::CyclicReference { types: cycle }],
        })?;

        let mut types: BTreeMap<String, Arc<ObjectType>> = BTreeMap::new();
        for def in order {
            let mut builder = ObjectType::builder(&def.name);
            if def.read_only {
                builder = builder.read_only();
            }
            for slot in &def.slots {
                let ty = TypeExpr::parse(&slot.ty)
                    .ok()
                    .and_then(|expr| resolve(&expr, &types))
                    .ok_or_else(|| ValidationError {
                        issues: vec![ValidationIssue::InvalidType {
                            type_name: def.name.clone(),
                            slot: slot.name.clone(),
                            message: "type could not be resolved".to_string(),
                        }],
                    })?;
                let mut slot_def = SlotDef::new(&slot.name, ty)
                    .with_writable(slot.writable)
                    .with_readable(slot.readable);
                if slot.read_only {
                    slot_def = slot_def.read_only();
                }
                builder = builder.slot(slot_def);
            }
            types.insert(def.name.clone(), builder.build());
        }

        Ok(Schema {
            name: self.meta.name.clone(),
            root: self.meta.root.clone(),
            types,
        })
    }

    /// Type definitions ordered so every type comes after the types its
    /// slots refer to. On a cycle, returns the names of the types involved.
    fn build_order(&self) -> Result<Vec<&TypeDefinition>, Vec<String>> {
        let known: BTreeSet<&str> = self.types.iter().map(|def| def.name.as_str()).collect();
        let mut pending: BTreeMap<&str, (&TypeDefinition, BTreeSet<&str>)> = BTreeMap::new();
        for def in &self.types {
            let deps = def
                .slots
                .iter()
                .filter_map(|slot| TypeExpr::parse(&slot.ty).ok())
                .flat_map(|expr| {
                    expr.references()
                        .into_iter()
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .filter_map(|name| known.get(name.as_str()).copied())
                .collect();
            pending.entry(def.name.as_str()).or_insert((def, deps));
        }

        let mut order = Vec::with_capacity(pending.len());
        let mut done: BTreeSet<&str> = BTreeSet::new();
        loop {
            let ready: Vec<&str> = pending
                .iter()
                .filter(|(_, (_, deps))| deps.iter().all(|dep| done.contains(dep)))
                .map(|(name, _)| *name)
                .collect();
            if ready.is_empty() {
                break;
            }
            for name in ready {
                if let Some((def, _)) = pending.remove(name) {
                    order.push(def);
                    done.insert(name);
                }
            }
        }

        if pending.is_empty() {
            Ok(order)
        } else {
            Err(pending.keys().map(|name| name.to_string()).collect())
        }
    }
}

fn resolve(expr: &TypeExpr, types: &BTreeMap<String, Arc<ObjectType>>) -> Option<SlotType> {
    let ty = match expr {
        TypeExpr::Bool => SlotType::Bool,
        TypeExpr::Int => SlotType::Int,
        TypeExpr::Float => SlotType::Float,
        TypeExpr::String => SlotType::String,
        TypeExpr::Any => SlotType::Any,
        TypeExpr::Dynamic => SlotType::Dynamic,
        TypeExpr::Nullable(inner) => SlotType::nullable(resolve(inner, types)?),
        TypeExpr::List(item) => SlotType::list(resolve(item, types)?),
        TypeExpr::Map { key, value } => SlotType::map(key.key_type()?, resolve(value, types)?),
        TypeExpr::Named(name) => SlotType::Object(types.get(name)?.clone()),
    };
    Some(ty)
}

/// Object types built from a schema config.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    root: Option<String>,
    types: BTreeMap<String, Arc<ObjectType>>,
}

impl Schema {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ObjectType>> {
        self.types.get(name)
    }

    pub fn root(&self) -> Option<&Arc<ObjectType>> {
        self.root.as_deref().and_then(|name| self.types.get(name))
    }

    pub fn types(&self) -> impl Iterator<Item = &Arc<ObjectType>> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyTypeList,
    MissingField {
        type_name: Option<String>,
        field: &'static str,
    },
    DuplicateType {
        name: String,
    },
    DuplicateSlot {
        type_name: String,
        slot: String,
    },
    InvalidType {
        type_name: String,
        slot: String,
        message: String,
    },
    UnknownType {
        type_name: String,
        slot: String,
        reference: String,
    },
    InvalidKeyType {
        type_name: String,
        slot: String,
        key: String,
    },
    CyclicReference {
        types: Vec<String>,
    },
    UnknownRoot {
        name: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyTypeList => write!(f, "schema declares no types"),
            ValidationIssue::MissingField { type_name, field } => match type_name {
                Some(name) => write!(f, "type '{name}' missing required field '{field}'"),
                None => write!(f, "type missing required field '{field}'"),
            },
            ValidationIssue::DuplicateType { name } => {
                write!(f, "type '{name}' is declared more than once")
            }
            ValidationIssue::DuplicateSlot { type_name, slot } => {
                write!(f, "type '{type_name}' declares slot '{slot}' more than once")
            }
            ValidationIssue::InvalidType {
                type_name,
                slot,
                message,
            } => write!(f, "slot '{type_name}.{slot}' has an invalid type: {message}"),
            ValidationIssue::UnknownType {
                type_name,
                slot,
                reference,
            } => write!(
                f,
                "slot '{type_name}.{slot}' refers to unknown type '{reference}'"
            ),
            ValidationIssue::InvalidKeyType {
                type_name,
                slot,
                key,
            } => write!(
                f,
                "slot '{type_name}.{slot}' uses '{key}' as a map key; expected string or int"
            ),
            ValidationIssue::CyclicReference { types } => {
                write!(f, "types reference each other in a cycle: {}", types.join(", "))
            }
            ValidationIssue::UnknownRoot { name } => {
                write!(f, "root type '{name}' is not declared")
            }
        }
    }
}
