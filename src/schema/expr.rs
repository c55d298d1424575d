//! Slot type expressions such as `list<map<string, int?>>`.

use crate::model::KeyType;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Bool,
    Int,
    Float,
    String,
    Any,
    Dynamic,
    Nullable(Box<TypeExpr>),
    List(Box<TypeExpr>),
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// Reference to another declared type.
    Named(String),
}

impl TypeExpr {
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut parser = Parser { input, pos: 0 };
        let expr = parser.expr()?;
        parser.skip_ws();
        if parser.pos < input.len() {
            return Err(format!(
                "unexpected '{}' at offset {}",
                &input[parser.pos..],
                parser.pos
            ));
        }
        Ok(expr)
    }

    /// Every named type this expression refers to.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeExpr::Named(name) => out.push(name),
            TypeExpr::Nullable(inner) | TypeExpr::List(inner) => inner.collect_references(out),
            TypeExpr::Map { key, value } => {
                key.collect_references(out);
                value.collect_references(out);
            }
            _ => {}
        }
    }

    /// Map key expressions that are not a valid [`KeyType`].
    pub fn invalid_keys(&self) -> Vec<&TypeExpr> {
        let mut out = Vec::new();
        self.collect_invalid_keys(&mut out);
        out
    }

    fn collect_invalid_keys<'a>(&'a self, out: &mut Vec<&'a TypeExpr>) {
        match self {
            TypeExpr::Nullable(inner) | TypeExpr::List(inner) => inner.collect_invalid_keys(out),
            TypeExpr::Map { key, value } => {
                if key.key_type().is_none() {
                    out.push(key);
                }
                value.collect_invalid_keys(out);
            }
            _ => {}
        }
    }

    pub fn key_type(&self) -> Option<KeyType> {
        match self {
            TypeExpr::String => Some(KeyType::String),
            TypeExpr::Int => Some(KeyType::Int),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Bool => write!(f, "bool"),
            TypeExpr::Int => write!(f, "int"),
            TypeExpr::Float => write!(f, "float"),
            TypeExpr::String => write!(f, "string"),
            TypeExpr::Any => write!(f, "any"),
            TypeExpr::Dynamic => write!(f, "dynamic"),
            TypeExpr::Nullable(inner) => write!(f, "{inner}?"),
            TypeExpr::List(item) => write!(f, "list<{item}>"),
            TypeExpr::Map { key, value } => write!(f, "map<{key}, {value}>"),
            TypeExpr::Named(name) => write!(f, "{name}"),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn expr(&mut self) -> Result<TypeExpr, String> {
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();

        let mut expr = match name {
            "list" if self.eat('<') => {
                let item = self.expr()?;
                self.expect('>')?;
                TypeExpr::List(Box::new(item))
            }
            "map" if self.eat('<') => {
                let key = self.expr()?;
                self.expect(',')?;
                let value = self.expr()?;
                self.expect('>')?;
                TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            "bool" => TypeExpr::Bool,
            "int" => TypeExpr::Int,
            "float" => TypeExpr::Float,
            "string" => TypeExpr::String,
            "any" => TypeExpr::Any,
            "dynamic" => TypeExpr::Dynamic,
            other => TypeExpr::Named(other.to_string()),
        };

        self.skip_ws();
        if self.eat('?') {
            expr = TypeExpr::Nullable(Box::new(expr));
        }
        Ok(expr)
    }

    fn ident(&mut self) -> Result<&'a str, String> {
        let input = self.input;
        let start = self.pos;
        let len = input[start..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(input.len() - start);
        if len == 0 {
            return Err(format!("expected a type name at offset {start}"));
        }
        self.pos += len;
        Ok(&input[start..self.pos])
    }

    fn skip_ws(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, c: char) -> bool {
        if self.input[self.pos..].starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), String> {
        self.skip_ws();
        if self.eat(c) {
            Ok(())
        } else {
            Err(format!("expected '{c}' at offset {}", self.pos))
        }
    }
}
