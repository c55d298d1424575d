//! Reading schema TOML from strings and files.

use crate::schema::config::{Schema, SchemaConfig, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where a schema came from, for error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Origin {
    #[default]
    Inline,
    File(PathBuf),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Inline => Ok(()),
            Origin::File(path) => write!(f, " at {}", path.display()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot open schema {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("schema{origin} is not valid TOML: {source}")]
    Toml {
        origin: Origin,
        source: toml_edit::de::Error,
    },

    #[error("schema{origin} was rejected: {source}")]
    Validation {
        origin: Origin,
        source: ValidationError,
    },
}

impl ConfigError {
    /// Attribute an inline failure to the file it was read from.
    fn in_file(mut self, file: &Path) -> Self {
        if let ConfigError::Toml { origin, .. } | ConfigError::Validation { origin, .. } = &mut self
        {
            if *origin == Origin::Inline {
                *origin = Origin::File(file.to_path_buf());
            }
        }
        self
    }

    /// Validation issues, if this is a validation failure.
    pub fn issues(&self) -> Option<&ValidationError> {
        match self {
            ConfigError::Validation { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Parse, validate and build a schema from TOML text.
pub fn load_from_str(input: &str) -> Result<Schema, ConfigError> {
    let origin = Origin::Inline;
    let config = toml_edit::de::from_str::<SchemaConfig>(input).map_err(|source| {
        ConfigError::Toml {
            origin: origin.clone(),
            source,
        }
    })?;
    config
        .build()
        .map_err(|source| ConfigError::Validation { origin, source })
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Schema, ConfigError> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => load_from_str(&text).map_err(|err| err.in_file(path)),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
