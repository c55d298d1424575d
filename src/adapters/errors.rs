use serde_json::Value;
use thiserror::Error;

/// Failures of a single adapter call. Each one is recoverable at the
/// operation level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("The target location specified by path segment '{segment}' was not found.")]
    TargetLocationNotFound { segment: String },

    #[error("The property at path '{segment}' could not be updated.")]
    CannotUpdateProperty { segment: String },

    #[error("The property at path '{segment}' could not be read.")]
    CannotReadProperty { segment: String },

    #[error("The value '{value}' is invalid for target location.")]
    InvalidValueForProperty { value: String },

    #[error("The path segment '{segment}' is invalid for an array index.")]
    InvalidIndexValue { segment: String },

    #[error("The index value provided by path segment '{segment}' is out of bounds of the array size.")]
    IndexOutOfBounds { segment: String },

    #[error("The provided path segment '{segment}' cannot be converted to the target type.")]
    InvalidPathSegment { segment: String },

    #[error("The current value '{current}' at path '{segment}' is not equal to the test value '{expected}'.")]
    ValueNotEqualToTestValue {
        current: String,
        expected: String,
        segment: String,
    },

    #[error("The current value '{current}' at position '{position}' is not equal to the test value '{expected}'.")]
    ValueAtListPositionNotEqualToTestValue {
        current: String,
        expected: String,
        position: usize,
    },
}

impl AdapterError {
    pub fn target_location_not_found(segment: impl Into<String>) -> Self {
        Self::TargetLocationNotFound {
            segment: segment.into(),
        }
    }

    pub fn cannot_update_property(segment: impl Into<String>) -> Self {
        Self::CannotUpdateProperty {
            segment: segment.into(),
        }
    }

    pub fn cannot_read_property(segment: impl Into<String>) -> Self {
        Self::CannotReadProperty {
            segment: segment.into(),
        }
    }

    pub fn invalid_value_for_property(value: &Value) -> Self {
        Self::InvalidValueForProperty {
            value: display_value(value),
        }
    }

    pub fn invalid_index_value(segment: impl Into<String>) -> Self {
        Self::InvalidIndexValue {
            segment: segment.into(),
        }
    }

    pub fn index_out_of_bounds(segment: impl Into<String>) -> Self {
        Self::IndexOutOfBounds {
            segment: segment.into(),
        }
    }

    pub fn invalid_path_segment(segment: impl Into<String>) -> Self {
        Self::InvalidPathSegment {
            segment: segment.into(),
        }
    }

    pub fn value_not_equal(current: &Value, expected: &Value, segment: impl Into<String>) -> Self {
        Self::ValueNotEqualToTestValue {
            current: display_value(current),
            expected: display_value(expected),
            segment: segment.into(),
        }
    }

    pub fn value_not_equal_at(current: &Value, expected: &Value, position: usize) -> Self {
        Self::ValueAtListPositionNotEqualToTestValue {
            current: display_value(current),
            expected: display_value(expected),
            position,
        }
    }
}

/// Render a value for an error message: strings without quotes, everything
/// else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
