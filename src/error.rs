//! Error types raised by resolution, compilation, and materialization.

use thiserror::Error;

/// A single value could not be converted into a field's declared type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoercionError {
    #[error("null value for non-nullable {expected}")]
    UnexpectedNull { expected: &'static str },
    #[error("{found} value is not assignable to {expected}")]
    Incompatible {
        expected: &'static str,
        found: &'static str,
    },
    #[error("value {value} is out of range for {expected}")]
    OutOfRange {
        expected: &'static str,
        value: String,
    },
    #[error("failed to parse '{value}' as {expected}")]
    Unparsable {
        expected: &'static str,
        value: String,
    },
}

impl CoercionError {
    pub(crate) fn unparsable(value: &str, expected: &'static str) -> Self {
        CoercionError::Unparsable {
            expected,
            value: value.to_string(),
        }
    }

    pub(crate) fn out_of_range(value: impl ToString, expected: &'static str) -> Self {
        CoercionError::OutOfRange {
            expected,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    /// The row abstraction cannot look values up by column name.
    #[error("rows offered for {record} expose no by-name column accessor")]
    UnsupportedRowShape { record: &'static str },
    #[error("cannot read column '{column}' into {record}.{field}: {source}")]
    Coercion {
        record: &'static str,
        field: String,
        column: String,
        #[source]
        source: CoercionError,
    },
    #[error("{record}.{field} declares {candidates} conversion routines; expected exactly one")]
    AmbiguousConversionRoutine {
        record: &'static str,
        field: String,
        candidates: usize,
    },
    #[error("column '{column}' bound to {record}.{field} is not present on the row")]
    MissingColumn {
        record: &'static str,
        field: String,
        column: String,
    },
}

impl MapError {
    /// The coercion failure behind this error, if it is a data error.
    pub fn coercion(&self) -> Option<&CoercionError> {
        match self {
            MapError::Coercion { source, .. } => Some(source),
            _ => None,
        }
    }
}
