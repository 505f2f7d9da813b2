//! Null handling and type coercion for declared field types.
//!
//! Every assignable field type implements [`FromValue`]. The implementation is
//! picked when a [`crate::record::Field`] is declared, so materialization never
//! dispatches on type metadata at runtime.
//!
//! Policy summary:
//!
//! - [`FieldKind::Primitive`] values (integers, floats, `bool`, `char`, decimals,
//!   dates, GUIDs) are strict: a null cell is [`CoercionError::UnexpectedNull`].
//!   These are the types with no null representation of their own.
//! - [`FieldKind::Nullable`] (`Option<T>`) maps null to `None`.
//! - [`FieldKind::Reference`] (`String`, `Vec<u8>`) maps null to the empty value.
//!
//! Numeric conversions honour the declared width and signedness; a value that
//! does not fit is [`CoercionError::OutOfRange`], never a truncation.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    data::{Value, parse_bool, parse_guid, parse_naive_date, parse_naive_datetime},
    error::CoercionError,
};

/// Integer magnitudes up to these bounds widen to floats without rounding.
const F64_EXACT_INT: u64 = 1 << 53;
const F32_EXACT_INT: u64 = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Primitive,
    Nullable,
    Reference,
    /// Nested record or collection; never bound to a column.
    Composite,
}

impl FieldKind {
    pub fn is_eligible(self) -> bool {
        !matches!(self, FieldKind::Composite)
    }
}

pub trait FromValue: Sized {
    const KIND: FieldKind;
    const TYPE_NAME: &'static str;

    fn from_value(value: &Value) -> Result<Self, CoercionError>;
}

fn incompatible(found: &Value, expected: &'static str) -> CoercionError {
    CoercionError::Incompatible {
        expected,
        found: found.type_name(),
    }
}

macro_rules! impl_integer {
    ($($ty:ty),* $(,)?) => {$(
        impl FromValue for $ty {
            const KIND: FieldKind = FieldKind::Primitive;
            const TYPE_NAME: &'static str = stringify!($ty);

            fn from_value(value: &Value) -> Result<Self, CoercionError> {
                let expected = Self::TYPE_NAME;
                match value {
                    Value::Null => Err(CoercionError::UnexpectedNull { expected }),
                    Value::Int(v) => {
                        <$ty>::try_from(*v).map_err(|_| CoercionError::out_of_range(v, expected))
                    }
                    Value::UInt(v) => {
                        <$ty>::try_from(*v).map_err(|_| CoercionError::out_of_range(v, expected))
                    }
                    Value::Decimal(d) if d.fract().is_zero() => d
                        .to_i128()
                        .and_then(|wide| <$ty>::try_from(wide).ok())
                        .ok_or_else(|| CoercionError::out_of_range(d, expected)),
                    Value::Decimal(d) => Err(CoercionError::out_of_range(d, expected)),
                    Value::Text(raw) => parse_integer_text::<$ty>(raw, expected),
                    other => Err(incompatible(other, expected)),
                }
            }
        }
    )*};
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

fn parse_integer_text<T: std::str::FromStr>(
    raw: &str,
    expected: &'static str,
) -> Result<T, CoercionError> {
    let trimmed = raw.trim();
    trimmed.parse::<T>().map_err(|_| {
        // A well-formed integer that failed to parse overflowed the declared width.
        if trimmed.parse::<i128>().is_ok() || trimmed.parse::<u128>().is_ok() {
            CoercionError::out_of_range(trimmed, expected)
        } else {
            CoercionError::unparsable(raw, expected)
        }
    })
}

fn exact_int_as_float(
    value: &Value,
    limit: u64,
    expected: &'static str,
) -> Option<Result<f64, CoercionError>> {
    match value {
        Value::Int(v) => Some(if v.unsigned_abs() <= limit {
            Ok(*v as f64)
        } else {
            Err(CoercionError::out_of_range(v, expected))
        }),
        Value::UInt(v) => Some(if *v <= limit {
            Ok(*v as f64)
        } else {
            Err(CoercionError::out_of_range(v, expected))
        }),
        _ => None,
    }
}

fn is_integer_text(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_non_finite_token(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    matches!(
        unsigned.to_ascii_lowercase().as_str(),
        "inf" | "infinity" | "nan"
    )
}

/// Parses float text without silently rounding integers or overflowing to infinity.
fn parse_float_text<F>(
    raw: &str,
    exact_limit: u64,
    expected: &'static str,
) -> Result<F, CoercionError>
where
    F: std::str::FromStr + Into<f64> + Copy,
{
    let trimmed = raw.trim();
    if is_integer_text(trimmed) {
        let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
        let fits = digits
            .parse::<u128>()
            .is_ok_and(|magnitude| magnitude <= u128::from(exact_limit));
        if !fits {
            return Err(CoercionError::out_of_range(trimmed, expected));
        }
    }
    let parsed: F = trimmed
        .parse()
        .map_err(|_| CoercionError::unparsable(raw, expected))?;
    if !parsed.into().is_finite() && !is_non_finite_token(trimmed) {
        return Err(CoercionError::out_of_range(trimmed, expected));
    }
    Ok(parsed)
}

impl FromValue for f64 {
    const KIND: FieldKind = FieldKind::Primitive;
    const TYPE_NAME: &'static str = "f64";

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        let expected = Self::TYPE_NAME;
        if let Some(widened) = exact_int_as_float(value, F64_EXACT_INT, expected) {
            return widened;
        }
        match value {
            Value::Null => Err(CoercionError::UnexpectedNull { expected }),
            Value::Float(v) => Ok(*v),
            Value::Text(raw) => parse_float_text(raw, F64_EXACT_INT, expected),
            other => Err(incompatible(other, expected)),
        }
    }
}

impl FromValue for f32 {
    const KIND: FieldKind = FieldKind::Primitive;
    const TYPE_NAME: &'static str = "f32";

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        let expected = Self::TYPE_NAME;
        if let Some(widened) = exact_int_as_float(value, F32_EXACT_INT, expected) {
            return widened.map(|v| v as f32);
        }
        match value {
            Value::Null => Err(CoercionError::UnexpectedNull { expected }),
            Value::Float(v) => {
                let narrowed = *v as f32;
                if v.is_nan() || f64::from(narrowed) == *v {
                    Ok(narrowed)
                } else {
                    Err(CoercionError::out_of_range(v, expected))
                }
            }
            Value::Text(raw) => parse_float_text(raw, F32_EXACT_INT, expected),
            other => Err(incompatible(other, expected)),
        }
    }
}

impl FromValue for bool {
    const KIND: FieldKind = FieldKind::Primitive;
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        let expected = Self::TYPE_NAME;
        match value {
            Value::Null => Err(CoercionError::UnexpectedNull { expected }),
            Value::Bool(b) => Ok(*b),
            Value::Int(0) | Value::UInt(0) => Ok(false),
            Value::Int(1) | Value::UInt(1) => Ok(true),
            Value::Int(v) => Err(CoercionError::out_of_range(v, expected)),
            Value::UInt(v) => Err(CoercionError::out_of_range(v, expected)),
            Value::Text(raw) => parse_bool(raw),
            other => Err(incompatible(other, expected)),
        }
    }
}

impl FromValue for char {
    const KIND: FieldKind = FieldKind::Primitive;
    const TYPE_NAME: &'static str = "char";

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        let expected = Self::TYPE_NAME;
        match value {
            Value::Null => Err(CoercionError::UnexpectedNull { expected }),
            Value::Text(raw) => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Ok(ch),
                    _ => Err(CoercionError::unparsable(raw, expected)),
                }
            }
            other => Err(incompatible(other, expected)),
        }
    }
}

impl FromValue for Decimal {
    const KIND: FieldKind = FieldKind::Primitive;
    const TYPE_NAME: &'static str = "decimal";

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        let expected = Self::TYPE_NAME;
        match value {
            Value::Null => Err(CoercionError::UnexpectedNull { expected }),
            Value::Decimal(d) => Ok(*d),
            Value::Int(v) => Ok(Decimal::from(*v)),
            Value::UInt(v) => Ok(Decimal::from(*v)),
            Value::Text(raw) => raw
                .trim()
                .parse()
                .map_err(|_| CoercionError::unparsable(raw, expected)),
            other => Err(incompatible(other, expected)),
        }
    }
}

impl FromValue for NaiveDate {
    const KIND: FieldKind = FieldKind::Primitive;
    const TYPE_NAME: &'static str = "date";

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        let expected = Self::TYPE_NAME;
        match value {
            Value::Null => Err(CoercionError::UnexpectedNull { expected }),
            Value::Date(d) => Ok(*d),
            Value::Text(raw) => parse_naive_date(raw),
            other => Err(incompatible(other, expected)),
        }
    }
}

impl FromValue for NaiveDateTime {
    const KIND: FieldKind = FieldKind::Primitive;
    const TYPE_NAME: &'static str = "datetime";

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        let expected = Self::TYPE_NAME;
        match value {
            Value::Null => Err(CoercionError::UnexpectedNull { expected }),
            Value::DateTime(dt) => Ok(*dt),
            Value::Date(d) => d
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| CoercionError::out_of_range(d, expected)),
            Value::Text(raw) => parse_naive_datetime(raw),
            other => Err(incompatible(other, expected)),
        }
    }
}

impl FromValue for Uuid {
    const KIND: FieldKind = FieldKind::Primitive;
    const TYPE_NAME: &'static str = "guid";

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        let expected = Self::TYPE_NAME;
        match value {
            Value::Null => Err(CoercionError::UnexpectedNull { expected }),
            Value::Guid(g) => Ok(*g),
            Value::Bytes(bytes) => Uuid::from_slice(bytes).map_err(|_| {
                CoercionError::out_of_range(format!("{} bytes", bytes.len()), expected)
            }),
            Value::Text(raw) => parse_guid(raw),
            other => Err(incompatible(other, expected)),
        }
    }
}

impl FromValue for String {
    const KIND: FieldKind = FieldKind::Reference;
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Text(raw) => Ok(raw.clone()),
            other => Err(incompatible(other, Self::TYPE_NAME)),
        }
    }
}

impl FromValue for Vec<u8> {
    const KIND: FieldKind = FieldKind::Reference;
    const TYPE_NAME: &'static str = "bytes";

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Bytes(bytes) => Ok(bytes.clone()),
            other => Err(incompatible(other, Self::TYPE_NAME)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const KIND: FieldKind = FieldKind::Nullable;
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_declared_type() {
        assert_eq!(<i32 as FromValue>::KIND, FieldKind::Primitive);
        assert_eq!(<Option<i32> as FromValue>::KIND, FieldKind::Nullable);
        assert_eq!(<String as FromValue>::KIND, FieldKind::Reference);
        assert_eq!(<Option<String> as FromValue>::KIND, FieldKind::Nullable);
        assert!(!FieldKind::Composite.is_eligible());
        assert!(FieldKind::Nullable.is_eligible());
    }

    #[test]
    fn integer_text_overflow_is_out_of_range() {
        assert_eq!(
            u8::from_value(&Value::Text("300".into())),
            Err(CoercionError::out_of_range("300", "u8"))
        );
        assert_eq!(
            u8::from_value(&Value::Text("-1".into())),
            Err(CoercionError::out_of_range("-1", "u8"))
        );
        assert!(matches!(
            u8::from_value(&Value::Text("ten".into())),
            Err(CoercionError::Unparsable { .. })
        ));
    }

    #[test]
    fn f32_rejects_inexact_narrowing() {
        assert_eq!(f32::from_value(&Value::Float(0.5)), Ok(0.5));
        assert!(matches!(
            f32::from_value(&Value::Float(0.1)),
            Err(CoercionError::OutOfRange { .. })
        ));
        assert!(matches!(
            f32::from_value(&Value::Int(1 << 30)),
            Err(CoercionError::OutOfRange { .. })
        ));
    }
}
