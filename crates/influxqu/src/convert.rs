// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar conversion of attribute values.
//!
//! - [`as_string`]: tag values and measurement names
//! - [`as_timestamp`]: the timestamp role
//! - [`as_field_value`]: typed field values

use crate::error::{Error, Result};
use crate::line_protocol::FieldValue;
use crate::value::{MarshalText, Value};
use chrono::{DateTime, SecondsFormat, Utc};

/// Render a value as a string.
///
/// An absent optional renders as the empty string. Floats use fixed notation
/// with six decimals, times use RFC 3339 with nanoseconds.
pub fn as_string(value: Value<'_>) -> Result<String> {
    let value = match value {
        Value::Optional(None) | Value::Null => return Ok(String::new()),
        Value::Optional(Some(inner)) => inner.value(),
        other => other,
    };

    match value {
        Value::Str(s) => Ok(s.to_string()),
        Value::Display(d) => Ok(d.to_string()),
        Value::Text(t) => marshal(t),
        Value::Int(v) => Ok(v.to_string()),
        Value::UInt(v) => Ok(v.to_string()),
        Value::Float(v) => Ok(format!("{:.6}", v)),
        Value::Bool(v) => Ok(v.to_string()),
        Value::Time(t) => Ok(format_time(&t)),
        #[cfg(feature = "decimal")]
        Value::Decimal(d) => Ok(d.to_string()),
        Value::Null | Value::Optional(_) | Value::Unrepresentable => Err(Error::UnsupportedType),
    }
}

/// Extract a point in time, unwrapping one level of optional indirection.
pub fn as_timestamp(value: Value<'_>) -> Result<DateTime<Utc>> {
    let value = match value {
        Value::Optional(Some(inner)) => inner.value(),
        other => other,
    };

    match value {
        Value::Time(t) => Ok(t),
        _ => Err(Error::UnsupportedType),
    }
}

/// Convert a raw field value.
///
/// Precedence: decimal to the nearest `f64`, then one level of optional
/// unwrapping, then the plain scalar. Times, display and text values become
/// strings, the way the point writer would render them.
pub fn as_field_value(value: Value<'_>) -> Result<FieldValue> {
    match value {
        #[cfg(feature = "decimal")]
        Value::Decimal(d) => decimal_to_float(d),
        Value::Optional(Some(inner)) => scalar_field(inner.value()),
        Value::Optional(None) | Value::Null => Err(Error::UnsupportedType),
        other => scalar_field(other),
    }
}

fn scalar_field(value: Value<'_>) -> Result<FieldValue> {
    match value {
        Value::Str(s) => Ok(FieldValue::String(s.to_string())),
        Value::Int(v) => Ok(FieldValue::Integer(v)),
        Value::UInt(v) => Ok(FieldValue::UInteger(v)),
        Value::Float(v) => Ok(FieldValue::Float(v)),
        Value::Bool(v) => Ok(FieldValue::Boolean(v)),
        Value::Time(t) => Ok(FieldValue::String(format_time(&t))),
        #[cfg(feature = "decimal")]
        Value::Decimal(d) => decimal_to_float(d),
        Value::Display(d) => Ok(FieldValue::String(d.to_string())),
        Value::Text(t) => marshal(t).map(FieldValue::String),
        // Nested optionals are not unwrapped past the first level.
        Value::Null | Value::Optional(_) | Value::Unrepresentable => Err(Error::UnsupportedType),
    }
}

#[cfg(feature = "decimal")]
fn decimal_to_float(d: rust_decimal::Decimal) -> Result<FieldValue> {
    use rust_decimal::prelude::ToPrimitive;

    d.to_f64()
        .map(FieldValue::Float)
        .ok_or(Error::UnsupportedType)
}

fn marshal(t: &dyn MarshalText) -> Result<String> {
    t.marshal_text()
        .map_err(|e| Error::MarshalText(e.to_string()))
}

/// RFC 3339 with up to nine fractional digits, trailing zeros trimmed
/// (`.0000015`, no fraction at all for whole seconds).
pub(crate) fn format_time(t: &DateTime<Utc>) -> String {
    let text = t.to_rfc3339_opts(SecondsFormat::Nanos, true);
    let Some(dot) = text.rfind('.') else {
        return text;
    };

    let fraction = text[dot + 1..].trim_end_matches('Z').trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}Z", &text[..dot])
    } else {
        format!("{}.{}Z", &text[..dot], fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Attribute, MarshalError};
    use chrono::TimeZone;
    use std::fmt;

    struct Level(u8);

    impl fmt::Display for Level {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "L{}", self.0)
        }
    }

    crate::display_attribute!(Level);

    struct Region {
        code: &'static str,
    }

    impl MarshalText for Region {
        fn marshal_text(&self) -> std::result::Result<String, MarshalError> {
            if self.code.is_empty() {
                return Err("empty region code".into());
            }
            Ok(self.code.to_uppercase())
        }
    }

    crate::text_attribute!(Region);

    #[test]
    fn test_as_string_scalars() {
        assert_eq!(as_string("abc".value()).unwrap(), "abc");
        assert_eq!(as_string((-12_i32).value()).unwrap(), "-12");
        assert_eq!(as_string(7_u64.value()).unwrap(), "7");
        assert_eq!(as_string(1.5_f64.value()).unwrap(), "1.500000");
        assert_eq!(as_string(1e21_f64.value()).unwrap(), "1000000000000000000000.000000");
        assert_eq!(as_string(true.value()).unwrap(), "true");
        assert_eq!(as_string(false.value()).unwrap(), "false");
    }

    #[test]
    fn test_as_string_time() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(as_string(t.value()).unwrap(), "2024-05-01T12:30:00Z");

        let t = t + chrono::Duration::nanoseconds(1_500);
        assert_eq!(as_string(t.value()).unwrap(), "2024-05-01T12:30:00.0000015Z");

        let t = t + chrono::Duration::milliseconds(250);
        assert_eq!(as_string(t.value()).unwrap(), "2024-05-01T12:30:00.2500015Z");

        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
            + chrono::Duration::milliseconds(100);
        assert_eq!(
            as_field_value(t.value()).unwrap(),
            FieldValue::String("2024-05-01T12:30:00.1Z".to_string())
        );
    }

    #[test]
    fn test_as_string_optional() {
        let none: Option<String> = None;
        assert_eq!(as_string(none.value()).unwrap(), "");
        assert_eq!(as_string(Some(3_i16).value()).unwrap(), "3");
    }

    #[test]
    fn test_as_string_capabilities() {
        assert_eq!(as_string(Level(4).value()).unwrap(), "L4");
        assert_eq!(as_string(Region { code: "eu" }.value()).unwrap(), "EU");
        assert_eq!(
            as_string(Region { code: "" }.value()),
            Err(Error::MarshalText("empty region code".to_string()))
        );
    }

    #[test]
    fn test_as_timestamp() {
        let t = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(as_timestamp(t.value()).unwrap(), t);
        assert_eq!(as_timestamp(Some(t).value()).unwrap(), t);

        let none: Option<DateTime<Utc>> = None;
        assert_eq!(as_timestamp(none.value()), Err(Error::UnsupportedType));
        assert_eq!(as_timestamp("2023-01-02".value()), Err(Error::UnsupportedType));
    }

    #[test]
    fn test_as_field_value() {
        assert_eq!(as_field_value(1_i32.value()).unwrap(), FieldValue::Integer(1));
        assert_eq!(as_field_value(2_u32.value()).unwrap(), FieldValue::UInteger(2));
        assert_eq!(as_field_value(true.value()).unwrap(), FieldValue::Boolean(true));
        assert_eq!(
            as_field_value("".value()).unwrap(),
            FieldValue::String(String::new())
        );
        assert_eq!(as_field_value(Some(0.25_f64).value()).unwrap(), FieldValue::Float(0.25));
        assert_eq!(
            as_field_value(Level(2).value()).unwrap(),
            FieldValue::String("L2".to_string())
        );

        let none: Option<i64> = None;
        assert_eq!(as_field_value(none.value()), Err(Error::UnsupportedType));
    }

    #[cfg(feature = "decimal")]
    #[test]
    fn test_as_field_value_decimal() {
        let d = rust_decimal::Decimal::new(12345, 2);
        assert_eq!(as_field_value(d.value()).unwrap(), FieldValue::Float(123.45));
        assert_eq!(as_string(d.value()).unwrap(), "123.45");
    }
}
