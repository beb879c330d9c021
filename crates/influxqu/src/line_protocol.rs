// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB Line Protocol rendering.
//!
//! Line Protocol format:
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp
//! ```
//!
//! See: <https://docs.influxdata.com/influxdb/v2/reference/syntax/line-protocol/>

use std::fmt;

/// A value that can be stored in an InfluxDB field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit floating point.
    Float(f64),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit unsigned integer.
    UInteger(u64),
    /// UTF-8 string.
    String(String),
    /// Boolean value.
    Boolean(bool),
}

impl FieldValue {
    /// Format this value for InfluxDB Line Protocol.
    ///
    /// - Float: written as-is (e.g., `3.14`)
    /// - Integer: suffixed with `i` (e.g., `42i`)
    /// - UInteger: suffixed with `u` (e.g., `42u`)
    /// - String: quoted with double quotes, inner quotes escaped (e.g., `"hello"`)
    /// - Boolean: `true` or `false`
    pub fn to_line_protocol(&self) -> String {
        match self {
            FieldValue::Float(v) => format!("{}", v),
            FieldValue::Integer(v) => format!("{}i", v),
            FieldValue::UInteger(v) => format!("{}u", v),
            FieldValue::String(v) => {
                let escaped = v.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{}\"", escaped)
            }
            FieldValue::Boolean(v) => v.to_string(),
        }
    }

    /// Whether the value is the zero value of its type.
    ///
    /// Query generation leaves such fields out of the `_field` predicate.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Float(v) => v.to_bits() == 0,
            FieldValue::Integer(v) => *v == 0,
            FieldValue::UInteger(v) => *v == 0,
            FieldValue::String(v) => v.is_empty(),
            FieldValue::Boolean(v) => !*v,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_line_protocol())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::UInteger(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

/// Render a single point as one Line Protocol line.
///
/// Tags and fields are written in the order given; callers sort them when a
/// canonical form is needed.
pub fn write_line<'a, T, F>(measurement: &str, tags: T, fields: F, timestamp: i64) -> String
where
    T: IntoIterator<Item = (&'a str, &'a str)>,
    F: IntoIterator<Item = (&'a str, &'a FieldValue)>,
{
    let mut line = escape_measurement(measurement);

    for (key, value) in tags {
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }

    // Space separator before fields
    line.push(' ');

    for (i, (key, value)) in fields.into_iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&value.to_line_protocol());
    }

    // Space separator before timestamp
    line.push(' ');
    line.push_str(&timestamp.to_string());

    line
}

/// Escape measurement name per Line Protocol spec.
/// Spaces and commas must be escaped with backslash.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Escape tag keys, tag values and field keys.
/// Commas, equals signs, and spaces must be escaped.
fn escape_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}
