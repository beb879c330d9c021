// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! v3 point representation.
//!
//! Built incrementally and rendered at a chosen write precision.

use super::{timestamp_nanos, FromPointParts, PointParts};
use crate::line_protocol::{write_line, FieldValue};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Timestamp precision used when rendering Line Protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    #[default]
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
}

impl Precision {
    fn scale(&self, nanos: i64) -> i64 {
        match self {
            Precision::Nanosecond => nanos,
            Precision::Microsecond => nanos.div_euclid(1_000),
            Precision::Millisecond => nanos.div_euclid(1_000_000),
            Precision::Second => nanos.div_euclid(1_000_000_000),
        }
    }
}

/// v3 point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Point {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    timestamp: Option<DateTime<Utc>>,
}

impl Point {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Line Protocol at the given precision.
    ///
    /// Returns `None` for a point without fields, which no writer accepts.
    pub fn to_line_protocol(&self, precision: Precision) -> Option<String> {
        if self.fields.is_empty() {
            return None;
        }

        let timestamp = self.timestamp.unwrap_or_else(Utc::now);
        Some(write_line(
            &self.measurement,
            self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            self.fields.iter().map(|(k, v)| (k.as_str(), v)),
            precision.scale(timestamp_nanos(&timestamp)),
        ))
    }
}

impl FromPointParts for Point {
    fn from_parts(parts: PointParts) -> Self {
        let mut point = Point::new(parts.measurement).with_timestamp(parts.timestamp);
        for (name, value) in parts.tags {
            point = point.with_tag(name, value);
        }
        for (name, value) in parts.fields {
            point = point.with_field(name, value);
        }
        point
    }
}
