// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Point construction from decoded records.
//!
//! [`PointParts`] is the validated output of a decode: a measurement, at
//! least one field and a timestamp. Point representations implement
//! [`FromPointParts`]; two are provided:
//!
//! - [`Point`]: v2 write point, tags and fields sorted by key
//! - [`v3::Point`]: v3 point with builder API and write precision

pub mod v3;

use crate::decode::DecodedRecord;
use crate::error::{Error, Result};
use crate::line_protocol::{write_line, FieldValue};
use chrono::{DateTime, Utc};

/// Validated inputs of a point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointParts {
    pub measurement: String,
    pub tags: Vec<(String, String)>,
    pub fields: Vec<(String, FieldValue)>,
    pub timestamp: DateTime<Utc>,
}

impl PointParts {
    /// Validate a decoded record.
    ///
    /// Requires a measurement and at least one field; a missing timestamp
    /// defaults to now.
    pub fn from_decoded(decoded: DecodedRecord) -> Result<Self> {
        if decoded.measurement.is_empty() {
            return Err(Error::NoValidMeasurement);
        }
        if decoded.fields.is_empty() {
            return Err(Error::NoValidField);
        }

        Ok(Self {
            measurement: decoded.measurement,
            tags: decoded.tags,
            fields: decoded.fields,
            timestamp: decoded.timestamp.unwrap_or_else(Utc::now),
        })
    }
}

/// A point representation buildable from [`PointParts`].
pub trait FromPointParts: Sized {
    fn from_parts(parts: PointParts) -> Self;
}

/// v2 write point.
///
/// Tags and fields are kept sorted by key, the canonical Line Protocol form.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, FieldValue)>,
    time: DateTime<Utc>,
}

impl Point {
    pub fn new(
        measurement: impl Into<String>,
        mut tags: Vec<(String, String)>,
        mut fields: Vec<(String, FieldValue)>,
        time: DateTime<Utc>,
    ) -> Self {
        tags.sort_by(|a, b| a.0.cmp(&b.0));
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            measurement: measurement.into(),
            tags,
            fields,
            time,
        }
    }

    /// Measurement name.
    pub fn name(&self) -> &str {
        &self.measurement
    }

    pub fn tag_list(&self) -> &[(String, String)] {
        &self.tags
    }

    pub fn field_list(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Line Protocol with a nanosecond timestamp.
    pub fn to_line_protocol(&self) -> String {
        write_line(
            &self.measurement,
            self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            self.fields.iter().map(|(k, v)| (k.as_str(), v)),
            timestamp_nanos(&self.time),
        )
    }
}

impl FromPointParts for Point {
    fn from_parts(parts: PointParts) -> Self {
        Point::new(parts.measurement, parts.tags, parts.fields, parts.timestamp)
    }
}

/// Nanoseconds since the Unix epoch, saturating outside the i64 range
/// (years 1677..2262).
pub(crate) fn timestamp_nanos(t: &DateTime<Utc>) -> i64 {
    t.timestamp_nanos_opt().unwrap_or(if t.timestamp() < 0 {
        i64::MIN
    } else {
        i64::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn decoded() -> DecodedRecord {
        DecodedRecord {
            measurement: "weather".to_string(),
            tags: vec![
                ("station".to_string(), "north".to_string()),
                ("region".to_string(), "eu".to_string()),
            ],
            omitted_tags: vec![],
            fields: vec![
                ("temp".to_string(), FieldValue::Float(22.1)),
                ("humidity".to_string(), FieldValue::Integer(65)),
            ],
            timestamp: Some(Utc.timestamp_opt(2, 0).unwrap()),
        }
    }

    #[test]
    fn test_parts_require_measurement() {
        let mut record = decoded();
        record.measurement.clear();
        assert_eq!(PointParts::from_decoded(record), Err(Error::NoValidMeasurement));
    }

    #[test]
    fn test_parts_require_field() {
        let mut record = decoded();
        record.fields.clear();
        assert_eq!(PointParts::from_decoded(record), Err(Error::NoValidField));
    }

    #[test]
    fn test_parts_default_timestamp_to_now() {
        let mut record = decoded();
        record.timestamp = None;
        let before = Utc::now();
        let parts = PointParts::from_decoded(record).unwrap();
        assert!(parts.timestamp >= before);
        assert!(parts.timestamp <= Utc::now());
    }

    #[test]
    fn test_point_sorted_line_protocol() {
        let point = Point::from_parts(PointParts::from_decoded(decoded()).unwrap());
        assert_eq!(point.name(), "weather");
        assert_eq!(point.tag_list()[0].0, "region");
        assert_eq!(point.field_list()[0].0, "humidity");
        assert_eq!(
            point.to_line_protocol(),
            "weather,region=eu,station=north humidity=65i,temp=22.1 2000000000"
        );
    }
}
