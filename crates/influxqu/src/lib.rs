// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # influxqu - annotated structs to InfluxDB points and Flux queries
//!
//! Annotate struct fields with a role and decode values of that struct into
//! a measurement, tags, fields and a timestamp. The same decoded model feeds
//! point construction and Flux filter query generation.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//! use influxqu::{InfluxQu, Record};
//!
//! #[derive(Record)]
//! struct CpuSample {
//!     #[annotate(influxqu = "measurement")]
//!     name: String,
//!     #[annotate(influxqu = "tag,host")]
//!     host: String,
//!     #[annotate(influxqu = "tag,zone,omitempty")]
//!     zone: Option<String>,
//!     #[annotate(influxqu = "field,usage")]
//!     usage: f64,
//!     #[annotate(influxqu = "timestamp")]
//!     at: DateTime<Utc>,
//! }
//!
//! # fn main() -> influxqu::Result<()> {
//! let sample = CpuSample {
//!     name: "cpu".into(),
//!     host: "a".into(),
//!     zone: None,
//!     usage: 12.5,
//!     at: Utc::now(),
//! };
//!
//! let qu = InfluxQu::new();
//! let point = qu.generate_point(&sample)?;
//! assert_eq!(point.name(), "cpu");
//!
//! let query = qu.generate_flux_query("metrics", "-1h", "", &sample, &["last()"])?;
//! assert_eq!(query.columns, vec!["host", "_measurement", "usage", "zone"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! #[derive(Record)] --> static RecordDescriptor
//!                               |
//!          value --> decode --> DecodedRecord --+--> PointParts --> Point / v3::Point
//!                                               |
//!                                               +--> QuerySpec --> FluxQuery
//! ```
//!
//! ## Annotations
//!
//! `#[annotate(<key> = "<role>[,<name>][,omitempty]")]`, where `<key>` is
//! the configured outer key (`influxqu` by default) and `<role>` one of
//! `measurement`, `tag`, `field`, `timestamp`. `#[annotate(embed)]` merges a
//! nested record into its parent.

pub mod convert;
pub mod decode;
pub mod error;
pub mod flux;
pub mod keys;
pub mod line_protocol;
pub mod point;
pub mod record;
pub mod value;

pub use decode::DecodedRecord;
pub use error::{Error, Result};
pub use flux::{FluxQuery, QuerySpec};
pub use keys::{AnnotationKeys, ConfigError};
pub use line_protocol::FieldValue;
pub use point::{FromPointParts, Point, PointParts};
pub use record::{AttributeDescriptor, Record, RecordDescriptor};
pub use value::{Attribute, MarshalError, MarshalText, Value};

pub use influxqu_codegen::Record; // Derive macro (for #[derive(influxqu::Record)])

#[cfg(feature = "decimal")]
pub use rust_decimal::Decimal;

/// Point and query generator bound to one set of annotation keys.
#[derive(Debug, Clone, Default)]
pub struct InfluxQu {
    keys: AnnotationKeys,
}

impl InfluxQu {
    /// Generator using the default keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator using custom keys.
    pub fn with_keys(keys: AnnotationKeys) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &AnnotationKeys {
        &self.keys
    }

    /// Decode a record into measurement, tags, fields and timestamp.
    pub fn decode(&self, record: &dyn Record) -> Result<DecodedRecord> {
        decode::decode(&self.keys, record)
    }

    /// Decode and validate the inputs of a point.
    pub fn point_parts(&self, record: &dyn Record) -> Result<PointParts> {
        PointParts::from_decoded(self.decode(record)?)
    }

    /// Build any point representation.
    pub fn generate<P: FromPointParts>(&self, record: &dyn Record) -> Result<P> {
        let parts = self.point_parts(record)?;
        log::debug!(
            "{}: point {} with {} tags, {} fields",
            record.descriptor().type_name,
            parts.measurement,
            parts.tags.len(),
            parts.fields.len()
        );
        Ok(P::from_parts(parts))
    }

    /// Build a v2 write point.
    pub fn generate_point(&self, record: &dyn Record) -> Result<Point> {
        self.generate(record)
    }

    /// Build a v3 point.
    pub fn generate_point_v3(&self, record: &dyn Record) -> Result<point::v3::Point> {
        self.generate(record)
    }

    /// Build a Flux query filtering on the record's tags, measurement and
    /// non-empty fields.
    ///
    /// `columns` lists the tag names, `_measurement`, the field names and
    /// finally the names of tags omitted as empty.
    pub fn generate_flux_query<S: AsRef<str>>(
        &self,
        bucket: &str,
        start: &str,
        end: &str,
        record: &dyn Record,
        stages: &[S],
    ) -> Result<FluxQuery> {
        let decoded = self.decode(record)?;
        let query = flux::record_query(bucket, start, end, decoded, stages)?;
        log::debug!("generated flux query:\n{}", query.text);
        Ok(query)
    }
}
