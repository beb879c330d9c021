// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Flux query assembly.
//!
//! ```text
//! from(bucket: "b")
//!  |> range(start: -1h)
//!  |> filter(fn: (r) => r["host"] == "a")
//!  |> filter(fn: (r) => r["_field"] == "f1" or r["_field"] == "f2")
//!  |> <trailing stages>
//! ```
//!
//! Alongside the text, the assembler reports every column name it placed in
//! a filter so callers can validate the result columns.

use crate::decode::DecodedRecord;
use crate::error::{Error, Result};

/// Column holding the measurement name.
pub const MEASUREMENT_COLUMN: &str = "_measurement";
/// Column holding the field name.
pub const FIELD_COLUMN: &str = "_field";

const PIPE: &str = "\n |> ";

/// Assembled query text and the column names it references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FluxQuery {
    pub text: String,
    /// Tag names, then field names, then tags omitted as empty.
    pub columns: Vec<String>,
}

/// Inputs of one Flux query.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    bucket: String,
    start: String,
    end: String,
    tags: Vec<(String, String)>,
    fields: Vec<String>,
    stages: Vec<String>,
}

impl QuerySpec {
    /// Create a query against `bucket`.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    /// Range start, e.g. `-1h`. Empty means unbounded.
    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.start = start.into();
        self
    }

    /// Range stop. Empty means unbounded.
    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = end.into();
        self
    }

    /// Add a tag equality filter.
    pub fn tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((name.into(), value.into()));
        self
    }

    /// Add a field name to the `_field` predicate.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    /// Append a trailing stage, written verbatim.
    pub fn stage(mut self, stage: impl Into<String>) -> Self {
        self.stages.push(stage.into());
        self
    }

    /// Append several trailing stages.
    pub fn stages<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stages.extend(stages.into_iter().map(Into::into));
        self
    }

    /// Assemble the query.
    pub fn build(&self) -> Result<FluxQuery> {
        if self.bucket.is_empty() {
            return Err(Error::NoBucket);
        }

        let mut stages = vec![format!("from(bucket: {})", quote(&self.bucket))];
        let mut columns = Vec::with_capacity(self.tags.len() + self.fields.len());

        match (self.start.is_empty(), self.end.is_empty()) {
            (false, false) => stages.push(format!(
                "range(start: {}, stop: {})",
                self.start, self.end
            )),
            (false, true) => stages.push(format!("range(start: {})", self.start)),
            (true, false) => stages.push(format!("range(stop: {})", self.end)),
            (true, true) => {}
        }

        for (name, value) in &self.tags {
            stages.push(format!(
                "filter(fn: (r) => r[{}] == {})",
                quote(name),
                quote(value)
            ));
            columns.push(name.clone());
        }

        if !self.fields.is_empty() {
            let mut predicate = String::new();
            for (i, name) in self.fields.iter().enumerate() {
                if i > 0 {
                    predicate.push_str(" or ");
                }
                predicate.push_str(&format!("r[\"{}\"] == {}", FIELD_COLUMN, quote(name)));
                columns.push(name.clone());
            }
            stages.push(format!("filter(fn: (r) => {})", predicate));
        }

        stages.extend(self.stages.iter().cloned());

        Ok(FluxQuery {
            text: stages.join(PIPE),
            columns,
        })
    }
}

/// Query for a decoded record.
///
/// The measurement becomes a `_measurement` filter after the tags. Fields
/// whose decoded value is empty are left out of the predicate whatever their
/// `omitempty` setting; point building keeps them. Omitted tags are reported
/// in `columns` but never filtered on.
pub(crate) fn record_query<S: AsRef<str>>(
    bucket: &str,
    start: &str,
    end: &str,
    decoded: DecodedRecord,
    stages: &[S],
) -> Result<FluxQuery> {
    let mut builder = QuerySpec::new(bucket).start(start).end(end);

    for (name, value) in decoded.tags {
        builder = builder.tag(name, value);
    }
    if !decoded.measurement.is_empty() {
        builder = builder.tag(MEASUREMENT_COLUMN, decoded.measurement);
    }

    for (name, value) in decoded.fields {
        if value.is_empty() {
            log::trace!("field {} is empty, left out of the query", name);
            continue;
        }
        builder = builder.field(name);
    }

    builder = builder.stages(stages.iter().map(|s| s.as_ref().to_string()));

    let mut query = builder.build()?;
    query.columns.extend(decoded.omitted_tags);
    Ok(query)
}

/// Flux string literal.
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_protocol::FieldValue;

    #[test]
    fn test_bucket_only() {
        let query = QuerySpec::new("b").build().expect("build");
        assert_eq!(query.text, "from(bucket: \"b\")");
        assert!(query.columns.is_empty());
    }

    #[test]
    fn test_empty_bucket_rejected() {
        assert_eq!(QuerySpec::new("").start("-1h").build(), Err(Error::NoBucket));
    }

    #[test]
    fn test_range_forms() {
        let both = QuerySpec::new("b").start("-2h").end("-1h").build().unwrap();
        assert_eq!(both.text, "from(bucket: \"b\")\n |> range(start: -2h, stop: -1h)");

        let start = QuerySpec::new("b").start("-2h").build().unwrap();
        assert_eq!(start.text, "from(bucket: \"b\")\n |> range(start: -2h)");

        let stop = QuerySpec::new("b").end("now()").build().unwrap();
        assert_eq!(stop.text, "from(bucket: \"b\")\n |> range(stop: now())");
    }

    #[test]
    fn test_tags_each_get_a_filter() {
        let query = QuerySpec::new("b")
            .tag("host", "a")
            .tag("region", "eu")
            .build()
            .unwrap();
        assert_eq!(
            query.text,
            "from(bucket: \"b\")\n |> filter(fn: (r) => r[\"host\"] == \"a\")\n |> filter(fn: (r) => r[\"region\"] == \"eu\")"
        );
        assert_eq!(query.columns, vec!["host", "region"]);
    }

    #[test]
    fn test_fields_share_one_filter() {
        let query = QuerySpec::new("b")
            .start("-1h")
            .field("f1")
            .field("f2")
            .field("f3")
            .stage("last()")
            .build()
            .unwrap();
        assert_eq!(
            query.text,
            "from(bucket: \"b\")\n |> range(start: -1h)\n |> filter(fn: (r) => r[\"_field\"] == \"f1\" or r[\"_field\"] == \"f2\" or r[\"_field\"] == \"f3\")\n |> last()"
        );
        assert_eq!(query.columns, vec!["f1", "f2", "f3"]);
    }

    #[test]
    fn test_literals_are_escaped() {
        let query = QuerySpec::new("b").tag("path", "C:\\tmp \"x\"").build().unwrap();
        assert_eq!(
            query.text,
            "from(bucket: \"b\")\n |> filter(fn: (r) => r[\"path\"] == \"C:\\\\tmp \\\"x\\\"\")"
        );
    }

    #[test]
    fn test_record_query_skips_empty_fields_and_reports_omitted_tags() {
        let decoded = DecodedRecord {
            measurement: "cpu".to_string(),
            tags: vec![("host".to_string(), "a".to_string())],
            omitted_tags: vec!["zone".to_string()],
            fields: vec![
                ("idle".to_string(), FieldValue::Float(0.0)),
                ("user".to_string(), FieldValue::Float(12.5)),
                ("throttled".to_string(), FieldValue::Boolean(false)),
            ],
            timestamp: None,
        };

        let query = record_query("metrics", "", "", decoded, &["count()"]).unwrap();
        assert_eq!(
            query.text,
            "from(bucket: \"metrics\")\n |> filter(fn: (r) => r[\"host\"] == \"a\")\n |> filter(fn: (r) => r[\"_measurement\"] == \"cpu\")\n |> filter(fn: (r) => r[\"_field\"] == \"user\")\n |> count()"
        );
        assert_eq!(query.columns, vec!["host", "_measurement", "user", "zone"]);
    }
}
