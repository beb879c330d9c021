// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record walker.
//!
//! Visits a record's descriptor in declaration order, dispatches on the
//! annotation role and merges embedded sub-records. Names and singleton
//! roles must stay unique across the whole record tree.
//!
//! ```text
//! Record --> descriptor walk --+--> measurement / tags / fields / timestamp
//!                              |
//!                              +--> embedded sub-record --> decode --> merge
//! ```

use crate::convert::{as_field_value, as_string, as_timestamp};
use crate::error::{Error, Result};
use crate::keys::{AnnotationKeys, OMITEMPTY};
use crate::line_protocol::FieldValue;
use crate::record::Record;
use crate::value::Attribute;
use chrono::{DateTime, Utc};

/// Output of the record walker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRecord {
    /// Measurement name; empty means unset.
    pub measurement: String,
    /// Tags in declaration order.
    pub tags: Vec<(String, String)>,
    /// Names of `omitempty` tags whose value was empty.
    pub omitted_tags: Vec<String>,
    /// Fields in declaration order.
    pub fields: Vec<(String, FieldValue)>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl DecodedRecord {
    /// Value of the tag `name`.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the field `name`.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// True when nothing was decoded.
    pub fn is_empty(&self) -> bool {
        self.measurement.is_empty()
            && self.tags.is_empty()
            && self.omitted_tags.is_empty()
            && self.fields.is_empty()
            && self.timestamp.is_none()
    }

    fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|(k, _)| k == name)
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }

    fn set_measurement(&mut self, measurement: String) -> Result<()> {
        if !self.measurement.is_empty() {
            return Err(Error::DuplicatedMeasurement);
        }
        self.measurement = measurement;
        Ok(())
    }

    fn set_timestamp(&mut self, timestamp: DateTime<Utc>) -> Result<()> {
        if self.timestamp.is_some() {
            return Err(Error::DuplicatedTimestamp);
        }
        self.timestamp = Some(timestamp);
        Ok(())
    }

    /// Merge a decoded sub-record into this one.
    fn merge(&mut self, sub: DecodedRecord) -> Result<()> {
        if !sub.measurement.is_empty() {
            self.set_measurement(sub.measurement)?;
        }

        if let Some(timestamp) = sub.timestamp {
            self.set_timestamp(timestamp)?;
        }

        // Written and omitted tags are checked against their own list only.
        for (name, value) in sub.tags {
            if self.has_tag(&name) {
                return Err(Error::DuplicatedTag(name));
            }
            self.tags.push((name, value));
        }

        for name in sub.omitted_tags {
            if self.omitted_tags.contains(&name) {
                return Err(Error::DuplicatedTag(name));
            }
            self.omitted_tags.push(name);
        }

        for (name, value) in sub.fields {
            if self.has_field(&name) {
                return Err(Error::DuplicatedField(name));
            }
            self.fields.push((name, value));
        }

        Ok(())
    }
}

/// Parsed `<role>,<name>[,omitempty]` annotation for tags and fields.
struct NamedAnnotation<'a> {
    name: &'a str,
    omitempty: bool,
}

impl<'a> NamedAnnotation<'a> {
    fn parse(segments: &[&'a str], missing_name: Error) -> Result<Self> {
        let name = match segments.get(1) {
            Some(name) if !name.is_empty() => *name,
            _ => return Err(missing_name),
        };

        let omitempty = match segments.len() {
            2 => false,
            3 if segments[2] == OMITEMPTY => true,
            _ => return Err(Error::UnsupportedTag(segments.join(","))),
        };

        Ok(Self { name, omitempty })
    }
}

/// Decode `record` with the given annotation keys.
///
/// Either the whole record decodes or an error is returned; no partial
/// output is observable.
pub fn decode(keys: &AnnotationKeys, record: &dyn Record) -> Result<DecodedRecord> {
    let descriptor = record.descriptor();
    let mut decoded = DecodedRecord::default();

    for (index, attribute) in descriptor.attributes.iter().enumerate() {
        if attribute.embedded {
            if let Some(sub) = record.embedded(index) {
                log::trace!(
                    "{}.{}: merging embedded {}",
                    descriptor.type_name,
                    attribute.name,
                    sub.descriptor().type_name
                );
                let sub_decoded = decode(keys, sub)?;
                decoded.merge(sub_decoded)?;
            }
        }

        let annotation = match attribute.annotation(keys.key()) {
            Some(annotation) if !annotation.is_empty() => annotation,
            _ => continue,
        };

        let segments: Vec<&str> = annotation.split(',').map(str::trim).collect();
        let role = segments[0];

        if role == keys.measurement() {
            if !decoded.measurement.is_empty() {
                return Err(Error::DuplicatedMeasurement);
            }
            if segments.len() != 1 {
                return Err(Error::UnsupportedTag(segments.join(",")));
            }
            let value = attribute_at(record, index)?;
            decoded.measurement = as_string(value.value())?;
        } else if role == keys.tag() {
            let tag = NamedAnnotation::parse(&segments, Error::NoTagName)?;
            if decoded.has_tag(tag.name) {
                return Err(Error::DuplicatedTag(tag.name.to_string()));
            }
            let value = attribute_at(record, index)?;

            if tag.omitempty && value.is_zero() {
                log::trace!(
                    "{}.{}: omitting empty tag {}",
                    descriptor.type_name,
                    attribute.name,
                    tag.name
                );
                decoded.omitted_tags.push(tag.name.to_string());
                continue;
            }

            let rendered = as_string(value.value())?;
            if !tag.omitempty || !rendered.is_empty() {
                decoded.tags.push((tag.name.to_string(), rendered));
            }
        } else if role == keys.field() {
            let field = NamedAnnotation::parse(&segments, Error::NoFieldName)?;
            if decoded.has_field(field.name) {
                return Err(Error::DuplicatedField(field.name.to_string()));
            }
            let value = attribute_at(record, index)?;

            if field.omitempty && value.is_zero() {
                log::trace!(
                    "{}.{}: skipping empty field {}",
                    descriptor.type_name,
                    attribute.name,
                    field.name
                );
                continue;
            }

            let converted = as_field_value(value.value())?;
            decoded.fields.push((field.name.to_string(), converted));
        } else if role == keys.timestamp() {
            if decoded.timestamp.is_some() {
                return Err(Error::DuplicatedTimestamp);
            }
            let value = attribute_at(record, index)?;
            decoded.set_timestamp(as_timestamp(value.value())?)?;
        }
        // Unknown roles are ignored.
    }

    Ok(decoded)
}

fn attribute_at(record: &dyn Record, index: usize) -> Result<&dyn Attribute> {
    record.attribute(index).ok_or(Error::UnsupportedType)
}
