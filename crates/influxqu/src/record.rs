// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Static record descriptors.
//!
//! `#[derive(Record)]` emits one `static` [`RecordDescriptor`] per struct,
//! listing the annotated and embedded fields in declaration order, plus
//! index-based accessors. The decoder walks the descriptor; no runtime
//! reflection is involved.

use crate::value::Attribute;

/// Layout of a single annotated or embedded field.
#[derive(Debug)]
pub struct AttributeDescriptor {
    /// Rust field name.
    pub name: &'static str,
    /// `(outer key, annotation)` pairs, e.g. `("influxqu", "tag,host")`.
    pub annotations: &'static [(&'static str, &'static str)],
    /// The field is an embedded sub-record.
    pub embedded: bool,
}

impl AttributeDescriptor {
    /// Annotation registered under `key`, if any.
    pub fn annotation(&self, key: &str) -> Option<&'static str> {
        self.annotations
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, annotation)| *annotation)
    }
}

/// Record descriptor: ordered attribute metadata for one struct type.
#[derive(Debug)]
pub struct RecordDescriptor {
    pub type_name: &'static str, // e.g., "CpuSample"
    pub attributes: &'static [AttributeDescriptor],
}

impl RecordDescriptor {
    pub const fn new(type_name: &'static str, attributes: &'static [AttributeDescriptor]) -> Self {
        Self {
            type_name,
            attributes,
        }
    }
}

/// A struct that can be decoded into a point.
///
/// Normally implemented with `#[derive(influxqu::Record)]`. Indices refer to
/// positions in [`RecordDescriptor::attributes`].
pub trait Record {
    fn descriptor(&self) -> &'static RecordDescriptor;

    /// Value of the annotated attribute at `index`.
    fn attribute(&self, index: usize) -> Option<&dyn Attribute>;

    /// Embedded sub-record at `index`; `None` when the attribute is not
    /// embedded or its optional holds nothing.
    fn embedded(&self, index: usize) -> Option<&dyn Record>;
}

#[cfg(test)]
mod tests {
    use super::*;

    static ATTRIBUTES: [AttributeDescriptor; 2] = [
        AttributeDescriptor {
            name: "host",
            annotations: &[("influxqu", "tag,host"), ("metrics", "tag,hostname")],
            embedded: false,
        },
        AttributeDescriptor {
            name: "base",
            annotations: &[],
            embedded: true,
        },
    ];

    static DESCRIPTOR: RecordDescriptor = RecordDescriptor::new("Sample", &ATTRIBUTES);

    #[test]
    fn test_annotation_lookup_by_key() {
        let host = &DESCRIPTOR.attributes[0];
        assert_eq!(host.annotation("influxqu"), Some("tag,host"));
        assert_eq!(host.annotation("metrics"), Some("tag,hostname"));
        assert_eq!(host.annotation("other"), None);
        assert_eq!(DESCRIPTOR.attributes[1].annotation("influxqu"), None);
        assert!(DESCRIPTOR.attributes[1].embedded);
    }
}
