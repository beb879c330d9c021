// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for decoding, point building and query assembly.
//!
//! Every variant is a terminal validation failure: the call that produced it
//! is aborted and no partial output is returned. The fix is always on the
//! caller's side (the annotated record definition or the key configuration).

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Decoding, point building and query assembly errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A value could not be converted to the representation its role needs.
    #[error("unsupported type")]
    UnsupportedType,

    #[error("duplicated measurement")]
    DuplicatedMeasurement,

    #[error("duplicated timestamp")]
    DuplicatedTimestamp,

    #[error("duplicated tag {0}")]
    DuplicatedTag(String),

    #[error("duplicated field {0}")]
    DuplicatedField(String),

    /// Two annotation keys resolved to the same string.
    #[error("duplicated key {0}")]
    DuplicatedKey(String),

    #[error("no tag name")]
    NoTagName,

    #[error("no field name")]
    NoFieldName,

    /// Unknown modifier segment, or extra segments on a measurement.
    #[error("unsupported tag {0:?}")]
    UnsupportedTag(String),

    #[error("no valid measurement")]
    NoValidMeasurement,

    #[error("no valid field")]
    NoValidField,

    #[error("no bucket")]
    NoBucket,

    /// A text-marshalable value failed to render.
    #[error("marshal text: {0}")]
    MarshalText(String),
}
