//! Error types for property mutation, structured text restore and binary
//! side-file coding.

use thiserror::Error;

/// Coarse classification of a [`PropertyError`].
///
/// Embedders map these onto their scripting runtime's exception types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A dynamic value of the wrong shape or type.
    TypeMismatch,
    /// A value rejected by a domain rule.
    Value,
    /// An operation on a property in the wrong state.
    Runtime,
    /// An index outside the permitted range.
    Bounds,
}

impl ErrorKind {
    /// Returns the exception name used by the scripting runtime.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "TypeError",
            ErrorKind::Value => "ValueError",
            ErrorKind::Runtime => "RuntimeError",
            ErrorKind::Bounds => "IndexError",
        }
    }
}

/// Error raised by a property setter.
///
/// Setters validate before notifying, so a returned error means the
/// property is unchanged and no notification fired.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    // === TypeMismatch ===
    #[error("type must be {expected}, not {actual}")]
    TypeMismatch { expected: &'static str, actual: String },

    #[error("type in list must be {expected}, not {actual}")]
    ItemTypeMismatch { expected: &'static str, actual: String },

    #[error("type of the key need to be string, not {actual}")]
    KeyTypeMismatch { actual: String },

    #[error("type in tuple must be consistent ({expected})")]
    InconsistentTuple { expected: &'static str },

    #[error("expected a tuple of {expected} items, got {actual}")]
    TupleArity { expected: usize, actual: usize },

    #[error("missing required key '{key}'")]
    MissingKey { key: &'static str },

    #[error("{property} expects type to be {expected}, not {actual}")]
    UnsupportedShape {
        property: String,
        expected: &'static str,
        actual: String,
    },

    #[error("cannot assign a path value of type {actual} to {property}")]
    PathValueMismatch {
        property: String,
        actual: &'static str,
    },

    #[error("cannot paste {actual} into {expected}")]
    PasteMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid type '{name}': type must be derived from {base}")]
    InvalidType { name: String, base: &'static str },

    // === Value ===
    #[error("'{value}' is not part of the enumeration in {property}")]
    NotInEnumeration { value: String, property: String },

    #[error("enumeration index {index} is out of range in {property}")]
    EnumIndexOutOfRange { index: i64, property: String },

    #[error("step size must be greater than zero, got {step}")]
    InvalidStepSize { step: f64 },

    // === Runtime ===
    #[error("cannot get value from invalid enumeration")]
    InvalidEnumeration,

    #[error("invalid UUID string {value:?}")]
    InvalidUuid { value: String },

    #[error("invalid path '{path}' for property {property}")]
    InvalidPath { path: String, property: String },

    // === Bounds ===
    #[error("index {index} out of bounds (size: {size})")]
    IndexOutOfBounds { index: i64, size: usize },
}

impl PropertyError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PropertyError::NotInEnumeration { .. }
            | PropertyError::EnumIndexOutOfRange { .. }
            | PropertyError::InvalidStepSize { .. } => ErrorKind::Value,
            PropertyError::InvalidEnumeration
            | PropertyError::InvalidUuid { .. }
            | PropertyError::InvalidPath { .. } => ErrorKind::Runtime,
            PropertyError::IndexOutOfBounds { .. } => ErrorKind::Bounds,
            _ => ErrorKind::TypeMismatch,
        }
    }
}

/// Error while restoring a property from structured text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadError {
    #[error("malformed markup at byte {position}: {context}")]
    Malformed {
        position: usize,
        context: &'static str,
    },

    #[error("unknown character entity '&{entity};'")]
    UnknownEntity { entity: String },

    #[error("unexpected end of document while looking for {expected}")]
    UnexpectedEof { expected: String },

    #[error("expected element <{expected}>, found <{found}>")]
    UnexpectedElement { expected: String, found: String },

    #[error("expected </{expected}>, found </{found}>")]
    UnexpectedEndElement { expected: String, found: String },

    #[error("no element has been read")]
    NoCurrentElement,

    #[error("element <{element}> has no attribute '{name}'")]
    MissingAttribute { element: String, name: String },

    #[error("attribute '{name}' of <{element}> is not a valid {expected}: {value:?}")]
    InvalidAttribute {
        element: String,
        name: String,
        expected: &'static str,
        value: String,
    },

    #[error(transparent)]
    Property(#[from] PropertyError),
}

/// Error while decoding a binary side-file or archive.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    #[error("invalid magic bytes: expected DPAR or DPARZ, found {found:?}")]
    InvalidMagic { found: [u8; 4] },

    #[error("unsupported archive version: {version}")]
    UnsupportedVersion { version: u8 },

    #[error("duplicate archive entry '{name}'")]
    DuplicateEntry { name: String },

    #[error("archive has no entry '{name}'")]
    MissingEntry { name: String },

    #[error("zstd decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("decompressed size {actual} doesn't match declared {declared}")]
    UncompressedSizeMismatch { declared: usize, actual: usize },
}

/// Error while encoding a binary side-file or archive.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("zstd compression failed: {0}")]
    CompressionFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = PropertyError::TypeMismatch {
            expected: "int",
            actual: "str".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.to_string(), "type must be int, not str");

        let err = PropertyError::NotInEnumeration {
            value: "Blue".to_string(),
            property: "Doc#Box.Mode".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(
            err.to_string(),
            "'Blue' is not part of the enumeration in Doc#Box.Mode"
        );

        assert_eq!(PropertyError::InvalidEnumeration.kind(), ErrorKind::Runtime);
        assert_eq!(
            PropertyError::IndexOutOfBounds { index: 5, size: 2 }.kind(),
            ErrorKind::Bounds
        );
        assert_eq!(ErrorKind::Bounds.name(), "IndexError");
    }

    #[test]
    fn test_read_error_wraps_property_error() {
        let err: ReadError = PropertyError::InvalidEnumeration.into();
        assert!(matches!(err, ReadError::Property(PropertyError::InvalidEnumeration)));
    }
}
