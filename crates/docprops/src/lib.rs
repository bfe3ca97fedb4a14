//! docprops: typed, persistent properties for a parametric document model.
//!
//! A property is a named, typed, change-observable value slot owned by a
//! document object. This crate provides the property types, their structured
//! text and binary side-file formats, the conversion to and from a dynamic
//! scripting value, and the path bridge used by expression evaluators.
//!
//! # Quick Start
//!
//! ```rust
//! use docprops::codec::{Writer, XmlReader};
//! use docprops::property::{IntegerProperty, Property};
//!
//! let mut length = IntegerProperty::new();
//! length.set_value(42);
//!
//! // Save to structured text
//! let mut writer = Writer::new();
//! length.save(&mut writer).unwrap();
//! assert_eq!(writer.as_str().trim(), r#"<Integer value="42"/>"#);
//!
//! // Restore into a fresh property
//! let mut reader = XmlReader::new(writer.as_str()).unwrap();
//! let mut restored = IntegerProperty::new();
//! restored.restore(&mut reader).unwrap();
//! assert_eq!(restored.value(), 42);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Plain value types (Color, Material, Enumeration, constraints,
//!   dynamic and path values)
//! - [`property`]: The `Property` trait and every concrete property type
//! - [`codec`]: Structured text reader/writer, side-file formats, archives
//! - [`registry`]: Runtime type registry for persistable payloads
//! - [`error`]: Error types
//! - [`limits`]: Decode limits and format constants
//!
//! # Side-files
//!
//! Bulk lists (floats, colours, materials) store only a file reference in the
//! structured text. The payload is a little-endian binary record stream kept
//! in a [`codec::DocumentArchive`], optionally zstd compressed.

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod property;
pub mod registry;

// Re-export commonly used types at crate root
pub use codec::{DocumentArchive, SaveOptions, Writer, XmlReader};
pub use error::{DecodeError, EncodeError, ErrorKind, PropertyError, ReadError};
pub use model::{
    Color, ConstraintRef, Constraints, DynValue, Enumeration, Material, ObjectIdentifier,
    PathValue, Quantity,
};
pub use property::{Property, PropertyBase, PropertyContainer, PropertyStatus, create_property};
pub use registry::{Persistable, TypeRegistry};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
