//! Encoding and decoding of saved properties.

pub mod archive;
pub mod primitives;
pub mod sidefile;
pub mod text;

pub use archive::{DocumentArchive, decompress};
pub use primitives::{ByteReader, ByteWriter};
pub use sidefile::MaterialFormat;
pub use text::{PendingFile, SaveOptions, SideFile, Writer, XmlReader, encode_attribute};
