//! Decode limits and format constants.
//!
//! Side-files and archives may come from untrusted documents, so every
//! length read from a stream is checked against these bounds before
//! anything is allocated.

/// Maximum number of elements in a list side-file.
pub const MAX_LIST_LEN: usize = 1 << 26;

/// Maximum byte length of a single string in a side-file.
pub const MAX_STRING_LEN: usize = 64 * 1024 * 1024;

/// Maximum number of entries in a document archive.
pub const MAX_ARCHIVE_ENTRIES: usize = 1 << 20;

/// Maximum byte length of an archive entry name.
pub const MAX_ENTRY_NAME_LEN: usize = 4096;

/// Maximum total size of a decoded archive.
pub const MAX_ARCHIVE_SIZE: usize = 1 << 31;

/// Magic bytes of an uncompressed document archive.
pub const MAGIC_UNCOMPRESSED: &[u8; 4] = b"DPAR";

/// Magic bytes of a zstd compressed document archive.
pub const MAGIC_COMPRESSED: &[u8; 5] = b"DPARZ";

/// Archive format version written by this crate.
pub const ARCHIVE_FORMAT_VERSION: u8 = 1;

/// Oldest archive format version this crate reads.
pub const MIN_ARCHIVE_FORMAT_VERSION: u8 = 1;

/// Material list side-file version written by this crate.
pub const MATERIAL_FORMAT_VERSION: i64 = 3;

/// Upper bound on capacity reserved from a `count` attribute before the
/// items are actually read.
pub const MAX_TEXT_PREALLOC: usize = 1024;
