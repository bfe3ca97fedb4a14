//! Document archive: the named side-files of a saved document.
//!
//! ```text
//! plain:       "DPAR" version:u8 count:u32 { name_len:u32 name data_len:u32 data }*
//! compressed:  "DPARZ" uncompressed_size:u32 zstd(plain)
//! ```
//!
//! All integers are little-endian, as in the side-files themselves. Entries
//! are kept sorted by name, so encoding is deterministic.

use std::collections::BTreeMap;
use std::io::Read;

use tracing::{debug, warn};

use crate::codec::primitives::{ByteReader, ByteWriter};
use crate::codec::text::{PendingFile, SideFile, XmlReader};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{
    ARCHIVE_FORMAT_VERSION, MAGIC_COMPRESSED, MAGIC_UNCOMPRESSED, MAX_ARCHIVE_ENTRIES,
    MAX_ARCHIVE_SIZE, MAX_ENTRY_NAME_LEN, MIN_ARCHIVE_FORMAT_VERSION,
};
use crate::property::Property;

// Two u32 length prefixes, the smallest an entry can be.
const ENTRY_HEADER_SIZE: usize = 8;

/// Named side-files of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentArchive {
    entries: BTreeMap<String, Vec<u8>>,
}

impl DocumentArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the side-files produced by a [`Writer`](crate::codec::Writer).
    pub fn from_side_files(files: impl IntoIterator<Item = SideFile>) -> Self {
        let mut archive = Self::new();
        for file in files {
            archive.insert(file.name, file.data);
        }
        archive
    }

    /// Adds or replaces an entry, returning the previous bytes.
    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) -> Option<Vec<u8>> {
        self.entries.insert(name.into(), data)
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    // =========================================================================
    // RESTORE
    // =========================================================================

    /// Feeds side-file `file` to `property`.
    pub fn restore_doc_file(
        &self,
        file: &str,
        property: &mut dyn Property,
    ) -> Result<(), DecodeError> {
        let data = self.get(file).ok_or_else(|| DecodeError::MissingEntry {
            name: file.to_string(),
        })?;
        let mut reader = ByteReader::new(data);
        property.restore_doc_file(&mut reader)
    }

    /// Feeds every side-file the reader recorded to the property that asked
    /// for it, matching by property name. References without a matching
    /// property are logged and dropped.
    pub fn restore_pending(
        &self,
        reader: &mut XmlReader,
        properties: &mut [&mut dyn Property],
    ) -> Result<(), DecodeError> {
        for PendingFile { file, property } in reader.take_pending_files() {
            match properties.iter_mut().find(|p| p.name() == property) {
                Some(target) => self.restore_doc_file(&file, &mut **target)?,
                None => warn!(file = %file, property = %property, "no property for side-file"),
            }
        }
        Ok(())
    }

    // =========================================================================
    // ENCODING
    // =========================================================================

    /// Encodes the archive without compression.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if self.entries.len() > MAX_ARCHIVE_ENTRIES {
            return Err(EncodeError::LengthExceedsLimit {
                field: "archive entries",
                len: self.entries.len(),
                max: MAX_ARCHIVE_ENTRIES,
            });
        }

        let payload: usize = self
            .entries
            .iter()
            .map(|(k, v)| k.len() + v.len() + ENTRY_HEADER_SIZE)
            .sum();
        let mut writer = ByteWriter::with_capacity(payload + 9);
        writer.write_bytes(MAGIC_UNCOMPRESSED);
        writer.write_byte(ARCHIVE_FORMAT_VERSION);
        writer.write_u32(self.entries.len() as u32);
        for (name, data) in &self.entries {
            writer.write_string_u32(name, MAX_ENTRY_NAME_LEN, "entry name")?;
            writer.write_bytes_u32(data, MAX_ARCHIVE_SIZE, "entry data")?;
        }

        if writer.len() > MAX_ARCHIVE_SIZE {
            return Err(EncodeError::LengthExceedsLimit {
                field: "archive",
                len: writer.len(),
                max: MAX_ARCHIVE_SIZE,
            });
        }
        debug!(entries = self.entries.len(), bytes = writer.len(), "encoded archive");
        Ok(writer.into_bytes())
    }

    /// Encodes the archive with zstd compression at `level`.
    pub fn encode_compressed(&self, level: i32) -> Result<Vec<u8>, EncodeError> {
        let uncompressed = self.encode()?;

        let compressed = zstd::encode_all(uncompressed.as_slice(), level)
            .map_err(|e| EncodeError::CompressionFailed(e.to_string()))?;

        // encode() already capped the plain size below u32::MAX
        let mut writer = ByteWriter::with_capacity(5 + 4 + compressed.len());
        writer.write_bytes(MAGIC_COMPRESSED);
        writer.write_u32(uncompressed.len() as u32);
        writer.write_bytes(&compressed);

        debug!(
            uncompressed = uncompressed.len(),
            compressed = writer.len(),
            level,
            "compressed archive"
        );
        Ok(writer.into_bytes())
    }

    // =========================================================================
    // DECODING
    // =========================================================================

    /// Decodes an archive, detecting compression from the magic bytes.
    pub fn decode(input: &[u8]) -> Result<Self, DecodeError> {
        if input.len() < 4 {
            return Err(DecodeError::UnexpectedEof { context: "magic" });
        }
        if input.starts_with(MAGIC_COMPRESSED) {
            let decompressed = decompress(input)?;
            return Self::decode_plain(&decompressed);
        }
        Self::decode_plain(input)
    }

    fn decode_plain(input: &[u8]) -> Result<Self, DecodeError> {
        if input.len() > MAX_ARCHIVE_SIZE {
            return Err(DecodeError::LengthExceedsLimit {
                field: "archive",
                len: input.len(),
                max: MAX_ARCHIVE_SIZE,
            });
        }

        let mut reader = ByteReader::new(input);
        let magic = reader.read_bytes(4, "magic")?;
        if magic != MAGIC_UNCOMPRESSED {
            let mut found = [0u8; 4];
            found.copy_from_slice(magic);
            return Err(DecodeError::InvalidMagic { found });
        }

        let version = reader.read_byte("version")?;
        if !(MIN_ARCHIVE_FORMAT_VERSION..=ARCHIVE_FORMAT_VERSION).contains(&version) {
            return Err(DecodeError::UnsupportedVersion { version });
        }

        let count = reader.read_u32("entry count")? as usize;
        if count > MAX_ARCHIVE_ENTRIES {
            return Err(DecodeError::LengthExceedsLimit {
                field: "archive entries",
                len: count,
                max: MAX_ARCHIVE_ENTRIES,
            });
        }
        if count.saturating_mul(ENTRY_HEADER_SIZE) > reader.remaining_len() {
            return Err(DecodeError::UnexpectedEof {
                context: "archive entries",
            });
        }

        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let name = reader.read_string_u32(MAX_ENTRY_NAME_LEN, "entry name")?;
            let data = reader.read_bytes_u32(MAX_ARCHIVE_SIZE, "entry data")?;
            if entries.contains_key(&name) {
                return Err(DecodeError::DuplicateEntry { name });
            }
            entries.insert(name, data.to_vec());
        }

        debug!(entries = entries.len(), "decoded archive");
        Ok(Self { entries })
    }
}

/// Decompresses a DPARZ archive, returning the plain archive bytes.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    if input.len() < 5 {
        return Err(DecodeError::UnexpectedEof { context: "magic" });
    }
    if &input[0..5] != MAGIC_COMPRESSED {
        let mut found = [0u8; 4];
        found.copy_from_slice(&input[0..4]);
        return Err(DecodeError::InvalidMagic { found });
    }

    let mut reader = ByteReader::new(&input[5..]);
    let declared_size = reader.read_u32("uncompressed_size")? as usize;
    if declared_size > MAX_ARCHIVE_SIZE {
        return Err(DecodeError::LengthExceedsLimit {
            field: "uncompressed_size",
            len: declared_size,
            max: MAX_ARCHIVE_SIZE,
        });
    }

    let mut decoder = zstd::Decoder::new(reader.remaining())
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;

    // Never read past the declared size, whatever the frame claims.
    let mut decompressed = Vec::with_capacity(declared_size);
    (&mut decoder)
        .take(declared_size as u64 + 1)
        .read_to_end(&mut decompressed)
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;

    if decompressed.len() != declared_size {
        return Err(DecodeError::UncompressedSizeMismatch {
            declared: declared_size,
            actual: decompressed.len(),
        });
    }

    Ok(decompressed)
}
