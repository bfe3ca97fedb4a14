//! Binary side-file record formats.
//!
//! Every side-file starts with a u32 little-endian record count, followed by
//! fixed-width little-endian records with no padding.
//!
//! Material lists come in three layouts:
//!
//! ```text
//! Version2:  count:u32  { ambient diffuse specular emissive:u32  shininess transparency:f32 }*
//! Version3:  Version2 body, then { image image_path uuid: u32-length-prefixed UTF-8 }*
//! Undated:   count:i32  (negative: sentinel, real count:u32 follows)  Version2 records
//! ```

use crate::codec::primitives::{ByteReader, ByteWriter};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{MATERIAL_FORMAT_VERSION, MAX_STRING_LEN};
use crate::model::{Color, Material};

/// Fixed part of one material record.
const MATERIAL_RECORD_SIZE: usize = 4 * 4 + 2 * 4;

/// Side-file layout of a material list, selected by the `version`
/// attribute of its text record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaterialFormat {
    /// No version attribute: the count prefix is sniffed.
    Undated,
    /// Fixed records only.
    Version2,
    /// Fixed records, then a string triple per record.
    #[default]
    Version3,
}

impl MaterialFormat {
    /// Maps a `version` attribute value. Unknown versions are treated as
    /// undated, matching files written before versioning.
    pub fn from_version(version: Option<i64>) -> Self {
        match version {
            Some(2) => MaterialFormat::Version2,
            Some(MATERIAL_FORMAT_VERSION) => MaterialFormat::Version3,
            _ => MaterialFormat::Undated,
        }
    }

    pub fn version(&self) -> Option<i64> {
        match self {
            MaterialFormat::Undated => None,
            MaterialFormat::Version2 => Some(2),
            MaterialFormat::Version3 => Some(MATERIAL_FORMAT_VERSION),
        }
    }
}

// =============================================================================
// FLOAT LISTS
// =============================================================================

/// Encodes floats as f64, or f32 when `single_precision` is set.
pub fn encode_float_list(
    writer: &mut ByteWriter,
    values: &[f64],
    single_precision: bool,
) -> Result<(), EncodeError> {
    writer.write_count(values.len(), "float list")?;
    for &v in values {
        if single_precision {
            writer.write_f32(v as f32);
        } else {
            writer.write_f64(v);
        }
    }
    Ok(())
}

pub fn decode_float_list(
    reader: &mut ByteReader<'_>,
    single_precision: bool,
) -> Result<Vec<f64>, DecodeError> {
    let width = if single_precision { 4 } else { 8 };
    let count = reader.read_count(width, "float list")?;
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        let v = if single_precision {
            reader.read_f32("float list")? as f64
        } else {
            reader.read_f64("float list")?
        };
        values.push(v);
    }
    Ok(values)
}

// =============================================================================
// COLOUR LISTS
// =============================================================================

pub fn encode_color_list(writer: &mut ByteWriter, values: &[Color]) -> Result<(), EncodeError> {
    writer.write_count(values.len(), "color list")?;
    for c in values {
        writer.write_u32(c.packed());
    }
    Ok(())
}

pub fn decode_color_list(reader: &mut ByteReader<'_>) -> Result<Vec<Color>, DecodeError> {
    let count = reader.read_count(4, "color list")?;
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(Color::from_packed(reader.read_u32("color list")?));
    }
    Ok(values)
}

// =============================================================================
// MATERIAL LISTS
// =============================================================================

fn write_material_record(writer: &mut ByteWriter, m: &Material) {
    writer.write_u32(m.ambient_color.packed());
    writer.write_u32(m.diffuse_color.packed());
    writer.write_u32(m.specular_color.packed());
    writer.write_u32(m.emissive_color.packed());
    writer.write_f32(m.shininess);
    writer.write_f32(m.transparency);
}

fn read_material_record(reader: &mut ByteReader<'_>) -> Result<Material, DecodeError> {
    const CTX: &str = "material record";
    Ok(Material {
        ambient_color: Color::from_packed(reader.read_u32(CTX)?),
        diffuse_color: Color::from_packed(reader.read_u32(CTX)?),
        specular_color: Color::from_packed(reader.read_u32(CTX)?),
        emissive_color: Color::from_packed(reader.read_u32(CTX)?),
        shininess: reader.read_f32(CTX)?,
        transparency: reader.read_f32(CTX)?,
        ..Material::default()
    })
}

fn read_material_records(
    reader: &mut ByteReader<'_>,
    count: usize,
) -> Result<Vec<Material>, DecodeError> {
    reader.check_count(count, MATERIAL_RECORD_SIZE, "material list")?;
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(read_material_record(reader)?);
    }
    Ok(values)
}

/// Encodes materials in the given layout. Documents are always saved as
/// [`MaterialFormat::Version3`]; the older layouts exist for fixtures.
pub fn encode_material_list(
    writer: &mut ByteWriter,
    values: &[Material],
    format: MaterialFormat,
) -> Result<(), EncodeError> {
    writer.write_count(values.len(), "material list")?;
    for m in values {
        write_material_record(writer, m);
    }
    if format == MaterialFormat::Version3 {
        for m in values {
            writer.write_string_u32(&m.image, MAX_STRING_LEN, "material image")?;
            writer.write_string_u32(&m.image_path, MAX_STRING_LEN, "material image path")?;
            writer.write_string_u32(&m.uuid, MAX_STRING_LEN, "material uuid")?;
        }
    }
    Ok(())
}

pub fn decode_material_list(
    reader: &mut ByteReader<'_>,
    format: MaterialFormat,
) -> Result<Vec<Material>, DecodeError> {
    match format {
        MaterialFormat::Version2 => {
            let count = reader.read_u32("material list")? as usize;
            read_material_records(reader, count)
        }
        MaterialFormat::Version3 => {
            let count = reader.read_u32("material list")? as usize;
            let mut values = read_material_records(reader, count)?;
            for m in &mut values {
                m.image = reader.read_string_u32(MAX_STRING_LEN, "material image")?;
                m.image_path = reader.read_string_u32(MAX_STRING_LEN, "material image path")?;
                m.uuid = reader.read_string_u32(MAX_STRING_LEN, "material uuid")?;
            }
            Ok(values)
        }
        MaterialFormat::Undated => {
            let head = reader.read_i32("material list")?;
            let count = if head < 0 {
                reader.read_u32("material list")? as usize
            } else {
                head as usize
            };
            read_material_records(reader, count)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn textured(n: u8) -> Material {
        Material {
            diffuse_color: Color::from_bytes(n, 0, 255 - n, 255),
            shininess: 0.5,
            transparency: n as f32 / 255.0,
            image: format!("img{n}"),
            image_path: format!("/tex/{n}.png"),
            uuid: format!("uuid-{n}"),
            ..Material::default()
        }
    }

    #[test]
    fn test_float_list_layout() {
        let mut w = ByteWriter::new();
        encode_float_list(&mut w, &[1.0, -2.5], false).unwrap();
        let bytes = w.as_bytes();
        assert_eq!(&bytes[..4], &2u32.to_le_bytes());
        assert_eq!(&bytes[4..12], &1.0f64.to_le_bytes());
        assert_eq!(bytes.len(), 4 + 2 * 8);
    }

    #[test]
    fn test_float_list_single_precision() {
        let mut w = ByteWriter::new();
        encode_float_list(&mut w, &[0.5, 3.25], true).unwrap();
        assert_eq!(w.len(), 4 + 2 * 4);
        let decoded = decode_float_list(&mut ByteReader::new(w.as_bytes()), true).unwrap();
        assert_eq!(decoded, vec![0.5, 3.25]);
    }

    #[test]
    fn test_truncated_float_list() {
        let mut w = ByteWriter::new();
        encode_float_list(&mut w, &[1.0, 2.0, 3.0], false).unwrap();
        let bytes = &w.as_bytes()[..w.len() - 1];
        assert!(matches!(
            decode_float_list(&mut ByteReader::new(bytes), false),
            Err(DecodeError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_color_list_layout() {
        let mut w = ByteWriter::new();
        encode_color_list(&mut w, &[Color::rgb(1.0, 0.0, 0.0)]).unwrap();
        assert_eq!(w.as_bytes(), &[1, 0, 0, 0, 0xff, 0, 0, 0xff]);
    }

    #[test]
    fn test_material_v3_roundtrip() {
        let values = vec![textured(1), Material::default(), textured(200)];
        let mut w = ByteWriter::new();
        encode_material_list(&mut w, &values, MaterialFormat::Version3).unwrap();
        let decoded =
            decode_material_list(&mut ByteReader::new(w.as_bytes()), MaterialFormat::Version3)
                .unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_material_v2_drops_strings() {
        let values = vec![textured(7)];
        let mut w = ByteWriter::new();
        encode_material_list(&mut w, &values, MaterialFormat::Version2).unwrap();
        assert_eq!(w.len(), 4 + MATERIAL_RECORD_SIZE);

        let decoded =
            decode_material_list(&mut ByteReader::new(w.as_bytes()), MaterialFormat::Version2)
                .unwrap();
        assert_eq!(decoded[0].diffuse_color, values[0].diffuse_color);
        assert!(decoded[0].image.is_empty());
        assert!(decoded[0].uuid.is_empty());
    }

    #[test]
    fn test_material_undated_plain_count() {
        let values = vec![textured(3), textured(4)];
        let mut w = ByteWriter::new();
        encode_material_list(&mut w, &values, MaterialFormat::Version2).unwrap();
        let decoded =
            decode_material_list(&mut ByteReader::new(w.as_bytes()), MaterialFormat::Undated)
                .unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[1].transparency, values[1].transparency);
    }

    #[test]
    fn test_material_undated_sentinel() {
        let mut w = ByteWriter::new();
        w.write_i32(-1);
        w.write_u32(1);
        write_material_record(&mut w, &textured(9));
        let decoded =
            decode_material_list(&mut ByteReader::new(w.as_bytes()), MaterialFormat::Undated)
                .unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].diffuse_color, textured(9).diffuse_color);
    }

    #[test]
    fn test_material_count_exceeds_input() {
        let mut w = ByteWriter::new();
        w.write_u32(1000);
        write_material_record(&mut w, &Material::default());
        assert!(matches!(
            decode_material_list(&mut ByteReader::new(w.as_bytes()), MaterialFormat::Version3),
            Err(DecodeError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_format_from_version() {
        assert_eq!(MaterialFormat::from_version(Some(3)), MaterialFormat::Version3);
        assert_eq!(MaterialFormat::from_version(Some(2)), MaterialFormat::Version2);
        assert_eq!(MaterialFormat::from_version(None), MaterialFormat::Undated);
        assert_eq!(MaterialFormat::Version3.version(), Some(3));
    }

    proptest! {
        #[test]
        fn float_list_roundtrip(values in prop::collection::vec(any::<f64>().prop_filter("nan", |v| !v.is_nan()), 0..64)) {
            let mut w = ByteWriter::new();
            encode_float_list(&mut w, &values, false).unwrap();
            let decoded = decode_float_list(&mut ByteReader::new(w.as_bytes()), false).unwrap();
            prop_assert_eq!(decoded, values);
        }
    }
}
