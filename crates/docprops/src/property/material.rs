//! Material and material list properties.
//!
//! A material is saved as one element with packed colours:
//!
//! ```text
//! <PropertyMaterial ambientColor="858993663" diffuseColor="3435973887"
//!     specularColor="255" emissiveColor="255" shininess="0.2"
//!     transparency="0.0" image="" imagePath="" uuid=""/>
//! ```
//!
//! Material lists go to a versioned side-file, see
//! [`MaterialFormat`](crate::codec::MaterialFormat).

use std::any::Any;

use super::color::color_from_dynamic;
use super::list::read_children;
use super::{Property, PropertyBase, PropertyStatus, format_f32, paste_source, side_file_name};
use crate::codec::sidefile::{decode_material_list, encode_material_list};
use crate::codec::{ByteReader, ByteWriter, MaterialFormat, Writer, XmlReader};
use crate::error::{DecodeError, EncodeError, PropertyError, ReadError};
use crate::limits::MATERIAL_FORMAT_VERSION;
use crate::model::{Color, DynValue, Material};

fn write_material(writer: &mut Writer, m: &Material) {
    let packed = |c: Color| c.packed().to_string();
    writer.empty_element(
        "PropertyMaterial",
        &[
            ("ambientColor", &packed(m.ambient_color)),
            ("diffuseColor", &packed(m.diffuse_color)),
            ("specularColor", &packed(m.specular_color)),
            ("emissiveColor", &packed(m.emissive_color)),
            ("shininess", &format_f32(m.shininess)),
            ("transparency", &format_f32(m.transparency)),
            ("image", &m.image),
            ("imagePath", &m.image_path),
            ("uuid", &m.uuid),
        ],
    );
}

/// Reads the attributes of the current `PropertyMaterial` element over
/// `base`. The texture attributes are optional and keep `base` when absent.
fn read_material(reader: &XmlReader, base: &Material) -> Result<Material, ReadError> {
    let color = |name| reader.attribute_u32(name).map(Color::from_packed);
    let text = |name, current: &String| {
        reader
            .attribute_opt(name)
            .map_or_else(|| current.clone(), str::to_owned)
    };
    Ok(Material {
        ambient_color: color("ambientColor")?,
        diffuse_color: color("diffuseColor")?,
        specular_color: color("specularColor")?,
        emissive_color: color("emissiveColor")?,
        shininess: reader.attribute_f32("shininess")?,
        transparency: reader.attribute_f32("transparency")?,
        image: text("image", &base.image),
        image_path: text("imagePath", &base.image_path),
        uuid: text("uuid", &base.uuid),
    })
}

// =============================================================================
// MATERIAL
// =============================================================================

#[derive(Debug, Default)]
pub struct MaterialProperty {
    base: PropertyBase,
    value: Material,
}

impl MaterialProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: Material) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn value(&self) -> &Material {
        &self.value
    }

    pub fn set_value(&mut self, value: Material) {
        self.modify(|m| *m = value);
    }

    fn modify(&mut self, apply: impl FnOnce(&mut Material)) {
        self.base.about_to_set_value();
        apply(&mut self.value);
        self.base.has_set_value();
    }

    pub fn set_ambient_color(&mut self, color: Color) {
        self.modify(|m| m.ambient_color = color);
    }

    /// Plain colour assignments land on the diffuse colour.
    pub fn set_diffuse_color(&mut self, color: Color) {
        self.modify(|m| m.diffuse_color = color);
    }

    pub fn set_specular_color(&mut self, color: Color) {
        self.modify(|m| m.specular_color = color);
    }

    pub fn set_emissive_color(&mut self, color: Color) {
        self.modify(|m| m.emissive_color = color);
    }

    pub fn set_shininess(&mut self, shininess: f32) {
        self.modify(|m| m.shininess = shininess);
    }

    pub fn set_transparency(&mut self, transparency: f32) {
        self.modify(|m| m.transparency = transparency);
    }
}

impl Property for MaterialProperty {
    fn type_name(&self) -> &'static str {
        "App::PropertyMaterial"
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn editor_name(&self) -> &'static str {
        if self.base.test_status(PropertyStatus::MATERIAL_EDIT) {
            "Gui::PropertyEditor::PropertyMaterialItem"
        } else {
            ""
        }
    }

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        write_material(writer, &self.value);
        Ok(())
    }

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
        reader.read_element("PropertyMaterial")?;
        let value = read_material(reader, &self.value)?;
        self.set_value(value);
        Ok(())
    }

    fn to_dynamic(&self) -> DynValue {
        DynValue::from(self.value.clone())
    }

    /// Accepts a material, or a colour assigned as the diffuse colour.
    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError> {
        if let DynValue::Material(m) = value {
            self.set_value(m.as_ref().clone());
            return Ok(());
        }
        let color = color_from_dynamic(value)?;
        self.set_diffuse_color(color);
        Ok(())
    }

    fn copy(&self) -> Box<dyn Property> {
        Box::new(Self {
            base: self.base.detached_copy(),
            value: self.value.clone(),
        })
    }

    fn paste(&mut self, from: &dyn Property) -> Result<(), PropertyError> {
        let source = paste_source::<Self>(self.type_name(), from)?;
        self.set_value(source.value.clone());
        Ok(())
    }

    fn mem_size(&self) -> usize {
        std::mem::size_of::<PropertyBase>() + self.value.mem_size()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// =============================================================================
// MATERIAL LIST
// =============================================================================

/// A non-empty list of materials, one per face or element.
///
/// The list never shrinks below one entry. Per-index setters take an `i64`
/// index where `-1` and the current length both append one default entry.
#[derive(Debug)]
pub struct MaterialListProperty {
    base: PropertyBase,
    values: Vec<Material>,
    // Side-file layout announced by the last text element carrying a
    // version. Undated until one is read.
    format: MaterialFormat,
}

impl Default for MaterialListProperty {
    fn default() -> Self {
        Self {
            base: PropertyBase::default(),
            values: vec![Material::default()],
            format: MaterialFormat::Undated,
        }
    }
}

impl MaterialListProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: Vec<Material>) -> Self {
        let mut prop = Self::default();
        if !values.is_empty() {
            prop.values = values;
        }
        prop
    }

    pub fn values(&self) -> &[Material] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<&Material> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: the list keeps at least one entry.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replaces the list. An empty list resets to one default material.
    pub fn set_values(&mut self, values: Vec<Material>) {
        self.base.about_to_set_value();
        self.values = if values.is_empty() {
            vec![Material::default()]
        } else {
            values
        };
        self.base.has_set_value();
    }

    /// Replaces the list with the single material `value`.
    pub fn set_value(&mut self, value: Material) {
        self.set_values(vec![value]);
    }

    /// Sets the material at `index`.
    pub fn set_value_at(&mut self, index: i64, value: Material) -> Result<(), PropertyError> {
        self.modify_at(index, |m| *m = value)
    }

    fn slot(&self, index: i64) -> Result<usize, PropertyError> {
        let len = self.values.len();
        match index {
            -1 => Ok(len),
            i if i >= 0 && i as u64 <= len as u64 => Ok(i as usize),
            _ => Err(PropertyError::IndexOutOfBounds { index, size: len }),
        }
    }

    fn modify_at(
        &mut self,
        index: i64,
        apply: impl FnOnce(&mut Material),
    ) -> Result<(), PropertyError> {
        let slot = self.slot(index)?;
        self.base.about_to_set_value();
        if slot == self.values.len() {
            self.values.push(Material::default());
        }
        apply(&mut self.values[slot]);
        self.base.has_set_value();
        Ok(())
    }

    fn modify_all(&mut self, apply: impl Fn(&mut Material)) {
        self.base.about_to_set_value();
        if self.values.is_empty() {
            self.values.push(Material::default());
        }
        self.values.iter_mut().for_each(apply);
        self.base.has_set_value();
    }

    // Resizes to `len` (at least one), padding with copies of the first
    // entry, then assigns per index.
    fn assign_each<T: Copy>(&mut self, items: &[T], apply: impl Fn(&mut Material, T)) {
        self.base.about_to_set_value();
        let fill = self.values.first().cloned().unwrap_or_default();
        self.values.resize(items.len().max(1), fill);
        for (m, item) in self.values.iter_mut().zip(items) {
            apply(m, *item);
        }
        self.base.has_set_value();
    }

    pub fn set_ambient_color(&mut self, color: Color) {
        self.modify_all(|m| m.ambient_color = color);
    }

    pub fn set_diffuse_color(&mut self, color: Color) {
        self.modify_all(|m| m.diffuse_color = color);
    }

    pub fn set_specular_color(&mut self, color: Color) {
        self.modify_all(|m| m.specular_color = color);
    }

    pub fn set_emissive_color(&mut self, color: Color) {
        self.modify_all(|m| m.emissive_color = color);
    }

    pub fn set_shininess(&mut self, shininess: f32) {
        self.modify_all(|m| m.shininess = shininess);
    }

    pub fn set_transparency(&mut self, transparency: f32) {
        self.modify_all(|m| m.transparency = transparency);
    }

    pub fn set_ambient_color_at(&mut self, index: i64, color: Color) -> Result<(), PropertyError> {
        self.modify_at(index, |m| m.ambient_color = color)
    }

    pub fn set_diffuse_color_at(&mut self, index: i64, color: Color) -> Result<(), PropertyError> {
        self.modify_at(index, |m| m.diffuse_color = color)
    }

    pub fn set_specular_color_at(&mut self, index: i64, color: Color) -> Result<(), PropertyError> {
        self.modify_at(index, |m| m.specular_color = color)
    }

    pub fn set_emissive_color_at(&mut self, index: i64, color: Color) -> Result<(), PropertyError> {
        self.modify_at(index, |m| m.emissive_color = color)
    }

    pub fn set_shininess_at(&mut self, index: i64, shininess: f32) -> Result<(), PropertyError> {
        self.modify_at(index, |m| m.shininess = shininess)
    }

    pub fn set_transparency_at(
        &mut self,
        index: i64,
        transparency: f32,
    ) -> Result<(), PropertyError> {
        self.modify_at(index, |m| m.transparency = transparency)
    }

    /// Resizes to `colors.len()` and assigns one diffuse colour per entry.
    pub fn set_diffuse_colors(&mut self, colors: &[Color]) {
        self.assign_each(colors, |m, c| m.diffuse_color = c);
    }

    /// Resizes to `values.len()` and assigns one transparency per entry.
    pub fn set_transparencies(&mut self, values: &[f32]) {
        self.assign_each(values, |m, t| m.transparency = t);
    }

    pub fn ambient_color(&self, index: usize) -> Option<Color> {
        self.value(index).map(|m| m.ambient_color)
    }

    pub fn diffuse_color(&self, index: usize) -> Option<Color> {
        self.value(index).map(|m| m.diffuse_color)
    }

    pub fn specular_color(&self, index: usize) -> Option<Color> {
        self.value(index).map(|m| m.specular_color)
    }

    pub fn emissive_color(&self, index: usize) -> Option<Color> {
        self.value(index).map(|m| m.emissive_color)
    }

    pub fn shininess(&self, index: usize) -> Option<f32> {
        self.value(index).map(|m| m.shininess)
    }

    pub fn transparency(&self, index: usize) -> Option<f32> {
        self.value(index).map(|m| m.transparency)
    }

    pub fn diffuse_colors(&self) -> Vec<Color> {
        self.values.iter().map(|m| m.diffuse_color).collect()
    }

    pub fn transparencies(&self) -> Vec<f32> {
        self.values.iter().map(|m| m.transparency).collect()
    }

    /// Side-file layout expected by the next [`Property::restore_doc_file`].
    pub fn format(&self) -> MaterialFormat {
        self.format
    }
}

fn material_mismatch(value: &DynValue) -> PropertyError {
    PropertyError::TypeMismatch {
        expected: "'Material'",
        actual: value.type_name(),
    }
}

impl Property for MaterialListProperty {
    fn type_name(&self) -> &'static str {
        "App::PropertyMaterialList"
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn editor_name(&self) -> &'static str {
        if self.base.test_status(PropertyStatus::NO_MATERIAL_LIST_EDIT) {
            ""
        } else {
            "Gui::PropertyEditor::PropertyMaterialListItem"
        }
    }

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        let version = MATERIAL_FORMAT_VERSION.to_string();
        if writer.is_force_xml() {
            writer.start_element(
                "MaterialList",
                &[("count", &self.values.len().to_string()), ("version", &version)],
            );
            for m in &self.values {
                write_material(writer, m);
            }
            writer.end_element("MaterialList");
            return Ok(());
        }

        let mut bytes = ByteWriter::new();
        self.save_doc_file(&mut bytes)?;
        let file = writer.add_file(&side_file_name(&self.base, "MaterialList"), bytes.into_bytes());
        writer.empty_element("MaterialList", &[("file", &file), ("version", &version)]);
        Ok(())
    }

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
        reader.read_element("MaterialList")?;
        // A missing version keeps the layout from the previous restore.
        if reader.has_attribute("version") {
            let version = reader.attribute_i64("version")?;
            self.format = MaterialFormat::from_version(Some(version));
        }

        match reader.attribute_opt("file").map(str::to_owned) {
            Some(file) if !file.is_empty() => {
                reader.add_file(&file, self.base.name());
            }
            None if reader.has_attribute("count") => {
                let defaults = Material::default();
                let values = read_children(reader, "MaterialList", "PropertyMaterial", |r| {
                    read_material(r, &defaults)
                })?;
                self.set_values(values);
            }
            _ => self.set_values(Vec::new()),
        }
        Ok(())
    }

    fn save_doc_file(&self, writer: &mut ByteWriter) -> Result<(), EncodeError> {
        encode_material_list(writer, &self.values, MaterialFormat::Version3)
    }

    fn restore_doc_file(&mut self, reader: &mut ByteReader<'_>) -> Result<(), DecodeError> {
        let values = decode_material_list(reader, self.format)?;
        self.set_values(values);
        Ok(())
    }

    fn to_dynamic(&self) -> DynValue {
        DynValue::Tuple(self.values.iter().cloned().map(DynValue::from).collect())
    }

    /// Accepts a material, or a list or tuple of materials.
    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError> {
        if let DynValue::Material(m) = value {
            self.set_value(m.as_ref().clone());
            return Ok(());
        }
        let items = value.as_sequence().ok_or_else(|| material_mismatch(value))?;
        let values = items
            .iter()
            .map(|item| match item {
                DynValue::Material(m) => Ok(m.as_ref().clone()),
                other => Err(material_mismatch(other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.set_values(values);
        Ok(())
    }

    fn copy(&self) -> Box<dyn Property> {
        Box::new(Self {
            base: self.base.detached_copy(),
            values: self.values.clone(),
            format: self.format,
        })
    }

    fn paste(&mut self, from: &dyn Property) -> Result<(), PropertyError> {
        let source = paste_source::<Self>(self.type_name(), from)?;
        self.set_values(source.values.clone());
        Ok(())
    }

    fn mem_size(&self) -> usize {
        std::mem::size_of::<Self>() + self.values.iter().map(Material::mem_size).sum::<usize>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DocumentArchive, SaveOptions};
    use crate::error::ErrorKind;
    use crate::property::test_support::{Recorder, full_roundtrip, text_roundtrip};

    fn textured(n: u8) -> Material {
        Material {
            diffuse_color: Color::from_bytes(n, 10, 20, 255),
            shininess: 0.5,
            transparency: 0.25,
            image: format!("tex{n}"),
            image_path: format!("/lib/tex{n}.png"),
            uuid: format!("uuid-{n}"),
            ..Material::default()
        }
    }

    #[test]
    fn test_material_text_form() {
        let prop = MaterialProperty::with_value(textured(3));
        let mut restored = MaterialProperty::new();
        text_roundtrip(&prop, &mut restored);
        assert_eq!(restored.value(), prop.value());
    }

    #[test]
    fn test_material_restore_keeps_absent_texture() {
        let mut prop = MaterialProperty::with_value(textured(1));
        let mut reader = XmlReader::new(
            "<PropertyMaterial ambientColor=\"255\" diffuseColor=\"4278190335\" \
             specularColor=\"255\" emissiveColor=\"255\" shininess=\"0.1\" transparency=\"0.5\"/>",
        )
        .unwrap();
        prop.restore(&mut reader).unwrap();
        assert_eq!(prop.value().diffuse_color, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(prop.value().transparency, 0.5);
        assert_eq!(prop.value().image, "tex1");
    }

    #[test]
    fn test_material_dynamic() {
        let mut prop = MaterialProperty::new();
        prop.set_dynamic(&DynValue::from(textured(2))).unwrap();
        assert_eq!(prop.value(), &textured(2));

        let green = DynValue::Tuple(vec![
            DynValue::Float(0.0),
            DynValue::Float(1.0),
            DynValue::Float(0.0),
        ]);
        prop.set_dynamic(&green).unwrap();
        assert_eq!(prop.value().diffuse_color, Color::rgb(0.0, 1.0, 0.0));
        assert_eq!(prop.value().image, "tex2");

        assert!(prop.set_dynamic(&DynValue::from("gold")).is_err());
    }

    #[test]
    fn test_material_editor_name() {
        let mut prop = MaterialProperty::new();
        assert_eq!(prop.editor_name(), "");
        prop.base_mut().set_status(PropertyStatus::MATERIAL_EDIT, true);
        assert_eq!(prop.editor_name(), "Gui::PropertyEditor::PropertyMaterialItem");

        let mut list = MaterialListProperty::new();
        assert_eq!(list.editor_name(), "Gui::PropertyEditor::PropertyMaterialListItem");
        list.base_mut().set_status(PropertyStatus::NO_MATERIAL_LIST_EDIT, true);
        assert_eq!(list.editor_name(), "");
    }

    #[test]
    fn test_list_minimum_size() {
        let mut list = MaterialListProperty::new();
        assert_eq!(list.values(), &[Material::default()]);

        list.set_values(vec![textured(1), textured(2)]);
        assert_eq!(list.len(), 2);
        list.set_values(Vec::new());
        assert_eq!(list.values(), &[Material::default()]);
        assert!(!list.is_empty());
        assert_eq!(MaterialListProperty::with_values(Vec::new()).len(), 1);
    }

    #[test]
    fn test_list_index_setters() {
        let owner = Recorder::new();
        let mut list = MaterialListProperty::new();
        list.base_mut().attach("Shape", &owner);

        list.set_diffuse_color_at(0, Color::WHITE).unwrap();
        list.set_diffuse_color_at(-1, Color::rgb(1.0, 0.0, 0.0)).unwrap();
        list.set_transparency_at(2, 0.5).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.diffuse_color(1), Some(Color::rgb(1.0, 0.0, 0.0)));
        assert_eq!(list.transparency(2), Some(0.5));
        assert_eq!(owner.events().len(), 6);

        owner.clear();
        let err = list.set_shininess_at(4, 1.0).unwrap_err();
        assert_eq!(err, PropertyError::IndexOutOfBounds { index: 4, size: 3 });
        assert_eq!(err.kind(), ErrorKind::Bounds);
        assert!(list.set_value_at(-2, Material::default()).is_err());
        assert!(owner.events().is_empty());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_list_broadcast_setters() {
        let owner = Recorder::new();
        let mut list = MaterialListProperty::with_values(vec![textured(1), textured(2)]);
        list.base_mut().attach("Shape", &owner);

        list.set_transparency(0.75);
        assert_eq!(list.transparencies(), vec![0.75, 0.75]);
        list.set_emissive_color(Color::WHITE);
        assert!(list.values().iter().all(|m| m.emissive_color == Color::WHITE));
        assert_eq!(owner.events().len(), 4);
    }

    #[test]
    fn test_list_resize_setters() {
        let mut list = MaterialListProperty::with_values(vec![textured(7)]);
        list.set_diffuse_colors(&[Color::WHITE, Color::BLACK, Color::rgb(0.0, 0.0, 1.0)]);
        assert_eq!(list.len(), 3);
        assert_eq!(
            list.diffuse_colors(),
            vec![Color::WHITE, Color::BLACK, Color::rgb(0.0, 0.0, 1.0)]
        );
        // padded entries copy the first material
        assert_eq!(list.value(2).map(|m| m.image.as_str()), Some("tex7"));

        list.set_transparencies(&[0.1]);
        assert_eq!(list.transparencies(), vec![0.1]);

        list.set_transparencies(&[]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_list_side_file() {
        let mut list = MaterialListProperty::with_values(vec![textured(1), textured(2)]);
        list.base_mut().set_name("Materials");

        let mut restored = MaterialListProperty::new();
        let text = full_roundtrip(&list, &mut restored, SaveOptions::default());
        assert_eq!(text, "<MaterialList file=\"Materials.bin\" version=\"3\"/>\n");
        assert_eq!(restored.values(), list.values());
        assert_eq!(restored.format(), MaterialFormat::Version3);
    }

    #[test]
    fn test_list_force_xml() {
        let list = MaterialListProperty::with_values(vec![textured(4), Material::default()]);
        let mut restored = MaterialListProperty::new();
        let text = full_roundtrip(&list, &mut restored, SaveOptions::new().with_force_xml(true));
        assert!(text.starts_with("<MaterialList count=\"2\" version=\"3\">"));
        assert_eq!(restored.values(), list.values());
    }

    #[test]
    fn test_list_undated_side_file() {
        let values = vec![Material::with_diffuse(Color::WHITE)];
        let mut bytes = ByteWriter::new();
        encode_material_list(&mut bytes, &values, MaterialFormat::Undated).unwrap();
        let mut archive = DocumentArchive::new();
        archive.insert("old.bin", bytes.into_bytes());

        let mut list = MaterialListProperty::new();
        list.base_mut().set_name("Shape");
        let mut reader = XmlReader::new("<MaterialList file=\"old.bin\"/>").unwrap();
        list.restore(&mut reader).unwrap();
        assert_eq!(list.format(), MaterialFormat::Undated);

        archive
            .restore_pending(&mut reader, &mut [&mut list as &mut dyn Property])
            .unwrap();
        assert_eq!(list.values(), values.as_slice());
    }

    #[test]
    fn test_list_missing_version_keeps_format() {
        let values = vec![textured(5)];
        let mut bytes = ByteWriter::new();
        encode_material_list(&mut bytes, &values, MaterialFormat::Version3).unwrap();
        let current = bytes.into_bytes();
        let mut archive = DocumentArchive::new();
        archive.insert("first.bin", current.clone());
        archive.insert("again.bin", current);

        let mut list = MaterialListProperty::new();
        list.base_mut().set_name("Shape");
        let mut reader = XmlReader::new("<MaterialList file=\"first.bin\" version=\"3\"/>").unwrap();
        list.restore(&mut reader).unwrap();
        assert_eq!(list.format(), MaterialFormat::Version3);
        archive
            .restore_pending(&mut reader, &mut [&mut list as &mut dyn Property])
            .unwrap();

        let mut reader = XmlReader::new("<MaterialList file=\"again.bin\"/>").unwrap();
        list.restore(&mut reader).unwrap();
        assert_eq!(list.format(), MaterialFormat::Version3);
        archive
            .restore_pending(&mut reader, &mut [&mut list as &mut dyn Property])
            .unwrap();
        assert_eq!(list.values(), values.as_slice());
    }

    #[test]
    fn test_list_empty_reference_resets() {
        let mut list = MaterialListProperty::with_values(vec![textured(1), textured(2)]);
        let mut reader = XmlReader::new("<MaterialList file=\"\" version=\"3\"/>").unwrap();
        list.restore(&mut reader).unwrap();
        assert_eq!(list.values(), &[Material::default()]);
    }

    #[test]
    fn test_list_dynamic() {
        let mut list = MaterialListProperty::new();
        list.set_dynamic(&DynValue::List(vec![
            DynValue::from(textured(1)),
            DynValue::from(textured(2)),
        ]))
        .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.to_dynamic(),
            DynValue::Tuple(vec![DynValue::from(textured(1)), DynValue::from(textured(2))])
        );

        let err = list
            .set_dynamic(&DynValue::List(vec![DynValue::Int(1)]))
            .unwrap_err();
        assert_eq!(err.to_string(), "type must be 'Material', not int");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_list_paste() {
        let source = MaterialListProperty::with_values(vec![textured(5); 3]);
        let mut target = MaterialListProperty::new();
        target.paste(&source).unwrap();
        assert_eq!(target.values(), source.values());
        assert!(target.paste(&MaterialProperty::new()).is_err());
    }
}
