//! Single-value properties: integer, float, bool, string, font, path, UUID.

use std::any::Any;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::{
    Property, PropertyBase, format_f64, paste_source, path_mismatch, round_to_i64, type_mismatch,
};
use crate::codec::{Writer, XmlReader};
use crate::error::{EncodeError, PropertyError, ReadError};
use crate::model::{DynValue, ObjectIdentifier, PathValue};

// =============================================================================
// INTEGER
// =============================================================================

/// A signed integer.
#[derive(Debug, Default)]
pub struct IntegerProperty {
    base: PropertyBase,
    value: i64,
}

impl IntegerProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: i64) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn set_value(&mut self, value: i64) {
        self.base.about_to_set_value();
        self.value = value;
        self.base.has_set_value();
    }
}

/// Integer assigned from an evaluator value, rounding non-integral inputs.
pub(crate) fn integer_from_path(value: &PathValue) -> Option<i64> {
    match value {
        PathValue::Int(v) => Some(*v),
        PathValue::UInt(v) => Some(i64::try_from(*v).unwrap_or(i64::MAX)),
        PathValue::Float(v) => Some(round_to_i64(*v as f64)),
        PathValue::Double(v) => Some(round_to_i64(*v)),
        PathValue::Quantity(q) => Some(round_to_i64(q.value)),
        _ => None,
    }
}

impl Property for IntegerProperty {
    fn type_name(&self) -> &'static str {
        "App::PropertyInteger"
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn editor_name(&self) -> &'static str {
        "Gui::PropertyEditor::PropertyIntegerItem"
    }

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.empty_element("Integer", &[("value", &self.value.to_string())]);
        Ok(())
    }

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
        reader.read_element("Integer")?;
        let value = reader.attribute_i64("value")?;
        self.set_value(value);
        Ok(())
    }

    fn to_dynamic(&self) -> DynValue {
        DynValue::Int(self.value)
    }

    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError> {
        let v = value.as_int().ok_or_else(|| type_mismatch("int", value))?;
        self.set_value(v);
        Ok(())
    }

    fn path_value(&self, path: &ObjectIdentifier) -> Result<PathValue, PropertyError> {
        self.base.verify_path(path)?;
        Ok(PathValue::Int(self.value))
    }

    fn set_path_value(
        &mut self,
        path: &ObjectIdentifier,
        value: &PathValue,
    ) -> Result<(), PropertyError> {
        self.base.verify_path(path)?;
        if let PathValue::Dynamic(v) = value {
            return self.set_dynamic(v);
        }
        let v = integer_from_path(value).ok_or_else(|| path_mismatch(&self.base, value))?;
        self.set_value(v);
        Ok(())
    }

    fn copy(&self) -> Box<dyn Property> {
        Box::new(Self {
            base: self.base.detached_copy(),
            value: self.value,
        })
    }

    fn paste(&mut self, from: &dyn Property) -> Result<(), PropertyError> {
        let source = paste_source::<Self>(self.type_name(), from)?;
        self.set_value(source.value);
        Ok(())
    }

    fn mem_size(&self) -> usize {
        std::mem::size_of::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// =============================================================================
// FLOAT
// =============================================================================

/// A double precision float.
#[derive(Debug, Default)]
pub struct FloatProperty {
    base: PropertyBase,
    value: f64,
}

impl FloatProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: f64) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.base.about_to_set_value();
        self.value = value;
        self.base.has_set_value();
    }
}

impl Property for FloatProperty {
    fn type_name(&self) -> &'static str {
        "App::PropertyFloat"
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn editor_name(&self) -> &'static str {
        "Gui::PropertyEditor::PropertyFloatItem"
    }

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.empty_element("Float", &[("value", &format_f64(self.value))]);
        Ok(())
    }

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
        reader.read_element("Float")?;
        let value = reader.attribute_f64("value")?;
        self.set_value(value);
        Ok(())
    }

    fn to_dynamic(&self) -> DynValue {
        DynValue::Float(self.value)
    }

    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError> {
        let v = match value {
            DynValue::Float(v) => *v,
            DynValue::Int(v) => *v as f64,
            _ => return Err(type_mismatch("float", value)),
        };
        self.set_value(v);
        Ok(())
    }

    fn path_value(&self, path: &ObjectIdentifier) -> Result<PathValue, PropertyError> {
        self.base.verify_path(path)?;
        Ok(PathValue::Double(self.value))
    }

    fn set_path_value(
        &mut self,
        path: &ObjectIdentifier,
        value: &PathValue,
    ) -> Result<(), PropertyError> {
        self.base.verify_path(path)?;
        if let PathValue::Dynamic(v) = value {
            return self.set_dynamic(v);
        }
        let v = value
            .as_f64()
            .ok_or_else(|| path_mismatch(&self.base, value))?;
        self.set_value(v);
        Ok(())
    }

    fn copy(&self) -> Box<dyn Property> {
        Box::new(Self {
            base: self.base.detached_copy(),
            value: self.value,
        })
    }

    fn paste(&mut self, from: &dyn Property) -> Result<(), PropertyError> {
        let source = paste_source::<Self>(self.type_name(), from)?;
        self.set_value(source.value);
        Ok(())
    }

    fn mem_size(&self) -> usize {
        std::mem::size_of::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// =============================================================================
// BOOL
// =============================================================================

#[derive(Debug, Default)]
pub struct BoolProperty {
    base: PropertyBase,
    value: bool,
}

impl BoolProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: bool) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn set_value(&mut self, value: bool) {
        self.base.about_to_set_value();
        self.value = value;
        self.base.has_set_value();
    }
}

impl Property for BoolProperty {
    fn type_name(&self) -> &'static str {
        "App::PropertyBool"
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn editor_name(&self) -> &'static str {
        "Gui::PropertyEditor::PropertyBoolItem"
    }

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        let value = if self.value { "true" } else { "false" };
        writer.empty_element("Bool", &[("value", value)]);
        Ok(())
    }

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
        reader.read_element("Bool")?;
        let value = reader.attribute("value")? == "true";
        self.set_value(value);
        Ok(())
    }

    fn to_dynamic(&self) -> DynValue {
        DynValue::Bool(self.value)
    }

    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError> {
        let v = match value {
            DynValue::Bool(b) => *b,
            DynValue::Int(v) => *v != 0,
            _ => return Err(type_mismatch("bool", value)),
        };
        self.set_value(v);
        Ok(())
    }

    fn path_value(&self, path: &ObjectIdentifier) -> Result<PathValue, PropertyError> {
        self.base.verify_path(path)?;
        Ok(PathValue::Bool(self.value))
    }

    fn set_path_value(
        &mut self,
        path: &ObjectIdentifier,
        value: &PathValue,
    ) -> Result<(), PropertyError> {
        self.base.verify_path(path)?;
        let v = match value {
            PathValue::Bool(b) => *b,
            PathValue::Quantity(q) => q.value != 0.0,
            PathValue::Dynamic(v) => return self.set_dynamic(v),
            other => integer_from_path(other).ok_or_else(|| path_mismatch(&self.base, value))? != 0,
        };
        self.set_value(v);
        Ok(())
    }

    fn copy(&self) -> Box<dyn Property> {
        Box::new(Self {
            base: self.base.detached_copy(),
            value: self.value,
        })
    }

    fn paste(&mut self, from: &dyn Property) -> Result<(), PropertyError> {
        let source = paste_source::<Self>(self.type_name(), from)?;
        self.set_value(source.value);
        Ok(())
    }

    fn mem_size(&self) -> usize {
        std::mem::size_of::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// =============================================================================
// STRING / FONT
// =============================================================================

/// A UTF-8 string. Font names use the same storage under their own type.
#[derive(Debug, Default)]
pub struct StringProperty {
    base: PropertyBase,
    value: String,
    font: bool,
}

impl StringProperty {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a font name property.
    pub fn font() -> Self {
        Self {
            font: true,
            ..Self::default()
        }
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn is_font(&self) -> bool {
        self.font
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.base.about_to_set_value();
        self.value = value.into();
        self.base.has_set_value();
    }
}

/// Text form of an evaluator value.
fn string_from_path(value: &PathValue) -> String {
    match value {
        PathValue::Bool(true) => "True".to_string(),
        PathValue::Bool(false) => "False".to_string(),
        PathValue::Int(v) => v.to_string(),
        PathValue::UInt(v) => v.to_string(),
        PathValue::Float(v) => format!("{v:.6}"),
        PathValue::Double(v) => format!("{v:.6}"),
        PathValue::Quantity(q) => q.user_string(),
        PathValue::String(s) => s.clone(),
        PathValue::Dynamic(v) => v.to_string(),
    }
}

impl Property for StringProperty {
    fn type_name(&self) -> &'static str {
        if self.font {
            "App::PropertyFont"
        } else {
            "App::PropertyString"
        }
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn editor_name(&self) -> &'static str {
        if self.font {
            "Gui::PropertyEditor::PropertyFontItem"
        } else {
            "Gui::PropertyEditor::PropertyStringItem"
        }
    }

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.empty_element("String", &[("value", &self.value)]);
        Ok(())
    }

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
        reader.read_element("String")?;
        let value = reader.attribute("value")?.to_string();
        self.set_value(value);
        Ok(())
    }

    fn to_dynamic(&self) -> DynValue {
        DynValue::Str(self.value.clone())
    }

    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError> {
        let s = value.as_str().ok_or_else(|| type_mismatch("str", value))?;
        self.set_value(s);
        Ok(())
    }

    fn path_value(&self, path: &ObjectIdentifier) -> Result<PathValue, PropertyError> {
        self.base.verify_path(path)?;
        Ok(PathValue::String(self.value.clone()))
    }

    fn set_path_value(
        &mut self,
        path: &ObjectIdentifier,
        value: &PathValue,
    ) -> Result<(), PropertyError> {
        self.base.verify_path(path)?;
        self.set_value(string_from_path(value));
        Ok(())
    }

    fn copy(&self) -> Box<dyn Property> {
        Box::new(Self {
            base: self.base.detached_copy(),
            value: self.value.clone(),
            font: self.font,
        })
    }

    fn paste(&mut self, from: &dyn Property) -> Result<(), PropertyError> {
        let source = paste_source::<Self>(self.type_name(), from)?;
        self.set_value(source.value.clone());
        Ok(())
    }

    fn mem_size(&self) -> usize {
        std::mem::size_of::<Self>() + self.value.capacity()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// =============================================================================
// PATH
// =============================================================================

/// A filesystem path.
#[derive(Debug, Default)]
pub struct PathProperty {
    base: PropertyBase,
    value: PathBuf,
}

impl PathProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &Path {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<PathBuf>) {
        self.base.about_to_set_value();
        self.value = value.into();
        self.base.has_set_value();
    }

    fn value_string(&self) -> String {
        self.value.to_string_lossy().into_owned()
    }
}

impl Property for PathProperty {
    fn type_name(&self) -> &'static str {
        "App::PropertyPath"
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn editor_name(&self) -> &'static str {
        "Gui::PropertyEditor::PropertyPathItem"
    }

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.empty_element("Path", &[("value", &self.value_string())]);
        Ok(())
    }

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
        reader.read_element("Path")?;
        let value = PathBuf::from(reader.attribute("value")?);
        self.set_value(value);
        Ok(())
    }

    fn to_dynamic(&self) -> DynValue {
        DynValue::Str(self.value_string())
    }

    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError> {
        let s = value.as_str().ok_or_else(|| type_mismatch("str", value))?;
        self.set_value(s);
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
        std::mem::size_of::<Self>() + self.value.as_os_str().len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// =============================================================================
// UUID
// =============================================================================

/// A UUID, nil by default.
#[derive(Debug, Default)]
pub struct UuidProperty {
    base: PropertyBase,
    value: Uuid,
}

impl UuidProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Uuid {
        self.value
    }

    pub fn set_value(&mut self, value: Uuid) {
        self.base.about_to_set_value();
        self.value = value;
        self.base.has_set_value();
    }

    /// Parses and assigns `value`. Unchanged and silent on a parse error.
    pub fn set_value_str(&mut self, value: &str) -> Result<(), PropertyError> {
        let uuid = Uuid::parse_str(value.trim()).map_err(|_| PropertyError::InvalidUuid {
            value: value.to_string(),
        })?;
        self.set_value(uuid);
        Ok(())
    }

    /// Assigns a fresh random UUID.
    pub fn generate(&mut self) {
        self.set_value(Uuid::new_v4());
    }

    /// Canonical lowercase hyphenated form.
    pub fn value_str(&self) -> String {
        self.value.hyphenated().to_string()
    }
}

impl Property for UuidProperty {
    fn type_name(&self) -> &'static str {
        "App::PropertyUUID"
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.empty_element("Uuid", &[("value", &self.value_str())]);
        Ok(())
    }

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
        reader.read_element("Uuid")?;
        let value = reader.attribute("value")?.to_string();
        self.set_value_str(&value)?;
        Ok(())
    }

    fn to_dynamic(&self) -> DynValue {
        DynValue::Str(self.value_str())
    }

    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError> {
        let s = value.as_str().ok_or_else(|| type_mismatch("str", value))?;
        self.set_value_str(s)
    }

    fn copy(&self) -> Box<dyn Property> {
        Box::new(Self {
            base: self.base.detached_copy(),
            value: self.value,
        })
    }

    fn paste(&mut self, from: &dyn Property) -> Result<(), PropertyError> {
        let source = paste_source::<Self>(self.type_name(), from)?;
        self.set_value(source.value);
        Ok(())
    }

    fn mem_size(&self) -> usize {
        std::mem::size_of::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
