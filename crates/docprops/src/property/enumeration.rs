//! Enumeration property: one label selected from a static or custom set.
//!
//! Custom label sets are saved with the index:
//!
//! ```text
//! <Integer value="1" CustomEnum="true"/>
//! <CustomEnumList count="2">
//!     <Enum value="Left"/>
//!     <Enum value="Right"/>
//! </CustomEnumList>
//! ```

use std::any::Any;

use tracing::warn;

use super::{Property, PropertyBase, paste_source, path_mismatch};
use crate::codec::{Writer, XmlReader};
use crate::error::{EncodeError, PropertyError, ReadError};
use crate::limits::MAX_TEXT_PREALLOC;
use crate::model::{DynValue, Enumeration, ObjectIdentifier, PathValue};

const ACCEPTED_SHAPES: &str = "int, string, or list(string), or list(list, int)";

#[derive(Debug, Default)]
pub struct EnumerationProperty {
    base: PropertyBase,
    value: Enumeration,
}

impl EnumerationProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enumeration(value: Enumeration) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    // Label swaps on a detached property stay silent: objects fill in their
    // labels while being constructed, before anyone observes them.
    fn replace_labels(&mut self, apply: impl FnOnce(&mut Enumeration)) {
        let notify = self.base.is_attached();
        if notify {
            self.base.about_to_set_value();
        }
        apply(&mut self.value);
        if notify {
            self.base.has_set_value();
        }
    }

    /// Replaces the labels with a static table.
    pub fn set_enums(&mut self, labels: &'static [&'static str]) {
        self.replace_labels(|e| e.set_static_labels(labels));
    }

    /// Replaces the labels with custom labels, saved with the document.
    pub fn set_enum_vector(&mut self, labels: Vec<String>) {
        self.replace_labels(|e| e.set_labels(labels));
    }

    pub fn enum_vector(&self) -> Vec<String> {
        self.value.label_vec()
    }

    pub fn enumeration(&self) -> &Enumeration {
        &self.value
    }

    pub fn has_enums(&self) -> bool {
        self.value.has_labels()
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_valid()
    }

    /// Selected index, -1 or out of range when invalid.
    pub fn value(&self) -> i64 {
        self.value.index()
    }

    /// Selects `index`, which must lie in `-1..len`.
    pub fn set_index(&mut self, index: i64) -> Result<(), PropertyError> {
        self.check_index(index)?;
        self.base.about_to_set_value();
        self.value.set_index(index);
        self.base.has_set_value();
        Ok(())
    }

    fn check_index(&self, index: i64) -> Result<(), PropertyError> {
        if index < -1 || index > self.value.max_value() {
            return Err(PropertyError::EnumIndexOutOfRange {
                index,
                property: self.base.full_name(),
            });
        }
        Ok(())
    }

    /// Selects `label`, which must be part of the enumeration.
    pub fn set_value_str(&mut self, label: &str) -> Result<(), PropertyError> {
        if !self.value.contains(label) {
            return Err(PropertyError::NotInEnumeration {
                value: label.to_string(),
                property: self.base.full_name(),
            });
        }
        self.base.about_to_set_value();
        self.value.set_value(label);
        self.base.has_set_value();
        Ok(())
    }

    /// Replaces labels and selection together.
    pub fn set_enumeration(&mut self, value: Enumeration) {
        self.base.about_to_set_value();
        self.value = value;
        self.base.has_set_value();
    }

    /// Selected label. Fails when the enumeration is invalid.
    pub fn value_as_str(&self) -> Result<&str, PropertyError> {
        self.value.value_str().ok_or(PropertyError::InvalidEnumeration)
    }

    /// Returns true if `label` is selected.
    pub fn is_value(&self, label: &str) -> bool {
        self.value.is_value(label)
    }

    /// Returns true if `label` is one of the labels.
    pub fn is_part_of(&self, label: &str) -> bool {
        self.value.contains(label)
    }

    fn shape_error(&self, value: &DynValue) -> PropertyError {
        PropertyError::UnsupportedShape {
            property: self.base.full_name(),
            expected: ACCEPTED_SHAPES,
            actual: value.type_name(),
        }
    }

    fn set_from_sequence(&mut self, value: &DynValue, items: &[DynValue]) -> Result<(), PropertyError> {
        // (labels, index) pair
        let (labels, index) = match items {
            [first, second] if first.as_sequence().is_some() => {
                let index = second.as_int().ok_or_else(|| self.shape_error(value))?;
                (first.as_sequence().unwrap_or_default(), Some(index))
            }
            _ => (items, None),
        };
        let labels = labels
            .iter()
            .map(|v| v.as_str().map(str::to_owned).ok_or_else(|| self.shape_error(value)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut next = self.value.clone();
        next.set_labels(labels);
        if let Some(index) = index.filter(|i| *i >= 0) {
            if !next.set_index(index) {
                return Err(PropertyError::EnumIndexOutOfRange {
                    index,
                    property: self.base.full_name(),
                });
            }
        }
        self.set_enumeration(next);
        Ok(())
    }
}

impl Property for EnumerationProperty {
    fn type_name(&self) -> &'static str {
        "App::PropertyEnumeration"
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn editor_name(&self) -> &'static str {
        "Gui::PropertyEditor::PropertyEnumItem"
    }

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        let index = self.value.index().to_string();
        if !self.value.is_custom() {
            writer.empty_element("Integer", &[("value", &index)]);
            return Ok(());
        }

        writer.empty_element("Integer", &[("value", &index), ("CustomEnum", "true")]);
        writer.start_element("CustomEnumList", &[("count", &self.value.len().to_string())]);
        for label in self.value.labels() {
            writer.empty_element("Enum", &[("value", label)]);
        }
        writer.end_element("CustomEnumList");
        Ok(())
    }

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
        reader.read_element("Integer")?;
        let mut index = reader.attribute_i64("value")?;

        let mut next = self.value.clone();
        if reader.has_attribute("CustomEnum") {
            reader.read_element("CustomEnumList")?;
            let count = reader.attribute_count("count")?;
            let mut labels = Vec::with_capacity(count.min(MAX_TEXT_PREALLOC));
            for _ in 0..count {
                reader.read_element("Enum")?;
                labels.push(reader.attribute("value")?.to_string());
            }
            reader.read_end_element("CustomEnumList")?;
            next.set_labels(labels);
        }

        if index < 0 {
            if next.has_labels() {
                warn!(
                    property = %self.base.full_name(),
                    index,
                    "enumeration index is out of range, ignoring it"
                );
            }
            index = next.index();
        }
        if !next.set_index(index) {
            warn!(
                property = %self.base.full_name(),
                index,
                labels = next.len(),
                "enumeration index is past the last label, ignoring it"
            );
        }

        self.set_enumeration(next);
        Ok(())
    }

    fn to_dynamic(&self) -> DynValue {
        match self.value.value_str() {
            Some(label) => DynValue::Str(label.to_string()),
            None => DynValue::None,
        }
    }

    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError> {
        match value {
            DynValue::Int(_) | DynValue::Bool(_) => {
                let index = value.as_int().unwrap_or_default();
                if self.value.is_valid() {
                    self.set_index(index)?;
                }
                Ok(())
            }
            DynValue::Str(label) => self.set_value_str(label),
            DynValue::List(items) | DynValue::Tuple(items) => self.set_from_sequence(value, items),
            _ => Err(self.shape_error(value)),
        }
    }

    /// `.Enum` yields the labels, `.All` the labels and index, `.String`
    /// the selected label. Anything else yields the index.
    fn path_value(&self, path: &ObjectIdentifier) -> Result<PathValue, PropertyError> {
        if !self.base.name().is_empty() && path.property_name() != self.base.name() {
            return Err(PropertyError::InvalidPath {
                path: path.to_string(),
                property: self.base.full_name(),
            });
        }
        let labels = || DynValue::str_tuple(self.value.labels());
        Ok(match path.first_component() {
            Some("Enum") => PathValue::Dynamic(labels()),
            Some("All") => PathValue::Dynamic(DynValue::Tuple(vec![
                labels(),
                DynValue::Int(self.value.index()),
            ])),
            Some("String") => {
                PathValue::String(self.value.value_str().unwrap_or_default().to_string())
            }
            _ => PathValue::Int(self.value.index()),
        })
    }

    fn set_path_value(
        &mut self,
        path: &ObjectIdentifier,
        value: &PathValue,
    ) -> Result<(), PropertyError> {
        if !self.base.name().is_empty() && path.property_name() != self.base.name() {
            return Err(PropertyError::InvalidPath {
                path: path.to_string(),
                property: self.base.full_name(),
            });
        }
        match value {
            PathValue::Int(v) => self.set_index(*v),
            PathValue::UInt(v) => self.set_index(i64::try_from(*v).unwrap_or(i64::MAX)),
            PathValue::Float(v) => self.set_index(v.trunc() as i64),
            PathValue::Double(v) => self.set_index(v.trunc() as i64),
            PathValue::String(s) => self.set_value_str(s),
            PathValue::Dynamic(v) => self.set_dynamic(v),
            _ => Err(path_mismatch(&self.base, value)),
        }
    }

    fn copy(&self) -> Box<dyn Property> {
        Box::new(Self {
            base: self.base.detached_copy(),
            value: self.value.clone(),
        })
    }

    fn paste(&mut self, from: &dyn Property) -> Result<(), PropertyError> {
        let source = paste_source::<Self>(self.type_name(), from)?;
        self.set_enumeration(source.value.clone());
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
