//! String to string map property.

use std::any::Any;
use std::collections::BTreeMap;

use super::list::{read_children, write_children};
use super::{Property, PropertyBase, paste_source, type_mismatch};
use crate::codec::{Writer, XmlReader};
use crate::error::{EncodeError, PropertyError, ReadError};
use crate::model::DynValue;

/// A map of string keys to string values, ordered by key.
#[derive(Debug, Default)]
pub struct MapProperty {
    base: PropertyBase,
    values: BTreeMap<String, String>,
}

impl MapProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: BTreeMap<String, String>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Value under `key`, or "" when absent.
    pub fn value(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }

    /// Inserts or replaces one entry.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.base.about_to_set_value();
        self.values.insert(key.into(), value.into());
        self.base.has_set_value();
    }

    pub fn set_values(&mut self, values: BTreeMap<String, String>) {
        self.base.about_to_set_value();
        self.values = values;
        self.base.has_set_value();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Property for MapProperty {
    fn type_name(&self) -> &'static str {
        "App::PropertyMap"
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        write_children(writer, "Map", "Item", self.values.iter(), |w, child, (k, v)| {
            w.empty_element(child, &[("key", k.as_str()), ("value", v.as_str())]);
        });
        Ok(())
    }

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
        reader.read_element("Map")?;
        let entries = read_children(reader, "Map", "Item", |r| {
            Ok((r.attribute("key")?.to_string(), r.attribute("value")?.to_string()))
        })?;
        self.set_values(entries.into_iter().collect());
        Ok(())
    }

    fn to_dynamic(&self) -> DynValue {
        DynValue::Dict(
            self.values
                .iter()
                .map(|(k, v)| (DynValue::from(k.as_str()), DynValue::from(v.as_str())))
                .collect(),
        )
    }

    /// Accepts a dict with string keys and string values.
    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError> {
        let entries = value.as_dict().ok_or_else(|| type_mismatch("dict", value))?;
        let mut values = BTreeMap::new();
        for (k, v) in entries {
            let key = k.as_str().ok_or_else(|| PropertyError::KeyTypeMismatch {
                actual: k.type_name(),
            })?;
            let item = v.as_str().ok_or_else(|| PropertyError::ItemTypeMismatch {
                expected: "str",
                actual: v.type_name(),
            })?;
            values.insert(key.to_string(), item.to_string());
        }
        self.set_values(values);
        Ok(())
    }

    fn copy(&self) -> Box<dyn Property> {
        Box::new(Self {
            base: self.base.detached_copy(),
            values: self.values.clone(),
        })
    }

    fn paste(&mut self, from: &dyn Property) -> Result<(), PropertyError> {
        let source = paste_source::<Self>(self.type_name(), from)?;
        self.set_values(source.values.clone());
        Ok(())
    }

    fn mem_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .values
                .iter()
                .map(|(k, v)| k.len() + v.len())
                .sum::<usize>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
