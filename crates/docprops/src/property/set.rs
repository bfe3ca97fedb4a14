//! Ordered integer set property.

use std::any::Any;
use std::collections::BTreeSet;

use super::list::{read_children, write_children};
use super::{Property, PropertyBase, paste_source, type_mismatch};
use crate::codec::{Writer, XmlReader};
use crate::error::{EncodeError, PropertyError, ReadError};
use crate::model::DynValue;

/// A set of integers, kept in ascending order.
#[derive(Debug, Default)]
pub struct IntegerSetProperty {
    base: PropertyBase,
    values: BTreeSet<i64>,
}

impl IntegerSetProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: impl IntoIterator<Item = i64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn values(&self) -> &BTreeSet<i64> {
        &self.values
    }

    /// Replaces the set with the single `value`.
    pub fn set_value(&mut self, value: i64) {
        self.set_values(BTreeSet::from([value]));
    }

    pub fn set_values(&mut self, values: BTreeSet<i64>) {
        self.base.about_to_set_value();
        self.values = values;
        self.base.has_set_value();
    }

    pub fn contains(&self, value: i64) -> bool {
        self.values.contains(&value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Property for IntegerSetProperty {
    fn type_name(&self) -> &'static str {
        "App::PropertyIntegerSet"
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        write_children(writer, "IntegerSet", "I", self.values.iter(), |w, child, v| {
            w.empty_element(child, &[("v", &v.to_string())]);
        });
        Ok(())
    }

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
        reader.read_element("IntegerSet")?;
        let values = read_children(reader, "IntegerSet", "I", |r| r.attribute_i64("v"))?;
        self.set_values(values.into_iter().collect());
        Ok(())
    }

    fn to_dynamic(&self) -> DynValue {
        DynValue::Set(self.values.iter().map(|v| DynValue::Int(*v)).collect())
    }

    /// Accepts an int, or a list, tuple or set of ints.
    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError> {
        if let Some(v) = value.as_int() {
            self.set_value(v);
            return Ok(());
        }
        let items = value
            .as_iterable()
            .ok_or_else(|| type_mismatch("int or list of int", value))?;
        let values = items
            .iter()
            .map(|item| {
                item.as_int().ok_or_else(|| PropertyError::ItemTypeMismatch {
                    expected: "int",
                    actual: item.type_name(),
                })
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
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
        std::mem::size_of::<Self>() + self.values.len() * std::mem::size_of::<i64>()
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
    use crate::property::test_support::{Recorder, text_roundtrip};

    #[test]
    fn test_text_form_is_sorted() {
        let prop = IntegerSetProperty::with_values([5, -1, 3, 5]);
        let mut writer = Writer::new();
        prop.save(&mut writer).unwrap();
        assert_eq!(
            writer.as_str(),
            "<IntegerSet count=\"3\">\n    <I v=\"-1\"/>\n    <I v=\"3\"/>\n    <I v=\"5\"/>\n</IntegerSet>\n"
        );

        let mut restored = IntegerSetProperty::new();
        text_roundtrip(&prop, &mut restored);
        assert_eq!(restored.values(), prop.values());
    }

    #[test]
    fn test_dynamic() {
        let owner = Recorder::new();
        let mut prop = IntegerSetProperty::new();
        prop.base_mut().attach("Faces", &owner);

        prop.set_dynamic(&DynValue::List(vec![DynValue::Int(2), DynValue::Int(1), DynValue::Int(2)]))
            .unwrap();
        assert_eq!(prop.len(), 2);
        assert_eq!(
            prop.to_dynamic(),
            DynValue::Set(vec![DynValue::Int(1), DynValue::Int(2)])
        );

        prop.set_dynamic(&DynValue::Int(9)).unwrap();
        assert!(prop.contains(9));
        assert_eq!(prop.len(), 1);
        assert_eq!(owner.events().len(), 4);
    }

    #[test]
    fn test_dynamic_rejects() {
        let mut prop = IntegerSetProperty::with_values([1]);
        let err = prop
            .set_dynamic(&DynValue::Tuple(vec![DynValue::Int(1), DynValue::Float(2.0)]))
            .unwrap_err();
        assert_eq!(err.to_string(), "type in list must be int, not float");

        let err = prop.set_dynamic(&DynValue::from("1")).unwrap_err();
        assert_eq!(err.to_string(), "type must be int or list of int, not str");
        assert!(prop.contains(1));
    }
}
