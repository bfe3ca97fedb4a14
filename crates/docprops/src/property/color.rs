//! RGBA colour property.

use std::any::Any;

use super::{Property, PropertyBase, paste_source};
use crate::codec::{Writer, XmlReader};
use crate::error::{EncodeError, PropertyError, ReadError};
use crate::model::{Color, DynValue};

const ACCEPTED_SHAPES: &str = "integer or tuple of float or tuple integer";

/// Converts a dynamic value to a colour.
///
/// Accepts a 3- or 4-tuple of floats in `0..=1`, a 3- or 4-tuple of ints in
/// `0..=255`, or a packed `0xRRGGBBAA` int. Alpha defaults to opaque.
pub(crate) fn color_from_dynamic(value: &DynValue) -> Result<Color, PropertyError> {
    match value {
        DynValue::Tuple(items) if matches!(items.len(), 3 | 4) => color_from_tuple(items),
        DynValue::Int(_) | DynValue::Bool(_) => {
            let packed = value.as_int().unwrap_or_default();
            let packed = u32::try_from(packed).map_err(|_| PropertyError::TypeMismatch {
                expected: "packed colour in 0..=0xFFFFFFFF",
                actual: packed.to_string(),
            })?;
            Ok(Color::from_packed(packed))
        }
        _ => Err(PropertyError::TypeMismatch {
            expected: ACCEPTED_SHAPES,
            actual: value.type_name(),
        }),
    }
}

fn color_from_tuple(items: &[DynValue]) -> Result<Color, PropertyError> {
    let mut channels = [0.0f32, 0.0, 0.0, 1.0];
    match &items[0] {
        DynValue::Float(_) => {
            for (slot, item) in channels.iter_mut().zip(items) {
                match item {
                    DynValue::Float(v) => *slot = *v as f32,
                    _ => return Err(PropertyError::InconsistentTuple { expected: "float" }),
                }
            }
        }
        DynValue::Int(_) | DynValue::Bool(_) => {
            for (slot, item) in channels.iter_mut().zip(items) {
                match item.as_int() {
                    Some(v) => *slot = v as f32 / 255.0,
                    None => return Err(PropertyError::InconsistentTuple { expected: "integer" }),
                }
            }
        }
        other => {
            return Err(PropertyError::ItemTypeMismatch {
                expected: "float or integer",
                actual: other.type_name(),
            });
        }
    }
    let [r, g, b, a] = channels;
    Ok(Color::new(r, g, b, a))
}

/// Dynamic form of a colour: a 4-tuple of floats.
pub(crate) fn color_to_dynamic(c: &Color) -> DynValue {
    DynValue::Tuple(
        [c.r, c.g, c.b, c.a]
            .into_iter()
            .map(|v| DynValue::Float(v as f64))
            .collect(),
    )
}

/// A single colour, saved packed as `<PropertyColor value="4278190335"/>`.
#[derive(Debug, Default)]
pub struct ColorProperty {
    base: PropertyBase,
    value: Color,
}

impl ColorProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: Color) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn value(&self) -> Color {
        self.value
    }

    pub fn set_value(&mut self, value: Color) {
        self.base.about_to_set_value();
        self.value = value;
        self.base.has_set_value();
    }

    /// Sets the colour from a packed `0xRRGGBBAA` value.
    pub fn set_packed(&mut self, packed: u32) {
        self.set_value(Color::from_packed(packed));
    }

    pub fn set_rgba(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.set_value(Color::new(r, g, b, a));
    }
}

impl Property for ColorProperty {
    fn type_name(&self) -> &'static str {
        "App::PropertyColor"
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn editor_name(&self) -> &'static str {
        "Gui::PropertyEditor::PropertyColorItem"
    }

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.empty_element("PropertyColor", &[("value", &self.value.packed().to_string())]);
        Ok(())
    }

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
        reader.read_element("PropertyColor")?;
        let packed = reader.attribute_u32("value")?;
        self.set_packed(packed);
        Ok(())
    }

    fn to_dynamic(&self) -> DynValue {
        color_to_dynamic(&self.value)
    }

    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError> {
        let color = color_from_dynamic(value)?;
        self.set_value(color);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::ObjectIdentifier;
    use crate::property::test_support::{Recorder, text_roundtrip};

    fn floats(v: &[f64]) -> DynValue {
        DynValue::Tuple(v.iter().map(|f| DynValue::Float(*f)).collect())
    }

    fn ints(v: &[i64]) -> DynValue {
        DynValue::Tuple(v.iter().map(|i| DynValue::Int(*i)).collect())
    }

    #[test]
    fn test_float_tuple() {
        let mut prop = ColorProperty::new();
        prop.set_dynamic(&floats(&[1.0, 0.5, 0.0])).unwrap();
        assert_eq!(prop.value(), Color::new(1.0, 0.5, 0.0, 1.0));

        prop.set_dynamic(&floats(&[0.0, 0.0, 1.0, 0.25])).unwrap();
        assert_eq!(prop.value().a, 0.25);
    }

    #[test]
    fn test_int_tuple_scales_by_255() {
        let mut prop = ColorProperty::new();
        prop.set_dynamic(&ints(&[255, 0, 51])).unwrap();
        assert_eq!(prop.value(), Color::new(1.0, 0.0, 0.2, 1.0));
    }

    #[test]
    fn test_packed_int() {
        let mut prop = ColorProperty::new();
        prop.set_dynamic(&DynValue::Int(0xFF00_00FF)).unwrap();
        assert_eq!(prop.value(), Color::new(1.0, 0.0, 0.0, 1.0));
        assert!(prop.set_dynamic(&DynValue::Int(-1)).is_err());
    }

    #[test]
    fn test_mixed_tuple_rejected() {
        let owner = Recorder::new();
        let mut prop = ColorProperty::new();
        prop.base_mut().attach("Tint", &owner);

        let mixed = DynValue::Tuple(vec![
            DynValue::Float(1.0),
            DynValue::Int(0),
            DynValue::Float(0.0),
        ]);
        let err = prop.set_dynamic(&mixed).unwrap_err();
        assert_eq!(err.to_string(), "type in tuple must be consistent (float)");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        let mixed = DynValue::Tuple(vec![DynValue::Int(1), DynValue::from("x"), DynValue::Int(0)]);
        assert_eq!(
            prop.set_dynamic(&mixed).unwrap_err(),
            PropertyError::InconsistentTuple { expected: "integer" }
        );
        assert!(owner.events().is_empty());
    }

    #[test]
    fn test_wrong_shape() {
        let mut prop = ColorProperty::new();
        let err = prop.set_dynamic(&floats(&[1.0, 0.0])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "type must be integer or tuple of float or tuple integer, not tuple"
        );
        assert!(prop.set_dynamic(&DynValue::from("red")).is_err());
    }

    #[test]
    fn test_to_dynamic() {
        let prop = ColorProperty::with_value(Color::new(0.5, 0.25, 1.0, 1.0));
        assert_eq!(prop.to_dynamic(), floats(&[0.5, 0.25, 1.0, 1.0]));
    }

    #[test]
    fn test_text_form() {
        let prop = ColorProperty::with_value(Color::new(1.0, 0.0, 0.0, 1.0));
        let mut writer = Writer::new();
        prop.save(&mut writer).unwrap();
        assert_eq!(writer.as_str(), "<PropertyColor value=\"4278190335\"/>\n");

        let mut restored = ColorProperty::new();
        text_roundtrip(&prop, &mut restored);
        assert_eq!(restored.value(), prop.value());
    }

    #[test]
    fn test_path_value_uses_dynamic_form() {
        let mut prop = ColorProperty::new();
        prop.base_mut().set_name("Tint");
        let id = ObjectIdentifier::new("Tint");
        prop.set_path_value(&id, &crate::model::PathValue::Dynamic(ints(&[0, 255, 0])))
            .unwrap();
        assert_eq!(prop.value(), Color::new(0.0, 1.0, 0.0, 1.0));
    }
}
