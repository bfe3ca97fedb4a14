//! Integer and float properties with bounds.
//!
//! The bounds descriptor only applies to dynamic assignment: a bare number
//! is clamped into range, while a dict or 4-tuple installs a new owned
//! descriptor and clamps the value against it. Programmatic `set_value`
//! stores verbatim.

use std::any::Any;

use super::scalar::{FloatProperty, IntegerProperty, integer_from_path};
use super::{Property, PropertyBase, format_f64, path_mismatch, type_mismatch};
use crate::codec::{Writer, XmlReader};
use crate::error::{EncodeError, PropertyError, ReadError};
use crate::model::{
    ConstraintRef, Constraints, DynValue, FLOAT_FALLBACK, INTEGER_FALLBACK, ObjectIdentifier,
    PERCENT, PRECISION, PathValue,
};

/// Reads the `value`/`min`/`max`/`step` fields of a dict or 4-tuple.
fn compound_fields<T: Copy>(
    value: &DynValue,
    fallback: &Constraints<T>,
    field: impl Fn(&DynValue) -> Option<T>,
    item_type: &'static str,
    expected: &'static str,
) -> Result<[T; 4], PropertyError> {
    let convert = |v: &DynValue| field(v).ok_or_else(|| type_mismatch(item_type, v));
    match value {
        DynValue::Dict(_) => {
            let v = value
                .get("value")
                .ok_or(PropertyError::MissingKey { key: "value" })?;
            let opt = |key: &str, default: T| value.get(key).map_or(Ok(default), &convert);
            Ok([
                convert(v)?,
                opt("min", fallback.lower)?,
                opt("max", fallback.upper)?,
                opt("step", fallback.step)?,
            ])
        }
        DynValue::Tuple(items) => {
            if items.len() != 4 {
                return Err(PropertyError::TupleArity {
                    expected: 4,
                    actual: items.len(),
                });
            }
            Ok([
                convert(&items[0])?,
                convert(&items[1])?,
                convert(&items[2])?,
                convert(&items[3])?,
            ])
        }
        _ => Err(type_mismatch(expected, value)),
    }
}

// =============================================================================
// INTEGER
// =============================================================================

/// An integer with optional bounds. Percent is the shared `{0, 100, 1}`
/// variant.
#[derive(Debug, Default)]
pub struct IntegerConstraintProperty {
    base: PropertyBase,
    value: i64,
    constraints: Option<ConstraintRef<i64>>,
    percent: bool,
}

impl IntegerConstraintProperty {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a percentage in `[0, 100]`.
    pub fn percent() -> Self {
        Self {
            constraints: Some(ConstraintRef::Shared(&PERCENT)),
            percent: true,
            ..Self::default()
        }
    }

    pub fn with_constraints(constraints: ConstraintRef<i64>) -> Self {
        Self {
            constraints: Some(constraints),
            ..Self::default()
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Stores `value` without clamping.
    pub fn set_value(&mut self, value: i64) {
        self.base.about_to_set_value();
        self.value = value;
        self.base.has_set_value();
    }

    pub fn constraints(&self) -> Option<&ConstraintRef<i64>> {
        self.constraints.as_ref()
    }

    /// Replaces the descriptor. An owned descriptor is dropped here.
    pub fn set_constraints(&mut self, constraints: Option<ConstraintRef<i64>>) {
        self.constraints = constraints;
    }

    fn bounds(&self) -> &Constraints<i64> {
        self.constraints.as_deref().unwrap_or(&INTEGER_FALLBACK)
    }

    pub fn lower_bound(&self) -> i64 {
        self.bounds().lower
    }

    pub fn upper_bound(&self) -> i64 {
        self.bounds().upper
    }

    pub fn step_size(&self) -> i64 {
        self.bounds().step
    }
}

impl Property for IntegerConstraintProperty {
    fn type_name(&self) -> &'static str {
        if self.percent {
            "App::PropertyPercent"
        } else {
            "App::PropertyIntegerConstraint"
        }
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn editor_name(&self) -> &'static str {
        "Gui::PropertyEditor::PropertyIntegerConstraintItem"
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
        if let Some(v) = value.as_int() {
            let v = match &self.constraints {
                Some(c) => c.clamp(v),
                None => v,
            };
            self.set_value(v);
            return Ok(());
        }

        let [v, lower, upper, step] = compound_fields(
            value,
            &INTEGER_FALLBACK,
            DynValue::as_int,
            "int",
            "int, dict or tuple",
        )?;
        let constraints = Constraints::new(lower, upper, step.max(1));
        let v = constraints.clamp(v);
        self.set_constraints(Some(ConstraintRef::owned(constraints)));
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
            constraints: self.constraints.clone(),
            percent: self.percent,
        })
    }

    /// Accepts a constrained or plain integer source. Only the value is
    /// copied; the bounds stay.
    fn paste(&mut self, from: &dyn Property) -> Result<(), PropertyError> {
        let value = if let Some(source) = from.downcast_ref::<Self>() {
            source.value
        } else if let Some(source) = from.downcast_ref::<IntegerProperty>() {
            source.value()
        } else {
            return Err(PropertyError::PasteMismatch {
                expected: self.type_name(),
                actual: from.type_name(),
            });
        };
        self.set_value(value);
        Ok(())
    }

    fn mem_size(&self) -> usize {
        let owned = match &self.constraints {
            Some(c) if c.is_deletable() => std::mem::size_of::<Constraints<i64>>(),
            _ => 0,
        };
        std::mem::size_of::<Self>() + owned
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

/// A float with optional bounds. Precision is the shared
/// `{0, f64::MAX, 0.001}` variant.
#[derive(Debug, Default)]
pub struct FloatConstraintProperty {
    base: PropertyBase,
    value: f64,
    constraints: Option<ConstraintRef<f64>>,
    precision: bool,
}

impl FloatConstraintProperty {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a precision value in `[0, f64::MAX]`.
    pub fn precision() -> Self {
        Self {
            constraints: Some(ConstraintRef::Shared(&PRECISION)),
            precision: true,
            ..Self::default()
        }
    }

    pub fn with_constraints(constraints: ConstraintRef<f64>) -> Self {
        Self {
            constraints: Some(constraints),
            ..Self::default()
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Stores `value` without clamping.
    pub fn set_value(&mut self, value: f64) {
        self.base.about_to_set_value();
        self.value = value;
        self.base.has_set_value();
    }

    pub fn constraints(&self) -> Option<&ConstraintRef<f64>> {
        self.constraints.as_ref()
    }

    pub fn set_constraints(&mut self, constraints: Option<ConstraintRef<f64>>) {
        self.constraints = constraints;
    }

    fn bounds(&self) -> &Constraints<f64> {
        self.constraints.as_deref().unwrap_or(&FLOAT_FALLBACK)
    }

    pub fn lower_bound(&self) -> f64 {
        self.bounds().lower
    }

    pub fn upper_bound(&self) -> f64 {
        self.bounds().upper
    }

    pub fn step_size(&self) -> f64 {
        self.bounds().step
    }
}

impl Property for FloatConstraintProperty {
    fn type_name(&self) -> &'static str {
        if self.precision {
            "App::PropertyPrecision"
        } else {
            "App::PropertyFloatConstraint"
        }
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn editor_name(&self) -> &'static str {
        if self.precision {
            "Gui::PropertyEditor::PropertyPrecisionItem"
        } else {
            "Gui::PropertyEditor::PropertyFloatConstraintItem"
        }
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
        if let Some(v) = value.as_float() {
            let v = match &self.constraints {
                Some(c) => c.clamp(v),
                None => v,
            };
            self.set_value(v);
            return Ok(());
        }

        let [v, lower, upper, step] = compound_fields(
            value,
            &FLOAT_FALLBACK,
            DynValue::as_float,
            "float",
            "float, dict or tuple",
        )?;
        if step < f64::EPSILON {
            return Err(PropertyError::InvalidStepSize { step });
        }
        let constraints = Constraints::new(lower, upper, step);
        let v = constraints.clamp(v);
        self.set_constraints(Some(ConstraintRef::owned(constraints)));
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
            constraints: self.constraints.clone(),
            precision: self.precision,
        })
    }

    fn paste(&mut self, from: &dyn Property) -> Result<(), PropertyError> {
        let value = if let Some(source) = from.downcast_ref::<Self>() {
            source.value
        } else if let Some(source) = from.downcast_ref::<FloatProperty>() {
            source.value()
        } else {
            return Err(PropertyError::PasteMismatch {
                expected: self.type_name(),
                actual: from.type_name(),
            });
        };
        self.set_value(value);
        Ok(())
    }

    fn mem_size(&self) -> usize {
        let owned = match &self.constraints {
            Some(c) if c.is_deletable() => std::mem::size_of::<Constraints<f64>>(),
            _ => 0,
        };
        std::mem::size_of::<Self>() + owned
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
    use crate::property::test_support::{Recorder, text_roundtrip};

    fn dict(pairs: &[(&str, DynValue)]) -> DynValue {
        DynValue::Dict(
            pairs
                .iter()
                .map(|(k, v)| (DynValue::from(*k), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_percent_clamps_dynamic_input() {
        let mut prop = IntegerConstraintProperty::percent();
        prop.set_dynamic(&DynValue::Int(150)).unwrap();
        assert_eq!(prop.value(), 100);
        prop.set_dynamic(&DynValue::Int(-5)).unwrap();
        assert_eq!(prop.value(), 0);
        assert!(!prop.constraints().unwrap().is_deletable());
    }

    #[test]
    fn test_set_value_does_not_clamp() {
        let mut prop = IntegerConstraintProperty::percent();
        prop.set_value(250);
        assert_eq!(prop.value(), 250);
    }

    #[test]
    fn test_unconstrained_fallback_bounds() {
        let mut prop = IntegerConstraintProperty::new();
        assert_eq!(prop.lower_bound(), i32::MIN as i64);
        assert_eq!(prop.upper_bound(), i32::MAX as i64);
        assert_eq!(prop.step_size(), 1);
        prop.set_dynamic(&DynValue::Int(i64::MAX)).unwrap();
        assert_eq!(prop.value(), i64::MAX);
    }

    #[test]
    fn test_dict_installs_owned_constraints() {
        let owner = Recorder::new();
        let mut prop = IntegerConstraintProperty::percent();
        prop.base_mut().attach("Level", &owner);

        prop.set_dynamic(&dict(&[
            ("value", DynValue::Int(50)),
            ("min", DynValue::Int(0)),
            ("max", DynValue::Int(10)),
            ("step", DynValue::Int(0)),
        ]))
        .unwrap();

        assert_eq!(prop.value(), 10);
        let c = prop.constraints().unwrap();
        assert!(c.is_deletable());
        assert_eq!((c.lower, c.upper, c.step), (0, 10, 1));
        assert_eq!(owner.events(), vec!["before:Level", "after:Level"]);
    }

    #[test]
    fn test_dict_defaults_and_missing_value() {
        let mut prop = IntegerConstraintProperty::new();
        prop.set_dynamic(&dict(&[("value", DynValue::Int(3))])).unwrap();
        assert_eq!(prop.lower_bound(), i32::MIN as i64);

        let err = prop
            .set_dynamic(&dict(&[("min", DynValue::Int(3))]))
            .unwrap_err();
        assert_eq!(err, PropertyError::MissingKey { key: "value" });
        assert_eq!(prop.value(), 3);
    }

    #[test]
    fn test_tuple_form() {
        let mut prop = IntegerConstraintProperty::new();
        let t = DynValue::Tuple(vec![
            DynValue::Int(-4),
            DynValue::Int(-2),
            DynValue::Int(2),
            DynValue::Int(2),
        ]);
        prop.set_dynamic(&t).unwrap();
        assert_eq!(prop.value(), -2);
        assert_eq!(prop.step_size(), 2);

        let err = prop
            .set_dynamic(&DynValue::Tuple(vec![DynValue::Int(1)]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_integer_rejects_other_types() {
        let mut prop = IntegerConstraintProperty::new();
        let err = prop.set_dynamic(&DynValue::from("5")).unwrap_err();
        assert_eq!(err.to_string(), "type must be int, dict or tuple, not str");
    }

    #[test]
    fn test_float_constraint_dynamic() {
        let mut prop = FloatConstraintProperty::new();
        prop.set_dynamic(&DynValue::Tuple(vec![
            DynValue::Float(5.0),
            DynValue::Int(0),
            DynValue::Float(1.0),
            DynValue::Float(0.1),
        ]))
        .unwrap();
        assert_eq!(prop.value(), 1.0);
        assert_eq!(prop.step_size(), 0.1);

        prop.set_dynamic(&DynValue::Int(-3)).unwrap();
        assert_eq!(prop.value(), 0.0);
    }

    #[test]
    fn test_float_step_must_be_positive() {
        let mut prop = FloatConstraintProperty::new();
        prop.set_value(0.5);
        let err = prop
            .set_dynamic(&dict(&[
                ("value", DynValue::Float(1.0)),
                ("step", DynValue::Float(0.0)),
            ]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(prop.value(), 0.5);
        assert!(prop.constraints().is_none());
    }

    #[test]
    fn test_precision() {
        let mut prop = FloatConstraintProperty::precision();
        assert_eq!(prop.type_name(), "App::PropertyPrecision");
        assert_eq!(prop.step_size(), 0.001);
        prop.set_dynamic(&DynValue::Float(-1.0)).unwrap();
        assert_eq!(prop.value(), 0.0);
    }

    #[test]
    fn test_text_form_matches_plain_numbers() {
        let mut prop = IntegerConstraintProperty::percent();
        prop.set_value(42);
        let mut plain = IntegerProperty::new();
        text_roundtrip(&prop, &mut plain);
        assert_eq!(plain.value(), 42);

        let mut restored = IntegerConstraintProperty::percent();
        text_roundtrip(&plain, &mut restored);
        assert_eq!(restored.value(), 42);
    }

    #[test]
    fn test_paste_from_plain_integer() {
        let mut prop = IntegerConstraintProperty::percent();
        prop.paste(&IntegerProperty::with_value(12)).unwrap();
        assert_eq!(prop.value(), 12);
        assert!(prop.paste(&FloatProperty::new()).is_err());
    }

    #[test]
    fn test_copy_keeps_constraints() {
        let mut prop = FloatConstraintProperty::with_constraints(ConstraintRef::owned(
            Constraints::new(0.0, 2.0, 0.5),
        ));
        prop.set_value(1.5);
        let copy = prop.copy();
        let copy = copy.downcast_ref::<FloatConstraintProperty>().unwrap();
        assert_eq!(copy.upper_bound(), 2.0);
        assert_eq!(copy.value(), 1.5);
    }
}
