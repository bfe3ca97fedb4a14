//! Path addressing for expression evaluation.

use std::fmt;

use super::dynamic::DynValue;

/// A number with a unit, as produced by the expression evaluator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
}

impl Quantity {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// Returns the value and unit formatted for display, e.g. `"12.5 mm"`.
    pub fn user_string(&self) -> String {
        if self.unit.is_empty() {
            format!("{}", self.value)
        } else {
            format!("{} {}", self.value, self.unit)
        }
    }
}

/// A value handed over by the expression evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum PathValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    Quantity(Quantity),
    String(String),
    Dynamic(DynValue),
}

impl PathValue {
    /// Name of the carried type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PathValue::Bool(_) => "bool",
            PathValue::Int(_) => "int",
            PathValue::UInt(_) => "unsigned long",
            PathValue::Float(_) => "float",
            PathValue::Double(_) => "double",
            PathValue::Quantity(_) => "Quantity",
            PathValue::String(_) => "string",
            PathValue::Dynamic(_) => "object",
        }
    }

    /// Numeric value of any number-like variant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PathValue::Int(v) => Some(*v as f64),
            PathValue::UInt(v) => Some(*v as f64),
            PathValue::Float(v) => Some(*v as f64),
            PathValue::Double(v) => Some(*v),
            PathValue::Quantity(q) => Some(q.value),
            _ => None,
        }
    }

    /// Converts to the dynamic representation. Quantities lose their unit.
    pub fn to_dynamic(&self) -> DynValue {
        match self {
            PathValue::Bool(v) => DynValue::Bool(*v),
            PathValue::Int(v) => DynValue::Int(*v),
            PathValue::UInt(v) => match i64::try_from(*v) {
                Ok(v) => DynValue::Int(v),
                Err(_) => DynValue::Float(*v as f64),
            },
            PathValue::Float(v) => DynValue::Float(*v as f64),
            PathValue::Double(v) => DynValue::Float(*v),
            PathValue::Quantity(q) => DynValue::Float(q.value),
            PathValue::String(s) => DynValue::Str(s.clone()),
            PathValue::Dynamic(v) => v.clone(),
        }
    }
}

impl From<DynValue> for PathValue {
    fn from(v: DynValue) -> Self {
        PathValue::Dynamic(v)
    }
}

/// A resolved path to a property, optionally into a component of its value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    property: String,
    sub_path: Vec<String>,
}

impl ObjectIdentifier {
    /// Addresses the whole value of `property`.
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            sub_path: Vec::new(),
        }
    }

    /// Adds a component, e.g. `.Enum` on an enumeration property.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.sub_path.push(component.into());
        self
    }

    pub fn property_name(&self) -> &str {
        &self.property
    }

    pub fn components(&self) -> &[String] {
        &self.sub_path
    }

    /// Returns the first component after the property name.
    pub fn first_component(&self) -> Option<&str> {
        self.sub_path.first().map(String::as_str)
    }

    pub fn has_sub_path(&self) -> bool {
        !self.sub_path.is_empty()
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.property)?;
        for c in &self.sub_path {
            write!(f, ".{c}")?;
        }
        Ok(())
    }
}
