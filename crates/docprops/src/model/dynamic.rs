//! Dynamic values exchanged with the scripting bridge.
//!
//! `DynValue` mirrors the value model of the embedded scripting runtime:
//! type names and display strings follow that runtime so error messages
//! read naturally to script authors.

use std::fmt;

use super::material::Material;

/// A value as seen by the scripting runtime.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DynValue {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<DynValue>),
    Tuple(Vec<DynValue>),
    Set(Vec<DynValue>),
    /// Key/value pairs in insertion order.
    Dict(Vec<(DynValue, DynValue)>),
    Material(Box<Material>),
    /// An opaque script object, known only by its type name.
    Object(String),
}

impl DynValue {
    /// Returns the runtime type name used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            DynValue::None => "NoneType".to_string(),
            DynValue::Bool(_) => "bool".to_string(),
            DynValue::Int(_) => "int".to_string(),
            DynValue::Float(_) => "float".to_string(),
            DynValue::Str(_) => "str".to_string(),
            DynValue::Bytes(_) => "bytes".to_string(),
            DynValue::List(_) => "list".to_string(),
            DynValue::Tuple(_) => "tuple".to_string(),
            DynValue::Set(_) => "set".to_string(),
            DynValue::Dict(_) => "dict".to_string(),
            DynValue::Material(_) => "Material".to_string(),
            DynValue::Object(name) => name.clone(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DynValue::None)
    }

    /// Integer value of an int or bool (bool is an int subtype).
    pub fn as_int(&self) -> Option<i64> {
        match self {
            DynValue::Int(v) => Some(*v),
            DynValue::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    /// Float value of a float or int.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DynValue::Float(v) => Some(*v),
            DynValue::Int(v) => Some(*v as f64),
            DynValue::Bool(b) => Some(*b as i64 as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Items of an ordered sequence (list or tuple).
    pub fn as_sequence(&self) -> Option<&[DynValue]> {
        match self {
            DynValue::List(items) | DynValue::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Items of any iterable container other than a string or dict.
    pub fn as_iterable(&self) -> Option<&[DynValue]> {
        match self {
            DynValue::List(items) | DynValue::Tuple(items) | DynValue::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&[(DynValue, DynValue)]> {
        match self {
            DynValue::Dict(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a string key in a dict.
    pub fn get(&self, key: &str) -> Option<&DynValue> {
        self.as_dict()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Builds a tuple of strings.
    pub fn str_tuple<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DynValue::Tuple(items.into_iter().map(|s| DynValue::Str(s.into())).collect())
    }

    fn write_repr(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynValue::Str(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            other => write!(f, "{other}"),
        }
    }

    fn write_items(
        f: &mut fmt::Formatter<'_>,
        items: &[DynValue],
        open: &str,
        close: &str,
    ) -> fmt::Result {
        f.write_str(open)?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            item.write_repr(f)?;
        }
        if close == ")" && items.len() == 1 {
            f.write_str(",")?;
        }
        f.write_str(close)
    }
}

/// Display matches the scripting runtime's `str()`.
impl fmt::Display for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynValue::None => f.write_str("None"),
            DynValue::Bool(true) => f.write_str("True"),
            DynValue::Bool(false) => f.write_str("False"),
            DynValue::Int(v) => write!(f, "{v}"),
            DynValue::Float(v) => write!(f, "{v:?}"),
            DynValue::Str(s) => f.write_str(s),
            DynValue::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            DynValue::List(items) => Self::write_items(f, items, "[", "]"),
            DynValue::Tuple(items) => Self::write_items(f, items, "(", ")"),
            DynValue::Set(items) if items.is_empty() => f.write_str("set()"),
            DynValue::Set(items) => Self::write_items(f, items, "{", "}"),
            DynValue::Dict(items) => {
                f.write_str("{")?;
                for (i, (k, v)) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    k.write_repr(f)?;
                    f.write_str(": ")?;
                    v.write_repr(f)?;
                }
                f.write_str("}")
            }
            DynValue::Material(_) => f.write_str("<Material object>"),
            DynValue::Object(name) => write!(f, "<{name} object>"),
        }
    }
}

impl From<bool> for DynValue {
    fn from(v: bool) -> Self {
        DynValue::Bool(v)
    }
}

impl From<i64> for DynValue {
    fn from(v: i64) -> Self {
        DynValue::Int(v)
    }
}

impl From<f64> for DynValue {
    fn from(v: f64) -> Self {
        DynValue::Float(v)
    }
}

impl From<&str> for DynValue {
    fn from(v: &str) -> Self {
        DynValue::Str(v.to_string())
    }
}

impl From<String> for DynValue {
    fn from(v: String) -> Self {
        DynValue::Str(v)
    }
}

impl From<Material> for DynValue {
    fn from(v: Material) -> Self {
        DynValue::Material(Box::new(v))
    }
}
