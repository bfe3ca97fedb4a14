//! Ordered list properties.
//!
//! [`PropertyList`] holds the shared list behaviour; each element type
//! supplies its text form, side-file form and dynamic conversion through
//! [`ListItem`]. Small lists of integers, strings and bools are written
//! inline. Float and colour lists go to side-files unless the writer forces
//! inline text.

use std::any::Any;
use std::fmt;

use super::color::{color_from_dynamic, color_to_dynamic};
use super::{
    Property, PropertyBase, PropertyStatus, format_f64, paste_source, side_file_name,
    type_mismatch,
};
use crate::codec::sidefile::{
    decode_color_list, decode_float_list, encode_color_list, encode_float_list,
};
use crate::codec::{ByteReader, ByteWriter, Writer, XmlReader};
use crate::error::{DecodeError, EncodeError, PropertyError, ReadError};
use crate::limits::MAX_TEXT_PREALLOC;
use crate::model::{Color, DynValue};

/// An element type storable in a [`PropertyList`].
pub trait ListItem: Clone + Default + fmt::Debug + PartialEq + 'static {
    /// Registered type name of the list property.
    const TYPE_NAME: &'static str;
    /// Editor widget of the list property, empty when not editable.
    const EDITOR_NAME: &'static str = "";
    /// Item type named in per-item mismatch errors.
    const ITEM_TYPE: &'static str;
    /// Accepted shapes named when the whole value is rejected.
    const EXPECTED: &'static str;

    fn from_dynamic(value: &DynValue) -> Result<Self, PropertyError>;

    fn to_dynamic(&self) -> DynValue;

    /// Wraps converted items; lists by default.
    fn list_to_dynamic(items: Vec<DynValue>) -> DynValue {
        DynValue::List(items)
    }

    /// Whole-list input that is neither a sequence nor a single item.
    fn list_from_dynamic(_value: &DynValue) -> Option<Result<Vec<Self>, PropertyError>> {
        None
    }

    fn save_list(list: &PropertyList<Self>, writer: &mut Writer) -> Result<(), EncodeError>;

    /// Reads the text form. Returns `None` when the values arrive later
    /// through a side-file.
    fn restore_list(
        list: &PropertyList<Self>,
        reader: &mut XmlReader,
    ) -> Result<Option<Vec<Self>>, ReadError>;

    fn save_side_file(
        _list: &PropertyList<Self>,
        _writer: &mut ByteWriter,
    ) -> Result<(), EncodeError> {
        Ok(())
    }

    fn restore_side_file(
        _list: &PropertyList<Self>,
        _reader: &mut ByteReader<'_>,
    ) -> Result<Option<Vec<Self>>, DecodeError> {
        Ok(None)
    }

    /// Heap bytes owned by the item.
    fn heap_size(&self) -> usize {
        0
    }
}

/// A list of `T` with change notification.
pub struct PropertyList<T> {
    base: PropertyBase,
    values: Vec<T>,
}

pub type IntegerListProperty = PropertyList<i64>;
pub type FloatListProperty = PropertyList<f64>;
pub type StringListProperty = PropertyList<String>;
pub type BoolListProperty = PropertyList<bool>;
pub type ColorListProperty = PropertyList<Color>;

impl<T: fmt::Debug> fmt::Debug for PropertyList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyList")
            .field("base", &self.base)
            .field("values", &self.values)
            .finish()
    }
}

impl<T> Default for PropertyList<T> {
    fn default() -> Self {
        Self {
            base: PropertyBase::default(),
            values: Vec::new(),
        }
    }
}

impl<T: ListItem> PropertyList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: Vec<T>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Replaces every value with one notification.
    pub fn set_values(&mut self, values: Vec<T>) {
        self.base.about_to_set_value();
        self.values = values;
        self.base.has_set_value();
    }

    pub fn value(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    /// Sets the value at `index`. An index equal to the length appends.
    pub fn set1_value(&mut self, index: usize, value: T) -> Result<(), PropertyError> {
        if index > self.values.len() {
            return Err(PropertyError::IndexOutOfBounds {
                index: index as i64,
                size: self.values.len(),
            });
        }
        self.base.about_to_set_value();
        if index == self.values.len() {
            self.values.push(value);
        } else {
            self.values[index] = value;
        }
        self.base.has_set_value();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Truncates, or pads with default items.
    pub fn set_size(&mut self, size: usize) {
        self.base.about_to_set_value();
        self.values.resize(size, T::default());
        self.base.has_set_value();
    }
}

impl<T: ListItem> Property for PropertyList<T> {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn editor_name(&self) -> &'static str {
        T::EDITOR_NAME
    }

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        T::save_list(self, writer)
    }

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
        if let Some(values) = T::restore_list(self, reader)? {
            self.set_values(values);
        }
        Ok(())
    }

    fn save_doc_file(&self, writer: &mut ByteWriter) -> Result<(), EncodeError> {
        T::save_side_file(self, writer)
    }

    fn restore_doc_file(&mut self, reader: &mut ByteReader<'_>) -> Result<(), DecodeError> {
        if let Some(values) = T::restore_side_file(self, reader)? {
            self.set_values(values);
        }
        Ok(())
    }

    fn to_dynamic(&self) -> DynValue {
        T::list_to_dynamic(self.values.iter().map(T::to_dynamic).collect())
    }

    /// Accepts a single item, a list or tuple of items, or a type specific
    /// whole-list form.
    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError> {
        if let Some(values) = T::list_from_dynamic(value) {
            self.set_values(values?);
            return Ok(());
        }
        if let Ok(item) = T::from_dynamic(value) {
            self.set_values(vec![item]);
            return Ok(());
        }
        let items = value
            .as_sequence()
            .ok_or_else(|| type_mismatch(T::EXPECTED, value))?;
        let values = items
            .iter()
            .map(T::from_dynamic)
            .collect::<Result<Vec<_>, _>>()?;
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
            + self.values.capacity() * std::mem::size_of::<T>()
            + self.values.iter().map(T::heap_size).sum::<usize>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// =============================================================================
// TEXT HELPERS
// =============================================================================

/// Writes `<element count="n">` with one `<child .../>` per item.
pub(crate) fn write_children<I, F>(
    writer: &mut Writer,
    element: &str,
    child: &str,
    items: I,
    mut attrs: F,
) where
    I: ExactSizeIterator,
    F: FnMut(&mut Writer, &str, I::Item),
{
    writer.start_element(element, &[("count", &items.len().to_string())]);
    for item in items {
        attrs(writer, child, item);
    }
    writer.end_element(element);
}

/// Reads `count` children named `child` of the current element, then its
/// end element.
pub(crate) fn read_children<T>(
    reader: &mut XmlReader,
    element: &str,
    child: &str,
    mut parse: impl FnMut(&XmlReader) -> Result<T, ReadError>,
) -> Result<Vec<T>, ReadError> {
    let count = reader.attribute_count("count")?;
    let mut values = Vec::with_capacity(count.min(MAX_TEXT_PREALLOC));
    for _ in 0..count {
        reader.read_element(child)?;
        values.push(parse(reader)?);
    }
    reader.read_end_element(element)?;
    Ok(values)
}

/// Writes `<element file="..."/>`, registering the side-file when the
/// list is not empty.
fn write_file_reference<T: ListItem>(
    list: &PropertyList<T>,
    writer: &mut Writer,
    element: &str,
) -> Result<(), EncodeError> {
    let file = if list.is_empty() {
        String::new()
    } else {
        let mut bytes = ByteWriter::new();
        T::save_side_file(list, &mut bytes)?;
        writer.add_file(&side_file_name(&list.base, element), bytes.into_bytes())
    };
    writer.empty_element(element, &[("file", &file)]);
    Ok(())
}

/// Reads a side-file backed list: a `file` reference, or inline children
/// when written with forced inline text. A missing or empty reference
/// restores an empty list.
fn read_file_reference<T: ListItem>(
    list: &PropertyList<T>,
    reader: &mut XmlReader,
    element: &str,
    child: &str,
    parse: impl FnMut(&XmlReader) -> Result<T, ReadError>,
) -> Result<Option<Vec<T>>, ReadError> {
    reader.read_element(element)?;
    match reader.attribute_opt("file").map(str::to_owned) {
        Some(file) if !file.is_empty() => {
            reader.add_file(&file, list.base.name());
            Ok(None)
        }
        Some(_) => Ok(Some(Vec::new())),
        None if reader.has_attribute("count") => {
            read_children(reader, element, child, parse).map(Some)
        }
        None => Ok(Some(Vec::new())),
    }
}

fn item_mismatch(expected: &'static str, value: &DynValue) -> PropertyError {
    PropertyError::ItemTypeMismatch {
        expected,
        actual: value.type_name(),
    }
}

// =============================================================================
// INTEGER LIST
// =============================================================================

impl ListItem for i64 {
    const TYPE_NAME: &'static str = "App::PropertyIntegerList";
    const EDITOR_NAME: &'static str = "Gui::PropertyEditor::PropertyIntegerListItem";
    const ITEM_TYPE: &'static str = "int";
    const EXPECTED: &'static str = "int or list of int";

    fn from_dynamic(value: &DynValue) -> Result<Self, PropertyError> {
        value.as_int().ok_or_else(|| item_mismatch(Self::ITEM_TYPE, value))
    }

    fn to_dynamic(&self) -> DynValue {
        DynValue::Int(*self)
    }

    fn save_list(list: &PropertyList<Self>, writer: &mut Writer) -> Result<(), EncodeError> {
        write_children(writer, "IntegerList", "I", list.values().iter(), |w, child, v| {
            w.empty_element(child, &[("v", &v.to_string())]);
        });
        Ok(())
    }

    fn restore_list(
        _list: &PropertyList<Self>,
        reader: &mut XmlReader,
    ) -> Result<Option<Vec<Self>>, ReadError> {
        reader.read_element("IntegerList")?;
        read_children(reader, "IntegerList", "I", |r| r.attribute_i64("v")).map(Some)
    }
}

// =============================================================================
// FLOAT LIST
// =============================================================================

impl ListItem for f64 {
    const TYPE_NAME: &'static str = "App::PropertyFloatList";
    const EDITOR_NAME: &'static str = "Gui::PropertyEditor::PropertyFloatListItem";
    const ITEM_TYPE: &'static str = "float";
    const EXPECTED: &'static str = "float or list of float";

    fn from_dynamic(value: &DynValue) -> Result<Self, PropertyError> {
        match value {
            DynValue::Float(v) => Ok(*v),
            DynValue::Int(v) => Ok(*v as f64),
            _ => Err(item_mismatch(Self::ITEM_TYPE, value)),
        }
    }

    fn to_dynamic(&self) -> DynValue {
        DynValue::Float(*self)
    }

    fn save_list(list: &PropertyList<Self>, writer: &mut Writer) -> Result<(), EncodeError> {
        if !writer.is_force_xml() {
            return write_file_reference(list, writer, "FloatList");
        }
        write_children(writer, "FloatList", "F", list.values().iter(), |w, child, v| {
            w.empty_element(child, &[("v", &format_f64(*v))]);
        });
        Ok(())
    }

    fn restore_list(
        list: &PropertyList<Self>,
        reader: &mut XmlReader,
    ) -> Result<Option<Vec<Self>>, ReadError> {
        read_file_reference(list, reader, "FloatList", "F", |r| r.attribute_f64("v"))
    }

    fn save_side_file(list: &PropertyList<Self>, writer: &mut ByteWriter) -> Result<(), EncodeError> {
        let single = list.base.test_status(PropertyStatus::SINGLE_PRECISION);
        encode_float_list(writer, list.values(), single)
    }

    fn restore_side_file(
        list: &PropertyList<Self>,
        reader: &mut ByteReader<'_>,
    ) -> Result<Option<Vec<Self>>, DecodeError> {
        let single = list.base.test_status(PropertyStatus::SINGLE_PRECISION);
        decode_float_list(reader, single).map(Some)
    }
}

// =============================================================================
// STRING LIST
// =============================================================================

impl ListItem for String {
    const TYPE_NAME: &'static str = "App::PropertyStringList";
    const EDITOR_NAME: &'static str = "Gui::PropertyEditor::PropertyStringListItem";
    const ITEM_TYPE: &'static str = "str";
    const EXPECTED: &'static str = "str or list of str";

    fn from_dynamic(value: &DynValue) -> Result<Self, PropertyError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| item_mismatch(Self::ITEM_TYPE, value))
    }

    fn to_dynamic(&self) -> DynValue {
        DynValue::Str(self.clone())
    }

    fn save_list(list: &PropertyList<Self>, writer: &mut Writer) -> Result<(), EncodeError> {
        write_children(writer, "StringList", "String", list.values().iter(), |w, child, v| {
            w.empty_element(child, &[("value", v)]);
        });
        Ok(())
    }

    fn restore_list(
        _list: &PropertyList<Self>,
        reader: &mut XmlReader,
    ) -> Result<Option<Vec<Self>>, ReadError> {
        reader.read_element("StringList")?;
        read_children(reader, "StringList", "String", |r| {
            r.attribute("value").map(str::to_owned)
        })
        .map(Some)
    }

    fn heap_size(&self) -> usize {
        self.capacity()
    }
}

// =============================================================================
// BOOL LIST
// =============================================================================

/// Bitset text of `values`, highest index first.
fn to_bitset(values: &[bool]) -> String {
    values
        .iter()
        .rev()
        .map(|&b| if b { '1' } else { '0' })
        .collect()
}

fn parse_bitset(text: &str) -> Option<Vec<bool>> {
    text.chars()
        .rev()
        .map(|c| match c {
            '0' => Some(false),
            '1' => Some(true),
            _ => None,
        })
        .collect()
}

impl ListItem for bool {
    const TYPE_NAME: &'static str = "App::PropertyBoolList";
    const ITEM_TYPE: &'static str = "bool or int";
    const EXPECTED: &'static str = "bool, list of bool or bitset string";

    fn from_dynamic(value: &DynValue) -> Result<Self, PropertyError> {
        value
            .as_int()
            .map(|v| v != 0)
            .ok_or_else(|| item_mismatch(Self::ITEM_TYPE, value))
    }

    fn to_dynamic(&self) -> DynValue {
        DynValue::Bool(*self)
    }

    fn list_to_dynamic(items: Vec<DynValue>) -> DynValue {
        DynValue::Tuple(items)
    }

    fn list_from_dynamic(value: &DynValue) -> Option<Result<Vec<Self>, PropertyError>> {
        let text = value.as_str()?;
        Some(parse_bitset(text).ok_or_else(|| PropertyError::TypeMismatch {
            expected: "bitset string of '0' and '1'",
            actual: format!("{text:?}"),
        }))
    }

    fn save_list(list: &PropertyList<Self>, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.empty_element("BoolList", &[("value", &to_bitset(list.values()))]);
        Ok(())
    }

    fn restore_list(
        _list: &PropertyList<Self>,
        reader: &mut XmlReader,
    ) -> Result<Option<Vec<Self>>, ReadError> {
        reader.read_element("BoolList")?;
        let text = reader.attribute("value")?;
        let values = parse_bitset(text).ok_or_else(|| ReadError::InvalidAttribute {
            element: "BoolList".to_string(),
            name: "value".to_string(),
            expected: "bitset",
            value: text.to_string(),
        })?;
        Ok(Some(values))
    }
}

// =============================================================================
// COLOUR LIST
// =============================================================================

impl ListItem for Color {
    const TYPE_NAME: &'static str = "App::PropertyColorList";
    const ITEM_TYPE: &'static str = "colour";
    const EXPECTED: &'static str = "colour or list of colours";

    fn from_dynamic(value: &DynValue) -> Result<Self, PropertyError> {
        color_from_dynamic(value)
    }

    fn to_dynamic(&self) -> DynValue {
        color_to_dynamic(self)
    }

    fn save_list(list: &PropertyList<Self>, writer: &mut Writer) -> Result<(), EncodeError> {
        if !writer.is_force_xml() {
            return write_file_reference(list, writer, "ColorList");
        }
        write_children(writer, "ColorList", "C", list.values().iter(), |w, child, c| {
            w.empty_element(child, &[("v", &c.packed().to_string())]);
        });
        Ok(())
    }

    fn restore_list(
        list: &PropertyList<Self>,
        reader: &mut XmlReader,
    ) -> Result<Option<Vec<Self>>, ReadError> {
        read_file_reference(list, reader, "ColorList", "C", |r| {
            r.attribute_u32("v").map(Color::from_packed)
        })
    }

    fn save_side_file(list: &PropertyList<Self>, writer: &mut ByteWriter) -> Result<(), EncodeError> {
        encode_color_list(writer, list.values())
    }

    fn restore_side_file(
        _list: &PropertyList<Self>,
        reader: &mut ByteReader<'_>,
    ) -> Result<Option<Vec<Self>>, DecodeError> {
        decode_color_list(reader).map(Some)
    }
}
