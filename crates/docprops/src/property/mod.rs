//! The `Property` trait and the concrete property types.
//!
//! A property is a typed value slot owned by a document object. Every
//! setter brackets its mutation with a before/after notification to the
//! owning [`PropertyContainer`], which drives recompute and undo. Setters
//! validate first, so a rejected value never notifies.

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

use bitflags::bitflags;
use tracing::trace;

use crate::codec::{ByteReader, ByteWriter, Writer, XmlReader};
use crate::error::{DecodeError, EncodeError, PropertyError, ReadError};
use crate::model::{DynValue, ObjectIdentifier, PathValue};

pub mod color;
pub mod constraint;
pub mod enumeration;
pub mod list;
pub mod map;
pub mod material;
pub mod persistent;
pub mod scalar;
pub mod set;

pub use color::ColorProperty;
pub use constraint::{FloatConstraintProperty, IntegerConstraintProperty};
pub use enumeration::EnumerationProperty;
pub use list::{
    BoolListProperty, ColorListProperty, FloatListProperty, IntegerListProperty, ListItem,
    PropertyList, StringListProperty,
};
pub use map::MapProperty;
pub use material::{MaterialListProperty, MaterialProperty};
pub use persistent::PersistentObjectProperty;
pub use scalar::{
    BoolProperty, FloatProperty, IntegerProperty, PathProperty, StringProperty, UuidProperty,
};
pub use set::IntegerSetProperty;

bitflags! {
    /// Status bits of a property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyStatus: u32 {
        /// Not editable from the UI. Advisory only; setters ignore it.
        const READ_ONLY = 1 << 0;
        /// Not shown in the property editor.
        const HIDDEN = 1 << 1;
        /// Not saved with the document.
        const TRANSIENT = 1 << 2;
        /// Float lists use 4-byte side-file records.
        const SINGLE_PRECISION = 1 << 3;
        /// Material properties get the material editor.
        const MATERIAL_EDIT = 1 << 4;
        /// Material lists get no editor.
        const NO_MATERIAL_LIST_EDIT = 1 << 5;
    }
}

/// The owner of a set of properties.
///
/// Receives the change notifications that bracket every mutation.
pub trait PropertyContainer {
    /// Name used to build property full names, e.g. `Doc#Box`.
    fn full_name(&self) -> String;

    /// Whether the container is part of a live document. Detached
    /// containers still receive value notifications, but label swaps on
    /// enumerations skip them.
    fn is_attached(&self) -> bool {
        true
    }

    /// Called before `property` changes.
    fn on_before_change(&self, property: &str);

    /// Called after `property` changed.
    fn on_changed(&self, property: &str);
}

/// State shared by every property: identity and status.
#[derive(Default)]
pub struct PropertyBase {
    name: String,
    container: Option<Weak<dyn PropertyContainer>>,
    status: PropertyStatus,
}

impl fmt::Debug for PropertyBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBase")
            .field("name", &self.name)
            .field("attached", &self.container.is_some())
            .field("status", &self.status)
            .finish()
    }
}

impl PropertyBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(status: PropertyStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Binds the property to its owner under `name`. The owner is held
    /// weakly.
    pub fn attach<C: PropertyContainer + 'static>(&mut self, name: impl Into<String>, container: &Rc<C>) {
        let weak: Weak<dyn PropertyContainer> = Rc::<C>::downgrade(container);
        self.name = name.into();
        self.container = Some(weak);
    }

    /// Sets the name without an owner.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the owner, if it is still alive.
    pub fn container(&self) -> Option<Rc<dyn PropertyContainer>> {
        self.container.as_ref().and_then(Weak::upgrade)
    }

    /// Returns true if the owner is alive and attached to a document.
    pub fn is_attached(&self) -> bool {
        self.container().is_some_and(|c| c.is_attached())
    }

    /// Returns `<container>.<name>`, or `?.<name>` without an owner.
    pub fn full_name(&self) -> String {
        match self.container() {
            Some(c) => format!("{}.{}", c.full_name(), self.name),
            None => format!("?.{}", self.name),
        }
    }

    pub fn status(&self) -> PropertyStatus {
        self.status
    }

    pub fn set_status(&mut self, flags: PropertyStatus, on: bool) {
        self.status.set(flags, on);
    }

    pub fn test_status(&self, flags: PropertyStatus) -> bool {
        self.status.contains(flags)
    }

    /// Notifies the owner that the value is about to change.
    pub fn about_to_set_value(&self) {
        trace!(property = %self.name, "about to set value");
        if let Some(c) = self.container() {
            c.on_before_change(&self.name);
        }
    }

    /// Notifies the owner that the value changed.
    pub fn has_set_value(&self) {
        trace!(property = %self.name, "value set");
        if let Some(c) = self.container() {
            c.on_changed(&self.name);
        }
    }

    /// Checks that `path` names this property and carries no sub-path.
    pub fn verify_path(&self, path: &ObjectIdentifier) -> Result<(), PropertyError> {
        let name_matches = self.name.is_empty() || path.property_name() == self.name;
        if path.has_sub_path() || !name_matches {
            return Err(PropertyError::InvalidPath {
                path: path.to_string(),
                property: self.full_name(),
            });
        }
        Ok(())
    }

    /// Base for a copy: same status, no name and no owner.
    pub(crate) fn detached_copy(&self) -> Self {
        Self::with_status(self.status)
    }
}

/// A typed, persistent, change-observable value slot.
pub trait Property: Any + fmt::Debug {
    /// Registered type name, e.g. `App::PropertyInteger`.
    fn type_name(&self) -> &'static str;

    fn base(&self) -> &PropertyBase;

    fn base_mut(&mut self) -> &mut PropertyBase;

    fn name(&self) -> &str {
        self.base().name()
    }

    fn full_name(&self) -> String {
        self.base().full_name()
    }

    /// Advisory editor widget name, empty when not editable.
    fn editor_name(&self) -> &'static str {
        ""
    }

    /// Writes the property's elements.
    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError>;

    /// Reads the property's elements. Side-file references are recorded in
    /// the reader.
    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError>;

    /// Writes the side-file body.
    fn save_doc_file(&self, _writer: &mut ByteWriter) -> Result<(), EncodeError> {
        Ok(())
    }

    /// Reads the side-file body. The value is unchanged on error.
    fn restore_doc_file(&mut self, _reader: &mut ByteReader<'_>) -> Result<(), DecodeError> {
        Ok(())
    }

    fn to_dynamic(&self) -> DynValue;

    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError>;

    /// Value addressed by `path`, for expression evaluation.
    fn path_value(&self, path: &ObjectIdentifier) -> Result<PathValue, PropertyError> {
        self.base().verify_path(path)?;
        Ok(PathValue::Dynamic(self.to_dynamic()))
    }

    /// Assigns the value addressed by `path`.
    fn set_path_value(
        &mut self,
        path: &ObjectIdentifier,
        value: &PathValue,
    ) -> Result<(), PropertyError> {
        self.base().verify_path(path)?;
        self.set_dynamic(&value.to_dynamic())
    }

    /// Returns a detached deep copy.
    fn copy(&self) -> Box<dyn Property>;

    /// Copies the value of a same-typed property and notifies.
    fn paste(&mut self, from: &dyn Property) -> Result<(), PropertyError>;

    /// Approximate memory use in bytes.
    fn mem_size(&self) -> usize;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Property {
    pub fn downcast_ref<T: Property>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: Property>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    pub fn is<T: Property>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Downcasts a paste source, failing with [`PropertyError::PasteMismatch`].
pub(crate) fn paste_source<'a, T: Property>(
    target: &'static str,
    from: &'a dyn Property,
) -> Result<&'a T, PropertyError> {
    from.downcast_ref::<T>().ok_or(PropertyError::PasteMismatch {
        expected: target,
        actual: from.type_name(),
    })
}

pub(crate) fn type_mismatch(expected: &'static str, value: &DynValue) -> PropertyError {
    PropertyError::TypeMismatch {
        expected,
        actual: value.type_name(),
    }
}

pub(crate) fn path_mismatch(base: &PropertyBase, value: &PathValue) -> PropertyError {
    PropertyError::PathValueMismatch {
        property: base.full_name(),
        actual: value.type_name(),
    }
}

/// Formats a float so that parsing it back is lossless.
pub(crate) fn format_f64(v: f64) -> String {
    format!("{v:?}")
}

pub(crate) fn format_f32(v: f32) -> String {
    format!("{v:?}")
}

/// Side-file name for a property: its name, or the element name when
/// unnamed.
pub(crate) fn side_file_name(base: &PropertyBase, element: &str) -> String {
    let stem = if base.name().is_empty() {
        element
    } else {
        base.name()
    };
    format!("{stem}.bin")
}

/// Rounds half away from zero and saturates into `i64`.
pub(crate) fn round_to_i64(v: f64) -> i64 {
    v.round() as i64
}

/// Creates a default property of the given registered type.
pub fn create_property(type_name: &str) -> Option<Box<dyn Property>> {
    let prop: Box<dyn Property> = match type_name {
        "App::PropertyInteger" => Box::new(IntegerProperty::new()),
        "App::PropertyFloat" => Box::new(FloatProperty::new()),
        "App::PropertyBool" => Box::new(BoolProperty::new()),
        "App::PropertyString" => Box::new(StringProperty::new()),
        "App::PropertyFont" => Box::new(StringProperty::font()),
        "App::PropertyPath" => Box::new(PathProperty::new()),
        "App::PropertyUUID" => Box::new(UuidProperty::new()),
        "App::PropertyIntegerConstraint" => Box::new(IntegerConstraintProperty::new()),
        "App::PropertyPercent" => Box::new(IntegerConstraintProperty::percent()),
        "App::PropertyFloatConstraint" => Box::new(FloatConstraintProperty::new()),
        "App::PropertyPrecision" => Box::new(FloatConstraintProperty::precision()),
        "App::PropertyEnumeration" => Box::new(EnumerationProperty::new()),
        "App::PropertyIntegerList" => Box::new(IntegerListProperty::new()),
        "App::PropertyFloatList" => Box::new(FloatListProperty::new()),
        "App::PropertyStringList" => Box::new(StringListProperty::new()),
        "App::PropertyBoolList" => Box::new(BoolListProperty::new()),
        "App::PropertyColorList" => Box::new(ColorListProperty::new()),
        "App::PropertyIntegerSet" => Box::new(IntegerSetProperty::new()),
        "App::PropertyMap" => Box::new(MapProperty::new()),
        "App::PropertyColor" => Box::new(ColorProperty::new()),
        "App::PropertyMaterial" => Box::new(MaterialProperty::new()),
        "App::PropertyMaterialList" => Box::new(MaterialListProperty::new()),
        "App::PropertyPersistentObject" => Box::new(PersistentObjectProperty::new()),
        _ => return None,
    };
    Some(prop)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Container that records notifications.
    #[derive(Debug, Default)]
    pub struct Recorder {
        pub events: RefCell<Vec<String>>,
        pub detached: bool,
    }

    impl Recorder {
        pub fn new() -> Rc<Self> {
            Rc::new(Self::default())
        }

        pub fn detached() -> Rc<Self> {
            Rc::new(Self {
                detached: true,
                ..Self::default()
            })
        }

        pub fn events(&self) -> Vec<String> {
            self.events.borrow().clone()
        }

        pub fn clear(&self) {
            self.events.borrow_mut().clear();
        }
    }

    impl PropertyContainer for Recorder {
        fn full_name(&self) -> String {
            "Doc#Obj".to_string()
        }

        fn is_attached(&self) -> bool {
            !self.detached
        }

        fn on_before_change(&self, property: &str) {
            self.events.borrow_mut().push(format!("before:{property}"));
        }

        fn on_changed(&self, property: &str) {
            self.events.borrow_mut().push(format!("after:{property}"));
        }
    }

    /// Saves `prop` and restores the text into `target`.
    pub fn text_roundtrip(prop: &dyn Property, target: &mut dyn Property) {
        let mut writer = Writer::new();
        prop.save(&mut writer).unwrap();
        let mut reader = XmlReader::new(writer.as_str()).unwrap();
        target.restore(&mut reader).unwrap();
    }

    /// Saves `prop`, then restores text and side-files into `target`.
    pub fn full_roundtrip(prop: &dyn Property, target: &mut dyn Property, options: crate::codec::SaveOptions) -> String {
        let mut writer = Writer::with_options(options);
        prop.save(&mut writer).unwrap();
        let (text, files) = writer.into_parts();
        let archive = crate::codec::DocumentArchive::from_side_files(files);
        let mut reader = XmlReader::new(&text).unwrap();
        target.restore(&mut reader).unwrap();
        for pending in reader.take_pending_files() {
            archive.restore_doc_file(&pending.file, target).unwrap();
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::Recorder;
    use super::*;

    #[test]
    fn test_full_name() {
        let mut base = PropertyBase::new();
        base.set_name("Length");
        assert_eq!(base.full_name(), "?.Length");
        assert!(!base.is_attached());

        let owner = Recorder::new();
        base.attach("Length", &owner);
        assert_eq!(base.full_name(), "Doc#Obj.Length");
        assert!(base.is_attached());
    }

    #[test]
    fn test_weak_owner() {
        let mut base = PropertyBase::new();
        {
            let owner = Recorder::new();
            base.attach("Length", &owner);
        }
        assert!(base.container().is_none());
        assert_eq!(base.full_name(), "?.Length");
        // no owner, no panic
        base.about_to_set_value();
        base.has_set_value();
    }

    #[test]
    fn test_notifications() {
        let owner = Recorder::new();
        let mut base = PropertyBase::new();
        base.attach("Width", &owner);
        base.about_to_set_value();
        base.has_set_value();
        assert_eq!(owner.events(), vec!["before:Width", "after:Width"]);
    }

    #[test]
    fn test_verify_path() {
        let mut base = PropertyBase::new();
        base.set_name("Width");
        assert!(base.verify_path(&ObjectIdentifier::new("Width")).is_ok());

        let err = base
            .verify_path(&ObjectIdentifier::new("Height"))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Runtime);

        assert!(
            base.verify_path(&ObjectIdentifier::new("Width").with_component("x"))
                .is_err()
        );
    }

    #[test]
    fn test_status_flags() {
        let mut base = PropertyBase::new();
        base.set_status(PropertyStatus::HIDDEN | PropertyStatus::TRANSIENT, true);
        assert!(base.test_status(PropertyStatus::HIDDEN));
        base.set_status(PropertyStatus::HIDDEN, false);
        assert!(!base.test_status(PropertyStatus::HIDDEN));
        assert!(base.test_status(PropertyStatus::TRANSIENT));
    }

    #[test]
    fn test_create_property() {
        for name in [
            "App::PropertyInteger",
            "App::PropertyPercent",
            "App::PropertyFont",
            "App::PropertyMaterialList",
            "App::PropertyPersistentObject",
        ] {
            let prop = create_property(name).unwrap();
            assert_eq!(prop.type_name(), name);
        }
        assert!(create_property("App::PropertyNope").is_none());
    }

    #[test]
    fn test_downcast() {
        let prop = create_property("App::PropertyInteger").unwrap();
        assert!(prop.is::<IntegerProperty>());
        assert!(prop.downcast_ref::<FloatProperty>().is_none());
    }

    #[test]
    fn test_paste_type_mismatch() {
        let mut target = IntegerProperty::new();
        let source = FloatProperty::new();
        let err = target.paste(&source).unwrap_err();
        assert_eq!(
            err,
            PropertyError::PasteMismatch {
                expected: "App::PropertyInteger",
                actual: "App::PropertyFloat"
            }
        );
    }
}
