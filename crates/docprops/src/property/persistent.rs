//! A property that owns a persistable payload created by type name.

use std::any::Any;

use super::{Property, PropertyBase, paste_source, type_mismatch};
use crate::codec::{Writer, XmlReader};
use crate::error::{EncodeError, PropertyError, ReadError};
use crate::model::DynValue;
use crate::registry::{PERSISTENCE, Persistable, TypeRegistry};

/// Holds a registered type name and an instance of that type.
///
/// Setting the name replaces the payload with a fresh instance. The payload
/// is saved nested inside the property and restores itself.
#[derive(Debug, Default)]
pub struct PersistentObjectProperty {
    base: PropertyBase,
    value: String,
    object: Option<Box<dyn Persistable>>,
}

impl PersistentObjectProperty {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type name of the payload, empty when unset.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn object(&self) -> Option<&dyn Persistable> {
        self.object.as_deref()
    }

    pub fn object_mut(&mut self) -> Option<&mut (dyn Persistable + 'static)> {
        self.object.as_deref_mut()
    }

    /// Sets the payload type. An empty name clears the payload.
    ///
    /// `type_name` must be registered and derive from `Base::Persistence`.
    /// Setting the type the payload already has keeps the payload and does
    /// not notify. Abstract types leave the payload empty.
    pub fn set_value(&mut self, type_name: &str) -> Result<(), PropertyError> {
        if !type_name.is_empty() {
            if !TypeRegistry::is_derived_from(type_name, PERSISTENCE) {
                return Err(PropertyError::InvalidType {
                    name: type_name.to_string(),
                    base: PERSISTENCE,
                });
            }
            if self
                .object
                .as_ref()
                .is_some_and(|o| o.type_name() == type_name)
            {
                return Ok(());
            }
        }

        self.base.about_to_set_value();
        self.object = None;
        self.value = type_name.to_string();
        if !type_name.is_empty() {
            self.object = TypeRegistry::create(type_name);
        }
        self.base.has_set_value();
        Ok(())
    }
}

impl Property for PersistentObjectProperty {
    fn type_name(&self) -> &'static str {
        "App::PropertyPersistentObject"
    }

    fn base(&self) -> &PropertyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PropertyBase {
        &mut self.base
    }

    fn editor_name(&self) -> &'static str {
        "Gui::PropertyEditor::PropertyStringItem"
    }

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.empty_element("String", &[("value", &self.value)]);
        writer.start_element("PersistentObject", &[]);
        if let Some(object) = &self.object {
            object.save(writer)?;
        }
        writer.end_element("PersistentObject");
        Ok(())
    }

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
        reader.read_element("String")?;
        let name = reader.attribute("value")?.to_string();
        self.set_value(&name)?;

        reader.read_element("PersistentObject")?;
        if !reader.is_empty_element() && reader.peek_element().is_some() {
            if let Some(object) = self.object.as_mut() {
                object.restore(reader)?;
            }
        }
        // Unread payload content is skipped.
        reader.read_end_element("PersistentObject")
    }

    fn to_dynamic(&self) -> DynValue {
        match &self.object {
            Some(object) => object.to_dynamic(),
            None => DynValue::Str(self.value.clone()),
        }
    }

    /// Accepts a type name.
    fn set_dynamic(&mut self, value: &DynValue) -> Result<(), PropertyError> {
        let name = value.as_str().ok_or_else(|| type_mismatch("str", value))?;
        self.set_value(name)
    }

    fn copy(&self) -> Box<dyn Property> {
        Box::new(Self {
            base: self.base.detached_copy(),
            value: self.value.clone(),
            object: self.object.clone(),
        })
    }

    fn paste(&mut self, from: &dyn Property) -> Result<(), PropertyError> {
        let source = paste_source::<Self>(self.type_name(), from)?;
        self.base.about_to_set_value();
        self.value = source.value.clone();
        self.object = source.object.clone();
        self.base.has_set_value();
        Ok(())
    }

    fn mem_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.value.capacity()
            + self.object.as_ref().map_or(0, |o| o.mem_size())
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
    use crate::registry::BASE_CLASS;

    #[derive(Debug, Clone, Default)]
    struct Sketch {
        edges: i64,
    }

    impl Persistable for Sketch {
        fn type_name(&self) -> &'static str {
            "Test::Sketch"
        }

        fn save(&self, writer: &mut Writer) -> Result<(), EncodeError> {
            writer.empty_element("Sketch", &[("edges", &self.edges.to_string())]);
            Ok(())
        }

        fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError> {
            reader.read_element("Sketch")?;
            self.edges = reader.attribute_i64("edges")?;
            Ok(())
        }

        fn mem_size(&self) -> usize {
            8
        }

        fn to_dynamic(&self) -> DynValue {
            DynValue::Int(self.edges)
        }

        fn clone_box(&self) -> Box<dyn Persistable> {
            Box::new(self.clone())
        }
    }

    fn new_sketch() -> Box<dyn Persistable> {
        Box::new(Sketch::default())
    }

    fn register_types() {
        TypeRegistry::register("Test::Sketch", PERSISTENCE, Some(new_sketch));
        TypeRegistry::register("Test::Abstract", PERSISTENCE, None);
        TypeRegistry::register("Test::Volatile", BASE_CLASS, None);
    }

    fn sketch_with_edges(edges: i64) -> PersistentObjectProperty {
        register_types();
        let mut prop = PersistentObjectProperty::new();
        prop.set_value("Test::Sketch").unwrap();
        let xml = format!(
            "<String value=\"Test::Sketch\"/>\n<PersistentObject>\n    <Sketch edges=\"{edges}\"/>\n</PersistentObject>\n"
        );
        let mut reader = XmlReader::new(&xml).unwrap();
        prop.restore(&mut reader).unwrap();
        prop
    }

    #[test]
    fn test_set_value_creates_payload() {
        register_types();
        let owner = Recorder::new();
        let mut prop = PersistentObjectProperty::new();
        prop.base_mut().attach("Payload", &owner);

        prop.set_value("Test::Sketch").unwrap();
        assert_eq!(prop.value(), "Test::Sketch");
        assert_eq!(prop.object().map(|o| o.type_name()), Some("Test::Sketch"));
        assert_eq!(owner.events(), vec!["before:Payload", "after:Payload"]);

        // same type keeps the payload silently
        owner.clear();
        prop.set_value("Test::Sketch").unwrap();
        assert!(owner.events().is_empty());

        prop.set_value("").unwrap();
        assert_eq!(prop.value(), "");
        assert!(prop.object().is_none());
        assert_eq!(owner.events().len(), 2);
    }

    #[test]
    fn test_set_value_rejects() {
        register_types();
        let owner = Recorder::new();
        let mut prop = PersistentObjectProperty::new();
        prop.base_mut().attach("Payload", &owner);

        let err = prop.set_value("Test::Volatile").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid type 'Test::Volatile': type must be derived from Base::Persistence"
        );
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(prop.set_value("Test::Unregistered").is_err());
        assert!(owner.events().is_empty());
        assert_eq!(prop.value(), "");
    }

    #[test]
    fn test_rejected_type_keeps_payload() {
        let mut prop = sketch_with_edges(3);
        assert!(prop.set_value("Test::Volatile").is_err());
        assert_eq!(prop.value(), "Test::Sketch");
        assert_eq!(prop.to_dynamic(), DynValue::Int(3));
    }

    #[test]
    fn test_abstract_type_has_no_payload() {
        register_types();
        let mut prop = PersistentObjectProperty::new();
        prop.set_value("Test::Abstract").unwrap();
        assert_eq!(prop.value(), "Test::Abstract");
        assert!(prop.object().is_none());
        assert_eq!(prop.to_dynamic(), DynValue::from("Test::Abstract"));
    }

    #[test]
    fn test_text_form() {
        let prop = sketch_with_edges(4);
        let mut writer = Writer::new();
        prop.save(&mut writer).unwrap();
        assert_eq!(
            writer.as_str(),
            "<String value=\"Test::Sketch\"/>\n<PersistentObject>\n    <Sketch edges=\"4\"/>\n</PersistentObject>\n"
        );

        let mut restored = PersistentObjectProperty::new();
        text_roundtrip(&prop, &mut restored);
        assert_eq!(restored.value(), "Test::Sketch");
        assert_eq!(restored.to_dynamic(), DynValue::Int(4));
    }

    #[test]
    fn test_restore_skips_unknown_content() {
        register_types();
        let xml = "<String value=\"Test::Abstract\"/>\n<PersistentObject>\n    <Unknown a=\"1\">\n        <Deeper/>\n    </Unknown>\n</PersistentObject>\n<Integer value=\"3\"/>\n";
        let mut reader = XmlReader::new(xml).unwrap();
        let mut prop = PersistentObjectProperty::new();
        prop.restore(&mut reader).unwrap();
        assert_eq!(prop.value(), "Test::Abstract");
        assert_eq!(reader.peek_element(), Some("Integer"));
    }

    #[test]
    fn test_restore_empty() {
        let xml = "<String value=\"\"/>\n<PersistentObject/>\n";
        let mut reader = XmlReader::new(xml).unwrap();
        let mut prop = PersistentObjectProperty::new();
        prop.restore(&mut reader).unwrap();
        assert_eq!(prop.value(), "");
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_restore_unregistered_type() {
        let xml = "<String value=\"Test::Unregistered\"/>\n<PersistentObject/>\n";
        let mut reader = XmlReader::new(xml).unwrap();
        let mut prop = PersistentObjectProperty::new();
        let err = prop.restore(&mut reader).unwrap_err();
        assert!(matches!(
            err,
            ReadError::Property(PropertyError::InvalidType { .. })
        ));
    }

    #[test]
    fn test_copy_and_paste() {
        let prop = sketch_with_edges(7);
        let copy = prop.copy();
        assert_eq!(copy.to_dynamic(), DynValue::Int(7));
        assert!(prop.mem_size() > std::mem::size_of::<PersistentObjectProperty>());

        let owner = Recorder::new();
        let mut target = PersistentObjectProperty::new();
        target.base_mut().attach("Payload", &owner);
        target.paste(copy.as_ref()).unwrap();
        assert_eq!(target.value(), "Test::Sketch");
        assert_eq!(target.to_dynamic(), DynValue::Int(7));
        assert_eq!(owner.events().len(), 2);
    }

    #[test]
    fn test_dynamic_rejects_non_string() {
        let mut prop = PersistentObjectProperty::new();
        let err = prop.set_dynamic(&DynValue::Int(1)).unwrap_err();
        assert_eq!(err.to_string(), "type must be str, not int");
    }
}
