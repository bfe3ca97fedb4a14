//! Process-wide registry of persistable payload types.
//!
//! Types are registered by name under a parent, forming a single-rooted
//! hierarchy below [`BASE_CLASS`]. Registration is rare and lookups happen
//! during restore, so the table sits behind a `RwLock`.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::codec::{Writer, XmlReader};
use crate::error::{EncodeError, ReadError};
use crate::model::DynValue;

/// Root of the type hierarchy.
pub const BASE_CLASS: &str = "Base::BaseClass";

/// Base of every type that can be saved and restored.
pub const PERSISTENCE: &str = "Base::Persistence";

/// An object that saves and restores itself in the structured text format.
pub trait Persistable: fmt::Debug {
    /// Registered type name.
    fn type_name(&self) -> &'static str;

    fn save(&self, writer: &mut Writer) -> Result<(), EncodeError>;

    fn restore(&mut self, reader: &mut XmlReader) -> Result<(), ReadError>;

    fn mem_size(&self) -> usize {
        0
    }

    /// Value exposed to scripts. Defaults to an opaque object.
    fn to_dynamic(&self) -> DynValue {
        DynValue::Object(self.type_name().to_string())
    }

    fn clone_box(&self) -> Box<dyn Persistable>;
}

impl Clone for Box<dyn Persistable> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Creates a default instance of a registered type.
pub type Factory = fn() -> Box<dyn Persistable>;

#[derive(Debug, Clone)]
struct TypeEntry {
    parent: Option<String>,
    factory: Option<Factory>,
}

fn builtin_types() -> FxHashMap<String, TypeEntry> {
    let mut types = FxHashMap::default();
    types.insert(
        BASE_CLASS.to_string(),
        TypeEntry {
            parent: None,
            factory: None,
        },
    );
    types.insert(
        PERSISTENCE.to_string(),
        TypeEntry {
            parent: Some(BASE_CLASS.to_string()),
            factory: None,
        },
    );
    types
}

lazy_static! {
    static ref TYPES: RwLock<FxHashMap<String, TypeEntry>> = RwLock::new(builtin_types());
}

/// Handle to the process-wide type registry.
pub struct TypeRegistry;

impl TypeRegistry {
    /// Registers `name` under `parent`. Abstract types pass no factory.
    ///
    /// Returns false, leaving the registry unchanged, when `name` is taken
    /// or `parent` is unknown.
    pub fn register(name: &str, parent: &str, factory: Option<Factory>) -> bool {
        let mut types = TYPES.write().unwrap_or_else(PoisonError::into_inner);
        if types.contains_key(name) {
            debug!(name, "type already registered");
            return false;
        }
        if !types.contains_key(parent) {
            warn!(name, parent, "cannot register type under unknown parent");
            return false;
        }
        types.insert(
            name.to_string(),
            TypeEntry {
                parent: Some(parent.to_string()),
                factory,
            },
        );
        debug!(name, parent, "registered type");
        true
    }

    pub fn contains(name: &str) -> bool {
        TYPES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Parent of `name`, `None` for the root or unknown names.
    pub fn parent(name: &str) -> Option<String> {
        let types = TYPES.read().unwrap_or_else(PoisonError::into_inner);
        types.get(name).and_then(|e| e.parent.clone())
    }

    /// Returns true if `name` is registered and is `base` or one of its
    /// descendants.
    pub fn is_derived_from(name: &str, base: &str) -> bool {
        let types = TYPES.read().unwrap_or_else(PoisonError::into_inner);
        let mut current = Some(name);
        while let Some(n) = current {
            let Some(entry) = types.get(n) else {
                return false;
            };
            if n == base {
                return true;
            }
            current = entry.parent.as_deref();
        }
        false
    }

    /// Creates an instance of `name`. `None` for unknown or abstract types.
    pub fn create(name: &str) -> Option<Box<dyn Persistable>> {
        let factory = {
            let types = TYPES.read().unwrap_or_else(PoisonError::into_inner);
            types.get(name)?.factory?
        };
        Some(factory())
    }
}
