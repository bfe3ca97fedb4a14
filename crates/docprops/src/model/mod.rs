//! Plain value types carried by properties.

pub mod color;
pub mod constraint;
pub mod dynamic;
pub mod enumeration;
pub mod material;
pub mod path;

pub use color::Color;
pub use constraint::{ConstraintRef, Constraints, FLOAT_FALLBACK, INTEGER_FALLBACK, PERCENT, PRECISION};
pub use dynamic::DynValue;
pub use enumeration::Enumeration;
pub use material::Material;
pub use path::{ObjectIdentifier, PathValue, Quantity};
