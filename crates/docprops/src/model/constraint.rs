//! Bounds descriptors for constrained numeric properties.

use std::ops::Deref;

/// Lower bound, upper bound and UI step of a constrained number.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraints<T> {
    pub lower: T,
    pub upper: T,
    pub step: T,
}

impl<T: PartialOrd + Copy> Constraints<T> {
    pub const fn new(lower: T, upper: T, step: T) -> Self {
        Self { lower, upper, step }
    }

    /// Clamps `value` into `[lower, upper]`.
    pub fn clamp(&self, value: T) -> T {
        if value < self.lower {
            self.lower
        } else if value > self.upper {
            self.upper
        } else {
            value
        }
    }
}

/// Bounds used by an integer property without a descriptor.
pub const INTEGER_FALLBACK: Constraints<i64> =
    Constraints::new(i32::MIN as i64, i32::MAX as i64, 1);

/// Bounds used by a float property without a descriptor.
pub const FLOAT_FALLBACK: Constraints<f64> = Constraints::new(f64::MIN, f64::MAX, 1.0);

/// Shared bounds of a percentage.
pub static PERCENT: Constraints<i64> = Constraints::new(0, 100, 1);

/// Shared bounds of a precision value.
pub static PRECISION: Constraints<f64> = Constraints::new(0.0, f64::MAX, 0.001);

/// Ownership of a property's bounds descriptor.
///
/// A shared descriptor lives for the whole process and is never dropped by
/// the property. An owned descriptor belongs to the property and is dropped
/// when replaced.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintRef<T: 'static> {
    Shared(&'static Constraints<T>),
    Owned(Box<Constraints<T>>),
}

impl<T: 'static> ConstraintRef<T> {
    pub fn owned(constraints: Constraints<T>) -> Self {
        ConstraintRef::Owned(Box::new(constraints))
    }

    /// Returns true if the property owns the descriptor.
    pub fn is_deletable(&self) -> bool {
        matches!(self, ConstraintRef::Owned(_))
    }
}

impl<T: 'static> Deref for ConstraintRef<T> {
    type Target = Constraints<T>;

    fn deref(&self) -> &Constraints<T> {
        match self {
            ConstraintRef::Shared(c) => *c,
            ConstraintRef::Owned(c) => c.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        let c = Constraints::new(0, 10, 1);
        assert_eq!(c.clamp(-5), 0);
        assert_eq!(c.clamp(5), 5);
        assert_eq!(c.clamp(15), 10);

        let c = Constraints::new(0.0, 1.0, 0.1);
        assert_eq!(c.clamp(1.5), 1.0);
    }

    #[test]
    fn test_shared_is_not_deletable() {
        let shared = ConstraintRef::Shared(&PERCENT);
        assert!(!shared.is_deletable());
        assert_eq!(shared.upper, 100);

        let owned = ConstraintRef::owned(Constraints::new(1, 2, 1));
        assert!(owned.is_deletable());
        assert_eq!(owned.lower, 1);
    }
}
