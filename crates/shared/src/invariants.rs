//! Bounded numeric wrappers for carrying validated invariants.

use std::fmt;

/// Out-of-range error for bounded numeric wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundsError<T> {
    /// Raw value provided.
    pub value: T,
    /// Inclusive minimum.
    pub min: T,
    /// Inclusive maximum.
    pub max: T,
}

impl<T: fmt::Display> fmt::Display for BoundsError<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "value {} is outside [{}, {}]",
            self.value, self.min, self.max
        )
    }
}

impl<T: fmt::Debug + fmt::Display> std::error::Error for BoundsError<T> {}

/// Bounded `u32` with const generic limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoundedU32<const MIN: u32, const MAX: u32>(u32);

impl<const MIN: u32, const MAX: u32> BoundedU32<MIN, MAX> {
    /// Create a bounded value when within the inclusive range.
    pub const fn new(value: u32) -> Option<Self> {
        if value < MIN || value > MAX {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Create a bounded value or return a bounds error.
    pub const fn try_new(value: u32) -> Result<Self, BoundsError<u32>> {
        match Self::new(value) {
            Some(value) => Ok(value),
            None => Err(BoundsError {
                value,
                min: MIN,
                max: MAX,
            }),
        }
    }

    /// Return the wrapped value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_u32_accepts_inclusive_range() {
        assert_eq!(BoundedU32::<1, 4>::new(1).map(BoundedU32::get), Some(1));
        assert_eq!(BoundedU32::<1, 4>::new(4).map(BoundedU32::get), Some(4));
        assert!(BoundedU32::<1, 4>::new(0).is_none());
        assert!(BoundedU32::<1, 4>::new(5).is_none());
    }

    #[test]
    fn bounds_error_reports_limits() {
        let error = BoundedU32::<1, 65_536>::try_new(0).err();
        assert_eq!(
            error,
            Some(BoundsError {
                value: 0,
                min: 1,
                max: 65_536,
            })
        );
        assert_eq!(
            error.map(|error| error.to_string()),
            Some("value 0 is outside [1, 65536]".to_string())
        );
    }
}
