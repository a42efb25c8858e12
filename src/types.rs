//! Common traits and numeric helpers shared by the stowage engine.
//!
//! Items and containers expose their volume, weight and capacity through the
//! small traits below so the advisor, planner and manifest builder can work on
//! any shape that carries those quantities.

/// Global numerical tolerance for floating-point comparisons.
///
/// Used when comparing free capacity against an item volume and when
/// comparing scores that are derived from divisions.
pub const EPSILON_GENERAL: f64 = 1e-9;

/// Longest day span accepted from configuration and look-ahead requests.
pub const MAX_SPAN_DAYS: i64 = 36_500;

/// Trait for objects occupying storage volume.
pub trait Volumetric {
    /// Returns the occupied volume in storage units.
    fn volume(&self) -> f64;
}

/// Trait for objects with weight.
pub trait Weighted {
    /// Returns the weight in kg.
    fn weight(&self) -> f64;
}

/// Trait for anything that can hold volume up to a capacity.
///
/// The derived ratios treat a zero capacity as "no space and no fill" rather
/// than dividing by zero.
pub trait Stowage {
    /// Total capacity in storage units.
    fn capacity(&self) -> f64;

    /// Capacity currently taken by contained items.
    fn used_capacity(&self) -> f64;

    /// Number of items currently stowed.
    fn item_count(&self) -> usize;

    /// Remaining capacity; negative when the container is overfilled.
    fn free_capacity(&self) -> f64 {
        self.capacity() - self.used_capacity()
    }

    /// Share of the capacity that is still free (0.0 for zero capacity).
    fn free_fraction(&self) -> f64 {
        let capacity = self.capacity();
        if capacity <= 0.0 {
            return 0.0;
        }
        self.free_capacity() / capacity
    }

    /// Share of the capacity that is already used (0.0 for zero capacity).
    fn fill_ratio(&self) -> f64 {
        let capacity = self.capacity();
        if capacity <= 0.0 {
            return 0.0;
        }
        self.used_capacity() / capacity
    }

    /// Checks whether an object fits into the remaining capacity.
    fn can_hold(&self, object: &impl Volumetric) -> bool {
        self.free_capacity() + EPSILON_GENERAL >= object.volume()
    }
}

/// Sums the volume of a collection.
pub fn total_volume<'a, T>(objects: impl IntoIterator<Item = &'a T>) -> f64
where
    T: Volumetric + 'a,
{
    objects
        .into_iter()
        .fold(0.0, |total, object| total + object.volume())
}

/// Sums the weight of a collection.
pub fn total_weight<'a, T>(objects: impl IntoIterator<Item = &'a T>) -> f64
where
    T: Weighted + 'a,
{
    objects
        .into_iter()
        .fold(0.0, |total, object| total + object.weight())
}

/// Validation functions for numeric fields.
pub mod validation {

    /// Validates a quantity that may be zero but never negative or non-finite.
    ///
    /// # Parameters
    /// * `value` - The value to validate
    /// * `name` - Name of the field for error messages
    ///
    /// # Returns
    /// `Ok(())` for valid values, otherwise error text
    pub fn validate_quantity(value: f64, name: &str) -> Result<(), String> {
        if value.is_nan() {
            return Err(format!("{} must not be NaN", name));
        }
        if value.is_infinite() {
            return Err(format!("{} must not be infinite", name));
        }
        if value < 0.0 {
            return Err(format!("{} must not be negative, got: {}", name, value));
        }
        Ok(())
    }

    /// Validates an identifier (non-empty after trimming).
    pub fn validate_identifier(value: &str, name: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err(format!("{} must not be empty", name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bay {
        capacity: f64,
        used: f64,
        count: usize,
    }

    impl Stowage for Bay {
        fn capacity(&self) -> f64 {
            self.capacity
        }

        fn used_capacity(&self) -> f64 {
            self.used
        }

        fn item_count(&self) -> usize {
            self.count
        }
    }

    struct Crate(f64);

    impl Volumetric for Crate {
        fn volume(&self) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_stowage_ratios() {
        let bay = Bay {
            capacity: 100.0,
            used: 25.0,
            count: 2,
        };
        assert!((bay.free_capacity() - 75.0).abs() < EPSILON_GENERAL);
        assert!((bay.free_fraction() - 0.75).abs() < EPSILON_GENERAL);
        assert!((bay.fill_ratio() - 0.25).abs() < EPSILON_GENERAL);
    }

    #[test]
    fn test_zero_capacity_ratios() {
        let bay = Bay {
            capacity: 0.0,
            used: 0.0,
            count: 0,
        };
        assert_eq!(bay.free_fraction(), 0.0);
        assert_eq!(bay.fill_ratio(), 0.0);
        assert!(bay.can_hold(&Crate(0.0)));
        assert!(!bay.can_hold(&Crate(0.5)));
    }

    #[test]
    fn test_can_hold_exact_fit() {
        let bay = Bay {
            capacity: 10.0,
            used: 2.0,
            count: 1,
        };
        assert!(bay.can_hold(&Crate(8.0)));
        assert!(!bay.can_hold(&Crate(8.5)));
    }

    #[test]
    fn test_total_volume() {
        let crates = [Crate(1.5), Crate(2.5)];
        assert!((total_volume(&crates) - 4.0).abs() < EPSILON_GENERAL);
    }

    #[test]
    fn test_validation_quantity() {
        assert!(validation::validate_quantity(0.0, "Volume").is_ok());
        assert!(validation::validate_quantity(3.5, "Volume").is_ok());
        assert!(validation::validate_quantity(-1.0, "Volume").is_err());
        assert!(validation::validate_quantity(f64::NAN, "Volume").is_err());
        assert!(validation::validate_quantity(f64::INFINITY, "Volume").is_err());
    }

    #[test]
    fn test_validation_identifier() {
        assert!(validation::validate_identifier("C-01", "Container id").is_ok());
        assert!(validation::validate_identifier("   ", "Container id").is_err());
    }
}
