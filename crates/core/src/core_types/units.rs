//! Semantic unit types for registry and time-step quantities
//!
//! Newtype wrappers keep diameters, densities and time intervals from being
//! mixed up when a registry is assembled or a step is requested.
//!
//! # Design
//! - All types wrap `f64`; the size kernels work in double precision
//! - `Deref` exposes the raw value for arithmetic inside kernels
//! - Total ordering via `Ord` (NaN ordered greater than all values)
//! - Validated constructors that assert finiteness
//!
//! # Usage
//! ```
//! use modal_aero_core::core_types::units::{Meters, Seconds};
//!
//! let dgn = Meters::new(1.1e-7);
//! assert!((*dgn - 1.1e-7).abs() < 1e-20);
//!
//! let dt = Seconds::new(1800.0);
//! assert_eq!(Seconds::ONE_DAY.max(dt), Seconds::ONE_DAY);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

// ============================================================================
// LENGTH
// ============================================================================

/// Length in meters (particle diameters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Meters(f64);

impl Eq for Meters {}

impl PartialOrd for Meters {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Meters {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for Meters {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Meters {
    /// Create a new length. Asserts the value is finite.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn new(value: f64) -> Self {
        assert!(value.is_finite(), "Meters::new: value must be finite");
        Meters(value)
    }

    /// Cube of the length (m³)
    #[inline]
    #[must_use]
    pub fn cubed(self) -> f64 {
        self.0 * self.0 * self.0
    }
}

impl From<f64> for Meters {
    fn from(value: f64) -> Self {
        Meters::new(value)
    }
}

impl fmt::Display for Meters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:e} m", self.0)
    }
}

// ============================================================================
// TIME
// ============================================================================

/// Time interval in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Seconds(f64);

impl Eq for Seconds {}

impl PartialOrd for Seconds {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Seconds {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for Seconds {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Seconds {
    /// One day, the relaxation timescale for number adjustment
    pub const ONE_DAY: Seconds = Seconds(86400.0);

    /// Create a new time interval. Asserts the value is finite.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn new(value: f64) -> Self {
        assert!(value.is_finite(), "Seconds::new: value must be finite");
        Seconds(value)
    }
}

impl From<f64> for Seconds {
    fn from(value: f64) -> Self {
        Seconds::new(value)
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} s", self.0)
    }
}

// ============================================================================
// DENSITY
// ============================================================================

/// Material density in kg/m³
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KgPerCubicMeter(f64);

impl Eq for KgPerCubicMeter {}

impl PartialOrd for KgPerCubicMeter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KgPerCubicMeter {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for KgPerCubicMeter {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl KgPerCubicMeter {
    /// Create a new density. Asserts the value is finite.
    ///
    /// Positivity is a registry precondition and is checked when the
    /// registry is built, not here.
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn new(value: f64) -> Self {
        assert!(
            value.is_finite(),
            "KgPerCubicMeter::new: value must be finite"
        );
        KgPerCubicMeter(value)
    }

    /// Specific volume (m³/kg)
    #[inline]
    #[must_use]
    pub fn inverse(self) -> f64 {
        1.0 / self.0
    }
}

impl From<f64> for KgPerCubicMeter {
    fn from(value: f64) -> Self {
        KgPerCubicMeter::new(value)
    }
}

impl fmt::Display for KgPerCubicMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} kg/m³", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_total_ordering() {
        let dt = Seconds::new(3600.0);
        assert_eq!(Seconds::ONE_DAY.max(dt), Seconds::ONE_DAY);
        assert_eq!(Seconds::new(2.0 * 86400.0).max(Seconds::ONE_DAY), Seconds::new(172800.0));
    }

    #[test]
    fn density_inverse() {
        let rho = KgPerCubicMeter::new(2000.0);
        assert!((rho.inverse() - 5.0e-4).abs() < 1e-18);
    }

    #[test]
    fn meters_cubed() {
        let d = Meters::new(2.0e-6);
        assert!((d.cubed() - 8.0e-18).abs() < 1e-30);
    }

    #[test]
    #[should_panic(expected = "must be finite")]
    fn seconds_rejects_nan() {
        let _ = Seconds::new(f64::NAN);
    }
}
