//! Diameter and volume-to-number diagnosis
//!
//! With dry volume `V` and number `N` of a lognormal mode the geometric mean
//! diameter follows from `V / N = cmn × Dg³`:
//!
//! ```text
//! Dg = (V / (cmn × N))^(1/3)
//! ```
//!
//! Ratios outside the mode's bounds pin the diagnosis to the bound.

use super::limits::V2nBounds;
use crate::column::{ModeSize, Phase, Phases};
use crate::core_types::ModeConstants;

/// Bounds and shape constant needed to diagnose one mode's size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeBounds {
    pub v2n: V2nBounds,
    pub dgn_min: f64,
    pub dgn_max: f64,
    pub common_factor: f64,
}

impl SizeBounds {
    /// Unmodified bounds of a mode
    pub fn of(constants: &ModeConstants) -> Self {
        Self {
            v2n: V2nBounds::new(constants.v2n_min, constants.v2n_max),
            dgn_min: constants.dgn_min,
            dgn_max: constants.dgn_max,
            common_factor: constants.common_factor,
        }
    }

    /// Same diameters and shape constant with a different ratio pair
    pub fn with_v2n(self, v2n: V2nBounds) -> Self {
        Self { v2n, ..self }
    }
}

/// Diagnosed diameter (m) and volume-to-number ratio (1/m³)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeEstimate {
    pub diameter: f64,
    pub vol_to_num: f64,
}

/// Diagnose diameter and volume-to-number ratio from dry volume and number.
///
/// Returns `None` when `drv <= 0`; the caller keeps whatever size it had.
/// A number at or below `drv × v2n.min` reports `(dgn_min, v2n.min)` and a
/// number at or above `drv × v2n.max` reports `(dgn_max, v2n.max)`.
pub fn diagnose_size(drv: f64, num: f64, bounds: &SizeBounds) -> Option<SizeEstimate> {
    if drv <= 0.0 {
        return None;
    }
    let estimate = if num <= bounds.v2n.min_number(drv) {
        SizeEstimate {
            diameter: bounds.dgn_min,
            vol_to_num: bounds.v2n.min,
        }
    } else if num >= bounds.v2n.max_number(drv) {
        SizeEstimate {
            diameter: bounds.dgn_max,
            vol_to_num: bounds.v2n.max,
        }
    } else {
        SizeEstimate {
            diameter: (drv / (bounds.common_factor * num)).cbrt(),
            vol_to_num: num / drv,
        }
    };
    Some(estimate)
}

/// Update one phase of a mode's diagnosed size in place.
pub fn update_diameter_and_vol2num(
    drv: f64,
    num: f64,
    bounds: &SizeBounds,
    size: &mut ModeSize,
    phase: Phase,
) {
    if let Some(estimate) = diagnose_size(drv, num, bounds) {
        *size.diameter.get_mut(phase) = estimate.diameter;
        *size.vol_to_num.get_mut(phase) = estimate.vol_to_num;
    }
}

/// Nominal size used to seed a mode's diagnostics before each step.
pub fn nominal_size(constants: &ModeConstants) -> ModeSize {
    ModeSize {
        diameter: Phases::splat(constants.dgn_nom),
        vol_to_num: Phases::splat(constants.v2n_nom),
    }
}
