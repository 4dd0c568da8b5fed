//! Volume-to-number bounds
//!
//! Every mode has a strict pair of volume-to-number bounds derived from its
//! diameter range, and a relaxed pair that is 27 times wider on each side
//! (a factor of three in diameter). The relaxed pair is used for the first,
//! per-phase adjustment pass and the strict pair for the combined pass.
//!
//! When the explicit Aitken/Accumulation transfer is enabled, the bound that
//! faces the neighbouring mode is pushed out by six orders of magnitude so
//! that the number adjustment never competes with the transfer.

use serde::{Deserialize, Serialize};

use crate::core_types::ModeRole;

/// Relaxed bounds are this factor outside the strict bounds.
pub const RELAX_FACTOR: f64 = 27.0;

/// Factor by which the transfer-facing bound is pushed out.
pub const SIZE_ADJ_BLOCK_FACTOR: f64 = 1.0e6;

/// A `[min, max]` pair of volume-to-number ratios (1/m³)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct V2nBounds {
    pub min: f64,
    pub max: f64,
}

impl V2nBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp `number` into `[volume × min, volume × max]`.
    ///
    /// The lower bound wins if the interval is empty, matching
    /// `max(v × min, min(v × max, n))`.
    #[inline]
    pub fn clamp_number(&self, volume: f64, number: f64) -> f64 {
        (volume * self.min).max((volume * self.max).min(number))
    }

    /// Smallest number compatible with `volume`
    #[inline]
    pub fn min_number(&self, volume: f64) -> f64 {
        volume * self.min
    }

    /// Largest number compatible with `volume`
    #[inline]
    pub fn max_number(&self, volume: f64) -> f64 {
        volume * self.max
    }

    /// Widen both sides by `factor`
    #[inline]
    pub fn relaxed_by(&self, factor: f64) -> Self {
        Self::new(self.min / factor, self.max * factor)
    }
}

/// Strict and relaxed bounds for one mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct V2nLimits {
    pub strict: V2nBounds,
    pub relaxed: V2nBounds,
}

/// Compute the bounds used by the number adjustment of one mode.
///
/// # Arguments
/// * `suppress_transfer_side` - True when the explicit Aitken/Accumulation transfer runs
/// * `role` - Which side of the transfer this mode is on, if any
/// * `strict` - The mode's unmodified strict bounds
///
/// # Returns
/// The (possibly widened) strict pair and the relaxed pair derived from it
pub fn relaxed_v2n_limits(
    suppress_transfer_side: bool,
    role: ModeRole,
    strict: V2nBounds,
) -> V2nLimits {
    let mut strict = strict;
    if suppress_transfer_side {
        match role {
            ModeRole::Aitken => strict.min /= SIZE_ADJ_BLOCK_FACTOR,
            ModeRole::Accumulation => strict.max *= SIZE_ADJ_BLOCK_FACTOR,
            ModeRole::Other => {}
        }
    }
    V2nLimits {
        strict,
        relaxed: strict.relaxed_by(RELAX_FACTOR),
    }
}
