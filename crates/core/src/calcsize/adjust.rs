//! Number adjustment toward valid mode sizes
//!
//! Given a mode's dry volume and number in both phases, nudge the numbers so
//! that the implied volume-to-number ratio lies inside the mode's bounds.
//! Out-of-range numbers are assumed to relax to their bound over one day, so
//! a step of length `dt` closes the fraction `dt / max(1 day, dt)` of the gap.
//!
//! # Algorithm
//!
//! The case is chosen from which phases carry volume:
//!
//! - Neither phase: both numbers go to zero.
//! - Only one phase: the empty phase goes to zero and the other is pulled
//!   toward its strict bounds.
//! - Both phases: first each phase is pulled toward its relaxed bounds (27×
//!   wider). If only one phase moved, the other absorbs the opposite change
//!   so that the combined number stays close to its starting value. Then the
//!   combined number is pulled toward the strict bounds on the combined
//!   volume, with the correction assigned to whichever phase is out of range
//!   (or split by share when both are).
//!
//! Tendencies are `(final - initial) / dt` using the raw, possibly negative,
//! initial numbers.

use serde::{Deserialize, Serialize};

use super::limits::{V2nBounds, V2nLimits};
use super::CLOSE_TO_ONE;
use crate::column::Phases;

/// Which phases of a mode carry dry volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjustCase {
    /// No volume in either phase
    BothEmpty,
    /// Interstitial volume only
    CloudBorneEmpty,
    /// Cloud-borne volume only
    InterstitialEmpty,
    /// Volume in both phases
    BothPresent,
}

impl AdjustCase {
    pub fn classify(dry_volume: Phases<f64>) -> Self {
        match (dry_volume.interstitial > 0.0, dry_volume.cloud_borne > 0.0) {
            (false, false) => AdjustCase::BothEmpty,
            (true, false) => AdjustCase::CloudBorneEmpty,
            (false, true) => AdjustCase::InterstitialEmpty,
            (true, true) => AdjustCase::BothPresent,
        }
    }
}

/// Inputs to [`adjust_num_sizes`] for one mode at one level
#[derive(Debug, Clone, Copy)]
pub struct AdjustInputs {
    pub dry_volume: Phases<f64>,
    /// Number before adjustment, may be negative
    pub initial_number: Phases<f64>,
    /// Time step (s)
    pub dt: f64,
    pub limits: V2nLimits,
    /// Inverse of the adjustment time scale (1/s)
    pub adj_tscale_inv: f64,
}

impl AdjustInputs {
    /// Fraction of the adjustment time scale covered by one step, in `[0, 1]`
    #[inline]
    pub fn fraction(&self) -> f64 {
        (self.dt * self.adj_tscale_inv).clamp(0.0, 1.0)
    }
}

/// Adjusted numbers and the tendencies that produce them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustOutputs {
    pub case: AdjustCase,
    pub number: Phases<f64>,
    pub tendency: Phases<f64>,
}

/// Adjust interstitial and cloud-borne number of one mode.
pub fn adjust_num_sizes(inputs: &AdjustInputs) -> AdjustOutputs {
    let case = AdjustCase::classify(inputs.dry_volume);
    let start = inputs.initial_number.map(|n| n.max(0.0));
    let frac = inputs.fraction();
    let drv = inputs.dry_volume;
    let strict = inputs.limits.strict;

    let number = match case {
        AdjustCase::BothEmpty => Phases::splat(0.0),
        AdjustCase::CloudBorneEmpty => Phases::new(
            pull_toward(strict, drv.interstitial, start.interstitial, frac),
            0.0,
        ),
        AdjustCase::InterstitialEmpty => Phases::new(
            0.0,
            pull_toward(strict, drv.cloud_borne, start.cloud_borne, frac),
        ),
        AdjustCase::BothPresent => {
            let relaxed = relaxed_step(inputs.limits.relaxed, drv, start, frac);
            let correction = strict_step(strict, drv, relaxed, frac);
            Phases::new(
                relaxed.interstitial + correction.interstitial,
                relaxed.cloud_borne + correction.cloud_borne,
            )
        }
    };

    let dtinv = 1.0 / (inputs.dt * CLOSE_TO_ONE);
    let tendency = Phases::new(
        (number.interstitial - inputs.initial_number.interstitial) * dtinv,
        (number.cloud_borne - inputs.initial_number.cloud_borne) * dtinv,
    );

    AdjustOutputs {
        case,
        number,
        tendency,
    }
}

/// Move `number` the fraction `frac` of the way to its clamped value.
#[inline]
fn pull_toward(bounds: V2nBounds, volume: f64, number: f64, frac: f64) -> f64 {
    number + (bounds.clamp_number(volume, number) - number) * frac
}

/// Per-phase pass against the relaxed bounds, with interstitial/cloud-borne
/// coupling when only one phase moves.
pub fn relaxed_step(
    relaxed: V2nBounds,
    drv: Phases<f64>,
    number: Phases<f64>,
    frac: f64,
) -> Phases<f64> {
    let delta_i = (relaxed.clamp_number(drv.interstitial, number.interstitial)
        - number.interstitial)
        * frac;
    let delta_c =
        (relaxed.clamp_number(drv.cloud_borne, number.cloud_borne) - number.cloud_borne) * frac;

    let mut out = Phases::new(number.interstitial + delta_i, number.cloud_borne + delta_c);
    if delta_i == 0.0 && delta_c != 0.0 {
        out.interstitial = relaxed.clamp_number(drv.interstitial, number.interstitial - delta_c);
    }
    if delta_c == 0.0 && delta_i != 0.0 {
        out.cloud_borne = relaxed.clamp_number(drv.cloud_borne, number.cloud_borne - delta_i);
    }
    out
}

/// Correction that pulls the combined number toward the strict bounds on the
/// combined volume.
pub fn strict_step(strict: V2nBounds, drv: Phases<f64>, number: Phases<f64>, frac: f64) -> Phases<f64> {
    let total_drv = drv.total();
    let total_num = number.total();

    let lower = strict.min_number(total_drv);
    let upper = strict.max_number(total_drv);

    if total_num < lower {
        let low_i = number.interstitial < strict.min_number(drv.interstitial);
        let low_c = number.cloud_borne < strict.min_number(drv.cloud_borne);
        distribute((lower - total_num) * frac, low_i, low_c, drv, number)
    } else if total_num > upper {
        let high_i = number.interstitial > strict.max_number(drv.interstitial);
        let high_c = number.cloud_borne > strict.max_number(drv.cloud_borne);
        distribute((upper - total_num) * frac, high_i, high_c, drv, number)
    } else {
        Phases::splat(0.0)
    }
}

/// Assign `delta` to the violating phase(s).
fn distribute(
    delta: f64,
    violates_i: bool,
    violates_c: bool,
    drv: Phases<f64>,
    number: Phases<f64>,
) -> Phases<f64> {
    match (violates_i, violates_c) {
        (true, true) => {
            let total_num = number.total();
            let (share_i, share_c) = if total_num > 0.0 {
                (number.interstitial / total_num, number.cloud_borne / total_num)
            } else {
                let total_drv = drv.total();
                (drv.interstitial / total_drv, drv.cloud_borne / total_drv)
            };
            Phases::new(delta * share_i, delta * share_c)
        }
        (_, true) => Phases::new(0.0, delta),
        (true, false) => Phases::new(delta, 0.0),
        (false, false) => Phases::splat(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calcsize::limits::{relaxed_v2n_limits, V2nBounds};
    use crate::calcsize::SECONDS_IN_A_DAY;
    use crate::core_types::ModeRole;
    use approx::assert_relative_eq;

    fn inputs(drv: (f64, f64), num: (f64, f64), dt: f64) -> AdjustInputs {
        AdjustInputs {
            dry_volume: Phases::new(drv.0, drv.1),
            initial_number: Phases::new(num.0, num.1),
            dt,
            limits: relaxed_v2n_limits(false, ModeRole::Other, V2nBounds::new(10.0, 1000.0)),
            adj_tscale_inv: 1.0 / (SECONDS_IN_A_DAY.max(dt) * CLOSE_TO_ONE),
        }
    }

    #[test]
    fn both_empty_zeroes_numbers() {
        let out = adjust_num_sizes(&inputs((0.0, -1.0), (5.0, 3.0), 10.0));
        assert_eq!(out.case, AdjustCase::BothEmpty);
        assert_eq!(out.number, Phases::splat(0.0));
        assert_relative_eq!(out.tendency.interstitial, -5.0 / (10.0 * CLOSE_TO_ONE), max_relative = 1e-12);
        assert_relative_eq!(out.tendency.cloud_borne, -3.0 / (10.0 * CLOSE_TO_ONE), max_relative = 1e-12);
    }

    #[test]
    fn negative_initial_number_tendency_uses_raw_value() {
        let out = adjust_num_sizes(&inputs((0.0, 0.0), (-4.0, 0.0), 2.0));
        assert_eq!(out.number.interstitial, 0.0);
        assert_relative_eq!(out.tendency.interstitial, 4.0 / (2.0 * CLOSE_TO_ONE), max_relative = 1e-12);
    }

    #[test]
    fn cloud_borne_empty_pulls_interstitial_only() {
        // number 1 is far below 1.0 × 10; one full day closes the gap
        let out = adjust_num_sizes(&inputs((1.0, 0.0), (1.0, 7.0), SECONDS_IN_A_DAY));
        assert_eq!(out.case, AdjustCase::CloudBorneEmpty);
        assert_eq!(out.number.cloud_borne, 0.0);
        assert_relative_eq!(out.number.interstitial, 10.0, max_relative = 1e-12);
    }

    #[test]
    fn interstitial_empty_is_symmetric() {
        let out = adjust_num_sizes(&inputs((0.0, 1.0), (7.0, 5000.0), SECONDS_IN_A_DAY / 2.0));
        assert_eq!(out.case, AdjustCase::InterstitialEmpty);
        assert_eq!(out.number.interstitial, 0.0);
        // halfway from 5000 toward 1000
        assert_relative_eq!(out.number.cloud_borne, 3000.0, max_relative = 1e-12);
    }

    #[test]
    fn in_range_numbers_are_untouched() {
        let out = adjust_num_sizes(&inputs((1.0, 2.0), (100.0, 300.0), 1800.0));
        assert_eq!(out.case, AdjustCase::BothPresent);
        assert_eq!(out.number, Phases::new(100.0, 300.0));
        assert_eq!(out.tendency, Phases::splat(0.0));
    }

    #[test]
    fn one_sided_relaxed_move_is_balanced_by_other_phase() {
        let relaxed = V2nBounds::new(10.0 / 27.0, 27_000.0);
        // cloud-borne is above its relaxed max, interstitial is in range
        let out = relaxed_step(relaxed, Phases::new(1.0, 1.0), Phases::new(100.0, 30_000.0), 1.0);
        assert_relative_eq!(out.cloud_borne, 27_000.0);
        // interstitial absorbs the 3000 removed from cloud-borne
        assert_relative_eq!(out.interstitial, 3100.0);
    }

    #[test]
    fn strict_correction_goes_to_the_violating_phase() {
        let strict = V2nBounds::new(10.0, 1000.0);
        // combined 16 < 2 × 10, only interstitial below its own bound
        let delta = strict_step(strict, Phases::new(1.0, 1.0), Phases::new(1.0, 15.0), 1.0);
        assert_eq!(delta.cloud_borne, 0.0);
        assert_relative_eq!(delta.interstitial, 4.0);

        // both below: split by share of the combined number
        let delta = strict_step(strict, Phases::new(1.0, 1.0), Phases::new(1.0, 3.0), 0.5);
        assert_relative_eq!(delta.interstitial, 8.0 * 0.25);
        assert_relative_eq!(delta.cloud_borne, 8.0 * 0.75);
    }

    #[test]
    fn zero_total_number_splits_by_volume() {
        let strict = V2nBounds::new(10.0, 1000.0);
        let delta = strict_step(strict, Phases::new(1.0, 3.0), Phases::splat(0.0), 1.0);
        assert_relative_eq!(delta.interstitial, 10.0);
        assert_relative_eq!(delta.cloud_borne, 30.0);
    }

    #[test]
    fn strict_correction_never_overshoots() {
        let strict = V2nBounds::new(10.0, 1000.0);
        for frac in [0.0, 0.1, 0.5, 0.999, 1.0] {
            let drv = Phases::new(2.0, 1.0);
            let low = Phases::new(1.0, 0.5);
            let after = low.total() + strict_step(strict, drv, low, frac).total();
            assert!(after <= strict.min_number(drv.total()) * (1.0 + 1e-12), "frac {frac}: {after}");

            let high = Phases::new(9000.0, 4000.0);
            let after = high.total() + strict_step(strict, drv, high, frac).total();
            assert!(after >= strict.max_number(drv.total()) * (1.0 - 1e-12), "frac {frac}: {after}");
        }
    }
}
