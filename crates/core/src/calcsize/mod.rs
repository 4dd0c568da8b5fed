//! Mode size calculation
//!
//! Each step, for every level of a column and every mode:
//!
//! 1. Seed the diagnosed diameter and volume-to-number ratio with nominal values
//! 2. Compute dry volume from species mass ([`dry_volume`])
//! 3. Compute strict and relaxed ratio bounds ([`limits`])
//! 4. Nudge number toward the bounds and emit number tendencies ([`adjust`])
//! 5. Diagnose diameter and ratio for each phase ([`diameter`])
//!
//! After all modes at a level, material that has crossed the boundary between
//! the Aitken and Accumulation modes is moved across it ([`transfer`]).
//!
//! Levels are independent and are processed in parallel; the registry-derived
//! constants are shared read-only.

pub mod adjust;
pub mod diameter;
pub mod dry_volume;
pub mod limits;
pub mod transfer;

pub use adjust::{adjust_num_sizes, AdjustCase, AdjustInputs, AdjustOutputs};
pub use diameter::{diagnose_size, update_diameter_and_vol2num, SizeBounds, SizeEstimate};
pub use dry_volume::{dry_volume, dry_volume_of};
pub use limits::{relaxed_v2n_limits, V2nBounds, V2nLimits, RELAX_FACTOR, SIZE_ADJ_BLOCK_FACTOR};
pub use transfer::{
    acc_to_ait_fractions, ait_to_acc_fractions, ModeSnapshot, ModeTransferEngine,
    TransferFractions, TransferOutcome, TransferThresholds,
};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::column::{Diagnostics, LevelAerosol, LevelSize, Phase, Phases, Prognostics, Tendencies};
use crate::core_types::{AeroRegistry, ModeConstants, ModeIndex, ModeRole, Seconds, MAX_SPECIES_PER_MODE};
use crate::error::CalcSizeError;
use crate::process::{validate_step, AeroProcess, StepSummary};
use diameter::nominal_size;
use transfer::ExchangeInputs;

/// Adjustment time scale floor (s)
pub const SECONDS_IN_A_DAY: f64 = 86_400.0;

/// Keeps `1 / (dt × CLOSE_TO_ONE)` and the step fraction strictly below their
/// unscaled values.
pub const CLOSE_TO_ONE: f64 = 1.0 + 1.0e-15;

/// Inverse of the adjustment time scale `max(1 day, dt)`
#[inline]
pub fn adj_tscale_inv(dt: f64) -> f64 {
    1.0 / (SECONDS_IN_A_DAY.max(dt) * CLOSE_TO_ONE)
}

/// Switches for the two parts of the size calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalcSizeConfig {
    /// Nudge mode numbers toward their size bounds
    pub do_adjust: bool,
    /// Move material between the Aitken and Accumulation modes
    pub do_aitacc_transfer: bool,
}

impl Default for CalcSizeConfig {
    fn default() -> Self {
        Self {
            do_adjust: true,
            do_aitacc_transfer: true,
        }
    }
}

/// Mode size calculation process
#[derive(Debug, Clone)]
pub struct CalcSize {
    config: CalcSizeConfig,
    constants: [ModeConstants; ModeIndex::COUNT],
    inv_density: [[f64; MAX_SPECIES_PER_MODE]; ModeIndex::COUNT],
    transfer: ModeTransferEngine,
}

impl CalcSize {
    /// Precompute per-mode constants and per-species inverse densities.
    pub fn new(registry: &AeroRegistry, config: CalcSizeConfig) -> Self {
        let constants = ModeIndex::ALL.map(|mode| ModeConstants::derive(mode, registry.mode(mode)));
        let inv_density = ModeIndex::ALL.map(|mode| registry.inverse_densities(mode));
        let transfer = ModeTransferEngine::new(registry, &constants);

        let species: usize = ModeIndex::ALL
            .iter()
            .map(|&mode| registry.members(mode).len())
            .sum();
        info!(
            "Configured calcsize: {} modes, {} mode species, adjust={}, aitken/accumulation transfer={}",
            ModeIndex::COUNT,
            species,
            config.do_adjust,
            config.do_aitacc_transfer
        );

        Self {
            config,
            constants,
            inv_density,
            transfer,
        }
    }

    #[inline]
    pub fn config(&self) -> &CalcSizeConfig {
        &self.config
    }

    #[inline]
    pub fn constants(&self, mode: ModeIndex) -> &ModeConstants {
        &self.constants[mode.index()]
    }

    #[inline]
    pub fn transfer_engine(&self) -> &ModeTransferEngine {
        &self.transfer
    }

    /// Bounds used by the number adjustment of `mode` under this configuration
    pub fn limits(&self, mode: ModeIndex) -> V2nLimits {
        let c = self.constants(mode);
        relaxed_v2n_limits(
            self.config.do_aitacc_transfer,
            c.role(),
            V2nBounds::new(c.v2n_min, c.v2n_max),
        )
    }

    /// Run the size calculation for one level.
    ///
    /// `sizes` and `tendencies` are overwritten. Returns which transfer
    /// directions were active.
    pub fn compute_level(
        &self,
        dt: f64,
        prognostics: &LevelAerosol,
        sizes: &mut LevelSize,
        tendencies: &mut LevelAerosol,
    ) -> TransferOutcome {
        *tendencies = LevelAerosol::default();
        let tscale_inv = adj_tscale_inv(dt);

        let mut aitken = ModeSnapshot::default();
        let mut accumulation = ModeSnapshot::default();

        for mode in ModeIndex::ALL {
            let m = mode.index();
            let c = &self.constants[m];
            *sizes.mode_mut(mode) = nominal_size(c);

            let aerosol = prognostics.mode(mode);
            let drv = dry_volume(&self.inv_density[m], aerosol);
            let limits = self.limits(mode);

            let mut number = aerosol.number.map(|n| n.max(0.0));
            if self.config.do_adjust {
                let adjusted = adjust_num_sizes(&AdjustInputs {
                    dry_volume: drv,
                    initial_number: aerosol.number,
                    dt,
                    limits,
                    adj_tscale_inv: tscale_inv,
                });
                number = adjusted.number;
                tendencies.mode_mut(mode).number = adjusted.tendency;
            }

            let bounds = SizeBounds::of(c).with_v2n(limits.strict);
            for phase in Phase::ALL {
                update_diameter_and_vol2num(
                    *drv.get(phase),
                    *number.get(phase),
                    &bounds,
                    sizes.mode_mut(mode),
                    phase,
                );
            }

            if self.config.do_aitacc_transfer {
                match mode.role() {
                    ModeRole::Aitken => {
                        aitken = ModeSnapshot {
                            dry_volume: drv,
                            number,
                            fixed_volume: Phases::default(),
                        };
                    }
                    ModeRole::Accumulation => {
                        accumulation = ModeSnapshot {
                            dry_volume: drv,
                            number,
                            fixed_volume: self.transfer.fixed_volume(prognostics),
                        };
                    }
                    ModeRole::Other => {}
                }
            }
        }

        if !self.config.do_aitacc_transfer {
            return TransferOutcome::default();
        }
        self.transfer.exchange(
            &ExchangeInputs {
                aitken,
                accumulation,
                adj_tscale_inv: tscale_inv,
                dt,
            },
            prognostics,
            tendencies,
            sizes,
        )
    }
}

impl AeroProcess for CalcSize {
    fn name(&self) -> &'static str {
        "MAM4 calcsize"
    }

    fn compute_tendencies(
        &self,
        time: Seconds,
        dt: Seconds,
        prognostics: &Prognostics,
        diagnostics: &mut Diagnostics,
        tendencies: &mut Tendencies,
    ) -> Result<StepSummary, CalcSizeError> {
        validate_step(dt, prognostics, diagnostics, tendencies)?;

        if cfg!(debug_assertions) && !prognostics.quantities_nonnegative() {
            warn!("{}: negative number or mass in prognostics at t={}", self.name(), time);
        }

        let dt = *dt;
        let transfer_levels: usize = prognostics
            .levels()
            .par_iter()
            .zip(diagnostics.levels_mut().par_iter_mut())
            .zip(tendencies.levels_mut().par_iter_mut())
            .map(|((level, sizes), tend)| {
                usize::from(self.compute_level(dt, level, sizes, tend).is_active())
            })
            .sum();

        let levels = prognostics.num_levels();
        debug!(
            "{}: t={} dt={} levels={} transfer_levels={}",
            self.name(),
            time,
            dt,
            levels,
            transfer_levels
        );

        Ok(StepSummary {
            levels,
            transfer_levels,
        })
    }
}
