//! Aerosol process trait definition
//!
//! This module defines the `AeroProcess` trait, the interface an outer time
//! stepping driver uses to invoke an aerosol process on one column. A process
//! reads prognostic state, updates diagnostics in place, and writes fresh
//! tendencies; it never advances the prognostic state itself.

use serde::{Deserialize, Serialize};

use crate::column::{Diagnostics, Prognostics, Tendencies};
use crate::core_types::Seconds;
use crate::error::CalcSizeError;

/// What one invocation of a process did to the column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepSummary {
    /// Number of levels processed
    pub levels: usize,
    /// Levels at which material moved between the Aitken and Accumulation modes
    pub transfer_levels: usize,
}

/// Interface for an aerosol process acting on one column
///
/// Implementations hold only configuration-time state, so a single instance
/// can be shared across threads and invoked on many columns.
pub trait AeroProcess: Send + Sync {
    /// Unique process name
    fn name(&self) -> &'static str;

    /// Compute tendencies for one time step
    ///
    /// # Arguments
    ///
    /// * `time` - Simulation time at the start of the step
    /// * `dt` - Step length
    /// * `prognostics` - Number and mass mixing ratios, read only
    /// * `diagnostics` - Diagnosed sizes, overwritten
    /// * `tendencies` - Rates of change, overwritten
    ///
    /// # Errors
    ///
    /// Returns [`CalcSizeError`] when `dt` is not a finite positive value or
    /// when the three containers disagree on the number of levels. Nothing is
    /// written in that case.
    fn compute_tendencies(
        &self,
        time: Seconds,
        dt: Seconds,
        prognostics: &Prognostics,
        diagnostics: &mut Diagnostics,
        tendencies: &mut Tendencies,
    ) -> Result<StepSummary, CalcSizeError>;
}

/// Check the step arguments shared by every process.
///
/// # Errors
///
/// See [`AeroProcess::compute_tendencies`].
pub fn validate_step(
    dt: Seconds,
    prognostics: &Prognostics,
    diagnostics: &Diagnostics,
    tendencies: &Tendencies,
) -> Result<(), CalcSizeError> {
    let dt = *dt;
    if !dt.is_finite() || dt <= 0.0 {
        return Err(CalcSizeError::InvalidTimeStep { dt });
    }
    let expected = prognostics.num_levels();
    if diagnostics.num_levels() != expected {
        return Err(CalcSizeError::LevelCountMismatch {
            container: "diagnostics",
            expected,
            actual: diagnostics.num_levels(),
        });
    }
    if tendencies.num_levels() != expected {
        return Err(CalcSizeError::LevelCountMismatch {
            container: "tendencies",
            expected,
            actual: tendencies.num_levels(),
        });
    }
    Ok(())
}
