//! Modal Aerosol Size Calculation
//!
//! Computes how the number concentration and characteristic diameter of four
//! lognormal aerosol modes evolve over one model time step, for a column of
//! vertical levels, given updated aerosol mass.
//!
//! ## Overview
//!
//! - Mode and species registry with MAM4 defaults ([`AeroRegistry`])
//! - Column containers for prognostic state, diagnosed sizes, and tendencies
//! - Number adjustment that keeps each mode's volume-to-number ratio in bounds
//! - Explicit Aitken ↔ Accumulation transfer for particles crossing the
//!   boundary between the two modes
//!
//! Interstitial and cloud-borne phases are tracked separately throughout.
//!
//! ```no_run
//! use modal_aero_core::{AeroProcess, AeroRegistry, CalcSize, CalcSizeConfig};
//! use modal_aero_core::{Diagnostics, Prognostics, Seconds, Tendencies};
//!
//! let registry = AeroRegistry::mam4();
//! let calcsize = CalcSize::new(&registry, CalcSizeConfig::default());
//!
//! let prognostics = Prognostics::new(72);
//! let mut diagnostics = Diagnostics::new(72);
//! let mut tendencies = Tendencies::new(72);
//! let summary = calcsize
//!     .compute_tendencies(
//!         Seconds::new(0.0),
//!         Seconds::new(1800.0),
//!         &prognostics,
//!         &mut diagnostics,
//!         &mut tendencies,
//!     )
//!     .expect("containers describe the same column");
//! assert_eq!(summary.levels, 72);
//! ```

pub mod calcsize;
pub mod column;
pub mod core_types;
pub mod error;
pub mod process;

pub use calcsize::{CalcSize, CalcSizeConfig};
pub use column::{Diagnostics, Phase, Phases, Prognostics, Tendencies};
pub use core_types::{
    AeroId, AeroMode, AeroRegistry, AeroSpecies, KgPerCubicMeter, Meters, ModeIndex, ModeRole,
    RegistryBuilder, Seconds,
};
pub use error::{CalcSizeError, RegistryError};
pub use process::{AeroProcess, StepSummary};
