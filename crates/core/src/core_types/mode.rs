//! Lognormal aerosol modes
//!
//! A mode is a lognormal size class described by its dry diameter range and
//! geometric standard deviation. For a lognormal number distribution the mean
//! particle volume at geometric mean diameter `Dg` is
//!
//! ```text
//! V = (π/6) × Dg³ × exp(4.5 × ln²σ)
//! ```
//!
//! so the volume-to-number ratio is `1 / (cmn × Dg³)` with the shape constant
//! `cmn = (π/6) × exp(4.5 × ln²σ)`. The largest diameter gives the smallest
//! ratio and vice versa.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::units::Meters;

/// Mode identity in MAM4 ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModeIndex {
    Accumulation,
    Aitken,
    Coarse,
    PrimaryCarbon,
}

impl ModeIndex {
    /// Number of modes
    pub const COUNT: usize = 4;

    /// All modes in table order
    pub const ALL: [ModeIndex; Self::COUNT] = [
        ModeIndex::Accumulation,
        ModeIndex::Aitken,
        ModeIndex::Coarse,
        ModeIndex::PrimaryCarbon,
    ];

    /// Position in per-mode arrays
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            ModeIndex::Accumulation => "accumulation",
            ModeIndex::Aitken => "aitken",
            ModeIndex::Coarse => "coarse",
            ModeIndex::PrimaryCarbon => "primary_carbon",
        }
    }

    /// Role of this mode in the Aitken/Accumulation exchange
    pub const fn role(self) -> ModeRole {
        match self {
            ModeIndex::Aitken => ModeRole::Aitken,
            ModeIndex::Accumulation => ModeRole::Accumulation,
            ModeIndex::Coarse | ModeIndex::PrimaryCarbon => ModeRole::Other,
        }
    }
}

/// Whether a mode takes part in the explicit Aitken/Accumulation transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeRole {
    Aitken,
    Accumulation,
    Other,
}

/// Size parameters of one lognormal mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AeroMode {
    /// Smallest allowed geometric mean dry diameter
    pub min_diameter: Meters,
    /// Largest allowed geometric mean dry diameter
    pub max_diameter: Meters,
    /// Nominal geometric mean dry diameter
    pub nom_diameter: Meters,
    /// Geometric standard deviation (dimensionless, > 1)
    pub mean_std_dev: f64,
}

impl AeroMode {
    pub fn new(
        min_diameter: Meters,
        max_diameter: Meters,
        nom_diameter: Meters,
        mean_std_dev: f64,
    ) -> Self {
        Self {
            min_diameter,
            max_diameter,
            nom_diameter,
            mean_std_dev,
        }
    }

    /// MAM4 default mode parameters
    pub fn mam4(mode: ModeIndex) -> Self {
        let (min, max, nom, sigma) = match mode {
            ModeIndex::Accumulation => (5.35e-8, 4.4e-7, 1.1e-7, 1.8),
            ModeIndex::Aitken => (8.7e-9, 5.2e-8, 2.6e-8, 1.6),
            ModeIndex::Coarse => (1.0e-6, 4.0e-6, 2.0e-6, 1.8),
            ModeIndex::PrimaryCarbon => (1.0e-8, 1.0e-7, 5.0e-8, 1.6),
        };
        Self::new(Meters::new(min), Meters::new(max), Meters::new(nom), sigma)
    }

    /// Shape constant `(π/6) × exp(4.5 × ln²σ)`
    pub fn shape_constant(&self) -> f64 {
        let ln_sigma = self.mean_std_dev.ln();
        (4.5 * ln_sigma * ln_sigma).exp() * PI / 6.0
    }

    /// Volume-to-number ratio of a mode with geometric mean diameter `diameter`
    pub fn vol_to_num(&self, diameter: Meters) -> f64 {
        1.0 / (self.shape_constant() * diameter.cubed())
    }
}

/// Per-mode constants derived once at configuration time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeConstants {
    pub mode: ModeIndex,
    pub dgn_nom: f64,
    pub dgn_min: f64,
    pub dgn_max: f64,
    pub v2n_nom: f64,
    /// Ratio at the largest diameter
    pub v2n_min: f64,
    /// Ratio at the smallest diameter
    pub v2n_max: f64,
    /// Shape constant converting volume/number into diameter
    pub common_factor: f64,
}

impl ModeConstants {
    pub fn derive(mode: ModeIndex, params: &AeroMode) -> Self {
        Self {
            mode,
            dgn_nom: *params.nom_diameter,
            dgn_min: *params.min_diameter,
            dgn_max: *params.max_diameter,
            v2n_nom: params.vol_to_num(params.nom_diameter),
            v2n_min: params.vol_to_num(params.max_diameter),
            v2n_max: params.vol_to_num(params.min_diameter),
            common_factor: params.shape_constant(),
        }
    }

    #[inline]
    pub fn role(&self) -> ModeRole {
        self.mode.role()
    }
}
