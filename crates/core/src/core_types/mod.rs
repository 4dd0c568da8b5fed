//! Core types: units, modes, species and the registry that ties them together

pub mod mode;
pub mod registry;
pub mod species;
pub mod units;

pub use mode::{AeroMode, ModeConstants, ModeIndex, ModeRole};
pub use registry::{AeroRegistry, RegistryBuilder, MAX_SPECIES_PER_MODE};
pub use species::{AeroId, AeroSpecies};
pub use units::{KgPerCubicMeter, Meters, Seconds};
