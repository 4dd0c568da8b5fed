//! Aerosol species identities and material densities

use serde::{Deserialize, Serialize};

use super::units::KgPerCubicMeter;

/// Aerosol species identity
///
/// Ordering follows the MAM4 species table; `index()` is the position in
/// the registry's species array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AeroId {
    /// Sulfate
    So4,
    /// Primary organic matter
    Pom,
    /// Secondary organic aerosol
    Soa,
    /// Black carbon
    Bc,
    /// Mineral dust
    Dst,
    /// Sea salt
    NaCl,
    /// Marine organic matter
    Mom,
}

impl AeroId {
    /// Number of species identities
    pub const COUNT: usize = 7;

    /// All species in table order
    pub const ALL: [AeroId; Self::COUNT] = [
        AeroId::So4,
        AeroId::Pom,
        AeroId::Soa,
        AeroId::Bc,
        AeroId::Dst,
        AeroId::NaCl,
        AeroId::Mom,
    ];

    /// Position in the species table
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short symbol
    pub const fn symbol(self) -> &'static str {
        match self {
            AeroId::So4 => "SO4",
            AeroId::Pom => "POM",
            AeroId::Soa => "SOA",
            AeroId::Bc => "BC",
            AeroId::Dst => "DST",
            AeroId::NaCl => "NaCl",
            AeroId::Mom => "MOM",
        }
    }
}

/// A single aerosol species and its material density
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AeroSpecies {
    pub id: AeroId,
    pub density: KgPerCubicMeter,
}

impl AeroSpecies {
    pub fn new(id: AeroId, density: KgPerCubicMeter) -> Self {
        Self { id, density }
    }

    /// MAM4 default densities
    pub fn mam4(id: AeroId) -> Self {
        let density = match id {
            AeroId::So4 => 1770.0,
            AeroId::Pom | AeroId::Soa => 1000.0,
            AeroId::Bc => 1700.0,
            AeroId::Dst => 2600.0,
            AeroId::NaCl => 1900.0,
            AeroId::Mom => 1601.0,
        };
        Self::new(id, KgPerCubicMeter::new(density))
    }

    /// Specific volume (m³/kg) used to turn mass into dry volume
    #[inline]
    pub fn inverse_density(&self) -> f64 {
        self.density.inverse()
    }
}
