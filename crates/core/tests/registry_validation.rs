//! Registry construction errors
mod common;

use modal_aero_core::{
    AeroId, AeroMode, AeroRegistry, AeroSpecies, KgPerCubicMeter, Meters, ModeIndex,
    RegistryError,
};

#[test]
fn mam4_defaults_build() {
    let registry = AeroRegistry::builder().build().expect("defaults are valid");
    assert_eq!(registry.species(AeroId::So4).density, KgPerCubicMeter::new(1770.0));
    assert_eq!(registry.mode(ModeIndex::Aitken).mean_std_dev, 1.6);
}

#[test]
fn negative_density_is_rejected() {
    let err = AeroRegistry::builder()
        .species(AeroSpecies::new(AeroId::Dst, KgPerCubicMeter::new(-2600.0)))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::NonPositiveDensity {
            species: AeroId::Dst,
            ..
        }
    ));
    assert!(err.to_string().contains("Dst"));
}

#[test]
fn standard_deviation_below_one_is_rejected() {
    let mode = AeroMode::new(Meters::new(1e-8), Meters::new(1e-7), Meters::new(5e-8), 0.9);
    let err = AeroRegistry::builder()
        .mode(ModeIndex::PrimaryCarbon, mode)
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::InvalidStdDev {
            mode: ModeIndex::PrimaryCarbon,
            sigma: 0.9
        }
    );
}

#[test]
fn nominal_outside_range_is_rejected() {
    let mode = AeroMode::new(Meters::new(1e-8), Meters::new(1e-7), Meters::new(2e-7), 1.6);
    let err = AeroRegistry::builder()
        .mode(ModeIndex::Aitken, mode)
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::DegenerateDiameterRange {
            mode: ModeIndex::Aitken,
            ..
        }
    ));
}

#[test]
fn oversized_membership_is_rejected() {
    let members = vec![
        AeroId::So4,
        AeroId::Pom,
        AeroId::Soa,
        AeroId::Bc,
        AeroId::Dst,
        AeroId::NaCl,
        AeroId::Mom,
        AeroId::So4,
    ];
    let err = AeroRegistry::builder()
        .members(ModeIndex::Coarse, members)
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::TooManySpecies {
            mode: ModeIndex::Coarse,
            count: 8,
            limit: 7
        }
    );
}

#[test]
fn cloned_registry_keeps_membership() {
    let registry = AeroRegistry::mam4();
    let copy = registry.clone();
    assert_eq!(registry, copy);
    assert_eq!(copy.members(ModeIndex::PrimaryCarbon), &[AeroId::Pom, AeroId::Bc, AeroId::Mom]);
}
