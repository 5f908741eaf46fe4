pub mod calibration_records;
pub mod measurement;
pub mod mixture;
pub mod raw_scan;
pub mod recipe;
pub mod results;

/// Mass-to-charge channel addressed by a recipe row.
pub type Amu = u16;

pub use calibration_records::{
    CalibrationFactor,
    CalibrationFactors,
    PartialPressure,
    PartialPressures,
    ProportionProfile,
    Proportions,
    Sensitivities,
    Sensitivity,
};
pub use measurement::MeasurementData;
pub use mixture::{
    CalibrationSubstance,
    Substance,
};
pub use raw_scan::{
    RawCalibrationMeasurements,
    RawMeasurement,
    RawScan,
};
pub use recipe::{
    Recipe,
    RecipeRow,
};
pub use results::{
    Concentration,
    ResolvedIonCurrent,
    UniqueAmuMolecule,
};
