#![doc = include_str!("../README.md")]

// Declare modules
pub mod calibration;
pub mod concentrations;
pub mod deconvolution;
pub mod errors;
pub mod inputs;
pub mod models;
pub mod pipeline;
pub mod reduce;
pub mod resolve_order;
pub mod traits;

// Re-export main structures
pub use crate::models::{
    Amu,
    CalibrationFactors,
    CalibrationSubstance,
    Concentration,
    MeasurementData,
    Proportions,
    RawCalibrationMeasurements,
    RawMeasurement,
    RawScan,
    Recipe,
    ResolvedIonCurrent,
    Substance,
    UniqueAmuMolecule,
};
pub use crate::pipeline::{
    Analysis,
    Calibration,
};
pub use crate::reduce::ReductionConfig;
pub use crate::traits::SubstanceLike;

// Re-export errors
pub use crate::errors::{
    DataProcessingError,
    GasMixError,
    InputReadingError,
    LookupError,
};
