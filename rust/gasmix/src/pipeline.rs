use crate::calibration::{
    calc_calibration_factors,
    calc_partial_pressures,
    calc_proportions,
    calc_sensitivities,
    calibration_total_pressure,
};
use crate::concentrations::calc_concentrations;
use crate::deconvolution::{
    check_proportions,
    resolve_with_residual,
};
use crate::errors::Result;
use crate::models::{
    CalibrationFactors,
    CalibrationSubstance,
    Concentration,
    MeasurementData,
    PartialPressures,
    Proportions,
    RawCalibrationMeasurements,
    RawMeasurement,
    Recipe,
    ResolvedIonCurrent,
    Sensitivities,
    Substance,
    UniqueAmuMolecule,
};
use crate::reduce::{
    ReductionConfig,
    reduce_calibration_scans,
    reduce_measurement,
};
use crate::resolve_order::plan_order;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{
    debug,
    info,
};

/// Everything derived from one calibration measurement.
///
/// Immutable once built; a single value can serve any number of
/// concurrent analyses.
#[derive(Debug, Clone, Serialize)]
pub struct Calibration {
    pub reference_symbol: String,
    pub total_pressure: f64,
    pub partial_pressures: PartialPressures,
    pub sensitivities: Sensitivities,
    pub calibration_factors: CalibrationFactors,
    pub proportions: Proportions,
}

/// Result of analyzing one test scan.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Analysis {
    pub scannum: u64,
    pub resolve_order: Vec<UniqueAmuMolecule>,
    pub resolved_ion_currents: Vec<ResolvedIonCurrent>,
    pub concentrations: Vec<Concentration>,
    /// Ion current left unattributed after deconvolution.
    pub residual: MeasurementData,
}

impl Calibration {
    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    pub fn from_measurements(
        recipe: &Recipe,
        calibration_mixture: &[CalibrationSubstance],
        raw_calibration: &RawCalibrationMeasurements,
        reference_symbol: &str,
    ) -> Result<Self> {
        let measurement = reduce_calibration_scans(recipe, raw_calibration)?;
        let total_pressure = calibration_total_pressure(raw_calibration)?;
        let partial_pressures = calc_partial_pressures(calibration_mixture, total_pressure);
        let sensitivities =
            calc_sensitivities(calibration_mixture, &partial_pressures, &measurement)?;
        let calibration_factors = calc_calibration_factors(&sensitivities, reference_symbol)?;
        let proportions = calc_proportions(calibration_mixture, &measurement)?;

        info!(
            "Calibrated {} substances against {:?} at total pressure {:e}",
            calibration_mixture.len(),
            reference_symbol,
            total_pressure
        );

        Ok(Self {
            reference_symbol: reference_symbol.to_string(),
            total_pressure,
            partial_pressures,
            sensitivities,
            calibration_factors,
            proportions,
        })
    }

    /// Checks that `test_mixture` can be analyzed with this calibration,
    /// without looking at any measurement, and returns its resolve order.
    pub fn validate(&self, test_mixture: &[Substance]) -> Result<Vec<UniqueAmuMolecule>> {
        check_proportions(test_mixture, &self.proportions)?;
        plan_order(test_mixture)
    }

    /// Analysis of one scan with an already planned resolve order.
    pub fn analyze_with_order(
        &self,
        recipe: &Recipe,
        test_mixture: &[Substance],
        resolve_order: &[UniqueAmuMolecule],
        raw_measurement: &RawMeasurement,
        reduction_config: &ReductionConfig,
    ) -> Result<Analysis> {
        let measurement = reduce_measurement(recipe, raw_measurement, reduction_config)?;
        let (resolved_ion_currents, residual) = resolve_with_residual(
            &self.proportions,
            measurement,
            test_mixture,
            Some(resolve_order),
        )?;
        let concentrations = calc_concentrations(
            test_mixture,
            &self.calibration_factors,
            &resolved_ion_currents,
        )?;
        debug!(
            "Analyzed scan {} ({} substances)",
            raw_measurement.data.scannum,
            concentrations.len()
        );

        Ok(Analysis {
            scannum: raw_measurement.data.scannum,
            resolve_order: resolve_order.to_vec(),
            resolved_ion_currents,
            concentrations,
            residual,
        })
    }

    pub fn analyze(
        &self,
        recipe: &Recipe,
        test_mixture: &[Substance],
        raw_measurement: &RawMeasurement,
        reduction_config: &ReductionConfig,
    ) -> Result<Analysis> {
        let order = self.validate(test_mixture)?;
        self.analyze_with_order(
            recipe,
            test_mixture,
            &order,
            raw_measurement,
            reduction_config,
        )
    }

    /// Analyzes every scan in parallel. Each scan is reduced into its own
    /// measurement, results come back in input order.
    ///
    /// If the test mixture cannot be analyzed at all, every scan gets the
    /// same error.
    pub fn analyze_batch(
        &self,
        recipe: &Recipe,
        test_mixture: &[Substance],
        raw_measurements: &[RawMeasurement],
        reduction_config: &ReductionConfig,
    ) -> Vec<Result<Analysis>> {
        let order = match self.validate(test_mixture) {
            Ok(x) => x,
            Err(e) => return vec![Err(e); raw_measurements.len()],
        };

        raw_measurements
            .par_iter()
            .map(|raw| {
                self.analyze_with_order(recipe, test_mixture, &order, raw, reduction_config)
            })
            .collect()
    }
}
