//! Reduction of raw instrument scans into [`MeasurementData`].
//!
//! Both reducers drop the total pressure reading and align the remaining
//! readings with the mass rows of the recipe. Readings are taken as absolute
//! values, the amplifier reports negative currents for some channels.

use crate::errors::{
    DataProcessingError,
    Result,
};
use crate::models::{
    MeasurementData,
    RawCalibrationMeasurements,
    RawMeasurement,
    Recipe,
};
use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    warn,
};

/// Dark current of the amplifier, in ampere.
pub const DEFAULT_AMPLIFIER_NOISE: f64 = 2e-14;

/// Options for reducing a single test scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ReductionConfig {
    /// Constant subtracted from every channel, results are clamped at zero.
    #[serde(default)]
    pub noise_floor: Option<f64>,
}

impl ReductionConfig {
    pub fn with_amplifier_noise() -> Self {
        Self {
            noise_floor: Some(DEFAULT_AMPLIFIER_NOISE),
        }
    }
}

/// Averages the complete calibration scans channel by channel.
///
/// Scans whose channel count differs from the recipe (interrupted
/// acquisitions) are discarded, not truncated.
#[cfg_attr(
    feature = "instrumentation",
    tracing::instrument(skip_all, level = "trace")
)]
pub fn reduce_calibration_scans(
    recipe: &Recipe,
    raw: &RawCalibrationMeasurements,
) -> Result<MeasurementData> {
    let amus = recipe.channel_amus()?;
    let num_channels = amus.len();

    let complete: Vec<&[f64]> = raw
        .data
        .iter()
        .map(|scan| scan.channel_values())
        .filter(|values| values.len() == num_channels)
        .collect();

    let num_discarded = raw.data.len() - complete.len();
    if num_discarded > 0 {
        warn!(
            "Discarding {} of {} calibration scans with an unexpected number of channels",
            num_discarded,
            raw.data.len()
        );
    }
    if complete.is_empty() {
        return Err(DataProcessingError::NoCompleteScans {
            expected_channels: num_channels,
            num_scans: raw.data.len(),
        }
        .into());
    }

    let num_scans = complete.len() as f64;
    let averages = (0..num_channels)
        .map(|i| complete.iter().map(|values| values[i].abs()).sum::<f64>() / num_scans)
        .collect();
    debug!(
        "Averaged {} calibration scans over {} channels",
        complete.len(),
        num_channels
    );

    Ok(MeasurementData::new(amus, averages)
        .map_err(|e| e.append_to_context(" (averaged calibration scans)"))?)
}

/// Reduces one test scan, optionally subtracting a noise floor.
pub fn reduce_measurement(
    recipe: &Recipe,
    raw: &RawMeasurement,
    config: &ReductionConfig,
) -> Result<MeasurementData> {
    let amus = recipe.channel_amus()?;
    let values = raw.data.channel_values();
    if values.len() != amus.len() {
        return Err(DataProcessingError::ExpectedSlicesSameLength {
            expected: amus.len(),
            other: values.len(),
            context: format!("channels of scan {} against the recipe", raw.data.scannum),
        }
        .into());
    }

    let ion_currents = values
        .iter()
        .map(|v| match config.noise_floor {
            Some(noise) => (v.abs() - noise).max(0.0),
            None => v.abs(),
        })
        .collect();

    Ok(MeasurementData::new(amus, ion_currents)
        .map_err(|e| e.append_to_context(&format!(" (test scan {})", raw.data.scannum)))?)
}
