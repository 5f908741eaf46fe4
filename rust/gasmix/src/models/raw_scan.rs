use serde::{
    Deserialize,
    Serialize,
};

pub const DEFAULT_SCAN_NAME: &str = "got";
pub const DEFAULT_SCAN_ORIGIN: &str = "/mmsp/measurement/scans";

/// One sample as delivered by the instrument.
///
/// `values[0]` is the total pressure, the remaining values line up
/// with the recipe rows after the pressure row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawScan {
    pub scannum: u64,
    pub scansize: usize,
    pub values: Vec<f64>,
}

impl RawScan {
    pub fn new(scannum: u64, values: Vec<f64>) -> Self {
        Self {
            scannum,
            scansize: values.len(),
            values,
        }
    }

    pub fn total_pressure(&self) -> Option<f64> {
        self.values.first().copied()
    }

    /// Channel readings without the total pressure.
    pub fn channel_values(&self) -> &[f64] {
        self.values.get(1..).unwrap_or(&[])
    }
}

/// A single test-gas scan in the acquisition envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawMeasurement {
    pub name: String,
    pub origin: String,
    pub data: RawScan,
}

impl From<RawScan> for RawMeasurement {
    fn from(data: RawScan) -> Self {
        Self {
            name: DEFAULT_SCAN_NAME.to_string(),
            origin: DEFAULT_SCAN_ORIGIN.to_string(),
            data,
        }
    }
}

/// Repeated scans of the calibration gas. Interrupted acquisitions can
/// leave truncated scans in `data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawCalibrationMeasurements {
    pub name: String,
    pub origin: String,
    pub data: Vec<RawScan>,
}

impl From<Vec<RawScan>> for RawCalibrationMeasurements {
    fn from(data: Vec<RawScan>) -> Self {
        Self {
            name: DEFAULT_SCAN_NAME.to_string(),
            origin: DEFAULT_SCAN_ORIGIN.to_string(),
            data,
        }
    }
}

impl RawCalibrationMeasurements {
    /// Total pressure of the calibration gas, read from the first scan.
    pub fn total_pressure(&self) -> Option<f64> {
        self.data.first().and_then(|scan| scan.total_pressure())
    }
}
