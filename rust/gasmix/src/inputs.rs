use crate::errors::InputReadingError;
use crate::models::RawMeasurement;
use serde::de::DeserializeOwned;
use serde::{
    Deserialize,
    Serialize,
};
use std::io::BufReader;
use std::path::{
    Path,
    PathBuf,
};

/// Reads any of the inbound structures (recipe, mixtures, raw scans)
/// from a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, InputReadingError> {
    let file = std::fs::File::open(path).map_err(|e| InputReadingError::FileReadingError {
        source: e,
        context: "Error opening input file",
        path: PathBuf::from(path),
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| InputReadingError::ParsingError {
        source: e,
        context: "Error parsing input file",
    })
}

/// Test scan file contents, one measurement or many.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestScans {
    Single(RawMeasurement),
    Many(Vec<RawMeasurement>),
}

impl TestScans {
    pub fn into_vec(self) -> Vec<RawMeasurement> {
        match self {
            TestScans::Single(x) => vec![x],
            TestScans::Many(x) => x,
        }
    }
}
