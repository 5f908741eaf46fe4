use super::Amu;
use crate::errors::{
    DataProcessingError,
    LookupError,
};
use crate::traits::SubstanceLike;
use nohash_hasher::IntMap;
use serde::Serialize;
use std::collections::HashMap;

// Lookup tables are built once per record set, the first entry wins on
// duplicated keys.

#[derive(Debug, Clone, Default)]
struct SymbolIndex {
    inner: HashMap<String, Vec<usize>>,
}

impl SymbolIndex {
    fn build<'a>(keys: impl Iterator<Item = &'a str>) -> Self {
        let mut inner: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, symbol) in keys.enumerate() {
            inner.entry(symbol.to_string()).or_default().push(i);
        }
        Self { inner }
    }

    fn get(&self, symbol: &str) -> Option<usize> {
        self.get_all(symbol).first().copied()
    }

    /// Every position holding `symbol`, in insertion order.
    fn get_all(&self, symbol: &str) -> &[usize] {
        self.inner.get(symbol).map(|x| x.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default)]
struct SymbolAmuIndex {
    inner: HashMap<String, IntMap<Amu, usize>>,
}

impl SymbolAmuIndex {
    fn build<'a>(keys: impl Iterator<Item = (&'a str, Amu)>) -> Self {
        let mut inner: HashMap<String, IntMap<Amu, usize>> = HashMap::new();
        for (i, (symbol, amu)) in keys.enumerate() {
            inner
                .entry(symbol.to_string())
                .or_default()
                .entry(amu)
                .or_insert(i);
        }
        Self { inner }
    }

    fn get(&self, symbol: &str, amu: Amu) -> Option<usize> {
        self.inner.get(symbol).and_then(|x| x.get(&amu)).copied()
    }

    fn contains_symbol(&self, symbol: &str) -> bool {
        self.inner.contains_key(symbol)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartialPressure {
    pub symbol: String,
    pub partial_pressure: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct PartialPressures {
    entries: Vec<PartialPressure>,
    #[serde(skip)]
    index: SymbolIndex,
}

impl PartialPressures {
    pub fn new(entries: Vec<PartialPressure>) -> Self {
        let index = SymbolIndex::build(entries.iter().map(|x| x.symbol.as_str()));
        Self { entries, index }
    }

    pub fn get(&self, symbol: &str) -> Result<f64, LookupError> {
        self.index
            .get(symbol)
            .map(|i| self.entries[i].partial_pressure)
            .ok_or_else(|| LookupError::MissingSymbol {
                symbol: symbol.to_string(),
                context: "partial pressures",
            })
    }

    pub fn as_slice(&self) -> &[PartialPressure] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Sensitivity {
    pub symbol: String,
    pub amu: Amu,
    pub sensitivity: f64,
}

/// Ion current per unit partial pressure, per (symbol, amu).
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Sensitivities {
    entries: Vec<Sensitivity>,
    #[serde(skip)]
    index: SymbolAmuIndex,
}

impl Sensitivities {
    pub fn new(entries: Vec<Sensitivity>) -> Self {
        let index = SymbolAmuIndex::build(entries.iter().map(|x| (x.symbol.as_str(), x.amu)));
        Self { entries, index }
    }

    pub fn get(&self, symbol: &str, amu: Amu) -> Result<f64, LookupError> {
        self.index
            .get(symbol, amu)
            .map(|i| self.entries[i].sensitivity)
            .ok_or_else(|| LookupError::MissingSymbolAmu {
                symbol: symbol.to_string(),
                amu,
                context: "sensitivities",
            })
    }

    /// Largest sensitivity among the channels of `symbol` (its 100%-peak).
    pub fn peak_for_symbol(&self, symbol: &str) -> Result<f64, LookupError> {
        if !self.index.contains_symbol(symbol) {
            return Err(LookupError::MissingSymbol {
                symbol: symbol.to_string(),
                context: "sensitivities",
            });
        }
        Ok(self
            .entries
            .iter()
            .filter(|x| x.symbol == symbol)
            .map(|x| x.sensitivity)
            .fold(f64::NEG_INFINITY, f64::max))
    }

    pub fn as_slice(&self) -> &[Sensitivity] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationFactor {
    pub symbol: String,
    pub amu: Amu,
    pub sensitivity: f64,
    pub calibration_factor: f64,
}

/// Sensitivities normalized by the reference substance's 100%-peak.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct CalibrationFactors {
    entries: Vec<CalibrationFactor>,
    #[serde(skip)]
    index: SymbolAmuIndex,
}

impl CalibrationFactors {
    pub fn new(entries: Vec<CalibrationFactor>) -> Self {
        let index = SymbolAmuIndex::build(entries.iter().map(|x| (x.symbol.as_str(), x.amu)));
        Self { entries, index }
    }

    /// Factors of 1.0 for every (symbol, amu) pair.
    pub fn uniform<'a>(pairs: impl IntoIterator<Item = (&'a str, Amu)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(symbol, amu)| CalibrationFactor {
                    symbol: symbol.to_string(),
                    amu,
                    sensitivity: 1.0,
                    calibration_factor: 1.0,
                })
                .collect(),
        )
    }

    pub fn get(&self, symbol: &str, amu: Amu) -> Result<f64, LookupError> {
        self.index
            .get(symbol, amu)
            .map(|i| self.entries[i].calibration_factor)
            .ok_or_else(|| LookupError::MissingSymbolAmu {
                symbol: symbol.to_string(),
                amu,
                context: "calibration factors",
            })
    }

    pub fn as_slice(&self) -> &[CalibrationFactor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Intensity pattern of one substance relative to its own 100%-peak.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProportionProfile {
    pub symbol: String,
    pub amus: Vec<Amu>,
    pub proportions: Vec<f64>,
}

impl ProportionProfile {
    pub fn proportion_of(&self, amu: Amu) -> Option<f64> {
        self.amus
            .iter()
            .position(|&x| x == amu)
            .and_then(|i| self.proportions.get(i).copied())
    }
}

impl SubstanceLike for ProportionProfile {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn atomic_masses(&self) -> &[Amu] {
        &self.amus
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Proportions {
    entries: Vec<ProportionProfile>,
    #[serde(skip)]
    index: SymbolIndex,
}

impl Proportions {
    /// Fails if a profile does not have one proportion per AMU.
    pub fn new(entries: Vec<ProportionProfile>) -> Result<Self, DataProcessingError> {
        for entry in &entries {
            if entry.amus.len() != entry.proportions.len() {
                return Err(DataProcessingError::ExpectedSlicesSameLength {
                    expected: entry.amus.len(),
                    other: entry.proportions.len(),
                    context: format!("amus and proportions of {:?}", entry.symbol),
                });
            }
        }
        let index = SymbolIndex::build(entries.iter().map(|x| x.symbol.as_str()));
        Ok(Self { entries, index })
    }

    pub fn get(&self, symbol: &str) -> Result<&ProportionProfile, LookupError> {
        self.index
            .get(symbol)
            .map(|i| &self.entries[i])
            .ok_or_else(|| LookupError::MissingSymbol {
                symbol: symbol.to_string(),
                context: "proportions",
            })
    }

    /// Profile of `symbol` whose AMUs are set-equal to `amus`.
    pub fn matching(&self, symbol: &str, amus: &[Amu]) -> Option<&ProportionProfile> {
        self.index
            .get_all(symbol)
            .iter()
            .filter_map(|&i| self.entries.get(i))
            .find(|p| p.same_amu_set(amus))
    }

    pub fn as_slice(&self) -> &[ProportionProfile] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
