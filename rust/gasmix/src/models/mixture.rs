use super::Amu;
use crate::traits::SubstanceLike;
use serde::{
    Deserialize,
    Serialize,
};

/// Entry of a test mixture: a substance with unknown concentration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Substance {
    pub symbol: String,
    pub atomic_masses: Vec<Amu>,
}

impl Substance {
    pub fn new(symbol: impl Into<String>, atomic_masses: Vec<Amu>) -> Self {
        Self {
            symbol: symbol.into(),
            atomic_masses,
        }
    }
}

/// Entry of a calibration mixture, the concentration is the known
/// ground truth of the reference gas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalibrationSubstance {
    #[serde(flatten)]
    pub substance: Substance,
    pub concentration: f64,
}

impl CalibrationSubstance {
    pub fn new(symbol: impl Into<String>, atomic_masses: Vec<Amu>, concentration: f64) -> Self {
        Self {
            substance: Substance::new(symbol, atomic_masses),
            concentration,
        }
    }
}

impl SubstanceLike for Substance {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn atomic_masses(&self) -> &[Amu] {
        &self.atomic_masses
    }
}

impl SubstanceLike for CalibrationSubstance {
    fn symbol(&self) -> &str {
        &self.substance.symbol
    }

    fn atomic_masses(&self) -> &[Amu] {
        &self.substance.atomic_masses
    }
}

impl From<CalibrationSubstance> for Substance {
    fn from(val: CalibrationSubstance) -> Self {
        val.substance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_substance_flattened_json() {
        let json = r#"{"symbol": "N2", "atomic_masses": [28, 14], "concentration": 0.78}"#;
        let sub: CalibrationSubstance = serde_json::from_str(json).unwrap();
        assert_eq!(sub.symbol(), "N2");
        assert_eq!(sub.atomic_masses(), &[28, 14]);
        assert_eq!(sub.concentration, 0.78);
    }

    #[test]
    fn test_test_mixture_has_no_concentration() {
        let json = r#"{"symbol": "Ar", "atomic_masses": [40, 20]}"#;
        let sub: Substance = serde_json::from_str(json).unwrap();
        assert_eq!(sub, Substance::new("Ar", vec![40, 20]));
        assert!(serde_json::from_str::<CalibrationSubstance>(json).is_err());
    }

    #[test]
    fn test_same_amu_set_ignores_order() {
        let sub = Substance::new("test3", vec![6, 1, 2, 3, 4]);
        assert!(sub.same_amu_set(&[1, 2, 3, 4, 6]));
        assert!(!sub.same_amu_set(&[1, 2, 3, 4]));
        assert!(!sub.same_amu_set(&[1, 2, 3, 4, 5]));
    }
}
