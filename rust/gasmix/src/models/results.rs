use super::Amu;
use serde::{
    Deserialize,
    Serialize,
};

/// A substance together with the AMUs that no other unresolved
/// substance uses at the time it is scheduled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UniqueAmuMolecule {
    pub symbol: String,
    pub uniq_amus: Vec<Amu>,
}

/// Ion current attributed to a single substance after deconvolution.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedIonCurrent {
    pub symbol: String,
    pub amus: Vec<Amu>,
    pub ion_currents: Vec<f64>,
    pub total_ion_current: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Concentration {
    pub symbol: String,
    pub amus: Vec<Amu>,
    pub concentrations: Vec<f64>,
    pub total_concentration: f64,
}
