use super::Amu;
use crate::errors::DataProcessingError;
use serde::{
    Deserialize,
    Serialize,
};

/// One line of a scan recipe.
///
/// The first row of a recipe is reserved for the total pressure
/// reading, every following row targets one mass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwell: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<Amu>,
    #[serde(rename = "type")]
    pub row_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub em: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_analog: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_digital: Option<String>,
}

impl RecipeRow {
    pub fn pressure() -> Self {
        Self {
            row_type: "MASS".to_string(),
            special: Some("PRESSURE".to_string()),
            ..Default::default()
        }
    }

    pub fn mass(amu: Amu) -> Self {
        Self {
            row_type: "MASS".to_string(),
            mass: Some(amu),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(default, rename = "fromAMU", skip_serializing_if = "Option::is_none")]
    pub from_amu: Option<f64>,
    #[serde(default, rename = "toAMU", skip_serializing_if = "Option::is_none")]
    pub to_amu: Option<f64>,
    #[serde(default, rename = "pointsPerAMU", skip_serializing_if = "Option::is_none")]
    pub points_per_amu: Option<u32>,
    pub dwell: f64,
    pub mode: String,
    pub rows: Vec<RecipeRow>,
}

impl Recipe {
    /// Builds a "MASSES" recipe with a leading pressure row followed
    /// by one row per mass.
    pub fn from_masses(dwell: f64, masses: &[Amu]) -> Self {
        let rows = std::iter::once(RecipeRow::pressure())
            .chain(masses.iter().map(|&m| RecipeRow::mass(m)))
            .collect();
        Self {
            id: None,
            name: None,
            is_default: None,
            from_amu: None,
            to_amu: None,
            points_per_amu: None,
            dwell,
            mode: "MASSES".to_string(),
            rows,
        }
    }

    /// AMU of every measured channel, in row order (the pressure row is skipped).
    pub fn channel_amus(&self) -> Result<Vec<Amu>, DataProcessingError> {
        if self.rows.len() < 2 {
            return Err(DataProcessingError::ExpectedNonEmptyData {
                context: Some("Recipe has no mass rows".to_string()),
            });
        }
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, row)| {
                row.mass
                    .ok_or(DataProcessingError::MissingRecipeMass { row: i })
            })
            .collect()
    }

    pub fn num_channels(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}
