use super::Amu;
use crate::errors::{
    DataProcessingError,
    LookupError,
};
use nohash_hasher::IntMap;
use serde::{
    Deserialize,
    Serialize,
};

/// Reduced scan: one ion current per recipe channel.
///
/// The AMUs follow the recipe row order, they are not sorted. Both arrays
/// always have the same length; deserialization goes through
/// [`MeasurementData::new`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "MeasurementDataFields")]
pub struct MeasurementData {
    amus: Vec<Amu>,
    ion_currents: Vec<f64>,
}

#[derive(Deserialize)]
struct MeasurementDataFields {
    amus: Vec<Amu>,
    ion_currents: Vec<f64>,
}

impl TryFrom<MeasurementDataFields> for MeasurementData {
    type Error = DataProcessingError;

    fn try_from(value: MeasurementDataFields) -> Result<Self, Self::Error> {
        Self::new(value.amus, value.ion_currents)
    }
}

impl MeasurementData {
    pub fn new(amus: Vec<Amu>, ion_currents: Vec<f64>) -> Result<Self, DataProcessingError> {
        if amus.len() != ion_currents.len() {
            return Err(DataProcessingError::ExpectedSlicesSameLength {
                expected: amus.len(),
                other: ion_currents.len(),
                context: "amus and ion currents of a measurement".to_string(),
            });
        }
        Ok(Self { amus, ion_currents })
    }

    pub fn amus(&self) -> &[Amu] {
        &self.amus
    }

    pub fn ion_currents(&self) -> &[f64] {
        &self.ion_currents
    }

    /// Ion currents can be changed in place, the channel layout cannot.
    pub(crate) fn ion_currents_mut(&mut self) -> &mut [f64] {
        &mut self.ion_currents
    }

    pub fn into_parts(self) -> (Vec<Amu>, Vec<f64>) {
        (self.amus, self.ion_currents)
    }

    pub fn len(&self) -> usize {
        self.amus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amus.is_empty()
    }

    /// Maps every AMU to its channel index. A repeated AMU resolves to its
    /// first channel.
    pub fn channel_index(&self) -> IntMap<Amu, usize> {
        let mut index = IntMap::default();
        for (i, amu) in self.amus.iter().enumerate() {
            index.entry(*amu).or_insert(i);
        }
        index
    }

    pub fn ion_current(&self, amu: Amu) -> Result<f64, LookupError> {
        self.amus
            .iter()
            .position(|&x| x == amu)
            .and_then(|i| self.ion_currents.get(i).copied())
            .ok_or(LookupError::MissingAmu {
                amu,
                context: "measurement data",
            })
    }

    /// Ion current of the channel at position `channel`.
    pub fn ion_current_at(&self, channel: usize) -> Option<f64> {
        self.ion_currents.get(channel).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_rejects_mismatched_lengths() {
        let res = MeasurementData::new(vec![1, 2, 3], vec![1.0, 2.0]);
        assert!(matches!(
            res,
            Err(DataProcessingError::ExpectedSlicesSameLength {
                expected: 3,
                other: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_json_with_mismatched_lengths_is_rejected() {
        let res = serde_json::from_str::<MeasurementData>(
            r#"{"amus": [1, 2, 3], "ion_currents": [1.0]}"#,
        );
        let err = res.unwrap_err().to_string();
        assert!(err.contains("same length"), "{}", err);

        let data: MeasurementData =
            serde_json::from_str(r#"{"amus": [1, 2], "ion_currents": [1.0, 0.5]}"#).unwrap();
        assert_eq!(data.ion_currents(), &[1.0, 0.5]);
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"amus":[1,2],"ion_currents":[1.0,0.5]}"#);
    }

    #[test]
    fn test_lookup_by_value_not_index() {
        let data = MeasurementData::new(vec![44, 28, 2], vec![0.5, 10.0, 3.0]).unwrap();
        assert_eq!(data.ion_current(28).unwrap(), 10.0);
        assert_eq!(data.ion_current(2).unwrap(), 3.0);
        assert!(data.ion_current(32).is_err());
        assert_eq!(data.ion_current_at(1), Some(10.0));
        assert_eq!(data.ion_current_at(3), None);

        let index = data.channel_index();
        assert_eq!(index[&44], 0);
        assert_eq!(index[&2], 2);
    }
}
