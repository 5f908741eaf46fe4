use crate::models::Amu;

/// Common view over calibration and test mixture entries.
pub trait SubstanceLike {
    fn symbol(&self) -> &str;
    fn atomic_masses(&self) -> &[Amu];

    /// Whether both substances use the same AMUs, irrespective of order.
    fn same_amu_set(&self, amus: &[Amu]) -> bool {
        let mut mine = self.atomic_masses().to_vec();
        let mut other = amus.to_vec();
        mine.sort_unstable();
        other.sort_unstable();
        mine == other
    }
}
