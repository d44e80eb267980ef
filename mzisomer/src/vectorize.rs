//! Project a scan and a set of candidate isomers onto a shared fragment axis
use mzpeaks::{MZPeakSetType, Tolerance};

use crate::fragments::ReferenceFragmentSet;
use crate::peaks::{matched_intensity, Peak};

/// The mixed observation and the per-isomer unit responses over the union of the
/// candidates' fragment m/z values.
///
/// `units[i][j]` is the intensity isomer `i` would contribute at `fragment_mzs[j]`,
/// scaled by its normalization factor, and `mixed[j]` is the matched intensity in
/// the scan at `fragment_mzs[j]`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IntensityVectors {
    pub fragment_mzs: Vec<f64>,
    pub mixed: Vec<f64>,
    pub units: Vec<Vec<f64>>,
}

impl IntensityVectors {
    /// Build the vectors for `candidates` against `peaks`.
    ///
    /// Reference fragments from different isomers that fall within `error_tolerance` of
    /// an already registered fragment share its slot, so the axis holds one entry per
    /// distinct fragment. Slots are allocated in candidate order.
    pub fn build(
        candidates: &[&ReferenceFragmentSet],
        peaks: &MZPeakSetType<Peak>,
        error_tolerance: Tolerance,
        trap_intensity: f64,
    ) -> Self {
        let mut fragment_mzs: Vec<f64> = Vec::new();
        let mut units: Vec<Vec<f64>> = Vec::with_capacity(candidates.len());

        for set in candidates.iter() {
            let factor = set.scale_factor(trap_intensity);
            let mut unit = vec![0.0; fragment_mzs.len()];
            for frag in set.iter() {
                let slot = match fragment_mzs
                    .iter()
                    .position(|mz| error_tolerance.test(frag.mz, *mz))
                {
                    Some(slot) => slot,
                    None => {
                        fragment_mzs.push(frag.mz);
                        unit.push(0.0);
                        fragment_mzs.len() - 1
                    }
                };
                unit[slot] += frag.intensity * factor;
            }
            units.push(unit);
        }

        let width = fragment_mzs.len();
        for unit in units.iter_mut() {
            unit.resize(width, 0.0);
        }

        let mixed = fragment_mzs
            .iter()
            .map(|mz| matched_intensity(peaks, *mz, error_tolerance))
            .collect();

        Self {
            fragment_mzs,
            mixed,
            units,
        }
    }

    pub fn len(&self) -> usize {
        self.fragment_mzs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragment_mzs.is_empty()
    }

    pub fn num_isomers(&self) -> usize {
        self.units.len()
    }

    /// The total observed intensity over the fragment axis
    pub fn total_mixed(&self) -> f64 {
        self.mixed.iter().sum()
    }
}
