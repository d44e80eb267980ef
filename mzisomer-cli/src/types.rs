use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use mzpeaks::Tolerance;
use serde::{Deserialize, Serialize};

use mzisomer::peaks::peak_set_from_pairs;
use mzisomer::{
    CharacterizedIsomer, ElutionCurve, FragmentIntensity, MixedSignal, MixedSignalSource,
    ReferenceFragmentSet, ReferenceObservation, Scan,
};

use crate::driver::MZIsomerError;

/// An `(m/z, intensity)` pair
pub type PeakPair = (f64, f64);

/// An explicitly given fragment set for one fragment count
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FragmentSetRecord {
    pub fragments: Vec<PeakPair>,
    /// Samples of trapped precursor intensity against fragment yield scale factor
    #[serde(default)]
    pub normalization: Vec<PeakPair>,
}

impl FragmentSetRecord {
    pub fn to_fragment_set(&self) -> ReferenceFragmentSet {
        let set = ReferenceFragmentSet::from_pairs(self.fragments.iter().copied());
        if self.normalization.is_empty() {
            set
        } else {
            set.with_normalization_curve(ElutionCurve::from_points(
                self.normalization.iter().copied(),
            ))
        }
    }
}

/// One reference-sample scan of a pure isomer
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub retention_time: f64,
    pub precursor_intensity: f64,
    pub fragments: Vec<PeakPair>,
}

impl From<&ObservationRecord> for ReferenceObservation {
    fn from(value: &ObservationRecord) -> Self {
        ReferenceObservation::new(
            value.retention_time,
            value.precursor_intensity,
            value
                .fragments
                .iter()
                .copied()
                .map(FragmentIntensity::from)
                .collect(),
        )
    }
}

/// A characterized isomer, described either by its reference observations, by
/// explicit fragment sets keyed by fragment count, or both.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct IsomerRecord {
    pub label: String,
    pub mz: f64,
    #[serde(default)]
    pub charge: i32,
    #[serde(default)]
    pub fragment_sets: BTreeMap<usize, FragmentSetRecord>,
    #[serde(default)]
    pub observations: Vec<ObservationRecord>,
}

impl IsomerRecord {
    /// Build the isomer, with explicit fragment sets taking precedence over those
    /// derived from observations.
    pub fn to_isomer(
        &self,
        fragment_counts: RangeInclusive<usize>,
        fragment_tolerance: Tolerance,
    ) -> CharacterizedIsomer {
        let mut isomer = if self.observations.is_empty() {
            CharacterizedIsomer::new(self.label.clone(), self.mz, self.charge)
        } else {
            let observations: Vec<ReferenceObservation> =
                self.observations.iter().map(ReferenceObservation::from).collect();
            CharacterizedIsomer::from_observations(
                self.label.clone(),
                self.mz,
                self.charge,
                &observations,
                fragment_counts,
                fragment_tolerance,
            )
        };
        for (fragment_count, set) in self.fragment_sets.iter() {
            isomer.insert_fragment_set(*fragment_count, set.to_fragment_set());
        }
        isomer
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    /// In minutes
    pub retention_time: f64,
    /// In milliseconds
    pub injection_time: f64,
    pub precursor_intensity: f64,
    /// Derived from the precursor intensity and injection time when absent
    #[serde(default)]
    pub precursor_intensity_per_ms: Option<f64>,
    pub peaks: Vec<PeakPair>,
}

impl From<&ScanRecord> for Scan {
    fn from(value: &ScanRecord) -> Self {
        let per_ms = value.precursor_intensity_per_ms.unwrap_or_else(|| {
            if value.injection_time > 0.0 {
                value.precursor_intensity / value.injection_time
            } else {
                0.0
            }
        });
        Scan::new(
            value.retention_time,
            value.injection_time,
            value.precursor_intensity,
            per_ms,
            peak_set_from_pairs(value.peaks.iter().copied()),
        )
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SignalRecord {
    pub mz: f64,
    pub scans: Vec<ScanRecord>,
}

impl From<&SignalRecord> for MixedSignal {
    fn from(value: &SignalRecord) -> Self {
        MixedSignal::new(value.mz, value.scans.iter().map(Scan::from).collect())
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    pub name: String,
    pub signals: Vec<SignalRecord>,
}

/// The complete input problem
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct InputDocument {
    pub isomers: Vec<IsomerRecord>,
    #[serde(default)]
    pub samples: Vec<SampleRecord>,
}

impl InputDocument {
    pub fn build_catalog(
        &self,
        fragment_counts: RangeInclusive<usize>,
        fragment_tolerance: Tolerance,
    ) -> Vec<CharacterizedIsomer> {
        self.isomers
            .iter()
            .map(|rec| rec.to_isomer(fragment_counts.clone(), fragment_tolerance))
            .collect()
    }
}

impl MixedSignalSource for InputDocument {
    type Error = MZIsomerError;

    fn sample_names(&self) -> Vec<String> {
        self.samples.iter().map(|s| s.name.clone()).collect()
    }

    fn load_mixed_signals(&self, sample: &str) -> Result<Vec<MixedSignal>, Self::Error> {
        self.samples
            .iter()
            .find(|s| s.name == sample)
            .map(|s| s.signals.iter().map(MixedSignal::from).collect())
            .ok_or_else(|| MZIsomerError::SampleNotFound(sample.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const DOCUMENT: &str = r#"{
        "isomers": [
            {
                "label": "A",
                "mz": 500.0,
                "charge": 2,
                "fragment_sets": {
                    "3": {"fragments": [[200.0, 5.0], [300.0, 3.0], [400.0, 2.0]]}
                }
            },
            {
                "label": "B",
                "mz": 500.0,
                "observations": [
                    {"retention_time": 10.0, "precursor_intensity": 100.0, "fragments": [[250.0, 6.0], [300.0, 2.0], [450.0, 2.0]]}
                ]
            }
        ],
        "samples": [
            {
                "name": "mix",
                "signals": [
                    {"mz": 500.0, "scans": [
                        {"retention_time": 30.0, "injection_time": 50.0, "precursor_intensity": 4000.0, "peaks": [[200.0, 50.0]]}
                    ]}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_build_catalog() {
        let doc: InputDocument = serde_json::from_str(DOCUMENT).unwrap();
        let catalog = doc.build_catalog(3..=4, Tolerance::PPM(20.0));
        assert_eq!(catalog.len(), 2);
        assert!(catalog[0].is_valid(3));
        assert!(!catalog[0].is_valid(4));
        assert!(catalog[1].is_valid(3));
        assert_eq!(catalog[1].reference_curve.len(), 1);
        let set = catalog[0].fragments_for(3).unwrap();
        assert!((set.fragments()[0].intensity - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_load_signals() {
        let doc: InputDocument = serde_json::from_str(DOCUMENT).unwrap();
        assert_eq!(doc.sample_names(), vec!["mix".to_string()]);
        let signals = doc.load_mixed_signals("mix").unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].scans()[0].precursor_intensity_per_ms, 80.0);
        assert!(matches!(
            doc.load_mixed_signals("missing"),
            Err(MZIsomerError::SampleNotFound(_))
        ));
    }
}
