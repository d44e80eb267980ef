//! Reference fragmentation fingerprints of characterized isomers
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::ops::RangeInclusive;
use std::sync::Arc;

use mzpeaks::Tolerance;
use tracing::debug;

use crate::curve::ElutionCurve;
use crate::scan::minutes_to_milliseconds;

/// The total intensity every [`ReferenceFragmentSet`] is normalized to
pub const REFERENCE_SCALE: f64 = 1.0;

/// A mapping from trapped precursor intensity to a fragment yield scaling factor
pub type NormalizationFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A fragment m/z and its intensity
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FragmentIntensity {
    pub mz: f64,
    pub intensity: f64,
}

impl FragmentIntensity {
    pub fn new(mz: f64, intensity: f64) -> Self {
        Self { mz, intensity }
    }
}

impl From<(f64, f64)> for FragmentIntensity {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// The top-N fragments of an isomer for one fragment-count configuration, with
/// intensities normalized to sum to [`REFERENCE_SCALE`].
///
/// An optional normalization function corrects the relative fragment yield for the
/// amount of precursor that was trapped when a scan was acquired.
#[derive(Clone, Default)]
pub struct ReferenceFragmentSet {
    fragments: Vec<FragmentIntensity>,
    normalization: Option<NormalizationFn>,
}

impl Debug for ReferenceFragmentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceFragmentSet")
            .field("fragments", &self.fragments)
            .field("normalization", &self.normalization.is_some())
            .finish()
    }
}

impl ReferenceFragmentSet {
    /// Create a fragment set, dropping fragments without a positive finite intensity
    /// and normalizing the remainder.
    pub fn new<I: IntoIterator<Item = FragmentIntensity>>(fragments: I) -> Self {
        let mut fragments: Vec<FragmentIntensity> = fragments
            .into_iter()
            .filter(|f| f.mz.is_finite() && f.intensity.is_finite() && f.intensity > 0.0)
            .collect();
        fragments.sort_by(|a, b| a.mz.total_cmp(&b.mz));
        let total: f64 = fragments.iter().map(|f| f.intensity).sum();
        if total > 0.0 {
            for f in fragments.iter_mut() {
                f.intensity = f.intensity / total * REFERENCE_SCALE;
            }
        }
        Self {
            fragments,
            normalization: None,
        }
    }

    pub fn from_pairs<I: IntoIterator<Item = (f64, f64)>>(fragments: I) -> Self {
        Self::new(fragments.into_iter().map(FragmentIntensity::from))
    }

    /// Select the `n` most intense fragments. Returns `None` when fewer than `n`
    /// fragments have a positive intensity, which makes the isomer unusable for
    /// that configuration.
    pub fn top_n(fragments: &[FragmentIntensity], n: usize) -> Option<Self> {
        if n == 0 {
            return None;
        }
        let mut usable: Vec<FragmentIntensity> = fragments
            .iter()
            .filter(|f| f.mz.is_finite() && f.intensity.is_finite() && f.intensity > 0.0)
            .copied()
            .collect();
        if usable.len() < n {
            return None;
        }
        usable.sort_by(|a, b| match b.intensity.total_cmp(&a.intensity) {
            Ordering::Equal => a.mz.total_cmp(&b.mz),
            ord => ord,
        });
        usable.truncate(n);
        Some(Self::new(usable))
    }

    pub fn with_normalization<F: Fn(f64) -> f64 + Send + Sync + 'static>(
        mut self,
        normalization: F,
    ) -> Self {
        self.normalization = Some(Arc::new(normalization));
        self
    }

    /// Use a sampled curve of trapped precursor intensity to scale factor as the
    /// normalization function, interpolating between samples.
    pub fn with_normalization_curve(self, curve: ElutionCurve) -> Self {
        self.with_normalization(move |intensity| curve.interpolate(intensity))
    }

    pub fn has_normalization(&self) -> bool {
        self.normalization.is_some()
    }

    /// The factor to scale reference intensities by for a scan with `trap_intensity`.
    /// Without a normalization function, or when it yields an unusable value, this is `1.0`.
    pub fn scale_factor(&self, trap_intensity: f64) -> f64 {
        match self.normalization.as_ref() {
            Some(normalization) => {
                let factor = normalization(trap_intensity);
                if factor.is_finite() && factor >= 0.0 {
                    factor
                } else {
                    1.0
                }
            }
            None => 1.0,
        }
    }

    pub fn fragments(&self) -> &[FragmentIntensity] {
        &self.fragments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FragmentIntensity> {
        self.fragments.iter()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// A single reference-sample scan of a pure isomer, used to derive its fingerprint
#[derive(Debug, Default, Clone)]
pub struct ReferenceObservation {
    /// The retention time in minutes
    pub retention_time: f64,
    pub precursor_intensity: f64,
    pub fragments: Vec<FragmentIntensity>,
}

impl ReferenceObservation {
    pub fn new(
        retention_time: f64,
        precursor_intensity: f64,
        fragments: Vec<FragmentIntensity>,
    ) -> Self {
        Self {
            retention_time,
            precursor_intensity,
            fragments,
        }
    }

    fn intensity_of(&self, mz: f64, error_tolerance: Tolerance) -> f64 {
        self.fragments
            .iter()
            .filter(|f| error_tolerance.test(f.mz, mz))
            .map(|f| f.intensity)
            .sum()
    }
}

/// An isomer whose fragmentation fingerprint is known from a reference sample.
///
/// The isomer is valid for a fragment count `k` exactly when it has a
/// [`ReferenceFragmentSet`] for `k`.
#[derive(Debug, Clone, Default)]
pub struct CharacterizedIsomer {
    pub label: String,
    pub mz: f64,
    pub charge: i32,
    fragment_sets: BTreeMap<usize, ReferenceFragmentSet>,
    /// Time versus precursor intensity in the reference sample
    pub reference_curve: ElutionCurve,
}

impl CharacterizedIsomer {
    pub fn new<S: Into<String>>(label: S, mz: f64, charge: i32) -> Self {
        Self {
            label: label.into(),
            mz,
            charge,
            fragment_sets: BTreeMap::new(),
            reference_curve: ElutionCurve::new(),
        }
    }

    pub fn with_fragment_set(mut self, fragment_count: usize, set: ReferenceFragmentSet) -> Self {
        self.insert_fragment_set(fragment_count, set);
        self
    }

    pub fn insert_fragment_set(&mut self, fragment_count: usize, set: ReferenceFragmentSet) {
        self.fragment_sets.insert(fragment_count, set);
    }

    pub fn with_reference_curve(mut self, curve: ElutionCurve) -> Self {
        self.reference_curve = curve;
        self
    }

    pub fn is_valid(&self, fragment_count: usize) -> bool {
        self.fragment_sets.contains_key(&fragment_count)
    }

    pub fn fragments_for(&self, fragment_count: usize) -> Option<&ReferenceFragmentSet> {
        self.fragment_sets.get(&fragment_count)
    }

    /// The fragment counts this isomer is valid for, in increasing order
    pub fn fragment_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.fragment_sets.keys().copied()
    }

    /// Derive an isomer's fingerprints from reference-sample observations.
    ///
    /// Fragments within `error_tolerance` of one another are treated as the same fragment,
    /// their intensities summed across all observations at an intensity weighted m/z.
    /// The most intense `k` fragments form the fragment set for each `k` in
    /// `fragment_counts`. When the observations span at least two distinct precursor
    /// intensities, each set is given a normalization curve of relative fragment yield
    /// against precursor intensity.
    pub fn from_observations<S: Into<String>>(
        label: S,
        mz: f64,
        charge: i32,
        observations: &[ReferenceObservation],
        fragment_counts: RangeInclusive<usize>,
        error_tolerance: Tolerance,
    ) -> Self {
        let mut this = Self::new(label, mz, charge);
        let profile = merge_fragments(observations, error_tolerance);

        for k in fragment_counts {
            match ReferenceFragmentSet::top_n(&profile, k) {
                Some(set) => {
                    let set = match yield_curve(observations, &set, error_tolerance) {
                        Some(curve) => set.with_normalization_curve(curve),
                        None => set,
                    };
                    this.insert_fragment_set(k, set);
                }
                None => {
                    debug!(
                        "{} has only {} fragments, too few for {k}",
                        this.label,
                        profile.len()
                    );
                }
            }
        }

        this.reference_curve = ElutionCurve::from_points(observations.iter().map(|o| {
            (
                minutes_to_milliseconds(o.retention_time),
                o.precursor_intensity,
            )
        }));
        this
    }
}

/// Pool the fragments of all `observations`, folding each into the first pooled fragment
/// within `error_tolerance` of it. The result is sorted by m/z.
fn merge_fragments(
    observations: &[ReferenceObservation],
    error_tolerance: Tolerance,
) -> Vec<FragmentIntensity> {
    let mut profile: Vec<FragmentIntensity> = Vec::new();
    for frag in observations.iter().flat_map(|o| o.fragments.iter()) {
        if !(frag.mz.is_finite() && frag.intensity.is_finite()) {
            continue;
        }
        match profile
            .iter_mut()
            .find(|pooled| error_tolerance.test(frag.mz, pooled.mz))
        {
            Some(pooled) => {
                let total = pooled.intensity + frag.intensity;
                if total > 0.0 && pooled.mz != frag.mz {
                    pooled.mz = (pooled.mz * pooled.intensity + frag.mz * frag.intensity) / total;
                }
                pooled.intensity = total;
            }
            None => profile.push(*frag),
        }
    }
    profile.sort_by(|a, b| a.mz.total_cmp(&b.mz));
    profile
}

/// Build a curve of precursor intensity against the fragment yield of `set`'s fragments
/// per unit of precursor, relative to the mean yield.
fn yield_curve(
    observations: &[ReferenceObservation],
    set: &ReferenceFragmentSet,
    error_tolerance: Tolerance,
) -> Option<ElutionCurve> {
    let samples: Vec<(f64, f64)> = observations
        .iter()
        .filter(|o| o.precursor_intensity.is_finite() && o.precursor_intensity > 0.0)
        .map(|o| {
            let fragment_yield: f64 = set
                .iter()
                .map(|f| o.intensity_of(f.mz, error_tolerance))
                .sum();
            (o.precursor_intensity, fragment_yield / o.precursor_intensity)
        })
        .collect();

    let mut intensities: Vec<f64> = samples.iter().map(|(p, _)| *p).collect();
    intensities.sort_by(|a, b| a.total_cmp(b));
    intensities.dedup();
    if intensities.len() < 2 {
        return None;
    }

    let mean = samples.iter().map(|(_, y)| *y).sum::<f64>() / samples.len() as f64;
    if !mean.is_finite() || mean <= 0.0 {
        return None;
    }
    Some(ElutionCurve::from_points(
        samples.into_iter().map(|(p, y)| (p, y / mean)),
    ))
}
