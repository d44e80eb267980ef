//! Repeat the per-scan solve over a range of fragment-count configurations, reject
//! unreliable configurations, and merge the survivors into one answer per isomer.
use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Add, AddAssign, RangeInclusive};

use itertools::Itertools;
use mzpeaks::Tolerance;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::curve::{CurvePoint, ElutionCurve, IsomerCurves};
use crate::fragments::{CharacterizedIsomer, ReferenceFragmentSet};
use crate::scan::MixedSignal;
use crate::solver::{solve_scan, SolverConfig};
use crate::traits::{IsomerDeconvolutionError, IsomerKey};

/// Parameters controlling how a mixed signal is swept over configurations
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SweepParams {
    pub min_fragments: usize,
    pub max_fragments: usize,
    pub precursor_tolerance: Tolerance,
    pub fragment_tolerance: Tolerance,
    /// Scans whose percent error is at or above this are ignored
    pub max_percent_error: f64,
    pub solver: SolverConfig,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            min_fragments: 5,
            max_fragments: 5,
            precursor_tolerance: Tolerance::PPM(8.0),
            fragment_tolerance: Tolerance::PPM(20.0),
            max_percent_error: 0.5,
            solver: SolverConfig::default(),
        }
    }
}

impl SweepParams {
    pub fn fragment_range(mut self, min_fragments: usize, max_fragments: usize) -> Self {
        self.min_fragments = min_fragments;
        self.max_fragments = max_fragments;
        self
    }

    pub fn precursor_tolerance(mut self, precursor_tolerance: Tolerance) -> Self {
        self.precursor_tolerance = precursor_tolerance;
        self
    }

    pub fn fragment_tolerance(mut self, fragment_tolerance: Tolerance) -> Self {
        self.fragment_tolerance = fragment_tolerance;
        self
    }

    pub fn max_percent_error(mut self, max_percent_error: f64) -> Self {
        self.max_percent_error = max_percent_error;
        self
    }

    pub fn solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn fragment_counts(&self) -> RangeInclusive<usize> {
        self.min_fragments..=self.max_fragments
    }
}

/// Counts of how the scans of one configuration were handled
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanTally {
    pub total: usize,
    pub processed: usize,
    pub ignored: usize,
}

impl ScanTally {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Whether more than half of all scans have been ignored
    pub fn exceeds_ignore_quota(&self) -> bool {
        self.ignored * 2 > self.total
    }

    /// Whether more than half of all scans were usable
    pub fn is_retained(&self) -> bool {
        !self.exceeds_ignore_quota() && self.processed * 2 > self.total
    }
}

impl Add for ScanTally {
    type Output = ScanTally;

    fn add(self, rhs: Self) -> Self::Output {
        let mut dup = self;
        dup += rhs;
        dup
    }
}

impl AddAssign for ScanTally {
    fn add_assign(&mut self, rhs: Self) {
        self.total += rhs.total;
        self.processed += rhs.processed;
        self.ignored += rhs.ignored;
    }
}

/// The solver's outcome on one scan
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanDiagnostic {
    /// The scan time in milliseconds
    pub time: f64,
    pub trap_intensity: f64,
    pub underflow: f64,
    pub percent_error: f64,
    pub reliable: bool,
}

/// The curves of every isomer that reached a positive area under one configuration
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigurationResult {
    pub fragment_count: usize,
    pub curves: BTreeMap<IsomerKey, IsomerCurves>,
    /// The underflow summed over every evaluated scan
    pub cumulative_error: f64,
}

impl ConfigurationResult {
    pub fn new(
        fragment_count: usize,
        curves: BTreeMap<IsomerKey, IsomerCurves>,
        cumulative_error: f64,
    ) -> Self {
        Self {
            fragment_count,
            curves,
            cumulative_error,
        }
    }
}

/// Everything recorded while evaluating one configuration, whether or not it was retained
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationAttempt {
    pub fragment_count: usize,
    pub diagnostics: Vec<ScanDiagnostic>,
    pub tally: ScanTally,
    pub result: Result<ConfigurationResult, IsomerDeconvolutionError>,
}

impl ConfigurationAttempt {
    fn rejected(fragment_count: usize, tally: ScanTally, error: IsomerDeconvolutionError) -> Self {
        Self {
            fragment_count,
            diagnostics: Vec::new(),
            tally,
            result: Err(error),
        }
    }

    pub fn is_retained(&self) -> bool {
        self.result.is_ok()
    }

    pub fn rejection(&self) -> Option<&IsomerDeconvolutionError> {
        self.result.as_ref().err()
    }
}

/// Pick the fragment sets of `candidates` for `fragment_count`.
///
/// Every candidate must be valid for the configuration, otherwise none are used.
pub fn select_candidates<'a>(
    candidates: &[(IsomerKey, &'a CharacterizedIsomer)],
    fragment_count: usize,
) -> Result<Vec<(IsomerKey, &'a ReferenceFragmentSet)>, IsomerDeconvolutionError> {
    if candidates.is_empty() {
        return Err(IsomerDeconvolutionError::UnmatchedConfiguration { fragment_count });
    }
    candidates
        .iter()
        .map(|(key, isomer)| {
            isomer
                .fragments_for(fragment_count)
                .map(|set| (*key, set))
                .ok_or(IsomerDeconvolutionError::UnmatchedConfiguration { fragment_count })
        })
        .collect()
}

/// Solve every scan of `signal` against `candidates` using `fragment_count` fragments
/// and build each isomer's curves.
///
/// Scans are visited in retention time order and the sweep stops as soon as more than
/// half of all scans have been ignored. A signal without scans is rejected outright.
#[tracing::instrument(level = "debug", skip_all, fields(mz = signal.mz, fragment_count = fragment_count))]
pub fn process_configuration(
    signal: &MixedSignal,
    candidates: &[(IsomerKey, &CharacterizedIsomer)],
    fragment_count: usize,
    params: &SweepParams,
) -> ConfigurationAttempt {
    let mut tally = ScanTally::new(signal.len());
    if signal.is_empty() {
        let err = IsomerDeconvolutionError::EmptySignal { mz: signal.mz };
        debug!("{err}");
        return ConfigurationAttempt::rejected(fragment_count, tally, err);
    }
    let selected = match select_candidates(candidates, fragment_count) {
        Ok(selected) => selected,
        Err(err) => {
            debug!("{err}");
            return ConfigurationAttempt::rejected(fragment_count, tally, err);
        }
    };
    let sets: Vec<&ReferenceFragmentSet> = selected.iter().map(|(_, set)| *set).collect();

    let mut curves: BTreeMap<IsomerKey, IsomerCurves> = selected
        .iter()
        .map(|(key, _)| (*key, IsomerCurves::default()))
        .collect();
    let mut diagnostics = Vec::with_capacity(signal.len());
    let mut cumulative_error = 0.0;

    for scan in signal.scans() {
        let time = scan.time();
        let trap_intensity = signal.trap_intensity(scan);
        let solution = solve_scan(
            &sets,
            &scan.peaks,
            params.fragment_tolerance,
            trap_intensity,
            &params.solver,
        );
        cumulative_error += solution.underflow;
        let reliable = solution.is_reliable(params.max_percent_error);
        diagnostics.push(ScanDiagnostic {
            time,
            trap_intensity,
            underflow: solution.underflow,
            percent_error: solution.percent_error,
            reliable,
        });

        match solution.check_reliability(time, params.max_percent_error) {
            Ok(solution) => {
                tally.processed += 1;
                let mixed_intensity = signal.intensity_at(time);
                for ((key, _), result) in selected.iter().zip(solution.results.iter()) {
                    let rate = if scan.injection_time > 0.0 {
                        result.fit_magnitude / scan.injection_time
                    } else {
                        0.0
                    };
                    if let Some(isomer_curves) = curves.get_mut(key) {
                        isomer_curves.add_point(time, rate, result.ratio * mixed_intensity);
                    }
                }
            }
            Err(err) => {
                trace!("{err}");
                tally.ignored += 1;
                if tally.exceeds_ignore_quota() {
                    break;
                }
            }
        }
    }

    if !tally.is_retained() {
        let err = IsomerDeconvolutionError::NoisyPrecursor {
            fragment_count,
            ignored: tally.ignored,
            total: tally.total,
        };
        debug!("{err}");
        return ConfigurationAttempt {
            fragment_count,
            diagnostics,
            tally,
            result: Err(err),
        };
    }

    for isomer_curves in curves.values_mut() {
        isomer_curves.compute();
    }
    curves.retain(|_, isomer_curves| isomer_curves.area() > 0.0);

    let result = if curves.is_empty() {
        let err = IsomerDeconvolutionError::ZeroAreaConfiguration { fragment_count };
        debug!("{err}");
        Err(err)
    } else {
        debug!(
            "Retained {} isomers with cumulative error {cumulative_error:0.3}",
            curves.len()
        );
        Ok(ConfigurationResult::new(
            fragment_count,
            curves,
            cumulative_error,
        ))
    };

    ConfigurationAttempt {
        fragment_count,
        diagnostics,
        tally,
        result,
    }
}

/// Evaluate every configuration in `params`'s fragment range in parallel, returning
/// the attempts in increasing fragment count order.
pub fn sweep_configurations(
    signal: &MixedSignal,
    candidates: &[(IsomerKey, &CharacterizedIsomer)],
    params: &SweepParams,
) -> Vec<ConfigurationAttempt> {
    params
        .fragment_counts()
        .into_par_iter()
        .map(|fragment_count| process_configuration(signal, candidates, fragment_count, params))
        .collect()
}

/// Weight each configuration inversely to its cumulative error, normalized to sum to one.
///
/// Configurations without any error share all of the weight. When no configuration
/// has a usable error, all are weighted equally.
pub fn configuration_weights(results: &[&ConfigurationResult]) -> Vec<f64> {
    if results.is_empty() {
        return Vec::new();
    }
    let exact = results
        .iter()
        .filter(|r| r.cumulative_error.is_finite() && r.cumulative_error <= 0.0)
        .count();

    let raw: Vec<f64> = if exact > 0 {
        results
            .iter()
            .map(|r| {
                if r.cumulative_error.is_finite() && r.cumulative_error <= 0.0 {
                    1.0
                } else {
                    0.0
                }
            })
            .collect()
    } else {
        results
            .iter()
            .map(|r| {
                if r.cumulative_error.is_finite() {
                    r.cumulative_error.recip()
                } else {
                    0.0
                }
            })
            .collect()
    };

    let total: f64 = raw.iter().sum();
    if total > 0.0 && total.is_finite() {
        raw.into_iter().map(|w| w / total).collect()
    } else {
        vec![1.0 / results.len() as f64; results.len()]
    }
}

fn merge_curves(parts: &[(Option<&ElutionCurve>, f64)]) -> ElutionCurve {
    let times: Vec<f64> = parts
        .iter()
        .filter_map(|(curve, _)| *curve)
        .flat_map(|curve| curve.iter().map(|p| p.time))
        .sorted_by(|a, b| a.total_cmp(b))
        .dedup()
        .collect();

    let points = times
        .into_iter()
        .map(|time| {
            let value = parts
                .iter()
                .map(|(curve, weight)| curve.map(|c| c.interpolate(time)).unwrap_or_default() * weight)
                .sum();
            CurvePoint::new(time, value)
        })
        .collect();

    let area = parts
        .iter()
        .map(|(curve, weight)| curve.map(|c| c.area()).unwrap_or_default() * weight)
        .sum();

    ElutionCurve::with_area(points, area)
}

/// Combine the retained configurations into one curve pair per isomer.
///
/// An isomer missing from a configuration contributes zero for that configuration.
/// The result depends only on the order of `results`, which should be by fragment count.
pub fn merge_configurations(
    results: &[&ConfigurationResult],
) -> BTreeMap<IsomerKey, IsomerCurves> {
    let weights = configuration_weights(results);
    let keys: BTreeSet<IsomerKey> = results
        .iter()
        .flat_map(|r| r.curves.keys().copied())
        .collect();

    keys.into_iter()
        .map(|key| {
            let found: Vec<(Option<&IsomerCurves>, f64)> = results
                .iter()
                .zip(weights.iter())
                .map(|(r, w)| (r.curves.get(&key), *w))
                .collect();
            let rate: Vec<(Option<&ElutionCurve>, f64)> =
                found.iter().map(|(c, w)| (c.map(|c| &c.rate), *w)).collect();
            let count: Vec<(Option<&ElutionCurve>, f64)> =
                found.iter().map(|(c, w)| (c.map(|c| &c.count), *w)).collect();
            (
                key,
                IsomerCurves::new(merge_curves(&rate), merge_curves(&count)),
            )
        })
        .collect()
}

/// The merged per-isomer curves of one mixed precursor, along with every
/// configuration attempt that went into them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FinalRatios {
    pub mz: f64,
    pub curves: BTreeMap<IsomerKey, IsomerCurves>,
    pub attempts: Vec<ConfigurationAttempt>,
}

impl FinalRatios {
    pub fn new(mz: f64) -> Self {
        Self {
            mz,
            ..Default::default()
        }
    }

    /// Merge the retained configurations among `attempts`
    pub fn from_attempts(mz: f64, mut attempts: Vec<ConfigurationAttempt>) -> Self {
        attempts.sort_by_key(|a| a.fragment_count);
        let retained: Vec<&ConfigurationResult> =
            attempts.iter().filter_map(|a| a.result.as_ref().ok()).collect();
        let curves = merge_configurations(&retained);
        Self {
            mz,
            curves,
            attempts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn get(&self, key: &IsomerKey) -> Option<&IsomerCurves> {
        self.curves.get(key)
    }

    /// The curves of `key`, or empty curves if it did not survive any configuration
    pub fn curves_for(&self, key: &IsomerKey) -> IsomerCurves {
        self.curves.get(key).cloned().unwrap_or_default()
    }

    /// The rate area of `key`, zero if it did not survive any configuration
    pub fn area_for(&self, key: &IsomerKey) -> f64 {
        self.curves.get(key).map(|c| c.area()).unwrap_or_default()
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, IsomerKey, IsomerCurves> {
        self.curves.iter()
    }

    pub fn retained_configurations(&self) -> usize {
        self.attempts.iter().filter(|a| a.is_retained()).count()
    }

    /// The scan tallies summed over every attempt
    pub fn total_tally(&self) -> ScanTally {
        self.attempts
            .iter()
            .fold(ScanTally::default(), |acc, a| acc + a.tally)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::peaks::peak_set_from_pairs;
    use crate::scan::Scan;

    fn isomer_a() -> CharacterizedIsomer {
        CharacterizedIsomer::new("A", 500.0, 2).with_fragment_set(
            3,
            ReferenceFragmentSet::from_pairs(vec![(200.0, 0.5), (300.0, 0.3), (400.0, 0.2)]),
        )
    }

    fn isomer_b() -> CharacterizedIsomer {
        CharacterizedIsomer::new("B", 500.0, 2)
            .with_fragment_set(
                3,
                ReferenceFragmentSet::from_pairs(vec![(250.0, 0.6), (300.0, 0.2), (450.0, 0.2)]),
            )
            .with_fragment_set(
                4,
                ReferenceFragmentSet::from_pairs(vec![
                    (250.0, 0.5),
                    (300.0, 0.2),
                    (450.0, 0.2),
                    (600.0, 0.1),
                ]),
            )
    }

    fn scan_of_a(rt: f64, amount: f64) -> Scan {
        Scan::new(
            rt,
            50.0,
            amount * 10.0,
            amount / 5.0,
            peak_set_from_pairs(vec![
                (200.0, 0.5 * amount),
                (300.0, 0.3 * amount),
                (400.0, 0.2 * amount),
            ]),
        )
    }

    fn noise_scan(rt: f64) -> Scan {
        Scan::new(rt, 50.0, 1000.0, 20.0, peak_set_from_pairs(vec![(700.0, 100.0)]))
    }

    fn signal_with_noise(n_noisy: usize, noise_first: bool) -> MixedSignal {
        let mut scans = Vec::new();
        for i in 0..10 {
            let rt = 10.0 + i as f64 * 0.05;
            let noisy = if noise_first { i < n_noisy } else { i >= 10 - n_noisy };
            if noisy {
                scans.push(noise_scan(rt));
            } else {
                scans.push(scan_of_a(rt, 100.0 + 20.0 * i as f64));
            }
        }
        MixedSignal::new(500.0, scans)
    }

    #[test]
    fn test_tally() {
        let tally = ScanTally {
            total: 10,
            processed: 4,
            ignored: 6,
        };
        assert!(tally.exceeds_ignore_quota());
        assert!(!tally.is_retained());

        let tally = ScanTally {
            total: 10,
            processed: 5,
            ignored: 5,
        };
        assert!(!tally.exceeds_ignore_quota());
        assert!(!tally.is_retained());

        let tally = ScanTally {
            total: 10,
            processed: 6,
            ignored: 4,
        };
        assert!(tally.is_retained());
        assert_eq!(
            tally + tally,
            ScanTally {
                total: 20,
                processed: 12,
                ignored: 8
            }
        );
    }

    #[test]
    fn test_all_or_nothing_validity() {
        let a = isomer_a();
        let b = isomer_b();
        let candidates = vec![(IsomerKey(0), &a), (IsomerKey(1), &b)];
        assert_eq!(select_candidates(&candidates, 3).unwrap().len(), 2);
        assert_eq!(
            select_candidates(&candidates, 4).unwrap_err(),
            IsomerDeconvolutionError::UnmatchedConfiguration { fragment_count: 4 }
        );
        assert!(select_candidates(&[], 3).is_err());

        let signal = signal_with_noise(0, true);
        let attempt = process_configuration(&signal, &candidates, 4, &SweepParams::default());
        assert!(attempt.diagnostics.is_empty());
        assert!(matches!(
            attempt.rejection(),
            Some(IsomerDeconvolutionError::UnmatchedConfiguration { .. })
        ));
    }

    #[test]
    fn test_abort_when_most_scans_are_noisy() {
        let a = isomer_a();
        let candidates = vec![(IsomerKey(0), &a)];
        let params = SweepParams::default().fragment_range(3, 3);

        let attempt = process_configuration(&signal_with_noise(6, true), &candidates, 3, &params);
        assert_eq!(attempt.tally.ignored, 6);
        assert_eq!(attempt.diagnostics.len(), 6);
        assert!(matches!(
            attempt.rejection(),
            Some(IsomerDeconvolutionError::NoisyPrecursor { ignored: 6, total: 10, .. })
        ));

        let attempt = process_configuration(&signal_with_noise(5, true), &candidates, 3, &params);
        assert_eq!(attempt.diagnostics.len(), 10);
        assert_eq!(attempt.tally.processed, 5);
        assert!(!attempt.is_retained());

        let attempt = process_configuration(&signal_with_noise(4, false), &candidates, 3, &params);
        assert_eq!(attempt.diagnostics.len(), 10);
        assert!(attempt.is_retained(), "{:?}", attempt.rejection());
        let result = attempt.result.unwrap();
        assert!(result.curves[&IsomerKey(0)].area() > 0.0);
        assert_eq!(result.curves[&IsomerKey(0)].rate.len(), 6);
    }

    #[test]
    fn test_empty_signal_is_rejected() {
        let a = isomer_a();
        let candidates = vec![(IsomerKey(0), &a)];
        let params = SweepParams::default().fragment_range(3, 3);
        let signal = MixedSignal::new(500.0, Vec::new());
        let attempt = process_configuration(&signal, &candidates, 3, &params);
        assert!(attempt.diagnostics.is_empty());
        assert_eq!(attempt.tally.total, 0);
        assert_eq!(
            attempt.rejection(),
            Some(&IsomerDeconvolutionError::EmptySignal { mz: 500.0 })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_params_serde() {
        let params = SweepParams::default()
            .fragment_range(3, 6)
            .fragment_tolerance(Tolerance::Da(0.02));
        let text = serde_json::to_string(&params).unwrap();
        let restored: SweepParams = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, params);
    }

    #[test]
    fn test_absent_isomer_is_dropped() {
        let a = isomer_a();
        let b = isomer_b();
        let candidates = vec![(IsomerKey(0), &a), (IsomerKey(1), &b)];
        let params = SweepParams::default().fragment_range(3, 3);
        let attempt = process_configuration(&signal_with_noise(0, true), &candidates, 3, &params);
        let result = attempt.result.unwrap();
        assert!(result.curves.contains_key(&IsomerKey(0)));
        assert!(!result.curves.contains_key(&IsomerKey(1)));
        for diag in attempt.diagnostics.iter() {
            assert!(diag.percent_error < 1e-3);
        }
    }

    fn flat_result(fragment_count: usize, area: f64, error: f64) -> ConfigurationResult {
        let curve = ElutionCurve::with_area(
            vec![CurvePoint::new(0.0, area / 10.0), CurvePoint::new(10.0, area / 10.0)],
            area,
        );
        let mut curves = BTreeMap::new();
        curves.insert(IsomerKey(0), IsomerCurves::new(curve.clone(), curve));
        ConfigurationResult::new(fragment_count, curves, error)
    }

    #[test]
    fn test_merge_weighting() {
        let low = flat_result(5, 100.0, 0.1);
        let high = flat_result(6, 300.0, 0.3);
        let weights = configuration_weights(&[&low, &high]);
        assert!((weights[0] - 0.75).abs() < 1e-12);
        assert!((weights[1] - 0.25).abs() < 1e-12);

        let merged = merge_configurations(&[&low, &high]);
        let curves = &merged[&IsomerKey(0)];
        assert!((curves.area() - 150.0).abs() < 1e-9);
        assert!(curves.area() < 200.0);
        assert!(curves.area() <= 300.0);
        assert!((curves.rate.interpolate(5.0) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_merge_absent_isomer_counts_as_zero() {
        let first = flat_result(5, 100.0, 1.0);
        let mut second = flat_result(6, 100.0, 1.0);
        let moved = second.curves.remove(&IsomerKey(0)).unwrap();
        second.curves.insert(IsomerKey(1), moved);

        let merged = merge_configurations(&[&first, &second]);
        assert_eq!(merged.len(), 2);
        assert!((merged[&IsomerKey(0)].area() - 50.0).abs() < 1e-9);
        assert!((merged[&IsomerKey(1)].area() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_error_takes_all_weight() {
        let exact = flat_result(5, 100.0, 0.0);
        let noisy = flat_result(6, 300.0, 0.3);
        assert_eq!(configuration_weights(&[&exact, &noisy]), vec![1.0, 0.0]);
        assert!(configuration_weights(&[]).is_empty());
    }

    #[test]
    fn test_final_ratios_from_attempts() {
        let a = isomer_a();
        let candidates = vec![(IsomerKey(0), &a)];
        let signal = signal_with_noise(0, true);
        let params = SweepParams::default().fragment_range(2, 3);
        let attempts = sweep_configurations(&signal, &candidates, &params);
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].fragment_count, 2);

        let ratios = FinalRatios::from_attempts(signal.mz, attempts);
        assert_eq!(ratios.retained_configurations(), 1);
        assert!(ratios.area_for(&IsomerKey(0)) > 0.0);
        assert_eq!(ratios.area_for(&IsomerKey(5)), 0.0);
        assert!(ratios.curves_for(&IsomerKey(5)).is_empty());
        assert_eq!(ratios.total_tally().processed, 10);
    }

    #[test]
    fn test_empty_attempts() {
        let ratios = FinalRatios::from_attempts(500.0, Vec::new());
        assert!(ratios.is_empty());
        assert_eq!(ratios.retained_configurations(), 0);
    }
}
