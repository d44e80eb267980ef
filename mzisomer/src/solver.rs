//! Non-negative decomposition of a mixed fragment vector into isomer unit vectors.
//!
//! The solver treats each fragment slot of the mixed vector as a capacity and each
//! isomer's unit vector as a path through those capacities, then greedily routes
//! intensity through the isomer that explains the most signal per step. Coefficients
//! never go negative and the explained signal never exceeds the observed signal, so
//! whatever capacity is left over is the underflow.
//!
//! A greedy route can strand signal when an isomer sharing fragments with several
//! others is routed first. When signal is left over, the same capacity problem is
//! solved exactly as a linear program and the result replaces the greedy one if it
//! explains more.
use mzpeaks::{MZPeakSetType, Tolerance};
use nalgebra::DMatrix;
use tracing::trace;

use crate::fragments::ReferenceFragmentSet;
use crate::peaks::Peak;
use crate::traits::IsomerDeconvolutionError;
use crate::vectorize::IntensityVectors;

/// The ratio of the trapped precursor intensity to the initial solver step
pub const STEP_DIVISOR: f64 = 1000.0;

/// Controls when [`solve_max_flow`] stops
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// The maximum number of moves to make
    pub max_iterations: usize,
    /// The solver stops once its step shrinks below this fraction of the initial step
    pub convergence: f64,
}

impl SolverConfig {
    pub fn new(max_iterations: usize, convergence: f64) -> Self {
        Self {
            max_iterations,
            convergence,
        }
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn convergence(mut self, convergence: f64) -> Self {
        self.convergence = convergence;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20_000,
            convergence: 1e-6,
        }
    }
}

/// The raw output of [`solve_max_flow`]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MixtureSolution {
    pub coefficients: Vec<f64>,
    /// The observed intensity no non-negative combination of unit vectors explained
    pub underflow: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Compute the solver step for a scan, one thousandth of the trapped precursor
/// intensity but never less than one.
#[inline]
pub fn step_size(trap_intensity: f64) -> f64 {
    let step = trap_intensity / STEP_DIVISOR;
    if step.is_finite() && step >= 1.0 {
        step
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy)]
enum Move {
    Push {
        target: usize,
        amount: f64,
    },
    Exchange {
        source: usize,
        released: f64,
        target: usize,
        amount: f64,
    },
}

struct FlowState<'a> {
    units: &'a [Vec<f64>],
    capacity: &'a [f64],
    masses: Vec<f64>,
    coefficients: Vec<f64>,
    residual: Vec<f64>,
}

impl<'a> FlowState<'a> {
    fn new(units: &'a [Vec<f64>], capacity: &'a [f64]) -> Self {
        let masses = units
            .iter()
            .map(|u| u.iter().copied().filter(|v| *v > 0.0).sum())
            .collect();
        let coefficients = vec![0.0; units.len()];
        let mut this = Self {
            units,
            capacity,
            masses,
            coefficients,
            residual: Vec::new(),
        };
        this.update_residual();
        this
    }

    fn update_residual(&mut self) {
        self.residual = self
            .capacity
            .iter()
            .enumerate()
            .map(|(j, cap)| {
                let explained: f64 = self
                    .units
                    .iter()
                    .zip(self.coefficients.iter())
                    .map(|(u, x)| u.get(j).copied().unwrap_or_default().max(0.0) * x)
                    .sum();
                cap.max(0.0) - explained
            })
            .collect();
    }

    /// How much more of `unit` fits in the residual, optionally after releasing
    /// `released` of the unit vector of `source`.
    fn headroom(&self, target: usize, release: Option<(usize, f64)>) -> f64 {
        let unit = &self.units[target];
        let mut room = f64::INFINITY;
        for (j, u) in unit.iter().enumerate() {
            if *u <= 0.0 {
                continue;
            }
            let mut r = self.residual.get(j).copied().unwrap_or_default();
            if let Some((source, released)) = release {
                r += released * self.units[source].get(j).copied().unwrap_or_default().max(0.0);
            }
            room = room.min(r.max(0.0) / u);
        }
        room
    }

    fn best_move(&self, step: f64) -> Option<(Move, f64)> {
        let n = self.units.len();
        let mut best: Option<(Move, f64)> = None;
        let consider = |mv: Move, gain: f64, best: &mut Option<(Move, f64)>| {
            if gain > best.map(|(_, g)| g).unwrap_or(0.0) {
                *best = Some((mv, gain));
            }
        };

        for target in 0..n {
            if self.masses[target] <= 0.0 {
                continue;
            }
            let amount = step.min(self.headroom(target, None));
            if amount > 0.0 {
                consider(
                    Move::Push { target, amount },
                    amount * self.masses[target],
                    &mut best,
                );
            }
        }

        for source in 0..n {
            let released = step.min(self.coefficients[source]);
            if released <= 0.0 {
                continue;
            }
            for target in 0..n {
                if target == source || self.masses[target] <= 0.0 {
                    continue;
                }
                let amount = self.headroom(target, Some((source, released)));
                if !amount.is_finite() || amount <= 0.0 {
                    continue;
                }
                let gain = amount * self.masses[target] - released * self.masses[source];
                consider(
                    Move::Exchange {
                        source,
                        released,
                        target,
                        amount,
                    },
                    gain,
                    &mut best,
                );
            }
        }
        best
    }

    fn apply(&mut self, mv: Move) {
        match mv {
            Move::Push { target, amount } => {
                self.coefficients[target] += amount;
            }
            Move::Exchange {
                source,
                released,
                target,
                amount,
            } => {
                self.coefficients[source] = (self.coefficients[source] - released).max(0.0);
                self.coefficients[target] += amount;
            }
        }
        self.update_residual();
    }

    fn underflow(&self) -> f64 {
        self.residual.iter().map(|r| r.max(0.0)).sum()
    }

    /// Replace the coefficients, returning the previous ones
    fn replace_coefficients(&mut self, coefficients: Vec<f64>) -> Vec<f64> {
        let previous = std::mem::replace(&mut self.coefficients, coefficients);
        self.update_residual();
        previous
    }
}

const PIVOT_EPSILON: f64 = 1e-12;

/// Maximize the explained signal `masses · x` subject to every fragment's capacity
/// and `x >= 0` with the simplex method, pivoting by Bland's rule.
///
/// Capacities are non-negative, so the slack basis is a feasible start. Returns the
/// coefficients, or `None` if `budget` pivots were not enough, along with the number
/// of pivots made.
fn refine_by_simplex(
    units: &[Vec<f64>],
    capacity: &[f64],
    masses: &[f64],
    budget: usize,
) -> (Option<Vec<f64>>, usize) {
    let n = units.len();
    let m = capacity.len();
    let rhs = n + m;
    let mut tableau = DMatrix::<f64>::zeros(m + 1, rhs + 1);
    for (j, cap) in capacity.iter().enumerate() {
        for (i, unit) in units.iter().enumerate() {
            tableau[(j, i)] = unit.get(j).copied().unwrap_or_default().max(0.0);
        }
        tableau[(j, n + j)] = 1.0;
        tableau[(j, rhs)] = cap.max(0.0);
    }
    for (i, mass) in masses.iter().enumerate() {
        tableau[(m, i)] = *mass;
    }
    let mut basis: Vec<usize> = (n..n + m).collect();

    let mut pivots = 0;
    while let Some(entering) = (0..rhs).find(|c| tableau[(m, *c)] > PIVOT_EPSILON) {
        if pivots >= budget {
            return (None, pivots);
        }
        let mut leaving: Option<(f64, usize)> = None;
        for row in 0..m {
            let coef = tableau[(row, entering)];
            if coef <= PIVOT_EPSILON {
                continue;
            }
            let ratio = tableau[(row, rhs)] / coef;
            leaving = match leaving {
                Some((best, best_row))
                    if best < ratio || (best == ratio && basis[best_row] < basis[row]) =>
                {
                    Some((best, best_row))
                }
                _ => Some((ratio, row)),
            };
        }
        // Unbounded, which non-negative unit vectors with a positive mass rule out
        let Some((_, pivot_row)) = leaving else {
            return (None, pivots);
        };

        let pivot = tableau[(pivot_row, entering)];
        for c in 0..=rhs {
            tableau[(pivot_row, c)] /= pivot;
        }
        for row in 0..=m {
            if row == pivot_row {
                continue;
            }
            let factor = tableau[(row, entering)];
            if factor == 0.0 {
                continue;
            }
            for c in 0..=rhs {
                let delta = factor * tableau[(pivot_row, c)];
                tableau[(row, c)] -= delta;
            }
        }
        basis[pivot_row] = entering;
        pivots += 1;
    }

    let mut coefficients = vec![0.0; n];
    for (row, var) in basis.iter().enumerate() {
        if *var < n {
            coefficients[*var] = tableau[(row, rhs)].max(0.0);
        }
    }
    (Some(coefficients), pivots)
}

/// Decompose `capacity` into a non-negative combination of `units`.
///
/// Each iteration applies the move that explains the most additional signal: either
/// pushing up to `step` more of one isomer, or releasing up to `step` of one isomer
/// to make room for as much of another as fits. Moves that use their whole step
/// double it, and when no move improves the solution the step is halved. The solver
/// stops once the step falls below `config.convergence` times the initial step or the
/// iteration budget runs out.
///
/// Ties between equally good moves favor pushes, then lower isomer indices.
///
/// If the greedy phase leaves signal unexplained and budget remains, the coefficients
/// are refined by the simplex method, each pivot counting as one iteration. The refined
/// coefficients are only kept if they explain more of the signal.
pub fn solve_max_flow(
    units: &[Vec<f64>],
    capacity: &[f64],
    step: f64,
    config: &SolverConfig,
) -> MixtureSolution {
    let mut state = FlowState::new(units, capacity);
    let total: f64 = capacity.iter().copied().filter(|c| *c > 0.0).sum();
    if units.is_empty() || total <= 0.0 {
        return MixtureSolution {
            coefficients: state.coefficients,
            underflow: total.max(0.0),
            iterations: 0,
            converged: true,
        };
    }

    let initial_step = if step.is_finite() && step > 0.0 { step } else { 1.0 };
    let min_step = initial_step * config.convergence;
    let min_gain = (total * 16.0 * f64::EPSILON).max(f64::MIN_POSITIVE);

    let mut step = initial_step;
    let mut iterations = 0;
    let mut converged = false;
    while iterations < config.max_iterations {
        iterations += 1;
        match state.best_move(step) {
            Some((mv, gain)) if gain > min_gain => {
                let saturated = match mv {
                    Move::Push { amount, .. } => amount >= step,
                    Move::Exchange { released, .. } => released >= step,
                };
                state.apply(mv);
                if saturated {
                    step *= 2.0;
                }
            }
            _ => {
                step /= 2.0;
                if step < min_step {
                    converged = true;
                    break;
                }
            }
        }
    }

    let greedy_underflow = state.underflow();
    if greedy_underflow > min_gain && iterations < config.max_iterations {
        let (refined, pivots) = refine_by_simplex(
            units,
            capacity,
            &state.masses,
            config.max_iterations - iterations,
        );
        iterations += pivots;
        match refined {
            Some(coefficients) => {
                let greedy = state.replace_coefficients(coefficients);
                if state.underflow() >= greedy_underflow - min_gain {
                    state.replace_coefficients(greedy);
                }
            }
            None => {
                converged = false;
            }
        }
    }

    MixtureSolution {
        underflow: state.underflow(),
        coefficients: state.coefficients,
        iterations,
        converged,
    }
}

/// One isomer's share of one scan
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolvedScanResult {
    pub ratio: f64,
    pub fit_magnitude: f64,
}

/// Normalize solver coefficients into ratios.
///
/// The normalizer is the sum of the coefficients plus the underflow as a fraction of
/// the total intensity, so a poorly explained scan shrinks every ratio.
pub fn ratios_from_coefficients(
    coefficients: &[f64],
    underflow: f64,
    total_intensity: f64,
) -> Vec<SolvedScanResult> {
    let unexplained = if total_intensity > 0.0 {
        underflow.max(0.0) / total_intensity
    } else {
        0.0
    };
    let denominator = coefficients.iter().map(|c| c.max(0.0)).sum::<f64>() + unexplained;
    coefficients
        .iter()
        .map(|c| {
            let fit_magnitude = c.max(0.0);
            let ratio = if denominator > 0.0 {
                fit_magnitude / denominator
            } else {
                0.0
            };
            SolvedScanResult {
                ratio,
                fit_magnitude,
            }
        })
        .collect()
}

/// The solved form of one scan for one configuration
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScanSolution {
    /// One entry per candidate, in candidate order
    pub results: Vec<SolvedScanResult>,
    pub underflow: f64,
    /// The underflow as a fraction of `total_intensity`, `1.0` when nothing could be solved
    pub percent_error: f64,
    pub total_intensity: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl ScanSolution {
    /// A scan that could not be solved at all
    pub fn failed(total_intensity: f64) -> Self {
        Self {
            results: Vec::new(),
            underflow: total_intensity.max(0.0),
            percent_error: 1.0,
            total_intensity,
            iterations: 0,
            converged: false,
        }
    }

    pub fn is_reliable(&self, max_percent_error: f64) -> bool {
        self.percent_error < max_percent_error
    }

    /// Reject the scan if its percent error is not below `max_percent_error`
    pub fn check_reliability(
        &self,
        time: f64,
        max_percent_error: f64,
    ) -> Result<&Self, IsomerDeconvolutionError> {
        if self.is_reliable(max_percent_error) {
            Ok(self)
        } else {
            Err(IsomerDeconvolutionError::UnreliableScan {
                time,
                percent_error: self.percent_error,
            })
        }
    }
}

/// Solve one scan against the `candidates`' fragment sets.
///
/// Without candidates, or with no matched signal, the scan is reported as a total
/// failure with a percent error of `1.0`.
pub fn solve_scan(
    candidates: &[&ReferenceFragmentSet],
    peaks: &MZPeakSetType<Peak>,
    fragment_tolerance: Tolerance,
    trap_intensity: f64,
    config: &SolverConfig,
) -> ScanSolution {
    if candidates.is_empty() {
        return ScanSolution::failed(0.0);
    }
    let vectors = IntensityVectors::build(candidates, peaks, fragment_tolerance, trap_intensity);
    let total_intensity = vectors.total_mixed();
    if !(total_intensity > 0.0) {
        let mut failed = ScanSolution::failed(0.0);
        failed.results = vec![SolvedScanResult::default(); candidates.len()];
        return failed;
    }

    let step = step_size(trap_intensity);
    let solution = solve_max_flow(&vectors.units, &vectors.mixed, step, config);
    trace!(
        "Solved {} isomers over {} fragments in {} iterations, underflow {:0.3}/{:0.3}",
        candidates.len(),
        vectors.len(),
        solution.iterations,
        solution.underflow,
        total_intensity
    );
    let percent_error = (solution.underflow / total_intensity).clamp(0.0, 1.0);
    let results =
        ratios_from_coefficients(&solution.coefficients, solution.underflow, total_intensity);
    ScanSolution {
        results,
        underflow: solution.underflow,
        percent_error,
        total_intensity,
        iterations: solution.iterations,
        converged: solution.converged,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::peaks::peak_set_from_pairs;

    fn isomer_a() -> ReferenceFragmentSet {
        ReferenceFragmentSet::from_pairs(vec![(200.0, 0.5), (300.0, 0.3), (400.0, 0.2)])
    }

    fn isomer_b() -> ReferenceFragmentSet {
        ReferenceFragmentSet::from_pairs(vec![(250.0, 0.6), (300.0, 0.2), (450.0, 0.2)])
    }

    #[test]
    fn test_step_size() {
        assert_eq!(step_size(50_000.0), 50.0);
        assert_eq!(step_size(10.0), 1.0);
        assert_eq!(step_size(0.0), 1.0);
        assert_eq!(step_size(f64::NAN), 1.0);
    }

    #[test]
    fn test_single_isomer_exact() {
        let unit = vec![vec![0.5, 0.3, 0.2]];
        let mixed = vec![50.0, 30.0, 20.0];
        let solution = solve_max_flow(&unit, &mixed, 1.0, &SolverConfig::default());
        assert!(solution.converged);
        assert!((solution.coefficients[0] - 100.0).abs() < 1e-6);
        assert!(solution.underflow < 1e-6);

        let results = ratios_from_coefficients(&solution.coefficients, solution.underflow, 100.0);
        assert!((results[0].ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_isomer_mixture() {
        let units = vec![vec![0.5, 0.3, 0.2, 0.0, 0.0], vec![0.0, 0.2, 0.0, 0.6, 0.2]];
        // 100 of the first and 300 of the second
        let mixed = vec![50.0, 90.0, 20.0, 180.0, 60.0];
        let solution = solve_max_flow(&units, &mixed, 1.0, &SolverConfig::default());
        assert!((solution.coefficients[0] - 100.0).abs() < 1e-3, "{:?}", solution);
        assert!((solution.coefficients[1] - 300.0).abs() < 1e-3, "{:?}", solution);
        assert!(solution.underflow < 1e-3);
    }

    #[test]
    fn test_collinear_isomers_stay_non_negative() {
        let units = vec![vec![0.5, 0.5, 0.0], vec![0.5, 0.4, 0.1], vec![0.0, 0.0, 1.0]];
        let mixed = vec![40.0, 10.0, 5.0];
        let solution = solve_max_flow(&units, &mixed, 1.0, &SolverConfig::default());
        for c in solution.coefficients.iter() {
            assert!(*c >= 0.0);
        }
        let explained: f64 = units
            .iter()
            .zip(solution.coefficients.iter())
            .map(|(u, x)| u.iter().sum::<f64>() * x)
            .sum();
        let total: f64 = mixed.iter().sum();
        assert!(solution.underflow >= 0.0);
        assert!((explained + solution.underflow - total).abs() < 1e-6);
        // The second fragment caps how much of the first can be explained
        assert!(solution.underflow > 20.0);
    }

    #[test]
    fn test_narrow_isomers_fill_around_wide_one() {
        let units = vec![vec![0.5, 0.5], vec![1.0, 0.0], vec![0.0, 1.0]];
        let mixed = vec![10.0, 4.0];
        let solution = solve_max_flow(&units, &mixed, 1.0, &SolverConfig::default());
        assert!(solution.underflow < 1e-6, "{:?}", solution);
    }

    #[test]
    fn test_shared_backbone_isomer_does_not_strand_signal() {
        // The first isomer overlaps both others, so routing it first fills every slot
        let units = vec![
            vec![1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0],
            vec![0.5, 0.5, 0.0],
            vec![0.5, 0.0, 0.5],
        ];
        let mixed = vec![2.0, 1.0, 1.0];
        let solution = solve_max_flow(&units, &mixed, 1.0, &SolverConfig::default());
        assert!(solution.converged);
        assert!(solution.underflow < 1e-9, "{:?}", solution);
        assert!(solution.coefficients[0].abs() < 1e-9, "{:?}", solution);
        assert!((solution.coefficients[1] - 2.0).abs() < 1e-9, "{:?}", solution);
        assert!((solution.coefficients[2] - 2.0).abs() < 1e-9, "{:?}", solution);

        let results = ratios_from_coefficients(&solution.coefficients, solution.underflow, 4.0);
        assert!(results[0].ratio < 1e-9);
        assert!((results[1].ratio - 0.5).abs() < 1e-9);
        assert!((results[2].ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_positional_isomers_with_common_fragments() {
        // A backbone-only isomer ahead of three with site specific fragments
        let units = vec![
            vec![0.25, 0.25, 0.25, 0.25, 0.0, 0.0],
            vec![0.4, 0.2, 0.2, 0.2, 0.0, 0.0],
            vec![0.4, 0.2, 0.0, 0.0, 0.4, 0.0],
            vec![0.4, 0.0, 0.2, 0.0, 0.0, 0.4],
        ];
        let expected = [0.0, 10.0, 20.0, 30.0];
        let mixed: Vec<f64> = (0..6)
            .map(|j| units.iter().zip(expected.iter()).map(|(u, x)| u[j] * x).sum())
            .collect();
        let solution = solve_max_flow(&units, &mixed, 1.0, &SolverConfig::default());
        assert!(solution.underflow < 1e-6, "{:?}", solution);
        for (found, want) in solution.coefficients.iter().zip(expected.iter()) {
            assert!(*found >= 0.0);
            assert!((found - want).abs() < 1e-6, "{:?}", solution);
        }
    }

    #[test]
    fn test_solve_scan_three_isomers() {
        let a = ReferenceFragmentSet::from_pairs(vec![(200.0, 1.0), (300.0, 1.0), (400.0, 1.0)]);
        let b = ReferenceFragmentSet::from_pairs(vec![(200.0, 1.0), (300.0, 1.0)]);
        let c = ReferenceFragmentSet::from_pairs(vec![(200.0, 1.0), (400.0, 1.0)]);
        let peaks = peak_set_from_pairs(vec![(200.0, 200.0), (300.0, 100.0), (400.0, 100.0)]);
        let solution = solve_scan(
            &[&a, &b, &c],
            &peaks,
            Tolerance::PPM(20.0),
            1000.0,
            &SolverConfig::default(),
        );
        assert!(solution.percent_error < 1e-6, "{:?}", solution);
        assert!(solution.results[0].ratio < 1e-6);
        assert!((solution.results[1].ratio - 0.5).abs() < 1e-6);
        assert!((solution.results[2].ratio - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_iteration_budget() {
        let unit = vec![vec![1.0]];
        let mixed = vec![1e9];
        let solution = solve_max_flow(&unit, &mixed, 1.0, &SolverConfig::default().max_iterations(3));
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 3);
        assert!(solution.coefficients[0] > 0.0);
        assert!(solution.underflow > 0.0);
    }

    #[test]
    fn test_solve_scan() {
        let a = isomer_a();
        let b = isomer_b();
        let peaks = peak_set_from_pairs(vec![
            (200.0, 50.0),
            (250.0, 180.0),
            (300.0, 90.0),
            (400.0, 20.0),
            (450.0, 60.0),
        ]);
        let solution = solve_scan(
            &[&a, &b],
            &peaks,
            Tolerance::PPM(20.0),
            1000.0,
            &SolverConfig::default(),
        );
        assert_eq!(solution.results.len(), 2);
        assert!((solution.total_intensity - 400.0).abs() < 1e-6);
        assert!(solution.percent_error >= 0.0 && solution.percent_error <= 1.0);
        assert!(solution.percent_error < 1e-3);
        assert!((solution.results[0].ratio - 0.25).abs() < 1e-3);
        assert!((solution.results[1].ratio - 0.75).abs() < 1e-3);
        for r in solution.results.iter() {
            assert!(r.ratio >= 0.0 && r.fit_magnitude >= 0.0);
        }
        assert!(solution.check_reliability(0.0, 0.5).is_ok());
    }

    #[test]
    fn test_unexplained_signal_shrinks_ratios() {
        let a = isomer_a();
        let peaks = peak_set_from_pairs(vec![(200.0, 50.0), (300.0, 30.0), (400.0, 20.0), (300.001, 200.0)]);
        let solution = solve_scan(&[&a], &peaks, Tolerance::PPM(20.0), 1000.0, &SolverConfig::default());
        assert!((solution.percent_error - 2.0 / 3.0).abs() < 1e-3);
        assert!(solution.results[0].ratio < 1.0);
        assert!(!solution.is_reliable(0.5));
        let err = solution.check_reliability(12.0, 0.5).unwrap_err();
        assert!(matches!(err, IsomerDeconvolutionError::UnreliableScan { .. }));
    }

    #[test]
    fn test_no_candidates_is_total_failure() {
        let peaks = peak_set_from_pairs(vec![(200.0, 50.0)]);
        let solution = solve_scan(&[], &peaks, Tolerance::PPM(20.0), 1000.0, &SolverConfig::default());
        assert_eq!(solution.percent_error, 1.0);
        assert!(solution.results.is_empty());
    }

    #[test]
    fn test_empty_scan_is_total_failure() {
        let a = isomer_a();
        let peaks = peak_set_from_pairs(Vec::new());
        let solution = solve_scan(&[&a], &peaks, Tolerance::PPM(20.0), 1000.0, &SolverConfig::default());
        assert_eq!(solution.percent_error, 1.0);
        assert_eq!(solution.results, vec![SolvedScanResult::default()]);
    }
}
