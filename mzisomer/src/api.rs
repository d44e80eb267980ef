//! * High level APIs for running isomer deconvolution operations
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    fragments::CharacterizedIsomer,
    scan::MixedSignal,
    sweep::{sweep_configurations, FinalRatios, ScanTally, SweepParams},
    traits::{IsomerCatalog, IsomerDeconvolutionError, IsomerKey, MixedSignalSource},
};

/// A single-shot deconvolution of one mixed signal against a catalog of isomers.
///
/// # Arguments
/// - `catalog`: The characterized isomers to draw candidates from
/// - `signal`: The scans of one mixed precursor
/// - `params`: The configuration range, tolerances and solver settings to use
///
/// # Note
/// When processing many signals against the same catalog, create an
/// [`IsomerDeconvolutionEngine`] and call [`IsomerDeconvolutionEngine::deconvolute`].
pub fn deconvolute_mixed_signal<K: IsomerCatalog>(
    catalog: &K,
    signal: &MixedSignal,
    params: SweepParams,
) -> FinalRatios {
    IsomerDeconvolutionEngine::new(catalog, params).deconvolute(signal)
}

/// The reference-sample summary of one characterized isomer
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSummary {
    pub key: IsomerKey,
    pub label: String,
    pub mz: f64,
    /// The coefficients of the quadratic fit of the reference elution curve, if one was made
    pub coefficients: Option<[f64; 3]>,
    pub area: f64,
}

/// The cumulative area of every isomer in the catalog across the mixed precursors of one sample
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SampleSummary {
    pub sample: String,
    /// One entry per catalog isomer in catalog order, zero when it was never observed
    pub areas: Vec<(IsomerKey, f64)>,
    pub tally: ScanTally,
}

impl SampleSummary {
    pub fn area_for(&self, key: &IsomerKey) -> f64 {
        self.areas
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, a)| *a)
            .unwrap_or_default()
    }
}

/// Every mixed precursor's result for one sample
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SampleResult {
    pub sample: String,
    pub ratios: Vec<FinalRatios>,
    pub summary: SampleSummary,
}

/// Deconvolutes mixed signals against a fixed catalog of characterized isomers.
#[derive(Debug, Clone)]
pub struct IsomerDeconvolutionEngine<'a, K: IsomerCatalog> {
    catalog: &'a K,
    params: SweepParams,
}

impl<'a, K: IsomerCatalog> IsomerDeconvolutionEngine<'a, K> {
    pub fn new(catalog: &'a K, params: SweepParams) -> Self {
        Self { catalog, params }
    }

    pub fn params(&self) -> &SweepParams {
        &self.params
    }

    pub fn catalog(&self) -> &K {
        self.catalog
    }

    /// Deconvolute one mixed signal.
    ///
    /// Configurations are evaluated in parallel and merged once all are complete. A
    /// signal without scans, or one where no configuration was retained, produces an
    /// empty [`FinalRatios`].
    pub fn deconvolute(&self, signal: &MixedSignal) -> FinalRatios {
        if signal.is_empty() {
            debug!("{}", IsomerDeconvolutionError::EmptySignal { mz: signal.mz });
            return FinalRatios::new(signal.mz);
        }
        let candidates = self
            .catalog
            .characterize(signal.mz, self.params.precursor_tolerance);
        debug!(
            "Mixed signal at {:0.4} with {} scans has {} candidate isomers",
            signal.mz,
            signal.len(),
            candidates.len()
        );
        let attempts = sweep_configurations(signal, &candidates, &self.params);
        let ratios = FinalRatios::from_attempts(signal.mz, attempts);
        if ratios.is_empty() {
            debug!("{}", IsomerDeconvolutionError::EmptyResult { mz: signal.mz });
        }
        ratios
    }

    /// Deconvolute many mixed signals in parallel, preserving their order
    pub fn deconvolute_all(&self, signals: &[MixedSignal]) -> Vec<FinalRatios> {
        signals.par_iter().map(|s| self.deconvolute(s)).collect()
    }

    /// Sum each catalog isomer's merged rate area across `ratios`
    pub fn summarize(&self, sample: &str, ratios: &[FinalRatios]) -> SampleSummary {
        let mut areas: Vec<(IsomerKey, f64)> = (0..self.catalog.len())
            .map(|i| (IsomerKey(i), 0.0))
            .collect();
        let mut tally = ScanTally::default();
        for r in ratios.iter() {
            for (key, curves) in r.iter() {
                if let Some((_, area)) = areas.get_mut(key.0) {
                    *area += curves.area();
                }
            }
            tally += r.total_tally();
        }
        SampleSummary {
            sample: sample.to_string(),
            areas,
            tally,
        }
    }

    pub fn deconvolute_sample(&self, sample: &str, signals: &[MixedSignal]) -> SampleResult {
        let ratios = self.deconvolute_all(signals);
        let summary = self.summarize(sample, &ratios);
        let solved = ratios.iter().filter(|r| !r.is_empty()).count();
        info!(
            "{sample}: {solved} of {} mixed precursors were deconvoluted",
            ratios.len()
        );
        SampleResult {
            sample: sample.to_string(),
            ratios,
            summary,
        }
    }

    /// Deconvolute every sample `source` provides
    pub fn deconvolute_source<S: MixedSignalSource>(
        &self,
        source: &S,
    ) -> Result<Vec<SampleResult>, S::Error> {
        source
            .sample_names()
            .into_iter()
            .map(|sample| {
                let signals = source.load_mixed_signals(&sample)?;
                Ok(self.deconvolute_sample(&sample, &signals))
            })
            .collect()
    }

    /// Describe the reference elution curve of every catalog isomer
    pub fn reference_summaries(&self) -> Vec<ReferenceSummary> {
        self.catalog
            .isomers()
            .iter()
            .enumerate()
            .map(|(i, isomer): (usize, &CharacterizedIsomer)| ReferenceSummary {
                key: IsomerKey(i),
                label: isomer.label.clone(),
                mz: isomer.mz,
                coefficients: isomer.reference_curve.coefficients(),
                area: isomer.reference_curve.area(),
            })
            .collect()
    }
}
