//! The data-provider seams of the deconvolution core and its recoverable outcomes
use std::fmt::Display;

use mzpeaks::Tolerance;
use thiserror::Error;

use crate::fragments::CharacterizedIsomer;
use crate::scan::MixedSignal;

/// Identifies a [`CharacterizedIsomer`] by its position in an [`IsomerCatalog`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IsomerKey(pub usize);

impl Display for IsomerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for IsomerKey {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// The outcomes that remove a scan or a configuration from consideration.
///
/// None of these stop processing of other configurations or mixed precursors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IsomerDeconvolutionError {
    #[error("No usable set of candidate isomers for {fragment_count} fragments")]
    UnmatchedConfiguration { fragment_count: usize },
    #[error("Scan at {time:0.3} ms left {percent_error:0.3} of its signal unexplained")]
    UnreliableScan { time: f64, percent_error: f64 },
    #[error("{ignored} of {total} scans were unreliable with {fragment_count} fragments")]
    NoisyPrecursor {
        fragment_count: usize,
        ignored: usize,
        total: usize,
    },
    #[error("No isomer had a positive area with {fragment_count} fragments")]
    ZeroAreaConfiguration { fragment_count: usize },
    #[error("No configuration was retained for precursor {mz:0.4}")]
    EmptyResult { mz: f64 },
    #[error("Mixed precursor at {mz:0.4} has no scans")]
    EmptySignal { mz: f64 },
}

/// A catalog of characterized isomers to draw deconvolution candidates from
pub trait IsomerCatalog: Sync {
    fn isomers(&self) -> &[CharacterizedIsomer];

    fn get(&self, key: IsomerKey) -> Option<&CharacterizedIsomer> {
        self.isomers().get(key.0)
    }

    fn len(&self) -> usize {
        self.isomers().len()
    }

    fn is_empty(&self) -> bool {
        self.isomers().is_empty()
    }

    /// All isomers whose m/z matches `mz` within `error_tolerance`, in catalog order
    fn characterize(
        &self,
        mz: f64,
        error_tolerance: Tolerance,
    ) -> Vec<(IsomerKey, &CharacterizedIsomer)> {
        self.isomers()
            .iter()
            .enumerate()
            .filter(|(_, isomer)| error_tolerance.test(isomer.mz, mz))
            .map(|(i, isomer)| (IsomerKey(i), isomer))
            .collect()
    }
}

impl IsomerCatalog for Vec<CharacterizedIsomer> {
    fn isomers(&self) -> &[CharacterizedIsomer] {
        self
    }
}

/// A source of mixed precursor time series, grouped by sample
pub trait MixedSignalSource {
    type Error;

    fn sample_names(&self) -> Vec<String>;

    fn load_mixed_signals(&self, sample: &str) -> Result<Vec<MixedSignal>, Self::Error>;
}
