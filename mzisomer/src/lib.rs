pub mod curve;
pub mod fragments;
pub mod peaks;
pub mod scan;
pub mod solver;
pub mod sweep;
pub mod traits;
pub mod vectorize;
pub mod api;

pub use crate::api::{
    deconvolute_mixed_signal, IsomerDeconvolutionEngine, ReferenceSummary, SampleResult,
    SampleSummary,
};
pub use crate::curve::{CurvePoint, ElutionCurve, IsomerCurves};
pub use crate::fragments::{
    CharacterizedIsomer, FragmentIntensity, ReferenceFragmentSet, ReferenceObservation,
};
pub use crate::scan::{MixedSignal, Scan};
pub use crate::solver::SolverConfig;
pub use crate::sweep::{FinalRatios, SweepParams};
pub use crate::traits::{IsomerCatalog, IsomerDeconvolutionError, IsomerKey, MixedSignalSource};
