use std::fs;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use std::time::Instant;

use clap::Parser;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use mzisomer::{IsomerDeconvolutionEngine, SolverConfig, SweepParams};

use crate::args::{unit_interval_float, ArgTolerance};
use crate::progress::ProgressRecord;
use crate::types::InputDocument;
use crate::write::{write_output, OutputDocument, ReferenceRecord, SampleOutput};

#[derive(Debug, Error)]
pub enum MZIsomerError {
    #[error("An IO error occurred: {0}")]
    IOError(
        #[source]
        #[from]
        io::Error,
    ),
    #[error("Failed to read or write JSON: {0}")]
    JSONError(
        #[source]
        #[from]
        serde_json::Error,
    ),
    #[error("Failed to read the configuration: {0}")]
    ConfigurationError(
        #[source]
        #[from]
        Box<figment::Error>,
    ),
    #[error("Failed to build the thread pool: {0}")]
    ThreadPoolError(
        #[source]
        #[from]
        rayon::ThreadPoolBuildError,
    ),
    #[error("The fragment count range {min}-{max} is invalid, the minimum must be at least 1 and no greater than the maximum")]
    InvalidFragmentRange { min: usize, max: usize },
    #[error("Sample {0} was not found in the input")]
    SampleNotFound(String),
}

impl From<figment::Error> for MZIsomerError {
    fn from(value: figment::Error) -> Self {
        Self::ConfigurationError(Box::new(value))
    }
}

/// Deconvolution of mixed positional isomer precursors.
///
/// Read a JSON document of characterized isomers and mixed precursor scan series,
/// estimate how much each isomer contributed to each mixed precursor over time, and
/// write the per-isomer elution curves out as JSON.
#[derive(Parser, Debug, Clone, Deserialize, Serialize)]
#[command(author, version)]
pub struct MZIsomerSolver {
    /// The path to read the input document from, or if '-' is passed, read from STDIN
    #[arg()]
    pub input_file: String,

    /// The path to write the output document to, or if '-' is passed, write to STDOUT.
    #[arg(short = 'o', long = "output-file", default_value = "-")]
    pub output_file: PathBuf,

    /// The path to write a log file to, in addition to STDERR
    #[arg(short = 'l', long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// A TOML configuration file to read additional parameters from.
    ///
    /// Configurations are also read from `mzisomer.toml` in the working directory.
    /// Environment variables prefixed with `MZISOMER_` will be read too.
    #[arg(long = "config-file")]
    pub config_file: Option<PathBuf>,

    /// The number of threads to use, passing a value < 1 to use all available threads
    #[arg(
        short='t',
        long="threads",
        default_value_t=-1,
    )]
    pub threads: i32,

    /// The smallest number of top fragments to characterize isomers with
    #[arg(short = 'k', long = "min-fragments", default_value_t = 5)]
    pub min_fragments: usize,

    /// The largest number of top fragments to characterize isomers with
    #[arg(short = 'K', long = "max-fragments", default_value_t = 5)]
    pub max_fragments: usize,

    /// The mass accuracy for matching isomers to a mixed precursor, denoted (value)ppm or (value)da
    #[arg(
        short = 'p',
        long = "precursor-tolerance",
        default_value_t = ArgTolerance::ppm(8.0),
        value_parser = ArgTolerance::from_str,
    )]
    pub precursor_tolerance: ArgTolerance,

    /// The mass accuracy for matching fragment peaks, denoted (value)ppm or (value)da
    #[arg(
        short = 'f',
        long = "fragment-tolerance",
        default_value_t = ArgTolerance::ppm(20.0),
        value_parser = ArgTolerance::from_str,
    )]
    pub fragment_tolerance: ArgTolerance,

    /// Scans leaving at least this fraction of their signal unexplained are ignored
    #[arg(
        short = 'e',
        long = "max-percent-error",
        default_value_t = 0.5,
        value_parser = unit_interval_float
    )]
    pub max_percent_error: f64,

    /// The maximum number of solver moves per scan
    #[arg(long = "max-iterations", default_value_t = 20_000)]
    pub max_iterations: usize,
}

impl MZIsomerSolver {
    fn create_threadpool(&self) -> Result<rayon::ThreadPool, MZIsomerError> {
        let num_threads = if self.threads > 0 {
            self.threads as usize
        } else {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        };
        debug!("Using {} cores", num_threads);
        Ok(rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()?)
    }

    /// Check the arguments and build the sweep parameters from them
    pub fn sweep_params(&self) -> Result<SweepParams, MZIsomerError> {
        if self.min_fragments < 1 || self.min_fragments > self.max_fragments {
            return Err(MZIsomerError::InvalidFragmentRange {
                min: self.min_fragments,
                max: self.max_fragments,
            });
        }
        Ok(SweepParams::default()
            .fragment_range(self.min_fragments, self.max_fragments)
            .precursor_tolerance(self.precursor_tolerance.into())
            .fragment_tolerance(self.fragment_tolerance.into())
            .max_percent_error(self.max_percent_error)
            .solver(SolverConfig::default().max_iterations(self.max_iterations)))
    }

    fn read_input(&self) -> Result<InputDocument, MZIsomerError> {
        let document: InputDocument = if self.input_file == "-" {
            serde_json::from_reader(BufReader::new(io::stdin().lock()))?
        } else {
            serde_json::from_reader(BufReader::new(fs::File::open(&self.input_file)?))?
        };
        debug!(
            "Read {} isomers and {} samples",
            document.isomers.len(),
            document.samples.len()
        );
        Ok(document)
    }

    pub fn main(&self) -> Result<(), MZIsomerError> {
        info!(
            "mzisomer v{}",
            option_env!("CARGO_PKG_VERSION").unwrap_or("unknown")
        );
        info!("Input: {}", self.input_file);
        info!("Output: {}", self.output_file.display());
        let params = self.sweep_params()?;
        info!(
            "Fragments {}-{} | Precursor tolerance {} | Fragment tolerance {}",
            params.min_fragments, params.max_fragments, self.precursor_tolerance, self.fragment_tolerance
        );
        let input = self.read_input()?;
        let pool = self.create_threadpool()?;
        pool.install(|| self.run(&input, params))
    }

    fn run(&self, input: &InputDocument, params: SweepParams) -> Result<(), MZIsomerError> {
        let start = Instant::now();
        let catalog = input.build_catalog(params.fragment_counts(), params.fragment_tolerance);
        let unusable = catalog
            .iter()
            .filter(|isomer| !params.fragment_counts().any(|k| isomer.is_valid(k)))
            .map(|isomer| isomer.label.as_str())
            .join(", ");
        if !unusable.is_empty() {
            warn!("No fragment set in range for: {unusable}");
        }

        let engine = IsomerDeconvolutionEngine::new(&catalog, params);
        let results = engine.deconvolute_source(input)?;

        let mut progress = ProgressRecord::default();
        for result in results.iter() {
            progress += ProgressRecord::from(result);
        }

        let document = OutputDocument {
            references: engine
                .reference_summaries()
                .into_iter()
                .map(ReferenceRecord::from)
                .collect(),
            samples: results
                .iter()
                .map(|r| SampleOutput::new(r, &catalog))
                .collect(),
        };
        write_output(&self.output_file, &document)?;

        info!("Samples: {}", progress.samples);
        info!(
            "Mixed Precursors: {} | Deconvoluted: {}",
            progress.mixed_precursors, progress.deconvoluted_precursors
        );
        info!(
            "Configurations Retained: {} | Rejected: {}",
            progress.configurations_retained, progress.configurations_rejected
        );
        info!(
            "Scans Processed: {} | Ignored: {}",
            progress.scans_processed, progress.scans_ignored
        );
        info!("Total Elapsed Time: {:0.3?}", start.elapsed());
        Ok(())
    }
}
