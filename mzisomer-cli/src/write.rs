use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use mzisomer::sweep::{ConfigurationAttempt, ScanDiagnostic, ScanTally};
use mzisomer::{
    ElutionCurve, FinalRatios, IsomerCatalog, ReferenceSummary, SampleResult,
};

use crate::driver::MZIsomerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub label: String,
    pub mz: f64,
    pub coefficients: Option<[f64; 3]>,
    pub area: f64,
}

impl From<ReferenceSummary> for ReferenceRecord {
    fn from(value: ReferenceSummary) -> Self {
        Self {
            label: value.label,
            mz: value.mz,
            coefficients: value.coefficients,
            area: value.area,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsomerOutput {
    pub label: String,
    pub rate_area: f64,
    pub count_area: f64,
    pub rate: ElutionCurve,
    pub count: ElutionCurve,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationOutput {
    pub fragment_count: usize,
    pub retained: bool,
    pub rejection: Option<String>,
    pub cumulative_error: Option<f64>,
    pub tally: ScanTally,
    pub diagnostics: Vec<ScanDiagnostic>,
}

impl From<&ConfigurationAttempt> for ConfigurationOutput {
    fn from(value: &ConfigurationAttempt) -> Self {
        Self {
            fragment_count: value.fragment_count,
            retained: value.is_retained(),
            rejection: value.rejection().map(|e| e.to_string()),
            cumulative_error: value.result.as_ref().ok().map(|r| r.cumulative_error),
            tally: value.tally,
            diagnostics: value.diagnostics.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecursorOutput {
    pub mz: f64,
    pub isomers: Vec<IsomerOutput>,
    pub configurations: Vec<ConfigurationOutput>,
}

impl PrecursorOutput {
    pub fn new<K: IsomerCatalog>(ratios: &FinalRatios, catalog: &K) -> Self {
        let isomers = ratios
            .iter()
            .map(|(key, curves)| IsomerOutput {
                label: catalog
                    .get(*key)
                    .map(|i| i.label.clone())
                    .unwrap_or_else(|| key.to_string()),
                rate_area: curves.rate.area(),
                count_area: curves.count.area(),
                rate: curves.rate.clone(),
                count: curves.count.clone(),
            })
            .collect();
        let configurations = ratios.attempts.iter().map(ConfigurationOutput::from).collect();
        Self {
            mz: ratios.mz,
            isomers,
            configurations,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub area: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleOutput {
    pub name: String,
    pub summary: Vec<SummaryRow>,
    pub tally: ScanTally,
    pub precursors: Vec<PrecursorOutput>,
}

impl SampleOutput {
    pub fn new<K: IsomerCatalog>(result: &SampleResult, catalog: &K) -> Self {
        let summary = result
            .summary
            .areas
            .iter()
            .map(|(key, area)| SummaryRow {
                label: catalog
                    .get(*key)
                    .map(|i| i.label.clone())
                    .unwrap_or_else(|| key.to_string()),
                area: *area,
            })
            .collect();
        let precursors = result
            .ratios
            .iter()
            .map(|r| PrecursorOutput::new(r, catalog))
            .collect();
        Self {
            name: result.sample.clone(),
            summary,
            tally: result.summary.tally,
            precursors,
        }
    }
}

/// The complete result document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputDocument {
    pub references: Vec<ReferenceRecord>,
    pub samples: Vec<SampleOutput>,
}

/// Write `document` as JSON to `path`, or to STDOUT if `path` is `-`
#[instrument(level = "debug", skip(document))]
pub fn write_output(path: &Path, document: &OutputDocument) -> Result<(), MZIsomerError> {
    if path.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut handle = BufWriter::new(stdout.lock());
        serde_json::to_writer_pretty(&mut handle, document)?;
        writeln!(handle)?;
        handle.flush()?;
    } else {
        let mut handle = BufWriter::new(fs::File::create(path)?);
        serde_json::to_writer_pretty(&mut handle, document)?;
        handle.flush()?;
    }
    debug!("Wrote {} samples", document.samples.len());
    Ok(())
}
