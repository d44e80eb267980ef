use std::ops::{Add, AddAssign};

use mzisomer::SampleResult;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ProgressRecord {
    pub samples: usize,
    pub mixed_precursors: usize,
    pub deconvoluted_precursors: usize,
    pub configurations_retained: usize,
    pub configurations_rejected: usize,
    pub scans_processed: usize,
    pub scans_ignored: usize,
}

impl Add for ProgressRecord {
    type Output = ProgressRecord;

    fn add(self, rhs: Self) -> Self::Output {
        let mut dup = self;
        dup += rhs;
        dup
    }
}

impl AddAssign for ProgressRecord {
    fn add_assign(&mut self, rhs: Self) {
        self.samples += rhs.samples;
        self.mixed_precursors += rhs.mixed_precursors;
        self.deconvoluted_precursors += rhs.deconvoluted_precursors;
        self.configurations_retained += rhs.configurations_retained;
        self.configurations_rejected += rhs.configurations_rejected;
        self.scans_processed += rhs.scans_processed;
        self.scans_ignored += rhs.scans_ignored;
    }
}

impl From<&SampleResult> for ProgressRecord {
    fn from(value: &SampleResult) -> Self {
        let mut record = ProgressRecord {
            samples: 1,
            mixed_precursors: value.ratios.len(),
            scans_processed: value.summary.tally.processed,
            scans_ignored: value.summary.tally.ignored,
            ..Default::default()
        };
        for ratios in value.ratios.iter() {
            if !ratios.is_empty() {
                record.deconvoluted_precursors += 1;
            }
            let retained = ratios.retained_configurations();
            record.configurations_retained += retained;
            record.configurations_rejected += ratios.attempts.len() - retained;
        }
        record
    }
}
