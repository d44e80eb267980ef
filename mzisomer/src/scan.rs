//! The time series of tandem scans collected for a mixed precursor
use mzpeaks::MZPeakSetType;

use crate::curve::ElutionCurve;
use crate::peaks::Peak;

const MILLISECONDS_PER_MINUTE: f64 = 60.0 * 1000.0;

/// Convert a retention time in minutes to the millisecond time axis used by elution curves
#[inline]
pub fn minutes_to_milliseconds(minutes: f64) -> f64 {
    minutes * MILLISECONDS_PER_MINUTE
}

/// One fragmentation event of a mixed precursor
#[derive(Debug, Default, Clone)]
pub struct Scan {
    /// The retention time in minutes
    pub retention_time: f64,
    /// The ion injection time in milliseconds
    pub injection_time: f64,
    pub precursor_intensity: f64,
    pub precursor_intensity_per_ms: f64,
    pub peaks: MZPeakSetType<Peak>,
}

impl Scan {
    pub fn new(
        retention_time: f64,
        injection_time: f64,
        precursor_intensity: f64,
        precursor_intensity_per_ms: f64,
        peaks: MZPeakSetType<Peak>,
    ) -> Self {
        Self {
            retention_time,
            injection_time,
            precursor_intensity,
            precursor_intensity_per_ms,
            peaks,
        }
    }

    /// The retention time on the elution curve time axis
    #[inline]
    pub fn time(&self) -> f64 {
        minutes_to_milliseconds(self.retention_time)
    }
}

/// All scans of one mixed precursor m/z along with its aggregate elution curves.
#[derive(Debug, Default, Clone)]
pub struct MixedSignal {
    pub mz: f64,
    /// Scans sorted by retention time
    scans: Vec<Scan>,
    /// Time versus raw precursor intensity
    pub intensity_curve: ElutionCurve,
    /// Time versus precursor intensity per millisecond of injection
    pub intensity_per_ms_curve: ElutionCurve,
}

impl MixedSignal {
    /// Create a new [`MixedSignal`], sorting `scans` by retention time and building
    /// the aggregate curves from their precursor intensities.
    pub fn new(mz: f64, mut scans: Vec<Scan>) -> Self {
        scans.sort_by(|a, b| a.retention_time.total_cmp(&b.retention_time));
        let mut intensity_curve = ElutionCurve::new();
        let mut intensity_per_ms_curve = ElutionCurve::new();
        for scan in scans.iter() {
            let time = scan.time();
            intensity_curve.add_point(time, scan.precursor_intensity);
            intensity_per_ms_curve.add_point(time, scan.precursor_intensity_per_ms);
        }
        intensity_curve.compute();
        intensity_per_ms_curve.compute();
        Self {
            mz,
            scans,
            intensity_curve,
            intensity_per_ms_curve,
        }
    }

    pub fn scans(&self) -> &[Scan] {
        &self.scans
    }

    pub fn len(&self) -> usize {
        self.scans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// The retention time of the earliest scan, in minutes
    pub fn start_time(&self) -> Option<f64> {
        self.scans.first().map(|s| s.retention_time)
    }

    /// Estimate how much precursor was accumulated in the trap for `scan`.
    ///
    /// This is the area under the intensity-per-ms curve across the scan's injection
    /// window, falling back to the scan's own rate times its injection time, and then
    /// to its raw precursor intensity.
    pub fn trap_intensity(&self, scan: &Scan) -> f64 {
        let time = scan.time();
        let area = self
            .intensity_per_ms_curve
            .local_area(time, time + scan.injection_time);
        if area.is_finite() && area > 0.0 {
            return area;
        }
        let estimate = scan.precursor_intensity_per_ms * scan.injection_time;
        if estimate.is_finite() && estimate > 0.0 {
            return estimate;
        }
        scan.precursor_intensity.max(0.0)
    }

    /// The mixed precursor's raw intensity at `time` on the curve time axis
    pub fn intensity_at(&self, time: f64) -> f64 {
        self.intensity_curve.interpolate(time)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::peaks::peak_set_from_pairs;

    fn make_scan(rt: f64, injection_time: f64, intensity: f64, per_ms: f64) -> Scan {
        Scan::new(
            rt,
            injection_time,
            intensity,
            per_ms,
            peak_set_from_pairs(vec![(200.0, 10.0)]),
        )
    }

    #[test]
    fn test_scans_are_sorted() {
        let signal = MixedSignal::new(
            500.0,
            vec![
                make_scan(10.2, 50.0, 3000.0, 60.0),
                make_scan(10.0, 50.0, 1000.0, 20.0),
                make_scan(10.1, 50.0, 2000.0, 40.0),
            ],
        );
        let times: Vec<f64> = signal.scans().iter().map(|s| s.retention_time).collect();
        assert_eq!(times, vec![10.0, 10.1, 10.2]);
        assert_eq!(signal.start_time(), Some(10.0));
        assert_eq!(signal.intensity_curve.len(), 3);
        assert_eq!(signal.intensity_at(minutes_to_milliseconds(10.0)), 1000.0);
    }

    #[test]
    fn test_trap_intensity() {
        let signal = MixedSignal::new(
            500.0,
            vec![
                make_scan(10.0, 50.0, 1000.0, 20.0),
                make_scan(10.1, 50.0, 2000.0, 20.0),
            ],
        );
        let scan = &signal.scans()[0];
        assert!((signal.trap_intensity(scan) - 1000.0).abs() < 1e-6);

        let flat = MixedSignal::new(500.0, vec![make_scan(10.0, 50.0, 1000.0, 0.0)]);
        assert_eq!(flat.trap_intensity(&flat.scans()[0]), 1000.0);

        let lone = make_scan(10.0, 0.0, 700.0, 20.0);
        let empty = MixedSignal::new(500.0, Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.trap_intensity(&lone), 700.0);
    }
}
