//! Tolerance-based association of observed fragment peaks with reference fragment masses.
use mzpeaks::{prelude::*, CentroidPeak, MZPeakSetType, Tolerance};

/// The peak type carried by a [`Scan`](crate::scan::Scan)
pub type Peak = CentroidPeak;

/// Sum the intensity of every peak in `peaks` whose mass error relative to `target`
/// satisfies `error_tolerance`.
///
/// Several peaks within tolerance of the same target are all counted. When nothing
/// matches, the result is `0.0`.
#[inline]
pub fn matched_intensity<C: CentroidLike>(
    peaks: &MZPeakSetType<C>,
    target: f64,
    error_tolerance: Tolerance,
) -> f64 {
    peaks
        .all_peaks_for(target, error_tolerance)
        .iter()
        .filter(|p| error_tolerance.test(p.mz(), target))
        .map(|p| p.intensity() as f64)
        .sum()
}

/// Build a peak set from `(m/z, intensity)` pairs. Negative or non-finite intensities
/// are dropped.
pub fn peak_set_from_pairs<I: IntoIterator<Item = (f64, f64)>>(pairs: I) -> MZPeakSetType<Peak> {
    let peaks: Vec<Peak> = pairs
        .into_iter()
        .filter(|(mz, intensity)| mz.is_finite() && intensity.is_finite() && *intensity >= 0.0)
        .map(|(mz, intensity)| CentroidPeak::new(mz, intensity as f32, 0))
        .collect();
    MZPeakSetType::new(peaks)
}

#[cfg(test)]
mod test {
    use super::*;

    fn make_peaks() -> MZPeakSetType<Peak> {
        peak_set_from_pairs(vec![
            (200.1000, 1000.0),
            (200.1020, 500.0),
            (300.2000, 250.0),
            (450.0000, 80.0),
        ])
    }

    #[test]
    fn test_sums_all_peaks_in_window() {
        let peaks = make_peaks();
        let total = matched_intensity(&peaks, 200.101, Tolerance::PPM(20.0));
        assert!((total - 1500.0).abs() < 1e-6);

        let total = matched_intensity(&peaks, 200.100, Tolerance::PPM(1.0));
        assert!((total - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_match_is_zero() {
        let peaks = make_peaks();
        assert_eq!(matched_intensity(&peaks, 350.0, Tolerance::PPM(20.0)), 0.0);

        let empty = peak_set_from_pairs(Vec::new());
        assert_eq!(matched_intensity(&empty, 200.1, Tolerance::PPM(20.0)), 0.0);
    }

    #[test]
    fn test_zero_tolerance() {
        let peaks = make_peaks();
        assert_eq!(matched_intensity(&peaks, 300.2001, Tolerance::PPM(0.0)), 0.0);
    }

    #[test]
    fn test_tolerance_is_monotone() {
        let peaks = make_peaks();
        let mut last = 0.0;
        for tol in [0.0, 1.0, 2.5, 5.0, 10.0, 20.0, 50.0, 100.0, 5000.0] {
            let total = matched_intensity(&peaks, 200.1005, Tolerance::PPM(tol));
            assert!(total >= last, "{tol} ppm yielded {total} < {last}");
            last = total;
        }
        assert!((last - 1500.0).abs() < 1e-6);
    }

    #[test]
    fn test_tolerance_scales_with_mass() {
        let peaks = peak_set_from_pairs(vec![(1000.009, 10.0), (100.01, 10.0)]);
        // 10 ppm of 1000 is 0.01, 10 ppm of 100 is 0.001
        assert_eq!(matched_intensity(&peaks, 1000.0, Tolerance::PPM(10.0)), 10.0);
        assert_eq!(matched_intensity(&peaks, 100.0, Tolerance::PPM(10.0)), 0.0);
        assert_eq!(matched_intensity(&peaks, 100.0, Tolerance::Da(0.02)), 10.0);
    }
}
