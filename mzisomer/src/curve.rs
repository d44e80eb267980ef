//! Elution curves built from per-scan samples, with piecewise-linear interpolation and
//! a fitted area summary.
use nalgebra::{DMatrix, DVector};

/// Fits whose design matrix has a smallest-to-largest singular value ratio below this
/// are treated as not well-determined.
const CONDITION_LIMIT: f64 = 1e-8;

/// The degree of the polynomial fit to elution curves
pub const FIT_DEGREE: usize = 2;

/// A single `(time, value)` sample on an [`ElutionCurve`]
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurvePoint {
    pub time: f64,
    pub value: f64,
}

impl CurvePoint {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// A least squares quadratic fit of an [`ElutionCurve`].
///
/// The fit is solved in a centered and scaled time variable
/// ```math
/// s = \frac{t - m}{h}
/// ```
/// so that retention times in milliseconds do not make the normal equations
/// degenerate. [`QuadraticFit::coefficients`] converts back to the raw time axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadraticFit {
    scaled: [f64; 3],
    center: f64,
    scale: f64,
}

impl QuadraticFit {
    /// Fit a quadratic to `points`, which must be sorted by time.
    ///
    /// Returns `None` when there are fewer than three distinct times or the
    /// design matrix is too poorly conditioned.
    pub fn fit(points: &[CurvePoint]) -> Option<Self> {
        if points.len() < FIT_DEGREE + 1 {
            return None;
        }
        let distinct_times = points
            .windows(2)
            .filter(|w| w[1].time > w[0].time)
            .count()
            + 1;
        if distinct_times < FIT_DEGREE + 1 {
            return None;
        }

        let n = points.len();
        let center = points.iter().map(|p| p.time).sum::<f64>() / n as f64;
        let scale = points
            .iter()
            .map(|p| (p.time - center).abs())
            .fold(0.0, f64::max);
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }

        let design = DMatrix::from_fn(n, FIT_DEGREE + 1, |i, j| {
            let s = (points[i].time - center) / scale;
            s.powi((FIT_DEGREE - j) as i32)
        });
        let observed = DVector::from_iterator(n, points.iter().map(|p| p.value));

        let svd = design.svd(true, true);
        let max_sv = svd.singular_values.iter().copied().fold(0.0, f64::max);
        let min_sv = svd
            .singular_values
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        if max_sv <= 0.0 || min_sv <= CONDITION_LIMIT * max_sv {
            return None;
        }
        let solution = svd.solve(&observed, f64::EPSILON).ok()?;
        let scaled = [solution[0], solution[1], solution[2]];
        if scaled.iter().any(|c| !c.is_finite()) {
            return None;
        }
        Some(Self {
            scaled,
            center,
            scale,
        })
    }

    #[inline]
    fn to_scaled(&self, time: f64) -> f64 {
        (time - self.center) / self.scale
    }

    /// Evaluate the fitted polynomial at `time`
    pub fn evaluate(&self, time: f64) -> f64 {
        let [a, b, c] = self.scaled;
        let s = self.to_scaled(time);
        a.mul_add(s * s, b.mul_add(s, c))
    }

    /// The definite integral of the fitted polynomial between `start` and `end`
    pub fn integrate(&self, start: f64, end: f64) -> f64 {
        let [a, b, c] = self.scaled;
        let antiderivative = |s: f64| s * (c + s * (b / 2.0 + s * a / 3.0));
        self.scale * (antiderivative(self.to_scaled(end)) - antiderivative(self.to_scaled(start)))
    }

    /// The coefficients `[a, b, c]` of `a t^2 + b t + c` on the raw time axis
    pub fn coefficients(&self) -> [f64; 3] {
        let [alpha, beta, gamma] = self.scaled;
        let m = self.center;
        let h = self.scale;
        let h2 = h * h;
        [
            alpha / h2,
            beta / h - 2.0 * alpha * m / h2,
            alpha * m * m / h2 - beta * m / h + gamma,
        ]
    }
}

/// An ordered series of `(time, value)` samples for one species.
///
/// Points may be inserted in any order; they are kept sorted by time so the
/// final curve does not depend on insertion order. [`ElutionCurve::compute`]
/// must be called after the last insertion to refresh [`ElutionCurve::area`].
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElutionCurve {
    points: Vec<CurvePoint>,
    fit: Option<QuadraticFit>,
    area: f64,
}

impl ElutionCurve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a curve from `(time, value)` pairs and compute its area
    pub fn from_points<I: IntoIterator<Item = (f64, f64)>>(points: I) -> Self {
        let mut this = Self::new();
        for (time, value) in points {
            this.add_point(time, value);
        }
        this.compute();
        this
    }

    /// Insert a sample, preserving time order. Samples at an already present time are
    /// placed after the existing ones.
    pub fn add_point(&mut self, time: f64, value: f64) {
        let i = self.points.partition_point(|p| p.time <= time);
        self.points.insert(i, CurvePoint::new(time, value));
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CurvePoint> {
        self.points.iter()
    }

    pub fn start_time(&self) -> Option<f64> {
        self.points.first().map(|p| p.time)
    }

    pub fn end_time(&self) -> Option<f64> {
        self.points.last().map(|p| p.time)
    }

    /// Linearly interpolate the curve's value at `time`.
    ///
    /// Outside of the sampled range the nearest endpoint's value is returned, and
    /// an empty curve is `0.0` everywhere.
    pub fn interpolate(&self, time: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if time.is_nan() {
            return 0.0;
        }
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }
        let i = self.points.partition_point(|p| p.time <= time);
        let before = self.points[i - 1];
        let after = self.points[i];
        let width = after.time - before.time;
        if width <= 0.0 {
            return before.value;
        }
        before.value + (after.value - before.value) * (time - before.time) / width
    }

    /// Integrate the interpolated curve between `start` and `end`
    pub fn local_area(&self, start: f64, end: f64) -> f64 {
        if self.points.is_empty() || !(end > start) {
            return 0.0;
        }
        let mut knots = Vec::with_capacity(self.points.len() + 2);
        knots.push(start);
        knots.extend(
            self.points
                .iter()
                .map(|p| p.time)
                .filter(|t| *t > start && *t < end),
        );
        knots.push(end);
        knots
            .windows(2)
            .map(|w| (w[1] - w[0]) * (self.interpolate(w[0]) + self.interpolate(w[1])) / 2.0)
            .sum()
    }

    /// The trapezoid rule integral over the sampled range
    pub fn trapezoid_area(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].time - w[0].time) * (w[0].value + w[1].value) / 2.0)
            .sum()
    }

    /// Fit the curve and compute its area.
    ///
    /// The area is the integral of the quadratic fit over the sampled range when the
    /// fit is well-determined and yields a finite, non-negative value, and the
    /// trapezoid rule integral otherwise.
    pub fn compute(&mut self) -> f64 {
        if !self.points.iter().any(|p| p.value > 0.0) {
            self.fit = None;
            self.area = 0.0;
            return self.area;
        }
        self.fit = QuadraticFit::fit(&self.points);
        let fitted_area = match (self.fit, self.start_time(), self.end_time()) {
            (Some(fit), Some(start), Some(end)) => {
                Some(fit.integrate(start, end)).filter(|a| a.is_finite() && *a >= 0.0)
            }
            _ => None,
        };
        self.area = fitted_area.unwrap_or_else(|| self.trapezoid_area());
        self.area
    }

    /// The area computed by the most recent call to [`ElutionCurve::compute`]
    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn fit(&self) -> Option<&QuadraticFit> {
        self.fit.as_ref()
    }

    /// The raw time axis coefficients of the quadratic fit, if one was made
    pub fn coefficients(&self) -> Option<[f64; 3]> {
        self.fit.map(|f| f.coefficients())
    }

    /// Build a curve whose area is given directly, without fitting
    pub(crate) fn with_area(points: Vec<CurvePoint>, area: f64) -> Self {
        Self {
            points,
            fit: None,
            area,
        }
    }
}

/// The pair of curves tracked for each isomer.
///
/// `rate` holds the solver's fit magnitude divided by the injection time and
/// `count` holds the isomer's ratio times the mixed signal's intensity.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IsomerCurves {
    pub rate: ElutionCurve,
    pub count: ElutionCurve,
}

impl IsomerCurves {
    pub fn new(rate: ElutionCurve, count: ElutionCurve) -> Self {
        Self { rate, count }
    }

    pub fn add_point(&mut self, time: f64, rate: f64, count: f64) {
        self.rate.add_point(time, rate);
        self.count.add_point(time, count);
    }

    pub fn compute(&mut self) {
        self.rate.compute();
        self.count.compute();
    }

    /// The area of the rate curve, the quantity used to decide if an isomer was observed
    pub fn area(&self) -> f64 {
        self.rate.area()
    }

    pub fn is_empty(&self) -> bool {
        self.rate.is_empty() && self.count.is_empty()
    }
}
