use super::PositionFilter;

/// Exponential smoothing: `out = alpha * previous + (1 - alpha) * raw`
pub struct ExponentialFilter {
    alpha: f64,
    last: Option<(f64, f64)>,
}

impl ExponentialFilter {
    /// `alpha` is the weight kept from the previous output
    pub fn new(alpha: f64) -> Self {
        assert!((0.0..1.0).contains(&alpha), "Alpha must be in [0, 1)");
        Self { alpha, last: None }
    }

    pub const fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl PositionFilter for ExponentialFilter {
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        let out = match self.last {
            Some((px, py)) => (
                self.alpha * px + (1.0 - self.alpha) * x,
                self.alpha * py + (1.0 - self.alpha) * y,
            ),
            None => (x, y),
        };

        self.last = Some(out);
        out
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn name(&self) -> &str {
        "ExponentialFilter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_filter() {
        let mut filter = ExponentialFilter::new(0.5);

        // First value passes through
        let (x1, y1) = filter.apply(10.0, 20.0);
        assert_eq!(x1, 10.0);
        assert_eq!(y1, 20.0);

        // Second value is smoothed
        let (x2, y2) = filter.apply(20.0, 30.0);
        assert_eq!(x2, 15.0); // 0.5 * 10 + 0.5 * 20
        assert_eq!(y2, 25.0);
    }

    #[test]
    fn test_alpha_weights_previous() {
        // High alpha = more smoothing
        let mut heavy = ExponentialFilter::new(0.9);
        heavy.apply(10.0, 20.0);
        let (x, _) = heavy.apply(20.0, 30.0);
        assert!((x - 11.0).abs() < 0.001); // 0.9 * 10 + 0.1 * 20

        // Low alpha = less smoothing
        let mut light = ExponentialFilter::new(0.1);
        light.apply(10.0, 20.0);
        let (x, _) = light.apply(20.0, 30.0);
        assert!((x - 19.0).abs() < 0.001); // 0.1 * 10 + 0.9 * 20
    }

    #[test]
    fn test_reset_reseeds() {
        let mut filter = ExponentialFilter::new(0.7);
        filter.apply(0.0, 0.0);
        filter.reset();
        assert_eq!(filter.apply(0.8, 0.2), (0.8, 0.2));
    }

    #[test]
    #[should_panic(expected = "Alpha must be in [0, 1)")]
    fn test_alpha_one_rejected() {
        let _ = ExponentialFilter::new(1.0);
    }
}
