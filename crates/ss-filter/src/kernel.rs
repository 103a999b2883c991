use ss_core::Error;

/// Normalized 1D Gaussian kernel for separable blurring.
///
/// Conventions:
/// - `radius = max(ceil(3*sigma), 1)`, so the kernel is truncated at about
///   3 sigma.
/// - `taps.len() == 2*radius + 1`; tap `i` sits at offset `i - radius`.
/// - Taps are divided by their unnormalized sum, so `sum(taps) ~= 1` and a
///   constant signal passes through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    sigma: f32,
    radius: usize,
    taps: Vec<f32>,
}

impl GaussianKernel {
    pub fn new(sigma: f32) -> Result<Self, Error> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::InvalidParameter("sigma must be > 0 and finite"));
        }

        let radius = ((3.0 * sigma).ceil() as usize).max(1);
        let len = 2 * radius + 1;

        // Accumulate in f64; taps are rounded to f32 only after normalization.
        let sigma2 = f64::from(sigma) * f64::from(sigma);
        let weights: Vec<f64> = (0..len)
            .map(|i| {
                let x = (i as isize - radius as isize) as f64;
                (-(x * x) / (2.0 * sigma2)).exp()
            })
            .collect();

        let sum: f64 = weights.iter().sum();
        let taps = weights.iter().map(|&w| (w / sum) as f32).collect();

        Ok(Self {
            sigma,
            radius,
            taps,
        })
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn taps(&self) -> &[f32] {
        &self.taps
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}
