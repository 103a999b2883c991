use enough::{Stop, Unstoppable};
use ss_core::{Error, PixelBuffer};
use ss_filter::{GaussianKernel, SeparableConvolver};
use tracing::{debug, debug_span, instrument};

use crate::resample::resample;

/// Number of blurred images per octave.
pub const SCALES_PER_OCTAVE: usize = 5;

/// Number of Difference-of-Gaussian images per octave.
pub const DOGS_PER_OCTAVE: usize = SCALES_PER_OCTAVE - 1;

/// Conventional base blur.
pub const DEFAULT_SIGMA: f32 = 1.6;

/// Requested number of octaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OctaveCount {
    /// `floor(log2(min(width, height))) - 1`, at least 1.
    #[default]
    Auto,
    /// Exactly this many octaves. Must be non-zero.
    Fixed(usize),
}

impl OctaveCount {
    /// Resolves the request against a source image size.
    pub fn resolve(self, width: usize, height: usize) -> Result<usize, Error> {
        match self {
            OctaveCount::Fixed(0) => Err(Error::InvalidParameter("octave count must be > 0")),
            OctaveCount::Fixed(n) if n > max_octave_count(width, height) => Err(
                Error::InvalidParameter("octave count would shrink an octave below 1x1"),
            ),
            OctaveCount::Fixed(n) => Ok(n),
            OctaveCount::Auto => Ok(auto_octave_count(width, height)),
        }
    }
}

impl From<usize> for OctaveCount {
    fn from(n: usize) -> Self {
        OctaveCount::Fixed(n)
    }
}

/// `floor(log2(min(width, height))) - 1`, clamped to at least 1.
pub fn auto_octave_count(width: usize, height: usize) -> usize {
    let min_dim = width.min(height);
    if min_dim == 0 {
        return 1;
    }
    (min_dim.ilog2() as usize).saturating_sub(1).max(1)
}

/// Largest octave count whose last octave is still at least 1x1:
/// `floor(log2(min(width, height))) + 1`, or 0 for an empty extent.
pub fn max_octave_count(width: usize, height: usize) -> usize {
    let min_dim = width.min(height);
    if min_dim == 0 {
        return 0;
    }
    min_dim.ilog2() as usize + 1
}

/// Scale-space construction parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSpaceConfig {
    pub octaves: OctaveCount,
    /// Standard deviation of the Gaussian applied between consecutive levels.
    pub sigma: f32,
}

impl Default for ScaleSpaceConfig {
    fn default() -> Self {
        Self {
            octaves: OctaveCount::Auto,
            sigma: DEFAULT_SIGMA,
        }
    }
}

impl ScaleSpaceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_octaves(mut self, octaves: impl Into<OctaveCount>) -> Self {
        self.octaves = octaves.into();
        self
    }

    pub fn with_sigma(mut self, sigma: f32) -> Self {
        self.sigma = sigma;
        self
    }
}

/// One resolution of the pyramid: [`SCALES_PER_OCTAVE`] blurred images and
/// [`DOGS_PER_OCTAVE`] differences, all of identical dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Octave {
    index: usize,
    scales: Vec<PixelBuffer>,
    dogs: Vec<PixelBuffer>,
}

impl Octave {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Size of one octave pixel in base-image pixels (`2^index`).
    pub fn scale_factor(&self) -> f32 {
        2.0f32.powi(self.index as i32)
    }

    /// `(width, height)` shared by every image in the octave.
    pub fn dimensions(&self) -> (usize, usize) {
        self.scales[0].dimensions()
    }

    pub fn scale_images(&self) -> &[PixelBuffer] {
        &self.scales
    }

    pub fn dog_images(&self) -> &[PixelBuffer] {
        &self.dogs
    }

    pub fn scale_image(&self, level: usize) -> Option<&PixelBuffer> {
        self.scales.get(level)
    }

    pub fn dog_image(&self, index: usize) -> Option<&PixelBuffer> {
        self.dogs.get(index)
    }
}

/// Difference-of-Gaussian scale-space pyramid.
///
/// Within an octave, level 0 is the octave input blurred once with the base
/// kernel and every further level blurs the previous one with the same
/// kernel, so level `i` carries an effective blur of `sigma * sqrt(i + 1)`
/// relative to the octave input. Octave `o + 1` takes the last level of octave
/// `o`, decimated by 2 in both axes, as its input.
///
/// The pyramid is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSpacePyramid {
    sigma: f32,
    octaves: Vec<Octave>,
}

impl ScaleSpacePyramid {
    pub fn build(
        image: &PixelBuffer,
        octaves: OctaveCount,
        sigma: f32,
    ) -> Result<Self, Error> {
        Self::build_with_stop(image, octaves, sigma, &Unstoppable)
    }

    pub fn build_with_config(image: &PixelBuffer, config: &ScaleSpaceConfig) -> Result<Self, Error> {
        Self::build(image, config.octaves, config.sigma)
    }

    /// Like [`ScaleSpacePyramid::build`], polling `stop` before every octave.
    ///
    /// A triggered stop token aborts with [`Error::Cancelled`] and discards
    /// all octaves built so far.
    #[instrument(
        level = "debug",
        skip(image, stop),
        fields(width = image.width(), height = image.height(), channels = image.channels())
    )]
    pub fn build_with_stop(
        image: &PixelBuffer,
        octaves: OctaveCount,
        sigma: f32,
        stop: &dyn Stop,
    ) -> Result<Self, Error> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::InvalidParameter("sigma must be > 0 and finite"));
        }
        let (width, height, channels) = image.shape();
        if width == 0 || height == 0 || channels == 0 {
            return Err(Error::InvalidParameter(
                "source image must have at least one pixel and one channel",
            ));
        }

        let octave_count = octaves.resolve(width, height)?;
        let kernel = GaussianKernel::new(sigma)?;
        debug!(
            octave_count,
            radius = kernel.radius(),
            "building scale-space pyramid"
        );

        let mut conv = SeparableConvolver::new();
        let mut built = Vec::with_capacity(octave_count);
        let mut seed: Option<PixelBuffer> = None;

        for index in 0..octave_count {
            stop.check().map_err(|_| Error::Cancelled)?;
            let _span = debug_span!("octave", index).entered();

            let input = seed.as_ref().unwrap_or(image);
            let octave = build_octave(index, &kernel, &mut conv, input)?;
            let (ow, oh) = octave.dimensions();
            debug!(width = ow, height = oh, "octave built");

            if index + 1 < octave_count {
                seed = Some(resample(&octave.scales[SCALES_PER_OCTAVE - 1], 2.0, 2.0)?);
            }
            built.push(octave);
        }

        Ok(Self {
            sigma,
            octaves: built,
        })
    }

    pub fn base_sigma(&self) -> f32 {
        self.sigma
    }

    pub fn octave_count(&self) -> usize {
        self.octaves.len()
    }

    pub fn octaves(&self) -> &[Octave] {
        &self.octaves
    }

    pub fn octave(&self, octave: usize) -> Option<&Octave> {
        self.octaves.get(octave)
    }

    pub fn scale_image(&self, octave: usize, level: usize) -> Option<&PixelBuffer> {
        self.octave(octave)?.scale_image(level)
    }

    pub fn dog_image(&self, octave: usize, index: usize) -> Option<&PixelBuffer> {
        self.octave(octave)?.dog_image(index)
    }

    pub fn octave_dimensions(&self, octave: usize) -> Option<(usize, usize)> {
        self.octave(octave).map(Octave::dimensions)
    }

    /// Accumulated blur of a scale image, in base-image pixels.
    ///
    /// Variance is tracked in octave-local pixels: each blur adds `sigma^2`
    /// and decimation by 2 divides it by 4. The result is rescaled by
    /// [`Octave::scale_factor`].
    pub fn effective_sigma(&self, octave: usize, level: usize) -> Option<f32> {
        let oct = self.octave(octave)?;
        if level >= SCALES_PER_OCTAVE {
            return None;
        }

        let s2 = f64::from(self.sigma) * f64::from(self.sigma);
        let mut base_var = s2;
        for _ in 0..octave {
            let last_var = base_var + (SCALES_PER_OCTAVE - 1) as f64 * s2;
            base_var = last_var / 4.0 + s2;
        }
        let var = base_var + level as f64 * s2;
        Some((var.sqrt() as f32) * oct.scale_factor())
    }
}

fn build_octave(
    index: usize,
    kernel: &GaussianKernel,
    conv: &mut SeparableConvolver,
    input: &PixelBuffer,
) -> Result<Octave, Error> {
    let mut scales = Vec::with_capacity(SCALES_PER_OCTAVE);
    let mut current = conv.convolve(kernel, input)?;
    for _ in 1..SCALES_PER_OCTAVE {
        let next = conv.convolve(kernel, &current)?;
        scales.push(current);
        current = next;
    }
    scales.push(current);

    let dogs = scales
        .windows(2)
        .map(|pair| pair[1].difference(&pair[0]))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Octave {
        index,
        scales,
        dogs,
    })
}
