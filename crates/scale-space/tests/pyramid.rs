use enough::{Stop, StopReason};
use scale_space::{
    DOGS_PER_OCTAVE, Error, GaussianKernel, OctaveCount, PixelBuffer, SCALES_PER_OCTAVE,
    ScaleSpaceConfig, ScaleSpacePyramid, convolve_separable, resample,
};

fn checkerboard(width: usize, height: usize, cell: usize) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, 1, |x, y, _| {
        if (x / cell + y / cell) % 2 == 0 {
            1.0
        } else {
            0.0
        }
    })
    .expect("checkerboard")
}

fn variance(img: &PixelBuffer) -> f64 {
    let n = img.len() as f64;
    let mean = img.data().iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    img.data()
        .iter()
        .map(|&v| (f64::from(v) - mean).powi(2))
        .sum::<f64>()
        / n
}

#[test]
fn three_octaves_halve_dimensions() {
    let img = checkerboard(256, 256, 8);
    let pyr = ScaleSpacePyramid::build(&img, OctaveCount::Fixed(3), 1.6).expect("build");

    assert_eq!(pyr.octave_count(), 3);
    for (o, side) in [(0, 256), (1, 128), (2, 64)] {
        assert_eq!(pyr.octave_dimensions(o), Some((side, side)));
        let octave = pyr.octave(o).expect("octave");
        assert_eq!(octave.scale_images().len(), SCALES_PER_OCTAVE);
        assert_eq!(octave.dog_images().len(), DOGS_PER_OCTAVE);
        for img in octave.scale_images().iter().chain(octave.dog_images()) {
            assert_eq!(img.shape(), (side, side, 1));
        }
    }
    assert!(pyr.octave_dimensions(3).is_none());
    assert!(pyr.scale_image(0, SCALES_PER_OCTAVE).is_none());
    assert!(pyr.dog_image(0, DOGS_PER_OCTAVE).is_none());
}

#[test]
fn dog_is_exact_difference_of_adjacent_levels() {
    let img = checkerboard(97, 61, 5);
    let pyr = ScaleSpacePyramid::build(&img, OctaveCount::Fixed(3), 1.6).expect("build");

    for o in 0..pyr.octave_count() {
        for i in 0..DOGS_PER_OCTAVE {
            let lo = pyr.scale_image(o, i).expect("level");
            let hi = pyr.scale_image(o, i + 1).expect("level");
            let dog = pyr.dog_image(o, i).expect("dog");
            for ((&d, &a), &b) in dog.data().iter().zip(hi.data()).zip(lo.data()) {
                assert_eq!(d, a - b);
            }
        }
    }
}

#[test]
fn octave_seed_is_decimated_last_level() {
    let img = checkerboard(64, 64, 4);
    let sigma = 1.6;
    let pyr = ScaleSpacePyramid::build(&img, OctaveCount::Fixed(2), sigma).expect("build");
    let kernel = GaussianKernel::new(sigma).expect("kernel");

    let seed = resample(pyr.scale_image(0, SCALES_PER_OCTAVE - 1).expect("level"), 2.0, 2.0)
        .expect("decimate");
    let expected = convolve_separable(&kernel, &seed).expect("blur");
    assert_eq!(pyr.scale_image(1, 0), Some(&expected));
}

#[test]
fn blur_is_monotone_within_octave() {
    let img = checkerboard(80, 80, 3);
    let pyr = ScaleSpacePyramid::build(&img, OctaveCount::Fixed(2), 1.6).expect("build");

    for octave in pyr.octaves() {
        let vars: Vec<f64> = octave.scale_images().iter().map(variance).collect();
        for pair in vars.windows(2) {
            assert!(pair[1] < pair[0], "{vars:?}");
        }
    }
}

#[test]
fn constant_image_stays_constant_everywhere() {
    let img = PixelBuffer::new_fill(40, 30, 3, 0.42).expect("constant");
    let pyr = ScaleSpacePyramid::build_with_config(&img, &ScaleSpaceConfig::default())
        .expect("build");

    for octave in pyr.octaves() {
        for level in octave.scale_images() {
            assert!(level.data().iter().all(|v| (v - 0.42).abs() < 1e-5));
        }
        for dog in octave.dog_images() {
            assert!(dog.data().iter().all(|v| v.abs() < 1e-5));
        }
    }
}

#[test]
fn auto_octaves_follow_smaller_side() {
    let img = PixelBuffer::new(640, 480, 1).expect("buffer");
    let pyr = ScaleSpacePyramid::build(&img, OctaveCount::Auto, 1.6).expect("build");
    assert_eq!(pyr.octave_count(), 7);
    assert_eq!(pyr.octave_dimensions(6), Some((10, 7)));

    let tiny = PixelBuffer::new(3, 3, 1).expect("buffer");
    let pyr = ScaleSpacePyramid::build(&tiny, OctaveCount::Auto, 1.6).expect("build");
    assert_eq!(pyr.octave_count(), 1);
}

#[test]
fn invalid_requests_are_rejected() {
    let img = checkerboard(16, 16, 2);
    for sigma in [0.0, -1.0, f32::NAN, f32::INFINITY] {
        assert!(matches!(
            ScaleSpacePyramid::build(&img, OctaveCount::Auto, sigma),
            Err(Error::InvalidParameter(_))
        ));
    }
    assert!(matches!(
        ScaleSpacePyramid::build(&img, OctaveCount::Fixed(0), 1.6),
        Err(Error::InvalidParameter(_))
    ));
    assert!(matches!(
        ScaleSpacePyramid::build(&img, OctaveCount::Fixed(6), 1.6),
        Err(Error::InvalidParameter(_))
    ));
    assert!(ScaleSpacePyramid::build(&PixelBuffer::empty(), OctaveCount::Auto, 1.6).is_err());
}

#[test]
fn repeated_builds_are_bit_identical() {
    let img = PixelBuffer::from_fn(50, 37, 2, |x, y, c| {
        ((x * 31 + y * 17 + c * 7) % 23) as f32 / 22.0
    })
    .expect("buffer");
    let config = ScaleSpaceConfig::new()
        .with_octaves(OctaveCount::Fixed(3))
        .with_sigma(1.2);
    let a = ScaleSpacePyramid::build_with_config(&img, &config).expect("build");
    let b = ScaleSpacePyramid::build_with_config(&img, &config).expect("build");
    assert_eq!(a, b);
}

struct AlreadyStopped;

impl Stop for AlreadyStopped {
    fn check(&self) -> Result<(), StopReason> {
        Err(StopReason::Cancelled)
    }
}

#[test]
fn stop_token_cancels_build() {
    let img = checkerboard(32, 32, 4);
    let err = ScaleSpacePyramid::build_with_stop(&img, OctaveCount::Auto, 1.6, &AlreadyStopped)
        .unwrap_err();
    assert_eq!(err, Error::Cancelled);
}

#[test]
fn effective_sigma_tracks_octave_resampling() {
    let img = checkerboard(64, 64, 4);
    let sigma = 1.6f32;
    let pyr = ScaleSpacePyramid::build(&img, OctaveCount::Fixed(2), sigma).expect("build");

    let s0 = pyr.effective_sigma(0, 0).expect("level");
    let s4 = pyr.effective_sigma(0, 4).expect("level");
    assert!((s0 - sigma).abs() < 1e-5);
    assert!((s4 - sigma * 5f32.sqrt()).abs() < 1e-5);
    assert!(pyr.effective_sigma(1, 0).expect("level") > s4);
    assert!(pyr.effective_sigma(2, 0).is_none());
}
