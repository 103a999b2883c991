//! 1D convolution along a line of samples with clamp-to-edge borders.

/// Convolves a single-channel line.
///
/// `out[i] = sum_k kernel[k] * signal[clamp(i + radius - k)]`.
pub fn convolve_f32(signal: &[f32], kernel: &[f32], radius: usize, out: &mut [f32]) {
    assert_eq!(out.len(), signal.len(), "out must match signal length");
    assert_eq!(
        kernel.len(),
        2 * radius + 1,
        "kernel len must be 2*radius+1"
    );

    if signal.is_empty() {
        return;
    }

    if signal.len() > 2 * radius {
        convolve_clamp_fast(signal, kernel, radius, out);
    } else {
        convolve_clamp_safe(signal, kernel, radius, out);
    }
}

/// Convolves a line of `channels`-interleaved pixels, each channel
/// independently.
///
/// With `channels == 1` this is [`convolve_f32`].
pub fn convolve_interleaved_f32(
    signal: &[f32],
    channels: usize,
    kernel: &[f32],
    radius: usize,
    out: &mut [f32],
) {
    assert!(channels > 0, "channels must be > 0");
    assert_eq!(out.len(), signal.len(), "out must match signal length");
    assert_eq!(
        signal.len() % channels,
        0,
        "signal length must be a multiple of channels"
    );
    assert_eq!(
        kernel.len(),
        2 * radius + 1,
        "kernel len must be 2*radius+1"
    );

    if channels == 1 {
        convolve_f32(signal, kernel, radius, out);
        return;
    }

    let n = signal.len() / channels;
    for (i, px) in out.chunks_exact_mut(channels).enumerate() {
        let interior = i >= radius && i + radius < n;
        for (c, out_c) in px.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            if interior {
                let base = i - radius;
                for (k, &kv) in kernel.iter().rev().enumerate() {
                    acc += signal[(base + k) * channels + c] * kv;
                }
            } else {
                for (k, &kv) in kernel.iter().enumerate() {
                    let idx = clamp_index(i as isize + radius as isize - k as isize, n);
                    acc += signal[idx * channels + c] * kv;
                }
            }
            *out_c = acc;
        }
    }
}

fn convolve_clamp_fast(signal: &[f32], kernel: &[f32], radius: usize, out: &mut [f32]) {
    let n = signal.len();
    let (head, rest) = out.split_at_mut(radius);
    let (interior, tail) = rest.split_at_mut(n - 2 * radius);

    for (i, out_i) in head.iter_mut().enumerate() {
        *out_i = convolve_at_clamped(signal, kernel, radius, i);
    }

    // Window `w` covers samples `i - radius ..= i + radius` for `i = w + radius`,
    // walked backwards so taps accumulate in the same order as the borders.
    for (out_i, window) in interior.iter_mut().zip(signal.windows(kernel.len())) {
        *out_i = window
            .iter()
            .rev()
            .zip(kernel)
            .fold(0.0f32, |acc, (&s, &k)| acc + s * k);
    }

    let tail_start = n - radius;
    for (j, out_i) in tail.iter_mut().enumerate() {
        *out_i = convolve_at_clamped(signal, kernel, radius, tail_start + j);
    }
}

fn convolve_clamp_safe(signal: &[f32], kernel: &[f32], radius: usize, out: &mut [f32]) {
    for (i, out_i) in out.iter_mut().enumerate() {
        *out_i = convolve_at_clamped(signal, kernel, radius, i);
    }
}

#[inline]
fn convolve_at_clamped(signal: &[f32], kernel: &[f32], radius: usize, i: usize) -> f32 {
    let n = signal.len();
    let mut acc = 0.0f32;
    for (k, &kv) in kernel.iter().enumerate() {
        let idx = clamp_index(i as isize + radius as isize - k as isize, n);
        acc += signal[idx] * kv;
    }
    acc
}

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    if i < 0 { 0 } else { (i as usize).min(len - 1) }
}
