//! Frequency-domain inspection of filter kernels.
//!
//! Not realtime-safe: these helpers allocate and plan FFTs. Use them from
//! tests, tools or a UI thread.

use rustfft::{num_complex::Complex, FftPlanner};

/// Linear magnitude response of an FIR kernel.
///
/// The kernel is zero-padded to `fft_size` and transformed; bins
/// `0..=fft_size / 2` are returned (DC up to Nyquist).
///
/// # Panics
///
/// If `fft_size` is smaller than the kernel.
pub fn magnitude_response(coefficients: &[f32], fft_size: usize) -> Vec<f32> {
    assert!(
        fft_size >= coefficients.len(),
        "fft size {fft_size} is shorter than the {}-tap kernel",
        coefficients.len()
    );

    let mut buffer: Vec<Complex<f32>> = coefficients
        .iter()
        .map(|&c| Complex::new(c, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(fft_size)
        .collect();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    buffer[..=fft_size / 2].iter().map(|c| c.norm()).collect()
}

/// Centre frequency in Hz of `bin` for an FFT of `fft_size` points.
#[inline]
pub fn bin_frequency(bin: usize, fft_size: usize, sample_rate: f32) -> f32 {
    bin as f32 * sample_rate / fft_size as f32
}

/// Convert a linear magnitude to decibels, floored at -120 dB.
#[inline]
pub fn to_db(magnitude: f32) -> f32 {
    20.0 * magnitude.max(1.0e-6).log10()
}
