use std::f64::consts::PI;

/*
Windowed-Sinc FIR Low-Pass
==========================

A finite impulse response (FIR) filter computes each output as a weighted sum
of the most recent N inputs. The weights are the "taps" (coefficients); N is
the tap count.

    y[t] = c[0]·x[t] + c[1]·x[t-1] + ... + c[N-1]·x[t-(N-1)]

Nothing feeds back: the output of a single impulse is exactly the coefficient
list, then silence. The filter is unconditionally stable and has linear phase
when the taps are symmetric.


Designing the Taps
------------------

The ideal low-pass has an infinitely long impulse response, the sinc:

    fc      = cutoff_hz / sample_rate          normalized, 0 < fc < 0.5
    M       = N - 1                            N is odd, so M/2 is whole
    k       = n - M/2                          distance from the centre tap

    sinc(k) = 2·fc                             k == 0
              sin(2π·fc·k) / (π·k)             otherwise

Truncating it to N taps would ring badly, so each tap is multiplied by a
Hamming window that tapers smoothly to ~0.08 at the edges:

    w(n)    = 0.54 - 0.46·cos(2π·n / M)
            = 0.54 + 0.46·cos(2π·k / M)        same thing, centred on k

    c[n]    = sinc(k) · w(n)

The centred form is used because cos(x) == cos(-x), which keeps the kernel
exactly symmetric: c[n] == c[N-1-n].

The DC gain is Σc, close to (but not exactly) 1.0; a lower cutoff or fewer
taps drifts further from unity.


Band-Pass From Two Low-Passes
-----------------------------

Subtracting a low-pass at the lower edge from a low-pass at the upper edge
leaves only the band between them:

    band[n] = lowpass(high)[n] - lowpass(low)[n]

Same tap count, same cost per sample.


The Circular History
--------------------

The last N inputs live in a ring buffer. `write_index` is the slot the next
input overwrites; after writing, the newest sample sits at `write_index` and
older ones sit to its left, wrapping around the end:

    history:  [ x-2 | x-1 | x0 | x-6 | x-5 | x-4 | x-3 ]
                             ^ write_index

    c[0]..c[2]  pair with  history[write_index..=0]   walking left
    c[3]..c[6]  pair with  history[N-1..write_index]  walking left from the end

Splitting the ring at the write position turns the walk into two plain slice
iterators: no modulo per tap, no allocation.


Degenerate Cutoffs
------------------

Cutoffs at or beyond Nyquist are clamped just below it, and cutoffs at or
below zero produce an all-zero kernel (silence). A non-finite cutoff is
ignored and the previous taps stay in place. Nothing here can put NaN or
infinity into the output.
*/

/// Highest normalized cutoff the designer will accept (just below Nyquist).
pub const MAX_NORMALIZED_CUTOFF: f64 = 0.499;

/// Tap count used by the reference voice.
pub const DEFAULT_TAP_COUNT: usize = 101;

/// The response the current coefficients implement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FirResponse {
    LowPass { cutoff_hz: f32 },
    BandPass { low_hz: f32, high_hz: f32 },
}

fn normalized_cutoff(cutoff_hz: f32, sample_rate: f64) -> f64 {
    (cutoff_hz as f64 / sample_rate).clamp(0.0, MAX_NORMALIZED_CUTOFF)
}

/// Hamming-windowed sinc low-pass tap `n` of a kernel with `M = taps - 1`.
#[inline]
fn lowpass_tap(n: usize, taps: usize, fc: f64) -> f64 {
    let m = (taps - 1) as f64;
    let k = n as f64 - m / 2.0;

    let sinc = if k == 0.0 {
        2.0 * fc
    } else {
        (2.0 * PI * fc * k).sin() / (PI * k)
    };
    let window = 0.54 + 0.46 * (2.0 * PI * k / m).cos();

    sinc * window
}

/// Fill `taps` with a Hamming-windowed sinc low-pass at normalized cutoff `fc`.
///
/// `fc` is clamped into `[0, MAX_NORMALIZED_CUTOFF]`.
pub fn design_lowpass(taps: &mut [f32], fc: f64) {
    let len = taps.len();
    assert!(len >= 3, "FIR kernel needs at least 3 taps, got {len}");

    let fc = fc.clamp(0.0, MAX_NORMALIZED_CUTOFF);
    for (n, tap) in taps.iter_mut().enumerate() {
        *tap = lowpass_tap(n, len, fc) as f32;
    }
}

/// Fill `taps` with a band-pass between normalized cutoffs `low` and `high`.
///
/// An empty band (`high <= low` after clamping) yields all-zero taps.
pub fn design_bandpass(taps: &mut [f32], low: f64, high: f64) {
    let len = taps.len();
    assert!(len >= 3, "FIR kernel needs at least 3 taps, got {len}");

    let low = low.clamp(0.0, MAX_NORMALIZED_CUTOFF);
    let high = high.clamp(0.0, MAX_NORMALIZED_CUTOFF);
    if high <= low {
        taps.fill(0.0);
        return;
    }

    for (n, tap) in taps.iter_mut().enumerate() {
        *tap = (lowpass_tap(n, len, high) - lowpass_tap(n, len, low)) as f32;
    }
}

/// Fixed-length FIR filter with a circular input history.
///
/// Storage for the taps and the history is allocated once in [`FirFilter::new`];
/// retuning and processing never allocate.
pub struct FirFilter {
    sample_rate: f64,
    response: FirResponse,
    coefficients: Vec<f32>,
    history: Vec<f32>,
    write_index: usize,
}

impl FirFilter {
    /// Create a low-pass filter at 1 kHz.
    ///
    /// # Panics
    ///
    /// If `tap_count` is below 3 or even, or `sample_rate` is not a positive
    /// finite number. These are construction-time programmer errors.
    pub fn new(tap_count: usize, sample_rate: f32) -> Self {
        assert!(tap_count >= 3, "FIR filter needs at least 3 taps, got {tap_count}");
        assert!(
            tap_count % 2 == 1,
            "FIR filter needs an odd tap count for a centred kernel, got {tap_count}"
        );
        assert!(
            sample_rate.is_finite() && sample_rate > 0.0,
            "FIR filter sample rate must be positive, got {sample_rate}"
        );

        log::debug!("FIR filter: {tap_count} taps at {sample_rate} Hz");

        let mut filter = Self {
            sample_rate: sample_rate as f64,
            response: FirResponse::LowPass { cutoff_hz: 1_000.0 },
            coefficients: vec![0.0; tap_count],
            history: vec![0.0; tap_count],
            write_index: 0,
        };
        filter.set_cutoff(1_000.0);
        filter
    }

    /// Redesign the taps as a low-pass at `cutoff_hz`.
    ///
    /// Realtime-safe. Non-finite cutoffs are ignored.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        if !cutoff_hz.is_finite() {
            return;
        }

        let fc = normalized_cutoff(cutoff_hz, self.sample_rate);
        design_lowpass(&mut self.coefficients, fc);
        self.response = FirResponse::LowPass {
            cutoff_hz: (fc * self.sample_rate) as f32,
        };
    }

    /// Redesign the taps as a band-pass between `low_hz` and `high_hz`.
    ///
    /// Realtime-safe. Non-finite edges are ignored.
    pub fn set_band(&mut self, low_hz: f32, high_hz: f32) {
        if !(low_hz.is_finite() && high_hz.is_finite()) {
            return;
        }

        let low = normalized_cutoff(low_hz, self.sample_rate);
        let high = normalized_cutoff(high_hz, self.sample_rate);
        design_bandpass(&mut self.coefficients, low, high);
        self.response = FirResponse::BandPass {
            low_hz: (low * self.sample_rate) as f32,
            high_hz: (high * self.sample_rate) as f32,
        };
    }

    /// Push one input sample and return the filtered output.
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        self.history[self.write_index] = input;

        let (recent, wrapped) = self.history.split_at(self.write_index + 1);
        let newest_first = recent.iter().rev().chain(wrapped.iter().rev());
        let output: f32 = self
            .coefficients
            .iter()
            .zip(newest_first)
            .map(|(c, x)| c * x)
            .sum();

        self.write_index += 1;
        if self.write_index == self.history.len() {
            self.write_index = 0;
        }

        output
    }

    /// Filter `buffer` in place.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Filter every channel in place, one after the other, through this
    /// single filter state.
    ///
    /// Channels are not filtered independently: the history carries over from
    /// the end of one channel into the start of the next. Use one filter per
    /// channel when that matters.
    pub fn process_block<B: AsMut<[f32]>>(&mut self, channels: &mut [B]) {
        for channel in channels.iter_mut() {
            self.render(channel.as_mut());
        }
    }

    /// Clear the input history. The taps are kept.
    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.write_index = 0;
    }

    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    pub fn tap_count(&self) -> usize {
        self.coefficients.len()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate as f32
    }

    pub fn response(&self) -> FirResponse {
        self.response
    }

    /// Low-pass cutoff, or the lower band edge in band-pass mode.
    pub fn cutoff_hz(&self) -> f32 {
        match self.response {
            FirResponse::LowPass { cutoff_hz } => cutoff_hz,
            FirResponse::BandPass { low_hz, .. } => low_hz,
        }
    }

    /// Sum of the taps: the filter's gain at 0 Hz.
    pub fn dc_gain(&self) -> f32 {
        self.coefficients.iter().sum()
    }
}
