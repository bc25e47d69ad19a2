use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use atomic_float::AtomicF32;

use crate::dsp::oscillator::Waveform;

/*
Lock-Free Parameters
====================

The control thread (UI, automation) writes parameters while the audio thread
reads them between samples. Each parameter is an independent atomic scalar:

  - no locks, no queues, nothing that can block the audio callback
  - every read sees a whole value (an f32 is never torn)
  - a read may be one block stale, which is inaudible

All accesses use `Relaxed` ordering: the parameters are independent of each
other, so there is no cross-parameter consistency to order.
*/

pub const MIN_GAIN_DB: f32 = -24.0;
pub const MAX_GAIN_DB: f32 = 24.0;
pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;

/// Convert decibels to a linear amplitude factor.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Read-only view of the parameters a voice polls while rendering.
///
/// Implementations must be cheap and must never block: they are called from
/// the audio thread.
pub trait ParamSource: Send + Sync {
    fn selected_waveform(&self) -> Waveform;

    /// Master gain as a linear factor.
    fn gain_linear(&self) -> f32;

    fn cutoff_low_hz(&self) -> f32;

    fn cutoff_high_hz(&self) -> f32;
}

impl<P: ParamSource + ?Sized> ParamSource for Arc<P> {
    fn selected_waveform(&self) -> Waveform {
        (**self).selected_waveform()
    }

    fn gain_linear(&self) -> f32 {
        (**self).gain_linear()
    }

    fn cutoff_low_hz(&self) -> f32 {
        (**self).cutoff_low_hz()
    }

    fn cutoff_high_hz(&self) -> f32 {
        (**self).cutoff_high_hz()
    }
}

/// Shared synthesizer parameters, written by the control thread.
///
/// Wrap in an [`Arc`] and hand clones to every voice.
pub struct SynthParams {
    waveform: AtomicU8,
    gain_db: AtomicF32,
    gain_linear: AtomicF32,
    cutoff_low_hz: AtomicF32,
    cutoff_high_hz: AtomicF32,
}

impl SynthParams {
    pub fn new() -> Self {
        Self {
            waveform: AtomicU8::new(Waveform::Sine.index()),
            gain_db: AtomicF32::new(0.0),
            gain_linear: AtomicF32::new(1.0),
            cutoff_low_hz: AtomicF32::new(1_000.0),
            cutoff_high_hz: AtomicF32::new(MAX_CUTOFF_HZ),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform.index(), Ordering::Relaxed);
    }

    /// Set the master gain in decibels, clamped to ±24 dB. Non-finite values are ignored.
    pub fn set_gain_db(&self, db: f32) {
        if !db.is_finite() {
            return;
        }
        let db = db.clamp(MIN_GAIN_DB, MAX_GAIN_DB);
        self.gain_db.store(db, Ordering::Relaxed);
        self.gain_linear.store(db_to_linear(db), Ordering::Relaxed);
    }

    pub fn gain_db(&self) -> f32 {
        self.gain_db.load(Ordering::Relaxed)
    }

    /// Set the lower cutoff, clamped to 20 Hz..20 kHz. Non-finite values are ignored.
    pub fn set_cutoff_low_hz(&self, hz: f32) {
        if hz.is_finite() {
            self.cutoff_low_hz
                .store(hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ), Ordering::Relaxed);
        }
    }

    /// Set the upper cutoff, clamped to 20 Hz..20 kHz. Non-finite values are ignored.
    pub fn set_cutoff_high_hz(&self, hz: f32) {
        if hz.is_finite() {
            self.cutoff_high_hz
                .store(hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ), Ordering::Relaxed);
        }
    }
}

impl Default for SynthParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamSource for SynthParams {
    fn selected_waveform(&self) -> Waveform {
        Waveform::from_index(self.waveform.load(Ordering::Relaxed))
    }

    fn gain_linear(&self) -> f32 {
        self.gain_linear.load(Ordering::Relaxed)
    }

    fn cutoff_low_hz(&self) -> f32 {
        self.cutoff_low_hz.load(Ordering::Relaxed)
    }

    fn cutoff_high_hz(&self) -> f32 {
        self.cutoff_high_hz.load(Ordering::Relaxed)
    }
}
