//! Low Frequency Oscillator for modulation effects.
//!
//! Drives the phaser's allpass sweep.

use core::f32::consts::TAU;
use libm::sinf;

/// Sine LFO using phase accumulation.
///
/// Output range is `[-1.0, 1.0]`; phase is kept in `[0.0, 1.0)`.
///
/// # Example
///
/// ```rust
/// use crypt_core::Lfo;
///
/// let mut lfo = Lfo::new(44100.0, 2.0);
/// let value = lfo.next();
/// assert_eq!(value, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    /// Sample rate in Hz
    sample_rate: f32,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(48000.0, 1.0)
    }
}

impl Lfo {
    /// Create new LFO with given sample rate and frequency
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: freq_hz / sample_rate,
            sample_rate,
        }
    }

    /// Set frequency in Hz
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.phase_inc = freq_hz / self.sample_rate;
    }

    /// Current frequency in Hz
    pub fn frequency(&self) -> f32 {
        self.phase_inc * self.sample_rate
    }

    /// Reset phase to 0
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Current phase (0.0 - 1.0)
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Return the current value and advance by one sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let output = sinf(self.phase * TAU);
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        output
    }

    /// Set sample rate, keeping the frequency in Hz.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let freq = self.frequency();
        self.sample_rate = sample_rate;
        self.set_frequency(freq);
    }
}
