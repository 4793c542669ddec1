//! Stereo state-variable lowpass filter.
//!
//! Topology-Preserving Transform (TPT) SVF after Zavalishin, "The Art of VA
//! Filter Design" (2012). The trapezoidal integrators keep the filter stable
//! while the cutoff is swept every sample by an envelope.
//!
//! Each voice owns one [`StereoSvf`]: the left and right channels share the
//! cutoff/resonance coefficients but keep separate integrator state.
//!
//! # Reference
//!
//! Zavalishin, "The Art of VA Filter Design", rev. 2.1.2 (2018), Chapter 3.

use core::f32::consts::PI;
use libm::tanf;

use crate::flush_denormal;

/// Lowest cutoff frequency the filter accepts (Hz).
pub const MIN_CUTOFF: f32 = 20.0;

/// Highest cutoff frequency the filter accepts regardless of sample rate (Hz).
pub const MAX_CUTOFF: f32 = 20_000.0;

/// Resonance bounds. Low values give a strong peak and near self-oscillation.
pub const RESONANCE_RANGE: (f32, f32) = (0.05, 20.0);

/// Two-channel, two-pole (12 dB/oct) TPT lowpass.
///
/// ## Parameters
///
/// - `cutoff`: Hz, clamped to `[20, min(20000, sample_rate × 0.49)]`
/// - `resonance`: Q factor, clamped to `[0.05, 20]`, `k = 1 / Q`
///
/// # Example
///
/// ```rust
/// use crypt_core::StereoSvf;
///
/// let mut svf = StereoSvf::new(48000.0);
/// svf.set_params(1000.0, 0.707);
///
/// let (l, r) = svf.process_stereo(0.5, -0.5);
/// assert!(l > 0.0 && r < 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct StereoSvf {
    // Integrator state, one pair per channel
    ic1eq: [f32; 2],
    ic2eq: [f32; 2],

    // Coefficients
    g: f32,
    k: f32,

    sample_rate: f32,
    cutoff: f32,
    resonance: f32,
}

impl Default for StereoSvf {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl StereoSvf {
    /// Create a filter at `sample_rate`, fully open with Q = 0.707.
    pub fn new(sample_rate: f32) -> Self {
        let mut svf = Self {
            ic1eq: [0.0; 2],
            ic2eq: [0.0; 2],
            g: 0.0,
            k: 0.0,
            sample_rate,
            cutoff: MAX_CUTOFF,
            resonance: 0.707,
        };
        svf.cutoff = svf.clamp_cutoff(MAX_CUTOFF);
        svf.update_coefficients();
        svf
    }

    /// Highest cutoff usable at the current sample rate. Never below
    /// [`MIN_CUTOFF`], even at sample rates under ~41 Hz.
    #[inline]
    pub fn max_cutoff(&self) -> f32 {
        MAX_CUTOFF.min(self.sample_rate * 0.49).max(MIN_CUTOFF)
    }

    /// Clamp a cutoff frequency to the usable range.
    #[inline]
    pub fn clamp_cutoff(&self, freq: f32) -> f32 {
        if freq.is_nan() {
            return self.max_cutoff();
        }
        freq.clamp(MIN_CUTOFF, self.max_cutoff())
    }

    /// Set cutoff and resonance together.
    ///
    /// Coefficients are only recomputed when either value changed, so
    /// calling this every sample with a static cutoff is cheap.
    #[inline]
    pub fn set_params(&mut self, cutoff: f32, resonance: f32) {
        let cutoff = self.clamp_cutoff(cutoff);
        let resonance = if resonance.is_nan() {
            self.resonance
        } else {
            resonance.clamp(RESONANCE_RANGE.0, RESONANCE_RANGE.1)
        };
        if cutoff != self.cutoff || resonance != self.resonance {
            self.cutoff = cutoff;
            self.resonance = resonance;
            self.update_coefficients();
        }
    }

    /// Set cutoff frequency in Hz.
    pub fn set_cutoff(&mut self, freq: f32) {
        self.set_params(freq, self.resonance);
    }

    /// Current cutoff frequency in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Set resonance (Q factor).
    pub fn set_resonance(&mut self, q: f32) {
        self.set_params(self.cutoff, q);
    }

    /// Current resonance.
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Change sample rate, re-clamping the cutoff.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.cutoff = self.clamp_cutoff(self.cutoff);
        self.update_coefficients();
    }

    /// Clear both channels' integrators.
    pub fn reset(&mut self) {
        self.ic1eq = [0.0; 2];
        self.ic2eq = [0.0; 2];
    }

    fn update_coefficients(&mut self) {
        self.g = tanf(PI * self.cutoff / self.sample_rate);
        self.k = 1.0 / self.resonance;
    }

    /// Process one sample on `channel` (0 = left, 1 = right) and return
    /// the lowpass output.
    #[inline]
    pub fn process_channel(&mut self, channel: usize, input: f32) -> f32 {
        let ic1 = self.ic1eq[channel];
        let ic2 = self.ic2eq[channel];

        let v3 = input - ic2;
        let v1 = (self.g * v3 + ic1) / (1.0 + self.g * (self.g + self.k));
        let v2 = ic2 + self.g * v1;

        self.ic1eq[channel] = flush_denormal(2.0 * v1 - ic1);
        self.ic2eq[channel] = flush_denormal(2.0 * v2 - ic2);

        v2
    }

    /// Process a stereo frame.
    #[inline]
    pub fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        (self.process_channel(0, left), self.process_channel(1, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rms_at(freq: f32, svf: &mut StereoSvf, sample_rate: f32) -> f32 {
        svf.reset();
        let n = 4800;
        let mut sum = 0.0;
        for i in 0..n {
            let x = libm::sinf(2.0 * PI * freq * i as f32 / sample_rate);
            let (y, _) = svf.process_stereo(x, x);
            if i >= n / 2 {
                sum += y * y;
            }
        }
        libm::sqrtf(sum / (n / 2) as f32)
    }

    #[test]
    fn test_lowpass_attenuates_highs() {
        let sr = 48000.0;
        let mut svf = StereoSvf::new(sr);
        svf.set_params(500.0, 0.707);

        let low = rms_at(100.0, &mut svf, sr);
        let high = rms_at(8000.0, &mut svf, sr);
        assert!(low > 0.6, "passband rms {low}");
        assert!(high < 0.05, "stopband rms {high}");
    }

    #[test]
    fn test_dc_passes_at_unity() {
        let mut svf = StereoSvf::new(48000.0);
        svf.set_params(1000.0, 1.0);
        let mut y = 0.0;
        for _ in 0..10_000 {
            y = svf.process_channel(0, 1.0);
        }
        assert!((y - 1.0).abs() < 1e-3, "dc gain {y}");
    }

    #[test]
    fn test_channels_are_independent() {
        let mut svf = StereoSvf::new(48000.0);
        svf.set_params(2000.0, 1.0);
        for _ in 0..100 {
            let (_, r) = svf.process_stereo(1.0, 0.0);
            assert_eq!(r, 0.0);
        }
    }

    #[test]
    fn test_cutoff_clamped_below_nyquist() {
        let mut svf = StereoSvf::new(22050.0);
        svf.set_cutoff(20_000.0);
        assert!(svf.cutoff() <= 22050.0 * 0.49);
        svf.set_cutoff(1.0);
        assert_eq!(svf.cutoff(), MIN_CUTOFF);
        svf.set_cutoff(f32::NAN);
        assert_eq!(svf.cutoff(), svf.max_cutoff());
    }

    #[test]
    fn test_tiny_sample_rate_does_not_panic() {
        let mut svf = StereoSvf::new(30.0);
        assert_eq!(svf.max_cutoff(), MIN_CUTOFF);
        svf.set_cutoff(5000.0);
        assert_eq!(svf.cutoff(), MIN_CUTOFF);
        svf.set_sample_rate(10.0);
        assert_eq!(svf.cutoff(), MIN_CUTOFF);
    }

    #[test]
    fn test_nan_resonance_keeps_previous() {
        let mut svf = StereoSvf::new(48000.0);
        svf.set_params(1000.0, 2.0);
        svf.set_resonance(f32::NAN);
        assert_eq!(svf.resonance(), 2.0);
        let (l, _) = svf.process_stereo(1.0, 1.0);
        assert!(l.is_finite());
    }

    #[test]
    fn test_high_resonance_stays_finite() {
        let mut svf = StereoSvf::new(48000.0);
        svf.set_params(1000.0, RESONANCE_RANGE.1);
        for i in 0..48_000 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            let (l, r) = svf.process_stereo(x, x);
            assert!(l.is_finite() && r.is_finite());
        }
    }
}
