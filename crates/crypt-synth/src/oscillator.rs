//! Unison sawtooth oscillator bank.
//!
//! Sums up to [`MAX_UNISON`] detuned sawtooth partials, each with its own
//! stereo pan position, into one stereo signal. This is the "supersaw" at
//! the heart of every voice.
//!
//! ## Detune
//!
//! Every partial holds a random coefficient `d ∈ [0, 1)` drawn when the bank
//! is triggered. Its frequency is
//!
//! ```text
//! f[i] = base * (1 + d[i] * spread - spread / 2)
//! ```
//!
//! so all partials lie within `base * (1 ± spread / 2)`. Pitch-bend and
//! spread changes reuse the stored coefficients, so a sounding note never
//! re-randomizes.
//!
//! ## Aliasing
//!
//! The sawtooth is the naive closed form `2 * phase / 2π - 1`. It aliases at
//! high pitches; the dense unison stack masks most of it.

use core::f32::consts::TAU;

/// Maximum number of unison partials per voice.
pub const MAX_UNISON: usize = 64;

/// Small xorshift generator for detune coefficients.
///
/// Deterministic per seed so renders are reproducible.
#[derive(Debug, Clone)]
struct XorShift32(u32);

impl XorShift32 {
    fn new(seed: u32) -> Self {
        // Zero is a fixed point of xorshift
        Self(if seed == 0 { 0x9E37_79B9 } else { seed })
    }

    /// Uniform value in `[0, 1)`.
    #[inline]
    fn next_f32(&mut self) -> f32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        (x >> 8) as f32 / (1u32 << 24) as f32
    }
}

/// State of one unison partial.
#[derive(Debug, Clone, Copy, Default)]
pub struct Partial {
    phase: f32,
    frequency: f32,
    increment: f32,
    pan: f32,
    detune: f32,
}

impl Partial {
    /// Phase angle in `[0, 2π)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Stereo position, -1 (left) to 1 (right).
    pub fn pan(&self) -> f32 {
        self.pan
    }

    /// Detune coefficient in `[0, 1)`.
    pub fn detune(&self) -> f32 {
        self.detune
    }
}

/// Naive sawtooth over a `[0, 2π)` phase.
#[inline]
fn saw(phase: f32) -> f32 {
    2.0 * phase / TAU - 1.0
}

/// Bank of detuned, panned sawtooth partials.
///
/// ## Parameters
/// - `unison`: active partial count (1 to 64; the synth exposes 4 to 64, default 32)
/// - `spread`: detune fraction (0.0 to 0.1, default 0.03)
/// - `shape`: saw to square blend (0.0 to 1.0, default 0.0)
///
/// # Example
///
/// ```rust
/// use crypt_synth::UnisonBank;
///
/// let mut bank = UnisonBank::new(48000.0, 1);
/// bank.set_unison(16);
/// bank.trigger(440.0);
///
/// for partial in bank.partials() {
///     assert!(partial.frequency() >= 440.0 * (1.0 - 0.015) - 1e-3);
/// }
/// let (left, right) = bank.render();
/// assert!(left.is_finite() && right.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct UnisonBank {
    partials: [Partial; MAX_UNISON],
    count: usize,
    base_frequency: f32,
    spread: f32,
    shape: f32,
    /// Loudness compensation, `3 / sqrt(4 + count)`
    gain: f32,
    sample_rate: f32,
    rng: XorShift32,
}

impl UnisonBank {
    /// Create a bank with 32 active partials at 440 Hz.
    ///
    /// `seed` selects the detune sequence; give each voice its own.
    pub fn new(sample_rate: f32, seed: u32) -> Self {
        let mut bank = Self {
            partials: [Partial::default(); MAX_UNISON],
            count: 32,
            base_frequency: 440.0,
            spread: 0.03,
            shape: 0.0,
            gain: 0.0,
            sample_rate,
            rng: XorShift32::new(seed),
        };
        bank.trigger(440.0);
        bank
    }

    /// Change sample rate, keeping phases.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_frequencies();
    }

    /// Start a new note: draw fresh detune coefficients, spread phases
    /// evenly and tune to `frequency`.
    pub fn trigger(&mut self, frequency: f32) {
        for partial in &mut self.partials {
            partial.detune = self.rng.next_f32();
        }
        let count = self.count;
        for (i, partial) in self.partials[..count].iter_mut().enumerate() {
            partial.phase = Self::initial_phase(i, count);
        }
        self.base_frequency = frequency;
        self.update_frequencies();
    }

    /// Retune without touching phase or detune (pitch bend).
    pub fn set_frequency(&mut self, frequency: f32) {
        self.base_frequency = frequency;
        self.update_frequencies();
    }

    /// Base frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.base_frequency
    }

    /// Set the number of active partials, clamped to `[1, MAX_UNISON]`.
    ///
    /// Partials that become active start at their evenly spread phase;
    /// detune coefficients are kept.
    pub fn set_unison(&mut self, count: usize) {
        let count = count.clamp(1, MAX_UNISON);
        if count == self.count {
            return;
        }
        for i in self.count..count {
            self.partials[i].phase = Self::initial_phase(i, count);
        }
        self.count = count;
        self.update_frequencies();
    }

    /// Number of active partials.
    pub fn unison(&self) -> usize {
        self.count
    }

    /// Set the detune spread fraction, clamped to `[0, 0.1]`.
    pub fn set_spread(&mut self, spread: f32) {
        self.spread = if spread.is_nan() { 0.0 } else { spread.clamp(0.0, 0.1) };
        self.update_frequencies();
    }

    /// Detune spread fraction.
    pub fn spread(&self) -> f32 {
        self.spread
    }

    /// Set the saw-to-square blend, clamped to `[0, 1]`.
    pub fn set_shape(&mut self, shape: f32) {
        self.shape = if shape.is_nan() { 0.0 } else { shape.clamp(0.0, 1.0) };
    }

    /// Active partials.
    pub fn partials(&self) -> &[Partial] {
        &self.partials[..self.count]
    }

    /// Render one stereo sample and advance every active partial.
    #[inline]
    pub fn render(&mut self) -> (f32, f32) {
        let mut left = 0.0;
        let mut right = 0.0;
        for partial in &mut self.partials[..self.count] {
            let wave = saw(partial.phase);
            let shaped = (wave + libm::copysignf(self.shape, wave)).clamp(-1.0, 1.0);

            let r_pan = (partial.pan + 1.0) * 0.5;
            left += shaped * (1.0 - r_pan);
            right += shaped * r_pan;

            partial.phase += partial.increment;
            if partial.phase >= TAU {
                partial.phase = libm::fmodf(partial.phase, TAU);
            }
        }
        (left * self.gain, right * self.gain)
    }

    #[inline]
    fn initial_phase(index: usize, count: usize) -> f32 {
        index as f32 / count as f32 * TAU
    }

    /// Recompute frequency, increment and pan of the active partials.
    fn update_frequencies(&mut self) {
        let count = self.count;
        let base = self.base_frequency;
        let spread = self.spread;
        let sample_rate = self.sample_rate;

        for (i, partial) in self.partials[..count].iter_mut().enumerate() {
            partial.frequency = base * (1.0 + partial.detune * spread - spread * 0.5);
            partial.increment = partial.frequency / sample_rate * TAU;
            partial.pan = if count > 1 {
                i as f32 / (count - 1) as f32 * 2.0 - 1.0
            } else {
                0.0
            };
        }
        self.gain = 3.0 / libm::sqrtf(4.0 + count as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partials_within_spread() {
        let mut bank = UnisonBank::new(48000.0, 7);
        bank.set_unison(64);
        bank.set_spread(0.1);
        bank.trigger(220.0);
        for p in bank.partials() {
            assert!(p.frequency() >= 220.0 * 0.95 - 1e-3, "{}", p.frequency());
            assert!(p.frequency() <= 220.0 * 1.05 + 1e-3, "{}", p.frequency());
        }
    }

    #[test]
    fn test_zero_spread_is_unison() {
        let mut bank = UnisonBank::new(48000.0, 3);
        bank.set_spread(0.0);
        bank.trigger(440.0);
        assert!(bank.partials().iter().all(|p| p.frequency() == 440.0));
    }

    #[test]
    fn test_single_partial_is_centered() {
        let mut bank = UnisonBank::new(48000.0, 1);
        bank.set_unison(1);
        bank.trigger(440.0);
        assert_eq!(bank.partials().len(), 1);
        assert_eq!(bank.partials()[0].pan(), 0.0);

        let (l, r) = bank.render();
        assert_eq!(l, r);
    }

    #[test]
    fn test_pan_distribution() {
        let mut bank = UnisonBank::new(48000.0, 1);
        bank.set_unison(5);
        let pans: Vec<f32> = bank.partials().iter().map(Partial::pan).collect();
        assert_eq!(pans, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_initial_phases_evenly_spread() {
        let mut bank = UnisonBank::new(48000.0, 1);
        bank.set_unison(4);
        bank.trigger(100.0);
        let phases: Vec<f32> = bank.partials().iter().map(Partial::phase).collect();
        for (i, phase) in phases.iter().enumerate() {
            assert!((phase - i as f32 * TAU / 4.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_pitch_bend_keeps_detune_and_phase() {
        let mut bank = UnisonBank::new(48000.0, 11);
        bank.trigger(440.0);
        for _ in 0..100 {
            bank.render();
        }
        let before: Vec<(f32, f32)> = bank
            .partials()
            .iter()
            .map(|p| (p.detune(), p.phase()))
            .collect();
        bank.set_frequency(466.16);
        let after: Vec<(f32, f32)> = bank
            .partials()
            .iter()
            .map(|p| (p.detune(), p.phase()))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_retrigger_redraws_detune() {
        let mut bank = UnisonBank::new(48000.0, 5);
        bank.trigger(440.0);
        let first: Vec<f32> = bank.partials().iter().map(Partial::detune).collect();
        bank.trigger(440.0);
        let second: Vec<f32> = bank.partials().iter().map(Partial::detune).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn test_phase_wraps() {
        let mut bank = UnisonBank::new(8000.0, 2);
        bank.set_unison(64);
        bank.trigger(3900.0);
        for _ in 0..10_000 {
            bank.render();
            for p in bank.partials() {
                assert!((0.0..TAU).contains(&p.phase()), "phase {}", p.phase());
            }
        }
    }

    #[test]
    fn test_full_shape_is_square() {
        let mut bank = UnisonBank::new(48000.0, 1);
        bank.set_unison(1);
        bank.set_shape(1.0);
        bank.trigger(100.0);
        // Single centred partial: both channels carry half of the gain
        let expected = 0.5 * 3.0 / libm::sqrtf(5.0);
        for _ in 0..1000 {
            let (l, _) = bank.render();
            assert!((l.abs() - expected).abs() < 1e-5, "{l}");
        }
    }

    #[test]
    fn test_rng_range() {
        let mut rng = XorShift32::new(0);
        for _ in 0..10_000 {
            let x = rng.next_f32();
            assert!((0.0..1.0).contains(&x));
        }
    }
}
