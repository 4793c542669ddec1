//! Phaser with cascaded first-order allpass stages.
//!
//! Six allpass stages per channel share one centre frequency, swept by a
//! sine LFO on a logarithmic scale around 1 kHz. Mixing the phase-shifted
//! signal with the dry signal carves notches that move with the sweep.
//!
//! A mix of 1.0 is an even dry/wet blend, which gives the deepest notches,
//! so the mix control is halved internally.

use core::f32::consts::PI;
use crypt_core::{Effect, Lfo, SmoothedParam, wet_dry_mix};

/// Number of allpass stages per channel.
const STAGES: usize = 6;

/// Samples between allpass coefficient updates.
const UPDATE_INTERVAL: u32 = 4;

/// Sweep centre (Hz).
const CENTRE_FREQ: f32 = 1000.0;

/// Bottom of the sweep range (Hz).
const MIN_FREQ: f32 = 20.0;

/// First-order allpass.
///
/// `y[n] = a * x[n] + x[n-1] - a * y[n-1]` with
/// `a = (tan(π fc / fs) - 1) / (tan(π fc / fs) + 1)`.
#[derive(Debug, Clone, Copy, Default)]
struct FirstOrderAllpass {
    a: f32,
    x1: f32,
    y1: f32,
}

impl FirstOrderAllpass {
    #[inline]
    fn set_coefficient(&mut self, a: f32) {
        self.a = a;
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let output = self.a * input + self.x1 - self.a * self.y1;
        self.x1 = input;
        self.y1 = crypt_core::flush_denormal(output);
        output
    }

    fn clear(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

/// Stereo phaser.
///
/// ## Parameters
/// - `depth`: sweep depth (0.0 to 1.0, default 0.5)
/// - `rate`: LFO rate in Hz (0.02 to 1.0, default 0.2)
/// - `mix`: blend, 1.0 = equal dry and wet (0.0 to 1.0, default 0.3)
///
/// # Example
///
/// ```rust
/// use crypt_core::Effect;
/// use crypt_effects::Phaser;
///
/// let mut phaser = Phaser::new(48000.0);
/// phaser.set_depth(0.8);
/// phaser.set_rate(0.5);
/// phaser.set_mix(1.0);
///
/// let (l, r) = phaser.process_stereo(0.5, 0.5);
/// assert!(l.is_finite() && r.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct Phaser {
    left: [FirstOrderAllpass; STAGES],
    right: [FirstOrderAllpass; STAGES],
    /// Runs at the coefficient update rate
    lfo: Lfo,
    /// LFO amplitude in normalized log-frequency units, `depth / 2`
    osc_volume: SmoothedParam,
    /// Wet proportion, `mix / 2`
    wet: SmoothedParam,
    /// Centre frequency on the normalized log scale
    centre_norm: f32,
    max_freq: f32,
    sweep_freq: f32,
    sample_rate: f32,
    update_counter: u32,
}

impl Default for Phaser {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Phaser {
    /// Create a phaser with default settings.
    pub fn new(sample_rate: f32) -> Self {
        let update_rate = sample_rate / UPDATE_INTERVAL as f32;
        let mut phaser = Self {
            left: [FirstOrderAllpass::default(); STAGES],
            right: [FirstOrderAllpass::default(); STAGES],
            lfo: Lfo::new(update_rate, 0.2),
            osc_volume: SmoothedParam::with_config(0.25, update_rate, 50.0),
            wet: SmoothedParam::with_config(0.15, sample_rate, 50.0),
            centre_norm: 0.0,
            max_freq: 0.0,
            sweep_freq: CENTRE_FREQ,
            sample_rate,
            update_counter: 0,
        };
        phaser.update_range();
        phaser
    }

    /// Set sweep depth (0-1).
    pub fn set_depth(&mut self, depth: f32) {
        self.osc_volume.set_target(depth.clamp(0.0, 1.0) * 0.5);
    }

    /// Current sweep depth.
    pub fn depth(&self) -> f32 {
        self.osc_volume.target() * 2.0
    }

    /// Set LFO rate in Hz (0.02-1).
    pub fn set_rate(&mut self, rate_hz: f32) {
        self.lfo.set_frequency(rate_hz.clamp(0.02, 1.0));
    }

    /// Current LFO rate in Hz.
    pub fn rate(&self) -> f32 {
        self.lfo.frequency()
    }

    /// Set mix (0-1). 1.0 blends dry and phased signal equally.
    pub fn set_mix(&mut self, mix: f32) {
        self.wet.set_target(mix.clamp(0.0, 1.0) * 0.5);
    }

    /// Current mix control value.
    pub fn mix(&self) -> f32 {
        self.wet.target() * 2.0
    }

    /// Top of the sweep range at the current sample rate (Hz).
    pub fn max_freq(&self) -> f32 {
        self.max_freq
    }

    /// Allpass frequency of the last coefficient update (Hz).
    pub fn sweep_freq(&self) -> f32 {
        self.sweep_freq
    }

    fn update_range(&mut self) {
        self.max_freq = 20_000.0f32.min(0.49 * self.sample_rate);
        self.centre_norm = libm::logf(CENTRE_FREQ / MIN_FREQ) / libm::logf(self.max_freq / MIN_FREQ);
    }

    #[inline]
    fn freq_from_norm(&self, norm: f32) -> f32 {
        MIN_FREQ * libm::powf(self.max_freq / MIN_FREQ, norm.clamp(0.0, 1.0))
    }

    fn update_coefficients(&mut self) {
        let osc = self.lfo.next() * self.osc_volume.advance();
        let freq = self.freq_from_norm(osc + self.centre_norm);
        self.sweep_freq = freq;
        let t = libm::tanf(PI * freq / self.sample_rate);
        let a = (t - 1.0) / (t + 1.0);
        for stage in self.left.iter_mut().chain(self.right.iter_mut()) {
            stage.set_coefficient(a);
        }
    }
}

impl Effect for Phaser {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        if self.update_counter == 0 {
            self.update_coefficients();
        }
        self.update_counter = (self.update_counter + 1) % UPDATE_INTERVAL;

        let wet_l = self.left.iter_mut().fold(left, |x, stage| stage.process(x));
        let wet_r = self.right.iter_mut().fold(right, |x, stage| stage.process(x));

        let wet = self.wet.advance();
        (wet_dry_mix(left, wet_l, wet), wet_dry_mix(right, wet_r, wet))
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        let update_rate = sample_rate / UPDATE_INTERVAL as f32;
        let rate = self.lfo.frequency();
        self.lfo = Lfo::new(update_rate, rate);
        self.osc_volume.set_sample_rate(update_rate);
        self.wet.set_sample_rate(sample_rate);
        self.update_range();
        self.update_counter = 0;
    }

    fn reset(&mut self) {
        for stage in self.left.iter_mut().chain(self.right.iter_mut()) {
            stage.clear();
        }
        self.lfo.reset();
        self.osc_volume.snap_to_target();
        self.wet.snap_to_target();
        self.update_counter = 0;
    }
}
