//! Stereo Freeverb.
//!
//! Eight damped comb filters in parallel followed by four allpass filters
//! in series, one such tank per channel. The right tank's delay lengths
//! are offset by [`STEREO_SPREAD`] samples so the channels decorrelate.
//!
//! The synth exposes a single "space" control; [`ReverbParams::from_space`]
//! derives the classic Freeverb controls from it.

use crypt_core::{AllpassFilter, CombFilter, Effect, SmoothedParam};

/// Freeverb comb filter delay times (at 44.1kHz reference).
const COMB_TUNINGS_44K: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Freeverb allpass filter delay times (at 44.1kHz reference).
const ALLPASS_TUNINGS_44K: [usize; 4] = [556, 441, 341, 225];

/// Extra delay of the right channel's filters (samples at 44.1kHz).
pub const STEREO_SPREAD: usize = 23;

/// Reference sample rate for tuning constants.
const REFERENCE_RATE: f32 = 44100.0;

/// Input attenuation ahead of the combs.
const INPUT_GAIN: f32 = 0.015;

/// Gain smoothing time (ms).
const SMOOTHING_MS: f32 = 10.0;

/// Scale delay times from reference rate to target rate.
fn scale_to_rate(samples: usize, target_rate: f32) -> usize {
    ((samples as f32 * target_rate / REFERENCE_RATE) as usize).max(1)
}

/// Perceptual reverb controls, all in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParams {
    /// Tank size: longer decay as it grows.
    pub room_size: f32,
    /// High-frequency absorption in the tank.
    pub damping: f32,
    /// Reverberated signal level.
    pub wet_level: f32,
    /// Unprocessed signal level.
    pub dry_level: f32,
    /// Stereo width of the reverberated signal.
    pub width: f32,
}

impl ReverbParams {
    /// Map the single "space" knob onto all controls.
    ///
    /// ```rust
    /// use crypt_effects::ReverbParams;
    ///
    /// let p = ReverbParams::from_space(0.5);
    /// assert_eq!(p.room_size, 0.6);
    /// assert_eq!(p.wet_level, 0.4);
    /// assert_eq!(p.width, 1.0);
    /// ```
    pub fn from_space(space: f32) -> Self {
        let space = space.clamp(0.0, 1.0);
        Self {
            room_size: 0.2 + 0.8 * space,
            damping: 0.8 - 0.7 * space,
            wet_level: 0.8 * space,
            dry_level: 1.0 - 0.8 * space,
            width: 1.0,
        }
    }
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self::from_space(0.2)
    }
}

/// One channel's comb bank and allpass chain.
#[derive(Debug, Clone)]
struct Tank {
    combs: [CombFilter; 8],
    allpasses: [AllpassFilter; 4],
}

impl Tank {
    fn new(sample_rate: f32, spread: usize) -> Self {
        Self {
            combs: core::array::from_fn(|i| {
                CombFilter::new(scale_to_rate(COMB_TUNINGS_44K[i] + spread, sample_rate))
            }),
            allpasses: core::array::from_fn(|i| {
                let mut ap =
                    AllpassFilter::new(scale_to_rate(ALLPASS_TUNINGS_44K[i] + spread, sample_rate));
                ap.set_feedback(0.5);
                ap
            }),
        }
    }

    fn set_comb_params(&mut self, feedback: f32, damp: f32) {
        for comb in &mut self.combs {
            comb.set_feedback(feedback);
            comb.set_damp(damp);
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let mut out = 0.0;
        for comb in &mut self.combs {
            out += comb.process(input);
        }
        for allpass in &mut self.allpasses {
            out = allpass.process(out);
        }
        out
    }

    fn clear(&mut self) {
        for comb in &mut self.combs {
            comb.clear();
        }
        for allpass in &mut self.allpasses {
            allpass.clear();
        }
    }
}

/// Stereo Freeverb driven by [`ReverbParams`].
///
/// ## Parameters
/// - `space`: single macro control (0.0 to 1.0, default 0.2)
///
/// # Example
///
/// ```rust
/// use crypt_core::Effect;
/// use crypt_effects::Reverb;
///
/// let mut reverb = Reverb::new(48000.0);
/// reverb.set_space(0.6);
///
/// let (l, r) = reverb.process_stereo(0.5, 0.5);
/// assert!(l.is_finite() && r.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct Reverb {
    left: Tank,
    right: Tank,
    feedback: SmoothedParam,
    damping: SmoothedParam,
    wet1: SmoothedParam,
    wet2: SmoothedParam,
    dry: SmoothedParam,
    params: ReverbParams,
    space: f32,
}

impl Default for Reverb {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Reverb {
    /// Create a reverb at `space = 0.2`. Allocates the tanks.
    pub fn new(sample_rate: f32) -> Self {
        let mut reverb = Self {
            left: Tank::new(sample_rate, 0),
            right: Tank::new(sample_rate, STEREO_SPREAD),
            feedback: SmoothedParam::with_config(0.0, sample_rate, SMOOTHING_MS),
            damping: SmoothedParam::with_config(0.0, sample_rate, SMOOTHING_MS),
            wet1: SmoothedParam::with_config(0.0, sample_rate, SMOOTHING_MS),
            wet2: SmoothedParam::with_config(0.0, sample_rate, SMOOTHING_MS),
            dry: SmoothedParam::with_config(0.0, sample_rate, SMOOTHING_MS),
            params: ReverbParams::default(),
            space: 0.2,
        };
        reverb.set_params(ReverbParams::default());
        reverb.snap_gains();
        reverb
    }

    /// Set the "space" macro (0-1).
    pub fn set_space(&mut self, space: f32) {
        self.space = space.clamp(0.0, 1.0);
        self.set_params(ReverbParams::from_space(self.space));
    }

    /// Current "space" value.
    pub fn space(&self) -> f32 {
        self.space
    }

    /// Set the underlying Freeverb controls directly.
    pub fn set_params(&mut self, params: ReverbParams) {
        self.params = params;
        let wet = params.wet_level * 3.0;
        self.feedback.set_target(params.room_size * 0.28 + 0.7);
        self.damping.set_target(params.damping * 0.4);
        self.wet1.set_target(0.5 * wet * (1.0 + params.width));
        self.wet2.set_target(0.5 * wet * (1.0 - params.width));
        self.dry.set_target(params.dry_level * 2.0);
    }

    /// Current Freeverb controls.
    pub fn params(&self) -> ReverbParams {
        self.params
    }

    fn snap_gains(&mut self) {
        self.feedback.snap_to_target();
        self.damping.snap_to_target();
        self.wet1.snap_to_target();
        self.wet2.snap_to_target();
        self.dry.snap_to_target();
        let (feedback, damp) = (self.feedback.get(), self.damping.get());
        self.left.set_comb_params(feedback, damp);
        self.right.set_comb_params(feedback, damp);
    }
}

impl Effect for Reverb {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        if !(self.feedback.is_settled() && self.damping.is_settled()) {
            let feedback = self.feedback.advance();
            let damp = self.damping.advance();
            self.left.set_comb_params(feedback, damp);
            self.right.set_comb_params(feedback, damp);
        }

        let input = (left + right) * INPUT_GAIN;
        let out_l = self.left.process(input);
        let out_r = self.right.process(input);

        let wet1 = self.wet1.advance();
        let wet2 = self.wet2.advance();
        let dry = self.dry.advance();
        (
            out_l * wet1 + out_r * wet2 + left * dry,
            out_r * wet1 + out_l * wet2 + right * dry,
        )
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.left = Tank::new(sample_rate, 0);
        self.right = Tank::new(sample_rate, STEREO_SPREAD);
        for param in [
            &mut self.feedback,
            &mut self.damping,
            &mut self.wet1,
            &mut self.wet2,
            &mut self.dry,
        ] {
            param.set_sample_rate(sample_rate);
        }
        self.snap_gains();
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
        self.snap_gains();
    }
}
