//! Parameter smoothing for zipper-free changes.
//!
//! Control values arrive at block rate from the UI thread. Applying them
//! directly would step the signal, so DSP units route them through a
//! [`SmoothedParam`] and advance it once per sample.
//!
//! ## Usage
//!
//! ```rust
//! use crypt_core::SmoothedParam;
//!
//! let mut gain = SmoothedParam::with_config(1.0, 48000.0, 10.0);
//! gain.set_target(0.5);
//!
//! for _ in 0..480 {
//!     let _g = gain.advance();
//! }
//! assert!(gain.get() < 0.75);
//! ```

use libm::expf;

/// A parameter with one-pole exponential smoothing.
///
/// The coefficient is derived either from a time constant in milliseconds
/// ([`with_config`](Self::with_config)) or given directly as a fixed
/// per-sample lag ([`with_coefficient`](Self::with_coefficient)).
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    /// Current smoothed value
    current: f32,
    /// Target value we're smoothing towards
    target: f32,
    /// Smoothing coefficient (1 = instant, near 0 = very slow)
    coeff: f32,
    /// Sample rate in Hz
    sample_rate: f32,
    /// Smoothing time in milliseconds, `None` when the coefficient is fixed
    smoothing_time_ms: Option<f32>,
}

impl SmoothedParam {
    /// Create a parameter that changes instantly until configured.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 44100.0,
            smoothing_time_ms: Some(0.0),
        }
    }

    /// Create a smoothed parameter from a time constant.
    ///
    /// # Arguments
    /// * `initial` - Initial parameter value
    /// * `sample_rate` - Sample rate in Hz
    /// * `smoothing_time_ms` - Time constant in milliseconds (63% of a step)
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = Some(smoothing_time_ms);
        param.recalculate_coeff();
        param
    }

    /// Create a smoothed parameter with a fixed per-sample coefficient.
    ///
    /// The lag does not follow the sample rate: each call to
    /// [`advance`](Self::advance) moves `coeff` of the remaining distance.
    pub fn with_coefficient(initial: f32, coeff: f32) -> Self {
        let mut param = Self::new(initial);
        param.coeff = coeff.clamp(0.0, 1.0);
        param.smoothing_time_ms = None;
        param
    }

    /// Set the target value.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Set target and snap to it.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Update sample rate and recalculate the smoothing coefficient.
    ///
    /// Fixed-coefficient parameters are unaffected.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Set smoothing time in milliseconds.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = Some(time_ms);
        self.recalculate_coeff();
    }

    /// Advance by one sample and return the smoothed value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current smoothed value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the parameter has reached its target (within epsilon).
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < 1e-6
    }

    /// Snap the current value to the target.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    /// Snap to the target when within `tolerance` of it.
    ///
    /// Returns `true` if the value was snapped.
    #[inline]
    pub fn snap_within(&mut self, tolerance: f32) -> bool {
        if (self.current - self.target).abs() < tolerance {
            self.current = self.target;
            true
        } else {
            false
        }
    }

    /// `coeff = 1 - exp(-1 / (tau * sample_rate))`, with tau in seconds.
    fn recalculate_coeff(&mut self) {
        let Some(time_ms) = self.smoothing_time_ms else {
            return;
        };
        if time_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let samples = time_ms / 1000.0 * self.sample_rate;
            self.coeff = 1.0 - expf(-1.0 / samples);
        }
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}
