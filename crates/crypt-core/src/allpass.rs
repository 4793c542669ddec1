//! Schroeder allpass filter for reverb diffusion.

use crate::InterpolatedDelay;
use crate::flush_denormal;

/// Schroeder allpass filter.
///
/// Freeverb structure: `output = delayed - input`, and the loop is fed
/// `input + delayed * feedback`.
///
/// # Example
///
/// ```rust
/// use crypt_core::AllpassFilter;
///
/// let mut allpass = AllpassFilter::new(500);
/// allpass.set_feedback(0.5);
/// assert_eq!(allpass.process(1.0), -1.0);
/// ```
#[derive(Debug, Clone)]
pub struct AllpassFilter {
    delay: InterpolatedDelay,
    length: f32,
    feedback: f32,
}

impl AllpassFilter {
    /// Create an allpass filter whose loop is `delay_samples` long.
    pub fn new(delay_samples: usize) -> Self {
        let length = delay_samples.max(1);
        Self {
            delay: InterpolatedDelay::new(length + 1),
            length: length as f32,
            feedback: 0.5,
        }
    }

    /// Set the feedback coefficient, clamped to `[-0.99, 0.99]`.
    #[inline]
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(-0.99, 0.99);
    }

    /// Current feedback coefficient.
    #[inline]
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.delay.read(self.length);
        self.delay
            .write(flush_denormal(input + delayed * self.feedback));
        delayed - input
    }

    /// Clear the delay state.
    pub fn clear(&mut self) {
        self.delay.clear();
    }
}
