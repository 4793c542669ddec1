//! Comb filter for reverb algorithms.
//!
//! A feedback comb with a one-pole lowpass in the feedback path. Eight of
//! these in parallel form the body of the Freeverb tank.

use crate::InterpolatedDelay;
use crate::flush_denormal;

/// Comb filter with feedback and damping.
///
/// # Example
///
/// ```rust
/// use crypt_core::CombFilter;
///
/// let mut comb = CombFilter::new(1000);
/// comb.set_feedback(0.8);
/// comb.set_damp(0.3);
///
/// let output = comb.process(1.0);
/// assert_eq!(output, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct CombFilter {
    delay: InterpolatedDelay,
    length: f32,
    feedback: f32,
    damp1: f32,
    damp2: f32,
    filterstore: f32,
}

impl CombFilter {
    /// Create a comb filter whose loop is `delay_samples` long.
    pub fn new(delay_samples: usize) -> Self {
        let length = delay_samples.max(1);
        Self {
            delay: InterpolatedDelay::new(length + 1),
            length: length as f32,
            feedback: 0.5,
            damp1: 0.5,
            damp2: 0.5,
            filterstore: 0.0,
        }
    }

    /// Set the feedback amount, clamped to `[0, 0.99]`.
    #[inline]
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    /// Current feedback value.
    #[inline]
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Set the damping amount (0.0 bright, 1.0 dark).
    #[inline]
    pub fn set_damp(&mut self, damp: f32) {
        self.damp1 = damp.clamp(0.0, 1.0);
        self.damp2 = 1.0 - self.damp1;
    }

    /// Current damping value.
    #[inline]
    pub fn damp(&self) -> f32 {
        self.damp1
    }

    /// Process one sample. The output is the delayed loop signal.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.delay.read(self.length);
        self.filterstore = flush_denormal(output * self.damp2 + self.filterstore * self.damp1);
        self.delay.write(input + self.filterstore * self.feedback);
        output
    }

    /// Clear the delay and damping state.
    pub fn clear(&mut self) {
        self.delay.clear();
        self.filterstore = 0.0;
    }

    /// Loop length in samples.
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// Always `false`; a comb holds at least one sample.
    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comb_echo_after_length() {
        let mut comb = CombFilter::new(100);
        comb.set_feedback(0.5);
        comb.set_damp(0.0);

        assert_eq!(comb.process(1.0), 0.0);
        for _ in 0..99 {
            assert_eq!(comb.process(0.0), 0.0);
        }
        assert_eq!(comb.process(0.0), 1.0);
    }

    #[test]
    fn test_comb_feedback_decay() {
        let mut comb = CombFilter::new(10);
        comb.set_feedback(0.8);
        comb.set_damp(0.0);

        comb.process(1.0);
        let mut peaks = Vec::new();
        for i in 1..=50 {
            let out = comb.process(0.0);
            if i % 10 == 0 {
                peaks.push(out);
            }
        }
        for pair in peaks.windows(2) {
            assert!(pair[1] < pair[0], "echoes should decay: {:?}", peaks);
        }
    }

    #[test]
    fn test_comb_clear() {
        let mut comb = CombFilter::new(20);
        for _ in 0..100 {
            comb.process(1.0);
        }
        comb.clear();
        for _ in 0..40 {
            assert_eq!(comb.process(0.0), 0.0);
        }
    }

    #[test]
    fn test_feedback_clamped() {
        let mut comb = CombFilter::new(20);
        comb.set_feedback(1.5);
        assert_eq!(comb.feedback(), 0.99);
    }
}
