//! Core Effect trait.
//!
//! Every stage of the post-synthesis chain implements [`Effect`]. Effects
//! process one stereo frame at a time and operate in place on planar blocks.
//!
//! ## Design Decisions
//!
//! - **Stereo frames**: the synth mixes voices into a stereo bus, so the
//!   per-sample entry point takes and returns a `(left, right)` pair.
//!
//! - **Object-safe**: `dyn Effect` works for runtime chaining, although the
//!   fixed chain in `crypt-effects` uses static dispatch.
//!
//! - **No allocations**: all methods may be called from the audio callback.

/// Core trait for stereo audio effects.
///
/// # Example
///
/// ```rust
/// use crypt_core::Effect;
///
/// struct Gain {
///     gain: f32,
/// }
///
/// impl Effect for Gain {
///     fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
///         (left * self.gain, right * self.gain)
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
///
/// let mut gain = Gain { gain: 0.5 };
/// let mut left = [1.0, 1.0];
/// let mut right = [2.0, 2.0];
/// gain.process_block_stereo(&mut left, &mut right);
/// assert_eq!(left, [0.5, 0.5]);
/// assert_eq!(right, [1.0, 1.0]);
/// ```
pub trait Effect {
    /// Process a single stereo frame.
    ///
    /// For effects with internal state this advances the state by one sample.
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32);

    /// Process planar stereo buffers in place.
    ///
    /// Default implementation calls [`process_stereo`](Self::process_stereo)
    /// for each frame. Both buffers must have the same length.
    fn process_block_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(
            left.len(),
            right.len(),
            "Left and right buffers must have same length"
        );
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (out_l, out_r) = self.process_stereo(*l, *r);
            *l = out_l;
            *r = out_r;
        }
    }

    /// Update the sample rate.
    ///
    /// Effects recalculate sample-rate-dependent coefficients and may
    /// reallocate delay storage here. Never called from the audio thread.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state (delay lines, filter history) without changing
    /// parameters.
    fn reset(&mut self);

    /// Processing latency in samples. Default is 0.
    fn latency_samples(&self) -> usize {
        0
    }
}
