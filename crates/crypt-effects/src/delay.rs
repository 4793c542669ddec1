//! Stereo feedback delay.
//!
//! One delay line per channel. The delay time glides towards its target
//! with a very slow one-pole lag so that turning the time knob bends the
//! echoes in pitch instead of clicking. The right channel reads slightly
//! further back than the left for a touch of width.

use crypt_core::{Effect, InterpolatedDelay, SmoothedParam, flush_denormal, ms_to_samples};

/// Longest delay the lines can hold (seconds).
const MAX_DELAY_SECONDS: f32 = 2.1;

/// Per-sample lag coefficient of the delay time.
const TIME_SMOOTHING: f32 = 0.0001;

/// Distance from the target (ms) at which the smoothed time snaps.
const SNAP_TOLERANCE_MS: f32 = 0.1;

/// Extra right-channel delay in samples per millisecond of delay time.
const RIGHT_OFFSET: f32 = 0.01;

/// Stereo echo with feedback.
///
/// ## Parameters
/// - `time`: delay time in ms (2 to 2000, default 375)
/// - `feedback`: amount fed back into the line (0.0 to 0.99, default 0.5)
/// - `mix`: echo level added to the dry signal (0.0 to 1.0, default 0.3)
///
/// Per sample and channel, with `w` the delayed signal and `d` the input:
///
/// ```text
/// line  <- d + feedback * w
/// out    = d + mix * w
/// ```
///
/// # Example
///
/// ```rust
/// use crypt_core::Effect;
/// use crypt_effects::StereoDelay;
///
/// let mut delay = StereoDelay::new(44100.0);
/// delay.set_time_ms(100.0);
/// delay.set_feedback(0.4);
/// delay.set_mix(0.5);
///
/// let mut left = [0.0f32; 64];
/// let mut right = [0.0f32; 64];
/// left[0] = 1.0;
/// delay.process_block_stereo(&mut left, &mut right);
/// assert_eq!(left[0], 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct StereoDelay {
    lines: [InterpolatedDelay; 2],
    /// Delay time in ms, lagging the target
    time_ms: SmoothedParam,
    feedback: f32,
    mix: f32,
    sample_rate: f32,
}

impl Default for StereoDelay {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl StereoDelay {
    /// Create a delay with default settings. Allocates the delay lines.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            lines: [
                InterpolatedDelay::from_time(sample_rate, MAX_DELAY_SECONDS),
                InterpolatedDelay::from_time(sample_rate, MAX_DELAY_SECONDS),
            ],
            time_ms: SmoothedParam::with_coefficient(375.0, TIME_SMOOTHING),
            feedback: 0.5,
            mix: 0.3,
            sample_rate,
        }
    }

    /// Set target delay time in ms (2-2000).
    pub fn set_time_ms(&mut self, ms: f32) {
        self.time_ms.set_target(ms.clamp(2.0, 2000.0));
    }

    /// Target delay time in ms.
    pub fn time_ms(&self) -> f32 {
        self.time_ms.target()
    }

    /// Delay time currently in effect, in ms.
    pub fn smoothed_time_ms(&self) -> f32 {
        self.time_ms.get()
    }

    /// Set feedback (0-0.99).
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    /// Current feedback.
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Set echo level (0-1).
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    /// Current echo level.
    pub fn mix(&self) -> f32 {
        self.mix
    }
}

impl Effect for StereoDelay {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let time = self.time_ms.advance();
        let base = ms_to_samples(time, self.sample_rate);
        let positions = [base, base + time * RIGHT_OFFSET];
        let inputs = [left, right];
        let mut outputs = [0.0; 2];

        for (ch, line) in self.lines.iter_mut().enumerate() {
            let wet = line.read(positions[ch]);
            let dry = inputs[ch];
            line.write(flush_denormal(dry + self.feedback * wet));
            outputs[ch] = wet * self.mix + dry;
        }
        (outputs[0], outputs[1])
    }

    fn process_block_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        self.time_ms.snap_within(SNAP_TOLERANCE_MS);
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.process_stereo(*l, *r);
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.lines = [
            InterpolatedDelay::from_time(sample_rate, MAX_DELAY_SECONDS),
            InterpolatedDelay::from_time(sample_rate, MAX_DELAY_SECONDS),
        ];
    }

    fn reset(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.time_ms.snap_to_target();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse_response(delay: &mut StereoDelay, len: usize) -> (Vec<f32>, Vec<f32>) {
        let mut left = vec![0.0; len];
        let mut right = vec![0.0; len];
        left[0] = 1.0;
        right[0] = 1.0;
        for (l, r) in left.chunks_mut(512).zip(right.chunks_mut(512)) {
            delay.process_block_stereo(l, r);
        }
        (left, right)
    }

    #[test]
    fn test_dry_passes_immediately() {
        let mut delay = StereoDelay::new(48000.0);
        let (l, r) = delay.process_stereo(0.7, -0.3);
        assert_eq!((l, r), (0.7, -0.3));
    }

    #[test]
    fn test_integer_delay_echo() {
        // 10 ms at 48 kHz is exactly 480 samples
        let mut delay = StereoDelay::new(48000.0);
        delay.set_time_ms(10.0);
        delay.set_feedback(0.0);
        delay.set_mix(1.0);
        delay.reset();

        let (left, _) = impulse_response(&mut delay, 2000);
        assert_eq!(left[480], 1.0);
        let others: f32 = left[1..].iter().map(|s| s.abs()).sum::<f32>() - 1.0;
        assert!(others.abs() < 1e-6);
    }

    #[test]
    fn test_right_channel_reads_later() {
        let mut delay = StereoDelay::new(48000.0);
        delay.set_time_ms(100.0);
        delay.set_feedback(0.0);
        delay.set_mix(1.0);
        delay.reset();

        let (left, right) = impulse_response(&mut delay, 6000);
        // Right lags by 100 * 0.01 = 1 sample
        assert_eq!(left[4800], 1.0);
        assert_eq!(right[4801], 1.0);
    }

    #[test]
    fn test_feedback_repeats_decay() {
        let mut delay = StereoDelay::new(48000.0);
        delay.set_time_ms(10.0);
        delay.set_feedback(0.5);
        delay.set_mix(1.0);
        delay.reset();

        let (left, _) = impulse_response(&mut delay, 2000);
        assert_eq!(left[480], 1.0);
        assert_eq!(left[960], 0.5);
        assert_eq!(left[1440], 0.25);
    }

    #[test]
    fn test_time_glides_towards_target() {
        let mut delay = StereoDelay::new(48000.0);
        delay.set_time_ms(1000.0);
        let mut left = [0.0; 512];
        let mut right = [0.0; 512];
        delay.process_block_stereo(&mut left, &mut right);

        let t = delay.smoothed_time_ms();
        assert!(t > 375.0 && t < 1000.0, "{t}");
    }

    #[test]
    fn test_time_snaps_when_close() {
        let mut delay = StereoDelay::new(48000.0);
        delay.set_time_ms(375.05);
        let mut left = [0.0; 4];
        let mut right = [0.0; 4];
        delay.process_block_stereo(&mut left, &mut right);
        assert_eq!(delay.smoothed_time_ms(), 375.05);
    }

    #[test]
    fn test_parameter_clamping() {
        let mut delay = StereoDelay::new(48000.0);
        delay.set_feedback(1.5);
        assert_eq!(delay.feedback(), 0.99);
        delay.set_mix(-1.0);
        assert_eq!(delay.mix(), 0.0);
        delay.set_time_ms(10_000.0);
        assert_eq!(delay.time_ms(), 2000.0);
        delay.set_time_ms(0.0);
        assert_eq!(delay.time_ms(), 2.0);
    }

    #[test]
    fn test_max_feedback_is_bounded() {
        let mut delay = StereoDelay::new(8000.0);
        delay.set_time_ms(2.0);
        delay.set_feedback(0.99);
        delay.set_mix(1.0);
        delay.reset();
        let (left, _) = impulse_response(&mut delay, 80_000);
        assert!(left.iter().all(|s| s.is_finite() && s.abs() <= 2.0));
    }
}
