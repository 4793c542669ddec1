//! Delay line for time-based effects.
//!
//! A circular buffer with fractional (linearly interpolated) reads. Used by
//! the stereo echo directly and by the reverb's comb and allpass stages.
//!
//! # Read/write order
//!
//! Call [`InterpolatedDelay::read`] before [`InterpolatedDelay::write`] for
//! each sample. A read of `d` samples then returns the input written `d`
//! samples ago, so a delay of 16537.5 samples lands exactly halfway between
//! the two neighbouring inputs.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

/// Interpolated delay line using a heap-allocated circular buffer.
///
/// The buffer is allocated at construction and never resized during
/// processing.
///
/// # Example
///
/// ```rust
/// use crypt_core::InterpolatedDelay;
///
/// let mut delay = InterpolatedDelay::new(64);
/// assert_eq!(delay.read_write(1.0, 4.0), 0.0);
/// for _ in 0..3 {
///     delay.read_write(0.0, 4.0);
/// }
/// assert_eq!(delay.read_write(0.0, 4.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedDelay {
    /// Circular buffer storage
    buffer: Vec<f32>,
    /// Next slot to be written
    write_pos: usize,
}

impl InterpolatedDelay {
    /// Creates a delay line holding `capacity` samples.
    ///
    /// The longest readable delay is `capacity - 1` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is less than 2.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 1, "Delay capacity must be > 1");

        #[cfg(feature = "tracing")]
        tracing::debug!(capacity, "delay line allocated");

        Self {
            buffer: vec![0.0; capacity],
            write_pos: 0,
        }
    }

    /// Creates a delay line able to hold `max_seconds` at `sample_rate`.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        let max_samples = (sample_rate * max_seconds) as usize + 2;
        Self::new(max_samples)
    }

    /// Reads a delayed sample with linear interpolation.
    ///
    /// `delay_samples` is clamped to `[1, capacity - 1]`.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(1.0, (len - 1) as f32);

        let delay_int = delay as usize;
        let frac = delay - delay_int as f32;

        let newer = (self.write_pos + len - delay_int) % len;
        let a = self.buffer[newer];
        if frac == 0.0 {
            return a;
        }
        let older = (newer + len - 1) % len;
        let b = self.buffer[older];
        a + (b - a) * frac
    }

    /// Writes a sample and advances the write position.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Read at `delay_samples`, then write `sample`.
    #[inline]
    pub fn read_write(&mut self, sample: f32, delay_samples: f32) -> f32 {
        let output = self.read(delay_samples);
        self.write(sample);
        output
    }

    /// Clears the delay line.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Buffer size in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_delay() {
        let mut delay = InterpolatedDelay::new(100);
        let mut out = Vec::new();
        for i in 0..20 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            out.push(delay.read_write(x, 10.0));
        }
        assert_eq!(out[10], 1.0);
        assert_eq!(out.iter().filter(|&&s| s != 0.0).count(), 1);
    }

    #[test]
    fn test_fractional_delay_splits_impulse() {
        let mut delay = InterpolatedDelay::new(100);
        let mut out = Vec::new();
        for i in 0..20 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            out.push(delay.read_write(x, 5.25));
        }
        assert!((out[5] - 0.75).abs() < 1e-6);
        assert!((out[6] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_delay_clamped_to_capacity() {
        let mut delay = InterpolatedDelay::new(8);
        for i in 0..8 {
            delay.write(i as f32);
        }
        // Longest delay is capacity - 1
        assert_eq!(delay.read(1000.0), delay.read(7.0));
        assert_eq!(delay.read(-3.0), delay.read(1.0));
    }

    #[test]
    fn test_clear() {
        let mut delay = InterpolatedDelay::new(16);
        for _ in 0..16 {
            delay.write(1.0);
        }
        delay.clear();
        assert_eq!(delay.read(4.0), 0.0);
    }

    #[test]
    fn test_from_time_capacity() {
        let delay = InterpolatedDelay::from_time(44100.0, 2.1);
        assert!(delay.capacity() as f32 > 44100.0 * 2.1);
    }
}
