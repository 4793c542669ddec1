//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.

use libm::{expf, powf};

/// Convert decibels to a gain factor using the power form, `10^(dB/10)`.
///
/// The master output control uses this curve: +3 dB roughly doubles the
/// sample values and -12 dB scales them by about 0.063.
///
/// ```rust
/// use crypt_core::db_to_power_gain;
///
/// assert_eq!(db_to_power_gain(0.0), 1.0);
/// assert!((db_to_power_gain(-10.0) - 0.1).abs() < 1e-6);
/// ```
#[inline]
pub fn db_to_power_gain(db: f32) -> f32 {
    const FACTOR: f32 = core::f32::consts::LN_10 / 10.0;
    expf(db * FACTOR)
}

/// Convert a MIDI note number to frequency in Hz (A4 = 69 = 440 Hz).
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

/// Convert milliseconds to samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Flush subnormal floats to zero.
///
/// Replaces values below 1e-20 with zero, leaving margin before the
/// IEEE 754 subnormal range. Used in feedback loops where the signal can
/// decay indefinitely.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Crossfade between dry and wet signals: `dry + (wet - dry) * mix`.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry + (wet - dry) * mix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_gain_range() {
        assert!((db_to_power_gain(3.0) - 1.9953).abs() < 1e-3);
        assert!((db_to_power_gain(-12.0) - 0.0631).abs() < 1e-3);
    }

    #[test]
    fn test_midi_to_freq() {
        assert!((midi_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_to_freq(57) - 220.0).abs() < 1e-3);
        assert!((midi_to_freq(60) - 261.6256).abs() < 0.01);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(-1e-25), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
    }

    #[test]
    fn test_wet_dry_mix() {
        assert_eq!(wet_dry_mix(1.0, 0.0, 0.0), 1.0);
        assert_eq!(wet_dry_mix(1.0, 0.0, 1.0), 0.0);
        assert_eq!(wet_dry_mix(1.0, 0.0, 0.5), 0.5);
    }
}
