//! Parameter metadata for named controls.
//!
//! Every control the synthesizer exposes is described by a
//! [`ParamDescriptor`]: a stable string id, display names, unit, range,
//! default and a normalization curve for hosts and knobs that work in
//! `[0, 1]`.
//!
//! # no_std Support
//!
//! Fully `no_std` compatible, no heap allocations.

/// Scaling curve for parameter normalization.
///
/// # Normalization Formulas
///
/// - **Linear**: `normalized = (value - min) / (max - min)`
/// - **Power(exp)**: `normalized = ((value - min) / (max - min)).powf(1.0 / exp)`
///
/// A host "skew factor" `s` (normalized = linear^s) is `Power(1.0 / s)`:
/// a skew of 0.3 corresponds to `Power(1.0 / 0.3)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParamScale {
    /// Linear mapping (default).
    #[default]
    Linear,
    /// Power curve mapping. exponent > 1.0 gives more resolution at the low end.
    Power(f32),
}

/// Unit type for parameter display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels (dB).
    Decibels,
    /// Hertz (Hz).
    Hertz,
    /// Milliseconds (ms).
    Milliseconds,
    /// Seconds (s).
    Seconds,
    /// Semitones (st).
    Semitones,
    /// A count of oscillator voices.
    Voices,
    /// Dimensionless.
    None,
}

impl ParamUnit {
    /// Unit suffix for display.
    ///
    /// ```rust
    /// use crypt_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Decibels.suffix(), " dB");
    /// assert_eq!(ParamUnit::None.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Seconds => " s",
            ParamUnit::Semitones => " st",
            ParamUnit::Voices => " voices",
            ParamUnit::None => "",
        }
    }
}

/// Metadata describing one named control.
///
/// # Example
///
/// ```rust
/// use crypt_core::{ParamDescriptor, ParamScale, ParamUnit};
///
/// let time = ParamDescriptor::new("delayTime", "Delay Time", 2.0, 2000.0, 375.0)
///     .with_short_name("Time")
///     .with_unit(ParamUnit::Milliseconds)
///     .with_scale(ParamScale::Power(2.0));
///
/// assert_eq!(time.clamp(5000.0), 2000.0);
/// assert_eq!(time.unit.suffix(), " ms");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Stable id used for lookup by name (e.g. `"amp.attack"`).
    pub string_id: &'static str,
    /// Full display name (e.g. `"Unison Voices"`).
    pub name: &'static str,
    /// Short label for compact displays (e.g. `"Time"`).
    pub short_name: &'static str,
    /// Display unit.
    pub unit: ParamUnit,
    /// Minimum value.
    pub min: f32,
    /// Maximum value.
    pub max: f32,
    /// Default value.
    pub default: f32,
    /// Recommended step for encoders; `0.0` for continuous.
    pub step: f32,
    /// Normalization curve.
    pub scale: ParamScale,
    /// Group for display (e.g. `"Oscillator"`, `"Delay"`).
    pub group: &'static str,
}

impl ParamDescriptor {
    /// Linear, dimensionless descriptor. Refine with the `with_*` builders.
    pub const fn new(
        string_id: &'static str,
        name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            string_id,
            name,
            short_name: name,
            unit: ParamUnit::None,
            min,
            max,
            default,
            step: 0.0,
            scale: ParamScale::Linear,
            group: "",
        }
    }

    /// Sets the short display name.
    pub const fn with_short_name(mut self, short_name: &'static str) -> Self {
        self.short_name = short_name;
        self
    }

    /// Sets the unit.
    pub const fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Sets the encoder step.
    pub const fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Sets the normalization scale.
    pub const fn with_scale(mut self, scale: ParamScale) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the display group.
    pub const fn with_group(mut self, group: &'static str) -> Self {
        self.group = group;
        self
    }

    /// Clamps a value to the valid range. NaN maps to the default.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Converts a plain value to `[0, 1]`, respecting [`ParamScale`].
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        let value = self.clamp(value);
        match self.scale {
            ParamScale::Linear => (value - self.min) / range,
            ParamScale::Power(exp) => libm::powf((value - self.min) / range, 1.0 / exp),
        }
    }

    /// Converts a `[0, 1]` value back to the plain range.
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let normalized = normalized.clamp(0.0, 1.0);
        match self.scale {
            ParamScale::Linear => self.min + normalized * (self.max - self.min),
            ParamScale::Power(exp) => self.min + libm::powf(normalized, exp) * (self.max - self.min),
        }
    }
}
