//! Parameter table, shared store and owner registration.
//!
//! Every control the synthesizer exposes is a [`ParamId`]. Non-real-time
//! code writes values into a [`ParamStore`] (lock-free atomics, shared
//! through an `Arc`). At each block boundary the engine polls the store and
//! hands changed values to the DSP owners that registered for them through
//! [`ParamListener`]. Owners cache values in plain fields, so the render
//! path never touches the store.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crypt_core::{ParamDescriptor, ParamScale, ParamUnit};
use crypt_effects::{FxChain, FxParam};
use crypt_synth::{VoiceManager, VoiceParam};

use crate::error::{EngineError, Result};

/// Every synthesizer control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    /// Active unison partials per voice
    Unison,
    /// Unison detune spread
    Spread,
    /// Saw-to-square blend
    Shape,
    /// Wave-shaper drive
    Dirt,
    /// Base filter cutoff
    Cutoff,
    /// Filter resonance
    Resonance,
    /// Filter envelope depth
    FilterEnvAmount,
    /// Pitch bend range
    PitchBendRange,
    /// Amplitude envelope attack
    AmpAttack,
    /// Amplitude envelope decay
    AmpDecay,
    /// Amplitude envelope sustain
    AmpSustain,
    /// Amplitude envelope release
    AmpRelease,
    /// Filter envelope attack
    FilterAttack,
    /// Filter envelope decay
    FilterDecay,
    /// Filter envelope sustain
    FilterSustain,
    /// Filter envelope release
    FilterRelease,
    /// Delay time
    DelayTime,
    /// Delay feedback
    DelayFeedback,
    /// Delay echo level
    DelayMix,
    /// Phaser sweep depth
    PhaserDepth,
    /// Phaser LFO rate
    PhaserRate,
    /// Phaser mix
    PhaserMix,
    /// Reverb macro
    Space,
    /// Output gain
    Master,
}

/// Skew factor `s` expressed as a power curve.
const fn skew(s: f32) -> ParamScale {
    ParamScale::Power(1.0 / s)
}

const fn env_time(
    id: &'static str,
    name: &'static str,
    default: f32,
    group: &'static str,
) -> ParamDescriptor {
    ParamDescriptor::new(id, name, 0.0, 8.0, default)
        .with_unit(ParamUnit::Seconds)
        .with_step(0.001)
        .with_scale(skew(0.3))
        .with_group(group)
}

const fn env_sustain(id: &'static str, group: &'static str) -> ParamDescriptor {
    ParamDescriptor::new(id, "Sustain", 0.0, 1.0, 0.6)
        .with_step(0.01)
        .with_group(group)
}

static DESCRIPTORS: [ParamDescriptor; ParamId::COUNT] = [
    ParamDescriptor::new("unison", "Unison Voices", 4.0, 64.0, 32.0)
        .with_short_name("Unison")
        .with_unit(ParamUnit::Voices)
        .with_step(1.0)
        .with_scale(skew(0.5))
        .with_group("Oscillator"),
    ParamDescriptor::new("spread", "Unison Spread", 0.0, 0.1, 0.03)
        .with_short_name("Spread")
        .with_step(0.001)
        .with_group("Oscillator"),
    ParamDescriptor::new("shape", "Osc Shape", 0.0, 1.0, 0.0)
        .with_short_name("Shape")
        .with_step(0.01)
        .with_group("Oscillator"),
    ParamDescriptor::new("dirt", "Dirt", 0.0, 1.0, 0.0)
        .with_step(0.01)
        .with_group("Void"),
    ParamDescriptor::new("cutoff", "Filter Cutoff", 50.0, 20000.0, 20000.0)
        .with_short_name("Cutoff")
        .with_unit(ParamUnit::Hertz)
        .with_step(1.0)
        .with_scale(skew(0.2))
        .with_group("Filter"),
    ParamDescriptor::new("resonance", "Filter Resonance", 0.1, 6.0, 1.0)
        .with_short_name("Resonance")
        .with_step(0.01)
        .with_group("Filter"),
    ParamDescriptor::new("filterEnvAmount", "Filter Env Amount", 0.0, 1.0, 0.0)
        .with_short_name("Env Amount")
        .with_step(0.001)
        .with_group("Filter"),
    ParamDescriptor::new("pitchBendRange", "Pitchbend Range", 0.0, 12.0, 2.0)
        .with_short_name("PB Range")
        .with_unit(ParamUnit::Semitones)
        .with_step(1.0)
        .with_group("Globals"),
    env_time("amp.attack", "Attack", 0.02, "Amp Env"),
    env_time("amp.decay", "Decay", 0.2, "Amp Env"),
    env_sustain("amp.sustain", "Amp Env"),
    env_time("amp.release", "Release", 0.5, "Amp Env"),
    env_time("filter.attack", "Attack", 0.02, "Filter Env"),
    env_time("filter.decay", "Decay", 0.2, "Filter Env"),
    env_sustain("filter.sustain", "Filter Env"),
    env_time("filter.release", "Release", 0.5, "Filter Env"),
    ParamDescriptor::new("delayTime", "Delay Time", 2.0, 2000.0, 375.0)
        .with_short_name("Time")
        .with_unit(ParamUnit::Milliseconds)
        .with_step(0.1)
        .with_scale(skew(0.5))
        .with_group("Delay"),
    ParamDescriptor::new("delayFeedback", "Delay Feedback", 0.0, 0.99, 0.5)
        .with_short_name("Feedback")
        .with_step(0.01)
        .with_group("Delay"),
    ParamDescriptor::new("delayMix", "Delay Mix", 0.0, 1.0, 0.3)
        .with_short_name("Mix")
        .with_step(0.01)
        .with_group("Delay"),
    ParamDescriptor::new("phaserDepth", "Phaser Depth", 0.0, 1.0, 0.5)
        .with_short_name("Depth")
        .with_step(0.01)
        .with_group("Phaser"),
    ParamDescriptor::new("phaserRate", "Phaser Rate", 0.02, 1.0, 0.2)
        .with_short_name("Rate")
        .with_unit(ParamUnit::Hertz)
        .with_step(0.01)
        .with_scale(skew(0.5))
        .with_group("Phaser"),
    ParamDescriptor::new("phaserMix", "Phaser Mix", 0.0, 1.0, 0.3)
        .with_short_name("Mix")
        .with_step(0.01)
        .with_group("Phaser"),
    ParamDescriptor::new("space", "Space", 0.0, 1.0, 0.2)
        .with_step(0.01)
        .with_group("Void"),
    ParamDescriptor::new("master", "Master Gain", -12.0, 3.0, 0.0)
        .with_short_name("Master")
        .with_unit(ParamUnit::Decibels)
        .with_step(0.01)
        .with_group("Globals"),
];

impl ParamId {
    /// Number of parameters.
    pub const COUNT: usize = 24;

    /// Every parameter, in table order.
    pub const ALL: [ParamId; Self::COUNT] = [
        ParamId::Unison,
        ParamId::Spread,
        ParamId::Shape,
        ParamId::Dirt,
        ParamId::Cutoff,
        ParamId::Resonance,
        ParamId::FilterEnvAmount,
        ParamId::PitchBendRange,
        ParamId::AmpAttack,
        ParamId::AmpDecay,
        ParamId::AmpSustain,
        ParamId::AmpRelease,
        ParamId::FilterAttack,
        ParamId::FilterDecay,
        ParamId::FilterSustain,
        ParamId::FilterRelease,
        ParamId::DelayTime,
        ParamId::DelayFeedback,
        ParamId::DelayMix,
        ParamId::PhaserDepth,
        ParamId::PhaserRate,
        ParamId::PhaserMix,
        ParamId::Space,
        ParamId::Master,
    ];

    /// Position in [`ParamId::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Range, default, unit and labels.
    ///
    /// ```rust
    /// use crypt_engine::ParamId;
    ///
    /// let desc = ParamId::DelayTime.descriptor();
    /// assert_eq!(desc.string_id, "delayTime");
    /// assert_eq!(desc.default, 375.0);
    /// ```
    #[inline]
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &DESCRIPTORS[self.index()]
    }

    /// Stable string id.
    pub fn name(self) -> &'static str {
        self.descriptor().string_id
    }

    /// Look up a parameter by string id, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<ParamId> {
        Self::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(name))
    }

    /// The voice control this parameter drives, if any.
    pub const fn voice_param(self) -> Option<VoiceParam> {
        Some(match self {
            ParamId::Unison => VoiceParam::Unison,
            ParamId::Spread => VoiceParam::Spread,
            ParamId::Shape => VoiceParam::Shape,
            ParamId::Dirt => VoiceParam::Dirt,
            ParamId::Cutoff => VoiceParam::Cutoff,
            ParamId::Resonance => VoiceParam::Resonance,
            ParamId::FilterEnvAmount => VoiceParam::FilterEnvAmount,
            ParamId::PitchBendRange => VoiceParam::PitchBendRange,
            ParamId::AmpAttack => VoiceParam::AmpAttack,
            ParamId::AmpDecay => VoiceParam::AmpDecay,
            ParamId::AmpSustain => VoiceParam::AmpSustain,
            ParamId::AmpRelease => VoiceParam::AmpRelease,
            ParamId::FilterAttack => VoiceParam::FilterAttack,
            ParamId::FilterDecay => VoiceParam::FilterDecay,
            ParamId::FilterSustain => VoiceParam::FilterSustain,
            ParamId::FilterRelease => VoiceParam::FilterRelease,
            _ => return None,
        })
    }

    /// The effects-chain control this parameter drives, if any.
    pub const fn fx_param(self) -> Option<FxParam> {
        Some(match self {
            ParamId::DelayTime => FxParam::DelayTime,
            ParamId::DelayFeedback => FxParam::DelayFeedback,
            ParamId::DelayMix => FxParam::DelayMix,
            ParamId::PhaserDepth => FxParam::PhaserDepth,
            ParamId::PhaserRate => FxParam::PhaserRate,
            ParamId::PhaserMix => FxParam::PhaserMix,
            ParamId::Space => FxParam::Space,
            _ => return None,
        })
    }
}

impl core::fmt::Display for ParamId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse `name=value` into a parameter and its raw (unclamped) value.
///
/// ```rust
/// use crypt_engine::{ParamId, parse_assignment};
///
/// let (id, value) = parse_assignment("cutoff=1200").unwrap();
/// assert_eq!(id, ParamId::Cutoff);
/// assert_eq!(value, 1200.0);
/// ```
pub fn parse_assignment(text: &str) -> Result<(ParamId, f32)> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| EngineError::UnknownParameter(text.to_string()))?;
    let (name, value) = (name.trim(), value.trim());
    let id = ParamId::from_name(name).ok_or_else(|| EngineError::UnknownParameter(name.to_string()))?;
    let parsed = value
        .parse::<f32>()
        .map_err(|_| EngineError::InvalidParameterValue {
            name: name.to_string(),
            value: value.to_string(),
        })?;
    Ok((id, parsed))
}

/// Lock-free table of current parameter values.
///
/// Values are `f32` bit-cast into `AtomicU32`. Any thread may write; the
/// audio thread reads. A version counter lets readers skip unchanged
/// blocks cheaply.
///
/// # Example
///
/// ```rust
/// use crypt_engine::{ParamId, ParamStore};
///
/// let store = ParamStore::new();
/// assert_eq!(store.get(ParamId::Cutoff), 20000.0);
///
/// // Out-of-range values are clamped
/// assert_eq!(store.set(ParamId::Cutoff, 1.0), 50.0);
/// ```
#[derive(Debug)]
pub struct ParamStore {
    values: [AtomicU32; ParamId::COUNT],
    version: AtomicU64,
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamStore {
    /// Store holding every parameter's default.
    pub fn new() -> Self {
        Self {
            values: core::array::from_fn(|i| AtomicU32::new(DESCRIPTORS[i].default.to_bits())),
            version: AtomicU64::new(0),
        }
    }

    /// Current value.
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Relaxed))
    }

    /// Clamp `value` to the parameter's range, store it and return what was
    /// stored. NaN stores the default.
    pub fn set(&self, id: ParamId, value: f32) -> f32 {
        let clamped = id.descriptor().clamp(value);
        self.values[id.index()].store(clamped.to_bits(), Ordering::Relaxed);
        self.version.fetch_add(1, Ordering::Release);
        clamped
    }

    /// [`set`](Self::set) by string id.
    pub fn set_by_name(&self, name: &str, value: f32) -> Result<f32> {
        let id = ParamId::from_name(name).ok_or_else(|| {
            tracing::warn!(name, "unknown parameter");
            EngineError::UnknownParameter(name.to_string())
        })?;
        Ok(self.set(id, value))
    }

    /// Set from normalized `[0, 1]` knob position.
    pub fn set_normalized(&self, id: ParamId, normalized: f32) -> f32 {
        self.set(id, id.descriptor().denormalize(normalized))
    }

    /// Put every parameter back to its default.
    pub fn reset_to_defaults(&self) {
        for id in ParamId::ALL {
            self.values[id.index()].store(id.descriptor().default.to_bits(), Ordering::Relaxed);
        }
        self.version.fetch_add(1, Ordering::Release);
    }

    /// Change counter, bumped by every write.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Copy of every value, in [`ParamId::ALL`] order.
    pub fn snapshot(&self) -> [f32; ParamId::COUNT] {
        core::array::from_fn(|i| f32::from_bits(self.values[i].load(Ordering::Relaxed)))
    }
}

/// A DSP owner that caches some parameters.
///
/// `PARAMS` is the owner's registration: the engine only forwards changes
/// to ids listed there.
pub trait ParamListener {
    /// Parameters this owner listens to.
    const PARAMS: &'static [ParamId];

    /// Store a new value in the owner's cached fields.
    fn apply_param(&mut self, id: ParamId, value: f32);

    /// Whether `id` is registered for this owner.
    fn listens_to(id: ParamId) -> bool {
        Self::PARAMS.contains(&id)
    }
}

const VOICE_PARAMS: [ParamId; 16] = [
    ParamId::Unison,
    ParamId::Spread,
    ParamId::Shape,
    ParamId::Dirt,
    ParamId::Cutoff,
    ParamId::Resonance,
    ParamId::FilterEnvAmount,
    ParamId::PitchBendRange,
    ParamId::AmpAttack,
    ParamId::AmpDecay,
    ParamId::AmpSustain,
    ParamId::AmpRelease,
    ParamId::FilterAttack,
    ParamId::FilterDecay,
    ParamId::FilterSustain,
    ParamId::FilterRelease,
];

const FX_PARAMS: [ParamId; 7] = [
    ParamId::PhaserDepth,
    ParamId::PhaserRate,
    ParamId::PhaserMix,
    ParamId::DelayTime,
    ParamId::DelayFeedback,
    ParamId::DelayMix,
    ParamId::Space,
];

impl<const N: usize> ParamListener for VoiceManager<N> {
    const PARAMS: &'static [ParamId] = &VOICE_PARAMS;

    fn apply_param(&mut self, id: ParamId, value: f32) {
        if let Some(param) = id.voice_param() {
            self.set_param(param, value);
        }
    }
}

impl ParamListener for FxChain {
    const PARAMS: &'static [ParamId] = &FX_PARAMS;

    fn apply_param(&mut self, id: ParamId, value: f32) {
        if let Some(param) = id.fx_param() {
            self.set_param(param, value);
        }
    }
}
