//! A single synthesizer voice.
//!
//! Signal path per sample:
//!
//! ```text
//! UnisonBank ─► shape_compound_wave(dirt) ─► StereoSvf ─► × level × amp env
//!                                                ▲
//!                       cutoff · 2^(env_amount · 4 · filter env)
//! ```
//!
//! Voices render additively into a shared stereo block, so several voices
//! can share one output buffer.

use crypt_core::svf::{MAX_CUTOFF, MIN_CUTOFF, RESONANCE_RANGE};
use crypt_core::{StereoSvf, midi_to_freq};

use crate::envelope::AdsrEnvelope;
use crate::oscillator::UnisonBank;

/// Pitch wheel centre position (no bend).
pub const PITCH_WHEEL_CENTER: u16 = 8192;

/// Highest 14-bit pitch wheel value.
pub const PITCH_WHEEL_MAX: u16 = 16383;

/// Note lifecycle interface the polyphony manager drives.
pub trait SynthVoice {
    /// Start `note` at `velocity` (0 to 1) with the wheel at `pitch_wheel`.
    fn note_on(&mut self, note: u8, velocity: f32, pitch_wheel: u16);

    /// Release the note, or silence it at once when `allow_tail_off` is false.
    fn note_off(&mut self, allow_tail_off: bool);

    /// Retune to a new pitch wheel position without restarting oscillators.
    fn pitch_wheel_moved(&mut self, value: u16);

    /// Add this voice's output to `left` and `right`.
    ///
    /// Both slices must have the same length. An idle voice leaves them
    /// untouched.
    fn render(&mut self, left: &mut [f32], right: &mut [f32]);

    /// Whether the voice is producing sound.
    fn is_active(&self) -> bool;
}

/// Per-voice controls, addressed by [`Voice::set_param`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceParam {
    /// Active unison partials
    Unison,
    /// Detune spread fraction
    Spread,
    /// Saw-to-square blend
    Shape,
    /// Wave-shaper drive
    Dirt,
    /// Base filter cutoff (Hz)
    Cutoff,
    /// Filter resonance (Q)
    Resonance,
    /// Filter envelope depth
    FilterEnvAmount,
    /// Pitch bend range (semitones)
    PitchBendRange,
    /// Amplitude envelope attack (s)
    AmpAttack,
    /// Amplitude envelope decay (s)
    AmpDecay,
    /// Amplitude envelope sustain level
    AmpSustain,
    /// Amplitude envelope release (s)
    AmpRelease,
    /// Filter envelope attack (s)
    FilterAttack,
    /// Filter envelope decay (s)
    FilterDecay,
    /// Filter envelope sustain level
    FilterSustain,
    /// Filter envelope release (s)
    FilterRelease,
}

/// Cubic soft clipper driven by `dirt`.
///
/// ```text
/// f = x * (1/2 + 10 * dirt)
/// y = 2 * (f - f³/3)   for |f| <= 1
/// y = ±4/3             otherwise
/// ```
///
/// Continuous everywhere and bounded to `[-4/3, 4/3]`. With `dirt = 0`
/// small signals pass at unity gain.
#[inline]
pub fn shape_compound_wave(x: f32, dirt: f32) -> f32 {
    const FACTOR: f32 = 2.0;
    let f = x * (1.0 / FACTOR + dirt * 10.0);
    if f < -1.0 {
        -FACTOR * 2.0 / 3.0
    } else if f > 1.0 {
        FACTOR * 2.0 / 3.0
    } else {
        FACTOR * (f - f * f * f / 3.0)
    }
}

/// Output level for a note velocity in `[0, 1]`. NaN counts as silent.
///
/// The floor keeps the softest notes audible.
#[inline]
pub fn velocity_level(velocity: f32) -> f32 {
    let velocity = if velocity.is_nan() {
        0.0
    } else {
        velocity.clamp(0.0, 1.0)
    };
    velocity * 0.04 + 0.02
}

/// Clamp `value` to `[min, max]`, keeping `current` when it is NaN.
#[inline]
fn clamp_or_keep(value: f32, min: f32, max: f32, current: f32) -> f32 {
    if value.is_nan() {
        current
    } else {
        value.clamp(min, max)
    }
}

/// Frequency of `note` bent by a 14-bit wheel position over `range` semitones.
#[inline]
pub fn note_frequency(note: u8, pitch_wheel: u16, range: f32) -> f32 {
    let bend = f32::from(pitch_wheel.min(PITCH_WHEEL_MAX)) / f32::from(PITCH_WHEEL_CENTER) - 1.0;
    midi_to_freq(note) * libm::exp2f(bend * range / 12.0)
}

/// One polyphonic voice: unison bank, wave-shaper, filter and two envelopes.
///
/// ## Parameters
/// - `dirt`: shaper drive (0.0 to 1.0, default 0.0)
/// - `cutoff`: base cutoff in Hz (50 to 20000, default 20000)
/// - `resonance`: filter Q (0.1 to 6, default 1.0)
/// - `filter_env_amount`: envelope depth, up to 4 octaves (0.0 to 1.0, default 0.0)
/// - `pitch_bend_range`: semitones (0 to 12, default 2)
///
/// # Example
///
/// ```rust
/// use crypt_synth::{SynthVoice, Voice, PITCH_WHEEL_CENTER};
///
/// let mut voice = Voice::new(48000.0, 1);
/// voice.note_on(69, 1.0, PITCH_WHEEL_CENTER);
///
/// let mut left = [0.0; 256];
/// let mut right = [0.0; 256];
/// voice.render(&mut left, &mut right);
/// assert!(left.iter().any(|&s| s != 0.0));
///
/// voice.note_off(false);
/// assert!(!voice.is_active());
/// ```
#[derive(Debug, Clone)]
pub struct Voice {
    bank: UnisonBank,
    /// Amplitude envelope
    pub amp_env: AdsrEnvelope,
    /// Filter cutoff envelope
    pub filter_env: AdsrEnvelope,
    filter: StereoSvf,

    /// Velocity-derived output scale
    level: f32,
    note: u8,
    pitch_wheel: u16,
    /// Trigger order, for voice stealing
    age: u64,
    sample_rate: f32,

    dirt: f32,
    cutoff: f32,
    resonance: f32,
    filter_env_amount: f32,
    pitch_bend_range: f32,
}

impl Voice {
    /// Create an idle voice. `seed` picks its detune sequence.
    pub fn new(sample_rate: f32, seed: u32) -> Self {
        let mut filter = StereoSvf::new(sample_rate);
        filter.set_params(20_000.0, 1.0);
        Self {
            bank: UnisonBank::new(sample_rate, seed),
            amp_env: AdsrEnvelope::new(sample_rate),
            filter_env: AdsrEnvelope::new(sample_rate),
            filter,
            level: 0.0,
            note: 0,
            pitch_wheel: PITCH_WHEEL_CENTER,
            age: 0,
            sample_rate,
            dirt: 0.0,
            cutoff: 20_000.0,
            resonance: 1.0,
            filter_env_amount: 0.0,
            pitch_bend_range: 2.0,
        }
    }

    /// Set sample rate for every component.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.bank.set_sample_rate(sample_rate);
        self.amp_env.set_sample_rate(sample_rate);
        self.filter_env.set_sample_rate(sample_rate);
        self.filter.set_sample_rate(sample_rate);
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Apply one control value. Out-of-range values are clamped; NaN
    /// leaves the current value in place.
    pub fn set_param(&mut self, param: VoiceParam, value: f32) {
        match param {
            VoiceParam::Unison => self.bank.set_unison(libm::roundf(value.max(1.0)) as usize),
            VoiceParam::Spread => self.bank.set_spread(value),
            VoiceParam::Shape => self.bank.set_shape(value),
            VoiceParam::Dirt => self.dirt = clamp_or_keep(value, 0.0, 1.0, self.dirt),
            VoiceParam::Cutoff => {
                self.cutoff = clamp_or_keep(value, MIN_CUTOFF, MAX_CUTOFF, self.cutoff);
            }
            VoiceParam::Resonance => {
                self.resonance = clamp_or_keep(
                    value,
                    RESONANCE_RANGE.0,
                    RESONANCE_RANGE.1,
                    self.resonance,
                );
            }
            VoiceParam::FilterEnvAmount => {
                self.filter_env_amount = clamp_or_keep(value, 0.0, 1.0, self.filter_env_amount);
            }
            VoiceParam::PitchBendRange => {
                self.pitch_bend_range = clamp_or_keep(value, 0.0, 12.0, self.pitch_bend_range);
                if self.is_active() {
                    self.retune();
                }
            }
            VoiceParam::AmpAttack => self.amp_env.set_attack(value),
            VoiceParam::AmpDecay => self.amp_env.set_decay(value),
            VoiceParam::AmpSustain => self.amp_env.set_sustain(value),
            VoiceParam::AmpRelease => self.amp_env.set_release(value),
            VoiceParam::FilterAttack => self.filter_env.set_attack(value),
            VoiceParam::FilterDecay => self.filter_env.set_decay(value),
            VoiceParam::FilterSustain => self.filter_env.set_sustain(value),
            VoiceParam::FilterRelease => self.filter_env.set_release(value),
        }
    }

    /// The oscillator bank.
    pub fn bank(&self) -> &UnisonBank {
        &self.bank
    }

    /// Note currently assigned.
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Velocity-derived output scale.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Cutoff the filter ran at on the last rendered sample.
    pub fn filter_cutoff(&self) -> f32 {
        self.filter.cutoff()
    }

    /// Trigger order stamp.
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Set trigger order stamp.
    pub fn set_age(&mut self, age: u64) {
        self.age = age;
    }

    /// `true` once the note has been released but is still sounding.
    pub fn is_releasing(&self) -> bool {
        self.amp_env.is_releasing()
    }

    /// Return to the idle state, clearing filter history.
    pub fn reset(&mut self) {
        self.level = 0.0;
        self.amp_env.reset();
        self.filter_env.reset();
        self.filter.reset();
        self.age = 0;
    }

    fn retune(&mut self) {
        self.bank.set_frequency(note_frequency(
            self.note,
            self.pitch_wheel,
            self.pitch_bend_range,
        ));
    }

    #[inline]
    fn modulated_cutoff(&self, env: f32) -> f32 {
        if self.filter_env_amount == 0.0 {
            self.cutoff
        } else {
            self.cutoff * libm::exp2f(self.filter_env_amount * 4.0 * env)
        }
    }
}

impl SynthVoice for Voice {
    fn note_on(&mut self, note: u8, velocity: f32, pitch_wheel: u16) {
        // A fresh note starts from silence; a stolen voice glides on from
        // its current envelope level.
        if !self.amp_env.is_active() {
            self.amp_env.reset();
            self.filter_env.reset();
            self.filter.reset();
        }

        self.note = note;
        self.pitch_wheel = pitch_wheel.min(PITCH_WHEEL_MAX);
        self.level = velocity_level(velocity);
        self.bank
            .trigger(note_frequency(note, self.pitch_wheel, self.pitch_bend_range));
        self.filter.set_params(self.cutoff, self.resonance);

        self.amp_env.gate_on();
        self.filter_env.gate_on();
    }

    fn note_off(&mut self, allow_tail_off: bool) {
        if allow_tail_off {
            self.amp_env.gate_off();
            self.filter_env.gate_off();
        } else {
            self.level = 0.0;
            self.amp_env.reset();
            self.filter_env.reset();
        }
    }

    fn pitch_wheel_moved(&mut self, value: u16) {
        self.pitch_wheel = value.min(PITCH_WHEEL_MAX);
        self.retune();
    }

    fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        if !self.amp_env.is_active() {
            return;
        }

        for (out_l, out_r) in left.iter_mut().zip(right.iter_mut()) {
            let amp = self.amp_env.advance();
            let filter_env = self.filter_env.advance();

            let (l, r) = self.bank.render();
            let l = shape_compound_wave(l, self.dirt);
            let r = shape_compound_wave(r, self.dirt);

            self.filter
                .set_params(self.modulated_cutoff(filter_env), self.resonance);
            let (l, r) = self.filter.process_stereo(l, r);

            let gain = self.level * amp;
            *out_l += l * gain;
            *out_r += r * gain;
        }
    }

    fn is_active(&self) -> bool {
        self.amp_env.is_active()
    }
}
