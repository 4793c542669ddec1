//! ADSR envelope generator.
//!
//! A linear four-stage envelope driven per sample. Each voice runs two of
//! them: one scales the amplitude, the other modulates the filter cutoff.
//!
//! # Deferred parameters
//!
//! Stage times and the sustain level are held in two slots. Setters write
//! the *pending* slot; the pending values become *active* only when the
//! envelope leaves [`EnvelopeState::Idle`] on [`AdsrEnvelope::gate_on`].
//! Turning a knob while a note sounds therefore never bends the curve that
//! is already running.

/// Envelope stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeState {
    /// Envelope is inactive (output = 0)
    #[default]
    Idle,
    /// Rising towards 1.0
    Attack,
    /// Falling towards the sustain level
    Decay,
    /// Holding at the sustain level until gate off
    Sustain,
    /// Falling towards 0 after gate off
    Release,
}

/// Stage times in seconds and the sustain level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    /// Attack time in seconds. `0` skips the stage.
    pub attack: f32,
    /// Decay time in seconds. `0` skips the stage.
    pub decay: f32,
    /// Sustain level in `[0, 1]`.
    pub sustain: f32,
    /// Release time in seconds. `0` silences immediately on gate off.
    pub release: f32,
}

impl AdsrParams {
    /// Create a parameter set.
    pub const fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Negative or NaN times become zero, sustain is clamped to `[0, 1]`.
    fn sanitized(self) -> Self {
        fn time(t: f32) -> f32 {
            if t.is_nan() { 0.0 } else { t.max(0.0) }
        }
        Self {
            attack: time(self.attack),
            decay: time(self.decay),
            sustain: if self.sustain.is_nan() {
                0.0
            } else {
                self.sustain.clamp(0.0, 1.0)
            },
            release: time(self.release),
        }
    }
}

impl Default for AdsrParams {
    fn default() -> Self {
        Self::new(0.02, 0.2, 0.6, 0.5)
    }
}

/// Per-sample increment covering `distance` in `seconds`, or 0 for an
/// instantaneous stage.
#[inline]
fn stage_rate(distance: f32, seconds: f32, sample_rate: f32) -> f32 {
    if seconds > 0.0 {
        distance / (seconds * sample_rate)
    } else {
        0.0
    }
}

/// Linear ADSR envelope generator.
///
/// ## Parameters
/// - `attack`: 0.0 to 8.0 s (default 0.02)
/// - `decay`: 0.0 to 8.0 s (default 0.2)
/// - `sustain`: 0.0 to 1.0 (default 0.6)
/// - `release`: 0.0 to 8.0 s (default 0.5)
///
/// [`advance`](Self::advance) returns the level *before* stepping, so the
/// first sample after a gate on from idle is exactly 0.
///
/// # Example
///
/// ```rust
/// use crypt_synth::{AdsrEnvelope, AdsrParams, EnvelopeState};
///
/// let mut env = AdsrEnvelope::new(48000.0);
/// env.set_params(AdsrParams::new(0.01, 0.1, 0.7, 0.2));
///
/// env.gate_on();
/// assert_eq!(env.advance(), 0.0);
/// assert_eq!(env.state(), EnvelopeState::Attack);
///
/// env.gate_off();
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    state: EnvelopeState,
    level: f32,
    /// Parameters the running curve was started with
    active: AdsrParams,
    /// Parameters for the next note
    pending: AdsrParams,
    sample_rate: f32,
    attack_rate: f32,
    decay_rate: f32,
    release_rate: f32,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(44100.0)
    }
}

impl AdsrEnvelope {
    /// Create an idle envelope with default parameters.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            active: AdsrParams::default(),
            pending: AdsrParams::default(),
            sample_rate,
            attack_rate: 0.0,
            decay_rate: 0.0,
            release_rate: 0.0,
        };
        env.recalculate_rates();
        env
    }

    /// Change sample rate. Rates of the running stage are recomputed.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_rates();
        if self.state == EnvelopeState::Release {
            self.release_rate = stage_rate(self.level, self.active.release, sample_rate);
        }
    }

    /// Store parameters for the next note.
    pub fn set_params(&mut self, params: AdsrParams) {
        self.pending = params.sanitized();
    }

    /// Set the pending attack time in seconds.
    pub fn set_attack(&mut self, seconds: f32) {
        self.set_params(AdsrParams {
            attack: seconds,
            ..self.pending
        });
    }

    /// Set the pending decay time in seconds.
    pub fn set_decay(&mut self, seconds: f32) {
        self.set_params(AdsrParams {
            decay: seconds,
            ..self.pending
        });
    }

    /// Set the pending sustain level.
    pub fn set_sustain(&mut self, level: f32) {
        self.set_params(AdsrParams {
            sustain: level,
            ..self.pending
        });
    }

    /// Set the pending release time in seconds.
    pub fn set_release(&mut self, seconds: f32) {
        self.set_params(AdsrParams {
            release: seconds,
            ..self.pending
        });
    }

    /// Parameters of the curve currently running.
    pub fn params(&self) -> AdsrParams {
        self.active
    }

    /// Parameters that will be used from the next note on.
    pub fn pending_params(&self) -> AdsrParams {
        self.pending
    }

    /// Start (or restart) the envelope.
    ///
    /// From idle, the pending parameters become active and the attack starts
    /// at 0. While active, the attack restarts from the current level.
    pub fn gate_on(&mut self) {
        if self.state == EnvelopeState::Idle {
            self.active = self.pending;
            self.recalculate_rates();
            self.level = 0.0;
        }

        if self.attack_rate > 0.0 {
            self.state = EnvelopeState::Attack;
        } else if self.decay_rate > 0.0 {
            self.level = 1.0;
            self.state = EnvelopeState::Decay;
        } else {
            self.level = self.active.sustain;
            self.state = EnvelopeState::Sustain;
        }
    }

    /// Enter release from whatever stage is running.
    pub fn gate_off(&mut self) {
        if self.state == EnvelopeState::Idle {
            return;
        }
        if self.active.release > 0.0 {
            self.release_rate = stage_rate(self.level, self.active.release, self.sample_rate);
            self.state = EnvelopeState::Release;
        } else {
            self.reset();
        }
    }

    /// Return to idle immediately.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
    }

    /// Current stage.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Current output level.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// `true` unless idle.
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// `true` while in the release stage.
    pub fn is_releasing(&self) -> bool {
        self.state == EnvelopeState::Release
    }

    /// Output the current level and step one sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let out = self.level;
        match self.state {
            EnvelopeState::Idle => return 0.0,
            EnvelopeState::Attack => {
                self.level += self.attack_rate;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    if self.decay_rate > 0.0 {
                        self.state = EnvelopeState::Decay;
                    } else {
                        self.state = EnvelopeState::Sustain;
                    }
                }
            }
            EnvelopeState::Decay => {
                self.level -= self.decay_rate;
                if self.level <= self.active.sustain {
                    self.level = self.active.sustain;
                    self.state = EnvelopeState::Sustain;
                }
            }
            EnvelopeState::Sustain => {
                self.level = self.active.sustain;
            }
            EnvelopeState::Release => {
                self.level -= self.release_rate;
                if self.level <= 0.0 {
                    self.reset();
                }
            }
        }
        out
    }

    fn recalculate_rates(&mut self) {
        let p = self.active;
        self.attack_rate = stage_rate(1.0, p.attack, self.sample_rate);
        self.decay_rate = stage_rate(1.0 - p.sustain, p.decay, self.sample_rate);
        self.release_rate = stage_rate(p.sustain, p.release, self.sample_rate);
    }
}
