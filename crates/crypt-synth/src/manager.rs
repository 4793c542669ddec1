//! Polyphonic voice allocation.
//!
//! [`VoiceManager`] owns a fixed pool of [`Voice`]s, routes note events to
//! them and mixes every sounding voice into one stereo block. When the pool
//! is exhausted a voice is stolen according to [`VoiceAllocationMode`].

use crate::voice::{PITCH_WHEEL_CENTER, PITCH_WHEEL_MAX, SynthVoice, Voice, VoiceParam};

/// Voice stealing policy used when every voice is busy.
///
/// Voices that are already releasing are always stolen before held ones;
/// the mode picks among the candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoiceAllocationMode {
    /// Steal the voice triggered longest ago (default)
    #[default]
    OldestNote,
    /// Steal the voice with the lowest amplitude envelope level
    QuietestVoice,
    /// Steal the lowest pitch voice
    LowestNote,
    /// Steal the highest pitch voice
    HighestNote,
}

/// Fixed pool of `N` voices.
///
/// # Example
///
/// ```rust
/// use crypt_synth::{VoiceAllocationMode, VoiceManager};
///
/// let mut manager: VoiceManager<8> = VoiceManager::new(48000.0);
/// manager.set_allocation_mode(VoiceAllocationMode::QuietestVoice);
///
/// manager.note_on(60, 0.8);
/// manager.note_on(64, 0.8);
///
/// let mut left = [0.0; 512];
/// let mut right = [0.0; 512];
/// manager.render(&mut left, &mut right);
/// assert_eq!(manager.active_voice_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct VoiceManager<const N: usize> {
    voices: [Voice; N],
    allocation_mode: VoiceAllocationMode,
    sample_rate: f32,
    /// Global trigger counter
    age_counter: u64,
    /// Last pitch wheel position, handed to new notes
    pitch_wheel: u16,
}

impl<const N: usize> VoiceManager<N> {
    /// Create a pool of `N` idle voices.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: core::array::from_fn(|i| {
                Voice::new(sample_rate, (i as u32 + 1).wrapping_mul(0x9E37_79B9))
            }),
            allocation_mode: VoiceAllocationMode::default(),
            sample_rate,
            age_counter: 0,
            pitch_wheel: PITCH_WHEEL_CENTER,
        }
    }

    /// Set sample rate for all voices.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Set voice stealing policy.
    pub fn set_allocation_mode(&mut self, mode: VoiceAllocationMode) {
        self.allocation_mode = mode;
    }

    /// Current voice stealing policy.
    pub fn allocation_mode(&self) -> VoiceAllocationMode {
        self.allocation_mode
    }

    /// Pool size.
    pub fn voice_count(&self) -> usize {
        N
    }

    /// Number of sounding voices.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Read access to all voices.
    pub fn voices(&self) -> &[Voice; N] {
        &self.voices
    }

    /// Mutable access to all voices.
    pub fn voices_mut(&mut self) -> &mut [Voice; N] {
        &mut self.voices
    }

    /// Broadcast a control value to every voice.
    pub fn set_param(&mut self, param: VoiceParam, value: f32) {
        for voice in &mut self.voices {
            voice.set_param(param, value);
        }
    }

    /// Last pitch wheel position.
    pub fn pitch_wheel(&self) -> u16 {
        self.pitch_wheel
    }

    /// Start a note. A held voice already playing `note` is released first.
    /// An empty pool (`N == 0`) ignores notes.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        for voice in &mut self.voices {
            if voice.is_active() && !voice.is_releasing() && voice.note() == note {
                voice.note_off(true);
            }
        }

        let Some(idx) = self.allocate_voice() else {
            return;
        };
        self.age_counter += 1;
        let voice = &mut self.voices[idx];
        voice.set_age(self.age_counter);
        voice.note_on(note, velocity, self.pitch_wheel);
    }

    /// Release every held voice playing `note`. Unknown notes are ignored.
    pub fn note_off(&mut self, note: u8, allow_tail_off: bool) {
        for voice in &mut self.voices {
            if voice.is_active() && !voice.is_releasing() && voice.note() == note {
                voice.note_off(allow_tail_off);
            }
        }
    }

    /// Bend every sounding voice and remember the position for new notes.
    pub fn pitch_wheel_moved(&mut self, value: u16) {
        self.pitch_wheel = value.min(PITCH_WHEEL_MAX);
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.pitch_wheel_moved(self.pitch_wheel);
            }
        }
    }

    /// Release (or silence) every voice.
    pub fn all_notes_off(&mut self, allow_tail_off: bool) {
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.note_off(allow_tail_off);
            }
        }
    }

    /// Silence all voices and forget trigger order and pitch bend.
    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
        self.age_counter = 0;
        self.pitch_wheel = PITCH_WHEEL_CENTER;
    }

    /// Clear `left`/`right` and mix every sounding voice into them.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        left.fill(0.0);
        right.fill(0.0);
        for voice in &mut self.voices {
            voice.render(left, right);
        }
    }

    fn allocate_voice(&self) -> Option<usize> {
        if let Some(idx) = self.voices.iter().position(|v| !v.is_active()) {
            return Some(idx);
        }

        let any_releasing = self.voices.iter().any(Voice::is_releasing);
        let candidates = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| !any_releasing || v.is_releasing());

        let chosen = match self.allocation_mode {
            VoiceAllocationMode::OldestNote => candidates.min_by_key(|(_, v)| v.age()),
            VoiceAllocationMode::QuietestVoice => {
                candidates.min_by(|(_, a), (_, b)| a.amp_env.level().total_cmp(&b.amp_env.level()))
            }
            VoiceAllocationMode::LowestNote => candidates.min_by_key(|(_, v)| v.note()),
            VoiceAllocationMode::HighestNote => candidates.max_by_key(|(_, v)| v.note()),
        };
        chosen.map(|(i, _)| i)
    }
}
