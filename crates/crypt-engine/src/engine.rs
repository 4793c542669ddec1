//! Top-level real-time engine.

use std::sync::Arc;

use crypt_core::{Effect, db_to_power_gain};
use crypt_effects::FxChain;
use crypt_synth::{VoiceAllocationMode, VoiceManager};

use crate::config::{EngineConfig, validate_sample_rate};
use crate::error::{EngineError, Result};
use crate::events::{EventQueue, EventSender, NoteEvent, TimedEvent, event_queue};
use crate::params::{ParamId, ParamListener, ParamStore};
use crate::scope::{ScopeReader, ScopeWriter, scope_channel};

/// Sample rate used until [`Engine::prepare`] runs.
pub const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

/// Default polyphony.
pub const MAX_POLYPHONY: usize = 8;

/// Engine with the default polyphony.
pub type CryptEngine = Engine<MAX_POLYPHONY>;

/// Control-side handle to a running [`Engine`].
///
/// Cloneable and `Send + Sync`. Parameter writes and queued events are
/// picked up at the start of the next block.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    params: Arc<ParamStore>,
    events: EventSender,
}

impl EngineHandle {
    /// The shared parameter store.
    pub fn params(&self) -> &Arc<ParamStore> {
        &self.params
    }

    /// Set a parameter, returning the clamped value.
    pub fn set_param(&self, id: ParamId, value: f32) -> f32 {
        self.params.set(id, value)
    }

    /// Set a parameter by string id.
    pub fn set_param_by_name(&self, name: &str, value: f32) -> Result<f32> {
        self.params.set_by_name(name, value)
    }

    /// Current value of a parameter.
    pub fn param(&self, id: ParamId) -> f32 {
        self.params.get(id)
    }

    /// Queue an event for the next block. `false` if it was dropped.
    pub fn send(&self, event: NoteEvent) -> bool {
        self.events.send(event)
    }

    /// Queue a note-on.
    pub fn note_on(&self, note: u8, velocity: f32) -> bool {
        self.send(NoteEvent::NoteOn { note, velocity })
    }

    /// Queue a note-off with tail-off.
    pub fn note_off(&self, note: u8) -> bool {
        self.send(NoteEvent::NoteOff {
            note,
            allow_tail_off: true,
        })
    }
}

/// The synthesizer: voices, effects, master gain and scope feed.
///
/// Owns every piece of DSP state. One instance lives on the audio thread;
/// the [`EngineHandle`] and [`ScopeReader`] returned by [`Engine::new`]
/// are the only ways in from elsewhere.
///
/// # Example
///
/// ```rust
/// use crypt_engine::{CryptEngine, EngineConfig, NoteEvent, ParamId, TimedEvent};
///
/// let (mut engine, handle, _scope) = CryptEngine::new(&EngineConfig::default());
/// engine.prepare(48000.0, 512).unwrap();
/// handle.set_param(ParamId::Cutoff, 2000.0);
///
/// let mut left = vec![0.0f32; 512];
/// let mut right = vec![0.0f32; 512];
/// let events = [TimedEvent::new(128, NoteEvent::NoteOn { note: 57, velocity: 0.8 })];
/// engine.process_block(&mut left, &mut right, &events);
///
/// assert!(left[..128].iter().all(|&s| s == 0.0));
/// assert_eq!(engine.active_voice_count(), 1);
/// ```
#[derive(Debug)]
pub struct Engine<const N: usize> {
    voices: VoiceManager<N>,
    fx: FxChain,
    params: Arc<ParamStore>,
    /// Store version last applied
    param_version: u64,
    /// Values last applied, per parameter
    applied: [f32; ParamId::COUNT],
    events: EventQueue,
    scope: ScopeWriter,
    master_gain: f32,
    sample_rate: f32,
    max_block_size: usize,
    prepared: bool,
}

impl<const N: usize> Engine<N> {
    /// Build an engine at [`DEFAULT_SAMPLE_RATE`]. Call
    /// [`prepare`](Self::prepare) before streaming.
    pub fn new(config: &EngineConfig) -> (Self, EngineHandle, ScopeReader) {
        let params = Arc::new(ParamStore::new());
        let (sender, events) = event_queue(config.event_capacity);
        let (scope, scope_reader) = scope_channel(config.scope_capacity);

        let mut engine = Self {
            voices: VoiceManager::new(DEFAULT_SAMPLE_RATE),
            fx: FxChain::new(DEFAULT_SAMPLE_RATE),
            params: Arc::clone(&params),
            param_version: params.version(),
            applied: params.snapshot(),
            events,
            scope,
            master_gain: 1.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_block_size: config.max_block_size,
            prepared: false,
        };
        for id in ParamId::ALL {
            engine.dispatch(id, engine.applied[id.index()]);
        }
        engine.fx.reset();

        tracing::debug!(
            voices = N,
            scope_capacity = config.scope_capacity,
            event_capacity = config.event_capacity,
            "engine created"
        );

        let handle = EngineHandle {
            params,
            events: sender,
        };
        (engine, handle, scope_reader)
    }

    /// Set the stream format. Must run before the first real block; may
    /// allocate.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) -> Result<()> {
        validate_sample_rate(sample_rate)?;
        if max_block_size == 0 {
            return Err(EngineError::InvalidBlockSize(max_block_size));
        }

        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.voices.set_sample_rate(sample_rate);
        self.fx.set_sample_rate(sample_rate);
        self.sync_params();
        self.fx.reset();
        self.prepared = true;

        tracing::info!(sample_rate, max_block_size, "engine prepared");
        Ok(())
    }

    /// Whether [`prepare`](Self::prepare) has run.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Block size given to [`prepare`](Self::prepare).
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Sounding voices.
    pub fn active_voice_count(&self) -> usize {
        self.voices.active_voice_count()
    }

    /// The voice pool.
    pub fn voices(&self) -> &VoiceManager<N> {
        &self.voices
    }

    /// The effects chain.
    pub fn fx(&self) -> &FxChain {
        &self.fx
    }

    /// Linear master gain currently applied.
    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    /// The shared parameter store.
    pub fn params(&self) -> &Arc<ParamStore> {
        &self.params
    }

    /// Set voice stealing policy.
    pub fn set_allocation_mode(&mut self, mode: VoiceAllocationMode) {
        self.voices.set_allocation_mode(mode);
    }

    /// Start a note immediately. Velocity is clamped to `[0, 1]`; a
    /// non-finite velocity plays at 0.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        let velocity = if velocity.is_finite() {
            velocity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.voices.note_on(note.min(127), velocity);
    }

    /// Release a note immediately.
    pub fn note_off(&mut self, note: u8, allow_tail_off: bool) {
        self.voices.note_off(note, allow_tail_off);
    }

    /// Move the pitch wheel immediately.
    pub fn pitch_wheel_moved(&mut self, value: u16) {
        self.voices.pitch_wheel_moved(value);
    }

    /// Release every note immediately.
    pub fn all_notes_off(&mut self, allow_tail_off: bool) {
        self.voices.all_notes_off(allow_tail_off);
    }

    /// Apply one event.
    pub fn handle_event(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::NoteOn { note, velocity } => self.note_on(note, velocity),
            NoteEvent::NoteOff {
                note,
                allow_tail_off,
            } => self.note_off(note, allow_tail_off),
            NoteEvent::PitchWheel { value } => self.pitch_wheel_moved(value),
            NoteEvent::AllNotesOff { allow_tail_off } => self.all_notes_off(allow_tail_off),
        }
    }

    /// Silence voices and clear effect tails. Parameters are kept.
    pub fn reset(&mut self) {
        self.voices.reset();
        self.fx.reset();
    }

    /// Render one block in place.
    ///
    /// `events` are applied at their sample offsets; offsets past the end
    /// land on the last sample boundary and out-of-order offsets are
    /// treated as "now". Queued events from the [`EngineHandle`] apply at
    /// offset 0. Real-time safe: no allocation, no locks.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32], events: &[TimedEvent]) {
        debug_assert_eq!(left.len(), right.len());
        let len = left.len().min(right.len());
        let (left, right) = (&mut left[..len], &mut right[..len]);

        self.sync_params();
        while let Some(event) = self.events.try_next() {
            self.handle_event(event);
        }

        let mut pos = 0;
        for timed in events {
            let offset = timed.offset.clamp(pos, len);
            if offset > pos {
                self.voices
                    .render(&mut left[pos..offset], &mut right[pos..offset]);
                pos = offset;
            }
            self.handle_event(timed.event);
        }
        self.voices.render(&mut left[pos..], &mut right[pos..]);

        self.fx.process_block_stereo(left, right);

        let gain = self.master_gain;
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            *l *= gain;
            *r *= gain;
        }

        self.scope.write(left);
    }

    /// Forward changed store values to their owners.
    fn sync_params(&mut self) {
        let version = self.params.version();
        if version == self.param_version {
            return;
        }
        self.param_version = version;

        for id in ParamId::ALL {
            let value = self.params.get(id);
            if value.to_bits() != self.applied[id.index()].to_bits() {
                self.applied[id.index()] = value;
                self.dispatch(id, value);
            }
        }
    }

    fn dispatch(&mut self, id: ParamId, value: f32) {
        if VoiceManager::<N>::listens_to(id) {
            self.voices.apply_param(id, value);
        }
        if FxChain::listens_to(id) {
            self.fx.apply_param(id, value);
        }
        if id == ParamId::Master {
            self.master_gain = db_to_power_gain(value);
        }
    }
}
