//! Crypt Engine - the real-time synthesizer core
//!
//! Ties the voice pool from `crypt-synth` and the effects chain from
//! `crypt-effects` into one [`Engine`] that a host audio callback drives
//! block by block.
//!
//! # Threads
//!
//! - The audio thread owns the [`Engine`] and calls
//!   [`Engine::process_block`]. Nothing on that path blocks or allocates.
//! - Control threads hold an [`EngineHandle`]: parameter writes go to a
//!   lock-free [`ParamStore`], note events to a bounded queue.
//! - One observer holds the [`ScopeReader`] and pulls the post-gain left
//!   channel for waveform display.
//!
//! # Example
//!
//! ```rust
//! use crypt_engine::{CryptEngine, EngineConfig, ParamId};
//!
//! let (mut engine, handle, mut scope) = CryptEngine::new(&EngineConfig::default());
//! engine.prepare(48000.0, 256).unwrap();
//!
//! handle.set_param(ParamId::Unison, 16.0);
//! handle.note_on(60, 0.9);
//!
//! let mut left = [0.0f32; 256];
//! let mut right = [0.0f32; 256];
//! engine.process_block(&mut left, &mut right, &[]);
//!
//! assert_eq!(scope.read().len(), 256);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod params;
pub mod scope;

pub use config::{EngineConfig, MIN_SAMPLE_RATE};
pub use engine::{CryptEngine, DEFAULT_SAMPLE_RATE, Engine, EngineHandle, MAX_POLYPHONY};
pub use error::{EngineError, Result};
pub use events::{
    EventQueue, EventSender, NoteEvent, PITCH_WHEEL_CENTER, PITCH_WHEEL_MAX, TimedEvent,
    event_queue, velocity_from_midi,
};
pub use params::{ParamId, ParamListener, ParamStore, parse_assignment};
pub use scope::{READ_CHUNK, ScopeReader, ScopeWriter, scope_channel};

pub use crypt_core::{ParamDescriptor, ParamScale, ParamUnit};
pub use crypt_synth::VoiceAllocationMode;
