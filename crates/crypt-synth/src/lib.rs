//! Crypt Synth - voice engine for the crypt synthesizer
//!
//! This crate turns note events into a mixed stereo signal. It is
//! allocation-free and `no_std` compatible.
//!
//! # Core Components
//!
//! ## Oscillators
//!
//! - [`UnisonBank`] - Up to 64 detuned, panned sawtooth partials
//!
//! ## Envelopes
//!
//! - [`AdsrEnvelope`] - Linear ADSR with deferred parameter changes
//! - [`AdsrParams`] / [`EnvelopeState`] - Stage settings and tracking
//!
//! ## Voices
//!
//! - [`Voice`] - Unison bank, wave-shaper, stereo filter and two envelopes
//! - [`SynthVoice`] - Note lifecycle interface
//! - [`VoiceManager`] - Fixed voice pool with [`VoiceAllocationMode`] stealing
//!
//! # Example
//!
//! ```rust
//! use crypt_synth::{VoiceManager, VoiceParam};
//!
//! let mut synth: VoiceManager<8> = VoiceManager::new(48000.0);
//! synth.set_param(VoiceParam::Unison, 16.0);
//! synth.set_param(VoiceParam::Cutoff, 2000.0);
//!
//! synth.note_on(57, 0.9);
//! synth.note_on(60, 0.9);
//! synth.note_on(64, 0.9);
//!
//! let mut left = [0.0; 256];
//! let mut right = [0.0; 256];
//! synth.render(&mut left, &mut right);
//!
//! synth.note_off(60, true);
//! ```
//!
//! # no_std Support
//!
//! Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! crypt-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod envelope;
pub mod manager;
pub mod oscillator;
pub mod voice;

pub use envelope::{AdsrEnvelope, AdsrParams, EnvelopeState};
pub use manager::{VoiceAllocationMode, VoiceManager};
pub use oscillator::{MAX_UNISON, Partial, UnisonBank};
pub use voice::{
    PITCH_WHEEL_CENTER, PITCH_WHEEL_MAX, SynthVoice, Voice, VoiceParam, note_frequency,
    shape_compound_wave, velocity_level,
};
