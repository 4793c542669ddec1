//! Crypt Core - DSP primitives for the crypt synthesizer
//!
//! This crate provides the building blocks the voice engine and the effects
//! chain are assembled from. Everything here is allocation-free once
//! constructed and safe to call from a real-time audio callback.
//!
//! # Core Abstractions
//!
//! - [`Effect`] - Object-safe trait for stereo, in-place effects
//! - [`SmoothedParam`] - One-pole parameter smoothing for zipper-free changes
//!
//! ## Filters
//!
//! - [`StereoSvf`] - Two-channel TPT state-variable lowpass with shared coefficients
//! - [`CombFilter`] - Damped feedback comb for Freeverb-style reverbs
//! - [`AllpassFilter`] - Schroeder allpass for diffusion
//!
//! ## Delay Lines and Modulation
//!
//! - [`InterpolatedDelay`] - Variable-length delay with linear interpolation
//! - [`Lfo`] - Sine low-frequency oscillator
//!
//! ## Parameter Metadata
//!
//! - [`ParamDescriptor`], [`ParamUnit`], [`ParamScale`] - ranges, defaults and
//!   display units for named controls
//!
//! # no_std Support
//!
//! Disable the default `std` feature to build for embedded targets:
//!
//! ```toml
//! [dependencies]
//! crypt-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod comb;
pub mod delay;
pub mod effect;
pub mod lfo;
pub mod math;
pub mod param;
pub mod param_info;
pub mod svf;

pub use allpass::AllpassFilter;
pub use comb::CombFilter;
pub use delay::InterpolatedDelay;
pub use effect::Effect;
pub use lfo::Lfo;
pub use math::{
    db_to_power_gain, flush_denormal, midi_to_freq, ms_to_samples, wet_dry_mix,
};
pub use param::SmoothedParam;
pub use param_info::{ParamDescriptor, ParamScale, ParamUnit};
pub use svf::StereoSvf;
