//! Crypt Effects - post-synthesis processing
//!
//! The mixed voice output runs through one fixed chain before the master
//! gain:
//!
//! - [`Phaser`] - Six-stage allpass phaser with a log-scaled sine sweep
//! - [`StereoDelay`] - Feedback delay with a slowly gliding delay time
//! - [`Reverb`] - Freeverb tank driven by a single "space" control
//!
//! [`FxChain`] owns one of each and routes [`FxParam`] changes to them.
//!
//! ## Example
//!
//! ```rust
//! use crypt_core::Effect;
//! use crypt_effects::FxChain;
//!
//! let mut fx = FxChain::new(48000.0);
//! let mut left = vec![0.0f32; 512];
//! let mut right = vec![0.0f32; 512];
//! left[0] = 1.0;
//! right[0] = 1.0;
//! fx.process_block_stereo(&mut left, &mut right);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod chain;
pub mod delay;
pub mod phaser;
pub mod reverb;

pub use chain::{FxChain, FxParam};
pub use delay::StereoDelay;
pub use phaser::Phaser;
pub use reverb::{Reverb, ReverbParams};
