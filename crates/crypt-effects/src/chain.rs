//! Fixed post-synthesis chain: phaser, then delay, then reverb.

use crate::{Phaser, Reverb, StereoDelay};
use crypt_core::Effect;

/// Controls owned by the effects chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FxParam {
    /// Phaser sweep depth (0-1)
    PhaserDepth,
    /// Phaser LFO rate (Hz)
    PhaserRate,
    /// Phaser mix (0-1)
    PhaserMix,
    /// Delay time (ms)
    DelayTime,
    /// Delay feedback (0-0.99)
    DelayFeedback,
    /// Delay echo level (0-1)
    DelayMix,
    /// Reverb macro (0-1)
    Space,
}

impl FxParam {
    /// Every chain control, in processing order.
    pub const ALL: [FxParam; 7] = [
        FxParam::PhaserDepth,
        FxParam::PhaserRate,
        FxParam::PhaserMix,
        FxParam::DelayTime,
        FxParam::DelayFeedback,
        FxParam::DelayMix,
        FxParam::Space,
    ];
}

/// Phaser → delay → reverb, processed in place on the mixed voice output.
///
/// # Example
///
/// ```rust
/// use crypt_core::Effect;
/// use crypt_effects::{FxChain, FxParam};
///
/// let mut fx = FxChain::new(48000.0);
/// fx.set_param(FxParam::DelayMix, 0.0);
/// fx.set_param(FxParam::Space, 0.5);
///
/// let mut left = [0.1f32; 256];
/// let mut right = [0.1f32; 256];
/// fx.process_block_stereo(&mut left, &mut right);
/// assert!(left.iter().all(|s| s.is_finite()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FxChain {
    /// First stage
    pub phaser: Phaser,
    /// Second stage
    pub delay: StereoDelay,
    /// Last stage
    pub reverb: Reverb,
}

impl FxChain {
    /// Build the chain with default settings. Allocates delay lines and
    /// reverb tanks.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phaser: Phaser::new(sample_rate),
            delay: StereoDelay::new(sample_rate),
            reverb: Reverb::new(sample_rate),
        }
    }

    /// Route a control value to the stage that owns it.
    pub fn set_param(&mut self, param: FxParam, value: f32) {
        match param {
            FxParam::PhaserDepth => self.phaser.set_depth(value),
            FxParam::PhaserRate => self.phaser.set_rate(value),
            FxParam::PhaserMix => self.phaser.set_mix(value),
            FxParam::DelayTime => self.delay.set_time_ms(value),
            FxParam::DelayFeedback => self.delay.set_feedback(value),
            FxParam::DelayMix => self.delay.set_mix(value),
            FxParam::Space => self.reverb.set_space(value),
        }
    }

    /// Current value of a control.
    pub fn param(&self, param: FxParam) -> f32 {
        match param {
            FxParam::PhaserDepth => self.phaser.depth(),
            FxParam::PhaserRate => self.phaser.rate(),
            FxParam::PhaserMix => self.phaser.mix(),
            FxParam::DelayTime => self.delay.time_ms(),
            FxParam::DelayFeedback => self.delay.feedback(),
            FxParam::DelayMix => self.delay.mix(),
            FxParam::Space => self.reverb.space(),
        }
    }
}

impl Effect for FxChain {
    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let (l, r) = self.phaser.process_stereo(left, right);
        let (l, r) = self.delay.process_stereo(l, r);
        self.reverb.process_stereo(l, r)
    }

    fn process_block_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.phaser.process_block_stereo(left, right);
        self.delay.process_block_stereo(left, right);
        self.reverb.process_block_stereo(left, right);
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.phaser.set_sample_rate(sample_rate);
        self.delay.set_sample_rate(sample_rate);
        self.reverb.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.phaser.reset();
        self.delay.reset();
        self.reverb.reset();
    }
}
