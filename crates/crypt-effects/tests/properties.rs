//! Property and impulse-response tests for the effects chain.

use crypt_core::Effect;
use crypt_effects::{FxChain, FxParam, Phaser, Reverb, StereoDelay};
use proptest::prelude::*;

fn impulse_left(effect: &mut impl Effect, len: usize, block: usize) -> Vec<f32> {
    let mut left = vec![0.0; len];
    let mut right = vec![0.0; len];
    left[0] = 1.0;
    right[0] = 1.0;
    for (l, r) in left.chunks_mut(block).zip(right.chunks_mut(block)) {
        effect.process_block_stereo(l, r);
    }
    left
}

fn window_sum(signal: &[f32], centre: usize, radius: usize) -> f32 {
    signal[centre - radius..=centre + radius].iter().sum()
}

#[test]
fn delay_impulse_echoes_decay_geometrically() {
    // 375 ms at 44.1 kHz is 16537.5 samples; the echo straddles two samples
    let mut delay = StereoDelay::new(44100.0);
    delay.set_time_ms(375.0);
    delay.set_feedback(0.5);
    delay.set_mix(0.5);
    delay.reset();

    let left = impulse_left(&mut delay, 60_000, 512);

    let first = window_sum(&left, 16_537, 4);
    let second = window_sum(&left, 33_075, 4);
    let third = window_sum(&left, 49_612, 4);
    assert!((first - 0.5).abs() < 1e-4, "first echo {first}");
    assert!((second - 0.25).abs() < 1e-4, "second echo {second}");
    assert!((third - 0.125).abs() < 1e-4, "third echo {third}");

    // Nothing between the echoes
    let gap: f32 = left[100..16_000].iter().map(|s| s.abs()).sum();
    assert!(gap < 1e-9);
}

#[test]
fn delay_right_channel_trails_left() {
    let mut delay = StereoDelay::new(44100.0);
    delay.set_time_ms(375.0);
    delay.set_feedback(0.0);
    delay.set_mix(1.0);
    delay.reset();

    let mut left = vec![0.0; 20_000];
    let mut right = vec![0.0; 20_000];
    left[0] = 1.0;
    right[0] = 1.0;
    delay.process_block_stereo(&mut left, &mut right);

    let centroid = |s: &[f32]| {
        let (num, den) = s
            .iter()
            .enumerate()
            .skip(1)
            .fold((0.0f64, 0.0f64), |(n, d), (i, &x)| {
                (n + i as f64 * f64::from(x), d + f64::from(x))
            });
        num / den
    };
    // 375 * 0.01 = 3.75 samples further back
    let lag = centroid(&right) - centroid(&left);
    assert!((lag - 3.75).abs() < 0.01, "lag {lag}");
}

#[test]
fn reverb_and_chain_silence_stays_silent() {
    let mut reverb = Reverb::new(44100.0);
    let mut fx = FxChain::new(44100.0);
    fx.set_param(FxParam::Space, 1.0);
    for _ in 0..4 {
        let mut left = [0.0; 512];
        let mut right = [0.0; 512];
        reverb.process_block_stereo(&mut left, &mut right);
        fx.process_block_stereo(&mut left, &mut right);
        assert!(left.iter().chain(&right).all(|&s| s == 0.0));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any feedback below 1 keeps the delay bounded.
    #[test]
    fn delay_bounded_below_unity_feedback(
        feedback in 0.0f32..0.99,
        mix in 0.0f32..=1.0,
        time_ms in 2.0f32..50.0,
        input in prop::collection::vec(-1.0f32..=1.0, 4096),
    ) {
        let mut delay = StereoDelay::new(48000.0);
        delay.set_time_ms(time_ms);
        delay.set_feedback(feedback);
        delay.set_mix(mix);
        delay.reset();

        let bound = 1.0 + mix / (1.0 - feedback) + 1e-3;
        let mut left = input.clone();
        let mut right = input;
        delay.process_block_stereo(&mut left, &mut right);
        for s in left.iter().chain(&right) {
            prop_assert!(s.is_finite() && s.abs() <= bound, "{} > {}", s, bound);
        }
    }

    /// Reverb output stays finite and sane for any space setting.
    #[test]
    fn reverb_stable(
        space in 0.0f32..=1.0,
        input in prop::collection::vec(-1.0f32..=1.0, 4096),
    ) {
        let mut reverb = Reverb::new(44100.0);
        reverb.set_space(space);
        reverb.reset();

        let mut left = input.clone();
        let mut right = input;
        for (l, r) in left.chunks_mut(256).zip(right.chunks_mut(256)) {
            reverb.process_block_stereo(l, r);
        }
        for s in left.iter().chain(&right) {
            prop_assert!(s.is_finite() && s.abs() < 100.0);
        }
    }

    /// Phaser with mix 1 never exceeds the input peak by much.
    #[test]
    fn phaser_bounded(
        depth in 0.0f32..=1.0,
        rate in 0.02f32..=1.0,
        input in prop::collection::vec(-1.0f32..=1.0, 2048),
    ) {
        let mut phaser = Phaser::new(48000.0);
        phaser.set_depth(depth);
        phaser.set_rate(rate);
        phaser.set_mix(1.0);
        phaser.reset();

        let mut left = input.clone();
        let mut right = input;
        phaser.process_block_stereo(&mut left, &mut right);
        for s in left.iter().chain(&right) {
            prop_assert!(s.is_finite() && s.abs() < 8.0);
        }
    }
}
