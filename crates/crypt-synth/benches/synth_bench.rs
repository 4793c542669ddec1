//! Criterion benchmarks for crypt-synth components
//!
//! Run with: cargo bench -p crypt-synth

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use crypt_synth::{
    AdsrEnvelope, PITCH_WHEEL_CENTER, SynthVoice, UnisonBank, Voice, VoiceManager, VoiceParam,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 512, 1024];

fn bench_unison_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("UnisonBank");

    for &unison in &[4usize, 16, 32, 64] {
        let mut bank = UnisonBank::new(SAMPLE_RATE, 1);
        bank.set_unison(unison);
        bank.trigger(220.0);

        group.bench_with_input(BenchmarkId::new("unison", unison), &unison, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for _ in 0..512 {
                    let (l, r) = bank.render();
                    sum += l + r;
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("AdsrEnvelope");

    for &block_size in BLOCK_SIZES {
        let mut env = AdsrEnvelope::new(SAMPLE_RATE);
        env.gate_on();

        group.bench_with_input(
            BenchmarkId::new("advance", block_size),
            &block_size,
            |b, &size| {
                b.iter(|| {
                    let mut sum = 0.0f32;
                    for _ in 0..size {
                        sum += env.advance();
                    }
                    black_box(sum)
                })
            },
        );
    }

    group.finish();
}

fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("Voice");

    for &block_size in BLOCK_SIZES {
        let mut voice = Voice::new(SAMPLE_RATE, 1);
        voice.set_param(VoiceParam::FilterEnvAmount, 0.5);
        voice.set_param(VoiceParam::AmpSustain, 1.0);
        voice.note_on(57, 0.8, PITCH_WHEEL_CENTER);
        let mut left = vec![0.0f32; block_size];
        let mut right = vec![0.0f32; block_size];

        group.bench_with_input(
            BenchmarkId::new("unison32", block_size),
            &block_size,
            |b, _| {
                b.iter(|| {
                    voice.render(&mut left, &mut right);
                    black_box(left[0])
                })
            },
        );
    }

    group.finish();
}

fn bench_voice_manager(c: &mut Criterion) {
    let mut group = c.benchmark_group("VoiceManager");

    for &block_size in BLOCK_SIZES {
        let mut manager: VoiceManager<8> = VoiceManager::new(SAMPLE_RATE);
        manager.set_param(VoiceParam::AmpSustain, 1.0);
        for note in [45, 52, 57, 60, 64, 67, 71, 76] {
            manager.note_on(note, 0.8);
        }
        let mut left = vec![0.0f32; block_size];
        let mut right = vec![0.0f32; block_size];

        group.bench_with_input(
            BenchmarkId::new("8_voices", block_size),
            &block_size,
            |b, _| {
                b.iter(|| {
                    manager.render(&mut left, &mut right);
                    black_box(left[0])
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_unison_bank,
    bench_envelope,
    bench_voice,
    bench_voice_manager
);
criterion_main!(benches);
