//! Criterion benchmarks for full engine blocks
//!
//! Run with: cargo bench -p crypt-engine

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use crypt_engine::{CryptEngine, EngineConfig, NoteEvent, ParamId, TimedEvent};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 512, 1024];

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("Engine");

    for &block_size in BLOCK_SIZES {
        let (mut engine, handle, mut scope) = CryptEngine::new(&EngineConfig::default());
        handle.set_param(ParamId::AmpSustain, 1.0);
        handle.set_param(ParamId::FilterEnvAmount, 0.4);
        engine
            .prepare(SAMPLE_RATE, block_size)
            .expect("valid stream format");
        for note in [45, 52, 57, 60, 64, 67, 71, 76] {
            engine.note_on(note, 0.8);
        }
        let mut left = vec![0.0f32; block_size];
        let mut right = vec![0.0f32; block_size];

        group.bench_with_input(
            BenchmarkId::new("8_voices_full_chain", block_size),
            &block_size,
            |b, _| {
                b.iter(|| {
                    engine.process_block(&mut left, &mut right, &[]);
                    scope.read();
                    black_box(left[0])
                })
            },
        );
    }

    group.finish();
}

fn bench_events(c: &mut Criterion) {
    let mut group = c.benchmark_group("EngineEvents");

    let (mut engine, _, _) = CryptEngine::new(&EngineConfig::default());
    engine
        .prepare(SAMPLE_RATE, 512)
        .expect("valid stream format");
    let events: Vec<TimedEvent> = (0..16)
        .map(|i| {
            let note = 48 + (i % 8) as u8;
            let event = if i % 2 == 0 {
                NoteEvent::NoteOn { note, velocity: 0.7 }
            } else {
                NoteEvent::NoteOff {
                    note: note - 1,
                    allow_tail_off: true,
                }
            };
            TimedEvent::new(i * 32, event)
        })
        .collect();
    let mut left = vec![0.0f32; 512];
    let mut right = vec![0.0f32; 512];

    group.bench_function("16_events_per_block", |b| {
        b.iter(|| {
            engine.process_block(&mut left, &mut right, &events);
            black_box(left[0])
        })
    });

    group.finish();
}

criterion_group!(benches, bench_engine, bench_events);
criterion_main!(benches);
