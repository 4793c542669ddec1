//! Real-time playback on the default output device.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use clap::Args;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crypt_engine::{NoteEvent, ParamId, ScopeReader};
use indicatif::{ProgressBar, ProgressStyle};

use super::common::SynthOptions;

/// Meter floor in dBFS.
const METER_FLOOR_DB: f32 = -60.0;

#[derive(Args, Debug)]
pub struct PlayArgs {
    #[command(flatten)]
    synth: SynthOptions,

    /// Seconds the notes are held (0 holds until Ctrl+C)
    #[arg(long, default_value = "4.0")]
    duration: f32,

    /// Block size (overrides the config file)
    #[arg(long)]
    block_size: Option<usize>,
}

/// Drain everything the scope has and return its peak in dBFS.
fn drain_peak_db(scope: &mut ScopeReader) -> f32 {
    let mut peak = 0.0f32;
    loop {
        let chunk = scope.read();
        if chunk.is_empty() {
            break;
        }
        peak = chunk.iter().fold(peak, |m, s| m.max(s.abs()));
    }
    (20.0 * peak.max(1e-6).log10()).max(METER_FLOOR_DB)
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("No output device available"))?;
    let device_name = device
        .description()
        .map(|d| d.name().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let supported = device.default_output_config()?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        anyhow::bail!(
            "Output device '{}' does not use f32 samples ({:?})",
            device_name,
            supported.sample_format()
        );
    }
    let channels = usize::from(supported.channels());

    let mut config = args.synth.load_config()?;
    config.sample_rate = supported.sample_rate() as f32;
    if let Some(block_size) = args.block_size {
        config.max_block_size = block_size;
    }
    let (mut engine, handle, mut scope) = args.synth.build_engine(&config)?;
    let block_size = config.max_block_size;

    println!("Playing notes {:?}", args.synth.notes);
    println!("  Output: {}", device_name);
    println!("  Sample rate: {} Hz", config.sample_rate);
    println!("  Block size: {} samples", block_size);
    println!("\nPress Ctrl+C to stop...\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let mut left = vec![0.0f32; block_size];
    let mut right = vec![0.0f32; block_size];
    let stream = device.build_output_stream(
        &supported.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            for frames in data.chunks_mut(block_size * channels) {
                let len = frames.len() / channels;
                engine.process_block(&mut left[..len], &mut right[..len], &[]);
                for (i, frame) in frames.chunks_mut(channels).enumerate() {
                    match frame {
                        [mono] => *mono = 0.5 * (left[i] + right[i]),
                        [l, r, rest @ ..] => {
                            *l = left[i];
                            *r = right[i];
                            rest.fill(0.0);
                        }
                        [] => {}
                    }
                }
            }
        },
        |err| tracing::error!(%err, "output stream error"),
        None,
    )?;
    stream.play()?;

    for &note in &args.synth.notes {
        handle.note_on(note, args.synth.velocity);
    }

    let meter = ProgressBar::new((-METER_FLOOR_DB) as u64);
    meter.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.green/red}] {msg}")?
            .progress_chars("=> "),
    );

    let hold = (args.duration > 0.0).then(|| Duration::from_secs_f32(args.duration));
    let tail = Duration::from_secs_f32(handle.param(ParamId::AmpRelease) + 1.0);
    let started = Instant::now();
    let mut released_at: Option<Instant> = None;

    loop {
        std::thread::sleep(Duration::from_millis(50));

        let peak_db = drain_peak_db(&mut scope);
        meter.set_position((peak_db - METER_FLOOR_DB) as u64);
        meter.set_message(format!("{peak_db:6.1} dBFS"));

        match released_at {
            None => {
                let stop = !running.load(Ordering::SeqCst)
                    || hold.is_some_and(|h| started.elapsed() >= h);
                if stop {
                    handle.send(NoteEvent::AllNotesOff {
                        allow_tail_off: true,
                    });
                    released_at = Some(Instant::now());
                    tracing::debug!("notes released");
                }
            }
            Some(at) if at.elapsed() >= tail => break,
            Some(_) => {}
        }
    }

    meter.finish_and_clear();
    drop(stream);
    println!("Done!");
    Ok(())
}
