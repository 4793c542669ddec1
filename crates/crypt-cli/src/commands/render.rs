//! Offline rendering to WAV.

use std::path::PathBuf;

use clap::Args;
use crypt_engine::{NoteEvent, TimedEvent};
use hound::{SampleFormat, WavSpec, WavWriter};
use indicatif::{ProgressBar, ProgressStyle};

use super::common::SynthOptions;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    synth: SynthOptions,

    /// Seconds the notes are held
    #[arg(long, default_value = "2.0")]
    duration: f32,

    /// Seconds rendered after note-off
    #[arg(long, default_value = "1.5")]
    release: f32,

    /// Sample rate (overrides the config file)
    #[arg(long)]
    sample_rate: Option<f32>,

    /// Block size (overrides the config file)
    #[arg(long)]
    block_size: Option<usize>,

    /// Output bit depth: 16 or 24 (integer) or 32 (float)
    #[arg(long, default_value = "16", value_parser = parse_bits)]
    bits: u16,
}

fn parse_bits(s: &str) -> Result<u16, String> {
    match s.parse::<u16>() {
        Ok(bits @ (16 | 24 | 32)) => Ok(bits),
        _ => Err(format!("unsupported bit depth '{s}' (use 16, 24 or 32)")),
    }
}

/// Events that land in the block starting at `start`.
fn block_events(
    start: usize,
    len: usize,
    release_at: usize,
    notes: &[u8],
    velocity: f32,
) -> Vec<TimedEvent> {
    let mut events = Vec::new();
    if start == 0 {
        events.extend(
            notes
                .iter()
                .map(|&note| TimedEvent::new(0, NoteEvent::NoteOn { note, velocity })),
        );
    }
    if (start..start + len).contains(&release_at) {
        events.extend(notes.iter().map(|&note| {
            TimedEvent::new(
                release_at - start,
                NoteEvent::NoteOff {
                    note,
                    allow_tail_off: true,
                },
            )
        }));
    }
    events
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if !(args.duration >= 0.0 && args.release >= 0.0) {
        anyhow::bail!("--duration and --release must be non-negative");
    }

    let mut config = args.synth.load_config()?;
    if let Some(sample_rate) = args.sample_rate {
        config.sample_rate = sample_rate;
    }
    if let Some(block_size) = args.block_size {
        config.max_block_size = block_size;
    }
    let (mut engine, _handle, _scope) = args.synth.build_engine(&config)?;

    let sample_rate = config.sample_rate;
    let block_size = config.max_block_size;
    let release_at = (args.duration * sample_rate).round() as usize;
    let total = release_at + (args.release * sample_rate).round() as usize;

    println!("Rendering {} note(s) to {}", args.synth.notes.len(), args.output.display());
    println!("  Notes: {:?}", args.synth.notes);
    println!("  Sample rate: {} Hz", sample_rate);
    println!("  Length: {:.2}s ({} frames)", total as f32 / sample_rate, total);

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut interleaved = Vec::with_capacity(total * 2);
    let mut left = vec![0.0f32; block_size];
    let mut right = vec![0.0f32; block_size];
    let mut start = 0;
    while start < total {
        let len = block_size.min(total - start);
        let events = block_events(start, len, release_at, &args.synth.notes, args.synth.velocity);
        engine.process_block(&mut left[..len], &mut right[..len], &events);
        for (&l, &r) in left[..len].iter().zip(&right[..len]) {
            interleaved.push(l);
            interleaved.push(r);
        }
        start += len;
        pb.set_position(start as u64);
    }
    pb.finish_and_clear();

    let peak = interleaved.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if args.bits != 32 && peak > 1.0 {
        tracing::warn!(peak, "output clips at integer bit depth; lower `master`");
    }

    write_stereo(&args.output, &interleaved, sample_rate as u32, args.bits)?;

    println!(
        "Wrote {} ({}-bit, peak {:.1} dBFS)",
        args.output.display(),
        args.bits,
        20.0 * peak.max(1e-9).log10()
    );
    Ok(())
}

fn write_stereo(
    path: &std::path::Path,
    interleaved: &[f32],
    sample_rate: u32,
    bits: u16,
) -> anyhow::Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: bits,
        sample_format: if bits == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };
    let mut writer = WavWriter::create(path, spec)?;

    if bits == 32 {
        for &sample in interleaved {
            writer.write_sample(sample)?;
        }
    } else {
        let max_val = (1i32 << (bits - 1)) as f32;
        for &sample in interleaved {
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_sample)?;
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_ons_only_in_first_block() {
        let events = block_events(0, 256, 10_000, &[60, 64], 0.5);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.offset == 0));
        assert!(block_events(256, 256, 10_000, &[60], 0.5).is_empty());
    }

    #[test]
    fn note_offs_land_on_exact_frame() {
        let events = block_events(9984, 256, 10_000, &[60], 0.5);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].offset, 16);
        assert!(matches!(
            events[0].event,
            NoteEvent::NoteOff { note: 60, allow_tail_off: true }
        ));
    }

    #[test]
    fn zero_duration_releases_in_first_block() {
        let events = block_events(0, 64, 0, &[60], 1.0);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].event, NoteEvent::NoteOn { .. }));
        assert!(matches!(events[1].event, NoteEvent::NoteOff { .. }));
    }

    #[test]
    fn bit_depths() {
        assert_eq!(parse_bits("24"), Ok(24));
        assert!(parse_bits("8").is_err());
    }
}
