//! Lock-free scope feed from the audio thread to one observer.
//!
//! [`scope_channel`] returns a single writer and a single reader sharing a
//! fixed ring of samples. The writer never blocks or allocates and simply
//! overwrites the oldest data; the reader catches up by skipping whatever
//! it missed. The ring is best-effort: losing samples only glitches a
//! waveform display.
//!
//! Samples are stored as `f32` bits in `AtomicU32`s and the write cursor
//! only ever grows, so the reader can tell how far behind it is. Before
//! touching any slot the writer announces the range it is about to
//! overwrite (a seqlock-style claim), so a reader that was lapped mid-copy
//! drops the affected samples instead of returning torn data.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering, fence};

/// Largest chunk a single [`ScopeReader::read`] returns.
pub const READ_CHUNK: usize = 512;

#[derive(Debug)]
struct Shared {
    samples: Box<[AtomicU32]>,
    /// Total samples ever written
    write: AtomicUsize,
    /// End of the write in progress; runs ahead of `write` while slots change
    claimed: AtomicUsize,
}

/// Create a connected writer/reader pair holding `capacity` samples.
///
/// # Example
///
/// ```rust
/// use crypt_engine::scope_channel;
///
/// let (mut writer, mut reader) = scope_channel(1024);
/// writer.write(&[0.1, 0.2, 0.3]);
/// assert_eq!(reader.read(), &[0.1, 0.2, 0.3]);
/// assert!(reader.read().is_empty());
/// ```
pub fn scope_channel(capacity: usize) -> (ScopeWriter, ScopeReader) {
    let capacity = capacity.max(1);
    let shared = Arc::new(Shared {
        samples: (0..capacity).map(|_| AtomicU32::new(0)).collect(),
        write: AtomicUsize::new(0),
        claimed: AtomicUsize::new(0),
    });
    (
        ScopeWriter {
            shared: Arc::clone(&shared),
        },
        ScopeReader {
            shared,
            read: 0,
            scratch: Vec::with_capacity(READ_CHUNK),
        },
    )
}

/// Audio-thread half of the scope channel.
#[derive(Debug)]
pub struct ScopeWriter {
    shared: Arc<Shared>,
}

impl ScopeWriter {
    /// Append samples, overwriting the oldest when full. Real-time safe.
    pub fn write(&mut self, samples: &[f32]) {
        let shared = &*self.shared;
        let capacity = shared.samples.len();
        let start = shared.write.load(Ordering::Relaxed);
        let end = start + samples.len();

        // Claim before any slot store becomes visible
        shared.claimed.store(end, Ordering::Relaxed);
        fence(Ordering::Release);

        // Only the newest `capacity` samples can survive
        let skip = samples.len().saturating_sub(capacity);
        for (i, &s) in samples.iter().enumerate().skip(skip) {
            shared.samples[(start + i) % capacity].store(s.to_bits(), Ordering::Relaxed);
        }
        shared.write.store(end, Ordering::Release);
    }

    /// Ring size in samples.
    pub fn capacity(&self) -> usize {
        self.shared.samples.len()
    }
}

/// Observer half of the scope channel. Never use from the audio thread.
#[derive(Debug)]
pub struct ScopeReader {
    shared: Arc<Shared>,
    /// Total samples consumed (or skipped)
    read: usize,
    scratch: Vec<f32>,
}

impl ScopeReader {
    /// Drain up to [`READ_CHUNK`] samples and return them. Anything left
    /// over stays for the next call.
    pub fn read(&mut self) -> &[f32] {
        let shared = &*self.shared;
        let capacity = shared.samples.len();
        let written = shared.write.load(Ordering::Acquire);

        if written - self.read > capacity {
            self.read = written - capacity;
        }
        let count = (written - self.read).min(READ_CHUNK);

        self.scratch.clear();
        self.scratch.extend(
            (self.read..self.read + count)
                .map(|pos| f32::from_bits(shared.samples[pos % capacity].load(Ordering::Relaxed))),
        );

        // The writer may have lapped us while copying, including a write
        // still in progress; drop everything its claim covers
        fence(Ordering::Acquire);
        let claimed = shared.claimed.load(Ordering::Relaxed);
        let clobbered = claimed
            .saturating_sub(capacity)
            .saturating_sub(self.read)
            .min(count);
        if clobbered > 0 {
            self.scratch.drain(..clobbered);
        }

        self.read += count;
        &self.scratch
    }

    /// The chunk returned by the last [`read`](Self::read).
    pub fn latest(&self) -> &[f32] {
        &self.scratch
    }

    /// Samples waiting to be read (at most the ring size).
    pub fn available(&self) -> usize {
        let written = self.shared.write.load(Ordering::Acquire);
        (written - self.read).min(self.shared.samples.len())
    }

    /// Ring size in samples.
    pub fn capacity(&self) -> usize {
        self.shared.samples.len()
    }
}
