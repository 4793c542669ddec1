//! Note events and the cross-thread event queue.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

pub use crypt_synth::{PITCH_WHEEL_CENTER, PITCH_WHEEL_MAX};

/// A performance event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEvent {
    /// Start a note. Velocity in `[0, 1]`.
    NoteOn {
        /// MIDI note number
        note: u8,
        /// Normalized velocity
        velocity: f32,
    },
    /// Release a note.
    NoteOff {
        /// MIDI note number
        note: u8,
        /// Let the release stage play instead of cutting the note
        allow_tail_off: bool,
    },
    /// Move the pitch wheel, `0..=16383` with the centre at 8192.
    PitchWheel {
        /// 14-bit wheel position
        value: u16,
    },
    /// Release every sounding note.
    AllNotesOff {
        /// Let the release stage play instead of cutting the notes
        allow_tail_off: bool,
    },
}

/// An event positioned inside the current block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEvent {
    /// Sample offset from the start of the block
    pub offset: usize,
    /// The event
    pub event: NoteEvent,
}

impl TimedEvent {
    /// Event at `offset` samples into the block.
    pub const fn new(offset: usize, event: NoteEvent) -> Self {
        Self { offset, event }
    }
}

/// Convert a 7-bit MIDI velocity to `[0, 1]`.
///
/// ```rust
/// use crypt_engine::velocity_from_midi;
///
/// assert_eq!(velocity_from_midi(127), 1.0);
/// assert_eq!(velocity_from_midi(0), 0.0);
/// ```
pub fn velocity_from_midi(velocity: u8) -> f32 {
    f32::from(velocity.min(127)) / 127.0
}

/// Bounded event channel: the sending half for control threads, the
/// receiving half for the audio thread.
pub fn event_queue(capacity: usize) -> (EventSender, EventQueue) {
    let (tx, rx) = bounded(capacity.max(1));
    (EventSender { tx }, EventQueue { rx })
}

/// Sending half of the event queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<NoteEvent>,
}

impl EventSender {
    /// Queue an event without blocking. Returns `false` if the queue is full
    /// or the engine is gone; the event is dropped.
    pub fn send(&self, event: NoteEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(?event, "event queue full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Receiving half of the event queue, drained by the audio thread.
#[derive(Debug)]
pub struct EventQueue {
    rx: Receiver<NoteEvent>,
}

impl EventQueue {
    /// Next queued event, if any. Never blocks.
    #[inline]
    pub fn try_next(&self) -> Option<NoteEvent> {
        self.rx.try_recv().ok()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_preserves_order() {
        let (tx, rx) = event_queue(8);
        assert!(tx.send(NoteEvent::NoteOn { note: 60, velocity: 1.0 }));
        assert!(tx.send(NoteEvent::NoteOff { note: 60, allow_tail_off: true }));
        assert_eq!(rx.len(), 2);
        assert_eq!(rx.try_next(), Some(NoteEvent::NoteOn { note: 60, velocity: 1.0 }));
        assert_eq!(
            rx.try_next(),
            Some(NoteEvent::NoteOff { note: 60, allow_tail_off: true })
        );
        assert_eq!(rx.try_next(), None);
        assert!(rx.is_empty());
    }

    #[test]
    fn full_queue_drops() {
        let (tx, rx) = event_queue(1);
        assert!(tx.send(NoteEvent::PitchWheel { value: 0 }));
        assert!(!tx.send(NoteEvent::PitchWheel { value: 1 }));
        assert_eq!(rx.try_next(), Some(NoteEvent::PitchWheel { value: 0 }));
    }

    #[test]
    fn send_after_receiver_dropped() {
        let (tx, rx) = event_queue(4);
        drop(rx);
        assert!(!tx.send(NoteEvent::AllNotesOff { allow_tail_off: false }));
    }

    #[test]
    fn midi_velocity_scaling() {
        assert!((velocity_from_midi(64) - 0.503_937).abs() < 1e-5);
        assert_eq!(velocity_from_midi(200), 1.0);
    }
}
