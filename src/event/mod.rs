/*!
The `event` module holds the track-event layer: an MTrk event is stored as the exact byte
sequence the file format defines (a delta-time VLQ, an explicit status byte, and the body)
inside a small-buffer-optimized container. Factories build well-formed events, validators turn
untrusted byte ranges into events, and the inspection functions classify and extract data.
!*/

use crate::core::delta_time::{
    delta_time_end, encode_delta_time, read_delta_time, to_nearest_valid_delta_time,
};
use crate::core::vlq::vlq_end;
use crate::core::{classify_status, next_running_status, StatusKind};
use crate::event::bytes::EventBytes;
use std::fmt;

mod bytes;
pub mod factory;
pub mod inspect;
pub mod parse;

/// An owning MTrk event: the delta-time field, the status byte, and the body, held in canonical
/// serialized form. The status byte is always explicit: running status is resolved when an
/// event is constructed and never stored. Events are cheap values; anything up to 23 bytes
/// (which is every channel event and most meta events) lives inline without heap allocation.
///
/// Equality is bytewise, so two events decoded from the same data compare equal no matter what
/// running-status state produced them.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Event {
    bytes: EventBytes,
}

impl Default for Event {
    /// A note-on for middle C, velocity `0x3F`, at delta-time zero: `00 90 3C 3F`. Any short
    /// well-formed event would do; this one is audible if it ever reaches an instrument, which
    /// makes stray defaults easy to notice. Does not allocate.
    fn default() -> Self {
        Self {
            bytes: EventBytes::from_slice(&[0x00, 0x90, 0x3C, 0x3F]),
        }
    }
}

impl Event {
    /// Builds the canonical form from a delta-time and the event data (status byte first).
    pub(crate) fn from_parts(delta_time: i32, event: &[u8]) -> Self {
        let dt = encode_delta_time(delta_time);
        let mut bytes = EventBytes::default();
        bytes.reserve(dt.len() + event.len());
        bytes.extend_from_slice(&dt);
        bytes.extend_from_slice(event);
        Self { bytes }
    }

    /// Wraps bytes already known to be a canonical serialized event (delta-time included).
    pub(crate) fn from_canonical_bytes(all: &[u8]) -> Self {
        Self {
            bytes: EventBytes::from_slice(all),
        }
    }

    /// The delta-time in ticks.
    pub fn delta_time(&self) -> i32 {
        read_delta_time(self.bytes.as_slice()).value
    }

    /// Re-encodes the leading delta-time field, clamping to the representable range. When the
    /// new encoding differs in length the body is shifted in place.
    pub fn set_delta_time(&mut self, ticks: i32) {
        let ticks = to_nearest_valid_delta_time(ticks);
        let old_n = delta_time_end(self.bytes.as_slice());
        let encoded = encode_delta_time(ticks);
        let new_n = encoded.len();
        let size = self.bytes.len();
        if new_n == old_n {
            self.bytes.as_mut_slice()[..new_n].copy_from_slice(&encoded);
        } else if new_n > old_n {
            self.bytes.resize(size + new_n - old_n);
            let slice = self.bytes.as_mut_slice();
            slice.copy_within(old_n..size, new_n);
            slice[..new_n].copy_from_slice(&encoded);
        } else {
            let slice = self.bytes.as_mut_slice();
            slice.copy_within(old_n..size, new_n);
            self.bytes.resize(size - (old_n - new_n));
            self.bytes.as_mut_slice()[..new_n].copy_from_slice(&encoded);
        }
    }

    /// The event's status byte (the first byte past the delta-time).
    pub fn status_byte(&self) -> u8 {
        self.event_bytes()[0]
    }

    /// The classification of the status byte.
    pub fn status_kind(&self) -> StatusKind {
        classify_status(self.status_byte())
    }

    /// The running-status byte in effect after this event: the status byte for channel events,
    /// zero for meta and sysex events (which cancel running status).
    pub fn running_status_after(&self) -> u8 {
        next_running_status(self.status_byte())
    }

    /// The full serialized length, delta-time included.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// The serialized length excluding the delta-time field.
    pub fn data_size(&self) -> usize {
        self.size() - delta_time_end(self.bytes.as_slice())
    }

    /// The capacity of the underlying buffer.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// The complete serialized event.
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// The delta-time field bytes.
    pub fn dt_bytes(&self) -> &[u8] {
        &self.bytes.as_slice()[..delta_time_end(self.bytes.as_slice())]
    }

    /// The event data: status byte and body, without the delta-time.
    pub fn event_bytes(&self) -> &[u8] {
        &self.bytes.as_slice()[delta_time_end(self.bytes.as_slice())..]
    }

    /// The payload: for channel events the data bytes; for meta events everything after the
    /// type byte and length field; for sysex events everything after the length field.
    pub fn payload(&self) -> &[u8] {
        let event = self.event_bytes();
        match classify_status(event[0]) {
            StatusKind::Channel => &event[1..],
            StatusKind::Meta => {
                let rest = &event[2..];
                &rest[vlq_end(rest)..]
            }
            StatusKind::SysexF0 | StatusKind::SysexF7 => {
                let rest = &event[1..];
                &rest[vlq_end(rest)..]
            }
            StatusKind::Unrecognized | StatusKind::Data => &[],
        }
    }
}

// A compact hex rendering, e.g. `Event(00 90 3C 3F)`. The derive output buries the bytes.
impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event(")?;
        for (i, byte) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        write!(f, ")")
    }
}
