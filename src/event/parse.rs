/*!
Validators: pure, allocation-free functions that turn untrusted byte ranges into events. The
`parse_event` umbrella reads the delta-time, resolves the status byte against the running
status, dispatches to the per-class validator, and synthesizes the canonical serialized form
(always with an explicit status byte, even when the input used running status).
!*/

use crate::core::delta_time::read_delta_time;
use crate::core::vlq::read_vlq;
use crate::core::{
    channel_data_len, classify_status, is_channel_status, is_data_byte, resolve_status, StatusKind,
};
use crate::event::Event;
use std::error::Error;
use std::fmt;

/// The ways an event can fail validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EventErrorKind {
    /// The delta-time VLQ is malformed.
    InvalidDeltaTime,
    /// The input ends immediately after the delta-time field.
    NoDataAfterDeltaTime,
    /// The byte following the delta-time is neither a legal status byte nor recoverable via
    /// running status.
    InvalidStatusByte,
    /// A channel event is truncated.
    ChannelLengthExceedsInput,
    /// A channel event data byte has its high bit set.
    ChannelInvalidDataByte,
    /// Not enough bytes for the `FF`/type/length (or `Fn`/length) header.
    SysexOrMetaHeaderOverflow,
    /// The sysex or meta length VLQ is malformed.
    SysexOrMetaInvalidLength,
    /// The declared sysex or meta length overruns the input.
    SysexOrMetaBodyExceedsInput,
    /// Anything else.
    Other,
}

impl fmt::Display for EventErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventErrorKind::InvalidDeltaTime => "invalid delta-time field",
            EventErrorKind::NoDataAfterDeltaTime => "end of input after the delta-time field",
            EventErrorKind::InvalidStatusByte => "invalid status byte",
            EventErrorKind::ChannelLengthExceedsInput => "channel event exceeds the input",
            EventErrorKind::ChannelInvalidDataByte => "channel event data byte has its high bit set",
            EventErrorKind::SysexOrMetaHeaderOverflow => {
                "end of input inside a sysex or meta event header"
            }
            EventErrorKind::SysexOrMetaInvalidLength => "invalid sysex or meta length field",
            EventErrorKind::SysexOrMetaBodyExceedsInput => {
                "sysex or meta event length exceeds the input"
            }
            EventErrorKind::Other => "unknown event error",
        };
        f.write_str(s)
    }
}

impl Error for EventErrorKind {}

/// A failed event parse: the kind, the byte offset of the start of the event whose parse failed
/// (relative to whatever range the parse started from), the byte observed where a status byte
/// was expected, and the running status that was in effect.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct EventError {
    pub kind: EventErrorKind,
    pub offset: usize,
    pub status: u8,
    pub running_status: u8,
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (at offset {}, status byte {:#04X}, running status {:#04X})",
            self.kind, self.offset, self.status, self.running_status
        )
    }
}

impl Error for EventError {}

/// The decoded header fields of a channel event. `consumed` counts from the first byte after
/// the delta-time and includes the status byte only when the input carried one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChannelFields {
    pub status: u8,
    pub p1: u8,
    pub p2: u8,
    pub has_status_byte: bool,
    pub consumed: usize,
}

/// Validates a channel event at the front of `bytes` (the first byte after a delta-time field),
/// resolving running status from `running_status`.
pub fn validate_channel(bytes: &[u8], running_status: u8) -> Result<ChannelFields, EventErrorKind> {
    let first = match bytes.first() {
        Some(&b) => b,
        None => return Err(EventErrorKind::NoDataAfterDeltaTime),
    };
    let status = resolve_status(first, running_status);
    if !is_channel_status(status) {
        return Err(EventErrorKind::InvalidStatusByte);
    }
    let has_status_byte = first & 0x80 != 0;
    let n_data = channel_data_len(status);
    let data_start = usize::from(has_status_byte);
    if bytes.len() < data_start + n_data {
        return Err(EventErrorKind::ChannelLengthExceedsInput);
    }
    let data = &bytes[data_start..data_start + n_data];
    if data.iter().any(|&b| !is_data_byte(b)) {
        return Err(EventErrorKind::ChannelInvalidDataByte);
    }
    Ok(ChannelFields {
        status,
        p1: data[0],
        p2: if n_data == 2 { data[1] } else { 0 },
        has_status_byte,
        consumed: data_start + n_data,
    })
}

/// The decoded header fields of a meta event. `consumed` counts from the `0xFF` byte to the end
/// of the payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MetaFields {
    pub meta_type: u8,
    pub length: i32,
    pub payload_offset: usize,
    pub consumed: usize,
}

/// Validates a meta event at the front of `bytes`: `FF`, the type byte, a length VLQ, and
/// `length` payload bytes.
pub fn validate_meta(bytes: &[u8]) -> Result<MetaFields, EventErrorKind> {
    if bytes.first() != Some(&0xFF) {
        return Err(EventErrorKind::Other);
    }
    if bytes.len() < 3 {
        return Err(EventErrorKind::SysexOrMetaHeaderOverflow);
    }
    let length = read_vlq(&bytes[2..]);
    if !length.is_valid {
        return Err(EventErrorKind::SysexOrMetaInvalidLength);
    }
    let payload_offset = 2 + length.nbytes as usize;
    let consumed = payload_offset + length.value as usize;
    if bytes.len() < consumed {
        return Err(EventErrorKind::SysexOrMetaBodyExceedsInput);
    }
    Ok(MetaFields {
        meta_type: bytes[1],
        length: length.value,
        payload_offset,
        consumed,
    })
}

/// The decoded header fields of a sysex event.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SysexFields {
    pub status: u8,
    pub length: i32,
    pub payload_offset: usize,
    pub consumed: usize,
    pub has_terminating_f7: bool,
}

/// Validates a sysex event at the front of `bytes`: `F0` or `F7`, a length VLQ, and `length`
/// payload bytes.
pub fn validate_sysex(bytes: &[u8]) -> Result<SysexFields, EventErrorKind> {
    let status = match bytes.first() {
        Some(&0xF0) => 0xF0,
        Some(&0xF7) => 0xF7,
        Some(_) => return Err(EventErrorKind::Other),
        None => return Err(EventErrorKind::SysexOrMetaHeaderOverflow),
    };
    if bytes.len() < 2 {
        return Err(EventErrorKind::SysexOrMetaHeaderOverflow);
    }
    let length = read_vlq(&bytes[1..]);
    if !length.is_valid {
        return Err(EventErrorKind::SysexOrMetaInvalidLength);
    }
    let payload_offset = 1 + length.nbytes as usize;
    let consumed = payload_offset + length.value as usize;
    if bytes.len() < consumed {
        return Err(EventErrorKind::SysexOrMetaBodyExceedsInput);
    }
    Ok(SysexFields {
        status,
        length: length.value,
        payload_offset,
        consumed,
        has_terminating_f7: length.value > 0 && bytes[consumed - 1] == 0xF7,
    })
}

/// A successful event parse: the canonical event, the number of input bytes consumed (which can
/// be smaller than the event's size when the input elided the status byte), and the running
/// status in effect after the event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedEvent {
    pub event: Event,
    pub consumed: usize,
    pub running_status: u8,
}

/// Parses one event from the front of `bytes` (starting at its delta-time field), resolving
/// running status from `running_status`. On success the returned event is in canonical form
/// with an explicit status byte. Offsets in the returned error are relative to `bytes`.
pub fn parse_event(bytes: &[u8], running_status: u8) -> Result<ParsedEvent, EventError> {
    let dt = read_delta_time(bytes);
    if !dt.is_valid {
        return Err(EventError {
            kind: EventErrorKind::InvalidDeltaTime,
            offset: 0,
            status: 0,
            running_status,
        });
    }
    let dt_len = dt.nbytes as usize;
    let body = &bytes[dt_len..];
    let first = match body.first() {
        Some(&b) => b,
        None => {
            return Err(EventError {
                kind: EventErrorKind::NoDataAfterDeltaTime,
                offset: 0,
                status: 0,
                running_status,
            })
        }
    };
    let fail = |kind| EventError {
        kind,
        offset: 0,
        status: first,
        running_status,
    };
    let resolved = resolve_status(first, running_status);
    match classify_status(resolved) {
        StatusKind::Channel => {
            let fields = validate_channel(body, running_status).map_err(fail)?;
            let event = if fields.has_status_byte {
                Event::from_canonical_bytes(&bytes[..dt_len + fields.consumed])
            } else {
                let data = [fields.status, fields.p1, fields.p2];
                Event::from_parts(dt.value, &data[..1 + channel_data_len(fields.status)])
            };
            Ok(ParsedEvent {
                event,
                consumed: dt_len + fields.consumed,
                running_status: fields.status,
            })
        }
        StatusKind::Meta => {
            let fields = validate_meta(body).map_err(fail)?;
            Ok(ParsedEvent {
                event: Event::from_canonical_bytes(&bytes[..dt_len + fields.consumed]),
                consumed: dt_len + fields.consumed,
                running_status: 0,
            })
        }
        StatusKind::SysexF0 | StatusKind::SysexF7 => {
            let fields = validate_sysex(body).map_err(fail)?;
            Ok(ParsedEvent {
                event: Event::from_canonical_bytes(&bytes[..dt_len + fields.consumed]),
                consumed: dt_len + fields.consumed,
                running_status: 0,
            })
        }
        StatusKind::Unrecognized | StatusKind::Data => Err(fail(EventErrorKind::InvalidStatusByte)),
    }
}

/// A lazy decoder over the body of an MTrk chunk. Yields events in order, threading running
/// status; stops permanently at the first error. Error offsets are relative to the start of the
/// body passed to [`EventIter::new`]. The caller is responsible for the track-level rules (the
/// stream must end with an end-of-track meta event, with nothing after it).
pub struct EventIter<'a> {
    bytes: &'a [u8],
    position: usize,
    running_status: u8,
    failed: bool,
}

impl<'a> EventIter<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            position: 0,
            running_status: 0,
            failed: false,
        }
    }

    /// The byte offset of the next unparsed event.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The running status currently in effect.
    pub fn running_status(&self) -> u8 {
        self.running_status
    }
}

impl<'a> Iterator for EventIter<'a> {
    type Item = Result<Event, EventError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.position >= self.bytes.len() {
            return None;
        }
        match parse_event(&self.bytes[self.position..], self.running_status) {
            Ok(parsed) => {
                self.position += parsed.consumed;
                self.running_status = parsed.running_status;
                Some(Ok(parsed.event))
            }
            Err(mut e) => {
                e.offset += self.position;
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
