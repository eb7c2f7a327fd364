/*!
Factories: constructors that always return a well-formed event. Inputs outside their legal
ranges are normalized silently; the clamp-typed parameters saturate out-of-range values, in
contrast to the validators in [`crate::event::parse`], which report errors and never repair.
!*/

use crate::core::vlq::encode_vlq;
use crate::core::{
    Channel, ControlValue, KeySignatureValue, MicrosecondsPerQuarter, NoteNumber, Program,
    SmpteOffsetValue, StatusType, TimeSignatureValue, Velocity, U7,
};
use crate::event::inspect::MetaKind;
use crate::event::Event;
use crate::text::Text;

fn merge_status(status_type: StatusType, channel: Channel) -> u8 {
    ((status_type as u8) << 4) | channel.get()
}

/// A channel event of any type. The second data byte is dropped for the one-data-byte message
/// types (program change and channel pressure).
pub fn make_channel(dt: i32, status_type: StatusType, channel: Channel, p1: U7, p2: U7) -> Event {
    let status = merge_status(status_type, channel);
    match status_type.data_len() {
        1 => Event::from_parts(dt, &[status, p1.get()]),
        _ => Event::from_parts(dt, &[status, p1.get(), p2.get()]),
    }
}

/// A note-on. The velocity is floored at 1: a note-on with velocity zero is canonically a
/// note-off, and this factory's intent is a note that sounds.
pub fn make_note_on(dt: i32, channel: Channel, note: NoteNumber, velocity: Velocity) -> Event {
    let velocity = Velocity::new(velocity.get().max(1));
    make_channel(
        dt,
        StatusType::NoteOn,
        channel,
        U7::new(note.get()),
        U7::new(velocity.get()),
    )
}

/// A note-off with status nibble `0x8`.
pub fn make_note_off(dt: i32, channel: Channel, note: NoteNumber, velocity: Velocity) -> Event {
    make_channel(
        dt,
        StatusType::NoteOff,
        channel,
        U7::new(note.get()),
        U7::new(velocity.get()),
    )
}

/// A note-off in the note-on-with-velocity-zero form, which allows a following event to reuse
/// the `0x9n` status byte under running status.
pub fn make_note_off90(dt: i32, channel: Channel, note: NoteNumber) -> Event {
    make_channel(
        dt,
        StatusType::NoteOn,
        channel,
        U7::new(note.get()),
        U7::new(0),
    )
}

pub fn make_key_pressure(dt: i32, channel: Channel, note: NoteNumber, pressure: U7) -> Event {
    make_channel(
        dt,
        StatusType::PolyPressure,
        channel,
        U7::new(note.get()),
        pressure,
    )
}

pub fn make_control_change(
    dt: i32,
    channel: Channel,
    control: U7,
    value: ControlValue,
) -> Event {
    make_channel(
        dt,
        StatusType::Control,
        channel,
        control,
        U7::new(value.get()),
    )
}

pub fn make_program_change(dt: i32, channel: Channel, program: Program) -> Event {
    make_channel(
        dt,
        StatusType::Program,
        channel,
        U7::new(program.get()),
        U7::new(0),
    )
}

pub fn make_channel_pressure(dt: i32, channel: Channel, pressure: U7) -> Event {
    make_channel(
        dt,
        StatusType::ChannelPressure,
        channel,
        pressure,
        U7::new(0),
    )
}

/// A pitch bend from the raw 7-bit least- and most-significant halves of the 14-bit value.
pub fn make_pitch_bend(dt: i32, channel: Channel, lsb: U7, msb: U7) -> Event {
    make_channel(dt, StatusType::PitchBend, channel, lsb, msb)
}

/// The two events of [`make_onoff_pair`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OnOffPair {
    pub on: Event,
    pub off: Event,
}

/// A note-on at delta-time zero paired with a note-off `duration` ticks later.
pub fn make_onoff_pair(
    duration: i32,
    channel: Channel,
    note: NoteNumber,
    velocity_on: Velocity,
    velocity_off: Velocity,
) -> OnOffPair {
    OnOffPair {
        on: make_note_on(0, channel, note, velocity_on),
        off: make_note_off(duration, channel, note, velocity_off),
    }
}

fn make_meta(dt: i32, type_byte: u8, payload: &[u8]) -> Event {
    let length = encode_vlq(payload.len() as i32);
    let mut event = Vec::with_capacity(2 + length.len() + payload.len());
    event.push(0xFF);
    event.push(type_byte);
    event.extend_from_slice(&length);
    event.extend_from_slice(payload);
    Event::from_parts(dt, &event)
}

/// A set-tempo event, `FF 51 03 tttttt`. The microseconds-per-quarter value is a 24-bit
/// unsigned; larger inputs saturate.
pub fn make_tempo(dt: i32, us_per_quarter: MicrosecondsPerQuarter) -> Event {
    let value = us_per_quarter.get();
    make_meta(
        dt,
        0x51,
        &[(value >> 16) as u8, (value >> 8) as u8, value as u8],
    )
}

/// An end-of-track event, `FF 2F 00`.
pub fn make_eot(dt: i32) -> Event {
    make_meta(dt, 0x2F, &[])
}

/// A sequence-number event, `FF 00 02 ssss`.
pub fn make_seqn(dt: i32, number: u16) -> Event {
    make_meta(dt, 0x00, &number.to_be_bytes())
}

/// A channel-prefix event, `FF 20 01 cc`.
pub fn make_ch_prefix(dt: i32, channel: Channel) -> Event {
    make_meta(dt, 0x20, &[channel.get()])
}

pub fn make_timesig(dt: i32, value: TimeSignatureValue) -> Event {
    make_meta(dt, 0x58, &value.to_payload())
}

pub fn make_keysig(dt: i32, value: KeySignatureValue) -> Event {
    make_meta(dt, 0x59, &value.to_payload())
}

pub fn make_smpte_offset(dt: i32, value: SmpteOffsetValue) -> Event {
    make_meta(dt, 0x54, &value.to_payload())
}

pub fn make_sequencer_specific(dt: i32, data: &[u8]) -> Event {
    make_meta(dt, 0x7F, data)
}

/// The generic text builder behind the text-family factories. If `kind` is not one of the
/// text-carrying meta kinds the default event is returned.
pub fn make_meta_text<S: Into<Text>>(dt: i32, kind: MetaKind, text: S) -> Event {
    match kind.type_byte() {
        Some(type_byte) if kind.has_text() => make_meta(dt, type_byte, text.into().as_bytes()),
        _ => Event::default(),
    }
}

pub fn make_text<S: Into<Text>>(dt: i32, text: S) -> Event {
    make_meta_text(dt, MetaKind::Text, text)
}

pub fn make_copyright<S: Into<Text>>(dt: i32, text: S) -> Event {
    make_meta_text(dt, MetaKind::Copyright, text)
}

pub fn make_trackname<S: Into<Text>>(dt: i32, text: S) -> Event {
    make_meta_text(dt, MetaKind::TrackName, text)
}

pub fn make_instname<S: Into<Text>>(dt: i32, text: S) -> Event {
    make_meta_text(dt, MetaKind::InstrumentName, text)
}

pub fn make_lyric<S: Into<Text>>(dt: i32, text: S) -> Event {
    make_meta_text(dt, MetaKind::Lyric, text)
}

pub fn make_marker<S: Into<Text>>(dt: i32, text: S) -> Event {
    make_meta_text(dt, MetaKind::Marker, text)
}

pub fn make_cuepoint<S: Into<Text>>(dt: i32, text: S) -> Event {
    make_meta_text(dt, MetaKind::CuePoint, text)
}

fn make_sysex(dt: i32, status: u8, bytes: &[u8]) -> Event {
    let needs_terminator = bytes.last() != Some(&0xF7);
    let payload_len = bytes.len() + usize::from(needs_terminator);
    let length = encode_vlq(payload_len as i32);
    let mut event = Vec::with_capacity(1 + length.len() + payload_len);
    event.push(status);
    event.extend_from_slice(&length);
    event.extend_from_slice(bytes);
    if needs_terminator {
        event.push(0xF7);
    }
    Event::from_parts(dt, &event)
}

/// A complete system-exclusive message, `F0 <length> <bytes>`. The stored payload always ends
/// with `0xF7`; one is appended iff the input does not already end with it.
pub fn make_sysex_f0(dt: i32, bytes: &[u8]) -> Event {
    make_sysex(dt, 0xF0, bytes)
}

/// A sysex continuation/escape packet, `F7 <length> <bytes>`; the same shape as
/// [`make_sysex_f0`] under the `0xF7` status byte.
pub fn make_sysex_f7(dt: i32, bytes: &[u8]) -> Event {
    make_sysex(dt, 0xF7, bytes)
}
