/*!
Classifiers and getters: pure queries over validated events. The `is_*` functions look only at
the bytes that decide the classification; the `get_*` functions additionally check the payload
shape before extracting, returning the caller's default (or `None`) when it does not match.
!*/

use crate::core::{
    is_channel_status, Channel, KeySignatureValue, MicrosecondsPerQuarter, SmpteOffsetValue,
    StatusType, TimeSignatureValue, U7,
};
use crate::event::Event;
use crate::text::Text;

/// The meta event categories named by the MIDI file standard. Type bytes outside the enumerated
/// list classify as [`MetaKind::Unknown`]; their events are preserved, not rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MetaKind {
    /// `FF 00 02 ssss`
    SequenceNumber,
    /// `FF 01 len text`
    Text,
    /// `FF 02 len text`
    Copyright,
    /// `FF 03 len text`, AKA "sequence name"
    TrackName,
    /// `FF 04 len text`
    InstrumentName,
    /// `FF 05 len text`
    Lyric,
    /// `FF 06 len text`
    Marker,
    /// `FF 07 len text`
    CuePoint,
    /// `FF 20 01 cc`
    ChannelPrefix,
    /// `FF 2F 00`
    EndOfTrack,
    /// `FF 51 03 tttttt`
    SetTempo,
    /// `FF 54 05 hr mn se fr ff`
    SmpteOffset,
    /// `FF 58 04 nn dd cc bb`
    TimeSignature,
    /// `FF 59 02 sf mi`
    KeySignature,
    /// `FF 7F len data`
    SequencerSpecific,
    /// Any type byte the standard does not name.
    Unknown,
}

impl MetaKind {
    pub fn from_type_byte(byte: u8) -> MetaKind {
        match byte {
            0x00 => MetaKind::SequenceNumber,
            0x01 => MetaKind::Text,
            0x02 => MetaKind::Copyright,
            0x03 => MetaKind::TrackName,
            0x04 => MetaKind::InstrumentName,
            0x05 => MetaKind::Lyric,
            0x06 => MetaKind::Marker,
            0x07 => MetaKind::CuePoint,
            0x20 => MetaKind::ChannelPrefix,
            0x2F => MetaKind::EndOfTrack,
            0x51 => MetaKind::SetTempo,
            0x54 => MetaKind::SmpteOffset,
            0x58 => MetaKind::TimeSignature,
            0x59 => MetaKind::KeySignature,
            0x7F => MetaKind::SequencerSpecific,
            _ => MetaKind::Unknown,
        }
    }

    /// The type byte, or `None` for [`MetaKind::Unknown`].
    pub fn type_byte(self) -> Option<u8> {
        match self {
            MetaKind::SequenceNumber => Some(0x00),
            MetaKind::Text => Some(0x01),
            MetaKind::Copyright => Some(0x02),
            MetaKind::TrackName => Some(0x03),
            MetaKind::InstrumentName => Some(0x04),
            MetaKind::Lyric => Some(0x05),
            MetaKind::Marker => Some(0x06),
            MetaKind::CuePoint => Some(0x07),
            MetaKind::ChannelPrefix => Some(0x20),
            MetaKind::EndOfTrack => Some(0x2F),
            MetaKind::SetTempo => Some(0x51),
            MetaKind::SmpteOffset => Some(0x54),
            MetaKind::TimeSignature => Some(0x58),
            MetaKind::KeySignature => Some(0x59),
            MetaKind::SequencerSpecific => Some(0x7F),
            MetaKind::Unknown => None,
        }
    }

    /// True for the meta kinds whose payload is text.
    pub fn has_text(self) -> bool {
        matches!(
            self,
            MetaKind::Text
                | MetaKind::Copyright
                | MetaKind::TrackName
                | MetaKind::InstrumentName
                | MetaKind::Lyric
                | MetaKind::Marker
                | MetaKind::CuePoint
        )
    }
}

/// True if the event is a meta event.
pub fn is_meta(ev: &Event) -> bool {
    ev.status_byte() == 0xFF
}

/// The meta type byte, or `None` for non-meta events.
pub fn meta_type_byte(ev: &Event) -> Option<u8> {
    if is_meta(ev) {
        Some(ev.event_bytes()[1])
    } else {
        None
    }
}

/// Classifies a meta event; `None` for non-meta events.
pub fn classify_meta(ev: &Event) -> Option<MetaKind> {
    meta_type_byte(ev).map(MetaKind::from_type_byte)
}

/// True if the event is a meta event of the given kind.
pub fn is_meta_kind(ev: &Event, kind: MetaKind) -> bool {
    classify_meta(ev) == Some(kind)
}

pub fn is_sequence_number(ev: &Event) -> bool {
    is_meta_kind(ev, MetaKind::SequenceNumber)
}

pub fn is_track_name(ev: &Event) -> bool {
    is_meta_kind(ev, MetaKind::TrackName)
}

pub fn is_channel_prefix(ev: &Event) -> bool {
    is_meta_kind(ev, MetaKind::ChannelPrefix)
}

pub fn is_end_of_track(ev: &Event) -> bool {
    is_meta_kind(ev, MetaKind::EndOfTrack)
}

pub fn is_tempo(ev: &Event) -> bool {
    is_meta_kind(ev, MetaKind::SetTempo)
}

pub fn is_smpte_offset(ev: &Event) -> bool {
    is_meta_kind(ev, MetaKind::SmpteOffset)
}

pub fn is_time_signature(ev: &Event) -> bool {
    is_meta_kind(ev, MetaKind::TimeSignature)
}

pub fn is_key_signature(ev: &Event) -> bool {
    is_meta_kind(ev, MetaKind::KeySignature)
}

pub fn is_sequencer_specific(ev: &Event) -> bool {
    is_meta_kind(ev, MetaKind::SequencerSpecific)
}

/// True for meta events whose payload is text.
pub fn meta_has_text(ev: &Event) -> bool {
    classify_meta(ev).map_or(false, MetaKind::has_text)
}

/// The text payload of a text-family meta event. Returns empty text for anything else. The
/// payload is arbitrary bytes; [`Text`] keeps them raw when they are not UTF-8.
pub fn meta_text(ev: &Event) -> Text {
    if meta_has_text(ev) {
        Text::from(ev.payload())
    } else {
        Text::default()
    }
}

/// The tempo in microseconds per quarter-note, or `default` if this is not a well-formed tempo
/// event. Taking the previous value as the default suits tempo-map walking: feed the running
/// tempo through and it is updated only by tempo events.
pub fn get_tempo(ev: &Event, default: MicrosecondsPerQuarter) -> MicrosecondsPerQuarter {
    if !is_tempo(ev) {
        return default;
    }
    let payload = ev.payload();
    if payload.len() != 3 {
        return default;
    }
    let value =
        (u32::from(payload[0]) << 16) | (u32::from(payload[1]) << 8) | u32::from(payload[2]);
    MicrosecondsPerQuarter::new(value)
}

/// The time signature, or `default` if this is not a well-formed time signature event.
pub fn get_timesig(ev: &Event, default: TimeSignatureValue) -> TimeSignatureValue {
    if !is_time_signature(ev) {
        return default;
    }
    TimeSignatureValue::from_payload(ev.payload()).unwrap_or(default)
}

/// The key signature, or `default` if this is not a well-formed key signature event.
pub fn get_keysig(ev: &Event, default: KeySignatureValue) -> KeySignatureValue {
    if !is_key_signature(ev) {
        return default;
    }
    KeySignatureValue::from_payload(ev.payload()).unwrap_or(default)
}

/// The SMPTE offset payload, or `None`.
pub fn get_smpte_offset(ev: &Event) -> Option<SmpteOffsetValue> {
    if !is_smpte_offset(ev) {
        return None;
    }
    SmpteOffsetValue::from_payload(ev.payload())
}

/// The sequence number, or `None`.
pub fn get_sequence_number(ev: &Event) -> Option<u16> {
    if !is_sequence_number(ev) {
        return None;
    }
    let payload = ev.payload();
    if payload.len() != 2 {
        return None;
    }
    Some(u16::from_be_bytes([payload[0], payload[1]]))
}

/// The payload of a sequencer-specific meta event, or `None`.
pub fn get_sequencer_specific(ev: &Event) -> Option<&[u8]> {
    if is_sequencer_specific(ev) {
        Some(ev.payload())
    } else {
        None
    }
}

/// The decoded fields of a channel event.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct ChannelEventData {
    pub status_type: StatusType,
    pub channel: Channel,
    pub p1: U7,
    pub p2: U7,
}

/// The channel event fields, or `None` for non-channel events.
pub fn get_channel_event(ev: &Event) -> Option<ChannelEventData> {
    let status = ev.status_byte();
    let status_type = StatusType::from_status_byte(status)?;
    let payload = ev.payload();
    Some(ChannelEventData {
        status_type,
        channel: Channel::new(status & 0x0F),
        p1: U7::new(payload[0]),
        p2: if payload.len() > 1 {
            U7::new(payload[1])
        } else {
            U7::new(0)
        },
    })
}

/// True for channel events (voice or mode).
pub fn is_channel(ev: &Event) -> bool {
    is_channel_status(ev.status_byte())
}

/// True for channel-mode events: status `0xBn` with a controller number of 120 through 127.
pub fn is_channel_mode(ev: &Event) -> bool {
    ev.status_byte() & 0xF0 == 0xB0 && ev.payload()[0] >= 120
}

/// True for channel-voice events. A status of `0xBn` counts as voice only when the controller
/// number is below 120.
pub fn is_channel_voice(ev: &Event) -> bool {
    is_channel(ev) && !is_channel_mode(ev)
}

/// True for note-on events: status nibble `0x9` *and* a velocity greater than zero.
pub fn is_note_on(ev: &Event) -> bool {
    match ev.status_byte() & 0xF0 {
        0x90 => ev.payload()[1] > 0,
        _ => false,
    }
}

/// True for note-off events: status nibble `0x8`, or `0x9` with a velocity of zero.
pub fn is_note_off(ev: &Event) -> bool {
    match ev.status_byte() & 0xF0 {
        0x80 => true,
        0x90 => ev.payload()[1] == 0,
        _ => false,
    }
}

pub fn is_key_pressure(ev: &Event) -> bool {
    ev.status_byte() & 0xF0 == 0xA0
}

pub fn is_control_change(ev: &Event) -> bool {
    ev.status_byte() & 0xF0 == 0xB0 && ev.payload()[0] < 120
}

pub fn is_program_change(ev: &Event) -> bool {
    ev.status_byte() & 0xF0 == 0xC0
}

pub fn is_channel_pressure(ev: &Event) -> bool {
    ev.status_byte() & 0xF0 == 0xD0
}

pub fn is_pitch_bend(ev: &Event) -> bool {
    ev.status_byte() & 0xF0 == 0xE0
}

/// True if `off` ends the note started by `on`: matching channel and note number. Velocities
/// are not compared.
pub fn is_onoff_pair(on: &Event, off: &Event) -> bool {
    is_note_on(on)
        && is_note_off(off)
        && on.status_byte() & 0x0F == off.status_byte() & 0x0F
        && on.payload()[0] == off.payload()[0]
}

pub fn is_sysex(ev: &Event) -> bool {
    matches!(ev.status_byte(), 0xF0 | 0xF7)
}

pub fn is_sysex_f0(ev: &Event) -> bool {
    ev.status_byte() == 0xF0
}

pub fn is_sysex_f7(ev: &Event) -> bool {
    ev.status_byte() == 0xF7
}

/// True if both events have the same bytes ignoring their delta-times.
pub fn is_eq_ignore_dt(a: &Event, b: &Event) -> bool {
    a.event_bytes() == b.event_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::factory::{
        make_control_change, make_eot, make_note_off, make_note_on, make_tempo, make_text,
        make_trackname,
    };
    use crate::core::{ControlValue, NoteNumber, Velocity};

    #[test]
    fn meta_classification() {
        let eot = make_eot(0);
        assert!(is_meta(&eot));
        assert!(is_end_of_track(&eot));
        assert_eq!(Some(MetaKind::EndOfTrack), classify_meta(&eot));
        assert!(!is_meta(&Event::default()));
        assert_eq!(None, classify_meta(&Event::default()));
    }

    #[test]
    fn unknown_meta_types_are_preserved() {
        let ev = Event::from_parts(0, &[0xFF, 0x60, 0x02, 0xAA, 0xBB]);
        assert_eq!(Some(MetaKind::Unknown), classify_meta(&ev));
        assert_eq!(&[0xAA, 0xBB], ev.payload());
    }

    #[test]
    fn text_extraction() {
        let ev = make_text(0, "hello");
        assert!(meta_has_text(&ev));
        assert_eq!("hello", meta_text(&ev).as_str());
        let name = make_trackname(0, "lead");
        assert!(meta_has_text(&name));
        assert!(is_track_name(&name));
        assert_eq!("", meta_text(&make_eot(0)).as_str());
    }

    #[test]
    fn tempo_extraction_and_default_chaining() {
        let tempo = make_tempo(0, MicrosecondsPerQuarter::new(0x07A120));
        let running = MicrosecondsPerQuarter::default();
        assert_eq!(0x07A120, get_tempo(&tempo, running).get());
        // a non-tempo event leaves the running value unchanged
        assert_eq!(running, get_tempo(&make_eot(0), running));
    }

    #[test]
    fn channel_event_fields() {
        let ev = make_note_on(0, Channel::new(2), NoteNumber::new(0x30), Velocity::new(0x60));
        let data = get_channel_event(&ev).unwrap();
        assert_eq!(StatusType::NoteOn, data.status_type);
        assert_eq!(2, data.channel.get());
        assert_eq!(0x30, data.p1.get());
        assert_eq!(0x60, data.p2.get());
        assert!(get_channel_event(&make_eot(0)).is_none());
    }

    #[test]
    fn note_on_off_rules() {
        let on = make_note_on(0, Channel::new(0), NoteNumber::new(60), Velocity::new(64));
        assert!(is_note_on(&on));
        assert!(!is_note_off(&on));

        let off = make_note_off(0, Channel::new(0), NoteNumber::new(60), Velocity::new(64));
        assert!(is_note_off(&off));
        assert!(!is_note_on(&off));

        // a note-on with velocity zero is a note-off
        let silent = Event::from_parts(0, &[0x90, 60, 0]);
        assert!(is_note_off(&silent));
        assert!(!is_note_on(&silent));
    }

    #[test]
    fn onoff_pairing_ignores_velocity() {
        let on = make_note_on(0, Channel::new(3), NoteNumber::new(60), Velocity::new(100));
        let off = make_note_off(9, Channel::new(3), NoteNumber::new(60), Velocity::new(1));
        assert!(is_onoff_pair(&on, &off));
        let wrong_note = make_note_off(0, Channel::new(3), NoteNumber::new(61), Velocity::new(1));
        assert!(!is_onoff_pair(&on, &wrong_note));
        let wrong_channel = make_note_off(0, Channel::new(4), NoteNumber::new(60), Velocity::new(1));
        assert!(!is_onoff_pair(&on, &wrong_channel));
    }

    #[test]
    fn voice_vs_mode_split_at_controller_120() {
        let voice = make_control_change(0, Channel::new(0), U7::new(7), ControlValue::new(100));
        assert!(is_channel_voice(&voice));
        assert!(is_control_change(&voice));
        assert!(!is_channel_mode(&voice));

        let mode = Event::from_parts(0, &[0xB0, 123, 0]); // all notes off
        assert!(is_channel_mode(&mode));
        assert!(!is_channel_voice(&mode));
        assert!(!is_control_change(&mode));
        assert!(is_channel(&mode));
    }

    #[test]
    fn eq_ignore_dt() {
        let a = make_note_on(0, Channel::new(0), NoteNumber::new(60), Velocity::new(64));
        let b = make_note_on(500, Channel::new(0), NoteNumber::new(60), Velocity::new(64));
        assert!(is_eq_ignore_dt(&a, &b));
        assert_ne!(a, b);
    }
}
