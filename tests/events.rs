//! Byte-level scenarios exercised through the public API: the literal encodings come from the
//! MIDI file standard (the VLQ table on p.131, the tempo and end-of-track examples) and from
//! the running-status rules.

mod utils;

use smf_file::core::vlq::{encode_vlq, read_vlq, vlq_field_size};
use smf_file::core::{Channel, MicrosecondsPerQuarter, NoteNumber, Velocity};
use smf_file::event::factory::{make_note_on, make_sysex_f0, make_tempo};
use smf_file::event::inspect::{get_tempo, is_tempo};
use smf_file::event::parse::{parse_event, EventErrorKind, EventIter};
use smf_file::Event;
use utils::enable_logging;

#[test]
fn vlq_standard_table() {
    enable_logging();
    let cases: &[(i32, &[u8])] = &[
        (0x00, &[0x00]),
        (0x40, &[0x40]),
        (0x7F, &[0x7F]),
        (0x80, &[0x81, 0x00]),
        (0x2000, &[0xC0, 0x00]),
        (0x3FFF, &[0xFF, 0x7F]),
        (0x4000, &[0x81, 0x80, 0x00]),
        (0x10_0000, &[0xC0, 0x80, 0x00]),
        (0x1F_FFFF, &[0xFF, 0xFF, 0x7F]),
        (0x20_0000, &[0x81, 0x80, 0x80, 0x00]),
        (0x800_0000, &[0xC0, 0x80, 0x80, 0x00]),
        (0x0FFF_FFFF, &[0xFF, 0xFF, 0xFF, 0x7F]),
    ];
    for &(value, bytes) in cases {
        let encoded = encode_vlq(value);
        assert_eq!(bytes, &*encoded, "encoding {:#x}", value);
        assert_eq!(bytes.len(), vlq_field_size(value));
        let decoded = read_vlq(bytes);
        assert!(decoded.is_valid);
        assert_eq!(value, decoded.value);
        assert_eq!(bytes.len(), decoded.nbytes as usize);
    }
}

#[test]
fn vlq_canonicity() {
    // no canonical encoding contains a leading 0x80 byte
    let mut value = 0i32;
    while value <= 0x0FFF_FFFF {
        let encoded = encode_vlq(value);
        for (i, &byte) in encoded.iter().enumerate() {
            if i + 1 < encoded.len() {
                assert_ne!(0x80, byte, "leading zero byte while encoding {:#x}", value);
            } else {
                assert_eq!(0, byte & 0x80);
            }
        }
        value = value * 2 + 1;
    }
}

#[test]
fn tempo_event_end_to_end() {
    enable_logging();
    let ev = make_tempo(0, MicrosecondsPerQuarter::new(0x07A120));
    assert_eq!(&[0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20], ev.as_bytes());

    let parsed = parse_event(ev.as_bytes(), 0).unwrap();
    assert!(is_tempo(&parsed.event));
    assert_eq!(
        0x07A120,
        get_tempo(&parsed.event, MicrosecondsPerQuarter::default()).get()
    );
}

#[test]
fn running_status_stream_decodes_to_canonical_events() {
    enable_logging();
    let body = [0x00u8, 0x92, 0x30, 0x60, 0x81, 0x48, 0x30, 0x60];
    let events: Vec<Event> = EventIter::new(&body).map(Result::unwrap).collect();
    assert_eq!(2, events.len());

    assert_eq!(0, events[0].delta_time());
    assert_eq!(0x92, events[0].status_byte());
    assert_eq!(&[0x30, 0x60], events[0].payload());

    assert_eq!(200, events[1].delta_time());
    assert_eq!(0x92, events[1].status_byte());
    assert_eq!(&[0x30, 0x60], events[1].payload());
    // the canonical form includes the status byte the input elided
    assert_eq!(&[0x81, 0x48, 0x92, 0x30, 0x60], events[1].as_bytes());

    // events constructed from the same (dt, status, body) compare equal no matter how the
    // input spelled them
    let explicit = parse_event(&[0x81, 0x48, 0x92, 0x30, 0x60], 0).unwrap();
    assert_eq!(explicit.event, events[1]);
}

#[test]
fn sysex_f0_normalization() {
    let ev = make_sysex_f0(0, &[0x01, 0x02, 0x03, 0x04]);
    assert_eq!(
        &[0x00, 0xF0, 0x05, 0x01, 0x02, 0x03, 0x04, 0xF7],
        ev.as_bytes()
    );
    let ev = make_sysex_f0(0, &[0x01, 0x02, 0x03, 0xF7]);
    assert_eq!(&[0x00, 0xF0, 0x04, 0x01, 0x02, 0x03, 0xF7], ev.as_bytes());
}

#[test]
fn truncated_meta_event_reports_the_right_kind_and_offset() {
    let body = [0x00u8, 0xFF, 0x01, 0x05, 0x41, 0x42, 0x43];
    let err = EventIter::new(&body).next().unwrap().err().unwrap();
    assert_eq!(EventErrorKind::SysexOrMetaBodyExceedsInput, err.kind);
    assert_eq!(0, err.offset); // the failing event starts at the beginning of the body
}

#[test]
fn set_delta_time_clamps_into_range() {
    let mut ev = make_note_on(0, Channel::new(0), NoteNumber::new(60), Velocity::new(64));
    ev.set_delta_time(-100);
    assert_eq!(0, ev.delta_time());
    ev.set_delta_time(i32::max_value());
    assert_eq!(0x0FFF_FFFF, ev.delta_time());
    ev.set_delta_time(500);
    assert_eq!(500, ev.delta_time());
}

#[test]
fn decoder_is_total_over_arbitrary_prefixes() {
    // every prefix of a valid stream either decodes fully or produces exactly one error
    let body = [
        0x00u8, 0x92, 0x30, 0x60, 0x10, 0x31, 0x60, 0x00, 0xF0, 0x02, 0x01, 0xF7, 0x08, 0xFF,
        0x2F, 0x00,
    ];
    for cut in 0..=body.len() {
        let mut iter = EventIter::new(&body[..cut]);
        let mut errors = 0;
        for item in &mut iter {
            if item.is_err() {
                errors += 1;
            }
        }
        assert!(errors <= 1, "more than one error for prefix length {}", cut);
    }
}
