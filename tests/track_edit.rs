//! Tick-aware editing properties: schedule preservation under no-shift inserts and erases, and
//! the split/merge inverse.

mod utils;

use smf_file::core::{Channel, ControlValue, MicrosecondsPerQuarter, NoteNumber, Velocity, U7};
use smf_file::event::factory::{make_control_change, make_eot, make_marker, make_tempo};
use smf_file::event::inspect::{is_channel, is_meta, is_note_on};
use smf_file::{Event, Track};
use utils::enable_logging;

fn build_track() -> Track {
    let mut track = Track::default();
    track.push_tempo(0, MicrosecondsPerQuarter::new(600_000));
    track.push_note_on(0, Channel::new(0), NoteNumber::new(60), Velocity::new(80));
    track.push_note_off(96, Channel::new(0), NoteNumber::new(60), Velocity::new(0));
    track.push_note_on(24, Channel::new(1), NoteNumber::new(64), Velocity::new(90));
    track.push_note_off(96, Channel::new(1), NoteNumber::new(64), Velocity::new(0));
    track.push_event(make_marker(30, "coda"));
    track.push_event(make_eot(0));
    track
}

/// The multiset of (onset, event-ignoring-delta-time) pairs.
fn schedule(track: &Track) -> Vec<(i32, Vec<u8>)> {
    let mut cumtk = 0;
    let mut pairs: Vec<(i32, Vec<u8>)> = track
        .events()
        .map(|e| {
            cumtk += e.delta_time();
            (cumtk, e.event_bytes().to_vec())
        })
        .collect();
    pairs.sort();
    pairs
}

#[test]
fn no_tkshift_edits_preserve_the_schedule_of_other_events() {
    enable_logging();
    let mut track = build_track();
    let original = schedule(&track);
    let nticks = track.nticks();

    // a sequence of no-shift inserts and erases
    let cc = make_control_change(50, Channel::new(0), U7::new(7), ControlValue::new(99));
    let i1 = track.insert_no_tkshift(0, cc.clone());
    let i2 = track.insert_no_tkshift(2, make_tempo(100, MicrosecondsPerQuarter::new(500_000)));
    assert_eq!(nticks, track.nticks());
    track.erase_no_tkshift(i2);
    track.erase_no_tkshift(i1);

    assert_eq!(original, schedule(&track));
    assert_eq!(nticks, track.nticks());
}

#[test]
fn insert_at_cumtk_sets_the_requested_onset() {
    let mut track = build_track();
    let original = schedule(&track);
    let cc = make_control_change(0, Channel::new(2), U7::new(10), ControlValue::new(64));
    let index = track.insert_at_cumtk(100, cc.clone());

    let mut cumtk = 0;
    let onsets: Vec<i32> = track
        .events()
        .map(|e| {
            cumtk += e.delta_time();
            cumtk
        })
        .collect();
    assert_eq!(100, onsets[index]);

    // removing it again restores the schedule
    track.erase_no_tkshift(index);
    assert_eq!(original, schedule(&track));
}

#[test]
fn split_then_merge_is_the_identity_on_the_schedule() {
    let original = build_track();

    let predicates: Vec<fn(&Event) -> bool> = vec![
        |e| is_note_on(e),
        |e| is_meta(e),
        |e| is_channel(e),
        |_| false,
        |_| true,
    ];
    for pred in predicates {
        let mut kept = original.clone();
        let taken = kept.split_if(pred);
        assert_eq!(
            original.events_len(),
            kept.events_len() + taken.events_len()
        );
        let merged = Track::merge(&kept, &taken);
        assert_eq!(schedule(&original), schedule(&merged));
    }
}

#[test]
fn merge_is_stable_within_each_input() {
    let mut a = Track::default();
    a.push_event(make_marker(10, "a1"));
    a.push_event(make_marker(0, "a2"));
    let mut b = Track::default();
    b.push_event(make_marker(10, "b1"));

    let merged = Track::merge(&a, &b);
    let names: Vec<String> = merged
        .events()
        .map(|e| smf_file::event::inspect::meta_text(e).to_string())
        .collect();
    // equal onsets: both of a's events precede b's
    assert_eq!(vec!["a1", "a2", "b1"], names);
    assert_eq!(10, merged.nticks());
}

#[test]
fn split_halves_preserve_absolute_onsets() {
    let mut kept = build_track();
    let taken = kept.split_if(is_note_on);

    let whole = schedule(&build_track());
    for (onset, bytes) in schedule(&taken) {
        assert!(whole.contains(&(onset, bytes)));
    }
    for (onset, bytes) in schedule(&kept) {
        assert!(whole.contains(&(onset, bytes)));
    }
}
