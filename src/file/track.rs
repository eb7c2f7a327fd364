use crate::byte_cursor::ByteCursor;
use crate::core::{
    Channel, Clocks, DurationName, MicrosecondsPerQuarter, NoteNumber, TimeSignatureValue,
    Velocity,
};
use crate::error::{self, LibResult};
use crate::event::factory::{
    make_eot, make_lyric, make_note_off, make_note_on, make_tempo, make_timesig, make_trackname,
};
use crate::event::inspect::{
    is_channel, is_end_of_track, is_note_off, is_note_on, is_sequence_number, is_track_name,
};
use crate::event::parse::EventIter;
use crate::event::Event;
use crate::scribe::Scribe;
use log::{debug, trace, warn};
use snafu::ResultExt;
use std::convert::TryFrom;
use std::fmt;
use std::io::Write;

/// Track-level (as opposed to event-level) decoding failures.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TrackErrorKind {
    /// The track data ended without an end-of-track meta event.
    MissingEndOfTrack,
    /// Bytes follow the end-of-track meta event.
    TrailingBytesAfterEndOfTrack,
}

impl fmt::Display for TrackErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackErrorKind::MissingEndOfTrack => {
                f.write_str("end of track data reached before an end-of-track event")
            }
            TrackErrorKind::TrailingBytesAfterEndOfTrack => {
                f.write_str("the end-of-track event is followed by more bytes")
            }
        }
    }
}

/// An index into a track paired with a tick count. Whether the tick is the cumulative count
/// before the event or the event's onset depends on the function that produced it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct EventTick {
    pub index: usize,
    pub tick: i32,
}

/// 2.3 - Track Chunks
/// The track chunks (type MTrk) are where actual song data is stored. Each track chunk is simply
/// a stream of MIDI events (and non-MIDI events), preceded by delta-time values.
///
/// `<Track Chunk> = <chunk type><length><MTrk event>+`
///
/// An event's *onset* is the cumulative delta-time through and including its own; tick-aware
/// editing operations below preserve onsets by rewriting the delta-times around the edit.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Track {
    events: Vec<Event>,
}

impl Track {
    /// Returns `true` if the track has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The number of events in the track.
    pub fn events_len(&self) -> usize {
        self.events.len()
    }

    /// Iterator over the events in the track.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// The event at `index`.
    pub fn event(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    /// The total tick duration: the sum of all delta-times.
    pub fn nticks(&self) -> i32 {
        self.events.iter().map(Event::delta_time).sum()
    }

    /// The serialized size of the event data, not counting the 8-byte chunk header.
    pub fn data_size(&self) -> usize {
        self.events.iter().map(Event::size).sum()
    }

    /// The serialized size including the chunk header.
    pub fn nbytes(&self) -> usize {
        self.data_size() + 8
    }

    /// Add an event to the end.
    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Remove and return the last event, if any.
    pub fn pop_event(&mut self) -> Option<Event> {
        self.events.pop()
    }

    /// Add event at `index` and shift everything after it. The schedule shifts with it: all
    /// later onsets move by the event's delta-time.
    pub fn insert(&mut self, index: usize, event: Event) {
        self.events.insert(index, event);
    }

    /// Remove and return the event at `index`. Later onsets move earlier by its delta-time.
    pub fn remove(&mut self, index: usize) -> Event {
        self.events.remove(index)
    }

    /// Replace the event at `index`.
    pub fn replace_event(&mut self, index: usize, event: Event) {
        self.events[index] = event;
    }

    /// The first event whose cumulative tick *before* the event is at least `tick`, along with
    /// that cumulative tick. When every event starts sooner, `index` is `events_len()` and
    /// `tick` is the total.
    pub fn at_cumtk(&self, tick: i32) -> EventTick {
        let mut result = EventTick { index: 0, tick: 0 };
        while result.index < self.events.len() && result.tick < tick {
            result.tick += self.events[result.index].delta_time();
            result.index += 1;
        }
        result
    }

    /// The first event whose onset is at least `tick`, along with that onset. When every event
    /// starts sooner, `index` is `events_len()` and `tick` is the total.
    pub fn at_tkonset(&self, tick: i32) -> EventTick {
        let mut result = EventTick { index: 0, tick: 0 };
        while result.index < self.events.len() {
            let onset = result.tick + self.events[result.index].delta_time();
            result.tick = onset;
            if onset >= tick {
                return result;
            }
            result.index += 1;
        }
        result
    }

    /// Inserts `event` so that its onset is `tick`, preserving the onset of every other event:
    /// the new event's delta-time is computed from its predecessor, and the successor's
    /// delta-time is reduced to keep its own onset. Returns the insertion index.
    pub fn insert_at_cumtk(&mut self, tick: i32, mut event: Event) -> usize {
        let tick = tick.max(0);
        let found = self.at_tkonset(tick);
        if found.index < self.events.len() {
            let onset = found.tick;
            let cumtk_before = onset - self.events[found.index].delta_time();
            event.set_delta_time(tick - cumtk_before);
            self.events[found.index].set_delta_time(onset - tick);
        } else {
            event.set_delta_time(tick - found.tick);
        }
        self.events.insert(found.index, event);
        found.index
    }

    /// Inserts `event` no earlier than `index`, interpreting its delta-time relative to the
    /// cumulative tick before `index`, without disturbing the onset of any other event. The
    /// inserted event's delta-time and its successor's are both recomputed. Returns the
    /// insertion index.
    pub fn insert_no_tkshift(&mut self, index: usize, mut event: Event) -> usize {
        let mut new_dt = event.delta_time();
        let mut at = index;
        while at < self.events.len() && self.events[at].delta_time() < new_dt {
            new_dt -= self.events[at].delta_time();
            at += 1;
        }
        if at < self.events.len() {
            let successor_dt = self.events[at].delta_time();
            self.events[at].set_delta_time(successor_dt - new_dt);
        }
        event.set_delta_time(new_dt);
        self.events.insert(at, event);
        at
    }

    /// Removes the event at `index`, absorbing its delta-time into its successor so that no
    /// other onset moves.
    pub fn erase_no_tkshift(&mut self, index: usize) -> Event {
        let event = self.events.remove(index);
        if index < self.events.len() {
            let successor_dt = self.events[index].delta_time();
            self.events[index].set_delta_time(successor_dt + event.delta_time());
        }
        event
    }

    /// Stable partition by `pred`: events for which `pred` returns `true` are moved into the
    /// returned track, the rest stay. Delta-times are rewritten on both sides so that every
    /// event keeps its absolute onset.
    pub fn split_if<P: FnMut(&Event) -> bool>(&mut self, mut pred: P) -> Track {
        let mut kept: Vec<Event> = Vec::new();
        let mut taken: Vec<Event> = Vec::new();
        let mut cumtk = 0i32;
        let mut last_kept = 0i32;
        let mut last_taken = 0i32;
        for mut event in self.events.drain(..) {
            cumtk += event.delta_time();
            if pred(&event) {
                event.set_delta_time(cumtk - last_taken);
                last_taken = cumtk;
                taken.push(event);
            } else {
                event.set_delta_time(cumtk - last_kept);
                last_kept = cumtk;
                kept.push(event);
            }
        }
        self.events = kept;
        Track { events: taken }
    }

    /// Interleaves two tracks by absolute onset into a new track with recomputed delta-times.
    /// The merge is stable: order within each input is preserved, and at equal onsets events
    /// from `a` come first.
    pub fn merge(a: &Track, b: &Track) -> Track {
        let mut events = Vec::with_capacity(a.events.len() + b.events.len());
        let (mut ia, mut ib) = (0usize, 0usize);
        let (mut cum_a, mut cum_b) = (0i32, 0i32);
        let mut last = 0i32;
        loop {
            let next_a = a.events.get(ia).map(|e| cum_a + e.delta_time());
            let next_b = b.events.get(ib).map(|e| cum_b + e.delta_time());
            let (mut event, onset) = match (next_a, next_b) {
                (None, None) => break,
                (Some(ta), Some(tb)) if ta <= tb => {
                    let ev = a.events[ia].clone();
                    ia += 1;
                    cum_a = ta;
                    (ev, ta)
                }
                (Some(ta), None) => {
                    let ev = a.events[ia].clone();
                    ia += 1;
                    cum_a = ta;
                    (ev, ta)
                }
                (_, Some(tb)) => {
                    let ev = b.events[ib].clone();
                    ib += 1;
                    cum_b = tb;
                    (ev, tb)
                }
            };
            event.set_delta_time(onset - last);
            last = onset;
            events.push(event);
        }
        Track { events }
    }

    /// Checks the structural rules: the final event must be the only end-of-track event, and a
    /// sequence-number event may only occur at tick zero before any channel event. Questionable
    /// note pairings (a note struck again while already sounding, or a note-off with nothing
    /// to release) are logged as warnings, not errors.
    pub fn validate(&self) -> crate::Result<()> {
        Ok(self.validate_inner()?)
    }

    fn validate_inner(&self) -> LibResult<()> {
        if self.events.is_empty() {
            invalid_file!("the track has no events, so it has no end-of-track event");
        }
        let mut cumtk = 0i32;
        let mut found_channel_event = false;
        let mut sounding: Vec<(u8, u8)> = Vec::new();
        let last_index = self.events.len() - 1;
        for (index, event) in self.events.iter().enumerate() {
            cumtk += event.delta_time();
            if is_end_of_track(event) && index != last_index {
                invalid_file!(
                    "end-of-track event at index {} is not the last event",
                    index
                );
            }
            if is_sequence_number(event) && (cumtk > 0 || found_channel_event) {
                invalid_file!(
                    "sequence-number event at index {} occurs at tick {} after a channel event \
                     or after tick 0",
                    index,
                    cumtk
                );
            }
            if is_channel(event) {
                found_channel_event = true;
            }
            if is_note_on(event) {
                let key = (event.status_byte() & 0x0F, event.payload()[0]);
                if sounding.contains(&key) {
                    warn!(
                        "note {} on channel {} struck again at tick {} while already sounding",
                        key.1, key.0, cumtk
                    );
                } else {
                    sounding.push(key);
                }
            } else if is_note_off(event) {
                let key = (event.status_byte() & 0x0F, event.payload()[0]);
                match sounding.iter().position(|&k| k == key) {
                    Some(at) => {
                        sounding.remove(at);
                    }
                    None => warn!(
                        "note-off for note {} on channel {} at tick {} has no matching note-on",
                        key.1, key.0, cumtk
                    ),
                }
            }
        }
        if !is_end_of_track(&self.events[last_index]) {
            invalid_file!("the last event is not an end-of-track event");
        }
        for (channel, note) in sounding {
            warn!(
                "note {} on channel {} is still sounding at the end of the track",
                note, channel
            );
        }
        Ok(())
    }

    /// Add, or replace, the track name at the beginning of a track.
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        let meta = make_trackname(0, name.into());
        if self.is_empty() {
            self.push_event(meta);
            return;
        }
        for (index, event) in self.events.iter().enumerate() {
            if event.delta_time() != 0 {
                break;
            }
            if is_track_name(event) {
                debug!("replacing track name at index {}", index);
                self.replace_event(index, meta);
                return;
            }
        }
        self.insert(0, meta);
    }

    /// Add a note on message.
    pub fn push_note_on(
        &mut self,
        delta_time: i32,
        channel: Channel,
        note_number: NoteNumber,
        velocity: Velocity,
    ) {
        self.push_event(make_note_on(delta_time, channel, note_number, velocity));
    }

    /// Add a note off message.
    pub fn push_note_off(
        &mut self,
        delta_time: i32,
        channel: Channel,
        note_number: NoteNumber,
        velocity: Velocity,
    ) {
        self.push_event(make_note_off(delta_time, channel, note_number, velocity));
    }

    /// Add a tempo message.
    pub fn push_tempo(&mut self, delta_time: i32, us_per_quarter: MicrosecondsPerQuarter) {
        self.push_event(make_tempo(delta_time, us_per_quarter));
    }

    /// Add a time signature.
    pub fn push_time_signature(
        &mut self,
        delta_time: i32,
        numerator: u8,
        denominator: DurationName,
        click: Clocks,
    ) {
        let value = TimeSignatureValue::new(numerator, denominator, click);
        self.push_event(make_timesig(delta_time, value));
    }

    /// Add a lyric.
    pub fn push_lyric<S: Into<String>>(&mut self, delta_time: i32, lyric: S) {
        self.push_event(make_lyric(delta_time, lyric.into()));
    }

    pub(crate) fn parse(cursor: &mut ByteCursor<'_>, chunk_index: usize) -> LibResult<Self> {
        cursor.expect_tag("MTrk").context(io!())?;
        let chunk_length = cursor.read_u32().context(io!())?;
        let body = cursor.read_n(chunk_length as usize).context(io!())?;
        let mut events = Vec::new();
        let mut iter = EventIter::new(body);
        let mut saw_end_of_track = false;
        while let Some(item) = iter.next() {
            let event = match item {
                Ok(event) => event,
                Err(e) => {
                    return Err(e).context(error::InvalidEventSnafu {
                        site: site!(),
                        chunk_index,
                        offset: e.offset,
                    });
                }
            };
            trace!("parsed {:?}", event);
            let is_track_end = is_end_of_track(&event);
            events.push(event);
            if is_track_end {
                debug!("end of track event");
                if iter.position() != body.len() {
                    return error::InvalidTrackSnafu {
                        site: site!(),
                        chunk_index,
                        kind: TrackErrorKind::TrailingBytesAfterEndOfTrack,
                    }
                    .fail();
                }
                saw_end_of_track = true;
                break;
            }
        }
        if !saw_end_of_track {
            return error::InvalidTrackSnafu {
                site: site!(),
                chunk_index,
                kind: TrackErrorKind::MissingEndOfTrack,
            }
            .fail();
        }
        Ok(Self { events })
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>) -> LibResult<()> {
        // write the track chunk header
        w.write_all(b"MTrk").context(wr!())?;

        // we need to write out all of the data first so we know its length
        let mut track_data: Vec<u8> = Vec::new();
        let mut track_scribe = Scribe::new(
            &mut track_data,
            crate::scribe::ScribeSettings {
                running_status: w.use_running_status(),
            },
        );
        for event in self.events() {
            write_event(event, &mut track_scribe)?;
        }

        // write the length of the track
        let track_length = u32::try_from(track_data.len())
            .context(error::TrackTooLongSnafu { site: site!() })?;
        w.write_all(&track_length.to_be_bytes()).context(wr!())?;

        // write the track data
        w.write_all(&track_data).context(wr!())?;
        Ok(())
    }
}

fn write_event<W: Write>(event: &Event, w: &mut Scribe<W>) -> LibResult<()> {
    w.write_all(event.dt_bytes()).context(wr!())?;
    if is_channel(event) {
        // the scribe elides the status byte when running status allows
        w.write_status_byte(event.status_byte())?;
        w.write_all(event.payload()).context(wr!())?;
    } else {
        w.clear_running_status();
        w.write_all(event.event_bytes()).context(wr!())?;
    }
    Ok(())
}

/// If the last item of the track is *not* an end-of-track event, then add it to the back. If
/// the track already has an end-of-track event as its last event, then nothing happens.
pub(crate) fn ensure_end_of_track(mut track: Track) -> Track {
    let needs_eot = match track.events.last() {
        Some(last) => !is_end_of_track(last),
        None => true,
    };
    if needs_eot {
        track.push_event(make_eot(0));
    }
    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::U7;
    use crate::event::factory::{make_control_change, make_seqn};
    use crate::core::ControlValue;

    fn note_track() -> Track {
        let mut track = Track::default();
        track.push_note_on(0, Channel::new(0), NoteNumber::new(60), Velocity::new(80));
        track.push_note_off(96, Channel::new(0), NoteNumber::new(60), Velocity::new(0));
        track.push_note_on(0, Channel::new(0), NoteNumber::new(62), Velocity::new(80));
        track.push_note_off(96, Channel::new(0), NoteNumber::new(62), Velocity::new(0));
        track.push_event(make_eot(0));
        track
    }

    fn onsets(track: &Track) -> Vec<i32> {
        let mut cum = 0;
        track
            .events()
            .map(|e| {
                cum += e.delta_time();
                cum
            })
            .collect()
    }

    #[test]
    fn tick_totals() {
        let track = note_track();
        assert_eq!(5, track.events_len());
        assert_eq!(192, track.nticks());
        assert_eq!(vec![0, 96, 96, 192, 192], onsets(&track));
    }

    #[test]
    fn at_cumtk_and_at_tkonset_differ_by_the_delta_time() {
        let track = note_track();
        // the second note-off waits 96 ticks starting at tick 96
        let pre = track.at_cumtk(100);
        assert_eq!(192, pre.tick);
        let onset = track.at_tkonset(100);
        assert_eq!(3, onset.index);
        assert_eq!(192, onset.tick);
        // past the end
        let past = track.at_tkonset(1000);
        assert_eq!(track.events_len(), past.index);
        assert_eq!(192, past.tick);
    }

    #[test]
    fn insert_at_cumtk_preserves_other_onsets() {
        let mut track = note_track();
        let before = onsets(&track);
        let cc = make_control_change(0, Channel::new(0), U7::new(7), ControlValue::new(100));
        let index = track.insert_at_cumtk(48, cc);
        assert_eq!(48, onsets(&track)[index]);
        let after: Vec<i32> = onsets(&track)
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != index)
            .map(|(_, &t)| t)
            .collect();
        assert_eq!(before, after);
        assert_eq!(192, track.nticks());
    }

    #[test]
    fn insert_no_tkshift_keeps_the_schedule() {
        let mut track = note_track();
        let before = onsets(&track);
        let cc = make_control_change(50, Channel::new(0), U7::new(7), ControlValue::new(100));
        let index = track.insert_no_tkshift(0, cc);
        assert_eq!(50, onsets(&track)[index]);
        let after: Vec<i32> = onsets(&track)
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != index)
            .map(|(_, &t)| t)
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn erase_no_tkshift_absorbs_the_delta_time() {
        let mut track = note_track();
        let before = onsets(&track);
        let removed = track.erase_no_tkshift(1);
        assert!(is_note_off(&removed));
        let after = onsets(&track);
        // all surviving events keep their onsets
        assert_eq!(
            before
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != 1)
                .map(|(_, &t)| t)
                .collect::<Vec<i32>>(),
            after
        );
        assert_eq!(192, track.nticks());
    }

    #[test]
    fn split_and_merge_are_inverse() {
        let original = note_track();
        let mut kept = original.clone();
        let taken = kept.split_if(|e| is_note_on(e));
        assert_eq!(2, taken.events_len());
        assert_eq!(3, kept.events_len());
        // both halves preserve onsets
        assert_eq!(vec![0, 96], onsets(&taken));
        assert_eq!(vec![96, 192, 192], onsets(&kept));
        let merged = Track::merge(&kept, &taken);
        assert_eq!(onsets(&original), onsets(&merged));
        // equal as (onset, event-sans-dt) sequences
        let a: Vec<&[u8]> = original.events().map(Event::event_bytes).collect();
        let b: Vec<&[u8]> = merged.events().map(Event::event_bytes).collect();
        // merge is stable but may reorder equal-onset events between the halves, so compare as
        // multisets per onset
        let mut a_pairs: Vec<(i32, &[u8])> = onsets(&original).into_iter().zip(a).collect();
        let mut b_pairs: Vec<(i32, &[u8])> = onsets(&merged).into_iter().zip(b).collect();
        a_pairs.sort();
        b_pairs.sort();
        assert_eq!(a_pairs, b_pairs);
    }

    #[test]
    fn validate_accepts_a_clean_track() {
        assert!(note_track().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_eot() {
        let mut track = note_track();
        track.pop_event();
        assert!(track.validate().is_err());
        assert!(Track::default().validate().is_err());
    }

    #[test]
    fn validate_rejects_misplaced_sequence_number() {
        let mut track = Track::default();
        track.push_note_on(0, Channel::new(0), NoteNumber::new(60), Velocity::new(80));
        track.push_event(make_seqn(0, 3));
        track.push_event(make_eot(0));
        assert!(track.validate().is_err());

        let mut track = Track::default();
        track.push_event(make_seqn(0, 3));
        track.push_note_on(0, Channel::new(0), NoteNumber::new(60), Velocity::new(80));
        track.push_note_off(1, Channel::new(0), NoteNumber::new(60), Velocity::new(0));
        track.push_event(make_eot(0));
        assert!(track.validate().is_ok());
    }

    #[test]
    fn set_name_replaces_an_existing_name() {
        let mut track = Track::default();
        track.set_name("one");
        track.push_event(make_eot(0));
        track.set_name("two");
        assert_eq!(2, track.events_len());
        assert!(is_track_name(track.event(0).unwrap()));
        assert_eq!(
            "two",
            crate::event::inspect::meta_text(track.event(0).unwrap()).as_str()
        );
    }

    #[test]
    fn ensure_end_of_track_is_idempotent() {
        let track = ensure_end_of_track(Track::default());
        assert_eq!(1, track.events_len());
        let track = ensure_end_of_track(track);
        assert_eq!(1, track.events_len());
    }
}
