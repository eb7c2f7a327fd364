/*!
`smf_file` reads, represents, manipulates, and writes Standard MIDI Files.

Events are kept in the exact serialized form the format defines (a delta-time VLQ, an explicit
status byte, and the body) inside a small-buffer-optimized container, so a [`Track`] is a
faithful, editable image of an MTrk chunk. Running status is resolved while decoding and elided
again (optionally) while writing; it never leaks into the in-memory representation.

```
use smf_file::core::{Channel, MicrosecondsPerQuarter, NoteNumber, Velocity};
use smf_file::{Division, Format, Header, SmfFile, Track};

let mut track = Track::default();
track.set_name("melody");
track.push_tempo(0, MicrosecondsPerQuarter::new(500_000));
track.push_note_on(0, Channel::new(0), NoteNumber::new(60), Velocity::new(80));
track.push_note_off(96, Channel::new(0), NoteNumber::new(60), Velocity::new(0));

let mut file = SmfFile::new(Header::new(Format::Multi, Division::quarter_note(96)));
file.push_track(track);

let mut bytes = Vec::new();
file.write(&mut bytes).unwrap();
let reloaded = SmfFile::parse(&bytes).unwrap();
assert_eq!(file, reloaded);
```
!*/

// https://www.music.mcgill.ca/~gary/306/week9/smf.html
// https://github.com/Shkyrockett/midi-unit-test-cases

#[macro_use]
mod error;
#[macro_use]
mod clamp;
#[macro_use]
mod macros;

mod byte_cursor;
mod scribe;
mod text;

pub mod core;
pub mod event;
pub mod file;

pub use error::{Error, Result};
pub use event::Event;
pub use file::{Division, Format, Header, SmfFile, Track, UnknownChunk};
pub use text::Text;
