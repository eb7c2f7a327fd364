/*!
The `file` module is for types and concepts strictly related to MIDI *files*: the MThd header,
the MTrk track chunk, unknown chunks, and the [`SmfFile`] container that ties them together.
!*/

use crate::byte_cursor::ByteCursor;
use crate::error::{self, LibResult};
use crate::scribe::{Scribe, ScribeSettings};
use log::{debug, trace};
use snafu::ResultExt;
use std::convert::TryFrom;
use std::io::{Read, Write};
use std::path::Path;

mod division;
mod header;
mod track;

pub use division::{Division, FrameRate, QuarterNoteDivision, SmpteRate, SubframeResolution};
pub use header::{Format, Header, HeaderErrorKind};
pub use track::{EventTick, Track, TrackErrorKind};

use track::ensure_end_of_track;

/// A chunk whose 4-byte id is printable ASCII but neither `MThd` nor `MTrk`. The standard
/// requires readers to expect alien chunks and pass over them; this library preserves their
/// bytes and their position among the tracks.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct UnknownChunk {
    id: [u8; 4],
    data: Vec<u8>,
}

impl UnknownChunk {
    pub fn id(&self) -> &[u8; 4] {
        &self.id
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// One chunk of an [`SmfFile`], in file order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChunkRef<'a> {
    Track(&'a Track),
    Unknown(&'a UnknownChunk),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
enum ChunkIndex {
    Track(usize),
    Unknown(usize),
}

// https://www.music.mcgill.ca/~gary/306/week9/smf.html
// https://github.com/Shkyrockett/midi-unit-test-cases

/// A Standard MIDI File: one MThd header, the declared number of MTrk chunks, and any unknown
/// chunks interleaved among them. The relative order of tracks and unknown chunks is preserved
/// across a read/write cycle.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SmfFile {
    header: Header,
    tracks: Vec<Track>,
    unknown: Vec<UnknownChunk>,
    order: Vec<ChunkIndex>,
}

impl SmfFile {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn tracks_len(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    /// Appends a track, adding an end-of-track event if the track lacks one.
    pub fn push_track(&mut self, track: Track) {
        self.tracks.push(ensure_end_of_track(track));
        self.order.push(ChunkIndex::Track(self.tracks.len() - 1));
    }

    pub fn unknown_chunks(&self) -> impl Iterator<Item = &UnknownChunk> {
        self.unknown.iter()
    }

    /// All chunks in file order.
    pub fn chunks(&self) -> impl Iterator<Item = ChunkRef<'_>> {
        self.order.iter().map(move |index| match index {
            ChunkIndex::Track(i) => ChunkRef::Track(&self.tracks[*i]),
            ChunkIndex::Unknown(i) => ChunkRef::Unknown(&self.unknown[*i]),
        })
    }

    /// Parses a complete SMF from memory.
    pub fn parse(bytes: &[u8]) -> crate::Result<Self> {
        Ok(Self::parse_inner(bytes)?)
    }

    /// Reads a complete SMF from any reader.
    pub fn read<R: Read>(mut r: R) -> crate::Result<Self> {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes).context(error::FileReadSnafu {
            site: site!(),
            path: "<reader>",
        })?;
        Self::parse(&bytes)
    }

    /// Loads an SMF from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).context(error::FileReadSnafu {
            site: site!(),
            path: path.display().to_string(),
        })?;
        Self::parse(&bytes)
    }

    /// Writes the SMF. Repeated channel status bytes are elided on the wire (running status);
    /// in-memory events always carry their status byte explicitly.
    pub fn write<W: Write>(&self, w: &mut W) -> crate::Result<()> {
        Ok(self.write_inner(w)?)
    }

    /// Saves the SMF to a file path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let mut file = std::fs::File::create(path).context(error::FileCreateSnafu {
            site: site!(),
            path: path.display().to_string(),
        })?;
        Ok(self.write_inner(&mut file)?)
    }

    fn parse_inner(bytes: &[u8]) -> LibResult<Self> {
        let mut cursor = ByteCursor::new(bytes);
        trace!("parsing header chunk");
        let (header, declared_tracks) = Header::parse(&mut cursor)?;
        let mut tracks: Vec<Track> = Vec::new();
        let mut unknown: Vec<UnknownChunk> = Vec::new();
        let mut order: Vec<ChunkIndex> = Vec::new();
        while !cursor.is_end() {
            if cursor.is_tag("MTrk") {
                trace!("parsing track chunk {} (zero-based)", tracks.len());
                let track = Track::parse(&mut cursor, tracks.len())?;
                tracks.push(track);
                order.push(ChunkIndex::Track(tracks.len() - 1));
            } else if cursor.remaining() >= 8 && is_printable_chunk_id(&cursor.rest()[..4]) {
                let id_bytes = cursor.read4().context(io!())?;
                let length = cursor.read_u32().context(io!())?;
                let data = cursor.read_n(length as usize).context(io!())?;
                debug!(
                    "keeping unknown chunk '{}' of {} bytes",
                    String::from_utf8_lossy(&id_bytes),
                    length
                );
                unknown.push(UnknownChunk {
                    id: id_bytes,
                    data: data.to_vec(),
                });
                order.push(ChunkIndex::Unknown(unknown.len() - 1));
            } else {
                // no padding is permitted after the final chunk
                invalid_file!(
                    "{} trailing byte(s) at offset {} do not form a chunk",
                    cursor.remaining(),
                    cursor.position()
                );
            }
        }
        if tracks.len() != declared_tracks as usize {
            return error::TrackCountMismatchSnafu {
                site: site!(),
                declared: declared_tracks,
                found: tracks.len(),
            }
            .fail();
        }
        Ok(Self {
            header,
            tracks,
            unknown,
            order,
        })
    }

    fn write_inner<W: Write>(&self, w: &mut W) -> LibResult<()> {
        let ntracks = u16::try_from(self.tracks.len()).map_err(|_| {
            error::TooManyTracksSnafu {
                site: site!(),
                count: self.tracks.len(),
            }
            .build()
        })?;
        let mut scribe = Scribe::new(
            w,
            ScribeSettings {
                running_status: true,
            },
        );
        self.header.write(&mut scribe, ntracks)?;
        for chunk in self.chunks() {
            match chunk {
                ChunkRef::Track(track) => track.write(&mut scribe)?,
                ChunkRef::Unknown(unknown) => {
                    scribe.write_all(&unknown.id).context(wr!())?;
                    let length = u32::try_from(unknown.data.len())
                        .context(error::TrackTooLongSnafu { site: site!() })?;
                    scribe.write_all(&length.to_be_bytes()).context(wr!())?;
                    scribe.write_all(&unknown.data).context(wr!())?;
                }
            }
        }
        Ok(())
    }
}

fn is_printable_chunk_id(id: &[u8]) -> bool {
    id.iter().all(|&b| (0x20..=0x7E).contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    // A format 1 MThd declaring one track, then the smallest legal MTrk.
    const MINIMAL: &[u8] = &[
        b'M', b'T', b'h', b'd', 0x00, 0x00, 0x00, 0x06, 0x00, 0x01, 0x00, 0x01, 0x00, 0x60, b'M',
        b'T', b'r', b'k', 0x00, 0x00, 0x00, 0x04, 0x00, 0xFF, 0x2F, 0x00,
    ];

    #[test]
    fn minimal_file_parses() {
        let file = SmfFile::parse(MINIMAL).unwrap();
        assert_eq!(1, file.tracks_len());
        let track = file.track(0).unwrap();
        assert_eq!(1, track.events_len());
        assert_eq!(0, track.nticks());
    }

    #[test]
    fn track_count_mismatch_is_an_error() {
        let mut bytes = MINIMAL.to_vec();
        bytes[11] = 2; // declare two tracks, provide one
        let err = SmfFile::parse(&bytes).err().unwrap();
        assert!(format!("{}", err).contains("declares 2"));
    }

    #[test]
    fn unknown_chunks_are_preserved_in_order() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MINIMAL[..14]);
        // an alien chunk between the header and the track
        bytes.extend_from_slice(b"XFIH");
        bytes.extend_from_slice(&3u32.to_be_bytes());
        bytes.extend_from_slice(&[1, 2, 3]);
        bytes.extend_from_slice(&MINIMAL[14..]);

        let file = SmfFile::parse(&bytes).unwrap();
        assert_eq!(1, file.tracks_len());
        assert_eq!(1, file.unknown_chunks().count());
        let order: Vec<bool> = file
            .chunks()
            .map(|c| matches!(c, ChunkRef::Unknown(_)))
            .collect();
        assert_eq!(vec![true, false], order);

        // and they write back out in the same position
        let mut rewritten = Vec::new();
        file.write(&mut rewritten).unwrap();
        assert_eq!(bytes, rewritten);
    }

    #[test]
    fn trailing_padding_is_rejected() {
        let mut bytes = MINIMAL.to_vec();
        bytes.push(0x00);
        let err = SmfFile::parse(&bytes).err().unwrap();
        assert!(format!("{}", err).contains("trailing"));
    }

    #[test]
    fn non_printable_garbage_is_rejected() {
        let mut bytes = MINIMAL.to_vec();
        bytes.extend_from_slice(&[0x01, 0x02, 0x03, 0x04, 0, 0, 0, 0]);
        assert!(SmfFile::parse(&bytes).is_err());
    }
}
