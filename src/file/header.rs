use crate::byte_cursor::ByteCursor;
use crate::error::{self, LibResult};
use crate::file::Division;
use crate::scribe::Scribe;
use log::trace;
use snafu::ResultExt;
use std::convert::TryFrom;
use std::fmt;
use std::io::Write;

/// The ways an MThd chunk can be malformed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum HeaderErrorKind {
    /// The length field is below the required 6 bytes.
    BadLength(u32),
    /// The format word is not 0, 1, or 2.
    BadFormat(u16),
    /// A format 0 file must declare exactly one track.
    NtrksFormatMismatch(u16),
    /// The division word is neither a legal ticks-per-quarter nor a legal SMPTE pair.
    BadDivision(u16),
}

impl fmt::Display for HeaderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderErrorKind::BadLength(v) => write!(f, "header length {} is less than 6", v),
            HeaderErrorKind::BadFormat(v) => write!(f, "format {} is not 0, 1 or 2", v),
            HeaderErrorKind::NtrksFormatMismatch(n) => {
                write!(f, "a format 0 file must have 1 track, found {}", n)
            }
            HeaderErrorKind::BadDivision(v) => write!(f, "invalid division word {:#06X}", v),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Header {
    format: Format,
    division: Division,
}

impl Header {
    /// Create a new `Header` object.
    pub fn new(format: Format, division: Division) -> Self {
        Self { format, division }
    }

    /// A getter for the `format` field.
    pub fn format(&self) -> &Format {
        &self.format
    }

    /// A getter for the `division` field.
    pub fn division(&self) -> &Division {
        &self.division
    }

    /// Parses the MThd chunk. Returns the header and the declared track count; the caller
    /// checks the count against the MTrk chunks it actually finds.
    pub(crate) fn parse(cursor: &mut ByteCursor<'_>) -> LibResult<(Self, u16)> {
        cursor.expect_tag("MThd").context(io!())?;
        let chunk_length = cursor.read_u32().context(io!())?;
        // the header chunk length is 6, but readers accept a longer header and ignore the
        // trailing bytes
        if chunk_length < 6 {
            return error::InvalidHeaderSnafu {
                site: site!(),
                kind: HeaderErrorKind::BadLength(chunk_length),
            }
            .fail();
        }
        let format_word = cursor.read_u16().context(io!())?;
        let num_tracks = cursor.read_u16().context(io!())?;
        let division_word = cursor.read_u16().context(io!())?;
        if chunk_length > 6 {
            trace!("skipping {} extra header bytes", chunk_length - 6);
            cursor.skip(chunk_length as usize - 6).context(io!())?;
        }
        let format = Format::from_u16(format_word)?;
        if matches!(format, Format::Single) && num_tracks != 1 {
            return error::InvalidHeaderSnafu {
                site: site!(),
                kind: HeaderErrorKind::NtrksFormatMismatch(num_tracks),
            }
            .fail();
        }
        let division = Division::from_u16(division_word).map_err(|kind| {
            error::InvalidHeaderSnafu {
                site: site!(),
                kind,
            }
            .build()
        })?;
        Ok((Self { format, division }, num_tracks))
    }

    pub(crate) fn write<W: Write>(&self, w: &mut Scribe<W>, ntracks: u16) -> LibResult<()> {
        // write the header chunk identifier
        w.write_all(b"MThd").context(wr!())?;

        // write the header chunk length (always 6)
        w.write_all(&6u32.to_be_bytes()).context(wr!())?;

        // write the format indicator
        w.write_all(&(self.format as u16).to_be_bytes())
            .context(wr!())?;

        // write the number of tracks
        w.write_all(&ntracks.to_be_bytes()).context(wr!())?;

        // write the division value
        w.write_all(&self.division.to_u16().to_be_bytes())
            .context(wr!())?;
        Ok(())
    }
}

#[repr(u16)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Format {
    /// 0 the file contains a single multi-channel track
    Single = 0,
    /// 1 the file contains one or more simultaneous tracks (or MIDI outputs) of a sequence
    Multi = 1,
    /// 2 the file contains one or more sequentially independent single-track patterns
    Sequential = 2,
}

impl Default for Format {
    fn default() -> Self {
        Format::Multi
    }
}

impl Format {
    pub(crate) fn from_u16(value: u16) -> LibResult<Self> {
        match value {
            0 => Ok(Format::Single),
            1 => Ok(Format::Multi),
            2 => Ok(Format::Sequential),
            _ => error::InvalidHeaderSnafu {
                site: site!(),
                kind: HeaderErrorKind::BadFormat(value),
            }
            .fail(),
        }
    }
}

impl TryFrom<u16> for Format {
    type Error = crate::Error;

    fn try_from(value: u16) -> crate::Result<Self> {
        Ok(Self::from_u16(value)?)
    }
}
