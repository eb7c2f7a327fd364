use crate::event::parse::EventError;
use crate::file::HeaderErrorKind;
use crate::file::TrackErrorKind;
use snafu::Snafu;

/// The public Error type for this library.
#[derive(Debug, Snafu)]
pub struct Error(LibError);

/// The public Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// The internal Result type for this library.
pub(crate) type LibResult<T> = std::result::Result<T, LibError>;

/// The internal Error type for this library.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum LibError {
    #[snafu(display("{}: error while reading bytes: {}", site, source))]
    Io {
        site: String,
        source: crate::byte_cursor::ByteError,
    },

    #[snafu(display("{}: unable to read '{}': {}", site, path, source))]
    FileRead {
        site: String,
        path: String,
        source: std::io::Error,
    },

    #[snafu(display("{}: error while writing bytes: {}", site, source))]
    Write {
        site: String,
        source: std::io::Error,
    },

    #[snafu(display("{}: unable to create '{}': {}", site, path, source))]
    FileCreate {
        site: String,
        path: String,
        source: std::io::Error,
    },

    #[snafu(display("{}: the MThd chunk is invalid: {}", site, kind))]
    InvalidHeader { site: String, kind: HeaderErrorKind },

    #[snafu(display(
        "{}: bad event in MTrk chunk {} at byte offset {}: {}",
        site,
        chunk_index,
        offset,
        source
    ))]
    InvalidEvent {
        site: String,
        chunk_index: usize,
        offset: usize,
        source: EventError,
    },

    #[snafu(display("{}: MTrk chunk {} is invalid: {}", site, chunk_index, kind))]
    InvalidTrack {
        site: String,
        chunk_index: usize,
        kind: TrackErrorKind,
    },

    #[snafu(display(
        "{}: the MThd chunk declares {} track(s) but {} MTrk chunk(s) were found",
        site,
        declared,
        found
    ))]
    TrackCountMismatch {
        site: String,
        declared: u16,
        found: usize,
    },

    #[snafu(display("{}: the track is too long to be written: {}", site, source))]
    TrackTooLong {
        site: String,
        source: std::num::TryFromIntError,
    },

    #[snafu(display("{}: {} tracks cannot be represented in a 16-bit ntrks field", site, count))]
    TooManyTracks { site: String, count: usize },

    #[snafu(display("{}: the MIDI file is invalid: {}", site, description))]
    InvalidFile { site: String, description: String },

    #[snafu(display("{} unknown error", site))]
    Other { site: String },
}

macro_rules! site {
    () => {
        format!("{}:{}", file!(), line!())
    };
}

macro_rules! io {
    () => {
        crate::error::IoSnafu { site: site!() }
    };
}

macro_rules! wr {
    () => {
        crate::error::WriteSnafu { site: site!() }
    };
}

macro_rules! invalid_file_s {
    () => {
        crate::error::InvalidFileSnafu {
            site: site!(),
            description: "[no description]",
        }
    };
    ($msg:expr) => {
        crate::error::InvalidFileSnafu {
            site: site!(),
            description: $msg,
        }
    };
    ($fmt:expr, $($arg:expr),+) => {
        crate::error::InvalidFileSnafu {
            site: site!(),
            description: format!($fmt, $($arg),+),
        }
    };
}

macro_rules! invalid_file_e {
    () => {
        invalid_file_s!().build()
    };
    ($msg:expr) => {
        invalid_file_s!($msg).build()
    };
    ($fmt:expr, $($arg:expr),+) => {
        invalid_file_s!($fmt, $($arg),+).build()
    };
}

macro_rules! invalid_file_r {
    () => {
        Err(invalid_file_e!())
    };
    ($msg:expr) => {
        Err(invalid_file_e!($msg))
    };
    ($fmt:expr, $($arg:expr),+) => {
        Err(invalid_file_e!($fmt, $($arg),+))
    };
}

macro_rules! invalid_file {
    () => {
        return invalid_file_r!();
    };
    ($msg:expr) => {
        return invalid_file_r!($msg)
    };
    ($fmt:expr, $($arg:expr),+) => {
        return invalid_file_r!($fmt, $($arg),+)
    };
}

#[test]
fn site_test() {
    let line = line!() + 1;
    let site = site!();
    assert!(site.contains("error.rs"));
    assert!(site.contains(format!("{}", line).as_str()));
}

#[test]
fn invalid_file_macros_test_no_message() {
    fn foo() -> LibResult<u64> {
        invalid_file!();
    }
    let result = foo();
    assert!(result.is_err());
    let message = format!("{}", result.err().unwrap());
    assert!(message.as_str().contains("the MIDI file is invalid"));
}

#[test]
fn invalid_file_macros_test_message() {
    fn foo() -> LibResult<u64> {
        let flerbin = String::from("flerbin");
        invalid_file!(flerbin);
    }
    let result = foo();
    assert!(result.is_err());
    let message = format!("{}", result.err().unwrap());
    assert!(message.as_str().contains("flerbin"));
}

#[test]
fn invalid_file_macros_test_fmt() {
    fn foo() -> LibResult<u64> {
        invalid_file!("hello {}, {}", "world", String::from("foo"));
    }
    let result = foo();
    assert!(result.is_err());
    let message = format!("{}", result.err().unwrap());
    assert!(message.as_str().contains("hello world, foo"));
}
