/*!
The `core` module is for types and concepts that are *not* strictly related to MIDI *files*.
These types and concepts could be used for realtime MIDI as well.
!*/

mod clocks;
mod duration_name;
mod key_signature;
mod numbers;
mod smpte_offset;
mod status;
mod time_signature;

pub mod delta_time;
pub mod vlq;

pub use clocks::Clocks;
pub use duration_name::DurationName;
pub use key_signature::{KeyMode, KeySignatureValue};
pub use numbers::{
    Channel, ControlValue, KeyAccidentals, MicrosecondsPerQuarter, NoteNumber, Program, Velocity,
    U7,
};
pub use smpte_offset::SmpteOffsetValue;
pub use status::{
    channel_data_len, classify_status, is_channel_status, is_data_byte, next_running_status,
    resolve_status, StatusKind, StatusType,
};
pub use time_signature::TimeSignatureValue;
