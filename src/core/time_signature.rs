use crate::core::{Clocks, DurationName};

/// The payload of a time signature meta event, `FF 58 04 nn dd cc bb`. `nn` and `dd` represent
/// the numerator and denominator of the time signature as it would be notated; the denominator
/// is stored as a negative power of two. `cc` expresses the number of MIDI clocks in a metronome
/// click and `bb` the number of notated 32nd-notes in what MIDI thinks of as a quarter-note
/// (24 MIDI clocks).
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct TimeSignatureValue {
    numerator: u8,
    denominator: DurationName,
    clocks_per_click: Clocks,
    thirty_seconds_per_quarter: u8,
}

impl Default for TimeSignatureValue {
    fn default() -> Self {
        // 4/4, click every quarter, the conventional eight 32nds per quarter.
        Self {
            numerator: 4,
            denominator: DurationName::Quarter,
            clocks_per_click: Clocks::Quarter,
            thirty_seconds_per_quarter: 8,
        }
    }
}

impl TimeSignatureValue {
    pub fn new(numerator: u8, denominator: DurationName, clocks_per_click: Clocks) -> Self {
        Self {
            numerator,
            denominator,
            clocks_per_click,
            ..Self::default()
        }
    }

    pub fn numerator(&self) -> u8 {
        self.numerator
    }

    pub fn denominator(&self) -> DurationName {
        self.denominator
    }

    pub fn clocks_per_click(&self) -> Clocks {
        self.clocks_per_click
    }

    pub fn thirty_seconds_per_quarter(&self) -> u8 {
        self.thirty_seconds_per_quarter
    }

    /// From the four payload bytes `nn dd cc bb`. `None` when the slice is not 4 bytes long or
    /// the `dd` byte does not name a duration.
    pub(crate) fn from_payload(payload: &[u8]) -> Option<Self> {
        if payload.len() != 4 {
            return None;
        }
        Some(Self {
            numerator: payload[0],
            denominator: DurationName::from_u8(payload[1])?,
            clocks_per_click: Clocks::from_u8(payload[2]),
            thirty_seconds_per_quarter: payload[3],
        })
    }

    pub(crate) fn to_payload(self) -> [u8; 4] {
        [
            self.numerator,
            self.denominator.to_u8(),
            self.clocks_per_click.to_u8(),
            self.thirty_seconds_per_quarter,
        ]
    }
}
