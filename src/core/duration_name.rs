/// The notated duration denominating a time signature. The discriminant is the negative power of
/// two the MIDI file format stores: 2 represents a quarter-note, 3 represents an eighth-note,
/// and so on.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum DurationName {
    /// Whole Note / Semibreve
    Whole = 0,

    /// Half Note / Minim
    Half = 1,

    /// Quarter Note / Crotchet
    Quarter = 2,

    /// Eighth Note / Quaver
    Eighth = 3,

    /// Sixteenth note / Semiquaver
    Sixteenth = 4,

    /// Thirty-Second Note / Demisemiquaver
    D32 = 5,

    /// Sixty-Fourth Note / Hemidemisemiquaver
    D64 = 6,

    /// One-Twenty-Eighth Note / Semihemidemisemiquaver
    D128 = 7,

    /// Two-Fifty-Sixth Note / Demisemihemidemisemiquaver
    D256 = 8,

    /// Five-Twelfth Note
    D512 = 9,

    /// One Thousand, Twenty-Fourth Note
    D1024 = 10,
}

impl Default for DurationName {
    fn default() -> Self {
        DurationName::Quarter
    }
}

impl DurationName {
    /// From the `dd` byte of a time signature payload. `None` for values greater than 10.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            v if DurationName::Whole as u8 == v => Some(DurationName::Whole),
            v if DurationName::Half as u8 == v => Some(DurationName::Half),
            v if DurationName::Quarter as u8 == v => Some(DurationName::Quarter),
            v if DurationName::Eighth as u8 == v => Some(DurationName::Eighth),
            v if DurationName::Sixteenth as u8 == v => Some(DurationName::Sixteenth),
            v if DurationName::D32 as u8 == v => Some(DurationName::D32),
            v if DurationName::D64 as u8 == v => Some(DurationName::D64),
            v if DurationName::D128 as u8 == v => Some(DurationName::D128),
            v if DurationName::D256 as u8 == v => Some(DurationName::D256),
            v if DurationName::D512 as u8 == v => Some(DurationName::D512),
            v if DurationName::D1024 as u8 == v => Some(DurationName::D1024),
            _ => None,
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        self as u8
    }

    /// i.e. in 4/4, the denominator is [`DurationName::Quarter`] and the notated number is 4.
    pub fn to_notated_number(self) -> u16 {
        1u16 << (self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_the_dd_byte() {
        for dd in 0..=10u8 {
            let name = DurationName::from_u8(dd).unwrap();
            assert_eq!(dd, name.to_u8());
        }
        assert!(DurationName::from_u8(11).is_none());
    }

    #[test]
    fn notated_numbers() {
        assert_eq!(1, DurationName::Whole.to_notated_number());
        assert_eq!(4, DurationName::Quarter.to_notated_number());
        assert_eq!(8, DurationName::Eighth.to_notated_number());
    }
}
