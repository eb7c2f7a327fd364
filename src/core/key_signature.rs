use crate::core::KeyAccidentals;

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum KeyMode {
    Major,
    Minor,
}

impl Default for KeyMode {
    fn default() -> Self {
        KeyMode::Major
    }
}

/// The payload of a key signature meta event, `FF 59 02 sf mi`. `sf` counts sharps (positive) or
/// flats (negative), `mi` selects major or minor. The default is C major.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct KeySignatureValue {
    accidentals: KeyAccidentals,
    mode: KeyMode,
}

impl KeySignatureValue {
    pub fn new(accidentals: KeyAccidentals, mode: KeyMode) -> Self {
        Self { accidentals, mode }
    }

    pub fn accidentals(&self) -> KeyAccidentals {
        self.accidentals
    }

    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    /// From the two payload bytes `sf mi`. Out-of-range accidental counts clamp; any nonzero
    /// `mi` reads as minor the way 1 does.
    pub(crate) fn from_payload(payload: &[u8]) -> Option<Self> {
        if payload.len() != 2 {
            return None;
        }
        Some(Self {
            accidentals: KeyAccidentals::new(payload[0] as i8),
            mode: match payload[1] {
                0 => KeyMode::Major,
                _ => KeyMode::Minor,
            },
        })
    }

    pub(crate) fn to_payload(self) -> [u8; 2] {
        [
            self.accidentals.get() as u8,
            match self.mode {
                KeyMode::Major => 0,
                KeyMode::Minor => 1,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flats_round_trip() {
        // three flats, minor: C minor
        let ks = KeySignatureValue::from_payload(&[0xfd, 0x01]).unwrap();
        assert_eq!(-3, ks.accidentals().get());
        assert_eq!(KeyMode::Minor, ks.mode());
        assert_eq!([0xfd, 0x01], ks.to_payload());
    }

    #[test]
    fn default_is_c_major() {
        let ks = KeySignatureValue::default();
        assert_eq!(0, ks.accidentals().get());
        assert_eq!(KeyMode::Major, ks.mode());
    }
}
