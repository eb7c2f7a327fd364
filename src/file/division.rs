use crate::file::HeaderErrorKind;

clamp!(
    /// The allowable values for [`Division`] when using the quarter note method. It is a positive
    /// `u15` and thus has the range 1 to 32,767. The default value is 1024.
    QuarterNoteDivision,
    u16,
    1,
    0x7FFF,
    1024,
    pub
);

clamp!(
    /// The resolution within an SMPTE frame: typical values are 4 (MIDI time code resolution),
    /// 8, 10, 80 (bit resolution), or 100. The default of 40 with 25 frames per second gives
    /// millisecond-based tracks.
    SubframeResolution,
    u8,
    1,
    255,
    40,
    pub
);

/// Specifies the meaning of the delta-times. It has two formats, one for metrical time, and one
/// for time-code-based time:
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Division {
    /// If bit 15 of <division> is a zero, the bits 14 thru 0 represent the number of delta-time
    /// "ticks" which make up a quarter-note. For instance, if <division> is 96, then a time
    /// interval of an eighth-note between two events in the file would be 48.
    QuarterNote(QuarterNoteDivision),
    /// Frame rate and resolution within the frame.
    Smpte(SmpteRate),
}

impl Default for Division {
    fn default() -> Self {
        Division::QuarterNote(QuarterNoteDivision::default())
    }
}

const DIVISION_TYPE_BIT: u16 = 0b1000_0000_0000_0000;

impl Division {
    /// Ticks-per-quarter with silent clamping into the legal range.
    pub fn quarter_note(ticks: u16) -> Self {
        Division::QuarterNote(QuarterNoteDivision::new(ticks))
    }

    pub(crate) fn from_u16(value: u16) -> Result<Self, HeaderErrorKind> {
        if value & DIVISION_TYPE_BIT == DIVISION_TYPE_BIT {
            let fps_byte = (value >> 8) as u8 as i8;
            let frame_rate =
                FrameRate::from_fps_byte(fps_byte).ok_or(HeaderErrorKind::BadDivision(value))?;
            let resolution = (value & 0x00FF) as u8;
            if resolution == 0 {
                return Err(HeaderErrorKind::BadDivision(value));
            }
            Ok(Division::Smpte(SmpteRate::new(
                frame_rate,
                SubframeResolution::new(resolution),
            )))
        } else if value == 0 {
            Err(HeaderErrorKind::BadDivision(value))
        } else {
            Ok(Division::QuarterNote(QuarterNoteDivision::new(value)))
        }
    }

    pub(crate) fn to_u16(self) -> u16 {
        match self {
            Division::QuarterNote(q) => q.get(),
            Division::Smpte(s) => {
                (u16::from(s.frame_rate.as_fps_byte() as u8) << 8) | u16::from(s.resolution.get())
            }
        }
    }
}

/// <division> Bits 14 thru 8 contain one of the four values -24, -25, -29, or -30, corresponding
/// to the four standard SMPTE and MIDI time code formats (-29 corresponds to 30 drop frame), and
/// represents the number of frames per second. These negative numbers are stored in two's
/// complement form.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum FrameRate {
    /// 24 frames per second
    N24,
    /// 25 frames per second
    N25,
    /// 30 drop
    N29,
    /// 30 frames per second
    N30,
}

impl Default for FrameRate {
    fn default() -> Self {
        FrameRate::N24
    }
}

impl FrameRate {
    pub(crate) fn from_fps_byte(byte: i8) -> Option<Self> {
        match byte {
            -24 => Some(FrameRate::N24),
            -25 => Some(FrameRate::N25),
            -29 => Some(FrameRate::N29),
            -30 => Some(FrameRate::N30),
            _ => None,
        }
    }

    pub(crate) fn as_fps_byte(self) -> i8 {
        match self {
            FrameRate::N24 => -24,
            FrameRate::N25 => -25,
            FrameRate::N29 => -29,
            FrameRate::N30 => -30,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct SmpteRate {
    /// The number of frames per second.
    frame_rate: FrameRate,
    /// The resolution within a frame.
    resolution: SubframeResolution,
}

impl SmpteRate {
    pub fn new(frame_rate: FrameRate, resolution: SubframeResolution) -> Self {
        Self {
            frame_rate,
            resolution,
        }
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    pub fn resolution(&self) -> SubframeResolution {
        self.resolution
    }
}

impl Default for SmpteRate {
    fn default() -> Self {
        // This is the 'millisecond-based tracks' example given by the MIDI file standard.
        SmpteRate {
            frame_rate: FrameRate::N25,
            resolution: SubframeResolution::new(40),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_note_round_trip() {
        let d = Division::from_u16(0x0060).unwrap();
        assert_eq!(Division::quarter_note(96), d);
        assert_eq!(0x0060, d.to_u16());
    }

    #[test]
    fn zero_ticks_per_quarter_is_invalid() {
        assert_eq!(
            Err(HeaderErrorKind::BadDivision(0)),
            Division::from_u16(0x0000)
        );
    }

    #[test]
    fn smpte_round_trip() {
        // thirty-frame time code at bit resolution: the standard's E2 50 example
        let d = Division::from_u16(0xE250).unwrap();
        match d {
            Division::Smpte(s) => {
                assert_eq!(FrameRate::N30, s.frame_rate());
                assert_eq!(80, s.resolution().get());
            }
            _ => panic!("expected SMPTE division"),
        }
        assert_eq!(0xE250, d.to_u16());
    }

    #[test]
    fn millisecond_smpte_default() {
        let d = Division::Smpte(SmpteRate::default());
        // -25 is 0xE7 in two's complement
        assert_eq!(0xE728, d.to_u16());
        assert_eq!(Ok(d), Division::from_u16(0xE728));
    }

    #[test]
    fn bad_frame_rates_and_resolutions() {
        // -26 frames per second is not a defined rate
        assert!(Division::from_u16(0xE600).is_err());
        // resolution of zero
        assert!(Division::from_u16(0xE800).is_err());
    }
}
