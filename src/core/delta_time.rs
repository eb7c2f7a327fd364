/*!
The delta-time codec. A delta-time is a VLQ interpreted as a tick count, clamped on construction
to `[0, 0x0FFFFFFF]`.
!*/

use crate::core::vlq::{
    encode_vlq, read_vlq, to_nearest_valid_vlq, vlq_end, vlq_field_size, VlqBytes, VlqField,
    VLQ_MAX,
};

/// The largest representable delta-time, in ticks.
pub const DELTA_TIME_MAX: i32 = VLQ_MAX;

/// True if the value falls within `[0, 0x0FFFFFFF]`.
pub fn is_valid_delta_time(ticks: i32) -> bool {
    (0..=DELTA_TIME_MAX).contains(&ticks)
}

/// Clamps the value to `[0, 0x0FFFFFFF]`.
pub fn to_nearest_valid_delta_time(ticks: i32) -> i32 {
    to_nearest_valid_vlq(ticks)
}

/// Reads the delta-time field at the front of `bytes`.
pub fn read_delta_time(bytes: &[u8]) -> VlqField {
    read_vlq(bytes)
}

/// The offset one past the delta-time field; at most 4, never past the end of the slice.
pub fn delta_time_end(bytes: &[u8]) -> usize {
    vlq_end(bytes)
}

/// The encoded size of the delta-time field for `ticks`, after clamping.
pub fn delta_time_field_size(ticks: i32) -> usize {
    vlq_field_size(ticks)
}

/// Encodes `ticks` (clamped) as a delta-time field.
pub fn encode_delta_time(ticks: i32) -> VlqBytes {
    encode_vlq(ticks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_bounds() {
        assert!(is_valid_delta_time(0));
        assert!(is_valid_delta_time(DELTA_TIME_MAX));
        assert!(!is_valid_delta_time(-1));
        assert!(!is_valid_delta_time(DELTA_TIME_MAX + 1));
    }

    #[test]
    fn clamping() {
        assert_eq!(0, to_nearest_valid_delta_time(-1234));
        assert_eq!(1234, to_nearest_valid_delta_time(1234));
        assert_eq!(DELTA_TIME_MAX, to_nearest_valid_delta_time(i32::max_value()));
    }

    #[test]
    fn field_round_trip() {
        for &ticks in &[0, 1, 127, 128, 200, 0x3fff, 0x4000, DELTA_TIME_MAX] {
            let encoded = encode_delta_time(ticks);
            let field = read_delta_time(&encoded);
            assert!(field.is_valid);
            assert_eq!(ticks, field.value);
            assert_eq!(encoded.len(), delta_time_field_size(ticks));
            assert_eq!(encoded.len(), delta_time_end(&encoded));
        }
    }
}
