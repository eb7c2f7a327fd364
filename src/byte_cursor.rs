use snafu::{ensure, Snafu};

/// A cursor over an in-memory byte slice. Chunk envelopes (the 4-byte ASCII id and the 4-byte
/// big-endian length) and the fixed-layout MThd fields are read through this; event data inside
/// an MTrk body is handed to the event-layer validators as a sub-slice.
pub(crate) struct ByteCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

#[derive(Debug, Snafu)]
pub(crate) enum ByteError {
    #[snafu(display("unexpected end of input at byte {}", position))]
    End { position: usize },

    #[snafu(display(
        "expected tag '{}' but found '{}' at position {}",
        expected,
        found,
        position
    ))]
    Tag {
        expected: String,
        found: String,
        position: usize,
    },
}

pub(crate) type ByteResult<T> = std::result::Result<T, ByteError>;

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// The number of bytes consumed so far.
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    pub(crate) fn is_end(&self) -> bool {
        self.position >= self.bytes.len()
    }

    /// The unconsumed portion of the input.
    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.bytes[self.position..]
    }

    pub(crate) fn read_n(&mut self, num_bytes: usize) -> ByteResult<&'a [u8]> {
        ensure!(
            self.remaining() >= num_bytes,
            EndSnafu {
                position: self.bytes.len()
            }
        );
        let slice = &self.bytes[self.position..self.position + num_bytes];
        self.position += num_bytes;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, num_bytes: usize) -> ByteResult<()> {
        self.read_n(num_bytes)?;
        Ok(())
    }

    pub(crate) fn read2(&mut self) -> ByteResult<[u8; 2]> {
        let slice = self.read_n(2)?;
        Ok([slice[0], slice[1]])
    }

    pub(crate) fn read4(&mut self) -> ByteResult<[u8; 4]> {
        let slice = self.read_n(4)?;
        Ok([slice[0], slice[1], slice[2], slice[3]])
    }

    pub(crate) fn read_u16(&mut self) -> ByteResult<u16> {
        Ok(u16::from_be_bytes(self.read2()?))
    }

    pub(crate) fn read_u32(&mut self) -> ByteResult<u32> {
        Ok(u32::from_be_bytes(self.read4()?))
    }

    pub(crate) fn expect_tag(&mut self, expected_tag: &str) -> ByteResult<()> {
        let start = self.position;
        let tag_bytes = self.read4()?;
        ensure!(
            expected_tag.as_bytes() == tag_bytes,
            TagSnafu {
                expected: expected_tag,
                found: String::from_utf8_lossy(&tag_bytes).to_string(),
                position: start,
            }
        );
        Ok(())
    }

    /// Returns true if the next four bytes are exactly `expected_tag`. Does not advance.
    pub(crate) fn is_tag(&self, expected_tag: &str) -> bool {
        self.remaining() >= 4 && &self.rest()[..4] == expected_tag.as_bytes()
    }
}

#[test]
fn byte_cursor_test() {
    let bytes = [0x4du8, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06, 0x01, 0x40];
    let mut cursor = ByteCursor::new(&bytes);
    assert!(cursor.is_tag("MThd"));
    assert!(!cursor.is_tag("MTrk"));
    cursor.expect_tag("MThd").unwrap();
    assert_eq!(4, cursor.position());
    assert_eq!(6, cursor.read_u32().unwrap());
    assert_eq!(0x0140, cursor.read_u16().unwrap());
    assert!(cursor.is_end());
    assert!(cursor.read_n(1).is_err());
}

#[test]
fn byte_cursor_tag_mismatch() {
    let bytes = *b"MToolong";
    let mut cursor = ByteCursor::new(&bytes);
    let err = cursor.expect_tag("MTrk").err().unwrap();
    let message = format!("{}", err);
    assert!(message.contains("MTrk"));
    assert!(message.contains("MToo"));
}
