use crate::macros::cursor_read_le;
use crate::macros::for_each_le_scalar;
use crate::types::Error;
use crate::types::Result;

/// A cursor tracks position within a borrowed buffer slice.
///
/// Exactly one decode call owns a cursor at a time; all reads are bounds
/// checked and advance the position, so a failed read reports how many bytes
/// were missing without ever touching memory past the slice.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    slice: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(slice: &'a [u8]) -> Self {
        Self { slice, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.slice.len().saturating_sub(self.pos)
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    fn need(&self, n: usize) -> Result<()> {
        // Compare against the remaining length; `pos + n` could overflow
        // when a hostile length prefix asks for close to usize::MAX bytes.
        if n > self.remaining() {
            Err(Error::Underflow {
                expected: n,
                remaining: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        self.need(1)?;
        let byte = self.slice[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    pub fn peek_byte(&self) -> Result<u8> {
        self.need(1)?;
        Ok(self.slice[self.pos])
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.need(len)?;
        let slice = &self.slice[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.need(len)?;
        self.pos += len;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_byte()
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_byte()? as i8)
    }

    for_each_le_scalar!(cursor_read_le);

    /// Reads an unsigned LEB128 value of at most `max_bytes` encoded bytes.
    ///
    /// The result is bounded to 128 bits; a value that needs more, or that
    /// does not terminate within `max_bytes`, is a `LebOverflow`.
    pub fn read_uleb128(&mut self, max_bytes: usize) -> Result<u128> {
        let mut result: u128 = 0;
        for i in 0..max_bytes {
            let byte = self.read_byte()?;
            let chunk = (byte & 0x7f) as u128;
            let shift = 7 * i;
            if shift >= 128 || (shift > 121 && chunk >> (128 - shift) != 0) {
                return Err(Error::LebOverflow { max_bytes });
            }
            result |= chunk << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(Error::LebOverflow { max_bytes })
    }

    /// Reads a signed LEB128 value of at most `max_bytes` encoded bytes.
    pub fn read_sleb128(&mut self, max_bytes: usize) -> Result<i128> {
        let mut result: i128 = 0;
        let mut shift = 0usize;
        for _ in 0..max_bytes {
            let byte = self.read_byte()?;
            if shift >= 128 {
                return Err(Error::LebOverflow { max_bytes });
            }
            let chunk = (byte & 0x7f) as i128;
            if shift == 126 {
                // Chunk bit 1 lands on the i128 sign bit and bits 2..6 are
                // pure sign fill; all six must agree, or the value needs
                // more than 128 bits. A positive 2^127 would otherwise be
                // misread as negative.
                let fill = byte & 0x7e;
                if fill != 0 && fill != 0x7e {
                    return Err(Error::LebOverflow { max_bytes });
                }
            }
            result |= chunk << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                if byte & 0x40 != 0 && shift < 128 {
                    result |= -1i128 << shift;
                }
                return Ok(result);
            }
        }
        Err(Error::LebOverflow { max_bytes })
    }
}
