use crate::macros::for_each_le_scalar;
use crate::macros::writer_put_le;

/// A growable output buffer with little-endian scalar appends.
///
/// Writes cannot fail; the schema layer validates ranges before anything is
/// appended, so a finished writer always holds a complete encoding.
#[derive(Debug, Default)]
pub struct Writer {
    pub(crate) buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn put_u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn put_i8(&mut self, v: i8) -> &mut Self {
        self.buf.push(v as u8);
        self
    }

    pub fn put_bytes(&mut self, v: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(v);
        self
    }

    for_each_le_scalar!(writer_put_le);

    /// Appends an unsigned LEB128 encoding and returns the number of bytes
    /// written.
    pub fn put_uleb128(&mut self, mut v: u128) -> usize {
        let mut written = 0;
        loop {
            let mut byte = (v & 0x7f) as u8;
            v >>= 7;
            if v != 0 {
                byte |= 0x80;
            }
            self.buf.push(byte);
            written += 1;
            if v == 0 {
                return written;
            }
        }
    }

    /// Appends a signed LEB128 encoding and returns the number of bytes
    /// written.
    pub fn put_sleb128(&mut self, mut v: i128) -> usize {
        let mut written = 0;
        loop {
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            written += 1;
            let sign_done = (v == 0 && byte & 0x40 == 0) || (v == -1 && byte & 0x40 != 0);
            if sign_done {
                self.buf.push(byte);
                return written;
            }
            self.buf.push(byte | 0x80);
        }
    }
}
