//! Auto-growing binary buffer writer.

use crate::ByteOrder;

macro_rules! write_number {
    ($(#[$doc:meta] $name:ident($ty:ty)),* $(,)?) => {
        $(
            #[$doc]
            #[inline]
            pub fn $name(&mut self, val: $ty) {
                match self.order {
                    ByteOrder::Little => self.buf(&val.to_le_bytes()),
                    ByteOrder::Big => self.buf(&val.to_be_bytes()),
                }
            }
        )*
    };
}

/// A binary buffer writer backed by a growable vector.
///
/// Bytes are appended at the cursor; [`Writer::flush`] hands out everything
/// written since the previous flush.
///
/// # Example
///
/// ```
/// use model_blob_buffers::{ByteOrder, Writer};
///
/// let mut writer = Writer::with_order(ByteOrder::Big);
/// writer.u16(0x0102);
/// writer.buf(&[0x03]);
/// assert_eq!(writer.flush(), vec![0x01, 0x02, 0x03]);
/// assert!(writer.flush().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Writer {
    /// The underlying buffer.
    pub uint8: Vec<u8>,
    /// Byte order of multi-byte writes.
    pub order: ByteOrder,
}

impl Writer {
    /// Creates a new little-endian writer.
    pub fn new() -> Self {
        Self::with_order(ByteOrder::Little)
    }

    /// Creates a new writer using the given byte order.
    pub fn with_order(order: ByteOrder) -> Self {
        Self {
            uint8: Vec::new(),
            order,
        }
    }

    /// Current cursor position.
    pub fn x(&self) -> usize {
        self.uint8.len()
    }

    /// Discards everything written so far.
    pub fn reset(&mut self) {
        self.uint8.clear();
    }

    /// Returns the bytes written since the last flush.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.uint8)
    }

    /// Returns the unflushed bytes without consuming them.
    pub fn pending(&self) -> &[u8] {
        &self.uint8
    }

    /// Writes raw bytes.
    #[inline]
    pub fn buf(&mut self, data: &[u8]) {
        self.uint8.extend_from_slice(data);
    }

    /// Writes the UTF-8 bytes of a string, without any length prefix.
    #[inline]
    pub fn utf8(&mut self, s: &str) {
        self.buf(s.as_bytes());
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.uint8.push(val);
    }

    /// Writes a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self, val: i8) {
        self.uint8.push(val as u8);
    }

    write_number! {
        /// Writes an unsigned 16-bit integer.
        u16(u16),
        /// Writes a signed 16-bit integer.
        i16(i16),
        /// Writes an unsigned 32-bit integer.
        u32(u32),
        /// Writes a signed 32-bit integer.
        i32(i32),
        /// Writes an unsigned 64-bit integer.
        u64(u64),
        /// Writes a signed 64-bit integer.
        i64(i64),
        /// Writes a 32-bit floating point number.
        f32(f32),
        /// Writes a 64-bit floating point number.
        f64(f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u32_little() {
        let mut w = Writer::new();
        w.u32(0x01020304);
        assert_eq!(w.flush(), vec![0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_i32_big() {
        let mut w = Writer::with_order(ByteOrder::Big);
        w.i32(-2);
        assert_eq!(w.flush(), vec![0xff, 0xff, 0xff, 0xfe]);
    }

    #[test]
    fn test_pending_and_reset() {
        let mut w = Writer::new();
        w.utf8("ab");
        assert_eq!(w.pending(), b"ab");
        w.reset();
        assert_eq!(w.x(), 0);
        assert!(w.pending().is_empty());
    }
}
