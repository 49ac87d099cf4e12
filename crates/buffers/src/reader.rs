//! Binary buffer reader with cursor tracking.

use std::str;

use crate::{BufferError, ByteOrder};

macro_rules! read_number {
    ($(#[$doc:meta] $name:ident -> $ty:ty),* $(,)?) => {
        $(
            #[$doc]
            #[inline]
            pub fn $name(&mut self) -> Result<$ty, BufferError> {
                let bytes = self.array::<{ std::mem::size_of::<$ty>() }>()?;
                Ok(match self.order {
                    ByteOrder::Little => <$ty>::from_le_bytes(bytes),
                    ByteOrder::Big => <$ty>::from_be_bytes(bytes),
                })
            }
        )*
    };
}

/// A binary buffer reader that reads data from a byte slice.
///
/// The reader maintains a cursor position and provides bounds-checked
/// methods for reading integer types, floats and strings. A failed read
/// leaves the cursor where it was.
///
/// # Example
///
/// ```
/// use model_blob_buffers::{ByteOrder, Reader};
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = Reader::with_order(&data, ByteOrder::Big);
///
/// assert_eq!(reader.u8(), Ok(0x01));
/// assert_eq!(reader.u16(), Ok(0x0203));
/// assert!(reader.u16().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
    /// End position (exclusive).
    pub end: usize,
    /// Byte order of multi-byte reads.
    pub order: ByteOrder,
}

impl<'a> Reader<'a> {
    /// Creates a new little-endian reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self::with_order(uint8, ByteOrder::Little)
    }

    /// Creates a new reader using the given byte order.
    pub fn with_order(uint8: &'a [u8], order: ByteOrder) -> Self {
        Self {
            uint8,
            x: 0,
            end: uint8.len(),
            order,
        }
    }

    /// Resets the reader with a new byte slice.
    pub fn reset(&mut self, uint8: &'a [u8]) {
        self.x = 0;
        self.end = uint8.len();
        self.uint8 = uint8;
    }

    /// Returns the number of remaining bytes.
    pub fn size(&self) -> usize {
        self.end - self.x
    }

    /// Fails unless at least `size` bytes remain.
    pub fn assert_size(&self, size: usize) -> Result<(), BufferError> {
        if size > self.size() {
            return Err(BufferError::EndOfBuffer {
                needed: size,
                remaining: self.size(),
            });
        }
        Ok(())
    }

    /// Peeks at the current byte without advancing the cursor.
    pub fn peek(&self) -> Result<u8, BufferError> {
        self.assert_size(1)?;
        Ok(self.uint8[self.x])
    }

    /// Advances the cursor by the given number of bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), BufferError> {
        self.assert_size(length)?;
        self.x += length;
        Ok(())
    }

    /// Returns a subarray of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.assert_size(size)?;
        let x = self.x;
        let end = x + size;
        let bin = &self.uint8[x..end];
        self.x = end;
        Ok(bin)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(self.buf(N)?);
        Ok(bytes)
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.assert_size(1)?;
        let val = self.uint8[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Reads a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self) -> Result<i8, BufferError> {
        self.u8().map(|val| val as i8)
    }

    read_number! {
        /// Reads an unsigned 16-bit integer.
        u16 -> u16,
        /// Reads a signed 16-bit integer.
        i16 -> i16,
        /// Reads an unsigned 32-bit integer.
        u32 -> u32,
        /// Reads a signed 32-bit integer.
        i32 -> i32,
        /// Reads an unsigned 64-bit integer.
        u64 -> u64,
        /// Reads a signed 64-bit integer.
        i64 -> i64,
        /// Reads a 32-bit floating point number.
        f32 -> f32,
        /// Reads a 64-bit floating point number.
        f64 -> f64,
    }

    /// Reads a UTF-8 string of the given byte size.
    ///
    /// On invalid UTF-8 the cursor is not advanced.
    pub fn utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        self.assert_size(size)?;
        let start = self.x;
        let s = str::from_utf8(&self.uint8[start..start + size])
            .map_err(|_| BufferError::InvalidUtf8)?;
        self.x += size;
        Ok(s)
    }
}
