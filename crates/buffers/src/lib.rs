//! Binary buffer utilities for model-blob.
//!
//! This crate provides cursor-based reading and auto-growing writing of
//! fixed-width primitives in an explicit byte order.
//!
//! # Overview
//!
//! - [`Reader`] - Reads binary data from a byte slice with cursor tracking
//! - [`Writer`] - Writes binary data to an auto-growing buffer
//! - [`ByteOrder`] - Byte order used for every multi-byte value
//!
//! # Example
//!
//! ```
//! use model_blob_buffers::{ByteOrder, Reader, Writer};
//!
//! // Write some data
//! let mut writer = Writer::new();
//! writer.u8(0x01);
//! writer.u32(0x0203);
//! writer.utf8("hello");
//! let data = writer.flush();
//! assert_eq!(&data[..5], &[0x01, 0x03, 0x02, 0x00, 0x00]);
//!
//! // Read it back
//! let mut reader = Reader::with_order(&data, ByteOrder::Little);
//! assert_eq!(reader.u8(), Ok(0x01));
//! assert_eq!(reader.u32(), Ok(0x0203));
//! assert_eq!(reader.utf8(5), Ok("hello"));
//! ```

mod byte_order;
mod print_octets;
mod reader;
mod writer;

pub use byte_order::ByteOrder;
pub use print_octets::{print_octets, print_octets_default};
pub use reader::Reader;
pub use writer::Writer;

/// Error type for buffer operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Attempted to read past the end of the buffer.
    EndOfBuffer {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },
    /// Invalid UTF-8 sequence.
    InvalidUtf8,
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::EndOfBuffer { needed, remaining } => write!(
                f,
                "end of buffer: needed {} bytes, {} remaining",
                needed, remaining
            ),
            BufferError::InvalidUtf8 => write!(f, "invalid UTF-8 sequence"),
        }
    }
}

impl std::error::Error for BufferError {}
