//! Byte order and framing of a blob file.
//!
//! Raw framing is the legacy layout: five sections, no header. Tagged
//! framing prepends an 8-byte header that records what the raw layout
//! leaves to out-of-band agreement:
//!
//! ```text
//! +------+---------+-------+------------+----------+
//! | MBLB | version | order | float kind | int kind |
//! | 4 B  | u8 (1)  | u8    | u8 tag     | u8 tag   |
//! +------+---------+-------+------------+----------+
//! ```
//!
//! Every header field is a single byte, so it reads the same in either
//! byte order.

use model_blob_buffers::{ByteOrder, Writer};
use serde::{Deserialize, Serialize};

use crate::{BlobError, ElementKind, Section};

pub const MAGIC: [u8; 4] = *b"MBLB";
pub const VERSION: u8 = 1;
pub const HEADER_SIZE: usize = 8;

/// Whether a blob starts with a self-describing header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    #[default]
    Raw,
    Tagged,
}

impl Framing {
    /// Guesses the framing from the leading magic.
    ///
    /// A raw blob whose row count happens to spell `MBLB` is misdetected;
    /// callers that know the framing should not rely on this.
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(&MAGIC) {
            Framing::Tagged
        } else {
            Framing::Raw
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Framing::Raw => "raw",
            Framing::Tagged => "tagged",
        }
    }
}

impl std::fmt::Display for Framing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Framing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Framing::Raw),
            "tagged" => Ok(Framing::Tagged),
            other => Err(format!("unknown framing `{}`", other)),
        }
    }
}

/// How sections are laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub byte_order: ByteOrder,
    pub framing: Framing,
}

impl Layout {
    /// Little-endian, no header: what the legacy converter wrote on x86.
    pub const LEGACY: Layout = Layout {
        byte_order: ByteOrder::Little,
        framing: Framing::Raw,
    };

    pub const fn new(byte_order: ByteOrder, framing: Framing) -> Self {
        Self {
            byte_order,
            framing,
        }
    }

    pub const fn tagged(byte_order: ByteOrder) -> Self {
        Self::new(byte_order, Framing::Tagged)
    }
}

/// Contents of a tagged header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub byte_order: ByteOrder,
    pub float: ElementKind,
    pub int: ElementKind,
}

impl Header {
    pub fn write(&self, writer: &mut Writer) {
        writer.buf(&MAGIC);
        writer.u8(VERSION);
        writer.u8(match self.byte_order {
            ByteOrder::Little => 0,
            ByteOrder::Big => 1,
        });
        writer.u8(self.float.tag());
        writer.u8(self.int.tag());
    }

    /// Parses the header at the start of `data`.
    pub fn read(data: &[u8]) -> Result<Self, BlobError> {
        if data.len() < HEADER_SIZE {
            if !MAGIC.starts_with(&data[..data.len().min(MAGIC.len())]) {
                return Err(BlobError::BadMagic);
            }
            return Err(BlobError::UnexpectedEof {
                section: Section::Header,
                needed: HEADER_SIZE,
                remaining: data.len(),
            });
        }
        if data[..4] != MAGIC {
            return Err(BlobError::BadMagic);
        }
        if data[4] != VERSION {
            return Err(BlobError::UnsupportedVersion(data[4]));
        }
        let byte_order = match data[5] {
            0 => ByteOrder::Little,
            1 => ByteOrder::Big,
            tag => return Err(BlobError::UnknownTag(tag)),
        };
        let float = ElementKind::from_tag(data[6]).ok_or(BlobError::UnknownTag(data[6]))?;
        let int = ElementKind::from_tag(data[7]).ok_or(BlobError::UnknownTag(data[7]))?;
        Ok(Self {
            byte_order,
            float,
            int,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_bytes() {
        let mut w = Writer::with_order(ByteOrder::Big);
        Header {
            byte_order: ByteOrder::Big,
            float: ElementKind::F32,
            int: ElementKind::U16,
        }
        .write(&mut w);
        assert_eq!(w.flush(), b"MBLB\x01\x01\x01\x11".to_vec());
    }

    #[test]
    fn header_errors() {
        assert!(matches!(Header::read(b"MBL"), Err(BlobError::UnexpectedEof { .. })));
        assert!(matches!(Header::read(b"XX"), Err(BlobError::BadMagic)));
        assert!(matches!(
            Header::read(b"MBLB\x02\x00\x01\x12"),
            Err(BlobError::UnsupportedVersion(2))
        ));
        assert!(matches!(
            Header::read(b"MBLB\x01\x07\x01\x12"),
            Err(BlobError::UnknownTag(7))
        ));
        assert!(matches!(
            Header::read(b"MBLB\x01\x00\x01\x99"),
            Err(BlobError::UnknownTag(0x99))
        ));
    }

    #[test]
    fn detect_framing() {
        assert_eq!(Framing::detect(b"MBLB\x01"), Framing::Tagged);
        assert_eq!(Framing::detect(&[2, 0, 0, 0]), Framing::Raw);
        assert_eq!(Framing::detect(&[]), Framing::Raw);
    }

    #[test]
    fn legacy_is_default() {
        assert_eq!(Layout::default(), Layout::LEGACY);
    }
}
