//! Blob encoder/decoder error type.

use model_blob_buffers::BufferError;
use serde::Serialize;
use thiserror::Error;

use crate::ElementKind;

/// One of the top-level blocks of a blob, plus the optional header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Header,
    Matrix,
    Vector,
    IntVector,
    Strings,
    SparseTable,
}

impl Section {
    pub const fn as_str(self) -> &'static str {
        match self {
            Section::Header => "header",
            Section::Matrix => "matrix",
            Section::Vector => "vector",
            Section::IntVector => "int vector",
            Section::Strings => "string table",
            Section::SparseTable => "sparse table",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for blob encoding and decoding.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{section}: unexpected end of input (needed {needed} bytes, {remaining} remaining)")]
    UnexpectedEof {
        section: Section,
        needed: usize,
        remaining: usize,
    },
    #[error("string table: entry {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },
    #[error("{section}: length {len} does not fit in a u32 prefix")]
    LengthOverflow { section: Section, len: u128 },
    #[error("{0} trailing bytes after the sparse table")]
    TrailingBytes(usize),
    #[error("bad magic: not a tagged model blob")]
    BadMagic,
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),
    #[error("unknown header tag {0:#04x}")]
    UnknownTag(u8),
    #[error("{section}: file stores {found} elements, caller expects {expected}")]
    ElementMismatch {
        section: Section,
        expected: ElementKind,
        found: ElementKind,
    },
    #[error("matrix data has {len} elements, expected {rows} x {cols}")]
    ShapeMismatch { rows: usize, cols: usize, len: usize },
}

impl BlobError {
    /// Attaches a section to a buffer read failure.
    pub(crate) fn read(section: Section, err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer { needed, remaining } => BlobError::UnexpectedEof {
                section,
                needed,
                remaining,
            },
            // Only string reads can hit this; callers with an index remap it.
            BufferError::InvalidUtf8 => BlobError::InvalidUtf8 { index: 0 },
        }
    }
}
