//! Fixed-order, length-prefixed binary container for model tables.
//!
//! A blob holds five sections, always in this order:
//!
//! | # | Section | Layout |
//! |---|---------|--------|
//! | 1 | matrix | `rows: u32`, `cols: u32`, `rows * cols` elements, row-major |
//! | 2 | vector | `len: u32`, `len` elements |
//! | 3 | int vector | `len: u32`, `len` elements |
//! | 4 | string table | `n: u32`, then `n` x (`byte_len: u32`, UTF-8 bytes) |
//! | 5 | sparse table | `m: u32`, then `m` x (`key: u32`, `len: u32`, `len` x `i32`) |
//!
//! There is no padding, no terminator and, in [`Framing::Raw`], no header:
//! element widths come from the Rust types the caller encodes and decodes
//! with, and the byte order from the [`Layout`]. [`Framing::Tagged`] adds
//! an 8-byte header that records both.
//!
//! # Example
//!
//! ```
//! use model_blob::{decode, encode, Layout, Matrix, ModelBlob, SparseTable};
//!
//! let matrix = Matrix::new(1, 2, vec![0.5f32, 1.5]).unwrap();
//! let sparse: SparseTable = vec![(1, vec![10, -10])].into();
//!
//! let mut bytes = Vec::new();
//! encode(&mut bytes, &matrix, &[2.0f32], &[7u16], &["en"], &sparse).unwrap();
//!
//! let blob: ModelBlob<f32, u16> = decode(&bytes, Layout::LEGACY).unwrap();
//! assert_eq!(blob.matrix, matrix);
//! assert_eq!(blob.strings, vec!["en".to_owned()]);
//! ```

mod decoder;
mod element;
mod encoder;
mod error;
mod inspect;
mod layout;
mod types;

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use log::info;

pub use decoder::BlobDecoder;
pub use element::{Element, ElementKind};
pub use encoder::BlobEncoder;
pub use error::{BlobError, Section};
pub use inspect::{inspect, SectionSpan};
pub use layout::{Framing, Header, Layout, HEADER_SIZE, MAGIC, VERSION};
pub use model_blob_buffers::ByteOrder;
pub use types::{Matrix, ModelBlob, SparseTable};

/// Encodes the five sections into `out` using [`Layout::LEGACY`].
///
/// No relation between the sections is checked: a vector whose length
/// differs from the matrix row count is written as given. On error the
/// sink holds a truncated blob that must be discarded.
pub fn encode<W, F, I, S>(
    out: W,
    matrix: &Matrix<F>,
    vector: &[F],
    int_vector: &[I],
    strings: &[S],
    sparse: &SparseTable,
) -> Result<(), BlobError>
where
    W: Write,
    F: Element,
    I: Element,
    S: AsRef<str>,
{
    BlobEncoder::new(Layout::LEGACY).encode_parts(out, matrix, vector, int_vector, strings, sparse)
}

/// Creates (or truncates) `path` and writes `blob` to it.
///
/// On error the file is left incomplete; the caller must discard it.
pub fn write_file<P, F, I>(path: P, blob: &ModelBlob<F, I>, layout: Layout) -> Result<(), BlobError>
where
    P: AsRef<Path>,
    F: Element,
    I: Element,
{
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    BlobEncoder::new(layout).encode_to(&mut out, blob)?;
    out.flush()?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Decodes a complete blob.
pub fn decode<F: Element, I: Element>(
    data: &[u8],
    layout: Layout,
) -> Result<ModelBlob<F, I>, BlobError> {
    BlobDecoder::new(data, layout).decode()
}

/// Reads `reader` to the end and decodes it.
pub fn read_from<R: Read, F: Element, I: Element>(
    mut reader: R,
    layout: Layout,
) -> Result<ModelBlob<F, I>, BlobError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    decode(&data, layout)
}

/// Reads and decodes the file at `path`.
pub fn read_file<P, F, I>(path: P, layout: Layout) -> Result<ModelBlob<F, I>, BlobError>
where
    P: AsRef<Path>,
    F: Element,
    I: Element,
{
    let data = std::fs::read(path)?;
    decode(&data, layout)
}
