//! Blob encoder.
//!
//! Writes the five sections strictly in file order. Every count and byte
//! length is a u32 prefix in the layout's byte order; payloads follow with
//! no padding or terminator.

use std::io::Write;

use log::{debug, trace};
use model_blob_buffers::Writer;

use crate::layout::Header;
use crate::{BlobError, Element, Framing, Layout, Matrix, ModelBlob, Section, SparseTable};

/// Blob encoder.
///
/// Section writers append to [`BlobEncoder::writer`]; [`BlobEncoder::encode`]
/// returns the whole blob and [`BlobEncoder::encode_parts`] hands each
/// section to a sink as soon as it is encoded.
pub struct BlobEncoder {
    pub writer: Writer,
    layout: Layout,
}

impl Default for BlobEncoder {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}

impl BlobEncoder {
    pub fn new(layout: Layout) -> Self {
        Self {
            writer: Writer::with_order(layout.byte_order),
            layout,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Encodes a blob and returns the bytes.
    pub fn encode<F: Element, I: Element>(
        &mut self,
        blob: &ModelBlob<F, I>,
    ) -> Result<Vec<u8>, BlobError> {
        let mut out = Vec::new();
        self.encode_to(&mut out, blob)?;
        Ok(out)
    }

    /// Encodes a blob into `out`.
    pub fn encode_to<W: Write, F: Element, I: Element>(
        &mut self,
        out: W,
        blob: &ModelBlob<F, I>,
    ) -> Result<(), BlobError> {
        self.encode_parts(
            out,
            &blob.matrix,
            blob.vector.as_slice(),
            blob.int_vector.as_slice(),
            blob.strings.as_slice(),
            &blob.sparse,
        )
    }

    /// Encodes loose sections into `out`, one section per write.
    ///
    /// The vector length is not checked against the matrix row count.
    /// A failed write leaves `out` holding a truncated blob.
    pub fn encode_parts<W: Write, F: Element, I: Element, S: AsRef<str>>(
        &mut self,
        mut out: W,
        matrix: &Matrix<F>,
        vector: &[F],
        int_vector: &[I],
        strings: &[S],
        sparse: &SparseTable,
    ) -> Result<(), BlobError> {
        self.writer.reset();
        if self.layout.framing == Framing::Tagged {
            self.write_header::<F, I>();
            self.drain(&mut out, Section::Header)?;
        }
        self.write_matrix(matrix)?;
        self.drain(&mut out, Section::Matrix)?;
        self.write_vector(Section::Vector, vector)?;
        self.drain(&mut out, Section::Vector)?;
        self.write_vector(Section::IntVector, int_vector)?;
        self.drain(&mut out, Section::IntVector)?;
        self.write_strings(strings)?;
        self.drain(&mut out, Section::Strings)?;
        self.write_sparse_table(sparse)?;
        self.drain(&mut out, Section::SparseTable)?;
        Ok(())
    }

    fn drain<W: Write>(&mut self, out: &mut W, section: Section) -> Result<(), BlobError> {
        let bytes = self.writer.flush();
        debug!("{}: {} bytes", section, bytes.len());
        out.write_all(&bytes)?;
        Ok(())
    }

    /// Writes the tagged header for element types `F` and `I`.
    pub fn write_header<F: Element, I: Element>(&mut self) {
        Header {
            byte_order: self.layout.byte_order,
            float: F::KIND,
            int: I::KIND,
        }
        .write(&mut self.writer);
    }

    /// Writes a u32 length prefix.
    pub fn write_len(&mut self, section: Section, len: usize) -> Result<(), BlobError> {
        let len = u32::try_from(len).map_err(|_| BlobError::LengthOverflow {
            section,
            len: len as u128,
        })?;
        self.writer.u32(len);
        Ok(())
    }

    /// Writes `rows`, `cols`, then the row-major payload.
    pub fn write_matrix<F: Element>(&mut self, matrix: &Matrix<F>) -> Result<(), BlobError> {
        self.write_len(Section::Matrix, matrix.rows())?;
        self.write_len(Section::Matrix, matrix.cols())?;
        for &value in matrix.as_slice() {
            value.write(&mut self.writer);
        }
        Ok(())
    }

    /// Writes a count followed by the elements.
    pub fn write_vector<T: Element>(
        &mut self,
        section: Section,
        values: &[T],
    ) -> Result<(), BlobError> {
        self.write_len(section, values.len())?;
        for &value in values {
            value.write(&mut self.writer);
        }
        Ok(())
    }

    /// Writes a count, then each string as byte length + UTF-8 bytes.
    pub fn write_strings<S: AsRef<str>>(&mut self, strings: &[S]) -> Result<(), BlobError> {
        self.write_len(Section::Strings, strings.len())?;
        for s in strings {
            let s = s.as_ref();
            self.write_len(Section::Strings, s.len())?;
            self.writer.utf8(s);
        }
        Ok(())
    }

    /// Writes a count, then key, list length and i32 list per entry.
    pub fn write_sparse_table(&mut self, table: &SparseTable) -> Result<(), BlobError> {
        self.write_len(Section::SparseTable, table.len())?;
        for (key, values) in table.iter() {
            trace!("sparse entry {}: {} values", key, values.len());
            self.writer.u32(key);
            self.write_len(Section::SparseTable, values.len())?;
            for &value in values {
                self.writer.i32(value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_blob_buffers::ByteOrder;

    #[test]
    fn empty_string_table_is_one_zero() {
        let mut encoder = BlobEncoder::default();
        encoder.write_strings::<&str>(&[]).unwrap();
        assert_eq!(encoder.writer.flush(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn empty_sparse_table_is_one_zero() {
        let mut encoder = BlobEncoder::default();
        encoder.write_sparse_table(&SparseTable::new()).unwrap();
        assert_eq!(encoder.writer.flush(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn string_length_is_byte_length() {
        let mut encoder = BlobEncoder::default();
        encoder.write_strings(&["日本"]).unwrap();
        let bytes = encoder.writer.flush();
        assert_eq!(&bytes[..8], &[1, 0, 0, 0, 6, 0, 0, 0]);
        assert_eq!(&bytes[8..], "日本".as_bytes());
    }

    #[test]
    fn big_endian_prefixes() {
        let mut encoder = BlobEncoder::new(Layout::new(ByteOrder::Big, Framing::Raw));
        encoder
            .write_vector(Section::IntVector, &[1u16, 0x0203])
            .unwrap();
        assert_eq!(encoder.writer.flush(), vec![0, 0, 0, 2, 0, 1, 2, 3]);
    }

    #[test]
    fn zero_column_matrix_is_header_only() {
        let mut encoder = BlobEncoder::default();
        let matrix: Matrix<f64> = Matrix::new(4, 0, vec![]).unwrap();
        encoder.write_matrix(&matrix).unwrap();
        assert_eq!(encoder.writer.flush(), vec![4, 0, 0, 0, 0, 0, 0, 0]);
    }
}
