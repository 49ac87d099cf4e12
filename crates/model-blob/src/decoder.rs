//! Blob decoder.
//!
//! Mirrors the encoder section by section. Counts are checked against the
//! remaining input before anything is allocated, so a corrupted prefix
//! fails with [`BlobError::UnexpectedEof`] instead of a huge allocation.

use log::{debug, trace};
use model_blob_buffers::{BufferError, Reader};

use crate::layout::{Header, HEADER_SIZE};
use crate::{
    BlobError, Element, ElementKind, Framing, Layout, Matrix, ModelBlob, Section, SparseTable,
};

/// Blob decoder over a borrowed byte slice.
pub struct BlobDecoder<'a> {
    pub reader: Reader<'a>,
    layout: Layout,
}

impl<'a> BlobDecoder<'a> {
    pub fn new(data: &'a [u8], layout: Layout) -> Self {
        Self {
            reader: Reader::with_order(data, layout.byte_order),
            layout,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Decodes a whole blob; trailing bytes are an error.
    pub fn decode<F: Element, I: Element>(mut self) -> Result<ModelBlob<F, I>, BlobError> {
        if let Some(header) = self.read_header()? {
            check_kind(Section::Matrix, F::KIND, header.float)?;
            check_kind(Section::IntVector, I::KIND, header.int)?;
        }
        let matrix = self.read_matrix()?;
        let vector = self.read_vector(Section::Vector)?;
        let int_vector = self.read_vector(Section::IntVector)?;
        let strings = self.read_strings()?;
        let sparse = self.read_sparse_table()?;
        self.finish()?;
        Ok(ModelBlob {
            matrix,
            vector,
            int_vector,
            strings,
            sparse,
        })
    }

    /// Reads the tagged header when the layout has one.
    ///
    /// The byte order recorded in the header replaces the layout's.
    pub fn read_header(&mut self) -> Result<Option<Header>, BlobError> {
        if self.layout.framing == Framing::Raw {
            return Ok(None);
        }
        let header = Header::read(&self.reader.uint8[self.reader.x..self.reader.end])?;
        self.reader.x += HEADER_SIZE;
        self.reader.order = header.byte_order;
        self.layout.byte_order = header.byte_order;
        debug!(
            "header: {} endian, {} / {}",
            header.byte_order, header.float, header.int
        );
        Ok(Some(header))
    }

    /// Reads a u32 count.
    pub fn read_len(&mut self, section: Section) -> Result<usize, BlobError> {
        let len = self
            .reader
            .u32()
            .map_err(|err| BlobError::read(section, err))?;
        Ok(len as usize)
    }

    /// Reads `rows` and `cols`, returning them with the element count.
    pub(crate) fn read_shape(&mut self) -> Result<(usize, usize, usize), BlobError> {
        let rows = self.read_len(Section::Matrix)?;
        let cols = self.read_len(Section::Matrix)?;
        let count = rows.checked_mul(cols).ok_or(BlobError::LengthOverflow {
            section: Section::Matrix,
            len: rows as u128 * cols as u128,
        })?;
        Ok((rows, cols, count))
    }

    /// Advances past `count` items of `width` bytes.
    pub(crate) fn skip(
        &mut self,
        section: Section,
        count: usize,
        width: usize,
    ) -> Result<(), BlobError> {
        self.reserve(section, count, width)?;
        self.reader.x += count * width;
        Ok(())
    }

    /// Fails unless `count` items of `width` bytes can still be read.
    fn reserve(&self, section: Section, count: usize, width: usize) -> Result<(), BlobError> {
        let needed = count
            .checked_mul(width)
            .ok_or(BlobError::LengthOverflow {
                section,
                len: count as u128 * width as u128,
            })?;
        self.reader
            .assert_size(needed)
            .map_err(|err| BlobError::read(section, err))
    }

    fn read_elements<T: Element>(
        &mut self,
        section: Section,
        count: usize,
    ) -> Result<Vec<T>, BlobError> {
        self.reserve(section, count, T::KIND.width())?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(T::read(&mut self.reader).map_err(|err| BlobError::read(section, err))?);
        }
        Ok(values)
    }

    /// Reads `rows`, `cols` and the row-major payload.
    pub fn read_matrix<F: Element>(&mut self) -> Result<Matrix<F>, BlobError> {
        let (rows, cols, count) = self.read_shape()?;
        let data = self.read_elements(Section::Matrix, count)?;
        debug!("{}: {} x {}", Section::Matrix, rows, cols);
        Matrix::new(rows, cols, data)
    }

    /// Reads a count and that many elements.
    pub fn read_vector<T: Element>(&mut self, section: Section) -> Result<Vec<T>, BlobError> {
        let count = self.read_len(section)?;
        let values = self.read_elements(section, count)?;
        debug!("{}: {} x {}", section, count, T::KIND);
        Ok(values)
    }

    /// Reads the string table.
    pub fn read_strings(&mut self) -> Result<Vec<String>, BlobError> {
        let count = self.read_len(Section::Strings)?;
        // Every entry carries at least its own length prefix.
        self.reserve(Section::Strings, count, 4)?;
        let mut strings = Vec::with_capacity(count);
        for index in 0..count {
            let len = self.read_len(Section::Strings)?;
            let s = self.reader.utf8(len).map_err(|err| match err {
                BufferError::InvalidUtf8 => BlobError::InvalidUtf8 { index },
                err => BlobError::read(Section::Strings, err),
            })?;
            strings.push(s.to_owned());
        }
        debug!("{}: {} entries", Section::Strings, count);
        Ok(strings)
    }

    /// Reads the sparse table, keeping order and repeated keys.
    pub fn read_sparse_table(&mut self) -> Result<SparseTable, BlobError> {
        let count = self.read_len(Section::SparseTable)?;
        // Key plus list length per entry.
        self.reserve(Section::SparseTable, count, 8)?;
        let mut table = SparseTable::new();
        for _ in 0..count {
            let key = self.read_len(Section::SparseTable)? as u32;
            let len = self.read_len(Section::SparseTable)?;
            let values = self.read_elements::<i32>(Section::SparseTable, len)?;
            trace!("sparse entry {}: {} values", key, len);
            table.push(key, values);
        }
        debug!("{}: {} entries", Section::SparseTable, count);
        Ok(table)
    }

    /// Fails if any input is left.
    pub fn finish(&self) -> Result<(), BlobError> {
        match self.reader.size() {
            0 => Ok(()),
            n => Err(BlobError::TrailingBytes(n)),
        }
    }
}

fn check_kind(
    section: Section,
    expected: ElementKind,
    found: ElementKind,
) -> Result<(), BlobError> {
    if expected != found {
        return Err(BlobError::ElementMismatch {
            section,
            expected,
            found,
        });
    }
    Ok(())
}
