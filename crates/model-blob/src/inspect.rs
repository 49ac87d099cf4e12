//! Section map of an encoded blob.

use serde::Serialize;

use crate::decoder::BlobDecoder;
use crate::layout::HEADER_SIZE;
use crate::{BlobError, ElementKind, Layout, Section};

/// Where one section sits in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSpan {
    pub section: Section,
    /// Byte offset of the section's first prefix.
    pub offset: usize,
    /// Bytes taken by the section, prefixes included.
    pub len: usize,
    /// Elements for matrix and vectors, entries for the tables.
    pub count: usize,
    pub element: Option<ElementKind>,
}

/// Walks the prefixes of `data` without materialising any payload.
///
/// `float` and `int` give the element widths of a raw blob; a tagged
/// header overrides them.
pub fn inspect(
    data: &[u8],
    layout: Layout,
    float: ElementKind,
    int: ElementKind,
) -> Result<Vec<SectionSpan>, BlobError> {
    let mut decoder = BlobDecoder::new(data, layout);
    let mut spans = Vec::with_capacity(6);

    let (float, int) = match decoder.read_header()? {
        Some(header) => {
            spans.push(SectionSpan {
                section: Section::Header,
                offset: 0,
                len: HEADER_SIZE,
                count: 1,
                element: None,
            });
            (header.float, header.int)
        }
        None => (float, int),
    };

    let offset = decoder.reader.x;
    let (_, _, count) = decoder.read_shape()?;
    decoder.skip(Section::Matrix, count, float.width())?;
    spans.push(span(&decoder, Section::Matrix, offset, count, Some(float)));

    for (section, kind) in [(Section::Vector, float), (Section::IntVector, int)] {
        let offset = decoder.reader.x;
        let count = decoder.read_len(section)?;
        decoder.skip(section, count, kind.width())?;
        spans.push(span(&decoder, section, offset, count, Some(kind)));
    }

    let offset = decoder.reader.x;
    let count = decoder.read_len(Section::Strings)?;
    for _ in 0..count {
        let len = decoder.read_len(Section::Strings)?;
        decoder.skip(Section::Strings, len, 1)?;
    }
    spans.push(span(&decoder, Section::Strings, offset, count, None));

    let offset = decoder.reader.x;
    let count = decoder.read_len(Section::SparseTable)?;
    for _ in 0..count {
        decoder.read_len(Section::SparseTable)?;
        let len = decoder.read_len(Section::SparseTable)?;
        decoder.skip(Section::SparseTable, len, 4)?;
    }
    spans.push(span(&decoder, Section::SparseTable, offset, count, Some(ElementKind::I32)));

    decoder.finish()?;
    Ok(spans)
}

fn span(
    decoder: &BlobDecoder<'_>,
    section: Section,
    offset: usize,
    count: usize,
    element: Option<ElementKind>,
) -> SectionSpan {
    SectionSpan {
        section,
        offset,
        len: decoder.reader.x - offset,
        count,
        element,
    }
}
