//! What a corrupted length prefix does to the decoder.
//!
//! The format has no checksums or resynchronisation points. A bad prefix
//! either makes a later read run out of input (or leave input over), or
//! keeps the totals consistent and is misread silently.

use model_blob::{decode, BlobEncoder, BlobError, Layout, Matrix, ModelBlob, Section};

// Offsets into the encoded example below.
const ROWS: usize = 0;
const COLS: usize = 4;
const INT_LEN: usize = 76;
const STRING_COUNT: usize = 92;
const BETA: usize = 109;
const SPARSE_COUNT: usize = 111;
const FIRST_KEY: usize = 115;

fn example() -> ModelBlob<f64, i32> {
    ModelBlob {
        matrix: Matrix::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap(),
        vector: vec![0.5, -1.5],
        int_vector: vec![7, -3, 0],
        strings: vec!["alpha".to_owned(), "β".to_owned()],
        sparse: vec![(1, vec![10, -10]), (5, vec![])].into(),
    }
}

fn encoded() -> Vec<u8> {
    BlobEncoder::default().encode(&example()).unwrap()
}

fn with_u32(mut bytes: Vec<u8>, at: usize, value: u32) -> Vec<u8> {
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
    bytes
}

fn decode_example(bytes: &[u8]) -> Result<ModelBlob<f64, i32>, BlobError> {
    decode(bytes, Layout::LEGACY)
}

#[test]
fn offsets_match_the_example() {
    let bytes = encoded();
    assert_eq!(&bytes[INT_LEN..INT_LEN + 4], &3u32.to_le_bytes());
    assert_eq!(&bytes[STRING_COUNT..STRING_COUNT + 4], &2u32.to_le_bytes());
    assert_eq!(&bytes[BETA..BETA + 2], "β".as_bytes());
    assert_eq!(&bytes[SPARSE_COUNT..SPARSE_COUNT + 4], &2u32.to_le_bytes());
    assert_eq!(&bytes[FIRST_KEY..FIRST_KEY + 4], &1u32.to_le_bytes());
}

#[test]
fn larger_row_count_runs_out_in_the_vector() {
    let bytes = with_u32(encoded(), ROWS, 3);
    // The matrix swallows 24 extra bytes, the vector length is then read
    // from the int vector payload (7) and needs 56 bytes.
    assert!(matches!(
        decode_example(&bytes),
        Err(BlobError::UnexpectedEof {
            section: Section::Vector,
            needed: 56,
            remaining: 55,
        })
    ));
}

#[test]
fn larger_string_count_runs_out_in_the_sparse_table() {
    let bytes = with_u32(encoded(), STRING_COUNT, 3);
    assert!(matches!(
        decode_example(&bytes),
        Err(BlobError::UnexpectedEof {
            section: Section::SparseTable,
            remaining: 18,
            ..
        })
    ));
}

#[test]
fn smaller_sparse_count_leaves_trailing_bytes() {
    let bytes = with_u32(encoded(), SPARSE_COUNT, 1);
    assert!(matches!(
        decode_example(&bytes),
        Err(BlobError::TrailingBytes(8))
    ));
}

#[test]
fn broken_string_bytes_name_the_entry() {
    let mut bytes = encoded();
    bytes[BETA] = 0xFF;
    assert!(matches!(
        decode_example(&bytes),
        Err(BlobError::InvalidUtf8 { index: 1 })
    ));
}

#[test]
fn swapped_shape_is_misread_silently() {
    let bytes = with_u32(with_u32(encoded(), ROWS, 3), COLS, 2);
    let blob = decode_example(&bytes).unwrap();
    assert_eq!((blob.matrix.rows(), blob.matrix.cols()), (3, 2));
    assert_eq!(blob.matrix.as_slice(), example().matrix.as_slice());
    assert_ne!(blob, example());
}

#[test]
fn changed_sparse_key_is_misread_silently() {
    let bytes = with_u32(encoded(), FIRST_KEY, 4);
    let blob = decode_example(&bytes).unwrap();
    assert_eq!(blob.sparse.iter().next(), Some((4, &[10, -10][..])));
}

#[test]
fn huge_count_fails_without_allocating() {
    let bytes = with_u32(encoded(), STRING_COUNT, u32::MAX);
    assert!(matches!(
        decode_example(&bytes),
        Err(BlobError::UnexpectedEof {
            section: Section::Strings,
            ..
        })
    ));
}

#[test]
fn every_truncation_fails() {
    let bytes = encoded();
    for len in 0..bytes.len() {
        assert!(decode_example(&bytes[..len]).is_err(), "prefix of {}", len);
    }
}

#[test]
fn single_byte_corruption_never_panics() {
    let bytes = encoded();
    for at in 0..bytes.len() {
        for value in [0x00, 0x01, 0x7F, 0x80, 0xFF] {
            let mut corrupted = bytes.clone();
            corrupted[at] = value;
            let _ = decode_example(&corrupted);
        }
    }
}
