//! In-memory sections of a blob.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::BlobError;

/// Dense row-major matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixRepr<T>")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

#[derive(Deserialize)]
struct MatrixRepr<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> TryFrom<MatrixRepr<T>> for Matrix<T> {
    type Error = BlobError;

    fn try_from(repr: MatrixRepr<T>) -> Result<Self, Self::Error> {
        Matrix::new(repr.rows, repr.cols, repr.data)
    }
}

impl<T> Matrix<T> {
    /// Wraps row-major `data` as a `rows` x `cols` matrix.
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, BlobError> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(BlobError::ShapeMismatch {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a matrix from nested rows; all rows must have the same length.
    ///
    /// An empty outer vector gives a 0 x 0 matrix.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, BlobError> {
        let cols = rows.first().map_or(0, Vec::len);
        let count = rows.len();
        let mut data = Vec::with_capacity(count * cols);
        for row in rows {
            if row.len() != cols {
                return Err(BlobError::ShapeMismatch {
                    rows: count,
                    cols,
                    len: row.len(),
                });
            }
            data.extend(row);
        }
        Self::new(count, cols, data)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns row `index`, or `None` past the last row.
    pub fn row(&self, index: usize) -> Option<&[T]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.cols;
        Some(&self.data[start..start + self.cols])
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if col >= self.cols {
            return None;
        }
        self.row(row).map(|r| &r[col])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.rows).map(move |i| &self.data[i * self.cols..(i + 1) * self.cols])
    }
}

impl<T: Copy> Matrix<T> {
    /// Keeps only the columns whose mask entry is `true`.
    pub fn select_columns(&self, mask: &[bool]) -> Self {
        let cols = mask.iter().take(self.cols).filter(|keep| **keep).count();
        let data = self
            .iter_rows()
            .flat_map(|row| {
                row.iter()
                    .zip(mask)
                    .filter(|(_, keep)| **keep)
                    .map(|(value, _)| *value)
            })
            .collect();
        Self {
            rows: self.rows,
            cols,
            data,
        }
    }
}

impl<T: Copy + Default> Matrix<T> {
    /// A `rows` x `cols` matrix of default values; fails if the size overflows.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, BlobError> {
        let len = rows
            .checked_mul(cols)
            .ok_or(BlobError::ShapeMismatch { rows, cols, len: 0 })?;
        Ok(Self {
            rows,
            cols,
            data: vec![T::default(); len],
        })
    }
}

/// Ordered key -> integer list table.
///
/// Entries keep insertion order and duplicate keys; both are written to
/// the file as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SparseTable {
    entries: Vec<(u32, Vec<i32>)>,
}

impl SparseTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: u32, values: Vec<i32>) {
        self.entries.push((key, values));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[i32])> + '_ {
        self.entries
            .iter()
            .map(|(key, values)| (*key, values.as_slice()))
    }

    /// Single-valued view; the last entry for a repeated key wins.
    pub fn to_map(&self) -> HashMap<u32, Vec<i32>> {
        self.entries.iter().cloned().collect()
    }
}

impl From<Vec<(u32, Vec<i32>)>> for SparseTable {
    fn from(entries: Vec<(u32, Vec<i32>)>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(u32, Vec<i32>)> for SparseTable {
    fn from_iter<It: IntoIterator<Item = (u32, Vec<i32>)>>(iter: It) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// The five sections of a blob, in file order.
///
/// `F` is the element type of the matrix and the vector, `I` the element
/// type of the integer vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBlob<F, I> {
    pub matrix: Matrix<F>,
    pub vector: Vec<F>,
    pub int_vector: Vec<I>,
    pub strings: Vec<String>,
    pub sparse: SparseTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_shape_checks() {
        let m = Matrix::new(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(m.row(1), Some(&[4, 5, 6][..]));
        assert_eq!(m.get(0, 2), Some(&3));
        assert_eq!(m.get(0, 3), None);
        assert_eq!(m.row(2), None);
        assert!(matches!(
            Matrix::new(2, 2, vec![1, 2, 3]),
            Err(BlobError::ShapeMismatch { rows: 2, cols: 2, len: 3 })
        ));
    }

    #[test]
    fn matrix_zero_sized() {
        let m: Matrix<f64> = Matrix::new(0, 5, vec![]).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.cols(), 5);
        assert_eq!(m.iter_rows().count(), 0);
        let m: Matrix<f64> = Matrix::new(3, 0, vec![]).unwrap();
        assert_eq!(m.iter_rows().count(), 3);
    }

    #[test]
    fn matrix_zeros() {
        let m: Matrix<i16> = Matrix::zeros(2, 3).unwrap();
        assert_eq!(m.as_slice(), &[0; 6]);
        assert_eq!(m.row(1), Some(&[0, 0, 0][..]));
        assert!(matches!(
            Matrix::<u16>::zeros(usize::MAX, 2),
            Err(BlobError::ShapeMismatch { rows: usize::MAX, cols: 2, .. })
        ));
    }

    #[test]
    fn matrix_from_rows() {
        let m = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(m.as_slice(), &[1, 2, 3, 4]);
        assert!(Matrix::from_rows(vec![vec![1, 2], vec![3]]).is_err());
        let empty: Matrix<i32> = Matrix::from_rows(vec![]).unwrap();
        assert_eq!((empty.rows(), empty.cols()), (0, 0));
    }

    #[test]
    fn matrix_select_columns() {
        let m = Matrix::new(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let s = m.select_columns(&[true, false, true]);
        assert_eq!((s.rows(), s.cols()), (2, 2));
        assert_eq!(s.as_slice(), &[1, 3, 4, 6]);
    }

    #[test]
    fn matrix_json_rejects_bad_shape() {
        let ok: Matrix<f64> =
            serde_json::from_str(r#"{"rows":1,"cols":2,"data":[1.0,2.0]}"#).unwrap();
        assert_eq!(ok.cols(), 2);
        let bad = serde_json::from_str::<Matrix<f64>>(r#"{"rows":2,"cols":2,"data":[1.0]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn sparse_table_keeps_duplicates_last_wins_in_map() {
        let table: SparseTable = vec![(3, vec![1]), (1, vec![]), (3, vec![2, 2])].into();
        assert_eq!(table.len(), 3);
        let keys: Vec<u32> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![3, 1, 3]);
        assert_eq!(table.to_map()[&3], vec![2, 2]);
    }

    #[test]
    fn sparse_table_json_is_pair_list() {
        let table: SparseTable = serde_json::from_str("[[1,[10,-10]],[5,[]]]").unwrap();
        assert_eq!(table.iter().nth(1), Some((5, &[][..])));
        assert_eq!(serde_json::to_string(&table).unwrap(), "[[1,[10,-10]],[5,[]]]");
    }
}
