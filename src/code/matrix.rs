//! Flat matrices backing the codec engine.
//!
//! The generator matrix is a grid of GF(2) bits and the sign matrix is the
//! Sylvester-Hadamard grid of `+1`/`-1` entries driving the transform
//! search. Both live in a single contiguous buffer indexed
//! `row * cols + col`, so a row is a plain slice and two matrices never
//! share storage.

use crate::gf2::Bit;

/// A `rows x cols` matrix of GF(2) bits in a flat row-major buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Bit>,
}

impl BitMatrix {
    /// Creates an all-zero matrix of the given shape.
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Bit::ZERO; rows * cols],
        }
    }

    /// Builds the Reed-Muller generator matrix for the given order.
    ///
    /// The matrix has `order + 1` rows and `2^order` columns. Row `i` of
    /// the first `order` rows alternates blocks of `2^i` zeros and `2^i`
    /// ones, so entry `(i, j)` is bit `i` of the column index `j`. The
    /// last row is all ones.
    pub fn generator(order: usize) -> Self {
        let rows = order + 1;
        let cols = 1usize << order;
        let mut matrix = Self::zero(rows, cols);
        for i in 0..order {
            let mut bit = Bit::ZERO;
            let mut run = 0;
            for j in 0..cols {
                matrix.set(i, j, bit);
                run += 1;
                if run == (1 << i) {
                    bit = bit.complement();
                    run = 0;
                }
            }
        }
        for j in 0..cols {
            matrix.set(order, j, Bit::ONE);
        }
        matrix
    }

    /// Returns the number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the entry at (`row`, `col`).
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> Bit {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }

    /// Sets the entry at (`row`, `col`).
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Bit) {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col] = value;
    }

    /// Returns row `row` as a slice.
    pub fn row(&self, row: usize) -> &[Bit] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }
}

/// A square matrix of `+1`/`-1` entries in a flat row-major buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignMatrix {
    size: usize,
    data: Vec<i32>,
}

impl SignMatrix {
    /// Builds the Sylvester-Hadamard sign matrix for the given order.
    ///
    /// `H(1)` is `[[1, 1], [1, -1]]`; `H(k)` tiles `H(k - 1)` into four
    /// quadrants and negates the bottom-right one. The result has `2^order`
    /// rows and columns.
    ///
    /// # Panics
    ///
    /// Panics if `order` is zero.
    pub fn sylvester(order: usize) -> Self {
        assert!(order >= 1, "sign matrix order must be at least 1");
        if order == 1 {
            return Self {
                size: 2,
                data: vec![1, 1, 1, -1],
            };
        }
        let sub = Self::sylvester(order - 1);
        let size = 1usize << order;
        let half = size / 2;
        let mut matrix = Self {
            size,
            data: vec![0; size * size],
        };
        for i in 0..half {
            for j in 0..half {
                let value = sub.at(i, j);
                matrix.set(i, j, value);
                matrix.set(i, j + half, value);
                matrix.set(i + half, j, value);
                matrix.set(i + half, j + half, -value);
            }
        }
        matrix
    }

    /// Returns the number of rows (and columns).
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the entry at (`row`, `col`).
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> i32 {
        debug_assert!(row < self.size && col < self.size);
        self.data[row * self.size + col]
    }

    /// Sets the entry at (`row`, `col`).
    #[inline]
    fn set(&mut self, row: usize, col: usize, value: i32) {
        debug_assert!(row < self.size && col < self.size);
        self.data[row * self.size + col] = value;
    }

    /// Returns row `row` as a slice.
    pub fn row(&self, row: usize) -> &[i32] {
        &self.data[row * self.size..(row + 1) * self.size]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(row: &[Bit]) -> Vec<u8> {
        row.iter().map(|b| b.value()).collect()
    }

    #[test]
    fn test_generator_shape() {
        for order in 1..=5 {
            let g = BitMatrix::generator(order);
            assert_eq!(g.rows(), order + 1);
            assert_eq!(g.cols(), 1 << order);
        }
    }

    #[test]
    fn test_generator_order_three() {
        let g = BitMatrix::generator(3);
        assert_eq!(bits(g.row(0)), vec![0, 1, 0, 1, 0, 1, 0, 1]);
        assert_eq!(bits(g.row(1)), vec![0, 0, 1, 1, 0, 0, 1, 1]);
        assert_eq!(bits(g.row(2)), vec![0, 0, 0, 0, 1, 1, 1, 1]);
        assert_eq!(bits(g.row(3)), vec![1, 1, 1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_generator_rows_follow_column_bits() {
        let g = BitMatrix::generator(4);
        for i in 0..4 {
            for j in 0..16 {
                let expected = ((j >> i) & 1) as u8;
                assert_eq!(g.at(i, j).value(), expected, "row {i}, column {j}");
            }
        }
    }

    #[test]
    fn test_sylvester_base_case() {
        let h = SignMatrix::sylvester(1);
        assert_eq!(h.size(), 2);
        assert_eq!(h.row(0), &[1, 1]);
        assert_eq!(h.row(1), &[1, -1]);
    }

    #[test]
    fn test_sylvester_order_two() {
        let h = SignMatrix::sylvester(2);
        assert_eq!(h.size(), 4);
        assert_eq!(h.row(0), &[1, 1, 1, 1]);
        assert_eq!(h.row(1), &[1, -1, 1, -1]);
        assert_eq!(h.row(2), &[1, 1, -1, -1]);
        assert_eq!(h.row(3), &[1, -1, -1, 1]);
    }

    #[test]
    fn test_sylvester_closed_form() {
        // Entry (i, j) is -1 raised to the parity of the AND of the two
        // index vectors.
        let h = SignMatrix::sylvester(4);
        for i in 0..16usize {
            for j in 0..16usize {
                let expected = if (i & j).count_ones() % 2 == 0 { 1 } else { -1 };
                assert_eq!(h.at(i, j), expected, "entry ({i}, {j})");
            }
        }
    }

    #[test]
    fn test_sylvester_rows_are_orthogonal() {
        let h = SignMatrix::sylvester(3);
        let n = h.size();
        for i in 0..n {
            for j in 0..n {
                let dot: i32 = (0..n).map(|k| h.at(i, k) * h.at(j, k)).sum();
                let expected = if i == j { n as i32 } else { 0 };
                assert_eq!(dot, expected, "rows {i} and {j}");
            }
        }
    }

    #[test]
    #[should_panic(expected = "order must be at least 1")]
    fn test_sylvester_rejects_order_zero() {
        let _ = SignMatrix::sylvester(0);
    }
}
