//! Monochrome grid, the exchange format between encoder and decoder.

use super::CodecError;
use crate::generation::RandomBatch;

/// A rectangular grid of pixels where `false` is black and `true` is white.
///
/// Cells are stored row-major; `get(x, y)` addresses column `x` of row `y`.
#[derive(Clone, PartialEq, Eq)]
pub struct MonochromeGrid {
    cells: Vec<bool>,
    width: usize,
    height: usize,
}

impl MonochromeGrid {
    /// Builds a grid from rows. All rows must share the first row's length.
    pub fn from_rows<R>(rows: impl IntoIterator<Item = R>) -> Result<Self, CodecError>
    where
        R: AsRef<[bool]>,
    {
        let mut cells = Vec::new();
        let mut width = None;
        let mut height = 0;

        for (index, row) in rows.into_iter().enumerate() {
            let row = row.as_ref();
            let expected = *width.get_or_insert(row.len());
            if row.len() != expected {
                return Err(CodecError::RaggedRows {
                    row: index,
                    expected,
                    found: row.len(),
                });
            }
            cells.extend_from_slice(row);
            height += 1;
        }

        match width {
            Some(width) if width > 0 => Ok(Self {
                cells,
                width,
                height,
            }),
            _ => Err(CodecError::EmptyGrid),
        }
    }

    /// Builds a grid from row-major cells, `width` cells per row.
    pub fn from_cells(cells: Vec<bool>, width: usize) -> Result<Self, CodecError> {
        if width == 0 || cells.is_empty() {
            return Err(CodecError::EmptyGrid);
        }
        let remainder = cells.len() % width;
        if remainder != 0 {
            return Err(CodecError::RaggedRows {
                row: cells.len() / width,
                expected: width,
                found: remainder,
            });
        }

        let height = cells.len() / width;
        Ok(Self {
            cells,
            width,
            height,
        })
    }

    /// Builds a grid from `'0'`/`'1'` text rows. Any character other than
    /// `'0'` is white, mirroring the renderer.
    #[cfg(test)]
    pub(crate) fn from_text_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, CodecError> {
        Self::from_rows(
            rows.iter()
                .map(|r| r.as_ref().chars().map(|c| c != '0').collect::<Vec<_>>()),
        )
    }

    /// Renders a batch's processed rows: `'0'` black, `'1'` white.
    pub fn from_batch(batch: &RandomBatch) -> Result<Self, CodecError> {
        Self::from_rows(batch.processed().iter().map(|row| {
            row.bits().iter().map(|b| b.is_set()).collect::<Vec<_>>()
        }))
    }

    /// Grid width (pixels per row).
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height (number of rows).
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the cell at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        assert!(x < self.width && y < self.height, "cell ({x}, {y}) out of bounds");
        self.cells[y * self.width + x]
    }

    /// Returns row `y` as a slice.
    #[inline]
    pub fn row(&self, y: usize) -> &[bool] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Iterates rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.cells.chunks_exact(self.width)
    }

    /// Returns all cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }
}

impl std::fmt::Debug for MonochromeGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let white = self.cells.iter().filter(|&&c| c).count();
        f.debug_struct("MonochromeGrid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("white", &white)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::IterationPolicy;

    #[test]
    fn test_from_text_rows() {
        let grid = MonochromeGrid::from_text_rows(&["0110", "1001"]).unwrap();

        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 2);
        assert!(!grid.get(0, 0));
        assert!(grid.get(1, 0));
        assert!(grid.get(0, 1));
        assert_eq!(grid.row(1), &[true, false, false, true]);
    }

    #[test]
    fn test_empty_grid_rejected() {
        let rows: Vec<Vec<bool>> = Vec::new();
        assert!(matches!(
            MonochromeGrid::from_rows(rows),
            Err(CodecError::EmptyGrid)
        ));
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(matches!(
            MonochromeGrid::from_rows(vec![Vec::<bool>::new()]),
            Err(CodecError::EmptyGrid)
        ));
    }

    #[test]
    fn test_from_cells() {
        let grid = MonochromeGrid::from_cells(vec![false, true, true, false, true, false], 3)
            .unwrap();

        assert_eq!(grid.height(), 2);
        assert_eq!(grid.row(0), &[false, true, true]);
        assert_eq!(grid.row(1), &[false, true, false]);
    }

    #[test]
    fn test_from_cells_rejects_partial_row() {
        assert!(matches!(
            MonochromeGrid::from_cells(vec![true; 7], 3),
            Err(CodecError::RaggedRows {
                row: 2,
                expected: 3,
                found: 1
            })
        ));
        assert!(matches!(
            MonochromeGrid::from_cells(Vec::new(), 3),
            Err(CodecError::EmptyGrid)
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = MonochromeGrid::from_text_rows(&["0110", "10", "1111"]);
        assert!(matches!(
            result,
            Err(CodecError::RaggedRows {
                row: 1,
                expected: 4,
                found: 2
            })
        ));
    }

    #[test]
    fn test_from_batch_matches_processed_rows() {
        let batch = RandomBatch::generate(8, 5, IterationPolicy::BatchLength).unwrap();
        let grid = MonochromeGrid::from_batch(&batch).unwrap();

        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 8);
        for (y, row) in batch.processed().iter().enumerate() {
            for (x, bit) in row.bits().iter().enumerate() {
                assert_eq!(grid.get(x, y), bit.is_set());
            }
        }
    }
}
