/// A single grid cell. `None` represents the padding glyph used to square up
/// ragged rows; it behaves identically to a space when landed on.
pub type Glyph = Option<char>;

/// Row/column coordinate into a [`Grid`]. Signed so that a step can go
/// momentarily negative before the boundary check halts the automaton.
pub type Position = (i64, i64);

/// Immutable rectangular program source, rows padded to the widest row.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: Vec<Vec<Glyph>>,
    width: usize,
}

impl Grid {
    /// Parse program text into a grid: split on newlines, pad each row with
    /// the empty glyph to the width of the longest row.
    pub fn from_text(src: &str) -> Self {
        let lines: Vec<&str> = src.split('\n').collect();
        let mut rows: Vec<Vec<Glyph>> = lines
            .iter()
            .map(|line| line.chars().map(Some).collect::<Vec<Glyph>>())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            while row.len() < width {
                row.push(None);
            }
        }
        Self { rows, width }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the glyph at `pos`, or `None` if `pos` is outside the grid
    /// (the caller treats both out-of-range and the padding glyph as HALT,
    /// but only an in-range lookup distinguishes them for boundary checks).
    pub fn get(&self, pos: Position) -> Option<Glyph> {
        let (row, col) = pos;
        if row < 0 || col < 0 {
            return None;
        }
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Whether `pos` lies strictly within the grid on both axes, preserving
    /// the source's off-by-one tolerance: the high bound is checked with
    /// `>`, not `>=`, so a position exactly equal to (height, width) is still
    /// considered in-bounds for one tick.
    pub fn in_bounds_tolerant(&self, pos: Position) -> bool {
        let (row, col) = pos;
        row >= 0
            && col >= 0
            && (row as usize) <= self.height()
            && (col as usize) <= self.width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_ragged_rows() {
        let g = Grid::from_text("ab\nc");
        assert_eq!(g.width(), 2);
        assert_eq!(g.get((1, 1)), Some(None));
        assert_eq!(g.get((0, 1)), Some(Some('b')));
    }

    #[test]
    fn out_of_range_is_none() {
        let g = Grid::from_text("ab");
        assert_eq!(g.get((5, 5)), None);
        assert_eq!(g.get((-1, 0)), None);
    }

    #[test]
    fn boundary_tolerance_allows_one_past_high_edge() {
        let g = Grid::from_text("ab\ncd");
        assert!(g.in_bounds_tolerant((2, 2)));
        assert!(!g.in_bounds_tolerant((3, 2)));
        assert!(!g.in_bounds_tolerant((2, 3)));
        assert!(!g.in_bounds_tolerant((-1, 0)));
    }
}
