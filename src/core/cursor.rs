//! Logical-to-physical cursor mapping.

/// Physical terminal cell, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPos {
    pub col: usize,
    pub row: usize,
}

impl CursorPos {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// Maps a physical position moved by `delta` characters through the
/// wrap-around rules of a buffer `width` cells wide.
///
/// Stepping left from column 0 lands on column `width - 1` of the previous
/// row; stepping right from column `width - 1` lands on column 0 of the next
/// row. Positions before the origin saturate at `(0, 0)`.
pub fn offset_position(start: CursorPos, delta: isize, width: usize) -> CursorPos {
    let width = width.max(1);
    let linear = start.row * width + start.col.min(width - 1);
    let target = if delta < 0 {
        linear.saturating_sub(delta.unsigned_abs())
    } else {
        linear.saturating_add(delta.unsigned_abs())
    };
    CursorPos {
        col: target % width,
        row: target / width,
    }
}

#[cfg(test)]
mod tests {
    use super::{offset_position, CursorPos};

    #[test]
    fn single_steps_wrap_between_rows() {
        assert_eq!(
            offset_position(CursorPos::new(0, 3), -1, 10),
            CursorPos::new(9, 2)
        );
        assert_eq!(
            offset_position(CursorPos::new(9, 2), 1, 10),
            CursorPos::new(0, 3)
        );
    }

    #[test]
    fn multi_step_moves_compose() {
        let start = CursorPos::new(4, 1);
        let mut stepped = start;
        for _ in 0..23 {
            stepped = offset_position(stepped, 1, 8);
        }
        assert_eq!(offset_position(start, 23, 8), stepped);
        assert_eq!(offset_position(stepped, -23, 8), start);
    }

    #[test]
    fn moves_before_origin_saturate() {
        assert_eq!(
            offset_position(CursorPos::new(2, 0), -5, 10),
            CursorPos::new(0, 0)
        );
    }

    #[test]
    fn zero_width_is_treated_as_one_column() {
        assert_eq!(
            offset_position(CursorPos::new(0, 0), 3, 0),
            CursorPos::new(0, 3)
        );
    }
}
