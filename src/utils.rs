//! Utility functions for parsing board configurations from text.

use crate::board::{Board, BLANK};

/// Parses a text grid into a [`Board`].
///
/// Each non-empty line is one row; cells are whitespace-separated. A cell
/// is either a tile label (`1..rows*cols - 1`) or the blank, written `.`
/// or `0`. Unlike the engine constructors, this parser validates its
/// input: the grid must be rectangular, at least 2x2, and contain every
/// label exactly once with exactly one blank.
///
/// # Examples
/// ```
/// use npuzzle_solver::utils::board_from_str;
///
/// let board = board_from_str("1 2 3\n4 . 5\n7 8 6").unwrap();
/// assert_eq!(board.dimension(), (3, 3));
/// assert_eq!(board.blank(), (1, 1));
///
/// assert!(board_from_str("1 2\n3").is_err());
/// ```
pub fn board_from_str(s: &str) -> Result<Board, String> {
    let rows: Vec<&str> = s.lines().filter(|line| !line.trim().is_empty()).collect();
    if rows.len() < 2 {
        return Err(format!("expected at least 2 rows, found {}", rows.len()));
    }

    let mut labels: Vec<u16> = Vec::new();
    let mut cols = 0;
    for (r, row) in rows.iter().enumerate() {
        let cells: Vec<&str> = row.split_whitespace().collect();
        if r == 0 {
            cols = cells.len();
            if cols < 2 {
                return Err(format!("expected at least 2 columns, found {}", cols));
            }
        } else if cells.len() != cols {
            return Err(format!(
                "row {} has {} cells (expected {})",
                r,
                cells.len(),
                cols
            ));
        }
        for cell in cells {
            if cell == "." || cell == "0" {
                labels.push(BLANK);
            } else {
                let label: u16 = cell
                    .parse()
                    .map_err(|_| format!("unrecognized cell '{}' in row {}", cell, r))?;
                labels.push(label);
            }
        }
    }

    let count = labels.len();
    let mut seen = vec![false; count];
    for &label in &labels {
        let slot = label as usize;
        if slot >= count {
            return Err(format!(
                "label {} is out of range for a {}x{} board",
                label,
                rows.len(),
                cols
            ));
        }
        if seen[slot] {
            if label == BLANK {
                return Err("more than one blank cell".to_string());
            }
            return Err(format!("duplicate label {}", label));
        }
        seen[slot] = true;
    }
    if !seen[BLANK as usize] {
        return Err("missing blank cell (write it as '.' or '0')".to_string());
    }
    // All slots 0..count seen exactly once: a permutation of
    // {1, ..., count-1} plus the blank.

    Ok(Board::from_grid(rows.len(), cols, labels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_board() {
        let board = board_from_str("1 2 3\n4 5 6\n7 8 .").unwrap();
        assert!(board.is_goal());
        assert_eq!(board.dimension(), (3, 3));
    }

    #[test]
    fn test_parse_rectangular_board_with_zero_blank() {
        let board = board_from_str("5 1 2 3\n4 0 6 7\n8 9 10 11").unwrap();
        assert_eq!(board.dimension(), (3, 4));
        assert_eq!(board.blank(), (1, 1));
        assert_eq!(board.get(0, 0), 5);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let board = board_from_str("\n1 2\n3 .\n\n").unwrap();
        assert_eq!(board.dimension(), (2, 2));
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let err = board_from_str("1 2 3\n4 5\n6 7 8").unwrap_err();
        assert!(err.contains("row 1 has 2 cells"), "{}", err);
    }

    #[test]
    fn test_parse_rejects_bad_token() {
        let err = board_from_str("1 x\n2 3").unwrap_err();
        assert!(err.contains("unrecognized cell 'x'"), "{}", err);
    }

    #[test]
    fn test_parse_rejects_duplicate_label() {
        let err = board_from_str("1 1\n2 .").unwrap_err();
        assert!(err.contains("duplicate label 1"), "{}", err);
    }

    #[test]
    fn test_parse_rejects_missing_blank() {
        let err = board_from_str("1 2\n3 4").unwrap_err();
        assert!(err.contains("label 4 is out of range"), "{}", err);
    }

    #[test]
    fn test_parse_rejects_two_blanks() {
        let err = board_from_str("1 .\n2 .").unwrap_err();
        assert!(err.contains("more than one blank"), "{}", err);
    }

    #[test]
    fn test_parse_rejects_out_of_range_label() {
        let err = board_from_str("1 9\n2 .").unwrap_err();
        assert!(err.contains("out of range"), "{}", err);
    }

    #[test]
    fn test_parse_rejects_single_row() {
        assert!(board_from_str("1 2 3").is_err());
    }
}
