use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A line-and-column pair. Lines are 1-based, columns are 0-based byte
/// offsets from the start of the line.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
pub struct LinePosition {
    /// The line number.
    pub line: usize,
    /// The byte-offset, from the start of the line.
    pub column: usize,
}

impl LinePosition {
    pub fn new(line: usize, column: usize) -> LinePosition {
        LinePosition { line, column }
    }

    /// The position of the first non-blank character of `text`, which is the
    /// content of line `line`.
    pub fn first_non_blank(line: usize, text: &str) -> LinePosition {
        let column = text.len() - text.trim_start().len();
        LinePosition::new(line, column)
    }
}

impl Display for LinePosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_order_by_line_then_column() {
        let mut xs = vec![
            LinePosition::new(2, 0),
            LinePosition::new(1, 7),
            LinePosition::new(1, 3),
        ];
        xs.sort();
        assert_eq!(
            xs,
            vec![
                LinePosition::new(1, 3),
                LinePosition::new(1, 7),
                LinePosition::new(2, 0)
            ]
        );
    }

    #[test]
    fn test_first_non_blank() {
        assert_eq!(LinePosition::first_non_blank(4, "   @f 1"), LinePosition::new(4, 3));
        assert_eq!(LinePosition::first_non_blank(1, "x"), LinePosition::new(1, 0));
        assert_eq!(LinePosition::new(3, 9).to_string(), "3|9");
    }
}
