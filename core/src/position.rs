use std::fmt;

/// Position in a VC source text. Lines and columns start at 1.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[line={}, col={}]", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl Position {
    /// Start of a file.
    pub const START: Position = Position { line: 1, col: 1 };

    /// Move right by `n` columns.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.col += n;
    }

    /// Go to the beginning of the next line.
    #[inline]
    pub fn newline(&mut self) {
        self.line += 1;
        self.col = 1;
    }
}
