use once_cell::unsync::OnceCell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// A source location: file path, 1-based line, 1-based column.
///
/// Ordered lexicographically by `(file, line, column)` so that furthest-error
/// comparisons and test assertions behave the way a reader expects. Never
/// mutated once constructed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub file: Rc<str>,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(file: Rc<str>, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// The input text paired with lazily-computed line-break offsets.
///
/// Positions are derived on demand from a byte offset by locating the
/// offset among the cached newline positions with a binary search, so
/// repeated diagnostics over the same source don't re-scan the text.
pub struct Code<'c> {
    pub text: &'c str,
    file: Rc<str>,
    line_breaks: OnceCell<Vec<usize>>,
}

impl<'c> Code<'c> {
    pub fn new(text: &'c str, file: Rc<str>) -> Self {
        Self {
            text,
            file,
            line_breaks: OnceCell::new(),
        }
    }

    pub fn file(&self) -> Rc<str> {
        self.file.clone()
    }

    fn line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.text
                .bytes()
                .enumerate()
                .filter_map(|(i, b)| if b == b'\n' { Some(i) } else { None })
                .collect()
        })
    }

    /// Compute the `Position` of a byte offset into `self.text`.
    ///
    /// `line = 1 + count('\n', text[..offset])`; `column` is the distance
    /// from the offset back to the preceding newline (or the start of the
    /// input), both 1-based.
    pub fn position_at(&self, offset: usize) -> Position {
        let breaks = self.line_breaks();
        let index = match breaks.binary_search(&offset) {
            Ok(i) | Err(i) => i,
        };

        let (line, column) = if index == 0 {
            (1, offset + 1)
        } else {
            let last_break = breaks[index - 1];
            (index + 1, offset - last_break)
        };

        Position::new(self.file.clone(), line, column)
    }

    /// Render the source line containing `position` with a caret pointing
    /// at the column. Handy for library consumers rendering diagnostics;
    /// not part of any CLI.
    pub fn context(&self, position: &Position) -> String {
        let line_text = self.text.split('\n').nth(position.line - 1).unwrap_or("");
        format!("{}\n{}^\n", line_text, " ".repeat(position.column - 1))
    }
}
