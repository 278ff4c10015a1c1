use std::{fmt, ops::Deref};

/// 1-based source line. Synthesized nodes reuse the line of the node that
/// caused them.
pub type Line = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    pub line: Line,
    pub data: T,
}

impl<T> Located<T> {
    pub fn new(line: Line, data: T) -> Self {
        Located { line, data }
    }
}

impl<T> Deref for Located<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> fmt::Display for Located<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}", self.data, self.line)
    }
}
