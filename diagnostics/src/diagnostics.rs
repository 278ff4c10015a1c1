//! The diagnostics object controls how errors found during semantic analysis
//! are shown to the user. It also counts them, so the caller can pick an
//! exit code.
//!
//! This implementation is NOT thread-safe.
use ast::{Line, Located};
use failure::Fail;
use std::{
    cell::{Cell, RefCell},
    io::{self, Write},
};
use termcolor::{Color, WriteColor};
use utils::color::ColorOutput;

/// Instead of writing errors directly to stdout, they are routed through
/// this object, which is the single place responsible for their format.
pub struct Diagnostics {
    error_count: Cell<usize>,
    writer: RefCell<Box<dyn WriteColor>>,
}

impl Diagnostics {
    pub fn new(writer: Box<dyn WriteColor>) -> Self {
        Self {
            error_count: Cell::new(0),
            writer: RefCell::new(writer),
        }
    }

    /// True when at least one error was emitted.
    pub fn errored(&self) -> bool {
        self.count() > 0
    }

    pub fn count(&self) -> usize {
        self.error_count.get()
    }

    /// Print `error` as `Error in line <line> : <message>`.
    pub fn error<E>(&self, error: &Located<E>)
    where
        E: Fail,
    {
        let msg = Message {
            line: Some(error.line),
            kind: &error.data,
        };
        self.emit(&msg);
    }

    /// Print an error that is not tied to a line of the program.
    pub fn error_without_line(&self, error: &dyn Fail) {
        self.emit(&Message {
            line: None,
            kind: error,
        });
    }

    fn emit(&self, msg: &Message<'_>) {
        let mut writer = self.writer.borrow_mut();
        // a diagnostic that cannot be written has nowhere else to go
        msg.write_colored(&mut **writer).ok();
        writer.flush().ok();
        self.error_count.set(self.error_count.get() + 1);
    }
}

struct Message<'a> {
    line: Option<Line>,
    kind: &'a dyn Fail,
}

impl Message<'_> {
    fn write_colored(&self, writer: &mut dyn WriteColor) -> io::Result<()> {
        let mut output = ColorOutput::new(writer);
        output.styled("Error", Color::Red, true)?;

        match self.line {
            Some(line) => writeln!(output, " in line {} : {}", line, self.kind)?,
            None => writeln!(output, " : {}", self.kind)?,
        }

        for cause in self.kind.iter_causes() {
            writeln!(output, "  caused by: {}", cause)?;
        }
        Ok(())
    }
}
