//! Styled terminal output that never leaves a style switched on.
//!
//! Functions should take the raw writer and wrap it in their own
//! `ColorOutput` for as long as they write.
//!
//! NOT thread-safe.
use std::io::{self, Write};
use termcolor::{Color, ColorSpec, WriteColor};

/// Plain writes pass straight through. Styled pieces reset the terminal right
/// after themselves, and dropping the output resets it once more.
pub struct ColorOutput<'a> {
    writer: &'a mut dyn WriteColor,
}

impl<'a> ColorOutput<'a> {
    pub fn new(writer: &'a mut dyn WriteColor) -> Self {
        writer.reset().ok();
        Self { writer }
    }

    /// Write `text` in the foreground `color`.
    pub fn styled(&mut self, text: &str, color: Color, bold: bool) -> io::Result<()> {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color)).set_bold(bold);

        // a writer that cannot color still gets the text
        self.writer.set_color(&spec).ok();
        let written = self.writer.write_all(text.as_bytes());
        self.writer.reset().ok();
        written
    }
}

impl Write for ColorOutput<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for ColorOutput<'_> {
    fn drop(&mut self) {
        self.writer.reset().ok();
    }
}
