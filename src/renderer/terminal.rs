//! Terminal renderer for documents.
//!
//! Draws every rendered element with text as one terminal line, in document
//! order. Like a diff renderer, it keeps the previous frame's lines and only
//! rewrites lines that changed; each frame is wrapped in a synchronized
//! update so a scramble frame never tears.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{
    BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate, EnterAlternateScreen,
    LeaveAlternateScreen,
};

use crate::dom::Document;

/// Lines to display: text of rendered, non-empty elements in document order.
pub fn visible_lines(doc: &Document) -> Vec<String> {
    doc.elements()
        .iter()
        .filter(|el| doc.is_rendered(el.node_id()))
        .map(|el| el.text())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Line-diffing renderer over any writer.
pub struct TerminalRenderer<W: Write> {
    out: W,
    previous: Vec<String>,
}

impl TerminalRenderer<io::Stdout> {
    /// Renderer writing to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            previous: Vec::new(),
        }
    }

    /// Draw the document, rewriting only changed lines.
    ///
    /// Returns true if anything was written.
    pub fn render(&mut self, doc: &Document) -> io::Result<bool> {
        self.render_lines(visible_lines(doc))
    }

    /// Draw precomputed lines, rewriting only changed ones.
    pub fn render_lines(&mut self, lines: Vec<String>) -> io::Result<bool> {
        let mut changed = false;

        queue!(self.out, BeginSynchronizedUpdate)?;

        for (y, line) in lines.iter().enumerate() {
            if self.previous.get(y) == Some(line) {
                continue;
            }
            changed = true;
            queue!(
                self.out,
                MoveTo(0, row(y)),
                Clear(ClearType::CurrentLine),
                Print(line)
            )?;
        }

        // Clear rows left over from a longer previous frame
        for y in lines.len()..self.previous.len() {
            changed = true;
            queue!(self.out, MoveTo(0, row(y)), Clear(ClearType::CurrentLine))?;
        }

        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()?;

        self.previous = lines;
        Ok(changed)
    }

    /// Forget the previous frame; the next render redraws everything.
    pub fn invalidate(&mut self) {
        self.previous.clear();
    }

    /// Check if we have a previous frame to diff against.
    pub fn has_previous(&self) -> bool {
        !self.previous.is_empty()
    }

    /// Switch to the alternate screen with a hidden cursor.
    pub fn enter_fullscreen(&mut self) -> io::Result<()> {
        queue!(self.out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        self.out.flush()?;
        self.invalidate();
        Ok(())
    }

    /// Restore the main screen and cursor.
    pub fn exit_fullscreen(&mut self) -> io::Result<()> {
        queue!(self.out, Show, LeaveAlternateScreen)?;
        self.out.flush()
    }

    /// The underlying writer.
    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Consume the renderer and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

fn row(y: usize) -> u16 {
    u16::try_from(y).unwrap_or(u16::MAX)
}

// =============================================================================
// Tests
// =============================================================================
