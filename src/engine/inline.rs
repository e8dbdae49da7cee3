//! Inline reveal - discrete-tick text decryption.
//!
//! Every position has its own reveal step, spread evenly over
//! `max(10, 2 * len)` ticks so that the text resolves left to right.
//! Unrevealed positions draw a fresh stand-in on every tick; nothing is
//! cached between ticks.

use rand::Rng;

use super::scramble::{is_literal, random_char};
use crate::types::{Charset, Frame};

/// Minimum number of ticks for any text, however short.
pub const MIN_TOTAL_STEPS: usize = 10;

/// Number of ticks before a text of `len` characters is fully revealed.
pub fn total_steps(len: usize) -> usize {
    MIN_TOTAL_STEPS.max(len * 2)
}

/// Tick at which position `index` shows its final character.
///
/// `floor((index + 1) / len * total)`, evaluated in integers so the last
/// position always lands exactly on `total`.
pub fn reveal_at_step(index: usize, len: usize, total: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index + 1) * total / len
}

/// Render `chars` as they appear at tick `step`.
pub fn render_step<R: Rng + ?Sized>(
    chars: &[char],
    step: usize,
    total: usize,
    charset: &Charset,
    rng: &mut R,
) -> String {
    let len = chars.len();
    chars
        .iter()
        .enumerate()
        .map(|(index, &ch)| {
            if step >= reveal_at_step(index, len, total) || is_literal(ch) {
                ch
            } else {
                random_char(charset, rng)
            }
        })
        .collect()
}

/// State of one inline reveal.
#[derive(Clone, Debug)]
pub struct InlineReveal {
    source: String,
    chars: Vec<char>,
    charset: Charset,
    total_steps: usize,
    step: usize,
    finished: bool,
}

impl InlineReveal {
    /// Create a task for `text`. An empty text is finished from the start.
    pub fn new(text: &str, charset: Charset) -> Self {
        let chars: Vec<char> = text.chars().collect();
        Self {
            source: text.to_string(),
            total_steps: total_steps(chars.len()),
            finished: chars.is_empty(),
            chars,
            charset,
            step: 0,
        }
    }

    /// Advance one tick and return the frame to display.
    ///
    /// The tick that pushes the step past `total_steps` returns the exact
    /// source text with `done` set.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Frame {
        if self.finished {
            return self.final_frame();
        }

        let text = render_step(&self.chars, self.step, self.total_steps, &self.charset, rng);
        self.step += 1;

        if self.step > self.total_steps {
            self.finished = true;
            return self.final_frame();
        }

        Frame { text, done: false }
    }

    fn final_frame(&self) -> Frame {
        Frame {
            text: self.source.clone(),
            done: true,
        }
    }

    /// Text being revealed.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Ticks rendered so far.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Tick count after which the task finishes.
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// True once the final frame has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

// =============================================================================
// Tests
// =============================================================================
