//! Overlay reveal - continuous-clock text decryption.
//!
//! Progress is a function of elapsed time since the first frame. Positions
//! left of the reveal count are final; the rest show stand-ins that are
//! re-drawn together in a single batch whenever `scramble_every_ms` has
//! elapsed since the previous batch. Between batches every position keeps its
//! cached stand-in, so the unrevealed tail flickers in sync rather than on
//! every frame.
//!
//! # Example
//!
//! ```ignore
//! use decrypt_reveal::engine::{OverlayReveal, seeded_rng};
//!
//! let mut task = OverlayReveal::new("ACCESS GRANTED", 1200, 22, Default::default());
//! let mut rng = seeded_rng(7);
//! let first = task.frame(0.0, &mut rng);
//! let last = task.frame(1200.0, &mut rng);
//! assert_eq!(last.text, "ACCESS GRANTED");
//! ```

use rand::Rng;

use super::scramble::{is_literal, random_char};
use crate::types::{Charset, Frame};

/// State of one overlay reveal.
///
/// Owns its scramble cache exclusively; nothing else reads or writes it.
#[derive(Clone, Debug)]
pub struct OverlayReveal {
    source: String,
    chars: Vec<char>,
    charset: Charset,
    duration_ms: f64,
    scramble_every_ms: f64,
    /// Last stand-in drawn per position (final char once revealed).
    cache: Vec<Option<char>>,
    start: Option<f64>,
    last_scramble: f64,
    revealed: usize,
    scramble_batches: usize,
    finished: bool,
}

impl OverlayReveal {
    /// Create a task revealing `text` over `duration_ms`.
    pub fn new(text: &str, duration_ms: u64, scramble_every_ms: u64, charset: Charset) -> Self {
        let chars: Vec<char> = text.chars().collect();
        Self {
            source: text.to_string(),
            cache: vec![None; chars.len()],
            chars,
            charset,
            duration_ms: duration_ms as f64,
            scramble_every_ms: scramble_every_ms as f64,
            start: None,
            last_scramble: 0.0,
            revealed: 0,
            scramble_batches: 0,
            finished: false,
        }
    }

    /// Render the frame for host time `now` (milliseconds).
    ///
    /// The first call fixes the start time. Once progress reaches 1 the
    /// returned frame carries the exact source text and `done` is set.
    pub fn frame<R: Rng + ?Sized>(&mut self, now: f64, rng: &mut R) -> Frame {
        if self.finished {
            return self.final_frame();
        }

        let start = match self.start {
            Some(start) => start,
            None => {
                self.start = Some(now);
                // First frame always fills the cache as a batch
                self.last_scramble = now - self.scramble_every_ms;
                now
            }
        };

        let progress = self.progress_at(now - start);
        let len = self.chars.len();
        let count = ((progress * len as f64).floor() as usize).min(len);
        self.revealed = self.revealed.max(count);

        let batch = now - self.last_scramble >= self.scramble_every_ms;

        let mut text = String::with_capacity(self.source.len());
        for (i, &ch) in self.chars.iter().enumerate() {
            if i < self.revealed || is_literal(ch) {
                self.cache[i] = Some(ch);
                text.push(ch);
                continue;
            }

            let shown = match self.cache[i] {
                Some(cached) if !batch => cached,
                _ => {
                    let fresh = random_char(&self.charset, rng);
                    self.cache[i] = Some(fresh);
                    fresh
                }
            };
            text.push(shown);
        }

        if batch {
            self.last_scramble = now;
            self.scramble_batches += 1;
        }

        if progress >= 1.0 {
            self.finished = true;
            return self.final_frame();
        }

        Frame { text, done: false }
    }

    fn progress_at(&self, elapsed: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (elapsed / self.duration_ms).clamp(0.0, 1.0)
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

    /// Number of leading positions that are final.
    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    /// Number of batch re-scrambles so far, including the initial fill.
    pub fn scramble_batches(&self) -> usize {
        self.scramble_batches
    }

    /// True once the final frame has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

// =============================================================================
// Tests
// =============================================================================
