//! Core types shared by the reveal engines, controllers and renderer.
//!
//! Defaults mirror the markup contract: every option can be overridden by an
//! attribute on the document root (overlay) or on the animated element
//! (inline), and falls back to the constants below.

use std::fmt;

// =============================================================================
// Defaults
// =============================================================================

/// Default pool of stand-in characters for unrevealed positions.
pub const DEFAULT_CHARSET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_+-={}[]|:;\"',.<>/?~`";

/// Text revealed by the overlay when the root carries no override.
pub const DEFAULT_OVERLAY_TEXT: &str = "ACCESS GRANTED";

/// Overlay animation length.
pub const DEFAULT_OVERLAY_DURATION_MS: u64 = 1200;

/// Overlay batch re-scramble cadence.
pub const DEFAULT_SCRAMBLE_EVERY_MS: u64 = 22;

/// Inline tick interval.
pub const DEFAULT_STEP_DELAY_MS: u64 = 30;

/// Inline hold before the first tick.
pub const DEFAULT_START_DELAY_MS: u64 = 0;

/// Upper bound on how long inline animations wait for the overlay.
pub const OVERLAY_FALLBACK_MS: u64 = 2200;

/// Hold after the overlay's final frame before it resolves.
pub const OVERLAY_END_HOLD_MS: u64 = 10;

/// Frame cadence of the host loop (60 Hz).
pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

// =============================================================================
// Markup contract
// =============================================================================

/// DOM id of the full-screen overlay container.
pub const OVERLAY_ID: &str = "decrypt-overlay";

/// DOM id of the overlay's text node.
pub const OVERLAY_TEXT_ID: &str = "decrypt-overlay-text";

/// Marker attribute for inline reveal elements.
pub const DECRYPT_ATTR: &str = "data-decrypt";

/// Class that hides an element.
pub const HIDDEN_CLASS: &str = "hidden";

// =============================================================================
// Identity
// =============================================================================

/// Index of an element inside a [`Document`](crate::dom::Document).
///
/// Elements are never removed, so an id stays valid for the document's
/// lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Charset
// =============================================================================

/// Non-empty pool of substitute characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Charset {
    chars: Vec<char>,
}

impl Charset {
    /// Build a charset from a string.
    ///
    /// An empty string yields the default charset.
    pub fn new(pool: &str) -> Self {
        if pool.is_empty() {
            return Self::default();
        }
        Self {
            chars: pool.chars().collect(),
        }
    }

    /// Number of characters in the pool.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// True if the pool has no characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The pool, in order.
    pub fn as_slice(&self) -> &[char] {
        &self.chars
    }

    /// Character at `index`.
    pub fn get(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// Check whether `ch` belongs to the pool.
    pub fn contains(&self, ch: char) -> bool {
        self.chars.contains(&ch)
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self {
            chars: DEFAULT_CHARSET.chars().collect(),
        }
    }
}

impl From<&str> for Charset {
    fn from(pool: &str) -> Self {
        Self::new(pool)
    }
}

// =============================================================================
// Frames and outcomes
// =============================================================================

/// One rendered frame of a reveal task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Text to write into the target node.
    pub text: String,
    /// True once the task has rendered its final text.
    pub done: bool,
}

/// Why a controller declined to animate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The required markup is absent from the document.
    MissingMarkup,
    /// The element was already initialised.
    AlreadyInitialized,
}

/// Result of starting a reveal on a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// An animation was scheduled on the host loop.
    Started,
    /// Reduced motion: the final text was written without animating.
    RenderedFinal,
    /// Reduced motion: nothing was rendered at all.
    Suppressed,
    /// Nothing happened.
    Skipped(SkipReason),
}

/// Cleanup function returned by subscriptions.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_charset_falls_back_to_default() {
        let charset = Charset::new("");
        assert_eq!(charset, Charset::default());
        assert_eq!(charset.len(), DEFAULT_CHARSET.chars().count());
    }

    #[test]
    fn test_charset_keeps_unicode_scalars() {
        let charset = Charset::from("ア01");
        assert_eq!(charset.len(), 3);
        assert_eq!(charset.get(0), Some('ア'));
        assert!(charset.contains('1'));
        assert!(!charset.contains('A'));
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(7).to_string(), "#7");
    }
}
