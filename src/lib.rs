//! # decrypt-reveal
//!
//! Decrypt-style text reveal animations.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals): element
//! text, classes and the element list are signals, and the terminal renderer
//! is a single effect over them.
//!
//! ## Architecture
//!
//! Two reveal engines, coordinated at page ready:
//!
//! ```text
//! Page::boot ─► OverlayController ─► OverlayReveal (frame callbacks)
//!          │                              │
//!          │                      CompletionSignal ──┐
//!          │                                         ▼
//!          └─► fallback timer (2200ms) ─► DecryptController ─► InlineReveal (timers)
//! ```
//!
//! Everything runs on a single-threaded [`HostLoop`] with a virtual clock
//! (tests) or the wall clock (terminal demos).
//!
//! ## Modules
//!
//! - [`types`] - Defaults, markup names, `Charset`, `Frame`, outcomes
//! - [`engine`] - Pure overlay and inline reveal state machines
//! - [`dom`] - Minimal document model the controllers read and write
//! - [`config`] - Attribute parsing and the JSON settings file
//! - [`state`] - Reduced-motion query and the completion signal
//! - [`primitives`] - Overlay and inline controllers
//! - [`pipeline`] - Host loop and page boot
//! - [`renderer`] - Terminal output and the render effect

pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{load_settings, parse_settings, InlineOptions, OverlayOptions, Settings};

pub use dom::{Document, Element, ElementSpec};

pub use engine::{
    entropy_rng, fork_rng, random_char, reveal_at_step, seeded_rng, total_steps, InlineReveal,
    OverlayReveal, ScrambleRng,
};

pub use error::{AttributeError, ConfigError, MotionQueryError};

pub use pipeline::{BootReport, HostEvent, HostLoop, HostMode, Page};

pub use primitives::{DecryptController, OverlayController};

pub use renderer::{mount, visible_lines, LiveRender, TerminalRenderer};

pub use state::{
    reduced_motion, CompletionSignal, EnvMotion, MotionPreference, MotionQuery,
    REDUCED_MOTION_ENV,
};
