//! Reveal Engine - the two decrypt animations as pure state machines.
//!
//! Neither engine touches the document or the clock. The controllers in
//! [`primitives`](crate::primitives) feed them host time (overlay) or ticks
//! (inline) and write the returned frames into the document:
//!
//! ```text
//! OverlayReveal::frame(now)  ->  Frame { text, done }   (frame callbacks)
//! InlineReveal::tick()       ->  Frame { text, done }   (fixed-delay timers)
//! ```
//!
//! Each task owns its source, charset and scramble state; tasks never share
//! anything.

pub mod inline;
pub mod overlay;
pub mod scramble;

pub use inline::*;
pub use overlay::*;
pub use scramble::*;
