//! Renderer - draws document text to a terminal.
//!
//! - `terminal` - line-diffing renderer over any writer
//! - `live` - render effect that redraws when the document changes

mod live;
mod terminal;

pub use live::*;
pub use terminal::*;
