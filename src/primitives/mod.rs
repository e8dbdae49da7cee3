//! Primitives - reveal controllers bound to document markup.
//!
//! - [`overlay`] - Full-screen overlay reveal (`#decrypt-overlay`)
//! - [`decrypt`] - Inline reveals (`[data-decrypt]`)

pub mod decrypt;
pub mod overlay;

pub use decrypt::DecryptController;
pub use overlay::OverlayController;
