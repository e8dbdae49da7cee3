//! State Module - Runtime state shared between controllers
//!
//! - **Motion** - Reduced-motion preference query
//! - **Completion** - One-shot overlay completion signal

pub mod completion;
pub mod motion;

pub use completion::*;
pub use motion::*;
