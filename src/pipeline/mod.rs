//! Pipeline Module - host loop and page boot.
//!
//! - [`host`] - Single-threaded frame/timer loop (offline or realtime clock)
//! - [`boot`] - Page-ready wiring: overlay first, inline after completion or
//!   fallback timeout

pub mod boot;
pub mod host;

pub use boot::{BootReport, Page};
pub use host::{FrameCallback, HostEvent, HostLoop, HostMode, TimerCallback};
