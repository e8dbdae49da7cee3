//! Host Loop - single-threaded frame and timer scheduling.
//!
//! Two suspension mechanisms, kept distinct:
//!
//! - **Frames** (`request_frame`): callbacks queued before a frame boundary
//!   all run at that boundary, in request order, and receive the frame time.
//!   Boundaries fall on multiples of the frame interval. A callback that
//!   requests another frame lands on the next boundary.
//! - **Timers** (`set_timeout`): due at `now + delay`; equal due times run in
//!   scheduling order. When a timer and a frame are due at the same instant
//!   the timer runs first.
//!
//! # Modes
//!
//! - `Offline`: virtual clock. `step`, `run_until` and `run_until_idle` jump
//!   straight to the next due event. Deterministic; used by tests.
//! - `Realtime`: wall clock. `step` sleeps until the next event is due.
//!
//! Callbacks are removed from the queues before they run, so they may
//! schedule more work on the same loop.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use crate::types::DEFAULT_FRAME_INTERVAL_MS;

/// Callback run at a frame boundary with the frame time in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(&HostLoop, f64)>;

/// Callback run when a timer is due.
pub type TimerCallback = Box<dyn FnOnce(&HostLoop)>;

/// Clock driving the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostMode {
    Offline,
    Realtime,
}

/// Kind of event executed by [`HostLoop::step`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    Timer { at: f64 },
    Frame { at: f64, callbacks: usize },
}

impl HostEvent {
    /// Time at which the event ran.
    pub fn at(&self) -> f64 {
        match *self {
            HostEvent::Timer { at } | HostEvent::Frame { at, .. } => at,
        }
    }
}

// =============================================================================
// Timer queue
// =============================================================================

#[derive(Clone, Copy, Debug)]
struct TimerEntry {
    due: f64,
    seq: u64,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    // Reversed: BinaryHeap is a max-heap, we pop the earliest
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

// =============================================================================
// Host state
// =============================================================================

/// Next event picked by `HostState::next_due`; frames carry their boundary index.
#[derive(Clone, Copy, Debug)]
enum Due {
    Timer,
    Frame(u64),
}

struct HostState {
    mode: HostMode,
    frame_interval: f64,
    virtual_now: f64,
    wall_anchor: Instant,
    seq: u64,
    timers: BinaryHeap<TimerEntry>,
    timer_callbacks: HashMap<u64, TimerCallback>,
    frames: Vec<FrameCallback>,
    last_frame: Option<u64>,
}

impl HostState {
    fn now(&self) -> f64 {
        match self.mode {
            HostMode::Offline => self.virtual_now,
            HostMode::Realtime => self.wall_anchor.elapsed().as_secs_f64() * 1000.0,
        }
    }

    fn next_frame_index(&self) -> u64 {
        let aligned = (self.now() / self.frame_interval).ceil().max(0.0) as u64;
        match self.last_frame {
            Some(last) => aligned.max(last + 1),
            None => aligned,
        }
    }

    fn next_due(&self) -> Option<(f64, Due)> {
        let timer = self.timers.peek().map(|t| t.due);
        let frame = (!self.frames.is_empty()).then(|| self.next_frame_index());
        match (timer, frame) {
            (Some(t), Some(index)) if t <= index as f64 * self.frame_interval => {
                Some((t, Due::Timer))
            }
            (_, Some(index)) => Some((index as f64 * self.frame_interval, Due::Frame(index))),
            (Some(t), None) => Some((t, Due::Timer)),
            (None, None) => None,
        }
    }
}

// =============================================================================
// Host Loop
// =============================================================================

/// Cheap, clonable handle to a single-threaded event loop.
#[derive(Clone)]
pub struct HostLoop {
    state: Rc<RefCell<HostState>>,
}

impl HostLoop {
    pub fn new(mode: HostMode) -> Self {
        Self {
            state: Rc::new(RefCell::new(HostState {
                mode,
                frame_interval: DEFAULT_FRAME_INTERVAL_MS,
                virtual_now: 0.0,
                wall_anchor: Instant::now(),
                seq: 0,
                timers: BinaryHeap::new(),
                timer_callbacks: HashMap::new(),
                frames: Vec::new(),
                last_frame: None,
            })),
        }
    }

    /// Virtual-clock loop starting at t = 0.
    pub fn offline() -> Self {
        Self::new(HostMode::Offline)
    }

    /// Wall-clock loop starting now.
    pub fn realtime() -> Self {
        Self::new(HostMode::Realtime)
    }

    /// Change the frame interval. Non-positive values are ignored.
    pub fn with_frame_interval(self, interval_ms: f64) -> Self {
        self.set_frame_interval(interval_ms);
        self
    }

    /// Change the frame interval on a shared handle. Non-positive values are
    /// ignored. Boundaries already passed are not revisited.
    pub fn set_frame_interval(&self, interval_ms: f64) {
        if interval_ms > 0.0 && interval_ms.is_finite() {
            let mut state = self.state.borrow_mut();
            if state.frame_interval != interval_ms {
                state.frame_interval = interval_ms;
                // Indices are relative to the interval
                state.last_frame = None;
            }
        }
    }

    pub fn mode(&self) -> HostMode {
        self.state.borrow().mode
    }

    pub fn frame_interval(&self) -> f64 {
        self.state.borrow().frame_interval
    }

    /// Current loop time in milliseconds.
    pub fn now(&self) -> f64 {
        self.state.borrow().now()
    }

    /// Run `callback` at the next frame boundary.
    pub fn request_frame(&self, callback: impl FnOnce(&HostLoop, f64) + 'static) {
        self.state.borrow_mut().frames.push(Box::new(callback));
    }

    /// Run `callback` once `delay_ms` have elapsed.
    pub fn set_timeout(&self, delay_ms: u64, callback: impl FnOnce(&HostLoop) + 'static) {
        let mut state = self.state.borrow_mut();
        let seq = state.seq;
        state.seq += 1;
        let due = state.now() + delay_ms as f64;
        state.timers.push(TimerEntry { due, seq });
        state.timer_callbacks.insert(seq, Box::new(callback));
    }

    /// Number of queued frame callbacks and timers.
    pub fn pending(&self) -> usize {
        let state = self.state.borrow();
        state.frames.len() + state.timers.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Time of the next due event, if any.
    pub fn next_due(&self) -> Option<f64> {
        self.state.borrow().next_due().map(|(due, _)| due)
    }

    /// Run the next due event, waiting for it if necessary.
    ///
    /// Returns `None` when nothing is scheduled.
    pub fn step(&self) -> Option<HostEvent> {
        let (due, kind) = self.state.borrow().next_due()?;
        self.wait_until(due);

        let Due::Frame(index) = kind else {
            let callback = {
                let mut state = self.state.borrow_mut();
                let entry = state.timers.pop()?;
                state.timer_callbacks.remove(&entry.seq)
            };
            if let Some(callback) = callback {
                callback(self);
            }
            return Some(HostEvent::Timer { at: due });
        };

        // The boundary was fixed before waiting; a late wake-up must not skip ahead
        let callbacks = {
            let mut state = self.state.borrow_mut();
            state.last_frame = Some(index);
            std::mem::take(&mut state.frames)
        };
        let count = callbacks.len();
        for callback in callbacks {
            callback(self, due);
        }
        Some(HostEvent::Frame {
            at: due,
            callbacks: count,
        })
    }

    /// Run every event due at or before `until_ms`.
    ///
    /// In offline mode the clock ends at `until_ms` even if nothing was due.
    pub fn run_until(&self, until_ms: f64) -> usize {
        let mut executed = 0;
        while self.next_due().is_some_and(|due| due <= until_ms) {
            if self.step().is_none() {
                break;
            }
            executed += 1;
        }
        let mut state = self.state.borrow_mut();
        if state.mode == HostMode::Offline && state.virtual_now < until_ms {
            state.virtual_now = until_ms;
        }
        executed
    }

    /// Run events until nothing is scheduled.
    pub fn run_until_idle(&self) -> usize {
        let mut executed = 0;
        while self.step().is_some() {
            executed += 1;
        }
        executed
    }

    fn wait_until(&self, due: f64) {
        let mut state = self.state.borrow_mut();
        let mode = state.mode;
        match mode {
            HostMode::Offline => {
                if due > state.virtual_now {
                    state.virtual_now = due;
                }
            }
            HostMode::Realtime => {
                let remaining = due - state.now();
                drop(state);
                if remaining > 0.0 {
                    thread::sleep(Duration::from_secs_f64(remaining / 1000.0));
                }
            }
        }
    }
}

impl Default for HostLoop {
    fn default() -> Self {
        Self::offline()
    }
}

// =============================================================================
// Tests
// =============================================================================
