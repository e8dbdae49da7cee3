//! Completion Signal - one-shot "overlay finished" notification.
//!
//! Fires at most once. Any number of listeners can subscribe; each runs
//! exactly once, in subscription order, when the signal fires. A listener
//! added after the signal fired runs immediately, so late subscribers can
//! never miss it.
//!
//! # Example
//!
//! ```ignore
//! use decrypt_reveal::state::completion::CompletionSignal;
//!
//! let done = CompletionSignal::new();
//! let unsubscribe = done.on_complete(|| println!("overlay finished"));
//! done.fire();
//! unsubscribe(); // no-op after firing
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::Cleanup;

/// Listener run when the signal fires.
pub type CompletionListener = Box<dyn FnOnce()>;

struct CompletionState {
    fired: bool,
    listeners: Vec<(usize, CompletionListener)>,
    next_id: usize,
}

/// Shared one-shot completion signal. Clones observe the same state.
#[derive(Clone)]
pub struct CompletionSignal {
    state: Rc<RefCell<CompletionState>>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(CompletionState {
                fired: false,
                listeners: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Subscribe a listener.
    ///
    /// Returns an unsubscribe function. If the signal already fired the
    /// listener runs before this returns and the unsubscribe is a no-op.
    pub fn on_complete(&self, listener: impl FnOnce() + 'static) -> Cleanup {
        let mut state = self.state.borrow_mut();
        if state.fired {
            // Release the borrow first; the listener may subscribe again
            drop(state);
            listener();
            return Box::new(|| {});
        }

        let id = state.next_id;
        state.next_id += 1;
        state.listeners.push((id, Box::new(listener)));
        drop(state);

        let state = Rc::downgrade(&self.state);
        Box::new(move || {
            if let Some(state) = state.upgrade() {
                state.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
            }
        })
    }

    /// Fire the signal.
    ///
    /// Returns true if this call fired it, false if it had already fired.
    pub fn fire(&self) -> bool {
        let listeners = {
            let mut state = self.state.borrow_mut();
            if state.fired {
                return false;
            }
            state.fired = true;
            std::mem::take(&mut state.listeners)
        };

        log::debug!("completion signal fired ({} listeners)", listeners.len());

        for (_, listener) in listeners {
            listener();
        }
        true
    }

    /// True once fired.
    pub fn is_fired(&self) -> bool {
        self.state.borrow().fired
    }

    /// Number of listeners still waiting.
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
