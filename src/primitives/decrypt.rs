//! Decrypt Primitive - inline reveal for `[data-decrypt]` elements.
//!
//! Each matched element gets its own [`InlineReveal`] and random source,
//! driven by fixed-delay timers: the first tick after `data-delay`, then one
//! every `data-speed` milliseconds.
//!
//! The controller remembers which elements it has initialised; asking it to
//! initialise an element twice is a no-op, so re-scanning a document after a
//! partial content swap only picks up new elements.
//!
//! # Example
//!
//! ```ignore
//! let mut decrypt = DecryptController::new(doc, host, motion, Settings::default(), rng);
//! decrypt.init_all();
//! host.run_until_idle();
//! ```

use std::collections::HashSet;
use std::rc::Rc;

use crate::config::{InlineOptions, Settings};
use crate::dom::{Document, Element};
use crate::engine::inline::InlineReveal;
use crate::engine::scramble::{fork_rng, ScrambleRng};
use crate::pipeline::host::HostLoop;
use crate::state::motion::{reduced_motion, MotionQuery};
use crate::types::{NodeId, RevealOutcome, SkipReason, DECRYPT_ATTR};

/// Starts inline reveals and guards against double initialisation.
pub struct DecryptController {
    document: Rc<Document>,
    host: HostLoop,
    motion: Rc<dyn MotionQuery>,
    settings: Settings,
    rng: ScrambleRng,
    initialized: HashSet<NodeId>,
}

impl DecryptController {
    pub fn new(
        document: Rc<Document>,
        host: HostLoop,
        motion: Rc<dyn MotionQuery>,
        settings: Settings,
        rng: ScrambleRng,
    ) -> Self {
        Self {
            document,
            host,
            motion,
            settings,
            rng,
            initialized: HashSet::new(),
        }
    }

    /// Initialise every `[data-decrypt]` element in the document.
    pub fn init_all(&mut self) -> Vec<(NodeId, RevealOutcome)> {
        let elements = self.document.query_attribute(DECRYPT_ATTR);
        self.init_elements(elements)
    }

    /// Initialise the `[data-decrypt]` descendants of `root`.
    pub fn init_within(&mut self, root: NodeId) -> Vec<(NodeId, RevealOutcome)> {
        let elements = self.document.query_attribute_within(root, DECRYPT_ATTR);
        self.init_elements(elements)
    }

    fn init_elements(&mut self, elements: Vec<Element>) -> Vec<(NodeId, RevealOutcome)> {
        if elements.is_empty() {
            return Vec::new();
        }
        let reduce = reduced_motion(self.motion.as_ref());
        elements
            .iter()
            .map(|el| (el.node_id(), self.start(el, reduce)))
            .collect()
    }

    /// Initialise a single element.
    pub fn init_element(&mut self, el: &Element) -> RevealOutcome {
        let reduce = reduced_motion(self.motion.as_ref());
        self.start(el, reduce)
    }

    fn start(&mut self, el: &Element, reduce: bool) -> RevealOutcome {
        if !self.initialized.insert(el.node_id()) {
            return RevealOutcome::Skipped(SkipReason::AlreadyInitialized);
        }

        let options = InlineOptions::resolve(el, &self.settings);

        if reduce {
            el.set_text(&options.text);
            return RevealOutcome::RenderedFinal;
        }

        let task = InlineReveal::new(&options.text, options.charset);
        if task.is_finished() {
            el.set_text(&options.text);
            return RevealOutcome::RenderedFinal;
        }

        log::debug!(
            "inline reveal on {} ({} steps, {}ms/step, {}ms delay)",
            el.node_id(),
            task.total_steps(),
            options.step_delay_ms,
            options.start_delay_ms
        );

        let run = InlineRun {
            task,
            rng: fork_rng(&mut self.rng),
            target: el.clone(),
            step_delay_ms: options.step_delay_ms,
        };
        schedule_tick(&self.host, options.start_delay_ms, run);
        RevealOutcome::Started
    }

    /// True if `node` was already initialised.
    pub fn is_initialized(&self, node: NodeId) -> bool {
        self.initialized.contains(&node)
    }

    /// Number of initialised elements.
    pub fn initialized_count(&self) -> usize {
        self.initialized.len()
    }
}

struct InlineRun {
    task: InlineReveal,
    rng: ScrambleRng,
    target: Element,
    step_delay_ms: u64,
}

fn schedule_tick(host: &HostLoop, delay_ms: u64, mut run: InlineRun) {
    host.set_timeout(delay_ms, move |host| {
        let frame = run.task.tick(&mut run.rng);
        run.target.set_text(&frame.text);

        if !frame.done {
            let delay = run.step_delay_ms;
            schedule_tick(host, delay, run);
        }
    });
}

// =============================================================================
// Tests
// =============================================================================
