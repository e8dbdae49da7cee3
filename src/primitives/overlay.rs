//! Overlay Primitive - full-screen decrypt reveal on page ready.
//!
//! Looks up the overlay container (`#decrypt-overlay`) and its text node
//! (`#decrypt-overlay-text`), shows the container, drives an
//! [`OverlayReveal`] on frame callbacks, then hides the container again and
//! fires the page's [`CompletionSignal`].
//!
//! With reduced motion the overlay is never shown and nothing is written;
//! the completion signal does not fire either (inline reveals fall back to
//! their timeout).

use std::rc::Rc;

use crate::config::{OverlayOptions, Settings};
use crate::dom::{Document, Element};
use crate::engine::overlay::OverlayReveal;
use crate::engine::scramble::{fork_rng, ScrambleRng};
use crate::pipeline::host::HostLoop;
use crate::state::completion::CompletionSignal;
use crate::state::motion::{reduced_motion, MotionQuery};
use crate::types::{
    RevealOutcome, SkipReason, HIDDEN_CLASS, OVERLAY_END_HOLD_MS, OVERLAY_ID, OVERLAY_TEXT_ID,
};

/// Runs the overlay reveal for one document.
pub struct OverlayController {
    document: Rc<Document>,
    host: HostLoop,
    motion: Rc<dyn MotionQuery>,
    completion: CompletionSignal,
    settings: Settings,
    rng: ScrambleRng,
    runs: usize,
}

impl OverlayController {
    pub fn new(
        document: Rc<Document>,
        host: HostLoop,
        motion: Rc<dyn MotionQuery>,
        completion: CompletionSignal,
        settings: Settings,
        rng: ScrambleRng,
    ) -> Self {
        Self {
            document,
            host,
            motion,
            completion,
            settings,
            rng,
            runs: 0,
        }
    }

    /// True if the document carries both overlay elements.
    pub fn has_markup(&self) -> bool {
        self.markup().is_some()
    }

    fn markup(&self) -> Option<(Element, Element)> {
        let overlay = self.document.get_element_by_id(OVERLAY_ID)?;
        let text = self.document.get_element_by_id(OVERLAY_TEXT_ID)?;
        Some((overlay, text))
    }

    /// Number of animations started by this controller.
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Start the overlay reveal.
    ///
    /// May be called again later to replay the overlay; the completion
    /// signal still fires only once per page.
    pub fn run(&mut self) -> RevealOutcome {
        let Some((overlay, text)) = self.markup() else {
            log::debug!("no overlay markup, skipping overlay reveal");
            return RevealOutcome::Skipped(SkipReason::MissingMarkup);
        };

        let options = OverlayOptions::resolve(&self.document, &self.settings);

        if reduced_motion(self.motion.as_ref()) {
            log::debug!("reduced motion, overlay stays hidden");
            return RevealOutcome::Suppressed;
        }

        overlay.remove_class(HIDDEN_CLASS);
        overlay.set_attribute("aria-hidden", "false");

        log::debug!(
            "overlay reveal of {} chars over {}ms",
            options.text.chars().count(),
            options.duration_ms
        );

        let run = OverlayRun {
            task: OverlayReveal::new(
                &options.text,
                options.duration_ms,
                options.scramble_every_ms,
                options.charset,
            ),
            rng: fork_rng(&mut self.rng),
            target: text,
        };

        let completion = self.completion.clone();
        schedule_frame(
            &self.host,
            run,
            Box::new(move || {
                overlay.add_class(HIDDEN_CLASS);
                overlay.set_attribute("aria-hidden", "true");
                completion.fire();
            }),
        );

        self.runs += 1;
        RevealOutcome::Started
    }
}

struct OverlayRun {
    task: OverlayReveal,
    rng: ScrambleRng,
    target: Element,
}

fn schedule_frame(host: &HostLoop, mut run: OverlayRun, on_done: Box<dyn FnOnce()>) {
    host.request_frame(move |host, now| {
        let frame = run.task.frame(now, &mut run.rng);
        run.target.set_text(&frame.text);

        if frame.done {
            host.set_timeout(OVERLAY_END_HOLD_MS, move |_| on_done());
        } else {
            schedule_frame(host, run, on_done);
        }
    });
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OVERLAY_DURATION_ATTR, OVERLAY_STEP_ATTR, OVERLAY_TEXT_ATTR};
    use crate::dom::ElementSpec;
    use crate::engine::scramble::seeded_rng;
    use crate::state::motion::MotionPreference;

    fn overlay_document(text: &str, duration: &str) -> Rc<Document> {
        let doc = Rc::new(Document::new());
        doc.set_root_attribute(OVERLAY_TEXT_ATTR, text);
        doc.set_root_attribute(OVERLAY_DURATION_ATTR, duration);
        let overlay = doc.append(
            ElementSpec::new()
                .id(OVERLAY_ID)
                .class(HIDDEN_CLASS)
                .attr("aria-hidden", "true"),
        );
        doc.append(ElementSpec::new().id(OVERLAY_TEXT_ID).child_of(overlay.node_id()));
        doc
    }

    fn controller(
        doc: &Rc<Document>,
        host: &HostLoop,
        motion: MotionPreference,
    ) -> (OverlayController, CompletionSignal) {
        let completion = CompletionSignal::new();
        let controller = OverlayController::new(
            doc.clone(),
            host.clone(),
            Rc::new(motion),
            completion.clone(),
            Settings::default(),
            seeded_rng(17),
        );
        (controller, completion)
    }

    #[test]
    fn test_overlay_reveals_and_signals() {
        let doc = overlay_document("ACCESS GRANTED", "200");
        let host = HostLoop::offline();
        let (mut overlay, completion) = controller(&doc, &host, MotionPreference::NoPreference);

        assert_eq!(overlay.run(), RevealOutcome::Started);
        let container = doc.get_element_by_id(OVERLAY_ID).unwrap();
        assert!(!container.is_hidden());
        assert_eq!(container.attribute("aria-hidden").as_deref(), Some("false"));

        host.run_until_idle();

        let text = doc.get_element_by_id(OVERLAY_TEXT_ID).unwrap();
        assert_eq!(text.text(), "ACCESS GRANTED");
        assert!(container.is_hidden());
        assert_eq!(container.attribute("aria-hidden").as_deref(), Some("true"));
        assert!(completion.is_fired());
        assert_eq!(overlay.runs(), 1);
    }

    #[test]
    fn test_signal_fires_after_end_hold() {
        let doc = overlay_document("HI", "100");
        let host = HostLoop::offline().with_frame_interval(10.0);
        let (mut overlay, completion) = controller(&doc, &host, MotionPreference::NoPreference);
        overlay.run();

        // First frame at 0 fixes t0, final frame at 100, then a 10ms hold
        host.run_until(105.0);
        assert_eq!(doc.get_element_by_id(OVERLAY_TEXT_ID).unwrap().text(), "HI");
        assert!(!completion.is_fired());

        host.run_until(110.0);
        assert!(completion.is_fired());
    }

    #[test]
    fn test_intermediate_frames_keep_whitespace() {
        let doc = overlay_document("A B C", "300");
        doc.set_root_attribute(OVERLAY_STEP_ATTR, "1");
        let host = HostLoop::offline();
        let (mut overlay, _) = controller(&doc, &host, MotionPreference::NoPreference);
        overlay.run();

        let text = doc.get_element_by_id(OVERLAY_TEXT_ID).unwrap();
        while host.step().is_some() {
            let shown: Vec<char> = text.text().chars().collect();
            if shown.len() == 5 {
                assert_eq!(shown[1], ' ');
                assert_eq!(shown[3], ' ');
            }
        }
    }

    #[test]
    fn test_reduced_motion_shows_nothing() {
        let doc = overlay_document("SECRET", "200");
        let host = HostLoop::offline();
        let (mut overlay, completion) = controller(&doc, &host, MotionPreference::Reduce);

        assert_eq!(overlay.run(), RevealOutcome::Suppressed);
        host.run_until_idle();

        let container = doc.get_element_by_id(OVERLAY_ID).unwrap();
        assert!(container.is_hidden());
        assert_eq!(doc.get_element_by_id(OVERLAY_TEXT_ID).unwrap().text(), "");
        assert!(!completion.is_fired());
        assert!(host.is_idle());
    }

    #[test]
    fn test_missing_markup_is_noop() {
        let doc = Rc::new(Document::new());
        doc.append(ElementSpec::new().id(OVERLAY_ID));
        let host = HostLoop::offline();
        let (mut overlay, completion) = controller(&doc, &host, MotionPreference::NoPreference);

        assert!(!overlay.has_markup());
        assert_eq!(
            overlay.run(),
            RevealOutcome::Skipped(SkipReason::MissingMarkup)
        );
        assert!(host.is_idle());
        assert!(!completion.is_fired());
    }

    #[test]
    fn test_rerun_fires_signal_once() {
        let doc = overlay_document("AGAIN", "50");
        let host = HostLoop::offline();
        let (mut overlay, completion) = controller(&doc, &host, MotionPreference::NoPreference);

        let fired = Rc::new(std::cell::Cell::new(0));
        let f = fired.clone();
        let _ = completion.on_complete(move || f.set(f.get() + 1));

        overlay.run();
        host.run_until_idle();
        overlay.run();
        host.run_until_idle();

        assert_eq!(overlay.runs(), 2);
        assert_eq!(fired.get(), 1);
        assert_eq!(doc.get_element_by_id(OVERLAY_TEXT_ID).unwrap().text(), "AGAIN");
    }
}
