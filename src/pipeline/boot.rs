//! Boot - page-ready wiring of the overlay and inline reveals.
//!
//! `Page::boot` is the document-ready entry point:
//!
//! 1. The overlay controller runs (no-op without overlay markup).
//! 2. Without overlay markup, inline reveals start right away.
//! 3. With overlay markup, inline reveals start on whichever comes first:
//!    the overlay's completion signal or the fallback timer (2200ms by
//!    default). The later trigger is ignored.
//!
//! The fallback bounds startup latency when the overlay never completes,
//! including the reduced-motion case where it never runs at all. Under the
//! fallback, inline reveals may run alongside an unfinished overlay.
//!
//! # Example
//!
//! ```ignore
//! use decrypt_reveal::pipeline::{HostLoop, Page};
//! use decrypt_reveal::state::motion::EnvMotion;
//!
//! let page = Page::new(document, HostLoop::realtime(), EnvMotion::default());
//! page.boot();
//! page.host().run_until_idle();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::Settings;
use crate::dom::Document;
use crate::engine::scramble::{entropy_rng, fork_rng, seeded_rng};
use crate::primitives::decrypt::DecryptController;
use crate::primitives::overlay::OverlayController;
use crate::state::completion::CompletionSignal;
use crate::state::motion::MotionQuery;
use crate::types::{NodeId, RevealOutcome, OVERLAY_ID};
use super::host::HostLoop;

/// What `boot` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BootReport {
    pub overlay: RevealOutcome,
    /// True if inline reveals wait for the overlay or the fallback timer.
    pub inline_deferred: bool,
}

/// A document plus the controllers and loop that animate it.
pub struct Page {
    document: Rc<Document>,
    host: HostLoop,
    completion: CompletionSignal,
    overlay: Rc<RefCell<OverlayController>>,
    decrypt: Rc<RefCell<DecryptController>>,
    fallback_ms: u64,
    booted: Cell<bool>,
    inline_started: Rc<Cell<bool>>,
}

impl Page {
    /// Page with default settings.
    pub fn new(document: Rc<Document>, host: HostLoop, motion: impl MotionQuery + 'static) -> Self {
        Self::with_settings(document, host, motion, Settings::default())
    }

    /// Page with explicit settings. The settings' frame interval is applied
    /// to `host`, and so to every clone of it.
    pub fn with_settings(
        document: Rc<Document>,
        host: HostLoop,
        motion: impl MotionQuery + 'static,
        settings: Settings,
    ) -> Self {
        host.set_frame_interval(settings.frame_interval_ms);
        let motion: Rc<dyn MotionQuery> = Rc::new(motion);
        let completion = CompletionSignal::new();
        let mut root_rng = match settings.seed {
            Some(seed) => seeded_rng(seed),
            None => entropy_rng(),
        };

        let overlay = OverlayController::new(
            document.clone(),
            host.clone(),
            motion.clone(),
            completion.clone(),
            settings.clone(),
            fork_rng(&mut root_rng),
        );
        let decrypt = DecryptController::new(
            document.clone(),
            host.clone(),
            motion,
            settings.clone(),
            fork_rng(&mut root_rng),
        );

        Self {
            document,
            host,
            completion,
            overlay: Rc::new(RefCell::new(overlay)),
            decrypt: Rc::new(RefCell::new(decrypt)),
            fallback_ms: settings.fallback_ms,
            booted: Cell::new(false),
            inline_started: Rc::new(Cell::new(false)),
        }
    }

    /// Document-ready entry point. Returns `None` if already booted.
    pub fn boot(&self) -> Option<BootReport> {
        if self.booted.replace(true) {
            log::debug!("page already booted");
            return None;
        }

        let overlay = self.overlay.borrow_mut().run();

        if self.document.get_element_by_id(OVERLAY_ID).is_none() {
            self.inline_started.set(true);
            self.decrypt.borrow_mut().init_all();
            return Some(BootReport {
                overlay,
                inline_deferred: false,
            });
        }

        let kick: Rc<dyn Fn(&'static str)> = {
            let decrypt = self.decrypt.clone();
            let started = self.inline_started.clone();
            Rc::new(move |trigger: &'static str| {
                if started.replace(true) {
                    return;
                }
                log::debug!("starting inline reveals ({trigger})");
                decrypt.borrow_mut().init_all();
            })
        };

        let on_signal = kick.clone();
        let _ = self.completion.on_complete(move || on_signal("overlay done"));
        self.host
            .set_timeout(self.fallback_ms, move |_| kick("fallback timeout"));

        Some(BootReport {
            overlay,
            inline_deferred: true,
        })
    }

    /// Replay the overlay reveal.
    pub fn rerun_overlay(&self) -> RevealOutcome {
        self.overlay.borrow_mut().run()
    }

    /// Initialise inline reveals under `root`, e.g. after swapping content.
    pub fn init_within(&self, root: NodeId) -> Vec<(NodeId, RevealOutcome)> {
        self.decrypt.borrow_mut().init_within(root)
    }

    /// Initialise any inline reveal not yet started.
    pub fn init_all(&self) -> Vec<(NodeId, RevealOutcome)> {
        self.decrypt.borrow_mut().init_all()
    }

    pub fn document(&self) -> &Rc<Document> {
        &self.document
    }

    pub fn host(&self) -> &HostLoop {
        &self.host
    }

    /// The overlay completion signal; subscribe to observe overlay end.
    pub fn completion(&self) -> &CompletionSignal {
        &self.completion
    }

    /// True once inline reveals have been kicked off.
    pub fn inline_started(&self) -> bool {
        self.inline_started.get()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OVERLAY_DURATION_ATTR, TEXT_ATTR};
    use crate::dom::{Element, ElementSpec};
    use crate::state::motion::MotionPreference;
    use crate::types::{DECRYPT_ATTR, HIDDEN_CLASS, OVERLAY_TEXT_ID};

    fn settings() -> Settings {
        Settings {
            seed: Some(99),
            ..Settings::default()
        }
    }

    fn page_with_overlay(motion: MotionPreference) -> (Page, Element) {
        let doc = Rc::new(Document::new());
        doc.set_root_attribute(OVERLAY_DURATION_ATTR, "500");
        let overlay = doc.append(ElementSpec::new().id(OVERLAY_ID).class(HIDDEN_CLASS));
        doc.append(ElementSpec::new().id(OVERLAY_TEXT_ID).child_of(overlay.node_id()));
        let title = doc.append(
            ElementSpec::new()
                .attr(DECRYPT_ATTR, "")
                .attr(TEXT_ATTR, "Title"),
        );
        let page = Page::with_settings(doc, HostLoop::offline(), motion, settings());
        (page, title)
    }

    #[test]
    fn test_no_overlay_starts_inline_immediately() {
        let doc = Rc::new(Document::new());
        let el = doc.append(ElementSpec::new().attr(DECRYPT_ATTR, "").attr(TEXT_ATTR, "now"));
        let page = Page::with_settings(doc, HostLoop::offline(), MotionPreference::NoPreference, settings());

        let report = page.boot().unwrap();
        assert_eq!(report.overlay, RevealOutcome::Skipped(crate::types::SkipReason::MissingMarkup));
        assert!(!report.inline_deferred);
        assert!(page.inline_started());

        page.host().run_until(0.0);
        assert_ne!(el.text(), "");
        page.host().run_until_idle();
        assert_eq!(el.text(), "now");
    }

    #[test]
    fn test_inline_waits_for_overlay_completion() {
        let (page, title) = page_with_overlay(MotionPreference::NoPreference);
        let report = page.boot().unwrap();
        assert_eq!(report.overlay, RevealOutcome::Started);
        assert!(report.inline_deferred);

        // Overlay runs 500ms plus the end hold; inline is still untouched
        page.host().run_until(400.0);
        assert!(!page.inline_started());
        assert_eq!(title.text(), "");

        while !page.completion().is_fired() {
            page.host().step().unwrap();
        }
        assert!(page.inline_started());
        assert!(page.host().now() < 2200.0);

        page.host().run_until_idle();
        assert_eq!(title.text(), "Title");
        let overlay_text = page.document().get_element_by_id(OVERLAY_TEXT_ID).unwrap();
        assert_eq!(overlay_text.text(), "ACCESS GRANTED");
    }

    #[test]
    fn test_fallback_starts_inline_when_overlay_never_completes() {
        let (page, title) = page_with_overlay(MotionPreference::Reduce);
        let report = page.boot().unwrap();
        assert_eq!(report.overlay, RevealOutcome::Suppressed);

        page.host().run_until(2199.0);
        assert!(!page.inline_started());
        assert_eq!(title.text(), "");

        page.host().run_until(2200.0);
        assert!(page.inline_started());
        // Reduced motion also applies to the inline reveal
        assert_eq!(title.text(), "Title");
        assert!(!page.completion().is_fired());
    }

    #[test]
    fn test_fallback_after_completion_is_ignored() {
        let (page, title) = page_with_overlay(MotionPreference::NoPreference);
        page.boot();
        page.host().run_until_idle();

        assert_eq!(title.text(), "Title");
        assert!(page.host().now() >= 2200.0);
        // A second init pass would only report already-initialised elements
        assert_eq!(
            page.init_all(),
            vec![(
                title.node_id(),
                RevealOutcome::Skipped(crate::types::SkipReason::AlreadyInitialized)
            )]
        );
    }

    #[test]
    fn test_settings_frame_interval_drives_overlay_frames() {
        let doc = Rc::new(Document::new());
        let overlay = doc.append(ElementSpec::new().id(OVERLAY_ID).class(HIDDEN_CLASS));
        doc.append(ElementSpec::new().id(OVERLAY_TEXT_ID).child_of(overlay.node_id()));
        let host = HostLoop::offline();
        let page = Page::with_settings(
            doc,
            host.clone(),
            MotionPreference::NoPreference,
            Settings {
                frame_interval_ms: 50.0,
                ..settings()
            },
        );
        assert_eq!(host.frame_interval(), 50.0);

        page.boot();
        let first = host.step().unwrap();
        let second = host.step().unwrap();
        assert_eq!(second.at() - first.at(), 50.0);
    }

    #[test]
    fn test_boot_twice_is_noop() {
        let (page, _) = page_with_overlay(MotionPreference::NoPreference);
        assert!(page.boot().is_some());
        assert!(page.boot().is_none());
    }

    #[test]
    fn test_fallback_races_unfinished_overlay() {
        let (page, title) = page_with_overlay(MotionPreference::NoPreference);
        page.document()
            .set_root_attribute(OVERLAY_DURATION_ATTR, "5000");
        page.boot();

        page.host().run_until(2200.0);
        assert!(page.inline_started());
        assert!(!page.completion().is_fired());

        page.host().run_until_idle();
        assert_eq!(title.text(), "Title");
        assert!(page.completion().is_fired());
    }

    #[test]
    fn test_init_within_after_boot() {
        let (page, _) = page_with_overlay(MotionPreference::NoPreference);
        page.boot();
        page.host().run_until_idle();

        let section = page.document().append(ElementSpec::new());
        let fresh = page.document().append(
            ElementSpec::new()
                .child_of(section.node_id())
                .attr(DECRYPT_ATTR, "")
                .attr(TEXT_ATTR, "fresh"),
        );
        let outcomes = page.init_within(section.node_id());
        assert_eq!(outcomes, vec![(fresh.node_id(), RevealOutcome::Started)]);
        page.host().run_until_idle();
        assert_eq!(fresh.text(), "fresh");
    }
}
