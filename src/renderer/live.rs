//! Live rendering - one effect that redraws the document when it changes.
//!
//! The effect reads every element's text and hidden state through
//! [`visible_lines`], so a reveal frame, the overlay being shown or hidden,
//! or an appended element re-runs it. Drawing happens inside the write that
//! caused it; nothing polls the renderer between host loop steps.
//!
//! # Example
//!
//! ```ignore
//! use decrypt_reveal::renderer::{mount, TerminalRenderer};
//!
//! let live = mount(doc.clone(), TerminalRenderer::stdout());
//! page.boot();
//! page.host().run_until_idle();
//! live.unmount();
//! ```

use std::cell::{Cell, RefCell};
use std::io::Write;
use std::rc::Rc;

use spark_signals::effect;

use crate::dom::Document;
use super::terminal::{visible_lines, TerminalRenderer};

// =============================================================================
// Live Render Handle
// =============================================================================

/// Handle returned by [`mount`]. Dropping it stops the render effect.
pub struct LiveRender<W: Write> {
    renderer: Rc<RefCell<TerminalRenderer<W>>>,
    frames: Rc<Cell<usize>>,
    stop_effect: Option<Box<dyn FnOnce()>>,
}

impl<W: Write> LiveRender<W> {
    /// Number of renders that wrote something.
    pub fn frames(&self) -> usize {
        self.frames.get()
    }

    /// Borrow the renderer, e.g. to leave fullscreen.
    pub fn with_renderer<R>(&self, f: impl FnOnce(&mut TerminalRenderer<W>) -> R) -> R {
        f(&mut self.renderer.borrow_mut())
    }

    /// Stop the render effect. Later document changes are not drawn.
    pub fn unmount(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(stop) = self.stop_effect.take() {
            stop();
        }
    }
}

impl<W: Write> Drop for LiveRender<W> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Draw `doc` now and again after every change to what it displays.
pub fn mount<W: Write + 'static>(doc: Rc<Document>, renderer: TerminalRenderer<W>) -> LiveRender<W> {
    let renderer = Rc::new(RefCell::new(renderer));
    let frames = Rc::new(Cell::new(0));

    let stop_fn = {
        let renderer = renderer.clone();
        let frames = frames.clone();
        effect(move || {
            // Reading the lines creates the dependencies
            let lines = visible_lines(&doc);
            match renderer.borrow_mut().render_lines(lines) {
                Ok(true) => frames.set(frames.get() + 1),
                Ok(false) => {}
                Err(err) => log::warn!("render failed: {err}"),
            }
        })
    };

    LiveRender {
        renderer,
        frames,
        stop_effect: Some(Box::new(stop_fn)),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, TEXT_ATTR};
    use crate::dom::ElementSpec;
    use crate::pipeline::{HostLoop, Page};
    use crate::state::motion::MotionPreference;
    use crate::types::{DECRYPT_ATTR, HIDDEN_CLASS, OVERLAY_ID, OVERLAY_TEXT_ID};

    fn written(live: &LiveRender<Vec<u8>>) -> String {
        live.with_renderer(|r| String::from_utf8_lossy(r.writer()).into_owned())
    }

    #[test]
    fn test_mount_draws_immediately() {
        let doc = Rc::new(Document::new());
        doc.append(ElementSpec::new().text("ready"));

        let live = mount(doc, TerminalRenderer::new(Vec::new()));
        assert_eq!(live.frames(), 1);
        assert!(written(&live).contains("ready"));
    }

    #[test]
    fn test_text_write_redraws() {
        let doc = Rc::new(Document::new());
        let el = doc.append(ElementSpec::new().text("first"));
        let live = mount(doc, TerminalRenderer::new(Vec::new()));

        el.set_text("second");
        assert_eq!(live.frames(), 2);
        assert!(written(&live).contains("second"));

        // Same value: the signal does not notify
        el.set_text("second");
        assert_eq!(live.frames(), 2);
    }

    #[test]
    fn test_showing_hidden_parent_redraws() {
        let doc = Rc::new(Document::new());
        let overlay = doc.append(ElementSpec::new().class(HIDDEN_CLASS));
        doc.append(ElementSpec::new().child_of(overlay.node_id()).text("secret"));
        let live = mount(doc, TerminalRenderer::new(Vec::new()));
        assert!(!written(&live).contains("secret"));

        overlay.remove_class(HIDDEN_CLASS);
        assert!(written(&live).contains("secret"));
    }

    #[test]
    fn test_appended_element_redraws() {
        let doc = Rc::new(Document::new());
        let live = mount(doc.clone(), TerminalRenderer::new(Vec::new()));
        assert_eq!(live.frames(), 0);

        doc.append(ElementSpec::new().text("late"));
        assert_eq!(live.frames(), 1);
        assert!(written(&live).contains("late"));
    }

    #[test]
    fn test_unmount_stops_drawing() {
        let doc = Rc::new(Document::new());
        let el = doc.append(ElementSpec::new().text("kept"));
        let live = mount(doc.clone(), TerminalRenderer::new(Vec::new()));
        let renderer = live.renderer.clone();
        live.unmount();

        el.set_text("dropped");
        let out = String::from_utf8_lossy(renderer.borrow().writer()).into_owned();
        assert!(out.contains("kept"));
        assert!(!out.contains("dropped"));
    }

    #[test]
    fn test_page_reveals_draw_without_polling() {
        let doc = Rc::new(Document::new());
        let overlay = doc.append(ElementSpec::new().id(OVERLAY_ID).class(HIDDEN_CLASS));
        doc.append(ElementSpec::new().id(OVERLAY_TEXT_ID).child_of(overlay.node_id()));
        doc.append(ElementSpec::new().attr(DECRYPT_ATTR, "").attr(TEXT_ATTR, "Title"));

        let settings = Settings {
            seed: Some(5),
            ..Settings::default()
        };
        let page = Page::with_settings(
            doc.clone(),
            HostLoop::offline(),
            MotionPreference::NoPreference,
            settings,
        );
        let live = mount(doc, TerminalRenderer::new(Vec::new()));

        page.boot();
        page.host().run_until_idle();

        // One draw per overlay frame at least, plus the inline ticks
        assert!(live.frames() > 20);
        let out = written(&live);
        assert!(out.contains("ACCESS GRANTED"));
        assert!(out.contains("Title"));
        assert_eq!(visible_lines(page.document()), vec!["Title"]);
    }
}
