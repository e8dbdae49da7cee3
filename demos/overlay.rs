//! Overlay + inline reveal demo.
//!
//! Run with: cargo run --example overlay
//!
//! Set DECRYPT_REDUCED_MOTION=1 to see the reduced-motion path, and
//! RUST_LOG=debug for lifecycle logging (written to stderr).

use std::io;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use decrypt_reveal::config::{
    load_settings, CHARSET_ATTR, DELAY_ATTR, OVERLAY_TEXT_ATTR, SPEED_ATTR, TEXT_ATTR,
};
use decrypt_reveal::{
    mount, Document, ElementSpec, EnvMotion, HostLoop, Page, Settings, TerminalRenderer,
    DECRYPT_ATTR, HIDDEN_CLASS, OVERLAY_ID, OVERLAY_TEXT_ID,
};

fn main() -> io::Result<()> {
    env_logger::init();

    // Optional settings file as first argument
    let settings = match std::env::args().nth(1) {
        Some(path) => load_settings(&path).unwrap_or_else(|err| {
            log::warn!("{err}; using default settings");
            Settings::default()
        }),
        None => Settings::default(),
    };

    let doc = Rc::new(Document::new());
    doc.set_root_attribute(OVERLAY_TEXT_ATTR, "ACCESS GRANTED");

    let overlay = doc.append(
        ElementSpec::new()
            .id(OVERLAY_ID)
            .class(HIDDEN_CLASS)
            .attr("aria-hidden", "true"),
    );
    doc.append(ElementSpec::new().id(OVERLAY_TEXT_ID).child_of(overlay.node_id()));

    doc.append(
        ElementSpec::new()
            .attr(DECRYPT_ATTR, "")
            .attr(TEXT_ATTR, "0xAlessandro"),
    );
    doc.append(
        ElementSpec::new()
            .attr(DECRYPT_ATTR, "")
            .attr(SPEED_ATTR, "45")
            .attr(DELAY_ATTR, "300")
            .attr(CHARSET_ATTR, "01")
            .text("decrypting the rest of the page"),
    );

    let page = Page::with_settings(doc.clone(), HostLoop::realtime(), EnvMotion::default(), settings);

    let mut renderer = TerminalRenderer::stdout();
    renderer.enter_fullscreen()?;

    // Redraws on every text or visibility change
    let live = mount(doc, renderer);

    page.boot();
    page.host().run_until_idle();

    thread::sleep(Duration::from_millis(1500));
    log::debug!("{} frames drawn", live.frames());
    let result = live.with_renderer(|r| r.exit_fullscreen());
    live.unmount();
    result
}
