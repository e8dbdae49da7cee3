//! Reveal options, read from markup attributes with settings-file defaults.
//!
//! Precedence for every option: attribute on the markup, then the loaded
//! [`Settings`], then the built-in default. Integer attributes are parsed the
//! way `parseInt(value, 10)` reads them: leading whitespace and sign allowed,
//! trailing garbage ignored (`"30ms"` is 30).

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::dom::{Document, Element};
use crate::error::{AttributeError, ConfigError};
use crate::types::{
    Charset, DEFAULT_CHARSET, DEFAULT_FRAME_INTERVAL_MS, DEFAULT_OVERLAY_DURATION_MS,
    DEFAULT_OVERLAY_TEXT, DEFAULT_SCRAMBLE_EVERY_MS, DEFAULT_START_DELAY_MS,
    DEFAULT_STEP_DELAY_MS, OVERLAY_FALLBACK_MS,
};

// =============================================================================
// Attribute names
// =============================================================================

pub const OVERLAY_TEXT_ATTR: &str = "data-decrypt-overlay-text";
pub const OVERLAY_DURATION_ATTR: &str = "data-decrypt-overlay-duration";
pub const OVERLAY_STEP_ATTR: &str = "data-decrypt-overlay-step";
pub const OVERLAY_CHARSET_ATTR: &str = "data-decrypt-overlay-charset";

pub const TEXT_ATTR: &str = "data-text";
pub const SPEED_ATTR: &str = "data-speed";
pub const DELAY_ATTR: &str = "data-delay";
pub const CHARSET_ATTR: &str = "data-charset";

// =============================================================================
// Settings
// =============================================================================

/// Page-wide defaults, optionally loaded from a JSON file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub overlay_text: String,
    pub overlay_duration_ms: u64,
    pub overlay_scramble_ms: u64,
    pub step_delay_ms: u64,
    pub start_delay_ms: u64,
    pub charset: String,
    /// How long inline reveals wait for the overlay before starting anyway.
    pub fallback_ms: u64,
    /// Spacing of frame boundaries on the host loop `Page` drives.
    pub frame_interval_ms: f64,
    /// Fixed random seed for reproducible scrambles.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            overlay_text: DEFAULT_OVERLAY_TEXT.to_string(),
            overlay_duration_ms: DEFAULT_OVERLAY_DURATION_MS,
            overlay_scramble_ms: DEFAULT_SCRAMBLE_EVERY_MS,
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            start_delay_ms: DEFAULT_START_DELAY_MS,
            charset: DEFAULT_CHARSET.to_string(),
            fallback_ms: OVERLAY_FALLBACK_MS,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            seed: None,
        }
    }
}

/// Load settings from a JSON file. Missing fields keep their defaults.
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let raw = fs::read_to_string(&path)?;
    let settings = parse_settings(&raw)?;
    log::debug!("loaded settings from {}", path.as_ref().display());
    Ok(settings)
}

/// Parse settings from a JSON string.
pub fn parse_settings(raw: &str) -> Result<Settings, ConfigError> {
    Ok(serde_json::from_str(raw)?)
}

// =============================================================================
// Attribute parsing
// =============================================================================

/// Parse a leading decimal integer. Negative values clamp to zero.
pub fn parse_int(name: &str, value: &str) -> Result<u64, AttributeError> {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return Err(AttributeError::NotAnInteger {
            name: name.to_string(),
            value: value.to_string(),
        });
    }
    if negative {
        return Ok(0);
    }
    // All-digit prefix only fails on overflow
    Ok(digits[..end].parse().unwrap_or(u64::MAX))
}

/// Integer option from an attribute, falling back to `default`.
///
/// Empty values fall back silently; unparsable ones log a warning.
fn int_option(name: &str, value: Option<String>, default: u64) -> u64 {
    match value.as_deref() {
        None | Some("") => default,
        Some(raw) => parse_int(name, raw).unwrap_or_else(|err| {
            log::warn!("{err}; using {default}");
            default
        }),
    }
}

/// String option: empty counts as absent.
fn text_option(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// =============================================================================
// Resolved options
// =============================================================================

/// Options for the overlay reveal, read from the document root.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayOptions {
    pub text: String,
    pub duration_ms: u64,
    pub scramble_every_ms: u64,
    pub charset: Charset,
}

impl OverlayOptions {
    pub fn resolve(doc: &Document, settings: &Settings) -> Self {
        Self {
            text: text_option(doc.root_attribute(OVERLAY_TEXT_ATTR))
                .unwrap_or_else(|| settings.overlay_text.clone()),
            duration_ms: int_option(
                OVERLAY_DURATION_ATTR,
                doc.root_attribute(OVERLAY_DURATION_ATTR),
                settings.overlay_duration_ms,
            ),
            scramble_every_ms: int_option(
                OVERLAY_STEP_ATTR,
                doc.root_attribute(OVERLAY_STEP_ATTR),
                settings.overlay_scramble_ms,
            ),
            charset: Charset::new(
                &text_option(doc.root_attribute(OVERLAY_CHARSET_ATTR))
                    .unwrap_or_else(|| settings.charset.clone()),
            ),
        }
    }
}

/// Options for one inline reveal, read from its element.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineOptions {
    pub text: String,
    pub step_delay_ms: u64,
    pub start_delay_ms: u64,
    pub charset: Charset,
}

impl InlineOptions {
    pub fn resolve(el: &Element, settings: &Settings) -> Self {
        Self {
            text: text_option(el.attribute(TEXT_ATTR)).unwrap_or_else(|| el.text()),
            step_delay_ms: int_option(SPEED_ATTR, el.attribute(SPEED_ATTR), settings.step_delay_ms),
            start_delay_ms: int_option(
                DELAY_ATTR,
                el.attribute(DELAY_ATTR),
                settings.start_delay_ms,
            ),
            charset: Charset::new(
                &text_option(el.attribute(CHARSET_ATTR))
                    .unwrap_or_else(|| settings.charset.clone()),
            ),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
