//! Reduced-motion preference.
//!
//! Controllers ask a [`MotionQuery`] once per initialisation. A query that
//! fails is treated as "motion allowed", so the worst outcome of a broken
//! preference source is an animation the user did not want, never missing
//! text.
//!
//! # Example
//!
//! ```ignore
//! use decrypt_reveal::state::motion::{reduced_motion, EnvMotion, MotionPreference};
//!
//! assert!(reduced_motion(&MotionPreference::Reduce));
//! let from_env = reduced_motion(&EnvMotion::default());
//! ```

use std::env;

use crate::error::MotionQueryError;

/// Environment variable consulted by [`EnvMotion`] by default.
pub const REDUCED_MOTION_ENV: &str = "DECRYPT_REDUCED_MOTION";

/// Source of the reduced-motion preference.
pub trait MotionQuery {
    fn prefers_reduced_motion(&self) -> Result<bool, MotionQueryError>;
}

/// Fixed preference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MotionPreference {
    #[default]
    NoPreference,
    Reduce,
}

impl MotionQuery for MotionPreference {
    fn prefers_reduced_motion(&self) -> Result<bool, MotionQueryError> {
        Ok(*self == MotionPreference::Reduce)
    }
}

/// Preference read from an environment variable.
///
/// Unset means no preference. Recognised values: `1`, `true`, `yes`,
/// `reduce` (reduced) and `0`, `false`, `no`, `no-preference`, empty (not
/// reduced), case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvMotion {
    var: String,
}

impl EnvMotion {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvMotion {
    fn default() -> Self {
        Self::new(REDUCED_MOTION_ENV)
    }
}

impl MotionQuery for EnvMotion {
    fn prefers_reduced_motion(&self) -> Result<bool, MotionQueryError> {
        match env::var(&self.var) {
            Ok(value) => parse_preference(&value),
            Err(env::VarError::NotPresent) => Ok(false),
            Err(env::VarError::NotUnicode(_)) => Err(MotionQueryError::NotUnicode(self.var.clone())),
        }
    }
}

fn parse_preference(value: &str) -> Result<bool, MotionQueryError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "reduce" => Ok(true),
        "" | "0" | "false" | "no" | "no-preference" => Ok(false),
        _ => Err(MotionQueryError::Unrecognized(value.to_string())),
    }
}

/// Resolve the preference, treating a failed query as motion allowed.
pub fn reduced_motion(query: &dyn MotionQuery) -> bool {
    match query.prefers_reduced_motion() {
        Ok(reduce) => reduce,
        Err(err) => {
            log::debug!("reduced-motion query failed, animating: {err}");
            false
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
