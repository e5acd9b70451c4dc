//! Per-context presence entries.
//!
//! Each `[contexts.<Name>]` table describes the presence shown while the
//! context called `<Name>` is active. Names are matched exactly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Presence fields for one context. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextPresence {
    pub state: Option<String>,
    pub details: Option<String>,
    /// Start of the elapsed-time display, epoch seconds.
    pub start: Option<i64>,
    /// End of the remaining-time display, epoch seconds.
    pub end: Option<i64>,
    pub large_image: Option<String>,
    pub large_text: Option<String>,
    pub small_image: Option<String>,
    pub small_text: Option<String>,
}

impl ContextPresence {
    pub fn has_timestamps(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn has_assets(&self) -> bool {
        self.large_image.is_some()
            || self.large_text.is_some()
            || self.small_image.is_some()
            || self.small_text.is_some()
    }
}

/// Context name to presence entry.
pub type ContextsConfig = BTreeMap<String, ContextPresence>;
