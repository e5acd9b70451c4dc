//! Presence descriptors and their builder.
//!
//! A [`PresenceDescriptor`] is a finished value: it is assembled through a
//! [`DescriptorBuilder`] and never changes afterwards. Deriving a variant
//! goes through [`PresenceDescriptor::to_builder`], which copies.

use std::fmt;

use serde::{Deserialize, Serialize};

use scenecast_config::ContextPresence;

/// State text of the fallback descriptor for contexts with no entry.
pub const DEFAULT_IDLE_STATE: &str = "Idle";

/// Elapsed/remaining time range, in epoch seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

impl Timestamps {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn start(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn end(mut self, end: i64) -> Self {
        self.end = Some(end);
        self
    }
}

/// Image keys and hover texts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_text: Option<String>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn large_image(mut self, key: impl Into<String>) -> Self {
        self.large_image = Some(key.into());
        self
    }

    #[must_use]
    pub fn large_text(mut self, text: impl Into<String>) -> Self {
        self.large_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn small_image(mut self, key: impl Into<String>) -> Self {
        self.small_image = Some(key.into());
        self
    }

    #[must_use]
    pub fn small_text(mut self, text: impl Into<String>) -> Self {
        self.small_text = Some(text.into());
        self
    }
}

/// One presentable status. Absent fields are simply not shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamps: Option<Timestamps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assets: Option<Assets>,
}

impl PresenceDescriptor {
    pub fn builder() -> DescriptorBuilder {
        DescriptorBuilder::default()
    }

    /// A descriptor carrying only state text.
    pub fn idle(state: impl Into<String>) -> Self {
        Self::builder().state(state).build()
    }

    /// Start a builder pre-filled with this descriptor's fields.
    pub fn to_builder(&self) -> DescriptorBuilder {
        DescriptorBuilder {
            inner: self.clone(),
        }
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn timestamps(&self) -> Option<&Timestamps> {
        self.timestamps.as_ref()
    }

    pub fn assets(&self) -> Option<&Assets> {
        self.assets.as_ref()
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl fmt::Display for PresenceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.state(), self.details()) {
            (Some(state), Some(details)) => write!(f, "{state} / {details}"),
            (Some(state), None) => f.write_str(state),
            (None, Some(details)) => f.write_str(details),
            (None, None) => f.write_str("<empty>"),
        }
    }
}

impl From<&ContextPresence> for PresenceDescriptor {
    fn from(entry: &ContextPresence) -> Self {
        let mut builder = Self::builder();
        if let Some(state) = &entry.state {
            builder = builder.state(state);
        }
        if let Some(details) = &entry.details {
            builder = builder.details(details);
        }
        if entry.has_timestamps() {
            builder = builder.timestamps(Timestamps {
                start: entry.start,
                end: entry.end,
            });
        }
        if entry.has_assets() {
            builder = builder.assets(Assets {
                large_image: entry.large_image.clone(),
                large_text: entry.large_text.clone(),
                small_image: entry.small_image.clone(),
                small_text: entry.small_text.clone(),
            });
        }
        builder.build()
    }
}

/// Accumulates field assignments; [`build`](Self::build) yields the value.
///
/// No validation happens here: empty strings and zero timestamps are kept
/// as literal values.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct DescriptorBuilder {
    inner: PresenceDescriptor,
}

impl DescriptorBuilder {
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.inner.state = Some(state.into());
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.inner.details = Some(details.into());
        self
    }

    /// Replace the whole time range.
    pub fn timestamps(mut self, timestamps: Timestamps) -> Self {
        self.inner.timestamps = Some(timestamps);
        self
    }

    pub fn start(mut self, start: i64) -> Self {
        self.timestamps_mut().start = Some(start);
        self
    }

    /// Start the elapsed-time display at the current wall-clock second.
    pub fn start_now(self) -> Self {
        self.start(chrono::Utc::now().timestamp())
    }

    pub fn end(mut self, end: i64) -> Self {
        self.timestamps_mut().end = Some(end);
        self
    }

    /// Replace all image fields at once.
    pub fn assets(mut self, assets: Assets) -> Self {
        self.inner.assets = Some(assets);
        self
    }

    pub fn large_image(mut self, key: impl Into<String>) -> Self {
        self.assets_mut().large_image = Some(key.into());
        self
    }

    pub fn large_text(mut self, text: impl Into<String>) -> Self {
        self.assets_mut().large_text = Some(text.into());
        self
    }

    pub fn small_image(mut self, key: impl Into<String>) -> Self {
        self.assets_mut().small_image = Some(key.into());
        self
    }

    pub fn small_text(mut self, text: impl Into<String>) -> Self {
        self.assets_mut().small_text = Some(text.into());
        self
    }

    pub fn build(self) -> PresenceDescriptor {
        self.inner
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        self.inner.timestamps.get_or_insert_with(Timestamps::default)
    }

    fn assets_mut(&mut self) -> &mut Assets {
        self.inner.assets.get_or_insert_with(Assets::default)
    }
}
