use serde::{Deserialize, Serialize};

/// What kind of audio an item refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioKind {
    /// Narrated brief; the source URL must be exchanged for a signed URL
    Summary,
    /// Raw podcast episode; the source URL is directly playable
    Episode,
}

/// Foreign keys to backend records related to an item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationIds {
    /// Master brief the summary audio belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_brief_id: Option<String>,

    /// Per-user brief record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_brief_id: Option<String>,

    /// Source episode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_id: Option<String>,
}

/// A playable unit: an episode or a summary brief
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioItem {
    /// Identifier, unique within a queue
    pub id: String,

    /// Summary or episode
    pub kind: AudioKind,

    /// Display title
    #[serde(default)]
    pub title: String,

    /// Display name of the podcast
    #[serde(default)]
    pub podcast_name: String,

    /// Artwork for the now-playing view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,

    /// URL as known to the caller; only a seed for summaries
    #[serde(default)]
    pub source_url: String,

    /// Best-known duration in milliseconds
    #[serde(default)]
    pub duration_ms: u64,

    /// Position to seek to right after loading
    #[serde(default)]
    pub resume_position_ms: u64,

    /// Backend foreign keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_ids: Option<CorrelationIds>,
}

impl AudioItem {
    /// Create an episode item played straight from `url`
    pub fn episode(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(id, AudioKind::Episode, url)
    }

    /// Create a summary item whose audio is signed for `master_brief_id`
    pub fn summary(id: impl Into<String>, master_brief_id: impl Into<String>) -> Self {
        Self::new(id, AudioKind::Summary, String::new()).with_correlation_ids(CorrelationIds {
            master_brief_id: Some(master_brief_id.into()),
            ..CorrelationIds::default()
        })
    }

    /// Create an item of the given kind
    pub fn new(id: impl Into<String>, kind: AudioKind, source_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: String::new(),
            podcast_name: String::new(),
            artwork_url: None,
            source_url: source_url.into(),
            duration_ms: 0,
            resume_position_ms: 0,
            correlation_ids: None,
        }
    }

    /// Builder method to set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder method to set the podcast name
    #[must_use]
    pub fn with_podcast_name(mut self, name: impl Into<String>) -> Self {
        self.podcast_name = name.into();
        self
    }

    /// Builder method to set artwork URL
    #[must_use]
    pub fn with_artwork(mut self, artwork_url: impl Into<String>) -> Self {
        self.artwork_url = Some(artwork_url.into());
        self
    }

    /// Builder method to set the seed URL
    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    /// Builder method to set duration
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Builder method to set the resume position
    #[must_use]
    pub fn with_resume_position_ms(mut self, position_ms: u64) -> Self {
        self.resume_position_ms = position_ms;
        self
    }

    /// Builder method to set correlation ids
    #[must_use]
    pub fn with_correlation_ids(mut self, ids: CorrelationIds) -> Self {
        self.correlation_ids = Some(ids);
        self
    }

    /// Whether the playable URL has to be signed first
    #[must_use]
    pub fn needs_signing(&self) -> bool {
        matches!(self.kind, AudioKind::Summary)
    }

    /// Identifier handed to the URL resolver
    ///
    /// Falls back to the item id when no master brief id is attached.
    #[must_use]
    pub fn master_brief_id(&self) -> &str {
        self.correlation_ids
            .as_ref()
            .and_then(|ids| ids.master_brief_id.as_deref())
            .unwrap_or(&self.id)
    }
}
