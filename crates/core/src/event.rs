use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque document identifier assigned by the document store.
pub type DocId = Uuid;

/// Opaque identifier of a tag definition.
pub type TagId = Uuid;

/// Document lifecycle events the tagger reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    DocumentUploaded,
    OcrCompleted,
}

impl EventKind {
    pub const ALL: [EventKind; 2] = [EventKind::DocumentUploaded, EventKind::OcrCompleted];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::DocumentUploaded => "DocumentUploaded",
            EventKind::OcrCompleted => "OcrCompleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_' | '.'))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "documentuploaded" => Ok(EventKind::DocumentUploaded),
            "ocrcompleted" => Ok(EventKind::OcrCompleted),
            _ => Err(format!("unknown event: '{}'", s)),
        }
    }
}

/// A document lifecycle event as handed over by the ingestion layer.
///
/// The tagger never mutates an event; it only derives a rule context from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationEvent {
    #[serde(default = "Uuid::new_v4")]
    pub event_id: Uuid,
    pub kind: EventKind,
    #[serde(default)]
    pub occurred_at_utc: Option<DateTime<Utc>>,
    pub document_id: DocId,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Arbitrary key/value pairs in the order the producer sent them.
    #[serde(default)]
    pub metadata: IndexMap<String, String>,
}

impl IntegrationEvent {
    /// Create an event with a fresh event ID and no optional payload.
    pub fn new(kind: EventKind, document_id: DocId, title: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            kind,
            occurred_at_utc: None,
            document_id,
            title: title.into(),
            summary: None,
            content: None,
            metadata: IndexMap::new(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_occurred_at(mut self, at: DateTime<Utc>) -> Self {
        self.occurred_at_utc = Some(at);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
