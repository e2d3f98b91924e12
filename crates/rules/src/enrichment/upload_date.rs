//! Upload-date enrichment.
//!
//! Exposes the event timestamp as ordinary context fields so date-based
//! tagging goes through the same condition pipeline as every other rule.

use chrono::{DateTime, SecondsFormat, Utc};

use tagger_core::IntegrationEvent;

use crate::context::RuleContextBuilder;

use super::{resolve_extension, ContextEnricher};

/// Adds `occurredAtUtc`, `occurredAtDate`, `uploadDate` and, when an
/// extension is resolvable, `uploadLabel` (`dd-MM-yyyy-EXT`).
///
/// Events without a timestamp, or with the Unix-epoch default, get nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadDateEnricher;

impl UploadDateEnricher {
    /// Label combining the upload day and the upper-cased extension, e.g. `05-03-2024-PDF`.
    pub fn upload_label(occurred_at: DateTime<Utc>, extension: &str) -> Option<String> {
        let token = extension.trim().trim_start_matches('.').to_uppercase();
        if token.is_empty() {
            return None;
        }
        Some(format!("{}-{}", occurred_at.format("%d-%m-%Y"), token))
    }
}

impl ContextEnricher for UploadDateEnricher {
    fn name(&self) -> &str {
        "upload-date"
    }

    fn enrich(&self, builder: &mut RuleContextBuilder, event: &IntegrationEvent) {
        let Some(occurred_at) = event.occurred_at_utc.filter(|at| *at != DateTime::<Utc>::default()) else {
            return;
        };

        builder
            .add_field("occurredAtUtc", &occurred_at.to_rfc3339_opts(SecondsFormat::Secs, true))
            .add_field("occurredAtDate", &occurred_at.format("%Y-%m-%d").to_string())
            .add_field("uploadDate", &occurred_at.format("%d-%m-%Y").to_string());

        if let Some(label) = resolve_extension(event)
            .and_then(|ext| UploadDateEnricher::upload_label(occurred_at, &ext))
        {
            builder.add_field("uploadLabel", &label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tagger_core::EventKind;
    use uuid::Uuid;

    fn enrich(event: &IntegrationEvent) -> crate::context::RuleContext {
        let mut builder = RuleContextBuilder::from_event(event);
        UploadDateEnricher.enrich(&mut builder, event);
        builder.build()
    }

    #[test]
    fn adds_date_fields() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 10, 15, 0).unwrap();
        let event = IntegrationEvent::new(EventKind::DocumentUploaded, Uuid::nil(), "Report.pdf")
            .with_occurred_at(at);

        let context = enrich(&event);
        assert_eq!(context.get("occurredAtUtc"), Some("2024-03-05T10:15:00Z"));
        assert_eq!(context.get("occurredAtDate"), Some("2024-03-05"));
        assert_eq!(context.get("uploadDate"), Some("05-03-2024"));
        assert_eq!(context.get("uploadLabel"), Some("05-03-2024-PDF"));
    }

    #[test]
    fn no_label_without_extension() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        let event = IntegrationEvent::new(EventKind::DocumentUploaded, Uuid::nil(), "Notes")
            .with_occurred_at(at);

        let context = enrich(&event);
        assert_eq!(context.get("uploadDate"), Some("05-03-2024"));
        assert!(context.get("uploadLabel").is_none());
    }

    #[test]
    fn missing_or_default_timestamp_adds_nothing() {
        let event = IntegrationEvent::new(EventKind::DocumentUploaded, Uuid::nil(), "Report.pdf");
        assert!(enrich(&event).get("uploadDate").is_none());

        let event = event.with_occurred_at(DateTime::<Utc>::default());
        assert!(enrich(&event).get("occurredAtUtc").is_none());
    }
}
