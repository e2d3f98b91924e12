//! Document-type classification from the file extension.

use tagger_core::IntegrationEvent;

use crate::context::RuleContextBuilder;

use super::{resolve_extension, ContextEnricher};

const DOCUMENT: &str = "Document";
const IMAGES: &str = "Images";

const EXTENSION_TYPES: &[(&str, &str)] = &[
    (".doc", DOCUMENT),
    (".docx", DOCUMENT),
    (".pdf", DOCUMENT),
    (".xls", DOCUMENT),
    (".xlsx", DOCUMENT),
    (".ppt", DOCUMENT),
    (".pptx", DOCUMENT),
    (".txt", DOCUMENT),
    (".csv", DOCUMENT),
    (".jpg", IMAGES),
    (".jpeg", IMAGES),
    (".png", IMAGES),
    (".gif", IMAGES),
    (".bmp", IMAGES),
    (".tiff", IMAGES),
    (".svg", IMAGES),
    (".heic", IMAGES),
];

/// Adds a `documentType` field (`Document` or `Images`) for known extensions.
///
/// Resolves the extension itself rather than reading the `extension` field,
/// so it does not depend on [`super::ExtensionEnricher`] having run.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentTypeEnricher;

impl DocumentTypeEnricher {
    pub fn classify(extension: &str) -> Option<&'static str> {
        EXTENSION_TYPES
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension.trim()))
            .map(|(_, kind)| *kind)
    }
}

impl ContextEnricher for DocumentTypeEnricher {
    fn name(&self) -> &str {
        "document-type"
    }

    fn enrich(&self, builder: &mut RuleContextBuilder, event: &IntegrationEvent) {
        let document_type = resolve_extension(event)
            .as_deref()
            .and_then(DocumentTypeEnricher::classify);
        if let Some(document_type) = document_type {
            builder.add_field("documentType", document_type);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagger_core::EventKind;
    use uuid::Uuid;

    #[test]
    fn classifies_known_extensions() {
        assert_eq!(DocumentTypeEnricher::classify(".PDF"), Some("Document"));
        assert_eq!(DocumentTypeEnricher::classify(".heic"), Some("Images"));
        assert_eq!(DocumentTypeEnricher::classify(".zip"), None);
    }

    #[test]
    fn runs_without_extension_enricher() {
        let event = IntegrationEvent::new(EventKind::DocumentUploaded, Uuid::nil(), "photo")
            .with_metadata("ext", "jpeg");
        let mut builder = RuleContextBuilder::from_event(&event);
        DocumentTypeEnricher.enrich(&mut builder, &event);

        let context = builder.build();
        assert_eq!(context.get("documentType"), Some("Images"));
        assert!(context.get("extension").is_none());
    }
}
