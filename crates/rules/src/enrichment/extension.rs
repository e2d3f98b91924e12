//! File-extension enrichment.

use tagger_core::IntegrationEvent;

use crate::context::RuleContextBuilder;

use super::{metadata_value, ContextEnricher};

/// Metadata keys checked for an explicit extension, in priority order.
pub const METADATA_EXTENSION_KEYS: &[&str] = &["fileExtension", "extension", "ext"];

/// Metadata keys checked for a MIME type when no extension is available.
const MIME_TYPE_KEYS: &[&str] = &["mimeType", "contentType"];

const MIME_TYPE_EXTENSIONS: &[(&str, &str)] = &[
    ("application/msword", ".doc"),
    ("application/pdf", ".pdf"),
    ("application/vnd.ms-excel", ".xls"),
    ("application/vnd.ms-powerpoint", ".ppt"),
    ("application/vnd.openxmlformats-officedocument.presentationml.presentation", ".pptx"),
    ("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet", ".xlsx"),
    ("application/vnd.openxmlformats-officedocument.wordprocessingml.document", ".docx"),
    ("image/bmp", ".bmp"),
    ("image/gif", ".gif"),
    ("image/heic", ".heic"),
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/svg+xml", ".svg"),
    ("image/tiff", ".tiff"),
    ("text/csv", ".csv"),
    ("text/plain", ".txt"),
];

/// Adds an `extension` field resolved by [`resolve_extension`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionEnricher;

impl ContextEnricher for ExtensionEnricher {
    fn name(&self) -> &str {
        "extension"
    }

    fn enrich(&self, builder: &mut RuleContextBuilder, event: &IntegrationEvent) {
        if let Some(extension) = resolve_extension(event) {
            builder.add_field("extension", &extension);
        }
    }
}

/// Resolve a document's file extension from the event.
///
/// Order: metadata `fileExtension`, `extension`, `ext`; then the title's
/// extension; then a `mimeType`/`contentType` metadata value.
pub fn resolve_extension(event: &IntegrationEvent) -> Option<String> {
    METADATA_EXTENSION_KEYS
        .iter()
        .filter_map(|key| metadata_value(event, key))
        .find_map(normalize_extension)
        .or_else(|| title_extension(&event.title).and_then(normalize_extension))
        .or_else(|| {
            MIME_TYPE_KEYS
                .iter()
                .filter_map(|key| metadata_value(event, key))
                .find_map(mime_type_extension)
                .map(str::to_string)
        })
}

/// Normalize a raw extension: trimmed, cut at the first space or comma,
/// with a leading dot. Returns `None` when nothing usable remains.
pub fn normalize_extension(value: &str) -> Option<String> {
    let mut trimmed = value.trim();
    if let Some(idx) = trimmed.find(' ') {
        trimmed = &trimmed[..idx];
    }
    if let Some(idx) = trimmed.find(',') {
        trimmed = &trimmed[..idx];
    }

    let stem = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if stem.is_empty() {
        return None;
    }
    Some(format!(".{stem}"))
}

/// Extension of the last path segment of a title, including the dot.
fn title_extension(title: &str) -> Option<&str> {
    let file_name = title.rsplit(['/', '\\']).next().unwrap_or(title);
    let idx = file_name.rfind('.')?;
    let extension = &file_name[idx..];
    (extension.len() > 1).then_some(extension)
}

fn mime_type_extension(value: &str) -> Option<&'static str> {
    let mime = value.split(';').next().unwrap_or(value).trim();
    MIME_TYPE_EXTENSIONS
        .iter()
        .find(|(m, _)| m.eq_ignore_ascii_case(mime))
        .map(|(_, ext)| *ext)
}
