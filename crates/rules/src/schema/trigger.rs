//! Lifecycle triggers and their conventional rule-set names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use tagger_core::EventKind;

use super::fold_name;

/// Conventional rule-set names, one per concrete trigger.
pub mod rule_set_names {
    pub const DOCUMENT_UPLOADED: &str = "Document Uploaded";
    pub const OCR_COMPLETED: &str = "OCR Completed";

    pub const ALL: &[&str] = &[DOCUMENT_UPLOADED, OCR_COMPLETED];
}

/// The lifecycle event a rule applies to. `All` makes a rule eligible for every trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Trigger {
    #[default]
    All,
    DocumentUploaded,
    OcrCompleted,
}

impl Trigger {
    /// Every trigger except the `All` wildcard.
    pub const CONCRETE: [Trigger; 2] = [Trigger::DocumentUploaded, Trigger::OcrCompleted];

    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::All => "All",
            Trigger::DocumentUploaded => "DocumentUploaded",
            Trigger::OcrCompleted => "OcrCompleted",
        }
    }

    /// Rule-set name rules of this trigger are grouped under; `None` for `All`.
    pub fn rule_set_name(&self) -> Option<&'static str> {
        match self {
            Trigger::All => None,
            Trigger::DocumentUploaded => Some(rule_set_names::DOCUMENT_UPLOADED),
            Trigger::OcrCompleted => Some(rule_set_names::OCR_COMPLETED),
        }
    }

    /// Whether a rule declared with `self` is eligible when `requested` fires.
    pub fn applies_to(&self, requested: Trigger) -> bool {
        *self == Trigger::All || *self == requested
    }
}

impl From<EventKind> for Trigger {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::DocumentUploaded => Trigger::DocumentUploaded,
            EventKind::OcrCompleted => Trigger::OcrCompleted,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match fold_name(s).as_str() {
            "all" | "*" => Ok(Trigger::All),
            "documentuploaded" => Ok(Trigger::DocumentUploaded),
            "ocrcompleted" => Ok(Trigger::OcrCompleted),
            _ => Err(format!("unknown trigger: '{}'", s)),
        }
    }
}

impl TryFrom<String> for Trigger {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Trigger> for String {
    fn from(trigger: Trigger) -> Self {
        trigger.as_str().to_string()
    }
}
