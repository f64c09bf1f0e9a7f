//! Shared types for the classification pipeline.

use std::fmt;

use serde::Serialize;

/// Value of [`Classification::source`] for results produced by the model.
pub const SOURCE_LLM: &str = "llm";

/// The two outcomes an inbound email can be classified into.
///
/// Labels are Portuguese on the wire because the model is instructed with
/// exactly these strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    /// Needs a work-related response.
    Produtivo,
    /// Social, greeting or marketing. Nothing to act on.
    Improdutivo,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Produtivo => "Produtivo",
            Self::Improdutivo => "Improdutivo",
        }
    }

    /// Lenient label match: surrounding whitespace and case are ignored.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("produtivo") {
            Some(Self::Produtivo)
        } else if label.eq_ignore_ascii_case("improdutivo") {
            Some(Self::Improdutivo)
        } else {
            None
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the completion parser extracts from one model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub category: Category,
    pub reply: String,
}

/// Classifier output: a parsed result tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub reply: String,
    pub source: &'static str,
}

impl Classification {
    pub fn from_llm(result: ClassificationResult) -> Self {
        Self {
            category: result.category,
            reply: result.reply,
            source: SOURCE_LLM,
        }
    }
}
