use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RedlineError;

/// Acknowledgment shown to the user once feedback has been attached.
pub const FEEDBACK_ACK: &str = "✔️ Feedback received!";

/// Coarse thumbs reaction. The emoji forms are accepted on input since that is
/// what thumbs widgets usually emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    #[serde(alias = "👍")]
    ThumbsUp,
    #[serde(alias = "👎")]
    ThumbsDown,
}

impl Reaction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reaction::ThumbsUp => "thumbs_up",
            Reaction::ThumbsDown => "thumbs_down",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "thumbs_up" | "👍" => Some(Reaction::ThumbsUp),
            "thumbs_down" | "👎" => Some(Reaction::ThumbsDown),
            _ => None,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Reaction::ThumbsUp => "👍",
            Reaction::ThumbsDown => "👎",
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feedback captured from the user after viewing a rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub score: Option<Reaction>,
    #[serde(default)]
    pub text: Option<String>,
}

impl Feedback {
    pub fn reaction(score: Reaction) -> Self {
        Self {
            score: Some(score),
            text: None,
        }
    }

    pub fn note(text: impl Into<String>) -> Self {
        Self {
            score: None,
            text: Some(text.into()),
        }
    }

    /// The free-text note, trimmed. Blank notes count as absent.
    pub fn note_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn validate(&self) -> Result<(), RedlineError> {
        if self.score.is_none() && self.note_text().is_none() {
            return Err(RedlineError::InvalidInput(
                "feedback needs a reaction or a note".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Reaction,
    Note,
}

impl AnnotationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Reaction => "reaction",
            AnnotationKind::Note => "note",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "reaction" => Some(AnnotationKind::Reaction),
            "note" => Some(AnnotationKind::Note),
            _ => None,
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of feedback attached to a traced call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub call_id: String,
    pub kind: AnnotationKind,
    pub value: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAnnotation {
    pub call_id: String,
    pub kind: AnnotationKind,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackReceipt {
    pub message: String,
    pub annotations: Vec<Annotation>,
}
