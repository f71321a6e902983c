use serde::{Deserialize, Serialize};

/// Per-session state: the latest rewrite and the call that produced it.
///
/// Each rewrite overwrites both values, so feedback can only ever target the
/// most recent call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub id: String,
    pub improved_text: Option<String>,
    pub commentary: Option<String>,
    pub last_call_id: Option<String>,
}

impl SessionState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn record_rewrite(&mut self, rewrite: &crate::Rewrite) {
        self.improved_text = Some(rewrite.improved_text.clone());
        self.commentary = rewrite.commentary.clone();
        self.last_call_id = Some(rewrite.call_id.clone());
    }
}
