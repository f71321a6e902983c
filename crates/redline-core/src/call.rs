use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Annotation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Running,
    Succeeded,
    Failed,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Running => "running",
            CallStatus::Succeeded => "succeeded",
            CallStatus::Failed => "failed",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "running" => Some(CallStatus::Running),
            "succeeded" => Some(CallStatus::Succeeded),
            "failed" => Some(CallStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A traced invocation. The id is minted when the call starts and is the
/// handle feedback is later attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub id: String,
    pub op_name: String,
    #[serde(default)]
    pub model: Option<String>,
    pub inputs: Value,
    #[serde(default)]
    pub output: Option<Value>,
    pub status: CallStatus,
    #[serde(default)]
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCall {
    pub op_name: String,
    #[serde(default)]
    pub model: Option<String>,
    pub inputs: Value,
}

/// A call together with every annotation attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallDetail {
    #[serde(flatten)]
    pub call: CallRecord,
    pub annotations: Vec<Annotation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_status_parse_str_all() {
        assert_eq!(CallStatus::parse_str("running"), Some(CallStatus::Running));
        assert_eq!(CallStatus::parse_str("succeeded"), Some(CallStatus::Succeeded));
        assert_eq!(CallStatus::parse_str("failed"), Some(CallStatus::Failed));
        assert_eq!(CallStatus::parse_str("queued"), None);
        assert_eq!(CallStatus::parse_str(""), None);
    }

    #[test]
    fn call_status_display() {
        for s in [CallStatus::Running, CallStatus::Succeeded, CallStatus::Failed] {
            assert_eq!(format!("{s}"), s.as_str());
        }
    }

    #[test]
    fn call_detail_flattens_record() {
        let detail = CallDetail {
            call: CallRecord {
                id: "c1".into(),
                op_name: "rewrite".into(),
                model: None,
                inputs: serde_json::json!({"text": "hi"}),
                output: None,
                status: CallStatus::Running,
                error_message: None,
                started_at: Utc::now(),
                ended_at: None,
            },
            annotations: vec![],
        };
        let v = serde_json::to_value(&detail).unwrap();
        assert_eq!(v["id"], "c1");
        assert_eq!(v["status"], "running");
        assert!(v["annotations"].as_array().unwrap().is_empty());
    }
}
