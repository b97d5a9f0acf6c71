//! Validation of raw interaction proposals.

use serde_json::Value;
use wrldkeep_domain::common::none_if_blank;
use wrldkeep_domain::{InteractionStatus, InteractionType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionCandidate {
    Valid {
        name: String,
        kind: InteractionType,
        status: InteractionStatus,
    },
    Rejected(String),
}

/// Accept a proposal only with a non-blank name and a known `type` and `status`.
pub fn validate_interaction(raw: &Value) -> InteractionCandidate {
    let Some(obj) = raw.as_object() else {
        return InteractionCandidate::Rejected("proposal is not an object".to_string());
    };
    let Some(name) = obj.get("name").and_then(Value::as_str).and_then(none_if_blank) else {
        return InteractionCandidate::Rejected("missing name".to_string());
    };
    let kind = match obj.get("type").and_then(Value::as_str).map(str::parse::<InteractionType>) {
        Some(Ok(kind)) => kind,
        Some(Err(e)) => return InteractionCandidate::Rejected(format!("{name}: {e}")),
        None => return InteractionCandidate::Rejected(format!("{name}: missing type")),
    };
    let status = match obj.get("status").and_then(Value::as_str).map(str::parse::<InteractionStatus>) {
        Some(Ok(status)) => status,
        Some(Err(e)) => return InteractionCandidate::Rejected(format!("{name}: {e}")),
        None => return InteractionCandidate::Rejected(format!("{name}: missing status")),
    };
    InteractionCandidate::Valid {
        name: name.to_string(),
        kind,
        status,
    }
}
