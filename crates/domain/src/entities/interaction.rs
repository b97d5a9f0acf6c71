//! Interaction entity - Something the player can do inside a sub-zone
//!
//! Interactions are seeded when a zone is generated ("Observe surroundings")
//! or discovered on demand from player intent. They are never deleted; only
//! their status changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::ids::InteractionId;

/// Name of the interaction every sub-zone starts with.
pub const OBSERVE_SURROUNDINGS: &str = "Observe surroundings";

/// What the interaction targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    /// Examine or use an object
    #[default]
    Item,
    /// Talk to or act on a character
    Npc,
    /// Engage with the environment as a whole
    Scene,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Item => "item",
            InteractionType::Npc => "npc",
            InteractionType::Scene => "scene",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "item" => Ok(InteractionType::Item),
            "npc" => Ok(InteractionType::Npc),
            "scene" => Ok(InteractionType::Scene),
            other => Err(DomainError::parse(format!(
                "Unknown interaction type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    #[default]
    Ready,
    Disabled,
    Hidden,
}

impl InteractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionStatus::Ready => "ready",
            InteractionStatus::Disabled => "disabled",
            InteractionStatus::Hidden => "hidden",
        }
    }

    /// Only ready interactions can be executed.
    pub fn is_executable(&self) -> bool {
        matches!(self, InteractionStatus::Ready)
    }
}

impl fmt::Display for InteractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InteractionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ready" => Ok(InteractionStatus::Ready),
            "disabled" => Ok(InteractionStatus::Disabled),
            "hidden" => Ok(InteractionStatus::Hidden),
            other => Err(DomainError::parse(format!(
                "Unknown interaction status: {other}"
            ))),
        }
    }
}

/// When content was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Produced with the zone at generation time
    #[default]
    Pre,
    /// Produced on demand from player intent
    Instant,
}

/// A single interaction inside a sub-zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub interaction_id: InteractionId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: InteractionType,
    #[serde(default)]
    pub status: InteractionStatus,
    #[serde(default)]
    pub generated_mode: GenerationMode,
    /// Execution is a stub that only advances time and logs
    #[serde(default = "default_placeholder")]
    pub placeholder: bool,
}

fn default_placeholder() -> bool {
    true
}

impl Interaction {
    pub fn new(interaction_id: InteractionId, name: impl Into<String>) -> Self {
        Self {
            interaction_id,
            name: name.into(),
            kind: InteractionType::default(),
            status: InteractionStatus::default(),
            generated_mode: GenerationMode::default(),
            placeholder: true,
        }
    }

    /// The pre-generated scene interaction every sub-zone starts with.
    pub fn observe_surroundings(interaction_id: InteractionId) -> Self {
        Self::new(interaction_id, OBSERVE_SURROUNDINGS).with_kind(InteractionType::Scene)
    }

    pub fn with_kind(mut self, kind: InteractionType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_status(mut self, status: InteractionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_generated_mode(mut self, mode: GenerationMode) -> Self {
        self.generated_mode = mode;
        self
    }

    /// Case-insensitive, whitespace-trimmed key used for deduplication.
    pub fn name_key(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Normalize a display name into its dedup key.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_uses_type_key() {
        let interaction = Interaction::observe_surroundings(InteractionId::from("int_a_1_observe"));
        let json = serde_json::to_value(&interaction).expect("serialize");
        assert_eq!(json["type"], "scene");
        assert_eq!(json["status"], "ready");
        assert_eq!(json["generated_mode"], "pre");
        assert_eq!(json["placeholder"], true);
    }

    #[test]
    fn strict_parsing_rejects_unknown_values() {
        assert_eq!("NPC".parse::<InteractionType>(), Ok(InteractionType::Npc));
        assert!("weapon".parse::<InteractionType>().is_err());
        assert_eq!(
            " hidden ".parse::<InteractionStatus>(),
            Ok(InteractionStatus::Hidden)
        );
        assert!("broken".parse::<InteractionStatus>().is_err());
    }

    #[test]
    fn name_key_is_case_insensitive() {
        let a = Interaction::new(InteractionId::from("a"), "Observe Altar");
        assert_eq!(a.name_key(), normalize_name("  observe altar"));
    }
}
