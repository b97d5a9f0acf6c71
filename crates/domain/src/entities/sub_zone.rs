//! Sub-zone entity - A navigable point of interest inside a zone

use serde::{Deserialize, Serialize};

use super::interaction::{normalize_name, GenerationMode, Interaction};
use super::zone::default_flags;
use crate::common::{pick, stable_int};
use crate::geometry::Coord3D;
use crate::ids::{InteractionId, NpcId, SubZoneId, ZoneId};

/// A character stub present in a sub-zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaNpc {
    pub npc_id: NpcId,
    pub name: String,
    #[serde(default = "default_npc_state")]
    pub state: String,
}

fn default_npc_state() -> String {
    "idle".to_string()
}

impl AreaNpc {
    /// Deterministic NPC for a sub-zone.
    ///
    /// Identity and name depend only on the sub-zone id, its names and `index`,
    /// so regenerating the same zone produces the same characters.
    pub fn stub_for(zone_name: &str, sub_zone_id: &SubZoneId, index: usize) -> Self {
        let base = format!("{}:{}", sub_zone_id, index);
        let title = pick(
            &format!("{base}:title"),
            &[
                "Sentry",
                "Peddler",
                "Apprentice",
                "Guide",
                "Patroller",
                "Scribe",
                "Apothecary",
                "Artisan",
            ],
        );
        let given = pick(
            &format!("{base}:given"),
            &["Ansel", "Lorin", "Yue", "Cen", "Yao", "Ke", "Xiao", "Yi", "Qiao", "Bai"],
        );
        let surname = pick(
            &format!("{base}:surname"),
            &["Lin", "Yue", "Lan", "Ji", "Chuan", "Mo", "Ning", "Qi", "Shang", "Vale"],
        );
        Self {
            npc_id: NpcId::from_string(format!(
                "npc_{}_{:04}",
                sub_zone_id,
                stable_int(&base) % 9999
            )),
            name: format!("{given} {surname}, {title} of {zone_name}"),
            state: default_npc_state(),
        }
    }
}

/// Runtime state of a sub-zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubZoneState {
    #[serde(default = "default_time_segment")]
    pub time_segment: String,
    #[serde(default = "default_flags")]
    pub flags: Vec<String>,
}

fn default_time_segment() -> String {
    "day".to_string()
}

impl Default for SubZoneState {
    fn default() -> Self {
        Self {
            time_segment: default_time_segment(),
            flags: default_flags(),
        }
    }
}

/// A sub-zone inside the area snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSubZone {
    pub sub_zone_id: SubZoneId,
    pub zone_id: ZoneId,
    pub name: String,
    pub coord: Coord3D,
    #[serde(default = "default_sub_zone_radius")]
    pub radius_m: u32,
    pub description: String,
    #[serde(default)]
    pub generated_mode: GenerationMode,
    #[serde(default)]
    pub key_interactions: Vec<Interaction>,
    #[serde(default)]
    pub npcs: Vec<AreaNpc>,
    #[serde(default)]
    pub state: SubZoneState,
}

fn default_sub_zone_radius() -> u32 {
    20
}

impl AreaSubZone {
    pub fn new(
        sub_zone_id: SubZoneId,
        zone_id: ZoneId,
        name: impl Into<String>,
        coord: Coord3D,
        description: impl Into<String>,
    ) -> Self {
        Self {
            sub_zone_id,
            zone_id,
            name: name.into(),
            coord,
            radius_m: default_sub_zone_radius(),
            description: description.into(),
            generated_mode: GenerationMode::Pre,
            key_interactions: Vec::new(),
            npcs: Vec::new(),
            state: SubZoneState::default(),
        }
    }

    pub fn interaction(&self, id: &InteractionId) -> Option<&Interaction> {
        self.key_interactions
            .iter()
            .find(|i| &i.interaction_id == id)
    }

    pub fn has_interaction_named(&self, name: &str) -> bool {
        let key = normalize_name(name);
        self.key_interactions.iter().any(|i| i.name_key() == key)
    }

    /// Next free `int_{sub_zone_id}_{n}` id, skipping ids already taken.
    pub fn next_interaction_id(&self) -> InteractionId {
        let mut n = self.key_interactions.len() + 1;
        loop {
            let candidate = InteractionId::from_string(format!("int_{}_{}", self.sub_zone_id, n));
            if self.interaction(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// First id-level or name-level duplicate among the interactions, if any.
    pub fn find_duplicate_interaction(&self) -> Option<String> {
        let mut ids = std::collections::HashSet::new();
        let mut names = std::collections::HashSet::new();
        for interaction in &self.key_interactions {
            if !ids.insert(interaction.interaction_id.as_str()) {
                return Some(format!(
                    "duplicate interaction id {}",
                    interaction.interaction_id
                ));
            }
            if !names.insert(interaction.name_key()) {
                return Some(format!("duplicate interaction name {}", interaction.name));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub_zone() -> AreaSubZone {
        AreaSubZone::new(
            SubZoneId::from("sub_zone_0_0_0_1"),
            ZoneId::from("zone_0_0_0"),
            "Altar",
            Coord3D::default(),
            "Stone altar",
        )
    }

    #[test]
    fn npc_stub_is_deterministic() {
        let id = SubZoneId::from("sub_zone_0_0_0_1");
        let a = AreaNpc::stub_for("Old Mill", &id, 0);
        let b = AreaNpc::stub_for("Old Mill", &id, 0);
        assert_eq!(a, b);
        assert!(a.npc_id.as_str().starts_with("npc_sub_zone_0_0_0_1_"));
        assert!(a.name.ends_with("of Old Mill"));
    }

    #[test]
    fn next_interaction_id_skips_taken_ids() {
        let mut sub = sub_zone();
        sub.key_interactions
            .push(Interaction::new(InteractionId::from("int_sub_zone_0_0_0_1_2"), "Pray"));
        assert_eq!(
            sub.next_interaction_id().as_str(),
            "int_sub_zone_0_0_0_1_3"
        );
    }

    #[test]
    fn duplicate_names_are_detected_case_insensitively() {
        let mut sub = sub_zone();
        sub.key_interactions
            .push(Interaction::new(InteractionId::from("a"), "Observe Altar"));
        assert!(sub.has_interaction_named("observe altar "));
        assert_eq!(sub.find_duplicate_interaction(), None);
        sub.key_interactions
            .push(Interaction::new(InteractionId::from("b"), "OBSERVE ALTAR"));
        assert!(sub.find_duplicate_interaction().is_some());
    }
}
