//! Zone classification value objects
//!
//! - `ZoneSize` - size class that bounds a zone's radius and sub-zone count
//! - `ZoneType` - terrain/settlement tag used for display and prompts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

// ============================================================================
// ZoneSize
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl ZoneSize {
    /// Inclusive radius bounds in meters.
    pub fn radius_range(&self) -> (u32, u32) {
        match self {
            ZoneSize::Small => (60, 180),
            ZoneSize::Medium => (120, 300),
            ZoneSize::Large => (240, 500),
        }
    }

    /// Inclusive sub-zone count bounds.
    pub fn sub_zone_count_range(&self) -> (usize, usize) {
        match self {
            ZoneSize::Small => (3, 5),
            ZoneSize::Medium => (5, 10),
            ZoneSize::Large => (8, 15),
        }
    }

    /// Midpoint of the radius bounds, used when no radius was given.
    pub fn default_radius(&self) -> u32 {
        let (min, max) = self.radius_range();
        (min + max) / 2
    }

    /// Clamp a proposed radius into this size class.
    pub fn clamp_radius(&self, radius_m: i64) -> u32 {
        let (min, max) = self.radius_range();
        radius_m.clamp(i64::from(min), i64::from(max)) as u32
    }

    pub fn contains_radius(&self, radius_m: u32) -> bool {
        let (min, max) = self.radius_range();
        (min..=max).contains(&radius_m)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneSize::Small => "small",
            ZoneSize::Medium => "medium",
            ZoneSize::Large => "large",
        }
    }

    /// Lenient parse: anything unrecognized becomes `Medium`.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl fmt::Display for ZoneSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ZoneSize {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(ZoneSize::Small),
            "medium" => Ok(ZoneSize::Medium),
            "large" => Ok(ZoneSize::Large),
            other => Err(DomainError::parse(format!("Unknown zone size: {other}"))),
        }
    }
}

// ============================================================================
// ZoneType
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    City,
    Village,
    Forest,
    Mountain,
    River,
    Desert,
    Coast,
    Cave,
    Ruins,
    #[default]
    Unknown,
}

impl ZoneType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneType::City => "city",
            ZoneType::Village => "village",
            ZoneType::Forest => "forest",
            ZoneType::Mountain => "mountain",
            ZoneType::River => "river",
            ZoneType::Desert => "desert",
            ZoneType::Coast => "coast",
            ZoneType::Cave => "cave",
            ZoneType::Ruins => "ruins",
            ZoneType::Unknown => "unknown",
        }
    }

    /// Lenient parse: anything outside the known set becomes `Unknown`.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    /// Guess a type from free-form tags ("urban", "beach", ...).
    pub fn infer_from_tags(tags: &[String]) -> Self {
        let has = |candidates: &[&str]| {
            tags.iter()
                .any(|t| candidates.contains(&t.trim().to_lowercase().as_str()))
        };
        if has(&["city", "urban", "town"]) {
            ZoneType::City
        } else if has(&["village", "rural"]) {
            ZoneType::Village
        } else if has(&["forest", "wood"]) {
            ZoneType::Forest
        } else if has(&["mountain"]) {
            ZoneType::Mountain
        } else if has(&["river"]) {
            ZoneType::River
        } else if has(&["desert"]) {
            ZoneType::Desert
        } else if has(&["coast", "beach", "sea"]) {
            ZoneType::Coast
        } else {
            ZoneType::Unknown
        }
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ZoneType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "city" => Ok(ZoneType::City),
            "village" => Ok(ZoneType::Village),
            "forest" => Ok(ZoneType::Forest),
            "mountain" => Ok(ZoneType::Mountain),
            "river" => Ok(ZoneType::River),
            "desert" => Ok(ZoneType::Desert),
            "coast" => Ok(ZoneType::Coast),
            "cave" => Ok(ZoneType::Cave),
            "ruins" => Ok(ZoneType::Ruins),
            "unknown" => Ok(ZoneType::Unknown),
            other => Err(DomainError::parse(format!("Unknown zone type: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_is_clamped_into_size_bounds() {
        assert_eq!(ZoneSize::Small.clamp_radius(10), 60);
        assert_eq!(ZoneSize::Small.clamp_radius(999), 180);
        assert_eq!(ZoneSize::Large.clamp_radius(300), 300);
        assert_eq!(ZoneSize::Medium.default_radius(), 210);
    }

    #[test]
    fn lenient_parsing_falls_back() {
        assert_eq!(ZoneSize::parse_lenient(" LARGE "), ZoneSize::Large);
        assert_eq!(ZoneSize::parse_lenient("huge"), ZoneSize::Medium);
        assert_eq!(ZoneType::parse_lenient("Ruins"), ZoneType::Ruins);
        assert_eq!(ZoneType::parse_lenient("swamp"), ZoneType::Unknown);
    }

    #[test]
    fn type_is_inferred_from_tags() {
        let tags = vec!["generated".to_string(), "Beach".to_string()];
        assert_eq!(ZoneType::infer_from_tags(&tags), ZoneType::Coast);
        assert_eq!(ZoneType::infer_from_tags(&[]), ZoneType::Unknown);
    }
}
