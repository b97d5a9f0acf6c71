//! Validation of raw zone proposals.
//!
//! Proposals arrive as loosely structured JSON. Each one becomes either a
//! repaired, geometry-safe [`MapZone`] or a rejection reason.

use std::collections::HashSet;

use serde_json::{Map, Value};
use wrldkeep_domain::{
    MapZone, Offset3, Position, SubZoneSeed, ZoneId, ZoneSize, ZoneType,
};

use super::fallback;

/// Proposals farther than this from the player on either axis are rejected.
pub const MAX_AXIS_DISTANCE_M: i64 = 1000;

/// At most this many sub-zone seeds are read from one proposal.
pub const MAX_SEEDS_READ: usize = 20;

const SERIAL_NAME_PREFIXES: [&str; 4] = ["zone", "region", "区域", "区块"];

#[derive(Debug, Clone, PartialEq)]
pub enum ZoneCandidate {
    Valid(MapZone),
    Rejected(String),
}

impl ZoneCandidate {
    fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

/// Validate one proposal against the player position and the coordinates
/// already accepted in this batch.
pub fn validate_zone(
    raw: &Value,
    center: &Position,
    accepted_coords: &HashSet<(i64, i64)>,
) -> ZoneCandidate {
    let Some(obj) = raw.as_object() else {
        return ZoneCandidate::rejected("proposal is not an object");
    };

    let name = str_field(obj, "name").unwrap_or_default();
    if name.is_empty() {
        return ZoneCandidate::rejected("empty name");
    }
    if is_serial_name(&name) {
        return ZoneCandidate::rejected(format!("serial name {name:?}"));
    }

    let (Some(x), Some(y)) = (
        obj.get("x").and_then(coerce_i64),
        obj.get("y").and_then(coerce_i64),
    ) else {
        return ZoneCandidate::rejected(format!("{name}: missing integer coordinates"));
    };
    if (x - center.x).abs() > MAX_AXIS_DISTANCE_M || (y - center.y).abs() > MAX_AXIS_DISTANCE_M {
        return ZoneCandidate::rejected(format!("{name}: ({x}, {y}) is too far from the player"));
    }

    let description = str_field(obj, "description").unwrap_or_default();
    if description.is_empty() {
        return ZoneCandidate::rejected(format!("{name}: empty description"));
    }
    if accepted_coords.contains(&(x, y)) {
        return ZoneCandidate::rejected(format!("{name}: duplicate coordinates ({x}, {y})"));
    }

    let tags = match obj.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|t| match t {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => vec!["generated".to_string(), "ai".to_string()],
    };
    let zone_type = match str_field(obj, "zone_type") {
        Some(raw_type) if !raw_type.is_empty() => ZoneType::parse_lenient(&raw_type),
        _ => ZoneType::infer_from_tags(&tags),
    };
    let size = str_field(obj, "size")
        .map(|s| ZoneSize::parse_lenient(&s))
        .unwrap_or_default();
    let radius_m = obj
        .get("radius_m")
        .and_then(coerce_i64)
        .map(|r| size.clamp_radius(r))
        .unwrap_or_else(|| size.default_radius());

    let sub_zones = normalize_seeds(read_seeds(obj.get("sub_zones")), size, radius_m, &name);

    ZoneCandidate::Valid(MapZone {
        zone_id: ZoneId::from_coords(x, y, center.z),
        name,
        x,
        y,
        z: center.z,
        zone_type,
        size,
        radius_m,
        description,
        tags,
        sub_zones,
    })
}

/// Names like "Zone 1", "Region 3" or "区域1" carry no meaning.
pub fn is_serial_name(name: &str) -> bool {
    let lowered = name.trim().to_lowercase();
    SERIAL_NAME_PREFIXES.iter().any(|prefix| {
        lowered.strip_prefix(prefix).is_some_and(|rest| {
            let rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '-' || c == '_' || c == '#');
            !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
        })
    })
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Integers, floats (rounded) and numeric strings all count as coordinates.
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.round() as i64)
            })
        }
        _ => None,
    }
}

fn read_seeds(raw: Option<&Value>) -> Vec<SubZoneSeed> {
    let Some(Value::Array(items)) = raw else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|sub| {
            let name = str_field(sub, "name").filter(|n| !n.is_empty())?;
            let offset = |key: &str| sub.get(key).and_then(coerce_i64).unwrap_or(0);
            Some(
                SubZoneSeed::new(
                    name,
                    Offset3::new(offset("offset_x"), offset("offset_y"), offset("offset_z")),
                )
                .with_description(str_field(sub, "description").unwrap_or_default()),
            )
        })
        .take(MAX_SEEDS_READ)
        .collect()
}

/// Degenerate seed sets: one shared coordinate, or everything but one seed
/// crowded at the center.
pub fn is_degenerate(seeds: &[SubZoneSeed], radius_m: u32) -> bool {
    if seeds.is_empty() {
        return true;
    }
    let distinct: HashSet<(i64, i64, i64)> = seeds
        .iter()
        .map(|s| (s.offset_x, s.offset_y, s.offset_z))
        .collect();
    if distinct.len() <= 1 {
        return true;
    }
    let threshold = (f64::from(radius_m) * 0.08).max(8.0);
    let near_center = seeds
        .iter()
        .filter(|s| s.offset().magnitude() <= threshold)
        .count();
    near_center >= (seeds.len() - 1).max(1)
}

/// Fit seeds to the size class and radius: truncate, pad, replace if
/// degenerate, then clip every offset into the zone.
pub fn normalize_seeds(
    mut seeds: Vec<SubZoneSeed>,
    size: ZoneSize,
    radius_m: u32,
    zone_name: &str,
) -> Vec<SubZoneSeed> {
    let (_, max) = size.sub_zone_count_range();
    seeds.truncate(max);
    fallback::pad_sub_zone_seeds(&mut seeds, size, zone_name);
    if is_degenerate(&seeds, radius_m) {
        seeds = fallback::fallback_sub_zone_seeds(size, zone_name);
    }
    seeds.into_iter().map(|s| s.clipped_to(radius_m)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn accept(raw: Value) -> MapZone {
        match validate_zone(&raw, &Position::origin(), &HashSet::new()) {
            ZoneCandidate::Valid(zone) => zone,
            ZoneCandidate::Rejected(reason) => panic!("unexpected rejection: {reason}"),
        }
    }

    fn reject(raw: Value) -> String {
        match validate_zone(&raw, &Position::origin(), &HashSet::new()) {
            ZoneCandidate::Rejected(reason) => reason,
            ZoneCandidate::Valid(zone) => panic!("unexpected acceptance: {}", zone.name),
        }
    }

    #[test]
    fn serial_names_are_detected() {
        for name in ["Zone 1", "region 3", "区域1", "区块2", "Zone-12"] {
            assert!(is_serial_name(name), "{name}");
        }
        for name in ["Zone of Ash", "Regional Market", "Ashford", "Zone"] {
            assert!(!is_serial_name(name), "{name}");
        }
    }

    #[test]
    fn rejections() {
        reject(json!("not an object"));
        reject(json!({"name": "", "x": 0, "y": 0, "description": "d"}));
        reject(json!({"name": "Zone 1", "x": 0, "y": 0, "description": "d"}));
        reject(json!({"name": "Ashford", "x": "east", "y": 0, "description": "d"}));
        reject(json!({"name": "Ashford", "y": 0, "description": "d"}));
        reject(json!({"name": "Ashford", "x": 1001, "y": 0, "description": "d"}));
        reject(json!({"name": "Ashford", "x": 0, "y": 0, "description": "  "}));
    }

    #[test]
    fn duplicate_coordinates_are_rejected() {
        let mut seen = HashSet::new();
        seen.insert((10, 20));
        let raw = json!({"name": "Ashford", "x": 10, "y": 20, "description": "d"});
        assert!(matches!(
            validate_zone(&raw, &Position::origin(), &seen),
            ZoneCandidate::Rejected(_)
        ));
    }

    #[test]
    fn repairs_type_size_radius_and_tags() {
        let zone = accept(json!({
            "name": "Ashford",
            "x": "12.6",
            "y": -40,
            "description": "A village",
            "zone_type": "swamp",
            "size": "gigantic",
            "radius_m": 9000
        }));
        assert_eq!(zone.x, 13);
        assert_eq!(zone.zone_type, ZoneType::Unknown);
        assert_eq!(zone.size, ZoneSize::Medium);
        assert_eq!(zone.radius_m, 300);
        assert_eq!(zone.tags, vec!["generated".to_string(), "ai".to_string()]);
        assert_eq!(zone.zone_id.as_str(), "zone_13_-40_0");
        assert_eq!(zone.sub_zones.len(), 5);
    }

    #[test]
    fn missing_radius_uses_midpoint() {
        let zone = accept(json!({
            "name": "Ashford", "x": 0, "y": 0, "description": "d", "size": "small"
        }));
        assert_eq!(zone.radius_m, 120);
    }

    #[test]
    fn seeds_are_truncated_to_size_maximum_and_clipped() {
        let subs: Vec<Value> = (0..12)
            .map(|i| json!({"name": format!("Spot {i}"), "offset_x": 40 * i, "offset_y": 900}))
            .collect();
        let zone = accept(json!({
            "name": "Ashford", "x": 0, "y": 0, "description": "d",
            "size": "small", "radius_m": 100, "sub_zones": subs
        }));
        assert_eq!(zone.sub_zones.len(), 5);
        assert_eq!(zone.sub_zones[0].name, "Spot 0");
        for seed in &zone.sub_zones {
            assert!(seed.offset().magnitude() <= 100.0);
        }
    }

    #[test]
    fn degenerate_seeds_are_replaced() {
        let subs: Vec<Value> = (0..4)
            .map(|i| json!({"name": format!("Spot {i}"), "offset_x": 0, "offset_y": 0}))
            .collect();
        let zone = accept(json!({
            "name": "Ashford", "x": 0, "y": 0, "description": "d",
            "size": "small", "sub_zones": subs
        }));
        assert!(zone.sub_zones.iter().all(|s| s.name.starts_with("Ashford ")));
    }

    #[test]
    fn coerce_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_i64(&json!(5)), Some(5));
        assert_eq!(coerce_i64(&json!(4.5)), Some(5));
        assert_eq!(coerce_i64(&json!(" -7 ")), Some(-7));
        assert_eq!(coerce_i64(&json!(null)), None);
        assert_eq!(coerce_i64(&json!([1])), None);
    }
}
