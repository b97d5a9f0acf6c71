//! Deterministic content used when generated proposals are missing or unusable.

use std::f64::consts::PI;

use wrldkeep_domain::{MapZone, Offset3, Position, SubZoneSeed, ZoneId, ZoneSize, ZoneType};

const SUB_ZONE_SUFFIXES: [&str; 15] = [
    "Gate", "Square", "Outskirts", "Lookout", "Crossing", "Hollow", "Shrine", "Yard", "Terrace",
    "Grove", "Wharf", "Cellar", "Ridge", "Spring", "Camp",
];

const FALLBACK_SEED_DESCRIPTION: &str = "An unremarkable corner, filled in automatically";

struct ZoneTemplate {
    name: &'static str,
    zone_type: ZoneType,
    size: ZoneSize,
    description: &'static str,
}

const ZONE_TEMPLATES: [ZoneTemplate; 10] = [
    ZoneTemplate {
        name: "Crossroads Hamlet",
        zone_type: ZoneType::Village,
        size: ZoneSize::Small,
        description: "A handful of cottages where two old roads meet",
    },
    ZoneTemplate {
        name: "Whispering Pines",
        zone_type: ZoneType::Forest,
        size: ZoneSize::Medium,
        description: "Tall pines that hum when the wind rises",
    },
    ZoneTemplate {
        name: "Millbrook Ford",
        zone_type: ZoneType::River,
        size: ZoneSize::Small,
        description: "A shallow ford beside a creaking watermill",
    },
    ZoneTemplate {
        name: "Old Watchtower Ruins",
        zone_type: ZoneType::Ruins,
        size: ZoneSize::Small,
        description: "Collapsed stonework around a half-standing tower",
    },
    ZoneTemplate {
        name: "Saltwind Cove",
        zone_type: ZoneType::Coast,
        size: ZoneSize::Medium,
        description: "A sheltered cove with fishing boats pulled onto the shingle",
    },
    ZoneTemplate {
        name: "Emberfall Caverns",
        zone_type: ZoneType::Cave,
        size: ZoneSize::Medium,
        description: "Warm tunnels lit by veins of glowing ore",
    },
    ZoneTemplate {
        name: "Greystone Ridge",
        zone_type: ZoneType::Mountain,
        size: ZoneSize::Large,
        description: "A wind-scoured ridge of grey granite",
    },
    ZoneTemplate {
        name: "Amber Dunes",
        zone_type: ZoneType::Desert,
        size: ZoneSize::Large,
        description: "Rolling dunes that glow amber at dusk",
    },
    ZoneTemplate {
        name: "Lanternhold",
        zone_type: ZoneType::City,
        size: ZoneSize::Large,
        description: "A walled market town that never dims its lanterns",
    },
    ZoneTemplate {
        name: "Mossy Hollow",
        zone_type: ZoneType::Forest,
        size: ZoneSize::Small,
        description: "A damp hollow carpeted in moss and mushrooms",
    },
];

/// Distance between fallback rings around the player, in meters.
const RING_SPACING_M: f64 = 420.0;
const ZONES_PER_RING: usize = 6;

/// Fallback seed number `index` (0-based) for a zone.
fn fallback_seed(size: ZoneSize, zone_name: &str, index: usize) -> SubZoneSeed {
    let base_r = f64::from(size.default_radius());
    let bucket = (index % 6 + 1) as f64;
    let step = ((base_r * (0.35 + 0.1 * bucket)) as i64).max(30);
    let offset_x = if index % 2 == 0 { step } else { -step };
    let offset_y = if index % 3 == 0 { step / 2 } else { -step / 2 };
    let suffix = SUB_ZONE_SUFFIXES[index % SUB_ZONE_SUFFIXES.len()];
    let name = if index < SUB_ZONE_SUFFIXES.len() {
        format!("{zone_name} {suffix}")
    } else {
        format!("{zone_name} {suffix} {}", index / SUB_ZONE_SUFFIXES.len() + 1)
    };
    SubZoneSeed::new(name, Offset3::new(offset_x, offset_y, 0))
        .with_description(FALLBACK_SEED_DESCRIPTION)
}

/// The minimum number of fallback seeds for a zone of `size`.
pub fn fallback_sub_zone_seeds(size: ZoneSize, zone_name: &str) -> Vec<SubZoneSeed> {
    let (min, _) = size.sub_zone_count_range();
    (0..min).map(|i| fallback_seed(size, zone_name, i)).collect()
}

/// Fill `seeds` up to the size minimum with fallback seeds whose names are not taken.
pub fn pad_sub_zone_seeds(seeds: &mut Vec<SubZoneSeed>, size: ZoneSize, zone_name: &str) {
    let (min, max) = size.sub_zone_count_range();
    let mut index = 0;
    while seeds.len() < min && index < max * 2 {
        let seed = fallback_seed(size, zone_name, index);
        index += 1;
        if seeds
            .iter()
            .any(|s| s.name.trim().eq_ignore_ascii_case(seed.name.trim()))
        {
            continue;
        }
        seeds.push(seed);
    }
}

/// Synthesize fallback zone number `index` around `center`.
///
/// Index 0 sits on the player; later ones sit on rings of six, each ring
/// rotated half a step from the previous one.
pub fn fallback_zone(center: &Position, index: usize) -> MapZone {
    let template = &ZONE_TEMPLATES[index % ZONE_TEMPLATES.len()];
    let name = if index < ZONE_TEMPLATES.len() {
        template.name.to_string()
    } else {
        format!("{} {}", template.name, index / ZONE_TEMPLATES.len() + 1)
    };

    let (x, y) = if index == 0 {
        (center.x, center.y)
    } else {
        let slot = index - 1;
        let ring = slot / ZONES_PER_RING + 1;
        let step = 2.0 * PI / ZONES_PER_RING as f64;
        let angle = (slot % ZONES_PER_RING) as f64 * step + (ring - 1) as f64 * step / 2.0;
        let distance = ring as f64 * RING_SPACING_M;
        (
            center.x + (distance * angle.cos()).round() as i64,
            center.y + (distance * angle.sin()).round() as i64,
        )
    };

    let radius_m = template.size.default_radius();
    let sub_zones = fallback_sub_zone_seeds(template.size, &name)
        .into_iter()
        .map(|s| s.clipped_to(radius_m))
        .collect();

    MapZone {
        zone_id: ZoneId::from_coords(x, y, center.z),
        name,
        x,
        y,
        z: center.z,
        zone_type: template.zone_type,
        size: template.size,
        radius_m,
        description: template.description.to_string(),
        tags: vec!["generated".to_string(), "fallback".to_string()],
        sub_zones,
    }
}
