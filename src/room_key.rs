//! Free-text location → canonical room key.
//!
//! Locations come from hand-typed timetable cells ("7号楼A303", "7号楼A区303",
//! "12B205", "3楼201"), so normalization is a best-effort cascade of location
//! shapes. The first shape that matches a prefix of the text wins, which is why
//! the list runs from the most specific shape to the loosest one.

use crate::data::RoomNumber;
use regex::Regex;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;
use thiserror::Error;

/// Substrings marking rooms that are deliberately kept out of the grid.
const EXCLUDED_KEYWORDS: [&str; 3] = ["校内", "实验", "琴房"];

/// Canonical identity of a room. Only `building` and `room` take part in equality.
#[derive(Debug, Clone, Eq)]
pub struct RoomKey {
    pub building: String,
    pub floor: String,
    pub room: RoomNumber,
}

impl PartialEq for RoomKey {
    fn eq(&self, other: &Self) -> bool {
        self.building == other.building && self.room == other.room
    }
}

impl Hash for RoomKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.building.hash(state);
        self.room.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("location is an excluded room category ({keyword})")]
    Excluded { keyword: &'static str },
    #[error("location matches no known room shape")]
    Unmatched,
}

/// A location shape. Named groups `building`, `zone` and `room` carry the parts;
/// `zone` and `room` may be absent from a shape.
struct RoomShape {
    name: &'static str,
    regex: Regex,
}

static SHAPES: LazyLock<Vec<RoomShape>> = LazyLock::new(|| {
    [
        // 7号楼A303
        ("building-号楼-zone-room", r"^(?P<building>[0-9]+)号楼(?P<zone>[A-Za-z])(?P<room>[0-9]+)"),
        // 7号楼A区303
        ("building-号楼-zone-区-room", r"^(?P<building>[0-9]+)号楼(?P<zone>[A-Za-z])区(?P<room>[0-9]+)"),
        // 9号楼205
        ("building-号楼-room", r"^(?P<building>[0-9]+)号楼(?P<room>[0-9]+)"),
        // 12B205, 12205
        ("building-zone?-room", r"^(?P<building>[0-9]+)(?P<zone>[A-Za-z])?(?P<room>[0-9]+)"),
        // A12B3: the whole token names the building
        ("compact-token", r"^(?P<building>[A-Za-z]?[0-9]+[A-Za-z]?[0-9]+)"),
        // 3楼201, A3楼B201
        ("building-楼?-zone?-room", r"^(?P<building>[A-Za-z]?[0-9]+)楼?(?P<zone>[A-Za-z]?)(?P<room>[0-9]+)"),
    ]
    .into_iter()
    .map(|(name, pattern)| RoomShape {
        name,
        regex: Regex::new(pattern).unwrap_or_else(|e| panic!("room shape {name} does not compile: {e}")),
    })
    .collect()
});

/// Normalized key plus the name of the shape that produced it, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub key: RoomKey,
    pub shape: &'static str,
}

pub fn normalize(text: &str) -> Result<RoomKey, NormalizeError> {
    normalize_traced(text).map(|n| n.key)
}

pub fn normalize_traced(text: &str) -> Result<Normalized, NormalizeError> {
    if let Some(keyword) = EXCLUDED_KEYWORDS.iter().copied().find(|k| text.contains(k)) {
        return Err(NormalizeError::Excluded { keyword });
    }

    for shape in SHAPES.iter() {
        let Some(caps) = shape.regex.captures(text) else {
            continue;
        };
        let building_num = caps.name("building").map_or("", |m| m.as_str());
        let zone = caps
            .name("zone")
            .map(|m| m.as_str())
            .filter(|z| !z.is_empty());
        let room_digits = caps.name("room").map_or("", |m| m.as_str());

        let building = match zone {
            Some(z) => format!("{}号楼{}区", building_num, z.to_ascii_uppercase()),
            None => format!("{}号楼", building_num),
        };
        let room = if room_digits.is_empty() {
            0
        } else {
            room_digits.parse().map_err(|_| NormalizeError::Unmatched)?
        };

        return Ok(Normalized {
            key: RoomKey {
                building,
                floor: floor_name(room_digits).to_string(),
                room,
            },
            shape: shape.name,
        });
    }

    Err(NormalizeError::Unmatched)
}

/// Floor from the leading digit of the room number. Ground-floor rooms are
/// sometimes numbered from 0, so 0 and 1 share "一楼".
fn floor_name(room_digits: &str) -> &'static str {
    match room_digits.chars().next() {
        Some('0' | '1') | None => "一楼",
        Some('2') => "二楼",
        Some('3') => "三楼",
        Some('4') => "四楼",
        Some('5') => "五楼",
        Some('6') => "六楼",
        Some('7') => "七楼",
        Some('8') => "八楼",
        Some('9') => "九楼",
        Some(_) => "一楼",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str) -> RoomKey {
        normalize(text).unwrap()
    }

    #[test]
    fn every_shape_compiles_in_cascade_order() {
        let names: Vec<&str> = SHAPES.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "building-号楼-zone-room",
                "building-号楼-zone-区-room",
                "building-号楼-room",
                "building-zone?-room",
                "compact-token",
                "building-楼?-zone?-room",
            ]
        );
    }

    #[test]
    fn building_zone_room() {
        let k = key("7号楼A303");
        assert_eq!(k.building, "7号楼A区");
        assert_eq!(k.floor, "三楼");
        assert_eq!(k.room, 303);
    }

    #[test]
    fn trailing_text_after_the_room_is_ignored() {
        let traced = normalize_traced("7号楼A303二区走读").unwrap();
        assert_eq!(traced.key, key("7号楼A303"));
        assert_eq!(traced.key.floor, "三楼");
    }

    #[test]
    fn explicit_zone_marker_and_lowercase_zone() {
        let k = key("7号楼b区512");
        assert_eq!(k.building, "7号楼B区");
        assert_eq!(k.floor, "五楼");
        assert_eq!(k.room, 512);
    }

    #[test]
    fn building_without_zone() {
        let k = key("9号楼205");
        assert_eq!(k.building, "9号楼");
        assert_eq!(k.room, 205);
    }

    #[test]
    fn compact_building_zone_room() {
        let k = key("12B205");
        assert_eq!(k.building, "12号楼B区");
        assert_eq!(k.floor, "二楼");
        assert_eq!(k.room, 205);
    }

    #[test]
    fn floor_word_shape() {
        let traced = normalize_traced("3楼201").unwrap();
        assert_eq!(traced.shape, "building-楼?-zone?-room");
        assert_eq!(traced.key.building, "3号楼");
        assert_eq!(traced.key.room, 201);
    }

    #[test]
    fn compact_token_has_no_room_number() {
        let traced = normalize_traced("A3B05").unwrap();
        assert_eq!(traced.shape, "compact-token");
        assert_eq!(traced.key.building, "A3B05号楼");
        assert_eq!(traced.key.floor, "一楼");
        assert_eq!(traced.key.room, 0);
    }

    #[test]
    fn zero_and_one_are_both_ground_floor() {
        assert_eq!(key("7号楼A012").floor, "一楼");
        assert_eq!(key("7号楼A112").floor, "一楼");
        assert_eq!(key("7号楼A912").floor, "九楼");
    }

    #[test]
    fn excluded_categories_fail() {
        assert_eq!(
            normalize("校内田径场"),
            Err(NormalizeError::Excluded { keyword: "校内" })
        );
        assert!(matches!(
            normalize("7号楼实验室301"),
            Err(NormalizeError::Excluded { .. })
        ));
        assert!(matches!(normalize("琴房12"), Err(NormalizeError::Excluded { .. })));
    }

    #[test]
    fn unrecognised_locations_fail() {
        assert_eq!(normalize("教3-201"), Err(NormalizeError::Unmatched));
        assert_eq!(normalize("未知地点"), Err(NormalizeError::Unmatched));
        assert_eq!(normalize(""), Err(NormalizeError::Unmatched));
    }

    #[test]
    fn floor_is_not_part_of_identity() {
        let a = RoomKey {
            building: "7号楼A区".to_string(),
            floor: "三楼".to_string(),
            room: 303,
        };
        let b = RoomKey {
            floor: "一楼".to_string(),
            ..a.clone()
        };
        assert_eq!(a, b);
    }
}
