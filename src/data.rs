use serde::{Deserialize, Serialize};
use std::fmt;

// Type aliases for clarity
pub type Week = u8;
pub type RoomNumber = u32;

pub const WEEKS_PER_TERM: Week = 18;

/// One of the five teaching days covered by the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Parses the timetable label ("星期一".."星期五"). Weekend labels are not part of the grid.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "星期一" => Some(Weekday::Monday),
            "星期二" => Some(Weekday::Tuesday),
            "星期三" => Some(Weekday::Wednesday),
            "星期四" => Some(Weekday::Thursday),
            "星期五" => Some(Weekday::Friday),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Monday => "星期一",
            Weekday::Tuesday => "星期二",
            Weekday::Wednesday => "星期三",
            Weekday::Thursday => "星期四",
            Weekday::Friday => "星期五",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A daily time block made of two consecutive class periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
}

impl Section {
    /// Sections in daily order; consecutive-free lookups rely on this order.
    pub const ALL: [Section; 5] = [
        Section::First,
        Section::Second,
        Section::Third,
        Section::Fourth,
        Section::Fifth,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0102" => Some(Section::First),
            "0304" => Some(Section::Second),
            "0506" => Some(Section::Third),
            "0708" => Some(Section::Fourth),
            "0910" => Some(Section::Fifth),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Section::First => "0102",
            Section::Second => "0304",
            Section::Third => "0506",
            Section::Fourth => "0708",
            Section::Fifth => "0910",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Represents one scheduled meeting of a course, as scraped from the timetable.
///
/// Every field is optional on the wire so that incomplete scraper output can
/// be reported instead of rejected at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseOccurrence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, rename = "weeks", skip_serializing_if = "Option::is_none")]
    pub weeks_text: Option<String>,
    #[serde(default, rename = "classRoom", skip_serializing_if = "Option::is_none")]
    pub room_text: Option<String>,
}

impl CourseOccurrence {
    pub fn new(
        week_day: &str,
        section: &str,
        course_name: &str,
        class_name: &str,
        weeks_text: &str,
        room_text: &str,
    ) -> Self {
        Self {
            week_day: Some(week_day.to_string()),
            section: Some(section.to_string()),
            course_name: Some(course_name.to_string()),
            class_name: Some(class_name.to_string()),
            weeks_text: Some(weeks_text.to_string()),
            room_text: Some(room_text.to_string()),
        }
    }

    /// Name of the first required field that is absent, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.room_text.is_none() {
            Some("classRoom")
        } else if self.weeks_text.is_none() {
            Some("weeks")
        } else if self.week_day.is_none() {
            Some("weekDay")
        } else if self.section.is_none() {
            Some("section")
        } else {
            None
        }
    }
}

impl fmt::Display for CourseOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{} {} {} [{}] weeks={} room={}",
            field(&self.week_day),
            field(&self.section),
            field(&self.course_name),
            field(&self.class_name),
            field(&self.weeks_text),
            field(&self.room_text),
        )
    }
}

/// Roster identity of a room. Purely numeric ids are coerced to numbers on load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged, from = "RawRoomId")]
pub enum RoomId {
    Number(RoomNumber),
    Text(String),
}

/// Ids as spreadsheet exports write them; `205.0` is room 205.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRoomId {
    Number(RoomNumber),
    Float(f64),
    Text(String),
}

impl From<RawRoomId> for RoomId {
    fn from(raw: RawRoomId) -> Self {
        match raw {
            RawRoomId::Number(n) => RoomId::Number(n),
            RawRoomId::Float(f) if f.fract() == 0.0 && (0.0..=f64::from(RoomNumber::MAX)).contains(&f) => {
                RoomId::Number(f as RoomNumber)
            }
            RawRoomId::Float(f) => RoomId::Text(f.to_string()),
            RawRoomId::Text(s) => RoomId::Text(s),
        }
    }
}

impl RoomId {
    pub fn coerce(self) -> Self {
        match self {
            RoomId::Text(s) => {
                let trimmed = s.trim();
                if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
                    match trimmed.parse() {
                        Ok(n) => RoomId::Number(n),
                        Err(_) => RoomId::Text(s),
                    }
                } else {
                    RoomId::Text(s)
                }
            }
            number => number,
        }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomId::Number(n) => write!(f, "{}", n),
            RoomId::Text(s) => f.write_str(s),
        }
    }
}

/// One row of the room roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RosterEntry {
    pub building: String,
    pub floor: String,
    pub room_id: RoomId,
    #[serde(default)]
    pub is_class_room: bool,
}

/// Free/busy state of a single (week, weekday) cell within one section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotReport {
    pub week: Week,
    pub week_day: String,
    pub is_free: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SectionReport {
    pub section: String,
    pub weeks: Vec<SlotReport>,
}

/// The final per-room output consumed by the lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoomReport {
    pub building: String,
    pub floor: String,
    pub room_id: RoomId,
    pub is_class_room: bool,
    pub free_time: Vec<SectionReport>,
}
