//! Detects literal duplicate timetable entries.
//!
//! Keys on the raw location text, not the normalized room key: the point is to
//! catch the same cell typed twice, before any normalization is applied.

use crate::data::CourseOccurrence;
use log::{info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

/// Location values meaning "the scraper found no location".
const PLACEHOLDER_LOCATIONS: [&str; 2] = ["未知地点", ""];

/// Two entries claiming the same weekday, section, location text and week text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub location: String,
    pub week_day: String,
    pub section: String,
    pub existing: CourseOccurrence,
    pub new: CourseOccurrence,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let course = |o: &CourseOccurrence| o.course_name.clone().unwrap_or_default();
        let weeks = |o: &CourseOccurrence| o.weeks_text.clone().unwrap_or_default();
        write!(
            f,
            "{} {} {}节: {} ({}) vs {} ({})",
            self.location,
            self.week_day,
            self.section,
            course(&self.existing),
            weeks(&self.existing),
            course(&self.new),
            weeks(&self.new)
        )
    }
}

pub fn detect(occurrences: &[CourseOccurrence]) -> Vec<Conflict> {
    let mut first_seen: HashMap<(&str, &str, &str), &CourseOccurrence> = HashMap::new();
    let mut conflicts = Vec::new();

    for occurrence in occurrences {
        let location = occurrence.room_text.as_deref().unwrap_or_default();
        if PLACEHOLDER_LOCATIONS.contains(&location) {
            continue;
        }
        let key = (
            occurrence.week_day.as_deref().unwrap_or_default(),
            occurrence.section.as_deref().unwrap_or_default(),
            location,
        );
        match first_seen.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(occurrence);
            }
            Entry::Occupied(slot) => {
                let existing = *slot.get();
                if existing.weeks_text == occurrence.weeks_text {
                    conflicts.push(Conflict {
                        location: location.to_string(),
                        week_day: key.0.to_string(),
                        section: key.1.to_string(),
                        existing: existing.clone(),
                        new: occurrence.clone(),
                    });
                }
            }
        }
    }
    conflicts
}

/// Logs the first `limit` conflicts; returns how many there were in total.
pub fn report(conflicts: &[Conflict], limit: usize) -> usize {
    if conflicts.is_empty() {
        info!("no time/location conflicts found");
        return 0;
    }
    warn!("found {} potential time/location conflicts", conflicts.len());
    for conflict in conflicts.iter().take(limit) {
        warn!("  {}", conflict);
    }
    conflicts.len()
}
