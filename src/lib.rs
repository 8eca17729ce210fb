//! Classroom availability builder.
//!
//! Turns scraped timetable records and a room roster into a per-room
//! free/busy grid (5 sections × 18 weeks × 5 weekdays), and answers
//! "which rooms are free" lookups over the finished report.

pub mod conflict;
pub mod data;
pub mod error;
pub mod grid;
pub mod ingest;
pub mod query;
pub mod room_key;
pub mod roster;
pub mod server;
pub mod validate;
pub mod weeks;

use data::{CourseOccurrence, RoomReport, RosterEntry};
use ingest::{Diagnostics, Occupancy, RoomRegistry};

/// Everything one build run produces.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub reports: Vec<RoomReport>,
    pub diagnostics: Diagnostics,
    pub occupancy: Occupancy,
}

/// Roster + timetable records → one report per roster room.
pub fn build_report(roster: Vec<RosterEntry>, occurrences: &[CourseOccurrence]) -> BuildOutput {
    let mut registry = RoomRegistry::from_roster(roster);
    let diagnostics = ingest::ingest(&mut registry, occurrences);
    BuildOutput {
        reports: registry.reports(),
        occupancy: registry.occupancy(),
        diagnostics,
    }
}
