//! Applies scraped course occurrences to the room roster.
//!
//! Every occurrence ends in exactly one [`Outcome`]; bad records are counted
//! and skipped, never fatal. Counters live in the returned [`Diagnostics`]
//! rather than in process-wide state, so each run starts from zero.

use crate::data::{CourseOccurrence, RoomId, RoomReport, RosterEntry, Week};
use crate::grid::AvailabilityGrid;
use crate::room_key::{self, RoomKey};
use crate::weeks;
use log::{debug, info, trace, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

pub const DEFAULT_SAMPLE_LIMIT: usize = 5;

/// A roster room together with the grid it owns.
#[derive(Debug, Clone)]
pub struct Room {
    pub building: String,
    pub floor: String,
    pub room_id: RoomId,
    pub is_class_room: bool,
    grid: AvailabilityGrid,
}

impl Room {
    pub fn new(entry: RosterEntry) -> Self {
        Self {
            building: entry.building,
            floor: entry.floor,
            room_id: entry.room_id.coerce(),
            is_class_room: entry.is_class_room,
            grid: AvailabilityGrid::new(),
        }
    }

    pub fn grid(&self) -> &AvailabilityGrid {
        &self.grid
    }

    pub fn to_report(&self) -> RoomReport {
        RoomReport {
            building: self.building.clone(),
            floor: self.floor.clone(),
            room_id: self.room_id.clone(),
            is_class_room: self.is_class_room,
            free_time: self.grid.to_report(),
        }
    }
}

/// Rooms in roster order, addressable by (building, room id).
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: Vec<Room>,
    index: HashMap<(String, RoomId), usize>,
}

impl RoomRegistry {
    /// Duplicate (building, room id) rows keep the first entry so each room is reported once.
    pub fn from_roster(entries: impl IntoIterator<Item = RosterEntry>) -> Self {
        let mut registry = Self::default();
        for entry in entries {
            let room = Room::new(entry);
            match registry.index.entry((room.building.clone(), room.room_id.clone())) {
                Entry::Occupied(_) => {
                    warn!("duplicate roster entry {} {} ignored", room.building, room.room_id);
                }
                Entry::Vacant(slot) => {
                    slot.insert(registry.rooms.len());
                    registry.rooms.push(room);
                }
            }
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn get(&self, key: &RoomKey) -> Option<&Room> {
        self.lookup(key).map(|i| &self.rooms[i])
    }

    fn lookup(&self, key: &RoomKey) -> Option<usize> {
        self.index
            .get(&(key.building.clone(), RoomId::Number(key.room)))
            .copied()
    }

    pub fn reports(&self) -> Vec<RoomReport> {
        self.rooms.iter().map(Room::to_report).collect()
    }

    pub fn occupancy(&self) -> Occupancy {
        Occupancy {
            total_slots: self.rooms.len() * AvailabilityGrid::SLOT_COUNT,
            occupied: self.rooms.iter().map(|r| r.grid.occupied_count()).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    pub total_slots: usize,
    pub occupied: usize,
}

impl Occupancy {
    pub fn free(&self) -> usize {
        self.total_slots - self.occupied
    }

    fn percent(&self, n: usize) -> f64 {
        if self.total_slots == 0 {
            0.0
        } else {
            n as f64 * 100.0 / self.total_slots as f64
        }
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} slots, {} occupied ({:.2}%), {} free ({:.2}%)",
            self.total_slots,
            self.occupied,
            self.percent(self.occupied),
            self.free(),
            self.percent(self.free())
        )
    }
}

/// What happened to one occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    Marked {
        building: String,
        room: u32,
        weeks: Vec<Week>,
        newly_occupied: usize,
    },
    MissingField {
        field: &'static str,
    },
    NormalizeFailed {
        reason: String,
    },
    RoomNotFound {
        building: String,
        room: u32,
    },
    WeeksEmpty {
        rejected_segments: Vec<String>,
    },
    /// Weekend day or evening section: the room and weeks resolved but the grid has no such slot.
    OutsideGrid {
        week_day: String,
        section: String,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Marked { .. })
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Outcome::Marked { .. } => "marked",
            Outcome::MissingField { .. } => "missing required field",
            Outcome::NormalizeFailed { .. } => "room normalization failed",
            Outcome::RoomNotFound { .. } => "room not in roster",
            Outcome::WeeksEmpty { .. } => "no weeks parsed",
            Outcome::OutsideGrid { .. } => "slot outside grid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordDiagnostic {
    pub index: usize,
    pub occurrence: CourseOccurrence,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub marked: usize,
    pub missing_field: usize,
    pub normalize_failed: usize,
    pub room_not_found: usize,
    pub weeks_empty: usize,
    pub outside_grid: usize,
    /// Segment-level week rejections, counted even when the descriptor still yields weeks.
    pub rejected_week_segments: usize,
}

impl Counters {
    pub fn failures(&self) -> usize {
        self.missing_field + self.normalize_failed + self.room_not_found + self.weeks_empty + self.outside_grid
    }
}

/// Run-scoped counters plus the full per-record trail.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub counters: Counters,
    pub records: Vec<RecordDiagnostic>,
}

impl Diagnostics {
    fn record(&mut self, index: usize, occurrence: &CourseOccurrence, outcome: Outcome) {
        let c = &mut self.counters;
        match &outcome {
            Outcome::Marked { .. } => c.marked += 1,
            Outcome::MissingField { .. } => c.missing_field += 1,
            Outcome::NormalizeFailed { .. } => c.normalize_failed += 1,
            Outcome::RoomNotFound { .. } => c.room_not_found += 1,
            Outcome::WeeksEmpty { .. } => c.weeks_empty += 1,
            Outcome::OutsideGrid { .. } => c.outside_grid += 1,
        }
        trace!("#{} {} -> {}", index + 1, occurrence, outcome.reason());
        self.records.push(RecordDiagnostic {
            index,
            occurrence: occurrence.clone(),
            outcome,
        });
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordDiagnostic> {
        self.records.iter().filter(|r| !r.outcome.is_success())
    }

    /// The first `limit` failures, for operator review.
    pub fn failure_sample(&self, limit: usize) -> Vec<&RecordDiagnostic> {
        self.failures().take(limit).collect()
    }

    pub fn log_summary(&self, sample_limit: usize) {
        let c = &self.counters;
        info!("marked occurrences: {}", c.marked);
        info!("room normalization failures: {}", c.normalize_failed);
        info!("rooms not found: {}", c.room_not_found);
        info!(
            "week parse failures: {} (rejected segments: {})",
            c.weeks_empty, c.rejected_week_segments
        );
        info!("missing fields: {}, outside grid: {}", c.missing_field, c.outside_grid);

        let total = c.failures();
        if total > 0 {
            warn!("{} failed records, first {}:", total, sample_limit.min(total));
            for (i, record) in self.failure_sample(sample_limit).into_iter().enumerate() {
                warn!("  example {}: {} :: {}", i + 1, record.outcome.reason(), record.occurrence);
            }
        }
    }
}

/// Marks every occurrence into the registry, in input order.
pub fn ingest(registry: &mut RoomRegistry, occurrences: &[CourseOccurrence]) -> Diagnostics {
    info!("processing {} timetable records", occurrences.len());
    let mut diagnostics = Diagnostics::default();
    for (index, occurrence) in occurrences.iter().enumerate() {
        let outcome = apply(registry, occurrence, &mut diagnostics.counters);
        diagnostics.record(index, occurrence, outcome);
    }
    debug!("ingestion finished: {:?}", diagnostics.counters);
    diagnostics
}

fn apply(registry: &mut RoomRegistry, occurrence: &CourseOccurrence, counters: &mut Counters) -> Outcome {
    let (Some(room_text), Some(weeks_text), Some(week_day), Some(section)) = (
        occurrence.room_text.as_deref(),
        occurrence.weeks_text.as_deref(),
        occurrence.week_day.as_deref(),
        occurrence.section.as_deref(),
    ) else {
        return Outcome::MissingField {
            field: occurrence.missing_field().unwrap_or("unknown"),
        };
    };

    let key = match room_key::normalize(room_text) {
        Ok(key) => key,
        Err(err) => {
            return Outcome::NormalizeFailed {
                reason: err.to_string(),
            };
        }
    };

    let Some(index) = registry.lookup(&key) else {
        return Outcome::RoomNotFound {
            building: key.building,
            room: key.room,
        };
    };

    let parsed = weeks::parse_weeks(weeks_text);
    counters.rejected_week_segments += parsed.rejected.len();
    if parsed.is_empty() {
        return Outcome::WeeksEmpty {
            rejected_segments: parsed.rejected,
        };
    }

    let room = &mut registry.rooms[index];
    match room.grid.mark_occupied_labels(week_day, section, &parsed.weeks) {
        Some(newly_occupied) => Outcome::Marked {
            building: key.building,
            room: key.room,
            weeks: parsed.weeks.into_iter().collect(),
            newly_occupied,
        },
        None => Outcome::OutsideGrid {
            week_day: week_day.to_string(),
            section: section.to_string(),
        },
    }
}
