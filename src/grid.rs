use crate::data::{Section, SectionReport, SlotReport, WEEKS_PER_TERM, Week, Weekday};
use crate::weeks::WeekSet;

const SECTIONS: usize = Section::ALL.len();
const WEEKS: usize = WEEKS_PER_TERM as usize;
const WEEKDAYS: usize = Weekday::ALL.len();

/// Free/busy table of one room: section × week × weekday, `true` meaning free.
///
/// Slots only ever go from free to occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityGrid {
    free: [[[bool; WEEKDAYS]; WEEKS]; SECTIONS],
}

impl Default for AvailabilityGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl AvailabilityGrid {
    pub const SLOT_COUNT: usize = SECTIONS * WEEKS * WEEKDAYS;

    pub fn new() -> Self {
        Self {
            free: [[[true; WEEKDAYS]; WEEKS]; SECTIONS],
        }
    }

    /// Marks every listed week of `(weekday, section)` occupied. Weeks outside
    /// the term are ignored. Returns how many slots flipped from free to busy.
    pub fn mark_occupied(&mut self, weekday: Weekday, section: Section, weeks: &WeekSet) -> usize {
        let mut flipped = 0;
        for &week in weeks {
            let Some(w) = week_index(week) else {
                continue;
            };
            let slot = &mut self.free[section.index()][w][weekday.index()];
            if *slot {
                *slot = false;
                flipped += 1;
            }
        }
        flipped
    }

    /// Label-level variant for raw timetable values. Unknown weekday or section
    /// labels leave the grid untouched and return `None`.
    pub fn mark_occupied_labels(&mut self, weekday: &str, section: &str, weeks: &WeekSet) -> Option<usize> {
        let weekday = Weekday::from_label(weekday)?;
        let section = Section::from_code(section)?;
        Some(self.mark_occupied(weekday, section, weeks))
    }

    pub fn is_free(&self, weekday: Weekday, section: Section, week: Week) -> bool {
        week_index(week).is_none_or(|w| self.free[section.index()][w][weekday.index()])
    }

    pub fn occupied_count(&self) -> usize {
        self.free
            .iter()
            .flatten()
            .flatten()
            .filter(|free| !**free)
            .count()
    }

    /// Full materialization, sections in daily order and slots ordered by (week, weekday).
    pub fn to_report(&self) -> Vec<SectionReport> {
        Section::ALL
            .into_iter()
            .map(|section| SectionReport {
                section: section.code().to_string(),
                weeks: (1..=WEEKS_PER_TERM)
                    .flat_map(|week| {
                        Weekday::ALL.into_iter().map(move |weekday| SlotReport {
                            week,
                            week_day: weekday.label().to_string(),
                            is_free: self.is_free(weekday, section, week),
                        })
                    })
                    .collect(),
            })
            .collect()
    }
}

fn week_index(week: Week) -> Option<usize> {
    (1..=WEEKS_PER_TERM)
        .contains(&week)
        .then(|| usize::from(week - 1))
}
