//! Data-quality checks over scraped timetable records.
//!
//! Two independent passes: one counts records whose weeks or location fell
//! back to the scraper placeholders, the other checks the loose textual shape
//! of both fields. Neither touches the grids.

use crate::data::CourseOccurrence;
use log::{info, warn};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

const PLACEHOLDER_WEEKS: [&str; 2] = ["未知周次", ""];
const PLACEHOLDER_LOCATIONS: [&str; 2] = ["未知地点", ""];

// an alphanumeric followed by at least one more character
static LOCATION_SHAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-zA-Z0-9].").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    Both,
    Weeks,
    Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsingProblem {
    pub kind: ProblemKind,
    pub record: CourseOccurrence,
}

/// Placeholder counts. A record missing both fields counts toward both tallies.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsingReport {
    pub total: usize,
    pub success: usize,
    pub missing_weeks: usize,
    pub missing_location: usize,
    pub problems: Vec<ParsingProblem>,
}

impl ParsingReport {
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.success as f64 * 100.0 / self.total as f64
        }
    }

    pub fn log_summary(&self, limit: usize) {
        info!(
            "records: {}, parsed cleanly: {} ({:.2}%), missing weeks: {}, missing location: {}",
            self.total,
            self.success,
            self.success_rate(),
            self.missing_weeks,
            self.missing_location
        );
        for problem in self.problems.iter().take(limit) {
            warn!("  {:?}: weeks={:?} location={:?}", problem.kind, problem.record.weeks_text, problem.record.room_text);
        }
    }
}

fn is_placeholder(value: Option<&str>, placeholders: &[&str]) -> bool {
    let value = value.unwrap_or_default();
    placeholders.iter().any(|p| *p == value)
}

pub fn validate_parsing(occurrences: &[CourseOccurrence]) -> ParsingReport {
    let mut report = ParsingReport {
        total: occurrences.len(),
        ..Default::default()
    };
    for record in occurrences {
        let weeks = is_placeholder(record.weeks_text.as_deref(), &PLACEHOLDER_WEEKS);
        let location = is_placeholder(record.room_text.as_deref(), &PLACEHOLDER_LOCATIONS);
        let kind = match (weeks, location) {
            (false, false) => {
                report.success += 1;
                continue;
            }
            (true, true) => ProblemKind::Both,
            (true, false) => ProblemKind::Weeks,
            (false, true) => ProblemKind::Location,
        };
        if weeks {
            report.missing_weeks += 1;
        }
        if location {
            report.missing_location += 1;
        }
        report.problems.push(ParsingProblem {
            kind,
            record: record.clone(),
        });
    }
    report
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternIssue {
    pub record: CourseOccurrence,
    pub weeks_valid: bool,
    pub location_valid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternReport {
    pub valid: usize,
    pub invalid: Vec<PatternIssue>,
}

impl PatternReport {
    pub fn log_summary(&self, limit: usize) {
        info!(
            "format check: {}/{} records well-formed",
            self.valid,
            self.valid + self.invalid.len()
        );
        for issue in self.invalid.iter().take(limit) {
            warn!(
                "  {}: weeks {:?} ({}), location {:?} ({})",
                issue.record.course_name.as_deref().unwrap_or_default(),
                issue.record.weeks_text,
                if issue.weeks_valid { "ok" } else { "bad" },
                issue.record.room_text,
                if issue.location_valid { "ok" } else { "bad" },
            );
        }
    }
}

/// Weeks must end in "周"; the location must hold an alphanumeric that is not its last character.
pub fn validate_patterns(occurrences: &[CourseOccurrence]) -> PatternReport {
    let mut report = PatternReport::default();
    for record in occurrences {
        let weeks_valid = record.weeks_text.as_deref().is_some_and(|w| w.ends_with('周'));
        let location_valid = record
            .room_text
            .as_deref()
            .is_some_and(|l| LOCATION_SHAPE.is_match(l));
        if weeks_valid && location_valid {
            report.valid += 1;
        } else {
            report.invalid.push(PatternIssue {
                record: record.clone(),
                weeks_valid,
                location_valid,
            });
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(weeks: &str, room: &str) -> CourseOccurrence {
        CourseOccurrence::new("星期一", "0102", "高数", "1班", weeks, room)
    }

    #[test]
    fn splits_problems_by_missing_field() {
        let report = validate_parsing(&[
            occ("1-8周", "7号楼A303"),
            occ("未知周次", "未知地点"),
            occ("", "7号楼A303"),
            occ("1-8周", ""),
            occ("3周", "未知地点"),
        ]);
        assert_eq!(report.total, 5);
        assert_eq!(report.success, 1);
        assert_eq!(report.missing_weeks, 2);
        assert_eq!(report.missing_location, 3);
        let kinds: Vec<ProblemKind> = report.problems.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ProblemKind::Both,
                ProblemKind::Weeks,
                ProblemKind::Location,
                ProblemKind::Location
            ]
        );
        assert!((report.success_rate() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn absent_fields_count_as_placeholders() {
        let report = validate_parsing(&[CourseOccurrence::default()]);
        assert_eq!(report.problems[0].kind, ProblemKind::Both);
        assert_eq!(validate_parsing(&[]).success_rate(), 0.0);
    }

    #[test]
    fn problem_list_serializes_kind_and_record() {
        let report = validate_parsing(&[occ("未知周次", "7号楼A303")]);
        let value = serde_json::to_value(&report.problems).unwrap();
        assert_eq!(value[0]["kind"], serde_json::json!("weeks"));
        assert_eq!(value[0]["record"]["classRoom"], serde_json::json!("7号楼A303"));
    }

    #[test]
    fn pattern_check_flags_each_field() {
        let report = validate_patterns(&[
            occ("1-8周", "7号楼A303"),
            occ("1-8", "7号楼A303"),
            occ("1-8周", "体育馆"),
            occ("1-8周", "操场3"),
            occ("", ""),
        ]);
        assert_eq!(report.valid, 1);
        let flags: Vec<(bool, bool)> = report
            .invalid
            .iter()
            .map(|i| (i.weeks_valid, i.location_valid))
            .collect();
        assert_eq!(flags, vec![(false, true), (true, false), (true, false), (false, false)]);
    }
}
