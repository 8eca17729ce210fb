//! Week descriptor parsing ("1-8,10,12单周" → explicit week numbers).

use crate::data::{WEEKS_PER_TERM, Week};
use log::trace;
use std::collections::BTreeSet;

/// Sorted, de-duplicated week numbers, every one of them in `1..=18`.
pub type WeekSet = BTreeSet<Week>;

/// Result of parsing one descriptor. Rejected segments are kept so the caller
/// can count them; a partially rejected descriptor still yields its good weeks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedWeeks {
    pub weeks: WeekSet,
    pub rejected: Vec<String>,
}

impl ParsedWeeks {
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

pub fn parse_weeks(text: &str) -> ParsedWeeks {
    // parity words go first so "单周" is not half-eaten by the "周" strip
    let cleaned: String = text
        .replace("单周", "")
        .replace("双周", "")
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '（' | '）' | '周'))
        .collect();

    let mut parsed = ParsedWeeks::default();
    for segment in cleaned.split([',', '，']) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match parse_segment(segment) {
            Some(weeks) => parsed.weeks.extend(weeks),
            None => {
                trace!("rejected week segment {:?} in {:?}", segment, text);
                parsed.rejected.push(segment.to_string());
            }
        }
    }
    parsed
}

fn parse_segment(segment: &str) -> Option<Vec<Week>> {
    if let Some((start, end)) = segment.split_once('-') {
        let start = parse_week(start.trim())?;
        let end = parse_week(end.trim())?;
        if start > end {
            return None;
        }
        return Some((start..=end).collect());
    }
    if is_digits(segment) {
        return parse_week(segment).map(|w| vec![w]);
    }
    // "5单" / "6双": the parity marker names a single week, it never expands
    if segment.contains(['单', '双']) {
        let stripped: String = segment.chars().filter(|c| !matches!(c, '单' | '双')).collect();
        return parse_week(stripped.trim()).map(|w| vec![w]);
    }
    None
}

fn parse_week(s: &str) -> Option<Week> {
    if !is_digits(s) {
        return None;
    }
    let week: u32 = s.parse().ok()?;
    if (1..=u32::from(WEEKS_PER_TERM)).contains(&week) {
        Week::try_from(week).ok()
    } else {
        None
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
