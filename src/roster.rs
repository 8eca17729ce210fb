//! File boundary: roster, timetable records and reports in, report out.

use crate::data::{CourseOccurrence, RoomId, RoomReport, RosterEntry};
use crate::error::LoadError;
use calamine::{Data, Reader, open_workbook_auto};
use log::info;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

const COL_BUILDING: &str = "教学楼";
const COL_FLOOR: &str = "楼层";
const COL_ROOM: &str = "教室号";
const COL_KIND: &str = "是否教室";

/// Loads the roster from `.json` (a list of roster entries) or `.xlsx`/`.xls`.
pub fn load_roster(path: &Path) -> Result<Vec<RosterEntry>, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let entries = match ext.as_deref() {
        Some("json") => read_json::<Vec<RosterEntry>>(path)?,
        Some("xlsx" | "xlsm" | "xls" | "ods") => read_roster_sheet(path)?,
        _ => return Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    };
    if entries.is_empty() {
        return Err(LoadError::EmptyRoster(path.to_path_buf()));
    }
    info!("loaded {} rooms from {}", entries.len(), path.display());
    Ok(entries)
}

pub fn load_occurrences(path: &Path) -> Result<Vec<CourseOccurrence>, LoadError> {
    read_json(path)
}

pub fn load_report(path: &Path) -> Result<Vec<RoomReport>, LoadError> {
    read_json(path)
}

/// Plain-text notice file, one display line per non-blank line.
pub fn load_lines(path: &Path) -> Result<Vec<String>, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect())
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), LoadError> {
    let body = serde_json::to_string_pretty(value).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, body).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// First worksheet, header row first. `是否教室` is optional; only the literal
/// value "教室" marks a classroom.
fn read_roster_sheet(path: &Path) -> Result<Vec<RosterEntry>, LoadError> {
    let spreadsheet_err = |message: String| LoadError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };
    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_err(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_err("workbook has no sheets".to_string()))?
        .map_err(|e| spreadsheet_err(e.to_string()))?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_to_string).collect())
        .unwrap_or_default();
    let column = |name: &'static str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: name,
            })
    };
    let building_col = column(COL_BUILDING)?;
    let floor_col = column(COL_FLOOR)?;
    let room_col = column(COL_ROOM)?;
    let kind_col = column(COL_KIND).ok();

    let cell = |row: &[Data], col: usize| row.get(col).map(cell_to_string).unwrap_or_default();
    Ok(rows
        .filter(|row| !cell(*row, building_col).is_empty() || !cell(*row, room_col).is_empty())
        .map(|row| RosterEntry {
            building: cell(row, building_col),
            floor: cell(row, floor_col),
            room_id: RoomId::Text(cell(row, room_col)).coerce(),
            is_class_room: kind_col.is_some_and(|col| cell(row, col) == "教室"),
        })
        .collect())
}

/// Cell text; integral floats print without a fractional part so "303.0" reads as "303".
fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        _ => String::new(),
    }
}
