use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::{RoomReport, Section, WEEKS_PER_TERM, Weekday};
use crate::query::{self, FreeRoom, FreeRoomQuery};

/// Display lines served by `/api/announcement` and `/api/info`.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    pub announcement: Vec<String>,
    pub info: Vec<String>,
}

pub const ANNOUNCEMENT_TITLE: &str = "📢 公告";

struct AppState {
    report: Vec<RoomReport>,
    notices: Notices,
}

type SharedState = Arc<AppState>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeRoomParams {
    week: Option<String>,
    week_day: Option<String>,
    section: Option<String>,
    building: Option<String>,
    floor: Option<String>,
}

/// Envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub msg: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Announcement {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportInfo {
    pub lines: Vec<String>,
    pub rooms: usize,
    pub classrooms: usize,
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<T>>)>;

fn bad_request<T>(msg: String) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse {
            success: false,
            data: None,
            msg,
        }),
    )
}

#[derive(Debug)]
enum Lookup {
    Grid(FreeRoomQuery),
    /// A weekDay no grid has slots for (weekend, typos): nothing can be free.
    OffGrid { section: Section, week_day: String },
}

fn parse_query(params: FreeRoomParams) -> Result<Lookup, String> {
    let (Some(week), Some(week_day), Some(section)) = (params.week, params.week_day, params.section) else {
        return Err("missing required parameters: week, weekDay, section".to_string());
    };
    let week = week
        .trim()
        .parse()
        .ok()
        .filter(|w| (1..=WEEKS_PER_TERM).contains(w))
        .ok_or_else(|| format!("week must be an integer between 1 and {}", WEEKS_PER_TERM))?;
    let section = Section::from_code(&section).ok_or_else(|| {
        format!("section must be one of: {}", Section::ALL.iter().map(|s| s.code()).join(", "))
    })?;
    let Some(weekday) = Weekday::from_label(&week_day) else {
        return Ok(Lookup::OffGrid { section, week_day });
    };
    Ok(Lookup::Grid(FreeRoomQuery {
        week,
        weekday,
        section,
        building: params.building.filter(|b| !b.is_empty()),
        floor: params.floor.filter(|f| !f.is_empty()),
    }))
}

async fn free_classrooms_handler(
    State(state): State<SharedState>,
    Query(params): Query<FreeRoomParams>,
) -> ApiResult<Vec<FreeRoom>> {
    let (section, rooms) = match parse_query(params).map_err(bad_request)? {
        Lookup::Grid(query) => {
            let rooms = query::find_free_rooms(&state.report, &query);
            debug!("free room query {:?} -> {} rooms", query, rooms.len());
            (query.section, rooms)
        }
        Lookup::OffGrid { section, week_day } => {
            debug!("weekDay {:?} has no grid slots", week_day);
            (section, Vec::new())
        }
    };
    Ok(Json(ApiResponse {
        success: true,
        msg: format!(
            "found {} classrooms with free sections starting at {}",
            rooms.len(),
            section
        ),
        data: Some(rooms),
    }))
}

async fn announcement_handler(State(state): State<SharedState>) -> Json<ApiResponse<Announcement>> {
    Json(ApiResponse {
        success: true,
        data: Some(Announcement {
            title: ANNOUNCEMENT_TITLE.to_string(),
            lines: state.notices.announcement.clone(),
        }),
        msg: String::new(),
    })
}

async fn info_handler(State(state): State<SharedState>) -> Json<ApiResponse<ReportInfo>> {
    Json(ApiResponse {
        success: true,
        data: Some(ReportInfo {
            lines: state.notices.info.clone(),
            rooms: state.report.len(),
            classrooms: state.report.iter().filter(|r| r.is_class_room).count(),
        }),
        msg: String::new(),
    })
}

pub fn router(report: Vec<RoomReport>, notices: Notices) -> Router {
    Router::new()
        .route("/api/free_classrooms", get(free_classrooms_handler))
        .route("/api/announcement", get(announcement_handler))
        .route("/api/info", get(info_handler))
        .with_state(Arc::new(AppState { report, notices }))
}

pub async fn run_server(addr: &str, report: Vec<RoomReport>, notices: Notices) -> std::io::Result<()> {
    let app = router(report, notices);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
