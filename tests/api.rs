use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use free_room::build_report;
use free_room::data::{CourseOccurrence, RosterEntry};
use free_room::server::{Notices, router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> axum::Router {
    let rooms: Vec<RosterEntry> = serde_json::from_value(json!([
        {"building": "7号楼A区", "floor": "三楼", "room_id": 303, "is_class_room": true},
        {"building": "7号楼A区", "floor": "三楼", "room_id": 305, "is_class_room": true},
        {"building": "7号楼A区", "floor": "一楼", "room_id": 101, "is_class_room": false}
    ]))
    .unwrap();
    let occurrences = vec![CourseOccurrence::new("星期一", "0304", "高数", "1班", "1-4", "7号楼A303")];
    let notices = Notices {
        announcement: vec!["第18周起停止自习室开放".to_string()],
        info: vec!["选择周次、星期和起始节次后查询".to_string()],
    };
    router(build_report(rooms, &occurrences).reports, notices)
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn lists_consecutive_free_sections() {
    let uri = "/api/free_classrooms?week=2&weekDay=%E6%98%9F%E6%9C%9F%E4%B8%80&section=0102";
    let (status, body) = get(uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["room_id"], json!(303));
    assert_eq!(data[0]["max_continuous"], json!(1));
    assert_eq!(data[0]["free_sections"], json!(["0102"]));
    assert_eq!(data[1]["room_id"], json!(305));
    assert_eq!(data[1]["max_continuous"], json!(5));
}

#[tokio::test]
async fn busy_start_section_excludes_the_room() {
    let uri = "/api/free_classrooms?week=4&weekDay=%E6%98%9F%E6%9C%9F%E4%B8%80&section=0304";
    let (_, body) = get(uri).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["room_id"], json!(305));
}

#[tokio::test]
async fn invalid_parameters_are_bad_requests() {
    let (status, body) = get("/api/free_classrooms?week=2&section=0102").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["data"], Value::Null);

    let uri = "/api/free_classrooms?week=20&weekDay=%E6%98%9F%E6%9C%9F%E4%B8%80&section=0102";
    assert_eq!(get(uri).await.0, StatusCode::BAD_REQUEST);

    let uri = "/api/free_classrooms?week=2&weekDay=%E6%98%9F%E6%9C%9F%E4%B8%80&section=1112";
    assert_eq!(get(uri).await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn weekend_lookup_is_an_empty_success() {
    // 星期六
    let uri = "/api/free_classrooms?week=2&weekDay=%E6%98%9F%E6%9C%9F%E5%85%AD&section=0102";
    let (status, body) = get(uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn announcement_has_title_and_lines() {
    let (status, body) = get("/api/announcement").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(
        body["data"],
        json!({"title": "📢 公告", "lines": ["第18周起停止自习室开放"]})
    );
}

#[tokio::test]
async fn info_carries_lines_and_room_counts() {
    let (status, body) = get("/api/info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({"lines": ["选择周次、星期和起始节次后查询"], "rooms": 3, "classrooms": 2})
    );
}

#[tokio::test]
async fn notices_default_to_empty_lines() {
    let app = router(Vec::new(), Notices::default());
    let response = app
        .oneshot(Request::builder().uri("/api/info").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["lines"], json!([]));
    assert_eq!(body["data"]["rooms"], json!(0));
}
