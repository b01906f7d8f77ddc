
use axum::http::StatusCode;
use fixtures::{add_professional, app, send, test_db, ANA};
use serde_json::json;

fn booking_body(professional: serde_json::Value, datetime: &str) -> serde_json::Value {
    json!({
        "name": "Juan Soto",
        "email": "juan@example.com",
        "rut": "7520873-1",
        "phone": "+56912345678",
        "professional": professional,
        "datetime": datetime,
    })
}

#[tokio::test]
async fn test_booking_flow_over_http() {
    let db = test_db().await;
    let ana = add_professional(&db.client, ANA, 30).await;
    let (router, _queue, _receiver) = app(&db.client);

    let (status, body) = send(
        &router,
        "POST",
        "/availability",
        Some(json!({"professional": ANA, "date": "2024-06-10", "hours": ["09:00", "09:30"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hours"], json!(["09:00", "09:30"]));

    let free_uri = format!("/availability/free?professional={}&date=2024-06-10", ana.id);
    let (status, body) = send(&router, "GET", &free_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hours"], json!(["09:00", "09:30"]));

    let (status, body) = send(
        &router,
        "POST",
        "/bookings",
        Some(booking_body(json!(ANA), "2024-06-10T09:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["booking"]["start_at"], "2024-06-10T09:00:00");
    assert_eq!(body["booking"]["end_at"], "2024-06-10T09:30:00");
    assert!(body.get("meetingLink").is_none());

    let (_, body) = send(&router, "GET", &free_uri, None).await;
    assert_eq!(body["hours"], json!(["09:30"]));

    let (status, body) = send(
        &router,
        "POST",
        "/bookings",
        Some(booking_body(json!(ana.id), "2024-06-10T09:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 409);

    let list_uri = format!("/bookings?professional_id={}&from=2024-06-10&to=2024-06-10", ana.id);
    let (status, body) = send(&router, "GET", &list_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["professional_name"], ANA);
}

#[tokio::test]
async fn test_invalid_booking_lists_fields() {
    let db = test_db().await;
    add_professional(&db.client, ANA, 30).await;
    let (router, _queue, _receiver) = app(&db.client);

    let mut body = booking_body(json!(ANA), "2024-06-10T09:00");
    body["rut"] = json!("12345678-9");
    body["email"] = json!("no-es-un-correo");

    let (status, response) = send(&router, "POST", "/bookings", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["fields"], json!(["email", "rut"]));

    let (status, _) = send(
        &router,
        "POST",
        "/bookings",
        Some(booking_body(json!("Dr. Nadie"), "2024-06-10T09:00")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_booking_is_idempotent() {
    let db = test_db().await;
    let (router, _queue, _receiver) = app(&db.client);

    for _ in 0..2 {
        let (status, body) = send(&router, "DELETE", "/bookings/999", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "deleted": 0}));
    }
}

#[tokio::test]
async fn test_bad_filters_are_rejected() {
    let db = test_db().await;
    let (router, _queue, _receiver) = app(&db.client);

    let (status, _) = send(&router, "GET", "/bookings?from=10-06-2024", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&router, "GET", "/availability/free?date=2024-06-10", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["fields"], json!(["professional"]));

    let (status, _) = send(&router, "GET", "/availability?professional=Dr.%20Nadie", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_professional_administration() {
    let db = test_db().await;
    let (router, _queue, _receiver) = app(&db.client);

    let (status, created) = send(
        &router,
        "POST",
        "/professionals",
        Some(json!({"name": "Lic. Roberto Ruiz", "bio": "Psicólogo adulto y adolescente", "duration_minutes": 50})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["duration_minutes"], 50);

    let (status, _) = send(
        &router,
        "POST",
        "/professionals",
        Some(json!({"name": "Lic. Roberto Ruiz"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&router, "POST", "/professionals", Some(json!({"name": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = send(
        &router,
        "PUT",
        &format!("/professionals/{}", id),
        Some(json!({"name": "Lic. Roberto Ruiz", "work_start": "10:00", "work_end": "18:00"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["work_start"], "10:00");
    assert_eq!(updated["duration_minutes"], 30);

    let (status, _) = send(
        &router,
        "PUT",
        "/professionals/999",
        Some(json!({"name": "Nadie"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&router, "GET", "/professionals", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let uri = format!("/professionals/{}", id);
    let (status, body) = send(&router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);
    let (status, body) = send(&router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 0);
}

#[tokio::test]
async fn test_staff_login() {
    let db = test_db().await;
    let (router, _queue, _receiver) = app(&db.client);

    let (status, body) = send(
        &router,
        "POST",
        "/login",
        Some(json!({"name": "admin", "password": "1234"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "role": "admin"}));

    let (status, body) = send(
        &router,
        "POST",
        "/login",
        Some(json!({"name": "admin", "password": "0000"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_follow_up_board_and_retry() {
    let db = test_db().await;
    add_professional(&db.client, ANA, 30).await;
    let (router, _queue, _receiver) = app(&db.client);

    let (_, created) = send(
        &router,
        "POST",
        "/bookings",
        Some(booking_body(json!(ANA), "2024-06-10T09:00")),
    )
    .await;
    let booking_id = created["booking"]["id"].as_i64().unwrap();

    let (status, board) = send(&router, "GET", "/admin/follow-ups", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board[0]["booking_id"], booking_id);
    assert_eq!(board[0]["meeting"], "pending");

    let (status, record) = send(
        &router,
        "POST",
        &format!("/admin/follow-ups/{}/retry", booking_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(record["booking_id"], booking_id);

    let (status, _) = send(&router, "POST", "/admin/follow-ups/999/retry", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deletes_clear_follow_up_records() {
    let db = test_db().await;
    let ana = add_professional(&db.client, ANA, 30).await;
    let (router, queue, _receiver) = app(&db.client);

    let mut ids = Vec::new();
    for datetime in ["2024-06-10T09:00", "2024-06-10T10:00", "2024-06-10T11:00"] {
        let (status, created) = send(
            &router,
            "POST",
            "/bookings",
            Some(booking_body(json!(ana.id), datetime)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(created["booking"]["id"].as_i64().unwrap());
    }
    assert_eq!(queue.log().snapshot().len(), 3);

    let (status, _) = send(&router, "DELETE", &format!("/bookings/{}", ids[0]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(queue.log().get(ids[0]).is_none());
    assert_eq!(queue.log().snapshot().len(), 2);

    let (status, _) = send(&router, "DELETE", &format!("/professionals/{}", ana.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(queue.log().snapshot().is_empty());

    let (_, board) = send(&router, "GET", "/admin/follow-ups", None).await;
    assert_eq!(board, json!([]));
}

#[tokio::test]
async fn test_health() {
    let db = test_db().await;
    let (router, _queue, _receiver) = app(&db.client);

    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "up");
}
