mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{Fixture, YEAR};
use condodesk::store::DEMO_MONTHLY_QUOTA_CENTS;
use condodesk::{
    CondoActions, CondoConfig, CondoError, HttpCondoActions, Notifier, PaymentGrid,
    PaymentStatus, PaymentTool, ThreadRef, build_router,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    payload: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match payload {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = app.clone().oneshot(request).await.expect("response expected");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("response body should be readable")
        .to_bytes();

    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let json = serde_json::from_slice::<Value>(&bytes).expect("body should be valid JSON");
    (status, json)
}

#[tokio::test]
async fn health_reports_ok() {
    let fixture = Fixture::new().await;
    let app = build_router(fixture.actions());

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn apartments_are_listed_per_year() {
    let fixture = Fixture::new().await;
    let app = build_router(fixture.actions());
    let uri = format!(
        "/api/buildings/{}/apartments?year={YEAR}",
        fixture.building.building_id
    );

    let (status, body) = send(&app, Method::GET, &uri, None).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0]["unit"], "1A");
    assert_eq!(rows[0]["payments"]["1"]["status"], "paid");
}

#[tokio::test]
async fn update_payment_status_answers_with_the_two_shape_contract() {
    let fixture = Fixture::new().await;
    let app = build_router(fixture.actions());
    let payload = json!({
        "apartment_id": fixture.apartment(0),
        "month": 4,
        "year": YEAR,
        "status": "paid",
    });

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/actions/update-payment-status",
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "data": { "status": "paid", "amount_cents": DEMO_MONTHLY_QUOTA_CENTS },
        })
    );

    fixture.store.fail_next("conflict");
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/actions/update-payment-status",
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false, "error": "conflict" }));
}

#[tokio::test]
async fn invalid_month_is_an_unprocessable_request() {
    let fixture = Fixture::new().await;
    let app = build_router(fixture.actions());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/actions/update-payment-status",
        Some(json!({
            "apartment_id": fixture.apartment(0),
            "month": 13,
            "year": YEAR,
            "status": "late",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_error");
    assert_eq!(fixture.store.mutation_count(), 0);
}

#[tokio::test]
async fn comments_round_trip_through_the_actions() {
    let fixture = Fixture::new().await;
    let app = build_router(fixture.actions());
    let thread = ThreadRef::discussion(fixture.building.discussion_id);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/actions/add-comment",
        Some(json!({
            "thread": thread,
            "author_id": fixture.building.resident.user_id,
            "content": "Garden party on Saturday",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let comment_id = body["data"]["id"].clone();

    let uri = format!("/api/threads/discussion/{}/comments", thread.id);
    let (_, listed) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/actions/delete-comment",
        Some(json!({ "thread": thread, "comment_id": comment_id })),
    )
    .await;
    assert_eq!(body, json!({ "success": true }));

    let (_, listed) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn unknown_thread_kind_is_rejected() {
    let fixture = Fixture::new().await;
    let app = build_router(fixture.actions());
    let uri = format!("/api/threads/poll/{}/comments", uuid::Uuid::new_v4());

    let (status, body) = send(&app, Method::GET, &uri, None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "input_error");
    assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));
}

#[tokio::test]
async fn malformed_action_bodies_answer_with_the_error_contract() {
    let fixture = Fixture::new().await;
    let app = build_router(fixture.actions());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/actions/update-payment-status",
        Some(json!({ "apartment_id": "not-a-uuid", "month": 4 })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "input_error");
    assert_eq!(fixture.store.mutation_count(), 0);

    let uri = "/api/buildings/not-a-uuid/apartments";
    let (status, body) = send(&app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "input_error");
}

async fn spawn_server(fixture: &Fixture) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    let app = build_router(fixture.actions());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn http_client_maps_error_bodies_back_to_condo_errors() {
    let fixture = Fixture::new().await;
    let client = HttpCondoActions::new(spawn_server(&fixture).await);

    let err = client
        .update_payment_status(
            fixture.apartment(0),
            condodesk::Period { year: YEAR, month: 0 },
            PaymentStatus::Paid,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, CondoError::Validation(_)));
}

#[tokio::test]
async fn payment_grid_runs_unchanged_against_the_http_backend() {
    let fixture = Fixture::new().await;
    let actions: Arc<dyn CondoActions> =
        Arc::new(HttpCondoActions::new(spawn_server(&fixture).await));
    let notifier: Arc<dyn Notifier> = Arc::new(fixture.toasts.clone());

    let mut grid = PaymentGrid::new(
        fixture.building.manager.clone(),
        YEAR,
        actions,
        notifier,
        &CondoConfig::new(),
    )
    .unwrap();
    grid.load().await.unwrap();
    grid.select_tool(PaymentTool::MarkLate);
    let apartment = fixture.apartment(1);

    fixture.store.fail_next("conflict");
    let failed = grid.click_cell(apartment, 2).await.unwrap().unwrap();
    assert_eq!(failed.error(), Some("conflict"));
    assert_eq!(grid.row(apartment).unwrap().unwrap().status(2), PaymentStatus::Paid);

    let confirmed = grid.click_cell(apartment, 2).await.unwrap().unwrap();
    assert!(confirmed.is_confirmed());
    assert_eq!(grid.row(apartment).unwrap().unwrap().status(2), PaymentStatus::Late);
    assert_eq!(fixture.toasts.len(), 1);
}
