use super::{ApiJson, ApiPath, ApiQuery, Result};
use crate::actions::{ActionResponse, CondoActions};
use crate::core::Period;
use crate::domain::{
    ApartmentPayments, Comment, Occurrence, OccurrenceStatus, PaymentEntry, PaymentStatus,
    ThreadKind, ThreadRef,
};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiState {
    actions: Arc<dyn CondoActions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub apartment_id: Uuid,
    pub month: u8,
    pub year: i32,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCommentRequest {
    pub thread: ThreadRef,
    pub author_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCommentRequest {
    pub thread: ThreadRef,
    pub comment_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOccurrenceStatusRequest {
    pub occurrence_id: Uuid,
    pub status: OccurrenceStatus,
}

pub fn build_router(actions: Arc<dyn CondoActions>) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/api/buildings/:building_id/apartments", get(list_apartments))
        .route("/api/buildings/:building_id/occurrences", get(list_occurrences))
        .route("/api/threads/:kind/:thread_id/comments", get(list_comments))
        .route(
            "/api/actions/update-payment-status",
            post(update_payment_status),
        )
        .route("/api/actions/add-comment", post(add_comment))
        .route("/api/actions/delete-comment", post(delete_comment))
        .route(
            "/api/actions/update-occurrence-status",
            post(update_occurrence_status),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ApiState { actions })
}

async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn list_apartments(
    State(state): State<ApiState>,
    ApiPath(building_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<YearQuery>,
) -> Result<Json<Vec<ApartmentPayments>>> {
    let year = query.year.unwrap_or_else(|| Period::current().year);
    let rows = state.actions.list_apartments(building_id, year).await?;
    Ok(Json(rows))
}

async fn update_payment_status(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<UpdatePaymentStatusRequest>,
) -> Result<Json<ActionResponse<PaymentEntry>>> {
    let period = Period::new(payload.year, payload.month)?;
    let outcome = state
        .actions
        .update_payment_status(payload.apartment_id, period, payload.status)
        .await?;
    Ok(Json(outcome.into()))
}

async fn list_comments(
    State(state): State<ApiState>,
    ApiPath((kind, thread_id)): ApiPath<(ThreadKind, Uuid)>,
) -> Result<Json<Vec<Comment>>> {
    let comments = state
        .actions
        .list_comments(ThreadRef {
            kind,
            id: thread_id,
        })
        .await?;
    Ok(Json(comments))
}

async fn add_comment(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<AddCommentRequest>,
) -> Result<Json<ActionResponse<Comment>>> {
    let outcome = state
        .actions
        .add_comment(payload.thread, payload.author_id, payload.content)
        .await?;
    Ok(Json(outcome.into()))
}

async fn delete_comment(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<DeleteCommentRequest>,
) -> Result<Json<ActionResponse<()>>> {
    let outcome = state
        .actions
        .delete_comment(payload.thread, payload.comment_id)
        .await?;
    Ok(Json(outcome.into()))
}

async fn list_occurrences(
    State(state): State<ApiState>,
    ApiPath(building_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Occurrence>>> {
    let occurrences = state.actions.list_occurrences(building_id).await?;
    Ok(Json(occurrences))
}

async fn update_occurrence_status(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<UpdateOccurrenceStatusRequest>,
) -> Result<Json<ActionResponse<Occurrence>>> {
    let outcome = state
        .actions
        .update_occurrence_status(payload.occurrence_id, payload.status)
        .await?;
    Ok(Json(outcome.into()))
}
