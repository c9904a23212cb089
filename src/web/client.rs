use super::router::{
    AddCommentRequest, DeleteCommentRequest, UpdateOccurrenceStatusRequest,
    UpdatePaymentStatusRequest,
};
use super::{ErrorResponse, error_from_response};
use crate::actions::{ActionOutcome, ActionResponse, CondoActions};
use crate::core::{CondoError, Period, Result};
use crate::domain::{
    ApartmentPayments, Comment, Occurrence, OccurrenceStatus, PaymentEntry, PaymentStatus,
    ThreadRef,
};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

/// Server actions invoked over HTTP against [`build_router`](super::build_router).
#[derive(Debug, Clone)]
pub struct HttpCondoActions {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCondoActions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.client.get(self.url(path)).send().await?;
        decode(response).await
    }

    async fn post_action<B, T>(&self, path: &str, body: &B) -> Result<ActionOutcome<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path, "calling server action");
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let response: ActionResponse<T> = decode(response).await?;
        Ok(response.into())
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let code = status.as_u16();
    match response.json::<ErrorResponse>().await {
        Ok(body) => Err(error_from_response(code, body)),
        Err(_) => Err(CondoError::transport(format!("HTTP {code} without error body"))),
    }
}

#[async_trait]
impl CondoActions for HttpCondoActions {
    async fn list_apartments(
        &self,
        building_id: Uuid,
        year: i32,
    ) -> Result<Vec<ApartmentPayments>> {
        self.get(&format!("/api/buildings/{building_id}/apartments?year={year}"))
            .await
    }

    async fn update_payment_status(
        &self,
        apartment_id: Uuid,
        period: Period,
        status: PaymentStatus,
    ) -> Result<ActionOutcome<PaymentEntry>> {
        self.post_action(
            "/api/actions/update-payment-status",
            &UpdatePaymentStatusRequest {
                apartment_id,
                month: period.month,
                year: period.year,
                status,
            },
        )
        .await
    }

    async fn list_comments(&self, thread: ThreadRef) -> Result<Vec<Comment>> {
        self.get(&format!("/api/threads/{}/{}/comments", thread.kind, thread.id))
            .await
    }

    async fn add_comment(
        &self,
        thread: ThreadRef,
        author_id: Uuid,
        content: String,
    ) -> Result<ActionOutcome<Comment>> {
        self.post_action(
            "/api/actions/add-comment",
            &AddCommentRequest {
                thread,
                author_id,
                content,
            },
        )
        .await
    }

    async fn delete_comment(
        &self,
        thread: ThreadRef,
        comment_id: Uuid,
    ) -> Result<ActionOutcome<()>> {
        self.post_action(
            "/api/actions/delete-comment",
            &DeleteCommentRequest { thread, comment_id },
        )
        .await
    }

    async fn list_occurrences(&self, building_id: Uuid) -> Result<Vec<Occurrence>> {
        self.get(&format!("/api/buildings/{building_id}/occurrences"))
            .await
    }

    async fn update_occurrence_status(
        &self,
        occurrence_id: Uuid,
        status: OccurrenceStatus,
    ) -> Result<ActionOutcome<Occurrence>> {
        self.post_action(
            "/api/actions/update-occurrence-status",
            &UpdateOccurrenceStatusRequest {
                occurrence_id,
                status,
            },
        )
        .await
    }
}
