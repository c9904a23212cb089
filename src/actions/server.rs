use super::outcome::ActionOutcome;
use crate::core::{Period, Result};
use crate::domain::{
    ApartmentPayments, Comment, Occurrence, OccurrenceStatus, PaymentEntry, PaymentStatus,
    ThreadRef,
};
use async_trait::async_trait;
use uuid::Uuid;

/// Server actions the dashboards call.
///
/// Reads return the authoritative collection a view refreshes from. Mutations
/// return `Ok(ActionOutcome::Failure)` for rejections the server explains
/// (conflicts, missing records, invalid input) and `Err` only when the call
/// itself could not complete.
#[async_trait]
pub trait CondoActions: Send + Sync {
    async fn list_apartments(
        &self,
        building_id: Uuid,
        year: i32,
    ) -> Result<Vec<ApartmentPayments>>;

    async fn update_payment_status(
        &self,
        apartment_id: Uuid,
        period: Period,
        status: PaymentStatus,
    ) -> Result<ActionOutcome<PaymentEntry>>;

    async fn list_comments(&self, thread: ThreadRef) -> Result<Vec<Comment>>;

    async fn add_comment(
        &self,
        thread: ThreadRef,
        author_id: Uuid,
        content: String,
    ) -> Result<ActionOutcome<Comment>>;

    async fn delete_comment(
        &self,
        thread: ThreadRef,
        comment_id: Uuid,
    ) -> Result<ActionOutcome<()>>;

    async fn list_occurrences(&self, building_id: Uuid) -> Result<Vec<Occurrence>>;

    async fn update_occurrence_status(
        &self,
        occurrence_id: Uuid,
        status: OccurrenceStatus,
    ) -> Result<ActionOutcome<Occurrence>>;
}
