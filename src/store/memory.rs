use crate::actions::{ActionOutcome, CondoActions};
use crate::core::{CondoError, Period, Result};
use crate::domain::{
    ApartmentPayments, Comment, Occurrence, OccurrenceStatus, PaymentEntry, PaymentStatus,
    ThreadRef, validate_comment,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// How a scripted mutation call misbehaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The action answers `{success: false, error}`.
    Reject(String),
    /// The call fails before an answer is produced.
    Transport(String),
}

/// Behaviour of the next mutation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Injection {
    pub delay: Option<Duration>,
    pub fault: Option<Fault>,
}

impl Injection {
    /// Answer normally.
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn reject(error: impl Into<String>) -> Self {
        Self {
            delay: None,
            fault: Some(Fault::Reject(error.into())),
        }
    }

    pub fn transport(error: impl Into<String>) -> Self {
        Self {
            delay: None,
            fault: Some(Fault::Transport(error.into())),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Clone)]
struct ApartmentRecord {
    id: Uuid,
    building_id: Uuid,
    unit: String,
    monthly_quota_cents: u64,
}

#[derive(Debug, Default)]
struct StoreState {
    apartments: Vec<ApartmentRecord>,
    payments: HashMap<(Uuid, Period), PaymentEntry>,
    comments: Vec<Comment>,
    occurrences: Vec<Occurrence>,
}

/// Authoritative in-memory backend for the server actions.
///
/// Mutation calls can be scripted with [`Injection`]s (delays, rejections,
/// transport failures), consumed in call order.
#[derive(Debug, Default)]
pub struct MemoryCondoStore {
    state: RwLock<StoreState>,
    injections: Mutex<VecDeque<Injection>>,
    fetch_faults: Mutex<VecDeque<String>>,
    mutations: AtomicUsize,
}

impl MemoryCondoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_injection(&self, injection: Injection) {
        self.injections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(injection);
    }

    /// The next mutation answers `{success: false, error}`.
    pub fn fail_next(&self, error: impl Into<String>) {
        self.push_injection(Injection::reject(error));
    }

    /// The next mutation fails with a transport error.
    pub fn break_next(&self, error: impl Into<String>) {
        self.push_injection(Injection::transport(error));
    }

    /// The next list call fails with a transport error.
    pub fn break_next_fetch(&self, error: impl Into<String>) {
        self.fetch_faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(error.into());
    }

    /// Number of mutation calls received, successful or not.
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::Acquire)
    }

    pub async fn add_apartment(
        &self,
        building_id: Uuid,
        unit: impl Into<String>,
        monthly_quota_cents: u64,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.state.write().await.apartments.push(ApartmentRecord {
            id,
            building_id,
            unit: unit.into(),
            monthly_quota_cents,
        });
        id
    }

    /// Writes a payment directly, as another session would.
    pub async fn set_payment(&self, apartment_id: Uuid, period: Period, entry: PaymentEntry) {
        self.state
            .write()
            .await
            .payments
            .insert((apartment_id, period), entry);
    }

    pub async fn payment(&self, apartment_id: Uuid, period: Period) -> Option<PaymentEntry> {
        self.state
            .read()
            .await
            .payments
            .get(&(apartment_id, period))
            .copied()
    }

    pub async fn add_occurrence(&self, building_id: Uuid, title: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.state.write().await.occurrences.push(Occurrence {
            id,
            building_id,
            title: title.into(),
            status: OccurrenceStatus::Open,
            updated_at: Utc::now(),
        });
        id
    }

    pub async fn insert_comment(&self, comment: Comment) {
        self.state.write().await.comments.push(comment);
    }

    fn next_injection(&self) -> Injection {
        self.injections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_default()
    }

    /// Applies the scripted behaviour for one mutation. `Ok(Some(error))`
    /// means the action must answer with a failure.
    async fn intercept(&self, action: &'static str) -> Result<Option<String>> {
        self.mutations.fetch_add(1, Ordering::AcqRel);
        let injection = self.next_injection();
        if let Some(delay) = injection.delay {
            tokio::time::sleep(delay).await;
        }
        match injection.fault {
            Some(Fault::Reject(error)) => {
                debug!(action, error = %error, "scripted rejection");
                Ok(Some(error))
            }
            Some(Fault::Transport(error)) => {
                debug!(action, error = %error, "scripted transport failure");
                Err(CondoError::transport(error))
            }
            None => Ok(None),
        }
    }

    fn intercept_fetch(&self) -> Result<()> {
        let fault = self
            .fetch_faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match fault {
            Some(error) => Err(CondoError::transport(error)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CondoActions for MemoryCondoStore {
    async fn list_apartments(
        &self,
        building_id: Uuid,
        year: i32,
    ) -> Result<Vec<ApartmentPayments>> {
        self.intercept_fetch()?;
        let state = self.state.read().await;
        let mut rows: Vec<ApartmentPayments> = state
            .apartments
            .iter()
            .filter(|apartment| apartment.building_id == building_id)
            .map(|apartment| {
                let mut row = ApartmentPayments::new(
                    apartment.id,
                    apartment.building_id,
                    apartment.unit.clone(),
                    apartment.monthly_quota_cents,
                    year,
                );
                row.payments = state
                    .payments
                    .iter()
                    .filter(|((id, period), _)| *id == apartment.id && period.year == year)
                    .map(|((_, period), entry)| (period.month, *entry))
                    .collect();
                row
            })
            .collect();
        rows.sort_by(|a, b| a.unit.cmp(&b.unit));
        Ok(rows)
    }

    async fn update_payment_status(
        &self,
        apartment_id: Uuid,
        period: Period,
        status: PaymentStatus,
    ) -> Result<ActionOutcome<PaymentEntry>> {
        if let Some(error) = self.intercept("update_payment_status").await? {
            return Ok(ActionOutcome::failure(error));
        }

        let mut state = self.state.write().await;
        let Some(quota) = state
            .apartments
            .iter()
            .find(|apartment| apartment.id == apartment_id)
            .map(|apartment| apartment.monthly_quota_cents)
        else {
            return Ok(ActionOutcome::failure("apartment not found"));
        };

        let entry = PaymentEntry::for_status(status, quota);
        state.payments.insert((apartment_id, period), entry);
        debug!(apartment = %apartment_id, period = %period, status = %status, "payment status stored");
        Ok(ActionOutcome::success(entry))
    }

    async fn list_comments(&self, thread: ThreadRef) -> Result<Vec<Comment>> {
        self.intercept_fetch()?;
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|comment| comment.thread == thread)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn add_comment(
        &self,
        thread: ThreadRef,
        author_id: Uuid,
        content: String,
    ) -> Result<ActionOutcome<Comment>> {
        if let Some(error) = self.intercept("add_comment").await? {
            return Ok(ActionOutcome::failure(error));
        }

        let content = match validate_comment(&content) {
            Ok(content) => content,
            Err(err) => return Ok(ActionOutcome::failure(err.to_string())),
        };
        let comment = Comment {
            id: Uuid::new_v4(),
            thread,
            author_id,
            content,
            created_at: Utc::now(),
        };
        self.state.write().await.comments.push(comment.clone());
        debug!(thread = %thread, comment = %comment.id, "comment stored");
        Ok(ActionOutcome::success(comment))
    }

    async fn delete_comment(
        &self,
        thread: ThreadRef,
        comment_id: Uuid,
    ) -> Result<ActionOutcome<()>> {
        if let Some(error) = self.intercept("delete_comment").await? {
            return Ok(ActionOutcome::failure(error));
        }

        let mut state = self.state.write().await;
        let before = state.comments.len();
        state
            .comments
            .retain(|comment| !(comment.thread == thread && comment.id == comment_id));
        if state.comments.len() == before {
            return Ok(ActionOutcome::failure("comment not found"));
        }
        Ok(ActionOutcome::done())
    }

    async fn list_occurrences(&self, building_id: Uuid) -> Result<Vec<Occurrence>> {
        self.intercept_fetch()?;
        let state = self.state.read().await;
        Ok(state
            .occurrences
            .iter()
            .filter(|occurrence| occurrence.building_id == building_id)
            .cloned()
            .collect())
    }

    async fn update_occurrence_status(
        &self,
        occurrence_id: Uuid,
        status: OccurrenceStatus,
    ) -> Result<ActionOutcome<Occurrence>> {
        if let Some(error) = self.intercept("update_occurrence_status").await? {
            return Ok(ActionOutcome::failure(error));
        }

        let mut state = self.state.write().await;
        let Some(occurrence) = state
            .occurrences
            .iter_mut()
            .find(|occurrence| occurrence.id == occurrence_id)
        else {
            return Ok(ActionOutcome::failure("occurrence not found"));
        };
        occurrence.status = status;
        occurrence.updated_at = Utc::now();
        Ok(ActionOutcome::success(occurrence.clone()))
    }
}
