use crate::actions::{CondoActions, Notifier, Role, Session, Toast};
use crate::config::CondoConfig;
use crate::core::{CondoError, Result};
use crate::optimistic::{
    CollectionAction, CollectionSource, DispatchReport, Keyed, OptimisticView, Patchable,
    PendingSet, Submission,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub const INVALID_OCCURRENCE_TITLE: &str = "Cannot update occurrence";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl fmt::Display for OccurrenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        };
        write!(f, "{label}")
    }
}

/// A reported problem in the building (leak, broken elevator, noise...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: Uuid,
    pub building_id: Uuid,
    pub title: String,
    pub status: OccurrenceStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrencePatch {
    pub status: OccurrenceStatus,
}

impl Keyed for Occurrence {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}

impl Patchable for Occurrence {
    type Patch = OccurrencePatch;

    fn apply_patch(&mut self, patch: &OccurrencePatch) {
        self.status = patch.status;
    }
}

struct OccurrenceSource {
    actions: Arc<dyn CondoActions>,
    building_id: Uuid,
}

#[async_trait]
impl CollectionSource<Occurrence> for OccurrenceSource {
    async fn fetch(&self) -> Result<Vec<Occurrence>> {
        self.actions.list_occurrences(self.building_id).await
    }
}

/// Occurrence list of one building with in-place status changes.
pub struct OccurrenceBoard {
    session: Session,
    actions: Arc<dyn CondoActions>,
    notifier: Arc<dyn Notifier>,
    view: OptimisticView<Occurrence>,
    updating: PendingSet<Uuid>,
}

impl OccurrenceBoard {
    pub fn new(
        session: Session,
        actions: Arc<dyn CondoActions>,
        notifier: Arc<dyn Notifier>,
        config: &CondoConfig,
    ) -> Self {
        let source = Arc::new(OccurrenceSource {
            actions: Arc::clone(&actions),
            building_id: session.building_id,
        });
        let view = OptimisticView::new(
            format!("occurrences:{}", session.building_id),
            source,
            Arc::clone(&notifier),
            config.controller_options(),
        );

        Self {
            session,
            actions,
            notifier,
            view,
            updating: PendingSet::new(),
        }
    }

    pub fn view(&self) -> &OptimisticView<Occurrence> {
        &self.view
    }

    pub async fn load(&self) -> Result<()> {
        self.view.refresh().await?;
        Ok(())
    }

    pub fn occurrences(&self) -> Result<Vec<Occurrence>> {
        Ok(self.view.visible()?.into_iter().collect())
    }

    pub fn is_updating(&self, occurrence_id: Uuid) -> bool {
        self.updating.is_pending(&occurrence_id)
    }

    /// Moves an occurrence to `status`. Managers and professionals only.
    pub async fn set_status(
        &self,
        occurrence_id: Uuid,
        status: OccurrenceStatus,
    ) -> Result<Submission<DispatchReport<Occurrence>>> {
        self.session
            .require_role(&[Role::Manager, Role::Professional], "change occurrence status")
            .map_err(|err| self.reject_input(err))?;

        let current = self
            .view
            .visible()?
            .into_iter()
            .find(|occurrence| occurrence.id == occurrence_id)
            .ok_or_else(|| {
                self.reject_input(CondoError::not_found(format!("occurrence {occurrence_id}")))
            })?;
        if current.status == status {
            return Err(self.reject_input(CondoError::validation(format!(
                "occurrence is already {status}"
            ))));
        }

        let Some(_token) = self.updating.try_begin(occurrence_id) else {
            debug!(occurrence = %occurrence_id, "status change ignored while pending");
            return Ok(Submission::Busy);
        };

        let report = self
            .view
            .dispatch(
                CollectionAction::update(occurrence_id, OccurrencePatch { status }),
                self.actions.update_occurrence_status(occurrence_id, status),
            )
            .await?;
        Ok(Submission::Completed(report))
    }

    fn reject_input(&self, err: CondoError) -> CondoError {
        self.notifier
            .notify(Toast::error(INVALID_OCCURRENCE_TITLE, err.to_string()));
        err
    }
}
