use super::action::{CollectionAction, Patchable};
use super::controller::{ControllerOptions, OptimisticController, RefreshApplied};
use super::pending::EditId;
use crate::actions::{ActionOutcome, Notifier, Toast};
use crate::core::Result;
use async_trait::async_trait;
use futures::FutureExt;
use im::Vector;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, warn};

pub const SAVE_FAILED_TITLE: &str = "Could not save changes";
pub const REFRESH_FAILED_TITLE: &str = "Could not refresh";

/// Where a view fetches its authoritative collection from.
#[async_trait]
pub trait CollectionSource<T>: Send + Sync {
    async fn fetch(&self) -> Result<Vec<T>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome<R> {
    Confirmed(Option<R>),
    Failed { error: String },
}

/// What happened to one dispatched edit.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport<R> {
    pub edit_id: EditId,
    pub outcome: DispatchOutcome<R>,
    /// Whether a refresh ran and was applied after the server answered.
    pub refreshed: bool,
}

impl<R> DispatchReport<R> {
    pub fn is_confirmed(&self) -> bool {
        matches!(self.outcome, DispatchOutcome::Confirmed(_))
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            DispatchOutcome::Failed { error } => Some(error),
            DispatchOutcome::Confirmed(_) => None,
        }
    }

    pub fn data(&self) -> Option<&R> {
        match &self.outcome {
            DispatchOutcome::Confirmed(data) => data.as_ref(),
            DispatchOutcome::Failed { .. } => None,
        }
    }
}

/// One view's optimistic state: controller, refresh source and toast surface.
///
/// Each dashboard view builds its own instance. The controller sits behind a
/// `std::sync::Mutex` that is never held across an await.
pub struct OptimisticView<T: Patchable> {
    name: String,
    controller: Mutex<OptimisticController<T>>,
    source: Arc<dyn CollectionSource<T>>,
    notifier: Arc<dyn Notifier>,
    options: ControllerOptions,
}

impl<T: Patchable> OptimisticView<T> {
    pub fn new(
        name: impl Into<String>,
        source: Arc<dyn CollectionSource<T>>,
        notifier: Arc<dyn Notifier>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            name: name.into(),
            controller: Mutex::new(OptimisticController::new(Vec::new(), options.policy)),
            source,
            notifier,
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> ControllerOptions {
        self.options
    }

    fn with_controller<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut OptimisticController<T>) -> R,
    {
        let mut controller = self.controller.lock()?;
        Ok(f(&mut controller))
    }

    pub fn visible(&self) -> Result<Vector<T>> {
        self.with_controller(|ctl| ctl.visible())
    }

    pub fn authoritative(&self) -> Result<Vector<T>> {
        self.with_controller(|ctl| ctl.authoritative().clone())
    }

    pub fn pending_count(&self) -> Result<usize> {
        self.with_controller(|ctl| ctl.pending().len())
    }

    /// Stages an edit without calling the server.
    pub fn stage(&self, action: CollectionAction<T>) -> Result<EditId> {
        self.with_controller(|ctl| ctl.stage(action))
    }

    pub fn confirm(&self, id: EditId) -> Result<bool> {
        self.with_controller(|ctl| ctl.confirm(id))
    }

    pub fn reject(&self, id: EditId) -> Result<bool> {
        self.with_controller(|ctl| ctl.reject(id).is_some())
    }

    /// Re-fetches the authoritative collection and reconciles pending edits
    /// according to the view's policy.
    pub async fn refresh(&self) -> Result<RefreshApplied> {
        let ticket = self.with_controller(|ctl| ctl.begin_refresh())?;
        let items = self.source.fetch().await?;
        let applied =
            self.with_controller(|ctl| ctl.complete_refresh(ticket, items.into_iter().collect()))?;

        match applied {
            RefreshApplied::Applied {
                discarded,
                replayed,
            } => debug!(view = %self.name, discarded, replayed, "refresh applied"),
            RefreshApplied::Stale => debug!(view = %self.name, "stale refresh ignored"),
        }
        Ok(applied)
    }

    /// Renders `action` immediately, then awaits `mutation`.
    ///
    /// A failed outcome, a transport error or a panic inside `mutation` all
    /// take the same path: destructive toast, the edit is dropped, and the
    /// authoritative collection is re-fetched. Errors are reported in the
    /// returned `DispatchReport`; `Err` is reserved for a poisoned controller.
    pub async fn dispatch<R, F>(
        &self,
        action: CollectionAction<T>,
        mutation: F,
    ) -> Result<DispatchReport<R>>
    where
        F: Future<Output = Result<ActionOutcome<R>>> + Send,
        R: Send,
    {
        let label = action.label();
        let edit_id = self.stage(action)?;
        debug!(view = %self.name, edit = %edit_id, action = label, "speculative edit staged");

        let error = match AssertUnwindSafe(mutation).catch_unwind().await {
            Ok(Ok(ActionOutcome::Success { data })) => {
                let still_pending = self.confirm(edit_id)?;
                debug!(view = %self.name, edit = %edit_id, still_pending, "edit confirmed");

                // A rollback refresh may have dropped this edit before the
                // server accepted it; fetch again so the write shows up.
                let refreshed = if self.options.refresh_after_success || !still_pending {
                    self.refresh_or_notify().await
                } else {
                    false
                };
                return Ok(DispatchReport {
                    edit_id,
                    outcome: DispatchOutcome::Confirmed(data),
                    refreshed,
                });
            }
            Ok(Ok(ActionOutcome::Failure { error })) => {
                warn!(view = %self.name, edit = %edit_id, error = %error, "server action rejected edit");
                error
            }
            Ok(Err(err)) => {
                error!(view = %self.name, edit = %edit_id, code = err.code(), error = %err, "server action failed");
                err.to_string()
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(view = %self.name, edit = %edit_id, panic = %message, "server action panicked");
                message
            }
        };

        self.notifier.notify(Toast::error(SAVE_FAILED_TITLE, error.clone()));
        self.reject(edit_id)?;
        let refreshed = self.refresh_or_notify().await;

        Ok(DispatchReport {
            edit_id,
            outcome: DispatchOutcome::Failed { error },
            refreshed,
        })
    }

    async fn refresh_or_notify(&self) -> bool {
        match self.refresh().await {
            Ok(RefreshApplied::Applied { .. }) => true,
            Ok(RefreshApplied::Stale) => false,
            Err(err) => {
                error!(view = %self.name, error = %err, "refresh failed");
                self.notifier
                    .notify(Toast::error(REFRESH_FAILED_TITLE, err.to_string()));
                false
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = panic.downcast_ref::<String>() {
        return message.clone();
    }
    "unexpected error".to_string()
}
