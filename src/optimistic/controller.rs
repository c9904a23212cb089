use super::action::{CollectionAction, Patchable};
use super::pending::{EditId, PendingEdits, SpeculativeEdit};
use crate::core::{CondoError, Result};
use im::Vector;
use std::fmt;
use std::str::FromStr;

/// Decides which pending edits survive when a refresh lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilePolicy {
    /// The refreshed collection wins over every edit staged before the
    /// refresh started. Edits staged while the fetch was in flight are
    /// replayed on top of it.
    #[default]
    RefreshWins,
    /// Only edits the server confirmed before the refresh started are
    /// discarded. Unconfirmed edits keep rendering until they resolve; a
    /// failed edit is dropped on its own.
    DropFailedOnly,
}

impl fmt::Display for ReconcilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RefreshWins => "refresh_wins",
            Self::DropFailedOnly => "drop_failed_only",
        };
        write!(f, "{label}")
    }
}

impl FromStr for ReconcilePolicy {
    type Err = CondoError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "refresh_wins" | "refresh-wins" | "refresh" => Ok(Self::RefreshWins),
            "drop_failed_only" | "drop-failed-only" | "drop_failed" | "selective" => {
                Ok(Self::DropFailedOnly)
            }
            _ => Err(CondoError::Config(format!(
                "reconcile policy must be one of: refresh_wins, drop_failed_only (got '{raw}')"
            ))),
        }
    }
}

/// Per-view controller behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerOptions {
    pub policy: ReconcilePolicy,
    pub refresh_after_success: bool,
}

/// Handle returned when a refresh starts; carries the clock value the fetch
/// was issued at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a refresh ticket must be completed with `complete_refresh`"]
pub struct RefreshTicket {
    started_at: u64,
}

impl RefreshTicket {
    pub fn started_at(&self) -> u64 {
        self.started_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshApplied {
    Applied { discarded: usize, replayed: usize },
    /// A newer refresh already landed; this response was ignored.
    Stale,
}

/// Authoritative collection plus the speculative edits layered over it.
///
/// Nothing here mutates the authoritative collection except a completed
/// refresh, which swaps it wholesale. The visible collection is recomputed
/// from (authoritative, pending) on every read.
#[derive(Debug, Clone)]
pub struct OptimisticController<T: Patchable> {
    authoritative: Vector<T>,
    pending: PendingEdits<T>,
    policy: ReconcilePolicy,
    clock: u64,
    next_edit: u64,
    last_refresh_applied: u64,
}

impl<T: Patchable> OptimisticController<T> {
    pub fn new<I>(authoritative: I, policy: ReconcilePolicy) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            authoritative: authoritative.into_iter().collect(),
            pending: PendingEdits::new(),
            policy,
            clock: 0,
            next_edit: 0,
            last_refresh_applied: 0,
        }
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    pub fn authoritative(&self) -> &Vector<T> {
        &self.authoritative
    }

    pub fn pending(&self) -> &PendingEdits<T> {
        &self.pending
    }

    pub fn visible(&self) -> Vector<T> {
        self.pending.project(&self.authoritative)
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Records a speculative edit. It is visible as soon as this returns.
    pub fn stage(&mut self, action: CollectionAction<T>) -> EditId {
        self.next_edit += 1;
        let id = EditId(self.next_edit);
        let applied_at = self.tick();
        self.pending.push(SpeculativeEdit {
            id,
            key: action.edit_key(),
            action,
            applied_at,
            confirmed_at: None,
        });
        id
    }

    /// Marks an edit as acknowledged by the server. Returns `false` when the
    /// edit was already discarded by a refresh.
    pub fn confirm(&mut self, id: EditId) -> bool {
        let at = self.tick();
        self.pending.confirm(id, at)
    }

    /// Drops a single edit.
    pub fn reject(&mut self, id: EditId) -> Option<SpeculativeEdit<T>> {
        self.pending.remove(id)
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        RefreshTicket {
            started_at: self.tick(),
        }
    }

    /// Installs a freshly fetched collection.
    ///
    /// A ticket older than the last applied refresh is ignored so responses
    /// arriving out of order never move the view backwards.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        collection: Vector<T>,
    ) -> RefreshApplied {
        if ticket.started_at <= self.last_refresh_applied {
            return RefreshApplied::Stale;
        }

        self.authoritative = collection;
        self.last_refresh_applied = ticket.started_at;

        let started_at = ticket.started_at;
        let discarded = match self.policy {
            ReconcilePolicy::RefreshWins => {
                self.pending.retain(|edit| edit.applied_at > started_at)
            }
            ReconcilePolicy::DropFailedOnly => self
                .pending
                .retain(|edit| !edit.confirmed_at.is_some_and(|at| at < started_at)),
        };

        RefreshApplied::Applied {
            discarded,
            replayed: self.pending.len(),
        }
    }

    /// Replaces the authoritative collection immediately, as if a refresh
    /// had been issued and answered in one step.
    pub fn reset(&mut self, collection: Vector<T>) -> RefreshApplied {
        let ticket = self.begin_refresh();
        self.complete_refresh(ticket, collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimistic::action::fixtures::{Counter, SetValue, counters};

    fn controller(policy: ReconcilePolicy) -> OptimisticController<Counter> {
        OptimisticController::new(counters(&[(1, 0), (2, 0)]), policy)
    }

    #[test]
    fn staged_edits_render_without_touching_authoritative() {
        let mut ctl = controller(ReconcilePolicy::RefreshWins);
        ctl.stage(CollectionAction::update(1, SetValue(5)));

        assert_eq!(ctl.visible(), counters(&[(1, 5), (2, 0)]));
        assert_eq!(ctl.authoritative(), &counters(&[(1, 0), (2, 0)]));
    }

    #[test]
    fn reject_drops_only_the_named_edit() {
        let mut ctl = controller(ReconcilePolicy::RefreshWins);
        let first = ctl.stage(CollectionAction::update(1, SetValue(5)));
        ctl.stage(CollectionAction::update(2, SetValue(6)));

        assert!(ctl.reject(first).is_some());
        assert!(ctl.reject(first).is_none());
        assert_eq!(ctl.visible(), counters(&[(1, 0), (2, 6)]));
    }

    #[test]
    fn refresh_wins_replays_edits_staged_after_the_fetch_started() {
        let mut ctl = controller(ReconcilePolicy::RefreshWins);
        ctl.stage(CollectionAction::update(1, SetValue(5)));
        let ticket = ctl.begin_refresh();
        ctl.stage(CollectionAction::update(2, SetValue(9)));

        let applied = ctl.complete_refresh(ticket, counters(&[(1, 1), (2, 1)]));

        assert_eq!(
            applied,
            RefreshApplied::Applied {
                discarded: 1,
                replayed: 1
            }
        );
        assert_eq!(ctl.visible(), counters(&[(1, 1), (2, 9)]));
    }

    #[test]
    fn drop_failed_only_keeps_unconfirmed_edits() {
        let mut ctl = controller(ReconcilePolicy::DropFailedOnly);
        let confirmed = ctl.stage(CollectionAction::update(1, SetValue(5)));
        ctl.stage(CollectionAction::update(2, SetValue(6)));
        assert!(ctl.confirm(confirmed));

        ctl.reset(counters(&[(1, 5), (2, 0)]));

        assert_eq!(ctl.pending().len(), 1);
        assert_eq!(ctl.visible(), counters(&[(1, 5), (2, 6)]));
    }

    #[test]
    fn stale_refresh_is_ignored() {
        let mut ctl = controller(ReconcilePolicy::RefreshWins);
        let older = ctl.begin_refresh();
        let newer = ctl.begin_refresh();

        assert!(matches!(
            ctl.complete_refresh(newer, counters(&[(1, 2)])),
            RefreshApplied::Applied { .. }
        ));
        assert_eq!(
            ctl.complete_refresh(older, counters(&[(1, 1)])),
            RefreshApplied::Stale
        );
        assert_eq!(ctl.visible(), counters(&[(1, 2)]));
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!(
            "refresh_wins".parse::<ReconcilePolicy>().unwrap(),
            ReconcilePolicy::RefreshWins
        );
        assert_eq!(
            "Drop-Failed-Only".parse::<ReconcilePolicy>().unwrap(),
            ReconcilePolicy::DropFailedOnly
        );
        assert!("sometimes".parse::<ReconcilePolicy>().is_err());
    }
}
