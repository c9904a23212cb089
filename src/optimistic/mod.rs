//! Optimistic mutation layer.
//!
//! A view renders `visible = fold(apply, authoritative, pending)` and only
//! ever replaces `authoritative` wholesale, so a refresh can always discard
//! speculative state cleanly.

pub mod action;
pub mod controller;
pub mod guard;
pub mod pending;
pub mod view;

pub use action::{CollectionAction, Keyed, Patchable, apply};
pub use controller::{
    ControllerOptions, OptimisticController, ReconcilePolicy, RefreshApplied, RefreshTicket,
};
pub use guard::{PendingFlag, PendingKeyToken, PendingSet, PendingToken, Submission};
pub use pending::{EditId, PendingEdits, SpeculativeEdit};
pub use view::{
    CollectionSource, DispatchOutcome, DispatchReport, OptimisticView, REFRESH_FAILED_TITLE,
    SAVE_FAILED_TITLE,
};
