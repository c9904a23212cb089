//! Recommended imports grouped by abstraction level.
//!
//! `views` is the default for dashboard code. `advanced` exposes the raw
//! controller for callers that manage their own refresh cycle.

pub mod views {
    //! Dashboard views, their records and the collaborator contracts they need.
    pub use crate::{
        ActionOutcome, CondoActions, CondoConfig, CondoError, CommentThread, Notifier,
        OccurrenceBoard, OccurrenceStatus, PaymentGrid, PaymentStatus, PaymentTool, Result, Role,
        Session, Submission, Toast, ToolMode,
    };
}

pub mod advanced {
    //! Building blocks of the optimistic layer.
    pub use crate::optimistic::{
        CollectionAction, CollectionSource, ControllerOptions, EditId, Keyed, OptimisticController,
        OptimisticView, Patchable, PendingEdits, ReconcilePolicy, RefreshApplied, RefreshTicket,
        apply,
    };
}
