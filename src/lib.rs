// ============================================================================
// condodesk Library
// ============================================================================

pub mod actions;
pub mod config;
pub mod core;
pub mod domain;
pub mod interaction;
pub mod optimistic;
pub mod prelude;
pub mod store;
pub mod web;

// Re-export main types for convenience
pub use config::CondoConfig;
pub use core::{CondoError, EditKey, Period, Result};

// Re-export the optimistic layer
pub use optimistic::{
    CollectionAction, CollectionSource, ControllerOptions, DispatchOutcome, DispatchReport,
    EditId, Keyed, OptimisticController, OptimisticView, Patchable, PendingFlag, PendingSet,
    ReconcilePolicy, RefreshApplied, SpeculativeEdit, Submission, apply,
};

// Re-export collaborator contracts
pub use actions::{
    ActionOutcome, ActionResponse, CondoActions, Notifier, Role, Session, Toast, ToastLog,
    ToastVariant, TracingNotifier,
};

// Re-export dashboard views and records
pub use domain::{
    ApartmentPayments, Comment, CommentThread, MonthSummary, Occurrence, OccurrenceBoard,
    OccurrenceStatus, PaymentEntry, PaymentGrid, PaymentStatus, PaymentTool, ThreadKind,
    ThreadRef,
};
pub use interaction::{Highlighter, ToolMode};

// ============================================================================
// Backends
// ============================================================================

pub use store::{DemoBuilding, Injection, MemoryCondoStore};
pub use web::{HttpCondoActions, build_router};
