//! Condominium records and the dashboard views built on the optimistic layer.

pub mod comments;
pub mod grid;
pub mod occurrences;
pub mod payments;

pub use comments::{
    COMMENT_MAX_LEN, Comment, CommentThread, ThreadKind, ThreadRef, validate_comment,
};
pub use grid::{PaymentGrid, PaymentTool};
pub use occurrences::{Occurrence, OccurrenceBoard, OccurrencePatch, OccurrenceStatus};
pub use payments::{ApartmentPayments, MonthSummary, PaymentEntry, PaymentPatch, PaymentStatus};
