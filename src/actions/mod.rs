//! Contracts with the collaborators around the optimistic layer: server
//! actions, the toast surface and the session.

pub mod notify;
pub mod outcome;
pub mod server;
pub mod session;

pub use notify::{Notifier, Toast, ToastLog, ToastVariant, TracingNotifier};
pub use outcome::{ActionOutcome, ActionResponse};
pub use server::CondoActions;
pub use session::{Role, Session};
