pub mod error;
pub mod types;

pub use error::{CondoError, Result};
pub use types::{EditKey, Period};
