//! Dashboard interaction state: the bulk-edit tool mode and the transient
//! row highlight.

pub mod highlight;
pub mod tool;

pub use highlight::Highlighter;
pub use tool::ToolMode;
