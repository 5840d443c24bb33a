//! CLI command handlers.

mod select;

pub use select::run_select;
