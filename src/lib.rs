pub mod history;
pub mod logging;
pub mod metrics;
pub mod selection;
pub mod types;
pub mod universe;
