//! Display formatting for terminal output

pub mod history;

pub use history::{format_history, format_run_detail};
