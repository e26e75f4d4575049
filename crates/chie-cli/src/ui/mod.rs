//! Terminal UI primitives for the Chie CLI.
//!
//! - **Progress**: a spinner shown while a key is being derived
//! - **Table**: record tables rendered with comfy-table

pub mod progress;
pub mod table;

pub use progress::Spinner;
pub use table::{event_table, journal_table, short_id, task_table};
