//! Tracks how long the browser's active tab stays on each website and splits the time into
//! productive and unproductive.
//!
//! `sitetally-host` runs next to the browser extension and does the tracking; `sitetally` reads
//! the same storage from a terminal.

pub mod cli;
pub mod daemon;
pub mod report;
pub mod sites;
pub mod utils;
