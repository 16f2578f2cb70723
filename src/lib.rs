//! Bunyang marketing analysis client
//!
//! Debounced site search feeding a campaign analysis workflow, with a
//! terminal front end.

pub mod api;
pub mod cli;
pub mod config;
pub mod event;
pub mod logging;
pub mod search;
pub mod tui;
pub mod workflow;
