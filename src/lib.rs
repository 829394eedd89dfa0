//! Site Scheduler - natural-language commands for construction schedules

pub mod backend;
pub mod command;
pub mod core;
pub mod host;
pub mod nlp;
pub mod tasks;
