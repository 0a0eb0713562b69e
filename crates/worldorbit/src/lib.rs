pub mod config;
pub mod events;
pub mod report;
pub mod sys;
