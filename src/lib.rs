pub mod catalog;
pub mod classify;
pub mod config;
pub mod log_sink;
pub mod phase;
pub mod privilege;
pub mod runner;
