// Common library for the pinger: configuration, expansion, probing and scheduling

pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod executor;
pub mod expansion;
pub mod models;
pub mod runner;
pub mod schedule;
pub mod scheduler;
pub mod telemetry;
