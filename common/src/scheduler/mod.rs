// Scheduler module for cron-driven job firing

pub mod engine;

pub use engine::{CronScheduler, JobId, JobTask};
