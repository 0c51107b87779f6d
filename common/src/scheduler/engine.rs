// Cron scheduler engine
//
// One clock task per registered job. Each clock sleeps until the next fire time
// and spawns the job's task without waiting for it, so firings of different
// jobs (and overlapping firings of the same job) run concurrently.

use crate::errors::ScheduleError;
use crate::schedule::{next_fire_time, validate_cron_expression};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule as CronSchedule;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::{JoinHandle, JoinSet};
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Work performed on every firing of a job
pub type JobTask = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Identifier handed out for each successful registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

struct RegisteredJob {
    id: JobId,
    name: String,
    schedule: CronSchedule,
    task: JobTask,
}

/// CronScheduler fires registered jobs on their cron schedules
pub struct CronScheduler {
    timezone: Tz,
    pending: Vec<RegisteredJob>,
    clocks: Vec<JoinHandle<()>>,
    shutdown_tx: broadcast::Sender<()>,
    started: bool,
}

impl CronScheduler {
    /// Create a scheduler evaluating cron expressions in `timezone`
    pub fn new(timezone: Tz) -> Self {
        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);

        Self {
            timezone,
            pending: Vec::new(),
            clocks: Vec::new(),
            shutdown_tx,
            started: false,
        }
    }

    /// Register a job; each registration is validated on its own
    pub fn add_job(
        &mut self,
        name: impl Into<String>,
        expression: &str,
        task: JobTask,
    ) -> Result<JobId, ScheduleError> {
        let name = name.into();

        if self.started {
            return Err(ScheduleError::AlreadyStarted(name));
        }

        let schedule = validate_cron_expression(expression, self.timezone)?;
        let id = JobId(Uuid::new_v4());

        debug!(job_id = %id, job_name = %name, expression, "Job registered");

        self.pending.push(RegisteredJob {
            id,
            name,
            schedule,
            task,
        });

        Ok(id)
    }

    /// Number of jobs registered and not yet started
    pub fn pending_jobs(&self) -> usize {
        self.pending.len()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Start one clock task per registered job
    ///
    /// Clock tasks and their firings log to the dispatcher that is the
    /// default when `start` is called.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let dispatch = tracing::dispatcher::get_default(|dispatch| dispatch.clone());
        let jobs = std::mem::take(&mut self.pending);

        info!(jobs = jobs.len(), timezone = %self.timezone, "Starting cron scheduler");

        for job in jobs {
            let shutdown_rx = self.shutdown_tx.subscribe();
            let clock = run_clock(job, self.timezone, shutdown_rx).with_subscriber(dispatch.clone());
            self.clocks.push(tokio::spawn(clock));
        }
    }

    /// Stop starting new firings
    ///
    /// The returned future resolves once every clock has drained its
    /// in-flight firings.
    pub fn stop(&mut self) -> impl Future<Output = ()> + Send + 'static {
        let _ = self.shutdown_tx.send(());
        self.pending.clear();
        let clocks = std::mem::take(&mut self.clocks);

        async move {
            for result in futures::future::join_all(clocks).await {
                if let Err(e) = result {
                    error!(error = %e, "Scheduler clock task failed");
                }
            }
            info!("Cron scheduler drained");
        }
    }
}

async fn run_clock(job: RegisteredJob, timezone: Tz, mut shutdown_rx: broadcast::Receiver<()>) {
    let mut firings = JoinSet::new();
    let mut last_fired: Option<DateTime<Utc>> = None;

    loop {
        let now = Utc::now();
        let after = match last_fired {
            Some(last) if last > now => last,
            _ => now,
        };

        let Some(next) = next_fire_time(&job.schedule, timezone, after) else {
            info!(job_id = %job.id, job_name = %job.name, "No upcoming fire time, clock stopped");
            break;
        };
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                debug!(job_id = %job.id, job_name = %job.name, fire_time = %next, "Firing job");
                last_fired = Some(next);
                firings.spawn((job.task)().with_current_subscriber());
            }
            Some(result) = firings.join_next(), if !firings.is_empty() => {
                log_firing_result(&job, result);
            }
            _ = shutdown_rx.recv() => {
                debug!(job_id = %job.id, job_name = %job.name, "Shutdown signal received, stopping clock");
                break;
            }
        }
    }

    while let Some(result) = firings.join_next().await {
        log_firing_result(&job, result);
    }
}

fn log_firing_result(job: &RegisteredJob, result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(job_id = %job.id, job_name = %job.name, error = %e, "Job firing aborted");
    }
}
