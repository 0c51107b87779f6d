// Pinger runner: owns the process lifecycle
//
// Idle -> Scheduling -> Running -> ShuttingDown -> Stopped

use crate::config::RunConfig;
use crate::executor::EndpointProber;
use crate::models::Endpoint;
use crate::scheduler::{CronScheduler, JobId, JobTask};
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;
use tracing::instrument::WithSubscriber;
use tracing::{error, info, warn, Dispatch};

/// Lifecycle state of the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Scheduling,
    Running,
    ShuttingDown,
    Stopped,
}

/// Outcome of the scheduling phase, by endpoint name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    pub registered: Vec<String>,
    pub failed: Vec<String>,
}

/// Association between one concrete endpoint and its scheduler registration
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    pub id: JobId,
    pub endpoint: Endpoint,
}

/// Runner drives every endpoint on the shared cron schedule
pub struct Runner {
    config: Arc<RunConfig>,
    prober: Arc<dyn EndpointProber>,
    scheduler: CronScheduler,
    jobs: Vec<ScheduledJob>,
    state: RunnerState,
    dispatch: Dispatch,
}

impl Runner {
    /// Create a runner logging to the current default dispatcher
    pub fn new(config: RunConfig, prober: Arc<dyn EndpointProber>) -> Self {
        let dispatch = tracing::dispatcher::get_default(|dispatch| dispatch.clone());
        let scheduler = CronScheduler::new(config.timezone);

        Self {
            config: Arc::new(config),
            prober,
            scheduler,
            jobs: Vec::new(),
            state: RunnerState::Idle,
            dispatch,
        }
    }

    /// Send all runner, scheduler and probe logs to `dispatch`
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn jobs(&self) -> &[ScheduledJob] {
        &self.jobs
    }

    /// Launch the startup probes, register every endpoint and start the clock
    ///
    /// A failed registration is logged and skipped. The runner reaches
    /// `Running` even when nothing could be registered.
    pub fn start(&mut self) -> ScheduleReport {
        if self.state != RunnerState::Idle {
            warn!(state = ?self.state, "Runner already started");
            return ScheduleReport::default();
        }

        let dispatch = self.dispatch.clone();
        tracing::dispatcher::with_default(&dispatch, || self.schedule_endpoints())
    }

    fn schedule_endpoints(&mut self) -> ScheduleReport {
        self.state = RunnerState::Scheduling;

        let config = Arc::clone(&self.config);
        let mut report = ScheduleReport::default();

        info!(
            cron = %config.schedule,
            endpoints = config.endpoints.len(),
            "Scheduling pinger"
        );

        for endpoint in &config.endpoints {
            self.spawn_startup_probe(endpoint.clone());

            let task = probe_task(Arc::clone(&self.prober), endpoint.clone());
            match self
                .scheduler
                .add_job(endpoint.name.clone(), &config.schedule, task)
            {
                Ok(id) => {
                    info!(endpoint = %endpoint.name, job_id = %id, "Scheduled");
                    self.jobs.push(ScheduledJob {
                        id,
                        endpoint: endpoint.clone(),
                    });
                    report.registered.push(endpoint.name.clone());
                }
                Err(e) => {
                    error!(endpoint = %endpoint.name, error = %e, "Failed to schedule");
                    report.failed.push(endpoint.name.clone());
                }
            }
        }

        self.scheduler.start();
        self.state = RunnerState::Running;

        info!(
            registered = report.registered.len(),
            failed = report.failed.len(),
            "Pinger started"
        );

        report
    }

    /// Fire-and-forget probe, independent of the cron clock
    fn spawn_startup_probe(&self, endpoint: Endpoint) {
        let prober = Arc::clone(&self.prober);
        tokio::spawn(
            async move {
                let _ = prober.probe(&endpoint).await;
            }
            .with_subscriber(self.dispatch.clone()),
        );
    }

    /// Stop the scheduler and wait for it to drain
    ///
    /// Startup probes are not awaited.
    pub async fn shutdown(&mut self) {
        let dispatch = self.dispatch.clone();
        self.drain().with_subscriber(dispatch).await
    }

    async fn drain(&mut self) {
        if self.state != RunnerState::Running {
            warn!(state = ?self.state, "Shutdown requested while not running");
            return;
        }

        self.state = RunnerState::ShuttingDown;
        info!("Shutting down...");

        self.scheduler.stop().await;

        self.state = RunnerState::Stopped;
        info!("Shutdown complete");
    }

    /// Start, block until `signal` resolves, then shut down
    pub async fn run_until<F>(&mut self, signal: F) -> ScheduleReport
    where
        F: Future<Output = ()>,
    {
        let report = self.start();
        signal.await;
        self.shutdown().await;
        report
    }
}

/// Bind an owned copy of the endpoint into the job's task
fn probe_task(prober: Arc<dyn EndpointProber>, endpoint: Endpoint) -> JobTask {
    let endpoint = Arc::new(endpoint);
    Arc::new(move || {
        let prober = Arc::clone(&prober);
        let endpoint = Arc::clone(&endpoint);
        async move {
            let _ = prober.probe(&endpoint).await;
        }
        .boxed()
    })
}
