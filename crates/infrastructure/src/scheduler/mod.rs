//! Fixed-interval job scheduler
//!
//! Drives the periodic weather refresh on top of `tokio-cron-scheduler`
//! repeated jobs. Jobs are addressed by name, keep a run history and
//! broadcast a [`RunReport`] after every run.

use std::{
    collections::HashMap,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, broadcast};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{debug, info, instrument, warn};

/// Scheduler errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Invalid interval for job {0}: must be positive")]
    InvalidInterval(String),

    #[error("Job already scheduled: {0}")]
    DuplicateJob(String),

    #[error("Scheduler backend error: {0}")]
    Backend(String),
}

impl From<JobSchedulerError> for SchedulerError {
    fn from(err: JobSchedulerError) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Snapshot of one job's run history
#[derive(Debug, Clone)]
pub struct JobStats {
    pub name: String,
    pub every: Duration,
    /// Completed runs, successful or not
    pub runs: u64,
    pub failures: u64,
    /// Failures since the last success
    pub consecutive_failures: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub mean_duration: Duration,
}

/// Outcome of a single run, broadcast to subscribers
#[derive(Debug, Clone)]
pub struct RunReport {
    pub job: String,
    pub outcome: Result<(), String>,
    pub elapsed: Duration,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug, Default)]
struct RunHistory {
    runs: u64,
    failures: u64,
    consecutive_failures: u64,
    total_duration: Duration,
    last_run: Option<DateTime<Utc>>,
    last_success: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl RunHistory {
    fn record(&mut self, report: &RunReport) {
        self.runs += 1;
        self.total_duration += report.elapsed;
        self.last_run = Some(report.finished_at);
        match &report.outcome {
            Ok(()) => {
                self.consecutive_failures = 0;
                self.last_success = Some(report.finished_at);
            },
            Err(e) => {
                self.failures += 1;
                self.consecutive_failures += 1;
                self.last_error = Some(e.clone());
            },
        }
    }
}

struct JobEntry {
    every: Duration,
    history: Mutex<RunHistory>,
}

impl JobEntry {
    fn stats(&self, name: &str) -> JobStats {
        let history = self.history.lock();
        let mean_duration = u32::try_from(history.runs)
            .ok()
            .filter(|runs| *runs > 0)
            .map_or(Duration::ZERO, |runs| history.total_duration / runs);
        JobStats {
            name: name.to_string(),
            every: self.every,
            runs: history.runs,
            failures: history.failures,
            consecutive_failures: history.consecutive_failures,
            last_run: history.last_run,
            last_success: history.last_success,
            last_error: history.last_error.clone(),
            mean_duration,
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Start ticking as soon as the scheduler is built
    pub autostart: bool,
    /// Reports buffered per subscriber before the oldest are dropped
    pub report_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            autostart: true,
            report_capacity: 32,
        }
    }
}

/// Runs named jobs at a fixed interval
pub struct TaskScheduler {
    backend: AsyncMutex<JobScheduler>,
    jobs: RwLock<HashMap<String, Arc<JobEntry>>>,
    running: AtomicBool,
    reports: broadcast::Sender<RunReport>,
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("running", &self.is_running())
            .field("jobs", &self.jobs.read().len())
            .finish_non_exhaustive()
    }
}

impl TaskScheduler {
    #[instrument(skip_all)]
    pub async fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        let (reports, _) = broadcast::channel(config.report_capacity.max(1));
        let scheduler = Self {
            backend: AsyncMutex::new(JobScheduler::new().await?),
            jobs: RwLock::new(HashMap::new()),
            running: AtomicBool::new(false),
            reports,
        };
        if config.autostart {
            scheduler.start().await?;
        }
        Ok(scheduler)
    }

    pub async fn start(&self) -> Result<(), SchedulerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Err(e) = self.backend.lock().await.start().await {
            self.running.store(false, Ordering::SeqCst);
            return Err(e.into());
        }
        info!("Scheduler started");
        Ok(())
    }

    /// Shut the backend down; jobs already running finish on their own
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.backend.lock().await.shutdown().await?;
        info!("Scheduler stopped");
        Ok(())
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Receive a report after every run of every job
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RunReport> {
        self.reports.subscribe()
    }

    /// Schedule `job` to run every `every`, first one interval from now
    #[instrument(skip(self, job))]
    pub async fn schedule_every<F, Fut>(
        &self,
        name: &str,
        every: Duration,
        job: F,
    ) -> Result<(), SchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        if every.is_zero() {
            return Err(SchedulerError::InvalidInterval(name.to_string()));
        }
        if self.jobs.read().contains_key(name) {
            return Err(SchedulerError::DuplicateJob(name.to_string()));
        }

        let entry = Arc::new(JobEntry {
            every,
            history: Mutex::new(RunHistory::default()),
        });
        let job_entry = Arc::clone(&entry);
        let job_name = name.to_string();
        let reports = self.reports.clone();
        let backend_job = Job::new_repeated_async(every, move |_id, _scheduler| {
            let run = job();
            let entry = Arc::clone(&job_entry);
            let name = job_name.clone();
            let reports = reports.clone();

            Box::pin(async move {
                let started = Instant::now();
                let outcome = run.await;
                let report = RunReport {
                    job: name,
                    outcome,
                    elapsed: started.elapsed(),
                    finished_at: Utc::now(),
                };
                entry.history.lock().record(&report);

                match &report.outcome {
                    Ok(()) => debug!(job = %report.job, elapsed = ?report.elapsed, "Job finished"),
                    Err(e) => warn!(job = %report.job, error = %e, "Job failed"),
                }
                let _ = reports.send(report);
            })
        })?;

        self.backend.lock().await.add(backend_job).await?;
        self.jobs.write().insert(name.to_string(), entry);
        info!(job = %name, "Job scheduled");
        Ok(())
    }

    #[must_use]
    pub fn stats(&self, name: &str) -> Option<JobStats> {
        self.jobs.read().get(name).map(|entry| entry.stats(name))
    }
}
