//! Background worker that polls the job store and drives the pipeline

use crate::metrics::JobOutcome;
use crate::{JobPipeline, WorkerConfig, WorkerError, WorkerMetrics};
use intake_domain::traits::{JobStore, RowSink};
use intake_domain::Job;
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Background worker that runs pending jobs on a schedule
///
/// Each cycle fetches every pending job, claims them one by one and hands
/// them to a task set bounded by `pool_size`. The cycle waits for its whole
/// batch before the next poll. The store is shared by handle so a front end
/// can keep enqueueing while the worker runs.
///
/// # Examples
///
/// ```no_run
/// use intake_extractor::ExtractorConfig;
/// use intake_llm::OllamaProvider;
/// use intake_sheet::{CsvSheet, SheetLayout};
/// use intake_store::SqliteStore;
/// use intake_worker::{ExtractionWorker, JobPipeline, WorkerConfig};
/// use std::sync::{Arc, Mutex};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = Arc::new(Mutex::new(SqliteStore::new("intake.db")?));
///     let provider = Arc::new(OllamaProvider::new("http://localhost:11434", "deepseek-r1:14b")?);
///     let sheet = Arc::new(CsvSheet::open("template.csv", "export.csv", SheetLayout::default())?);
///     let config = WorkerConfig::default();
///     let pipeline = JobPipeline::new(provider, sheet, &config, &ExtractorConfig::default())?;
///     let mut worker = ExtractionWorker::new(store, pipeline, config)?;
///
///     // Run until Ctrl+C
///     worker.run().await?;
///     Ok(())
/// }
/// ```
pub struct ExtractionWorker<S, K> {
    store: Arc<Mutex<S>>,
    pipeline: Arc<JobPipeline<K>>,
    config: WorkerConfig,
    metrics: WorkerMetrics,
    cancel: CancellationToken,
}

impl<S, K> ExtractionWorker<S, K>
where
    S: JobStore + Send + 'static,
    S::Error: Display,
    K: RowSink + Send + Sync + 'static,
    K::Error: Display,
{
    /// Create a worker over a shared store
    pub fn new(
        store: Arc<Mutex<S>>,
        pipeline: JobPipeline<K>,
        config: WorkerConfig,
    ) -> Result<Self, WorkerError> {
        config.validate()?;
        Ok(Self {
            store,
            pipeline: Arc::new(pipeline),
            config,
            metrics: WorkerMetrics::new(),
            cancel: CancellationToken::new(),
        })
    }

    /// Token that aborts in-flight jobs and stops [`ExtractionWorker::run`]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &WorkerMetrics {
        &self.metrics
    }

    /// Reset the metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Run until Ctrl+C or until the cancellation token fires
    ///
    /// Errors in the polling logic are logged and followed by the longer
    /// error backoff; they never end the loop.
    pub async fn run(&mut self) -> Result<WorkerMetrics, WorkerError> {
        let cancel = self.cancel.clone();

        let signal_token = cancel.clone();
        let listener = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received, cancelling in-flight jobs");
                signal_token.cancel();
            }
        });

        let mut ticker = interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval = ?self.config.poll_interval(),
            pool_size = self.config.pool_size,
            model = self.pipeline.model_name(),
            export = %self.pipeline.destination(),
            "Extraction worker started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if let Err(e) = self.run_once().await {
                self.metrics.loop_errors += 1;
                tracing::error!(
                    error = %e,
                    backoff = ?self.config.error_backoff(),
                    "Polling cycle failed"
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.config.error_backoff()) => {}
                }
            }
        }

        listener.abort();
        tracing::info!("Extraction worker stopped. Final metrics:\n{}", self.metrics.summary());
        Ok(self.metrics.clone())
    }

    /// Run a fixed number of cycles (useful for testing and `--once`)
    pub async fn run_cycles(&mut self, cycles: usize) -> Result<WorkerMetrics, WorkerError> {
        let mut ticker = interval(self.config.poll_interval());

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Starting cycle {}/{}", cycle + 1, cycles);
            self.run_once().await?;
        }

        tracing::info!("Worker finished {} cycles. Final metrics:\n{}", cycles, self.metrics.summary());
        Ok(self.metrics.clone())
    }

    /// Run one polling cycle: claim every pending job and wait for the batch
    ///
    /// Returns the number of jobs this cycle claimed.
    pub async fn run_once(&mut self) -> Result<usize, WorkerError> {
        let started = Instant::now();
        let pending = {
            let store = self.lock_store()?;
            store
                .pending_jobs()
                .map_err(|e| WorkerError::Store(e.to_string()))?
        };

        if !pending.is_empty() {
            tracing::debug!(pending = pending.len(), "Pending jobs found");
        }

        let semaphore = Arc::new(Semaphore::new(self.config.pool_size));
        let mut tasks = JoinSet::new();
        let mut claimed = 0;
        let mut cycle_error = None;

        for job in pending {
            // Wait for a free slot before claiming so unclaimed jobs stay pending
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    cycle_error = Some(WorkerError::Worker(e.to_string()));
                    break;
                }
            };

            if self.cancel.is_cancelled() {
                break;
            }

            // Claimed jobs are already running; a failed claim stops the batch
            // but must not drop the tasks that own them
            let won = match self.try_claim(&job) {
                Ok(won) => won,
                Err(e) => {
                    cycle_error = Some(e);
                    break;
                }
            };
            if !won {
                tracing::debug!(job = %job.id, "Job already claimed, skipping");
                continue;
            }

            claimed += 1;
            tracing::info!(
                job = %job.id,
                cv = %job.cv_filename,
                application = %job.application_filename,
                "Job claimed"
            );

            let pipeline = self.pipeline.clone();
            let store = self.store.clone();
            let cancel = self.cancel.clone();
            tasks.spawn(async move {
                let _permit = permit;
                run_job(pipeline, store, job, cancel).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => self.metrics.record_job(outcome),
                Err(e) => {
                    self.metrics.store_errors += 1;
                    tracing::error!(error = %e, "Job task aborted");
                }
            }
        }

        self.metrics.claimed += claimed;
        self.metrics.cycles += 1;
        self.metrics.total_runtime_secs += started.elapsed().as_secs();

        match cycle_error {
            Some(e) => Err(e),
            None => Ok(claimed),
        }
    }

    fn try_claim(&self, job: &Job) -> Result<bool, WorkerError> {
        let mut store = self.lock_store()?;
        store
            .claim(job.id)
            .map_err(|e| WorkerError::Store(e.to_string()))
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, S>, WorkerError> {
        self.store.lock().map_err(|_| WorkerError::LockPoisoned)
    }
}

async fn run_job<S, K>(
    pipeline: Arc<JobPipeline<K>>,
    store: Arc<Mutex<S>>,
    job: Job,
    cancel: CancellationToken,
) -> JobOutcome
where
    S: JobStore,
    S::Error: Display,
    K: RowSink,
    K::Error: Display,
{
    let update = pipeline.process(&job, &cancel).await;
    let status = update.status;
    let attempts = update.diagnostic.as_ref().map_or(0, |d| d.attempts);

    let written = match store.lock() {
        Ok(mut store) => store.set_status(job.id, update).map_err(|e| e.to_string()),
        Err(_) => Err("store lock poisoned".to_string()),
    };
    if let Err(e) = &written {
        tracing::error!(job = %job.id, status = %status, error = %e, "Failed to record job status");
    }

    JobOutcome {
        status,
        attempts,
        recorded: written.is_ok(),
    }
}
