//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! Three jobs run while the scheduler is started:
//! - `blog_generation_job` every N minutes (one in flight at a time)
//! - `stats_reporting_job` every hour
//! - `daily_cleanup_job` every day at 02:00 UTC
//!
//! ```text
//! JobScheduler (tick)
//!     │
//!     ├─► misfire window ── too late ──► dropped
//!     │
//!     └─► generation guard ── busy ──► skipped
//!             └─► BlogGenerator::generate_for_schedule()
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

use super::BaseBlogStore;
use crate::domains::generation::{BlogGenerator, GeneratedPostSummary};

pub const GENERATION_JOB_ID: &str = "blog_generation_job";
pub const STATS_JOB_ID: &str = "stats_reporting_job";
pub const CLEANUP_JOB_ID: &str = "daily_cleanup_job";

pub const DEFAULT_MISFIRE_GRACE: Duration = Duration::from_secs(300);

/// Window the hourly and daily reports summarize.
pub const REPORT_WINDOW_HOURS: i64 = 24;

const STATS_INTERVAL: Duration = Duration::from_secs(60 * 60);
const CLEANUP_SCHEDULE: &str = "0 0 2 * * *";

/// Snapshot of one registered job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobInfo {
    pub id: String,
    pub name: String,
    pub next_run_time: Option<DateTime<Utc>>,
    pub trigger: String,
}

/// What a generation firing did.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationTick {
    Ran(Option<GeneratedPostSummary>),
    /// A previous firing was still in flight
    Overlapping,
    /// The firing arrived after the misfire grace window
    Misfired,
}

/// Drops firings that arrive too long after they were due.
pub struct MisfireWindow {
    interval: Duration,
    grace: Duration,
    next_due: StdMutex<Instant>,
}

impl MisfireWindow {
    pub fn new(interval: Duration, grace: Duration, started_at: Instant) -> Self {
        Self {
            interval,
            grace,
            next_due: StdMutex::new(started_at + interval),
        }
    }

    /// Whether a firing at `now` is on time, advancing the next due instant.
    pub fn admit(&self, now: Instant) -> bool {
        let mut next_due = self.next_due.lock().unwrap_or_else(|e| e.into_inner());
        let late_by = now.saturating_duration_since(*next_due);
        *next_due = now + self.interval;
        late_by <= self.grace
    }
}

struct RegisteredJob {
    uuid: Uuid,
    id: &'static str,
    name: &'static str,
    trigger: String,
}

struct Running {
    scheduler: JobScheduler,
    jobs: Vec<RegisteredJob>,
}

/// Owns the job scheduler and the single-flight guard for generation.
pub struct BlogScheduler {
    generator: Arc<BlogGenerator>,
    store: Arc<dyn BaseBlogStore>,
    misfire_grace: Duration,
    guard: Arc<Mutex<()>>,
    running: Mutex<Option<Running>>,
}

impl BlogScheduler {
    pub fn new(generator: Arc<BlogGenerator>, store: Arc<dyn BaseBlogStore>) -> Self {
        Self {
            generator,
            store,
            misfire_grace: DEFAULT_MISFIRE_GRACE,
            guard: Arc::new(Mutex::new(())),
            running: Mutex::new(None),
        }
    }

    pub fn with_misfire_grace(mut self, grace: Duration) -> Self {
        self.misfire_grace = grace;
        self
    }

    /// Register the three jobs and start ticking. No-op if already running.
    pub async fn start(&self, interval_minutes: u64) -> Result<()> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            tracing::warn!("Scheduler is already running");
            return Ok(());
        }
        if interval_minutes == 0 {
            bail!("Generation interval must be at least one minute");
        }

        let interval = Duration::from_secs(interval_minutes * 60);
        let scheduler = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;
        let mut jobs = Vec::with_capacity(3);

        // Blog generation - every `interval_minutes`
        let generator = self.generator.clone();
        let guard = self.guard.clone();
        let window = Arc::new(MisfireWindow::new(
            interval,
            self.misfire_grace,
            Instant::now(),
        ));
        let generation_job = Job::new_repeated_async(interval, move |_uuid, _lock| {
            let generator = generator.clone();
            let guard = guard.clone();
            let window = window.clone();
            Box::pin(async move {
                if !window.admit(Instant::now()) {
                    tracing::warn!(job = GENERATION_JOB_ID, "Run time was missed, skipping");
                    return;
                }
                run_generation_job(&generator, &guard).await;
            })
        })?;
        jobs.push(RegisteredJob {
            uuid: scheduler.add(generation_job).await?,
            id: GENERATION_JOB_ID,
            name: "Generate Blog Post",
            trigger: format!("interval[{} min]", interval_minutes),
        });

        // Stats reporting - every hour
        let stats_store = self.store.clone();
        let stats_job = Job::new_repeated_async(STATS_INTERVAL, move |_uuid, _lock| {
            let store = stats_store.clone();
            Box::pin(async move {
                run_job(STATS_JOB_ID, report_stats(store.as_ref())).await;
            })
        })?;
        jobs.push(RegisteredJob {
            uuid: scheduler.add(stats_job).await?,
            id: STATS_JOB_ID,
            name: "Report Generation Stats",
            trigger: "interval[60 min]".to_string(),
        });

        // Daily cleanup - 02:00 UTC
        let cleanup_store = self.store.clone();
        let cleanup_job = Job::new_async(CLEANUP_SCHEDULE, move |_uuid, _lock| {
            let store = cleanup_store.clone();
            Box::pin(async move {
                run_job(CLEANUP_JOB_ID, daily_cleanup(store.as_ref())).await;
            })
        })?;
        jobs.push(RegisteredJob {
            uuid: scheduler.add(cleanup_job).await?,
            id: CLEANUP_JOB_ID,
            name: "Daily Cleanup",
            trigger: format!("cron[{} UTC]", CLEANUP_SCHEDULE),
        });

        scheduler
            .start()
            .await
            .context("Failed to start job scheduler")?;

        tracing::info!(
            interval_minutes,
            "Scheduler started (generation every {} min, stats hourly, cleanup daily at 02:00 UTC)",
            interval_minutes
        );
        *running = Some(Running { scheduler, jobs });
        Ok(())
    }

    /// Stop ticking, then wait for an in-flight generation to finish.
    pub async fn stop(&self) -> Result<()> {
        let Some(Running { mut scheduler, .. }) = self.running.lock().await.take() else {
            tracing::warn!("Scheduler is not running");
            return Ok(());
        };

        scheduler
            .shutdown()
            .await
            .context("Failed to shut down job scheduler")?;

        let _in_flight = self.guard.lock().await;
        tracing::info!("Scheduler stopped");
        Ok(())
    }

    /// Run the generation job body immediately.
    ///
    /// Bypasses the timer and the single-flight guard, so it can overlap a
    /// scheduled run.
    pub async fn generate_now(&self) -> Option<GeneratedPostSummary> {
        tracing::info!("Manual generation triggered");
        self.generator.generate_for_schedule().await
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Registered jobs with their next fire time (empty when stopped).
    pub async fn job_info(&self) -> Vec<JobInfo> {
        let running = self.running.lock().await;
        let Some(Running { scheduler, jobs }) = running.as_ref() else {
            return Vec::new();
        };

        let mut scheduler = scheduler.clone();
        let mut info = Vec::with_capacity(jobs.len());
        for job in jobs {
            let next_run_time = match scheduler.next_tick_for_job(job.uuid).await {
                Ok(next) => next,
                Err(e) => {
                    tracing::debug!(job = job.id, error = ?e, "No next tick for job");
                    None
                }
            };
            info.push(JobInfo {
                id: job.id.to_string(),
                name: job.name.to_string(),
                next_run_time,
                trigger: job.trigger.clone(),
            });
        }
        info
    }
}

/// Generation body shared by the timer; skips if a run is in flight.
pub async fn run_generation_job(generator: &BlogGenerator, guard: &Mutex<()>) -> GenerationTick {
    let Ok(_permit) = guard.try_lock() else {
        tracing::info!(
            job = GENERATION_JOB_ID,
            "Previous generation still running, skipping"
        );
        return GenerationTick::Overlapping;
    };

    tracing::info!(job = GENERATION_JOB_ID, "Running scheduled blog generation");
    let summary = generator.generate_for_schedule().await;
    match &summary {
        Some(post) => tracing::info!(post_id = post.id, title = %post.title, "Scheduled generation complete"),
        None => tracing::warn!("Scheduled generation did not produce a post"),
    }
    GenerationTick::Ran(summary)
}

/// Log the error of a job body instead of letting it escape.
pub async fn run_job<F>(name: &str, body: F)
where
    F: Future<Output = Result<()>>,
{
    if let Err(e) = body.await {
        tracing::error!(job = name, error = %format!("{:#}", e), "Scheduled task failed");
    }
}

/// Log generation counters for the last day.
pub async fn report_stats(store: &dyn BaseBlogStore) -> Result<()> {
    let stats = store.generation_stats(REPORT_WINDOW_HOURS).await?;
    tracing::info!(
        total_attempts = stats.total_attempts,
        successful = stats.successful_attempts,
        failed = stats.failed_attempts,
        in_progress = stats.in_progress_attempts,
        total_posts = stats.total_posts,
        success_rate = stats.success_rate,
        "Generation stats (last {}h)",
        stats.period_hours
    );
    Ok(())
}

/// Daily report; counts attempts stuck in progress but leaves them untouched.
pub async fn daily_cleanup(store: &dyn BaseBlogStore) -> Result<()> {
    tracing::info!("Running daily cleanup");
    report_stats(store).await?;

    let stale = store.count_stale_in_progress(REPORT_WINDOW_HOURS).await?;
    if stale > 0 {
        tracing::warn!(
            stale,
            "Generation attempts stuck in progress for over {}h",
            REPORT_WINDOW_HOURS
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::{InMemoryBlogStore, MockContentPipeline, TestDependencies};

    #[test]
    fn test_on_time_firing_admitted() {
        let start = Instant::now();
        let window = MisfireWindow::new(Duration::from_secs(60), Duration::from_secs(5), start);

        assert!(window.admit(start + Duration::from_secs(60)));
        assert!(window.admit(start + Duration::from_secs(123)));
    }

    #[test]
    fn test_late_firing_dropped() {
        let start = Instant::now();
        let window = MisfireWindow::new(Duration::from_secs(60), Duration::from_secs(5), start);

        assert!(!window.admit(start + Duration::from_secs(70)));
        // The window re-arms from the dropped firing
        assert!(window.admit(start + Duration::from_secs(130)));
    }

    #[tokio::test]
    async fn test_overlapping_firing_skipped() {
        let deps = TestDependencies::new().mock_pipeline(
            MockContentPipeline::returning(crate::kernel::test_dependencies::SAMPLE_CREW_OUTPUT)
                .with_delay(Duration::from_millis(200)),
        );
        let pipeline = deps.pipeline.clone();
        let generator = deps.into_generator();
        let guard = Mutex::new(());

        let (first, second) = tokio::join!(
            run_generation_job(&generator, &guard),
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                run_generation_job(&generator, &guard).await
            }
        );

        assert!(matches!(first, GenerationTick::Ran(Some(_))));
        assert_eq!(second, GenerationTick::Overlapping);
        assert_eq!(pipeline.run_count(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_leaves_stale_rows() {
        let store = InMemoryBlogStore::new();
        store.insert_log(
            "stuck",
            crate::domains::blog::models::GenerationStatus::InProgress,
            Utc::now() - chrono::Duration::hours(30),
        );

        daily_cleanup(&store).await.unwrap();

        assert_eq!(store.count_stale_in_progress(24).await.unwrap(), 1);
        assert_eq!(store.logs()[0].status, "in_progress");
    }

    #[tokio::test]
    async fn test_run_job_swallows_errors() {
        let store = InMemoryBlogStore::new();
        run_job("failing", async { Err(anyhow::anyhow!("boom")) }).await;
        run_job(STATS_JOB_ID, report_stats(&store)).await;
    }
}
