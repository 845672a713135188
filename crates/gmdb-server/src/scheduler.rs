//! Background job scheduler.
//!
//! Registers the polling bulletin crawl when `GMDB_BULLETIN_CRON` is set.

use gmdb_scraper::{run_bulletin_crawl, CrawlMode, CrawlSettings};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is rejected, or the scheduler fails to start.
pub async fn build_scheduler(state: AppState) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match state.config.bulletin_cron.clone() {
        Some(cron) => register_bulletin_poll_job(&scheduler, &cron, state).await?,
        None => tracing::info!("scheduler: GMDB_BULLETIN_CRON unset, no polling crawl"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Runs a [`CrawlMode::Poll`] crawl on every tick of `cron`.
///
/// A tick waits for any crawl already holding the lock rather than skipping.
async fn register_bulletin_poll_job(
    scheduler: &JobScheduler,
    cron: &str,
    state: AppState,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            let _guard = state.crawl_lock.lock().await;
            tracing::info!("scheduler: starting polling bulletin crawl");

            let settings = CrawlSettings::from_app_config(&state.config);
            match run_bulletin_crawl(&state.fetcher, &state.store, &settings, CrawlMode::Poll)
                .await
            {
                Ok(summary) => tracing::info!(
                    inserted = summary.inserted,
                    backed_off = summary.backed_off,
                    "scheduler: polling bulletin crawl complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: polling bulletin crawl failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: registered polling bulletin crawl");
    Ok(())
}
