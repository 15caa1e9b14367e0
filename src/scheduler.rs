//! Periodic trigger for background jobs.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::feed::EntryFetcher;
use crate::monitor::IngestLoop;

enum SchedulerMessage {
    Shutdown,
}

/// A job executed on a fixed interval.
pub trait PeriodicJob: Send + 'static {
    fn interval(&self) -> Duration;

    /// Used in log lines.
    fn name(&self) -> &'static str;

    fn execute(&mut self) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Clone)]
pub struct SchedulerHandle {
    sender: mpsc::Sender<SchedulerMessage>,
}

impl SchedulerHandle {
    pub async fn shutdown(&self) {
        let _ = self.sender.send(SchedulerMessage::Shutdown).await;
    }
}

/// Spawn `job` on its own task. The first run happens one interval after the
/// call. Runs never overlap: ticks that fire while a run is in progress are
/// dropped rather than queued.
pub fn spawn_periodic<J: PeriodicJob>(mut job: J) -> SchedulerHandle {
    let (sender, mut receiver) = mpsc::channel(8);

    tokio::spawn(async move {
        let mut timer = tokio::time::interval(job.interval());
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Skip first tick (immediate)
        timer.tick().await;

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    if let Err(e) = job.execute().await {
                        tracing::error!("Job '{}' failed: {}", job.name(), e);
                    }
                }
                msg = receiver.recv() => {
                    match msg {
                        Some(SchedulerMessage::Shutdown) | None => {
                            tracing::info!("Job '{}' stopped", job.name());
                            break;
                        }
                    }
                }
            }
        }
    });

    SchedulerHandle { sender }
}

/// Runs one ingest pass per tick.
pub struct IngestJob<F> {
    ingest: IngestLoop<F>,
    interval: Duration,
}

impl<F> IngestJob<F> {
    pub fn new(ingest: IngestLoop<F>, interval: Duration) -> Self {
        Self { ingest, interval }
    }
}

impl<F: EntryFetcher + 'static> PeriodicJob for IngestJob<F> {
    fn interval(&self) -> Duration {
        self.interval
    }

    fn name(&self) -> &'static str {
        "fetch_and_process"
    }

    async fn execute(&mut self) -> Result<()> {
        let report = self.ingest.run_pass().await?;
        tracing::info!(
            "Pass finished: {} sources, {} skipped, {} new items",
            report.sources,
            report.skipped,
            report.inserted
        );
        Ok(())
    }
}
