//! Repeat loop: run a blocking job, sleep, repeat until shut down.
//!
//! The job always runs to completion on a blocking thread; shutdown only cuts
//! the sleep between attempts short. A failed attempt is logged and the next
//! one runs on schedule, without backoff.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::error::{io_err, DaemonError};

/// Counters for a finished repeat loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub attempts: u64,
    pub failures: u64,
}

/// Run `job` immediately and then every `interval` until `shutdown` fires
/// (or its sender is dropped).
pub async fn run_every<T, E, F>(
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
    job: F,
) -> Result<RunStats, DaemonError>
where
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    let job = Arc::new(job);
    let mut stats = RunStats::default();

    loop {
        stats.attempts += 1;
        let attempt = stats.attempts;
        let job_for_attempt = Arc::clone(&job);
        let outcome = tokio::task::spawn_blocking(move || job_for_attempt())
            .await
            .map_err(|source| DaemonError::Join {
                task: "sync",
                source,
            })?;

        match outcome {
            Ok(_) => tracing::debug!(attempt, "sync attempt finished"),
            Err(err) => {
                stats.failures += 1;
                tracing::error!(attempt, error = %err, "sync attempt failed");
            }
        }

        tokio::select! {
            _ = shutdown.recv() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::info!(
        attempts = stats.attempts,
        failures = stats.failures,
        "repeat loop stopped"
    );
    Ok(stats)
}

/// Build a multi-thread runtime, wire Ctrl-C to the shutdown channel and run
/// [`run_every`] until interrupted.
pub fn start_blocking<T, E, F>(interval: Duration, job: F) -> Result<RunStats, DaemonError>
where
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;

    runtime.block_on(async move {
        let (shutdown_tx, _) = broadcast::channel::<()>(4);

        let signal_handle = {
            let shutdown = shutdown_tx.clone();
            tokio::spawn(async move {
                tokio::signal::ctrl_c()
                    .await
                    .map_err(DaemonError::Signal)?;
                tracing::info!("received ctrl-c, stopping after the current attempt");
                let _ = shutdown.send(());
                Ok::<(), DaemonError>(())
            })
        };

        tracing::info!(interval_ms = interval.as_millis() as u64, "repeating sync");
        let stats = run_every(interval, shutdown_tx.subscribe(), job).await;

        if signal_handle.is_finished() {
            signal_handle
                .await
                .map_err(|source| DaemonError::Join {
                    task: "signal_handler",
                    source,
                })??;
        } else {
            signal_handle.abort();
        }
        stats
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn counting_job(
        counter: Arc<AtomicU64>,
        fail: bool,
    ) -> impl Fn() -> Result<(), String> + Send + Sync + 'static {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            if fail {
                Err("feed unreachable".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_runs_immediately_and_shutdown_cuts_sleep() {
        let counter = Arc::new(AtomicU64::new(0));
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(run_every(
            Duration::from_secs(3600),
            rx,
            counting_job(counter.clone(), false),
        ));

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        tx.send(()).unwrap();
        let stats = handle.await.unwrap().unwrap();
        assert_eq!(
            stats,
            RunStats {
                attempts: 1,
                failures: 0
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn repeats_on_interval() {
        let counter = Arc::new(AtomicU64::new(0));
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(run_every(
            Duration::from_secs(10),
            rx,
            counting_job(counter.clone(), false),
        ));

        // attempts at t=0, 10 and 20
        tokio::time::sleep(Duration::from_secs(25)).await;
        tx.send(()).unwrap();
        let stats = handle.await.unwrap().unwrap();
        assert_eq!(stats.attempts, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_attempts_do_not_stop_the_loop() {
        let counter = Arc::new(AtomicU64::new(0));
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(run_every(
            Duration::from_secs(10),
            rx,
            counting_job(counter.clone(), true),
        ));

        tokio::time::sleep(Duration::from_secs(25)).await;
        tx.send(()).unwrap();
        let stats = handle.await.unwrap().unwrap();
        assert_eq!(
            stats,
            RunStats {
                attempts: 3,
                failures: 3
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_sender_stops_the_loop() {
        let counter = Arc::new(AtomicU64::new(0));
        let (tx, rx) = broadcast::channel::<()>(1);
        drop(tx);
        let stats = run_every(
            Duration::from_secs(10),
            rx,
            counting_job(counter.clone(), false),
        )
        .await
        .unwrap();
        assert_eq!(stats.attempts, 1);
    }
}
