//! Periodic Task Wrapper
//!
//! Fixed-interval invocation shared by all maintenance jobs. A task is
//! either running or stopped; the interval never changes over its lifetime
//! and passes never overlap, since the next tick is not armed until the
//! current pass returns.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Spawns a background task that invokes `pass` on a fixed interval until
/// the cancellation token fires.
///
/// Cancellation is cooperative: it is observed while waiting for the next
/// tick, so an in-flight pass always runs to completion before the task
/// exits. A failed pass is logged and does not stop subsequent ticks.
pub fn spawn_periodic<F, Fut, T>(
    name: &'static str,
    interval: Duration,
    token: CancellationToken,
    mut pass: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send,
    T: Send,
{
    tokio::spawn(async move {
        info!("{name}: started, interval {}s", interval.as_secs_f64());

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            // The pass itself is not raced against cancellation
            match pass().await {
                Ok(_) => debug!("{name}: pass complete"),
                Err(e) => warn!("{name}: pass failed: {e}"),
            }
        }

        info!("{name}: stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JanitorError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_pass_runs_repeatedly() {
        let counter = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();

        let counter_clone = counter.clone();
        let handle = spawn_periodic(
            "test-repeat",
            Duration::from_millis(10),
            token.clone(),
            move || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
        handle.await.unwrap();

        assert!(counter.load(Ordering::SeqCst) >= 2, "expected multiple passes");
    }

    #[tokio::test]
    async fn test_cancellation_stops_future_passes() {
        let counter = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();

        let counter_clone = counter.clone();
        let handle = spawn_periodic(
            "test-cancel",
            Duration::from_millis(10),
            token.clone(),
            move || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        );

        token.cancel();
        handle.await.unwrap();

        let after_cancel = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), after_cancel);
    }

    #[tokio::test]
    async fn test_in_flight_pass_completes_on_cancel() {
        let finished = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();

        let finished_clone = finished.clone();
        let handle = spawn_periodic(
            "test-graceful",
            Duration::from_millis(5),
            token.clone(),
            move || {
                let finished = finished_clone.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        );

        // Cancel while the first pass is almost certainly in flight
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
        handle.await.unwrap();

        assert_eq!(
            finished.load(Ordering::SeqCst),
            1,
            "the in-flight pass must finish before the task exits"
        );
    }

    #[tokio::test]
    async fn test_failed_pass_does_not_halt_ticks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();

        let counter_clone = counter.clone();
        let handle = spawn_periodic(
            "test-failing",
            Duration::from_millis(10),
            token.clone(),
            move || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(JanitorError::Store("injected".to_string()))
                }
            },
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
        handle.await.unwrap();

        assert!(
            counter.load(Ordering::SeqCst) >= 2,
            "failures must not stop the schedule"
        );
    }
}
