//! Bounded execution of external collaborator calls.
//!
//! The pool caps the number of in-flight collaborator calls with a semaphore and enforces a
//! hard deadline on each call. The deadline covers waiting for a permit as well as the call
//! itself. Dropping the future returned by [`CollaboratorPool::run`] drops the collaborator
//! future and returns its permit.

use crate::{CollaboratorError, CollaboratorResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Clone, Debug)]
pub struct CollaboratorPool {
    permits: Arc<Semaphore>,
    size: usize,
    timeout: Duration,
}

impl CollaboratorPool {
    pub fn new(size: usize, timeout: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
            timeout,
        }
    }

    /// Runs `call` once a permit is available, failing with
    /// [`CollaboratorError::Timeout`] if the deadline elapses first.
    pub async fn run<T, F>(&self, label: &'static str, call: F) -> CollaboratorResult<T>
    where
        F: Future<Output = CollaboratorResult<T>>,
    {
        let guarded = async {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| CollaboratorError::PoolClosed)?;
            call.await
        };

        match tokio::time::timeout(self.timeout, guarded).await {
            Ok(result) => {
                match &result {
                    Err(CollaboratorError::Unavailable(reason)) => {
                        tracing::debug!(collaborator = label, %reason, "collaborator unavailable");
                    }
                    Err(e) => {
                        tracing::error!(collaborator = label, error = %e, "collaborator call failed");
                    }
                    Ok(_) => {}
                }
                result
            }
            Err(_) => {
                tracing::error!(
                    collaborator = label,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "collaborator call timed out"
                );
                Err(CollaboratorError::Timeout(self.timeout))
            }
        }
    }

    /// Permits currently free.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Stops admitting new calls. Calls already holding a permit run to completion.
    pub fn close(&self) {
        self.permits.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn returns_collaborator_result() {
        let pool = CollaboratorPool::new(2, Duration::from_secs(1));
        let out = pool.run("test", async { Ok::<_, CollaboratorError>(7) }).await;
        assert_eq!(out, Ok(7));
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out() {
        let pool = CollaboratorPool::new(1, Duration::from_millis(50));
        let out = pool
            .run("slow", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, CollaboratorError>(())
            })
            .await;
        assert_eq!(out, Err(CollaboratorError::Timeout(Duration::from_millis(50))));
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrency_is_bounded() {
        let pool = CollaboratorPool::new(2, Duration::from_secs(10));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let pool = pool.clone();
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                pool.run("bounded", async {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, CollaboratorError>(())
                })
                .await
            }));
        }
        for h in handles {
            assert!(h.await.unwrap().is_ok());
        }
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn aborting_caller_releases_permit() {
        let pool = CollaboratorPool::new(1, Duration::from_secs(60));
        let task_pool = pool.clone();
        let handle = tokio::spawn(async move {
            task_pool
                .run("abandoned", async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok::<_, CollaboratorError>(())
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(pool.available(), 0);

        handle.abort();
        let _ = handle.await;
        assert_eq!(pool.available(), 1);
    }

    #[tokio::test]
    async fn closed_pool_rejects_calls() {
        let pool = CollaboratorPool::new(1, Duration::from_secs(1));
        pool.close();
        let out = pool.run("closed", async { Ok::<_, CollaboratorError>(()) }).await;
        assert_eq!(out, Err(CollaboratorError::PoolClosed));
    }
}
