use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// State of the background task owned by a [`Lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Why `stop()` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The task had already returned on its own.
    Finished,
    /// The task observed cancellation and returned within the timeout.
    Cancelled,
    /// The task did not return in time and was aborted.
    Timeout,
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("already started")]
    AlreadyStarted,
}

/// Handed to the task by [`Lifecycle::start_with_ready`]; flips `Starting -> Running`.
pub struct ReadySignal(watch::Sender<Status>);

impl ReadySignal {
    pub fn notify(self) {
        self.0.send_if_modified(|s| {
            if *s == Status::Starting {
                *s = Status::Running;
                true
            } else {
                false
            }
        });
        tracing::debug!("lifecycle status -> running");
    }
}

/// Owns one cancellable background task, e.g. the HTTP server.
///
/// The process bootstrap holds this object; nothing below it needs to know
/// about signals or shutdown.
pub struct Lifecycle {
    status: watch::Sender<Status>,
    cancel: Mutex<Option<CancellationToken>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (status, _) = watch::channel(Status::Stopped);
        Self {
            status,
            cancel: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    pub fn status(&self) -> Status {
        *self.status.borrow()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status(), Status::Starting | Status::Running)
    }

    /// Spawn `make(cancel, ready)`. The status stays `Starting` until the task
    /// calls `ready.notify()`. The future must return once `cancel` fires.
    #[tracing::instrument(skip(self, make), level = "debug")]
    pub fn start_with_ready<F, Fut>(&self, make: F) -> Result<(), LifecycleError>
    where
        F: FnOnce(CancellationToken, ReadySignal) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let claimed = self.status.send_if_modified(|s| {
            if *s == Status::Stopped {
                *s = Status::Starting;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(LifecycleError::AlreadyStarted);
        }

        let token = CancellationToken::new();
        *self.cancel.lock() = Some(token.clone());

        let ready = ReadySignal(self.status.clone());
        let status = self.status.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = make(token, ready).await {
                tracing::error!(error = %e, "lifecycle task failed");
            }
            status.send_replace(Status::Stopped);
            tracing::debug!("lifecycle status -> stopped");
        });
        *self.handle.lock() = Some(handle);
        Ok(())
    }

    /// Wait until the task signals readiness. Returns `false` if it stopped first.
    pub async fn wait_ready(&self) -> bool {
        let mut rx = self.status.subscribe();
        let running = match rx
            .wait_for(|s| matches!(s, Status::Running | Status::Stopped))
            .await
        {
            Ok(s) => *s == Status::Running,
            Err(_) => false,
        };
        running
    }

    /// Cancel the task and wait up to `timeout` for it to return.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn stop(&self, timeout: Duration) -> StopReason {
        let handle = self.handle.lock().take();
        let token = self.cancel.lock().take();

        let Some(mut handle) = handle else {
            return StopReason::Finished;
        };
        if handle.is_finished() || self.status() == Status::Stopped {
            let _ = handle.await;
            self.status.send_replace(Status::Stopped);
            return StopReason::Finished;
        }

        self.status.send_replace(Status::Stopping);
        if let Some(token) = token {
            token.cancel();
        }

        let reason = match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(())) => StopReason::Cancelled,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "lifecycle task join error");
                StopReason::Cancelled
            }
            Err(_) => {
                tracing::warn!(?timeout, "lifecycle stop timed out; aborting task");
                handle.abort();
                let _ = handle.await;
                StopReason::Timeout
            }
        };

        self.status.send_replace(Status::Stopped);
        tracing::info!(?reason, "lifecycle stopped");
        reason
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        if let Some(token) = self.cancel.get_mut().take() {
            token.cancel();
        }
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ready_then_cancelled() {
        let lc = Lifecycle::new();
        assert_eq!(lc.status(), Status::Stopped);

        lc.start_with_ready(|cancel, ready| async move {
            ready.notify();
            cancel.cancelled().await;
            Ok(())
        })
        .unwrap();

        assert!(lc.wait_ready().await);
        assert_eq!(lc.status(), Status::Running);
        assert!(lc.is_running());

        let reason = lc.stop(Duration::from_secs(1)).await;
        assert_eq!(reason, StopReason::Cancelled);
        assert_eq!(lc.status(), Status::Stopped);
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let lc = Lifecycle::new();
        lc.start_with_ready(|cancel, ready| async move {
            ready.notify();
            cancel.cancelled().await;
            Ok(())
        })
        .unwrap();

        let second = lc.start_with_ready(|_, _| async { Ok(()) });
        assert!(matches!(second, Err(LifecycleError::AlreadyStarted)));
        lc.stop(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn task_that_fails_before_ready_is_not_ready() {
        let lc = Lifecycle::new();
        lc.start_with_ready(|_, _ready| async { anyhow::bail!("bind failed") })
            .unwrap();

        assert!(!lc.wait_ready().await);
        assert_eq!(lc.stop(Duration::from_secs(1)).await, StopReason::Finished);
    }

    #[tokio::test]
    async fn unresponsive_task_times_out() {
        let lc = Lifecycle::new();
        lc.start_with_ready(|_cancel, ready| async move {
            ready.notify();
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .unwrap();
        assert!(lc.wait_ready().await);

        let reason = lc.stop(Duration::from_millis(50)).await;
        assert_eq!(reason, StopReason::Timeout);
        assert_eq!(lc.status(), Status::Stopped);
    }

    #[tokio::test]
    async fn stop_without_start_is_finished() {
        let lc = Lifecycle::new();
        assert_eq!(lc.stop(Duration::from_millis(10)).await, StopReason::Finished);
    }

    #[tokio::test]
    async fn restart_after_stop() {
        let lc = Lifecycle::new();
        for _ in 0..2 {
            lc.start_with_ready(|cancel, ready| async move {
                ready.notify();
                cancel.cancelled().await;
                Ok(())
            })
            .unwrap();
            assert!(lc.wait_ready().await);
            assert_eq!(lc.stop(Duration::from_secs(1)).await, StopReason::Cancelled);
        }
    }
}
