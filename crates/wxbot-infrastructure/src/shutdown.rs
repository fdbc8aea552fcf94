//! Background task lifetime
//!
//! Long-running work (the refresh loop) is spawned through
//! [`ShutdownCoordinator`], which hands each task a child of one root
//! cancellation token and tracks it by name until it returns. Draining
//! reports the names of tasks that outlived the deadline so the caller
//! can keep their clients open.
//!
//! [`shutdown_signal`] resolves on the OS stop request.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Outcome of [`ShutdownCoordinator::shutdown`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drain {
    /// Every tracked task returned
    Complete,
    /// Tasks still running at the deadline, sorted by name
    TimedOut { stuck: Vec<&'static str> },
}

impl Drain {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Root cancellation token plus the named tasks spawned under it
#[derive(Default)]
pub struct ShutdownCoordinator {
    root: CancellationToken,
    tracker: TaskTracker,
    running: Arc<DashMap<u64, &'static str>>,
    next_id: AtomicU64,
}

/// Removes a task from `running` when its future completes or is dropped
struct RunningGuard {
    id: u64,
    running: Arc<DashMap<u64, &'static str>>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.running.remove(&self.id);
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token cancelled when [`shutdown`](Self::shutdown) starts
    pub fn child_token(&self) -> CancellationToken {
        self.root.child_token()
    }

    /// Spawn a tracked task that stops when its token is cancelled
    pub fn spawn_cancellable<F, Fut>(&self, name: &'static str, task_fn: F) -> JoinHandle<Fut::Output>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.running.insert(id, name);
        let guard = RunningGuard {
            id,
            running: Arc::clone(&self.running),
        };
        let future = task_fn(self.child_token());

        debug!(task = name, "Spawning tracked task");
        self.tracker.spawn(async move {
            let _guard = guard;
            future.await
        })
    }

    /// Cancel the root token and wait up to `timeout` for tracked tasks
    pub async fn shutdown(&self, timeout: Duration) -> Drain {
        info!(
            timeout = %humantime::format_duration(timeout),
            running = self.running.len(),
            "Stopping background tasks"
        );

        self.root.cancel();
        self.tracker.close();

        if tokio::time::timeout(timeout, self.tracker.wait()).await.is_ok() {
            info!("Background tasks stopped");
            return Drain::Complete;
        }

        let mut stuck: Vec<&'static str> = self.running.iter().map(|task| *task.value()).collect();
        stuck.sort_unstable();
        warn!(?stuck, "Background tasks still running at shutdown deadline");
        Drain::TimedOut { stuck }
    }
}

/// Resolve on SIGINT (Ctrl+C) or, on Unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Ctrl+C received"),
        () = terminate => info!("SIGTERM received"),
    }
}
