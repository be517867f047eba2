//! 后台任务管理 / Background task management
//!
//! Registry for long-running tasks with one shared shutdown token. Tasks
//! are wrapped in a panic catcher so a crashing task is logged instead of
//! dying silently inside the runtime.

use std::fmt;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Runs until shutdown, driven by events
    Worker,
    /// Wakes on a fixed interval
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Worker => write!(f, "worker"),
            TaskKind::Periodic => write!(f, "periodic"),
        }
    }
}

struct RegisteredTask {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

pub struct BackgroundTasks {
    token: CancellationToken,
    tasks: Vec<RegisteredTask>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    /// Token handed to tasks so they can observe shutdown
    pub fn shutdown_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Spawn and register a task under the shared shutdown token
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            if let Err(panic) = AssertUnwindSafe(future).catch_unwind().await {
                let msg = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(task = name, panic = %msg, "Background task panicked");
            }
        });
        self.tasks.push(RegisteredTask { name, kind, handle });
        tracing::debug!(task = name, "Background task spawned");
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn log_summary(&self) {
        for task in &self.tasks {
            tracing::info!(task = task.name, kind = %task.kind, "Background task running");
        }
    }

    /// Cancel the shared token and wait for every task to drain
    pub async fn shutdown(self) {
        tracing::info!(count = self.tasks.len(), "Stopping background tasks");
        self.token.cancel();
        for task in self.tasks {
            if let Err(err) = task.handle.await {
                tracing::warn!(task = task.name, error = %err, "Background task join failed");
            }
        }
        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}
