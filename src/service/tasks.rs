//! Tracked background work
//!
//! Background loads are fire-and-forget for the caller that triggers them,
//! but a short-lived CLI process must not exit while they are still writing
//! to the cache, so every task lands in a shared [`JoinSet`].

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;

#[derive(Clone, Default)]
pub struct BackgroundTasks {
    set: Arc<Mutex<JoinSet<()>>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` on the current runtime
    pub async fn spawn<F>(&self, name: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        log::debug!("Spawning background task: {}", name);
        self.set.lock().await.spawn(task);
    }

    pub async fn pending(&self) -> usize {
        self.set.lock().await.len()
    }

    /// Wait for every spawned task, including ones spawned while waiting
    pub async fn wait(&self) {
        loop {
            let mut running = std::mem::take(&mut *self.set.lock().await);
            if running.is_empty() {
                break;
            }
            while let Some(result) = running.join_next().await {
                if let Err(e) = result {
                    log::warn!("Background task did not complete: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_wait_joins_all_tasks() {
        let tasks = BackgroundTasks::new();
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let done = done.clone();
            tasks
                .spawn("count", async move {
                    tokio::task::yield_now().await;
                    done.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        }

        tasks.wait().await;
        assert_eq!(done.load(Ordering::SeqCst), 3);
        assert_eq!(tasks.pending().await, 0);
    }

    #[tokio::test]
    async fn test_wait_picks_up_nested_spawns() {
        let tasks = BackgroundTasks::new();
        let done = Arc::new(AtomicUsize::new(0));

        let inner_tasks = tasks.clone();
        let inner_done = done.clone();
        tasks
            .spawn("outer", async move {
                inner_tasks
                    .spawn("inner", async move {
                        inner_done.fetch_add(1, Ordering::SeqCst);
                    })
                    .await;
            })
            .await;

        tasks.wait().await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_task_is_logged_not_propagated() {
        let tasks = BackgroundTasks::new();
        tasks.spawn("boom", async { panic!("boom") }).await;
        tasks.wait().await;
    }
}
