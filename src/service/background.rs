use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
};

use tokio::task::JoinSet;

/// Detached side effects that outlive the request that started them.
///
/// Finished tasks are reaped on every spawn so the set stays small; `drain`
/// waits for whatever is still in flight (shutdown, tests).
#[derive(Clone, Default)]
pub struct BackgroundTasks {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, JoinSet<()>> {
        // A panic while holding the lock leaves the set itself intact
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.lock();
        while let Some(finished) = tasks.try_join_next() {
            if let Err(e) = finished {
                tracing::error!("Background task failed: {}", e);
            }
        }
        tasks.spawn(task);
    }

    pub async fn drain(&self) {
        loop {
            let mut pending = std::mem::take(&mut *self.lock());
            if pending.is_empty() {
                return;
            }
            while let Some(finished) = pending.join_next().await {
                if let Err(e) = finished {
                    tracing::error!("Background task failed: {}", e);
                }
            }
        }
    }
}
