use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_WORKERS: usize = 5;

/// Bounded pool: at most `workers` spawned tasks run their body at once.
///
/// Results come back through the returned [`JoinSet`] in completion order.
#[derive(Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    workers: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerPool {
    pub fn new() -> Self {
        Self::with_workers(DEFAULT_WORKERS)
    }

    pub fn with_workers(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Spawn `task(item)` for every item.
    pub fn spawn_all<I, F, Fut, T>(&self, items: I, task: F) -> JoinSet<T>
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut set = JoinSet::new();
        for item in items {
            let semaphore = self.semaphore.clone();
            let work = task(item);
            set.spawn(async move {
                let _permit = semaphore.acquire().await;
                work.await
            });
        }
        set
    }
}
