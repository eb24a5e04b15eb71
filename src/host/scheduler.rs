//! Tick based task scheduling.
//!
//! Delays and intervals are measured in server ticks of 50 ms. Sync tasks run
//! one at a time on the main queue; async tasks run on worker threads.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

pub type Task = Box<dyn FnOnce() + Send + 'static>;
pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;

const MILLIS_PER_TICK: u64 = 50;

pub fn ticks(count: u64) -> Duration {
    Duration::from_millis(count.saturating_mul(MILLIS_PER_TICK))
}

/// Cancels a scheduled task. Cloning shares the cancellation flag.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    /// A handle not backed by a tokio task.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
            abort: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub trait Scheduler: Send + Sync {
    fn run_sync(&self, delay: u64, task: Task) -> TaskHandle;

    fn run_async(&self, delay: u64, task: Task) -> TaskHandle;

    fn sync_timer(&self, delay: u64, interval: u64, task: RepeatingTask) -> TaskHandle;

    fn async_timer(&self, delay: u64, interval: u64, task: RepeatingTask) -> TaskHandle;
}

/// Runs `supplier` on the main queue and waits for its result.
pub async fn get_on_main<T, F>(scheduler: &dyn Scheduler, supplier: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    scheduler.run_sync(
        0,
        Box::new(move || {
            let _ = tx.send(supplier());
        }),
    );
    rx.await
        .context("Main thread task was dropped before it completed")
}

/// Scheduler backed by the current tokio runtime.
pub struct TickScheduler {
    main: mpsc::UnboundedSender<Task>,
    runtime: Handle,
    next_id: AtomicU64,
}

impl TickScheduler {
    /// Starts the main queue. Must be called from within a tokio runtime.
    pub fn start() -> Self {
        let (main, mut queue) = mpsc::unbounded_channel::<Task>();
        let runtime = Handle::current();

        runtime.spawn(async move {
            while let Some(task) = queue.recv().await {
                task();
            }
            debug!("Main queue closed");
        });

        Self {
            main,
            runtime,
            next_id: AtomicU64::new(1),
        }
    }

    fn next_handle(&self) -> TaskHandle {
        TaskHandle::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn spawn_once<F, Fut>(&self, delay: u64, body: F) -> TaskHandle
    where
        F: FnOnce(Arc<AtomicBool>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut handle = self.next_handle();
        let cancelled = handle.cancelled.clone();

        let join = self.runtime.spawn(async move {
            if delay > 0 {
                tokio::time::sleep(ticks(delay)).await;
            }
            if !cancelled.load(Ordering::SeqCst) {
                body(cancelled).await;
            }
        });

        handle.abort = Some(join.abort_handle());
        handle
    }

    /// `step` runs once per interval and returns false to stop the timer.
    fn spawn_repeating<F, Fut>(&self, delay: u64, interval: u64, mut step: F) -> TaskHandle
    where
        F: FnMut(Arc<AtomicBool>) -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let mut handle = self.next_handle();
        let cancelled = handle.cancelled.clone();
        let period = ticks(interval.max(1));

        let join = self.runtime.spawn(async move {
            if delay > 0 {
                tokio::time::sleep(ticks(delay)).await;
            }
            let mut timer = tokio::time::interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                if cancelled.load(Ordering::SeqCst) || !step(cancelled.clone()).await {
                    break;
                }
            }
        });

        handle.abort = Some(join.abort_handle());
        handle
    }
}

impl Scheduler for TickScheduler {
    fn run_sync(&self, delay: u64, task: Task) -> TaskHandle {
        let main = self.main.clone();
        self.spawn_once(delay, move |cancelled| async move {
            let queued: Task = Box::new(move || {
                if !cancelled.load(Ordering::SeqCst) {
                    task();
                }
            });
            if main.send(queued).is_err() {
                debug!("Main queue closed, dropping task");
            }
        })
    }

    fn run_async(&self, delay: u64, task: Task) -> TaskHandle {
        self.spawn_once(delay, move |_| async move {
            if let Err(e) = tokio::task::spawn_blocking(task).await {
                debug!("Async task failed: {}", e);
            }
        })
    }

    fn sync_timer(&self, delay: u64, interval: u64, task: RepeatingTask) -> TaskHandle {
        let main = self.main.clone();
        let task = Arc::new(Mutex::new(task));

        self.spawn_repeating(delay, interval, move |cancelled| {
            let task = task.clone();
            let queued: Task = Box::new(move || {
                if !cancelled.load(Ordering::SeqCst) {
                    let mut task = task.lock().unwrap_or_else(PoisonError::into_inner);
                    (*task)();
                }
            });
            let sent = main.send(queued).is_ok();
            async move { sent }
        })
    }

    fn async_timer(&self, delay: u64, interval: u64, task: RepeatingTask) -> TaskHandle {
        let task = Arc::new(Mutex::new(task));

        self.spawn_repeating(delay, interval, move |_| {
            let task = task.clone();
            async move {
                let run = tokio::task::spawn_blocking(move || {
                    let mut task = task.lock().unwrap_or_else(PoisonError::into_inner);
                    (*task)();
                });
                if let Err(e) = run.await {
                    debug!("Async timer iteration failed: {}", e);
                }
                true
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
        let count = Arc::new(AtomicUsize::new(0));
        let read = {
            let count = count.clone();
            move || count.load(Ordering::SeqCst)
        };
        (count, read)
    }

    #[test]
    fn test_ticks() {
        assert_eq!(ticks(0), Duration::ZERO);
        assert_eq!(ticks(20), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sync_after_delay() {
        let scheduler = TickScheduler::start();
        let (count, read) = counter();

        scheduler.run_sync(
            10,
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(ticks(5)).await;
        assert_eq!(read(), 0);
        tokio::time::sleep(ticks(10)).await;
        tokio::task::yield_now().await;
        assert_eq!(read(), 1);
    }

    #[tokio::test]
    async fn test_get_on_main_returns_value() {
        let scheduler = TickScheduler::start();
        let value = get_on_main(&scheduler, || 21 * 2).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_never_runs() {
        let scheduler = TickScheduler::start();
        let (count, read) = counter();

        let handle = scheduler.run_sync(
            5,
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );
        handle.cancel();

        tokio::time::sleep(ticks(20)).await;
        assert!(handle.is_cancelled());
        assert_eq!(read(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_async_timer_repeats_until_cancelled() {
        let scheduler = TickScheduler::start();
        let (count, read) = counter();

        let handle = scheduler.async_timer(
            0,
            1,
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_millis(400)).await;
        handle.cancel();
        let after_cancel = read();
        assert!(after_cancel >= 2, "ran {} times", after_cancel);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(read() <= after_cancel + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_timer_runs_each_interval() {
        let scheduler = TickScheduler::start();
        let (count, read) = counter();

        let handle = scheduler.sync_timer(
            20,
            20,
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(ticks(10)).await;
        assert_eq!(read(), 0);

        tokio::time::sleep(ticks(55)).await;
        tokio::task::yield_now().await;
        assert_eq!(read(), 3);

        handle.cancel();
        tokio::time::sleep(ticks(100)).await;
        assert_eq!(read(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_timer_zero_interval_runs_every_tick() {
        let scheduler = TickScheduler::start();
        let (count, read) = counter();

        let handle = scheduler.sync_timer(
            0,
            0,
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(ticks(10)).await;
        tokio::task::yield_now().await;
        handle.cancel();

        let ran = read();
        assert!((5..=12).contains(&ran), "ran {} times", ran);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_async_timer_zero_interval_is_clamped() {
        let scheduler = TickScheduler::start();
        let (count, read) = counter();

        let handle = scheduler.async_timer(
            0,
            0,
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.cancel();

        let ran = read();
        assert!(ran >= 2, "ran {} times", ran);
        assert!(ran <= 8, "ran {} times", ran);
    }

    #[test]
    fn test_handle_ids_are_unique() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();
        let scheduler = TickScheduler::start();

        let a = scheduler.run_async(100, Box::new(|| {}));
        let b = scheduler.run_async(100, Box::new(|| {}));
        assert_ne!(a.id(), b.id());
    }
}
