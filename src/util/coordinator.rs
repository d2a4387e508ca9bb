//! The single coordinating context.
//!
//! All project-model reads and mutations happen on one thread. Asynchronous
//! collaborators (workspace queries, deferred property lookups) are awaited
//! from synchronous call sites by driving the coordinator's task queue until
//! the awaited future completes, instead of blocking the thread on a result
//! that only the same thread could produce.
//!
//! ```text
//!   sync caller ──join(fut)──► current-thread runtime
//!                                 │  polls fut
//!                                 │  runs spawned tasks while fut is pending
//!                                 ▼
//!                             fut output
//! ```
//!
//! Joins nest. A join started from work the coordinator is already running
//! (a joined future, or a spawned task) polls its future in place on the
//! same thread, parking between polls until the future's waker fires.

use std::cell::Cell;
use std::future::Future;
use std::sync::Arc;
use std::task::Poll;
use std::thread::{self, Thread, ThreadId};

use anyhow::{Context, Result};
use futures::task::{waker, ArcWake};
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

/// Handle to the coordinating context.
///
/// Cloning is cheap; every clone refers to the same runtime and the same
/// owning thread.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

struct Inner {
    runtime: Runtime,
    owner: ThreadId,
}

impl Coordinator {
    /// Create a coordinator owned by the calling thread.
    pub fn new() -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_time()
            .build()
            .context("failed to start the coordinating runtime")?;

        Ok(Coordinator {
            inner: Arc::new(Inner {
                runtime,
                owner: thread::current().id(),
            }),
        })
    }

    /// Whether the calling thread is the coordinating thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.inner.owner
    }

    /// Run `future` to completion from synchronous code.
    ///
    /// Tasks previously handed to [`Coordinator::spawn`] make progress while
    /// the outermost join is pending. A nested join polls its future in
    /// place; spawned tasks resume once control returns to the outer join.
    pub fn join<F: Future>(&self, future: F) -> F::Output {
        debug_assert!(
            self.is_current(),
            "Coordinator::join called off the coordinating thread"
        );

        let nested = Self::in_join();
        let _guard = JoinGuard::enter();
        if nested {
            tracing::trace!("nested join, polling in place");
            poll_in_place(future)
        } else {
            self.inner.runtime.block_on(future)
        }
    }

    /// Whether the calling thread is inside a join.
    pub fn in_join() -> bool {
        JOIN_DEPTH.with(|depth| depth.get() > 0)
    }

    /// Queue a task on the coordinating context.
    ///
    /// The task only runs while some caller is inside [`Coordinator::join`].
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.inner.runtime.spawn(future)
    }
}

thread_local! {
    static JOIN_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Marks the calling thread as inside a join until dropped.
struct JoinGuard;

impl JoinGuard {
    fn enter() -> Self {
        JOIN_DEPTH.with(|depth| depth.set(depth.get() + 1));
        JoinGuard
    }
}

impl Drop for JoinGuard {
    fn drop(&mut self) {
        JOIN_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

/// Wakes a parked thread.
struct ThreadWaker(Thread);

impl ArcWake for ThreadWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.0.unpark();
    }
}

fn poll_in_place<F: Future>(future: F) -> F::Output {
    futures::pin_mut!(future);
    let waker = waker(Arc::new(ThreadWaker(thread::current())));
    let mut cx = std::task::Context::from_waker(&waker);
    loop {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
        thread::park();
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("owner", &self.inner.owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_join_returns_output() {
        let coordinator = Coordinator::new().unwrap();
        let value = coordinator.join(async { 40 + 2 });
        assert_eq!(value, 42);
    }

    #[test]
    fn test_spawned_tasks_run_during_join() {
        let coordinator = Coordinator::new().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let task_counter = counter.clone();
        let handle = coordinator.spawn(async move {
            task_counter.fetch_add(1, Ordering::SeqCst);
            7
        });

        // Nothing has driven the runtime yet.
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        let value = coordinator.join(async { handle.await.unwrap() });
        assert_eq!(value, 7);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_nested_join() {
        let coordinator = Coordinator::new().unwrap();
        assert!(!Coordinator::in_join());

        let value = coordinator.join(async {
            assert!(Coordinator::in_join());
            let inner = coordinator.join(async { coordinator.join(async { 1 }) + 1 });
            inner + 1
        });
        assert_eq!(value, 3);
        assert!(!Coordinator::in_join());
    }

    #[test]
    fn test_spawned_task_may_join() {
        let coordinator = Coordinator::new().unwrap();
        let inner = coordinator.clone();

        let handle = coordinator.spawn(async move { inner.join(async { 5 }) * 2 });
        let value = coordinator.join(async { handle.await.unwrap() });
        assert_eq!(value, 10);
    }

    #[test]
    fn test_affinity() {
        let coordinator = Coordinator::new().unwrap();
        assert!(coordinator.is_current());

        let remote = coordinator.clone();
        let off_thread = std::thread::spawn(move || remote.is_current())
            .join()
            .unwrap();
        assert!(!off_thread);
    }
}
