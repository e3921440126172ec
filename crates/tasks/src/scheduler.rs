use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam_deque::{Injector, Steal, Stealer, Worker};

use crate::task::{complete_step, Job, TaskHandle, TaskInner};

thread_local! {
    /// Set for the lifetime of a worker thread's run loop; absent on the
    /// main thread and any other foreign caller.
    static LOCAL_WORKER: RefCell<Option<Worker<Job>>> = RefCell::new(None);
}

/// A fixed pool of worker threads plus the calling ("main") thread.
///
/// Submissions from a worker thread push to that worker's own LIFO deque;
/// submissions from any other thread push to a shared injector queue. Idle
/// workers drain their own deque first, then the injector, then steal from
/// another worker's deque tail.
pub struct Scheduler {
    injector: Arc<Injector<Job>>,
    stealers: Arc<Vec<Stealer<Job>>>,
    shutdown: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
    main_thread: ThreadId,
}

impl Scheduler {
    /// Spawns `worker_count` worker threads. `worker_count` is clamped to at
    /// least 1.
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let workers: Vec<Worker<Job>> = (0..worker_count).map(|_| Worker::new_lifo()).collect();
        let stealers = Arc::new(workers.iter().map(Worker::stealer).collect::<Vec<_>>());
        let injector = Arc::new(Injector::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let main_thread = thread::current().id();

        let threads = workers
            .into_iter()
            .enumerate()
            .map(|(index, worker)| {
                let injector = injector.clone();
                let stealers = stealers.clone();
                let shutdown = shutdown.clone();
                thread::Builder::new()
                    .name(format!("tasks-worker-{}", index))
                    .spawn(move || {
                        LOCAL_WORKER.with(|cell| *cell.borrow_mut() = Some(worker));
                        run_worker_loop(&injector, &stealers, &shutdown);
                    })
                    .expect("failed to spawn task worker thread")
            })
            .collect();

        Self {
            injector,
            stealers,
            shutdown,
            threads,
            main_thread,
        }
    }

    /// Sized to hardware concurrency, per spec default.
    pub fn with_hardware_concurrency() -> Self {
        Self::new(num_cpus::get())
    }

    pub fn is_main_thread(&self) -> bool {
        thread::current().id() == self.main_thread
    }

    /// Produces an unstarted task.
    pub fn create(
        &self,
        name: impl Into<String>,
        job: impl FnOnce() + Send + 'static,
    ) -> TaskHandle {
        TaskHandle(TaskInner::new(name.into(), None, Box::new(job)))
    }

    /// Same as `create`, and atomically increments `parent`'s open-count.
    /// Must be called before `run(parent)` to be safe.
    pub fn create_as_child(
        &self,
        parent: &TaskHandle,
        name: impl Into<String>,
        job: impl FnOnce() + Send + 'static,
    ) -> TaskHandle {
        let name = name.into();
        debug_assert!(
            !parent.0.has_started(),
            "create_as_child('{}') called after run(parent) for '{}'",
            name,
            parent.0.name
        );
        parent.0.add_child();
        TaskHandle(TaskInner::new(name, Some(parent.0.clone()), Box::new(job)))
    }

    /// Creates a root and `ceil((last - first) / partition)` children, each
    /// covering `[start, min(last, start + partition))`, and submits every
    /// child immediately. The root itself is returned un-run: callers still
    /// `run(&root)` (a trivial closure) and `wait(&root)`.
    pub fn create_parallel_for<F>(
        &self,
        name: impl Into<String>,
        first: usize,
        last: usize,
        partition: usize,
        func: F,
    ) -> TaskHandle
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        let name = name.into();
        let partition = partition.max(1);
        let root = self.create(name.clone(), || {});
        let func = Arc::new(func);

        let mut start = first;
        let mut index = 0usize;
        while start < last {
            let end = (start + partition).min(last);
            let chunk_func = func.clone();
            let child = self.create_as_child(&root, format!("{}#{}", name, index), move || {
                chunk_func(start, end)
            });
            self.run(&child);
            start = end;
            index += 1;
        }

        root
    }

    /// Submits `handle` for execution. After this point the task's
    /// open-count is decremented when its closure returns (successfully or
    /// by panicking).
    pub fn run(&self, handle: &TaskHandle) {
        handle.0.mark_started();
        let task = handle.0.clone();
        let job: Job = Box::new(move || {
            if let Some(closure) = task.take_job() {
                if catch_unwind(AssertUnwindSafe(closure)).is_err() {
                    log::error(&format!("task '{}' panicked; marking it completed", task.name));
                }
            }
            complete_step(&task);
        });
        self.submit(job);
    }

    fn submit(&self, job: Job) {
        let overflow = LOCAL_WORKER.with(move |cell| match &*cell.borrow() {
            Some(worker) => {
                worker.push(job);
                None
            }
            None => Some(job),
        });
        if let Some(job) = overflow {
            self.injector.push(job);
        }
    }

    /// Blocks the caller; while blocked, helps by executing tasks pulled
    /// from the queue until `handle` is completed. Returns immediately if
    /// `handle` was already completed.
    pub fn wait(&self, handle: &TaskHandle) {
        while !handle.is_completed() {
            match find_job(&self.injector, &self.stealers) {
                Some(job) => job(),
                None => thread::yield_now(),
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
    }
}

fn run_worker_loop(injector: &Injector<Job>, stealers: &[Stealer<Job>], shutdown: &AtomicBool) {
    while !shutdown.load(Ordering::Acquire) {
        match find_job(injector, stealers) {
            Some(job) => job(),
            None => thread::yield_now(),
        }
    }
    // Drain whatever is left so in-flight completion cascades still finish.
    while let Some(job) = find_job(injector, stealers) {
        job();
    }
}

fn find_job(injector: &Injector<Job>, stealers: &[Stealer<Job>]) -> Option<Job> {
    if let Some(job) = LOCAL_WORKER.with(|cell| cell.borrow().as_ref().and_then(Worker::pop)) {
        return Some(job);
    }

    loop {
        match injector.steal() {
            Steal::Success(job) => return Some(job),
            Steal::Retry => continue,
            Steal::Empty => break,
        }
    }

    for stealer in stealers {
        loop {
            match stealer.steal() {
                Steal::Success(job) => return Some(job),
                Steal::Retry => continue,
                Steal::Empty => break,
            }
        }
    }

    None
}
