use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// A task holds a diagnostic name, an optional parent, the user closure, and
/// an atomic open-count initialized to 1 (its own pending closure) plus the
/// number of not-yet-completed children registered via `create_as_child`
/// before `run` is called on it.
pub(crate) struct TaskInner {
    pub(crate) name: String,
    pub(crate) parent: Option<Arc<TaskInner>>,
    open_count: AtomicUsize,
    job: Mutex<Option<Job>>,
    started: AtomicBool,
}

impl TaskInner {
    pub(crate) fn new(name: String, parent: Option<Arc<TaskInner>>, job: Job) -> Arc<Self> {
        Arc::new(Self {
            name,
            parent,
            open_count: AtomicUsize::new(1),
            job: Mutex::new(Some(job)),
            started: AtomicBool::new(false),
        })
    }

    pub(crate) fn take_job(&self) -> Option<Job> {
        self.job.lock().unwrap().take()
    }

    pub(crate) fn add_child(&self) {
        self.open_count.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn mark_started(&self) {
        self.started.store(true, Ordering::Release);
    }

    pub(crate) fn has_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    fn is_completed(&self) -> bool {
        self.open_count.load(Ordering::Acquire) == 0
    }
}

/// Decrements one step of completed work (the task's own closure, or one
/// child finishing) and cascades to the parent whenever the decrement
/// brings the count to zero. Cascades are lock-free: a single atomic
/// fetch-sub per task on the path to the root.
pub(crate) fn complete_step(task: &Arc<TaskInner>) {
    if task.open_count.fetch_sub(1, Ordering::AcqRel) == 1 {
        if let Some(parent) = &task.parent {
            complete_step(parent);
        }
    }
}

/// A handle to a task submitted to a [`Scheduler`](crate::Scheduler).
///
/// Cloning a `TaskHandle` shares the same underlying task; `is_completed`
/// observes the same atomic open-count regardless of which clone is asked.
#[derive(Clone)]
pub struct TaskHandle(pub(crate) Arc<TaskInner>);

impl TaskHandle {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// True iff the open-count has reached zero: the task's own closure has
    /// returned and every descendant registered before `run` has too.
    pub fn is_completed(&self) -> bool {
        self.0.is_completed()
    }
}
