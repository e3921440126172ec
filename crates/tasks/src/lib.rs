mod task;
pub use task::TaskHandle;

mod scheduler;
pub use scheduler::Scheduler;

extern crate num_cpus;
