use tasks::Scheduler;

fn main() {
    // Create a new scheduler, one worker thread per hardware core.
    let scheduler = Scheduler::with_hardware_concurrency();

    loop {
        let root = scheduler.create_parallel_for("batch", 1, 10000, 256, |start, end| {
            for i in start..end {
                println!("Job: {}", i);
            }
        });
        scheduler.run(&root);
        scheduler.wait(&root);

        std::thread::sleep(std::time::Duration::from_millis(16));
    }
}
