use std::ops::{Deref, DerefMut};

use ecs::World;
use render::Frontend;
use tasks::Scheduler;

use crate::config::RuntimeConfig;
use crate::error::InitError;

/// A scheduler, a world, and a render frontend, built in that order by
/// [`initialize`].
///
/// The world owns its own event dispatcher internally (see `crates/ecs`),
/// so there is no separate dispatcher construction step here; the
/// ordering that matters is scheduler, then world-and-its-dispatcher,
/// then frontend.
pub struct Runtime {
    scheduler: Scheduler,
    world: World,
    frontend: Frontend,
}

impl Runtime {
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn frontend(&self) -> &Frontend {
        &self.frontend
    }

    /// Tears down in reverse construction order: world, then frontend,
    /// then the scheduler (whose `Drop` joins its worker threads).
    pub fn dispose(mut self) {
        log::info("disposing runtime");
        self.world.dispose();
        drop(self.frontend);
        drop(self.scheduler);
    }
}

fn validate_frontend_config(config: &render::FrontendConfig) -> Result<(), InitError> {
    if config.vertex_buffer_capacity == 0 {
        return Err(InitError::InvalidFrontendConfig("vertex_buffer_capacity"));
    }
    if config.index_buffer_capacity == 0 {
        return Err(InitError::InvalidFrontendConfig("index_buffer_capacity"));
    }
    if config.texture_capacity == 0 {
        return Err(InitError::InvalidFrontendConfig("texture_capacity"));
    }
    if config.program_capacity == 0 {
        return Err(InitError::InvalidFrontendConfig("program_capacity"));
    }
    if config.render_state_capacity == 0 {
        return Err(InitError::InvalidFrontendConfig("render_state_capacity"));
    }
    Ok(())
}

/// Constructs a [`Runtime`]: scheduler, then world, then frontend. If
/// frontend config validation fails after the scheduler and world have
/// already been constructed, both are torn down before the error is
/// returned — the scheduler's worker threads are joined via `Drop`, and
/// the world's registered pools are disposed the same way `Runtime::dispose`
/// would.
pub fn initialize(config: RuntimeConfig) -> Result<Runtime, InitError> {
    log::info("initializing runtime");

    let scheduler = match config.worker_count {
        Some(count) => Scheduler::new(count),
        None => Scheduler::with_hardware_concurrency(),
    };

    let mut world = World::new();

    if let Err(error) = validate_frontend_config(&config.frontend) {
        log::error(&format!("runtime init failed, rolling back: {}", error));
        world.dispose();
        drop(scheduler);
        return Err(error);
    }

    let frontend = Frontend::new(config.frontend);

    log::info("runtime initialized");
    Ok(Runtime {
        scheduler,
        world,
        frontend,
    })
}

/// RAII wrapper around a [`Runtime`] that calls `dispose()` on drop, so
/// the common case can't forget explicit teardown.
pub struct RuntimeGuard(Option<Runtime>);

impl RuntimeGuard {
    pub fn new(runtime: Runtime) -> Self {
        Self(Some(runtime))
    }
}

impl Deref for RuntimeGuard {
    type Target = Runtime;

    fn deref(&self) -> &Runtime {
        self.0.as_ref().expect("RuntimeGuard used after dispose")
    }
}

impl DerefMut for RuntimeGuard {
    fn deref_mut(&mut self) -> &mut Runtime {
        self.0.as_mut().expect("RuntimeGuard used after dispose")
    }
}

impl Drop for RuntimeGuard {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.dispose();
        }
    }
}
