use std::sync::Mutex;

use crate::handle::Handle;

/// The last generation a slot may reach. Once a slot's generation saturates
/// here it is retired: `free` still tears the handle down, but the index is
/// never handed back out by `create`, so the reserved generation value is
/// never reissued for that slot.
const RETIRED_GENERATION: u32 = u32::MAX - 1;

/// Returns the next generation for a slot being freed, and whether that
/// generation retires the slot (saturated at [`RETIRED_GENERATION`]).
fn bump_generation(generation: u32) -> (u32, bool) {
    let next = generation.saturating_add(1).min(RETIRED_GENERATION);
    (next, next >= RETIRED_GENERATION)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    Free,
    Allocated,
    Retired,
}

struct Inner {
    generations: Vec<u32>,
    slots: Vec<Slot>,
    /// LIFO stack of reusable indices, for cache residency.
    free_indices: Vec<u32>,
    live_count: usize,
}

impl Inner {
    fn new() -> Self {
        Self {
            generations: Vec::new(),
            slots: Vec::new(),
            free_indices: Vec::new(),
            live_count: 0,
        }
    }

    fn alive(&self, handle: Handle) -> bool {
        if handle.is_null() {
            return false;
        }
        let index = handle.index() as usize;
        index < self.slots.len()
            && self.slots[index] == Slot::Allocated
            && self.generations[index] == handle.generation()
    }
}

/// Issues and recycles [`Handle`]s.
///
/// `create` returns a handle whose `alive` is true until a matching `free`.
/// `free` is idempotent against stale or already-dead handles. Indices are
/// reused LIFO; generations bump on free and saturate at
/// [`RETIRED_GENERATION`], at which point the slot is retired and never
/// reused again.
pub struct HandlePool {
    inner: Mutex<Inner>,
}

impl Default for HandlePool {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner::new()),
        }
    }
}

impl HandlePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and returns a new, live `Handle`.
    pub fn create(&self) -> Handle {
        let mut inner = self.inner.lock().unwrap();
        inner.live_count += 1;

        if let Some(index) = inner.free_indices.pop() {
            let i = index as usize;
            inner.slots[i] = Slot::Allocated;
            return Handle::new(index, inner.generations[i]);
        }

        let index = inner.generations.len() as u32;
        inner.generations.push(1);
        inner.slots.push(Slot::Allocated);
        Handle::new(index, 1)
    }

    /// Invalidates `handle`. A no-op if `handle` is already dead or stale.
    pub fn free(&self, handle: Handle) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.alive(handle) {
            return;
        }

        let i = handle.index() as usize;
        inner.live_count -= 1;

        let (next_generation, retires) = bump_generation(inner.generations[i]);
        inner.generations[i] = next_generation;

        if retires {
            inner.slots[i] = Slot::Retired;
        } else {
            inner.slots[i] = Slot::Free;
            inner.free_indices.push(handle.index());
        }
    }

    /// Returns whether `handle` is currently live.
    pub fn alive(&self, handle: Handle) -> bool {
        self.inner.lock().unwrap().alive(handle)
    }

    /// Returns the live handle currently occupying `index`, if any.
    ///
    /// Lets callers reconstruct an `Entity`/`Handle` from a bare index
    /// without tracking generations themselves.
    pub fn handle_at(&self, index: u32) -> Option<Handle> {
        let inner = self.inner.lock().unwrap();
        let i = index as usize;
        if i < inner.slots.len() && inner.slots[i] == Slot::Allocated {
            Some(Handle::new(index, inner.generations[i]))
        } else {
            None
        }
    }

    /// Returns the number of currently-live handles.
    pub fn size(&self) -> usize {
        self.inner.lock().unwrap().live_count
    }

    /// Resets the pool to empty, as if freshly constructed.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = Inner::new();
    }
}
