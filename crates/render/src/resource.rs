use handle::{Handle, HandlePool};
use parking_lot::Mutex;

/// A typed pool of GPU-ish resources, sized by a compile-time maximum.
///
/// `create` hands back `Handle::NULL` once `capacity` live resources are
/// outstanding rather than growing past it, matching the "HandleSet
/// exhaustion returns a null handle" failure mode.
pub struct HandleSet<T> {
    pool: HandlePool,
    capacity: usize,
    descriptors: Mutex<Vec<Option<T>>>,
}

impl<T> HandleSet<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: HandlePool::new(),
            capacity,
            descriptors: Mutex::new(Vec::new()),
        }
    }

    pub fn create(&self, descriptor: T) -> Handle {
        if self.pool.size() >= self.capacity {
            return Handle::NULL;
        }
        let handle = self.pool.create();
        let index = handle.index() as usize;
        let mut descriptors = self.descriptors.lock();
        if descriptors.len() <= index {
            descriptors.resize_with(index + 1, || None);
        }
        descriptors[index] = Some(descriptor);
        handle
    }

    /// Replaces `handle`'s descriptor. A no-op returning `false` against a
    /// dead or stale handle.
    pub fn update(&self, handle: Handle, descriptor: T) -> bool {
        if !self.pool.alive(handle) {
            return false;
        }
        self.descriptors.lock()[handle.index() as usize] = Some(descriptor);
        true
    }

    /// A no-op against an already-dead or stale handle (idempotent, like
    /// `HandlePool::free`).
    pub fn free(&self, handle: Handle) {
        self.pool.free(handle);
    }

    pub fn alive(&self, handle: Handle) -> bool {
        self.pool.alive(handle)
    }

    pub fn len(&self) -> usize {
        self.pool.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_beyond_capacity_returns_null() {
        let set: HandleSet<u32> = HandleSet::new(2);
        let a = set.create(1);
        let b = set.create(2);
        let c = set.create(3);

        assert!(!a.is_null());
        assert!(!b.is_null());
        assert!(c.is_null());
    }

    #[test]
    fn freed_slot_is_reusable_within_capacity() {
        let set: HandleSet<u32> = HandleSet::new(1);
        let a = set.create(1);
        set.free(a);
        let b = set.create(2);
        assert!(!b.is_null());
    }

    #[test]
    fn update_against_a_dead_handle_is_a_no_op() {
        let set: HandleSet<u32> = HandleSet::new(1);
        let a = set.create(1);
        set.free(a);
        assert!(!set.update(a, 99));
    }
}
