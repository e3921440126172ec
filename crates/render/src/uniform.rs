use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use types::StringHash;

/// Default capacity of a frame's uniform arena, in `(name_hash, value)`
/// slots. Chosen generously enough that a frame's worth of drawcalls won't
/// exhaust it under ordinary use; `allocate` returns `None` rather than
/// growing past it.
pub const MAX_UNIFORMS: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([f32; 16]),
    Int(i32),
}

/// A reserved, contiguous slice of a [`UniformBuffer`].
///
/// `first`/`num` describe the reserved range; `used` tracks how many of
/// those slots have actually been written via [`UniformBuffer::set`]. Valid
/// only until the owning frame ends and its arena resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformBufferView {
    pub first: u32,
    pub num: u32,
    pub used: u32,
}

/// Per-frame transient storage for uniform values, keyed by name hash.
///
/// `allocate` reserves a range with a single atomic bump (a compare-exchange
/// loop, since a plain `fetch_add` could overshoot `MAX_UNIFORMS` under
/// contention); writing into the reserved range is guarded by a lock, same
/// as the command/drawcall vectors this sits alongside in a `RenderFrame`.
pub struct UniformBuffer {
    cursor: AtomicUsize,
    slots: Mutex<Vec<(StringHash, UniformValue)>>,
}

impl Default for UniformBuffer {
    fn default() -> Self {
        Self {
            cursor: AtomicUsize::new(0),
            slots: Mutex::new(vec![
                (StringHash::new(""), UniformValue::Int(0));
                MAX_UNIFORMS
            ]),
        }
    }
}

impl UniformBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `count` contiguous slots. Returns `None` if that would
    /// exceed `MAX_UNIFORMS`.
    pub fn allocate(&self, count: u32) -> Option<UniformBufferView> {
        loop {
            let current = self.cursor.load(Ordering::Acquire);
            let next = current + count as usize;
            if next > MAX_UNIFORMS {
                return None;
            }
            if self
                .cursor
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Some(UniformBufferView {
                    first: current as u32,
                    num: count,
                    used: 0,
                });
            }
        }
    }

    /// Writes slot `offset` (relative to `view.first`) within a previously
    /// allocated view. Returns `false` if `offset >= view.num`.
    pub fn set(&self, view: &mut UniformBufferView, offset: u32, name_hash: StringHash, value: UniformValue) -> bool {
        if offset >= view.num {
            return false;
        }
        let index = (view.first + offset) as usize;
        self.slots.lock()[index] = (name_hash, value);
        view.used = view.used.max(offset + 1);
        true
    }

    pub fn get(&self, view: &UniformBufferView, offset: u32) -> Option<(StringHash, UniformValue)> {
        if offset >= view.used {
            return None;
        }
        Some(self.slots.lock()[(view.first + offset) as usize])
    }

    /// Resets the bump cursor, as `end_frame`/`drain` do once a frame's
    /// slot has been fully consumed.
    pub fn reset(&self) {
        self.cursor.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_reserves_disjoint_ranges() {
        let arena = UniformBuffer::new();
        let a = arena.allocate(4).unwrap();
        let b = arena.allocate(4).unwrap();
        assert_eq!(a.first, 0);
        assert_eq!(b.first, 4);
    }

    #[test]
    fn allocate_past_capacity_returns_none() {
        let arena = UniformBuffer::new();
        assert!(arena.allocate(MAX_UNIFORMS as u32).is_some());
        assert!(arena.allocate(1).is_none());
    }

    #[test]
    fn set_and_get_round_trip_within_a_view() {
        let arena = UniformBuffer::new();
        let mut view = arena.allocate(2).unwrap();
        arena.set(&mut view, 0, StringHash::new("u_color"), UniformValue::Float(1.0));
        assert_eq!(
            arena.get(&view, 0),
            Some((StringHash::new("u_color"), UniformValue::Float(1.0)))
        );
        assert_eq!(arena.get(&view, 1), None);
    }

    #[test]
    fn reset_reclaims_the_whole_arena() {
        let arena = UniformBuffer::new();
        arena.allocate(10).unwrap();
        arena.reset();
        let view = arena.allocate(MAX_UNIFORMS as u32).unwrap();
        assert_eq!(view.first, 0);
    }
}
