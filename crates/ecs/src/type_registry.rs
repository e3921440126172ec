use std::any::TypeId;

use fxhash::FxHashMap;

use crate::mask::MAX_COMPONENTS;

/// Assigns dense, monotonically-increasing ids to concrete component types.
///
/// Owned per-`World` rather than as a process-global static: the spec
/// requires `dispose()` followed by re-initialization to yield an empty
/// world with no dangling type-ids, which a true process-global counter
/// could never satisfy. One id space covers the whole `Component` family
/// (see spec.md §9's open question, resolved in DESIGN.md).
pub struct TypeRegistry {
    ids: FxHashMap<TypeId, u32>,
    next: u32,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self {
            ids: FxHashMap::default(),
            next: 0,
        }
    }
}

impl TypeRegistry {
    /// Returns `T`'s id if it has already been registered.
    pub fn id_of<T: 'static>(&self) -> Option<u32> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    /// Registers `T`, returning its id. Idempotent: re-registering an
    /// already-known type just returns the existing id. Fails if a brand
    /// new id would exceed `MAX_COMPONENTS`.
    pub fn register<T: 'static>(&mut self) -> Option<u32> {
        let type_id = TypeId::of::<T>();
        if let Some(&id) = self.ids.get(&type_id) {
            return Some(id);
        }

        if self.next as usize >= MAX_COMPONENTS {
            return None;
        }

        let id = self.next;
        self.next += 1;
        self.ids.insert(type_id, id);
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    #[test]
    fn registration_is_dense_and_idempotent() {
        let mut registry = TypeRegistry::default();
        let a = registry.register::<A>().unwrap();
        let b = registry.register::<B>().unwrap();
        assert_ne!(a, b);

        let a_again = registry.register::<A>().unwrap();
        assert_eq!(a, a_again);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn exceeding_max_components_fails() {
        struct Probe<const N: usize>;
        let mut registry = TypeRegistry::default();
        registry.next = MAX_COMPONENTS as u32;
        assert_eq!(registry.register::<Probe<0>>(), None);
    }
}
