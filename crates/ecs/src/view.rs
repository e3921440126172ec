use std::marker::PhantomData;

use crate::entity::Entity;
use crate::mask::ComponentMask;
use crate::world::{ComponentSet, World};

/// A query against a `World`'s current set of component types.
///
/// Represents the static mask `M = OR(id(T_i))`; yields entities whose mask
/// contains every bit of `M`, ascending by entity index. Cheap to construct
/// and to re-iterate: a `View` holds no cursor of its own, so calling
/// [`View::iter`] more than once always restarts from the beginning.
pub struct View<'w, T: ComponentSet> {
    world: &'w World,
    mask: ComponentMask,
    _marker: PhantomData<T>,
}

impl<'w, T: ComponentSet> View<'w, T> {
    pub(crate) fn new(world: &'w World) -> Self {
        Self {
            world,
            mask: T::mask(world),
            _marker: PhantomData,
        }
    }

    pub fn mask(&self) -> ComponentMask {
        self.mask
    }

    /// A fresh, forward-only iterator over the matching entities.
    pub fn iter(&self) -> ViewIter<'w, T> {
        ViewIter {
            world: self.world,
            mask: self.mask,
            cursor: 0,
            _marker: PhantomData,
        }
    }

    pub fn visit(&self, mut f: impl FnMut(Entity)) {
        for entity in self.iter() {
            f(entity);
        }
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

impl<'w, T: ComponentSet> IntoIterator for &View<'w, T> {
    type Item = Entity;
    type IntoIter = ViewIter<'w, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct ViewIter<'w, T: ComponentSet> {
    world: &'w World,
    mask: ComponentMask,
    cursor: u32,
    _marker: PhantomData<T>,
}

impl<'w, T: ComponentSet> Iterator for ViewIter<'w, T> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let limit = self.world.entity_capacity();
        while self.cursor < limit {
            let index = self.cursor;
            self.cursor += 1;

            if let Some(handle) = self.world.handle_at(index) {
                let entity = Entity::from_handle(handle);
                if self.world.components_mask(entity).contains_all(self.mask) {
                    return Some(entity);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    fn ensure_log() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            log::Log::init();
        });
    }

    struct Transform;
    impl crate::component::Component for Transform {}

    struct Widget;
    impl crate::component::Component for Widget {}

    #[test]
    fn mask_iteration_matches_the_concrete_scenario() {
        ensure_log();
        let mut world = World::new();

        let entities: Vec<Entity> = (0..256).map(|_| world.spawn()).collect();
        for (i, &e) in entities.iter().enumerate() {
            if i % 2 == 0 {
                world.add_component(e, Transform);
            }
            if i % 4 == 1 {
                world.add_component(e, Widget);
            }
        }

        assert_eq!(world.find_entities_with::<(Transform,)>().count(), 128);
        assert_eq!(world.find_entities_with::<(Transform, Widget)>().count(), 64);
        assert_eq!(world.find_entities_with::<(Widget,)>().count(), 64);
    }

    #[test]
    fn iteration_is_ascending_by_index_and_restartable() {
        ensure_log();
        let mut world = World::new();
        let e0 = world.spawn();
        let e1 = world.spawn();
        let e2 = world.spawn();
        world.add_component(e0, Transform);
        world.add_component(e2, Transform);
        let _ = e1;

        let view = world.find_entities_with::<(Transform,)>();
        let first_pass: Vec<Entity> = view.iter().collect();
        let second_pass: Vec<Entity> = view.iter().collect();
        assert_eq!(first_pass, vec![e0, e2]);
        assert_eq!(second_pass, vec![e0, e2]);
    }

    #[test]
    fn view_with_no_matching_entities_is_empty() {
        ensure_log();
        let mut world = World::new();
        world.spawn();
        assert_eq!(world.find_entities_with::<(Widget,)>().count(), 0);
    }
}
