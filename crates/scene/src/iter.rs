use ecs::{Entity, World};

use crate::transform::Transform;

fn transform_of(world: &World, entity: Entity) -> Option<&Transform> {
    let (transform,) = world.get_components::<(Transform,)>(entity);
    transform
}

/// Walks from `entity`'s parent up to the root, exclusive of `entity` itself.
pub struct AncestorIter<'w> {
    world: &'w World,
    cursor: Option<Entity>,
}

impl<'w> Iterator for AncestorIter<'w> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let current = self.cursor?;
        self.cursor = transform_of(self.world, current).and_then(|t| t.parent);
        Some(current)
    }
}

pub fn ancestors(world: &World, entity: Entity) -> AncestorIter<'_> {
    AncestorIter {
        world,
        cursor: transform_of(world, entity).and_then(|t| t.parent),
    }
}

/// Walks `entity`'s direct children only, exclusive of `entity` itself.
pub struct ChildrenIter<'w> {
    world: &'w World,
    cursor: Option<Entity>,
}

impl<'w> Iterator for ChildrenIter<'w> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let current = self.cursor?;
        self.cursor = transform_of(self.world, current).and_then(|t| t.next_sibling);
        Some(current)
    }
}

pub fn children(world: &World, entity: Entity) -> ChildrenIter<'_> {
    ChildrenIter {
        world,
        cursor: transform_of(world, entity).and_then(|t| t.first_child),
    }
}

/// Pre-order walk of `entity`'s whole subtree, exclusive of `entity` itself.
///
/// `stack` holds siblings-to-visit-later below children-to-visit-next, so
/// popping always descends into a node's own children before moving on to
/// its sibling, matching depth-first recursion without actually recursing.
pub struct RecursiveChildrenIter<'w> {
    world: &'w World,
    stack: Vec<Entity>,
}

impl<'w> Iterator for RecursiveChildrenIter<'w> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let current = self.stack.pop()?;
        if let Some(t) = transform_of(self.world, current) {
            if let Some(sibling) = t.next_sibling {
                self.stack.push(sibling);
            }
            if let Some(child) = t.first_child {
                self.stack.push(child);
            }
        }
        Some(current)
    }
}

pub fn children_recursive(world: &World, entity: Entity) -> RecursiveChildrenIter<'_> {
    let mut stack = Vec::new();
    if let Some(first_child) = transform_of(world, entity).and_then(|t| t.first_child) {
        stack.push(first_child);
    }
    RecursiveChildrenIter { world, stack }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::append_child;
    use ecs::World;
    use std::sync::Once;

    fn ensure_log() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            log::Log::init();
        });
    }

    #[test]
    fn children_counts_direct_children_only() {
        ensure_log();
        let mut world = World::new();
        let e1 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));
        let e2 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));
        let e3 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));
        let e4 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));

        append_child(&mut world, e1, e2, false);
        append_child(&mut world, e1, e3, false);
        append_child(&mut world, e3, e4, false);

        assert_eq!(children(&world, e1).count(), 2);
        assert_eq!(children(&world, e3).count(), 1);
    }

    #[test]
    fn children_recursive_counts_the_whole_subtree() {
        ensure_log();
        let mut world = World::new();
        let e1 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));
        let e2 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));
        let e3 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));
        let e4 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));

        append_child(&mut world, e1, e2, false);
        append_child(&mut world, e1, e3, false);
        append_child(&mut world, e3, e4, false);

        assert_eq!(children_recursive(&world, e1).count(), 3);
        assert_eq!(children_recursive(&world, e3).count(), 1);
    }

    #[test]
    fn ancestors_walks_to_the_root_exclusive_of_self() {
        ensure_log();
        let mut world = World::new();
        let e1 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));
        let e2 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));
        let e3 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));

        append_child(&mut world, e1, e2, false);
        append_child(&mut world, e2, e3, false);

        let chain: Vec<_> = ancestors(&world, e3).collect();
        assert_eq!(chain, vec![e2, e1]);
        assert_eq!(ancestors(&world, e1).count(), 0);
    }
}
