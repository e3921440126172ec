use ecs::{Component, ComponentBase, Entity, World};

use crate::trs::{compose, decompose_local, Trs};

/// Which pose a position/scale/rotation accessor reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSpace {
    Local,
    World,
}

/// Augments an entity with a place in the scene hierarchy plus a cached
/// local/world pose.
///
/// The hierarchy is a classic first-child/next-sibling tree: each node holds
/// its parent, its first child, and the next of its parent's children — no
/// `prev_sibling`, so unlinking a node walks its parent's child list.
/// `world` is a cache kept consistent by `append_child`/`remove_from_parent`/
/// the position/scale setters below; nothing recomputes it lazily.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub(crate) parent: Option<Entity>,
    pub(crate) first_child: Option<Entity>,
    pub(crate) next_sibling: Option<Entity>,
    pub(crate) local: Trs,
    pub(crate) world: Trs,
    base: ComponentBase,
}

impl Transform {
    pub fn new(position: (f32, f32, f32)) -> Self {
        Self::with_trs(Trs::from_position(position))
    }

    pub fn with_trs(local: Trs) -> Self {
        Self {
            parent: None,
            first_child: None,
            next_sibling: None,
            world: local,
            local,
            base: ComponentBase::default(),
        }
    }
}

impl Component for Transform {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    /// A freshly added `Transform` has no parent yet, so its world pose
    /// starts out equal to its local pose.
    fn initialize(&mut self) -> bool {
        self.world = self.local;
        true
    }
}

fn transform_of(world: &World, entity: Entity) -> Option<&Transform> {
    let (transform,) = world.get_components::<(Transform,)>(entity);
    transform
}

pub fn is_root(world: &World, entity: Entity) -> bool {
    transform_of(world, entity).map_or(true, |t| t.parent.is_none())
}

pub fn is_leaf(world: &World, entity: Entity) -> bool {
    transform_of(world, entity).map_or(true, |t| t.first_child.is_none())
}

pub fn parent(world: &World, entity: Entity) -> Option<Entity> {
    transform_of(world, entity).and_then(|t| t.parent)
}

/// Links `child` as the first child of `parent`, detaching it from any
/// previous parent first. If `keep_world_pose` is true, `child`'s local pose
/// is recomputed so its cached world pose is unchanged by the reparent;
/// otherwise its local pose is left as-is, which moves it in world space.
///
/// A no-op (with a logged warning) if `parent == child` or if `parent` is
/// already a descendant of `child`, either of which would introduce a cycle.
pub fn append_child(world: &mut World, parent: Entity, child: Entity, keep_world_pose: bool) {
    if parent == child {
        log::warning("append_child: an entity cannot be its own parent");
        return;
    }
    if crate::iter::ancestors(world, parent).any(|ancestor| ancestor == child) {
        log::warning("append_child: refusing to introduce a cycle");
        return;
    }

    remove_from_parent(world, child);

    let child_world_before = transform_of(world, child).map(|t| t.world);
    let parent_world = transform_of(world, parent).map(|t| t.world).unwrap_or_default();
    let sibling = transform_of(world, parent).and_then(|t| t.first_child);

    if let Some(t) = world.get_component::<Transform>(child) {
        if keep_world_pose {
            if let Some(child_world) = child_world_before {
                t.local = decompose_local(&parent_world, &child_world);
            }
        }
        t.parent = Some(parent);
        t.next_sibling = sibling;
    }
    if let Some(t) = world.get_component::<Transform>(parent) {
        t.first_child = Some(child);
    }

    recompute_world_recursive(world, child);
}

/// Unlinks `entity` from its parent's child list. A no-op if it is already a
/// root. Descendants keep their relative structure; only their cached world
/// poses are recomputed, since `entity` itself now composes against nothing.
pub fn remove_from_parent(world: &mut World, entity: Entity) {
    let parent = match transform_of(world, entity).and_then(|t| t.parent) {
        Some(parent) => parent,
        None => return,
    };

    let mut cursor = transform_of(world, parent).and_then(|t| t.first_child);
    let mut previous: Option<Entity> = None;
    while let Some(node) = cursor {
        let next = transform_of(world, node).and_then(|t| t.next_sibling);
        if node == entity {
            match previous {
                Some(previous) => {
                    if let Some(t) = world.get_component::<Transform>(previous) {
                        t.next_sibling = next;
                    }
                }
                None => {
                    if let Some(t) = world.get_component::<Transform>(parent) {
                        t.first_child = next;
                    }
                }
            }
            break;
        }
        previous = Some(node);
        cursor = next;
    }

    if let Some(t) = world.get_component::<Transform>(entity) {
        t.parent = None;
        t.next_sibling = None;
    }

    recompute_world_recursive(world, entity);
}

fn recompute_world_recursive(world: &mut World, entity: Entity) {
    let parent = transform_of(world, entity).and_then(|t| t.parent);
    let local = match transform_of(world, entity) {
        Some(t) => t.local,
        None => return,
    };
    let parent_world = parent
        .and_then(|p| transform_of(world, p))
        .map(|t| t.world)
        .unwrap_or_default();
    let new_world = compose(&parent_world, &local);

    if let Some(t) = world.get_component::<Transform>(entity) {
        t.world = new_world;
    }

    let children: Vec<Entity> = crate::iter::children(world, entity).collect();
    for child in children {
        recompute_world_recursive(world, child);
    }
}

pub fn position(world: &World, entity: Entity, space: TransformSpace) -> Option<(f32, f32, f32)> {
    transform_of(world, entity).map(|t| match space {
        TransformSpace::Local => t.local.position,
        TransformSpace::World => t.world.position,
    })
}

pub fn set_position(world: &mut World, entity: Entity, position: (f32, f32, f32), space: TransformSpace) {
    let local_position = match space {
        TransformSpace::Local => position,
        TransformSpace::World => {
            let parent_world_position = parent(world, entity)
                .and_then(|p| transform_of(world, p))
                .map(|t| t.world.position)
                .unwrap_or((0.0, 0.0, 0.0));
            (
                position.0 - parent_world_position.0,
                position.1 - parent_world_position.1,
                position.2 - parent_world_position.2,
            )
        }
    };
    if let Some(t) = world.get_component::<Transform>(entity) {
        t.local.position = local_position;
    }
    recompute_world_recursive(world, entity);
}

pub fn scale(world: &World, entity: Entity, space: TransformSpace) -> Option<(f32, f32, f32)> {
    transform_of(world, entity).map(|t| match space {
        TransformSpace::Local => t.local.scale,
        TransformSpace::World => t.world.scale,
    })
}

pub fn set_scale(world: &mut World, entity: Entity, scale: (f32, f32, f32), space: TransformSpace) {
    let local_scale = match space {
        TransformSpace::Local => scale,
        TransformSpace::World => {
            let parent_world_scale = parent(world, entity)
                .and_then(|p| transform_of(world, p))
                .map(|t| t.world.scale)
                .unwrap_or((1.0, 1.0, 1.0));
            (
                divide_or_one(scale.0, parent_world_scale.0),
                divide_or_one(scale.1, parent_world_scale.1),
                divide_or_one(scale.2, parent_world_scale.2),
            )
        }
    };
    if let Some(t) = world.get_component::<Transform>(entity) {
        t.local.scale = local_scale;
    }
    recompute_world_recursive(world, entity);
}

fn divide_or_one(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        0.0
    } else {
        a / b
    }
}

/// Rotation is stored opaquely (see [`Trs`]): world rotation is always a copy
/// of local rotation, so both spaces read and write the same field.
pub fn rotation(world: &World, entity: Entity, _space: TransformSpace) -> Option<(f32, f32, f32)> {
    transform_of(world, entity).map(|t| t.local.rotation)
}

pub fn set_rotation(world: &mut World, entity: Entity, rotation: (f32, f32, f32), _space: TransformSpace) {
    if let Some(t) = world.get_component::<Transform>(entity) {
        t.local.rotation = rotation;
    }
    recompute_world_recursive(world, entity);
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

    #[test]
    fn append_child_without_keep_world_pose_offsets_by_parent_world_position() {
        ensure_log();
        let mut world = World::new();
        let e1 = world.spawn_with(Transform::new((10.0, 10.0, 0.0)));
        let e2 = world.spawn_with(Transform::new((20.0, 20.0, 0.0)));

        append_child(&mut world, e1, e2, false);

        assert_eq!(position(&world, e2, TransformSpace::Local), Some((20.0, 20.0, 0.0)));
        assert_eq!(position(&world, e2, TransformSpace::World), Some((30.0, 30.0, 0.0)));
        assert_eq!(parent(&world, e2), Some(e1));
    }

    #[test]
    fn append_child_with_keep_world_pose_preserves_world_position() {
        ensure_log();
        let mut world = World::new();
        let e1 = world.spawn_with(Transform::new((10.0, 10.0, 0.0)));
        let e3 = world.spawn_with(Transform::with_trs(Trs::new(
            (40.0, 40.0, 0.0),
            (2.0, 2.0, 1.0),
            (0.0, 0.0, 0.0),
        )));

        append_child(&mut world, e1, e3, true);

        assert_eq!(position(&world, e3, TransformSpace::Local), Some((30.0, 30.0, 0.0)));
        assert_eq!(position(&world, e3, TransformSpace::World), Some((40.0, 40.0, 0.0)));
    }

    #[test]
    fn nested_hierarchy_composes_scale_multiplicatively() {
        ensure_log();
        let mut world = World::new();
        let e1 = world.spawn_with(Transform::new((10.0, 10.0, 0.0)));
        let e3 = world.spawn_with(Transform::with_trs(Trs::new(
            (40.0, 40.0, 0.0),
            (2.0, 2.0, 1.0),
            (0.0, 0.0, 0.0),
        )));
        let e4 = world.spawn_with(Transform::with_trs(Trs::new(
            (-50.0, -10.0, 0.0),
            (3.0, 3.0, 1.0),
            (0.0, 0.0, 0.0),
        )));

        append_child(&mut world, e1, e3, true);
        append_child(&mut world, e3, e4, false);

        assert_eq!(
            position(&world, e4, TransformSpace::World),
            Some((-10.0, 30.0, 0.0))
        );
        assert_eq!(scale(&world, e4, TransformSpace::World), Some((6.0, 6.0, 1.0)));
    }

    #[test]
    fn remove_from_parent_detaches_and_world_becomes_local() {
        ensure_log();
        let mut world = World::new();
        let e1 = world.spawn_with(Transform::new((10.0, 10.0, 0.0)));
        let e2 = world.spawn_with(Transform::new((20.0, 20.0, 0.0)));
        append_child(&mut world, e1, e2, false);

        remove_from_parent(&mut world, e2);

        assert!(is_root(&world, e2));
        assert_eq!(
            position(&world, e2, TransformSpace::World),
            position(&world, e2, TransformSpace::Local)
        );
    }

    #[test]
    fn append_child_rejects_cycles() {
        ensure_log();
        let mut world = World::new();
        let e1 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));
        let e2 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));
        append_child(&mut world, e1, e2, false);

        append_child(&mut world, e2, e1, false);

        assert_eq!(parent(&world, e1), None);
        assert_eq!(parent(&world, e2), Some(e1));
    }

    #[test]
    fn root_and_leaf_reflect_hierarchy_position() {
        ensure_log();
        let mut world = World::new();
        let e1 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));
        let e2 = world.spawn_with(Transform::new((0.0, 0.0, 0.0)));

        assert!(is_root(&world, e1));
        assert!(is_leaf(&world, e1));

        append_child(&mut world, e1, e2, false);

        assert!(is_root(&world, e1));
        assert!(!is_leaf(&world, e1));
        assert!(!is_root(&world, e2));
        assert!(is_leaf(&world, e2));
    }
}
