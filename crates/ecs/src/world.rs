use std::any::Any;

use guard::guard;
use handle::HandlePool;

use crate::component::Component;
use crate::chunked_pool::ChunkedPool;
use crate::entity::Entity;
use crate::events::Dispatcher;
use crate::mask::ComponentMask;
use crate::type_registry::TypeRegistry;

/// Type-erased teardown for one registered component type.
///
/// The destructor path is the **only** place a component is torn down: it
/// downcasts the pool, removes the value, fires `ComponentRemoved` then
/// `EntityModified`, runs the user's `dispose()`, and finally drops it.
struct ComponentDescriptor {
    destroy: Box<dyn Fn(&mut Box<dyn Any + Send + Sync>, &Dispatcher, Entity) + Send + Sync>,
}

/// The entity/component store.
///
/// Single-writer: all structural mutation (`spawn`, `recycle`,
/// `add_component`, `remove_component`) is expected to happen from one
/// thread. Read-only access alongside it is a cooperative contract the
/// `World` does not enforce, so every method here takes `&mut self`.
pub struct World {
    handles: HandlePool,
    masks: Vec<ComponentMask>,
    type_registry: TypeRegistry,
    pools: Vec<Box<dyn Any + Send + Sync>>,
    descriptors: Vec<ComponentDescriptor>,
    dispatcher: Dispatcher,
}

impl Default for World {
    fn default() -> Self {
        Self {
            handles: HandlePool::default(),
            masks: Vec::new(),
            type_registry: TypeRegistry::default(),
            pools: Vec::new(),
            descriptors: Vec::new(),
            dispatcher: Dispatcher::default(),
        }
    }
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a handle, clears the entity's mask, and returns it.
    pub fn spawn(&mut self) -> Entity {
        let handle = self.handles.create();
        let entity = Entity::from_handle(handle);
        let idx = entity.index() as usize;
        if self.masks.len() <= idx {
            self.masks.resize(idx + 1, ComponentMask::empty());
        } else {
            self.masks[idx] = ComponentMask::empty();
        }
        entity
    }

    /// Spawns an entity and immediately attaches `value` to it.
    pub fn spawn_with<T: Component>(&mut self, value: T) -> Entity {
        let entity = self.spawn();
        self.add_component(entity, value);
        entity
    }

    /// Runs every set bit's destructor, then releases the handle.
    /// A no-op if `entity` is already dead.
    pub fn recycle(&mut self, entity: Entity) {
        if !self.alive(entity) {
            return;
        }

        let mask = self.masks[entity.index() as usize];
        for id in 0..self.descriptors.len() as u32 {
            if mask.bit(id) {
                self.destroy_component_by_id(id, entity);
            }
        }

        self.masks[entity.index() as usize] = ComponentMask::empty();
        self.handles.free(entity.handle());
    }

    pub fn alive(&self, entity: Entity) -> bool {
        self.handles.alive(entity.handle())
    }

    pub fn size(&self) -> usize {
        self.handles.size()
    }

    /// Iterates every currently-live entity, ascending by index.
    pub fn all_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        (0..self.masks.len() as u32).filter_map(move |index| {
            let handle = self.handles.handle_at(index)?;
            Some(Entity::from_handle(handle))
        })
    }

    /// Tears down all entities, then all registered pools in reverse
    /// registration order, leaving the `World` as if freshly constructed.
    pub fn dispose(&mut self) {
        let live: Vec<Entity> = self.all_entities().collect();
        for entity in live {
            self.recycle(entity);
        }

        while self.pools.pop().is_some() {
            self.descriptors.pop();
        }

        self.type_registry = TypeRegistry::default();
        self.handles.clear();
        self.masks.clear();
        self.dispatcher = Dispatcher::default();
    }

    /// Installs `(type_id, chunk_size, destructor)` for `T` exactly once.
    /// Re-registration is a no-op returning `true`. Fails if the id would
    /// exceed `MAX_COMPONENTS`.
    pub fn register_component<T: Component>(&mut self) -> bool {
        if self.type_registry.id_of::<T>().is_some() {
            return true;
        }

        let id = match self.type_registry.register::<T>() {
            Some(id) => id,
            None => {
                log::error(&format!(
                    "cannot register component {}: MAX_COMPONENTS exceeded",
                    T::name()
                ));
                return false;
            }
        };
        debug_assert_eq!(id as usize, self.pools.len());

        self.pools.push(Box::new(ChunkedPool::<T>::new(T::CHUNK_SIZE)));
        self.descriptors.push(ComponentDescriptor {
            destroy: Box::new(|pool_any, dispatcher, entity| {
                if let Some(pool) = pool_any.downcast_mut::<ChunkedPool<T>>() {
                    if let Some(mut component) = pool.remove(entity) {
                        dispatcher.emit_component_removed(entity, &component);
                        dispatcher.emit_entity_modified(entity);
                        component.dispose();
                    }
                }
            }),
        });
        true
    }

    /// Requires `alive(e)` and `!has_component::<T>(e)`. Placement-constructs
    /// `T`, emits `ComponentAdded` then `EntityModified`, then calls
    /// `initialize()`. If `initialize()` returns false the destructor path
    /// runs immediately and `None` is returned.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Option<&mut T> {
        if !self.alive(entity) {
            log::warning(&format!(
                "add_component<{}>: entity {:?} is not alive",
                T::name(),
                entity
            ));
            return None;
        }

        if self.type_registry.id_of::<T>().is_none() && !self.register_component::<T>() {
            return None;
        }
        let id = self.type_registry.id_of::<T>().unwrap();

        if self.masks[entity.index() as usize].bit(id) {
            log::warning(&format!(
                "add_component<{}>: entity {:?} already carries this component",
                T::name(),
                entity
            ));
            return None;
        }

        let pool = self.pools[id as usize]
            .downcast_mut::<ChunkedPool<T>>()
            .unwrap();
        pool.insert(entity, value);
        self.masks[entity.index() as usize].set(id);

        pool.get_mut(entity).unwrap().base_mut().set_owner(entity);

        {
            let pool = self.pools[id as usize]
                .downcast_ref::<ChunkedPool<T>>()
                .unwrap();
            let component = pool.get(entity).unwrap();
            self.dispatcher.emit_component_added(entity, component);
        }
        self.dispatcher.emit_entity_modified(entity);

        let initialized = {
            let pool = self.pools[id as usize]
                .downcast_mut::<ChunkedPool<T>>()
                .unwrap();
            pool.get_mut(entity).unwrap().initialize()
        };

        if !initialized {
            self.destroy_component_by_id(id, entity);
            return None;
        }

        self.pools[id as usize]
            .downcast_mut::<ChunkedPool<T>>()
            .unwrap()
            .get_mut(entity)
    }

    pub fn get_component<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        guard!(let Some(id) = self.type_registry.id_of::<T>() else { return None; });
        self.pools[id as usize]
            .downcast_mut::<ChunkedPool<T>>()
            .unwrap()
            .get_mut(entity)
    }

    /// Reads multiple component types at once without the aliasing issues
    /// a `get_component::<T>` per field would hit across a shared `&self`.
    pub fn get_components<T: ComponentSet>(&self, entity: Entity) -> T::Refs<'_> {
        T::get(self, entity)
    }

    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        match self.type_registry.id_of::<T>() {
            Some(id) => self
                .masks
                .get(entity.index() as usize)
                .map_or(false, |mask| mask.bit(id)),
            None => false,
        }
    }

    pub fn remove_component<T: Component>(&mut self, entity: Entity) {
        if let Some(id) = self.type_registry.id_of::<T>() {
            if self.masks[entity.index() as usize].bit(id) {
                self.destroy_component_by_id(id, entity);
            }
        }
    }

    pub fn components_mask(&self, entity: Entity) -> ComponentMask {
        self.masks
            .get(entity.index() as usize)
            .copied()
            .unwrap_or_else(ComponentMask::empty)
    }

    pub(crate) fn type_id_of<T: Component>(&self) -> Option<u32> {
        self.type_registry.id_of::<T>()
    }

    pub(crate) fn pool_of<T: Component>(&self) -> Option<&ChunkedPool<T>> {
        guard!(let Some(id) = self.type_registry.id_of::<T>() else { return None; });
        self.pools[id as usize].downcast_ref::<ChunkedPool<T>>()
    }

    /// Returns a `View` over every entity whose mask contains every
    /// component in `T`. Iteration is forward-only, ascending by entity
    /// index, and restartable.
    pub fn find_entities_with<T: ComponentSet>(&self) -> crate::view::View<'_, T> {
        crate::view::View::new(self)
    }

    /// One past the highest entity index this `World` has ever allocated.
    pub(crate) fn entity_capacity(&self) -> u32 {
        self.masks.len() as u32
    }

    pub(crate) fn handle_at(&self, index: u32) -> Option<handle::Handle> {
        self.handles.handle_at(index)
    }

    fn destroy_component_by_id(&mut self, id: u32, entity: Entity) {
        let World {
            pools,
            descriptors,
            dispatcher,
            masks,
            ..
        } = self;
        (descriptors[id as usize].destroy)(&mut pools[id as usize], dispatcher, entity);
        masks[entity.index() as usize].clear(id);
    }
}

/// A tuple of `Component` types that can be fetched together from a `World`.
/// Implemented for tuples of arity 1..=8 via the macro below.
pub trait ComponentSet {
    type Refs<'a>;

    fn mask(world: &World) -> ComponentMask;
    fn get(world: &World, entity: Entity) -> Self::Refs<'_>;
}

macro_rules! impl_component_set {
    ($($t:ident),+) => {
        impl<$($t: Component),+> ComponentSet for ($($t,)+) {
            type Refs<'a> = ($(Option<&'a $t>,)+);

            fn mask(world: &World) -> ComponentMask {
                let mut mask = ComponentMask::empty();
                $(
                    if let Some(id) = world.type_id_of::<$t>() {
                        mask.set(id);
                    }
                )+
                mask
            }

            fn get(world: &World, entity: Entity) -> Self::Refs<'_> {
                (
                    $(
                        world.pool_of::<$t>().and_then(|pool| pool.get(entity)),
                    )+
                )
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

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

    #[derive(Debug)]
    struct Position(f32, f32, ComponentBase);
    impl Position {
        fn new(x: f32, y: f32) -> Self {
            Self(x, y, ComponentBase::default())
        }
    }
    // Equality only cares about the data fields; the owner slot is stamped
    // by the `World` after construction, so a freshly built literal never
    // carries the same owner as a fetched, already-attached component.
    impl PartialEq for Position {
        fn eq(&self, other: &Self) -> bool {
            self.0 == other.0 && self.1 == other.1
        }
    }
    impl Component for Position {
        fn base(&self) -> &ComponentBase {
            &self.2
        }
        fn base_mut(&mut self) -> &mut ComponentBase {
            &mut self.2
        }
    }

    #[derive(Debug, Default)]
    struct Widget(ComponentBase);
    impl PartialEq for Widget {
        fn eq(&self, _other: &Self) -> bool {
            true
        }
    }
    impl Component for Widget {
        fn base(&self) -> &ComponentBase {
            &self.0
        }
        fn base_mut(&mut self) -> &mut ComponentBase {
            &mut self.0
        }
    }

    #[derive(Default)]
    struct Gate {
        allow_init: bool,
        base: ComponentBase,
    }
    impl Component for Gate {
        fn base(&self) -> &ComponentBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut ComponentBase {
            &mut self.base
        }
        fn initialize(&mut self) -> bool {
            self.allow_init
        }
    }

    #[test]
    fn entity_lifecycle_recycles_index_and_bumps_generation() {
        ensure_log();
        let mut world = World::new();
        let e = world.spawn();
        assert!(world.alive(e));
        world.recycle(e);
        assert!(!world.alive(e));

        let e2 = world.spawn();
        assert_eq!(e2.index(), e.index());
        assert_eq!(e2.generation(), e.generation() + 1);
    }

    #[test]
    fn double_recycle_is_a_no_op() {
        ensure_log();
        let mut world = World::new();
        let e = world.spawn();
        world.recycle(e);
        world.recycle(e);
        assert!(!world.alive(e));
    }

    #[test]
    fn add_get_has_remove_component() {
        ensure_log();
        let mut world = World::new();
        let e = world.spawn();

        assert!(!world.has_component::<Position>(e));
        world.add_component(e, Position::new(1.0, 2.0));
        assert!(world.has_component::<Position>(e));
        assert_eq!(world.get_component::<Position>(e), Some(&mut Position::new(1.0, 2.0)));

        world.remove_component::<Position>(e);
        assert!(!world.has_component::<Position>(e));
        assert_eq!(world.get_component::<Position>(e), None);
    }

    #[test]
    fn recycle_clears_every_component_and_nulls_lookups() {
        ensure_log();
        let mut world = World::new();
        let e = world.spawn();
        world.add_component(e, Position::new(0.0, 0.0));
        world.add_component(e, Widget::default());

        world.recycle(e);
        assert!(!world.alive(e));
        assert_eq!(world.get_component::<Position>(e), None);
        assert_eq!(world.get_component::<Widget>(e), None);
    }

    #[test]
    fn adding_duplicate_component_is_rejected() {
        ensure_log();
        let mut world = World::new();
        let e = world.spawn();
        world.add_component(e, Position::new(1.0, 1.0));
        assert!(world.add_component(e, Position::new(2.0, 2.0)).is_none());
        assert_eq!(world.get_component::<Position>(e), Some(&mut Position::new(1.0, 1.0)));
    }

    #[test]
    fn failed_initialize_rolls_back_the_add() {
        ensure_log();
        let mut world = World::new();
        let e = world.spawn();
        assert!(world
            .add_component(
                e,
                Gate {
                    allow_init: false,
                    ..Gate::default()
                }
            )
            .is_none());
        assert!(!world.has_component::<Gate>(e));
    }

    #[test]
    fn components_mask_reflects_current_attachments() {
        ensure_log();
        let mut world = World::new();
        let e = world.spawn();
        world.add_component(e, Position::new(0.0, 0.0));

        let mask = world.components_mask(e);
        let position_id = world.type_id_of::<Position>().unwrap();
        assert!(mask.bit(position_id));
    }

    #[test]
    fn get_components_reads_a_tuple_without_aliasing() {
        ensure_log();
        let mut world = World::new();
        let e = world.spawn();
        world.add_component(e, Position::new(3.0, 4.0));
        world.add_component(e, Widget::default());

        let (position, widget) = world.get_components::<(Position, Widget)>(e);
        assert_eq!(position, Some(&Position::new(3.0, 4.0)));
        assert_eq!(widget, Some(&Widget::default()));
    }

    #[test]
    fn a_component_reports_its_owning_entity() {
        ensure_log();
        let mut world = World::new();
        let e = world.spawn();
        world.add_component(e, Position::new(1.0, 2.0));

        assert_eq!(world.get_component::<Position>(e).unwrap().owner(), e);
    }

    #[test]
    fn dispose_yields_an_empty_world_with_no_dangling_type_ids() {
        ensure_log();
        let mut world = World::new();
        let e1 = world.spawn();
        world.add_component(e1, Position::new(1.0, 1.0));
        world.spawn();

        world.dispose();
        assert_eq!(world.size(), 0);
        assert!(world.all_entities().next().is_none());

        // Re-registering after dispose must start from a clean id space.
        assert!(world.register_component::<Position>());
        assert_eq!(world.type_id_of::<Position>(), Some(0));
    }
}
