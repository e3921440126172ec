use std::any::{Any, TypeId};

use fxhash::FxHashMap;

use crate::entity::Entity;

type Listener<F> = (u64, Box<F>);

/// Delivers the three event kinds the `World` emits, synchronously and in
/// subscription order within one event type.
///
/// Owned per-`World`, matching `TypeRegistry`'s reasoning: it must be able
/// to start empty again after `dispose()`.
#[derive(Default)]
pub struct Dispatcher {
    entity_modified: Vec<Listener<dyn Fn(Entity) + Send + Sync>>,
    component_added: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
    component_removed: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

type TypedListeners<T> = Vec<Listener<dyn Fn(Entity, &T) + Send + Sync>>;

impl Dispatcher {
    pub fn subscribe_entity_modified(
        &mut self,
        subscriber: u64,
        listener: impl Fn(Entity) + Send + Sync + 'static,
    ) {
        self.entity_modified.push((subscriber, Box::new(listener)));
    }

    pub fn unsubscribe_entity_modified(&mut self, subscriber: u64) {
        self.entity_modified.retain(|(id, _)| *id != subscriber);
    }

    pub fn subscribe_component_added<T: 'static>(
        &mut self,
        subscriber: u64,
        listener: impl Fn(Entity, &T) + Send + Sync + 'static,
    ) {
        Self::subscribe_typed(&mut self.component_added, subscriber, listener);
    }

    pub fn unsubscribe_component_added<T: 'static>(&mut self, subscriber: u64) {
        Self::unsubscribe_typed::<T>(&mut self.component_added, subscriber);
    }

    pub fn subscribe_component_removed<T: 'static>(
        &mut self,
        subscriber: u64,
        listener: impl Fn(Entity, &T) + Send + Sync + 'static,
    ) {
        Self::subscribe_typed(&mut self.component_removed, subscriber, listener);
    }

    pub fn unsubscribe_component_removed<T: 'static>(&mut self, subscriber: u64) {
        Self::unsubscribe_typed::<T>(&mut self.component_removed, subscriber);
    }

    fn subscribe_typed<T: 'static>(
        table: &mut FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
        subscriber: u64,
        listener: impl Fn(Entity, &T) + Send + Sync + 'static,
    ) {
        let entry = table
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(TypedListeners::<T>::new()));
        let listeners = entry.downcast_mut::<TypedListeners<T>>().unwrap();
        listeners.push((subscriber, Box::new(listener)));
    }

    fn unsubscribe_typed<T: 'static>(
        table: &mut FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
        subscriber: u64,
    ) {
        if let Some(entry) = table.get_mut(&TypeId::of::<T>()) {
            if let Some(listeners) = entry.downcast_mut::<TypedListeners<T>>() {
                listeners.retain(|(id, _)| *id != subscriber);
            }
        }
    }

    pub(crate) fn emit_entity_modified(&self, entity: Entity) {
        for (_, listener) in &self.entity_modified {
            listener(entity);
        }
    }

    pub(crate) fn emit_component_added<T: 'static>(&self, entity: Entity, component: &T) {
        if let Some(entry) = self.component_added.get(&TypeId::of::<T>()) {
            if let Some(listeners) = entry.downcast_ref::<TypedListeners<T>>() {
                for (_, listener) in listeners {
                    listener(entity, component);
                }
            }
        }
    }

    pub(crate) fn emit_component_removed<T: 'static>(&self, entity: Entity, component: &T) {
        if let Some(entry) = self.component_removed.get(&TypeId::of::<T>()) {
            if let Some(listeners) = entry.downcast_ref::<TypedListeners<T>>() {
                for (_, listener) in listeners {
                    listener(entity, component);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handle::Handle;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn entity(index: u32) -> Entity {
        Entity::from_handle(Handle::from_bits(((index as u64) << 32) | 1))
    }

    struct Health(u32);

    #[test]
    fn delivers_in_subscription_order() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::default();

        let log_a = log.clone();
        dispatcher.subscribe_entity_modified(1, move |_| log_a.lock().unwrap().push('a'));
        let log_b = log.clone();
        dispatcher.subscribe_entity_modified(2, move |_| log_b.lock().unwrap().push('b'));

        dispatcher.emit_entity_modified(entity(0));
        assert_eq!(*log.lock().unwrap(), vec!['a', 'b']);
    }

    #[test]
    fn component_added_is_typed() {
        let seen = Arc::new(AtomicU32::new(0));
        let mut dispatcher = Dispatcher::default();

        let seen2 = seen.clone();
        dispatcher.subscribe_component_added::<Health>(1, move |_, health: &Health| {
            seen2.store(health.0, Ordering::SeqCst);
        });

        dispatcher.emit_component_added(entity(0), &Health(42));
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Arc::new(AtomicU32::new(0));
        let mut dispatcher = Dispatcher::default();

        let count2 = count.clone();
        dispatcher.subscribe_entity_modified(7, move |_| {
            count2.fetch_add(1, Ordering::SeqCst);
        });
        dispatcher.emit_entity_modified(entity(0));
        dispatcher.unsubscribe_entity_modified(7);
        dispatcher.emit_entity_modified(entity(0));

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
