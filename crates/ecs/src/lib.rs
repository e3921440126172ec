mod mask;
pub use mask::{ComponentMask, MAX_COMPONENTS};

mod type_registry;
pub(crate) use type_registry::TypeRegistry;

mod entity;
pub use entity::Entity;

mod chunked_pool;
pub(crate) use chunked_pool::ChunkedPool;

mod component;
pub use component::{Component, ComponentBase};

mod events;
pub use events::Dispatcher;

mod world;
pub use world::{ComponentSet, World};

mod view;
pub use view::{View, ViewIter};
