use crate::entity::Entity;

/// The owner-entity slot every `Component` embeds. `World::add_component`
/// stamps this with the real entity right after construction and before
/// `initialize()` runs, so a component can always report who it belongs to
/// without the caller threading the entity through separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComponentBase {
    owner: Entity,
}

impl ComponentBase {
    pub fn owner(&self) -> Entity {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Entity) {
        self.owner = owner;
    }
}

/// Contract every component type must satisfy.
///
/// The `World` owns construction/destruction; a `Component` only describes
/// how it wants to be paged (`CHUNK_SIZE`), where it keeps its
/// [`ComponentBase`], and its post-construct/pre-destruct hooks. Defaults
/// suit plain data components with no special lifecycle needs.
pub trait Component: 'static + Send + Sync {
    /// Number of components of this type per pool page.
    const CHUNK_SIZE: usize = 1024;

    /// Diagnostic name, used in log output.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Access to the embedded [`ComponentBase`]. Implementors store one as
    /// a field and return it here; the `World` uses `base_mut()` to stamp
    /// the owner and reads `base()` to answer [`Component::owner`].
    fn base(&self) -> &ComponentBase;
    fn base_mut(&mut self) -> &mut ComponentBase;

    /// The entity this component is attached to.
    fn owner(&self) -> Entity {
        self.base().owner()
    }

    /// Post-construct hook. Returning `false` rolls the `add_component` back.
    fn initialize(&mut self) -> bool {
        true
    }

    /// Pre-destruct hook, run by the destructor path only.
    fn dispose(&mut self) {}
}
