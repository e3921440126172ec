mod resource;
pub use resource::HandleSet;

mod descriptor;
pub use descriptor::{
    IndexBufferDescriptor, ProgramDescriptor, RenderStateDescriptor, TextureDescriptor, VertexBufferDescriptor,
};

mod handles;
pub use handles::{IndexBufferHandle, ProgramHandle, RenderStateHandle, TextureHandle, VertexBufferHandle};

mod uniform;
pub use uniform::{UniformBuffer, UniformBufferView, UniformValue, MAX_UNIFORMS};

mod sort_key;
pub use sort_key::SortKey;

mod frame;
pub use frame::{ClearParams, Command, DrawCall, RenderFrame, TextureSlot};

mod backend;
pub use backend::Backend;

mod frontend;
pub use frontend::{Frontend, FrontendConfig, DEFAULT_RESOURCE_CAPACITY};
