use handle::Handle;

macro_rules! resource_handle {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub(crate) Handle);

        impl $name {
            pub fn is_null(&self) -> bool {
                self.0.is_null()
            }
        }
    };
}

resource_handle!(VertexBufferHandle);
resource_handle!(IndexBufferHandle);
resource_handle!(TextureHandle);
resource_handle!(ProgramHandle);
resource_handle!(RenderStateHandle);
