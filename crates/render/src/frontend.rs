use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::backend::Backend;
use crate::descriptor::{
    IndexBufferDescriptor, ProgramDescriptor, RenderStateDescriptor, TextureDescriptor, VertexBufferDescriptor,
};
use crate::frame::{ClearParams, Command, DrawCall, RenderFrame, TextureSlot};
use crate::handles::{IndexBufferHandle, ProgramHandle, RenderStateHandle, TextureHandle, VertexBufferHandle};
use crate::resource::HandleSet;

/// Default per-kind capacity, unless overridden via [`FrontendConfig`].
pub const DEFAULT_RESOURCE_CAPACITY: usize = 4096;

#[derive(Debug, Clone, Copy)]
pub struct FrontendConfig {
    pub vertex_buffer_capacity: usize,
    pub index_buffer_capacity: usize,
    pub texture_capacity: usize,
    pub program_capacity: usize,
    pub render_state_capacity: usize,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            vertex_buffer_capacity: DEFAULT_RESOURCE_CAPACITY,
            index_buffer_capacity: DEFAULT_RESOURCE_CAPACITY,
            texture_capacity: DEFAULT_RESOURCE_CAPACITY,
            program_capacity: DEFAULT_RESOURCE_CAPACITY,
            render_state_capacity: DEFAULT_RESOURCE_CAPACITY,
        }
    }
}

/// The double-buffered producer/consumer frame protocol plus the five
/// typed resource sets it stages commands for.
///
/// `frames[submit]` is the producer's frame; `frames[1 - submit]` is the
/// frame a backend-owning thread drains via [`Frontend::drain`]. `begin_frame`
/// refuses to start a new producer frame until the previous `draw` slot has
/// been fully drained, matching the "draw slot owned exclusively by the
/// backend thread" contract.
pub struct Frontend {
    vertex_buffers: HandleSet<VertexBufferDescriptor>,
    index_buffers: HandleSet<IndexBufferDescriptor>,
    textures: HandleSet<TextureDescriptor>,
    programs: HandleSet<ProgramDescriptor>,
    render_states: HandleSet<RenderStateDescriptor>,

    frames: [RenderFrame; 2],
    submit: AtomicUsize,
    draw_consumed: AtomicBool,
    sequence: AtomicU32,
    pending_clear: Mutex<ClearParams>,
}

impl Frontend {
    pub fn new(config: FrontendConfig) -> Self {
        Self {
            vertex_buffers: HandleSet::new(config.vertex_buffer_capacity),
            index_buffers: HandleSet::new(config.index_buffer_capacity),
            textures: HandleSet::new(config.texture_capacity),
            programs: HandleSet::new(config.program_capacity),
            render_states: HandleSet::new(config.render_state_capacity),
            frames: [RenderFrame::default(), RenderFrame::default()],
            submit: AtomicUsize::new(0),
            draw_consumed: AtomicBool::new(true),
            sequence: AtomicU32::new(0),
            pending_clear: Mutex::new(ClearParams::default()),
        }
    }

    /// Parameters for the implicit clear `begin_frame` records at the head
    /// of the next frame.
    pub fn set_clear(&self, clear: ClearParams) {
        *self.pending_clear.lock() = clear;
    }

    fn submit_frame(&self) -> &RenderFrame {
        &self.frames[self.submit.load(Ordering::Acquire)]
    }

    fn draw_frame(&self) -> &RenderFrame {
        &self.frames[1 - self.submit.load(Ordering::Acquire)]
    }

    /// Returns `false` if the previous `draw` frame hasn't been drained yet.
    /// On success, resets the new submit frame and records the implicit
    /// clear command at its head.
    pub fn begin_frame(&self) -> bool {
        if !self.draw_consumed.load(Ordering::Acquire) {
            return false;
        }
        self.sequence.store(0, Ordering::Release);
        let frame = self.submit_frame();
        frame.reset();
        frame.record_command(Command::Clear(*self.pending_clear.lock()));
        true
    }

    /// Forces a synchronous drain of the current submit frame in place,
    /// without swapping slots. Used for teardown or fence-like waits when
    /// no backend thread is pumping `drain`.
    pub fn flush(&self, backend: &mut dyn Backend) {
        let frame = self.submit_frame();
        frame.sort_drawcalls();
        frame.drain_into(backend);
    }

    /// Closes the submit frame: sorts its drawcalls, then swaps `submit`
    /// and `draw`. The backend-owning thread observes the now-`draw` slot
    /// via [`Frontend::drain`].
    pub fn end_frame(&self) {
        let frame = self.submit_frame();
        frame.sort_drawcalls();
        self.submit.fetch_xor(1, Ordering::AcqRel);
        self.draw_consumed.store(false, Ordering::Release);
    }

    /// Called by the thread that owns the backend: processes the current
    /// `draw` slot's commands and sorted drawcalls, then marks it consumed
    /// so the next `begin_frame` may proceed.
    pub fn drain(&self, backend: &mut dyn Backend) {
        let frame = self.draw_frame();
        frame.drain_into(backend);
        self.draw_consumed.store(true, Ordering::Release);
    }

    /// A monotonically increasing counter, reset at each `begin_frame`,
    /// for producers to use as `SortKey`'s sequence tiebreaker.
    pub fn next_sequence(&self) -> u32 {
        self.sequence.fetch_add(1, Ordering::AcqRel)
    }

    pub fn submit_drawcall(&self, drawcall: DrawCall) {
        if !self.vertex_buffers.alive(drawcall.vertex_buffer.0) || !self.programs.alive(drawcall.program.0) {
            log::warning("submit_drawcall: dropped a drawcall against a dead resource handle");
            return;
        }
        self.submit_frame().submit_drawcall(drawcall);
    }

    pub fn uniform_arena(&self) -> &crate::uniform::UniformBuffer {
        self.submit_frame().uniform_arena()
    }

    pub fn bind_texture(&self, slot: u8, texture: TextureHandle) {
        self.submit_frame()
            .texture_slots
            .lock()
            .push(TextureSlot { slot, texture });
    }

    pub fn create_vertex_buffer(&self, descriptor: VertexBufferDescriptor) -> VertexBufferHandle {
        let handle = VertexBufferHandle(self.vertex_buffers.create(descriptor));
        if !handle.is_null() {
            self.submit_frame().record_command(Command::CreateVertexBuffer(handle));
        }
        handle
    }

    pub fn update_vertex_buffer(&self, handle: VertexBufferHandle, descriptor: VertexBufferDescriptor) {
        if self.vertex_buffers.update(handle.0, descriptor) {
            self.submit_frame().record_command(Command::UpdateVertexBuffer(handle));
        }
    }

    pub fn free_vertex_buffer(&self, handle: VertexBufferHandle) {
        self.vertex_buffers.free(handle.0);
        self.submit_frame().record_command(Command::FreeVertexBuffer(handle));
    }

    pub fn create_index_buffer(&self, descriptor: IndexBufferDescriptor) -> IndexBufferHandle {
        let handle = IndexBufferHandle(self.index_buffers.create(descriptor));
        if !handle.is_null() {
            self.submit_frame().record_command(Command::CreateIndexBuffer(handle));
        }
        handle
    }

    pub fn update_index_buffer(&self, handle: IndexBufferHandle, descriptor: IndexBufferDescriptor) {
        if self.index_buffers.update(handle.0, descriptor) {
            self.submit_frame().record_command(Command::UpdateIndexBuffer(handle));
        }
    }

    pub fn free_index_buffer(&self, handle: IndexBufferHandle) {
        self.index_buffers.free(handle.0);
        self.submit_frame().record_command(Command::FreeIndexBuffer(handle));
    }

    pub fn create_texture(&self, descriptor: TextureDescriptor) -> TextureHandle {
        let handle = TextureHandle(self.textures.create(descriptor));
        if !handle.is_null() {
            self.submit_frame().record_command(Command::CreateTexture(handle));
        }
        handle
    }

    pub fn update_texture(&self, handle: TextureHandle, descriptor: TextureDescriptor) {
        if self.textures.update(handle.0, descriptor) {
            self.submit_frame().record_command(Command::UpdateTexture(handle));
        }
    }

    pub fn free_texture(&self, handle: TextureHandle) {
        self.textures.free(handle.0);
        self.submit_frame().record_command(Command::FreeTexture(handle));
    }

    pub fn create_program(&self, descriptor: ProgramDescriptor) -> ProgramHandle {
        let handle = ProgramHandle(self.programs.create(descriptor));
        if !handle.is_null() {
            self.submit_frame().record_command(Command::CreateProgram(handle));
        }
        handle
    }

    pub fn update_program(&self, handle: ProgramHandle, descriptor: ProgramDescriptor) {
        if self.programs.update(handle.0, descriptor) {
            self.submit_frame().record_command(Command::UpdateProgram(handle));
        }
    }

    pub fn free_program(&self, handle: ProgramHandle) {
        self.programs.free(handle.0);
        self.submit_frame().record_command(Command::FreeProgram(handle));
    }

    pub fn create_render_state(&self, descriptor: RenderStateDescriptor) -> RenderStateHandle {
        let handle = RenderStateHandle(self.render_states.create(descriptor));
        if !handle.is_null() {
            self.submit_frame().record_command(Command::CreateRenderState(handle));
        }
        handle
    }

    pub fn update_render_state(&self, handle: RenderStateHandle, descriptor: RenderStateDescriptor) {
        if self.render_states.update(handle.0, descriptor) {
            self.submit_frame().record_command(Command::UpdateRenderState(handle));
        }
    }

    pub fn free_render_state(&self, handle: RenderStateHandle) {
        self.render_states.free(handle.0);
        self.submit_frame().record_command(Command::FreeRenderState(handle));
    }
}
