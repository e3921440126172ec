use parking_lot::Mutex;
use types::Color;

use crate::handles::{IndexBufferHandle, ProgramHandle, RenderStateHandle, TextureHandle, VertexBufferHandle};
use crate::sort_key::SortKey;
use crate::uniform::{UniformBuffer, UniformBufferView};

#[derive(Debug, Clone, Copy)]
pub struct ClearParams {
    pub color: Color<f32>,
    pub depth: f32,
}

impl Default for ClearParams {
    fn default() -> Self {
        Self {
            color: Color { r: 0.0, g: 0.0, b: 0.0 },
            depth: 1.0,
        }
    }
}

/// One resource-lifecycle event, recorded in program order within a frame.
#[derive(Debug, Clone, Copy)]
pub enum Command {
    Clear(ClearParams),
    CreateVertexBuffer(VertexBufferHandle),
    UpdateVertexBuffer(VertexBufferHandle),
    FreeVertexBuffer(VertexBufferHandle),
    CreateIndexBuffer(IndexBufferHandle),
    UpdateIndexBuffer(IndexBufferHandle),
    FreeIndexBuffer(IndexBufferHandle),
    CreateTexture(TextureHandle),
    UpdateTexture(TextureHandle),
    FreeTexture(TextureHandle),
    CreateProgram(ProgramHandle),
    UpdateProgram(ProgramHandle),
    FreeProgram(ProgramHandle),
    CreateRenderState(RenderStateHandle),
    UpdateRenderState(RenderStateHandle),
    FreeRenderState(RenderStateHandle),
}

impl Command {
    /// True for the three `Free*` variants. `drain_into` uses this to hold
    /// frees back until after drawcalls, per the frame's ordering contract:
    /// creates/updates, then drawcalls, then frees.
    fn is_free(&self) -> bool {
        matches!(
            self,
            Command::FreeVertexBuffer(_)
                | Command::FreeIndexBuffer(_)
                | Command::FreeTexture(_)
                | Command::FreeProgram(_)
                | Command::FreeRenderState(_)
        )
    }
}

/// A single texture binding at a numbered sampler slot.
#[derive(Debug, Clone, Copy)]
pub struct TextureSlot {
    pub slot: u8,
    pub texture: TextureHandle,
}

#[derive(Debug, Clone, Copy)]
pub struct DrawCall {
    pub program: ProgramHandle,
    pub vertex_buffer: VertexBufferHandle,
    pub index_buffer: IndexBufferHandle,
    pub index_range: (u32, u32),
    pub render_state: RenderStateHandle,
    pub uniforms: UniformBufferView,
    pub sort_key: SortKey,
}

/// One producer/consumer frame slot: the commands and drawcalls recorded
/// against it, plus its own per-frame uniform arena.
///
/// The command and drawcall vectors are append-only and guarded by a
/// lightweight lock (`parking_lot::Mutex`) rather than a lock-free
/// structure, per spec.md's "either is acceptable provided the stable
/// ordering of each thread's own submissions is preserved" — `parking_lot`
/// already matches the ecosystem choices the rest of this workspace makes.
#[derive(Default)]
pub struct RenderFrame {
    pub(crate) commands: Mutex<Vec<Command>>,
    pub(crate) drawcalls: Mutex<Vec<(SortKey, DrawCall)>>,
    pub(crate) uniform_arena: UniformBuffer,
    pub(crate) texture_slots: Mutex<Vec<TextureSlot>>,
}

impl RenderFrame {
    pub fn record_command(&self, command: Command) {
        self.commands.lock().push(command);
    }

    pub fn submit_drawcall(&self, drawcall: DrawCall) {
        let key = drawcall.sort_key;
        self.drawcalls.lock().push((key, drawcall));
    }

    pub fn uniform_arena(&self) -> &UniformBuffer {
        &self.uniform_arena
    }

    pub(crate) fn sort_drawcalls(&self) {
        self.drawcalls.lock().sort_by_key(|(key, _)| *key);
    }

    pub(crate) fn reset(&self) {
        self.commands.lock().clear();
        self.drawcalls.lock().clear();
        self.texture_slots.lock().clear();
        self.uniform_arena.reset();
    }

    /// Processes commands in record order, holding `Free*` commands back
    /// until after drawcalls — creates/updates, then drawcalls, then frees,
    /// per the frame's ordering contract.
    pub(crate) fn drain_into(&self, backend: &mut dyn crate::backend::Backend) {
        let mut deferred_frees = Vec::new();
        for command in self.commands.lock().drain(..) {
            if command.is_free() {
                deferred_frees.push(command);
            } else {
                backend.process_command(&command);
            }
        }
        for (_, drawcall) in self.drawcalls.lock().iter() {
            backend.process_drawcall(drawcall);
        }
        for command in deferred_frees {
            backend.process_command(&command);
        }
    }
}
