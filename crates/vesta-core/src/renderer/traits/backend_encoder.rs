// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::math::Rect2D;
use crate::renderer::api::{
    BufferId, NativeRenderPass, NativeVertexBinding, PrimitiveType, RenderPipelineId, TextureId,
    UniformSlot, Viewport,
};
use crate::renderer::error::RenderError;
use std::any::Any;
use std::fmt::Debug;

/// The contract a GPU backend implements to turn recorded operations into its
/// native command stream.
///
/// There is one implementation per native API, chosen once when the device is
/// created. A [`CommandBuffer`](crate::renderer::CommandBuffer) owns a boxed
/// encoder and calls exactly one method per recorded operation, in call order,
/// and only after the operation passed validation. Methods therefore never see
/// an illegal sequence.
///
/// Every method receives native identifiers, not shared handles. Lifetime is the
/// command buffer's job: a resource named here is already tracked by the command
/// buffer that issued the call, so the encoder must not keep identifiers around
/// longer than it needs to emit the native command.
pub trait BackendEncoder: Debug + Send {
    /// Configures and binds the attachments of a new render pass.
    fn begin_render_pass(&mut self, pass: &NativeRenderPass);

    /// Ends the active render pass.
    fn end_render_pass(&mut self);

    /// Binds a graphics pipeline for subsequent draws.
    fn bind_graphics_pipeline(&mut self, pipeline: RenderPipelineId);

    /// Binds a uniform buffer at the fixed binding point of `slot`.
    fn bind_uniform_buffer(&mut self, slot: UniformSlot, buffer: BufferId, offset: u64);

    /// Binds the per-vertex and per-instance streams. `None` leaves a stream unbound.
    fn bind_vertex_buffers(
        &mut self,
        vertex: Option<NativeVertexBinding>,
        instance: Option<NativeVertexBinding>,
    );

    /// Binds the index buffer.
    fn bind_index_buffer(&mut self, buffer: BufferId, offset: u64);

    /// Sets the scissor rectangle.
    fn set_scissor(&mut self, rect: Rect2D);

    /// Sets the viewport and its depth range.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Sets the stencil reference value.
    fn set_stencil_reference(&mut self, reference: u32);

    /// Sets the blend constants.
    fn set_blend_constants(&mut self, constants: [f32; 4]);

    /// Records a non-indexed draw.
    fn draw(&mut self, primitive: PrimitiveType, base_vertex: u32, vertex_count: u32);

    /// Records an indexed draw.
    fn draw_indexed(
        &mut self,
        primitive: PrimitiveType,
        base_index: u32,
        index_count: u32,
        base_vertex: u32,
    );

    /// Records an instanced, non-indexed draw.
    fn draw_instanced(
        &mut self,
        primitive: PrimitiveType,
        base_vertex: u32,
        vertex_count: u32,
        base_instance: u32,
        instance_count: u32,
    );

    /// Records an instanced, indexed draw.
    fn draw_indexed_instanced(
        &mut self,
        primitive: PrimitiveType,
        base_index: u32,
        index_count: u32,
        base_vertex: u32,
        base_instance: u32,
        instance_count: u32,
    );

    /// Copies a texture region into a buffer, rows `buffer_row_bytes` apart.
    fn copy_texture_to_buffer(
        &mut self,
        texture: TextureId,
        src_rect: Rect2D,
        buffer: BufferId,
        buffer_offset: u64,
        buffer_row_bytes: u64,
    );

    /// Copies `size` bytes between two buffers.
    fn copy_buffer_to_buffer(
        &mut self,
        source: BufferId,
        source_offset: u64,
        destination: BufferId,
        destination_offset: u64,
        size: u64,
    );

    /// Seals the native command stream so it can be handed to the queue.
    ///
    /// Called once by the submission collaborator.
    ///
    /// # Errors
    /// Returns a [`RenderError`] if the backend cannot produce a submittable stream,
    /// e.g. [`RenderError::DeviceLost`].
    fn finish(&mut self) -> Result<(), RenderError>;

    /// Returns the encoder as `Any`, to recover the concrete backend type.
    fn as_any(&self) -> &dyn Any;

    /// Returns the encoder as mutable `Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
