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

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use vesta_core::math::Rect2D;
use vesta_core::renderer::api::{
    BufferId, NativeRenderPass, NativeVertexBinding, PrimitiveType, RenderPipelineId, TextureId,
    UniformSlot, Viewport,
};
use vesta_core::renderer::{BackendEncoder, RenderError};

/// One entry of the native command stream produced by a [`TraceEncoder`].
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedCommand {
    /// Starts a render pass on the given attachments.
    BeginRenderPass(NativeRenderPass),
    /// Ends the active render pass.
    EndRenderPass,
    /// Binds a graphics pipeline.
    BindGraphicsPipeline(RenderPipelineId),
    /// Binds a uniform buffer.
    BindUniformBuffer {
        /// The logical slot.
        slot: UniformSlot,
        /// The native binding point of `slot`.
        binding: u32,
        /// The bound buffer.
        buffer: BufferId,
        /// Byte offset into `buffer`.
        offset: u64,
    },
    /// Binds the vertex and instance streams.
    BindVertexBuffers {
        /// The per-vertex stream, if any.
        vertex: Option<NativeVertexBinding>,
        /// The per-instance stream, if any.
        instance: Option<NativeVertexBinding>,
    },
    /// Binds the index buffer.
    BindIndexBuffer {
        /// The bound buffer.
        buffer: BufferId,
        /// Byte offset into `buffer`.
        offset: u64,
    },
    /// Sets the scissor rectangle.
    SetScissor(Rect2D),
    /// Sets the viewport.
    SetViewport(Viewport),
    /// Sets the stencil reference value.
    SetStencilReference(u32),
    /// Sets the blend constants.
    SetBlendConstants([f32; 4]),
    /// A non-indexed draw.
    Draw {
        /// How vertices are assembled.
        primitive: PrimitiveType,
        /// First vertex.
        base_vertex: u32,
        /// Number of vertices.
        vertex_count: u32,
        /// First instance.
        base_instance: u32,
        /// Number of instances; `1` for plain draws.
        instance_count: u32,
    },
    /// An indexed draw.
    DrawIndexed {
        /// How vertices are assembled.
        primitive: PrimitiveType,
        /// First index.
        base_index: u32,
        /// Number of indices.
        index_count: u32,
        /// Value added to each index.
        base_vertex: u32,
        /// First instance.
        base_instance: u32,
        /// Number of instances; `1` for plain draws.
        instance_count: u32,
    },
    /// Copies a texture region into a buffer.
    CopyTextureToBuffer {
        /// The source texture.
        texture: TextureId,
        /// The copied region.
        src_rect: Rect2D,
        /// The destination buffer.
        buffer: BufferId,
        /// Byte offset of the first row.
        buffer_offset: u64,
        /// Distance between rows, in bytes.
        buffer_row_bytes: u64,
    },
    /// Copies bytes between buffers.
    CopyBufferToBuffer {
        /// The source buffer.
        source: BufferId,
        /// Byte offset into `source`.
        source_offset: u64,
        /// The destination buffer.
        destination: BufferId,
        /// Byte offset into `destination`.
        destination_offset: u64,
        /// Number of bytes copied.
        size: u64,
    },
}

/// A headless backend that keeps the command stream as data.
///
/// Non-instanced draws are encoded as a single instance, the way native APIs
/// express them.
#[derive(Debug, Default)]
pub struct TraceEncoder {
    commands: Vec<EncodedCommand>,
    sealed: bool,
    device_lost: Arc<AtomicBool>,
}

impl TraceEncoder {
    /// Creates an encoder that is not attached to any device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an encoder that fails to seal once `device_lost` is set.
    pub(crate) fn attached(device_lost: Arc<AtomicBool>) -> Self {
        Self {
            commands: Vec::new(),
            sealed: false,
            device_lost,
        }
    }

    /// The commands encoded so far, in call order.
    pub fn commands(&self) -> &[EncodedCommand] {
        &self.commands
    }

    /// Returns `true` once [`finish`](BackendEncoder::finish) succeeded.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn push(&mut self, command: EncodedCommand) {
        log::trace!("TraceEncoder: {:?}", command);
        self.commands.push(command);
    }
}

impl BackendEncoder for TraceEncoder {
    fn begin_render_pass(&mut self, pass: &NativeRenderPass) {
        self.push(EncodedCommand::BeginRenderPass(*pass));
    }

    fn end_render_pass(&mut self) {
        self.push(EncodedCommand::EndRenderPass);
    }

    fn bind_graphics_pipeline(&mut self, pipeline: RenderPipelineId) {
        self.push(EncodedCommand::BindGraphicsPipeline(pipeline));
    }

    fn bind_uniform_buffer(&mut self, slot: UniformSlot, buffer: BufferId, offset: u64) {
        self.push(EncodedCommand::BindUniformBuffer {
            slot,
            binding: slot.binding_index(),
            buffer,
            offset,
        });
    }

    fn bind_vertex_buffers(
        &mut self,
        vertex: Option<NativeVertexBinding>,
        instance: Option<NativeVertexBinding>,
    ) {
        self.push(EncodedCommand::BindVertexBuffers { vertex, instance });
    }

    fn bind_index_buffer(&mut self, buffer: BufferId, offset: u64) {
        self.push(EncodedCommand::BindIndexBuffer { buffer, offset });
    }

    fn set_scissor(&mut self, rect: Rect2D) {
        self.push(EncodedCommand::SetScissor(rect));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.push(EncodedCommand::SetViewport(viewport));
    }

    fn set_stencil_reference(&mut self, reference: u32) {
        self.push(EncodedCommand::SetStencilReference(reference));
    }

    fn set_blend_constants(&mut self, constants: [f32; 4]) {
        self.push(EncodedCommand::SetBlendConstants(constants));
    }

    fn draw(&mut self, primitive: PrimitiveType, base_vertex: u32, vertex_count: u32) {
        self.draw_instanced(primitive, base_vertex, vertex_count, 0, 1);
    }

    fn draw_indexed(
        &mut self,
        primitive: PrimitiveType,
        base_index: u32,
        index_count: u32,
        base_vertex: u32,
    ) {
        self.draw_indexed_instanced(primitive, base_index, index_count, base_vertex, 0, 1);
    }

    fn draw_instanced(
        &mut self,
        primitive: PrimitiveType,
        base_vertex: u32,
        vertex_count: u32,
        base_instance: u32,
        instance_count: u32,
    ) {
        self.push(EncodedCommand::Draw {
            primitive,
            base_vertex,
            vertex_count,
            base_instance,
            instance_count,
        });
    }

    fn draw_indexed_instanced(
        &mut self,
        primitive: PrimitiveType,
        base_index: u32,
        index_count: u32,
        base_vertex: u32,
        base_instance: u32,
        instance_count: u32,
    ) {
        self.push(EncodedCommand::DrawIndexed {
            primitive,
            base_index,
            index_count,
            base_vertex,
            base_instance,
            instance_count,
        });
    }

    fn copy_texture_to_buffer(
        &mut self,
        texture: TextureId,
        src_rect: Rect2D,
        buffer: BufferId,
        buffer_offset: u64,
        buffer_row_bytes: u64,
    ) {
        self.push(EncodedCommand::CopyTextureToBuffer {
            texture,
            src_rect,
            buffer,
            buffer_offset,
            buffer_row_bytes,
        });
    }

    fn copy_buffer_to_buffer(
        &mut self,
        source: BufferId,
        source_offset: u64,
        destination: BufferId,
        destination_offset: u64,
        size: u64,
    ) {
        self.push(EncodedCommand::CopyBufferToBuffer {
            source,
            source_offset,
            destination,
            destination_offset,
            size,
        });
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        if self.device_lost.load(Ordering::Acquire) {
            return Err(RenderError::DeviceLost);
        }
        if self.sealed {
            return Err(RenderError::SubmissionFailed(
                "command stream was already sealed".to_string(),
            ));
        }
        self.sealed = true;
        log::trace!("TraceEncoder: sealed {} commands", self.commands.len());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_draws_are_single_instance() {
        let mut encoder = TraceEncoder::new();
        encoder.draw(PrimitiveType::Triangles, 0, 3);
        encoder.draw_indexed(PrimitiveType::TriangleStrip, 6, 4, 2);

        assert_eq!(
            encoder.commands(),
            &[
                EncodedCommand::Draw {
                    primitive: PrimitiveType::Triangles,
                    base_vertex: 0,
                    vertex_count: 3,
                    base_instance: 0,
                    instance_count: 1,
                },
                EncodedCommand::DrawIndexed {
                    primitive: PrimitiveType::TriangleStrip,
                    base_index: 6,
                    index_count: 4,
                    base_vertex: 2,
                    base_instance: 0,
                    instance_count: 1,
                },
            ]
        );
    }

    #[test]
    fn uniform_slots_map_to_fixed_bindings() {
        let mut encoder = TraceEncoder::new();
        encoder.bind_uniform_buffer(UniformSlot::Paint, BufferId(9), 128);
        assert!(matches!(
            encoder.commands()[0],
            EncodedCommand::BindUniformBuffer { binding: 1, .. }
        ));
    }

    #[test]
    fn sealing_twice_fails() {
        let mut encoder = TraceEncoder::new();
        encoder.finish().unwrap();
        assert!(encoder.is_sealed());
        assert!(matches!(
            encoder.finish(),
            Err(RenderError::SubmissionFailed(_))
        ));
    }

    #[test]
    fn lost_device_cannot_seal() {
        let lost = Arc::new(AtomicBool::new(false));
        let mut encoder = TraceEncoder::attached(Arc::clone(&lost));
        lost.store(true, Ordering::Release);
        assert!(matches!(encoder.finish(), Err(RenderError::DeviceLost)));
        assert!(!encoder.is_sealed());
    }
}
