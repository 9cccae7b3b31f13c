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

use super::buffer::CommandBuffer;
use super::RecordResult;
use crate::math::Rect2D;
use crate::renderer::api::{
    Buffer, GraphicsPipeline, PrimitiveType, UniformSlot, VertexBinding, Viewport,
};
use std::sync::Arc;

/// A render pass in progress, borrowed from its [`CommandBuffer`].
///
/// Only render-pass-scoped operations exist on this type, so copies and nested
/// passes cannot be expressed while it is alive. The pass ends on
/// [`end`](Self::end), or when the encoder is dropped.
#[derive(Debug)]
pub struct RenderPassEncoder<'a> {
    cmd: &'a mut CommandBuffer,
}

impl<'a> RenderPassEncoder<'a> {
    pub(crate) fn new(cmd: &'a mut CommandBuffer) -> Self {
        Self { cmd }
    }

    /// The command buffer this pass records into.
    pub fn command_buffer(&self) -> &CommandBuffer {
        self.cmd
    }

    /// See [`CommandBuffer::bind_graphics_pipeline`].
    pub fn bind_graphics_pipeline(&mut self, pipeline: Arc<GraphicsPipeline>) -> RecordResult {
        self.cmd.bind_graphics_pipeline(pipeline)
    }

    /// See [`CommandBuffer::bind_uniform_buffer`].
    pub fn bind_uniform_buffer(
        &mut self,
        slot: UniformSlot,
        buffer: Arc<Buffer>,
        offset: u64,
    ) -> RecordResult {
        self.cmd.bind_uniform_buffer(slot, buffer, offset)
    }

    /// See [`CommandBuffer::bind_vertex_buffers`].
    pub fn bind_vertex_buffers(
        &mut self,
        vertex: Option<VertexBinding>,
        instance: Option<VertexBinding>,
    ) -> RecordResult {
        self.cmd.bind_vertex_buffers(vertex, instance)
    }

    /// See [`CommandBuffer::bind_index_buffer`].
    pub fn bind_index_buffer(&mut self, buffer: Arc<Buffer>, offset: u64) -> RecordResult {
        self.cmd.bind_index_buffer(buffer, offset)
    }

    /// See [`CommandBuffer::set_scissor`].
    pub fn set_scissor(&mut self, rect: Rect2D) -> RecordResult {
        self.cmd.set_scissor(rect)
    }

    /// See [`CommandBuffer::set_viewport`].
    pub fn set_viewport(&mut self, viewport: Viewport) -> RecordResult {
        self.cmd.set_viewport(viewport)
    }

    /// See [`CommandBuffer::set_stencil_reference`].
    pub fn set_stencil_reference(&mut self, reference: u32) -> RecordResult {
        self.cmd.set_stencil_reference(reference)
    }

    /// See [`CommandBuffer::set_blend_constants`].
    pub fn set_blend_constants(&mut self, constants: [f32; 4]) -> RecordResult {
        self.cmd.set_blend_constants(constants)
    }

    /// See [`CommandBuffer::draw`].
    pub fn draw(
        &mut self,
        primitive: PrimitiveType,
        base_vertex: u32,
        vertex_count: u32,
    ) -> RecordResult {
        self.cmd.draw(primitive, base_vertex, vertex_count)
    }

    /// See [`CommandBuffer::draw_indexed`].
    pub fn draw_indexed(
        &mut self,
        primitive: PrimitiveType,
        base_index: u32,
        index_count: u32,
        base_vertex: u32,
    ) -> RecordResult {
        self.cmd
            .draw_indexed(primitive, base_index, index_count, base_vertex)
    }

    /// See [`CommandBuffer::draw_instanced`].
    pub fn draw_instanced(
        &mut self,
        primitive: PrimitiveType,
        base_vertex: u32,
        vertex_count: u32,
        base_instance: u32,
        instance_count: u32,
    ) -> RecordResult {
        self.cmd.draw_instanced(
            primitive,
            base_vertex,
            vertex_count,
            base_instance,
            instance_count,
        )
    }

    /// See [`CommandBuffer::draw_indexed_instanced`].
    pub fn draw_indexed_instanced(
        &mut self,
        primitive: PrimitiveType,
        base_index: u32,
        index_count: u32,
        base_vertex: u32,
        base_instance: u32,
        instance_count: u32,
    ) -> RecordResult {
        self.cmd.draw_indexed_instanced(
            primitive,
            base_index,
            index_count,
            base_vertex,
            base_instance,
            instance_count,
        )
    }

    /// Ends the pass and hands the command buffer back to the caller.
    pub fn end(self) -> RecordResult {
        self.cmd.end_render_pass()
    }
}

impl Drop for RenderPassEncoder<'_> {
    fn drop(&mut self) {
        // Nothing to end after `end()` or after a violation invalidated the buffer.
        if self.cmd.is_recording_pass() {
            let _ = self.cmd.end_render_pass();
        }
    }
}
