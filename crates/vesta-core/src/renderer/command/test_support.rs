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

//! A backend that only remembers what it was asked to do, plus resource fixtures.

use crate::math::{Extent2D, Rect2D};
use crate::renderer::api::*;
use crate::renderer::error::RenderError;
use crate::renderer::traits::BackendEncoder;
use std::any::Any;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    BeginRenderPass(NativeRenderPass),
    EndRenderPass,
    BindPipeline(RenderPipelineId),
    BindUniform(UniformSlot, BufferId, u64),
    BindVertexBuffers(Option<NativeVertexBinding>, Option<NativeVertexBinding>),
    BindIndexBuffer(BufferId, u64),
    SetScissor(Rect2D),
    SetViewport(Viewport),
    SetStencilReference(u32),
    SetBlendConstants([f32; 4]),
    Draw(PrimitiveType, u32, u32),
    DrawIndexed(PrimitiveType, u32, u32, u32),
    DrawInstanced(PrimitiveType, u32, u32, u32, u32),
    DrawIndexedInstanced(PrimitiveType, u32, u32, u32, u32, u32),
    CopyTextureToBuffer(TextureId, Rect2D, BufferId, u64, u64),
    CopyBufferToBuffer(BufferId, u64, BufferId, u64, u64),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingBackend {
    /// Returns the backend and a handle on its call log that outlives it.
    pub(crate) fn new() -> (Self, Arc<Mutex<Vec<Call>>>) {
        let backend = Self::default();
        let calls = Arc::clone(&backend.calls);
        (backend, calls)
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl BackendEncoder for RecordingBackend {
    fn begin_render_pass(&mut self, pass: &NativeRenderPass) {
        self.push(Call::BeginRenderPass(*pass));
    }
    fn end_render_pass(&mut self) {
        self.push(Call::EndRenderPass);
    }
    fn bind_graphics_pipeline(&mut self, pipeline: RenderPipelineId) {
        self.push(Call::BindPipeline(pipeline));
    }
    fn bind_uniform_buffer(&mut self, slot: UniformSlot, buffer: BufferId, offset: u64) {
        self.push(Call::BindUniform(slot, buffer, offset));
    }
    fn bind_vertex_buffers(
        &mut self,
        vertex: Option<NativeVertexBinding>,
        instance: Option<NativeVertexBinding>,
    ) {
        self.push(Call::BindVertexBuffers(vertex, instance));
    }
    fn bind_index_buffer(&mut self, buffer: BufferId, offset: u64) {
        self.push(Call::BindIndexBuffer(buffer, offset));
    }
    fn set_scissor(&mut self, rect: Rect2D) {
        self.push(Call::SetScissor(rect));
    }
    fn set_viewport(&mut self, viewport: Viewport) {
        self.push(Call::SetViewport(viewport));
    }
    fn set_stencil_reference(&mut self, reference: u32) {
        self.push(Call::SetStencilReference(reference));
    }
    fn set_blend_constants(&mut self, constants: [f32; 4]) {
        self.push(Call::SetBlendConstants(constants));
    }
    fn draw(&mut self, primitive: PrimitiveType, base_vertex: u32, vertex_count: u32) {
        self.push(Call::Draw(primitive, base_vertex, vertex_count));
    }
    fn draw_indexed(
        &mut self,
        primitive: PrimitiveType,
        base_index: u32,
        index_count: u32,
        base_vertex: u32,
    ) {
        self.push(Call::DrawIndexed(primitive, base_index, index_count, base_vertex));
    }
    fn draw_instanced(
        &mut self,
        primitive: PrimitiveType,
        base_vertex: u32,
        vertex_count: u32,
        base_instance: u32,
        instance_count: u32,
    ) {
        self.push(Call::DrawInstanced(
            primitive,
            base_vertex,
            vertex_count,
            base_instance,
            instance_count,
        ));
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
        self.push(Call::DrawIndexedInstanced(
            primitive,
            base_index,
            index_count,
            base_vertex,
            base_instance,
            instance_count,
        ));
    }
    fn copy_texture_to_buffer(
        &mut self,
        texture: TextureId,
        src_rect: Rect2D,
        buffer: BufferId,
        buffer_offset: u64,
        buffer_row_bytes: u64,
    ) {
        self.push(Call::CopyTextureToBuffer(
            texture,
            src_rect,
            buffer,
            buffer_offset,
            buffer_row_bytes,
        ));
    }
    fn copy_buffer_to_buffer(
        &mut self,
        source: BufferId,
        source_offset: u64,
        destination: BufferId,
        destination_offset: u64,
        size: u64,
    ) {
        self.push(Call::CopyBufferToBuffer(
            source,
            source_offset,
            destination,
            destination_offset,
            size,
        ));
    }
    fn finish(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub(crate) fn buffer(id: u64, size: u64, usage: BufferUsage) -> Arc<Buffer> {
    Arc::new(Buffer::new(
        BufferId(id),
        &BufferDescriptor {
            label: None,
            size,
            usage,
        },
    ))
}

pub(crate) fn texture(id: u64, format: TextureFormat, sample_count: u32) -> Arc<Texture> {
    Arc::new(Texture::new(
        TextureId(id),
        &TextureDescriptor {
            label: None,
            size: Extent2D::new(64, 64),
            format,
            sample_count,
            usage: TextureUsage::RENDER_ATTACHMENT | TextureUsage::COPY_SRC,
        },
    ))
}

pub(crate) fn pipeline(id: u64) -> Arc<GraphicsPipeline> {
    Arc::new(GraphicsPipeline::new(RenderPipelineId(id), Some("test")))
}
