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

use super::render_pass::RenderPassEncoder;
use super::state::{ActivePass, PassState};
use super::tracker::ResourceTracker;
use super::RecordResult;
use crate::math::Rect2D;
use crate::renderer::api::{
    Buffer, BufferUsage, GraphicsPipeline, LoadOp, PrimitiveType, RenderPassDesc, ResourceId,
    StoreOp, Texture, TextureId, TextureUsage, UniformSlot, VertexBinding, Viewport,
};
use crate::renderer::error::ProtocolViolation;
use crate::renderer::settings::{RecorderSettings, ValidationMode};
use crate::renderer::traits::BackendEncoder;
use std::collections::HashSet;
use std::sync::Arc;

/// One recordable, then submittable, unit of GPU work.
///
/// A `CommandBuffer` validates every call against the render pass protocol,
/// tracks a shared reference to every resource it is handed, and forwards the
/// call to its [`BackendEncoder`] with native identifiers.
///
/// Render-pass-scoped operations (binding, dynamic state, draws) are legal only
/// between [`begin_render_pass`](Self::begin_render_pass) and
/// [`end_render_pass`](Self::end_render_pass); copies are legal only outside.
/// The first violation invalidates the buffer. Depending on
/// [`ValidationMode`] the violation then panics or is returned, and every later
/// call is rejected without reaching the backend.
///
/// Recording happens on one thread. The buffer is `Send`, so independent
/// buffers can be recorded on different threads.
#[derive(Debug)]
pub struct CommandBuffer {
    backend: Box<dyn BackendEncoder>,
    state: PassState,
    has_work: bool,
    tracker: ResourceTracker,
    undefined_contents: HashSet<TextureId>,
    settings: RecorderSettings,
}

impl CommandBuffer {
    /// Creates an empty command buffer that records into `backend`.
    pub fn new(backend: Box<dyn BackendEncoder>, settings: RecorderSettings) -> Self {
        Self {
            backend,
            state: PassState::Idle,
            has_work: false,
            tracker: ResourceTracker::new(),
            undefined_contents: HashSet::new(),
            settings,
        }
    }

    // --- Queries ---

    /// Returns `true` once anything that produces GPU work was recorded.
    ///
    /// A buffer without work can be skipped at submission.
    pub fn has_work(&self) -> bool {
        self.has_work
    }

    /// Returns `true` while a render pass is active.
    pub fn is_recording_pass(&self) -> bool {
        matches!(self.state, PassState::InRenderPass(_))
    }

    /// Returns `true` if a protocol violation invalidated this buffer.
    pub fn is_invalid(&self) -> bool {
        matches!(self.state, PassState::Invalid)
    }

    /// The current recording state.
    pub fn state(&self) -> &PassState {
        &self.state
    }

    /// The resources this buffer keeps alive.
    pub fn tracked_resources(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Returns `true` if a reference to `id` is held.
    pub fn is_tracked(&self, id: ResourceId) -> bool {
        self.tracker.contains(id)
    }

    /// The debug label, or `"unlabeled"`.
    pub fn label(&self) -> &str {
        self.settings.label.as_deref().unwrap_or("unlabeled")
    }

    /// The backend encoder.
    pub fn backend(&self) -> &dyn BackendEncoder {
        self.backend.as_ref()
    }

    /// The backend encoder, mutably. Used by the submission collaborator to seal the stream.
    pub fn backend_mut(&mut self) -> &mut dyn BackendEncoder {
        self.backend.as_mut()
    }

    // --- Teardown ---

    /// Releases every tracked resource in one pass and returns how many
    /// references were dropped.
    ///
    /// Call this once the GPU reports the buffer complete, or when the buffer is
    /// discarded without submission. Calling it again, or on a buffer that never
    /// tracked anything, is a no-op.
    pub fn release_resources(&mut self) -> usize {
        let released = self.tracker.release_all();
        if released > 0 {
            log::trace!(
                "Command buffer '{}' released {released} tracked resources.",
                self.label()
            );
        }
        released
    }

    // --- Render pass boundaries ---

    /// Begins a render pass described by `desc`.
    ///
    /// Validates the attachments, tracks their textures and forwards the resolved
    /// descriptor. Marks the buffer as having work if any attachment is cleared.
    pub fn begin_render_pass(&mut self, desc: &RenderPassDesc) -> RecordResult {
        let check = self
            .state
            .check_can_begin()
            .and_then(|()| self.validate_render_pass(desc));
        self.guard(check)?;

        for attachment in desc.attachments() {
            self.tracker.track(Arc::clone(&attachment.texture));
        }
        self.backend.begin_render_pass(&desc.to_native());
        if desc.has_clear() {
            self.has_work = true;
        }
        let begun = self.state.begin(ActivePass::new(desc));
        self.guard(begun)?;

        log::debug!(
            "Command buffer '{}': begin render pass on {:?}",
            self.label(),
            desc.color.texture.id()
        );
        Ok(())
    }

    /// Begins a render pass and returns an encoder scoped to it.
    ///
    /// While the encoder is alive only render-pass-scoped operations can be
    /// recorded; the pass ends when the encoder is ended or dropped.
    pub fn render_pass(&mut self, desc: &RenderPassDesc) -> RecordResult<RenderPassEncoder<'_>> {
        self.begin_render_pass(desc)?;
        Ok(RenderPassEncoder::new(self))
    }

    /// Ends the active render pass.
    pub fn end_render_pass(&mut self) -> RecordResult {
        let ended = self.state.end();
        let pass = self.guard(ended)?;

        for &(texture, store) in pass.store_ops() {
            match store {
                StoreOp::Discard => self.undefined_contents.insert(texture),
                StoreOp::Store => self.undefined_contents.remove(&texture),
            };
        }
        self.backend.end_render_pass();
        log::debug!("Command buffer '{}': end render pass", self.label());
        Ok(())
    }

    // --- Render-pass-scoped operations ---

    /// Binds a graphics pipeline for subsequent draws.
    pub fn bind_graphics_pipeline(&mut self, pipeline: Arc<GraphicsPipeline>) -> RecordResult {
        self.require_pass("bind_graphics_pipeline")?;

        let id = pipeline.id();
        self.tracker.track(pipeline);
        self.backend.bind_graphics_pipeline(id);
        if let Some(pass) = self.state.active_mut() {
            pass.pipeline_bound = true;
        }
        self.has_work = true;
        Ok(())
    }

    /// Binds `buffer` at byte `offset` to the fixed binding point of `slot`.
    pub fn bind_uniform_buffer(
        &mut self,
        slot: UniformSlot,
        buffer: Arc<Buffer>,
        offset: u64,
    ) -> RecordResult {
        self.require_pass("bind_uniform_buffer")?;
        self.require_buffer_usage(&buffer, BufferUsage::UNIFORM)?;

        let id = buffer.id();
        self.tracker.track(buffer);
        self.backend.bind_uniform_buffer(slot, id, offset);
        self.has_work = true;
        Ok(())
    }

    /// Binds the per-vertex and per-instance streams.
    pub fn bind_vertex_buffers(
        &mut self,
        vertex: Option<VertexBinding>,
        instance: Option<VertexBinding>,
    ) -> RecordResult {
        self.require_pass("bind_vertex_buffers")?;
        for binding in vertex.iter().chain(instance.iter()) {
            self.require_buffer_usage(&binding.buffer, BufferUsage::VERTEX)?;
        }

        let native_vertex = vertex.as_ref().map(VertexBinding::to_native);
        let native_instance = instance.as_ref().map(VertexBinding::to_native);
        for binding in vertex.into_iter().chain(instance) {
            self.tracker.track(binding.buffer);
        }
        self.backend
            .bind_vertex_buffers(native_vertex, native_instance);
        self.has_work = true;
        Ok(())
    }

    /// Binds the index buffer, starting at byte `offset`.
    pub fn bind_index_buffer(&mut self, buffer: Arc<Buffer>, offset: u64) -> RecordResult {
        self.require_pass("bind_index_buffer")?;
        self.require_buffer_usage(&buffer, BufferUsage::INDEX)?;

        let id = buffer.id();
        self.tracker.track(buffer);
        self.backend.bind_index_buffer(id, offset);
        if let Some(pass) = self.state.active_mut() {
            pass.index_buffer_bound = true;
        }
        self.has_work = true;
        Ok(())
    }

    /// Sets the scissor rectangle.
    pub fn set_scissor(&mut self, rect: Rect2D) -> RecordResult {
        self.require_pass("set_scissor")?;
        self.backend.set_scissor(rect);
        self.has_work = true;
        Ok(())
    }

    /// Sets the viewport. The depth range must satisfy `0 <= min <= max <= 1`.
    pub fn set_viewport(&mut self, viewport: Viewport) -> RecordResult {
        self.require_pass("set_viewport")?;
        if !viewport.is_valid() {
            return Err(self.reject(ProtocolViolation::InvalidViewport {
                min_depth: viewport.min_depth,
                max_depth: viewport.max_depth,
            }));
        }
        self.backend.set_viewport(viewport);
        self.has_work = true;
        Ok(())
    }

    /// Sets the stencil reference value.
    ///
    /// Rejected when the active pass has no depth/stencil attachment with a
    /// stencil aspect.
    pub fn set_stencil_reference(&mut self, reference: u32) -> RecordResult {
        let check = self
            .state
            .check_in_pass("set_stencil_reference")
            .and_then(|pass| {
                if pass.has_stencil() {
                    Ok(())
                } else {
                    Err(ProtocolViolation::StencilWithoutAttachment)
                }
            });
        self.guard(check)?;

        self.backend.set_stencil_reference(reference);
        self.has_work = true;
        Ok(())
    }

    /// Sets the blend constants.
    pub fn set_blend_constants(&mut self, constants: [f32; 4]) -> RecordResult {
        self.require_pass("set_blend_constants")?;
        self.backend.set_blend_constants(constants);
        self.has_work = true;
        Ok(())
    }

    /// Draws `vertex_count` vertices starting at `base_vertex`.
    pub fn draw(
        &mut self,
        primitive: PrimitiveType,
        base_vertex: u32,
        vertex_count: u32,
    ) -> RecordResult {
        self.require_draw("draw", false)?;
        self.backend.draw(primitive, base_vertex, vertex_count);
        self.has_work = true;
        Ok(())
    }

    /// Draws `index_count` indices starting at `base_index`.
    pub fn draw_indexed(
        &mut self,
        primitive: PrimitiveType,
        base_index: u32,
        index_count: u32,
        base_vertex: u32,
    ) -> RecordResult {
        self.require_draw("draw_indexed", true)?;
        self.backend
            .draw_indexed(primitive, base_index, index_count, base_vertex);
        self.has_work = true;
        Ok(())
    }

    /// Draws `instance_count` instances of `vertex_count` vertices.
    pub fn draw_instanced(
        &mut self,
        primitive: PrimitiveType,
        base_vertex: u32,
        vertex_count: u32,
        base_instance: u32,
        instance_count: u32,
    ) -> RecordResult {
        self.require_draw("draw_instanced", false)?;
        self.backend.draw_instanced(
            primitive,
            base_vertex,
            vertex_count,
            base_instance,
            instance_count,
        );
        self.has_work = true;
        Ok(())
    }

    /// Draws `instance_count` instances of `index_count` indices.
    pub fn draw_indexed_instanced(
        &mut self,
        primitive: PrimitiveType,
        base_index: u32,
        index_count: u32,
        base_vertex: u32,
        base_instance: u32,
        instance_count: u32,
    ) -> RecordResult {
        self.require_draw("draw_indexed_instanced", true)?;
        self.backend.draw_indexed_instanced(
            primitive,
            base_index,
            index_count,
            base_vertex,
            base_instance,
            instance_count,
        );
        self.has_work = true;
        Ok(())
    }

    // --- Render-pass-exclusive operations ---

    /// Copies `src_rect` of `texture` into `buffer` at `buffer_offset`, with
    /// consecutive rows `buffer_row_bytes` apart.
    pub fn copy_texture_to_buffer(
        &mut self,
        texture: Arc<Texture>,
        src_rect: Rect2D,
        buffer: Arc<Buffer>,
        buffer_offset: u64,
        buffer_row_bytes: u64,
    ) -> RecordResult {
        let check = self
            .state
            .check_idle("copy_texture_to_buffer")
            .and_then(|()| require_texture_usage(&texture, TextureUsage::COPY_SRC))
            .and_then(|()| require_buffer_usage(&buffer, BufferUsage::COPY_DST))
            .and_then(|()| check_copyable(&texture))
            .and_then(|()| {
                if self.undefined_contents.contains(&texture.id()) {
                    Err(ProtocolViolation::UndefinedContents {
                        texture: texture.id(),
                    })
                } else {
                    Ok(())
                }
            })
            .and_then(|()| {
                check_texture_copy_bounds(&texture, src_rect, &buffer, buffer_offset, buffer_row_bytes)
            });
        self.guard(check)?;

        let (texture_id, buffer_id) = (texture.id(), buffer.id());
        self.tracker.track(texture);
        self.tracker.track(buffer);
        self.backend.copy_texture_to_buffer(
            texture_id,
            src_rect,
            buffer_id,
            buffer_offset,
            buffer_row_bytes,
        );
        self.has_work = true;
        Ok(())
    }

    /// Copies `size` bytes from `source` to `destination`.
    pub fn copy_buffer_to_buffer(
        &mut self,
        source: Arc<Buffer>,
        source_offset: u64,
        destination: Arc<Buffer>,
        destination_offset: u64,
        size: u64,
    ) -> RecordResult {
        let check = self
            .state
            .check_idle("copy_buffer_to_buffer")
            .and_then(|()| require_buffer_usage(&source, BufferUsage::COPY_SRC))
            .and_then(|()| require_buffer_usage(&destination, BufferUsage::COPY_DST))
            .and_then(|()| check_range("source", &source, source_offset, size))
            .and_then(|()| check_range("destination", &destination, destination_offset, size));
        self.guard(check)?;

        let (source_id, destination_id) = (source.id(), destination.id());
        self.tracker.track(source);
        self.tracker.track(destination);
        self.backend.copy_buffer_to_buffer(
            source_id,
            source_offset,
            destination_id,
            destination_offset,
            size,
        );
        self.has_work = true;
        Ok(())
    }

    // --- Validation ---

    fn validate_render_pass(&self, desc: &RenderPassDesc) -> Result<(), ProtocolViolation> {
        let color = &desc.color.texture;
        if color.format().is_depth_stencil() {
            return Err(ProtocolViolation::InvalidAttachment {
                texture: color.id(),
                reason: "color attachment needs a color format",
            });
        }

        if let Some(resolve) = &desc.color_resolve {
            let target = &resolve.texture;
            if !color.is_multisampled() {
                return Err(ProtocolViolation::InvalidAttachment {
                    texture: target.id(),
                    reason: "resolve target given for a single-sampled color attachment",
                });
            }
            if target.is_multisampled() {
                return Err(ProtocolViolation::InvalidAttachment {
                    texture: target.id(),
                    reason: "resolve target must be single-sampled",
                });
            }
            if target.size() != color.size() || target.format() != color.format() {
                return Err(ProtocolViolation::InvalidAttachment {
                    texture: target.id(),
                    reason: "resolve target must match the color attachment's size and format",
                });
            }
        }

        if let Some(depth_stencil) = &desc.depth_stencil {
            let texture = &depth_stencil.texture;
            if !texture.format().is_depth_stencil() {
                return Err(ProtocolViolation::InvalidAttachment {
                    texture: texture.id(),
                    reason: "depth/stencil attachment needs a depth or stencil format",
                });
            }
            if texture.sample_count() != color.sample_count() {
                return Err(ProtocolViolation::InvalidAttachment {
                    texture: texture.id(),
                    reason: "depth/stencil sample count must match the color attachment",
                });
            }
        }

        for attachment in desc.attachments() {
            require_texture_usage(&attachment.texture, TextureUsage::RENDER_ATTACHMENT)?;
            let id = attachment.texture.id();
            if attachment.load == LoadOp::Load && self.undefined_contents.contains(&id) {
                return Err(ProtocolViolation::UndefinedContents { texture: id });
            }
        }
        Ok(())
    }

    fn require_pass(&mut self, operation: &'static str) -> RecordResult {
        let check = self.state.check_in_pass(operation).map(|_| ());
        self.guard(check)
    }

    fn require_draw(&mut self, operation: &'static str, indexed: bool) -> RecordResult {
        let check = self.state.check_in_pass(operation).and_then(|pass| {
            if !pass.pipeline_bound {
                Err(ProtocolViolation::NoPipelineBound { operation })
            } else if indexed && !pass.index_buffer_bound {
                Err(ProtocolViolation::NoIndexBufferBound { operation })
            } else {
                Ok(())
            }
        });
        self.guard(check)
    }

    fn require_buffer_usage(&mut self, buffer: &Buffer, required: BufferUsage) -> RecordResult {
        let check = require_buffer_usage(buffer, required);
        self.guard(check)
    }

    /// Passes `Ok` through and turns a violation into a rejection.
    fn guard<T>(&mut self, check: Result<T, ProtocolViolation>) -> RecordResult<T> {
        check.map_err(|violation| self.reject(violation))
    }

    /// Invalidates the buffer, then panics or hands the violation back.
    fn reject(&mut self, violation: ProtocolViolation) -> ProtocolViolation {
        let already_invalid = self.is_invalid();
        self.state = PassState::Invalid;

        if already_invalid {
            log::warn!(
                "Command buffer '{}' is invalid: {violation}",
                self.label()
            );
        } else {
            log::error!(
                "Protocol violation in command buffer '{}': {violation}",
                self.label()
            );
        }

        if self.settings.validation == ValidationMode::Fatal {
            panic!("Protocol violation in command buffer '{}': {violation}", self.label());
        }
        violation
    }
}

impl Drop for CommandBuffer {
    fn drop(&mut self) {
        self.release_resources();
    }
}

fn require_buffer_usage(buffer: &Buffer, required: BufferUsage) -> Result<(), ProtocolViolation> {
    if buffer.usage().contains(required) {
        Ok(())
    } else {
        Err(ProtocolViolation::MissingBufferUsage {
            buffer: buffer.id(),
            required,
        })
    }
}

fn require_texture_usage(texture: &Texture, required: TextureUsage) -> Result<(), ProtocolViolation> {
    if texture.usage().contains(required) {
        Ok(())
    } else {
        Err(ProtocolViolation::MissingTextureUsage {
            texture: texture.id(),
            required,
        })
    }
}

fn check_range(
    role: &str,
    buffer: &Buffer,
    offset: u64,
    size: u64,
) -> Result<(), ProtocolViolation> {
    match offset.checked_add(size) {
        Some(end) if end <= buffer.size() => Ok(()),
        _ => Err(ProtocolViolation::CopyOutOfBounds(format!(
            "{role} range {offset}+{size} exceeds buffer {:?} of {} bytes",
            buffer.id(),
            buffer.size()
        ))),
    }
}

fn check_copyable(texture: &Texture) -> Result<(), ProtocolViolation> {
    if texture.is_multisampled() {
        return Err(ProtocolViolation::UncopyableTexture {
            texture: texture.id(),
            reason: "multisampled textures must be resolved before a copy",
        });
    }
    if texture.format().is_combined_depth_stencil() {
        return Err(ProtocolViolation::UncopyableTexture {
            texture: texture.id(),
            reason: "combined depth/stencil formats have no single texel layout",
        });
    }
    Ok(())
}

fn check_texture_copy_bounds(
    texture: &Texture,
    src_rect: Rect2D,
    buffer: &Buffer,
    buffer_offset: u64,
    buffer_row_bytes: u64,
) -> Result<(), ProtocolViolation> {
    if !src_rect.fits_within(texture.size()) {
        return Err(ProtocolViolation::CopyOutOfBounds(format!(
            "source rect {src_rect:?} exceeds texture {:?} of size {:?}",
            texture.id(),
            texture.size()
        )));
    }

    let tight_row = u64::from(src_rect.extent.width) * u64::from(texture.format().bytes_per_pixel());
    if buffer_row_bytes < tight_row {
        return Err(ProtocolViolation::CopyOutOfBounds(format!(
            "row stride {buffer_row_bytes} is smaller than one row of {tight_row} bytes"
        )));
    }

    let rows = u64::from(src_rect.extent.height);
    let footprint = match rows {
        0 => 0,
        _ => buffer_row_bytes
            .saturating_mul(rows - 1)
            .saturating_add(tight_row),
    };
    check_range("destination", buffer, buffer_offset, footprint)
}
