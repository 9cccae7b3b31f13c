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

//! Shared-ownership handles to GPU buffers, textures and graphics pipelines.
//!
//! A handle wraps the opaque identifier a backend assigned to the native object,
//! plus the creation metadata the command buffer needs for validation. Handles
//! are always shared through [`Arc`](std::sync::Arc): the allocator that created
//! a handle, any number of callers and every command buffer that referenced it
//! may hold a clone at the same time.
//!
//! When the last clone is dropped, the handle's release hook (if any) sends its
//! [`ResourceId`] to the allocator, which can then destroy the native object.
//! Because an in-flight command buffer keeps its clones until the GPU is done,
//! the native object is never destroyed while it may still be in use.

use crate::math::Extent2D;
use crate::renderer::api::enums::TextureFormat;
use std::borrow::Cow;

/// An opaque, backend-native identifier of a GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// An opaque, backend-native identifier of a GPU texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// An opaque, backend-native identifier of a compiled graphics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderPipelineId(pub u64);

/// Identifies any resource a command buffer can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceId {
    /// A buffer.
    Buffer(BufferId),
    /// A texture.
    Texture(TextureId),
    /// A graphics pipeline.
    GraphicsPipeline(RenderPipelineId),
}

bitflags::bitflags! {
    /// A set of flags describing the allowed usages of a [`Buffer`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BufferUsage: u32 {
        /// The buffer can be the source of a copy operation.
        const COPY_SRC = 1 << 0;
        /// The buffer can be the destination of a copy operation.
        const COPY_DST = 1 << 1;
        /// The buffer can be bound as a vertex or instance buffer.
        const VERTEX = 1 << 2;
        /// The buffer can be bound as an index buffer.
        const INDEX = 1 << 3;
        /// The buffer can be bound to a uniform slot.
        const UNIFORM = 1 << 4;
    }
}

bitflags::bitflags! {
    /// A set of flags describing the allowed usages of a [`Texture`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextureUsage: u32 {
        /// The texture can be the source of a copy operation.
        const COPY_SRC = 1 << 0;
        /// The texture can be the destination of a copy operation.
        const COPY_DST = 1 << 1;
        /// The texture can be sampled from shaders.
        const TEXTURE_BINDING = 1 << 2;
        /// The texture can be a color, resolve or depth/stencil attachment.
        const RENDER_ATTACHMENT = 1 << 3;
    }
}

/// Sends a [`ResourceId`] to the allocator when the last handle is dropped.
#[derive(Debug, Default)]
struct ReleaseHook(Option<flume::Sender<ResourceId>>);

impl ReleaseHook {
    fn fire(&mut self, id: ResourceId) {
        if let Some(sender) = self.0.take() {
            if sender.send(id).is_err() {
                log::trace!("Release of {id:?} not delivered: allocator is gone.");
            }
        }
    }
}

/// A descriptor used to create a [`Buffer`].
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// How the buffer may be used.
    pub usage: BufferUsage,
}

/// A shared handle to a GPU buffer.
#[derive(Debug)]
pub struct Buffer {
    id: BufferId,
    size: u64,
    usage: BufferUsage,
    label: Option<String>,
    release: ReleaseHook,
}

impl Buffer {
    /// Wraps the native buffer `id` described by `descriptor`.
    pub fn new(id: BufferId, descriptor: &BufferDescriptor<'_>) -> Self {
        Self {
            id,
            size: descriptor.size,
            usage: descriptor.usage,
            label: descriptor.label.as_ref().map(|l| l.to_string()),
            release: ReleaseHook::default(),
        }
    }

    /// Attaches the channel notified when the last handle to this buffer is dropped.
    pub fn with_release_hook(mut self, sender: flume::Sender<ResourceId>) -> Self {
        self.release = ReleaseHook(Some(sender));
        self
    }

    /// The backend-native identifier.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// The size of the buffer in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The usages the buffer was created with.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// The debug label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.release.fire(ResourceId::Buffer(self.id));
    }
}

/// A descriptor used to create a [`Texture`].
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The size of the texture in texels.
    pub size: Extent2D,
    /// The pixel format.
    pub format: TextureFormat,
    /// Samples per texel. `1` means the texture is not multisampled.
    pub sample_count: u32,
    /// How the texture may be used.
    pub usage: TextureUsage,
}

/// A shared handle to a GPU texture.
#[derive(Debug)]
pub struct Texture {
    id: TextureId,
    size: Extent2D,
    format: TextureFormat,
    sample_count: u32,
    usage: TextureUsage,
    label: Option<String>,
    release: ReleaseHook,
}

impl Texture {
    /// Wraps the native texture `id` described by `descriptor`.
    pub fn new(id: TextureId, descriptor: &TextureDescriptor<'_>) -> Self {
        Self {
            id,
            size: descriptor.size,
            format: descriptor.format,
            sample_count: descriptor.sample_count.max(1),
            usage: descriptor.usage,
            label: descriptor.label.as_ref().map(|l| l.to_string()),
            release: ReleaseHook::default(),
        }
    }

    /// Attaches the channel notified when the last handle to this texture is dropped.
    pub fn with_release_hook(mut self, sender: flume::Sender<ResourceId>) -> Self {
        self.release = ReleaseHook(Some(sender));
        self
    }

    /// The backend-native identifier.
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// The size of the texture in texels.
    pub fn size(&self) -> Extent2D {
        self.size
    }

    /// The pixel format.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Samples per texel.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Returns `true` if the texture has more than one sample per texel.
    pub fn is_multisampled(&self) -> bool {
        self.sample_count > 1
    }

    /// The usages the texture was created with.
    pub fn usage(&self) -> TextureUsage {
        self.usage
    }

    /// The debug label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.release.fire(ResourceId::Texture(self.id));
    }
}

/// A shared handle to a compiled graphics pipeline.
#[derive(Debug)]
pub struct GraphicsPipeline {
    id: RenderPipelineId,
    label: Option<String>,
    release: ReleaseHook,
}

impl GraphicsPipeline {
    /// Wraps the native pipeline `id`.
    pub fn new(id: RenderPipelineId, label: Option<&str>) -> Self {
        Self {
            id,
            label: label.map(str::to_owned),
            release: ReleaseHook::default(),
        }
    }

    /// Attaches the channel notified when the last handle to this pipeline is dropped.
    pub fn with_release_hook(mut self, sender: flume::Sender<ResourceId>) -> Self {
        self.release = ReleaseHook(Some(sender));
        self
    }

    /// The backend-native identifier.
    pub fn id(&self) -> RenderPipelineId {
        self.id
    }

    /// The debug label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl Drop for GraphicsPipeline {
    fn drop(&mut self) {
        self.release.fire(ResourceId::GraphicsPipeline(self.id));
    }
}
