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

//! Descriptors for render passes and their attachments.
//!
//! These are plain data. They are validated when a pass begins, by the command
//! buffer, never by the descriptor itself.

use crate::math::LinearRgba;
use crate::renderer::api::resource::{Texture, TextureId};
use std::sync::Arc;

/// Describes what happens to an attachment's contents at the start of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOp {
    /// The existing contents are preserved and visible to the pass.
    Load,
    /// The attachment is cleared to the descriptor's clear value.
    Clear,
    /// The previous contents are undefined; the pass must overwrite what it reads.
    DontCare,
}

/// Describes what happens to an attachment's contents at the end of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// The results of the pass are written back to the attachment's memory.
    Store,
    /// The results are discarded, leaving the attachment's contents undefined.
    /// This can be a performance win on tile-based GPUs.
    Discard,
}

/// One attachment of a render pass: the target texture and its load/store behavior.
#[derive(Debug, Clone)]
pub struct AttachmentDesc {
    /// The texture rendered to.
    pub texture: Arc<Texture>,
    /// The operation performed at the beginning of the pass.
    pub load: LoadOp,
    /// The operation performed at the end of the pass.
    pub store: StoreOp,
}

impl AttachmentDesc {
    /// Creates an attachment description.
    pub fn new(texture: Arc<Texture>, load: LoadOp, store: StoreOp) -> Self {
        Self {
            texture,
            load,
            store,
        }
    }

    /// The resolved form of this attachment.
    pub fn to_native(&self) -> NativeAttachment {
        NativeAttachment {
            texture: self.texture.id(),
            load: self.load,
            store: self.store,
        }
    }
}

/// A descriptor for a single render pass.
///
/// The color attachment is always present. The resolve attachment receives the
/// downsampled output of a multisampled color attachment and must be `None`
/// otherwise. The combined depth/stencil attachment is optional; without it the
/// pass permits no stencil state.
#[derive(Debug, Clone)]
pub struct RenderPassDesc {
    /// The color attachment.
    pub color: AttachmentDesc,
    /// The multisample resolve target for [`color`](Self::color).
    pub color_resolve: Option<AttachmentDesc>,
    /// The value the color attachment is cleared to when its load op is [`LoadOp::Clear`].
    pub clear_color: LinearRgba,
    /// The combined depth/stencil attachment.
    pub depth_stencil: Option<AttachmentDesc>,
    /// The stencil clear value.
    pub clear_stencil: u32,
    /// The depth clear value.
    pub clear_depth: f32,
}

impl RenderPassDesc {
    /// A pass rendering to `color` with no resolve or depth/stencil attachment.
    pub fn new(color: AttachmentDesc) -> Self {
        Self {
            color,
            color_resolve: None,
            clear_color: LinearRgba::TRANSPARENT,
            depth_stencil: None,
            clear_stencil: 0,
            clear_depth: 1.0,
        }
    }

    /// Sets the clear color.
    pub fn with_clear_color(mut self, clear_color: LinearRgba) -> Self {
        self.clear_color = clear_color;
        self
    }

    /// Sets the multisample resolve target.
    pub fn with_resolve(mut self, resolve: AttachmentDesc) -> Self {
        self.color_resolve = Some(resolve);
        self
    }

    /// Sets the depth/stencil attachment and its clear values.
    pub fn with_depth_stencil(
        mut self,
        attachment: AttachmentDesc,
        clear_depth: f32,
        clear_stencil: u32,
    ) -> Self {
        self.depth_stencil = Some(attachment);
        self.clear_depth = clear_depth;
        self.clear_stencil = clear_stencil;
        self
    }

    /// Iterates over every present attachment: color, resolve, then depth/stencil.
    pub fn attachments(&self) -> impl Iterator<Item = &AttachmentDesc> {
        std::iter::once(&self.color)
            .chain(self.color_resolve.as_ref())
            .chain(self.depth_stencil.as_ref())
    }

    /// Returns `true` if beginning this pass clears any attachment.
    pub fn has_clear(&self) -> bool {
        self.attachments().any(|a| a.load == LoadOp::Clear)
    }

    /// Returns `true` if the depth/stencil attachment has a stencil aspect.
    pub fn has_stencil(&self) -> bool {
        self.depth_stencil
            .as_ref()
            .is_some_and(|ds| ds.texture.format().has_stencil_aspect())
    }

    /// Resolves the descriptor into native identifiers for a backend.
    pub fn to_native(&self) -> NativeRenderPass {
        NativeRenderPass {
            color: self.color.to_native(),
            color_resolve: self.color_resolve.as_ref().map(AttachmentDesc::to_native),
            clear_color: self.clear_color,
            depth_stencil: self.depth_stencil.as_ref().map(AttachmentDesc::to_native),
            clear_stencil: self.clear_stencil,
            clear_depth: self.clear_depth,
        }
    }
}

/// An attachment as seen by a backend: a native texture identifier and its operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeAttachment {
    /// The native texture.
    pub texture: TextureId,
    /// The load operation.
    pub load: LoadOp,
    /// The store operation.
    pub store: StoreOp,
}

/// A [`RenderPassDesc`] resolved to native identifiers.
///
/// Backends receive this instead of the shared handles; the command buffer keeps
/// the handles alive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeRenderPass {
    /// The color attachment.
    pub color: NativeAttachment,
    /// The multisample resolve target.
    pub color_resolve: Option<NativeAttachment>,
    /// The color clear value.
    pub clear_color: LinearRgba,
    /// The depth/stencil attachment.
    pub depth_stencil: Option<NativeAttachment>,
    /// The stencil clear value.
    pub clear_stencil: u32,
    /// The depth clear value.
    pub clear_depth: f32,
}
