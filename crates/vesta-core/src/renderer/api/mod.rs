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
//! Backend-agnostic recording API types.
//!
//! - **[`resource`]**: shared handles to buffers, textures and pipelines.
//! - **[`pass`]**: render pass and attachment descriptors.
//! - **[`state`]**: dynamic state and vertex stream bindings.
//! - **[`enums`]**: formats, primitive types and uniform slots.

pub mod enums;
pub mod pass;
pub mod resource;
pub mod state;

pub use self::enums::{PrimitiveType, TextureFormat, UniformSlot};
pub use self::pass::{
    AttachmentDesc, LoadOp, NativeAttachment, NativeRenderPass, RenderPassDesc, StoreOp,
};
pub use self::resource::{
    Buffer, BufferDescriptor, BufferId, BufferUsage, GraphicsPipeline, RenderPipelineId,
    ResourceId, Texture, TextureDescriptor, TextureId, TextureUsage,
};
pub use self::state::{NativeVertexBinding, VertexBinding, Viewport};
