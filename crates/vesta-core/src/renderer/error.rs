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

//! Defines the error types for command recording and submission.
//!
//! Two families exist. A [`ProtocolViolation`] is a caller bug detected while
//! recording: the command buffer that saw it is invalid from then on and must be
//! discarded. A [`RenderError`] is reported by a backend or by the submission
//! collaborator and is propagated upward as-is.

use crate::renderer::api::resource::{BufferId, BufferUsage, TextureId, TextureUsage};
use std::fmt;

/// A violation of the command recording protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolViolation {
    /// A render pass was begun while another one was still active.
    NestedRenderPass,
    /// A render-pass-scoped operation was issued with no active render pass.
    OutsideRenderPass {
        /// The rejected operation.
        operation: &'static str,
    },
    /// A render-pass-exclusive operation was issued inside a render pass.
    InsideRenderPass {
        /// The rejected operation.
        operation: &'static str,
    },
    /// The command buffer already saw a violation and accepts no more commands.
    Invalidated {
        /// The rejected operation.
        operation: &'static str,
    },
    /// A buffer was used in a way its creation flags do not allow.
    MissingBufferUsage {
        /// The offending buffer.
        buffer: BufferId,
        /// The usage the operation needs.
        required: BufferUsage,
    },
    /// A texture was used in a way its creation flags do not allow.
    MissingTextureUsage {
        /// The offending texture.
        texture: TextureId,
        /// The usage the operation needs.
        required: TextureUsage,
    },
    /// A render pass attachment does not fit its role.
    InvalidAttachment {
        /// The offending attachment texture.
        texture: TextureId,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// Stencil state was set in a pass without a stencil-capable attachment.
    StencilWithoutAttachment,
    /// A draw was issued before any graphics pipeline was bound in the pass.
    NoPipelineBound {
        /// The rejected operation.
        operation: &'static str,
    },
    /// An indexed draw was issued before any index buffer was bound in the pass.
    NoIndexBufferBound {
        /// The rejected operation.
        operation: &'static str,
    },
    /// The viewport depth range or size is out of bounds.
    InvalidViewport {
        /// The requested near depth.
        min_depth: f32,
        /// The requested far depth.
        max_depth: f32,
    },
    /// A texture whose contents were discarded by an earlier pass was read back.
    UndefinedContents {
        /// The texture with undefined contents.
        texture: TextureId,
    },
    /// A copy reads or writes outside of its source or destination.
    CopyOutOfBounds(String),
    /// A texture cannot be the source of a texel copy.
    UncopyableTexture {
        /// The offending texture.
        texture: TextureId,
        /// What makes it uncopyable.
        reason: &'static str,
    },
}

impl fmt::Display for ProtocolViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolViolation::NestedRenderPass => {
                write!(f, "A render pass was begun while another render pass is active")
            }
            ProtocolViolation::OutsideRenderPass { operation } => {
                write!(f, "'{operation}' requires an active render pass")
            }
            ProtocolViolation::InsideRenderPass { operation } => {
                write!(f, "'{operation}' is not allowed inside a render pass")
            }
            ProtocolViolation::Invalidated { operation } => {
                write!(
                    f,
                    "'{operation}' rejected: the command buffer is invalid and must be discarded"
                )
            }
            ProtocolViolation::MissingBufferUsage { buffer, required } => {
                write!(f, "Buffer {buffer:?} lacks required usage {required:?}")
            }
            ProtocolViolation::MissingTextureUsage { texture, required } => {
                write!(f, "Texture {texture:?} lacks required usage {required:?}")
            }
            ProtocolViolation::InvalidAttachment { texture, reason } => {
                write!(f, "Invalid attachment {texture:?}: {reason}")
            }
            ProtocolViolation::StencilWithoutAttachment => write!(
                f,
                "Stencil state set in a render pass without a stencil attachment"
            ),
            ProtocolViolation::NoPipelineBound { operation } => {
                write!(f, "'{operation}' issued before a graphics pipeline was bound")
            }
            ProtocolViolation::NoIndexBufferBound { operation } => {
                write!(f, "'{operation}' issued before an index buffer was bound")
            }
            ProtocolViolation::InvalidViewport {
                min_depth,
                max_depth,
            } => {
                write!(
                    f,
                    "Invalid viewport depth range [{min_depth}, {max_depth}] or negative size"
                )
            }
            ProtocolViolation::UndefinedContents { texture } => {
                write!(
                    f,
                    "Texture {texture:?} is read after its contents were discarded"
                )
            }
            ProtocolViolation::CopyOutOfBounds(msg) => write!(f, "Copy out of bounds: {msg}"),
            ProtocolViolation::UncopyableTexture { texture, reason } => {
                write!(f, "Texture {texture:?} cannot be copied: {reason}")
            }
        }
    }
}

impl std::error::Error for ProtocolViolation {}

/// An error reported by a backend encoder or the submission collaborator.
#[derive(Debug)]
pub enum RenderError {
    /// The graphics device was lost. The device and everything recorded for it
    /// must be recreated.
    DeviceLost,
    /// The device ran out of memory while accepting the work.
    OutOfMemory,
    /// The queue refused the submission.
    SubmissionFailed(String),
    /// A command buffer that saw a protocol violation was submitted.
    InvalidCommandBuffer,
    /// A command buffer was submitted with a render pass still open.
    UnterminatedRenderPass,
    /// A protocol violation surfaced through an API that reports render errors.
    Protocol(ProtocolViolation),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::DeviceLost => write!(
                f,
                "The graphics device was lost and needs to be reinitialized."
            ),
            RenderError::OutOfMemory => write!(f, "The graphics device ran out of memory."),
            RenderError::SubmissionFailed(msg) => write!(f, "Submission failed: {msg}"),
            RenderError::InvalidCommandBuffer => {
                write!(f, "Cannot submit a command buffer invalidated by a protocol violation.")
            }
            RenderError::UnterminatedRenderPass => {
                write!(f, "Cannot submit a command buffer with an open render pass.")
            }
            RenderError::Protocol(err) => write!(f, "Protocol violation: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProtocolViolation> for RenderError {
    fn from(err: ProtocolViolation) -> Self {
        RenderError::Protocol(err)
    }
}
