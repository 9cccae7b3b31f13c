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

//! The render pass state machine of a command buffer.

use crate::renderer::api::{RenderPassDesc, StoreOp, TextureId};
use crate::renderer::error::ProtocolViolation;
use smallvec::SmallVec;

/// What the active render pass permits, and what it leaves behind when it ends.
#[derive(Debug)]
pub struct ActivePass {
    has_stencil: bool,
    pub(crate) pipeline_bound: bool,
    pub(crate) index_buffer_bound: bool,
    store_ops: SmallVec<[(TextureId, StoreOp); 3]>,
}

impl ActivePass {
    pub(crate) fn new(desc: &RenderPassDesc) -> Self {
        Self {
            has_stencil: desc.has_stencil(),
            pipeline_bound: false,
            index_buffer_bound: false,
            store_ops: desc
                .attachments()
                .map(|a| (a.texture.id(), a.store))
                .collect(),
        }
    }

    /// Returns `true` if the pass has an attachment with a stencil aspect.
    pub fn has_stencil(&self) -> bool {
        self.has_stencil
    }

    /// The store operation of every attachment, in descriptor order.
    pub fn store_ops(&self) -> &[(TextureId, StoreOp)] {
        &self.store_ops
    }
}

/// The recording state of a command buffer.
///
/// `Idle` and `InRenderPass` alternate through [`begin`](Self::begin) and
/// [`end`](Self::end). Any violation moves the buffer to `Invalid`, which is
/// terminal.
#[derive(Debug, Default)]
pub enum PassState {
    /// No render pass is active. Copies are allowed.
    #[default]
    Idle,
    /// A render pass is active. Binding, dynamic state and draws are allowed.
    InRenderPass(ActivePass),
    /// A protocol violation occurred. Nothing is allowed.
    Invalid,
}

impl PassState {
    /// `Idle -> InRenderPass`.
    pub(crate) fn begin(&mut self, pass: ActivePass) -> Result<(), ProtocolViolation> {
        match self {
            PassState::Idle => {
                *self = PassState::InRenderPass(pass);
                Ok(())
            }
            PassState::InRenderPass(_) => Err(ProtocolViolation::NestedRenderPass),
            PassState::Invalid => Err(ProtocolViolation::Invalidated {
                operation: "begin_render_pass",
            }),
        }
    }

    /// `InRenderPass -> Idle`, handing back what the pass recorded.
    pub(crate) fn end(&mut self) -> Result<ActivePass, ProtocolViolation> {
        match std::mem::take(self) {
            PassState::InRenderPass(pass) => Ok(pass),
            PassState::Idle => Err(ProtocolViolation::OutsideRenderPass {
                operation: "end_render_pass",
            }),
            PassState::Invalid => {
                *self = PassState::Invalid;
                Err(ProtocolViolation::Invalidated {
                    operation: "end_render_pass",
                })
            }
        }
    }

    /// Checks that a render pass may begin.
    pub(crate) fn check_can_begin(&self) -> Result<(), ProtocolViolation> {
        match self {
            PassState::Idle => Ok(()),
            PassState::InRenderPass(_) => Err(ProtocolViolation::NestedRenderPass),
            PassState::Invalid => Err(ProtocolViolation::Invalidated {
                operation: "begin_render_pass",
            }),
        }
    }

    /// Checks that a render-pass-scoped `operation` may run.
    pub(crate) fn check_in_pass(&self, operation: &'static str) -> Result<&ActivePass, ProtocolViolation> {
        match self {
            PassState::InRenderPass(pass) => Ok(pass),
            PassState::Idle => Err(ProtocolViolation::OutsideRenderPass { operation }),
            PassState::Invalid => Err(ProtocolViolation::Invalidated { operation }),
        }
    }

    /// Checks that a render-pass-exclusive `operation` may run.
    pub(crate) fn check_idle(&self, operation: &'static str) -> Result<(), ProtocolViolation> {
        match self {
            PassState::Idle => Ok(()),
            PassState::InRenderPass(_) => Err(ProtocolViolation::InsideRenderPass { operation }),
            PassState::Invalid => Err(ProtocolViolation::Invalidated { operation }),
        }
    }

    pub(crate) fn active_mut(&mut self) -> Option<&mut ActivePass> {
        match self {
            PassState::InRenderPass(pass) => Some(pass),
            _ => None,
        }
    }

    /// A short name for log output.
    pub fn name(&self) -> &'static str {
        match self {
            PassState::Idle => "Idle",
            PassState::InRenderPass(_) => "InRenderPass",
            PassState::Invalid => "Invalid",
        }
    }
}
