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

//! Command recording.
//!
//! A [`CommandBuffer`] validates each recorded operation against the render pass
//! protocol, keeps the referenced resources alive and forwards the operation to
//! its backend encoder. [`RenderPassEncoder`] is the scoped view of one pass.

mod buffer;
mod render_pass;
pub mod state;
pub mod tracker;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::buffer::CommandBuffer;
pub use self::render_pass::RenderPassEncoder;
pub use self::state::{ActivePass, PassState};
pub use self::tracker::{ResourceTracker, TrackedResource, INITIAL_TRACKED_RESOURCES};

use crate::renderer::error::ProtocolViolation;

/// The result of recording one operation.
pub type RecordResult<T = ()> = Result<T, ProtocolViolation>;
