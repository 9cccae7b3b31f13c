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

//! Dynamic state set inside a render pass.

use crate::renderer::api::resource::{Buffer, BufferId};
use std::sync::Arc;

/// The viewport transform and depth range for subsequent draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge, in pixels.
    pub x: f32,
    /// Top edge, in pixels.
    pub y: f32,
    /// Width, in pixels.
    pub width: f32,
    /// Height, in pixels.
    pub height: f32,
    /// Near end of the depth range.
    pub min_depth: f32,
    /// Far end of the depth range.
    pub max_depth: f32,
}

impl Viewport {
    /// A viewport with the full `0.0..=1.0` depth range.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Replaces the depth range.
    pub const fn with_depth_range(mut self, min_depth: f32, max_depth: f32) -> Self {
        self.min_depth = min_depth;
        self.max_depth = max_depth;
        self
    }

    /// Returns `true` if `0 <= min_depth <= max_depth <= 1` and the size is not negative.
    pub fn is_valid(&self) -> bool {
        self.width >= 0.0
            && self.height >= 0.0
            && (0.0..=1.0).contains(&self.min_depth)
            && (0.0..=1.0).contains(&self.max_depth)
            && self.min_depth <= self.max_depth
    }
}

/// A buffer bound as a vertex or instance stream, starting at a byte offset.
#[derive(Debug, Clone)]
pub struct VertexBinding {
    /// The bound buffer.
    pub buffer: Arc<Buffer>,
    /// Offset in bytes of the first element.
    pub offset: u64,
}

impl VertexBinding {
    /// Binds `buffer` starting at `offset` bytes.
    pub fn new(buffer: Arc<Buffer>, offset: u64) -> Self {
        Self { buffer, offset }
    }

    /// The resolved form handed to a backend.
    pub fn to_native(&self) -> NativeVertexBinding {
        NativeVertexBinding {
            buffer: self.buffer.id(),
            offset: self.offset,
        }
    }
}

/// A vertex stream binding resolved to a native identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeVertexBinding {
    /// The native buffer.
    pub buffer: BufferId,
    /// Offset in bytes of the first element.
    pub offset: u64,
}
