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

//! Keeps the resources referenced by a command buffer alive until it retires.

use crate::renderer::api::{Buffer, GraphicsPipeline, ResourceId, Texture};
use smallvec::SmallVec;
use std::sync::Arc;

/// Number of tracked references stored inline before spilling to the heap.
pub const INITIAL_TRACKED_RESOURCES: usize = 32;

/// A shared reference held on behalf of recorded GPU work.
#[derive(Debug, Clone)]
pub enum TrackedResource {
    /// A buffer.
    Buffer(Arc<Buffer>),
    /// A texture.
    Texture(Arc<Texture>),
    /// A graphics pipeline.
    GraphicsPipeline(Arc<GraphicsPipeline>),
}

impl TrackedResource {
    /// The identifier of the referenced resource.
    pub fn id(&self) -> ResourceId {
        match self {
            TrackedResource::Buffer(b) => ResourceId::Buffer(b.id()),
            TrackedResource::Texture(t) => ResourceId::Texture(t.id()),
            TrackedResource::GraphicsPipeline(p) => ResourceId::GraphicsPipeline(p.id()),
        }
    }
}

impl From<Arc<Buffer>> for TrackedResource {
    fn from(buffer: Arc<Buffer>) -> Self {
        TrackedResource::Buffer(buffer)
    }
}

impl From<Arc<Texture>> for TrackedResource {
    fn from(texture: Arc<Texture>) -> Self {
        TrackedResource::Texture(texture)
    }
}

impl From<Arc<GraphicsPipeline>> for TrackedResource {
    fn from(pipeline: Arc<GraphicsPipeline>) -> Self {
        TrackedResource::GraphicsPipeline(pipeline)
    }
}

/// An ordered list of tracked references.
///
/// References are appended as they are recorded, without deduplication, and all
/// dropped together by [`release_all`](Self::release_all).
#[derive(Debug, Default)]
pub struct ResourceTracker {
    resources: SmallVec<[TrackedResource; INITIAL_TRACKED_RESOURCES]>,
}

impl ResourceTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a reference.
    pub fn track(&mut self, resource: impl Into<TrackedResource>) {
        self.resources.push(resource.into());
    }

    /// Number of references held.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Returns `true` if the tracker outgrew its inline storage.
    pub fn spilled(&self) -> bool {
        self.resources.spilled()
    }

    /// Returns `true` if a reference to `id` is held.
    pub fn contains(&self, id: ResourceId) -> bool {
        self.resources.iter().any(|r| r.id() == id)
    }

    /// Iterates over the held references in recording order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedResource> {
        self.resources.iter()
    }

    /// Drops every held reference and returns how many were released.
    pub fn release_all(&mut self) -> usize {
        let released = self.resources.len();
        self.resources.clear();
        released
    }
}
