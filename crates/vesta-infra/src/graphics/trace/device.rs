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

use super::encoder::TraceEncoder;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use vesta_core::renderer::api::{
    Buffer, BufferDescriptor, BufferId, GraphicsPipeline, RenderPipelineId, ResourceId, Texture,
    TextureDescriptor, TextureId,
};
use vesta_core::renderer::{CommandBuffer, RecorderSettings, RenderError};

/// Hands out resource handles and command buffers backed by [`TraceEncoder`].
///
/// Every handle carries a release hook. When its last reference goes away the
/// id is queued, and [`collect_released`](Self::collect_released) destroys the
/// matching live entry.
#[derive(Debug)]
pub struct TraceDevice {
    next_buffer_id: AtomicU64,
    next_texture_id: AtomicU64,
    next_pipeline_id: AtomicU64,
    release_tx: flume::Sender<ResourceId>,
    release_rx: flume::Receiver<ResourceId>,
    live: Mutex<HashSet<ResourceId>>,
    device_lost: Arc<AtomicBool>,
}

impl Default for TraceDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceDevice {
    /// Creates a device with no live resources.
    pub fn new() -> Self {
        let (release_tx, release_rx) = flume::unbounded();
        Self {
            next_buffer_id: AtomicU64::new(0),
            next_texture_id: AtomicU64::new(0),
            next_pipeline_id: AtomicU64::new(0),
            release_tx,
            release_rx,
            live: Mutex::new(HashSet::new()),
            device_lost: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a buffer.
    pub fn create_buffer(&self, descriptor: &BufferDescriptor<'_>) -> Arc<Buffer> {
        let id = BufferId(self.next_buffer_id.fetch_add(1, Ordering::Relaxed));
        self.register(ResourceId::Buffer(id));
        log::debug!(
            "TraceDevice: created buffer {:?} ({:?}, {} bytes)",
            id,
            descriptor.label,
            descriptor.size
        );
        Arc::new(Buffer::new(id, descriptor).with_release_hook(self.release_tx.clone()))
    }

    /// Creates a texture.
    pub fn create_texture(&self, descriptor: &TextureDescriptor<'_>) -> Arc<Texture> {
        let id = TextureId(self.next_texture_id.fetch_add(1, Ordering::Relaxed));
        self.register(ResourceId::Texture(id));
        log::debug!(
            "TraceDevice: created texture {:?} ({:?}, {:?} {:?})",
            id,
            descriptor.label,
            descriptor.format,
            descriptor.size
        );
        Arc::new(Texture::new(id, descriptor).with_release_hook(self.release_tx.clone()))
    }

    /// Creates a graphics pipeline. Compilation is not modeled.
    pub fn create_graphics_pipeline(&self, label: Option<&str>) -> Arc<GraphicsPipeline> {
        let id = RenderPipelineId(self.next_pipeline_id.fetch_add(1, Ordering::Relaxed));
        self.register(ResourceId::GraphicsPipeline(id));
        log::debug!("TraceDevice: created pipeline {:?} ({:?})", id, label);
        Arc::new(GraphicsPipeline::new(id, label).with_release_hook(self.release_tx.clone()))
    }

    /// Creates an empty command buffer recording into a fresh [`TraceEncoder`].
    pub fn create_command_buffer(&self, settings: RecorderSettings) -> CommandBuffer {
        let encoder = TraceEncoder::attached(Arc::clone(&self.device_lost));
        CommandBuffer::new(Box::new(encoder), settings)
    }

    /// Destroys every resource whose last reference was dropped since the last
    /// call, and returns their ids in release order.
    pub fn collect_released(&self) -> Vec<ResourceId> {
        let released: Vec<ResourceId> = self.release_rx.try_iter().collect();
        if let Ok(mut live) = self.live.lock() {
            for id in &released {
                if !live.remove(id) {
                    log::warn!("TraceDevice: {:?} released twice or never created", id);
                }
            }
        }
        if !released.is_empty() {
            log::debug!("TraceDevice: destroyed {} resources", released.len());
        }
        released
    }

    /// The ids of resources that have not been destroyed yet.
    pub fn live_resources(&self) -> HashSet<ResourceId> {
        self.live
            .lock()
            .map(|live| live.clone())
            .unwrap_or_default()
    }

    /// Returns `true` if `id` has not been destroyed yet.
    pub fn is_live(&self, id: ResourceId) -> bool {
        self.live
            .lock()
            .map(|live| live.contains(&id))
            .unwrap_or(false)
    }

    /// Simulates a lost device. Command buffers created by this device can no
    /// longer be sealed for submission.
    pub fn lose_device(&self) {
        log::error!("TraceDevice: device lost");
        self.device_lost.store(true, Ordering::Release);
    }

    /// Returns `true` after [`lose_device`](Self::lose_device).
    pub fn is_lost(&self) -> bool {
        self.device_lost.load(Ordering::Acquire)
    }

    /// Fails with [`RenderError::DeviceLost`] after [`lose_device`](Self::lose_device).
    pub fn check_device(&self) -> Result<(), RenderError> {
        if self.is_lost() {
            Err(RenderError::DeviceLost)
        } else {
            Ok(())
        }
    }

    fn register(&self, id: ResourceId) {
        if let Ok(mut live) = self.live.lock() {
            live.insert(id);
        }
    }
}
