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

//! Integration tests for submission, completion and deferred release.

use anyhow::Result;
use std::sync::Arc;
use vesta_core::math::Extent2D;
use vesta_core::renderer::api::{
    AttachmentDesc, BufferDescriptor, BufferUsage, LoadOp, PrimitiveType, RenderPassDesc,
    ResourceId, StoreOp, Texture, TextureDescriptor, TextureFormat, TextureUsage, VertexBinding,
};
use vesta_core::renderer::{CommandBuffer, RecorderSettings, RenderError};
use vesta_infra::{QueueSettings, SubmissionQueue, TraceDevice, TraceEncoder};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn swapchain_image(device: &TraceDevice) -> Arc<Texture> {
    device.create_texture(&TextureDescriptor {
        label: Some("swapchain".into()),
        size: Extent2D::new(64, 64),
        format: TextureFormat::Bgra8Unorm,
        sample_count: 1,
        usage: TextureUsage::RENDER_ATTACHMENT,
    })
}

/// Records a cleared pass with one triangle. Returns the buffer and the ids it references.
fn record_frame(device: &TraceDevice, label: &str) -> Result<(CommandBuffer, Vec<ResourceId>)> {
    let target = swapchain_image(device);
    let pipeline = device.create_graphics_pipeline(Some("flat"));
    let vertices = device.create_buffer(&BufferDescriptor {
        label: Some("triangle".into()),
        size: 48,
        usage: BufferUsage::VERTEX,
    });
    let ids = vec![
        ResourceId::Texture(target.id()),
        ResourceId::GraphicsPipeline(pipeline.id()),
        ResourceId::Buffer(vertices.id()),
    ];

    let mut cb = device.create_command_buffer(RecorderSettings::reporting().with_label(label));
    let mut pass = cb.render_pass(&RenderPassDesc::new(AttachmentDesc::new(
        target,
        LoadOp::Clear,
        StoreOp::Store,
    )))?;
    pass.bind_graphics_pipeline(pipeline)?;
    pass.bind_vertex_buffers(Some(VertexBinding::new(vertices, 0)), None)?;
    pass.draw(PrimitiveType::Triangles, 0, 3)?;
    pass.end()?;
    Ok((cb, ids))
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_resources_live_until_completion() -> Result<()> {
    init_logger();
    let device = TraceDevice::new();
    let mut queue = SubmissionQueue::default();
    let signal = queue.completion_signal();

    let (cb, ids) = record_frame(&device, "frame 0")?;
    let index = queue.submit(cb)?.expect("frame has work");

    let sealed = queue
        .get(index)
        .and_then(|cb| cb.backend().as_any().downcast_ref::<TraceEncoder>())
        .map(TraceEncoder::is_sealed);
    assert_eq!(sealed, Some(true));

    // The caller dropped every handle, the queue still holds them.
    assert!(device.collect_released().is_empty());
    for id in &ids {
        assert!(device.is_live(*id));
    }

    std::thread::spawn(move || signal.signal(index))
        .join()
        .expect("signal thread");
    assert_eq!(queue.poll(), 1);
    assert_eq!(queue.last_completed(), Some(index));

    let released = device.collect_released();
    assert_eq!(released.len(), ids.len());
    assert!(device.live_resources().is_empty());
    Ok(())
}

#[test]
fn test_completion_retires_earlier_submissions() -> Result<()> {
    init_logger();
    let device = TraceDevice::new();
    let mut queue = SubmissionQueue::new(QueueSettings { max_in_flight: 2 });
    let signal = queue.completion_signal();

    let mut indices = Vec::new();
    for frame in 0..4 {
        let (cb, _) = record_frame(&device, &format!("frame {frame}"))?;
        indices.push(queue.submit(cb)?.expect("frame has work"));
    }
    assert_eq!(queue.in_flight(), 4);

    signal.signal(indices[2]);
    assert_eq!(queue.poll(), 3);
    assert_eq!(queue.in_flight(), 1);
    assert_eq!(device.collect_released().len(), 9);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Rejected submissions
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_buffer_is_skipped_and_released() -> Result<()> {
    init_logger();
    let device = TraceDevice::new();
    let mut queue = SubmissionQueue::default();

    let target = swapchain_image(&device);
    let target_id = ResourceId::Texture(target.id());
    let mut cb = device.create_command_buffer(RecorderSettings::reporting());
    cb.begin_render_pass(&RenderPassDesc::new(AttachmentDesc::new(
        target,
        LoadOp::Load,
        StoreOp::Store,
    )))?;
    cb.end_render_pass()?;

    assert_eq!(queue.submit(cb)?, None);
    assert_eq!(queue.in_flight(), 0);
    assert_eq!(device.collect_released(), vec![target_id]);
    Ok(())
}

#[test]
fn test_invalid_buffer_cannot_be_submitted() {
    init_logger();
    let device = TraceDevice::new();
    let mut queue = SubmissionQueue::default();

    let mut cb = device.create_command_buffer(RecorderSettings::reporting());
    assert!(cb.draw(PrimitiveType::Triangles, 0, 3).is_err());
    assert!(matches!(
        queue.submit(cb),
        Err(RenderError::InvalidCommandBuffer)
    ));
    assert_eq!(queue.in_flight(), 0);
}

#[test]
fn test_open_render_pass_cannot_be_submitted() -> Result<()> {
    init_logger();
    let device = TraceDevice::new();
    let mut queue = SubmissionQueue::default();

    let target = swapchain_image(&device);
    let mut cb = device.create_command_buffer(RecorderSettings::reporting());
    cb.begin_render_pass(&RenderPassDesc::new(AttachmentDesc::new(
        target,
        LoadOp::Clear,
        StoreOp::Store,
    )))?;

    assert!(matches!(
        queue.submit(cb),
        Err(RenderError::UnterminatedRenderPass)
    ));
    // The rejected buffer was dropped with its references.
    assert_eq!(device.collect_released().len(), 1);
    Ok(())
}

#[test]
fn test_device_loss_is_propagated() -> Result<()> {
    init_logger();
    let device = TraceDevice::new();
    let mut queue = SubmissionQueue::default();

    let (before, _) = record_frame(&device, "before loss")?;
    queue.submit(before)?;

    let (after, _) = record_frame(&device, "after loss")?;
    device.lose_device();
    let err = queue.submit(after).unwrap_err();
    assert!(matches!(err, RenderError::DeviceLost));
    assert_eq!(queue.in_flight(), 1);

    // No completion will arrive on a lost device.
    assert_eq!(queue.retire_all(), 1);
    device.collect_released();
    assert!(device.live_resources().is_empty());
    Ok(())
}
