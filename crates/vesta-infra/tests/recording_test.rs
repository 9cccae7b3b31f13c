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

//! Integration tests for command recording through the trace backend.
//!
//! These tests record into command buffers handed out by a `TraceDevice` and
//! inspect the native stream the `TraceEncoder` produced.

use std::sync::Arc;
use vesta_core::math::{Extent2D, LinearRgba, Rect2D};
use vesta_core::renderer::api::{
    AttachmentDesc, Buffer, BufferDescriptor, BufferUsage, GraphicsPipeline, LoadOp,
    PrimitiveType, RenderPassDesc, ResourceId, StoreOp, Texture, TextureDescriptor,
    TextureFormat, TextureUsage, VertexBinding,
};
use vesta_core::renderer::{CommandBuffer, ProtocolViolation, RecorderSettings};
use vesta_infra::{EncodedCommand, TraceDevice, TraceEncoder};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn encoded(cb: &CommandBuffer) -> Vec<EncodedCommand> {
    cb.backend()
        .as_any()
        .downcast_ref::<TraceEncoder>()
        .map(|encoder| encoder.commands().to_vec())
        .unwrap_or_default()
}

fn render_target(device: &TraceDevice) -> Arc<Texture> {
    device.create_texture(&TextureDescriptor {
        label: Some("render target".into()),
        size: Extent2D::new(320, 240),
        format: TextureFormat::Bgra8Unorm,
        sample_count: 1,
        usage: TextureUsage::RENDER_ATTACHMENT | TextureUsage::COPY_SRC,
    })
}

fn vertex_buffer(device: &TraceDevice) -> Arc<Buffer> {
    device.create_buffer(&BufferDescriptor {
        label: Some("triangle".into()),
        size: 3 * 16,
        usage: BufferUsage::VERTEX,
    })
}

fn clear_pass(target: &Arc<Texture>) -> RenderPassDesc {
    RenderPassDesc::new(AttachmentDesc::new(
        Arc::clone(target),
        LoadOp::Clear,
        StoreOp::Store,
    ))
    .with_clear_color(LinearRgba::rgb(0.1, 0.2, 0.3))
}

// ─────────────────────────────────────────────────────────────────────────────
// Recording scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_triangle_is_forwarded_in_order() {
    init_logger();
    let device = TraceDevice::new();
    let target = render_target(&device);
    let pipeline = device.create_graphics_pipeline(Some("flat"));
    let vertices = vertex_buffer(&device);

    let mut cb = device.create_command_buffer(RecorderSettings::reporting());
    cb.begin_render_pass(&clear_pass(&target)).unwrap();
    cb.bind_graphics_pipeline(Arc::clone(&pipeline)).unwrap();
    cb.bind_vertex_buffers(Some(VertexBinding::new(Arc::clone(&vertices), 0)), None)
        .unwrap();
    cb.draw(PrimitiveType::Triangles, 0, 3).unwrap();
    cb.end_render_pass().unwrap();

    let commands = encoded(&cb);
    assert_eq!(commands.len(), 5);
    assert!(matches!(commands[0], EncodedCommand::BeginRenderPass(_)));
    assert_eq!(
        commands[1],
        EncodedCommand::BindGraphicsPipeline(pipeline.id())
    );
    assert!(matches!(
        commands[2],
        EncodedCommand::BindVertexBuffers {
            vertex: Some(binding),
            instance: None,
        } if binding.buffer == vertices.id() && binding.offset == 0
    ));
    assert!(matches!(
        commands[3],
        EncodedCommand::Draw {
            primitive: PrimitiveType::Triangles,
            base_vertex: 0,
            vertex_count: 3,
            ..
        }
    ));
    assert_eq!(commands[4], EncodedCommand::EndRenderPass);
    assert!(cb.has_work());
}

#[test]
fn test_scissor_without_pass_forwards_nothing() {
    init_logger();
    let device = TraceDevice::new();
    let mut cb = device.create_command_buffer(RecorderSettings::reporting());

    let result = cb.set_scissor(Rect2D::from_xywh(0, 0, 16, 16));
    assert!(matches!(
        result,
        Err(ProtocolViolation::OutsideRenderPass { .. })
    ));
    assert!(encoded(&cb).is_empty());
}

#[test]
fn test_copy_inside_pass_is_rejected() {
    init_logger();
    let device = TraceDevice::new();
    let target = render_target(&device);
    let readback = device.create_buffer(&BufferDescriptor {
        label: Some("readback".into()),
        size: 320 * 240 * 4,
        usage: BufferUsage::COPY_DST,
    });

    let mut cb = device.create_command_buffer(RecorderSettings::reporting());
    cb.begin_render_pass(&clear_pass(&target)).unwrap();
    let result = cb.copy_texture_to_buffer(
        Arc::clone(&target),
        Rect2D::from_xywh(0, 0, 320, 240),
        readback,
        0,
        320 * 4,
    );
    assert!(matches!(
        result,
        Err(ProtocolViolation::InsideRenderPass { .. })
    ));
    assert!(cb.is_invalid());
}

#[test]
fn test_every_scoped_call_is_rejected_while_idle() {
    init_logger();
    let device = TraceDevice::new();
    let pipeline = device.create_graphics_pipeline(None);
    let vertices = vertex_buffer(&device);

    type Call<'a> = Box<dyn Fn(&mut CommandBuffer) -> Result<(), ProtocolViolation> + 'a>;
    let calls: Vec<Call<'_>> = vec![
        Box::new(|cb: &mut CommandBuffer| cb.end_render_pass()),
        Box::new(|cb: &mut CommandBuffer| cb.bind_graphics_pipeline(Arc::clone(&pipeline))),
        Box::new(|cb: &mut CommandBuffer| {
            cb.bind_vertex_buffers(Some(VertexBinding::new(Arc::clone(&vertices), 0)), None)
        }),
        Box::new(|cb: &mut CommandBuffer| cb.bind_index_buffer(Arc::clone(&vertices), 0)),
        Box::new(|cb: &mut CommandBuffer| cb.set_scissor(Rect2D::default())),
        Box::new(|cb: &mut CommandBuffer| cb.set_stencil_reference(0)),
        Box::new(|cb: &mut CommandBuffer| cb.set_blend_constants([1.0; 4])),
        Box::new(|cb: &mut CommandBuffer| cb.draw(PrimitiveType::Points, 0, 1)),
        Box::new(|cb: &mut CommandBuffer| cb.draw_indexed(PrimitiveType::Triangles, 0, 3, 0)),
        Box::new(|cb: &mut CommandBuffer| cb.draw_instanced(PrimitiveType::Triangles, 0, 3, 0, 2)),
        Box::new(|cb: &mut CommandBuffer| {
            cb.draw_indexed_instanced(PrimitiveType::Triangles, 0, 3, 0, 0, 2)
        }),
    ];

    for (i, call) in calls.iter().enumerate() {
        let mut cb = device.create_command_buffer(RecorderSettings::reporting());
        let result = call(&mut cb);
        assert!(
            matches!(result, Err(ProtocolViolation::OutsideRenderPass { .. })),
            "call #{i} should be rejected outside a render pass, got {result:?}"
        );
        assert!(encoded(&cb).is_empty(), "call #{i} reached the backend");
        assert!(!cb.has_work());
    }
}

#[test]
fn test_scoped_encoder_closes_the_pass() {
    init_logger();
    let device = TraceDevice::new();
    let target = render_target(&device);
    let mut cb = device.create_command_buffer(RecorderSettings::reporting());

    {
        let mut pass = cb.render_pass(&clear_pass(&target)).unwrap();
        pass.bind_graphics_pipeline(device.create_graphics_pipeline(None))
            .unwrap();
        pass.draw(PrimitiveType::Triangles, 0, 3).unwrap();
    }

    assert!(!cb.is_recording_pass());
    assert_eq!(encoded(&cb).last(), Some(&EncodedCommand::EndRenderPass));
}

#[test]
fn test_pass_without_clear_has_no_work() {
    init_logger();
    let device = TraceDevice::new();
    let target = render_target(&device);

    let mut cb = device.create_command_buffer(RecorderSettings::reporting());
    cb.begin_render_pass(&RenderPassDesc::new(AttachmentDesc::new(
        Arc::clone(&target),
        LoadOp::Load,
        StoreOp::Store,
    )))
    .unwrap();
    cb.end_render_pass().unwrap();
    assert!(!cb.has_work());

    let mut cb = device.create_command_buffer(RecorderSettings::reporting());
    cb.begin_render_pass(&clear_pass(&target)).unwrap();
    cb.end_render_pass().unwrap();
    assert!(cb.has_work());
}

// ─────────────────────────────────────────────────────────────────────────────
// Resource tracking
// ─────────────────────────────────────────────────────────────────────────────

/// Binds `n` distinct pipelines, tears down, and checks that each one is released exactly once.
fn round_trip(n: usize) {
    let device = TraceDevice::new();
    let target = render_target(&device);
    let target_id = ResourceId::Texture(target.id());

    let mut cb = device.create_command_buffer(RecorderSettings::reporting());
    cb.begin_render_pass(&clear_pass(&target)).unwrap();
    drop(target);

    let mut ids = Vec::with_capacity(n);
    for _ in 0..n {
        let pipeline = device.create_graphics_pipeline(None);
        let id = ResourceId::GraphicsPipeline(pipeline.id());
        cb.bind_graphics_pipeline(pipeline).unwrap();
        assert!(cb.is_tracked(id));
        ids.push(id);
    }
    cb.end_render_pass().unwrap();

    // Every handle is held by the command buffer alone.
    assert!(device.collect_released().is_empty());
    assert_eq!(cb.tracked_resources().len(), n + 1);
    assert_eq!(cb.tracked_resources().spilled(), n + 1 > 32);

    assert_eq!(cb.release_resources(), n + 1);
    for id in &ids {
        assert!(!cb.is_tracked(*id));
    }

    let mut released = device.collect_released();
    released.sort_by_key(|id| format!("{id:?}"));
    let mut expected = ids.clone();
    expected.push(target_id);
    expected.sort_by_key(|id| format!("{id:?}"));
    assert_eq!(released, expected, "n = {n}");
    assert!(device.live_resources().is_empty());
}

#[test]
fn test_tracking_round_trip_across_inline_capacity() {
    init_logger();
    for n in [0, 1, 31, 32, 33, 100, 500] {
        round_trip(n);
    }
}

#[test]
fn test_untouched_buffer_teardown_is_a_no_op() {
    let device = TraceDevice::new();
    let mut cb = device.create_command_buffer(RecorderSettings::default());
    assert!(!cb.has_work());
    assert_eq!(cb.release_resources(), 0);
    drop(cb);
    assert!(device.collect_released().is_empty());
}

#[test]
fn test_buffers_on_two_threads_share_a_pipeline() {
    init_logger();
    let device = Arc::new(TraceDevice::new());
    let pipeline: Arc<GraphicsPipeline> = device.create_graphics_pipeline(Some("shared"));

    let handles: Vec<_> = (0..2)
        .map(|worker| {
            let device = Arc::clone(&device);
            let pipeline = Arc::clone(&pipeline);
            std::thread::spawn(move || {
                let target = render_target(&device);
                let mut cb = device.create_command_buffer(
                    RecorderSettings::reporting().with_label(format!("worker {worker}")),
                );
                cb.begin_render_pass(&clear_pass(&target)).unwrap();
                cb.bind_graphics_pipeline(pipeline).unwrap();
                cb.draw(PrimitiveType::Triangles, 0, 3).unwrap();
                cb.end_render_pass().unwrap();
                cb
            })
        })
        .collect();

    let mut buffers: Vec<CommandBuffer> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let pipeline_id = ResourceId::GraphicsPipeline(pipeline.id());
    assert!(buffers.iter().all(|cb| cb.is_tracked(pipeline_id)));

    drop(pipeline);
    for cb in &mut buffers {
        cb.release_resources();
    }
    let released = device.collect_released();
    assert_eq!(
        released.iter().filter(|id| **id == pipeline_id).count(),
        1,
        "the shared pipeline is destroyed exactly once"
    );
}
