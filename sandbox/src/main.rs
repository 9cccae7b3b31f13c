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

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use std::sync::Arc;
use vesta_core::math::{Extent2D, LinearRgba, Rect2D};
use vesta_core::renderer::api::{
    AttachmentDesc, Buffer, BufferDescriptor, BufferUsage, GraphicsPipeline, LoadOp,
    PrimitiveType, RenderPassDesc, StoreOp, Texture, TextureDescriptor, TextureFormat, TextureUsage,
    UniformSlot, VertexBinding, Viewport,
};
use vesta_core::renderer::{CommandBuffer, RecorderSettings};
use vesta_infra::{QueueSettings, SubmissionQueue, TraceDevice, TraceEncoder};

const FRAME_SIZE: Extent2D = Extent2D {
    width: 320,
    height: 240,
};

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Vertex {
    position: [f32; 2],
    color: [f32; 4],
}

const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [0.0, 0.5],
        color: [1.0, 0.0, 0.0, 1.0],
    },
    Vertex {
        position: [-0.5, -0.5],
        color: [0.0, 1.0, 0.0, 1.0],
    },
    Vertex {
        position: [0.5, -0.5],
        color: [0.0, 0.0, 1.0, 1.0],
    },
];

const INDICES: [u16; 3] = [0, 1, 2];

/// The resources one frame draws with.
struct Scene {
    msaa_color: Arc<Texture>,
    resolved: Arc<Texture>,
    depth: Arc<Texture>,
    vertices: Arc<Buffer>,
    indices: Arc<Buffer>,
    uniforms: Arc<Buffer>,
    readback: Arc<Buffer>,
}

impl Scene {
    fn new(device: &TraceDevice) -> Self {
        let attachment = |label: &'static str,
                          format: TextureFormat,
                          sample_count: u32,
                          usage: TextureUsage| {
            device.create_texture(&TextureDescriptor {
                label: Some(label.into()),
                size: FRAME_SIZE,
                format,
                sample_count,
                usage,
            })
        };
        let buffer = |label: &'static str, size: usize, usage: BufferUsage| {
            device.create_buffer(&BufferDescriptor {
                label: Some(label.into()),
                size: size as u64,
                usage,
            })
        };

        let row_bytes =
            FRAME_SIZE.width as usize * TextureFormat::Rgba8Unorm.bytes_per_pixel() as usize;
        Self {
            msaa_color: attachment(
                "msaa color",
                TextureFormat::Rgba8Unorm,
                4,
                TextureUsage::RENDER_ATTACHMENT,
            ),
            resolved: attachment(
                "resolved",
                TextureFormat::Rgba8Unorm,
                1,
                TextureUsage::RENDER_ATTACHMENT | TextureUsage::COPY_SRC,
            ),
            depth: attachment(
                "depth",
                TextureFormat::Depth24PlusStencil8,
                4,
                TextureUsage::RENDER_ATTACHMENT,
            ),
            vertices: buffer(
                "triangle vertices",
                bytemuck::cast_slice::<Vertex, u8>(&TRIANGLE).len(),
                BufferUsage::VERTEX | BufferUsage::COPY_DST,
            ),
            indices: buffer(
                "triangle indices",
                bytemuck::cast_slice::<u16, u8>(&INDICES).len(),
                BufferUsage::INDEX | BufferUsage::COPY_DST,
            ),
            uniforms: buffer("uniforms", 256, BufferUsage::UNIFORM),
            readback: buffer(
                "readback",
                row_bytes * FRAME_SIZE.height as usize,
                BufferUsage::COPY_DST,
            ),
        }
    }

    fn record(&self, cb: &mut CommandBuffer, pipeline: Arc<GraphicsPipeline>) -> Result<()> {
        let desc = RenderPassDesc::new(AttachmentDesc::new(
            Arc::clone(&self.msaa_color),
            LoadOp::Clear,
            StoreOp::Discard,
        ))
        .with_resolve(AttachmentDesc::new(
            Arc::clone(&self.resolved),
            LoadOp::DontCare,
            StoreOp::Store,
        ))
        .with_depth_stencil(
            AttachmentDesc::new(Arc::clone(&self.depth), LoadOp::Clear, StoreOp::Discard),
            1.0,
            0,
        )
        .with_clear_color(LinearRgba::rgb(0.05, 0.05, 0.1));

        let mut pass = cb.render_pass(&desc)?;
        pass.set_viewport(Viewport::new(
            0.0,
            0.0,
            FRAME_SIZE.width as f32,
            FRAME_SIZE.height as f32,
        ))?;
        pass.set_scissor(Rect2D::from_xywh(0, 0, FRAME_SIZE.width, FRAME_SIZE.height))?;
        pass.set_stencil_reference(1)?;
        pass.bind_graphics_pipeline(pipeline)?;
        pass.bind_uniform_buffer(UniformSlot::RenderStep, Arc::clone(&self.uniforms), 0)?;
        let vertices = VertexBinding::new(Arc::clone(&self.vertices), 0);
        pass.bind_vertex_buffers(Some(vertices), None)?;
        pass.bind_index_buffer(Arc::clone(&self.indices), 0)?;
        pass.draw_indexed(PrimitiveType::Triangles, 0, INDICES.len() as u32, 0)?;
        pass.end()?;

        let row_bytes =
            u64::from(FRAME_SIZE.width) * u64::from(self.resolved.format().bytes_per_pixel());
        cb.copy_texture_to_buffer(
            Arc::clone(&self.resolved),
            Rect2D::from_xywh(0, 0, FRAME_SIZE.width, FRAME_SIZE.height),
            Arc::clone(&self.readback),
            0,
            row_bytes,
        )?;
        Ok(())
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("debug")).init();

    let device = TraceDevice::new();
    let mut queue = SubmissionQueue::new(QueueSettings::default());
    let completion = queue.completion_signal();

    let scene = Scene::new(&device);
    let pipeline = device.create_graphics_pipeline(Some("vertex color"));

    let mut cb = device.create_command_buffer(RecorderSettings::default().with_label("frame 0"));
    scene.record(&mut cb, pipeline)?;

    if let Some(encoder) = cb.backend().as_any().downcast_ref::<TraceEncoder>() {
        for (i, command) in encoder.commands().iter().enumerate() {
            log::info!("{i:>3}: {command:?}");
        }
    }
    log::info!(
        "Recorded {} tracked resources",
        cb.tracked_resources().len()
    );

    let index = queue
        .submit(cb)?
        .context("the frame recorded no work")?;

    // Stands in for the GPU reporting the frame as finished.
    completion.signal(index);
    let retired = queue.poll();
    log::info!(
        "Retired {retired} submission(s), last completed {:?}",
        queue.last_completed()
    );

    drop(scene);
    let destroyed = device.collect_released();
    log::info!(
        "Destroyed {} resources, {} still live",
        destroyed.len(),
        device.live_resources().len()
    );
    Ok(())
}
