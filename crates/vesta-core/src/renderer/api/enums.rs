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

//! Generic rendering enums.

/// A logical binding point for shader-visible constant data.
///
/// Uniforms are bound by slot rather than by arbitrary index, so every backend can
/// assign one fixed binding point per slot and keep pipeline layouts compatible
/// across draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformSlot {
    /// Uniforms defined and consumed by the geometry (render step) stage of the pipeline.
    RenderStep,
    /// Uniforms defined and consumed by the paint/material stage of the pipeline.
    Paint,
}

impl UniformSlot {
    /// Every slot, in binding order.
    pub const ALL: [UniformSlot; 2] = [UniformSlot::RenderStep, UniformSlot::Paint];

    /// The fixed binding index a backend uses for this slot.
    pub const fn binding_index(self) -> u32 {
        match self {
            UniformSlot::RenderStep => 0,
            UniformSlot::Paint => 1,
        }
    }
}

/// Defines how the vertices of a draw call are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Every three vertices form an isolated triangle.
    Triangles,
    /// Vertices form a connected triangle strip.
    TriangleStrip,
    /// Every vertex is rendered as an isolated point.
    Points,
}

/// Defines the memory format of pixels in a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// One 8-bit unsigned normalized component.
    R8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA).
    Rgba8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA) in the sRGB color space.
    Rgba8UnormSrgb,
    /// Four 8-bit unsigned normalized components (BGRA). A common swapchain format.
    Bgra8Unorm,
    /// Four 16-bit float components.
    Rgba16Float,
    /// An 8-bit stencil-only format.
    Stencil8,
    /// A 16-bit unsigned normalized depth format.
    Depth16Unorm,
    /// A 32-bit float depth format.
    Depth32Float,
    /// A 24-bit depth format with an 8-bit stencil component.
    Depth24PlusStencil8,
    /// A 32-bit float depth format with an 8-bit stencil component.
    Depth32FloatStencil8,
}

impl TextureFormat {
    /// Returns the size in bytes of a single texel when copied out of the texture.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8Unorm | TextureFormat::Stencil8 => 1,
            TextureFormat::Depth16Unorm => 2,
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm
            | TextureFormat::Depth32Float
            | TextureFormat::Depth24PlusStencil8 => 4,
            TextureFormat::Rgba16Float | TextureFormat::Depth32FloatStencil8 => 8,
        }
    }

    /// Returns `true` for formats with a depth aspect.
    pub fn has_depth_aspect(&self) -> bool {
        matches!(
            self,
            TextureFormat::Depth16Unorm
                | TextureFormat::Depth32Float
                | TextureFormat::Depth24PlusStencil8
                | TextureFormat::Depth32FloatStencil8
        )
    }

    /// Returns `true` for formats with a stencil aspect.
    pub fn has_stencil_aspect(&self) -> bool {
        matches!(
            self,
            TextureFormat::Stencil8
                | TextureFormat::Depth24PlusStencil8
                | TextureFormat::Depth32FloatStencil8
        )
    }

    /// Returns `true` if the format can back a depth/stencil attachment.
    pub fn is_depth_stencil(&self) -> bool {
        self.has_depth_aspect() || self.has_stencil_aspect()
    }

    /// Returns `true` if the format packs both a depth and a stencil aspect.
    ///
    /// Such textures have no single texel layout and cannot be copied as a whole.
    pub fn is_combined_depth_stencil(&self) -> bool {
        self.has_depth_aspect() && self.has_stencil_aspect()
    }
}
