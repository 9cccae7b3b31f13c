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
//! Integer extents, origins and rectangles.
//!
//! These use `u32` components and describe pixel regions: texture sizes,
//! scissor rectangles and copy sources.

/// A two-dimensional extent, typically a texture size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    /// The width component of the extent.
    pub width: u32,
    /// The height component of the extent.
    pub height: u32,
}

impl Extent2D {
    /// Creates a new extent.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A two-dimensional origin, the top-left corner of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Origin2D {
    /// The x-coordinate of the origin.
    pub x: u32,
    /// The y-coordinate of the origin.
    pub y: u32,
}

/// An axis-aligned pixel rectangle, given as an origin and an extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect2D {
    /// The top-left corner.
    pub origin: Origin2D,
    /// The size of the rectangle.
    pub extent: Extent2D,
}

impl Rect2D {
    /// Creates a rectangle from its left, top, width and height.
    pub const fn from_xywh(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            origin: Origin2D { x, y },
            extent: Extent2D { width, height },
        }
    }

    /// The exclusive right edge. Saturates instead of overflowing.
    pub fn right(&self) -> u32 {
        self.origin.x.saturating_add(self.extent.width)
    }

    /// The exclusive bottom edge. Saturates instead of overflowing.
    pub fn bottom(&self) -> u32 {
        self.origin.y.saturating_add(self.extent.height)
    }

    /// Returns `true` if the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.extent.width == 0 || self.extent.height == 0
    }

    /// Returns `true` if the rectangle lies entirely within `bounds`, anchored at the origin.
    ///
    /// A rectangle whose edges overflow `u32` never fits.
    pub fn fits_within(&self, bounds: Extent2D) -> bool {
        let right = self.origin.x.checked_add(self.extent.width);
        let bottom = self.origin.y.checked_add(self.extent.height);
        matches!(
            (right, bottom),
            (Some(right), Some(bottom)) if right <= bounds.width && bottom <= bounds.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let rect = Rect2D::from_xywh(2, 3, 10, 20);
        assert_eq!(rect.right(), 12);
        assert_eq!(rect.bottom(), 23);
        assert!(!rect.is_empty());
    }

    #[test]
    fn rect_containment() {
        let bounds = Extent2D::new(64, 32);
        assert!(Rect2D::from_xywh(0, 0, 64, 32).fits_within(bounds));
        assert!(!Rect2D::from_xywh(1, 0, 64, 32).fits_within(bounds));
        assert!(!Rect2D::from_xywh(0, 0, 8, 33).fits_within(bounds));
        assert!(!Rect2D::from_xywh(u32::MAX, 0, 1, 1).fits_within(bounds));
    }

    #[test]
    fn overflowing_rect_never_fits() {
        let unbounded = Extent2D::new(u32::MAX, u32::MAX);
        assert!(!Rect2D::from_xywh(u32::MAX, 0, 5, 1).fits_within(unbounded));
        assert!(!Rect2D::from_xywh(0, u32::MAX - 1, 1, 2).fits_within(unbounded));
        assert!(Rect2D::from_xywh(u32::MAX - 5, 0, 5, 1).fits_within(unbounded));
    }
}
