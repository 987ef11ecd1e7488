use crate::color::Rgb;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

#[derive(Clone, Copy, Debug)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgb,
}

pub const fn stop(offset: f32, color: Rgb) -> GradientStop {
    GradientStop { offset, color }
}

/// Quads in canvas pixel space (origin top-left, y down) projected to clip space.
pub struct QuadBatch {
    width: f32,
    height: f32,
    vertices: Vec<OverlayVertex>,
    indices: Vec<u32>,
}

impl QuadBatch {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn clear(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn vertices(&self) -> &[OverlayVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn to_clip(&self, x: f32, y: f32) -> [f32; 2] {
        [x / self.width * 2.0 - 1.0, 1.0 - y / self.height * 2.0]
    }

    pub fn add_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
        let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
        self.push_quad(corners, [color; 4]);
    }

    /// Square of side `size` centered at `(cx, cy)`, turned by `rotation` radians.
    pub fn add_rotated_square(&mut self, cx: f32, cy: f32, size: f32, rotation: f32, color: [f32; 4]) {
        let half = size * 0.5;
        let (sin, cos) = rotation.sin_cos();
        let corner = |dx: f32, dy: f32| (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos);
        let corners = [
            corner(-half, -half),
            corner(half, -half),
            corner(half, half),
            corner(-half, half),
        ];
        self.push_quad(corners, [color; 4]);
    }

    /// Full-canvas vertical gradient, one band per pair of neighbouring stops.
    pub fn add_vertical_gradient(&mut self, stops: &[GradientStop]) {
        for pair in stops.windows(2) {
            let (top, bottom) = (pair[0], pair[1]);
            let y0 = top.offset.clamp(0.0, 1.0) * self.height;
            let y1 = bottom.offset.clamp(0.0, 1.0) * self.height;
            if y1 <= y0 {
                continue;
            }
            let c0 = top.color.with_alpha(1.0);
            let c1 = bottom.color.with_alpha(1.0);
            let corners = [(0.0, y0), (self.width, y0), (self.width, y1), (0.0, y1)];
            self.push_quad(corners, [c0, c0, c1, c1]);
        }
    }

    fn push_quad(&mut self, corners: [(f32, f32); 4], colors: [[f32; 4]; 4]) {
        let base = self.vertices.len() as u32;
        for ((x, y), color) in corners.into_iter().zip(colors) {
            let position = self.to_clip(x, y);
            self.vertices.push(OverlayVertex { position, color });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::hex;

    #[test]
    fn pixel_corners_map_to_clip_corners() {
        let batch = QuadBatch::new(800.0, 600.0);
        assert_eq!(batch.to_clip(0.0, 0.0), [-1.0, 1.0]);
        assert_eq!(batch.to_clip(800.0, 600.0), [1.0, -1.0]);
        assert_eq!(batch.to_clip(400.0, 300.0), [0.0, 0.0]);
    }

    #[test]
    fn rect_emits_two_triangles() {
        let mut batch = QuadBatch::new(100.0, 100.0);
        batch.add_rect(10.0, 10.0, 8.0, 8.0, [1.0; 4]);
        batch.add_rect(20.0, 10.0, 8.0, 8.0, [1.0; 4]);
        assert_eq!(batch.vertices().len(), 8);
        assert_eq!(batch.indices(), &[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn rotated_square_keeps_its_center() {
        let mut batch = QuadBatch::new(200.0, 200.0);
        batch.add_rotated_square(100.0, 100.0, 20.0, 0.7, [1.0; 4]);
        let (sx, sy) = batch
            .vertices()
            .iter()
            .fold((0.0f32, 0.0f32), |(x, y), v| (x + v.position[0], y + v.position[1]));
        assert!(sx.abs() < 1e-5 && sy.abs() < 1e-5);
    }

    #[test]
    fn gradient_emits_one_band_per_segment() {
        let stops = [
            stop(0.0, hex(0x0a0a1a)),
            stop(0.4, hex(0x1a1a3e)),
            stop(0.7, hex(0x2a2a5e)),
            stop(1.0, hex(0x0a0a12)),
        ];
        let mut batch = QuadBatch::new(100.0, 100.0);
        batch.add_vertical_gradient(&stops);
        assert_eq!(batch.indices().len(), 3 * 6);
        assert_eq!(batch.vertices()[0].color, hex(0x0a0a1a).with_alpha(1.0));
        assert_eq!(batch.vertices()[3].color, hex(0x1a1a3e).with_alpha(1.0));
    }
}
