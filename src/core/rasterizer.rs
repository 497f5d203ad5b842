use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{
    barycentric_coordinates, is_inside_triangle, perspective_correct_barycentric,
};
use crate::core::math::transform::{apply_perspective_division, ndc_to_screen};
use crate::core::math::{Vector2, Vector4};
use crate::core::pipeline::Shader;
use rayon::prelude::*;
use serde::Deserialize;

/// Draws triangles into a [`FrameBuffer`].
pub struct Rasterizer {
    pub cull_mode: CullMode,
}

/// Which faces to discard. Counter-clockwise (seen by the camera) is front.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CullMode {
    #[default]
    Back,
    Front,
    None,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

type ClipVertex<V> = (Vector4, V);

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            cull_mode: CullMode::Back,
        }
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }

    /// Rasterizes one clip-space triangle.
    ///
    /// The triangle is first clipped against the six frustum planes
    /// (Sutherland–Hodgman in homogeneous space) and the resulting convex
    /// polygon is drawn as a fan.
    pub fn rasterize_triangle<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4; 3],
        varyings: &[S::Varying; 3],
    ) {
        // a triangle clipped by six planes has at most nine vertices
        let mut current_poly: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(16);
        let mut clip_buffer: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(16);

        for i in 0..3 {
            current_poly.push((clip_coords[i], varyings[i]));
        }

        // (axis, sign): inside when sign * p[axis] <= p.w
        let planes = [
            (0, 1.0),
            (0, -1.0),
            (1, 1.0),
            (1, -1.0),
            (2, 1.0),
            (2, -1.0),
        ];

        for &(axis, sign) in &planes {
            if current_poly.is_empty() {
                return;
            }
            Self::clip_polygon_against_plane::<S>(&current_poly, &mut clip_buffer, axis, sign);
            std::mem::swap(&mut current_poly, &mut clip_buffer);
        }

        if current_poly.len() < 3 {
            return;
        }

        let v0 = current_poly[0];
        for i in 1..(current_poly.len() - 1) {
            let v1 = current_poly[i];
            let v2 = current_poly[i + 1];
            self.rasterize_triangle_clipped(
                framebuffer,
                shader,
                &[v0.0, v1.0, v2.0],
                &[v0.1, v1.1, v2.1],
            );
        }
    }

    fn clip_polygon_against_plane<S: Shader>(
        input: &[ClipVertex<S::Varying>],
        output: &mut Vec<ClipVertex<S::Varying>>,
        axis: usize,
        sign: f32,
    ) {
        output.clear();
        let Some(&last) = input.last() else {
            return;
        };

        let is_inside = |p: &Vector4| sign * p[axis] <= p.w + 1e-6;

        let mut prev = last;
        let mut prev_inside = is_inside(&prev.0);

        for &curr in input {
            let curr_inside = is_inside(&curr.0);

            if curr_inside != prev_inside {
                if let Some(inter) = Self::intersect_edge_plane::<S>(prev, curr, axis, sign) {
                    output.push(inter);
                }
            }
            if curr_inside {
                output.push(curr);
            }

            prev = curr;
            prev_inside = curr_inside;
        }
    }

    /// Intersection of segment `a`-`b` with the plane `sign * p[axis] = p.w`,
    /// interpolating position and varyings.
    #[inline(always)]
    fn intersect_edge_plane<S: Shader>(
        a: ClipVertex<S::Varying>,
        b: ClipVertex<S::Varying>,
        axis: usize,
        sign: f32,
    ) -> Option<ClipVertex<S::Varying>> {
        let ac = a.0[axis];
        let bc = b.0[axis];
        let denom = sign * (bc - ac) - (b.0.w - a.0.w);
        if denom.abs() < 1e-9 {
            return None;
        }

        let t = (a.0.w - sign * ac) / denom;
        if !t.is_finite() {
            return None;
        }

        let pos = a.0 + (b.0 - a.0) * t;
        let vary = a.1 * (1.0 - t) + b.1 * t;
        Some((pos, vary))
    }

    /// Draws a triangle known to lie inside the frustum.
    fn rasterize_triangle_clipped<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4; 3],
        varyings: &[S::Varying; 3],
    ) {
        let width = framebuffer.buffer_width as f32;
        let height = framebuffer.buffer_height as f32;

        let mut screen = [Vector2::zeros(); 3];
        let mut w_values = [0.0; 3];
        for i in 0..3 {
            if clip_coords[i].w.abs() < 1e-6 {
                return;
            }
            let ndc = apply_perspective_division(&clip_coords[i]);
            w_values[i] = clip_coords[i].w;
            screen[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
        }

        // screen Y points down, so CCW front faces have negative area
        let signed_area = (screen[1] - screen[0]).perp_dot(screen[2] - screen[1]);
        match self.cull_mode {
            CullMode::Back if signed_area >= 0.0 => return,
            CullMode::Front if signed_area <= 0.0 => return,
            _ => {}
        }

        let (min_x, min_y, max_x, max_y) = Self::compute_bounding_box(&screen);
        if max_x < 0
            || max_y < 0
            || min_x >= framebuffer.buffer_width as i32
            || min_y >= framebuffer.buffer_height as i32
        {
            return;
        }

        let start_x = min_x.max(0) as usize;
        let end_x = max_x.min(framebuffer.buffer_width as i32 - 1) as usize;
        let start_y = min_y.max(0) as usize;
        let end_y = max_y.min(framebuffer.buffer_height as i32 - 1) as usize;

        (start_y..=end_y).into_par_iter().for_each(|y| {
            for x in start_x..=end_x {
                let pixel_center = Vector2::new(x as f32 + 0.5, y as f32 + 0.5);

                let Some(bary) =
                    barycentric_coordinates(pixel_center, screen[0], screen[1], screen[2])
                else {
                    continue;
                };
                if !is_inside_triangle(bary) {
                    continue;
                }
                let Some(corrected) =
                    perspective_correct_barycentric(bary, w_values[0], w_values[1], w_values[2])
                else {
                    continue;
                };

                // NDC z is affine in screen space
                let z_ndc = bary.x * clip_coords[0].z / w_values[0]
                    + bary.y * clip_coords[1].z / w_values[1]
                    + bary.z * clip_coords[2].z / w_values[2];
                let depth = z_ndc * 0.5 + 0.5;

                if framebuffer.depth_test_and_update(x, y, depth) {
                    let varying = varyings[0] * corrected.x
                        + varyings[1] * corrected.y
                        + varyings[2] * corrected.z;
                    framebuffer.set_pixel_safe(x, y, shader.fragment(varying));
                }
            }
        });
    }

    fn compute_bounding_box(points: &[Vector2; 3]) -> (i32, i32, i32, i32) {
        let min_x = points[0].x.min(points[1].x).min(points[2].x).floor() as i32;
        let min_y = points[0].y.min(points[1].y).min(points[2].y).floor() as i32;
        let max_x = points[0].x.max(points[1].x).max(points[2].x).ceil() as i32;
        let max_y = points[0].y.max(points[1].y).max(points[2].y).ceil() as i32;
        (min_x, min_y, max_x, max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vertex;
    use crate::core::math::Vector3;

    /// Passes positions straight through as clip coordinates.
    struct FlatShader(Vector3);

    impl Shader for FlatShader {
        type Varying = Vector3;

        fn vertex(&self, vertex: &Vertex) -> (Vector4, Vector3) {
            (vertex.position.to_point(), self.0)
        }

        fn fragment(&self, varying: Vector3) -> Vector3 {
            varying
        }
    }

    fn draw(rasterizer: &Rasterizer, fb: &FrameBuffer, corners: [Vector3; 3]) {
        let shader = FlatShader(Vector3::x_axis());
        let clip = corners.map(|c| c.to_point());
        rasterizer.rasterize_triangle(fb, &shader, &clip, &[Vector3::x_axis(); 3]);
    }

    fn covered(fb: &FrameBuffer) -> usize {
        fb.depth_snapshot().iter().filter(|d| d.is_finite()).count()
    }

    const CCW: [Vector3; 3] = [
        Vector3::new(-1.0, -1.0, 0.0),
        Vector3::new(1.0, -1.0, 0.0),
        Vector3::new(-1.0, 1.0, 0.0),
    ];

    #[test]
    fn front_facing_triangle_covers_half_the_target() {
        let fb = FrameBuffer::new(8, 8, 1);
        draw(&Rasterizer::new(), &fb, CCW);
        let n = covered(&fb);
        assert!((28..=36).contains(&n), "covered {n}");
        let pixel = fb.get_pixel(0, 7).unwrap();
        assert!((pixel - Vector3::x_axis()).length() < 1e-5);
        assert_eq!(fb.depth_at(0, 7), Some(0.5));
    }

    #[test]
    fn back_faces_are_culled() {
        let fb = FrameBuffer::new(8, 8, 1);
        let cw = [CCW[0], CCW[2], CCW[1]];
        draw(&Rasterizer::new(), &fb, cw);
        assert_eq!(covered(&fb), 0);

        let mut both = Rasterizer::new();
        both.set_cull_mode(CullMode::None);
        draw(&both, &fb, cw);
        assert!(covered(&fb) > 0);
    }

    #[test]
    fn triangle_outside_frustum_is_clipped_away() {
        let fb = FrameBuffer::new(8, 8, 1);
        let behind = CCW.map(|c| c + Vector3::new(0.0, 0.0, 5.0));
        draw(&Rasterizer::new(), &fb, behind);
        assert_eq!(covered(&fb), 0);
    }

    #[test]
    fn oversized_triangle_is_clipped_to_viewport() {
        let fb = FrameBuffer::new(8, 8, 1);
        let huge = CCW.map(|c| c * 10.0 + Vector3::new(5.0, 5.0, 0.0));
        draw(&Rasterizer::new(), &fb, huge);
        assert_eq!(covered(&fb), 64);
    }
}
