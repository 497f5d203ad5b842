use super::vector::{Vector2, Vector3};

const EPSILON: f32 = 1e-5;

/// Barycentric weights `(alpha, beta, gamma)` of `p` in triangle `(v1, v2, v3)`.
///
/// Returns `None` for a degenerate (zero-area) triangle.
pub fn barycentric_coordinates(
    p: Vector2,
    v1: Vector2,
    v2: Vector2,
    v3: Vector2,
) -> Option<Vector3> {
    let e1 = v2 - v1;
    let e2 = v3 - v1;
    let p_v1 = p - v1;

    // twice the signed area
    let total_area_x2 = e1.perp_dot(e2);
    if total_area_x2.abs() < EPSILON {
        return None;
    }

    let inv_total_area_x2 = 1.0 / total_area_x2;
    let beta = p_v1.perp_dot(e2) * inv_total_area_x2;
    let gamma = e1.perp_dot(p_v1) * inv_total_area_x2;
    let alpha = 1.0 - beta - gamma;

    Some(Vector3::new(alpha, beta, gamma))
}

#[inline(always)]
pub fn is_inside_triangle(bary: Vector3) -> bool {
    bary.x >= -EPSILON && bary.y >= -EPSILON && bary.z >= -EPSILON
}

/// Rescales screen-space barycentrics by `1/w` so attributes interpolate
/// linearly in eye space.
pub fn perspective_correct_barycentric(
    bary: Vector3,
    w1: f32,
    w2: f32,
    w3: f32,
) -> Option<Vector3> {
    let inv = |w: f32| if w.abs() > EPSILON { 1.0 / w } else { 1.0 };

    let wa = bary.x * inv(w1);
    let wb = bary.y * inv(w2);
    let wc = bary.z * inv(w3);

    let sum = wa + wb + wc;
    if sum.abs() < EPSILON {
        return None;
    }
    Some(Vector3::new(wa, wb, wc) / sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertices_get_unit_weights() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(4.0, 0.0);
        let c = Vector2::new(0.0, 4.0);
        let w = barycentric_coordinates(b, a, b, c).unwrap();
        assert!((w - Vector3::new(0.0, 1.0, 0.0)).length() < 1e-6);
        let centroid = Vector2::new(4.0 / 3.0, 4.0 / 3.0);
        let w = barycentric_coordinates(centroid, a, b, c).unwrap();
        assert!((w - Vector3::repeat(1.0 / 3.0)).length() < 1e-5);
        assert!(is_inside_triangle(w));
    }

    #[test]
    fn outside_point_has_negative_weight() {
        let w = barycentric_coordinates(
            Vector2::new(5.0, 5.0),
            Vector2::new(0.0, 0.0),
            Vector2::new(4.0, 0.0),
            Vector2::new(0.0, 4.0),
        )
        .unwrap();
        assert!(!is_inside_triangle(w));
    }

    #[test]
    fn degenerate_triangle_has_no_weights() {
        let p = Vector2::new(1.0, 1.0);
        let v = Vector2::new(0.0, 0.0);
        let w = barycentric_coordinates(p, v, Vector2::new(1.0, 1.0), Vector2::new(2.0, 2.0));
        assert!(w.is_none());
    }

    #[test]
    fn perspective_correction_favours_near_vertex() {
        let flat = Vector3::repeat(1.0 / 3.0);
        let corrected = perspective_correct_barycentric(flat, 1.0, 10.0, 10.0).unwrap();
        assert!(corrected.x > corrected.y);
        assert!((corrected.x + corrected.y + corrected.z - 1.0).abs() < 1e-6);
    }
}
