use super::MathError;
use super::matrix::Matrix4;
use super::vector::{Vector2, Vector3, Vector4};

//=================================
// Transform Matrix Factory
//=================================

/// Factory for the canonical transform matrices.
///
/// Everything is right-handed and produces OpenGL clip space (NDC z in
/// [-1, 1]); the results are numerically the same as glm's constructors.
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    pub fn identity() -> Matrix4 {
        Matrix4::identity()
    }

    /// Rotation around an arbitrary axis (Rodrigues' formula).
    pub fn rotation(axis: &Vector3, angle_rad: f32) -> Result<Matrix4, MathError> {
        let Vector3 { x, y, z } = axis.normalize()?;
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        let t = 1.0 - c;

        Ok(Matrix4::from_rows([
            [t * x * x + c,     t * x * y - z * s, t * x * z + y * s, 0.0],
            [t * x * y + z * s, t * y * y + c,     t * y * z - x * s, 0.0],
            [t * x * z - y * s, t * y * z + x * s, t * z * z + c,     0.0],
            [0.0,               0.0,               0.0,               1.0],
        ]))
    }

    pub fn rotation_x(angle_rad: f32) -> Matrix4 {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c,  -s,   0.0],
            [0.0, s,   c,   0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotation_y(angle_rad: f32) -> Matrix4 {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::from_rows([
            [ c,   0.0, s,   0.0],
            [ 0.0, 1.0, 0.0, 0.0],
            [-s,   0.0, c,   0.0],
            [ 0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotation_z(angle_rad: f32) -> Matrix4 {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::from_rows([
            [c,  -s,   0.0, 0.0],
            [s,   c,   0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Translation whose last column is `(v.x, v.y, v.z, w)`.
    pub fn translation(v: &Vector3, w: f32) -> Matrix4 {
        Matrix4::from_rows([
            [1.0, 0.0, 0.0, v.x],
            [0.0, 1.0, 0.0, v.y],
            [0.0, 0.0, 1.0, v.z],
            [0.0, 0.0, 0.0, w  ],
        ])
    }

    pub fn scaling(scale: &Vector3) -> Matrix4 {
        Matrix4::from_rows([
            [scale.x, 0.0,     0.0,     0.0],
            [0.0,     scale.y, 0.0,     0.0],
            [0.0,     0.0,     scale.z, 0.0],
            [0.0,     0.0,     0.0,     1.0],
        ])
    }

    /// Right-handed view matrix: `eye` maps to the origin, looking down -Z.
    ///
    /// Fails when `eye == center` or when `up` is parallel to the view direction.
    pub fn look_at(eye: &Vector3, center: &Vector3, up: &Vector3) -> Result<Matrix4, MathError> {
        let f = (*center - *eye).normalize()?;
        let s = f.cross(*up).normalize()?;
        let u = s.cross(f);

        Ok(Matrix4::from_rows([
            [ s.x,  s.y,  s.z, -s.dot(*eye)],
            [ u.x,  u.y,  u.z, -u.dot(*eye)],
            [-f.x, -f.y, -f.z,  f.dot(*eye)],
            [ 0.0,  0.0,  0.0,  1.0        ],
        ]))
    }

    /// Perspective projection mapping the view frustum to NDC [-1, 1].
    pub fn perspective(fov_y_rad: f32, aspect_ratio: f32, near: f32, far: f32) -> Matrix4 {
        let f = 1.0 / (fov_y_rad / 2.0).tan();
        let nf = 1.0 / (near - far);

        Matrix4::from_rows([
            [f / aspect_ratio, 0.0, 0.0,               0.0                  ],
            [0.0,              f,   0.0,               0.0                  ],
            [0.0,              0.0, (far + near) * nf, 2.0 * far * near * nf],
            [0.0,              0.0, -1.0,              0.0                  ],
        ])
    }

    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4 {
        let rl = 1.0 / (right - left);
        let tb = 1.0 / (top - bottom);
        let nf = 1.0 / (near - far);

        Matrix4::from_rows([
            [2.0 * rl, 0.0,      0.0,      -(right + left) * rl],
            [0.0,      2.0 * tb, 0.0,      -(top + bottom) * tb],
            [0.0,      0.0,      2.0 * nf, (far + near) * nf   ],
            [0.0,      0.0,      0.0,      1.0                 ],
        ])
    }
}

//=================================
// Viewport helpers
//=================================

/// Clip space -> NDC.
#[inline]
pub fn apply_perspective_division(clip: &Vector4) -> Vector3 {
    let w = clip.w;
    if w.abs() > 1e-6 {
        clip.xyz() / w
    } else {
        Vector3::zeros()
    }
}

/// NDC -> screen pixels. Screen Y grows downwards.
#[inline]
pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> Vector2 {
    Vector2::new(
        (ndc_x + 1.0) * 0.5 * width,
        (1.0 - (ndc_y + 1.0) * 0.5) * height,
    )
}
