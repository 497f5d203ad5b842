use crate::core::math::Vector3;
use crate::io::AssetError;
use log::info;
use std::f32::consts::PI;
use std::path::Path;

/// Latitude-longitude radiance map (row 0 is the top of the image).
#[derive(Debug, Clone, PartialEq)]
pub struct EquirectMap {
    width: usize,
    height: usize,
    texels: Vec<Vector3>,
}

impl EquirectMap {
    /// Loads an HDR (or any format `image` understands) as linear float RGB.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let img = image::open(path)?.into_rgb32f();
        let (width, height) = (img.width() as usize, img.height() as usize);
        info!("Loaded environment {} ({}x{})", path.display(), width, height);

        let texels = img
            .pixels()
            .map(|p| Vector3::new(p[0], p[1], p[2]))
            .collect();
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// `texels.len()` must equal `width * height`; missing texels read as black.
    pub fn from_texels(width: usize, height: usize, mut texels: Vec<Vector3>) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        texels.resize(width * height, Vector3::zeros());
        Self {
            width,
            height,
            texels,
        }
    }

    /// Horizon-to-zenith gradient over a darker ground, with a small bright sun.
    pub fn procedural_sky(width: usize, height: usize) -> Self {
        let zenith = Vector3::new(0.25, 0.45, 0.9);
        let horizon = Vector3::new(0.8, 0.85, 0.95);
        let ground = Vector3::new(0.3, 0.27, 0.24);
        let sun_dir = Vector3::new(0.6, 1.0, 0.3).normalize().unwrap_or(Vector3::y_axis());

        let (width, height) = (width.max(1), height.max(1));
        let mut texels = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                let dir = direction_of(
                    (col as f32 + 0.5) / width as f32,
                    1.0 - (row as f32 + 0.5) / height as f32,
                );
                let base = if dir.y >= 0.0 {
                    horizon.lerp(zenith, dir.y.sqrt())
                } else {
                    horizon.lerp(ground, (-dir.y * 4.0).min(1.0))
                };
                let sun = dir.dot(sun_dir).max(0.0).powf(256.0) * 20.0;
                texels.push(base + Vector3::repeat(sun));
            }
        }
        Self {
            width,
            height,
            texels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bilinear lookup along a unit direction; wraps in longitude.
    pub fn sample(&self, dir: Vector3) -> Vector3 {
        let (u, v) = uv_of(dir);
        let fx = u * self.width as f32 - 0.5;
        let fy = (1.0 - v) * self.height as f32 - 0.5;

        let x0 = fx.floor();
        let tx = fx - x0;
        let wrap = |x: f32| (x as i64).rem_euclid(self.width as i64) as usize;
        let (xa, xb) = (wrap(x0), wrap(x0 + 1.0));

        let max_row = (self.height - 1) as f32;
        let fy = fy.clamp(0.0, max_row);
        let ya = fy.floor() as usize;
        let yb = (ya + 1).min(self.height - 1);
        let ty = fy - ya as f32;

        let at = |x: usize, y: usize| self.texels[y * self.width + x];
        let top = at(xa, ya).lerp(at(xb, ya), tx);
        let bottom = at(xa, yb).lerp(at(xb, yb), tx);
        top.lerp(bottom, ty)
    }
}

/// `u` follows longitude `atan2(z, x)`, `v` follows latitude with 1 at +Y.
fn uv_of(dir: Vector3) -> (f32, f32) {
    let u = dir.z.atan2(dir.x) / (2.0 * PI) + 0.5;
    let v = dir.y.clamp(-1.0, 1.0).asin() / PI + 0.5;
    (u, v)
}

fn direction_of(u: f32, v: f32) -> Vector3 {
    let phi = (u - 0.5) * 2.0 * PI;
    let theta = (v - 0.5) * PI;
    Vector3::new(theta.cos() * phi.cos(), theta.sin(), theta.cos() * phi.sin())
}
