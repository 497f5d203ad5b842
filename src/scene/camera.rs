use crate::core::math::transform::TransformFactory;
use crate::core::math::{MathError, Matrix4, Vector3, deg2rad};

pub const DEFAULT_SENSITIVITY: f32 = 0.1;
pub const PITCH_LIMIT: f32 = 89.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

/// Free-fly camera driven by mouse deltas and discrete movement steps.
///
/// Yaw and pitch are in degrees. Pitch stays within ±89° so the view never
/// flips over the poles.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vector3,
    front: Vector3,
    up: Vector3,
    yaw: f32,
    pitch: f32,
    fov: f32,
    sensitivity: f32,
    last_mouse: Option<(f32, f32)>,
    delta_time: f32,
    last_frame: f32,
}

impl Default for Camera {
    /// Looks down at the chess board from above one of its sides.
    fn default() -> Self {
        let front = Vector3::new(-0.001730, -0.943801, -0.330509);
        let (yaw, pitch) = yaw_pitch_from_front(front);
        Self {
            position: Vector3::new(4.027637, 17.071016, 10.351642),
            front,
            up: Vector3::y_axis(),
            yaw,
            pitch,
            fov: 30.0,
            sensitivity: DEFAULT_SENSITIVITY,
            last_mouse: None,
            delta_time: 0.0,
            last_frame: 0.0,
        }
    }
}

/// Inverse of the spherical-to-Cartesian conversion used by `rotate`.
fn yaw_pitch_from_front(front: Vector3) -> (f32, f32) {
    let pitch = front.y.clamp(-1.0, 1.0).asin().to_degrees();
    let yaw = front.z.atan2(front.x).to_degrees();
    (yaw, pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT))
}

impl Camera {
    pub fn new(
        position: Vector3,
        front: Vector3,
        up: Vector3,
        fov_degrees: f32,
    ) -> Result<Self, MathError> {
        let front = front.normalize()?;
        let (yaw, pitch) = yaw_pitch_from_front(front);
        Ok(Self {
            position,
            front,
            up,
            yaw,
            pitch,
            fov: fov_degrees,
            ..Self::default()
        })
    }

    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn front(&self) -> Vector3 {
        self.front
    }

    pub fn up(&self) -> Vector3 {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Feeds an absolute cursor position.
    ///
    /// The first sample only becomes the reference point. Later samples turn
    /// the camera by the cursor delta scaled by the sensitivity.
    pub fn rotate(&mut self, mouse_x: f64, mouse_y: f64) {
        let (x, y) = (mouse_x as f32, mouse_y as f32);
        let Some((last_x, last_y)) = self.last_mouse.replace((x, y)) else {
            return;
        };

        // screen y grows downwards
        let dx = (x - last_x) * self.sensitivity;
        let dy = (last_y - y) * self.sensitivity;

        self.yaw += dx;
        self.pitch = (self.pitch + dy).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let yaw = deg2rad(self.yaw);
        let pitch = deg2rad(self.pitch);
        let front = Vector3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        // cos(pitch) > 0 within the clamp, so this is never degenerate
        self.front = front.normalize().unwrap_or(front);
    }

    /// Moves one step of length `speed`. Not scaled by frame time.
    pub fn move_camera(&mut self, direction: Direction, speed: f32) -> Result<(), MathError> {
        self.position = match direction {
            Direction::Forward => self.position.combine(self.front, 1.0, speed),
            Direction::Backward => self.position.combine(self.front, 1.0, -speed),
            Direction::Left => self.position.combine(self.right()?, 1.0, -speed),
            Direction::Right => self.position.combine(self.right()?, 1.0, speed),
        };
        Ok(())
    }

    fn right(&self) -> Result<Vector3, MathError> {
        self.front.cross(self.up).normalize()
    }

    pub fn view_matrix(&self) -> Result<Matrix4, MathError> {
        TransformFactory::look_at(&self.position, &(self.position + self.front), &self.up)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32, near: f32, far: f32) -> Matrix4 {
        TransformFactory::perspective(deg2rad(self.fov), aspect_ratio, near, far)
    }

    /// Records the time of the current frame in seconds.
    pub fn tick(&mut self, now: f32) {
        self.delta_time = now - self.last_frame;
        self.last_frame = now;
    }
}
