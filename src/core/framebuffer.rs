use crate::core::math::Vector3;
use atomic_float::AtomicF32;
use rayon::prelude::*;
use std::cell::UnsafeCell;
use std::sync::Mutex;
use std::sync::atomic::Ordering;

const LOCK_STRIPES: usize = 1024;

/// Color and depth targets shared by rasterizer threads.
///
/// Depth is tested and written atomically; color writes go through striped
/// locks. With `sample_count > 1` the buffers are supersampled and
/// [`get_pixel`](Self::get_pixel) averages each block.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub sample_count: usize,
    pub buffer_width: usize,
    pub buffer_height: usize,

    color_buffer: UnsafeCell<Vec<Vector3>>,
    depth_buffer: Vec<AtomicF32>,
    locks: Vec<Mutex<()>>,
}

// Color writes are serialized by `locks`, depth by atomics.
unsafe impl Sync for FrameBuffer {}

impl FrameBuffer {
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        let sample_count = sample_count.max(1);
        let buffer_width = width * sample_count;
        let buffer_height = height * sample_count;
        let size = buffer_width * buffer_height;

        Self {
            width,
            height,
            sample_count,
            buffer_width,
            buffer_height,
            color_buffer: UnsafeCell::new(vec![Vector3::zeros(); size]),
            depth_buffer: (0..size).map(|_| AtomicF32::new(f32::INFINITY)).collect(),
            locks: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.buffer_width && y < self.buffer_height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.buffer_width + x
    }

    /// Resets every sample to `color` and depth to `depth`.
    pub fn clear(&mut self, color: Vector3, depth: f32) {
        self.color_buffer.get_mut().par_iter_mut().for_each(|c| *c = color);
        self.depth_buffer
            .par_iter()
            .for_each(|d| d.store(depth, Ordering::Relaxed));
    }

    /// Atomically replaces the stored depth if `new_depth` is closer.
    #[inline]
    pub fn depth_test_and_update(&self, x: usize, y: usize, new_depth: f32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let depth = &self.depth_buffer[self.index(x, y)];

        let mut current = depth.load(Ordering::Relaxed);
        loop {
            if new_depth >= current {
                return false;
            }
            match depth.compare_exchange_weak(current, new_depth, Ordering::Acquire, Ordering::Relaxed)
            {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Writes a sample. Call only after `depth_test_and_update` succeeded.
    #[inline]
    pub fn set_pixel_safe(&self, x: usize, y: usize, color: Vector3) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.index(x, y);
        let _guard = self.locks[idx % self.locks.len()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // SAFETY: the stripe lock for `idx` is held.
        unsafe {
            let buffer = &mut *self.color_buffer.get();
            buffer[idx] = color;
        }
    }

    /// Stored depth of one sample.
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        self.in_bounds(x, y)
            .then(|| self.depth_buffer[self.index(x, y)].load(Ordering::Relaxed))
    }

    /// Copy of the depth buffer, row-major.
    pub fn depth_snapshot(&self) -> Vec<f32> {
        self.depth_buffer
            .iter()
            .map(|d| d.load(Ordering::Relaxed))
            .collect()
    }

    /// Samples whose depth was never written since the last clear get
    /// `fill(x, y)`, with coordinates in sample space.
    pub fn fill_uncovered<F>(&mut self, fill: F)
    where
        F: Fn(usize, usize) -> Vector3 + Sync,
    {
        let width = self.buffer_width;
        let depth = &self.depth_buffer;
        self.color_buffer
            .get_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    if depth[y * width + x].load(Ordering::Relaxed) == f32::INFINITY {
                        *pixel = fill(x, y);
                    }
                }
            });
    }

    /// Resolved (box-filtered) color of an output pixel.
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Vector3> {
        if x >= self.width || y >= self.height {
            return None;
        }

        // SAFETY: only read once rendering has finished.
        let buffer = unsafe { &*self.color_buffer.get() };

        if self.sample_count == 1 {
            return Some(buffer[self.index(x, y)]);
        }

        let mut sum = Vector3::zeros();
        let start_x = x * self.sample_count;
        let start_y = y * self.sample_count;
        for dy in 0..self.sample_count {
            for dx in 0..self.sample_count {
                sum += buffer[self.index(start_x + dx, start_y + dy)];
            }
        }
        Some(sum / (self.sample_count * self.sample_count) as f32)
    }
}
