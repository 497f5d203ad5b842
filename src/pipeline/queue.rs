//! Bounded per-frame draw queue shared by the shadow and color passes.

use crate::core::math::Matrix4;
use crate::scene::material::Material;
use log::warn;
use std::fmt;

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Handle to a mesh uploaded to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

impl MeshId {
    pub const INVALID: MeshId = MeshId(0);
    pub const SPHERE: MeshId = MeshId(1);
    pub const CUBE: MeshId = MeshId(2);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh#{}", self.0)
    }
}

/// One mesh instance to render this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub mesh: MeshId,
    /// Object-to-world transform.
    pub model: Matrix4,
    pub material: Material,
}

/// Fixed-capacity FIFO ring buffer of [`DrawCommand`]s.
///
/// Scene code pushes commands while building a frame. The renderer then walks
/// the same set twice, once for the shadow pass and once for the color pass,
/// and finally calls [`clear`](Self::clear). Both walks borrow the queue
/// immutably, so the contents cannot change between the passes.
///
/// When the queue is full, further pushes are dropped: the frame renders
/// with what fits, a warning is logged, and [`dropped`](Self::dropped)
/// reports how many commands were lost since the last clear.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    slots: Vec<Option<DrawCommand>>,
    head: usize,
    used: usize,
    dropped: usize,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}

impl CommandQueue {
    /// A capacity of zero is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            head: 0,
            used: 0,
            dropped: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    pub fn is_full(&self) -> bool {
        self.used == self.capacity()
    }

    /// Commands rejected since the last [`clear`](Self::clear).
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Appends at the tail. Returns `false` if the queue was full and the
    /// command was dropped.
    pub fn push(&mut self, command: DrawCommand) -> bool {
        if self.is_full() {
            if self.dropped == 0 {
                warn!(
                    "Draw queue full ({} commands), ignoring further draw calls this frame",
                    self.capacity()
                );
            }
            self.dropped += 1;
            return false;
        }
        let tail = (self.head + self.used) % self.capacity();
        self.slots[tail] = Some(command);
        self.used += 1;
        true
    }

    /// Queued commands in submission order.
    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> + '_ {
        let capacity = self.capacity();
        (0..self.used).filter_map(move |i| self.slots[(self.head + i) % capacity].as_ref())
    }

    /// Visits every queued command for the depth-only pass. Returns the number visited.
    pub fn drain_for_shadow_pass<F>(&self, mut render: F) -> usize
    where
        F: FnMut(&DrawCommand),
    {
        self.visit(&mut render)
    }

    /// Visits every queued command for the lit pass. Returns the number visited.
    pub fn drain_for_color_pass<F>(&self, mut render: F) -> usize
    where
        F: FnMut(&DrawCommand),
    {
        self.visit(&mut render)
    }

    fn visit(&self, render: &mut impl FnMut(&DrawCommand)) -> usize {
        let mut visited = 0;
        for cmd in self.iter() {
            render(cmd);
            visited += 1;
        }
        visited
    }

    /// Empties the queue and resets the dropped counter.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.used = 0;
        self.dropped = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Vector3;
    use crate::core::math::transform::TransformFactory;

    fn command(i: usize) -> DrawCommand {
        DrawCommand {
            mesh: MeshId::SPHERE,
            model: TransformFactory::translation(&Vector3::new(i as f32, 0.0, 0.0), 1.0),
            material: Material::default(),
        }
    }

    fn tag(cmd: &DrawCommand) -> usize {
        cmd.model.get(0, 3) as usize
    }

    #[test]
    fn drains_in_fifo_order() {
        let mut queue = CommandQueue::with_capacity(16);
        for i in 0..10 {
            assert!(queue.push(command(i)));
        }
        let mut seen = Vec::new();
        let visited = queue.drain_for_shadow_pass(|cmd| seen.push(tag(cmd)));
        assert_eq!(visited, 10);
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn both_passes_see_the_same_commands() {
        let mut queue = CommandQueue::with_capacity(8);
        for i in 0..5 {
            queue.push(command(i));
        }
        let mut shadow = Vec::new();
        let mut color = Vec::new();
        queue.drain_for_shadow_pass(|cmd| shadow.push(*cmd));
        queue.drain_for_color_pass(|cmd| color.push(*cmd));
        assert_eq!(shadow, color);
        assert_eq!(queue.len(), 5);
    }

    #[test]
    fn overflow_drops_excess_and_counts() {
        let capacity = 4;
        let mut queue = CommandQueue::with_capacity(capacity);
        let accepted = (0..7).filter(|&i| queue.push(command(i))).count();
        assert_eq!(accepted, capacity);
        assert_eq!(queue.dropped(), 3);

        let mut seen = Vec::new();
        assert_eq!(queue.drain_for_color_pass(|cmd| seen.push(tag(cmd))), capacity);
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn default_capacity_is_1024() {
        let mut queue = CommandQueue::default();
        for i in 0..1100 {
            queue.push(command(i));
        }
        assert_eq!(queue.len(), 1024);
        assert_eq!(queue.dropped(), 76);
        assert_eq!(queue.drain_for_shadow_pass(|_| {}), 1024);
    }

    #[test]
    fn clear_resets_everything() {
        let mut queue = CommandQueue::with_capacity(2);
        for i in 0..3 {
            queue.push(command(i));
        }
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.dropped(), 0);
        assert_eq!(queue.drain_for_shadow_pass(|_| panic!("queue should be empty")), 0);

        queue.push(command(9));
        let tags: Vec<_> = queue.iter().map(tag).collect();
        assert_eq!(tags, vec![9]);
    }

    #[test]
    fn zero_capacity_still_accepts_one() {
        let mut queue = CommandQueue::with_capacity(0);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.push(command(0)));
        assert!(!queue.push(command(1)));
    }
}
