use crate::renderable::Renderable;
use std::collections::VecDeque;

/// FIFO of borrowed renderables for one frame.
pub(crate) struct RenderQueue<'a, S> {
    items: VecDeque<&'a dyn Renderable<S>>,
}

impl<'a, S> RenderQueue<'a, S> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, renderable: &'a dyn Renderable<S>) {
        self.items.push_back(renderable);
    }

    pub fn front(&self) -> Option<&'a dyn Renderable<S>> {
        self.items.front().copied()
    }

    pub fn pop_front(&mut self) -> Option<&'a dyn Renderable<S>> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    struct Marker(f32);

    impl Renderable<()> for Marker {
        fn position(&self) -> Vec3 {
            Vec3::splat(self.0)
        }
        fn rotation_axis(&self) -> Vec3 {
            Vec3::ZERO
        }
        fn radian_rotation(&self) -> f32 {
            0.0
        }
        fn scale(&self) -> Vec3 {
            Vec3::ONE
        }
        fn should_outline(&self) -> bool {
            false
        }
        fn draw(&self, _shader: &mut ()) {}
    }

    #[test]
    fn queue_is_fifo() {
        let items = [Marker(1.0), Marker(2.0), Marker(3.0)];
        let mut queue: RenderQueue<'_, ()> = RenderQueue::with_capacity(0);
        for item in &items {
            queue.push(item);
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.front().map(|r| r.position().x), Some(1.0));

        let order: Vec<f32> = std::iter::from_fn(|| queue.pop_front())
            .map(|r| r.position().x)
            .collect();
        assert_eq!(order, vec![1.0, 2.0, 3.0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn drained_queue_stays_empty() {
        let item = Marker(0.0);
        let mut queue: RenderQueue<'_, ()> = RenderQueue::with_capacity(4);
        queue.push(&item);
        assert!(queue.pop_front().is_some());
        assert!(queue.is_empty());
        assert!(queue.front().is_none());
        assert!(queue.pop_front().is_none());
    }
}
