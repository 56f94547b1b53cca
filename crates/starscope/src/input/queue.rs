use crate::systems::refresh::InteractionMode;

/// Input events the selector understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A click/tap at screen coordinates in pixels. `threshold_px` of `None`
    /// uses the configured pick radius.
    PointerPick { x: f64, y: f64, threshold_px: Option<f64> },
    /// A controller trigger press: pick along a pointing ray.
    RayPick { origin: [f64; 3], direction: [f64; 3] },
    /// The camera jumped discontinuously; refresh Local at the next settle.
    Teleported,
    /// The host switched interaction mode (flight animation, other view).
    ModeChanged(InteractionMode),
}

/// A queue of input events.
/// The host writes events into the queue; the selector drains them each frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(8),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerPick { x: 10.0, y: 20.0, threshold_px: None });
        q.push(InputEvent::Teleported);
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events.len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn ray_pick_event() {
        let mut q = InputQueue::new();
        q.push(InputEvent::RayPick { origin: [0.0, 1.0, 2.0], direction: [0.0, 0.0, -1.0] });
        match q.drain()[0] {
            InputEvent::RayPick { origin, direction } => {
                assert_eq!(origin, [0.0, 1.0, 2.0]);
                assert_eq!(direction, [0.0, 0.0, -1.0]);
            }
            _ => panic!("Expected RayPick event"),
        }
    }
}
