//! Position tracking and prefetch window selection

use super::types::Direction;

/// Current position over a fixed-size collection, plus the last movement.
#[derive(Clone, Debug)]
pub struct Navigator {
    len: usize,
    steps: usize,
    current: usize,
    direction: Direction,
}

impl Navigator {
    #[must_use]
    pub fn new(len: usize, steps: usize) -> Self {
        Self {
            len,
            steps,
            current: 0,
            direction: Direction::Jump,
        }
    }

    /// Jump to `pos`, clamped to the last index
    pub fn set(&mut self, pos: usize) {
        self.current = pos.min(self.len.saturating_sub(1));
        self.direction = Direction::Jump;
    }

    /// Step forward; stays put on the last index
    pub fn advance(&mut self) {
        if self.current + 1 < self.len {
            self.current += 1;
        }
        self.direction = Direction::Forward;
    }

    /// Step backward; stays put on index 0
    pub fn retreat(&mut self) {
        if self.current > 0 {
            self.current -= 1;
        }
        self.direction = Direction::Backward;
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Positions to keep resident, in dispatch priority order.
    ///
    /// The current position comes first, then the neighbours in the
    /// direction of travel, then the others. Never longer than
    /// `2 * steps + 1` and always within `[0, len)`.
    #[must_use]
    pub fn window(&self) -> Vec<usize> {
        if self.len == 0 {
            return Vec::new();
        }

        let i = self.current;
        let last = self.len - 1;
        let ahead = (i + 1)..=last.min(i.saturating_add(self.steps));
        let behind = i.saturating_sub(self.steps)..i;

        let capacity = self.len.min(self.steps.saturating_mul(2).saturating_add(1));
        let mut window = Vec::with_capacity(capacity);
        window.push(i);
        if self.direction == Direction::Backward {
            window.extend(behind);
            window.extend(ahead);
        } else {
            window.extend(ahead);
            window.extend(behind);
        }
        window
    }
}
