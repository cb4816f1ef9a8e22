//! Stepwise HP interpolation

/// Default number of steps in an HP tween
pub const DEFAULT_STEPS: u32 = 20;

/// Intermediate HP values between two readings.
///
/// Yields `steps` values, each clamped to `0..=max_hp`, moving monotonically
/// from `from` towards `to`. The last value is exactly the clamped target.
/// While draining to zero, intermediate values stay at 1 or above so the bar
/// only reads 0 once the update resolves.
#[derive(Debug, Clone)]
pub struct HpTween {
    from: u32,
    to: u32,
    steps: u32,
    step: u32,
}

impl HpTween {
    pub fn new(from: u32, to: u32, max_hp: u32, steps: u32) -> Self {
        Self {
            from: from.min(max_hp),
            to: to.min(max_hp),
            steps: steps.max(1),
            step: 0,
        }
    }

    /// Clamped final value
    pub fn target(&self) -> u32 {
        self.to
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Value shown at step `step` (1-based)
    pub fn value_at(&self, step: u32) -> u32 {
        let step = step.min(self.steps);
        if step == self.steps {
            return self.to;
        }

        let progress = f64::from(step) / f64::from(self.steps);
        let value = f64::from(self.from) + (f64::from(self.to) - f64::from(self.from)) * progress;
        let value = value.round() as u32;

        if self.to == 0 && self.from > 0 {
            value.max(1)
        } else {
            value
        }
    }
}

impl Iterator for HpTween {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.step >= self.steps {
            return None;
        }
        self.step += 1;
        Some(self.value_at(self.step))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.steps - self.step) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for HpTween {}
