/// Time snapshot read by a tick. The driver never mutates it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the simulation started.
    pub elapsed: f32,
    /// Seconds since the previous tick.
    pub delta: f32,
}

/// Deterministic clock advancing by a constant step, for headless runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedStepClock {
    step: f32,
    ticks: u64,
}

impl FixedStepClock {
    pub fn new(step: f32) -> Self {
        Self { step, ticks: 0 }
    }

    /// Time of the current tick. The first tick reports a zero delta.
    pub fn now(&self) -> FrameTime {
        FrameTime {
            elapsed: self.ticks as f32 * self.step,
            delta: if self.ticks == 0 { 0.0 } else { self.step },
        }
    }

    pub fn advance(&mut self) {
        self.ticks += 1;
    }
}
