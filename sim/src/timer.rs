/// Round clock. Advances only while the game is running.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameTimer {
    elapsed: f32,
    duration: f32,
}

impl GameTimer {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
    }

    /// Seconds since the round started.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn time_left(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }

    /// Fraction of the round that has passed, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        shared::unit_clamp(self.elapsed / self.duration)
    }

    pub fn is_over(&self) -> bool {
        self.elapsed >= self.duration
    }
}
