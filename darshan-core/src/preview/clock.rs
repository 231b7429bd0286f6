/// Returns how much of the budget has been used, as a percentage clamped to `[0, 100]`.
///
/// A budget of zero or less is misconfigured content, and counts as already exhausted.
pub fn calculate_progress(current_time: f64, budget: f64) -> f64 {
    if budget <= 0. || budget.is_nan() {
        return 100.;
    }

    if current_time.is_nan() || current_time <= 0. {
        return 0.;
    }

    (current_time / budget * 100.).clamp(0., 100.)
}

/// Tracks how long the active player has been watched.
///
/// The clock has no timers of its own. It is pushed samples by whoever receives the player's time
/// updates, and only ever moves forward until it is reset.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewClock {
    budget: f64,
    elapsed: f64,
    samples: usize,
}

impl PreviewClock {
    pub fn new(budget: f64) -> Self {
        Self {
            budget,
            elapsed: 0.,
            samples: 0,
        }
    }

    /// Records a playback position and returns the elapsed time.
    ///
    /// Seeking backwards does not give time back, and positions no player could report are ignored.
    pub fn sample(&mut self, current_time: f64) -> f64 {
        if current_time.is_finite() && current_time >= 0. {
            self.elapsed = self.elapsed.max(current_time);
            self.samples += 1;
        }

        self.elapsed
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    /// How many valid samples were taken since the last reset.
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn progress(&self) -> f64 {
        calculate_progress(self.elapsed, self.budget)
    }

    /// Seconds left before the budget runs out.
    pub fn remaining(&self) -> f64 {
        (self.budget - self.elapsed).max(0.)
    }

    /// Starts over from zero, keeping the budget.
    pub fn reset(&mut self) {
        self.elapsed = 0.;
        self.samples = 0;
    }
}
