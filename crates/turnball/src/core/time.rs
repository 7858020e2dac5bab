/// Fixed timestep accumulator.
/// Turns variable host frame deltas into a whole number of solver steps.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedTimestep {
    /// The fixed delta time per step.
    dt: f32,
    /// Most steps a single `accumulate` call may return.
    max_steps: u32,
    /// Time carried over to the next call.
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32, max_steps: u32) -> Self {
        Self {
            dt,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    ///
    /// Negative and non-finite deltas are ignored.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }
        // Cap so a long host stall cannot snowball into more catch-up work
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut ts = FixedTimestep::new(1.0 / 60.0, 10);
        assert_eq!(ts.accumulate(1.0 / 60.0), 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut ts = FixedTimestep::new(1.0 / 60.0, 10);
        assert_eq!(ts.accumulate(0.008), 0);
        assert_eq!(ts.accumulate(0.010), 1);
    }

    #[test]
    fn caps_catch_up() {
        let mut ts = FixedTimestep::new(1.0 / 60.0, 10);
        assert_eq!(ts.accumulate(1.0), 10);
        let mut ts = FixedTimestep::new(1.0 / 60.0, 3);
        assert_eq!(ts.accumulate(1.0), 3);
    }

    #[test]
    fn ignores_bad_deltas() {
        let mut ts = FixedTimestep::new(1.0 / 60.0, 10);
        assert_eq!(ts.accumulate(-1.0), 0);
        assert_eq!(ts.accumulate(f32::NAN), 0);
        // Nothing was carried over from the bad deltas
        assert_eq!(ts.accumulate(1.0 / 60.0), 1);
    }
}
