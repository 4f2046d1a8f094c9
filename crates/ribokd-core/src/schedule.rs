//! Warmup + cosine learning-rate schedule.
//!
//! The full state (hyperparameters and step counter) serializes with serde so
//! it can be embedded in checkpoints and restored on resume.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosineSchedule {
    pub base_lr: f64,
    pub warmup_steps: usize,
    pub total_steps: usize,
    /// Number of steps already taken.
    pub step: usize,
}

impl CosineSchedule {
    pub fn new(base_lr: f64, warmup_steps: usize, total_steps: usize) -> Self {
        Self {
            base_lr,
            warmup_steps,
            total_steps,
            step: 0,
        }
    }

    /// Learning rate at the current step.
    ///
    /// - Warmup phase (`step < warmup_steps`): linear ramp from 0 to `base_lr`.
    /// - Cosine phase: decays from `base_lr` to 0.
    pub fn lr(&self) -> f64 {
        if self.warmup_steps > 0 && self.step < self.warmup_steps {
            self.base_lr * (self.step + 1) as f64 / self.warmup_steps as f64
        } else {
            let decay_steps = self.total_steps.saturating_sub(self.warmup_steps).max(1);
            let progress = self.step.saturating_sub(self.warmup_steps) as f64 / decay_steps as f64;
            let progress = progress.min(1.0);
            self.base_lr * 0.5 * (1.0 + (std::f64::consts::PI * progress).cos())
        }
    }

    /// Advance one step and return the rate for the step just taken.
    pub fn next_lr(&mut self) -> f64 {
        let lr = self.lr();
        self.step += 1;
        lr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_then_cosine() {
        let base_lr = 1e-4;
        let mut s = CosineSchedule::new(base_lr, 100, 1000);

        assert!((s.lr() - base_lr / 100.0).abs() < 1e-12);

        s.step = 99;
        assert!((s.lr() - base_lr).abs() < 1e-12);

        // Cosine midpoint: progress = 450/900 = 0.5 → lr = base_lr / 2.
        s.step = 550;
        assert!((s.lr() - base_lr * 0.5).abs() < 1e-12);

        s.step = 999;
        assert!(s.lr() < base_lr * 0.01);
    }

    #[test]
    fn test_no_warmup_starts_at_base() {
        let s = CosineSchedule::new(3e-5, 0, 10);
        assert!((s.lr() - 3e-5).abs() < 1e-12);
    }

    #[test]
    fn test_state_roundtrip() {
        let mut s = CosineSchedule::new(1e-3, 10, 100);
        for _ in 0..25 {
            s.next_lr();
        }
        let json = serde_json::to_string(&s).unwrap();
        let restored: CosineSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, s);
        assert_eq!(restored.step, 25);
    }
}
