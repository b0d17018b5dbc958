//! CUSUM change-point detector (§4.5). The rolling history, running
//! mean/std, and cumulative sums are explicit per-worker state threaded
//! through each call — no process-global storage (§9).

use std::collections::VecDeque;

use crate::features::Features;

use super::Detector;

#[derive(Debug, Clone)]
pub struct CusumState {
    history: VecDeque<f64>,
    capacity: usize,
    mean: f64,
    std: f64,
    pub cumsum_pos: f64,
    pub cumsum_neg: f64,
}

impl CusumState {
    pub fn new(capacity: usize, baseline_mean: f64, baseline_std: f64) -> Self {
        CusumState {
            history: VecDeque::with_capacity(capacity),
            capacity,
            mean: baseline_mean,
            std: baseline_std,
            cumsum_pos: 0.0,
            cumsum_neg: 0.0,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.history.len()
    }
}

pub struct CusumDetector {
    state: CusumState,
    slack: f64,
    alarm: f64,
}

impl CusumDetector {
    pub fn new(capacity: usize, baseline_mean: f64, baseline_std: f64, slack: f64, alarm: f64) -> Self {
        CusumDetector {
            state: CusumState::new(capacity, baseline_mean, baseline_std),
            slack,
            alarm,
        }
    }

    pub fn state(&self) -> &CusumState {
        &self.state
    }

    /// Runs one CUSUM update on observation `x`, per §4.5 steps 1-6.
    ///
    /// `x` is standardized against the *pre-update* running mean/std —
    /// on the very first call that is the warm-start baseline
    /// (1000.0/200.0), which is what makes a single substantial-deviation
    /// sample fire immediately rather than always comparing `x` against
    /// itself. The running mean/std are then recomputed from the
    /// just-updated history for the next call.
    pub fn update(&mut self, x: f64) -> bool {
        if self.state.history.len() == self.state.capacity {
            self.state.history.pop_front();
        }

        let z = (x - self.state.mean) / self.state.std.max(1.0);

        self.state.history.push_back(x);
        let n = self.state.history.len() as f64;
        let mean = self.state.history.iter().sum::<f64>() / n;
        let variance = self
            .state
            .history
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / n;
        self.state.mean = mean;
        self.state.std = variance.sqrt().max(1.0);

        self.state.cumsum_pos = (self.state.cumsum_pos + z - self.slack).max(0.0);
        self.state.cumsum_neg = (self.state.cumsum_neg - z - self.slack).max(0.0);

        self.state.cumsum_pos > self.alarm || self.state.cumsum_neg > self.alarm
    }
}

impl Detector for CusumDetector {
    fn name(&self) -> &'static str {
        "cusum"
    }

    fn classify(&mut self, features: &Features) -> bool {
        self.update(features.avg_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cusum_resets_after_w_exact_mean_samples() {
        let mut det = CusumDetector::new(100, 1000.0, 200.0, 0.5, 5.0);
        for _ in 0..100 {
            let mu = det.state().mean;
            det.update(mu);
        }
        assert_eq!(det.state().cumsum_pos, 0.0);
        assert_eq!(det.state().cumsum_neg, 0.0);
    }

    #[test]
    fn large_single_sample_deviation_fires() {
        // rate burst scenario (§8 scenario 4): avg_rate=50000 against the
        // 1000/200 warm-start baseline gives z >> 5.
        let mut det = CusumDetector::new(100, 1000.0, 200.0, 0.5, 5.0);
        let fired = det.update(50000.0);
        assert!(fired);
    }

    #[test]
    fn benign_single_sample_does_not_fire() {
        let mut det = CusumDetector::new(100, 1000.0, 200.0, 0.5, 5.0);
        let fired = det.update(10.0);
        assert!(!fired);
    }
}
