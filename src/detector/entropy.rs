//! Entropy detector (§4.4): fires on a collapsed src-IP distribution.

use crate::features::Features;

use super::Detector;

pub struct EntropyDetector {
    threshold: f64,
}

impl EntropyDetector {
    pub fn new(threshold: f64) -> Self {
        EntropyDetector { threshold }
    }
}

impl Detector for EntropyDetector {
    fn name(&self) -> &'static str {
        "entropy"
    }

    fn classify(&mut self, features: &Features) -> bool {
        features.unique_ips <= 1 || features.entropy < self.threshold
    }
}
