//! Fixed-weight logistic scorer (§4.6). These weights are seed values,
//! not a trained model; they are reproduced exactly for output
//! reproducibility against the reference.

use ndarray::Array1;

use crate::features::Features;

use super::Detector;

pub struct MlDetector {
    weights: [f64; 10],
    threshold: f64,
}

impl MlDetector {
    pub fn new(weights: [f64; 10], threshold: f64) -> Self {
        MlDetector { weights, threshold }
    }

    /// Normalized feature vector in the fixed order required by §4.6.
    pub fn normalize(features: &Features) -> [f64; 10] {
        [
            features.entropy,
            features.avg_rate / 10_000.0,
            features.spike_score / 10.0,
            features.packet_size_mean / 1500.0,
            features.syn_ratio,
            features.udp_ratio,
            1.0 / (features.unique_ips as f64 + 1.0),
            features.flow_duration_mean / 1000.0,
            features.packet_size_std / 500.0,
            features.total_packets as f64 / 10_000.0,
        ]
    }

    pub fn score(&self, features: &Features) -> f64 {
        let x = Array1::from_vec(Self::normalize(features).to_vec());
        let w = Array1::from_vec(self.weights.to_vec());
        sigmoid(x.dot(&w))
    }
}

fn sigmoid(s: f64) -> f64 {
    1.0 / (1.0 + (-s).exp())
}

impl Detector for MlDetector {
    fn name(&self) -> &'static str {
        "ml"
    }

    fn classify(&mut self, features: &Features) -> bool {
        self.score(features) > self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEIGHTS: [f64; 10] = [-0.5, 0.001, 0.3, -0.2, 0.1, 0.2, 0.15, 0.1, 0.05, 0.1];

    fn zero_features() -> Features {
        Features {
            top_ip: "NONE".to_string(),
            top_ip_packets: 0,
            entropy: 0.0,
            avg_rate: 0.0,
            spike_score: 0.0,
            total_packets: 0,
            total_flows: 0,
            unique_ips: 0,
            packet_size_mean: 0.0,
            packet_size_std: 0.0,
            syn_ratio: 0.0,
            udp_ratio: 0.0,
            flow_duration_mean: 0.0,
        }
    }

    #[test]
    fn sigmoid_of_zero_is_one_half() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn all_zero_normalized_vector_gives_half_and_does_not_fire() {
        let x = [0.0; 10];
        let s: f64 = x.iter().zip(WEIGHTS.iter()).map(|(a, b)| a * b).sum();
        assert_eq!(sigmoid(s), 0.5);
        assert!(sigmoid(s) <= 0.6);
    }

    #[test]
    fn zero_features_struct_stays_near_half() {
        // unique_ips=0 contributes 1/(0+1)=1.0 at weight 0.15, so the
        // dot product from a default-ish Features isn't exactly zero,
        // but it stays well under the 0.6 firing threshold.
        let det = MlDetector::new(WEIGHTS, 0.6);
        let score = det.score(&zero_features());
        assert!(score <= 0.6);
    }

    #[test]
    fn high_spike_and_rate_fires() {
        let mut f = zero_features();
        f.entropy = 0.5;
        f.avg_rate = 50_000.0;
        f.spike_score = 900.0;
        f.unique_ips = 1000;
        f.total_packets = 50_000;
        let det = MlDetector::new(WEIGHTS, 0.6);
        assert!(det.score(&f) > 0.6);
    }
}
