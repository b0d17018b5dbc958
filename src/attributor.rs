//! Hot-IP attributor & worker vote (§4.7): picks a dominant source if its
//! share exceeds the cutoff, and folds the three detector fires into the
//! worker's local `attack_flag`.

use crate::features::Features;

pub const NONE_IP: &str = "NONE";

/// Returns the hot IP (packet share > cutoff) if one exists.
pub fn hot_ip(features: &Features, cutoff: f64) -> Option<String> {
    if features.total_packets == 0 {
        return None;
    }
    let share = features.top_ip_packets as f64 / features.total_packets as f64;
    if share > cutoff {
        Some(features.top_ip.clone())
    } else {
        None
    }
}

/// `attack_flag` fires when at least `vote_threshold` of the detector
/// fires are true (§4.7: "at least 2 of 3" generalized to N detectors).
pub fn local_vote(fires: &[bool], vote_threshold: usize) -> bool {
    fires.iter().filter(|f| **f).count() >= vote_threshold
}

/// When `attack_flag` is set: hot IP if one exists, else `Features::top_ip`.
/// When clear: the literal sentinel "NONE".
pub fn suspicious_ip(attack_flag: bool, features: &Features, cutoff: f64) -> String {
    if !attack_flag {
        return NONE_IP.to_string();
    }
    hot_ip(features, cutoff).unwrap_or_else(|| features.top_ip.clone())
}
