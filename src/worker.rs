//! Worker driver (§4, "Worker driver" row): sequences shard read →
//! aggregate → features → detectors → vote → `Alert`, then sends it.

use std::path::Path;
use std::time::Instant;

use log::info;

use crate::alert::Alert;
use crate::attributor::{local_vote, suspicious_ip};
use crate::config::Config;
use crate::detector::{CusumDetector, Detector, EntropyDetector, MlDetector};
use crate::features::Features;
use crate::flow::read_shard;
use crate::ip_stats::IpAggregate;
use crate::transport::{Message, ALERT_TAG};

/// Ground-truth hint used to populate `Alert::true_label` for the
/// confusion matrix (§4.8 step 5). §6 calls this "a true_label (from
/// external ground-truth hint)" without specifying its source; this
/// crate resolves the ambiguity the same way
/// `original_source/detector_enhanced.c:241-242` does, substring-
/// matching the dataset root's path against the CIC-DDoS2019 attack
/// folder names (`DrDoS`, `Syn`) rather than inventing a new sidecar
/// file format with no producer anywhere in the pipeline.
fn true_label_hint(dataset_root: &Path) -> bool {
    let root = dataset_root.to_string_lossy();
    root.contains("DrDoS") || root.contains("Syn")
}

pub fn run_worker(rank: usize, dataset_root: &Path, cfg: &Config) -> Message {
    let start = Instant::now();

    let flows = read_shard(dataset_root, rank).unwrap_or_default();

    if flows.is_empty() {
        info!("[Worker {}] no data, sending empty alert", rank);
        let alert = Alert::empty(rank as u32);
        return Message {
            rank,
            tag: ALERT_TAG,
            payload: alert.encode(),
        };
    }

    let agg = IpAggregate::build(&flows);
    let features = Features::extract(&flows, &agg);

    let mut entropy_det = EntropyDetector::new(cfg.entropy_threshold);
    let mut cusum_det = CusumDetector::new(
        cfg.cusum_window,
        cfg.cusum_baseline_mean,
        cfg.cusum_baseline_std,
        cfg.cusum_slack,
        cfg.cusum_alarm,
    );
    let mut ml_det = MlDetector::new(cfg.ml_weights, cfg.ml_threshold);

    let entropy_fired = entropy_det.classify(&features);
    let cusum_fired = cusum_det.classify(&features);
    let ml_fired = ml_det.classify(&features);

    let attack_flag = local_vote(
        &[entropy_fired, cusum_fired, ml_fired],
        cfg.local_vote_threshold,
    );
    let ip = suspicious_ip(attack_flag, &features, cfg.hot_ip_cutoff);

    let processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
    let memory_used_kb = estimate_memory_kb(flows.len(), agg.unique_ips());

    let alert = Alert {
        worker_rank: rank as u32,
        attack_flag,
        suspicious_ip: ip,
        entropy: features.entropy,
        avg_rate: features.avg_rate,
        spike_score: features.spike_score,
        total_packets: features.total_packets,
        total_flows: features.total_flows,
        entropy_detected: entropy_fired,
        cusum_detected: cusum_fired,
        ml_detected: ml_fired,
        processing_time_ms,
        memory_used_kb,
        true_label: true_label_hint(dataset_root),
    };

    info!(
        "[Worker {}] Detection complete: entropy={}, cusum={}, ml={}, attack={}",
        rank, entropy_fired as u8, cusum_fired as u8, ml_fired as u8, attack_flag as u8
    );

    Message {
        rank,
        tag: ALERT_TAG,
        payload: alert.encode(),
    }
}

fn estimate_memory_kb(num_flows: usize, unique_ips: usize) -> f64 {
    const FLOW_RECORD_BYTES: usize = 96;
    const IP_STAT_BYTES: usize = 64;
    ((num_flows * FLOW_RECORD_BYTES + unique_ips * IP_STAT_BYTES) as f64) / 1024.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_shard(dir: &Path, rank: usize, lines: &[&str]) {
        let partitions = dir.join("partitions");
        std::fs::create_dir_all(&partitions).unwrap();
        let mut f = std::fs::File::create(partitions.join(format!("part_{}.csv", rank))).unwrap();
        writeln!(f, "Source IP,Dest IP,Bytes,Timestamp").unwrap();
        for line in lines {
            writeln!(f, "{}", line).unwrap();
        }
    }

    #[test]
    fn no_data_worker_sends_empty_alert() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::default();
        let msg = run_worker(4, dir.path(), &cfg);
        let alert = Alert::decode(&msg.payload).unwrap();
        assert_eq!(alert.worker_rank, 4);
        assert!(!alert.attack_flag);
        assert_eq!(alert.suspicious_ip, "NONE");
        assert_eq!(alert.total_packets, 0);
    }

    #[test]
    fn determinism_same_shard_same_alert_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let lines: Vec<String> = (0..100)
            .map(|i| format!("10.0.0.{},10.0.0.254,500,{},6,1,2,1", i % 10, i))
            .collect();
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        write_shard(dir.path(), 1, &refs);

        let cfg = Config::default();
        let a = run_worker(1, dir.path(), &cfg);
        let b = run_worker(1, dir.path(), &cfg);

        let alert_a = Alert::decode(&a.payload).unwrap();
        let alert_b = Alert::decode(&b.payload).unwrap();
        // processing_time_ms / memory are wall-clock/estimate, excluded
        // from the determinism comparison; everything derived from the
        // shard itself must match exactly.
        assert_eq!(alert_a.entropy, alert_b.entropy);
        assert_eq!(alert_a.avg_rate, alert_b.avg_rate);
        assert_eq!(alert_a.spike_score, alert_b.spike_score);
        assert_eq!(alert_a.attack_flag, alert_b.attack_flag);
        assert_eq!(alert_a.suspicious_ip, alert_b.suspicious_ip);
    }

    #[test]
    fn true_label_hint_matches_drdos_and_syn_dataset_names() {
        assert!(true_label_hint(Path::new("/data/DrDoS_NTP")));
        assert!(true_label_hint(Path::new("/data/Syn")));
        assert!(!true_label_hint(Path::new("/data/Benign")));
    }

    #[test]
    fn run_worker_sets_true_label_from_dataset_root_name() {
        let dir = tempfile::tempdir().unwrap();
        let attack_root = dir.path().join("DrDoS_UDP");
        write_shard(&attack_root, 1, &["10.0.0.1,10.0.0.254,500,0,6,1,2,1"]);
        let cfg = Config::default();
        let msg = run_worker(1, &attack_root, &cfg);
        let alert = Alert::decode(&msg.payload).unwrap();
        assert!(alert.true_label);

        let benign_root = dir.path().join("Benign");
        write_shard(&benign_root, 1, &["10.0.0.1,10.0.0.254,500,0,6,1,2,1"]);
        let msg = run_worker(1, &benign_root, &cfg);
        let alert = Alert::decode(&msg.payload).unwrap();
        assert!(!alert.true_label);
    }
}
