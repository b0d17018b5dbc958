//! Metrics & logging sinks (§4.8 step 6, §6): append-only CSV rows plus
//! the simulated iptables rule log. Written only by the coordinator.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::alert::Alert;
use crate::coordinator::{BlockingStats, FusionResult};
use crate::error::Result;

pub struct RunPaths {
    pub alerts_csv: PathBuf,
    pub performance_csv: PathBuf,
    pub blocking_csv: PathBuf,
    pub iptables_rules: PathBuf,
}

impl RunPaths {
    pub fn under(results_dir: &Path) -> RunPaths {
        RunPaths {
            alerts_csv: results_dir.join("alerts.csv"),
            performance_csv: results_dir.join("performance.csv"),
            blocking_csv: results_dir.join("blocking.csv"),
            iptables_rules: results_dir.join("iptables_rules.txt"),
        }
    }

    pub fn ensure_dir(results_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(results_dir)?;
        Ok(())
    }
}

fn append_writer(path: &Path) -> Result<File> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// One row per worker, per run (§6 alerts.csv schema).
pub fn append_alert_rows(paths: &RunPaths, result: &FusionResult) -> Result<()> {
    let file = append_writer(&paths.alerts_csv)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    for alert in &result.alerts {
        let chosen_ip = result.blocked_ip.clone().unwrap_or_else(|| "NONE".to_string());
        writer.write_record(&[
            alert.worker_rank.to_string(),
            (alert.attack_flag as u8).to_string(),
            alert.suspicious_ip.clone(),
            alert.entropy.to_string(),
            alert.avg_rate.to_string(),
            alert.spike_score.to_string(),
            alert.total_packets.to_string(),
            alert.total_flows.to_string(),
            (alert.entropy_detected as u8).to_string(),
            (alert.cusum_detected as u8).to_string(),
            (alert.ml_detected as u8).to_string(),
            (result.global_attack as u8).to_string(),
            chosen_ip,
            alert.processing_time_ms.to_string(),
            alert.memory_used_kb.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// One row per run (§6 performance.csv schema).
pub fn append_performance_row(paths: &RunPaths, result: &FusionResult, cpu_pct: f64, mem_kb: f64) -> Result<()> {
    let file = append_writer(&paths.performance_csv)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    let perf = &result.performance;
    writer.write_record(&[
        perf.detection_latency_ms.to_string(),
        perf.throughput_pps.to_string(),
        perf.throughput_gbps.to_string(),
        perf.total_packets.to_string(),
        perf.total_bytes.to_string(),
        perf.confusion.tp.to_string(),
        perf.confusion.fp.to_string(),
        perf.confusion.tn.to_string(),
        perf.confusion.fn_.to_string(),
        cpu_pct.to_string(),
        mem_kb.to_string(),
        perf.comm_overhead_ms.to_string(),
    ])?;
    writer.flush()?;
    Ok(())
}

/// One row per confirmed attack (§6 blocking.csv schema).
pub fn append_blocking_row(paths: &RunPaths, stats: &BlockingStats, block_time_ms: f64) -> Result<()> {
    let file = append_writer(&paths.blocking_csv)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record(&[
        stats.blocked_ip.clone(),
        stats.packets_blocked.to_string(),
        stats.legitimate_blocked.to_string(),
        stats.efficiency.to_string(),
        stats.collateral.to_string(),
        block_time_ms.to_string(),
    ])?;
    writer.flush()?;
    Ok(())
}

/// Two shell lines per block (§6): `iptables -A INPUT ...` / `-A OUTPUT ...`.
pub fn append_iptables_rules(paths: &RunPaths, ip: &str) -> Result<()> {
    let mut file = append_writer(&paths.iptables_rules)?;
    writeln!(file, "iptables -A INPUT -s {} -j DROP", ip)?;
    writeln!(file, "iptables -A OUTPUT -d {} -j DROP", ip)?;
    Ok(())
}

/// Human-readable stdout summary (§6): confirmation banner, per-detector
/// vote counts, and the performance/accuracy summary.
pub fn print_summary(result: &FusionResult) {
    if result.global_attack {
        println!("[COORDINATOR] DDoS ATTACK CONFIRMED");
        if let Some(ip) = &result.blocked_ip {
            println!("  blackhole target: {}", ip);
        }
    } else {
        println!("[COORDINATOR] No global attack detected");
    }

    let entropy_votes = result.alerts.iter().filter(|a| a.entropy_detected).count();
    let cusum_votes = result.alerts.iter().filter(|a| a.cusum_detected).count();
    let ml_votes = result.alerts.iter().filter(|a| a.ml_detected).count();
    println!(
        "  detector votes: entropy={} cusum={} ml={}",
        entropy_votes, cusum_votes, ml_votes
    );

    let perf = &result.performance;
    println!(
        "  latency={:.2}ms throughput={:.1}pps ({:.4}Gbps) comm_overhead={:.2}ms",
        perf.detection_latency_ms, perf.throughput_pps, perf.throughput_gbps, perf.comm_overhead_ms
    );
    println!(
        "  precision={:.3} recall={:.3} f1={:.3}",
        perf.confusion.precision(),
        perf.confusion.recall(),
        perf.confusion.f1()
    );
}

pub fn print_worker_line(alert: &Alert) {
    println!(
        "[Worker {}] Detection complete: entropy={}, cusum={}, ml={}, attack={}",
        alert.worker_rank,
        alert.entropy_detected as u8,
        alert.cusum_detected as u8,
        alert.ml_detected as u8,
        alert.attack_flag as u8
    );
}
