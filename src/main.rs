mod alert;
mod attributor;
mod config;
mod coordinator;
mod detector;
mod error;
mod features;
mod flow;
mod ip_stats;
mod metrics;
mod transport;
mod worker;

use std::path::{Path, PathBuf};

use clap::Parser;
use log::error;

use config::Config;
use metrics::RunPaths;

/// Distributed DDoS anomaly detector.
///
/// Mirrors `mpirun -np <N> ./ddos_detector <data_root>`: rank 0 is the
/// coordinator, ranks 1..N-1 are workers, each reading
/// `<dataset_root>/partitions/part_<rank>.csv`. With no MPI launcher
/// available, `--workers` stands in for `-np`.
#[derive(Parser, Debug)]
#[command(name = "ddos-sentinel", version)]
struct Cli {
    /// Root directory containing `partitions/part_<rank>.csv` shards.
    dataset_root: Option<PathBuf>,

    /// Number of worker ranks (N-1). Defaults to the number of shard
    /// files found under `<dataset_root>/partitions`.
    #[arg(long)]
    workers: Option<usize>,

    /// Optional TOML file overriding detector thresholds (§4.9).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where alerts.csv / performance.csv / blocking.csv / iptables_rules.txt land.
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Use the "basic" entropy threshold (1.0) instead of the enhanced
    /// default (2.0), per §4.4's two documented variants.
    #[arg(long)]
    basic_entropy: bool,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let dataset_root = match &cli.dataset_root {
        Some(root) => root.clone(),
        None => {
            print_usage();
            return;
        }
    };

    let mut cfg = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                error!("failed to load config {}: {}", path.display(), err);
                return;
            }
        },
        None => Config::default(),
    };
    if cli.basic_entropy {
        cfg = cfg.basic_entropy();
    }
    if let Some(dir) = &cli.results_dir {
        cfg.results_dir = dir.to_string_lossy().into_owned();
    }

    let num_workers = cli
        .workers
        .unwrap_or_else(|| count_shards(&dataset_root).unwrap_or_else(num_cpus::get));

    // §6/§7: N<2 aborts before any detection with a usage message, exit 0.
    if num_workers < 1 {
        print_usage();
        return;
    }

    run(&dataset_root, num_workers, &cfg);
}

fn print_usage() {
    println!("Usage: ddos-sentinel <dataset_root> [--workers N]");
    println!("Example: ddos-sentinel data --workers 4");
    println!("Need at least 2 ranks total (1 coordinator + 1 worker)");
}

fn count_shards(dataset_root: &Path) -> Option<usize> {
    let partitions = dataset_root.join("partitions");
    let entries = std::fs::read_dir(partitions).ok()?;
    let count = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with("part_")
        })
        .count();
    if count == 0 {
        None
    } else {
        Some(count)
    }
}

/// Spawns one thread per worker rank (1..=num_workers), each of which
/// builds its `Alert` and sends it over the shared channel; the calling
/// thread plays the coordinator (rank 0), receiving exactly
/// `num_workers` alerts in arrival order (§2, §5).
fn run(dataset_root: &Path, num_workers: usize, cfg: &Config) {
    let (tx, rx) = transport::channel();

    let mut handles = Vec::with_capacity(num_workers);
    for rank in 1..=num_workers {
        let tx = tx.clone();
        let dataset_root = dataset_root.to_path_buf();
        let cfg = cfg.clone();
        handles.push(std::thread::spawn(move || {
            let msg = worker::run_worker(rank, &dataset_root, &cfg);
            let _ = tx.send(msg);
        }));
    }
    drop(tx); // coordinator only needs the workers' clones

    let result = match coordinator::run_coordinator(&rx, num_workers, cfg) {
        Ok(result) => result,
        Err(err) => {
            error!("coordinator failed: {}", err);
            return;
        }
    };

    for handle in handles {
        let _ = handle.join();
    }

    for alert in &result.alerts {
        metrics::print_worker_line(alert);
    }
    metrics::print_summary(&result);

    if let Err(err) = write_logs(cfg, &result) {
        error!("failed to write result logs: {}", err);
    }
}

fn write_logs(cfg: &Config, result: &coordinator::FusionResult) -> error::Result<()> {
    let results_dir = PathBuf::from(&cfg.results_dir);
    RunPaths::ensure_dir(&results_dir)?;
    let paths = RunPaths::under(&results_dir);

    metrics::append_alert_rows(&paths, result)?;
    // cpu%/mem_kb are not tracked per-process in this single-binary
    // simulation; recorded as 0.0 (see DESIGN.md).
    metrics::append_performance_row(&paths, result, 0.0, 0.0)?;

    if let (Some(ip), Some(stats)) = (&result.blocked_ip, &result.blocking) {
        metrics::append_blocking_row(&paths, stats, result.block_time_ms.unwrap_or(0.0))?;
        metrics::append_iptables_rules(&paths, ip)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_shards_counts_part_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let partitions = dir.path().join("partitions");
        std::fs::create_dir_all(&partitions).unwrap();
        std::fs::write(partitions.join("part_1.csv"), "").unwrap();
        std::fs::write(partitions.join("part_2.csv"), "").unwrap();
        std::fs::write(partitions.join("readme.txt"), "").unwrap();
        assert_eq!(count_shards(dir.path()), Some(2));
    }

    #[test]
    fn count_shards_missing_dir_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(count_shards(dir.path()), None);
    }

    #[test]
    fn end_to_end_three_workers_two_votes_confirms_attack() {
        let dir = tempfile::tempdir().unwrap();
        let partitions = dir.path().join("partitions");
        std::fs::create_dir_all(&partitions).unwrap();

        // worker 1: hot-source flood -> attack
        write_flood_shard(&partitions.join("part_1.csv"));
        // worker 2: rate burst -> attack, higher avg_rate (chosen)
        write_burst_shard(&partitions.join("part_2.csv"));
        // worker 3: benign uniform traffic -> no attack
        write_benign_shard(&partitions.join("part_3.csv"));

        let results_dir = dir.path().join("out");
        let mut cfg = Config::default();
        cfg.results_dir = results_dir.to_string_lossy().into_owned();

        run(dir.path(), 3, &cfg);

        let alerts_csv = results_dir.join("alerts.csv");
        assert!(alerts_csv.exists());
        let contents = std::fs::read_to_string(&alerts_csv).unwrap();
        assert_eq!(contents.lines().count(), 3);

        let blocking_csv = results_dir.join("blocking.csv");
        assert!(blocking_csv.exists());
        let blocking_contents = std::fs::read_to_string(&blocking_csv).unwrap();
        assert_eq!(blocking_contents.lines().count(), 1);
    }

    fn write_flood_shard(path: &Path) {
        use std::io::Write;
        let mut f = std::fs::File::create(path).unwrap();
        writeln!(f, "header").unwrap();
        for i in 0..950 {
            let ts = if i == 0 { 0 } else { 10 };
            writeln!(f, "10.0.0.1,10.0.0.254,500,{},6,1,2,1", ts).unwrap();
        }
        for i in 0..50 {
            writeln!(f, "10.0.1.{},10.0.0.254,500,10,6,1,2,1", i).unwrap();
        }
    }

    fn write_burst_shard(path: &Path) {
        use std::io::Write;
        let mut f = std::fs::File::create(path).unwrap();
        writeln!(f, "header").unwrap();
        for i in 0..50_000 {
            let ts = if i == 0 { 0 } else { 1 };
            writeln!(f, "10.0.{}.{},10.0.0.254,500,{},6,1,2,1", (i % 1000) / 256, (i % 1000) % 256, ts).unwrap();
        }
    }

    fn write_benign_shard(path: &Path) {
        use std::io::Write;
        let mut f = std::fs::File::create(path).unwrap();
        writeln!(f, "header").unwrap();
        for i in 0..500 {
            for j in 0..2 {
                let ts = if i == 0 && j == 0 { 0 } else { 100 };
                writeln!(f, "10.0.{}.{},10.0.0.254,500,{},6,1,2,1", i / 256, i % 256, ts).unwrap();
            }
        }
    }
}
