//! `FlowRecord` and the per-rank shard reader (§4.1, §6).

use log::warn;
use std::path::Path;

use crate::config::MAX_FLOWS;
use crate::error::Result;

/// One input row. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRecord {
    pub src_ip: String,
    pub dst_ip: String,
    pub bytes: u64,
    pub timestamp: i64,
    pub protocol: u8,
    pub src_port: u16,
    pub dst_port: u16,
    pub packets: u32,
}

const TCP: u8 = 6;
const UDP: u8 = 17;

impl FlowRecord {
    /// Parses one data line: `src_ip,dst_ip,bytes,timestamp,protocol,src_port,dst_port,packets`.
    /// Accepted if at least the first four fields parse; trailing fields
    /// default (packets defaults to 1, per §3's invariant `packet_count ≥ 1`).
    fn parse(line: &str) -> Option<FlowRecord> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 4 {
            return None;
        }
        let src_ip = fields[0].to_string();
        if src_ip.len() > 31 {
            return None;
        }
        let dst_ip = fields.get(1).map(|s| s.to_string()).unwrap_or_default();
        let bytes: u64 = fields[2].parse().ok()?;
        let timestamp: i64 = fields[3].parse().ok()?;
        let protocol: u8 = fields.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);
        let src_port: u16 = fields.get(5).and_then(|s| s.parse().ok()).unwrap_or(0);
        let dst_port: u16 = fields.get(6).and_then(|s| s.parse().ok()).unwrap_or(0);
        let packets: u32 = fields
            .get(7)
            .and_then(|s| s.parse().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        Some(FlowRecord {
            src_ip,
            dst_ip,
            bytes,
            timestamp,
            protocol,
            src_port,
            dst_port,
            packets,
        })
    }

    pub fn is_tcp(&self) -> bool {
        self.protocol == TCP
    }

    pub fn is_udp(&self) -> bool {
        self.protocol == UDP
    }
}

fn looks_like_header(line: &str) -> bool {
    line.contains("Source IP") || line.contains("Flow ID")
}

/// Reads `<dataset_root>/partitions/part_<rank>.csv` for one worker rank.
/// A missing file is not an error: it returns zero records so the worker
/// can still send an empty Alert (§4.1).
pub fn read_shard(dataset_root: &Path, rank: usize) -> Result<Vec<FlowRecord>> {
    let path = dataset_root
        .join("partitions")
        .join(format!("part_{}.csv", rank));

    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) => {
            warn!("shard {} unreadable ({}): sending empty alert", path.display(), err);
            return Ok(Vec::new());
        }
    };

    let mut records = Vec::new();
    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if idx == 0 || looks_like_header(line) {
            continue;
        }
        match FlowRecord::parse(line) {
            Some(record) => records.push(record),
            None => warn!("shard {} line {}: malformed, skipping", path.display(), idx + 1),
        }
        if records.len() >= MAX_FLOWS {
            break;
        }
    }
    Ok(records)
}
