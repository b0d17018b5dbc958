//! IP aggregator (§4.2): groups flows by source IP, with an
//! insertion-ordered index so the first-seen tie-break in §4.3/§9 stays
//! exact while lookups are O(1) (§9 explicitly allows substituting a
//! hash map for the linear scan).

use std::collections::HashMap;

use crate::config::MAX_UNIQUE_IPS;
use crate::flow::FlowRecord;

/// Per-source-IP aggregate within a single worker's shard.
#[derive(Debug, Clone, PartialEq)]
pub struct IpStat {
    pub ip: String,
    pub packet_count: u64,
    pub byte_count: u64,
}

#[derive(Debug, Default)]
pub struct IpAggregate {
    stats: Vec<IpStat>,
    index: HashMap<String, usize>,
    pub total_packets: u64,
    pub total_bytes: u64,
    pub min_ts: i64,
    pub max_ts: i64,
}

impl IpAggregate {
    pub fn build(flows: &[FlowRecord]) -> IpAggregate {
        let mut agg = IpAggregate {
            min_ts: i64::MAX,
            max_ts: i64::MIN,
            ..Default::default()
        };

        for flow in flows {
            agg.total_packets += flow.packets as u64;
            agg.total_bytes += flow.bytes;
            agg.min_ts = agg.min_ts.min(flow.timestamp);
            agg.max_ts = agg.max_ts.max(flow.timestamp);

            if let Some(&slot) = agg.index.get(&flow.src_ip) {
                let stat = &mut agg.stats[slot];
                stat.packet_count += flow.packets as u64;
                stat.byte_count += flow.bytes;
            } else if agg.stats.len() < MAX_UNIQUE_IPS {
                agg.index.insert(flow.src_ip.clone(), agg.stats.len());
                agg.stats.push(IpStat {
                    ip: flow.src_ip.clone(),
                    packet_count: flow.packets as u64,
                    byte_count: flow.bytes,
                });
            }
            // table full: new IP's packets/bytes still counted in the
            // global totals above, but no new IpStat slot is created.
        }

        if flows.is_empty() {
            agg.min_ts = 0;
            agg.max_ts = 0;
        }

        agg
    }

    pub fn stats(&self) -> &[IpStat] {
        &self.stats
    }

    pub fn unique_ips(&self) -> usize {
        self.stats.len()
    }

    /// Highest packet_count, ties broken by first occurrence (§4.3).
    pub fn top_ip(&self) -> Option<&IpStat> {
        let mut best: Option<&IpStat> = None;
        for stat in &self.stats {
            match best {
                Some(b) if stat.packet_count <= b.packet_count => {}
                _ => best = Some(stat),
            }
        }
        best
    }
}
