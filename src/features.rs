//! Feature extractor (§4.3): derives the per-worker summary consumed by
//! all three detectors.

use crate::flow::FlowRecord;
use crate::ip_stats::IpAggregate;

#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    pub top_ip: String,
    pub top_ip_packets: u64,
    pub entropy: f64,
    pub avg_rate: f64,
    pub spike_score: f64,
    pub total_packets: u64,
    pub total_flows: u64,
    pub unique_ips: usize,
    pub packet_size_mean: f64,
    pub packet_size_std: f64,
    pub syn_ratio: f64,
    pub udp_ratio: f64,
    pub flow_duration_mean: f64,
}

impl Features {
    /// `total_flows` is the record count, per the chosen convention
    /// documented in DESIGN.md (the "enhanced" variant's reading of
    /// the otherwise-ambiguous field, §9).
    pub fn extract(flows: &[FlowRecord], agg: &IpAggregate) -> Features {
        if flows.is_empty() {
            return Features {
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
            };
        }

        let total_packets = agg.total_packets;
        let unique_ips = agg.unique_ips();

        let (top_ip, top_ip_packets) = match agg.top_ip() {
            Some(stat) => (stat.ip.clone(), stat.packet_count),
            None => ("NONE".to_string(), 0),
        };

        let entropy = shannon_entropy(agg.stats().iter().map(|s| s.packet_count), total_packets);

        let span = (agg.max_ts - agg.min_ts).max(1) as f64;
        let avg_rate = total_packets as f64 / span;

        let per_ip_mean = if unique_ips > 0 {
            (total_packets as f64 / unique_ips as f64).max(1.0)
        } else {
            1.0
        };
        let spike_score = top_ip_packets as f64 / per_ip_mean;

        let sizes: Vec<f64> = flows
            .iter()
            .map(|f| f.bytes as f64 / f.packets.max(1) as f64)
            .collect();
        let packet_size_mean = mean(&sizes);
        let packet_size_std = std_dev(&sizes, packet_size_mean);

        let tcp_count = flows.iter().filter(|f| f.is_tcp()).count();
        let udp_count = flows.iter().filter(|f| f.is_udp()).count();
        let syn_ratio = tcp_count as f64 / flows.len() as f64;
        let udp_ratio = udp_count as f64 / flows.len() as f64;

        Features {
            top_ip,
            top_ip_packets,
            entropy,
            avg_rate,
            spike_score,
            total_packets,
            total_flows: flows.len() as u64,
            unique_ips,
            packet_size_mean,
            packet_size_std,
            syn_ratio,
            udp_ratio,
            // §9: the span is recorded here, not a genuine per-flow mean;
            // the field name is kept for wire compatibility but this is
            // documented as a known naming mismatch.
            flow_duration_mean: span,
        }
    }
}

fn shannon_entropy(packet_counts: impl Iterator<Item = u64>, total_packets: u64) -> f64 {
    if total_packets == 0 {
        return 0.0;
    }
    let mut h = 0.0;
    for count in packet_counts {
        if count == 0 {
            continue;
        }
        let p = count as f64 / total_packets as f64;
        h -= p * p.log2();
    }
    h
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64], mean_value: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean_value).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(ip: &str, packets: u32, bytes: u64, ts: i64, protocol: u8) -> FlowRecord {
        FlowRecord {
            src_ip: ip.to_string(),
            dst_ip: "10.0.0.254".to_string(),
            bytes,
            timestamp: ts,
            protocol,
            src_port: 1,
            dst_port: 2,
            packets,
        }
    }

    #[test]
    fn entropy_is_zero_for_single_source() {
        let flows: Vec<FlowRecord> = (0..10).map(|i| flow("1.1.1.1", 1, 100, i, 6)).collect();
        let agg = IpAggregate::build(&flows);
        let f = Features::extract(&flows, &agg);
        assert_eq!(f.entropy, 0.0);
        assert_eq!(f.unique_ips, 1);
    }

    #[test]
    fn entropy_bounded_by_log2_unique_ips() {
        let mut flows = Vec::new();
        for i in 0..500 {
            flows.push(flow(&format!("10.0.{}.{}", i / 256, i % 256), 2, 500, i as i64, 6));
        }
        let agg = IpAggregate::build(&flows);
        let f = Features::extract(&flows, &agg);
        assert!(f.entropy >= 0.0);
        assert!(f.entropy <= (f.unique_ips as f64).log2() + 1e-9);
        // uniform distribution over 500 IPs: entropy ~= log2(500)
        assert!((f.entropy - (500f64).log2()).abs() < 0.01);
    }

    #[test]
    fn benign_uniform_traffic_scenario() {
        // 1000 flows, 500 distinct IPs, 2 packets of 500 bytes each,
        // span 100s (§8 scenario 2).
        let mut flows = Vec::new();
        for i in 0..500 {
            for _ in 0..2 {
                flows.push(flow(&format!("10.0.{}.{}", i / 256, i % 256), 1, 500, (i % 100) as i64, 6));
            }
        }
        let agg = IpAggregate::build(&flows);
        let f = Features::extract(&flows, &agg);
        assert_eq!(f.total_packets, 1000);
        assert!((f.entropy - (500f64).log2()).abs() < 0.01);
        assert!((f.spike_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn hot_source_flood_scenario() {
        // 950 from one IP, 50 spread over 50 IPs, span 10s (§8 scenario 3).
        let mut flows = Vec::new();
        for i in 0..950 {
            let ts = if i == 0 { 0 } else { 10 };
            flows.push(flow("10.0.0.1", 1, 500, ts, 6));
        }
        for i in 0..50 {
            flows.push(flow(&format!("10.0.1.{}", i), 1, 500, 10, 6));
        }
        let agg = IpAggregate::build(&flows);
        let f = Features::extract(&flows, &agg);
        assert_eq!(f.top_ip, "10.0.0.1");
        assert!(f.entropy < 2.0);
        assert!((f.avg_rate - 100.0).abs() < 1e-9);
    }
}
