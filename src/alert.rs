//! `Alert` (§3, §6): the single message type on the wire. Encoded
//! field-by-field with fixed-width little-endian integers and
//! length-prefixed strings, per the Design Notes' portability
//! requirement, rather than relying on an opaque struct memcpy.

use crate::error::{DetectorError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub worker_rank: u32,
    pub attack_flag: bool,
    pub suspicious_ip: String,
    pub entropy: f64,
    pub avg_rate: f64,
    pub spike_score: f64,
    pub total_packets: u64,
    pub total_flows: u64,
    pub entropy_detected: bool,
    pub cusum_detected: bool,
    pub ml_detected: bool,
    pub processing_time_ms: f64,
    pub memory_used_kb: f64,
    pub true_label: bool,
}

impl Alert {
    pub fn empty(worker_rank: u32) -> Alert {
        Alert {
            worker_rank,
            attack_flag: false,
            suspicious_ip: "NONE".to_string(),
            entropy: 0.0,
            avg_rate: 0.0,
            spike_score: 0.0,
            total_packets: 0,
            total_flows: 0,
            entropy_detected: false,
            cusum_detected: false,
            ml_detected: false,
            processing_time_ms: 0.0,
            memory_used_kb: 0.0,
            true_label: false,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(96);
        buf.extend_from_slice(&self.worker_rank.to_le_bytes());
        buf.push(self.attack_flag as u8);

        let ip_bytes = self.suspicious_ip.as_bytes();
        buf.extend_from_slice(&(ip_bytes.len() as u32).to_le_bytes());
        buf.extend_from_slice(ip_bytes);

        buf.extend_from_slice(&self.entropy.to_le_bytes());
        buf.extend_from_slice(&self.avg_rate.to_le_bytes());
        buf.extend_from_slice(&self.spike_score.to_le_bytes());
        buf.extend_from_slice(&self.total_packets.to_le_bytes());
        buf.extend_from_slice(&self.total_flows.to_le_bytes());
        buf.push(self.entropy_detected as u8);
        buf.push(self.cusum_detected as u8);
        buf.push(self.ml_detected as u8);
        buf.extend_from_slice(&self.processing_time_ms.to_le_bytes());
        buf.extend_from_slice(&self.memory_used_kb.to_le_bytes());
        buf.push(self.true_label as u8);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Alert> {
        let mut cursor = Cursor::new(bytes);
        let worker_rank = cursor.read_u32()?;
        let attack_flag = cursor.read_bool()?;
        let ip_len = cursor.read_u32()? as usize;
        let suspicious_ip = cursor.read_string(ip_len)?;
        let entropy = cursor.read_f64()?;
        let avg_rate = cursor.read_f64()?;
        let spike_score = cursor.read_f64()?;
        let total_packets = cursor.read_u64()?;
        let total_flows = cursor.read_u64()?;
        let entropy_detected = cursor.read_bool()?;
        let cusum_detected = cursor.read_bool()?;
        let ml_detected = cursor.read_bool()?;
        let processing_time_ms = cursor.read_f64()?;
        let memory_used_kb = cursor.read_f64()?;
        let true_label = cursor.read_bool()?;

        Ok(Alert {
            worker_rank,
            attack_flag,
            suspicious_ip,
            entropy,
            avg_rate,
            spike_score,
            total_packets,
            total_flows,
            entropy_detected,
            cusum_detected,
            ml_detected,
            processing_time_ms,
            memory_used_kb,
            true_label,
        })
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Cursor { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.bytes.len() {
            return Err(DetectorError::Parse("truncated alert payload".to_string()));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.take(1)?[0] != 0)
    }

    fn read_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| DetectorError::Parse(format!("invalid utf-8 in ip: {}", e)))
    }
}
