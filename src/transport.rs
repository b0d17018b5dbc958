//! The message-passing fabric (§2, §5, §6). Ranks are modeled as OS
//! threads rather than OS processes (see `SPEC_FULL.md` §2 for the
//! rationale); `crossbeam_channel`'s multi-producer, single-consumer
//! channel gives the coordinator exactly the "receive from any source,
//! in arrival order" wildcard semantics the wire protocol calls for,
//! with each worker's `Sender` clone standing in for its outbound
//! connection.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use crate::error::{DetectorError, Result};

pub const ALERT_TAG: u32 = 0;

/// One wire message: a tagged, opaque byte payload plus the sending
/// rank, matching §6's "tag = 0, opaque byte payload = packed Alert".
#[derive(Debug, Clone)]
pub struct Message {
    pub rank: usize,
    pub tag: u32,
    pub payload: Vec<u8>,
}

pub fn channel() -> (Sender<Message>, Receiver<Message>) {
    crossbeam_channel::unbounded()
}

/// A single timed receive, used by the coordinator to track each
/// alert's arrival as communication overhead (§4.8 step 1).
pub fn recv_timed(rx: &Receiver<Message>) -> Result<(Message, Duration)> {
    let start = Instant::now();
    let msg = rx
        .recv()
        .map_err(|e| DetectorError::Channel(e.to_string()))?;
    Ok((msg, start.elapsed()))
}
