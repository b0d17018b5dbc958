//! The three detectors share a common shape: `(Features, &mut State) ->
//! bool`, expressed here as a `Detector` trait so the worker driver holds
//! a sequence of values and the vote threshold scales with however many
//! detectors are configured (§9, "Polymorphism over detectors").

pub mod cusum;
pub mod entropy;
pub mod ml;

use crate::features::Features;

pub trait Detector {
    /// Human-readable name, used in the per-worker log line and in
    /// `Alert`'s per-detector flags.
    fn name(&self) -> &'static str;

    /// Runs the detector against this round's features, mutating any
    /// internal state (CUSUM's rolling history; the others are stateless).
    fn classify(&mut self, features: &Features) -> bool;
}

pub use cusum::CusumDetector;
pub use entropy::EntropyDetector;
pub use ml::MlDetector;
