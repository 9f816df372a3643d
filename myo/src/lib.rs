//! Training pipeline for simulated muscle control policies.
//!
//! Ships a deterministic planar reach task standing in for the external
//! physics simulation, a CSV sink for per-episode statistics and the
//! `train` binary wiring the SAC agents of `myo-tch-agent` to the
//! episode loop of `myo-core`.
mod env;
pub use env::{ReachEnv, ReachEnvConfig};

mod recorder;
pub use recorder::CsvRecorder;
