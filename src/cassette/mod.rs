//! Record/replay of generator calls for network-free testing.
//!
//! Cassettes hold requests and outputs only, never credentials.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;
