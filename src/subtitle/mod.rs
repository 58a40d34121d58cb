//! Subtitle stream extraction module
//!
//! This module reconstructs subtitle cues from cluster contents:
//! - Block/SimpleBlock header decoding including lacing
//! - Cluster traversal with cluster-relative timing
//! - BlockDuration handling for cue end times

pub mod block;
pub mod cluster;

pub use block::{read_block_header, BlockHeader, Lacing};
pub use cluster::{analyze_cluster, find_track_start};
