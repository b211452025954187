//! Application services built on the ports.

pub mod detection;

pub use detection::{DetectError, Detection, DetectionService};
