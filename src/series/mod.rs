//! Incremental synchronization of historical series: gap detection,
//! payload normalization and the cache merge.

mod gaps;
mod merge;
mod normalize;

pub use gaps::detect_gaps;
pub use merge::merge;
pub use normalize::normalize;
