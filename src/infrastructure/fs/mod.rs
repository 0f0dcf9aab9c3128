//! File System
//!
//! Local disk access for inputs and atomic output writes.

mod local;

pub use local::LocalFs;
