//! Flat-file persistence for shared roadmaps.

pub mod share;

pub use share::{ShareEntry, ShareStore};
