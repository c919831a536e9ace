//! Sample-buffer helpers shared by the channels.

pub mod helpers;

pub use helpers::{copy_samples, fill_silence, to_sample};
