//! Utility modules shared by the build pipeline.

pub mod date;
pub mod placeholder;
pub mod slug;
