//! Cross-crate integration flows.

pub mod end_to_end;
pub mod pipeline;
pub mod rotation;
