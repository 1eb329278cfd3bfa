//! Shared types used by every lightbox crate.

mod types;

pub use types::{Color, NodeId, Transform};
