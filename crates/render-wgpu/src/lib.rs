//! wgpu render backend for lightbox scenes.
//!
//! Meshes are drawn instanced, one draw per geometry kind and cull mode.
//! Lighting is Lambert from the first visible direct light plus summed
//! ambient. Light helpers and shadow-camera frusta are drawn as lines.
//!
//! # Invariants
//! - Rendering never mutates the scene graph.
//! - Shadow casting and receiving flags are carried but not rasterized.

mod batch;
mod gizmo;
mod gpu;
mod mesh;
mod shaders;

pub use gpu::{FrameStats, FrameTarget, WgpuRenderer};
