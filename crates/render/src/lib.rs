//! Rendering adapter: renderer-agnostic interface plus the per-frame driver.
//!
//! # Invariants
//! - Renderers read the scene graph; they never mutate it.
//! - Only the frame driver's animator and camera control change state per frame.
//! - A tick never blocks; the host's frame scheduler re-enters the driver.

mod animation;
mod driver;
mod orbit;
mod renderer;
mod timing;

pub use animation::{
    AnimationState, Animator, MAX_SCALE, MIN_SCALE, ROTATION_STEP, SCALE_STEP, ScalePhase,
};
pub use driver::{FrameDriver, FrameScheduler, LoopState, ManualScheduler};
pub use orbit::{CameraControl, OrbitController};
pub use renderer::{Camera, DebugTextRenderer, Renderer};
pub use timing::FrameTimer;
