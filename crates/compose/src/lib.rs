//! Scene composition: turns a static [`SceneConfig`] into a populated scene
//! graph and the control bindings a debug panel exposes for its light.
//!
//! # Invariants
//! - Composition never fails; bad configuration is reported in
//!   [`Composition::diagnostics`] and replaced by safe defaults.
//! - Control bindings only name fields the bound light variant has.

pub mod composer;
pub mod config;
pub mod controls;

pub use composer::{
    Composition, LIGHT_POSITION, MARKER_RADIUS, SMOOTH_SHADOW_BIAS, SMOOTH_SHADOW_MAP_SIZE,
    compose, ground_size,
};
pub use config::{CameraConfig, ConfigError, LightType, MAX_GRID_COUNT, SceneConfig};
pub use controls::{ControlBinding, ControlPanel, ControlSet, LightField, bindings_for};
