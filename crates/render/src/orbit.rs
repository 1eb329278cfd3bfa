//! Damped orbit camera control.
//!
//! Input (drag, scroll) is buffered as pending deltas; each `update` applies a
//! `damping` fraction of what is pending and keeps the rest for later frames,
//! so motion eases out after the pointer stops.

use glam::{Vec2, Vec3};

use crate::renderer::Camera;

/// Anything that moves the camera once per frame.
pub trait CameraControl {
    /// Advance internal state by `dt` seconds and write the result to `camera`.
    fn update(&mut self, camera: &mut Camera, dt: f32);
}

const REFERENCE_FRAME: f32 = 1.0 / 60.0;
const SETTLE_EPSILON: f32 = 1e-5;

/// Orbit around a focus point with yaw/pitch, zoom and pan.
#[derive(Debug, Clone)]
pub struct OrbitController {
    pub target: Vec3,
    pub distance: f32,
    /// Angle around +Y, radians; 0 looks from +Z.
    pub yaw: f32,
    /// Elevation above the XZ plane, radians.
    pub pitch: f32,
    /// Fraction of pending motion applied per 60 Hz frame, `0..=1`.
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pending_rotate: Vec2,
    pending_pan: Vec2,
    pending_zoom: f32,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 10.0,
            yaw: 0.0,
            pitch: 0.5,
            damping: 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.001,
            min_distance: 1.0,
            max_distance: 500.0,
            min_pitch: -89.0_f32.to_radians(),
            max_pitch: 89.0_f32.to_radians(),
            pending_rotate: Vec2::ZERO,
            pending_pan: Vec2::ZERO,
            pending_zoom: 0.0,
        }
    }
}

impl OrbitController {
    /// Start from wherever `camera` currently is.
    pub fn from_camera(camera: &Camera) -> Self {
        let offset = camera.eye - camera.target;
        let distance = offset.length().max(f32::EPSILON);
        let mut orbit = Self {
            target: camera.target,
            distance,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            ..Self::default()
        };
        orbit.distance = orbit.distance.clamp(orbit.min_distance, orbit.max_distance);
        orbit
    }

    /// Queue a rotation from a pointer drag of `(dx, dy)` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.pending_rotate += Vec2::new(dx, dy) * self.rotate_speed;
    }

    /// Queue a pan from a pointer drag of `(dx, dy)` pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pending_pan += Vec2::new(dx, dy) * self.pan_speed;
    }

    /// Queue a zoom; positive `scroll` moves closer.
    pub fn zoom(&mut self, scroll: f32) {
        self.pending_zoom += scroll * self.zoom_speed;
    }

    /// True when no buffered motion is left.
    pub fn is_settled(&self) -> bool {
        self.pending_rotate.length() < SETTLE_EPSILON
            && self.pending_pan.length() < SETTLE_EPSILON
            && self.pending_zoom.abs() < SETTLE_EPSILON
    }

    /// Camera position implied by the current orbit.
    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(cp * sy, sp, cp * cy) * self.distance
    }

    fn right(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(cy, 0.0, -sy)
    }

    fn up(&self) -> Vec3 {
        let forward = (self.target - self.eye()).normalize_or(Vec3::NEG_Z);
        self.right().cross(forward)
    }
}

impl CameraControl for OrbitController {
    fn update(&mut self, camera: &mut Camera, dt: f32) {
        let f = (self.damping * dt.max(0.0) / REFERENCE_FRAME).clamp(0.0, 1.0);

        let rotate = self.pending_rotate * f;
        self.pending_rotate -= rotate;
        self.yaw -= rotate.x;
        self.pitch = (self.pitch + rotate.y).clamp(self.min_pitch, self.max_pitch);

        let zoom = self.pending_zoom * f;
        self.pending_zoom -= zoom;
        self.distance = (self.distance * (-zoom).exp()).clamp(self.min_distance, self.max_distance);

        let pan = self.pending_pan * f;
        self.pending_pan -= pan;
        let offset = (self.right() * -pan.x + self.up() * pan.y) * self.distance;
        self.target += offset;

        camera.target = self.target;
        camera.eye = self.eye();
    }
}
