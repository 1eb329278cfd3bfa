//! Light variants, their shadow cameras and debug helpers.

use glam::Vec3;
use lightbox_common::{Color, NodeId};
use serde::{Deserialize, Serialize};

use crate::object::{ObjectKind, SceneObject};

/// Default shadow map resolution (per side).
pub const DEFAULT_SHADOW_MAP_SIZE: u32 = 512;

/// Projection volume used to render a light's depth map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShadowProjection {
    Perspective {
        fov_degrees: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowCamera {
    pub projection: ShadowProjection,
    pub map_size: u32,
    pub bias: f32,
}

impl ShadowCamera {
    pub fn perspective(fov_degrees: f32) -> Self {
        Self {
            projection: ShadowProjection::Perspective {
                fov_degrees,
                near: 0.5,
                far: 500.0,
            },
            map_size: DEFAULT_SHADOW_MAP_SIZE,
            bias: 0.0,
        }
    }

    /// Symmetric orthographic box of half-size `extent` on each side.
    pub fn orthographic(extent: f32) -> Self {
        Self {
            projection: ShadowProjection::Orthographic {
                left: -extent,
                right: extent,
                top: extent,
                bottom: -extent,
                near: 0.5,
                far: 500.0,
            },
            map_size: DEFAULT_SHADOW_MAP_SIZE,
            bias: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightKind {
    Point,
    Directional,
    Spot,
    Ambient,
}

impl std::fmt::Display for LightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Point => "point",
            Self::Directional => "directional",
            Self::Spot => "spot",
            Self::Ambient => "ambient",
        };
        f.write_str(s)
    }
}

/// A light. Each variant carries only the fields meaningful to it.
///
/// Directional and spot lights aim at `target` (world space); the light's
/// own position comes from its node transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Point {
        color: Color,
        intensity: f32,
        /// Cutoff distance; 0 means no cutoff.
        distance: f32,
        decay: f32,
        shadow: ShadowCamera,
    },
    Directional {
        color: Color,
        intensity: f32,
        target: Vec3,
        shadow: ShadowCamera,
    },
    Spot {
        color: Color,
        intensity: f32,
        target: Vec3,
        distance: f32,
        /// Half-angle of the cone, radians.
        angle: f32,
        /// Fraction of the cone attenuated towards the edge, `0..=1`.
        penumbra: f32,
        decay: f32,
        shadow: ShadowCamera,
    },
    Ambient {
        color: Color,
        intensity: f32,
    },
}

impl Light {
    pub fn kind(&self) -> LightKind {
        match self {
            Self::Point { .. } => LightKind::Point,
            Self::Directional { .. } => LightKind::Directional,
            Self::Spot { .. } => LightKind::Spot,
            Self::Ambient { .. } => LightKind::Ambient,
        }
    }

    pub fn color(&self) -> Color {
        match *self {
            Self::Point { color, .. }
            | Self::Directional { color, .. }
            | Self::Spot { color, .. }
            | Self::Ambient { color, .. } => color,
        }
    }

    pub fn intensity(&self) -> f32 {
        match *self {
            Self::Point { intensity, .. }
            | Self::Directional { intensity, .. }
            | Self::Spot { intensity, .. }
            | Self::Ambient { intensity, .. } => intensity,
        }
    }

    pub fn set_intensity(&mut self, value: f32) {
        match self {
            Self::Point { intensity, .. }
            | Self::Directional { intensity, .. }
            | Self::Spot { intensity, .. }
            | Self::Ambient { intensity, .. } => *intensity = value,
        }
    }

    /// Shadow camera, absent for ambient lights.
    pub fn shadow(&self) -> Option<&ShadowCamera> {
        match self {
            Self::Point { shadow, .. }
            | Self::Directional { shadow, .. }
            | Self::Spot { shadow, .. } => Some(shadow),
            Self::Ambient { .. } => None,
        }
    }

    pub fn shadow_mut(&mut self) -> Option<&mut ShadowCamera> {
        match self {
            Self::Point { shadow, .. }
            | Self::Directional { shadow, .. }
            | Self::Spot { shadow, .. } => Some(shadow),
            Self::Ambient { .. } => None,
        }
    }

    /// Aim point for directional and spot lights.
    pub fn target(&self) -> Option<Vec3> {
        match *self {
            Self::Directional { target, .. } | Self::Spot { target, .. } => Some(target),
            Self::Point { .. } | Self::Ambient { .. } => None,
        }
    }
}

/// Which gizmo a helper draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HelperKind {
    PointLight,
    DirectionalLight,
    SpotLight,
    /// Frustum of the target light's shadow camera.
    ShadowCamera,
}

/// Unbound helper description returned by the light factories.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightHelper {
    pub kind: HelperKind,
    pub size: f32,
}

impl LightHelper {
    pub fn new(kind: HelperKind, size: f32) -> Self {
        Self { kind, size }
    }

    /// Turn this description into a helper node that tracks `target`.
    pub fn bind(self, target: NodeId) -> SceneObject {
        SceneObject::new(
            ObjectKind::Helper(Helper {
                kind: self.kind,
                target,
                size: self.size,
            }),
            None,
        )
    }
}

/// A debug gizmo attached to a light node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Helper {
    pub kind: HelperKind,
    pub target: NodeId,
    pub size: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot() -> Light {
        Light::Spot {
            color: Color::WHITE,
            intensity: 1.0,
            target: Vec3::ZERO,
            distance: 0.0,
            angle: 0.5,
            penumbra: 0.0,
            decay: 2.0,
            shadow: ShadowCamera::perspective(50.0),
        }
    }

    #[test]
    fn intensity_round_trip_on_every_variant() {
        let mut lights = [
            spot(),
            Light::Ambient {
                color: Color::WHITE,
                intensity: 0.2,
            },
        ];
        for light in &mut lights {
            light.set_intensity(3.5);
            assert_eq!(light.intensity(), 3.5);
        }
    }

    #[test]
    fn ambient_has_no_shadow_or_target() {
        let ambient = Light::Ambient {
            color: Color::WHITE,
            intensity: 1.0,
        };
        assert!(ambient.shadow().is_none());
        assert!(ambient.target().is_none());
        assert_eq!(ambient.kind(), LightKind::Ambient);
    }

    #[test]
    fn orthographic_is_symmetric() {
        let cam = ShadowCamera::orthographic(10.0);
        match cam.projection {
            ShadowProjection::Orthographic {
                left,
                right,
                top,
                bottom,
                ..
            } => {
                assert_eq!((left, right, top, bottom), (-10.0, 10.0, 10.0, -10.0));
            }
            ShadowProjection::Perspective { .. } => panic!("expected orthographic"),
        }
        assert_eq!(cam.map_size, DEFAULT_SHADOW_MAP_SIZE);
    }

    #[test]
    fn helper_binds_to_target() {
        let obj = LightHelper::new(HelperKind::SpotLight, 1.0).bind(NodeId(4));
        match obj.kind {
            ObjectKind::Helper(h) => {
                assert_eq!(h.target, NodeId(4));
                assert_eq!(h.kind, HelperKind::SpotLight);
            }
            other => panic!("unexpected kind {}", other.label()),
        }
    }
}
