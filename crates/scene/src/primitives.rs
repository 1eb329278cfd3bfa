//! Primitive factory: semantic constructors for scene objects and lights.
//!
//! All constructors are pure. `name: None` yields an empty-string name.

use glam::Vec3;
use lightbox_common::Color;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

use crate::light::{HelperKind, Light, LightHelper, ShadowCamera};
use crate::object::{Geometry, Material, Mesh, ObjectKind, SceneObject, Shading, ShadowFlags};

/// Half-size of the directional light's orthographic shadow box.
pub const DIRECTIONAL_SHADOW_EXTENT: f32 = 10.0;

const BOX_COLOR: u32 = 0x00ff00;
const PLANE_COLOR: u32 = 0xff0000;
const MARKER_COLOR: u32 = 0xffffff;

const SPHERE_WIDTH_SEGMENTS: u32 = 24;
const SPHERE_HEIGHT_SEGMENTS: u32 = 24;

/// Box primitive that casts shadows.
pub fn create_box(width: f32, height: f32, depth: f32, name: Option<&str>) -> SceneObject {
    let mut obj = SceneObject::new(
        ObjectKind::Mesh(Mesh {
            geometry: Geometry::Box {
                width,
                height,
                depth,
            },
            material: Material {
                color: Color::from_hex(BOX_COLOR),
                shading: Shading::Standard,
                double_sided: false,
            },
        }),
        name,
    );
    obj.shadow = ShadowFlags {
        cast: true,
        receive: false,
    };
    obj
}

/// Square ground plane, rotated from the XY plane into the XZ plane.
pub fn create_plane(size: f32, name: Option<&str>) -> SceneObject {
    let mut obj = SceneObject::new(
        ObjectKind::Mesh(Mesh {
            geometry: Geometry::Plane {
                width: size,
                height: size,
            },
            material: Material {
                color: Color::from_hex(PLANE_COLOR),
                shading: Shading::Standard,
                double_sided: true,
            },
        }),
        name,
    );
    obj.transform.rotation.x = FRAC_PI_2;
    obj.shadow = ShadowFlags {
        cast: false,
        receive: true,
    };
    obj
}

/// Small unlit sphere used as a position marker.
pub fn create_sphere(size: f32, name: Option<&str>) -> SceneObject {
    SceneObject::new(
        ObjectKind::Mesh(Mesh {
            geometry: Geometry::Sphere {
                radius: size,
                width_segments: SPHERE_WIDTH_SEGMENTS,
                height_segments: SPHERE_HEIGHT_SEGMENTS,
            },
            material: Material {
                color: Color::from_hex(MARKER_COLOR),
                shading: Shading::Basic,
                double_sided: false,
            },
        }),
        name,
    )
}

fn light_object(light: Light, name: Option<&str>) -> SceneObject {
    let casts = light.shadow().is_some();
    let mut obj = SceneObject::new(ObjectKind::Light(light), name);
    obj.shadow.cast = casts;
    obj
}

pub fn create_point_light(intensity: f32, name: Option<&str>) -> (SceneObject, LightHelper) {
    let light = Light::Point {
        color: Color::WHITE,
        intensity,
        distance: 0.0,
        decay: 2.0,
        shadow: ShadowCamera::perspective(90.0),
    };
    (
        light_object(light, name),
        LightHelper::new(HelperKind::PointLight, 1.0),
    )
}

/// Directional light. Its shadow frustum is a fixed symmetric box because
/// directional light has no natural falloff range.
pub fn create_directional_light(intensity: f32, name: Option<&str>) -> (SceneObject, LightHelper) {
    let light = Light::Directional {
        color: Color::WHITE,
        intensity,
        target: Vec3::ZERO,
        shadow: ShadowCamera::orthographic(DIRECTIONAL_SHADOW_EXTENT),
    };
    (
        light_object(light, name),
        LightHelper::new(HelperKind::DirectionalLight, 1.0),
    )
}

pub fn create_spot_light(intensity: f32, name: Option<&str>) -> (SceneObject, LightHelper) {
    let light = Light::Spot {
        color: Color::WHITE,
        intensity,
        target: Vec3::ZERO,
        distance: 0.0,
        angle: FRAC_PI_3,
        penumbra: 0.0,
        decay: 2.0,
        shadow: ShadowCamera::perspective(50.0),
    };
    (
        light_object(light, name),
        LightHelper::new(HelperKind::SpotLight, 1.0),
    )
}

pub fn create_ambient_light(intensity: f32, name: Option<&str>) -> SceneObject {
    light_object(
        Light::Ambient {
            color: Color::WHITE,
            intensity,
        },
        name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{LightKind, ShadowProjection};

    #[test]
    fn box_casts_shadow() {
        let b = create_box(1.0, 2.0, 3.0, Some("crate"));
        assert_eq!(b.name, "crate");
        assert!(b.shadow.cast);
        assert!(!b.shadow.receive);
        let mesh = b.mesh().unwrap();
        assert_eq!(
            mesh.geometry,
            Geometry::Box {
                width: 1.0,
                height: 2.0,
                depth: 3.0
            }
        );
        assert!(!mesh.material.double_sided);
    }

    #[test]
    fn plane_is_horizontal_for_any_size() {
        for size in [0.5, 4.0, 100.0] {
            let p = create_plane(size, None);
            assert_eq!(p.transform.rotation.x, FRAC_PI_2);
            assert_eq!(p.name, "");
            assert!(p.shadow.receive);
            assert!(p.mesh().unwrap().material.double_sided);
        }
    }

    #[test]
    fn plane_normal_points_along_y_after_rotation() {
        let p = create_plane(4.0, None);
        let normal = p.transform.quat() * Vec3::Z;
        assert!(normal.y.abs() > 0.999);
    }

    #[test]
    fn sphere_ignores_shadows() {
        let s = create_sphere(0.1, None);
        assert_eq!(s.shadow, ShadowFlags::default());
        assert!(!s.mesh().unwrap().material.shading.is_lit());
    }

    #[test]
    fn shadow_casting_lights_come_with_helpers() {
        let cases = [
            (create_point_light(1.0, None), LightKind::Point, HelperKind::PointLight),
            (
                create_directional_light(1.0, None),
                LightKind::Directional,
                HelperKind::DirectionalLight,
            ),
            (create_spot_light(1.0, None), LightKind::Spot, HelperKind::SpotLight),
        ];
        for ((obj, helper), kind, helper_kind) in cases {
            let light = obj.light().unwrap();
            assert_eq!(light.kind(), kind);
            assert!(obj.shadow.cast);
            assert!(light.shadow().is_some());
            assert_eq!(helper.kind, helper_kind);
        }
    }

    #[test]
    fn directional_shadow_box_is_ten_each_side() {
        let (obj, _) = create_directional_light(1.0, None);
        let shadow = obj.light().unwrap().shadow().unwrap();
        let ShadowProjection::Orthographic {
            left,
            right,
            top,
            bottom,
            ..
        } = shadow.projection
        else {
            panic!("directional shadow should be orthographic");
        };
        assert_eq!([left, right, top, bottom], [-10.0, 10.0, 10.0, -10.0]);
    }

    #[test]
    fn ambient_light_has_no_shadow() {
        let a = create_ambient_light(0.5, Some("fill"));
        assert!(!a.shadow.cast);
        assert_eq!(a.light().unwrap().kind(), LightKind::Ambient);
        assert_eq!(a.light().unwrap().intensity(), 0.5);
    }
}
