//! Line geometry for light helpers and shadow-camera frusta.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use lightbox_scene::{Helper, HelperKind, Light, ObjectKind, SceneGraph, ShadowProjection};
use std::f32::consts::TAU;

use crate::batch::is_visible;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

const FRUSTUM_COLOR: [f32; 4] = [1.0, 0.6, 0.1, 1.0];
const CONE_SEGMENTS: usize = 24;

struct Lines {
    verts: Vec<LineVertex>,
    color: [f32; 4],
}

impl Lines {
    fn segment(&mut self, a: Vec3, b: Vec3) {
        self.verts.push(LineVertex {
            position: a.to_array(),
            color: self.color,
        });
        self.verts.push(LineVertex {
            position: b.to_array(),
            color: self.color,
        });
    }

    fn circle(&mut self, centre: Vec3, u: Vec3, v: Vec3, radius: f32) {
        let point = |i: usize| {
            let (s, c) = (i as f32 / CONE_SEGMENTS as f32 * TAU).sin_cos();
            centre + (u * c + v * s) * radius
        };
        for i in 0..CONE_SEGMENTS {
            self.segment(point(i), point(i + 1));
        }
    }
}

/// Two unit vectors perpendicular to `dir` and to each other.
fn basis(dir: Vec3) -> (Vec3, Vec3) {
    let up = if dir.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
    let u = dir.cross(up).normalize_or(Vec3::X);
    (u, u.cross(dir))
}

/// Line list for every visible helper in the scene.
pub(crate) fn helper_lines(scene: &SceneGraph) -> Vec<LineVertex> {
    let mut out = Vec::new();
    for (id, node) in scene.iter() {
        let ObjectKind::Helper(helper) = &node.kind else {
            continue;
        };
        if !is_visible(scene, id) {
            continue;
        }
        let Ok(light) = scene.light(helper.target) else {
            continue;
        };
        let Some(position) = scene.world_position(helper.target) else {
            continue;
        };
        out.extend(lines_for(helper, light, position));
    }
    out
}

fn lines_for(helper: &Helper, light: &Light, position: Vec3) -> Vec<LineVertex> {
    let c = light.color();
    let mut lines = Lines {
        verts: Vec::new(),
        color: [c.r, c.g, c.b, 1.0],
    };
    let size = helper.size;
    let aim = light.target().unwrap_or(position - Vec3::Y);
    let dir = (aim - position).normalize_or(Vec3::NEG_Y);

    match helper.kind {
        HelperKind::PointLight => {
            let axes = [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z];
            for (i, a) in axes.iter().enumerate() {
                let b = axes[[2, 3, 1, 0][i]];
                let ring_a = position + *a * size;
                let ring_b = position + b * size;
                lines.segment(ring_a, ring_b);
                lines.segment(ring_a, position + Vec3::Y * size);
                lines.segment(ring_a, position - Vec3::Y * size);
            }
        }
        HelperKind::DirectionalLight => {
            let (u, v) = basis(dir);
            let corners = [u + v, u - v, -u - v, -u + v].map(|k| position + k * size);
            for i in 0..4 {
                lines.segment(corners[i], corners[(i + 1) % 4]);
            }
            lines.segment(position, aim);
        }
        HelperKind::SpotLight => {
            let length = match *light {
                Light::Spot { distance, .. } if distance > 0.0 => distance,
                _ => position.distance(aim).max(size),
            };
            let angle = match *light {
                Light::Spot { angle, .. } => angle.min(1.5),
                _ => 0.5,
            };
            let (u, v) = basis(dir);
            let base = position + dir * length;
            let radius = length * angle.tan();
            for k in [u, -u, v, -v] {
                lines.segment(position, base + k * radius);
            }
            lines.circle(base, u, v, radius);
        }
        HelperKind::ShadowCamera => {
            lines.color = FRUSTUM_COLOR;
            if let Some(shadow) = light.shadow() {
                let corners = frustum_corners(&shadow.projection, position, aim);
                // near ring, far ring, connecting edges
                for i in 0..4 {
                    lines.segment(corners[i], corners[(i + 1) % 4]);
                    lines.segment(corners[4 + i], corners[4 + (i + 1) % 4]);
                    lines.segment(corners[i], corners[4 + i]);
                }
            }
        }
    }
    lines.verts
}

/// World-space corners of a shadow camera: four near then four far.
pub(crate) fn frustum_corners(projection: &ShadowProjection, eye: Vec3, target: Vec3) -> [Vec3; 8] {
    let forward = (target - eye).normalize_or(Vec3::NEG_Y);
    let up = if forward.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
    let view = Mat4::look_at_rh(eye, eye + forward, up);
    let proj = match *projection {
        ShadowProjection::Perspective {
            fov_degrees,
            near,
            far,
        } => Mat4::perspective_rh(fov_degrees.to_radians(), 1.0, near, far),
        ShadowProjection::Orthographic {
            left,
            right,
            top,
            bottom,
            near,
            far,
        } => Mat4::orthographic_rh(left, right, bottom, top, near, far),
    };
    let inv = (proj * view).inverse();
    let ndc = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
    let mut out = [Vec3::ZERO; 8];
    for (i, (x, y)) in ndc.iter().enumerate() {
        out[i] = inv.project_point3(Vec3::new(*x, *y, 0.0));
        out[4 + i] = inv.project_point3(Vec3::new(*x, *y, 1.0));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightbox_scene::{
        LightHelper, create_directional_light, create_point_light, create_spot_light,
    };

    fn scene_with(
        (light, helper): (lightbox_scene::SceneObject, LightHelper),
        position: Vec3,
    ) -> SceneGraph {
        let mut scene = SceneGraph::new();
        let id = scene.add(light.with_position(position));
        scene.add(helper.bind(id));
        scene.add(LightHelper::new(HelperKind::ShadowCamera, 1.0).bind(id));
        scene
    }

    #[test]
    fn point_helper_is_an_octahedron() {
        let scene = scene_with(create_point_light(1.0, None), Vec3::new(0.0, 5.0, 0.0));
        let lines = helper_lines(&scene);
        // 12 octahedron edges plus 12 frustum edges.
        assert_eq!(lines.len(), 2 * 24);
        let top = lines
            .iter()
            .map(|v| v.position[1])
            .fold(f32::MIN, f32::max);
        assert!(top <= 6.0 + 1e-5);
    }

    #[test]
    fn spot_cone_starts_at_light() {
        let position = Vec3::new(13.0, 15.0, 13.0);
        let mut scene = SceneGraph::new();
        let (light, helper) = create_spot_light(1.0, None);
        let id = scene.add(light.with_position(position));
        scene.add(helper.bind(id));
        let lines = helper_lines(&scene);
        assert_eq!(lines.len(), 2 * (4 + CONE_SEGMENTS));
        assert_eq!(Vec3::from(lines[0].position), position);
    }

    #[test]
    fn directional_frustum_matches_shadow_box() {
        let position = Vec3::new(0.0, 20.0, 0.0);
        let (light, _) = create_directional_light(1.0, None);
        let shadow = light.light().unwrap().shadow().unwrap().projection;
        let corners = frustum_corners(&shadow, position, Vec3::ZERO);
        for c in corners {
            assert!((c.x.abs() - 10.0).abs() < 1e-3);
            assert!((c.z.abs() - 10.0).abs() < 1e-3);
        }
        // Near plane is closer to the light than the far plane.
        assert!(corners[0].y > corners[4].y);
    }

    #[test]
    fn helper_without_light_is_skipped() {
        let mut scene = SceneGraph::new();
        scene.add(LightHelper::new(HelperKind::PointLight, 1.0).bind(lightbox_common::NodeId(9)));
        assert!(helper_lines(&scene).is_empty());
    }
}
