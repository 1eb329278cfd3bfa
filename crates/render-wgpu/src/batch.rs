//! Scene graph to GPU data: instanced mesh batches and the light uniform.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use lightbox_common::NodeId;
use lightbox_scene::{GeometryKind, Light, ObjectKind, SceneGraph};
use std::collections::BTreeMap;
use std::ops::Range;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
    /// rgb plus `a = 1` for lit materials, `0` for unlit.
    pub color: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: [f32; 3], lit: bool) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: [color[0], color[1], color[2], if lit { 1.0 } else { 0.0 }],
        }
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.model_3[0], self.model_3[1], self.model_3[2])
    }
}

/// Instances sharing a mesh and a cull mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct BatchKey {
    pub geometry: GeometryKind,
    pub double_sided: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Batch {
    pub key: BatchKey,
    pub instances: Range<u32>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SceneBatches {
    pub instances: Vec<InstanceData>,
    pub batches: Vec<Batch>,
}

/// Hidden if it or any ancestor is hidden.
pub(crate) fn is_visible(scene: &SceneGraph, id: NodeId) -> bool {
    let mut cur = Some(id);
    while let Some(n) = cur {
        match scene.get(n) {
            Some(node) if node.visible => cur = node.parent(),
            _ => return false,
        }
    }
    true
}

/// Group every visible mesh by geometry kind and sidedness.
pub(crate) fn collect_batches(scene: &SceneGraph) -> SceneBatches {
    let mut groups: BTreeMap<BatchKey, Vec<InstanceData>> = BTreeMap::new();

    for (id, node) in scene.iter() {
        let ObjectKind::Mesh(mesh) = &node.kind else {
            continue;
        };
        if !is_visible(scene, id) {
            continue;
        }
        let Some(world) = scene.world_matrix(id) else {
            continue;
        };
        let model = world * Mat4::from_scale(mesh.geometry.unit_scale());
        let c = mesh.material.color;
        let key = BatchKey {
            geometry: mesh.geometry.kind(),
            double_sided: mesh.material.double_sided,
        };
        groups.entry(key).or_default().push(InstanceData::new(
            model,
            [c.r, c.g, c.b],
            mesh.material.shading.is_lit(),
        ));
    }

    let mut out = SceneBatches::default();
    for (key, instances) in groups {
        let start = out.instances.len() as u32;
        out.instances.extend(instances);
        out.batches.push(Batch {
            key,
            instances: start..out.instances.len() as u32,
        });
    }
    out
}

pub(crate) const LIGHT_NONE: f32 = 0.0;
pub(crate) const LIGHT_POINT: f32 = 1.0;
pub(crate) const LIGHT_DIRECTIONAL: f32 = 2.0;
pub(crate) const LIGHT_SPOT: f32 = 3.0;

/// Lighting inputs of the mesh shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct LightUniform {
    /// World position, `w` = light kind code.
    pub position: [f32; 4],
    /// Unit direction the light points along, `w` = cos of the cone angle.
    pub direction: [f32; 4],
    /// Color times intensity, `w` = cos of the penumbra inner angle.
    pub color: [f32; 4],
    /// Summed ambient color times intensity.
    pub ambient: [f32; 4],
}

/// Reduce the scene's lights to one direct light plus ambient.
///
/// The first visible non-ambient light (in id order) is the direct light.
pub(crate) fn scene_lighting(scene: &SceneGraph) -> LightUniform {
    let mut uniform = LightUniform::zeroed();
    let mut ambient = Vec3::ZERO;
    let mut have_direct = false;

    for (id, light) in scene.lights() {
        if !is_visible(scene, id) {
            continue;
        }
        let c = light.color();
        let radiance = Vec3::new(c.r, c.g, c.b) * light.intensity();

        if let Light::Ambient { .. } = light {
            ambient += radiance;
            continue;
        }
        if have_direct {
            continue;
        }
        let Some(position) = scene.world_position(id) else {
            continue;
        };
        have_direct = true;

        let toward = |target: Vec3| (target - position).normalize_or(Vec3::NEG_Y);
        let (kind, direction, cos_outer, cos_inner) = match *light {
            Light::Point { .. } => (LIGHT_POINT, Vec3::ZERO, 0.0, 0.0),
            Light::Directional { target, .. } => (LIGHT_DIRECTIONAL, toward(target), 0.0, 0.0),
            Light::Spot {
                target,
                angle,
                penumbra,
                ..
            } => (
                LIGHT_SPOT,
                toward(target),
                angle.cos(),
                (angle * (1.0 - penumbra)).cos(),
            ),
            Light::Ambient { .. } => (LIGHT_NONE, Vec3::ZERO, 0.0, 0.0),
        };

        uniform.position = position.extend(kind).to_array();
        uniform.direction = direction.extend(cos_outer).to_array();
        uniform.color = radiance.extend(cos_inner).to_array();
    }

    uniform.ambient = ambient.extend(0.0).to_array();
    uniform
}
