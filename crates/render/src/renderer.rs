use glam::{Mat4, Vec3};
use lightbox_common::NodeId;
use lightbox_scene::{HelperKind, ObjectKind, SceneGraph, SceneNode};
use std::fmt::Write;

/// Perspective camera looking at a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(20.0, 22.0, 32.0),
            target: Vec3::ZERO,
            fov_degrees: 45.0,
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn perspective(eye: Vec3, target: Vec3, fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            eye,
            target,
            fov_degrees,
            near,
            far,
            ..Self::default()
        }
    }

    /// Match the aspect ratio to a viewport. Zero-sized viewports are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or(Vec3::X)
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn distance(&self) -> f32 {
        self.eye.distance(self.target)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the scene graph and camera and produces output; it never
/// mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of `scene` as seen from `camera`.
    fn render(&self, scene: &SceneGraph, camera: &Camera) -> Self::Output;
}

/// Text renderer: a readable dump of the scene graph.
///
/// Used by the CLI, in logs and to test the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    limit: Option<usize>,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only list the first `limit` nodes; the rest are summarised.
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }
}

fn depth(scene: &SceneGraph, id: NodeId) -> usize {
    let mut depth = 0;
    let mut cur = scene.parent(id);
    while let Some(p) = cur {
        depth += 1;
        cur = scene.parent(p);
    }
    depth
}

fn describe(scene: &SceneGraph, node: &SceneNode) -> String {
    match &node.kind {
        ObjectKind::Group => format!("group ({} children)", node.children().len()),
        ObjectKind::Mesh(mesh) => {
            let kind = match mesh.geometry.kind() {
                lightbox_scene::GeometryKind::Box => "box",
                lightbox_scene::GeometryKind::Plane => "plane",
                lightbox_scene::GeometryKind::Sphere => "sphere",
            };
            let flags = match (node.shadow.cast, node.shadow.receive) {
                (true, true) => " cast+receive",
                (true, false) => " cast",
                (false, true) => " receive",
                (false, false) => "",
            };
            format!("{kind}{flags}")
        }
        ObjectKind::Light(light) => {
            let mut s = format!("{} light intensity={:.2}", light.kind(), light.intensity());
            if let Some(shadow) = light.shadow() {
                let _ = write!(s, " shadow={}px bias={}", shadow.map_size, shadow.bias);
            }
            s
        }
        ObjectKind::Helper(h) => {
            let kind = match h.kind {
                HelperKind::PointLight => "point-light",
                HelperKind::DirectionalLight => "directional-light",
                HelperKind::SpotLight => "spot-light",
                HelperKind::ShadowCamera => "shadow-camera",
            };
            let target = scene
                .get(h.target)
                .map(|n| n.name.as_str())
                .unwrap_or("?");
            format!("{kind} helper -> {target}")
        }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneGraph, camera: &Camera) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Scene (nodes={}, lights={}) ===",
            scene.node_count(),
            scene.lights().count()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            camera.eye.x,
            camera.eye.y,
            camera.eye.z,
            camera.target.x,
            camera.target.y,
            camera.target.z,
            camera.fov_degrees
        );

        let order = scene.traverse();
        let shown = self.limit.unwrap_or(order.len()).min(order.len());
        for id in &order[..shown] {
            let Some(node) = scene.get(*id) else {
                continue;
            };
            let p = node.transform.position;
            let name = if node.name.is_empty() {
                "<unnamed>"
            } else {
                node.name.as_str()
            };
            let _ = writeln!(
                out,
                "{:indent$}{id} {name}: {} pos=({:.2}, {:.2}, {:.2})",
                "",
                describe(scene, node),
                p.x,
                p.y,
                p.z,
                indent = 2 * (depth(scene, *id) + 1),
            );
        }
        if shown < order.len() {
            let _ = writeln!(out, "  ... {} more nodes", order.len() - shown);
        }
        out
    }
}
