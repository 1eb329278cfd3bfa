use glam::Vec3;
use lightbox_common::{Color, Transform};
use serde::{Deserialize, Serialize};

use crate::light::{Helper, Light};

/// Shadow participation of a scene object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowFlags {
    pub cast: bool,
    pub receive: bool,
}

/// Geometry descriptor: kind plus dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    /// Lies in the local XY plane; rotate to make it horizontal.
    Plane { width: f32, height: f32 },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
}

/// Geometry kind without dimensions, for counting and batching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryKind {
    Box,
    Plane,
    Sphere,
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Box { .. } => GeometryKind::Box,
            Self::Plane { .. } => GeometryKind::Plane,
            Self::Sphere { .. } => GeometryKind::Sphere,
        }
    }

    /// Scale that maps the unit mesh of this kind onto these dimensions.
    ///
    /// Unit meshes are a cube of edge 1, a 1x1 quad in XY and a sphere of radius 1.
    pub fn unit_scale(&self) -> Vec3 {
        match *self {
            Self::Box {
                width,
                height,
                depth,
            } => Vec3::new(width, height, depth),
            Self::Plane { width, height } => Vec3::new(width, height, 1.0),
            Self::Sphere { radius, .. } => Vec3::splat(radius),
        }
    }
}

/// Shading model of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shading {
    /// Unlit, flat color.
    Basic,
    Lambert,
    Phong,
    Standard,
}

impl Shading {
    pub fn is_lit(self) -> bool {
        !matches!(self, Self::Basic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
    pub shading: Shading,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::rgb(0.8, 0.8, 0.8),
            shading: Shading::Standard,
            double_sided: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
}

/// What a scene node is.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Group,
    Mesh(Mesh),
    Light(Light),
    Helper(Helper),
}

impl ObjectKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Mesh(_) => "mesh",
            Self::Light(_) => "light",
            Self::Helper(_) => "helper",
        }
    }
}

/// A scene object that is not yet attached to a graph.
///
/// `children` form an owned subtree; `SceneGraph::add` flattens it into
/// graph nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub transform: Transform,
    pub shadow: ShadowFlags,
    pub visible: bool,
    pub children: Vec<SceneObject>,
}

impl SceneObject {
    pub fn new(kind: ObjectKind, name: Option<&str>) -> Self {
        Self {
            name: name.unwrap_or_default().to_string(),
            kind,
            transform: Transform::default(),
            shadow: ShadowFlags::default(),
            visible: true,
            children: Vec::new(),
        }
    }

    pub fn group(name: Option<&str>) -> Self {
        Self::new(ObjectKind::Group, name)
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn push_child(&mut self, child: SceneObject) {
        self.children.push(child);
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            ObjectKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn light(&self) -> Option<&Light> {
        match &self.kind {
            ObjectKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.kind {
            ObjectKind::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Number of objects in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(SceneObject::subtree_len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_name_is_empty_string() {
        let obj = SceneObject::group(None);
        assert_eq!(obj.name, "");
        let named = SceneObject::group(Some("grid"));
        assert_eq!(named.name, "grid");
    }

    #[test]
    fn unit_scale_matches_dimensions() {
        let b = Geometry::Box {
            width: 1.0,
            height: 2.0,
            depth: 3.0,
        };
        assert_eq!(b.unit_scale(), Vec3::new(1.0, 2.0, 3.0));
        let s = Geometry::Sphere {
            radius: 0.5,
            width_segments: 8,
            height_segments: 8,
        };
        assert_eq!(s.unit_scale(), Vec3::splat(0.5));
        assert_eq!(s.kind(), GeometryKind::Sphere);
    }

    #[test]
    fn subtree_len_counts_descendants() {
        let mut root = SceneObject::group(None);
        let mut mid = SceneObject::group(None);
        mid.push_child(SceneObject::group(None));
        root.push_child(mid);
        root.push_child(SceneObject::group(None));
        assert_eq!(root.subtree_len(), 4);
    }

    #[test]
    fn basic_shading_is_unlit() {
        assert!(!Shading::Basic.is_lit());
        assert!(Shading::Standard.is_lit());
    }
}
