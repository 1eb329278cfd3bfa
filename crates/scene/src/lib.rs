//! Scene model: a node graph of meshes, lights and helpers, the primitive
//! factory that builds them, and the procedural box-grid layout.
//!
//! # Invariants
//! - Every object carries a name; an unset name is the empty string.
//! - Node ids are allocated sequentially, so id order is insertion order.
//! - Grid layout is a pure function of `(count, spacing)`.

pub mod graph;
pub mod grid;
pub mod light;
pub mod object;
pub mod primitives;

pub use graph::{SceneError, SceneGraph, SceneNode};
pub use grid::{BOX_SIZE, GridSpec, create_box_grid};
pub use light::{
    Helper, HelperKind, Light, LightHelper, LightKind, ShadowCamera, ShadowProjection,
};
pub use object::{Geometry, GeometryKind, Material, Mesh, ObjectKind, SceneObject, Shading, ShadowFlags};
pub use primitives::{
    create_ambient_light, create_box, create_directional_light, create_plane, create_point_light,
    create_sphere, create_spot_light,
};
