use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::graph::SceneError;
use crate::object::SceneObject;
use crate::primitives::create_box;

/// Edge length of every grid box.
pub const BOX_SIZE: f32 = 1.0;

/// Grid parameters: `count` boxes per side, `spacing` between box centers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub count: u32,
    pub spacing: f32,
}

impl GridSpec {
    pub fn new(count: u32, spacing: f32) -> Result<Self, SceneError> {
        let spec = Self { count, spacing };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if self.count == 0 {
            return Err(SceneError::InvalidGrid("count must be positive".into()));
        }
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(SceneError::InvalidGrid(format!(
                "spacing must be a positive number, got {}",
                self.spacing
            )));
        }
        Ok(())
    }

    /// Distance between the first and last box centers along one axis.
    pub fn span(&self) -> f32 {
        self.count.saturating_sub(1) as f32 * self.spacing
    }

    /// Translation applied to the group so the lattice is centered on the origin.
    pub fn centering_offset(&self) -> Vec3 {
        let half = -self.span() / 2.0;
        Vec3::new(half, 0.0, half)
    }

    pub fn cell_count(&self) -> usize {
        (self.count as usize).pow(2)
    }

    pub fn build(&self) -> SceneObject {
        create_box_grid(self.count, self.spacing)
    }
}

/// Lay out a `count x count` grid of boxes centered at the world origin.
///
/// The outer loop emits the `z = 0` box of each row, the inner loop the
/// remaining `count - 1` boxes of that row. Every box rests on `y = 0`.
pub fn create_box_grid(count: u32, spacing: f32) -> SceneObject {
    let mut group = SceneObject::group(Some("box-grid"));

    for i in 0..count {
        let x = i as f32 * spacing;
        group.push_child(grid_box(i, 0, Vec3::new(x, BOX_SIZE / 2.0, 0.0)));

        for j in 1..count {
            let z = j as f32 * spacing;
            group.push_child(grid_box(i, j, Vec3::new(x, BOX_SIZE / 2.0, z)));
        }
    }

    let spec = GridSpec { count, spacing };
    group.transform.position = spec.centering_offset();
    tracing::debug!(count, spacing, boxes = group.children.len(), "built box grid");
    group
}

fn grid_box(i: u32, j: u32, position: Vec3) -> SceneObject {
    let name = format!("box-{i}-{j}");
    create_box(BOX_SIZE, BOX_SIZE, BOX_SIZE, Some(&name)).with_position(position)
}
