//! Live links between debug-panel widgets and light fields.

use lightbox_common::NodeId;
use lightbox_scene::{Light, LightKind, SceneError, SceneGraph};

/// Editable field on a light node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightField {
    Intensity,
    PositionX,
    PositionY,
    PositionZ,
    /// Spot cone half-angle.
    Angle,
    /// Spot penumbra softness.
    Penumbra,
}

impl LightField {
    pub fn name(self) -> &'static str {
        match self {
            Self::Intensity => "intensity",
            Self::PositionX => "position.x",
            Self::PositionY => "position.y",
            Self::PositionZ => "position.z",
            Self::Angle => "angle",
            Self::Penumbra => "penumbra",
        }
    }
}

impl std::fmt::Display for LightField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A slider bound to one field of one light node.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlBinding {
    pub target: NodeId,
    pub field: LightField,
    pub min: f32,
    pub max: f32,
    pub label: String,
}

impl ControlBinding {
    pub fn new(target: NodeId, field: LightField, min: f32, max: f32, label: &str) -> Self {
        Self {
            target,
            field,
            min,
            max,
            label: label.to_string(),
        }
    }

    /// Current value of the bound field.
    pub fn read(&self, graph: &SceneGraph) -> Result<f32, SceneError> {
        let node = graph
            .get(self.target)
            .ok_or(SceneError::NodeNotFound(self.target))?;
        let p = node.transform.position;
        let value = match self.field {
            LightField::PositionX => p.x,
            LightField::PositionY => p.y,
            LightField::PositionZ => p.z,
            LightField::Intensity => graph.light(self.target)?.intensity(),
            LightField::Angle | LightField::Penumbra => {
                match (self.field, graph.light(self.target)?) {
                    (LightField::Angle, Light::Spot { angle, .. }) => *angle,
                    (_, Light::Spot { penumbra, .. }) => *penumbra,
                    (field, other) => return Err(not_applicable(field, other.kind())),
                }
            }
        };
        Ok(value)
    }

    /// Store `value`, clamped into `[min, max]`. Returns the stored value.
    pub fn write(&self, graph: &mut SceneGraph, value: f32) -> Result<f32, SceneError> {
        let value = value.clamp(self.min, self.max);
        match self.field {
            LightField::PositionX | LightField::PositionY | LightField::PositionZ => {
                let node = graph
                    .get_mut(self.target)
                    .ok_or(SceneError::NodeNotFound(self.target))?;
                let p = &mut node.transform.position;
                match self.field {
                    LightField::PositionX => p.x = value,
                    LightField::PositionY => p.y = value,
                    _ => p.z = value,
                }
            }
            LightField::Intensity => graph.light_mut(self.target)?.set_intensity(value),
            LightField::Angle | LightField::Penumbra => {
                let field = self.field;
                match graph.light_mut(self.target)? {
                    Light::Spot { angle, .. } if field == LightField::Angle => *angle = value,
                    Light::Spot { penumbra, .. } => *penumbra = value,
                    other => return Err(not_applicable(field, other.kind())),
                }
            }
        }
        tracing::trace!(node = %self.target, field = %self.field, value, "control write");
        Ok(value)
    }
}

fn not_applicable(field: LightField, kind: LightKind) -> SceneError {
    SceneError::FieldNotApplicable {
        field: field.name(),
        kind,
    }
}

/// Bindings exposed for a light of this concrete variant.
///
/// Intensity and position are common to all lights; cone angle and penumbra
/// only exist on spot lights.
pub fn bindings_for(target: NodeId, light: &Light) -> Vec<ControlBinding> {
    let mut out = vec![
        ControlBinding::new(target, LightField::Intensity, 0.0, 5.0, "Intensity"),
        ControlBinding::new(target, LightField::PositionX, -20.0, 20.0, "Position X"),
        ControlBinding::new(target, LightField::PositionY, -20.0, 20.0, "Position Y"),
        ControlBinding::new(target, LightField::PositionZ, -20.0, 20.0, "Position Z"),
    ];
    match light {
        Light::Spot { .. } => {
            out.push(ControlBinding::new(target, LightField::Angle, 0.0, 2.0, "Angle"));
            out.push(ControlBinding::new(target, LightField::Penumbra, 0.0, 1.0, "Penumbra"));
        }
        Light::Point { .. } | Light::Directional { .. } | Light::Ambient { .. } => {}
    }
    out
}

/// A debug panel that can host numeric sliders.
pub trait ControlPanel {
    fn add_control(&mut self, target: NodeId, field: LightField, min: f32, max: f32, label: &str);
}

/// In-memory panel: records what was registered.
#[derive(Debug, Clone, Default)]
pub struct ControlSet {
    controls: Vec<ControlBinding>,
}

impl ControlSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlBinding> {
        self.controls.iter()
    }

    pub fn by_label(&self, label: &str) -> Option<&ControlBinding> {
        self.controls.iter().find(|c| c.label == label)
    }
}

impl ControlPanel for ControlSet {
    fn add_control(&mut self, target: NodeId, field: LightField, min: f32, max: f32, label: &str) {
        self.controls
            .push(ControlBinding::new(target, field, min, max, label));
    }
}
