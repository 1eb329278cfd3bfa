//! One-shot scene assembly from a [`SceneConfig`].

use glam::Vec3;
use lightbox_common::NodeId;
use lightbox_scene::{
    BOX_SIZE, HelperKind, LightHelper, LightKind, SceneGraph, SceneObject, create_ambient_light,
    create_box_grid, create_directional_light, create_plane, create_point_light, create_sphere,
    create_spot_light,
};

use crate::config::{ConfigError, LightType, MAX_GRID_COUNT, SceneConfig};
use crate::controls::{ControlBinding, ControlPanel, bindings_for};

/// Where the main light sits: above and beside the grid.
pub const LIGHT_POSITION: Vec3 = Vec3::new(13.0, 15.0, 13.0);
pub const MARKER_RADIUS: f32 = 0.1;
pub const SMOOTH_SHADOW_MAP_SIZE: u32 = 2048;
pub const SMOOTH_SHADOW_BIAS: f32 = -0.001;

const GROUND_MARGIN: f32 = 4.0;
const GROUND_MIN_SIZE: f32 = 4.0;
const FALLBACK_INTENSITY: f32 = 1.0;

/// A composed scene plus handles to its notable nodes.
#[derive(Debug)]
pub struct Composition {
    pub graph: SceneGraph,
    pub plane: NodeId,
    pub light: NodeId,
    pub light_kind: LightKind,
    pub helper: Option<NodeId>,
    pub camera_helper: Option<NodeId>,
    pub ambient: Option<NodeId>,
    pub marker: NodeId,
    pub grid: NodeId,
    /// Node named by `animated_object`, when it exists.
    pub animated: Option<NodeId>,
    pub bindings: Vec<ControlBinding>,
    /// Non-fatal configuration problems found while composing.
    pub diagnostics: Vec<ConfigError>,
}

impl Composition {
    /// Register every binding with a debug panel.
    pub fn wire(&self, panel: &mut dyn ControlPanel) {
        for b in &self.bindings {
            panel.add_control(b.target, b.field, b.min, b.max, &b.label);
        }
        tracing::debug!(controls = self.bindings.len(), "wired control panel");
    }
}

/// Side length of the ground plane for a config's grid.
pub fn ground_size(config: &SceneConfig) -> f32 {
    let extent = config.grid().span() + BOX_SIZE;
    (extent + 2.0 * GROUND_MARGIN).max(GROUND_MIN_SIZE)
}

/// Build the whole scene. Never fails; problems land in `diagnostics`.
pub fn compose(config: &SceneConfig) -> Composition {
    let _span = tracing::info_span!("compose", light = %config.light_type).entered();
    let mut diagnostics = Vec::new();
    if let Err(err) = config.validate() {
        tracing::warn!(%err, "scene config failed validation");
        diagnostics.push(err);
    }

    let mut graph = SceneGraph::new();

    let plane = graph.add(create_plane(ground_size(config), Some("ground")));

    let (mut light_obj, helper) = match &config.light_type {
        LightType::Point => create_point_light(config.light_intensity, Some("point-light")),
        LightType::Directional => {
            create_directional_light(config.light_intensity, Some("directional-light"))
        }
        LightType::Spot => create_spot_light(config.light_intensity, Some("spot-light")),
        LightType::Unrecognized(name) => {
            tracing::error!(light_type = %name, "unrecognized light type, using a point light");
            diagnostics.push(ConfigError::UnrecognizedLightType(name.clone()));
            create_point_light(FALLBACK_INTENSITY, Some("point-light"))
        }
    };
    light_obj.transform.position = LIGHT_POSITION;

    if config.smooth_shadow {
        apply_smooth_shadow(&mut light_obj);
    }

    let light_value = light_obj.light().copied();
    let light_kind = light_value.map_or(LightKind::Point, |l| l.kind());
    let light = graph.add(light_obj);
    tracing::debug!(%light, kind = %light_kind, "added light");

    let helper = config
        .enable_light_helper
        .then(|| graph.add(helper.bind(light)));
    let camera_helper = config
        .enable_light_camera_helper
        .then(|| graph.add(LightHelper::new(HelperKind::ShadowCamera, 1.0).bind(light)));

    let ambient = config.enable_ambient_light.then(|| {
        graph.add(create_ambient_light(
            config.ambient_light_intensity,
            Some("ambient-light"),
        ))
    });

    // Child of the light, so it follows position edits.
    let marker = add_marker(&mut graph, light);

    // Oversized grids are already in `diagnostics`; build the largest allowed one.
    let grid_count = config.grid_count.min(MAX_GRID_COUNT);
    let grid = graph.add(create_box_grid(grid_count, config.grid_spacing));

    let animated = config.animated_object.as_deref().and_then(|name| {
        let found = graph.find_by_name(name);
        if found.is_none() {
            tracing::debug!(name, "animated object not found, animation disabled");
        }
        found
    });

    let bindings = light_value
        .map(|l| bindings_for(light, &l))
        .unwrap_or_default();

    tracing::debug!(
        nodes = graph.node_count(),
        bindings = bindings.len(),
        diagnostics = diagnostics.len(),
        "composed scene"
    );

    Composition {
        graph,
        plane,
        light,
        light_kind,
        helper,
        camera_helper,
        ambient,
        marker,
        grid,
        animated,
        bindings,
        diagnostics,
    }
}

fn apply_smooth_shadow(light: &mut SceneObject) {
    if let Some(shadow) = light.light_mut().and_then(|l| l.shadow_mut()) {
        shadow.map_size = SMOOTH_SHADOW_MAP_SIZE;
        shadow.bias = SMOOTH_SHADOW_BIAS;
    }
}

fn add_marker(graph: &mut SceneGraph, light: NodeId) -> NodeId {
    let sphere = create_sphere(MARKER_RADIUS, Some("light-marker"));
    match graph.add_child(light, sphere.clone()) {
        Ok(id) => id,
        Err(err) => {
            tracing::error!(%err, "light node missing, marker added at root");
            graph.add(sphere)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightbox_scene::{GeometryKind, ObjectKind};

    fn config(light_type: &str) -> SceneConfig {
        SceneConfig {
            light_type: LightType::from(light_type),
            ..SceneConfig::default()
        }
    }

    #[test]
    fn dispatch_builds_configured_light() {
        for (name, kind) in [
            ("point", LightKind::Point),
            ("directional", LightKind::Directional),
            ("spot", LightKind::Spot),
        ] {
            let c = compose(&config(name));
            assert_eq!(c.light_kind, kind);
            assert_eq!(c.graph.light(c.light).unwrap().kind(), kind);
            assert!(c.diagnostics.is_empty());
            assert_eq!(
                c.graph.get(c.light).unwrap().transform.position,
                LIGHT_POSITION
            );
        }
    }

    #[test]
    fn unrecognized_light_falls_back_to_unit_point() {
        let c = compose(&SceneConfig {
            light_intensity: 3.0,
            ..config("rect-area")
        });
        let light = c.graph.light(c.light).unwrap();
        assert_eq!(light.kind(), LightKind::Point);
        assert_eq!(light.intensity(), FALLBACK_INTENSITY);
        assert_eq!(c.bindings.len(), 4);
        assert!(matches!(
            c.diagnostics.as_slice(),
            [ConfigError::UnrecognizedLightType(name)] if name == "rect-area"
        ));
    }

    #[test]
    fn smooth_shadow_raises_resolution() {
        let smooth = compose(&config("spot"));
        let shadow = *smooth.graph.light(smooth.light).unwrap().shadow().unwrap();
        assert_eq!(shadow.map_size, SMOOTH_SHADOW_MAP_SIZE);
        assert_eq!(shadow.bias, SMOOTH_SHADOW_BIAS);

        let rough = compose(&SceneConfig {
            smooth_shadow: false,
            ..config("spot")
        });
        let shadow = *rough.graph.light(rough.light).unwrap().shadow().unwrap();
        assert_ne!(shadow.map_size, SMOOTH_SHADOW_MAP_SIZE);
        assert_eq!(shadow.bias, 0.0);
    }

    #[test]
    fn helpers_follow_toggles() {
        let c = compose(&SceneConfig {
            enable_light_helper: true,
            enable_light_camera_helper: true,
            ..config("directional")
        });
        for (id, kind) in [
            (c.helper.unwrap(), HelperKind::DirectionalLight),
            (c.camera_helper.unwrap(), HelperKind::ShadowCamera),
        ] {
            match &c.graph.get(id).unwrap().kind {
                ObjectKind::Helper(h) => {
                    assert_eq!(h.kind, kind);
                    assert_eq!(h.target, c.light);
                }
                other => panic!("expected helper, got {}", other.label()),
            }
        }

        let bare = compose(&SceneConfig {
            enable_light_helper: false,
            enable_light_camera_helper: false,
            enable_ambient_light: false,
            ..config("point")
        });
        assert!(bare.helper.is_none());
        assert!(bare.camera_helper.is_none());
        assert!(bare.ambient.is_none());
        assert_eq!(bare.graph.lights().count(), 1);
    }

    #[test]
    fn marker_is_child_of_light() {
        let c = compose(&config("point"));
        assert_eq!(c.graph.parent(c.marker), Some(c.light));
        assert_eq!(c.graph.world_position(c.marker), Some(LIGHT_POSITION));
        assert_eq!(c.graph.count_geometry(GeometryKind::Sphere), 1);
    }

    #[test]
    fn ground_covers_the_grid() {
        let small = SceneConfig {
            grid_count: 1,
            grid_spacing: 0.1,
            ..SceneConfig::default()
        };
        assert_eq!(ground_size(&small), 9.0);
        assert!(ground_size(&SceneConfig::default()) > SceneConfig::default().grid().span());
    }

    #[test]
    fn animated_object_resolves_by_name() {
        let c = compose(&SceneConfig {
            animated_object: Some("box-0-0".into()),
            ..SceneConfig::default()
        });
        let id = c.animated.unwrap();
        assert_eq!(c.graph.get(id).unwrap().name, "box-0-0");

        let missing = compose(&SceneConfig {
            animated_object: Some("nope".into()),
            ..SceneConfig::default()
        });
        assert!(missing.animated.is_none());
    }

    #[test]
    fn invalid_grid_is_reported_not_fatal() {
        let c = compose(&SceneConfig {
            grid_count: 0,
            ..SceneConfig::default()
        });
        assert_eq!(c.graph.count_geometry(GeometryKind::Box), 0);
        assert!(matches!(
            c.diagnostics.as_slice(),
            [ConfigError::InvalidGrid(_)]
        ));
    }

    #[test]
    fn oversized_grid_is_clamped() {
        let c = compose(&SceneConfig {
            grid_count: 120,
            grid_spacing: 1.0,
            ..SceneConfig::default()
        });
        let max = MAX_GRID_COUNT as usize;
        assert_eq!(c.graph.count_geometry(GeometryKind::Box), max * max);
        assert!(matches!(
            c.diagnostics.as_slice(),
            [ConfigError::GridTooLarge { count: 120, .. }]
        ));
    }
}
