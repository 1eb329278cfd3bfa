use lightbox_common::NodeId;
use lightbox_compose::{ControlBinding, ControlPanel, LightField};
use lightbox_scene::SceneGraph;

/// egui side of the light controls: one slider per registered binding.
#[derive(Debug, Default)]
pub struct LightPanel {
    sliders: Vec<ControlBinding>,
}

impl ControlPanel for LightPanel {
    fn add_control(&mut self, target: NodeId, field: LightField, min: f32, max: f32, label: &str) {
        self.sliders
            .push(ControlBinding::new(target, field, min, max, label));
    }
}

impl LightPanel {
    pub fn len(&self) -> usize {
        self.sliders.len()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.sliders.iter().map(|s| s.label.as_str())
    }

    /// Draw the sliders and write edits straight back to the graph.
    pub fn show(&self, ui: &mut egui::Ui, graph: &mut SceneGraph) {
        for slider in &self.sliders {
            let Ok(mut value) = slider.read(graph) else {
                ui.weak(format!("{}: unavailable", slider.label));
                continue;
            };
            let response = ui.add(
                egui::Slider::new(&mut value, slider.min..=slider.max)
                    .text(slider.label.as_str()),
            );
            if response.changed() {
                if let Err(e) = slider.write(graph, value) {
                    tracing::warn!(field = %slider.field, "light control rejected: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightbox_compose::{SceneConfig, compose};

    #[test]
    fn spot_scene_wires_six_sliders() {
        let scene = compose(&SceneConfig::default());
        let mut panel = LightPanel::default();
        scene.wire(&mut panel);
        assert_eq!(panel.len(), 6);
        let labels: Vec<_> = panel.labels().collect();
        assert_eq!(labels[0], "Intensity");
        assert!(labels.contains(&"Penumbra"));
    }

    #[test]
    fn point_scene_has_no_cone_sliders() {
        let config = SceneConfig {
            light_type: "point".into(),
            ..SceneConfig::default()
        };
        let scene = compose(&config);
        let mut panel = LightPanel::default();
        scene.wire(&mut panel);
        assert_eq!(panel.len(), 4);
        assert!(!panel.labels().any(|l| l == "Angle"));
    }
}
