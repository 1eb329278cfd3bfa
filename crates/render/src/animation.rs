//! Per-frame animation of a tracked object: constant spin plus a scale
//! triangle wave between 1x and 2x.

use glam::Vec3;
use lightbox_common::NodeId;
use lightbox_scene::SceneGraph;
use std::collections::BTreeMap;
use std::f32::consts::TAU;

pub const ROTATION_STEP: f32 = 0.01;
pub const SCALE_STEP: f32 = 0.01;
pub const MIN_SCALE: f32 = 1.0;
pub const MAX_SCALE: f32 = 2.0;

/// Direction the scale is currently moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalePhase {
    #[default]
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationState {
    pub phase: ScalePhase,
}

impl AnimationState {
    /// Advance `scale` one step and flip direction at the bounds.
    pub fn advance(&mut self, scale: f32) -> f32 {
        let next = match self.phase {
            ScalePhase::Up => scale + SCALE_STEP,
            ScalePhase::Down => scale - SCALE_STEP,
        }
        .clamp(MIN_SCALE, MAX_SCALE);

        if next >= MAX_SCALE {
            self.phase = ScalePhase::Down;
        } else if next <= MIN_SCALE {
            self.phase = ScalePhase::Up;
        }
        next
    }
}

/// Animation states kept beside the scene, keyed by node.
#[derive(Debug, Clone, Default)]
pub struct Animator {
    states: BTreeMap<NodeId, AnimationState>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: NodeId) -> Option<&AnimationState> {
        self.states.get(&id)
    }

    pub fn forget(&mut self, id: NodeId) {
        self.states.remove(&id);
    }

    /// Spin and pulse `id` by one tick. Returns `false` if the node is gone.
    pub fn step(&mut self, scene: &mut SceneGraph, id: NodeId) -> bool {
        let Some(node) = scene.get_mut(id) else {
            self.states.remove(&id);
            return false;
        };
        let state = self.states.entry(id).or_default();

        let t = &mut node.transform;
        let r = t.rotation + Vec3::splat(ROTATION_STEP);
        t.rotation = Vec3::new(r.x.rem_euclid(TAU), r.y.rem_euclid(TAU), r.z.rem_euclid(TAU));
        t.scale = Vec3::splat(state.advance(t.scale.x));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightbox_scene::create_box;

    #[test]
    fn state_created_on_first_tick() {
        let mut scene = SceneGraph::new();
        let id = scene.add(create_box(1.0, 1.0, 1.0, Some("spinner")));
        let mut animator = Animator::new();
        assert!(animator.state(id).is_none());

        assert!(animator.step(&mut scene, id));
        assert_eq!(animator.state(id).unwrap().phase, ScalePhase::Up);

        let t = scene.get(id).unwrap().transform;
        assert_eq!(t.rotation, Vec3::splat(ROTATION_STEP));
        assert!((t.scale.x - 1.01).abs() < 1e-6);
        assert_eq!(t.scale.x, t.scale.z);
    }

    #[test]
    fn scale_oscillates_between_bounds() {
        let mut state = AnimationState::default();
        let mut scale = 1.0;

        let mut ticks = 0;
        while state.phase == ScalePhase::Up {
            scale = state.advance(scale);
            ticks += 1;
            assert!(ticks <= 110, "never reached the upper bound");
        }
        assert!(scale >= MAX_SCALE);

        ticks = 0;
        while state.phase == ScalePhase::Down {
            scale = state.advance(scale);
            assert!((MIN_SCALE..=MAX_SCALE).contains(&scale));
            ticks += 1;
            assert!(ticks <= 110, "never reached the lower bound");
        }
        assert!(scale <= MIN_SCALE);
    }

    #[test]
    fn oscillation_stays_in_range() {
        let mut state = AnimationState::default();
        let mut scale = 1.0;
        let mut flips = 0;
        let mut last = state.phase;
        for _ in 0..1000 {
            scale = state.advance(scale);
            assert!((MIN_SCALE..=MAX_SCALE).contains(&scale));
            if state.phase != last {
                flips += 1;
                last = state.phase;
            }
        }
        assert!(flips >= 8);
    }

    #[test]
    fn out_of_range_scale_is_clamped() {
        let mut state = AnimationState {
            phase: ScalePhase::Down,
        };
        assert_eq!(state.advance(0.2), MIN_SCALE);
        assert_eq!(state.phase, ScalePhase::Up);
    }

    #[test]
    fn rotation_wraps_at_full_turn() {
        let mut scene = SceneGraph::new();
        let id = scene.add(create_box(1.0, 1.0, 1.0, None));
        scene.get_mut(id).unwrap().transform.rotation = Vec3::splat(TAU - ROTATION_STEP * 0.5);
        let mut animator = Animator::new();

        animator.step(&mut scene, id);
        let r = scene.get(id).unwrap().transform.rotation;
        assert!((r.x - ROTATION_STEP * 0.5).abs() < 1e-4);

        // Long runs stay in one turn.
        for _ in 0..10_000 {
            animator.step(&mut scene, id);
        }
        let r = scene.get(id).unwrap().transform.rotation;
        assert!((0.0..TAU).contains(&r.x));
        assert_eq!(r.x, r.z);
    }

    #[test]
    fn missing_node_disables_animation() {
        let mut scene = SceneGraph::new();
        let id = scene.add(create_box(1.0, 1.0, 1.0, None));
        let mut animator = Animator::new();
        animator.step(&mut scene, id);
        scene.remove(id).unwrap();
        assert!(!animator.step(&mut scene, id));
        assert!(animator.state(id).is_none());
    }
}
