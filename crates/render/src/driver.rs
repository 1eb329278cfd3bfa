use lightbox_common::NodeId;
use lightbox_scene::SceneGraph;
use std::time::{Duration, Instant};

use crate::animation::Animator;
use crate::orbit::CameraControl;
use crate::renderer::{Camera, Renderer};
use crate::timing::FrameTimer;

/// Host hook that arranges for the driver to be ticked again.
///
/// Implementations must not block; the host calls `tick` on its next frame.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Scheduler for headless runs: counts requests, the caller pumps frames.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: u64,
    requested: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one pending request, if any.
    pub fn take(&mut self) -> bool {
        if self.pending > 0 {
            self.pending -= 1;
            true
        } else {
            false
        }
    }

    pub fn pending(&self) -> u64 {
        self.pending
    }

    /// Requests seen over the scheduler's lifetime.
    pub fn requested(&self) -> u64 {
        self.requested
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.pending += 1;
        self.requested += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// No frame has run yet.
    #[default]
    Idle,
    Running { frames: u64 },
}

/// Runs one frame per `tick`: reschedule, animate, update camera, draw.
#[derive(Debug)]
pub struct FrameDriver {
    state: LoopState,
    animator: Animator,
    tracked: Option<NodeId>,
    animating: bool,
    timer: FrameTimer,
    last_tick: Option<Instant>,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new(None)
    }
}

impl FrameDriver {
    /// `tracked` is the node to animate; `None` disables animation.
    pub fn new(tracked: Option<NodeId>) -> Self {
        Self {
            state: LoopState::Idle,
            animator: Animator::new(),
            tracked,
            animating: true,
            timer: FrameTimer::default(),
            last_tick: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        match self.state {
            LoopState::Idle => 0,
            LoopState::Running { frames } => frames,
        }
    }

    pub fn tracked(&self) -> Option<NodeId> {
        self.tracked
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn is_animating(&self) -> bool {
        self.animating && self.tracked.is_some()
    }

    /// Pause or resume animation without forgetting its state.
    pub fn set_animating(&mut self, on: bool) {
        self.animating = on;
    }

    /// Run one frame and return what the renderer produced.
    pub fn tick<R: Renderer>(
        &mut self,
        scheduler: &mut dyn FrameScheduler,
        scene: &mut SceneGraph,
        camera: &mut Camera,
        controls: Option<&mut dyn CameraControl>,
        renderer: &R,
    ) -> R::Output {
        let frame = self.frames() + 1;
        let _span = tracing::info_span!("frame", frame).entered();

        let now = Instant::now();
        let dt = self
            .last_tick
            .map(|last| now.duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_tick = Some(now);
        if frame > 1 {
            self.timer.record(dt);
        }

        scheduler.request_frame();

        if self.animating {
            if let Some(id) = self.tracked {
                if !self.animator.step(scene, id) {
                    tracing::debug!(%id, "tracked object gone, animation disabled");
                    self.tracked = None;
                }
            }
        }

        if let Some(controls) = controls {
            controls.update(camera, dt.as_secs_f32());
        }

        let output = renderer.render(scene, camera);
        self.state = LoopState::Running { frames: frame };
        tracing::trace!(frame, dt_ms = dt.as_secs_f64() * 1000.0, "frame done");
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ScalePhase;
    use crate::orbit::OrbitController;
    use glam::Vec3;
    use lightbox_scene::create_box;

    /// Renderer that reports what it saw.
    struct Probe;

    impl Renderer for Probe {
        type Output = (usize, Vec3);

        fn render(&self, scene: &SceneGraph, camera: &Camera) -> (usize, Vec3) {
            (scene.node_count(), camera.eye)
        }
    }

    #[test]
    fn idle_until_first_tick() {
        let driver = FrameDriver::default();
        assert_eq!(driver.state(), LoopState::Idle);
        assert_eq!(driver.frames(), 0);
    }

    #[test]
    fn each_tick_requests_the_next_frame() {
        let mut scheduler = ManualScheduler::new();
        let mut scene = SceneGraph::new();
        let mut camera = Camera::default();
        let mut driver = FrameDriver::default();

        driver.tick(&mut scheduler, &mut scene, &mut camera, None, &Probe);
        assert_eq!(driver.state(), LoopState::Running { frames: 1 });
        assert_eq!(scheduler.pending(), 1);

        // Host loop: run whatever was requested, a bounded number of times.
        let mut ran = 0;
        while scheduler.take() && ran < 9 {
            driver.tick(&mut scheduler, &mut scene, &mut camera, None, &Probe);
            ran += 1;
        }
        assert_eq!(driver.frames(), 10);
        assert_eq!(scheduler.requested(), 10);
        assert_eq!(driver.timer().count(), 9);
    }

    #[test]
    fn tick_animates_tracked_object() {
        let mut scheduler = ManualScheduler::new();
        let mut scene = SceneGraph::new();
        let id = scene.add(create_box(1.0, 1.0, 1.0, Some("box-0-0")));
        let mut camera = Camera::default();
        let mut driver = FrameDriver::new(Some(id));

        for _ in 0..150 {
            driver.tick(&mut scheduler, &mut scene, &mut camera, None, &Probe);
        }
        let t = scene.get(id).unwrap().transform;
        assert!((t.rotation.x - 1.5).abs() < 1e-3);
        assert!((1.0..=2.0).contains(&t.scale.x));
        assert_eq!(driver.animator().state(id).unwrap().phase, ScalePhase::Down);
    }

    #[test]
    fn paused_animation_leaves_object_alone() {
        let mut scheduler = ManualScheduler::new();
        let mut scene = SceneGraph::new();
        let id = scene.add(create_box(1.0, 1.0, 1.0, None));
        let mut camera = Camera::default();
        let mut driver = FrameDriver::new(Some(id));
        driver.set_animating(false);
        assert!(!driver.is_animating());

        driver.tick(&mut scheduler, &mut scene, &mut camera, None, &Probe);
        assert_eq!(scene.get(id).unwrap().transform.rotation, Vec3::ZERO);
    }

    #[test]
    fn missing_tracked_object_is_not_an_error() {
        let mut scheduler = ManualScheduler::new();
        let mut scene = SceneGraph::new();
        let mut camera = Camera::default();
        let mut driver = FrameDriver::new(Some(NodeId(42)));

        let (nodes, _) = driver.tick(&mut scheduler, &mut scene, &mut camera, None, &Probe);
        assert_eq!(nodes, 0);
        assert_eq!(driver.tracked(), None);
        assert_eq!(driver.frames(), 1);
    }

    #[test]
    fn camera_control_runs_before_render() {
        let mut scheduler = ManualScheduler::new();
        let mut scene = SceneGraph::new();
        let mut camera = Camera::default();
        let mut orbit = OrbitController::from_camera(&camera);
        orbit.damping = 1.0;
        orbit.pan(500.0, 0.0);
        let mut driver = FrameDriver::default();

        // First frame has dt = 0, so nothing moves yet.
        driver.tick(&mut scheduler, &mut scene, &mut camera, Some(&mut orbit), &Probe);
        std::thread::sleep(Duration::from_millis(20));
        let (_, seen) =
            driver.tick(&mut scheduler, &mut scene, &mut camera, Some(&mut orbit), &Probe);
        assert_eq!(seen, camera.eye);
        assert_ne!(camera.target, Vec3::ZERO);
    }
}
