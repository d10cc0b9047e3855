//! Transform and camera tweening.
//!
//! The interaction layer only sees [`AnimationService`]: start a tween, get a
//! handle back, ask later whether the handle has finished. [`Animator`] is the
//! frame-driven implementation the viewer uses; it advances every active
//! tween from `tick` and drops finished ones, which is what completes their
//! handles.

use crate::render::camera::ViewerCamera;
use crate::scene::{CameraView, NodeId, Scene, Transform};
use std::time::Duration;

/// Completion token for one started animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(u64);

impl AnimationHandle {
    #[cfg(test)]
    pub(crate) fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

pub trait AnimationService {
    /// Animate `node` from its current transform to its named pose.
    /// Returns `None` when the node or the pose does not exist.
    fn animate_transform(
        &mut self,
        scene: &Scene,
        node: NodeId,
        pose: &str,
        duration: Duration,
    ) -> Option<AnimationHandle>;

    /// Animate the camera to a named view. Returns `None` when the view does not exist.
    fn animate_to_view(
        &mut self,
        scene: &Scene,
        view: &str,
        duration: Duration,
    ) -> Option<AnimationHandle>;

    fn is_finished(&self, handle: AnimationHandle) -> bool;
}

struct TransformTween {
    handle: AnimationHandle,
    node: NodeId,
    from: Option<Transform>,
    to: Transform,
    elapsed: Duration,
    duration: Duration,
}

struct CameraTween {
    handle: AnimationHandle,
    from: Option<CameraView>,
    to: CameraView,
    elapsed: Duration,
    duration: Duration,
}

#[derive(Default)]
pub struct Animator {
    next_handle: u64,
    transforms: Vec<TransformTween>,
    camera: Option<CameraTween>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.transforms.is_empty() && self.camera.is_none()
    }

    fn allocate(&mut self) -> AnimationHandle {
        self.next_handle += 1;
        AnimationHandle(self.next_handle)
    }

    /// Advance every active tween by `dt` and write the results into the
    /// scene and camera. Tweens that reach their end are removed.
    pub fn tick(&mut self, scene: &mut Scene, camera: &mut ViewerCamera, dt: Duration) {
        self.transforms.retain_mut(|tween| {
            let Some(node) = scene.node_mut(tween.node) else {
                return false;
            };
            // The start pose is captured on the first tick so that a tween
            // started behind another one begins where that one stopped.
            let from = *tween.from.get_or_insert(node.transform);
            tween.elapsed += dt;
            let t = progress(tween.elapsed, tween.duration);
            node.transform = from.lerp(&tween.to, ease_in_out(t));
            t < 1.0
        });

        if let Some(tween) = self.camera.as_mut() {
            let from = *tween.from.get_or_insert_with(|| camera.view());
            tween.elapsed += dt;
            let t = progress(tween.elapsed, tween.duration);
            camera.set_view(&lerp_view(&from, &tween.to, ease_in_out(t)));
            if t >= 1.0 {
                log::debug!("Camera tween {:?} finished", tween.handle);
                self.camera = None;
            }
        }
    }
}

impl AnimationService for Animator {
    fn animate_transform(
        &mut self,
        scene: &Scene,
        node: NodeId,
        pose: &str,
        duration: Duration,
    ) -> Option<AnimationHandle> {
        let to = *scene.node(node)?.pose(pose)?;
        let handle = self.allocate();
        // A node is driven by at most one tween; the newer one wins.
        self.transforms.retain(|tween| tween.node != node);
        self.transforms.push(TransformTween {
            handle,
            node,
            from: None,
            to,
            elapsed: Duration::ZERO,
            duration,
        });
        Some(handle)
    }

    fn animate_to_view(
        &mut self,
        scene: &Scene,
        view: &str,
        duration: Duration,
    ) -> Option<AnimationHandle> {
        let to = *scene.view(view)?;
        let handle = self.allocate();
        self.camera = Some(CameraTween {
            handle,
            from: None,
            to,
            elapsed: Duration::ZERO,
            duration,
        });
        Some(handle)
    }

    fn is_finished(&self, handle: AnimationHandle) -> bool {
        let transform_active = self.transforms.iter().any(|tween| tween.handle == handle);
        let camera_active = self
            .camera
            .as_ref()
            .is_some_and(|tween| tween.handle == handle);
        !transform_active && !camera_active
    }
}

fn progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}

/// Cubic ease-in-out.
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

fn lerp_view(from: &CameraView, to: &CameraView, t: f32) -> CameraView {
    CameraView {
        position: from.position.lerp(to.position, t),
        target: from.target.lerp(to.target, t),
        fov_deg: from.fov_deg + (to.fov_deg - from.fov_deg) * t,
    }
}
