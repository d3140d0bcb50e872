//! Named viewpoints and timed camera transitions between them.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::error::NavigationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewpoint {
    pub name: String,
    pub position: Vec3,
    pub target: Vec3,
}

impl Viewpoint {
    pub fn new(name: &str, position: Vec3, target: Vec3) -> Self {
        Self {
            name: name.to_string(),
            position,
            target,
        }
    }

    pub fn defaults() -> Vec<Viewpoint> {
        vec![
            Viewpoint::new("overview", Vec3::new(0.0, 8.0, 15.0), Vec3::ZERO),
            Viewpoint::new("desk", Vec3::new(0.0, 3.0, 5.0), Vec3::new(0.0, 1.5, 0.0)),
            Viewpoint::new("monitors", Vec3::new(0.0, 3.0, -3.0), Vec3::new(0.0, 3.0, -7.0)),
            Viewpoint::new("globe", Vec3::new(3.0, 4.0, -1.0), Vec3::new(5.0, 2.0, -5.0)),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub start_position: Vec3,
    pub end_position: Vec3,
    pub start_target: Vec3,
    pub end_target: Vec3,
    pub start_time: f64,
    pub duration: f64,
}

impl Transition {
    pub fn progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start_time) / self.duration).clamp(0.0, 1.0) as f32
    }

    fn sample(&self, progress: f32) -> (Vec3, Vec3) {
        (
            self.start_position.lerp(self.end_position, progress),
            self.start_target.lerp(self.end_target, progress),
        )
    }
}

pub struct CameraNavigator {
    viewpoints: Vec<Viewpoint>,
    duration: f64,
    current: Option<usize>,
    active: Option<Transition>,
}

impl CameraNavigator {
    /// `duration` is in seconds
    pub fn new(viewpoints: Vec<Viewpoint>, duration: f64) -> Self {
        Self {
            viewpoints,
            duration,
            current: None,
            active: None,
        }
    }

    pub fn viewpoint(&self, name: &str) -> Option<&Viewpoint> {
        self.viewpoints.iter().find(|v| v.name == name)
    }

    pub fn viewpoints(&self) -> &[Viewpoint] {
        &self.viewpoints
    }

    /// Name of the last viewpoint switched to
    pub fn current(&self) -> Option<&str> {
        self.current.map(|i| self.viewpoints[i].name.as_str())
    }

    pub fn active_transition(&self) -> Option<&Transition> {
        self.active.as_ref()
    }

    pub fn is_transitioning(&self) -> bool {
        self.active.is_some()
    }

    /// Place the camera on a viewpoint with no transition
    pub fn jump_to(&mut self, name: &str, camera: &mut Camera) -> Result<(), NavigationError> {
        let index = self.index_of(name)?;
        let view = &self.viewpoints[index];
        camera.position = view.position;
        camera.target = view.target;
        self.current = Some(index);
        self.active = None;
        Ok(())
    }

    /// Start a transition from wherever the camera is now.
    ///
    /// A transition already in flight is replaced; its current sample becomes
    /// the new start, so the camera never jumps.
    pub fn switch_to(&mut self, name: &str, camera: &Camera, now: f64) -> Result<(), NavigationError> {
        let index = self.index_of(name)?;
        let view = &self.viewpoints[index];
        self.active = Some(Transition {
            start_position: camera.position,
            end_position: view.position,
            start_target: camera.target,
            end_target: view.target,
            start_time: now,
            duration: self.duration,
        });
        self.current = Some(index);
        log::info!("camera -> '{}'", name);
        Ok(())
    }

    /// Apply the active transition for time `now`; returns true while one was applied
    pub fn advance(&mut self, camera: &mut Camera, now: f64) -> bool {
        let Some(transition) = self.active else {
            return false;
        };
        let progress = transition.progress(now);
        let (position, target) = transition.sample(progress);
        camera.position = position;
        camera.target = target;
        if progress >= 1.0 {
            self.active = None;
        }
        true
    }

    fn index_of(&self, name: &str) -> Result<usize, NavigationError> {
        self.viewpoints
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| NavigationError::UnknownViewpoint(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (CameraNavigator, Camera) {
        let mut nav = CameraNavigator::new(Viewpoint::defaults(), 1.0);
        let mut camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z, 1.0);
        nav.jump_to("overview", &mut camera).unwrap();
        (nav, camera)
    }

    #[test]
    fn test_unknown_viewpoint_leaves_camera() {
        let (mut nav, camera) = rig();
        let before = camera;
        let err = nav.switch_to("lobby", &camera, 0.0).unwrap_err();
        assert_eq!(err, NavigationError::UnknownViewpoint("lobby".into()));
        assert_eq!(camera, before);
        assert!(!nav.is_transitioning());
        assert_eq!(nav.current(), Some("overview"));
    }

    #[test]
    fn test_completion_clears_transition() {
        let (mut nav, mut camera) = rig();
        nav.switch_to("globe", &camera, 2.0).unwrap();
        assert!(nav.advance(&mut camera, 3.5));
        assert!(!nav.is_transitioning());
        assert_eq!(camera.position, Vec3::new(3.0, 4.0, -1.0));
        assert!(!nav.advance(&mut camera, 4.0), "completed transition must not reapply");
    }

    #[test]
    fn test_progress_clamps_before_start() {
        let t = Transition {
            start_position: Vec3::ZERO,
            end_position: Vec3::ONE,
            start_target: Vec3::ZERO,
            end_target: Vec3::ONE,
            start_time: 5.0,
            duration: 1.0,
        };
        assert_eq!(t.progress(4.0), 0.0);
        assert_eq!(t.progress(5.5), 0.5);
        assert_eq!(t.progress(9.0), 1.0);
    }
}
