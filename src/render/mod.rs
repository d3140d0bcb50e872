//! Rendering capabilities the orchestrator drives once per frame.

mod raycast;
mod surface;

pub use raycast::{RayCastPreview, AMBIENT, FOG_COLOR, FOG_FAR, FOG_NEAR};
pub use surface::SurfacePresenter;

use crate::camera::Camera;
use crate::core::DisplayContext;
use crate::error::RenderError;
use crate::scene::SceneGraph;

pub trait RenderBackend {
    /// Surface size changed; backends recompute their targets
    fn resize(&mut self, display: DisplayContext) -> Result<(), RenderError>;

    fn render(&mut self, graph: &SceneGraph, camera: &Camera) -> Result<(), RenderError>;

    /// Drop any backend-owned resources; safe to call more than once
    fn release(&mut self);

    fn frames_rendered(&self) -> u64;
}

/// Backend that draws nothing, for tests and windowless runs
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    display: Option<DisplayContext>,
    frames: u64,
    last_drawables: usize,
    releases: u32,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(&self) -> Option<DisplayContext> {
        self.display
    }

    /// Shaped nodes visible in the last rendered frame
    pub fn last_drawables(&self) -> usize {
        self.last_drawables
    }

    pub fn releases(&self) -> u32 {
        self.releases
    }
}

impl RenderBackend for HeadlessBackend {
    fn resize(&mut self, display: DisplayContext) -> Result<(), RenderError> {
        if display.is_empty() {
            return Err(RenderError::ZeroSize);
        }
        self.display = Some(display);
        Ok(())
    }

    fn render(&mut self, graph: &SceneGraph, _camera: &Camera) -> Result<(), RenderError> {
        self.last_drawables = graph.drawables().len();
        self.frames += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.releases += 1;
    }

    fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

impl<B: RenderBackend + ?Sized> RenderBackend for Box<B> {
    fn resize(&mut self, display: DisplayContext) -> Result<(), RenderError> {
        (**self).resize(display)
    }

    fn render(&mut self, graph: &SceneGraph, camera: &Camera) -> Result<(), RenderError> {
        (**self).render(graph, camera)
    }

    fn release(&mut self) {
        (**self).release()
    }

    fn frames_rendered(&self) -> u64 {
        (**self).frames_rendered()
    }
}
