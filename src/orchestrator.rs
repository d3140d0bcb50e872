//! Owns the scene, the entity registry and the per-frame update order.

use std::panic::{catch_unwind, AssertUnwindSafe};

use glam::Vec3;

use crate::camera::{Camera, MovementState};
use crate::config::OfficeConfig;
use crate::content::PanelContent;
use crate::core::{Controller, DisplayContext, FrameTelemetry};
use crate::entity::{office_entities, EntityEvent, EntityId, InteractiveSurface, SceneEntity, DRAWERS};
use crate::error::{EntityError, NavigationError, OfficeError};
use crate::feed::{content_channel, ContentInbox, ContentSender, ContentUpdate};
use crate::interaction::{Cursor, Hit, HoverTracker, InteractionResolver};
use crate::navigator::CameraNavigator;
use crate::render::RenderBackend;
use crate::scene::SceneGraph;
use crate::voice::{Assistant, VoiceCollaborator};

/// Largest step fed to entities after a stall
const MAX_FRAME_DT: f64 = 0.25;

pub struct Orchestrator<B: RenderBackend> {
    config: OfficeConfig,
    display: DisplayContext,
    graph: SceneGraph,
    entities: Vec<SceneEntity>,
    tick_faults: Vec<u64>,
    camera: Camera,
    navigator: CameraNavigator,
    resolver: InteractionResolver,
    hover: HoverTracker,
    cursor: Cursor,
    backend: B,
    assistant: Assistant,
    sender: ContentSender,
    inbox: ContentInbox,
    telemetry: FrameTelemetry,
    last_frame: Option<f64>,
    built: bool,
    torn_down: bool,
}

impl<B: RenderBackend> Orchestrator<B> {
    pub fn new(
        config: OfficeConfig,
        display: DisplayContext,
        mut backend: B,
        voice: Box<dyn VoiceCollaborator>,
    ) -> Result<Self, OfficeError> {
        config.validate()?;
        let mut camera = Camera::new(Vec3::new(0.0, 5.0, 15.0), Vec3::ZERO, display.aspect());
        let mut navigator = CameraNavigator::new(config.viewpoints.clone(), config.transition_seconds());
        navigator.jump_to(&config.initial_view, &mut camera)?;
        if let Err(e) = backend.resize(display) {
            log::warn!("initial resize to {}x{} failed: {}", display.width, display.height, e);
        }
        let (sender, inbox) = content_channel();

        Ok(Self {
            assistant: Assistant::new(voice, config.reply_delay_seconds()),
            resolver: InteractionResolver::new(config.tie_tolerance),
            config,
            display,
            graph: SceneGraph::new(),
            entities: Vec::new(),
            tick_faults: Vec::new(),
            camera,
            navigator,
            hover: HoverTracker::default(),
            cursor: Cursor::Default,
            backend,
            sender,
            inbox,
            telemetry: FrameTelemetry::new(),
            last_frame: None,
            built: false,
            torn_down: false,
        })
    }

    /// Register the furnished office in its standard build order
    pub fn with_office_entities(mut self) -> Self {
        for entity in office_entities(self.config.cities.clone(), self.config.panel_texture) {
            self.entities.push(entity);
            self.tick_faults.push(0);
        }
        self
    }

    /// Add an entity; once the scene is built it is built immediately
    pub fn register(&mut self, mut entity: SceneEntity) -> Result<EntityId, EntityError> {
        if self.built {
            entity.inner_mut().build(&mut self.graph)?;
        }
        self.entities.push(entity);
        self.tick_faults.push(0);
        Ok(self.entities.len() - 1)
    }

    /// Build every registered entity in order, then apply content that arrived early
    pub fn build(&mut self) -> Result<(), OfficeError> {
        if self.built {
            return Err(EntityError::AlreadyBuilt.into());
        }
        for (id, entity) in self.entities.iter_mut().enumerate() {
            let entity = entity.inner_mut();
            entity.build(&mut self.graph).map_err(|e| {
                log::error!("entity {} ({}) failed to build: {}", id, entity.kind(), e);
                e
            })?;
        }
        self.built = true;
        log::info!(
            "office built: {} entities, {} nodes, {} textures",
            self.entities.len(),
            self.graph.live_nodes(),
            self.graph.live_textures()
        );
        self.drain_inbox();
        Ok(())
    }

    pub fn content_sender(&self) -> ContentSender {
        self.sender.clone()
    }

    /// Apply one update immediately, bypassing the inbox
    pub fn deliver(&mut self, update: ContentUpdate) {
        match update {
            ContentUpdate::Office(data) => {
                self.assistant.set_tasks(&data.tasks);
                for (slot, content) in data.panel_contents() {
                    self.apply_panel(slot, &content);
                }
            }
            ContentUpdate::Panel { slot, content } => self.apply_panel(slot, &content),
        }
    }

    fn drain_inbox(&mut self) {
        for update in self.inbox.drain() {
            self.deliver(update);
        }
    }

    fn apply_panel(&mut self, slot: usize, content: &PanelContent) {
        let target = self
            .entities
            .iter_mut()
            .find(|e| e.as_monitor().is_some_and(|m| m.slot() == slot));
        let Some(monitor) = target else {
            log::warn!("no monitor in slot {} for {} content", slot, content.kind());
            return;
        };
        if let Err(e) = monitor.inner_mut().on_content_update(&mut self.graph, content) {
            log::warn!("monitor {} rejected {} content: {}", slot, content.kind(), e);
        }
    }

    /// One iteration of the render loop at time `now` (seconds)
    pub fn frame(&mut self, now: f64, controller: &dyn Controller) {
        if self.torn_down {
            return;
        }
        self.drain_inbox();

        let dt = self
            .last_frame
            .map(|last| (now - last).clamp(0.0, MAX_FRAME_DT))
            .unwrap_or(0.0) as f32;
        self.last_frame = Some(now);

        self.navigator.advance(&mut self.camera, now);
        self.camera
            .apply_movement(MovementState::from_controller(controller), self.config.move_speed, dt);

        if self.built {
            self.tick_entities(dt);
        }

        if let Err(e) = self.backend.render(&self.graph, &self.camera) {
            log::warn!("render failed: {}", e);
        }

        if let Some(fps) = self.telemetry.record_frame(now) {
            log::debug!("fps {:.1}", fps);
        }

        for reply in self.assistant.update(now) {
            if let Some(hologram) = self.entities.iter_mut().find_map(|e| e.as_hologram_mut()) {
                hologram.speak(&reply);
            }
        }
        self.sync_hologram();
    }

    fn tick_entities(&mut self, dt: f32) {
        let graph = &mut self.graph;
        for (id, entity) in self.entities.iter_mut().enumerate() {
            let outcome = catch_unwind(AssertUnwindSafe(|| entity.inner_mut().tick(graph, dt)));
            let fault = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic) => panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "panic".to_string()),
            };
            self.tick_faults[id] += 1;
            self.telemetry.record_tick_fault();
            log::error!("entity {} ({}) tick failed: {}", id, entity.inner().kind(), fault);
        }
    }

    fn sync_hologram(&mut self) {
        let listening = self.assistant.is_listening();
        if let Some(hologram) = self.entities.iter_mut().find_map(|e| e.as_hologram_mut()) {
            hologram.set_listening(listening);
        }
    }

    fn surfaces(&self) -> Vec<(EntityId, InteractiveSurface)> {
        self.entities
            .iter()
            .enumerate()
            .flat_map(|(id, e)| e.inner().interactive_surfaces().into_iter().map(move |s| (id, s)))
            .collect()
    }

    pub fn resolve_pointer(&self, ndc: (f32, f32)) -> Option<Hit> {
        if !self.built || self.torn_down {
            return None;
        }
        self.resolver.resolve_pointer(&self.camera, ndc, &self.graph, self.surfaces())
    }

    /// Hover dispatch; `None` means the pointer left the surface
    pub fn pointer_moved(&mut self, ndc: Option<(f32, f32)>) -> Cursor {
        let hit = ndc.and_then(|ndc| self.resolve_pointer(ndc));
        for (id, pick) in self.hover.update(hit.as_ref()) {
            let Some(entity) = self.entities.get_mut(id) else { continue };
            if let Err(e) = entity.inner_mut().on_hover(&mut self.graph, pick) {
                log::warn!("entity {} hover failed: {}", id, e);
            }
        }
        self.cursor = Cursor::for_hit(hit.as_ref());
        self.cursor
    }

    /// Pointer moved onto the overlay or out of the window; clears scene hover
    pub fn pointer_left(&mut self) -> Cursor {
        self.pointer_moved(None)
    }

    /// Click dispatch to the nearest pickable surface under `ndc`
    pub fn click(&mut self, ndc: (f32, f32)) -> Option<EntityEvent> {
        let hit = self.resolve_pointer(ndc)?;
        let entity = self.entities.get_mut(hit.entity)?;
        let event = match entity.inner_mut().on_click(&mut self.graph, hit.pick) {
            Ok(event) => event?,
            Err(e) => {
                log::warn!("entity {} click failed: {}", hit.entity, e);
                return None;
            }
        };
        self.handle_event(&event);
        Some(event)
    }

    fn handle_event(&mut self, event: &EntityEvent) {
        match event {
            EntityEvent::DrawerToggled { index, .. } => self.assistant.show_drawer_contents(*index),
            EntityEvent::DocumentOpened { drawer, slot } => {
                if let Some(item) = DRAWERS.get(*drawer).and_then(|d| d.items.get(*slot)) {
                    self.assistant
                        .post_notice(format!("{}: {}", DRAWERS[*drawer].title, item));
                }
            }
            EntityEvent::CitySelected(city) => self.assistant.show_city_details(city),
            EntityEvent::AssistantToggled => {
                self.assistant.toggle_panel();
            }
        }
        self.sync_hologram();
    }

    pub fn switch_view(&mut self, name: &str, now: f64) -> Result<(), NavigationError> {
        self.navigator.switch_to(name, &self.camera, now)
    }

    pub fn send_chat(&mut self, text: &str, now: f64) -> bool {
        self.assistant.send_message(text, now)
    }

    pub fn toggle_assistant_panel(&mut self) -> bool {
        let open = self.assistant.toggle_panel();
        self.sync_hologram();
        open
    }

    pub fn toggle_voice_input(&mut self) {
        self.assistant.toggle_voice_input();
        self.sync_hologram();
    }

    pub fn stop_speaking(&mut self) {
        self.assistant.stop_speaking();
        if let Some(hologram) = self.entities.iter_mut().find_map(|e| e.as_hologram_mut()) {
            hologram.stop_speaking();
        }
        self.sync_hologram();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let display = DisplayContext::new(width, height);
        if display.is_empty() {
            return;
        }
        self.display = display;
        self.camera.set_aspect(width, height);
        if let Err(e) = self.backend.resize(display) {
            log::warn!("resize to {}x{} failed: {}", width, height, e);
        }
    }

    /// Release every entity and the backend; later calls release nothing
    pub fn teardown(&mut self) -> usize {
        if self.torn_down {
            return 0;
        }
        self.torn_down = true;
        let mut released = 0;
        for (id, entity) in self.entities.iter_mut().enumerate() {
            match entity.inner_mut().release(&mut self.graph) {
                Ok(n) => released += n,
                Err(e) => log::warn!("entity {} ({}) release failed: {}", id, entity.inner().kind(), e),
            }
        }
        self.backend.release();
        self.hover.clear();
        log::info!("teardown released {} nodes", released);
        released
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn navigator(&self) -> &CameraNavigator {
        &self.navigator
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn entity(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.get(id)
    }

    pub fn entities(&self) -> &[SceneEntity] {
        &self.entities
    }

    pub fn tick_faults(&self, id: EntityId) -> u64 {
        self.tick_faults.get(id).copied().unwrap_or(0)
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn assistant_mut(&mut self) -> &mut Assistant {
        &mut self.assistant
    }

    pub fn telemetry(&self) -> &FrameTelemetry {
        &self.telemetry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn display(&self) -> DisplayContext {
        self.display
    }

    pub fn config(&self) -> &OfficeConfig {
        &self.config
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}
