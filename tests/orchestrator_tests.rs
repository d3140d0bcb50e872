use glam::Vec3;
use virtual_office::config::OfficeConfig;
use virtual_office::content::{PanelContent, TaskRecord};
use virtual_office::core::{Button, Controller, DisplayContext, IdleController};
use virtual_office::entity::{Entity, EntityId, SceneEntity};
use virtual_office::error::EntityError;
use virtual_office::feed::{OfficeData, TASK_PANEL_ROWS};
use virtual_office::render::{HeadlessBackend, RenderBackend};
use virtual_office::scene::{Node, NodeId, SceneGraph, Transform};
use virtual_office::voice::SilentVoice;
use virtual_office::Orchestrator;

fn office() -> Orchestrator<HeadlessBackend> {
    Orchestrator::new(
        OfficeConfig::default(),
        DisplayContext::new(640, 360),
        HeadlessBackend::new(),
        Box::new(SilentVoice::new()),
    )
    .unwrap()
}

fn sample_data() -> OfficeData {
    let tasks = (0..7)
        .map(|i| TaskRecord {
            id: Some(format!("T-{i}")),
            account_name: Some(format!("Account {i}")),
            status: Some("Pending".into()),
            premium: if i == 3 { None } else { Some(1000.0 * i as f64) },
            propensity_to_bind: Some("Likely".into()),
        })
        .collect();
    OfficeData {
        tasks,
        ..OfficeData::default()
    }
}

fn monitor_regenerations(office: &Orchestrator<HeadlessBackend>, slot: usize) -> usize {
    office
        .entities()
        .iter()
        .filter_map(|e| e.as_monitor())
        .find(|m| m.slot() == slot)
        .map(|m| m.regenerations())
        .unwrap()
}

/// Minimal caller-defined entity: one group node and a clock
struct Probe {
    root: Option<NodeId>,
    time: f64,
    panics: bool,
    release_fails: bool,
}

impl Probe {
    fn boxed(panics: bool) -> SceneEntity {
        let probe: Box<dyn Entity> = Box::new(Probe { root: None, time: 0.0, panics, release_fails: false });
        probe.into()
    }

    /// Builds normally but refuses to give its node back
    fn unreleasable() -> SceneEntity {
        let probe: Box<dyn Entity> = Box::new(Probe { root: None, time: 0.0, panics: false, release_fails: true });
        probe.into()
    }
}

impl Entity for Probe {
    fn kind(&self) -> &'static str {
        "probe"
    }

    fn build(&mut self, graph: &mut SceneGraph) -> Result<(), EntityError> {
        self.root = Some(graph.spawn(graph.root(), Node::group("probe", Transform::IDENTITY))?);
        Ok(())
    }

    fn tick(&mut self, _graph: &mut SceneGraph, dt: f32) -> Result<(), EntityError> {
        if self.panics {
            panic!("probe tick exploded");
        }
        self.time += f64::from(dt.max(1e-6));
        Ok(())
    }

    fn animation_time(&self) -> f64 {
        self.time
    }

    fn release(&mut self, graph: &mut SceneGraph) -> Result<usize, EntityError> {
        if self.release_fails {
            return Err(EntityError::Fault("probe node is still referenced".into()));
        }
        match self.root.take() {
            Some(root) => Ok(graph.release_subtree(root)?),
            None => Ok(0),
        }
    }
}

struct Keys(Vec<Button>, bool);

impl Controller for Keys {
    fn is_down(&self, button: Button) -> bool {
        self.0.contains(&button)
    }

    fn get_down_keys(&self) -> &[Button] {
        &self.0
    }

    fn keyboard_captured(&self) -> bool {
        self.1
    }
}

#[test]
fn test_panicking_tick_does_not_stop_others() {
    let mut office = office();
    let bad: EntityId = office.register(Probe::boxed(true)).unwrap();
    let good: EntityId = office.register(Probe::boxed(false)).unwrap();
    office.build().unwrap();

    for i in 0..5 {
        office.frame(i as f64 * 0.016, &IdleController);
    }

    assert_eq!(office.tick_faults(bad), 5, "every tick of the bad entity should be recorded");
    assert_eq!(office.tick_faults(good), 0);
    assert!(office.entity(good).unwrap().inner().animation_time() > 0.0);
    assert_eq!(office.telemetry().tick_faults(), 5);
    assert_eq!(office.backend().frames_rendered(), 5, "rendering must continue after faults");
}

#[test]
fn test_content_before_build_is_applied_after() {
    let mut office = office().with_office_entities();
    office.content_sender().publish(sample_data());
    assert_eq!(monitor_regenerations(&office, 0), 0);

    office.build().unwrap();

    let monitor = office
        .entities()
        .iter()
        .filter_map(|e| e.as_monitor())
        .find(|m| m.slot() == 0)
        .unwrap();
    assert!(!monitor.has_pending());
    match monitor.last_rendered() {
        Some(PanelContent::Tasks(rows)) => assert_eq!(rows.len(), TASK_PANEL_ROWS),
        other => panic!("slot 0 should show tasks, got {:?}", other),
    }
    assert_eq!(monitor_regenerations(&office, 3), 1, "risk matrix should render from the same update");
}

#[test]
fn test_direct_delivery_before_build_is_not_lost() {
    let mut office = office().with_office_entities();
    office.deliver(virtual_office::ContentUpdate::Panel {
        slot: 2,
        content: PanelContent::Tasks(sample_data().tasks),
    });
    office.build().unwrap();
    assert_eq!(monitor_regenerations(&office, 2), 1);
}

#[test]
fn test_identical_content_regenerates_once() {
    let mut office = office().with_office_entities();
    office.build().unwrap();
    let sender = office.content_sender();

    sender.publish(sample_data());
    office.frame(0.0, &IdleController);
    sender.publish(sample_data());
    office.frame(0.016, &IdleController);

    assert_eq!(monitor_regenerations(&office, 0), 1);
    assert_eq!(monitor_regenerations(&office, 3), 1);
}

#[test]
fn test_teardown_twice_releases_once() {
    let mut office = office().with_office_entities();
    office.build().unwrap();
    let before = office.graph().live_nodes();

    let released = office.teardown();
    assert!(released > 0);
    assert!(office.graph().live_nodes() < before);
    assert_eq!(office.teardown(), 0, "second teardown must be a no-op");
    assert_eq!(office.backend().releases(), 1);
    assert!(office.is_torn_down());

    let frames = office.backend().frames_rendered();
    office.frame(1.0, &IdleController);
    assert_eq!(office.backend().frames_rendered(), frames, "no frames after teardown");
}

#[test]
fn test_teardown_continues_past_release_failure() {
    let mut office = office();
    office.register(Probe::unreleasable()).unwrap();
    let mut office = office.with_office_entities();
    office.build().unwrap();
    assert!(office.entities().len() > 1);
    let before = office.graph().live_nodes();

    let released = office.teardown();

    // graph root plus the node the failing entity kept
    assert_eq!(office.graph().live_nodes(), 2, "every other entity must still be released");
    assert_eq!(released, before - 2);
    assert_eq!(office.backend().releases(), 1);
    assert!(office.is_torn_down());
}

#[test]
fn test_entity_clocks_strictly_increase() {
    let mut office = office().with_office_entities();
    office.build().unwrap();

    let mut previous: Vec<f64> = office.entities().iter().map(|e| e.inner().animation_time()).collect();
    // includes a repeated and a backwards timestamp
    for now in [0.0, 0.016, 0.010, 0.010, 0.5, 9.0] {
        office.frame(now, &IdleController);
        for (i, entity) in office.entities().iter().enumerate() {
            let t = entity.inner().animation_time();
            assert!(t > previous[i], "entity {} clock went from {} to {} at now={}", i, previous[i], t, now);
            previous[i] = t;
        }
    }
}

#[test]
fn test_held_key_moves_camera_unless_captured() {
    let mut office = office();
    office.build().unwrap();
    let start = office.camera().position;
    let forward = office.camera().ground_forward();

    let keys = Keys(vec![Button::KeyW], false);
    office.frame(0.0, &keys);
    office.frame(0.1, &keys);
    let moved = office.camera().position - start;
    let expected = forward * office.config().move_speed * 0.1;
    assert!(moved.abs_diff_eq(expected, 1e-3), "moved {:?}, expected {:?}", moved, expected);

    let captured = Keys(vec![Button::KeyW], true);
    let here = office.camera().position;
    office.frame(0.2, &captured);
    assert_eq!(office.camera().position, here, "typing in the chat must not move the camera");
}

#[test]
fn test_unknown_view_keeps_camera() {
    let mut office = office();
    let position = office.camera().position;
    assert!(office.switch_view("basement", 0.0).is_err());
    assert!(!office.navigator().is_transitioning());
    assert_eq!(office.camera().position, position);
}

#[test]
fn test_view_switch_reaches_target() {
    let mut office = office();
    office.build().unwrap();
    office.frame(0.0, &IdleController);
    office.switch_view("desk", 0.0).unwrap();
    office.frame(0.5, &IdleController);
    office.frame(1.5, &IdleController);
    assert!(office.camera().position.abs_diff_eq(Vec3::new(0.0, 3.0, 5.0), 1e-4));
    assert_eq!(office.navigator().current(), Some("desk"));
}

#[test]
fn test_chat_reply_makes_avatar_speak() {
    let mut office = office().with_office_entities();
    office.build().unwrap();
    office.frame(0.0, &IdleController);

    assert!(office.send_chat("what are my tasks?", 0.0));
    office.frame(0.5, &IdleController);
    assert_eq!(office.assistant().pending_replies(), 1, "reply should wait for the delay");

    office.frame(1.1, &IdleController);
    assert_eq!(office.assistant().pending_replies(), 0);
    let hologram = office.entities().iter().find_map(|e| e.as_hologram()).unwrap();
    assert!(hologram.is_speaking());
}

#[test]
fn test_register_after_build_builds_immediately() {
    let mut office = office();
    office.build().unwrap();
    let nodes = office.graph().live_nodes();
    office.register(Probe::boxed(false)).unwrap();
    assert_eq!(office.graph().live_nodes(), nodes + 1);
    assert!(office.build().is_err(), "building twice is rejected");
}
