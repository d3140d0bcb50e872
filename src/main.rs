use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorIcon, Window, WindowId},
};

use virtual_office::cli::Cli;
use virtual_office::core::{Clock, DisplayContext, WinitController};
use virtual_office::feed::load_office_data;
use virtual_office::interaction::Cursor;
use virtual_office::overlay::{Overlay, OverlayAction, OverlayState};
use virtual_office::render::{RayCastPreview, RenderBackend, SurfacePresenter};
use virtual_office::voice::{ConsoleVoice, SilentVoice, VoiceCollaborator};
use virtual_office::{OfficeConfig, OfficeData, Orchestrator};

const SAMPLE_DATA: &str = include_str!("../data/office.json");
const HEADLESS_STEP: f64 = 1.0 / 60.0;

type Office = Orchestrator<RayCastPreview>;

fn load_config(cli: &Cli) -> Result<OfficeConfig> {
    let mut config = match &cli.config {
        Some(path) => OfficeConfig::load(path)?,
        None => OfficeConfig::default(),
    };
    if let Some(view) = &cli.view {
        config.initial_view = view.clone();
    }
    if let Some(scale) = cli.preview_scale {
        config.preview_scale = scale;
    }
    config.validate()?;
    Ok(config)
}

fn load_data(cli: &Cli) -> Result<OfficeData> {
    match &cli.data {
        Some(path) => Ok(load_office_data(path)?),
        None => serde_json::from_str(SAMPLE_DATA).context("bundled sample data is malformed"),
    }
}

/// Stdin lines become utterances when console voice is on
fn make_voice(cli: &Cli) -> Box<dyn VoiceCollaborator> {
    if !cli.console_voice {
        return Box::new(SilentVoice::new());
    }
    let (tx, voice) = ConsoleVoice::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.unbounded_send(line).is_err() {
                break;
            }
        }
    });
    Box::new(voice)
}

fn build_office(cli: &Cli, display: DisplayContext) -> Result<Office> {
    let config = load_config(cli)?;
    let backend = RayCastPreview::new(display, config.preview_scale);
    let mut office = Orchestrator::new(config, display, backend, make_voice(cli))?.with_office_entities();
    office.build()?;

    let data = load_data(cli)?;
    log::info!(
        "loaded {} tasks, {} portfolio cards, {} dashboard cards",
        data.tasks.len(),
        data.portfolio.len(),
        data.dashboard.len()
    );
    office.content_sender().publish(data);
    Ok(office)
}

fn apply_actions(office: &mut Office, actions: Vec<OverlayAction>, now: f64) {
    for action in actions {
        match action {
            OverlayAction::SwitchView(name) => {
                if let Err(e) = office.switch_view(&name, now) {
                    log::warn!("{}", e);
                }
            }
            OverlayAction::SendChat(text) => {
                office.send_chat(&text, now);
            }
            OverlayAction::TogglePanel => {
                office.toggle_assistant_panel();
            }
            OverlayAction::ClosePanel => office.assistant_mut().close_panel(),
            OverlayAction::ToggleVoice => office.toggle_voice_input(),
            OverlayAction::StopSpeaking => office.stop_speaking(),
            OverlayAction::ClearChat => office.assistant_mut().clear_chat(),
        }
    }
}

fn run_headless(cli: &Cli, frames: u32) -> Result<()> {
    let display = DisplayContext::new(cli.width, cli.height);
    let mut office = build_office(cli, display)?;
    let controller = WinitController::new();

    for i in 0..frames {
        office.frame(i as f64 * HEADLESS_STEP, &controller);
    }

    if !cli.no_ui {
        println!(
            "rendered {} frames at {}x{}, {} live nodes, {} tick faults",
            office.backend().frames_rendered(),
            office.backend().target().width,
            office.backend().target().height,
            office.graph().live_nodes(),
            office.telemetry().tick_faults()
        );
    }
    office.teardown();
    Ok(())
}

struct App {
    cli: Cli,
    window: Option<Arc<Window>>,
    presenter: Option<SurfacePresenter>,
    office: Option<Office>,
    controller: WinitController,
    overlay: Overlay,
    clock: Clock,
}

impl App {
    fn new(cli: Cli) -> Self {
        Self {
            cli,
            window: None,
            presenter: None,
            office: None,
            controller: WinitController::new(),
            overlay: Overlay::new(),
            clock: Clock::new(),
        }
    }

    fn init(&mut self, window: Arc<Window>) -> Result<()> {
        let size = window.inner_size();
        let display = DisplayContext::new(size.width.max(1), size.height.max(1));
        let office = build_office(&self.cli, display)?;
        let presenter = pollster::block_on(SurfacePresenter::new(window.clone(), office.backend().target()))?;

        self.window = Some(window);
        self.presenter = Some(presenter);
        self.office = Some(office);
        Ok(())
    }

    fn redraw(&mut self) {
        let (Some(window), Some(presenter), Some(office)) = (&self.window, &mut self.presenter, &mut self.office)
        else {
            return;
        };
        if office.is_torn_down() {
            return;
        }
        let now = self.clock.now();

        self.controller.set_text_focus(presenter.wants_keyboard());
        if self.controller.take_pointer_moved() {
            let ndc = self.controller.pointer_ndc(&office.display());
            let icon = match office.pointer_moved(ndc) {
                Cursor::Pointer => CursorIcon::Pointer,
                Cursor::Default => CursorIcon::Default,
            };
            window.set_cursor(icon);
        }
        if self.controller.take_click() && !presenter.wants_pointer() {
            if let Some(ndc) = self.controller.pointer_ndc(&office.display()) {
                if let Some(event) = office.click(ndc) {
                    log::debug!("click: {:?}", event);
                }
            }
        }

        office.frame(now, &self.controller);

        let no_ui = self.cli.no_ui;
        let overlay = &mut self.overlay;
        let state = OverlayState {
            fps: office.telemetry().fps(),
            viewpoints: office.navigator().viewpoints().iter().map(|v| v.name.as_str()).collect(),
            current_view: office.navigator().current(),
            assistant: office.assistant(),
        };
        let presented = presenter.present(window, office.backend().as_bytes(), |ctx| {
            if no_ui {
                Vec::new()
            } else {
                overlay.show(ctx, &state)
            }
        });
        drop(state);

        match presented {
            Ok(actions) => apply_actions(office, actions, now),
            Err(e) => log::error!("present failed: {:#}", e),
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(office) = &mut self.office {
            office.teardown();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Virtual Office")
                .with_inner_size(winit::dpi::LogicalSize::new(self.cli.width, self.cli.height)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                eprintln!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.init(window) {
            eprintln!("Failed to initialize office: {:#}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        // Let egui handle the event first
        if let (Some(presenter), Some(window)) = (&mut self.presenter, &self.window) {
            if presenter.handle_event(window, &event) {
                // Pointer is over the overlay, so nothing in the scene is hovered
                if matches!(event, WindowEvent::CursorMoved { .. }) {
                    if let Some(office) = &mut self.office {
                        office.pointer_left();
                    }
                }
                return;
            }
        }
        self.controller.process_event(&event);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(office) = &mut self.office {
                    office.resize(size.width, size.height);
                    if let Some(presenter) = &mut self.presenter {
                        presenter.resize(size.width, size.height, office.backend().target());
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(frames) = cli.headless_frames {
        return run_headless(&cli, frames);
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli);
    event_loop.run_app(&mut app)?;
    Ok(())
}
