//! egui HUD: frame rate, viewpoint buttons and the assistant chat panel.

use egui::{Color32, RichText};

use crate::voice::{Assistant, Speaker};

/// Something the user asked for through the overlay this frame
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayAction {
    SwitchView(String),
    SendChat(String),
    TogglePanel,
    ClosePanel,
    ToggleVoice,
    StopSpeaking,
    ClearChat,
}

/// Read-only view of the state the overlay draws
pub struct OverlayState<'a> {
    pub fps: f32,
    pub viewpoints: Vec<&'a str>,
    pub current_view: Option<&'a str>,
    pub assistant: &'a Assistant,
}

#[derive(Default)]
pub struct Overlay {
    draft: String,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn show(&mut self, ctx: &egui::Context, state: &OverlayState<'_>) -> Vec<OverlayAction> {
        let mut actions = Vec::new();

        egui::Window::new("FPS")
            .title_bar(false)
            .resizable(false)
            .fixed_pos(egui::pos2(10.0, 10.0))
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                ui.label(
                    RichText::new(format!("{:.0}", state.fps))
                        .size(48.0)
                        .color(Color32::from_rgb(74, 158, 255)),
                );
                ui.label(RichText::new("FPS").size(12.0).color(Color32::GRAY));
            });

        egui::TopBottomPanel::bottom("views").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for name in &state.viewpoints {
                    let selected = state.current_view == Some(*name);
                    if ui.selectable_label(selected, name.to_uppercase()).clicked() {
                        actions.push(OverlayAction::SwitchView(name.to_string()));
                    }
                }
                ui.separator();
                let label = if state.assistant.is_panel_open() { "Hide ARIA" } else { "Ask ARIA" };
                if ui.button(label).clicked() {
                    actions.push(OverlayAction::TogglePanel);
                }
            });
        });

        if state.assistant.is_panel_open() {
            self.chat_panel(ctx, state.assistant, &mut actions);
        }

        actions
    }

    fn chat_panel(&mut self, ctx: &egui::Context, assistant: &Assistant, actions: &mut Vec<OverlayAction>) {
        egui::SidePanel::right("assistant").min_width(320.0).show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("ARIA");
                let status = if assistant.is_listening() { "listening" } else { "idle" };
                ui.label(RichText::new(status).color(Color32::from_rgb(0, 255, 136)));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("✕").clicked() {
                        actions.push(OverlayAction::ClosePanel);
                    }
                    if ui.button("Clear").clicked() {
                        actions.push(OverlayAction::ClearChat);
                    }
                });
            });
            ui.separator();

            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .max_height(ui.available_height() - 64.0)
                .show(ui, |ui| {
                    for message in assistant.messages() {
                        let (who, color) = match message.speaker {
                            Speaker::User => ("You", Color32::from_rgb(74, 158, 255)),
                            Speaker::Assistant => ("ARIA", Color32::from_rgb(0, 255, 255)),
                        };
                        ui.label(RichText::new(format!("{} · {}", who, message.timestamp)).small().color(color));
                        ui.label(&message.text);
                        ui.add_space(6.0);
                    }
                });

            ui.separator();
            ui.horizontal(|ui| {
                let input = ui.text_edit_singleline(&mut self.draft);
                let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Send").clicked() || submitted {
                    if let Some(text) = self.take_draft() {
                        actions.push(OverlayAction::SendChat(text));
                    }
                }
                let mic = if assistant.is_voice_input_active() { "Stop mic" } else { "Mic" };
                if ui.button(mic).clicked() {
                    actions.push(OverlayAction::ToggleVoice);
                }
                if ui.button("Mute").clicked() {
                    actions.push(OverlayAction::StopSpeaking);
                }
            });
        });
    }

    /// Trimmed draft text, clearing the field; None when blank
    pub fn take_draft(&mut self) -> Option<String> {
        let text = self.draft.trim().to_string();
        self.draft.clear();
        (!text.is_empty()).then_some(text)
    }

    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_draft_is_not_sent() {
        let mut overlay = Overlay::new();
        overlay.set_draft("   ");
        assert_eq!(overlay.take_draft(), None);
        assert_eq!(overlay.draft(), "", "blank draft should still be cleared");
    }

    #[test]
    fn test_draft_is_trimmed_and_cleared() {
        let mut overlay = Overlay::new();
        overlay.set_draft("  show portfolio ");
        assert_eq!(overlay.take_draft().as_deref(), Some("show portfolio"));
        assert!(overlay.draft().is_empty());
    }
}
