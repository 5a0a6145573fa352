//! Chat panel: conversation, error banner and question input.

use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};
use workbench_types::message::{Message, Role};

use crate::state::UiState;
use crate::theme::*;

/// What the user asked for this frame
#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    Ask(String),
    Retry,
    NewSession,
}

/// Render the chat panel. Returns the user's action, if any.
pub fn chat_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<ChatAction> {
    let mut action = None;

    egui::Frame::default()
        .fill(BG_PRIMARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    ui.heading(RichText::new("Chat").color(TEXT_PRIMARY).strong());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui.button("New chat").clicked() {
                            action = Some(ChatAction::NewSession);
                        }
                        let status_color = if state.is_busy() { WARNING } else { SUCCESS };
                        ui.label(RichText::new(&state.status_text).color(status_color).small());
                    });
                });

                ui.separator();

                let available_height = ui.available_height() - 96.0;
                ScrollArea::vertical()
                    .max_height(available_height.max(80.0))
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        let messages = state.messages();
                        if messages.is_empty() {
                            ui.label(
                                RichText::new("Ask a question about your knowledge base.")
                                    .color(TEXT_MUTED)
                                    .italics(),
                            );
                        }
                        let last = messages.len().saturating_sub(1);
                        for (i, message) in messages.iter().enumerate() {
                            let streaming = state.is_busy() && i == last && message.is_assistant();
                            render_message(ui, message, streaming);
                            ui.add_space(4.0);
                        }
                    });

                if let Some(error) = &state.chat.error_message {
                    ui.add_space(4.0);
                    egui::Frame::default()
                        .fill(ERROR_BG)
                        .corner_radius(PANEL_ROUNDING)
                        .inner_margin(8.0)
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(error).color(ERROR));
                                if ui
                                    .add_enabled(state.can_retry(), egui::Button::new("Retry"))
                                    .clicked()
                                {
                                    action = Some(ChatAction::Retry);
                                }
                            });
                        });
                }

                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    let busy = state.is_busy();
                    let input = egui::TextEdit::singleline(&mut state.input_text)
                        .hint_text(if busy { "Waiting for the answer..." } else { "Ask a question..." })
                        .desired_width(ui.available_width() - 70.0)
                        .font(egui::FontId::proportional(14.0));
                    let response = ui.add_enabled(!busy, input);

                    let send_enabled = !busy && !state.input_text.trim().is_empty();
                    let send_btn = ui.add_enabled(
                        send_enabled,
                        egui::Button::new(RichText::new("Send").color(TEXT_PRIMARY))
                            .fill(if send_enabled { ACCENT } else { BG_SURFACE })
                            .corner_radius(PANEL_ROUNDING)
                            .min_size(Vec2::new(60.0, 0.0)),
                    );

                    let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if send_enabled && (enter || send_btn.clicked()) {
                        if let Some(question) = state.take_input() {
                            action = Some(ChatAction::Ask(question));
                            response.request_focus();
                        }
                    }
                });
            });
        });

    action
}

fn render_message(ui: &mut egui::Ui, message: &Message, streaming: bool) {
    let (label, label_color, bg) = match message.role {
        Role::User => ("You", ACCENT, BG_USER),
        Role::Assistant => ("Assistant", SUCCESS, BG_SECONDARY),
    };

    egui::Frame::default()
        .fill(bg)
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.label(RichText::new(label).color(label_color).strong().small());
            if streaming && message.content.is_empty() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(RichText::new("Thinking...").color(TEXT_SECONDARY));
                });
            } else {
                ui.label(RichText::new(&message.content).color(TEXT_PRIMARY));
                if streaming {
                    ui.label(RichText::new("▌").color(ACCENT).strong());
                }
            }
        });
}
