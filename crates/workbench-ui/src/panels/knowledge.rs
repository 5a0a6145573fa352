//! Knowledge panel: pick references for the next question, add and
//! remove items.

use egui::{self, RichText, ScrollArea};
use workbench_types::knowledge::KnowledgeStatus;

use crate::state::UiState;
use crate::theme::*;

#[derive(Debug, Clone, PartialEq)]
pub enum KnowledgeAction {
    /// Add a text item with this title
    Add(String),
    Remove(String),
    /// Reload the list from the knowledge service
    Refresh,
}

/// Render the knowledge panel. Selection changes are applied to `state`
/// directly; store mutations come back as an action.
pub fn knowledge_panel(ui: &mut egui::Ui, state: &mut UiState, can_refresh: bool) -> Option<KnowledgeAction> {
    let mut action = None;
    let mut toggled: Option<String> = None;

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.heading(RichText::new("Knowledge").color(TEXT_PRIMARY));
                if can_refresh && ui.small_button("Reload").on_hover_text("Fetch the list from the server").clicked() {
                    action = Some(KnowledgeAction::Refresh);
                }
            });
            ui.label(
                RichText::new(format!("{} selected", state.selected.len()))
                    .color(TEXT_SECONDARY)
                    .small(),
            );
            ui.separator();

            ui.horizontal(|ui| {
                let edit = egui::TextEdit::singleline(&mut state.new_knowledge_title)
                    .hint_text("New item title")
                    .desired_width(ui.available_width() - 50.0);
                let response = ui.add(edit);
                let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let can_add = !state.new_knowledge_title.trim().is_empty();
                if (ui.add_enabled(can_add, egui::Button::new("Add")).clicked() || enter) && can_add {
                    action = Some(KnowledgeAction::Add(state.new_knowledge_title.trim().to_string()));
                    state.new_knowledge_title.clear();
                }
            });

            ui.add_space(4.0);

            ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                if state.knowledge.is_empty() {
                    ui.label(RichText::new("No knowledge yet").color(TEXT_MUTED).italics());
                }
                for item in &state.knowledge {
                    ui.horizontal(|ui| {
                        match item.status {
                            KnowledgeStatus::Ready => {
                                let mut checked = state.selected.contains(&item.id);
                                if ui.checkbox(&mut checked, item.title.as_str()).changed() {
                                    toggled = Some(item.id.clone());
                                }
                            }
                            KnowledgeStatus::Processing => {
                                ui.add_enabled(false, egui::Checkbox::new(&mut false, item.title.as_str()));
                                ui.spinner();
                            }
                        }
                        ui.label(RichText::new(item.status.label()).color(status_color(item.status)).small());
                        if ui.small_button("✕").on_hover_text("Remove").clicked() {
                            action = Some(KnowledgeAction::Remove(item.id.clone()));
                        }
                    });
                }
            });
        });

    if let Some(id) = toggled {
        state.toggle_selected(&id);
    }
    action
}

fn status_color(status: KnowledgeStatus) -> egui::Color32 {
    match status {
        KnowledgeStatus::Ready => SUCCESS,
        KnowledgeStatus::Processing => WARNING,
    }
}
