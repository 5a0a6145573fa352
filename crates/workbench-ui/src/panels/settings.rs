//! Settings panel: transport endpoint, simulated service behaviour and
//! storage backend.

use egui::{self, RichText, Vec2};
use workbench_types::config::{
    SimulatedFailure, StorageBackendType, TransportMode, WorkbenchConfig,
};
use crate::theme::*;

/// What the caller should do after rendering the settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    None,
    /// A field was edited; apply it to the running session
    Changed,
    /// The user clicked Save
    SaveClicked,
}

/// Save feedback passed in from the app layer
#[derive(Clone)]
pub struct SaveFeedback {
    pub message: String,
    pub success: bool,
}

pub fn settings_panel(
    ui: &mut egui::Ui,
    config: &mut WorkbenchConfig,
    save_feedback: Option<&SaveFeedback>,
) -> SettingsAction {
    let mut changed = false;
    let mut save_clicked = false;

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.heading(RichText::new("Settings").color(TEXT_PRIMARY));
            ui.separator();

            // ── Transport ────────────────────────────────────
            ui.label(RichText::new("Answering service").color(ACCENT).strong());
            ui.add_space(2.0);

            ui.label(RichText::new("Transport").color(TEXT_SECONDARY).small());
            egui::ComboBox::from_id_salt("transport_mode")
                .selected_text(config.transport.mode.label())
                .show_ui(ui, |ui| {
                    for mode in TransportMode::all() {
                        changed |= ui
                            .selectable_value(&mut config.transport.mode, *mode, mode.label())
                            .changed();
                    }
                });

            ui.add_space(4.0);
            match config.transport.mode {
                TransportMode::Fetch => {
                    ui.label(RichText::new("Base URL").color(TEXT_SECONDARY).small());
                    changed |= ui
                        .add(egui::TextEdit::singleline(&mut config.transport.base_url).hint_text("same origin"))
                        .changed();
                    ui.label(RichText::new("Stream path").color(TEXT_SECONDARY).small());
                    changed |= ui.text_edit_singleline(&mut config.transport.stream_path).changed();
                    ui.label(RichText::new("Knowledge list path").color(TEXT_SECONDARY).small());
                    changed |= ui.text_edit_singleline(&mut config.transport.knowledge_path).changed();
                }
                TransportMode::Simulated => {
                    changed |= simulation_section(ui, config);
                }
            }

            ui.add_space(12.0);
            ui.separator();
            ui.add_space(4.0);

            // ── Storage ──────────────────────────────────────
            ui.label(RichText::new("Storage").color(ACCENT).strong());
            ui.add_space(2.0);

            ui.label(RichText::new("Backend (applies after reload)").color(TEXT_SECONDARY).small());
            egui::ComboBox::from_id_salt("storage_backend")
                .selected_text(storage_label(config.storage.backend))
                .show_ui(ui, |ui| {
                    for backend in [StorageBackendType::Auto, StorageBackendType::Memory, StorageBackendType::IndexedDb] {
                        changed |= ui
                            .selectable_value(&mut config.storage.backend, backend, storage_label(backend))
                            .changed();
                    }
                });

            ui.add_space(16.0);
            ui.separator();
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                let btn = ui.add(
                    egui::Button::new(RichText::new("Save Settings").color(TEXT_PRIMARY).strong())
                        .fill(ACCENT)
                        .corner_radius(PANEL_ROUNDING)
                        .min_size(Vec2::new(120.0, 28.0)),
                );
                save_clicked = btn.clicked();

                if let Some(fb) = save_feedback {
                    let color = if fb.success { SUCCESS } else { ERROR };
                    ui.label(RichText::new(&fb.message).color(color).small());
                }
            });
        });

    if save_clicked {
        SettingsAction::SaveClicked
    } else if changed {
        SettingsAction::Changed
    } else {
        SettingsAction::None
    }
}

fn simulation_section(ui: &mut egui::Ui, config: &mut WorkbenchConfig) -> bool {
    let sim = &mut config.simulation;
    let mut changed = false;

    ui.label(RichText::new("First byte delay (ms)").color(TEXT_SECONDARY).small());
    changed |= ui.add(egui::Slider::new(&mut sim.initial_delay_ms, 0..=3000)).changed();
    ui.label(RichText::new("Per piece delay (ms)").color(TEXT_SECONDARY).small());
    changed |= ui.add(egui::Slider::new(&mut sim.char_delay_ms, 0..=200)).changed();

    let mut sliced = sim.chunk_bytes.is_some();
    if ui.checkbox(&mut sliced, "Send raw byte slices").changed() {
        sim.chunk_bytes = sliced.then_some(2);
        changed = true;
    }
    if let Some(size) = sim.chunk_bytes.as_mut() {
        changed |= ui.add(egui::Slider::new(size, 1..=16).text("bytes")).changed();
    }

    ui.add_space(4.0);
    ui.label(RichText::new("Failure").color(TEXT_SECONDARY).small());
    egui::ComboBox::from_id_salt("simulated_failure")
        .selected_text(sim.failure.label())
        .show_ui(ui, |ui| {
            for option in failure_presets() {
                let selected = std::mem::discriminant(&sim.failure) == std::mem::discriminant(&option);
                if ui.selectable_label(selected, option.label()).clicked() && !selected {
                    sim.failure = option;
                    changed = true;
                }
            }
        });

    changed |= match &mut sim.failure {
        SimulatedFailure::Never => false,
        SimulatedFailure::Status(status) => ui.add(egui::Slider::new(status, 400..=599).text("status")).changed(),
        SimulatedFailure::AfterChunks(n) => ui.add(egui::Slider::new(n, 0..=200).text("pieces")).changed(),
        SimulatedFailure::Random(p) => ui.add(egui::Slider::new(p, 0.0..=1.0).text("probability")).changed(),
    };

    changed
}

fn failure_presets() -> [SimulatedFailure; 4] {
    [
        SimulatedFailure::Never,
        SimulatedFailure::Status(500),
        SimulatedFailure::AfterChunks(20),
        SimulatedFailure::Random(0.3),
    ]
}

fn storage_label(backend: StorageBackendType) -> &'static str {
    match backend {
        StorageBackendType::Auto => "Auto-detect",
        StorageBackendType::Memory => "Memory",
        StorageBackendType::IndexedDb => "IndexedDB",
    }
}
