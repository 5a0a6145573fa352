//! UI theme constants

use egui::{Color32, CornerRadius, Stroke, Vec2};

pub const BG_PRIMARY: Color32 = Color32::from_rgb(22, 24, 29);
pub const BG_SECONDARY: Color32 = Color32::from_rgb(34, 37, 44);
pub const BG_SURFACE: Color32 = Color32::from_rgb(48, 52, 61);
pub const BG_USER: Color32 = Color32::from_rgb(38, 48, 74);
pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 232, 236);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(150, 156, 168);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(100, 105, 115);
pub const ACCENT: Color32 = Color32::from_rgb(64, 140, 255);
pub const SUCCESS: Color32 = Color32::from_rgb(46, 190, 110);
pub const ERROR: Color32 = Color32::from_rgb(235, 80, 80);
pub const ERROR_BG: Color32 = Color32::from_rgb(58, 26, 28);
pub const WARNING: Color32 = Color32::from_rgb(230, 170, 40);

pub const PANEL_ROUNDING: CornerRadius = CornerRadius::same(6);
pub const PANEL_PADDING: Vec2 = Vec2::new(12.0, 8.0);

/// Apply the dark theme to an egui context
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.visuals.dark_mode = true;
    style.visuals.panel_fill = BG_PRIMARY;
    style.visuals.window_fill = BG_SECONDARY;
    style.visuals.extreme_bg_color = BG_SECONDARY;

    let widgets = &mut style.visuals.widgets;
    widgets.inactive.bg_fill = BG_SURFACE;
    widgets.inactive.weak_bg_fill = BG_SURFACE;
    widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    widgets.hovered.bg_fill = BG_SURFACE;
    widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    widgets.active.bg_fill = ACCENT;
    widgets.active.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);

    style.visuals.selection.bg_fill = ACCENT.linear_multiply(0.4);
    style.visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    style.spacing.item_spacing = Vec2::new(8.0, 6.0);

    ctx.set_style(style);
}
