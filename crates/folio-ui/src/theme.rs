// src/theme.rs
use egui::{Color32, Context, Stroke, Style, Visuals};

use folio_core::viewport::Theme;

// ── Palette ──────────────────────────────────────────────────────────────────
pub const ACCENT:        Color32 = Color32::from_rgb( 94, 162, 255);
pub const ACCENT_DIM:    Color32 = Color32::from_rgb( 52, 102, 180);
pub const WARN:          Color32 = Color32::from_rgb(230, 120,  80);

pub const DARK_BG_0:     Color32 = Color32::from_rgb( 12,  13,  16);
pub const DARK_BG_1:     Color32 = Color32::from_rgb( 18,  19,  24);
pub const DARK_BG_2:     Color32 = Color32::from_rgb( 26,  28,  34);
pub const DARK_BG_3:     Color32 = Color32::from_rgb( 36,  38,  46);
pub const DARK_TEXT:     Color32 = Color32::from_rgb(222, 224, 232);
pub const DARK_BORDER:   Color32 = Color32::from_rgb( 52,  55,  66);

pub const LIGHT_BG_0:    Color32 = Color32::from_rgb(250, 250, 252);
pub const LIGHT_BG_1:    Color32 = Color32::from_rgb(242, 243, 247);
pub const LIGHT_BG_2:    Color32 = Color32::from_rgb(230, 232, 238);
pub const LIGHT_BG_3:    Color32 = Color32::from_rgb(214, 217, 226);
pub const LIGHT_TEXT:    Color32 = Color32::from_rgb( 28,  30,  36);
pub const LIGHT_BORDER:  Color32 = Color32::from_rgb(196, 200, 210);

/// Fill of a project row: highlighted while it is the decoration target.
pub fn row_fill(theme: Theme, targeted: bool, active: bool) -> Color32 {
    match (targeted, active, theme.is_dark()) {
        (true, true, _)      => ACCENT_DIM,
        (true, false, true)  => DARK_BG_3,
        (true, false, false) => LIGHT_BG_3,
        (false, _, true)     => DARK_BG_2,
        (false, _, false)    => LIGHT_BG_2,
    }
}

pub fn pane_fill(theme: Theme) -> Color32 {
    if theme.is_dark() { DARK_BG_0 } else { LIGHT_BG_0 }
}

pub fn configure_style(ctx: &Context, theme: Theme) {
    let mut style = Style::default();

    style.spacing.item_spacing     = egui::vec2(8.0, 6.0);
    style.spacing.window_margin    = egui::Margin::same(12);
    style.spacing.button_padding   = egui::vec2(10.0, 5.0);
    style.spacing.scroll.bar_width = 8.0;

    let cr = egui::CornerRadius::same(6);

    let (mut v, bg1, bg2, bg3, text, border) = if theme.is_dark() {
        (Visuals::dark(), DARK_BG_1, DARK_BG_2, DARK_BG_3, DARK_TEXT, DARK_BORDER)
    } else {
        (Visuals::light(), LIGHT_BG_1, LIGHT_BG_2, LIGHT_BG_3, LIGHT_TEXT, LIGHT_BORDER)
    };

    v.panel_fill        = bg1;
    v.window_fill       = bg2;
    v.window_stroke     = Stroke::new(1.0, border);
    v.selection.bg_fill = ACCENT;
    v.hyperlink_color   = ACCENT;

    v.widgets.inactive.bg_fill        = bg2;
    v.widgets.inactive.bg_stroke      = Stroke::new(1.0, border);
    v.widgets.inactive.corner_radius  = cr;
    v.widgets.hovered.bg_fill         = bg3;
    v.widgets.hovered.bg_stroke       = Stroke::new(1.0, ACCENT_DIM);
    v.widgets.hovered.corner_radius   = cr;
    v.widgets.active.bg_fill          = ACCENT_DIM;
    v.widgets.active.bg_stroke        = Stroke::new(1.0, ACCENT);
    v.widgets.active.corner_radius    = cr;

    v.override_text_color  = Some(text);
    v.window_corner_radius = cr;

    // Pin the preference first: style and visuals apply to the current theme,
    // and the OS theme must not swap them out afterwards.
    ctx.options_mut(|o| {
        o.theme_preference = if theme.is_dark() {
            egui::ThemePreference::Dark
        } else {
            egui::ThemePreference::Light
        };
    });
    ctx.set_style(style);
    ctx.set_visuals(v);
}
