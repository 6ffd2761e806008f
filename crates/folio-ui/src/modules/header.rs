// crates/folio-ui/src/modules/header.rs
//
// Top bar: hero name and tagline, contact links, asset warnings, theme toggle.

use egui::{Align, Layout, RichText, Ui};

use folio_core::commands::FolioCommand;

use super::FolioModule;
use crate::context::AppContext;
use crate::theme::{ACCENT, WARN};

pub struct HeaderModule;

impl FolioModule for HeaderModule {
    fn name(&self) -> &str { "header" }

    fn ui(&mut self, ui: &mut Ui, app: &AppContext, cmd: &mut Vec<FolioCommand>) {
        let hero = &app.config.hero;
        ui.horizontal_centered(|ui| {
            let title = if hero.name.is_empty() { "Folio" } else { hero.name.as_str() };
            ui.label(RichText::new(format!("◆ {title}")).strong().size(16.0).color(ACCENT));
            if !hero.tagline.is_empty() {
                ui.label(RichText::new(&hero.tagline).size(12.0).italics().weak());
            }
            ui.separator();
            ui.label(RichText::new(format!("{} projects", app.config.projects.len())).size(12.0).weak());

            let missing = app.preload.failed_urls.len();
            if app.preload_done && missing > 0 {
                ui.separator();
                ui.label(RichText::new(format!("{missing} asset(s) unavailable")).size(11.0).color(WARN))
                    .on_hover_text(app.preload.failed_urls.join("\n"));
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let icon = if app.theme.is_dark() { "☀" } else { "🌙" };
                if ui.button(icon).on_hover_text(format!("Theme: {}", app.theme.label())).clicked() {
                    cmd.push(FolioCommand::ToggleTheme);
                }
                // Right-to-left: reversed so links read in config order.
                for link in hero.contacts.iter().rev() {
                    ui.hyperlink_to(RichText::new(&link.label).size(12.0), &link.url);
                }
            });
        });
    }
}
