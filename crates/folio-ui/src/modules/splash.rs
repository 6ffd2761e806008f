// crates/folio-ui/src/modules/splash.rs
//
// Full-window loading screen. Shown until SplashGate reports done; fades out
// over the gate's fade window once the bar has reached 100 %.

use std::time::Instant;

use egui::{ProgressBar, RichText, Ui};

use folio_core::commands::FolioCommand;

use super::FolioModule;
use crate::context::AppContext;
use crate::helpers::format::preload_label;
use crate::theme::ACCENT;

pub struct SplashModule;

impl FolioModule for SplashModule {
    fn name(&self) -> &str { "splash" }

    fn ui(&mut self, ui: &mut Ui, app: &AppContext, _cmd: &mut Vec<FolioCommand>) {
        ui.multiply_opacity(app.splash.opacity(Instant::now()));

        // Hold the bar below 100 % until completion is actually reported.
        let (fraction, caption) = if app.preload_done {
            (1.0, "Ready".to_string())
        } else {
            (app.preload.fraction().min(0.99), preload_label(&app.preload))
        };

        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.38);
            ui.label(RichText::new("◆ Folio").size(32.0).strong().color(ACCENT));
            ui.add_space(16.0);
            ui.add(ProgressBar::new(fraction).desired_width(280.0));
            ui.add_space(6.0);
            ui.label(RichText::new(caption).size(12.0).weak());
        });
    }
}
