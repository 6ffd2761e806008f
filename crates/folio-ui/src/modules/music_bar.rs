// crates/folio-ui/src/modules/music_bar.rs
use egui::{Align, Layout, ProgressBar, RichText, Ui};

use folio_core::commands::FolioCommand;
use folio_core::media::Phase;

use super::FolioModule;
use crate::context::AppContext;
use crate::helpers::format::{clock_label, music_prompt};
use crate::theme::WARN;

pub struct MusicBarModule;

impl FolioModule for MusicBarModule {
    fn name(&self) -> &str { "music_bar" }

    fn ui(&mut self, ui: &mut Ui, app: &AppContext, cmd: &mut Vec<FolioCommand>) {
        let music = &app.music;
        let Some(track) = music.current_track() else {
            ui.label(RichText::new("No music configured").size(11.0).weak());
            return;
        };
        let state = music.player().state();

        ui.horizontal_centered(|ui| {
            let icon = if music.is_playing() { "⏸" } else { "▶" };
            let toggle = ui.add_enabled(state.phase != Phase::Loading, egui::Button::new(icon));
            if toggle.clicked() {
                cmd.push(FolioCommand::ToggleMusic);
            }
            if ui.button("⏭").on_hover_text("Next track").clicked() {
                cmd.push(FolioCommand::NextTrack);
            }
            ui.label(RichText::new(&track.name).size(12.0));

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                match state.phase {
                    Phase::Loading | Phase::Idle => {
                        ui.spinner();
                    }
                    Phase::Error => {
                        ui.label(RichText::new("track unavailable").size(11.0).color(WARN));
                    }
                    _ => {
                        if let Some((position, duration)) = music.player().progress() {
                            ui.label(RichText::new(clock_label(position, duration)).size(11.0).monospace());
                        }
                        if let Some(fraction) = music.progress() {
                            ui.add(ProgressBar::new(fraction).desired_width(160.0));
                        }
                    }
                }
                if let Some(prompt) = music_prompt(state, music.player().awaiting_gesture()) {
                    ui.label(RichText::new(prompt).size(11.0).weak());
                }
            });
        });
    }
}
