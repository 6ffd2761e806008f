// crates/folio-ui/src/modules/showcase.rs
//
// Project list plus the preview pane.
//
// Desktop: hovering a row opens it, leaving closes it after the selection
// debounce unless the pointer went into the pane. Mobile: tapping a row opens
// the preview in a window with an explicit close button.
//
// The preview pane reports its layout rect every frame a project is selected,
// so a lazy preview only starts loading once the pane is actually on screen.
//
// egui has no enter/leave events, so the module keeps last frame's hover
// target and pane-hover flag and emits the transitions itself. Leaving a row
// is always emitted before entering the next one, and before ModalEnter.

use egui::{Align2, Frame, Margin, RichText, Sense, Ui};

use folio_core::commands::FolioCommand;
use folio_core::media::Phase;
use folio_core::media_types::Project;
use folio_core::selection::CloseReason;

use super::FolioModule;
use crate::context::AppContext;
use crate::helpers::assets::still_url;
use crate::helpers::format::clock_label;
use crate::helpers::input::{closes_preview, layout_rect};
use crate::theme::{pane_fill, row_fill, WARN};

#[derive(Default)]
pub struct ShowcaseModule {
    hovered:   Option<usize>,
    over_pane: bool,
}

impl FolioModule for ShowcaseModule {
    fn name(&self) -> &str { "showcase" }

    fn ui(&mut self, ui: &mut Ui, app: &AppContext, cmd: &mut Vec<FolioCommand>) {
        if app.config.projects.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No projects configured").weak());
            });
            return;
        }

        if app.showcase.selected_index().is_some()
            && ui.input(|i| i.key_pressed(egui::Key::Escape))
        {
            cmd.push(FolioCommand::ClosePreview(CloseReason::Escape));
        }

        if app.mode.is_mobile() {
            self.mobile_ui(ui, app, cmd);
        } else {
            self.desktop_ui(ui, app, cmd);
        }
    }
}

impl ShowcaseModule {
    fn desktop_ui(&mut self, ui: &mut Ui, app: &AppContext, cmd: &mut Vec<FolioCommand>) {
        let mut hovered_now   = None;
        let mut over_pane_now = false;

        ui.columns(2, |cols| {
            egui::ScrollArea::vertical().id_salt("project_list").show(&mut cols[0], |ui| {
                for (i, project) in app.config.projects.iter().enumerate() {
                    if project_row(ui, app, i, project).hovered() {
                        hovered_now = Some(i);
                    }
                }
            });

            let pane = Frame::new()
                .fill(pane_fill(app.theme))
                .inner_margin(Margin::same(12))
                .corner_radius(6)
                .show(&mut cols[1], |ui| {
                    ui.set_min_size(ui.available_size());
                    preview_body(ui, app, cmd);
                });
            over_pane_now = cols[1].rect_contains_pointer(pane.response.rect);
            if app.showcase.selected_index().is_some() {
                cmd.push(FolioCommand::PreviewLaidOut {
                    pane:     layout_rect(pane.response.rect),
                    viewport: layout_rect(cols[1].clip_rect()),
                });
            }
        });

        // ── Hover transitions ────────────────────────────────────────────────
        if hovered_now != self.hovered {
            if let Some(index) = self.hovered {
                cmd.push(FolioCommand::LeaveProject { index, into_modal: over_pane_now });
            }
            if let Some(index) = hovered_now {
                cmd.push(FolioCommand::HoverProject(index));
            }
            self.hovered = hovered_now;
        }
        if over_pane_now != self.over_pane {
            cmd.push(if over_pane_now { FolioCommand::ModalEnter } else { FolioCommand::ModalLeave });
            self.over_pane = over_pane_now;
        }

        let clicked_elsewhere = hovered_now.is_none()
            && !over_pane_now
            && ui.input(|i| i.pointer.primary_clicked());
        if clicked_elsewhere && app.showcase.decoration().is_active {
            cmd.push(FolioCommand::ClosePreview(CloseReason::OutsideClick));
        }
    }

    fn mobile_ui(&mut self, ui: &mut Ui, app: &AppContext, cmd: &mut Vec<FolioCommand>) {
        // Desktop hover state is meaningless after a layout switch.
        self.hovered   = None;
        self.over_pane = false;

        let mut row_tapped = false;
        egui::ScrollArea::vertical().id_salt("project_list").show(ui, |ui| {
            for (i, project) in app.config.projects.iter().enumerate() {
                if project_row(ui, app, i, project).clicked() {
                    cmd.push(FolioCommand::TapProject(i));
                    row_tapped = true;
                }
            }
        });

        let Some(index) = app.showcase.selected_index() else { return };
        let title = app.config.projects.get(index).map(|p| p.name.as_str()).unwrap_or("Preview");

        let window = egui::Window::new(title)
            .id(egui::Id::new("preview_window"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ui.ctx(), |ui| {
                ui.set_max_width(ui.ctx().screen_rect().width() - 32.0);
                if ui.button("✕ Close").clicked() {
                    cmd.push(FolioCommand::ClosePreview(CloseReason::Button));
                }
                ui.separator();
                preview_body(ui, app, cmd);
            });

        if let Some(window) = window {
            let rect = window.response.rect;
            cmd.push(FolioCommand::PreviewLaidOut {
                pane:     layout_rect(rect),
                viewport: layout_rect(ui.ctx().screen_rect()),
            });

            let press = ui.input(|i| {
                if i.pointer.primary_clicked() { i.pointer.interact_pos() } else { None }
            });
            if closes_preview(press, rect, row_tapped) {
                cmd.push(FolioCommand::ClosePreview(CloseReason::OutsideClick));
            }
        }
    }
}

fn project_row(ui: &mut Ui, app: &AppContext, index: usize, project: &Project) -> egui::Response {
    let deco     = app.showcase.decoration();
    let targeted = deco.target == Some(index);

    let frame = Frame::new()
        .fill(row_fill(app.theme, targeted, deco.is_active))
        .inner_margin(Margin::symmetric(12, 10))
        .corner_radius(6)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(&project.name).size(15.0).strong());
                ui.label(RichText::new(project.year.to_string()).size(11.0).weak());
            });
            if !project.tech_stack.is_empty() {
                ui.horizontal_wrapped(|ui| {
                    for tech in &project.tech_stack {
                        if let Some(uri) = app.image_uri(&tech.logo) {
                            ui.add(egui::Image::from_uri(uri).max_height(14.0));
                        }
                        ui.label(RichText::new(&tech.name).size(10.0).weak());
                    }
                });
            }
        });
    ui.add_space(4.0);
    ui.interact(frame.response.rect, ui.id().with(("project_row", index)), Sense::click())
}

fn preview_body(ui: &mut Ui, app: &AppContext, cmd: &mut Vec<FolioCommand>) {
    let Some(index) = app.showcase.selected_index() else {
        ui.centered_and_justified(|ui| {
            ui.label(RichText::new("Hover a project to preview it").weak());
        });
        return;
    };
    let preview = app.showcase.preview();
    let state   = preview.state();

    if let Some(project) = app.config.projects.get(index) {
        ui.label(RichText::new(&project.name).size(18.0).strong());
        for tech in project.tech_stack.iter().filter(|t| !t.url.is_empty()) {
            ui.hyperlink_to(tech.name.as_str(), &tech.url);
        }
        ui.add_space(6.0);
    }

    let Some(source) = preview.source().filter(|_| preview.should_render()) else {
        ui.label(RichText::new("No preview for this project").weak());
        return;
    };

    if let Some(uri) = still_url(source, state.phase).and_then(|u| app.image_uri(u)) {
        ui.add(egui::Image::from_uri(uri).max_width(ui.available_width()).corner_radius(4));
    }

    ui.horizontal(|ui| match state.phase {
        Phase::Idle | Phase::Loading => {
            ui.spinner();
            ui.label(RichText::new("loading preview…").size(11.0).weak());
        }
        Phase::Error => {
            ui.label(RichText::new("failed to load").color(WARN));
            if ui.button("Retry").clicked() {
                cmd.push(FolioCommand::ReloadPreview);
            }
        }
        Phase::Ready | Phase::Paused if state.autoplay_blocked => {
            if ui.button("▶ Play preview").clicked() {
                cmd.push(FolioCommand::TogglePreviewPlayback);
            }
        }
        Phase::Playing => {
            if ui.button("⏸").clicked() {
                cmd.push(FolioCommand::TogglePreviewPlayback);
            }
            let position = preview.element().position();
            ui.label(RichText::new(clock_label(position, 0.0)).size(11.0).monospace());
        }
        Phase::Ready | Phase::Paused => {
            if ui.button("▶").clicked() {
                cmd.push(FolioCommand::TogglePreviewPlayback);
            }
        }
    });
}
