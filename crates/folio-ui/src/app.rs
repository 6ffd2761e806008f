// src/app.rs (folio-ui)
use std::time::{Duration, Instant};

use eframe::egui;
use log::debug;
use serde::{Deserialize, Serialize};

use folio_core::commands::FolioCommand;
use folio_core::viewport::{InputMode, Theme};
use folio_core::FolioConfig;

use crate::context::AppContext;
use crate::helpers::assets::still_url;
use crate::helpers::input::interactions;
use crate::modules::{
    FolioModule,
    header::HeaderModule,
    music_bar::MusicBarModule,
    showcase::ShowcaseModule,
    splash::SplashModule,
};
use crate::theme::configure_style;

/// Element events arrive from background threads, so the UI polls at least
/// this often even when no controller deadline is pending.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Serialize, Deserialize)]
struct AppStorage {
    theme: Theme,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct FolioApp {
    context:      AppContext,
    header:       HeaderModule,
    splash:       SplashModule,
    showcase:     ShowcaseModule,
    music_bar:    MusicBarModule,
    last_width:   f32,
    /// Commands emitted by modules each frame, processed after the UI pass
    pending_cmds: Vec<FolioCommand>,
}

impl FolioApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: FolioConfig) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let theme = cc.storage
            .and_then(|s| eframe::get_value::<AppStorage>(s, eframe::APP_KEY))
            .map(|d| d.theme)
            .unwrap_or_default();
        configure_style(&cc.egui_ctx, theme);

        let width   = cc.egui_ctx.screen_rect().width();
        let context = AppContext::new(config, theme, width, Instant::now());

        Self {
            context,
            header:       HeaderModule,
            splash:       SplashModule,
            showcase:     ShowcaseModule::default(),
            music_bar:    MusicBarModule,
            last_width:   width,
            pending_cmds: Vec::new(),
        }
    }

    fn process_command(&mut self, cmd: FolioCommand, ctx: &egui::Context, now: Instant) {
        let app = &mut self.context;
        match cmd {
            // ── Project showcase ─────────────────────────────────────────────
            FolioCommand::HoverProject(i)                   => app.showcase.hover_enter(i, now),
            FolioCommand::LeaveProject { index, into_modal } => app.showcase.hover_leave(index, into_modal, now),
            FolioCommand::TapProject(i)                     => app.showcase.tap(i, now),
            FolioCommand::ModalEnter                        => app.showcase.modal_enter(),
            FolioCommand::ModalLeave                        => app.showcase.modal_leave(now),
            FolioCommand::ClosePreview(reason)              => app.showcase.close(reason, now),
            FolioCommand::TogglePreviewPlayback             => app.showcase.toggle_playback(),
            FolioCommand::ReloadPreview                     => app.showcase.reload(now),
            FolioCommand::PreviewLaidOut { pane, viewport } => app.showcase.observe_rects(pane, viewport, now),

            // ── Music ────────────────────────────────────────────────────────
            FolioCommand::ToggleMusic => app.music.toggle(now),
            FolioCommand::NextTrack   => app.music.next_track(now),

            // ── View ─────────────────────────────────────────────────────────
            FolioCommand::ToggleTheme => {
                app.theme = app.theme.toggle();
                configure_style(ctx, app.theme);
            }
            FolioCommand::SetViewportWidth(width) => {
                let mode = InputMode::from_width(width, app.config.selection.mobile_breakpoint_px);
                if mode != app.mode {
                    debug!("[app] {width:.0}px wide, switching to {mode:?}");
                    app.mode = mode;
                    app.showcase.set_mode(mode);
                }
            }

            // ── Document-level input ─────────────────────────────────────────
            FolioCommand::Interaction(kind) => {
                app.bus.dispatch(kind);
            }
        }
    }

    /// Input that is not aimed at a specific widget: gestures for the
    /// interaction bus and the viewport width.
    fn collect_document_input(&mut self, ctx: &egui::Context) {
        let kinds = ctx.input(interactions);
        self.pending_cmds.extend(kinds.into_iter().map(FolioCommand::Interaction));

        let width = ctx.screen_rect().width();
        if width != self.last_width {
            self.last_width = width;
            self.pending_cmds.push(FolioCommand::SetViewportWidth(width));
        }
    }

    fn request_assets(&mut self) {
        let still = self.context.showcase.preview().source()
            .and_then(|s| still_url(s, self.context.showcase.preview().phase()))
            .map(str::to_string);
        if let Some(url) = still {
            self.context.want_image(&url);
        }
        self.context.prefetch_next_track();
    }
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for FolioApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &AppStorage { theme: self.context.theme });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.context.shutdown();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.collect_document_input(ctx);
        self.context.ingest_worker_updates(now);
        self.context.register_images(ctx);

        if !self.context.splash.is_done() {
            egui::CentralPanel::default().show(ctx, |ui| {
                self.splash.ui(ui, &self.context, &mut self.pending_cmds);
            });
        } else {
            egui::TopBottomPanel::top(egui::Id::new(self.header.name()))
                .exact_height(40.0)
                .show(ctx, |ui| {
                    self.header.ui(ui, &self.context, &mut self.pending_cmds);
                });

            egui::TopBottomPanel::bottom(egui::Id::new(self.music_bar.name()))
                .exact_height(40.0)
                .show(ctx, |ui| {
                    self.music_bar.ui(ui, &self.context, &mut self.pending_cmds);
                });

            egui::CentralPanel::default().show(ctx, |ui| {
                self.showcase.ui(ui, &self.context, &mut self.pending_cmds);
            });
        }

        // ── Process commands emitted this frame ───────────────────────────────
        let cmds: Vec<FolioCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd, ctx, now);
        }

        self.context.pump(now);
        self.request_assets();

        let wait = self.context.next_deadline()
            .map(|at| at.saturating_duration_since(now))
            .map_or(POLL_INTERVAL, |d| d.min(POLL_INTERVAL));
        ctx.request_repaint_after(wait);
    }
}
