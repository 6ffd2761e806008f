// crates/folio-ui/src/context.rs
//
// AppContext owns every runtime handle of the showcase. FolioApp holds one of
// these plus the panel modules and the pending command queue — nothing else.
//
//   AppContext
//     ├── config    — the loaded FolioConfig (read-only after startup)
//     ├── bus       — document-level InteractionBus shared by all controllers
//     ├── worker    — preload thread + background prefetches + shared image cache
//     ├── showcase  — project selection + the single preview player
//     ├── music     — background playlist on the rodio AudioElement
//     └── splash    — gate between preload completion and the showcase

use std::collections::HashSet;
use std::time::Instant;

use eframe::egui;
use log::{info, warn};

use folio_core::interaction::InteractionBus;
use folio_core::music::MusicPlayer;
use folio_core::preload::PreloadProgress;
use folio_core::showcase::ShowcasePreview;
use folio_core::splash::SplashGate;
use folio_core::viewport::{InputMode, Theme};
use folio_core::FolioConfig;
use folio_media::{AssetFetcher, AudioElement, FetchElement, MediaWorker, PreloadUpdate};

use crate::helpers::assets::startup_assets;

pub struct AppContext {
    pub config:   FolioConfig,
    pub bus:      InteractionBus,
    pub worker:   MediaWorker,
    pub showcase: ShowcasePreview<FetchElement>,
    pub music:    MusicPlayer<AudioElement>,
    pub splash:   SplashGate,
    /// Latest preload report; `total_count` is known from the start.
    pub preload:  PreloadProgress,
    pub preload_done: bool,
    pub theme:    Theme,
    pub mode:     InputMode,

    /// URLs whose bytes egui already knows as `bytes://<url>`.
    images:       HashSet<String>,
    /// URLs handed to a background prefetch, so each is requested once.
    requested:    HashSet<String>,
    prefetched_track: Option<usize>,
}

impl AppContext {
    pub fn new(config: FolioConfig, theme: Theme, width: f32, now: Instant) -> Self {
        let fetcher = AssetFetcher::new(config.asset_root.clone());
        let worker  = MediaWorker::new(fetcher.clone());
        let bus     = InteractionBus::new();
        let mode    = InputMode::from_width(width, config.selection.mobile_breakpoint_px);

        let assets = startup_assets(&config);
        let preload = PreloadProgress { total_count: assets.len(), ..Default::default() };
        info!("[app] preloading {} asset(s)", assets.len());
        worker.start_preload(assets, &config.preload);

        let showcase = ShowcasePreview::new(
            config.project_sources(),
            FetchElement::new(fetcher.clone()),
            &config,
            mode,
            bus.clone(),
        );
        let music = MusicPlayer::new(
            config.music.tracks.clone(),
            AudioElement::new(fetcher, config.music.volume),
            &config,
            bus.clone(),
            now,
        );

        Self {
            splash: SplashGate::new(&config.splash, now),
            config,
            bus,
            worker,
            showcase,
            music,
            preload,
            preload_done: false,
            theme,
            mode,
            images:    HashSet::new(),
            requested: HashSet::new(),
            prefetched_track: None,
        }
    }

    /// egui URI for an image already in the byte cache.
    pub fn image_uri(&self, url: &str) -> Option<String> {
        self.images.contains(url).then(|| format!("bytes://{url}"))
    }

    // ── Per-frame housekeeping ───────────────────────────────────────────────

    /// Drain everything the preload thread sent since the last frame.
    pub fn ingest_worker_updates(&mut self, now: Instant) {
        for update in self.worker.rx.try_iter() {
            match update {
                PreloadUpdate::Progress(p) => self.preload = p,
                PreloadUpdate::Complete(p) => {
                    if !p.failed_urls.is_empty() {
                        warn!("[preload] finished without {} asset(s): {:?}", p.failed_urls.len(), p.failed_urls);
                    }
                    self.preload      = p;
                    self.preload_done = true;
                    self.splash.preload_complete(now);
                }
            }
        }
    }

    /// Hand newly cached images to egui's loaders. Music tracks never enter
    /// the cache; they go through the fetcher's staging slot.
    pub fn register_images(&mut self, ctx: &egui::Context) {
        for (url, bytes) in self.worker.fetcher().cached_entries() {
            if self.images.contains(&url) {
                continue;
            }
            ctx.include_bytes(format!("bytes://{url}"), bytes);
            self.images.insert(url);
        }
    }

    /// Ask for `url` in the background unless it is cached or already asked for.
    pub fn want_image(&mut self, url: &str) {
        if self.images.contains(url) || !self.requested.insert(url.to_string()) {
            return;
        }
        self.worker.prefetch(url.to_string());
    }

    /// Stage the track after the current one.
    pub fn prefetch_next_track(&mut self) {
        let next = self.music.preload_index();
        if next == self.prefetched_track {
            return;
        }
        self.prefetched_track = next;
        if let Some(track) = next.and_then(|i| self.music.tracks().get(i)) {
            self.worker.prefetch(track.path.clone());
        }
    }

    pub fn pump(&mut self, now: Instant) {
        self.showcase.pump(now);
        self.music.pump(now);
        if self.splash.poll(now) {
            info!("[app] splash finished");
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.showcase.next_deadline(),
            self.music.next_deadline(),
            self.splash.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn shutdown(&mut self) {
        self.worker.shutdown();
        self.showcase.teardown();
        self.music.teardown();
    }
}
