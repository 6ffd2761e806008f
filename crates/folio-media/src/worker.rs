// crates/folio-media/src/worker.rs
//
// MediaWorker: owns the startup preload thread and background prefetches.
// folio-ui talks to it through its public API and drains `rx` every frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, warn};
use rayon::prelude::*;

use folio_core::config::{PreloadConfig, PreloadMode};
use folio_core::preload::{AssetLoader, AssetPreloadController, PreloadProgress, PreloadStep};

use crate::fetch::{is_image_url, AssetFetcher};

/// Granularity of the cancellable backoff sleep.
const SLEEP_SLICE: Duration = Duration::from_millis(25);

#[derive(Clone, Debug, PartialEq)]
pub enum PreloadUpdate {
    /// Sent after every recorded URL, except the one that completes the
    /// preload.
    Progress(PreloadProgress),
    /// Sent once, by the controller's completion callback.
    Complete(PreloadProgress),
}

pub struct MediaWorker {
    /// Preload progress and completion, drained by the UI every frame.
    pub rx:   Receiver<PreloadUpdate>,
    tx:       Sender<PreloadUpdate>,
    fetcher:  AssetFetcher,
    shutdown: Arc<AtomicBool>,
}

impl MediaWorker {
    pub fn new(fetcher: AssetFetcher) -> Self {
        let (tx, rx) = bounded(256);
        Self { rx, tx, fetcher, shutdown: Arc::new(AtomicBool::new(false)) }
    }

    pub fn fetcher(&self) -> &AssetFetcher {
        &self.fetcher
    }

    /// Run the preload on its own thread. Updates arrive on `rx`.
    pub fn start_preload(&self, urls: Vec<String>, config: &PreloadConfig) {
        let tx       = self.tx.clone();
        let done_tx  = self.tx.clone();
        let sd       = self.shutdown.clone();
        let done_sd  = self.shutdown.clone();
        let fetcher  = self.fetcher.clone();
        let mode     = config.mode;
        let config   = config.clone();

        thread::spawn(move || {
            let mut ctl = AssetPreloadController::new(urls, &config, move |report| {
                if !done_sd.load(Ordering::Relaxed) {
                    let _ = done_tx.send(PreloadUpdate::Complete(report.clone()));
                }
            });
            run_preload(&mut ctl, &fetcher, mode, &tx, &sd);
        });
    }

    /// Fetch `url` in the background: images into the shared cache, anything
    /// else (the next music track) into the single staging slot.
    pub fn prefetch(&self, url: String) {
        if self.fetcher.cached(&url).is_some() || self.fetcher.is_staged(&url) {
            return;
        }
        let fetcher = self.fetcher.clone();
        let sd      = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) { return; }
            let result = if is_image_url(&url) {
                fetcher.fetch(&url).map(|bytes| bytes.len())
            } else {
                fetcher.stage(&url)
            };
            match result {
                Ok(len) => debug!("[preload] prefetched {url} ({len} bytes)"),
                Err(e)  => warn!("[preload] prefetch of {url} failed: {e}"),
            }
        });
    }

    /// Stop background work. A preload still running exits at its next
    /// checkpoint without reporting completion.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for MediaWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_preload(
    ctl:     &mut AssetPreloadController,
    loader:  &(impl AssetLoader + Sync),
    mode:    PreloadMode,
    tx:      &Sender<PreloadUpdate>,
    sd:      &AtomicBool,
) {
    let mut step = ctl.start();
    while let Some(current) = step.take() {
        if sd.load(Ordering::Relaxed) {
            ctl.cancel();
            return;
        }
        step = match current {
            PreloadStep::Fetch { urls, attempt } => {
                debug!("[preload] pass {attempt}: {} url(s), {mode:?}", urls.len());
                run_pass(ctl, &urls, loader, mode, tx, sd)
            }
            PreloadStep::Wait { until } => {
                if !sleep_until(until, sd) {
                    ctl.cancel();
                    return;
                }
                ctl.poll(Instant::now())
            }
            PreloadStep::Complete(_) => None,
        };
    }
}

fn run_pass(
    ctl:    &mut AssetPreloadController,
    urls:   &[String],
    loader: &(impl AssetLoader + Sync),
    mode:   PreloadMode,
    tx:     &Sender<PreloadUpdate>,
    sd:     &AtomicBool,
) -> Option<PreloadStep> {
    let mut next = None;
    let mut record = |ctl: &mut AssetPreloadController, url: &str, result| {
        let step = ctl.record(url, result, Instant::now());
        // The completion callback already sent the final state.
        if !matches!(step, Some(PreloadStep::Complete(_))) {
            let _ = tx.send(PreloadUpdate::Progress(ctl.progress().clone()));
        }
        if step.is_some() {
            next = step;
        }
    };

    match mode {
        PreloadMode::Sequential => {
            for url in urls {
                if sd.load(Ordering::Relaxed) {
                    return None;
                }
                let result = loader.load(url);
                record(ctl, url, result);
            }
        }
        PreloadMode::Parallel => {
            let results: Vec<_> = urls.par_iter().map(|u| loader.load(u)).collect();
            // Recorded in list order so progress reads the same as sequential.
            for (url, result) in urls.iter().zip(results) {
                record(ctl, url, result);
            }
        }
    }
    next
}

/// Sleep until `until` in short slices. Returns false if shut down meanwhile.
fn sleep_until(until: Instant, sd: &AtomicBool) -> bool {
    loop {
        if sd.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= until {
            return true;
        }
        thread::sleep((until - now).min(SLEEP_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn assets(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), b"asset").unwrap();
        }
    }

    fn collect_until_complete(rx: &Receiver<PreloadUpdate>) -> (Vec<PreloadProgress>, PreloadProgress) {
        let mut progress = Vec::new();
        loop {
            match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                PreloadUpdate::Progress(p) => progress.push(p),
                PreloadUpdate::Complete(p) => return (progress, p),
            }
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sequential_preload_reports_progress_then_completes() {
        let dir = tempfile::tempdir().unwrap();
        assets(dir.path(), &["a.png", "b.png"]);
        let worker = MediaWorker::new(AssetFetcher::new(Some(dir.path().to_path_buf())));
        worker.start_preload(urls(&["a.png", "b.png"]), &PreloadConfig::default());

        let (progress, report) = collect_until_complete(&worker.rx);
        let counts: Vec<usize> = progress.iter().map(|p| p.loaded_count).collect();
        assert_eq!(counts, vec![1]);
        assert_eq!(report.loaded_count, 2);
        assert!(report.failed_urls.is_empty());
        assert!(worker.fetcher().cached("a.png").is_some());
    }

    #[test]
    fn missing_asset_completes_after_retries() {
        let dir = tempfile::tempdir().unwrap();
        assets(dir.path(), &["ok1.png", "ok2.png"]);
        let worker = MediaWorker::new(AssetFetcher::new(Some(dir.path().to_path_buf())));
        let cfg = PreloadConfig { max_retries: 2, backoff_ms: 10, ..Default::default() };
        worker.start_preload(urls(&["ok1.png", "bad.png", "ok2.png"]), &cfg);

        let (_, report) = collect_until_complete(&worker.rx);
        assert_eq!(report.failed_urls, urls(&["bad.png"]));
        assert_eq!(report.loaded_count, 2);
        assert_eq!(report.attempt, 2);
    }

    #[test]
    fn parallel_mode_matches_sequential_outcome() {
        let dir = tempfile::tempdir().unwrap();
        assets(dir.path(), &["a.png", "b.png", "c.png"]);
        let worker = MediaWorker::new(AssetFetcher::new(Some(dir.path().to_path_buf())));
        let cfg = PreloadConfig { mode: PreloadMode::Parallel, ..Default::default() };
        worker.start_preload(urls(&["a.png", "b.png", "c.png"]), &cfg);

        let (progress, report) = collect_until_complete(&worker.rx);
        assert_eq!(progress.len(), 2);
        assert_eq!(report.loaded_count, 3);
    }

    #[test]
    fn shutdown_during_backoff_never_completes() {
        let dir = tempfile::tempdir().unwrap();
        let worker = MediaWorker::new(AssetFetcher::new(Some(dir.path().to_path_buf())));
        let cfg = PreloadConfig { backoff_ms: 10_000, ..Default::default() };
        worker.start_preload(urls(&["bad.png"]), &cfg);

        // First pass result arrives, then the thread sits in its backoff.
        let first = worker.rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(first, PreloadUpdate::Progress(_)));
        worker.shutdown();

        while let Ok(update) = worker.rx.recv_timeout(Duration::from_millis(300)) {
            assert!(!matches!(update, PreloadUpdate::Complete(_)));
        }
    }

    #[test]
    fn prefetched_track_is_staged_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        assets(dir.path(), &["t1.mp3", "logo.png"]);
        let worker = MediaWorker::new(AssetFetcher::new(Some(dir.path().to_path_buf())));
        worker.prefetch("t1.mp3".into());
        worker.prefetch("logo.png".into());

        let deadline = Instant::now() + Duration::from_secs(5);
        let f = worker.fetcher();
        while !(f.is_staged("t1.mp3") && f.cached("logo.png").is_some()) {
            assert!(Instant::now() < deadline, "prefetch never finished");
            thread::sleep(Duration::from_millis(5));
        }
        assert!(f.cached("t1.mp3").is_none());
        assert_eq!(f.cached_entries().len(), 1);
    }
}
