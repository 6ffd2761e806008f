// crates/folio-core/src/preload.rs
//
// AssetPreloadController: fetch a fixed asset list before the app is usable.
//
// The controller never fetches anything itself. It hands out passes
// (`PreloadStep::Fetch`), is told each URL's result through `record`, and
// decides what comes next:
//
//   pass 0 ── all URLs
//   pass n ── only the URLs that failed in pass n-1, after `backoff`
//
// After the pass with `attempt == max_retries` it completes no matter what is
// still failing; a missing logo must not keep the splash up forever. The
// completion callback runs exactly once and never after `cancel`.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::PreloadConfig;
use crate::error::LoadFailure;
use crate::helpers::time::percent;
use crate::helpers::timers::{TimerId, Timers};

/// Fetches one asset. Implementations must be callable from several threads
/// when the parallel preload mode is used.
pub trait AssetLoader {
    fn load(&self, url: &str) -> Result<(), LoadFailure>;
}

impl<L: AssetLoader + ?Sized> AssetLoader for &L {
    fn load(&self, url: &str) -> Result<(), LoadFailure> {
        (**self).load(url)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreloadProgress {
    /// URLs that have loaded at least once. Never decreases.
    pub loaded_count: usize,
    pub total_count:  usize,
    /// Failed in the most recent pass, in list order.
    pub failed_urls:  Vec<String>,
    /// 0 for the first pass, then one more per retry pass.
    pub attempt:      u32,
}

impl PreloadProgress {
    pub fn fraction(&self) -> f32 {
        if self.total_count == 0 {
            1.0
        } else {
            self.loaded_count as f32 / self.total_count as f32
        }
    }

    pub fn percent(&self) -> u8 {
        percent(self.loaded_count, self.total_count)
    }
}

/// What the driver of the controller should do next.
#[derive(Clone, Debug, PartialEq)]
pub enum PreloadStep {
    /// Fetch these URLs and `record` every result.
    Fetch { urls: Vec<String>, attempt: u32 },
    /// Sleep until `until`, then `poll`.
    Wait { until: Instant },
    Complete(PreloadProgress),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    NotStarted,
    Fetching,
    Backoff,
    Complete,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PreloadTimer {
    Retry,
}

pub type PreloadCallback = Box<dyn FnOnce(&PreloadProgress) + Send>;

pub struct AssetPreloadController {
    urls:        Vec<String>,
    max_retries: u32,
    backoff:     Duration,
    stage:       Stage,
    progress:    PreloadProgress,
    /// URLs of the running pass that have not been recorded yet.
    pending:     Vec<String>,
    pass_failed: Vec<String>,
    timers:      Timers<PreloadTimer>,
    retry_timer: Option<TimerId>,
    on_complete: Option<PreloadCallback>,
}

impl std::fmt::Debug for AssetPreloadController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetPreloadController")
            .field("stage", &self.stage)
            .field("progress", &self.progress)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl AssetPreloadController {
    pub fn new(
        urls:        Vec<String>,
        config:      &PreloadConfig,
        on_complete: impl FnOnce(&PreloadProgress) + Send + 'static,
    ) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(urls.len());
        for url in urls {
            if unique.contains(&url) {
                warn!("[preload] duplicate url {url} ignored");
            } else {
                unique.push(url);
            }
        }
        Self {
            progress: PreloadProgress { total_count: unique.len(), ..Default::default() },
            urls:        unique,
            max_retries: config.max_retries,
            backoff:     config.backoff(),
            stage:       Stage::NotStarted,
            pending:     Vec::new(),
            pass_failed: Vec::new(),
            timers:      Timers::new(),
            retry_timer: None,
            on_complete: Some(Box::new(on_complete)),
        }
    }

    pub fn progress(&self)  -> &PreloadProgress { &self.progress }
    pub fn urls(&self)      -> &[String]        { &self.urls }
    pub fn is_complete(&self) -> bool           { self.stage == Stage::Complete }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Begin the first pass. Calling it again is a no-op.
    pub fn start(&mut self) -> Option<PreloadStep> {
        if self.stage != Stage::NotStarted {
            return None;
        }
        if self.urls.is_empty() {
            return Some(self.complete());
        }
        info!("[preload] {} asset(s)", self.urls.len());
        Some(self.begin_pass(self.urls.clone()))
    }

    /// Record the outcome for one URL of the running pass. Returns the next
    /// step once every URL of the pass has been recorded.
    pub fn record(
        &mut self,
        url:    &str,
        result: Result<(), LoadFailure>,
        now:    Instant,
    ) -> Option<PreloadStep> {
        if self.stage != Stage::Fetching {
            return None;
        }
        let Some(pos) = self.pending.iter().position(|u| u == url) else {
            debug!("[preload] result for {url} outside the current pass ignored");
            return None;
        };
        let url = self.pending.remove(pos);

        match result {
            Ok(()) => {
                self.progress.loaded_count = (self.progress.loaded_count + 1)
                    .min(self.progress.total_count);
            }
            Err(e) => {
                warn!("[preload] {url} failed (attempt {}): {e}", self.progress.attempt);
                self.pass_failed.push(url);
            }
        }

        if self.pending.is_empty() {
            Some(self.finish_pass(now))
        } else {
            None
        }
    }

    /// Start the retry pass once its backoff has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<PreloadStep> {
        if self.stage != Stage::Backoff {
            return None;
        }
        let mut due = false;
        for (id, PreloadTimer::Retry) in self.timers.expire(now) {
            due |= self.retry_timer == Some(id);
        }
        if !due {
            return None;
        }
        self.retry_timer = None;
        self.progress.attempt += 1;
        let urls = self.progress.failed_urls.clone();
        debug!("[preload] retry pass {} for {} url(s)", self.progress.attempt, urls.len());
        Some(self.begin_pass(urls))
    }

    /// Abandon preloading. The completion callback is dropped unfired.
    pub fn cancel(&mut self) {
        if matches!(self.stage, Stage::Complete | Stage::Cancelled) {
            return;
        }
        debug!("[preload] cancelled");
        self.stage = Stage::Cancelled;
        self.timers.cancel_all();
        self.retry_timer = None;
        self.pending.clear();
        self.on_complete = None;
    }

    fn begin_pass(&mut self, urls: Vec<String>) -> PreloadStep {
        self.stage       = Stage::Fetching;
        self.pending     = urls.clone();
        self.pass_failed = Vec::new();
        PreloadStep::Fetch { urls, attempt: self.progress.attempt }
    }

    fn finish_pass(&mut self, now: Instant) -> PreloadStep {
        // Keep list order regardless of the order results arrived in.
        let failed = std::mem::take(&mut self.pass_failed);
        self.progress.failed_urls = self.urls.iter()
            .filter(|u| failed.contains(u))
            .cloned()
            .collect();

        if self.progress.failed_urls.is_empty() || self.progress.attempt >= self.max_retries {
            return self.complete();
        }
        let until = now + self.backoff;
        self.retry_timer = Some(self.timers.schedule(until, PreloadTimer::Retry));
        self.stage = Stage::Backoff;
        PreloadStep::Wait { until }
    }

    fn complete(&mut self) -> PreloadStep {
        self.stage = Stage::Complete;
        self.timers.cancel_all();
        self.retry_timer = None;
        let report = self.progress.clone();
        if report.failed_urls.is_empty() {
            info!("[preload] complete: {}/{} loaded", report.loaded_count, report.total_count);
        } else {
            warn!(
                "[preload] complete with {} failure(s) after {} retr(y/ies): {:?}",
                report.failed_urls.len(), report.attempt, report.failed_urls,
            );
        }
        if let Some(cb) = self.on_complete.take() {
            cb(&report);
        }
        PreloadStep::Complete(report)
    }
}

impl Drop for AssetPreloadController {
    fn drop(&mut self) {
        self.cancel();
    }
}
