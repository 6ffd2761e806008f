// crates/folio-core/src/music.rs
//
// MusicPlayer: background playlist on top of one MediaLoadController.
//
// - Tracks play in order and wrap around; a natural end moves to the next.
// - Autoplay goes through the same bounded recovery as every other element,
//   so a refused start leaves the player paused with `autoplay_blocked` set
//   until the first gesture.
// - Once more than `inactivity` has passed without any user activity the
//   player pauses itself. The check runs every `inactivity_check`, not on
//   every frame.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::config::FolioConfig;
use crate::helpers::timers::{TimerId, Timers};
use crate::interaction::{InteractionBus, InteractionListener, ACTIVITY};
use crate::intersection::IntersectionGate;
use crate::media::{MediaElement, MediaLoadController, MediaOptions, Phase};
use crate::media_types::{MediaSource, Track};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MusicTimer {
    InactivityCheck,
}

pub struct MusicPlayer<E: MediaElement> {
    tracks:           Vec<Track>,
    current:          usize,
    player:           MediaLoadController<E>,
    bus:              InteractionBus,
    activity:         Option<InteractionListener>,
    last_activity:    Instant,
    inactivity:       Duration,
    check_every:      Duration,
    timers:           Timers<MusicTimer>,
    check_timer:      Option<TimerId>,
}

impl<E: MediaElement> MusicPlayer<E> {
    pub fn new(
        tracks:  Vec<Track>,
        element: E,
        config:  &FolioConfig,
        bus:     InteractionBus,
        now:     Instant,
    ) -> Self {
        let options = MediaOptions::from_config(&config.media)
            .autoplay(config.music.autoplay)
            .lazy(false);
        let gate   = IntersectionGate::always_visible(config.intersection);
        let player = MediaLoadController::new(element, options, gate, bus.clone());

        let mut this = Self {
            tracks,
            current:       0,
            player,
            activity:      Some(bus.listen(&ACTIVITY)),
            bus,
            last_activity: now,
            inactivity:    config.music.inactivity(),
            check_every:   config.music.inactivity_check(),
            timers:        Timers::new(),
            check_timer:   None,
        };
        this.schedule_check(now);
        this.load_current(now);
        this
    }

    pub fn tracks(&self)        -> &[Track]                 { &self.tracks }
    pub fn current_index(&self) -> usize                    { self.current }
    pub fn current_track(&self) -> Option<&Track>           { self.tracks.get(self.current) }
    pub fn player(&self)        -> &MediaLoadController<E>  { &self.player }
    pub fn player_mut(&mut self) -> &mut MediaLoadController<E> { &mut self.player }
    pub fn phase(&self)         -> Phase                    { self.player.phase() }
    pub fn is_playing(&self)    -> bool                     { self.player.phase() == Phase::Playing }

    /// The track after the current one, for background preloading.
    pub fn preload_index(&self) -> Option<usize> {
        if self.tracks.len() < 2 {
            return None;
        }
        Some((self.current + 1) % self.tracks.len())
    }

    /// `position / duration` of the current track, when known.
    pub fn progress(&self) -> Option<f32> {
        let (position, duration) = self.player.progress()?;
        if duration <= 0.0 {
            return None;
        }
        Some((position / duration).clamp(0.0, 1.0) as f32)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.timers.next_deadline(), self.player.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b)             => a.or(b),
        }
    }

    // ── Controls ──────────────────────────────────────────────────────────────

    /// Play/pause. Ignored while the current track is still loading.
    pub fn toggle(&mut self, now: Instant) {
        self.note_activity(now);
        if self.player.phase() == Phase::Loading {
            debug!("[music] toggle ignored while loading");
            return;
        }
        // Once the user has asked for music, later tracks start by themselves.
        self.player.set_autoplay(true);
        self.player.toggle();
    }

    pub fn next_track(&mut self, now: Instant) {
        if self.tracks.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.tracks.len();
        self.player.set_autoplay(true);
        self.load_current(now);
    }

    /// Any user activity resets the idle clock.
    pub fn note_activity(&mut self, now: Instant) {
        self.last_activity = now;
    }

    pub fn pump(&mut self, now: Instant) {
        if let Some(kind) = self.activity.as_ref().and_then(|l| l.try_fired()) {
            // Listener groups are one-shot; re-arm for the next activity.
            debug!("[music] activity {kind:?}");
            self.note_activity(now);
            self.activity = Some(self.bus.listen(&ACTIVITY));
        }

        self.player.pump(now);
        if self.player.take_ended() {
            debug!("[music] track {} ended", self.current);
            self.next_track(now);
        }

        for (id, MusicTimer::InactivityCheck) in self.timers.expire(now) {
            if self.check_timer != Some(id) {
                continue;
            }
            self.check_timer = None;
            self.check_inactivity(now);
            self.schedule_check(now);
        }
    }

    pub fn teardown(&mut self) {
        self.timers.cancel_all();
        self.check_timer = None;
        self.activity    = None;
        self.player.teardown();
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn load_current(&mut self, now: Instant) {
        let source = self.tracks.get(self.current).map(|t| MediaSource::new(t.path.clone()));
        if let Some(track) = self.tracks.get(self.current) {
            info!("[music] track {}: {}", self.current, track.name);
        }
        self.player.set_source(source, now);
    }

    fn check_inactivity(&mut self, now: Instant) {
        let idle = now.saturating_duration_since(self.last_activity);
        if idle > self.inactivity && self.is_playing() {
            info!("[music] paused after {}s without activity", idle.as_secs());
            self.player.pause();
        }
    }

    fn schedule_check(&mut self, now: Instant) {
        self.check_timer = Some(
            self.timers.schedule(now + self.check_every, MusicTimer::InactivityCheck),
        );
    }
}

impl<E: MediaElement> Drop for MusicPlayer<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MusicConfig;
    use crate::interaction::InteractionKind;
    use crate::media::testing::{Call, FakeElement};
    use crate::media_types::MediaEvent;

    fn tracks(n: usize) -> Vec<Track> {
        (0..n).map(|i| Track { name: format!("Track {i}"), path: format!("t{i}.mp3") }).collect()
    }

    fn player(n: usize, autoplay: bool, t0: Instant) -> (MusicPlayer<FakeElement>, InteractionBus) {
        let bus = InteractionBus::new();
        let config = FolioConfig {
            music: MusicConfig { autoplay, ..Default::default() },
            ..Default::default()
        };
        (MusicPlayer::new(tracks(n), FakeElement::new(), &config, bus.clone(), t0), bus)
    }

    fn ready(p: &mut MusicPlayer<FakeElement>, now: Instant) {
        assert!(p.player().element().emit(MediaEvent::CanPlay));
        p.pump(now);
    }

    #[test]
    fn next_track_wraps_around() {
        let t0 = Instant::now();
        let (mut p, _) = player(3, true, t0);
        for _ in 0..3 {
            p.next_track(t0);
        }
        assert_eq!(p.current_index(), 0);
        assert_eq!(
            p.player().element().attached_urls(),
            vec!["t0.mp3", "t1.mp3", "t2.mp3", "t0.mp3"],
        );
        assert_eq!(p.player().element().count(&Call::Detach), 3);
    }

    #[test]
    fn natural_end_plays_the_next_track() {
        let t0 = Instant::now();
        let (mut p, _) = player(2, true, t0);
        ready(&mut p, t0);
        assert!(p.is_playing());

        p.player().element().emit(MediaEvent::Ended);
        p.pump(t0);
        assert_eq!(p.current_index(), 1);
        assert_eq!(p.phase(), Phase::Loading);

        ready(&mut p, t0);
        assert!(p.is_playing());
    }

    #[test]
    fn toggle_is_ignored_while_loading() {
        let t0 = Instant::now();
        let (mut p, _) = player(1, false, t0);
        p.toggle(t0);
        assert_eq!(p.player().element().play_count(), 0);

        ready(&mut p, t0);
        assert_eq!(p.phase(), Phase::Ready);
        p.toggle(t0);
        p.pump(t0);
        assert!(p.is_playing());
    }

    #[test]
    fn disabled_autoplay_still_continues_after_user_play() {
        let t0 = Instant::now();
        let (mut p, _) = player(2, false, t0);
        ready(&mut p, t0);
        p.toggle(t0);
        p.pump(t0);
        p.player().element().emit(MediaEvent::Ended);
        p.pump(t0);
        ready(&mut p, t0);
        assert_eq!(p.current_index(), 1);
        assert!(p.is_playing());
    }

    #[test]
    fn inactivity_pauses_playback() {
        let t0 = Instant::now();
        let (mut p, _) = player(1, true, t0);
        ready(&mut p, t0);
        for step in 1..=6 {
            p.pump(t0 + Duration::from_secs(30 * step));
            assert!(p.is_playing(), "paused too early at {}s", 30 * step);
        }
        // Exactly 3 min idle at 180 s is not yet past the limit.
        p.pump(t0 + Duration::from_secs(210));
        assert_eq!(p.phase(), Phase::Paused);
    }

    #[test]
    fn activity_resets_the_idle_clock() {
        let t0 = Instant::now();
        let (mut p, bus) = player(1, true, t0);
        ready(&mut p, t0);
        for step in 1..=12u64 {
            let now = t0 + Duration::from_secs(30 * step);
            if step == 5 {
                bus.dispatch(InteractionKind::PointerMove);
            }
            p.pump(now);
            if step < 12 {
                assert!(p.is_playing(), "paused at {}s", 30 * step);
            }
        }
        // Last activity at 150 s, so the 360 s check is the first past 3 min.
        assert_eq!(p.phase(), Phase::Paused);
    }

    #[test]
    fn preload_index_points_at_the_following_track() {
        let t0 = Instant::now();
        let (mut p, _) = player(3, false, t0);
        assert_eq!(p.preload_index(), Some(1));
        p.next_track(t0);
        p.next_track(t0);
        assert_eq!(p.preload_index(), Some(0));

        let (single, _) = player(1, false, t0);
        assert_eq!(single.preload_index(), None);
    }

    #[test]
    fn progress_comes_from_time_updates() {
        let t0 = Instant::now();
        let (mut p, _) = player(1, true, t0);
        ready(&mut p, t0);
        assert_eq!(p.progress(), None);
        p.player().element().emit(MediaEvent::TimeUpdate { position: 30.0, duration: 120.0 });
        p.pump(t0);
        assert_eq!(p.progress(), Some(0.25));
    }

    #[test]
    fn empty_playlist_is_inert() {
        let t0 = Instant::now();
        let (mut p, _) = player(0, true, t0);
        p.next_track(t0);
        p.toggle(t0);
        p.pump(t0 + Duration::from_secs(600));
        assert!(p.current_track().is_none());
        assert!(p.player().element().calls.is_empty());
    }

    #[test]
    fn teardown_stops_everything() {
        let t0 = Instant::now();
        let (mut p, bus) = player(2, true, t0);
        ready(&mut p, t0);
        p.teardown();
        assert_eq!(bus.listener_count(), 0);
        assert_eq!(p.next_deadline(), None);
        assert_eq!(p.player().element().calls.last(), Some(&Call::Detach));
    }
}
