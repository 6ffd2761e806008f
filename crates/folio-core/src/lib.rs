// crates/folio-core/src/lib.rs
//
// Pure showcase state: media load/playback state machines, the autoplay
// recovery policy, project selection, asset preloading and the music player.
// No egui, no audio device, no HTTP. Runtime backends live in folio-media and
// talk to these controllers through the `MediaElement` / `AssetLoader` traits.
//
// Every controller takes `now: Instant` on its entry points and owns its
// timers, so hosts drive them from whatever loop they have (egui frame,
// worker thread, test).

pub mod commands;
pub mod config;
pub mod error;
pub mod helpers;
pub mod interaction;
pub mod intersection;
pub mod media;
pub mod media_types;
pub mod music;
pub mod preload;
pub mod selection;
pub mod showcase;
pub mod splash;
pub mod viewport;

pub use config::FolioConfig;
pub use error::{ConfigError, ErrorKind, LoadFailure, PlayError};
pub use media::{MediaElement, MediaLoadController, MediaLoadState, MediaOptions, Phase};
pub use media_types::{MediaEvent, MediaSource};
