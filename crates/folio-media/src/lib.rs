// crates/folio-media/src/lib.rs
//
// Runtime backends for folio-core's controllers. No egui dependency; the UI
// talks to this crate through MediaWorker's channel and the MediaElement impls.
//
//   fetch.rs   — AssetFetcher: HTTP via ureq, local files under the asset root,
//                image cache and the one-track staging slot
//   worker.rs  — MediaWorker: preload thread, background prefetch
//   element.rs — FetchElement: preview video element (existence check only)
//   audio.rs   — AudioElement: rodio playback for the music player

pub mod audio;
pub mod element;
pub mod fetch;
pub mod worker;

pub use audio::AudioElement;
pub use element::FetchElement;
pub use fetch::{is_image_url, AssetFetcher, AssetLocation};
pub use worker::{MediaWorker, PreloadUpdate};
