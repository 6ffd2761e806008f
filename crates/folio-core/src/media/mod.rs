// crates/folio-core/src/media/mod.rs
//
// Per-element media state machine.
//
//   element.rs   — the contract a backend (video preview, rodio audio, test
//                  fake) implements
//   state.rs     — Phase / MediaLoadState / MediaOptions
//   autoplay.rs  — bounded recovery when the platform refuses autoplay
//   load.rs      — MediaLoadController, which drives one element through
//                  Idle → Loading → Ready → Playing/Paused

pub mod autoplay;
pub mod element;
pub mod load;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use autoplay::{AutoplayAction, AutoplayRetryPolicy};
pub use element::MediaElement;
pub use load::MediaLoadController;
pub use state::{MediaLoadState, MediaOptions, Phase};
