// crates/folio-core/src/helpers/mod.rs
//
// Small utilities shared by the controllers and by folio-ui.

pub mod geometry;
pub mod time;
pub mod timers;
