// crates/folio-ui/src/modules/mod.rs
//
// Panel registry. Each panel reads AppContext and emits FolioCommands; none
// of them touch a controller directly. FolioApp applies the commands after
// the UI pass with the frame's `Instant`.

pub mod header;
pub mod music_bar;
pub mod showcase;
pub mod splash;

use egui::Ui;
use folio_core::commands::FolioCommand;

use crate::context::AppContext;

pub trait FolioModule {
    /// Also used as the egui id of the panel hosting the module.
    fn name(&self) -> &str;
    fn ui(&mut self, ui: &mut Ui, app: &AppContext, cmd: &mut Vec<FolioCommand>);
}
