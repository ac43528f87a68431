pub mod driver;
pub mod terminal;

use crate::event::{InputEvent, OutputEvent};
use crate::runtime::Ctx;

/// Rendering surface contract. The engine pushes output events; a
/// renderer may answer one with the input it produced (a click, a
/// selection, a typed request).
pub trait Renderer {
    fn render(&mut self, out: &OutputEvent, ctx: &mut Ctx) -> Option<InputEvent>;

    /// Ask for input when the stream has drained but menus are still
    /// open (a hub screen idling on its overlay buttons). `None` ends
    /// the session.
    fn prompt(&mut self, _ctx: &mut Ctx) -> Option<InputEvent> {
        None
    }
}
