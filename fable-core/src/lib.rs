pub mod command;
pub mod condition;
pub mod config;
pub mod event;
pub mod executor;
pub mod menu;
pub mod registry;
pub mod renderer;
pub mod runtime;
pub mod storager;
pub mod timesys;

pub use command::{ChoiceOption, Command, MenuKind, Position, Value};
pub use condition::{CmpOp, Condition};
pub use event::{InputEvent, OutputEvent};
pub use executor::Executor;
pub use registry::SceneRegistry;
pub use renderer::terminal::TerminalRenderer;
pub use runtime::Ctx;
