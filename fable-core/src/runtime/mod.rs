pub mod assets;
pub mod ctx;

pub use assets::{AssetResolver, Character, DirResolver, NullResolver};
pub use ctx::{AudioState, Ctx, DialogueRecord};
