use std::sync::Arc;
use rustc_hash::FxHashMap;

use crate::command::Command;

/// Scene table: name -> ordered command block. Blocks are immutable
/// once defined; redefining a name overwrites it. Errors in a block
/// only surface when the executor walks it.
#[derive(Default, Clone)]
pub struct SceneRegistry {
    scenes: FxHashMap<String, Arc<[Command]>>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>, block: Vec<Command>) {
        let name = name.into();
        log::debug!("define scene '{}' ({} commands)", name, block.len());
        self.scenes.insert(name, Arc::from(block));
    }

    pub fn get(&self, name: &str) -> Option<Arc<[Command]>> {
        self.scenes.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scenes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}
