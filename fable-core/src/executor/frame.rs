use std::sync::Arc;

use crate::command::Command;

/// One block being iterated: a scene body or a nested
/// then/else/action list, tagged with the scene that owns it.
#[derive(Debug, Clone)]
pub struct Frame {
    pub scene: String,
    pub commands: Arc<[Command]>,
    pub pc: usize,
}

impl Frame {
    pub fn new(scene: impl Into<String>, commands: Arc<[Command]>, pc: usize) -> Self {
        Frame { scene: scene.into(), commands, pc }
    }

    pub fn current(&self) -> Option<&Command> {
        self.commands.get(self.pc)
    }

    pub fn advance(&mut self) {
        self.pc += 1;
    }
}
