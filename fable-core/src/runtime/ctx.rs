use std::collections::{BTreeSet, VecDeque};
use serde::{Deserialize, Serialize};

use crate::command::Variables;
use crate::event::OutputEvent;
use crate::timesys::TimeState;

/// One line of the dialogue history, appended per `say`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueRecord {
    pub speaker: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioState {
    pub path: String,
    pub looping: bool,
}

/// Mutable engine state, owned by the hosting controller and threaded
/// through the executor. Everything except the event queue round-trips
/// through save files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ctx {
    pub variables: Variables,
    pub current_scene: Option<String>,
    pub active_characters: BTreeSet<String>,
    pub history: Vec<DialogueRecord>,
    pub ambient_audio: Option<AudioState>,
    pub time: TimeState,
    #[serde(skip)]
    pub event_queue: VecDeque<OutputEvent>,
}

impl Ctx {
    pub fn push(&mut self, event: OutputEvent) {
        self.event_queue.push_back(event);
    }

    pub fn pop(&mut self) -> Option<OutputEvent> {
        self.event_queue.pop_front()
    }

    pub fn drain(&mut self) -> Vec<OutputEvent> {
        self.event_queue.drain(..).collect()
    }
}
