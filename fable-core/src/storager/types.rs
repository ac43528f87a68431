use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};

use crate::command::{Command, Variables};
use crate::runtime::DialogueRecord;
use crate::timesys::TimeState;

/// Flat, JSON-serializable save-file record. Deferred commands inside
/// `current_block` are stored as placeholders so the command index
/// stays aligned after a round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub variables: Variables,
    pub history: Vec<DialogueRecord>,
    pub current_scene: Option<String>,
    pub active_characters: BTreeSet<String>,
    pub time: TimeState,
    pub current_block: Vec<Command>,
    pub command_index: usize,
}
