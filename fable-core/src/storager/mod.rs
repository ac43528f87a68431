pub mod types;

use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use anyhow::Context;
use walkdir::WalkDir;

use crate::config::SystemConfig;
use crate::executor::Executor;
use crate::runtime::Ctx;
use types::Snapshot;

const SLOT_PREFIX: &str = "game-save-";
const SLOT_SUFFIX: &str = ".json";

/// Slot-keyed snapshot store. Read/write failures degrade to
/// `None`/no-op; the engine never dies over a bad save file.
pub trait SaveStore {
    fn save(&self, slot: &str, snapshot: &Snapshot) -> anyhow::Result<()>;
    fn load(&self, slot: &str) -> Option<Snapshot>;
    fn list_slots(&self) -> Vec<String>;
    fn delete(&self, slot: &str);
}

/// Snapshot files on disk, one pretty-printed JSON file per slot.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn from_config() -> Self {
        let cfg: SystemConfig = fable_shared::config::get("system");
        FileStore::new(cfg.save_path)
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{}{}{}", SLOT_PREFIX, slot, SLOT_SUFFIX))
    }

    fn read_slot(&self, path: &Path) -> anyhow::Result<Snapshot> {
        let file = File::open(path).with_context(|| format!("open save {:?}", path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).with_context(|| format!("parse save {:?}", path))
    }
}

impl SaveStore for FileStore {
    fn save(&self, slot: &str, snapshot: &Snapshot) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create save dir {:?}", self.dir))?;
        let path = self.slot_path(slot);
        let file = File::create(&path).with_context(|| format!("create save {:?}", path))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, snapshot)
            .with_context(|| format!("write save {:?}", path))?;
        Ok(())
    }

    fn load(&self, slot: &str) -> Option<Snapshot> {
        let path = self.slot_path(slot);
        if !path.exists() {
            return None;
        }
        match self.read_slot(&path) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::error!("failed to load slot '{}': {:#}", slot, e);
                None
            }
        }
    }

    fn list_slots(&self) -> Vec<String> {
        let mut slots = Vec::new();
        for entry in WalkDir::new(&self.dir).max_depth(1).into_iter().filter_map(|e| e.ok()) {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(stem) = name
                .strip_prefix(SLOT_PREFIX)
                .and_then(|n| n.strip_suffix(SLOT_SUFFIX))
            {
                slots.push(stem.to_string());
            }
        }
        slots.sort();
        slots
    }

    fn delete(&self, slot: &str) {
        let path = self.slot_path(slot);
        if let Err(e) = fs::remove_file(&path) {
            log::warn!("failed to delete slot '{}': {}", slot, e);
        }
    }
}

/// Photograph the running game. The scene-level cursor comes from the
/// executor's outermost frame; nested blocks collapse to it, so a load
/// resumes at the top-level command that was in flight.
pub fn capture_game_state(ctx: &Ctx, exe: &Executor) -> Snapshot {
    let command_index = exe.root_frame().map(|(_, pc)| pc).unwrap_or(0);
    let current_block = ctx
        .current_scene
        .as_deref()
        .and_then(|s| exe.registry().get(s))
        .map(|b| b.to_vec())
        .unwrap_or_default();
    Snapshot {
        variables: ctx.variables.clone(),
        history: ctx.history.clone(),
        current_scene: ctx.current_scene.clone(),
        active_characters: ctx.active_characters.clone(),
        time: ctx.time.clone(),
        current_block,
        command_index,
    }
}

pub fn restore_game_state(ctx: &mut Ctx, exe: &mut Executor, snapshot: Snapshot) {
    ctx.variables = snapshot.variables;
    ctx.history = snapshot.history;
    ctx.current_scene = snapshot.current_scene.clone();
    ctx.active_characters = snapshot.active_characters;
    ctx.time = snapshot.time;
    ctx.ambient_audio = None;
    match snapshot.current_scene.as_deref() {
        Some(scene) => exe.resume(scene, snapshot.command_index, Some(snapshot.current_block)),
        None => log::warn!("restored a save with no running scene"),
    }
    log::info!(
        "state restored: scene {:?}, command {}",
        ctx.current_scene,
        snapshot.command_index
    );
}
