use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::command::{Command, Position};

fn has_extension(path: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.\w+$").unwrap()).is_match(path)
}

/// Insert a time-of-day tag before the extension when one is present,
/// otherwise append it: `bg/park.png` -> `bg/park_night.png`,
/// `bg/park` -> `bg/park_night`.
pub fn apply_time_suffix(path: &str, suffix: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^(.*)(\.\w+)$").unwrap());
    match re.captures(path) {
        Some(caps) => format!("{}{}{}", &caps[1], suffix, &caps[2]),
        None => format!("{}{}", path, suffix),
    }
}

/// Probes a logical asset path against candidate extensions and yields
/// a concrete URL, or `None` when nothing is playable. Resolution
/// failure is never fatal to the surrounding command.
pub trait AssetResolver {
    fn resolve(&self, base: &str, exts: &[String]) -> Option<String>;
}

/// Filesystem-backed resolver rooted at the configured assets
/// directory.
pub struct DirResolver {
    root: PathBuf,
}

impl DirResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirResolver { root: root.into() }
    }
}

impl AssetResolver for DirResolver {
    fn resolve(&self, base: &str, exts: &[String]) -> Option<String> {
        if has_extension(base) {
            if self.root.join(base).is_file() {
                return Some(base.to_string());
            }
            // fall through: the named extension may be a lie, probe the
            // candidates against the stem too
        }
        for ext in exts {
            let candidate = format!("{}.{}", base, ext);
            if self.root.join(&candidate).is_file() {
                return Some(candidate);
            }
        }
        None
    }
}

/// Resolver that accepts every path verbatim. Used by tests and
/// benches where no media exists on disk.
pub struct NullResolver;

impl AssetResolver for NullResolver {
    fn resolve(&self, base: &str, _exts: &[String]) -> Option<String> {
        Some(base.to_string())
    }
}

/// Flat character record: one type for every cast member, no
/// inheritance. `sprites` maps a mood/state name to an asset path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub sprites: HashMap<String, String>,
    pub stats: HashMap<String, f64>,
    pub is_female: bool,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Character { name: name.into(), ..Default::default() }
    }

    pub fn female(mut self) -> Self {
        self.is_female = true;
        self
    }

    pub fn sprite(mut self, state: impl Into<String>, path: impl Into<String>) -> Self {
        self.sprites.insert(state.into(), path.into());
        self
    }

    pub fn stat(mut self, name: impl Into<String>, value: f64) -> Self {
        self.stats.insert(name.into(), value);
        self
    }

    fn sprite_for(&self, state: &str) -> String {
        self.sprites
            .get(state)
            .cloned()
            .unwrap_or_else(|| state.to_string())
    }

    pub fn show(&self, state: &str, position: Position) -> Command {
        Command::show(self.name.clone(), self.sprite_for(state), position)
    }

    pub fn hide(&self) -> Command {
        Command::hide(self.name.clone())
    }

    pub fn say(&self, text: impl Into<String>) -> Command {
        Command::Say {
            speaker: Some(self.name.clone()),
            text: text.into(),
            voice: None,
            is_female: self.is_female,
        }
    }

    pub fn say_voiced(&self, text: impl Into<String>, voice: impl Into<String>) -> Command {
        Command::Say {
            speaker: Some(self.name.clone()),
            text: text.into(),
            voice: Some(voice.into()),
            is_female: self.is_female,
        }
    }
}
