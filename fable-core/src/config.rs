use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub assets_path: String,
    pub save_path: String,
    pub log_path: String,
    pub log_level: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            assets_path: "assets/".into(),
            save_path: "saves/".into(),
            log_path: "logs/".into(),
            log_level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    pub master_volume: f32,
    pub voice_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            voice_volume: 0.8,
        }
    }
}

/// Pacing and asset-probing knobs for the stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Enter/exit/cross-fade transition length in milliseconds.
    pub transition_ms: u64,
    /// Minimum time a dialogue line stays up before an advance counts.
    pub say_min_wait_ms: u64,
    pub image_exts: Vec<String>,
    pub video_exts: Vec<String>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            transition_ms: 300,
            say_min_wait_ms: 1000,
            image_exts: ["webp", "png", "jpg", "gif", "webm", "mp4", "mov"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            video_exts: ["mp4", "webm", "ogg", "avi"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Bundle handed to the executor; sections come from the shared TOML
/// table when a config file is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    pub stage: StageConfig,
    pub audio: AudioConfig,
}

impl CoreConfig {
    pub fn from_shared() -> Self {
        CoreConfig {
            stage: fable_shared::config::get("stage"),
            audio: fable_shared::config::get("audio"),
        }
    }
}
