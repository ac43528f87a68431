use crate::command::{OptionPos, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioChannel {
    Ambient,
    Voice,
}

/// Presentation category of a rendered choice group. Only `Default`
/// suspends the command stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCategory {
    Tab,
    Menu,
    Floating,
    Positioned,
    Default,
}

/// Which menu a rendered choice group belongs to, so selections can be
/// routed back to the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuId {
    /// The one blocking prompt; answered with `InputEvent::ChoiceMade`.
    Blocking,
    /// A non-blocking overlay; answered with `InputEvent::MenuChoiceMade`.
    Overlay(usize),
    /// The engine-level global overlay; answered with
    /// `InputEvent::GlobalChoiceMade`.
    Global,
}

/// Render-facing view of one option: no action block, just what the
/// surface needs to draw a button.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionView {
    pub index: usize,
    pub text: String,
    pub icon: Option<String>,
    pub position: Option<OptionPos>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    ShowDialogue {
        speaker: Option<String>,
        text: String,
        is_female: bool,
    },
    ShowChoice {
        menu: MenuId,
        category: MenuCategory,
        options: Vec<OptionView>,
    },
    ShowSprite {
        who: String,
        url: Option<String>,
        position: Position,
    },
    HideSprite {
        who: String,
    },
    HideAllSprites,
    SetBackground {
        url: Option<String>,
        is_video: bool,
        looping: bool,
    },
    PlayAudio {
        channel: AudioChannel,
        path: String,
        volume: f32,
        looping: bool,
    },
    StopAudio {
        channel: AudioChannel,
    },
    ClearMenus,
    TimeChanged {
        display: String,
    },
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User-advance (click/keypress) or media completion treated as an
    /// advance; resumes a pending wait.
    Continue,
    /// A bounded wait (transition or `wait` command) elapsed.
    TimerElapsed,
    /// A one-shot media element finished or failed; both resume.
    MediaEnded,
    /// Selection on the blocking prompt.
    ChoiceMade { index: usize },
    /// Selection on a non-blocking overlay menu.
    MenuChoiceMade { menu: usize, index: usize },
    /// Selection on the engine-level global overlay.
    GlobalChoiceMade { index: usize },
    AdvanceTime { hours: u32 },
    SaveRequest { slot: String },
    LoadRequest { slot: String },
    Exit,
}
