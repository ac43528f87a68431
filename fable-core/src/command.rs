use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::runtime::Ctx;

pub type Variables = HashMap<String, Value>;

/// Variable value: numbers and booleans only. Booleans coerce to 0/1
/// when compared against numbers, matching the loose comparisons the
/// scripted content relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Num(f64),
}

impl Value {
    pub fn as_num(&self) -> f64 {
        match self {
            Value::Num(n) => *n,
            Value::Bool(b) => {
                if *b { 1.0 } else { 0.0 }
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Num(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Num(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Lazy command: invoked at dispatch time, may yield a concrete command
/// or nothing ("skip"). Used for side-effecting callbacks and
/// random-event dispatch inside authored blocks.
#[derive(Clone)]
pub struct Producer(Rc<dyn Fn(&mut Ctx) -> Option<Command>>);

impl Producer {
    pub fn new(f: impl Fn(&mut Ctx) -> Option<Command> + 'static) -> Self {
        Producer(Rc::new(f))
    }

    pub fn call(&self, ctx: &mut Ctx) -> Option<Command> {
        (self.0)(ctx)
    }
}

impl Default for Producer {
    // Restored save files carry deferred slots as placeholders; a
    // placeholder yields nothing so the cursor just moves past it.
    fn default() -> Self {
        Producer(Rc::new(|_| None))
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Producer(..)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuKind {
    Tab,
    Menu,
    Floating,
}

/// Absolute placement for a choice button, in percent of the stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionPos {
    pub x: f32,
    pub y: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub text: String,
    pub action: Vec<Command>,
    pub condition: Option<Condition>,
    pub menu: Option<MenuKind>,
    pub icon: Option<String>,
    pub position: Option<OptionPos>,
}

impl ChoiceOption {
    pub fn new(text: impl Into<String>, action: Vec<Command>) -> Self {
        ChoiceOption {
            text: text.into(),
            action,
            condition: None,
            menu: None,
            icon: None,
            position: None,
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn menu(mut self, kind: MenuKind) -> Self {
        self.menu = Some(kind);
        self
    }

    pub fn icon(mut self, path: impl Into<String>) -> Self {
        self.icon = Some(path.into());
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Some(OptionPos { x, y, width: None, height: None });
        self
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        let pos = self.position.get_or_insert(OptionPos {
            x: 0.0,
            y: 0.0,
            width: None,
            height: None,
        });
        pos.width = Some(width);
        pos.height = Some(height);
        self
    }
}

/// One executable instruction within a scene block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    Say {
        speaker: Option<String>,
        text: String,
        voice: Option<String>,
        is_female: bool,
    },
    Show {
        who: String,
        image: String,
        position: Position,
    },
    Hide {
        who: String,
    },
    Scene {
        image: Option<String>,
        video: Option<String>,
        audio: Option<String>,
        affected_by_time: bool,
        loop_audio: bool,
        loop_video: bool,
    },
    Audio {
        path: String,
        looping: bool,
    },
    Choice {
        options: Vec<ChoiceOption>,
    },
    Set {
        var: String,
        value: Value,
    },
    If {
        condition: Condition,
        then_block: Vec<Command>,
        else_block: Vec<Command>,
    },
    Jump {
        target: String,
    },
    Wait {
        duration_ms: u64,
    },
    Deferred {
        #[serde(skip)]
        producer: Producer,
    },
}

impl Command {
    pub fn say(speaker: impl Into<String>, text: impl Into<String>) -> Command {
        Command::Say {
            speaker: Some(speaker.into()),
            text: text.into(),
            voice: None,
            is_female: false,
        }
    }

    pub fn narrate(text: impl Into<String>) -> Command {
        Command::Say {
            speaker: None,
            text: text.into(),
            voice: None,
            is_female: false,
        }
    }

    pub fn show(who: impl Into<String>, image: impl Into<String>, position: Position) -> Command {
        Command::Show { who: who.into(), image: image.into(), position }
    }

    pub fn hide(who: impl Into<String>) -> Command {
        Command::Hide { who: who.into() }
    }

    pub fn scene(image: impl Into<String>) -> Command {
        Command::Scene {
            image: Some(image.into()),
            video: None,
            audio: None,
            affected_by_time: false,
            loop_audio: true,
            loop_video: true,
        }
    }

    pub fn scene_with_audio(image: impl Into<String>, audio: impl Into<String>) -> Command {
        Command::Scene {
            image: Some(image.into()),
            video: None,
            audio: Some(audio.into()),
            affected_by_time: false,
            loop_audio: true,
            loop_video: true,
        }
    }

    /// Background that swaps between day/afternoon/night variants of
    /// the same asset depending on the in-game hour.
    pub fn timed_scene(image: impl Into<String>) -> Command {
        Command::Scene {
            image: Some(image.into()),
            video: None,
            audio: None,
            affected_by_time: true,
            loop_audio: true,
            loop_video: true,
        }
    }

    pub fn video_scene(video: impl Into<String>) -> Command {
        Command::Scene {
            image: None,
            video: Some(video.into()),
            audio: None,
            affected_by_time: false,
            loop_audio: true,
            loop_video: true,
        }
    }

    pub fn audio(path: impl Into<String>) -> Command {
        Command::Audio { path: path.into(), looping: true }
    }

    pub fn choice(options: Vec<ChoiceOption>) -> Command {
        Command::Choice { options }
    }

    /// Choice where every option shares one overlay menu kind,
    /// mirroring the original `Menu` authoring helper.
    pub fn menu(options: Vec<ChoiceOption>, kind: MenuKind) -> Command {
        Command::Choice {
            options: options
                .into_iter()
                .map(|o| if o.menu.is_none() { o.menu(kind) } else { o })
                .collect(),
        }
    }

    pub fn set(var: impl Into<String>, value: impl Into<Value>) -> Command {
        Command::Set { var: var.into(), value: value.into() }
    }

    pub fn branch(condition: Condition, then_block: Vec<Command>, else_block: Vec<Command>) -> Command {
        Command::If { condition, then_block, else_block }
    }

    pub fn when(condition: Condition, then_block: Vec<Command>) -> Command {
        Command::If { condition, then_block, else_block: Vec::new() }
    }

    pub fn jump(target: impl Into<String>) -> Command {
        Command::Jump { target: target.into() }
    }

    pub fn wait(duration_ms: u64) -> Command {
        Command::Wait { duration_ms }
    }

    pub fn deferred(f: impl Fn(&mut Ctx) -> Option<Command> + 'static) -> Command {
        Command::Deferred { producer: Producer::new(f) }
    }
}
