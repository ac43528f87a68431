use std::io::{stdin, stdout, Write};

use crate::event::{InputEvent, MenuId, OutputEvent};
use crate::renderer::Renderer;
use crate::runtime::Ctx;

/// Line-oriented development surface. Dialogue and blocking choices
/// read from stdin; overlay menus print once and are selected later
/// with `:menu <id> <n>` (or `:global <n>`) at any prompt.
pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn render(&mut self, out: &OutputEvent, ctx: &mut Ctx) -> Option<InputEvent> {
        match out {
            OutputEvent::ShowDialogue { speaker, text, .. } => {
                match speaker {
                    Some(name) => println!("{}: {}", name, text),
                    None => println!("{}", text),
                }
                self.wait_continue()
            }
            OutputEvent::ShowChoice { menu, options, category } => {
                match menu {
                    MenuId::Blocking => {
                        for (i, o) in options.iter().enumerate() {
                            println!("  [{}] {}", i + 1, o.text);
                        }
                        self.wait_choice(options.len())
                    }
                    MenuId::Overlay(id) => {
                        println!("-- menu {} ({:?}) -- select with :menu {} <n>", id, category, id);
                        for (i, o) in options.iter().enumerate() {
                            println!("  ({}) {}", i + 1, o.text);
                        }
                        None
                    }
                    MenuId::Global => {
                        println!("-- global menu -- select with :global <n>");
                        for (i, o) in options.iter().enumerate() {
                            println!("  ({}) {}", i + 1, o.text);
                        }
                        None
                    }
                }
            }
            OutputEvent::ShowSprite { who, url, position } => {
                println!("[Show] {} ({:?}) -> {:?}", who, position, url);
                None
            }
            OutputEvent::HideSprite { who } => {
                println!("[Hide] {}", who);
                None
            }
            OutputEvent::HideAllSprites => {
                println!("[Hide] everyone");
                None
            }
            OutputEvent::SetBackground { url, is_video, .. } => {
                println!("[Background] {:?} (video: {})", url, is_video);
                if *is_video {
                    // video backgrounds hold for a user advance
                    self.wait_continue()
                } else {
                    None
                }
            }
            OutputEvent::PlayAudio { channel, path, volume, looping } => {
                println!("[PlayAudio] {:?}:{} volume:{} loop:{}", channel, path, volume, looping);
                None
            }
            OutputEvent::StopAudio { channel } => {
                println!("[StopAudio] {:?}", channel);
                None
            }
            OutputEvent::ClearMenus => {
                println!("[Menus cleared]");
                None
            }
            OutputEvent::TimeChanged { display } => {
                println!("[Time] {} (scene restarts: {:?})", display, ctx.current_scene);
                None
            }
            OutputEvent::End => None,
        }
    }

    fn prompt(&mut self, _ctx: &mut Ctx) -> Option<InputEvent> {
        self.wait_continue()
    }
}

impl TerminalRenderer {
    fn wait_continue(&mut self) -> Option<InputEvent> {
        loop {
            print!("> ");
            stdout().flush().ok();
            let mut buf = String::new();
            if stdin().read_line(&mut buf).is_err() {
                return Some(InputEvent::Exit);
            }
            let trimmed = buf.trim();
            if trimmed.is_empty() {
                return Some(InputEvent::Continue);
            }
            if trimmed.eq_ignore_ascii_case("exit") {
                return Some(InputEvent::Exit);
            }
            if let Some(rest) = trimmed.strip_prefix(":save ") {
                return Some(InputEvent::SaveRequest { slot: rest.trim().to_string() });
            }
            if let Some(rest) = trimmed.strip_prefix(":load ") {
                return Some(InputEvent::LoadRequest { slot: rest.trim().to_string() });
            }
            if let Some(rest) = trimmed.strip_prefix(":time ") {
                if let Ok(hours) = rest.trim().parse::<u32>() {
                    return Some(InputEvent::AdvanceTime { hours });
                }
            }
            if let Some(rest) = trimmed.strip_prefix(":menu ") {
                let mut parts = rest.split_whitespace();
                if let (Some(Ok(menu)), Some(Ok(n))) = (
                    parts.next().map(str::parse::<usize>),
                    parts.next().map(str::parse::<usize>),
                ) {
                    if n >= 1 {
                        return Some(InputEvent::MenuChoiceMade { menu, index: n - 1 });
                    }
                }
            }
            if let Some(rest) = trimmed.strip_prefix(":global ") {
                if let Ok(n) = rest.trim().parse::<usize>() {
                    if n >= 1 {
                        return Some(InputEvent::GlobalChoiceMade { index: n - 1 });
                    }
                }
            }
            println!("invalid");
        }
    }

    fn wait_choice(&mut self, len: usize) -> Option<InputEvent> {
        loop {
            print!("Select> ");
            stdout().flush().ok();
            let mut buf = String::new();
            if stdin().read_line(&mut buf).is_err() {
                return Some(InputEvent::Exit);
            }
            if let Ok(n) = buf.trim().parse::<usize>() {
                if n >= 1 && n <= len {
                    return Some(InputEvent::ChoiceMade { index: n - 1 });
                }
            }
            println!("invalid");
        }
    }
}
