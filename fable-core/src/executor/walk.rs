use std::sync::Arc;

use crate::command::Command;
use crate::condition;
use crate::config::CoreConfig;
use crate::event::{AudioChannel, OutputEvent};
use crate::menu::{self, MenuSet};
use crate::runtime::ctx::AudioState;
use crate::runtime::{assets, AssetResolver, Ctx, DialogueRecord};

#[derive(Debug, Clone)]
pub struct CommandEffect {
    pub events: Vec<OutputEvent>,
    pub next: NextAction,
}

#[derive(Debug, Clone)]
pub enum NextAction {
    Continue,
    /// Enter a nested then/else block.
    Push(Arc<[Command]>),
    Jump(String),
    /// Render the partitioned choice groups; blocks only if the
    /// default group is non-empty.
    ShowMenus(MenuSet),
    Wait(WaitKind),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WaitKind {
    /// Suspend until a user-advance (or media completion counted as
    /// one), but never before `min_ms` has passed on screen.
    Advance { min_ms: u64 },
    /// Fixed-duration suspension, no cancellation.
    Timer(u64),
}

pub fn walk_command(
    ctx: &mut Ctx,
    resolver: &dyn AssetResolver,
    cfg: &CoreConfig,
    cmd: &Command,
) -> CommandEffect {
    log::trace!("walk_command: {:?}", cmd);
    let mut events = Vec::new();
    let next = match cmd {
        Command::Say { speaker, text, voice, is_female } => {
            ctx.history.push(DialogueRecord {
                speaker: speaker.clone(),
                text: text.clone(),
            });
            if let Some(path) = voice {
                events.push(OutputEvent::PlayAudio {
                    channel: AudioChannel::Voice,
                    path: path.clone(),
                    volume: cfg.audio.voice_volume,
                    looping: false,
                });
            }
            events.push(OutputEvent::ShowDialogue {
                speaker: speaker.clone(),
                text: text.clone(),
                is_female: *is_female,
            });
            NextAction::Wait(WaitKind::Advance { min_ms: cfg.stage.say_min_wait_ms })
        }
        Command::Show { who, image, position } => {
            let url = resolver.resolve(image, &cfg.stage.image_exts);
            if url.is_none() {
                log::warn!("no asset found for sprite '{}'", image);
            }
            ctx.active_characters.insert(who.clone());
            events.push(OutputEvent::ShowSprite {
                who: who.clone(),
                url,
                position: *position,
            });
            NextAction::Wait(WaitKind::Timer(cfg.stage.transition_ms))
        }
        Command::Hide { who } => {
            if ctx.active_characters.remove(who) {
                events.push(OutputEvent::HideSprite { who: who.clone() });
                NextAction::Wait(WaitKind::Timer(cfg.stage.transition_ms))
            } else {
                NextAction::Continue
            }
        }
        Command::Scene { image, video, audio, affected_by_time, loop_audio, loop_video } => {
            if ctx.ambient_audio.take().is_some() {
                events.push(OutputEvent::StopAudio { channel: AudioChannel::Ambient });
            }
            ctx.active_characters.clear();
            events.push(OutputEvent::HideAllSprites);

            if let Some(path) = audio {
                ctx.ambient_audio = Some(AudioState {
                    path: path.clone(),
                    looping: *loop_audio,
                });
                events.push(OutputEvent::PlayAudio {
                    channel: AudioChannel::Ambient,
                    path: path.clone(),
                    volume: cfg.audio.master_volume,
                    looping: *loop_audio,
                });
            }

            let mut url = None;
            let mut is_video = false;
            if let Some(v) = video {
                url = resolver.resolve(v, &cfg.stage.video_exts);
                is_video = url.is_some();
                if url.is_none() {
                    log::warn!("no playable video for background '{}'", v);
                }
            }
            if !is_video {
                if let Some(img) = image {
                    if *affected_by_time {
                        let suffixed = assets::apply_time_suffix(img, ctx.time.suffix());
                        url = resolver.resolve(&suffixed, &cfg.stage.image_exts);
                    }
                    if url.is_none() {
                        url = resolver.resolve(img, &cfg.stage.image_exts);
                    }
                    if url.is_none() {
                        log::warn!("no asset found for background '{}'", img);
                    }
                }
            }
            events.push(OutputEvent::SetBackground {
                url,
                is_video,
                looping: *loop_video,
            });

            if is_video {
                // video backgrounds hold the stream for a user-advance
                NextAction::Wait(WaitKind::Advance { min_ms: cfg.stage.transition_ms })
            } else {
                NextAction::Wait(WaitKind::Timer(cfg.stage.transition_ms))
            }
        }
        Command::Audio { path, looping } => {
            if ctx.ambient_audio.take().is_some() {
                events.push(OutputEvent::StopAudio { channel: AudioChannel::Ambient });
            }
            ctx.ambient_audio = Some(AudioState {
                path: path.clone(),
                looping: *looping,
            });
            events.push(OutputEvent::PlayAudio {
                channel: AudioChannel::Ambient,
                path: path.clone(),
                volume: cfg.audio.master_volume,
                looping: *looping,
            });
            NextAction::Continue
        }
        Command::Choice { options } => {
            let hour = ctx.time.hour;
            NextAction::ShowMenus(menu::resolve_menus(options, &mut ctx.variables, hour))
        }
        Command::Set { var, value } => {
            ctx.variables.insert(var.clone(), value.clone());
            NextAction::Continue
        }
        Command::If { condition, then_block, else_block } => {
            let hour = ctx.time.hour;
            let block = if condition::evaluate(Some(condition), &mut ctx.variables, hour) {
                then_block
            } else {
                else_block
            };
            if block.is_empty() {
                NextAction::Continue
            } else {
                NextAction::Push(Arc::from(block.as_slice()))
            }
        }
        Command::Jump { target } => NextAction::Jump(target.clone()),
        Command::Wait { duration_ms } => NextAction::Wait(WaitKind::Timer(*duration_ms)),
        Command::Deferred { producer } => {
            return match producer.call(ctx) {
                Some(inner) => walk_command(ctx, resolver, cfg, &inner),
                None => {
                    log::trace!("deferred command yielded nothing, skipping");
                    CommandEffect { events, next: NextAction::Continue }
                }
            };
        }
    };
    CommandEffect { events, next }
}
