mod call_stack;
mod frame;
pub mod walk;

use std::sync::Arc;

use crate::command::{ChoiceOption, Command};
use crate::config::CoreConfig;
use crate::event::{InputEvent, MenuCategory, MenuId, OutputEvent};
use crate::menu::{self, MenuSet};
use crate::registry::SceneRegistry;
use crate::runtime::{AssetResolver, Ctx};
use call_stack::CallStack;
use frame::Frame;
use walk::{walk_command, NextAction, WaitKind};

#[derive(Clone)]
struct OpenMenu {
    id: usize,
    options: Vec<ChoiceOption>,
}

/// The command interpreter. Pulls commands from the scene registry one
/// at a time, suspends on user input and timers, and abandons every
/// enclosing block when a jump redirects the cursor to another scene.
#[derive(Clone)]
pub struct Executor {
    call_stack: CallStack,
    registry: Arc<SceneRegistry>,
    resolver: Arc<dyn AssetResolver>,
    cfg: CoreConfig,
    pending_choice: Option<Vec<ChoiceOption>>,
    wait: Option<WaitKind>,
    open_menus: Vec<OpenMenu>,
    global_menu: Vec<ChoiceOption>,
    next_menu_id: usize,
}

impl Executor {
    pub fn new(registry: Arc<SceneRegistry>, resolver: Arc<dyn AssetResolver>) -> Self {
        Self::with_config(registry, resolver, CoreConfig::default())
    }

    pub fn with_config(
        registry: Arc<SceneRegistry>,
        resolver: Arc<dyn AssetResolver>,
        cfg: CoreConfig,
    ) -> Self {
        Executor {
            call_stack: CallStack::default(),
            registry,
            resolver,
            cfg,
            pending_choice: None,
            wait: None,
            open_menus: Vec::new(),
            global_menu: Vec::new(),
            next_menu_id: 0,
        }
    }

    pub fn registry(&self) -> &Arc<SceneRegistry> {
        &self.registry
    }

    /// Current suspension, if any. The driver turns `Timer` waits into
    /// real sleeps; renderers answer `Advance` waits with user input.
    pub fn wait(&self) -> Option<&WaitKind> {
        self.wait.as_ref()
    }

    pub fn has_blocking_choice(&self) -> bool {
        self.pending_choice.is_some()
    }

    /// True while any overlay or global menu is still selectable, even
    /// after the command stream has drained.
    pub fn has_open_menus(&self) -> bool {
        !self.open_menus.is_empty() || !self.global_menu.is_empty()
    }

    pub fn is_idle(&self) -> bool {
        self.call_stack.is_empty() && self.wait.is_none() && self.pending_choice.is_none()
    }

    /// Scene-level cursor: (owning scene, command index) of the
    /// outermost block.
    pub fn root_frame(&self) -> Option<(&str, usize)> {
        self.call_stack.bottom().map(|f| (f.scene.as_str(), f.pc))
    }

    /// Begin a scene. A missing scene is logged and halts only this
    /// start attempt; whatever was running before is left untouched.
    pub fn start_scene(&mut self, ctx: &mut Ctx, name: &str) {
        let Some(block) = self.registry.get(name) else {
            log::error!("scene not found: '{}'", name);
            return;
        };
        // cancel any suspension belonging to the superseded scene so a
        // late advance cannot trigger twice
        self.wait = None;
        self.pending_choice = None;
        self.open_menus.clear();
        ctx.current_scene = Some(name.to_string());
        self.call_stack.clear();
        self.call_stack.push(Frame::new(name.to_string(), block, 0));
        log::info!("scene '{}' started", name);
    }

    /// Rebuild the stack at a saved position. Prefers the registry's
    /// block for the scene; a serialized block from the save file is
    /// used when the scene no longer exists.
    pub fn resume(&mut self, scene: &str, pc: usize, fallback: Option<Vec<Command>>) {
        let block = self
            .registry
            .get(scene)
            .or_else(|| fallback.map(|b| Arc::from(b.as_slice())));
        let Some(block) = block else {
            log::error!("cannot resume: scene '{}' is gone", scene);
            return;
        };
        self.wait = None;
        self.pending_choice = None;
        self.open_menus.clear();
        self.call_stack.clear();
        let pc = pc.min(block.len());
        self.call_stack.push(Frame::new(scene.to_string(), block, pc));
    }

    /// Process at most one command. Returns `false` once the stack has
    /// drained (an `End` event is queued); suspensions return `true`
    /// without touching the cursor.
    pub fn step(&mut self, ctx: &mut Ctx) -> bool {
        if self.wait.is_some() || self.pending_choice.is_some() {
            return true;
        }
        let Some(frame) = self.call_stack.top_mut() else {
            ctx.push(OutputEvent::End);
            return false;
        };
        let owner = frame.scene.clone();
        let pc = frame.pc;
        let Some(cmd) = frame.current().cloned() else {
            self.call_stack.pop();
            return true;
        };
        log::trace!("step: scene '{}' pc {}", owner, pc);

        let effect = walk_command(ctx, self.resolver.as_ref(), &self.cfg, &cmd);
        ctx.event_queue.extend(effect.events);

        match effect.next {
            NextAction::Continue => self.advance(),
            NextAction::Push(block) => {
                self.advance();
                self.call_stack.push(Frame::new(owner, block, 0));
            }
            NextAction::Jump(target) => {
                // one jump abandons every enclosing block at once
                self.call_stack.clear();
                self.clear_menus(ctx);
                self.start_scene(ctx, &target);
            }
            NextAction::ShowMenus(set) => self.open_menu_set(ctx, set),
            NextAction::Wait(kind) => self.wait = Some(kind),
        }
        true
    }

    /// Resume a suspension or resolve a selection. Events that arrive
    /// after their wait was superseded are ignored.
    pub fn feed(&mut self, ctx: &mut Ctx, ev: InputEvent) {
        match ev {
            InputEvent::Continue | InputEvent::TimerElapsed | InputEvent::MediaEnded => {
                if self.wait.take().is_some() {
                    self.advance();
                }
            }
            InputEvent::ChoiceMade { index } => {
                let Some(options) = self.pending_choice.take() else {
                    log::warn!("choice input with no blocking prompt open");
                    return;
                };
                let Some(option) = options.get(index) else {
                    log::warn!("choice index {} out of range", index);
                    self.pending_choice = Some(options);
                    return;
                };
                let action = option.action.clone();
                self.advance();
                self.push_block(ctx, action);
            }
            InputEvent::MenuChoiceMade { menu, index } => {
                let Some(pos) = self.open_menus.iter().position(|m| m.id == menu) else {
                    log::warn!("selection on unknown menu {}", menu);
                    return;
                };
                let opened = self.open_menus.remove(pos);
                let Some(option) = opened.options.get(index) else {
                    log::warn!("menu {} has no option {}", menu, index);
                    return;
                };
                // an overlay selection interrupts whatever the primary
                // block was waiting on; the interrupted command already
                // ran, so move the cursor past it
                let was_suspended = self.wait.take().is_some();
                let had_prompt = self.pending_choice.take().is_some();
                if was_suspended || had_prompt {
                    self.advance();
                }
                self.push_block(ctx, option.action.clone());
            }
            InputEvent::GlobalChoiceMade { index } => {
                let Some(option) = self.global_menu.get(index) else {
                    log::warn!("global menu has no option {}", index);
                    return;
                };
                let action = option.action.clone();
                // global selections are treated like a cross-scene jump
                // even when the action does not itself jump
                self.wait = None;
                self.pending_choice = None;
                self.call_stack.clear();
                self.clear_menus(ctx);
                self.push_block(ctx, action);
            }
            InputEvent::Exit => {
                self.call_stack.clear();
                self.wait = None;
                self.pending_choice = None;
                self.open_menus.clear();
                self.global_menu.clear();
            }
            InputEvent::AdvanceTime { .. }
            | InputEvent::SaveRequest { .. }
            | InputEvent::LoadRequest { .. } => {
                // driver-level requests, nothing to do here
            }
        }
    }

    /// Install the engine-level overlay (rendered as a side panel).
    /// Its selections always interrupt the running scene.
    pub fn set_global_menu(&mut self, ctx: &mut Ctx, options: Vec<ChoiceOption>) {
        let hour = ctx.time.hour;
        let visible: Vec<ChoiceOption> = options
            .into_iter()
            .filter(|o| crate::condition::evaluate(o.condition.as_ref(), &mut ctx.variables, hour))
            .collect();
        ctx.push(OutputEvent::ShowChoice {
            menu: MenuId::Global,
            category: MenuCategory::Menu,
            options: menu::option_views(&visible),
        });
        self.global_menu = visible;
    }

    fn open_menu_set(&mut self, ctx: &mut Ctx, set: MenuSet) {
        for (category, options) in set.overlays {
            let id = self.next_menu_id;
            self.next_menu_id += 1;
            ctx.push(OutputEvent::ShowChoice {
                menu: MenuId::Overlay(id),
                category,
                options: menu::option_views(&options),
            });
            self.open_menus.push(OpenMenu { id, options });
        }
        if set.blocking.is_empty() {
            // nothing holds the stream, move past the choice command
            self.advance();
        } else {
            ctx.push(OutputEvent::ShowChoice {
                menu: MenuId::Blocking,
                category: MenuCategory::Default,
                options: menu::option_views(&set.blocking),
            });
            self.pending_choice = Some(set.blocking);
        }
    }

    fn push_block(&mut self, ctx: &Ctx, block: Vec<Command>) {
        if block.is_empty() {
            return;
        }
        let scene = ctx.current_scene.clone().unwrap_or_default();
        self.call_stack.push(Frame::new(scene, Arc::from(block.as_slice()), 0));
    }

    fn clear_menus(&mut self, ctx: &mut Ctx) {
        self.open_menus.clear();
        ctx.push(OutputEvent::ClearMenus);
    }

    fn advance(&mut self) {
        if let Some(frame) = self.call_stack.top_mut() {
            frame.advance();
        }
    }
}
