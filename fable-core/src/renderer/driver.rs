use std::thread;
use std::time::{Duration, Instant};

use crate::event::{InputEvent, OutputEvent};
use crate::executor::walk::WaitKind;
use crate::executor::Executor;
use crate::renderer::Renderer;
use crate::runtime::Ctx;
use crate::storager::{self, SaveStore};

/// Owns the executor and pumps it against a renderer: step, drain
/// events, route the renderer's answers back in, and turn timer waits
/// into real sleeps. Save/load/time requests never reach the executor;
/// they are resolved here.
pub struct Driver<R: Renderer, S: SaveStore> {
    exe: Executor,
    renderer: R,
    store: S,
    advance_since: Option<Instant>,
}

impl<R: Renderer, S: SaveStore> Driver<R, S> {
    pub fn new(exe: Executor, renderer: R, store: S) -> Self {
        Driver { exe, renderer, store, advance_since: None }
    }

    pub fn executor(&self) -> &Executor {
        &self.exe
    }

    pub fn run(&mut self, ctx: &mut Ctx, start: &str) {
        self.exe.start_scene(ctx, start);
        loop {
            let running = self.exe.step(ctx);
            match self.exe.wait() {
                Some(WaitKind::Advance { .. }) => {
                    self.advance_since.get_or_insert_with(Instant::now);
                }
                _ => self.advance_since = None,
            }
            while let Some(out) = ctx.pop() {
                if let Some(input) = self.renderer.render(&out, ctx) {
                    self.dispatch(ctx, input);
                }
            }
            if !running {
                // a drained stream with menus still up is a hub screen,
                // not the end of the game
                if !self.exe.has_open_menus() {
                    return;
                }
                match self.renderer.prompt(ctx) {
                    Some(input) => self.dispatch(ctx, input),
                    None => return,
                }
                continue;
            }
            match self.exe.wait().cloned() {
                Some(WaitKind::Timer(ms)) => {
                    thread::sleep(Duration::from_millis(ms));
                    self.exe.feed(ctx, InputEvent::TimerElapsed);
                }
                Some(WaitKind::Advance { min_ms }) => {
                    // the renderer consumed the prompting event without
                    // resolving the wait; count that as an advance so
                    // the stream never hangs
                    self.hold_minimum(min_ms);
                    self.exe.feed(ctx, InputEvent::Continue);
                }
                None => {}
            }
        }
    }

    fn dispatch(&mut self, ctx: &mut Ctx, ev: InputEvent) {
        match ev {
            InputEvent::SaveRequest { slot } => self.quick_save(ctx, &slot),
            InputEvent::LoadRequest { slot } => self.quick_load(ctx, &slot),
            InputEvent::AdvanceTime { hours } => {
                ctx.time.advance(hours);
                ctx.push(OutputEvent::TimeChanged {
                    display: format!(
                        "{} | Day {} ({}) | {}",
                        ctx.time.formatted_hour(),
                        ctx.time.day,
                        ctx.time.weekday,
                        ctx.time.season
                    ),
                });
                // the clock moving restarts the current scene so
                // time-gated content re-evaluates
                if let Some(scene) = ctx.current_scene.clone() {
                    ctx.push(OutputEvent::ClearMenus);
                    self.exe.start_scene(ctx, &scene);
                }
            }
            ev @ (InputEvent::Continue | InputEvent::MediaEnded) => {
                // a line stays up for its minimum display time even
                // when the advance arrives early
                if let Some(WaitKind::Advance { min_ms }) = self.exe.wait().cloned() {
                    self.hold_minimum(min_ms);
                }
                self.exe.feed(ctx, ev);
            }
            other => self.exe.feed(ctx, other),
        }
    }

    fn hold_minimum(&mut self, min_ms: u64) {
        if let Some(opened) = self.advance_since.take() {
            let min = Duration::from_millis(min_ms);
            let shown = opened.elapsed();
            if shown < min {
                thread::sleep(min - shown);
            }
        }
    }

    pub fn quick_save(&mut self, ctx: &mut Ctx, slot: &str) {
        let snapshot = storager::capture_game_state(ctx, &self.exe);
        match self.store.save(slot, &snapshot) {
            Ok(()) => log::info!("saved slot '{}'", slot),
            Err(e) => log::error!("save to slot '{}' failed: {:#}", slot, e),
        }
    }

    pub fn quick_load(&mut self, ctx: &mut Ctx, slot: &str) {
        match self.store.load(slot) {
            Some(snapshot) => {
                ctx.push(OutputEvent::ClearMenus);
                storager::restore_game_state(ctx, &mut self.exe, snapshot);
            }
            None => log::warn!("no save in slot '{}'", slot),
        }
    }
}
