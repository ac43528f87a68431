use std::sync::Arc;

use fable_core::command::{ChoiceOption, Command, MenuKind, Position};
use fable_core::condition::{CmpOp, Condition};
use fable_core::event::{AudioChannel, InputEvent, MenuCategory, MenuId, OutputEvent};
use fable_core::executor::walk::WaitKind;
use fable_core::executor::Executor;
use fable_core::registry::SceneRegistry;
use fable_core::runtime::{AssetResolver, Ctx, NullResolver};
use fable_core::storager;

fn engine(scenes: Vec<(&str, Vec<Command>)>) -> (Ctx, Executor) {
    engine_with(scenes, Arc::new(NullResolver))
}

fn engine_with(
    scenes: Vec<(&str, Vec<Command>)>,
    resolver: Arc<dyn AssetResolver>,
) -> (Ctx, Executor) {
    let mut registry = SceneRegistry::new();
    for (name, block) in scenes {
        registry.define(name, block);
    }
    (Ctx::default(), Executor::new(Arc::new(registry), resolver))
}

/// Step until the engine goes idle or a blocking choice opens,
/// auto-resuming every wait. Returns everything that was rendered.
fn pump(exe: &mut Executor, ctx: &mut Ctx) -> Vec<OutputEvent> {
    let mut events = Vec::new();
    loop {
        let running = exe.step(ctx);
        events.extend(ctx.drain());
        if exe.has_blocking_choice() {
            return events;
        }
        if exe.wait().is_some() {
            exe.feed(ctx, InputEvent::Continue);
            continue;
        }
        if !running {
            return events;
        }
    }
}

fn num(ctx: &Ctx, var: &str) -> Option<f64> {
    ctx.variables.get(var).map(|v| v.as_num())
}

#[test]
fn jump_abandons_every_enclosing_block() {
    let (mut ctx, mut exe) = engine(vec![
        (
            "A",
            vec![
                Command::set("x", 1),
                Command::branch(
                    Condition::var("x", CmpOp::Eq, 1),
                    vec![Command::jump("B"), Command::set("inner", 99)],
                    vec![],
                ),
                Command::set("after", 99),
            ],
        ),
        ("B", vec![Command::set("b", 1)]),
    ]);

    exe.start_scene(&mut ctx, "A");
    pump(&mut exe, &mut ctx);

    assert_eq!(ctx.current_scene.as_deref(), Some("B"));
    assert_eq!(num(&ctx, "b"), Some(1.0));
    assert_eq!(num(&ctx, "inner"), None, "command after jump must not run");
    assert_eq!(num(&ctx, "after"), None, "outer block must be abandoned");
}

#[test]
fn else_block_runs_when_condition_fails() {
    let (mut ctx, mut exe) = engine(vec![(
        "S",
        vec![Command::branch(
            Condition::var("flag", CmpOp::Gt, 0),
            vec![Command::set("then", 1)],
            vec![Command::set("else", 1)],
        )],
    )]);

    exe.start_scene(&mut ctx, "S");
    pump(&mut exe, &mut ctx);

    assert_eq!(num(&ctx, "then"), None);
    assert_eq!(num(&ctx, "else"), Some(1.0));
    // touching "flag" in the condition pinned it to 0
    assert_eq!(num(&ctx, "flag"), Some(0.0));
}

#[test]
fn blocking_choice_runs_only_the_selected_action() {
    let (mut ctx, mut exe) = engine(vec![(
        "S",
        vec![
            Command::choice(vec![
                ChoiceOption::new("left", vec![Command::set("a", 1)]),
                ChoiceOption::new("right", vec![Command::set("b", 1)]),
            ]),
            Command::set("done", 1),
        ],
    )]);

    exe.start_scene(&mut ctx, "S");
    let events = pump(&mut exe, &mut ctx);

    let prompts: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, OutputEvent::ShowChoice { menu: MenuId::Blocking, .. }))
        .collect();
    assert_eq!(prompts.len(), 1, "exactly one blocking prompt");
    assert!(exe.has_blocking_choice());
    assert_eq!(num(&ctx, "done"), None, "stream held until a selection");

    exe.feed(&mut ctx, InputEvent::ChoiceMade { index: 1 });
    pump(&mut exe, &mut ctx);

    assert_eq!(num(&ctx, "a"), None);
    assert_eq!(num(&ctx, "b"), Some(1.0));
    assert_eq!(num(&ctx, "done"), Some(1.0));
}

#[test]
fn out_of_range_selection_keeps_the_prompt_open() {
    let (mut ctx, mut exe) = engine(vec![(
        "S",
        vec![Command::choice(vec![ChoiceOption::new(
            "only",
            vec![Command::set("a", 1)],
        )])],
    )]);

    exe.start_scene(&mut ctx, "S");
    pump(&mut exe, &mut ctx);
    exe.feed(&mut ctx, InputEvent::ChoiceMade { index: 5 });
    assert!(exe.has_blocking_choice());

    exe.feed(&mut ctx, InputEvent::ChoiceMade { index: 0 });
    pump(&mut exe, &mut ctx);
    assert_eq!(num(&ctx, "a"), Some(1.0));
}

#[test]
fn overlay_menus_do_not_hold_the_stream() {
    let (mut ctx, mut exe) = engine(vec![(
        "S",
        vec![
            Command::choice(vec![
                ChoiceOption::new("tab", vec![Command::set("t", 1)]).menu(MenuKind::Tab),
                ChoiceOption::new("placed", vec![Command::set("p", 1)]).at(10.0, 80.0),
            ]),
            Command::set("done", 1),
        ],
    )]);

    exe.start_scene(&mut ctx, "S");
    let events = pump(&mut exe, &mut ctx);

    assert_eq!(num(&ctx, "done"), Some(1.0), "overlays never block");
    assert_eq!(num(&ctx, "t"), None);

    let overlay_categories: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            OutputEvent::ShowChoice { menu: MenuId::Overlay(_), category, .. } => Some(*category),
            _ => None,
        })
        .collect();
    assert_eq!(overlay_categories, vec![MenuCategory::Tab, MenuCategory::Positioned]);

    // a late selection on the still-open overlay executes its action
    exe.feed(&mut ctx, InputEvent::MenuChoiceMade { menu: 0, index: 0 });
    pump(&mut exe, &mut ctx);
    assert_eq!(num(&ctx, "t"), Some(1.0));
}

#[test]
fn overlay_selection_interrupts_a_pending_wait() {
    let (mut ctx, mut exe) = engine(vec![
        (
            "Day",
            vec![
                Command::choice(vec![
                    ChoiceOption::new("go out", vec![Command::jump("Night")]).menu(MenuKind::Floating),
                ]),
                Command::narrate("a long line"),
                Command::set("after", 1),
            ],
        ),
        ("Night", vec![Command::set("night", 1)]),
    ]);

    exe.start_scene(&mut ctx, "Day");
    exe.step(&mut ctx); // choice: overlay opens, stream continues
    exe.step(&mut ctx); // narrate: suspends on advance
    assert!(matches!(exe.wait(), Some(WaitKind::Advance { .. })));

    exe.feed(&mut ctx, InputEvent::MenuChoiceMade { menu: 0, index: 0 });
    pump(&mut exe, &mut ctx);

    assert_eq!(ctx.current_scene.as_deref(), Some("Night"));
    assert_eq!(num(&ctx, "night"), Some(1.0));
    assert_eq!(num(&ctx, "after"), None, "interrupted scene never resumes");
}

#[test]
fn overlay_selection_resumes_after_the_interrupted_command() {
    let (mut ctx, mut exe) = engine(vec![(
        "S",
        vec![
            Command::choice(vec![
                ChoiceOption::new("peek", vec![Command::set("peeked", 1)])
                    .menu(MenuKind::Floating),
            ]),
            Command::narrate("a held line"),
            Command::set("after", 1),
        ],
    )]);

    exe.start_scene(&mut ctx, "S");
    exe.step(&mut ctx); // overlay opens, stream continues
    exe.step(&mut ctx); // narrate suspends
    assert_eq!(ctx.history.len(), 1);

    exe.feed(&mut ctx, InputEvent::MenuChoiceMade { menu: 0, index: 0 });
    pump(&mut exe, &mut ctx);

    assert_eq!(num(&ctx, "peeked"), Some(1.0));
    assert_eq!(ctx.history.len(), 1, "the interrupted line must not replay");
    assert_eq!(num(&ctx, "after"), Some(1.0), "the block picks up at the next command");
}

#[test]
fn overlay_selection_discards_an_open_blocking_prompt() {
    let (mut ctx, mut exe) = engine(vec![(
        "S",
        vec![
            Command::choice(vec![
                ChoiceOption::new("stay", vec![Command::set("stayed", 1)]),
                ChoiceOption::new("leave", vec![Command::set("left", 1)])
                    .menu(MenuKind::Floating),
            ]),
            Command::set("after", 1),
        ],
    )]);

    exe.start_scene(&mut ctx, "S");
    pump(&mut exe, &mut ctx);
    assert!(exe.has_blocking_choice());

    exe.feed(&mut ctx, InputEvent::MenuChoiceMade { menu: 0, index: 0 });
    pump(&mut exe, &mut ctx);

    assert!(!exe.has_blocking_choice());
    assert_eq!(num(&ctx, "left"), Some(1.0));
    assert_eq!(num(&ctx, "stayed"), None);
    assert_eq!(num(&ctx, "after"), Some(1.0));
}

#[test]
fn hidden_options_never_render() {
    let (mut ctx, mut exe) = engine(vec![(
        "S",
        vec![Command::choice(vec![
            ChoiceOption::new("always", vec![]),
            ChoiceOption::new("gated", vec![]).when(Condition::var("seen", CmpOp::Gt, 0)),
        ])],
    )]);

    exe.start_scene(&mut ctx, "S");
    let events = pump(&mut exe, &mut ctx);

    let options: Vec<_> = events
        .iter()
        .find_map(|e| match e {
            OutputEvent::ShowChoice { menu: MenuId::Blocking, options, .. } => Some(options.clone()),
            _ => None,
        })
        .expect("blocking prompt rendered");
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].text, "always");
}

#[test]
fn global_menu_selection_interrupts_like_a_jump() {
    let (mut ctx, mut exe) = engine(vec![
        ("A", vec![Command::narrate("talking..."), Command::set("after", 1)]),
        ("Map", vec![Command::set("map", 1)]),
    ]);

    exe.set_global_menu(
        &mut ctx,
        vec![ChoiceOption::new("To the map", vec![Command::jump("Map")])],
    );
    exe.start_scene(&mut ctx, "A");
    exe.step(&mut ctx);
    assert!(exe.wait().is_some());

    exe.feed(&mut ctx, InputEvent::GlobalChoiceMade { index: 0 });
    pump(&mut exe, &mut ctx);

    assert_eq!(ctx.current_scene.as_deref(), Some("Map"));
    assert_eq!(num(&ctx, "map"), Some(1.0));
    assert_eq!(num(&ctx, "after"), None);
}

#[test]
fn missing_scene_is_logged_not_fatal() {
    let (mut ctx, mut exe) = engine(vec![("real", vec![Command::set("ok", 1)])]);

    exe.start_scene(&mut ctx, "nope");
    assert!(exe.is_idle());
    assert_eq!(ctx.current_scene, None);

    exe.start_scene(&mut ctx, "real");
    pump(&mut exe, &mut ctx);
    assert_eq!(num(&ctx, "ok"), Some(1.0));
}

#[test]
fn jump_to_missing_scene_halts_the_block_only() {
    let (mut ctx, mut exe) = engine(vec![(
        "A",
        vec![Command::jump("nowhere"), Command::set("after", 1)],
    )]);

    exe.start_scene(&mut ctx, "A");
    pump(&mut exe, &mut ctx);

    assert_eq!(num(&ctx, "after"), None);
    assert!(exe.is_idle());
    // the engine is still usable afterwards
    assert_eq!(ctx.current_scene.as_deref(), Some("A"));
}

#[test]
fn say_appends_history_and_waits() {
    let (mut ctx, mut exe) = engine(vec![(
        "S",
        vec![Command::say("Dana", "Hello."), Command::narrate("Silence.")],
    )]);

    exe.start_scene(&mut ctx, "S");
    exe.step(&mut ctx);
    assert!(matches!(
        exe.wait(),
        Some(WaitKind::Advance { min_ms: 1000 })
    ));
    exe.feed(&mut ctx, InputEvent::Continue);
    exe.step(&mut ctx);

    assert_eq!(ctx.history.len(), 2);
    assert_eq!(ctx.history[0].speaker.as_deref(), Some("Dana"));
    assert_eq!(ctx.history[1].speaker, None);
}

#[test]
fn stale_advance_after_scene_start_is_ignored() {
    let (mut ctx, mut exe) = engine(vec![
        ("A", vec![Command::narrate("line one"), Command::set("a2", 1)]),
        ("B", vec![Command::narrate("other"), Command::set("b2", 1)]),
    ]);

    exe.start_scene(&mut ctx, "A");
    exe.step(&mut ctx); // suspended on the narration
    exe.start_scene(&mut ctx, "B"); // supersedes the pending listener

    // the old listener firing late must not advance scene B's cursor
    exe.feed(&mut ctx, InputEvent::Continue);
    assert_eq!(exe.root_frame(), Some(("B", 0)));
}

#[test]
fn deferred_commands_skip_or_dispatch() {
    let (mut ctx, mut exe) = engine(vec![(
        "S",
        vec![
            Command::deferred(|_| None),
            Command::deferred(|ctx| {
                if ctx.variables.contains_key("never") {
                    Some(Command::jump("nowhere"))
                } else {
                    Some(Command::set("produced", 7))
                }
            }),
            Command::set("done", 1),
        ],
    )]);

    exe.start_scene(&mut ctx, "S");
    pump(&mut exe, &mut ctx);

    assert_eq!(num(&ctx, "produced"), Some(7.0));
    assert_eq!(num(&ctx, "done"), Some(1.0));
}

#[test]
fn scene_command_resets_stage_and_audio() {
    let (mut ctx, mut exe) = engine(vec![(
        "S",
        vec![
            Command::show("Dana", "Character/dana_normal", Position::Center),
            Command::audio("bgm/town"),
            Command::scene("bg/house"),
        ],
    )]);

    exe.start_scene(&mut ctx, "S");
    let events = pump(&mut exe, &mut ctx);

    assert!(ctx.active_characters.is_empty());
    assert!(ctx.ambient_audio.is_none());
    assert!(events.contains(&OutputEvent::StopAudio { channel: AudioChannel::Ambient }));
    assert!(events.contains(&OutputEvent::HideAllSprites));
}

#[test]
fn video_background_waits_for_advance() {
    let (mut ctx, mut exe) = engine(vec![(
        "S",
        vec![Command::video_scene("intro"), Command::set("x", 1)],
    )]);

    exe.start_scene(&mut ctx, "S");
    exe.step(&mut ctx);
    assert!(matches!(exe.wait(), Some(WaitKind::Advance { .. })));
    let events = ctx.drain();
    assert!(events
        .iter()
        .any(|e| matches!(e, OutputEvent::SetBackground { is_video: true, .. })));

    exe.feed(&mut ctx, InputEvent::Continue);
    pump(&mut exe, &mut ctx);
    assert_eq!(num(&ctx, "x"), Some(1.0));
}

/// Resolver backed by a fixed file list, for exercising extension and
/// time-suffix probing without a filesystem.
struct FixedResolver(Vec<&'static str>);

impl AssetResolver for FixedResolver {
    fn resolve(&self, base: &str, exts: &[String]) -> Option<String> {
        if self.0.contains(&base) {
            return Some(base.to_string());
        }
        for ext in exts {
            let candidate = format!("{}.{}", base, ext);
            if self.0.iter().any(|f| *f == candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

#[test]
fn timed_background_prefers_the_suffixed_asset() {
    let (mut ctx, mut exe) = engine_with(
        vec![("S", vec![Command::timed_scene("bg/park")])],
        Arc::new(FixedResolver(vec!["bg/park_night.png", "bg/park.png"])),
    );
    ctx.time.hour = 22;

    exe.start_scene(&mut ctx, "S");
    let events = pump(&mut exe, &mut ctx);

    assert!(events.iter().any(|e| matches!(
        e,
        OutputEvent::SetBackground { url: Some(u), is_video: false, .. } if u == "bg/park_night.png"
    )));
}

#[test]
fn timed_background_falls_back_to_the_plain_asset() {
    let (mut ctx, mut exe) = engine_with(
        vec![("S", vec![Command::timed_scene("bg/park")])],
        Arc::new(FixedResolver(vec!["bg/park.png"])),
    );
    ctx.time.hour = 22;

    exe.start_scene(&mut ctx, "S");
    let events = pump(&mut exe, &mut ctx);

    assert!(events.iter().any(|e| matches!(
        e,
        OutputEvent::SetBackground { url: Some(u), .. } if u == "bg/park.png"
    )));
}

#[test]
fn unresolved_background_degrades_to_none() {
    let (mut ctx, mut exe) = engine_with(
        vec![("S", vec![Command::scene("bg/gone"), Command::set("x", 1)])],
        Arc::new(FixedResolver(vec![])),
    );

    exe.start_scene(&mut ctx, "S");
    let events = pump(&mut exe, &mut ctx);

    assert!(events
        .iter()
        .any(|e| matches!(e, OutputEvent::SetBackground { url: None, .. })));
    assert_eq!(num(&ctx, "x"), Some(1.0), "the block keeps going");
}

#[test]
fn snapshot_roundtrip_restores_the_game() {
    let scenes = vec![(
        "S",
        vec![
            Command::set("x", 5),
            Command::show("Dana", "Character/dana_normal", Position::Left),
            Command::say("Dana", "Don't forget me."),
            Command::set("later", 1),
        ],
    )];
    let (mut ctx, mut exe) = engine(scenes.clone());

    exe.start_scene(&mut ctx, "S");
    exe.step(&mut ctx); // set
    exe.step(&mut ctx); // show (timer wait)
    exe.feed(&mut ctx, InputEvent::TimerElapsed);
    exe.step(&mut ctx); // say (advance wait)
    ctx.drain();
    assert_eq!(exe.root_frame(), Some(("S", 2)));

    let snapshot = storager::capture_game_state(&ctx, &exe);
    let json = serde_json::to_string(&snapshot).unwrap();
    let snapshot = serde_json::from_str(&json).unwrap();

    let (mut ctx2, mut exe2) = engine(scenes);
    storager::restore_game_state(&mut ctx2, &mut exe2, snapshot);

    assert_eq!(ctx2.variables, ctx.variables);
    assert_eq!(ctx2.history, ctx.history);
    assert_eq!(ctx2.current_scene, ctx.current_scene);
    assert_eq!(ctx2.active_characters, ctx.active_characters);
    assert_eq!(exe2.root_frame(), Some(("S", 2)));

    // play on from the restored cursor
    pump(&mut exe2, &mut ctx2);
    assert_eq!(num(&ctx2, "later"), Some(1.0));
}

#[test]
fn start_scene_scenario_from_the_main_menu() {
    let (mut ctx, mut exe) = engine(vec![
        (
            "start",
            vec![
                Command::scene("Scene/main_background"),
                Command::choice(vec![ChoiceOption::new(
                    "New Game",
                    vec![Command::jump("Map")],
                )]),
            ],
        ),
        ("Map", vec![Command::narrate("The town spreads out below.")]),
    ]);

    exe.start_scene(&mut ctx, "start");

    exe.step(&mut ctx);
    let events = ctx.drain();
    assert!(events.iter().any(|e| matches!(
        e,
        OutputEvent::SetBackground { url: Some(u), .. } if u == "Scene/main_background"
    )));
    exe.feed(&mut ctx, InputEvent::TimerElapsed);

    exe.step(&mut ctx);
    assert!(exe.has_blocking_choice());

    exe.feed(&mut ctx, InputEvent::ChoiceMade { index: 0 });
    exe.step(&mut ctx); // the action block's jump

    assert_eq!(ctx.current_scene.as_deref(), Some("Map"));
    assert_eq!(exe.root_frame(), Some(("Map", 0)));

    pump(&mut exe, &mut ctx);
    assert_eq!(ctx.history.last().unwrap().text, "The town spreads out below.");
}
