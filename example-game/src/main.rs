use std::sync::Arc;

use fable_core::command::{ChoiceOption, Command, MenuKind, Position};
use fable_core::condition::{CmpOp, Condition};
use fable_core::config::{CoreConfig, SystemConfig};
use fable_core::registry::SceneRegistry;
use fable_core::renderer::driver::Driver;
use fable_core::runtime::{Character, Ctx, DirResolver};
use fable_core::storager::FileStore;
use fable_core::{Executor, TerminalRenderer};

fn cast() -> (Character, Character) {
    let dana = Character::new("Dana")
        .female()
        .sprite("Normal", "Character/dana_normal")
        .sprite("Happy", "Character/dana_happy")
        .sprite("Hungry", "Character/dana_hungry")
        .stat("friendship", 0.0);
    let heero = Character::new("Heero")
        .sprite("Normal", "Character/heero_normal")
        .sprite("Happy", "Character/heero_happy");
    (dana, heero)
}

/// Side panel available everywhere. Save, load and time skips are typed
/// at any prompt (`:save 1`, `:load 1`, `:time 4`).
fn global_menu() -> Vec<ChoiceOption> {
    vec![
        ChoiceOption::new("Options", vec![Command::jump("OptionsMenu")])
            .icon("Icons/icon_patchnote"),
        ChoiceOption::new("Back to title", vec![Command::jump("start")])
            .icon("Icons/icon_mainmenu"),
    ]
}

fn home_menu() -> Vec<ChoiceOption> {
    vec![
        ChoiceOption::new("Bedroom", vec![Command::jump("Bedroom")])
            .menu(MenuKind::Floating)
            .icon("Icons/home/myroom_day"),
        ChoiceOption::new("Kitchen", vec![Command::jump("Kitchen")])
            .menu(MenuKind::Floating)
            .icon("Icons/home/kitchen_day"),
        ChoiceOption::new("Backyard", vec![Command::jump("Backyard")])
            .menu(MenuKind::Floating)
            .icon("Icons/home/yard_day"),
        ChoiceOption::new("Go back", vec![Command::jump("MainMap")])
            .menu(MenuKind::Floating)
            .icon("Icons/icon_back"),
    ]
}

fn define_scenes(registry: &mut SceneRegistry) {
    let (dana, heero) = cast();

    registry.define(
        "start",
        vec![
            Command::scene("Scene/main_background"),
            Command::menu(
                vec![
                    ChoiceOption::new("New Game", vec![Command::jump("MainMap")]),
                    ChoiceOption::new(
                        "Load",
                        vec![Command::narrate("Type :load <slot> at any prompt.")],
                    ),
                    ChoiceOption::new("Options", vec![Command::jump("OptionsMenu")]),
                ],
                MenuKind::Menu,
            ),
        ],
    );

    registry.define(
        "OptionsMenu",
        vec![
            Command::scene("Scene/menu_options"),
            Command::narrate("Nothing to tweak yet."),
            Command::jump("start"),
        ],
    );

    // town overview; the only open location for now is home
    registry.define(
        "MainMap",
        vec![
            Command::Scene {
                image: Some("Scene/home_menu".into()),
                video: None,
                audio: Some("Audio/backyard_ambience".into()),
                affected_by_time: true,
                loop_audio: true,
                loop_video: true,
            },
            Command::choice(vec![ChoiceOption::new("Home", vec![Command::jump("house_history")])
                .icon("Icons/icon_mansion")
                .at(50.0, 50.0)]),
        ],
    );

    // fires once from the map, then hands over to the hub
    registry.define(
        "house_history",
        vec![Command::branch(
            Condition::var("DanaFriendshipLevel", CmpOp::Eq, 0),
            vec![
                Command::scene("Scene/home/home_day"),
                Command::say("You", "I'm home!"),
                dana.show("Normal", Position::Center),
                dana.say("What are you doing here? You should be in school."),
                dana.show("Normal", Position::Right),
                heero.show("Normal", Position::Left),
                Command::say("You", "I didn't feel like sitting through class."),
                Command::set("DanaFriendshipLevel", 1),
                dana.say("Ok."),
                Command::jump("Home"),
            ],
            vec![Command::jump("Home")],
        )],
    );

    registry.define(
        "Dana_Home_0",
        vec![
            Command::scene_with_audio("Scene/home/home_day", "Audio/house_ambience"),
            dana.show("Happy", Position::Center),
            dana.say("Wasting time again?"),
            Command::choice(vec![
                ChoiceOption::new("Apologize", vec![Command::set("DanaFriendshipLevel", 2)]),
                ChoiceOption::new("Laugh", vec![dana.say("It's not funny.")]),
            ]),
            Command::jump("Home"),
        ],
    );

    // hub scene: an encounter roll, then the room menu stays open
    let heero_bored = heero.say("There's nothing going on here.");
    registry.define(
        "Home",
        vec![
            Command::Scene {
                image: Some("Scene/home/home_day".into()),
                video: None,
                audio: Some("Audio/house_ambience".into()),
                affected_by_time: true,
                loop_audio: true,
                loop_video: true,
            },
            Command::deferred(move |ctx| {
                let visits = ctx
                    .variables
                    .entry("home_visits".into())
                    .or_insert(0.into())
                    .as_num()
                    + 1.0;
                ctx.variables.insert("home_visits".into(), visits.into());
                if visits as u64 % 4 == 0 {
                    Some(Command::jump("Dana_Home_0"))
                } else {
                    Some(heero_bored.clone())
                }
            }),
            Command::narrate("You're home. Where to?"),
            Command::choice(home_menu()),
        ],
    );

    registry.define(
        "Bedroom",
        vec![
            Command::timed_scene("Scene/home/bedroom"),
            Command::narrate("Your room. The bed looks tempting."),
            Command::jump("Home"),
        ],
    );

    registry.define(
        "Kitchen",
        vec![
            Command::timed_scene("Scene/home/kitchen"),
            Command::when(
                Condition::time(CmpOp::Ge, 20),
                vec![dana.show("Hungry", Position::Center), dana.say("Late snack?")],
            ),
            Command::narrate("The kitchen is spotless."),
            Command::jump("Home"),
        ],
    );

    registry.define(
        "Backyard",
        vec![
            Command::timed_scene("Scene/home/yard"),
            Command::narrate("A quiet evening breeze."),
            Command::jump("Home"),
        ],
    );
}

fn main() {
    if let Err(e) = fable_shared::config::init("config.toml") {
        eprintln!("config: {:#}", e);
    }
    let system: SystemConfig = fable_shared::config::get("system");
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&system.log_level),
    )
    .init();

    let mut registry = SceneRegistry::new();
    define_scenes(&mut registry);

    let mut exe = Executor::with_config(
        Arc::new(registry),
        Arc::new(DirResolver::new(&system.assets_path)),
        CoreConfig::from_shared(),
    );
    let store = FileStore::new(&system.save_path);

    let mut ctx = Ctx::default();
    exe.set_global_menu(&mut ctx, global_menu());
    let mut driver = Driver::new(exe, TerminalRenderer, store);
    driver.run(&mut ctx, "start");
    log::info!("game over");
}
