use crate::command::{ChoiceOption, MenuKind, Variables};
use crate::condition;
use crate::event::{MenuCategory, OptionView};

/// Result of partitioning a `choice` command: overlay groups render
/// without suspending the stream; only the blocking group (centered
/// stack) holds the cursor until a selection arrives.
#[derive(Debug, Clone, Default)]
pub struct MenuSet {
    pub overlays: Vec<(MenuCategory, Vec<ChoiceOption>)>,
    pub blocking: Vec<ChoiceOption>,
}

fn category_of(option: &ChoiceOption) -> MenuCategory {
    match option.menu {
        Some(MenuKind::Tab) => MenuCategory::Tab,
        Some(MenuKind::Menu) => MenuCategory::Menu,
        Some(MenuKind::Floating) => MenuCategory::Floating,
        None if option.position.is_some() => MenuCategory::Positioned,
        None => MenuCategory::Default,
    }
}

/// Drop options whose visibility condition fails, then assign each
/// survivor to exactly one presentation category. Overlay groups come
/// back in fixed render order: Tab, Menu, Floating, Positioned.
pub fn resolve_menus(options: &[ChoiceOption], vars: &mut Variables, hour: u32) -> MenuSet {
    let mut set = MenuSet::default();
    let mut tab = Vec::new();
    let mut menu = Vec::new();
    let mut floating = Vec::new();
    let mut positioned = Vec::new();

    for option in options {
        if !condition::evaluate(option.condition.as_ref(), vars, hour) {
            continue;
        }
        match category_of(option) {
            MenuCategory::Tab => tab.push(option.clone()),
            MenuCategory::Menu => menu.push(option.clone()),
            MenuCategory::Floating => floating.push(option.clone()),
            MenuCategory::Positioned => positioned.push(option.clone()),
            MenuCategory::Default => set.blocking.push(option.clone()),
        }
    }

    for (category, group) in [
        (MenuCategory::Tab, tab),
        (MenuCategory::Menu, menu),
        (MenuCategory::Floating, floating),
        (MenuCategory::Positioned, positioned),
    ] {
        if !group.is_empty() {
            set.overlays.push((category, group));
        }
    }
    set
}

pub fn option_views(options: &[ChoiceOption]) -> Vec<OptionView> {
    options
        .iter()
        .enumerate()
        .map(|(index, o)| OptionView {
            index,
            text: o.text.clone(),
            icon: o.icon.clone(),
            position: o.position,
        })
        .collect()
}
