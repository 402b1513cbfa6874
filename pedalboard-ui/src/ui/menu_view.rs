//! Navigation state over the menu tree.

use pedalboard_core::menu::{Menu, MenuAction, MenuItem, MenuTree, MAIN_MENU};
use pedalboard_core::types::Action;

use super::input::MenuKey;
use super::list_selector::ListSelector;

/// What the main loop should do after a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    None,
    Dispatch(Action),
    Quit,
}

/// Open menus, innermost last, each with its own selection.
pub struct MenuView {
    stack: Vec<(String, ListSelector)>,
}

impl MenuView {
    pub fn new(tree: &MenuTree) -> Self {
        let selector = tree
            .get(MAIN_MENU)
            .map(first_button)
            .unwrap_or_default();
        Self {
            stack: vec![(MAIN_MENU.to_string(), selector)],
        }
    }

    pub fn current_menu(&self) -> &str {
        self.stack.last().map(|(name, _)| name.as_str()).unwrap_or(MAIN_MENU)
    }

    pub fn selected(&self) -> usize {
        self.stack.last().map(|(_, sel)| sel.selected).unwrap_or(0)
    }

    pub fn handle_key(&mut self, key: MenuKey, tree: &MenuTree) -> MenuCommand {
        let Some(menu) = tree.get(self.current_menu()) else {
            log::error!(target: "ui", "menu {} vanished", self.current_menu());
            return MenuCommand::None;
        };
        let items = menu.items();
        let skip = |i: usize| items[i].is_label();

        match key {
            MenuKey::Quit => MenuCommand::Quit,
            MenuKey::Back => {
                self.back();
                MenuCommand::None
            }
            MenuKey::Up => {
                if let Some((_, sel)) = self.stack.last_mut() {
                    sel.select_prev(items.len(), skip);
                }
                MenuCommand::None
            }
            MenuKey::Down => {
                if let Some((_, sel)) = self.stack.last_mut() {
                    sel.select_next(items.len(), skip);
                }
                MenuCommand::None
            }
            MenuKey::Press => match items.get(self.selected()) {
                Some(MenuItem::Button { action, .. }) => self.press(action.clone(), tree),
                _ => MenuCommand::None,
            },
        }
    }

    fn press(&mut self, action: MenuAction, tree: &MenuTree) -> MenuCommand {
        match action {
            MenuAction::Open(name) => {
                match tree.get(&name) {
                    Some(menu) => self.stack.push((name, first_button(menu))),
                    None => log::warn!(target: "ui", "no menu named {}", name),
                }
                MenuCommand::None
            }
            MenuAction::Back => {
                self.back();
                MenuCommand::None
            }
            MenuAction::Dispatch(action) => MenuCommand::Dispatch(action),
        }
    }

    fn back(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }
}

fn first_button(menu: &Menu) -> ListSelector {
    let items = menu.items();
    ListSelector::first(items.len(), |i| items[i].is_label())
}
