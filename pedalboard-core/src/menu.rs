//! Menu model shown by the terminal UI.
//!
//! A menu is an ordered list of buttons and labels. Buttons carry a
//! [`MenuAction`]; labels (`lbl_*`) are display-only and their live text
//! is copied in from the [`LabelBoard`] with [`MenuTree::apply_labels`].

use std::collections::HashMap;
use std::fmt;

use crate::dispatch::{MAPPING_LABEL, UTILITIES_MENU};
use crate::labels::LabelBoard;
use crate::loops::{LOOPS_LABEL, MENU as LOOPS_MENU, PRESETS_MENU, PRESET_LABEL};
use crate::process::{DRUMS_MENU, RECORD_LABEL, RECORD_MENU, TRACK_LABEL};
use crate::transport::{MENU as LOOPER_MENU, STATE_LABEL};
use crate::types::{
    Action, DrumLibrary, LoopState, PassthroughKind, PresetTable, TransportVerb, LOOP_COUNT,
};

pub const MAIN_MENU: &str = "main";
pub const SYSTEM_MENU: &str = "system";

/// What pressing a button does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    Open(String),
    Back,
    Dispatch(Action),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Button {
        name: String,
        label: String,
        action: MenuAction,
    },
    Label {
        name: String,
        text: String,
    },
}

impl MenuItem {
    pub fn name(&self) -> &str {
        match self {
            MenuItem::Button { name, .. } | MenuItem::Label { name, .. } => name,
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, MenuItem::Label { .. })
    }

    pub fn text(&self) -> &str {
        match self {
            MenuItem::Button { label, .. } => label,
            MenuItem::Label { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    DuplicateItem { menu: String, name: String },
    DuplicateMenu(String),
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuError::DuplicateItem { menu, name } => {
                write!(f, "menu {} already has an item named {}", menu, name)
            }
            MenuError::DuplicateMenu(menu) => write!(f, "menu {} already exists", menu),
        }
    }
}

impl std::error::Error for MenuError {}

/// Anything items can be added to.
pub trait MenuSurface {
    fn add_item(&mut self, name: &str, label: &str, action: MenuAction) -> Result<(), MenuError>;
    fn add_label(&mut self, name: &str, initial_text: &str) -> Result<(), MenuError>;
    /// Replace an item's text. Returns `false` if no item has that name.
    fn update_item(&mut self, name: &str, text: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    name: String,
    title: String,
    items: Vec<MenuItem>,
}

impl Menu {
    pub fn new(name: &str, title: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            items: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn item(&self, name: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.name() == name)
    }

    fn push(&mut self, item: MenuItem) -> Result<(), MenuError> {
        if self.item(item.name()).is_some() {
            return Err(MenuError::DuplicateItem {
                menu: self.name.clone(),
                name: item.name().to_string(),
            });
        }
        self.items.push(item);
        Ok(())
    }
}

impl MenuSurface for Menu {
    fn add_item(&mut self, name: &str, label: &str, action: MenuAction) -> Result<(), MenuError> {
        self.push(MenuItem::Button {
            name: name.to_string(),
            label: label.to_string(),
            action,
        })
    }

    fn add_label(&mut self, name: &str, initial_text: &str) -> Result<(), MenuError> {
        self.push(MenuItem::Label {
            name: name.to_string(),
            text: initial_text.to_string(),
        })
    }

    fn update_item(&mut self, name: &str, text: &str) -> bool {
        match self.items.iter_mut().find(|item| item.name() == name) {
            Some(MenuItem::Button { label, .. }) => *label = text.to_string(),
            Some(MenuItem::Label { text: current, .. }) => *current = text.to_string(),
            None => return false,
        }
        true
    }
}

/// All menus by name; `main` is the root.
#[derive(Debug, Clone, Default)]
pub struct MenuTree {
    menus: HashMap<String, Menu>,
}

impl MenuTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, menu: Menu) -> Result<(), MenuError> {
        if self.menus.contains_key(menu.name()) {
            return Err(MenuError::DuplicateMenu(menu.name().to_string()));
        }
        self.menus.insert(menu.name().to_string(), menu);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Menu> {
        self.menus.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Menu> {
        self.menus.get_mut(name)
    }

    pub fn root(&self) -> Option<&Menu> {
        self.get(MAIN_MENU)
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    /// Copy every label on the board into its menu item. Returns how many
    /// items were found.
    pub fn apply_labels(&mut self, board: &LabelBoard) -> usize {
        let mut applied = 0;
        for (menu, name, text) in board.snapshot() {
            match self.get_mut(&menu).map(|target| target.update_item(&name, &text)) {
                Some(true) => applied += 1,
                _ => log::debug!(target: "ui::labels", "no item {}/{}", menu, name),
            }
        }
        applied
    }
}

fn back(menu: &mut Menu) -> Result<(), MenuError> {
    menu.add_item("btn_back", "Back", MenuAction::Back)
}

fn dispatch(action: Action) -> MenuAction {
    MenuAction::Dispatch(action)
}

/// The full menu tree for the given presets and track library.
pub fn build_menus(presets: &PresetTable, library: &DrumLibrary) -> Result<MenuTree, MenuError> {
    let mut tree = MenuTree::new();

    let mut main = Menu::new(MAIN_MENU, "Pedalboard");
    for (name, label) in [
        (LOOPS_MENU, "Loops"),
        (PRESETS_MENU, "Presets"),
        (LOOPER_MENU, "Looper"),
        (RECORD_MENU, "Recorder"),
        (DRUMS_MENU, "Drums"),
        (UTILITIES_MENU, "Utilities"),
        (SYSTEM_MENU, "System"),
    ] {
        main.add_item(&format!("btn_{}", name), label, MenuAction::Open(name.to_string()))?;
    }
    tree.insert(main)?;

    let mut loops = Menu::new(LOOPS_MENU, "Loops");
    loops.add_label(LOOPS_LABEL, &LoopState::default().to_string())?;
    for i in 1..=LOOP_COUNT {
        loops.add_item(&format!("btn_loop{}", i), &format!("Loop {}", i), dispatch(Action::ToggleLoop(i)))?;
    }
    back(&mut loops)?;
    tree.insert(loops)?;

    let mut preset_menu = Menu::new(PRESETS_MENU, "Presets");
    let first = presets.get(0).map(|p| p.name.as_str()).unwrap_or("");
    preset_menu.add_label(PRESET_LABEL, &format!("Preset: {}", first))?;
    for (i, preset) in presets.iter().enumerate() {
        preset_menu.add_item(&format!("btn_preset{}", i), &preset.name, dispatch(Action::TriggerPreset(i)))?;
    }
    back(&mut preset_menu)?;
    tree.insert(preset_menu)?;

    let mut looper = Menu::new(LOOPER_MENU, "Looper");
    looper.add_label(STATE_LABEL, "not recording")?;
    for verb in TransportVerb::ALL {
        looper.add_item(&format!("btn_{}", verb), verb.label(), dispatch(Action::LooperTransport(verb)))?;
    }
    back(&mut looper)?;
    tree.insert(looper)?;

    let mut record = Menu::new(RECORD_MENU, "Recorder");
    record.add_label(RECORD_LABEL, "Idle")?;
    record.add_item("btn_start", "Start recording", dispatch(Action::StartRecording))?;
    record.add_item("btn_stop", "Stop recording", dispatch(Action::StopRecording))?;
    record.add_item("btn_delete", "Delete last recording", dispatch(Action::DeleteLastRecording))?;
    back(&mut record)?;
    tree.insert(record)?;

    let mut drums = Menu::new(DRUMS_MENU, "Drums");
    drums.add_label(TRACK_LABEL, "Stopped")?;
    for (i, track) in library.tracks().iter().enumerate() {
        drums.add_item(&format!("btn_track{}", i), &track.title, dispatch(Action::PlayTrack(i)))?;
    }
    drums.add_item("btn_stop", "Stop", dispatch(Action::StopTrack))?;
    back(&mut drums)?;
    tree.insert(drums)?;

    let mut utilities = Menu::new(UTILITIES_MENU, "Utilities");
    utilities.add_item("btn_midi_passthru", "MIDI passthrough", dispatch(Action::Passthrough(PassthroughKind::Midi)))?;
    utilities.add_item("btn_audio_passthru", "Audio passthrough", dispatch(Action::Passthrough(PassthroughKind::Audio)))?;
    utilities.add_item("btn_flush", "Flush MIDI", dispatch(Action::FlushMidi))?;
    utilities.add_item("btn_mapping", "Show mapping", dispatch(Action::ShowMapping))?;
    utilities.add_label(MAPPING_LABEL, "")?;
    back(&mut utilities)?;
    tree.insert(utilities)?;

    let mut system = Menu::new(SYSTEM_MENU, "System");
    system.add_item("btn_exit", "Exit", dispatch(Action::Shutdown))?;
    system.add_item("btn_poweroff", "Power off", dispatch(Action::Poweroff))?;
    back(&mut system)?;
    tree.insert(system)?;

    Ok(tree)
}
