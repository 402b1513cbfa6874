use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of physical effect loops on the loop switcher.
pub const LOOP_COUNT: usize = 4;

/// On/off flag per physical loop, index 0..LOOP_COUNT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopState([bool; LOOP_COUNT]);

impl LoopState {
    pub fn new(loops: [bool; LOOP_COUNT]) -> Self {
        Self(loops)
    }

    pub fn loops(&self) -> [bool; LOOP_COUNT] {
        self.0
    }

    /// State of a 1-based loop.
    pub fn is_on(&self, loop_index: usize) -> Option<bool> {
        loop_index.checked_sub(1).and_then(|i| self.0.get(i).copied())
    }

    /// Flip a 1-based loop; returns the new value, `None` if out of range.
    pub fn toggle(&mut self, loop_index: usize) -> Option<bool> {
        let slot = loop_index.checked_sub(1).and_then(|i| self.0.get_mut(i))?;
        *slot = !*slot;
        Some(*slot)
    }

    pub fn set_all(&mut self, loops: [bool; LOOP_COUNT]) {
        self.0 = loops;
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .enumerate()
            .map(|(i, on)| format!("{}:{}", i + 1, if *on { "on" } else { "off" }))
            .collect();
        f.write_str(&parts.join(" "))
    }
}

/// A named combination of loop states applied at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub loops: [bool; LOOP_COUNT],
}

impl Preset {
    pub fn new(name: impl Into<String>, loops: [bool; LOOP_COUNT]) -> Self {
        Self { name: name.into(), loops }
    }

    fn is_all_off(&self) -> bool {
        self.loops.iter().all(|on| !on)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    Empty,
    /// Preset 0 must switch every loop off.
    FirstNotAllOff(String),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::Empty => write!(f, "preset table is empty"),
            PresetError::FirstNotAllOff(name) => {
                write!(f, "preset 0 ({}) must switch all loops off", name)
            }
        }
    }
}

impl std::error::Error for PresetError {}

/// Immutable, ordered preset list. Index 0 is always "all loops off".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetTable {
    presets: Vec<Preset>,
}

impl PresetTable {
    pub fn new(presets: Vec<Preset>) -> Result<Self, PresetError> {
        let first = presets.first().ok_or(PresetError::Empty)?;
        if !first.is_all_off() {
            return Err(PresetError::FirstNotAllOff(first.name.clone()));
        }
        Ok(Self { presets })
    }

    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }
}

impl Default for PresetTable {
    // Loops: overdrive, modulation, (unused), dynamics
    fn default() -> Self {
        Self {
            presets: vec![
                Preset::new("----", [false, false, false, false]),
                Preset::new("DynDrv", [true, false, false, true]),
                Preset::new("DynMod", [false, true, false, true]),
                Preset::new("Drv", [true, false, false, false]),
                Preset::new("Mod", [false, true, false, false]),
                Preset::new("all", [true, true, false, true]),
            ],
        }
    }
}
