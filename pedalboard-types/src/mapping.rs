//! Foot-controller mapping: (channel, controller) pairs bound to actions.
//!
//! The table is also the single source of truth for LED feedback: the
//! controller a pedal sends for `ToggleLoop(i)` or `TriggerPreset(p)` is the
//! controller the surface sends back to light that pedal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::{Action, TransportVerb};

/// A MIDI control-change message reduced to its triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlChange {
    /// 0-based MIDI channel (0..=15)
    pub channel: u8,
    pub controller: u8,
    pub value: u8,
}

impl ControlChange {
    pub fn new(channel: u8, controller: u8, value: u8) -> Self {
        Self { channel, controller, value }
    }

    /// Parse raw MIDI bytes. Anything other than a complete CC message yields `None`.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let (&status, rest) = data.split_first()?;
        if status & 0xF0 != 0xB0 {
            return None;
        }
        match rest {
            [controller, value, ..] => Some(Self {
                channel: status & 0x0F,
                controller: *controller,
                value: *value,
            }),
            _ => None,
        }
    }
}

/// Immutable binding of one (channel, controller) pair to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiMapping {
    pub channel: u8,
    pub controller: u8,
    pub action: Action,
}

impl MidiMapping {
    pub const fn new(channel: u8, controller: u8, action: Action) -> Self {
        Self { channel, controller, action }
    }

    fn matches(&self, channel: u8, controller: u8) -> bool {
        self.channel == channel && self.controller == controller
    }
}

/// Built-in bindings of the USB foot controller (all on MIDI channel 1).
pub const FOOT_CONTROLLER: &[MidiMapping] = &[
    MidiMapping::new(0, 1, Action::ToggleLoop(1)),
    MidiMapping::new(0, 2, Action::ToggleLoop(2)),
    MidiMapping::new(0, 3, Action::ToggleLoop(3)),
    MidiMapping::new(0, 4, Action::ToggleLoop(4)),
    MidiMapping::new(0, 5, Action::TriggerPreset(0)),
    MidiMapping::new(0, 6, Action::TriggerPreset(1)),
    MidiMapping::new(0, 7, Action::TriggerPreset(2)),
    MidiMapping::new(0, 8, Action::TriggerPreset(3)),
    MidiMapping::new(0, 9, Action::LooperTransport(TransportVerb::Record)),
    MidiMapping::new(0, 10, Action::LooperTransport(TransportVerb::Overdub)),
    MidiMapping::new(0, 11, Action::LooperTransport(TransportVerb::Undo)),
    MidiMapping::new(0, 12, Action::LooperTransport(TransportVerb::Redo)),
    MidiMapping::new(0, 13, Action::LooperTransport(TransportVerb::Mute)),
    MidiMapping::new(0, 14, Action::LooperTransport(TransportVerb::Trigger)),
    MidiMapping::new(0, 15, Action::StartRecording),
    MidiMapping::new(0, 16, Action::StopRecording),
    MidiMapping::new(0, 17, Action::PlayTrack(0)),
    MidiMapping::new(0, 18, Action::StopTrack),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// Two entries bind the same (channel, controller) pair.
    Duplicate { channel: u8, controller: u8 },
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::Duplicate { channel, controller } => write!(
                f,
                "duplicate MIDI mapping for channel {} controller {}",
                channel, controller
            ),
        }
    }
}

impl std::error::Error for MappingError {}

/// Ordered mapping table with unique (channel, controller) keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiMappingTable {
    entries: Vec<MidiMapping>,
}

impl MidiMappingTable {
    pub fn new(entries: Vec<MidiMapping>) -> Result<Self, MappingError> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i]
                .iter()
                .any(|prev| prev.matches(entry.channel, entry.controller))
            {
                return Err(MappingError::Duplicate {
                    channel: entry.channel,
                    controller: entry.controller,
                });
            }
        }
        Ok(Self { entries })
    }

    /// The built-in foot-controller table.
    pub fn foot_controller() -> Self {
        Self { entries: FOOT_CONTROLLER.to_vec() }
    }

    pub fn entries(&self) -> &[MidiMapping] {
        &self.entries
    }

    /// First exact (channel, controller) match.
    pub fn lookup(&self, channel: u8, controller: u8) -> Option<Action> {
        self.entries
            .iter()
            .find(|m| m.matches(channel, controller))
            .map(|m| m.action)
    }

    /// Controller bound to `action` (used for LED feedback).
    pub fn controller_for(&self, action: Action) -> Option<u8> {
        self.entries
            .iter()
            .find(|m| m.action == action)
            .map(|m| m.controller)
    }

    /// (preset index, controller) for every preset with a pedal binding.
    pub fn preset_indicators(&self) -> Vec<(usize, u8)> {
        self.entries
            .iter()
            .filter_map(|m| match m.action {
                Action::TriggerPreset(index) => Some((index, m.controller)),
                _ => None,
            })
            .collect()
    }

    /// Human-readable listing, one binding per line ("ch1 cc5 -> TriggerPreset(0)").
    pub fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|m| format!("ch{} cc{} -> {}", m.channel + 1, m.controller, m.action))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for MidiMappingTable {
    fn default() -> Self {
        Self::foot_controller()
    }
}
