//! Action types for the dispatch system.
//!
//! Every recognized external event (menu button, foot-controller CC, OSC
//! message) is translated into exactly one `Action` and handed to the
//! dispatcher. The set is closed so the dispatcher's match is exhaustive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Transport verbs understood by the loop engine's `/sl/<n>/hit` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportVerb {
    Record,
    Overdub,
    Undo,
    Redo,
    Mute,
    Trigger,
}

impl TransportVerb {
    pub const ALL: [TransportVerb; 6] = [
        TransportVerb::Record,
        TransportVerb::Overdub,
        TransportVerb::Undo,
        TransportVerb::Redo,
        TransportVerb::Mute,
        TransportVerb::Trigger,
    ];

    /// Wire form sent to the engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportVerb::Record => "record",
            TransportVerb::Overdub => "overdub",
            TransportVerb::Undo => "undo",
            TransportVerb::Redo => "redo",
            TransportVerb::Mute => "mute",
            TransportVerb::Trigger => "trigger",
        }
    }

    /// Button caption ("Record", "Overdub", ...).
    pub fn label(&self) -> &'static str {
        match self {
            TransportVerb::Record => "Record",
            TransportVerb::Overdub => "Overdub",
            TransportVerb::Undo => "Undo",
            TransportVerb::Redo => "Redo",
            TransportVerb::Mute => "Mute",
            TransportVerb::Trigger => "Trigger",
        }
    }
}

impl FromStr for TransportVerb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransportVerb::ALL
            .iter()
            .copied()
            .find(|verb| verb.as_str() == s)
            .ok_or_else(|| format!("unknown transport verb: {}", s))
    }
}

impl fmt::Display for TransportVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which signal a passthrough bridges directly to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassthroughKind {
    /// Foot controller MIDI straight to the loop hardware.
    Midi,
    /// Sound card capture straight to playback.
    Audio,
}

/// A user intent, produced by any input source and consumed once by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Flip one physical loop (1-based, 1..=4).
    ToggleLoop(usize),
    /// Recall a preset by index into the preset table.
    TriggerPreset(usize),
    LooperTransport(TransportVerb),
    /// Play a drum/backing track by index into the drum library.
    PlayTrack(usize),
    StopTrack,
    StartRecording,
    StopRecording,
    DeleteLastRecording,
    Passthrough(PassthroughKind),
    FlushMidi,
    ShowMapping,
    Shutdown,
    Poweroff,
}

impl Action {
    /// Stable kind name used in logs and mapping listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::ToggleLoop(_) => "ToggleLoop",
            Action::TriggerPreset(_) => "TriggerPreset",
            Action::LooperTransport(_) => "LooperTransport",
            Action::PlayTrack(_) => "PlayTrack",
            Action::StopTrack => "StopTrack",
            Action::StartRecording => "StartRecording",
            Action::StopRecording => "StopRecording",
            Action::DeleteLastRecording => "DeleteLastRecording",
            Action::Passthrough(_) => "Passthrough",
            Action::FlushMidi => "FlushMidi",
            Action::ShowMapping => "ShowMapping",
            Action::Shutdown => "Shutdown",
            Action::Poweroff => "Poweroff",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::ToggleLoop(i) | Action::TriggerPreset(i) | Action::PlayTrack(i) => {
                write!(f, "{}({})", self.kind(), i)
            }
            Action::LooperTransport(verb) => write!(f, "{}({})", self.kind(), verb),
            Action::Passthrough(kind) => write!(f, "{}({:?})", self.kind(), kind),
            _ => f.write_str(self.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_verb_round_trips_through_wire_string() {
        for verb in TransportVerb::ALL {
            assert_eq!(verb.as_str().parse::<TransportVerb>(), Ok(verb));
        }
    }

    #[test]
    fn transport_verb_rejects_unknown() {
        assert!("rewind".parse::<TransportVerb>().is_err());
        assert!("Record".parse::<TransportVerb>().is_err());
    }

    #[test]
    fn action_display_includes_payload() {
        assert_eq!(Action::ToggleLoop(3).to_string(), "ToggleLoop(3)");
        assert_eq!(
            Action::LooperTransport(TransportVerb::Overdub).to_string(),
            "LooperTransport(overdub)"
        );
        assert_eq!(Action::Shutdown.to_string(), "Shutdown");
        assert_eq!(
            Action::Passthrough(PassthroughKind::Audio).to_string(),
            "Passthrough(Audio)"
        );
    }
}
