mod drums;
mod recording;
mod system;
mod utilities;

pub use system::SystemControl;
pub use utilities::{Utilities, MAPPING_LABEL, MENU as UTILITIES_MENU};

use crate::loops::LoopController;
use crate::process::{Player, Recorder};
use crate::transport::LooperTransport;
use crate::types::{Action, Dispatcher};

/// Routes every action to the handler that owns it.
///
/// Handlers log their own failures; nothing is returned to the input
/// source that produced the action.
pub struct ActionDispatcher {
    loops: LoopController,
    transport: LooperTransport,
    recorder: Recorder,
    player: Player,
    utilities: Utilities,
    system: SystemControl,
}

impl ActionDispatcher {
    pub fn new(
        loops: LoopController,
        transport: LooperTransport,
        recorder: Recorder,
        player: Player,
        utilities: Utilities,
        system: SystemControl,
    ) -> Self {
        Self {
            loops,
            transport,
            recorder,
            player,
            utilities,
            system,
        }
    }

    pub fn loops(&self) -> &LoopController {
        &self.loops
    }

    pub fn transport(&self) -> &LooperTransport {
        &self.transport
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn player(&self) -> &Player {
        &self.player
    }
}

impl Dispatcher for ActionDispatcher {
    fn dispatch(&self, action: Action) {
        log::debug!(target: "dispatch", "{}", action);
        match action {
            Action::ToggleLoop(index) => {
                self.loops.toggle(index);
            }
            Action::TriggerPreset(index) => {
                self.loops.trigger_preset(index);
            }
            Action::LooperTransport(verb) => {
                if let Err(e) = self.transport.send(verb) {
                    log::warn!(target: "looper", "{} not sent: {}", verb, e);
                }
            }
            Action::PlayTrack(_) | Action::StopTrack => drums::dispatch_drums(&action, &self.player),
            Action::StartRecording | Action::StopRecording | Action::DeleteLastRecording => {
                recording::dispatch_recording(&action, &self.recorder)
            }
            Action::Passthrough(kind) => {
                if let Err(e) = self.utilities.passthrough(kind) {
                    log::warn!(target: "utilities", "{:?} passthrough: {}", kind, e);
                }
            }
            Action::FlushMidi => {
                if let Err(e) = self.utilities.flush_midi() {
                    log::warn!(target: "utilities", "MIDI flush: {}", e);
                }
            }
            Action::ShowMapping => self.utilities.show_mapping(),
            Action::Shutdown => self.system.shutdown(),
            Action::Poweroff => self.system.poweroff(),
        }
    }
}
