//! Long-running external processes, each owned by a supervisor thread.

mod roles;
mod supervisor;

pub use roles::{
    engine_command, player_command, recorder_command, DeleteError, LoopEngine, Player, Recorder,
    DRUMS_MENU, RECORD_LABEL, RECORD_MENU, TRACK_LABEL,
};
pub use supervisor::{CommandSpec, ProcessSupervisor, SupervisorError};
