use crate::process::{DeleteError, Recorder, SupervisorError};
use crate::types::Action;

pub(super) fn dispatch_recording(action: &Action, recorder: &Recorder) {
    match action {
        Action::StartRecording => match recorder.start() {
            Ok(_) => {}
            Err(e @ SupervisorError::AlreadyRunning(_)) => {
                log::info!(target: "recorder", "{}", e)
            }
            Err(e) => log::error!(target: "recorder", "{}", e),
        },
        Action::StopRecording => match recorder.stop() {
            Ok(true) => {}
            Ok(false) => log::debug!(target: "recorder", "stop requested but nothing is recording"),
            Err(e) => log::error!(target: "recorder", "{}", e),
        },
        Action::DeleteLastRecording => match recorder.delete_last() {
            Ok(Some(_)) => {}
            Ok(None) => log::info!(target: "recorder", "no recording to delete"),
            Err(e @ DeleteError::StillRecording(_)) => log::warn!(target: "recorder", "{}", e),
            Err(e) => log::error!(target: "recorder", "{}", e),
        },
        _ => {}
    }
}
