//! The three supervised roles: recorder, drum-track player, loop engine.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use super::supervisor::{CommandSpec, ProcessSupervisor, SupervisorError};
use crate::config::{LooperSettings, RecorderSettings};
use crate::tools::run_logged;
use crate::types::{DrumLibrary, LabelSink, RecordingSequence};

pub const RECORD_MENU: &str = "record";
pub const RECORD_LABEL: &str = "lbl_recording";
pub const DRUMS_MENU: &str = "drums";
pub const TRACK_LABEL: &str = "lbl_track";

pub fn recorder_command(settings: &RecorderSettings, file: &Path) -> CommandSpec {
    CommandSpec::new(
        settings.program.clone(),
        vec![
            "-f".to_string(),
            file.display().to_string(),
            settings.source.clone(),
        ],
    )
}

pub fn player_command(program: &str, file: &Path) -> CommandSpec {
    CommandSpec::new(
        program,
        vec!["-ao".to_string(), "jack".to_string(), file.display().to_string()],
    )
}

pub fn engine_command(settings: &LooperSettings) -> CommandSpec {
    CommandSpec::new(
        settings.program.clone(),
        vec![
            format!("--osc-port={}", settings.osc_port),
            format!("--loopcount={}", settings.loop_count),
            format!("--channels={}", settings.channels),
            format!("--looptime={}", settings.loop_time),
            format!("--load-midi-binding={}", settings.midi_binding),
        ],
    )
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
pub enum DeleteError {
    /// The last file is still being written.
    StillRecording(PathBuf),
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for DeleteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteError::StillRecording(path) => {
                write!(f, "{} is still recording", path.display())
            }
            DeleteError::Io { path, source } => {
                write!(f, "could not delete {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for DeleteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeleteError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

struct Takes {
    sequence: RecordingSequence,
    last: Option<PathBuf>,
}

/// Records the loop engine's output to numbered WAV files.
pub struct Recorder {
    settings: RecorderSettings,
    supervisor: ProcessSupervisor,
    takes: Mutex<Takes>,
    labels: Arc<dyn LabelSink>,
}

impl Recorder {
    pub fn new(
        settings: RecorderSettings,
        labels: Arc<dyn LabelSink>,
    ) -> io::Result<Self> {
        let sequence = settings.sequence();
        Ok(Self {
            settings,
            supervisor: ProcessSupervisor::spawn("recorder")?,
            takes: Mutex::new(Takes { sequence, last: None }),
            labels,
        })
    }

    pub fn is_recording(&self) -> bool {
        self.supervisor.is_running()
    }

    /// File the next `start` will write.
    pub fn next_file(&self) -> PathBuf {
        lock(&self.takes).sequence.current_filename()
    }

    pub fn last_file(&self) -> Option<PathBuf> {
        lock(&self.takes).last.clone()
    }

    /// Start a new take. The counter only advances once the recorder is
    /// actually running.
    pub fn start(&self) -> Result<PathBuf, SupervisorError> {
        let mut takes = lock(&self.takes);
        let file = takes.sequence.current_filename();

        if let Err(e) = fs::create_dir_all(takes.sequence.directory()) {
            log::warn!(
                target: "recorder",
                "could not create {}: {}",
                takes.sequence.directory().display(),
                e
            );
        }

        self.supervisor.start(recorder_command(&self.settings, &file))?;
        takes.sequence.advance();
        takes.last = Some(file.clone());
        drop(takes);

        log::info!(target: "recorder", "recording to {}", file.display());
        self.labels
            .update_label(RECORD_MENU, RECORD_LABEL, &format!("Recording {}", file.display()));
        Ok(file)
    }

    /// Returns `false` when nothing was recording. The label is refreshed
    /// either way, since the recorder may have exited on its own.
    pub fn stop(&self) -> Result<bool, SupervisorError> {
        let stopped = self.supervisor.stop()?;
        let text = match self.last_file() {
            Some(file) => Some(format!("Saved {}", file.display())),
            None if stopped => Some("Stopped".to_string()),
            None => None,
        };
        if let Some(text) = text {
            self.labels.update_label(RECORD_MENU, RECORD_LABEL, &text);
        }
        Ok(stopped)
    }

    /// Remove the most recently started take. Returns the removed path,
    /// `None` when nothing has been recorded yet.
    pub fn delete_last(&self) -> Result<Option<PathBuf>, DeleteError> {
        let mut takes = lock(&self.takes);
        let Some(path) = takes.last.clone() else {
            return Ok(None);
        };
        if self.supervisor.is_running() {
            return Err(DeleteError::StillRecording(path));
        }
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!(target: "recorder", "{} was never written", path.display());
            }
            Err(source) => return Err(DeleteError::Io { path, source }),
        }
        takes.last = None;
        drop(takes);

        log::info!(target: "recorder", "deleted {}", path.display());
        self.labels
            .update_label(RECORD_MENU, RECORD_LABEL, &format!("Deleted {}", path.display()));
        Ok(Some(path))
    }

    pub fn shutdown(&self) {
        self.supervisor.shutdown();
    }
}

/// Plays drum/backing tracks from the library, one at a time.
pub struct Player {
    program: String,
    library: DrumLibrary,
    selection: Mutex<usize>,
    supervisor: ProcessSupervisor,
    labels: Arc<dyn LabelSink>,
}

impl Player {
    pub fn new(
        program: impl Into<String>,
        library: DrumLibrary,
        labels: Arc<dyn LabelSink>,
    ) -> io::Result<Self> {
        Ok(Self {
            program: program.into(),
            library,
            selection: Mutex::new(0),
            supervisor: ProcessSupervisor::spawn("player")?,
            labels,
        })
    }

    pub fn selection(&self) -> usize {
        *lock(&self.selection)
    }

    pub fn is_playing(&self) -> bool {
        self.supervisor.is_running()
    }

    /// Select and play a track, replacing whatever is playing. Returns
    /// `Ok(false)` for an index outside the library.
    pub fn play(&self, index: usize) -> Result<bool, SupervisorError> {
        let (Some(track), Some(path)) = (self.library.get(index), self.library.path_of(index))
        else {
            log::debug!(target: "player", "ignoring unknown track {}", index);
            return Ok(false);
        };

        let mut selection = lock(&self.selection);
        *selection = index;
        if self.supervisor.stop()? {
            log::debug!(target: "player", "stopped previous track");
        }
        self.supervisor.start(player_command(&self.program, &path))?;
        drop(selection);

        log::info!(target: "player", "playing {} ({})", track.title, path.display());
        self.labels
            .update_label(DRUMS_MENU, TRACK_LABEL, &format!("Playing {}", track.title));
        Ok(true)
    }

    pub fn stop(&self) -> Result<bool, SupervisorError> {
        let stopped = self.supervisor.stop()?;
        if stopped {
            self.labels.update_label(DRUMS_MENU, TRACK_LABEL, "Stopped");
        }
        Ok(stopped)
    }

    pub fn shutdown(&self) {
        self.supervisor.shutdown();
    }
}

/// The loop-recording engine process and its audio/MIDI wiring.
pub struct LoopEngine {
    settings: LooperSettings,
    supervisor: ProcessSupervisor,
}

impl LoopEngine {
    pub fn new(settings: LooperSettings) -> io::Result<Self> {
        Ok(Self {
            settings,
            supervisor: ProcessSupervisor::spawn("looper")?,
        })
    }

    pub fn is_running(&self) -> bool {
        self.supervisor.is_running()
    }

    /// Launch the engine, give it time to register its ports, then run the
    /// configured connection commands. Connection failures are logged only.
    pub fn start(&self) -> Result<(), SupervisorError> {
        self.supervisor.start(engine_command(&self.settings))?;
        log::info!(
            target: "looper",
            "waiting {}ms for the engine to settle",
            self.settings.settle.as_millis()
        );
        thread::sleep(self.settings.settle);

        for connection in &self.settings.connections {
            match connection.split_first() {
                Some((program, args)) => run_logged(program, args),
                None => log::debug!(target: "looper", "skipping empty connection command"),
            }
        }
        Ok(())
    }

    pub fn stop(&self) -> Result<bool, SupervisorError> {
        self.supervisor.stop()
    }

    pub fn shutdown(&self) {
        self.supervisor.shutdown();
    }
}
