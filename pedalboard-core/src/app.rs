//! Application wiring: environment checks, construction of every handler
//! and input source, and ordered teardown.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::cc::{CcSink, MidisendPort};
use crate::config::{Config, LooperSettings, StartupSettings};
use crate::dispatch::{ActionDispatcher, SystemControl, Utilities};
use crate::ipc::IpcServer;
use crate::labels::LabelBoard;
use crate::loops::{FeedbackLayout, LoopController};
use crate::menu::{build_menus, MenuError, MenuTree};
use crate::midi::{MidiInput, MidiInputSwitch, MidiRouter};
use crate::osc::listener::OscListener;
use crate::osc::OscInput;
use crate::probe;
use crate::process::{LoopEngine, Player, Recorder};
use crate::tools::ToolError;
use crate::transport::{spawn_engine_feedback, LooperTransport};
use crate::types::{Dispatcher, MidiInputControl, MidiMappingTable, Shutdownable};

#[derive(Debug)]
pub enum StartupError {
    SoundCardMissing(String),
    MidiClientsMissing(Vec<String>),
    /// A listing tool needed for a fatal check could not run.
    Probe(ToolError),
    OscBind { port: u16, source: io::Error },
    IpcBind { addr: String, source: io::Error },
    Io(io::Error),
    Menu(MenuError),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::SoundCardMissing(card) => write!(f, "no sound card ({} not listed)", card),
            StartupError::MidiClientsMissing(clients) => {
                write!(f, "MIDI subsystem incomplete, expected clients: {}", clients.join(", "))
            }
            StartupError::Probe(e) => write!(f, "environment check failed: {}", e),
            StartupError::OscBind { port, source } => {
                write!(f, "could not listen for OSC on port {}: {}", port, source)
            }
            StartupError::IpcBind { addr, source } => {
                write!(f, "could not open the IPC endpoint {}: {}", addr, source)
            }
            StartupError::Io(e) => write!(f, "{}", e),
            StartupError::Menu(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Probe(e) => Some(e),
            StartupError::OscBind { source, .. } => Some(source),
            StartupError::IpcBind { source, .. } => Some(source),
            StartupError::Io(e) => Some(e),
            StartupError::Menu(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StartupError {
    fn from(e: io::Error) -> Self {
        StartupError::Io(e)
    }
}

impl From<MenuError> for StartupError {
    fn from(e: MenuError) -> Self {
        StartupError::Menu(e)
    }
}

/// Fatal preconditions: a sound card and the core ALSA sequencer clients.
pub fn check_environment(settings: &StartupSettings) -> Result<(), StartupError> {
    if settings.require_sound_card
        && !probe::check_sound_card(&settings.sound_card).map_err(StartupError::Probe)?
    {
        return Err(StartupError::SoundCardMissing(settings.sound_card.clone()));
    }
    if !settings.required_midi_clients.is_empty()
        && !probe::check_midi_clients(&settings.required_midi_clients)
            .map_err(StartupError::Probe)?
    {
        return Err(StartupError::MidiClientsMissing(
            settings.required_midi_clients.clone(),
        ));
    }
    Ok(())
}

/// Shutdown request shared by every input source. The first request wins;
/// the main thread waits on it and runs the teardown.
pub struct ShutdownSignal {
    requested: AtomicBool,
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self {
            requested: AtomicBool::new(false),
            tx,
            rx,
        }
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Wait up to `timeout` for a request. Returns whether one was made.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.is_requested() {
            return true;
        }
        self.rx.recv_timeout(timeout).is_ok() || self.is_requested()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdownable for ShutdownSignal {
    fn request_shutdown(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            log::info!(target: "app", "shutdown requested");
            let _ = self.tx.try_send(());
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AppOptions {
    /// Launch the loop engine at boot (also subject to `[looper] autostart`).
    pub start_looper: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self { start_looper: true }
    }
}

pub struct App {
    menus: MenuTree,
    labels: Arc<LabelBoard>,
    synced_revision: u64,
    dispatcher: Arc<ActionDispatcher>,
    shutdown: Arc<ShutdownSignal>,
    midi_switch: Arc<MidiInputSwitch>,
    osc_input: Option<OscInput>,
    ipc: Option<IpcServer>,
    engine_feedback: Option<OscListener>,
    midi_input: Option<MidiInput>,
    engine: Option<LoopEngine>,
}

impl App {
    /// Build every handler and start the input sources. Optional backends
    /// (CC ports, MIDI input, engine feedback) degrade to warnings; failing
    /// to bind the OSC control port or the IPC endpoint is fatal.
    pub fn start(config: &Config, options: AppOptions) -> Result<Self, StartupError> {
        let labels = Arc::new(LabelBoard::new());
        let shutdown = Arc::new(ShutdownSignal::new());
        let midi_switch = Arc::new(MidiInputSwitch::new());
        let table = MidiMappingTable::foot_controller();

        let midi = config.midi();
        let hardware = MidisendPort::resolve(&midi.send_program, &midi.loop_hardware)
            .map(|port| Box::new(port) as Box<dyn CcSink>);
        let feedback = MidisendPort::resolve(&midi.send_program, &midi.foot_controller)
            .map(|port| Box::new(port) as Box<dyn CcSink>);
        let presets = config.presets();
        let loops = LoopController::new(
            presets.clone(),
            hardware,
            feedback,
            FeedbackLayout::from_mapping(&table),
            labels.clone(),
        );

        let looper = config.looper();
        let engine = if looper.autostart && options.start_looper {
            start_engine(looper.clone())?
        } else {
            log::info!(target: "looper", "engine autostart disabled");
            None
        };

        let transport = LooperTransport::new(&looper.engine_addr(), looper.feedback_port, labels.clone())?;
        let engine_feedback = match spawn_engine_feedback(looper.feedback_port) {
            Ok(listener) => {
                if let Err(e) = transport.query_state() {
                    log::debug!(target: "looper", "state query failed: {}", e);
                }
                Some(listener)
            }
            Err(e) => {
                log::warn!(target: "looper", "no engine feedback on port {}: {}", looper.feedback_port, e);
                None
            }
        };

        let library = config.drum_library();
        let recorder = Recorder::new(config.recorder(), labels.clone())?;
        let player = Player::new(config.player_program(), library.clone(), labels.clone())?;
        let utilities = Utilities::new(
            &midi.foot_controller,
            &midi.loop_hardware,
            table.clone(),
            midi_switch.clone(),
            labels.clone(),
        );
        let system = SystemControl::new(shutdown.clone());

        let dispatcher = Arc::new(ActionDispatcher::new(
            loops, transport, recorder, player, utilities, system,
        ));

        let osc_port = config.osc_listen_port();
        let osc_input = OscInput::bind(osc_port, dispatcher.clone(), shutdown.clone())
            .map_err(|source| StartupError::OscBind { port: osc_port, source })?;

        let ipc_addr = config.ipc_listen_addr();
        let ipc = IpcServer::bind(&ipc_addr)
            .map_err(|source| StartupError::IpcBind { addr: ipc_addr, source })?;

        let router = MidiRouter::new(table, midi_switch.clone());
        let midi_input = match MidiInput::connect(&midi.foot_controller, router, dispatcher.clone()) {
            Ok(input) => Some(input),
            Err(e) => {
                log::warn!(target: "midi", "{}; continuing without foot controller", e);
                None
            }
        };

        let menus = build_menus(&presets, &library)?;

        log::info!(target: "app", "ready");
        Ok(Self {
            menus,
            labels,
            synced_revision: 0,
            dispatcher,
            shutdown,
            midi_switch,
            osc_input: Some(osc_input),
            ipc: Some(ipc),
            engine_feedback,
            midi_input,
            engine,
        })
    }

    pub fn menus(&self) -> &MenuTree {
        &self.menus
    }

    /// Pull label text written since the last call into the menu tree.
    /// Returns whether anything changed.
    pub fn sync_labels(&mut self) -> bool {
        let revision = self.labels.revision();
        if revision == self.synced_revision {
            return false;
        }
        self.menus.apply_labels(&self.labels);
        self.synced_revision = revision;
        true
    }

    pub fn dispatcher(&self) -> Arc<dyn Dispatcher> {
        self.dispatcher.clone()
    }

    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    pub fn midi_enabled(&self) -> bool {
        self.midi_switch.is_enabled()
    }

    pub fn midi_connected(&self) -> Option<&str> {
        self.midi_input.as_ref().map(|input| input.port_name())
    }

    /// Stop inputs first so no new action arrives, then the processes.
    pub fn shutdown(mut self) {
        log::info!(target: "app", "shutting down");
        if let Some(mut osc) = self.osc_input.take() {
            osc.stop();
        }
        if let Some(mut ipc) = self.ipc.take() {
            ipc.stop();
        }
        if let Some(mut feedback) = self.engine_feedback.take() {
            feedback.stop();
        }
        if let Some(mut midi) = self.midi_input.take() {
            midi.close();
        }
        self.dispatcher.recorder().shutdown();
        self.dispatcher.player().shutdown();
        if let Some(engine) = self.engine.take() {
            engine.shutdown();
        }
        log::info!(target: "app", "shutdown complete");
    }
}

/// Launch the loop engine unless one is already running. A launch failure
/// leaves the app usable without looping.
fn start_engine(settings: LooperSettings) -> Result<Option<LoopEngine>, StartupError> {
    match probe::check_processes(&[settings.program.as_str()]) {
        Ok(true) => {
            log::info!(target: "looper", "{} already running", settings.program);
            return Ok(None);
        }
        Ok(false) => {}
        Err(e) => log::debug!(target: "looper", "process check skipped: {}", e),
    }
    let engine = LoopEngine::new(settings)?;
    match engine.start() {
        Ok(()) => Ok(Some(engine)),
        Err(e) => {
            log::warn!(target: "looper", "{}", e);
            Ok(None)
        }
    }
}
