#![allow(dead_code)]
//! Test harness utilities for pedalboard-core integration tests.

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pedalboard_core::cc::CcSink;
use pedalboard_core::config::RecorderSettings;
use pedalboard_core::dispatch::{ActionDispatcher, SystemControl, Utilities};
use pedalboard_core::labels::LabelBoard;
use pedalboard_core::loops::{FeedbackLayout, LoopController};
use pedalboard_core::midi::MidiInputSwitch;
use pedalboard_core::process::{Player, Recorder};
use pedalboard_core::tools::ToolError;
use pedalboard_core::transport::LooperTransport;
use pedalboard_core::types::{
    Action, Dispatcher, DrumLibrary, MidiMappingTable, PresetTable, Shutdownable,
};
use rosc::{OscMessage, OscPacket, OscType};

/// Dispatcher that only remembers what it was given.
#[derive(Default)]
pub struct RecordingDispatcher {
    actions: Mutex<Vec<Action>>,
}

impl RecordingDispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn take(&self) -> Vec<Action> {
        std::mem::take(&mut *self.actions.lock().unwrap())
    }

    /// Wait until at least `count` actions arrived, then take them all.
    pub fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Action> {
        wait_until(timeout, || self.actions.lock().unwrap().len() >= count);
        self.take()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn dispatch(&self, action: Action) {
        self.actions.lock().unwrap().push(action);
    }
}

#[derive(Default)]
pub struct RecordingShutdown {
    requested: AtomicBool,
}

impl RecordingShutdown {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

impl Shutdownable for RecordingShutdown {
    fn request_shutdown(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }
}

/// CC sink that records (controller, value) pairs.
#[derive(Clone, Default)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<(u8, u8)>>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<(u8, u8)> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

impl CcSink for RecordingSink {
    fn send_cc(&self, controller: u8, value: u8) -> Result<(), ToolError> {
        self.sent.lock().unwrap().push((controller, value));
        Ok(())
    }

    fn describe(&self) -> String {
        "recording sink".to_string()
    }
}

/// Poll `done` every 5ms until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    done()
}

/// Loopback socket with a read timeout, for sending and receiving OSC.
pub fn udp_socket() -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    socket
}

pub fn send_osc(socket: &UdpSocket, to: SocketAddr, addr: &str, args: Vec<OscType>) {
    let packet = OscPacket::Message(OscMessage { addr: addr.to_string(), args });
    let buf = rosc::encoder::encode(&packet).unwrap();
    socket.send_to(&buf, to).unwrap();
}

pub fn recv_osc(socket: &UdpSocket) -> OscMessage {
    let mut buf = [0u8; rosc::decoder::MTU];
    let (n, _) = socket.recv_from(&mut buf).unwrap();
    match rosc::decoder::decode_udp(&buf[..n]).unwrap().1 {
        OscPacket::Message(msg) => msg,
        other => panic!("Expected message, got {:?}", other),
    }
}

/// A full `ActionDispatcher` whose outputs are observable: CC sinks record,
/// the loop engine is a local UDP socket, recordings go to a temp dir.
pub struct Rig {
    pub dispatcher: Arc<ActionDispatcher>,
    pub hardware: RecordingSink,
    pub feedback: RecordingSink,
    pub labels: Arc<LabelBoard>,
    pub shutdown: Arc<RecordingShutdown>,
    pub midi_switch: Arc<MidiInputSwitch>,
    pub engine: UdpSocket,
    pub dir: tempfile::TempDir,
}

pub fn rig() -> Rig {
    let engine = udp_socket();
    let dir = tempfile::tempdir().unwrap();
    let labels = Arc::new(LabelBoard::new());
    let hardware = RecordingSink::default();
    let feedback = RecordingSink::default();
    let shutdown = RecordingShutdown::new();
    let midi_switch = Arc::new(MidiInputSwitch::new());
    let table = MidiMappingTable::foot_controller();

    let loops = LoopController::new(
        PresetTable::default(),
        Some(Box::new(hardware.clone())),
        Some(Box::new(feedback.clone())),
        FeedbackLayout::from_mapping(&table),
        labels.clone(),
    );
    let transport =
        LooperTransport::new(&engine.local_addr().unwrap().to_string(), 9959, labels.clone())
            .unwrap();
    let recorder = Recorder::new(
        RecorderSettings {
            directory: dir.path().join("recordings"),
            ..RecorderSettings::default()
        },
        labels.clone(),
    )
    .unwrap();
    let player = Player::new("mplayer", DrumLibrary::default(), labels.clone()).unwrap();
    let utilities = Utilities::new(
        "USBMIDI",
        "CH345",
        table,
        midi_switch.clone(),
        labels.clone(),
    );
    let dispatcher = Arc::new(ActionDispatcher::new(
        loops,
        transport,
        recorder,
        player,
        utilities,
        SystemControl::new(shutdown.clone()),
    ));

    Rig {
        dispatcher,
        hardware,
        feedback,
        labels,
        shutdown,
        midi_switch,
        engine,
        dir,
    }
}
