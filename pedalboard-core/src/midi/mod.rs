//! Foot-controller MIDI input.
//!
//! The midir callback thread parses each message into a control change,
//! looks it up in the mapping table and dispatches the bound action. The
//! router can be switched off without closing the port (MIDI passthrough
//! hands the controller to the loop hardware directly).

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use midir::{MidiInput as MidirInput, MidiInputConnection};

use crate::types::{Action, ControlChange, Dispatcher, MidiInputControl, MidiMappingTable};

const CLIENT_NAME: &str = "pedalboard";
const PORT_NAME: &str = "pedalboard-input";

#[derive(Debug)]
pub enum MidiInputError {
    /// The MIDI backend could not be opened.
    Init(String),
    /// No input port name starts with the configured prefix.
    DeviceNotFound(String),
    Connect(String),
}

impl fmt::Display for MidiInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiInputError::Init(e) => write!(f, "MIDI init failed: {}", e),
            MidiInputError::DeviceNotFound(name) => write!(f, "MIDI device {} not found", name),
            MidiInputError::Connect(e) => write!(f, "MIDI connect failed: {}", e),
        }
    }
}

impl std::error::Error for MidiInputError {}

/// Atomic on/off switch for translating foot-controller messages.
#[derive(Debug)]
pub struct MidiInputSwitch {
    enabled: AtomicBool,
}

impl MidiInputSwitch {
    pub fn new() -> Self {
        Self { enabled: AtomicBool::new(true) }
    }
}

impl Default for MidiInputSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiInputControl for MidiInputSwitch {
    fn set_enabled(&self, enabled: bool) {
        log::info!(target: "midi", "input {}", if enabled { "enabled" } else { "disabled" });
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

/// Translates control changes into actions through the mapping table.
pub struct MidiRouter {
    table: MidiMappingTable,
    switch: Arc<MidiInputSwitch>,
}

impl MidiRouter {
    pub fn new(table: MidiMappingTable, switch: Arc<MidiInputSwitch>) -> Self {
        Self { table, switch }
    }

    /// The bound action, or `None` when disabled or unmapped.
    pub fn route(&self, cc: &ControlChange) -> Option<Action> {
        if !self.switch.is_enabled() {
            log::debug!(target: "midi", "input disabled, dropped {:?}", cc);
            return None;
        }
        let action = self.table.lookup(cc.channel, cc.controller);
        if action.is_none() {
            log::debug!(target: "midi", "no mapping for ch{} cc{}", cc.channel, cc.controller);
        }
        action
    }

    /// Route raw MIDI bytes; non-CC messages are ignored.
    pub fn handle_bytes(&self, message: &[u8], dispatcher: &dyn Dispatcher) {
        let Some(cc) = ControlChange::parse(message) else {
            return;
        };
        if let Some(action) = self.route(&cc) {
            log::debug!(target: "midi", "ch{} cc{} -> {}", cc.channel, cc.controller, action);
            dispatcher.dispatch(action);
        }
    }
}

/// Open connection to the foot controller. Closed on drop.
pub struct MidiInput {
    port_name: String,
    connection: Option<MidiInputConnection<()>>,
}

impl MidiInput {
    /// Connect to the first input port whose name starts with `port_prefix`.
    pub fn connect(
        port_prefix: &str,
        router: MidiRouter,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Result<Self, MidiInputError> {
        let midi_in =
            MidirInput::new(CLIENT_NAME).map_err(|e| MidiInputError::Init(e.to_string()))?;

        let ports = midi_in.ports();
        let found = ports.iter().find_map(|port| {
            midi_in
                .port_name(port)
                .ok()
                .filter(|name| name.starts_with(port_prefix))
                .map(|name| (port.clone(), name))
        });
        let Some((port, port_name)) = found else {
            return Err(MidiInputError::DeviceNotFound(port_prefix.to_string()));
        };

        let connection = midi_in
            .connect(
                &port,
                PORT_NAME,
                move |_timestamp, message, _| router.handle_bytes(message, dispatcher.as_ref()),
                (),
            )
            .map_err(|e| MidiInputError::Connect(e.to_string()))?;

        log::info!(target: "midi", "listening on {}", port_name);
        Ok(Self {
            port_name,
            connection: Some(connection),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
            log::info!(target: "midi", "closed {}", self.port_name);
        }
    }
}

impl Drop for MidiInput {
    fn drop(&mut self) {
        self.close();
    }
}
