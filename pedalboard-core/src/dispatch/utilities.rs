//! Utility menu: MIDI/audio passthrough, MIDI flush, mapping listing.

use std::sync::Arc;

use crate::probe::midi_clients_present;
use crate::tools::{run_tool, tool_output, ToolError};
use crate::types::{LabelSink, MidiInputControl, MidiMappingTable, PassthroughKind};

pub const MENU: &str = "utilities";
pub const MAPPING_LABEL: &str = "lbl_mapping";

pub struct Utilities {
    aconnect: String,
    jack_connect: String,
    foot_controller: String,
    loop_hardware: String,
    table: MidiMappingTable,
    midi_input: Arc<dyn MidiInputControl>,
    labels: Arc<dyn LabelSink>,
}

impl Utilities {
    pub fn new(
        foot_controller: &str,
        loop_hardware: &str,
        table: MidiMappingTable,
        midi_input: Arc<dyn MidiInputControl>,
        labels: Arc<dyn LabelSink>,
    ) -> Self {
        Self {
            aconnect: "aconnect".to_string(),
            jack_connect: "jack_connect".to_string(),
            foot_controller: foot_controller.to_string(),
            loop_hardware: loop_hardware.to_string(),
            table,
            midi_input,
            labels,
        }
    }

    /// Returns `Ok(false)` when the MIDI devices to bridge are not present.
    pub fn passthrough(&self, kind: PassthroughKind) -> Result<bool, ToolError> {
        match kind {
            PassthroughKind::Midi => {
                let listing = tool_output(&self.aconnect, &["-i", "-o"])?;
                let devices = [self.foot_controller.as_str(), self.loop_hardware.as_str()];
                if !midi_clients_present(&listing, &devices) {
                    log::warn!(
                        target: "utilities",
                        "MIDI passthrough needs {} and {}",
                        self.foot_controller,
                        self.loop_hardware
                    );
                    return Ok(false);
                }
                run_tool(&self.aconnect, &devices)?;
                // The loop hardware now hears the controller directly
                self.midi_input.set_enabled(false);
                log::info!(target: "utilities", "MIDI passthrough {} -> {}", devices[0], devices[1]);
                Ok(true)
            }
            PassthroughKind::Audio => {
                run_tool(&self.jack_connect, &["system:capture_1", "system:playback_1"])?;
                log::info!(target: "utilities", "audio passthrough on");
                Ok(true)
            }
        }
    }

    /// Drop every ALSA sequencer connection and resume translating input.
    pub fn flush_midi(&self) -> Result<(), ToolError> {
        let result = run_tool(&self.aconnect, &["-x"]);
        self.midi_input.set_enabled(true);
        result
    }

    pub fn show_mapping(&self) {
        self.labels.update_label(MENU, MAPPING_LABEL, &self.table.describe());
    }
}
