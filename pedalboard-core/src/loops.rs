//! Loop switcher control: per-loop toggles and preset recall.
//!
//! Loop state and the active preset sit behind one mutex, and CC messages
//! are sent while it is held, so the order of messages on the wire always
//! matches the order of state changes regardless of which input thread
//! issued them.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::cc::CcSink;
use crate::types::{
    Action, LabelSink, LoopState, MidiMappingTable, PresetTable, LOOP_COUNT,
};

/// Loop switcher CC number of loop 1; loops 1..=4 use 80..=83.
pub const LOOP_CC_BASE: u8 = 80;

pub const MENU: &str = "midi";
pub const LOOPS_LABEL: &str = "lbl_loops";
pub const PRESETS_MENU: &str = "presets";
pub const PRESET_LABEL: &str = "lbl_preset";

/// Controller numbers of the foot-controller LEDs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedbackLayout {
    loop_leds: [Option<u8>; LOOP_COUNT],
    preset_indicators: Vec<(usize, u8)>,
}

impl FeedbackLayout {
    /// LEDs sit on the same controllers the pedals send.
    pub fn from_mapping(table: &MidiMappingTable) -> Self {
        let mut loop_leds = [None; LOOP_COUNT];
        for (i, led) in loop_leds.iter_mut().enumerate() {
            *led = table.controller_for(Action::ToggleLoop(i + 1));
        }
        Self {
            loop_leds,
            preset_indicators: table.preset_indicators(),
        }
    }

    pub fn loop_led(&self, loop_index: usize) -> Option<u8> {
        loop_index
            .checked_sub(1)
            .and_then(|i| self.loop_leds.get(i).copied().flatten())
    }

    pub fn preset_indicators(&self) -> &[(usize, u8)] {
        &self.preset_indicators
    }
}

#[derive(Debug, Default)]
struct LoopBank {
    loops: LoopState,
    current_preset: usize,
}

pub struct LoopController {
    bank: Mutex<LoopBank>,
    presets: PresetTable,
    hardware: Option<Box<dyn CcSink>>,
    feedback: Option<Box<dyn CcSink>>,
    layout: FeedbackLayout,
    labels: Arc<dyn LabelSink>,
}

impl LoopController {
    pub fn new(
        presets: PresetTable,
        hardware: Option<Box<dyn CcSink>>,
        feedback: Option<Box<dyn CcSink>>,
        layout: FeedbackLayout,
        labels: Arc<dyn LabelSink>,
    ) -> Self {
        if hardware.is_none() {
            log::warn!(target: "loops", "no loop hardware: loop changes stay in memory only");
        }
        Self {
            bank: Mutex::new(LoopBank::default()),
            presets,
            hardware,
            feedback,
            layout,
            labels,
        }
    }

    fn bank(&self) -> MutexGuard<'_, LoopBank> {
        self.bank.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn loop_state(&self) -> LoopState {
        self.bank().loops
    }

    pub fn current_preset(&self) -> usize {
        self.bank().current_preset
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    /// Flip a 1-based loop and send its new value. Returns the new value,
    /// `None` for an out-of-range loop.
    pub fn toggle(&self, loop_index: usize) -> Option<bool> {
        let mut bank = self.bank();
        let Some(on) = bank.loops.toggle(loop_index) else {
            log::debug!(target: "loops", "ignoring toggle of loop {}", loop_index);
            return None;
        };
        log::info!(target: "loops", "loop {} {}", loop_index, if on { "on" } else { "off" });

        self.send_hardware(loop_cc(loop_index - 1), on);
        if let Some(led) = self.layout.loop_led(loop_index) {
            self.send_feedback(led, on);
        }
        let state = bank.loops;
        drop(bank);

        self.labels.update_label(MENU, LOOPS_LABEL, &state.to_string());
        Some(on)
    }

    /// Apply a preset. All four loops are sent, changed or not, so the
    /// hardware resyncs after any missed message. Returns `false` for an
    /// unknown preset index.
    pub fn trigger_preset(&self, index: usize) -> bool {
        let Some(preset) = self.presets.get(index) else {
            log::debug!(target: "loops", "ignoring unknown preset {}", index);
            return false;
        };
        log::info!(target: "loops", "preset {} ({})", index, preset.name);

        let mut bank = self.bank();
        bank.current_preset = index;
        bank.loops.set_all(preset.loops);

        for (offset, on) in preset.loops.iter().enumerate() {
            self.send_hardware(loop_cc(offset), *on);
        }
        for (offset, on) in preset.loops.iter().enumerate() {
            if let Some(led) = self.layout.loop_led(offset + 1) {
                self.send_feedback(led, *on);
            }
        }
        for (_, controller) in self.layout.preset_indicators() {
            self.send_feedback(*controller, false);
        }
        if let Some((_, controller)) = self
            .layout
            .preset_indicators()
            .iter()
            .find(|(preset, _)| *preset == index)
        {
            self.send_feedback(*controller, true);
        }
        let state = bank.loops;
        drop(bank);

        self.labels.update_label(MENU, LOOPS_LABEL, &state.to_string());
        self.labels
            .update_label(PRESETS_MENU, PRESET_LABEL, &format!("Preset: {}", preset.name));
        true
    }

    fn send_hardware(&self, controller: u8, on: bool) {
        match &self.hardware {
            Some(port) => {
                if let Err(e) = port.send_cc(controller, on as u8) {
                    log::warn!(target: "loops", "CC {} to {}: {}", controller, port.describe(), e);
                }
            }
            None => {
                log::warn!(target: "loops", "no loop hardware, skipped CC {} = {}", controller, on as u8)
            }
        }
    }

    fn send_feedback(&self, controller: u8, on: bool) {
        match &self.feedback {
            Some(port) => {
                if let Err(e) = port.send_cc(controller, on as u8) {
                    log::warn!(target: "loops", "LED CC {} to {}: {}", controller, port.describe(), e);
                }
            }
            None => log::debug!(target: "loops", "no feedback port, skipped LED CC {}", controller),
        }
    }
}

fn loop_cc(offset: usize) -> u8 {
    LOOP_CC_BASE + offset as u8
}
