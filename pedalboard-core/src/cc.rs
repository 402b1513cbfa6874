//! Outbound MIDI control-change messages through the `midisend` utility.
//!
//! Ports are resolved once at startup. An absent listing tool or an absent
//! device both yield `None`; callers keep working without hardware.

use regex::Regex;

use crate::tools::{run_tool, tool_output, ToolError};

/// `midisend` mode argument selecting control-change messages.
const MODE_CC: &str = "0";

/// Destination for control-change messages.
pub trait CcSink: Send + Sync {
    fn send_cc(&self, controller: u8, value: u8) -> Result<(), ToolError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// One MIDI output port addressed by `midisend <port> 0 <cc> <value>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidisendPort {
    program: String,
    port_index: u32,
    device: String,
}

impl MidisendPort {
    pub fn new(program: impl Into<String>, port_index: u32, device: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            port_index,
            device: device.into(),
        }
    }

    /// Look up `device` in `<program> --list` output.
    pub fn resolve(program: &str, device: &str) -> Option<Self> {
        let listing = match tool_output(program, &["--list"]) {
            Ok(listing) => listing,
            Err(e) if e.is_missing() => {
                log::warn!(target: "midi::out", "{}: CC output to {} disabled", e, device);
                return None;
            }
            Err(e) => {
                log::warn!(target: "midi::out", "listing MIDI ports failed: {}", e);
                return None;
            }
        };
        match find_port_index(&listing, device) {
            Some(port_index) => {
                log::info!(target: "midi::out", "{} on port {}", device, port_index);
                Some(Self::new(program, port_index, device))
            }
            None => {
                log::warn!(target: "midi::out", "MIDI device {} not found, CC output disabled", device);
                None
            }
        }
    }

    fn args(&self, controller: u8, value: u8) -> [String; 4] {
        [
            self.port_index.to_string(),
            MODE_CC.to_string(),
            controller.to_string(),
            value.to_string(),
        ]
    }
}

impl CcSink for MidisendPort {
    fn send_cc(&self, controller: u8, value: u8) -> Result<(), ToolError> {
        run_tool(&self.program, &self.args(controller, value))
    }

    fn describe(&self) -> String {
        format!("{} (port {})", self.device, self.port_index)
    }
}

/// Leading port number of the first listing line naming `device`.
pub(crate) fn find_port_index(listing: &str, device: &str) -> Option<u32> {
    let leading_number = Regex::new(r"^\s*(\d+)").ok()?;
    listing
        .lines()
        .filter(|line| line.contains(device))
        .find_map(|line| {
            leading_number
                .captures(line)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
0: Midi Through:Midi Through Port-0 14:0
1: USBMIDI:USBMIDI MIDI 1 20:0
2: CH345:CH345 MIDI 1 24:0
";

    #[test]
    fn finds_device_port() {
        assert_eq!(find_port_index(LISTING, "CH345"), Some(2));
        assert_eq!(find_port_index(LISTING, "USBMIDI"), Some(1));
    }

    #[test]
    fn missing_device_is_none() {
        assert_eq!(find_port_index(LISTING, "UM-ONE"), None);
        assert_eq!(find_port_index("", "CH345"), None);
    }

    #[test]
    fn multi_digit_port_numbers() {
        assert_eq!(find_port_index("12: CH345 MIDI 1\n", "CH345"), Some(12));
    }

    #[test]
    fn send_args_follow_midisend_contract() {
        let port = MidisendPort::new("midisend", 2, "CH345");
        assert_eq!(port.args(80, 1), ["2", "0", "80", "1"].map(String::from));
    }

    #[test]
    fn absent_listing_tool_disables_port() {
        assert!(MidisendPort::resolve("pedalboard-no-such-midisend", "CH345").is_none());
    }
}
