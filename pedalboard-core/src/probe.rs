//! Environment predicates backed by OS listing tools.
//!
//! Parsing is split from invocation so the predicates can be checked
//! against captured tool output.

use crate::tools::{tool_output, ToolError};

/// `aplay -l` output mentions the expected card (e.g. `"card 0:"`).
pub fn check_sound_card(expected: &str) -> Result<bool, ToolError> {
    let output = tool_output("aplay", &["-l"])?;
    Ok(output.contains(expected))
}

/// Every name appears in some `client ...` line of `aconnect -i -o`.
pub fn check_midi_clients<S: AsRef<str>>(names: &[S]) -> Result<bool, ToolError> {
    let output = tool_output("aconnect", &["-i", "-o"])?;
    Ok(midi_clients_present(&output, names))
}

/// Every program is running according to `ps aux`.
pub fn check_processes<S: AsRef<str>>(programs: &[S]) -> Result<bool, ToolError> {
    let output = tool_output("ps", &["aux"])?;
    Ok(processes_present(&output, programs))
}

pub(crate) fn midi_clients_present<S: AsRef<str>>(listing: &str, names: &[S]) -> bool {
    let clients: Vec<&str> = listing
        .lines()
        .filter(|line| line.starts_with("client"))
        .collect();
    names
        .iter()
        .all(|name| clients.iter().any(|client| client.contains(name.as_ref())))
}

pub(crate) fn processes_present<S: AsRef<str>>(listing: &str, programs: &[S]) -> bool {
    // ps aux: the command is the 11th column
    let commands: Vec<&str> = listing
        .lines()
        .filter_map(|line| line.split_whitespace().nth(10))
        .collect();
    programs
        .iter()
        .all(|program| commands.contains(&program.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACONNECT: &str = "\
client 0: 'System' [type=kernel]
    0 'Timer           '
    1 'Announce        '
client 14: 'Midi Through' [type=kernel]
    0 'Midi Through Port-0'
client 20: 'USBMIDI' [type=kernel,card=1]
    0 'USBMIDI MIDI 1  '
";

    const PS: &str = "\
USER       PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND
pi         612  2.1  1.0  12345  6789 ?        SLl  10:00   0:42 /usr/bin/jackd -dalsa
pi         700  0.0  0.1   1234   567 pts/0    S+   10:01   0:00 bash
";

    #[test]
    fn midi_clients_all_required() {
        assert!(midi_clients_present(ACONNECT, &["System", "Midi Through"]));
        assert!(midi_clients_present(ACONNECT, &["USBMIDI"]));
        assert!(!midi_clients_present(ACONNECT, &["USBMIDI", "CH345"]));
    }

    #[test]
    fn port_lines_do_not_count_as_clients() {
        assert!(!midi_clients_present(ACONNECT, &["Timer"]));
    }

    #[test]
    fn processes_match_command_column() {
        assert!(processes_present(PS, &["/usr/bin/jackd"]));
        assert!(!processes_present(PS, &["jackd"]));
        assert!(!processes_present(PS, &["/usr/bin/jackd", "sooperlooper"]));
    }
}
