mod common;

use pedalboard_core::types::{Action, Dispatcher, MidiInputControl};

#[test]
fn toggles_and_presets_drive_the_loop_switcher() {
    let rig = common::rig();
    rig.dispatcher.dispatch(Action::ToggleLoop(1));
    rig.dispatcher.dispatch(Action::ToggleLoop(1));
    assert_eq!(rig.hardware.take(), vec![(80, 1), (80, 0)]);

    rig.dispatcher.dispatch(Action::TriggerPreset(0));
    assert_eq!(rig.hardware.take(), vec![(80, 0), (81, 0), (82, 0), (83, 0)]);
    assert_eq!(
        rig.labels.get("midi", "lbl_loops").as_deref(),
        Some("1:off 2:off 3:off 4:off")
    );
}

#[test]
fn out_of_range_payloads_are_ignored() {
    let rig = common::rig();
    rig.dispatcher.dispatch(Action::ToggleLoop(7));
    rig.dispatcher.dispatch(Action::TriggerPreset(42));
    rig.dispatcher.dispatch(Action::PlayTrack(9));
    assert!(rig.hardware.take().is_empty());
    assert!(rig.feedback.take().is_empty());
    assert_eq!(rig.dispatcher.loops().current_preset(), 0);
    assert!(!rig.dispatcher.player().is_playing());
}

#[test]
fn shutdown_action_reaches_the_shutdown_capability() {
    let rig = common::rig();
    rig.dispatcher.dispatch(Action::Shutdown);
    assert!(rig.shutdown.requested());
}

#[test]
fn show_mapping_fills_the_mapping_label() {
    let rig = common::rig();
    rig.dispatcher.dispatch(Action::ShowMapping);
    let text = rig.labels.get("utilities", "lbl_mapping").unwrap();
    assert!(text.contains("ch1 cc9 -> LooperTransport(record)"));
}

#[test]
fn flush_midi_reenables_input() {
    let rig = common::rig();
    rig.midi_switch.set_enabled(false);
    rig.dispatcher.dispatch(Action::FlushMidi);
    assert!(rig.midi_switch.is_enabled());
}
