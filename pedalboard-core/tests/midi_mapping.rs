mod common;

use std::sync::Arc;

use common::RecordingDispatcher;
use pedalboard_core::midi::{MidiInputSwitch, MidiRouter};
use pedalboard_core::types::{Action, MidiInputControl, MidiMappingTable};

fn router() -> (MidiRouter, Arc<MidiInputSwitch>) {
    let switch = Arc::new(MidiInputSwitch::new());
    (MidiRouter::new(MidiMappingTable::foot_controller(), switch.clone()), switch)
}

fn cc(channel: u8, controller: u8) -> [u8; 3] {
    [0xB0 | channel, controller, 127]
}

#[test]
fn every_mapped_pair_dispatches_exactly_once() {
    let (router, _) = router();
    let dispatcher = RecordingDispatcher::new();
    for mapping in MidiMappingTable::foot_controller().entries() {
        router.handle_bytes(&cc(mapping.channel, mapping.controller), dispatcher.as_ref());
        assert_eq!(dispatcher.take(), vec![mapping.action]);
    }
}

#[test]
fn unmapped_pairs_dispatch_nothing() {
    let (router, _) = router();
    let table = MidiMappingTable::foot_controller();
    let dispatcher = RecordingDispatcher::new();
    for channel in 0..16u8 {
        for controller in 0..128u8 {
            if table.lookup(channel, controller).is_none() {
                router.handle_bytes(&cc(channel, controller), dispatcher.as_ref());
            }
        }
    }
    assert!(dispatcher.take().is_empty());
}

#[test]
fn disabled_input_dispatches_nothing_until_reenabled() {
    let (router, switch) = router();
    let dispatcher = RecordingDispatcher::new();

    switch.set_enabled(false);
    for mapping in MidiMappingTable::foot_controller().entries() {
        router.handle_bytes(&cc(mapping.channel, mapping.controller), dispatcher.as_ref());
    }
    assert!(dispatcher.take().is_empty());

    switch.set_enabled(true);
    router.handle_bytes(&cc(0, 9), dispatcher.as_ref());
    assert_eq!(dispatcher.take().len(), 1);
}

#[test]
fn value_does_not_affect_routing() {
    let (router, _) = router();
    let dispatcher = RecordingDispatcher::new();
    router.handle_bytes(&[0xB0, 2, 0], dispatcher.as_ref());
    router.handle_bytes(&[0xB0, 2, 64], dispatcher.as_ref());
    assert_eq!(dispatcher.take(), vec![Action::ToggleLoop(2), Action::ToggleLoop(2)]);
}
