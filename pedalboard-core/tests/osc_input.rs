mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{recv_osc, send_osc, udp_socket, wait_until, RecordingDispatcher, RecordingShutdown};
use pedalboard_core::osc::OscInput;
use pedalboard_core::types::{Action, TransportVerb};
use rosc::OscType;

const TIMEOUT: Duration = Duration::from_secs(2);

fn recording_input() -> (OscInput, Arc<RecordingDispatcher>, Arc<RecordingShutdown>) {
    let dispatcher = RecordingDispatcher::new();
    let shutdown = RecordingShutdown::new();
    let input = OscInput::bind_addr("127.0.0.1:0", dispatcher.clone(), shutdown.clone()).unwrap();
    (input, dispatcher, shutdown)
}

#[test]
fn preset_path_dispatches_trigger_preset() {
    let (input, dispatcher, _) = recording_input();
    let client = udp_socket();
    send_osc(&client, input.local_addr(), "/preset/2", vec![]);
    assert_eq!(dispatcher.wait_for(1, TIMEOUT), vec![Action::TriggerPreset(2)]);
}

#[test]
fn transport_messages_in_both_forms() {
    let (input, dispatcher, _) = recording_input();
    let client = udp_socket();
    send_osc(&client, input.local_addr(), "/sl/record", vec![]);
    send_osc(&client, input.local_addr(), "/sl", vec![OscType::String("undo".into())]);
    assert_eq!(
        dispatcher.wait_for(2, TIMEOUT),
        vec![
            Action::LooperTransport(TransportVerb::Record),
            Action::LooperTransport(TransportVerb::Undo),
        ]
    );
}

#[test]
fn unmatched_and_reserved_addresses_dispatch_nothing() {
    let (input, dispatcher, _) = recording_input();
    let client = udp_socket();
    send_osc(&client, input.local_addr(), "/metronome/tap", vec![]);
    send_osc(&client, input.local_addr(), "/sl/scratch", vec![]);
    send_osc(&client, input.local_addr(), "/nothing", vec![]);
    // A known message afterwards proves the earlier ones were processed
    send_osc(&client, input.local_addr(), "/preset", vec![OscType::Int(1)]);
    assert_eq!(dispatcher.wait_for(1, TIMEOUT), vec![Action::TriggerPreset(1)]);
}

#[test]
fn ping_is_answered_with_pong() {
    let (input, _, _) = recording_input();
    let client = udp_socket();
    send_osc(&client, input.local_addr(), "/ping", vec![]);
    assert_eq!(recv_osc(&client).addr, "/pong");
}

#[test]
fn quit_stops_listener_and_requests_shutdown() {
    let (input, dispatcher, shutdown) = recording_input();
    let client = udp_socket();
    send_osc(&client, input.local_addr(), "/quit", vec![]);
    assert!(wait_until(TIMEOUT, || !input.is_running()));
    assert!(shutdown.requested());

    send_osc(&client, input.local_addr(), "/preset/1", vec![]);
    std::thread::sleep(Duration::from_millis(100));
    assert!(dispatcher.take().is_empty());
}

#[test]
fn sl_record_reaches_engine_and_flips_recording_flag() {
    let rig = common::rig();
    let input =
        OscInput::bind_addr("127.0.0.1:0", rig.dispatcher.clone(), rig.shutdown.clone()).unwrap();
    let client = udp_socket();
    send_osc(&client, input.local_addr(), "/sl/record", vec![]);

    let hit = recv_osc(&rig.engine);
    assert_eq!(hit.addr, "/sl/0/hit");
    assert_eq!(hit.args, vec![OscType::String("record".into())]);
    assert!(wait_until(TIMEOUT, || rig.dispatcher.transport().is_recording()));
    assert_eq!(rig.labels.get("looper", "lbl_state").as_deref(), Some("recording"));

    send_osc(&client, input.local_addr(), "/preset/2", vec![]);
    assert!(wait_until(TIMEOUT, || rig.dispatcher.loops().current_preset() == 2));
}
