//! Transport commands to the loop engine over OSC.
//!
//! The recording flag is a local mirror flipped on every `record` hit. It
//! is never read back from the engine and can drift if a send is lost.

use std::io;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rosc::{OscMessage, OscPacket, OscType};

use crate::osc::listener::{Flow, OscListener};
use crate::types::{LabelSink, TransportVerb};

/// The engine loop all transport verbs address.
const LOOP_HIT_ADDR: &str = "/sl/0/hit";
const LOOP_GET_ADDR: &str = "/sl/0/get";
/// Path the engine sends `get` replies to.
const GET_RESPONSE_PATH: &str = "/get_response";

pub const MENU: &str = "looper";
pub const STATE_LABEL: &str = "lbl_state";

pub struct LooperTransport {
    socket: UdpSocket,
    engine_addr: String,
    feedback_port: u16,
    recording: AtomicBool,
    labels: Arc<dyn LabelSink>,
}

impl LooperTransport {
    pub fn new(
        engine_addr: &str,
        feedback_port: u16,
        labels: Arc<dyn LabelSink>,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Self {
            socket,
            engine_addr: engine_addr.to_string(),
            feedback_port,
            recording: AtomicBool::new(false),
            labels,
        })
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// Hit one transport verb on loop 0. A `record` hit flips the local
    /// recording flag even when the send fails.
    pub fn send(&self, verb: TransportVerb) -> io::Result<()> {
        log::debug!(target: "looper", "{} s {}", LOOP_HIT_ADDR, verb);
        let result = self.send_message(LOOP_HIT_ADDR, vec![OscType::String(verb.as_str().to_string())]);

        if verb == TransportVerb::Record {
            let recording = !self.recording.fetch_xor(true, Ordering::SeqCst);
            log::info!(target: "looper", "recording: {}", recording);
            let text = if recording { "recording" } else { "not recording" };
            self.labels.update_label(MENU, STATE_LABEL, text);
        }

        result
    }

    /// Ask the engine for loop 0's state; the reply lands on the feedback listener.
    pub fn query_state(&self) -> io::Result<()> {
        self.send_message(
            LOOP_GET_ADDR,
            vec![
                OscType::String("state".to_string()),
                OscType::String(self.feedback_uri()),
                OscType::String(GET_RESPONSE_PATH.to_string()),
            ],
        )
    }

    fn feedback_uri(&self) -> String {
        format!("osc.udp://localhost:{}", self.feedback_port)
    }

    fn send_message(&self, addr: &str, args: Vec<OscType>) -> io::Result<()> {
        let msg = OscPacket::Message(OscMessage {
            addr: addr.to_string(),
            args,
        });
        let buf = rosc::encoder::encode(&msg)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        self.socket.send_to(&buf, &self.engine_addr)?;
        Ok(())
    }
}

/// Listener for replies the loop engine sends back (`/get_response`,
/// `/ping_response`, `/quit`). Replies are logged only.
pub fn spawn_engine_feedback(port: u16) -> io::Result<OscListener> {
    OscListener::bind("looper-feedback", &format!("0.0.0.0:{}", port), |_, msg, from| {
        match msg.addr.as_str() {
            "/get_response" | "/ping_response" | "/quit" => {
                log::info!(target: "looper", "engine {} from {}: {:?}", msg.addr, from, msg.args)
            }
            other => log::debug!(target: "looper", "unexpected engine message {}", other),
        }
        Flow::Continue
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LabelBoard;
    use std::time::Duration;

    fn engine() -> UdpSocket {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        socket
    }

    fn recv_message(socket: &UdpSocket) -> OscMessage {
        let mut buf = [0u8; 1024];
        let (n, _) = socket.recv_from(&mut buf).unwrap();
        match rosc::decoder::decode_udp(&buf[..n]).unwrap().1 {
            OscPacket::Message(msg) => msg,
            other => panic!("Expected message, got {:?}", other),
        }
    }

    #[test]
    fn hit_is_addressed_to_loop_zero() {
        let engine = engine();
        let labels = Arc::new(LabelBoard::new());
        let transport =
            LooperTransport::new(&engine.local_addr().unwrap().to_string(), 9959, labels).unwrap();

        transport.send(TransportVerb::Undo).unwrap();
        let msg = recv_message(&engine);
        assert_eq!(msg.addr, "/sl/0/hit");
        assert_eq!(msg.args, vec![OscType::String("undo".to_string())]);
        assert!(!transport.is_recording());
    }

    #[test]
    fn record_flips_flag_and_label() {
        let engine = engine();
        let labels = Arc::new(LabelBoard::new());
        let transport = LooperTransport::new(
            &engine.local_addr().unwrap().to_string(),
            9959,
            labels.clone(),
        )
        .unwrap();

        transport.send(TransportVerb::Record).unwrap();
        assert!(transport.is_recording());
        assert_eq!(labels.get(MENU, STATE_LABEL).as_deref(), Some("recording"));

        transport.send(TransportVerb::Record).unwrap();
        assert!(!transport.is_recording());
        assert_eq!(labels.get(MENU, STATE_LABEL).as_deref(), Some("not recording"));
    }

    #[test]
    fn query_state_names_the_reply_path() {
        let engine = engine();
        let transport = LooperTransport::new(
            &engine.local_addr().unwrap().to_string(),
            9959,
            Arc::new(LabelBoard::new()),
        )
        .unwrap();

        transport.query_state().unwrap();
        let msg = recv_message(&engine);
        assert_eq!(msg.addr, "/sl/0/get");
        assert_eq!(
            msg.args,
            vec![
                OscType::String("state".to_string()),
                OscType::String("osc.udp://localhost:9959".to_string()),
                OscType::String("/get_response".to_string()),
            ]
        );
    }
}
