//! OSC control input.
//!
//! Address routing is a pure function from a decoded message to an
//! [`OscRoute`]; [`OscInput`] runs it on a listener thread and acts on the
//! result.

pub mod listener;

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

use rosc::{OscMessage, OscPacket, OscType};

use crate::types::{Action, Dispatcher, Shutdownable, TransportVerb};
use listener::{Flow, OscListener};

const PONG_ADDR: &str = "/pong";

/// What an inbound OSC message means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OscRoute {
    /// Liveness probe; answered with `/pong`.
    Ping,
    /// Stop listening and shut the application down.
    Quit,
    Dispatch(Action),
    /// Reserved address with no behavior yet.
    Unimplemented(String),
    Unmatched,
}

/// Map a message to its route.
///
/// `/preset/<n>` and `/preset ,i <n>` recall a preset; `/sl/<verb>` and
/// `/sl ,s <verb>` hit a transport verb. Anything else under `/metronome`
/// is reserved.
pub fn route_message(msg: &OscMessage) -> OscRoute {
    let mut parts = msg.addr.trim_start_matches('/').split('/');
    let head = parts.next().unwrap_or("");
    let tail = parts.next();
    let extra = parts.next().is_some();

    match (head, tail, extra) {
        ("ping", None, false) => OscRoute::Ping,
        ("quit", None, false) => OscRoute::Quit,
        ("preset", Some(index), false) => match index.parse::<usize>() {
            Ok(index) => OscRoute::Dispatch(Action::TriggerPreset(index)),
            Err(_) => OscRoute::Unmatched,
        },
        ("preset", None, false) => {
            let index = match msg.args.first() {
                Some(OscType::Int(index)) => usize::try_from(*index).ok(),
                Some(OscType::Long(index)) => usize::try_from(*index).ok(),
                _ => None,
            };
            match index {
                Some(index) => OscRoute::Dispatch(Action::TriggerPreset(index)),
                None => OscRoute::Unmatched,
            }
        }
        ("sl", Some(verb), false) => transport_route(verb),
        ("sl", None, false) => match msg.args.first() {
            Some(OscType::String(verb)) => transport_route(verb),
            _ => OscRoute::Unmatched,
        },
        ("metronome", _, _) => OscRoute::Unimplemented(msg.addr.clone()),
        _ => OscRoute::Unmatched,
    }
}

fn transport_route(verb: &str) -> OscRoute {
    match verb.parse::<TransportVerb>() {
        Ok(verb) => OscRoute::Dispatch(Action::LooperTransport(verb)),
        Err(_) => OscRoute::Unmatched,
    }
}

/// The OSC control listener.
pub struct OscInput {
    listener: OscListener,
}

impl OscInput {
    /// Listen on all interfaces at `port`.
    pub fn bind(
        port: u16,
        dispatcher: Arc<dyn Dispatcher>,
        shutdown: Arc<dyn Shutdownable>,
    ) -> io::Result<Self> {
        Self::bind_addr(&format!("0.0.0.0:{}", port), dispatcher, shutdown)
    }

    pub fn bind_addr(
        addr: &str,
        dispatcher: Arc<dyn Dispatcher>,
        shutdown: Arc<dyn Shutdownable>,
    ) -> io::Result<Self> {
        let listener = OscListener::bind("osc-input", addr, move |socket, msg, from| {
            handle_message(socket, msg, from, dispatcher.as_ref(), shutdown.as_ref())
        })?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    pub fn is_running(&self) -> bool {
        self.listener.is_running()
    }

    pub fn stop(&mut self) {
        self.listener.stop();
    }
}

fn handle_message(
    socket: &UdpSocket,
    msg: OscMessage,
    from: SocketAddr,
    dispatcher: &dyn Dispatcher,
    shutdown: &dyn Shutdownable,
) -> Flow {
    match route_message(&msg) {
        OscRoute::Ping => {
            log::info!(target: "osc", "ping from {}", from);
            if let Err(e) = send_pong(socket, from) {
                log::warn!(target: "osc", "pong to {} failed: {}", from, e);
            }
            Flow::Continue
        }
        OscRoute::Quit => {
            log::info!(target: "osc", "quit requested by {}", from);
            shutdown.request_shutdown();
            Flow::Stop
        }
        OscRoute::Dispatch(action) => {
            log::debug!(target: "osc", "{} -> {}", msg.addr, action);
            dispatcher.dispatch(action);
            Flow::Continue
        }
        OscRoute::Unimplemented(addr) => {
            log::warn!(target: "osc", "{} is not implemented", addr);
            Flow::Continue
        }
        OscRoute::Unmatched => {
            log::debug!(target: "osc", "unmatched {} {:?}", msg.addr, msg.args);
            Flow::Continue
        }
    }
}

fn send_pong(socket: &UdpSocket, to: SocketAddr) -> io::Result<()> {
    let packet = OscPacket::Message(OscMessage {
        addr: PONG_ADDR.to_string(),
        args: vec![],
    });
    let buf = rosc::encoder::encode(&packet)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    socket.send_to(&buf, to)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(addr: &str, args: Vec<OscType>) -> OscMessage {
        OscMessage { addr: addr.to_string(), args }
    }

    #[test]
    fn preset_index_from_path_or_argument() {
        assert_eq!(
            route_message(&msg("/preset/2", vec![])),
            OscRoute::Dispatch(Action::TriggerPreset(2))
        );
        assert_eq!(
            route_message(&msg("/preset", vec![OscType::Int(3)])),
            OscRoute::Dispatch(Action::TriggerPreset(3))
        );
    }

    #[test]
    fn malformed_preset_is_unmatched() {
        assert_eq!(route_message(&msg("/preset/two", vec![])), OscRoute::Unmatched);
        assert_eq!(route_message(&msg("/preset", vec![])), OscRoute::Unmatched);
        assert_eq!(
            route_message(&msg("/preset", vec![OscType::Int(-1)])),
            OscRoute::Unmatched
        );
        assert_eq!(route_message(&msg("/preset/1/2", vec![])), OscRoute::Unmatched);
        assert_eq!(
            route_message(&msg("/preset", vec![OscType::Long(-4)])),
            OscRoute::Unmatched
        );
    }

    #[test]
    fn long_preset_index_must_fit_the_platform() {
        assert_eq!(
            route_message(&msg("/preset", vec![OscType::Long(4)])),
            OscRoute::Dispatch(Action::TriggerPreset(4))
        );
        let wide = i64::from(u32::MAX) + 1;
        let expected = match usize::try_from(wide) {
            Ok(index) => OscRoute::Dispatch(Action::TriggerPreset(index)),
            Err(_) => OscRoute::Unmatched,
        };
        assert_eq!(route_message(&msg("/preset", vec![OscType::Long(wide)])), expected);
        #[cfg(target_pointer_width = "32")]
        assert_eq!(expected, OscRoute::Unmatched);
    }

    #[test]
    fn transport_verb_from_path_or_argument() {
        assert_eq!(
            route_message(&msg("/sl/record", vec![])),
            OscRoute::Dispatch(Action::LooperTransport(TransportVerb::Record))
        );
        assert_eq!(
            route_message(&msg("/sl", vec![OscType::String("mute".into())])),
            OscRoute::Dispatch(Action::LooperTransport(TransportVerb::Mute))
        );
        assert_eq!(route_message(&msg("/sl/scratch", vec![])), OscRoute::Unmatched);
    }

    #[test]
    fn control_addresses() {
        assert_eq!(route_message(&msg("/ping", vec![])), OscRoute::Ping);
        assert_eq!(route_message(&msg("/quit", vec![])), OscRoute::Quit);
        assert_eq!(route_message(&msg("/nope", vec![])), OscRoute::Unmatched);
    }

    #[test]
    fn metronome_is_reserved() {
        assert_eq!(
            route_message(&msg("/metronome/tap", vec![])),
            OscRoute::Unimplemented("/metronome/tap".to_string())
        );
    }
}
