//! UDP receive thread that decodes OSC packets and hands each message to a
//! callback. The socket uses a short read timeout so the thread notices a
//! stop request without a wake-up packet.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rosc::{OscMessage, OscPacket};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Whether the receive loop keeps going after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

pub struct OscListener {
    name: String,
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl OscListener {
    /// Bind `addr` and start the receive thread.
    pub fn bind<F>(name: &str, addr: &str, on_message: F) -> io::Result<Self>
    where
        F: FnMut(&UdpSocket, OscMessage, SocketAddr) -> Flow + Send + 'static,
    {
        let socket = UdpSocket::bind(addr)?;
        Self::spawn(name, socket, on_message)
    }

    pub fn spawn<F>(name: &str, socket: UdpSocket, mut on_message: F) -> io::Result<Self>
    where
        F: FnMut(&UdpSocket, OscMessage, SocketAddr) -> Flow + Send + 'static,
    {
        socket.set_read_timeout(Some(POLL_INTERVAL))?;
        let local_addr = socket.local_addr()?;
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let target = name.to_string();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut buf = [0u8; rosc::decoder::MTU];
                while thread_running.load(Ordering::Relaxed) {
                    match socket.recv_from(&mut buf) {
                        Ok((n, from)) => match rosc::decoder::decode_udp(&buf[..n]) {
                            Ok((_, packet)) => {
                                let mut messages = Vec::new();
                                flatten(packet, &mut messages);
                                for msg in messages {
                                    if on_message(&socket, msg, from) == Flow::Stop {
                                        thread_running.store(false, Ordering::Relaxed);
                                        break;
                                    }
                                }
                            }
                            Err(e) => {
                                log::debug!(target: "osc", "{}: undecodable packet from {}: {:?}", target, from, e)
                            }
                        },
                        Err(ref e)
                            if e.kind() == io::ErrorKind::WouldBlock
                                || e.kind() == io::ErrorKind::TimedOut =>
                        {
                            continue
                        }
                        Err(e) => {
                            log::error!(target: "osc", "{}: receive failed: {}", target, e);
                            thread_running.store(false, Ordering::Relaxed);
                            break;
                        }
                    }
                }
                log::info!(target: "osc", "{} stopped", target);
            })?;

        log::info!(target: "osc", "{} listening on {}", name, local_addr);
        Ok(Self {
            name: name.to_string(),
            local_addr,
            running,
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Ask the receive thread to exit and wait for it.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!(target: "osc", "{} thread panicked", self.name);
            }
        }
    }
}

impl Drop for OscListener {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Bundles may nest; collect the messages in order.
fn flatten(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(msg) => out.push(msg),
        OscPacket::Bundle(bundle) => {
            for p in bundle.content {
                flatten(p, out);
            }
        }
    }
}
