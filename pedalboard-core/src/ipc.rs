//! Local TCP endpoint for a companion web server. A client connects, sends
//! up to 32 bytes, and gets `Hi\n` back. There may never be a client; the
//! endpoint is still bound at startup so one can find it.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(1);
const MAX_REQUEST: usize = 32;
pub const GREETING: &[u8] = b"Hi\n";

pub struct IpcServer {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl IpcServer {
    /// Bind `addr` and start accepting clients.
    pub fn bind(addr: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("ipc".to_string())
            .spawn(move || {
                while thread_running.load(Ordering::Relaxed) {
                    match listener.accept() {
                        Ok((stream, peer)) => {
                            if let Err(e) = greet(stream, peer) {
                                log::warn!(target: "ipc", "client {}: {}", peer, e);
                            }
                        }
                        Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                            thread::sleep(POLL_INTERVAL);
                        }
                        Err(e) => {
                            log::error!(target: "ipc", "accept failed: {}", e);
                            thread_running.store(false, Ordering::Relaxed);
                            break;
                        }
                    }
                }
                log::info!(target: "ipc", "stopped");
            })?;

        log::info!(target: "ipc", "listening on {}", local_addr);
        Ok(Self {
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

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!(target: "ipc", "thread panicked");
            }
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn greet(mut stream: TcpStream, peer: SocketAddr) -> io::Result<()> {
    // Accepted sockets inherit non-blocking mode on some platforms
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(CLIENT_TIMEOUT))?;
    stream.set_write_timeout(Some(CLIENT_TIMEOUT))?;

    let mut buf = [0u8; MAX_REQUEST];
    let n = match stream.read(&mut buf) {
        Ok(n) => n,
        Err(ref e)
            if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
        {
            0
        }
        Err(e) => return Err(e),
    };
    log::info!(
        target: "ipc",
        "client {}: {:?}",
        peer,
        String::from_utf8_lossy(&buf[..n])
    );
    stream.write_all(GREETING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn exchange(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
        let mut client = TcpStream::connect(addr).unwrap();
        client.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        client.write_all(request).unwrap();
        let mut reply = Vec::new();
        client.read_to_end(&mut reply).unwrap();
        reply
    }

    #[test]
    fn clients_are_greeted() {
        let server = IpcServer::bind("127.0.0.1:0").unwrap();
        assert_eq!(exchange(server.local_addr(), b"hello"), GREETING);
        // One client at a time, each gets its own reply
        assert_eq!(exchange(server.local_addr(), b"again"), GREETING);
    }

    #[test]
    fn silent_client_still_gets_a_reply() {
        let server = IpcServer::bind("127.0.0.1:0").unwrap();
        let mut client = TcpStream::connect(server.local_addr()).unwrap();
        client.set_read_timeout(Some(Duration::from_secs(3))).unwrap();
        let mut reply = Vec::new();
        client.read_to_end(&mut reply).unwrap();
        assert_eq!(reply, GREETING);
    }

    #[test]
    fn stop_releases_the_port() {
        let mut server = IpcServer::bind("127.0.0.1:0").unwrap();
        let addr = server.local_addr();
        server.stop();
        assert!(!server.is_running());

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut rebound = TcpListener::bind(addr);
        while rebound.is_err() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
            rebound = TcpListener::bind(addr);
        }
        assert!(rebound.is_ok());
    }
}
