//! Byte transports to a receipt printer

use crate::types::Result;
use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Connect and write timeout for network printers
pub const CONNECTION_TIMEOUT: Duration = Duration::from_millis(3000);

/// A bidirectional byte channel to a printer
pub trait Port: Send {
    /// Human-readable endpoint, used in logs
    fn describe(&self) -> String;

    fn is_open(&self) -> bool;

    fn open(&mut self) -> Result<()>;

    /// Release the connection. Errors are logged, never returned.
    fn close(&mut self);

    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read up to `size` bytes, returning what arrived before `timeout`
    fn read(&mut self, size: usize, timeout: Duration) -> Result<Vec<u8>>;
}

/// Raw TCP printer port (usually 9100)
pub struct TcpPort {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
}

impl TcpPort {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            stream: None,
        }
    }

    /// Resolve the host on a helper thread so a silent resolver cannot
    /// outlast `deadline`
    fn resolve(&self, deadline: Instant) -> io::Result<Vec<SocketAddr>> {
        let (tx, rx) = mpsc::channel();
        let target = (self.host.clone(), self.port);
        thread::spawn(move || {
            let _ = tx.send(target.to_socket_addrs().map(|addrs| addrs.collect::<Vec<_>>()));
        });

        let remaining = deadline.saturating_duration_since(Instant::now());
        let unresolved = || {
            io::Error::new(
                ErrorKind::HostUnreachable,
                format!("unknown host {}", self.host),
            )
        };
        match rx.recv_timeout(remaining) {
            Ok(Ok(addrs)) if !addrs.is_empty() => Ok(addrs),
            Ok(_) => Err(unresolved()),
            Err(_) => Err(io::Error::new(
                ErrorKind::TimedOut,
                format!("resolving {} timed out", self.host),
            )),
        }
    }

    fn stream(&mut self) -> io::Result<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(ErrorKind::NotConnected, "port is not open"))
    }
}

impl Port for TcpPort {
    fn describe(&self) -> String {
        format!("tcp://{}:{}", self.host, self.port)
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn open(&mut self) -> Result<()> {
        let deadline = Instant::now() + CONNECTION_TIMEOUT;
        let addrs = self.resolve(deadline)?;
        let stream = connect_any(&addrs, deadline)?;
        stream.set_write_timeout(Some(CONNECTION_TIMEOUT))?;
        stream.set_nodelay(true)?;
        self.stream = Some(stream);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.shutdown(std::net::Shutdown::Both) {
                if e.kind() != ErrorKind::NotConnected {
                    warn!("Failed to close {}: {}", self.describe(), e);
                }
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream()?;
        stream.write_all(data)?;
        stream.flush()?;
        Ok(())
    }

    fn read(&mut self, size: usize, timeout: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        let stream = self.stream()?;
        let mut data = vec![0u8; size];
        let mut count = 0;

        while count < size {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            stream.set_read_timeout(Some(remaining))?;
            match stream.read(&mut data[count..]) {
                Ok(0) => break,
                Ok(n) => count += n,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        data.truncate(count);
        Ok(data)
    }
}

/// Connect to the first address that answers before `deadline`
pub fn connect_any(addrs: &[SocketAddr], deadline: Instant) -> io::Result<TcpStream> {
    let mut last_error = io::Error::new(ErrorKind::HostUnreachable, "no address to connect to");
    for addr in addrs {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(io::Error::new(ErrorKind::TimedOut, "connection timed out"));
        }
        match TcpStream::connect_timeout(addr, remaining) {
            Ok(stream) => {
                debug!("Connected to {}", addr);
                return Ok(stream);
            }
            Err(e) => {
                debug!("Connect to {} failed: {}", addr, e);
                last_error = e;
            }
        }
    }
    Err(last_error)
}
