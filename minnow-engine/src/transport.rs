//! The byte-stream boundary: a non-blocking transport seam, its TCP
//! implementation, and the outgoing queue.

use std::collections::VecDeque;
use std::io;

use tokio::net::TcpStream;

use crate::error::TransportError;

/// Bytes requested from the transport per receive call.
pub const RECV_CHUNK: usize = 512;

/// A non-blocking byte-stream connection.
///
/// `receive` returning an empty vec means "checked, nothing arrived" and
/// is not an error. `send` accepts as many bytes as the connection will
/// take without blocking and reports the count; 0 means try again next
/// tick.
pub trait Transport {
    fn receive(&mut self, max: usize) -> Result<Vec<u8>, TransportError>;
    fn send(&mut self, bytes: &[u8]) -> Result<usize, TransportError>;
    fn close(&mut self);
}

/// TCP transport driven by the cooperative loop through tokio's
/// `try_read`/`try_write` paths, so the loop never suspends on the
/// network.
pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Open the connection. A failure here aborts startup.
    pub async fn connect(host: &str, port: u16) -> Result<Self, TransportError> {
        let stream = TcpStream::connect((host, port)).await.map_err(|source| {
            TransportError::Connect {
                addr: format!("{host}:{port}"),
                source,
            }
        })?;
        Ok(Self {
            stream: Some(stream),
        })
    }
}

impl Transport for TcpTransport {
    fn receive(&mut self, max: usize) -> Result<Vec<u8>, TransportError> {
        let Some(stream) = self.stream.as_ref() else {
            return Err(TransportError::Closed);
        };
        let mut buf = vec![0u8; max];
        match stream.try_read(&mut buf) {
            Ok(0) => Err(TransportError::Closed),
            Ok(n) => {
                buf.truncate(n);
                Ok(buf)
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(Vec::new()),
            Err(e) => Err(TransportError::Receive(e)),
        }
    }

    fn send(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        let Some(stream) = self.stream.as_ref() else {
            return Err(TransportError::Closed);
        };
        match stream.try_write(bytes) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(TransportError::Send(e)),
        }
    }

    fn close(&mut self) {
        self.stream = None;
    }
}

/// Outgoing lines waiting for the connection to accept them.
///
/// A synchronous write could stall the whole loop on a full write buffer;
/// queued non-blocking writes keep input handling and redraw responsive on
/// a congested connection.
#[derive(Debug, Default)]
pub struct SendQueue {
    queue: VecDeque<Vec<u8>>,
}

impl SendQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: Vec<u8>) {
        self.queue.push_back(line);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Write as much as the transport will take. A partial write keeps the
    /// remainder at the queue front; a genuine send error drops the
    /// offending line and is reported to the caller for logging.
    pub fn drain<T: Transport>(&mut self, transport: &mut T) -> Result<(), TransportError> {
        while let Some(front) = self.queue.front_mut() {
            match transport.send(front) {
                Ok(0) => break,
                Ok(n) if n == front.len() => {
                    self.queue.pop_front();
                }
                Ok(n) => {
                    front.drain(..n);
                    break;
                }
                Err(e) => {
                    self.queue.pop_front();
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}
