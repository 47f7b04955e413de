//! TCP connection to the game server.
//!
//! The write half stays on the main thread inside [`Connection`]; the read half
//! is handed to the receiver thread as a [`LineReader`] over a second handle to
//! the same socket. Closing the connection shuts the socket down in both
//! directions, which is also how a blocked [`LineReader::receive_line`] gets
//! released during shutdown.

use crate::error::{ConnectError, NetError};
use log::{debug, info};
use shared::MAX_LINE_LEN;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    closed: bool,
}

impl Connection {
    /// Resolves `host:port` and connects. There is no retry: callers treat any
    /// error as "play offline".
    pub fn connect(host: &str, port: u16) -> Result<Self, ConnectError> {
        let address = format!("{}:{}", host, port);

        let candidates: Vec<SocketAddr> = match (host, port).to_socket_addrs() {
            Ok(addrs) => addrs.collect(),
            Err(e) => {
                debug!("Failed to resolve {}: {}", address, e);
                return Err(ConnectError::AddressInvalid { address });
            }
        };

        if candidates.is_empty() {
            return Err(ConnectError::AddressInvalid { address });
        }

        let stream = TcpStream::connect(&candidates[..])
            .map_err(|source| ConnectError::Unreachable { address, source })?;
        stream
            .set_nodelay(true)
            .map_err(ConnectError::SocketInitFailed)?;
        let peer = stream.peer_addr().map_err(ConnectError::SocketInitFailed)?;

        info!("Connected to {}", peer);

        Ok(Self {
            stream,
            peer,
            closed: false,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Opens the read half for the receiver thread.
    pub fn reader(&self) -> Result<LineReader<TcpStream>, ConnectError> {
        let stream = self
            .stream
            .try_clone()
            .map_err(ConnectError::SocketInitFailed)?;
        Ok(LineReader::new(stream))
    }

    /// Writes `msg` followed by a newline. `write_all` keeps writing until every
    /// byte is out or the socket reports an error.
    pub fn send_line(&mut self, msg: &str) -> Result<(), NetError> {
        if self.closed {
            return Err(NetError::Closed);
        }

        let mut buffer = Vec::with_capacity(msg.len() + 1);
        buffer.extend_from_slice(msg.as_bytes());
        buffer.push(b'\n');

        self.stream
            .write_all(&buffer)
            .map_err(NetError::SendFailed)?;
        Ok(())
    }

    /// Shuts the socket down. Safe to call any number of times.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        // NotConnected here just means the peer got there first.
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            debug!("Shutdown of connection to {}: {}", self.peer, e);
        }
        info!("Connection to {} closed", self.peer);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closes only the write direction, leaving the read half to the receiver.
    #[cfg(test)]
    pub(crate) fn shutdown_write(&self) -> io::Result<()> {
        self.stream.shutdown(Shutdown::Write)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Outcome of one successful [`LineReader::receive_line`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Line(String),
    /// The peer closed the stream. Not an error.
    EndOfStream,
}

/// Splits a byte stream into text lines.
///
/// Reads happen in chunks of at most [`MAX_LINE_LEN`] bytes. A line that grows
/// past that bound without a terminator is handed out in pieces of that size.
pub struct LineReader<R> {
    inner: R,
    pending: Vec<u8>,
    eof: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::with_capacity(MAX_LINE_LEN),
            eof: false,
        }
    }

    /// Blocks until a full line, end of stream, or a transport error.
    pub fn receive_line(&mut self) -> Result<Received, NetError> {
        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.pending.drain(..=pos).collect();
                return Ok(Received::Line(Self::to_text(&line[..pos])));
            }

            if self.pending.len() >= MAX_LINE_LEN {
                let line: Vec<u8> = self.pending.drain(..MAX_LINE_LEN).collect();
                return Ok(Received::Line(Self::to_text(&line)));
            }

            if self.eof {
                if self.pending.is_empty() {
                    return Ok(Received::EndOfStream);
                }
                let line = std::mem::take(&mut self.pending);
                return Ok(Received::Line(Self::to_text(&line)));
            }

            let mut chunk = [0u8; MAX_LINE_LEN];
            match self.inner.read(&mut chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(NetError::RecvFailed(e)),
            }
        }
    }

    fn to_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes)
            .chars()
            .filter(|c| *c != '\0' && *c != '\r')
            .collect()
    }
}
