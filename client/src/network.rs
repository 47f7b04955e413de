use crate::connection::Connection;
use crate::error::{ConnectError, NetError};
use crate::receiver::{Receiver, ReceiverStatus};
use crate::session::SessionState;
use log::{debug, info};
use shared::ClientCommand;
use std::net::SocketAddr;
use std::sync::Arc;

/// One live connection to the server plus its receiver thread.
///
/// A session is never re-established. Once the receiver sees the stream end,
/// the session stays disconnected and every send is refused with
/// [`NetError::Closed`].
pub struct NetworkSession {
    connection: Connection,
    receiver: Receiver,
    state: Arc<SessionState>,
}

impl NetworkSession {
    pub fn start(host: &str, port: u16, state: Arc<SessionState>) -> Result<Self, ConnectError> {
        info!("Connecting to {}:{}...", host, port);

        let connection = Connection::connect(host, port)?;
        let reader = connection.reader()?;

        state.set_connected(true);

        let mut receiver = Receiver::new();
        if let Err(e) = receiver.start(reader, Arc::clone(&state)) {
            state.set_connected(false);
            return Err(ConnectError::SocketInitFailed(e));
        }

        Ok(Self {
            connection,
            receiver,
            state,
        })
    }

    pub fn send(&mut self, command: &ClientCommand) -> Result<(), NetError> {
        if !self.state.is_connected() {
            return Err(NetError::Closed);
        }

        self.connection.send_line(&command.to_string())?;
        debug!("Sent {}", command);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.connection.peer_addr()
    }

    pub fn receiver_status(&self) -> ReceiverStatus {
        self.receiver.status()
    }

    #[cfg(test)]
    pub(crate) fn shutdown_write(&self) -> std::io::Result<()> {
        self.connection.shutdown_write()
    }

    /// Stops the receiver: raise its stop flag, close the socket to release the
    /// blocked read, then wait for the thread. Idempotent.
    pub fn shutdown(&mut self) {
        if self.connection.is_closed() && self.receiver.status() != ReceiverStatus::Running {
            return;
        }

        self.receiver.request_stop();
        self.connection.close();
        self.receiver.join();
        self.state.set_connected(false);
    }
}

impl Drop for NetworkSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
