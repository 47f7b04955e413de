//! Connected client roster and outbound line routing
//!
//! Each connected client owns a writer task fed by an unbounded channel of
//! protocol lines. The manager hands out player IDs, enforces the capacity
//! limit and routes lines to one client or to everyone.

use log::{debug, info};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::sync::mpsc::UnboundedSender;

/// Server-side handle for one connection
#[derive(Debug)]
pub struct Client {
    /// Player ID assigned on connect
    pub id: i32,
    pub addr: SocketAddr,
    /// Feeds the connection's writer task
    outbox: UnboundedSender<String>,
}

impl Client {
    pub fn new(id: i32, addr: SocketAddr, outbox: UnboundedSender<String>) -> Self {
        Self { id, addr, outbox }
    }

    /// Queues one line for this client. Returns false if its writer is gone.
    pub fn send(&self, line: &str) -> bool {
        self.outbox.send(line.to_string()).is_ok()
    }
}

pub struct ClientManager {
    /// Connected clients indexed by player ID
    clients: HashMap<i32, Client>,
    next_client_id: i32,
    max_clients: usize,
}

impl ClientManager {
    /// Creates an empty roster. IDs start from 1.
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Registers a connection, returning its player ID, or `None` when the
    /// server is full.
    pub fn add_client(&mut self, addr: SocketAddr, outbox: UnboundedSender<String>) -> Option<i32> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.clients
            .insert(client_id, Client::new(client_id, addr, outbox));
        Some(client_id)
    }

    pub fn remove_client(&mut self, client_id: i32) -> bool {
        if let Some(client) = self.clients.remove(&client_id) {
            info!("Client {} disconnected ({})", client.id, client.addr);
            true
        } else {
            false
        }
    }

    pub fn send_to(&self, client_id: i32, line: &str) -> bool {
        match self.clients.get(&client_id) {
            Some(client) => client.send(line),
            None => {
                debug!("No client {} for {:?}", client_id, line);
                false
            }
        }
    }

    /// Queues `line` for every client, returning how many accepted it.
    pub fn broadcast(&self, line: &str) -> usize {
        self.clients
            .values()
            .filter(|client| client.send(line))
            .count()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:9999".parse().unwrap()
    }

    fn test_addr2() -> SocketAddr {
        "127.0.0.1:10000".parse().unwrap()
    }

    #[test]
    fn test_client_manager_creation() {
        let manager = ClientManager::new(5);
        assert_eq!(manager.max_clients, 5);
        assert!(manager.is_empty());
        assert_eq!(manager.len(), 0);
    }

    #[test]
    fn test_add_multiple_clients() {
        let mut manager = ClientManager::new(3);
        let (tx, _rx) = mpsc::unbounded_channel();

        let client_id1 = manager.add_client(test_addr(), tx.clone()).unwrap();
        let client_id2 = manager.add_client(test_addr2(), tx).unwrap();

        assert_eq!(client_id1, 1);
        assert_eq!(client_id2, 2);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_add_client_max_capacity() {
        let mut manager = ClientManager::new(1);
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(manager.add_client(test_addr(), tx.clone()).is_some());
        assert!(manager.add_client(test_addr2(), tx).is_none());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_ids_not_reused_after_disconnect() {
        let mut manager = ClientManager::new(1);
        let (tx, _rx) = mpsc::unbounded_channel();

        let first = manager.add_client(test_addr(), tx.clone()).unwrap();
        assert!(manager.remove_client(first));
        assert!(!manager.remove_client(first));

        let second = manager.add_client(test_addr(), tx).unwrap();
        assert_eq!(second, 2);
    }

    #[test]
    fn test_send_to_and_broadcast() {
        let mut manager = ClientManager::new(4);
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();

        let id1 = manager.add_client(test_addr(), tx1).unwrap();
        manager.add_client(test_addr2(), tx2).unwrap();

        assert!(manager.send_to(id1, "ASSIGN_ID 1"));
        assert!(!manager.send_to(99, "ASSIGN_ID 99"));
        assert_eq!(manager.broadcast("REMOVE_FRUIT 3"), 2);

        assert_eq!(rx1.try_recv().unwrap(), "ASSIGN_ID 1");
        assert_eq!(rx1.try_recv().unwrap(), "REMOVE_FRUIT 3");
        assert_eq!(rx2.try_recv().unwrap(), "REMOVE_FRUIT 3");
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_skips_closed_writers() {
        let mut manager = ClientManager::new(2);
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        manager.add_client(test_addr(), tx1).unwrap();
        manager.add_client(test_addr2(), tx2).unwrap();
        drop(rx1);

        assert_eq!(manager.broadcast("GAME_OVER 1"), 1);
    }
}
