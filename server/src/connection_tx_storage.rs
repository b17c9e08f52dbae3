use crate::connection::ConnectionEvent;
use std::collections::HashMap;
use system::{Audience, ConnectionId};
use tokio::sync::mpsc::UnboundedSender;

pub type ConnectionTx = UnboundedSender<ConnectionEvent>;

/// Egress handles of every live connection.
pub struct ConnectionTxStorage {
    connection_txs: HashMap<ConnectionId, ConnectionTx>,
}

impl ConnectionTxStorage {
    pub fn new() -> Self {
        Self {
            connection_txs: HashMap::new(),
        }
    }

    pub fn insert(&mut self, connection_id: ConnectionId, tx: ConnectionTx) {
        self.connection_txs.insert(connection_id, tx);
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<ConnectionTx> {
        self.connection_txs.remove(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connection_txs.contains_key(connection_id)
    }

    /// Looks up the connection registered with this very channel.
    pub fn find(&self, tx: &ConnectionTx) -> Option<ConnectionId> {
        self.connection_txs
            .iter()
            .find(|(_, registered)| registered.same_channel(tx))
            .map(|(connection_id, _)| *connection_id)
    }

    pub fn len(&self) -> usize {
        self.connection_txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connection_txs.is_empty()
    }

    /// Returns false if the connection is unknown or its receiver is gone.
    pub fn send(&self, to: &ConnectionId, event: ConnectionEvent) -> bool {
        match self.connection_txs.get(to) {
            Some(tx) => {
                if tx.send(event).is_err() {
                    log::warn!("Connection {} is not receiving anymore", to);
                    false
                } else {
                    true
                }
            }
            None => {
                log::warn!("Tried to send to unknown connection {}", to);
                false
            }
        }
    }

    /// Sends `frame` to every connection in `audience`, returning the ones
    /// that could not be reached.
    pub fn broadcast(&self, audience: &Audience, frame: &str) -> Vec<ConnectionId> {
        if let Audience::Only(connection_id) = audience {
            return if self.send(connection_id, ConnectionEvent::Frame(frame.to_owned())) {
                Vec::new()
            } else {
                vec![*connection_id]
            };
        }

        self.connection_txs
            .iter()
            .filter(|(connection_id, _)| audience.includes(connection_id))
            .filter_map(|(connection_id, tx)| {
                tx.send(ConnectionEvent::Frame(frame.to_owned()))
                    .err()
                    .map(|_| {
                        log::warn!("Connection {} is not receiving anymore", connection_id);
                        *connection_id
                    })
            })
            .collect()
    }
}
