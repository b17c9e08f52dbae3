use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use system::rand::rngs::StdRng;
use system::rand::SeedableRng;
use system::{serde_json, ConnectionId, Dispatch};

use crate::admin::AdminCommand;
use crate::connection::{ConnectionCommand, ConnectionEvent};
use crate::connection_tx_storage::ConnectionTxStorage;
use crate::server_state::ServerState;

pub type ServerTx = UnboundedSender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    ConnectionCommand(ConnectionCommand),
    AdminCommand(AdminCommand),
}

/// Owns the canvas. Commands are handled strictly one at a time, so every
/// timeline operation is atomic with respect to all connections.
struct Server {
    server_state: ServerState,
    connections: ConnectionTxStorage,
    rng: StdRng,
}

impl Server {
    fn new() -> Self {
        Self {
            server_state: ServerState::new(),
            connections: ConnectionTxStorage::new(),
            rng: StdRng::from_entropy(),
        }
    }

    fn handle_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::ConnectionCommand(command) => self.handle_connection_command(command),
            ServerCommand::AdminCommand(command) => self.handle_admin_command(command),
        }
    }

    fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx } => {
                let connections = &self.connections;
                let connection_id = match self
                    .server_state
                    .new_connection_id(|id| connections.contains(id))
                {
                    Some(connection_id) => connection_id,
                    None => {
                        log::warn!("No connection id left, refusing connection");
                        let _ = tx.send(ConnectionEvent::Disconnected);
                        return;
                    }
                };

                self.connections.insert(connection_id, tx);
                if !self
                    .connections
                    .send(&connection_id, ConnectionEvent::Connected { connection_id })
                {
                    self.disconnect(&connection_id);
                    return;
                }
                let dispatches = self
                    .server_state
                    .coordinator()
                    .join(connection_id, &mut self.rng);
                self.dispatch(dispatches);
            }
            ConnectionCommand::Abandon { tx } => match self.connections.find(&tx) {
                Some(connection_id) => {
                    log::debug!("Connection {} stopped before it was greeted", connection_id);
                    self.disconnect(&connection_id);
                }
                None => log::debug!("Abandoned connection was never registered"),
            },
            ConnectionCommand::Disconnect { from } => self.disconnect(&from),
            ConnectionCommand::ClientEvent { from, event } => {
                if !self.connections.contains(&from) {
                    log::debug!("Dropping event from departed connection {}", from);
                    return;
                }
                log::debug!("Ingress from {}: {:?}", from, event);
                let dispatches = self.server_state.coordinator().handle(from, event);
                self.dispatch(dispatches);
            }
        }
    }

    fn handle_admin_command(&mut self, command: AdminCommand) {
        match command {
            AdminCommand::DescribeBoard { tx } => {
                let description = self.server_state.describe(self.connections.len());
                if tx.send(description).is_err() {
                    log::debug!("Admin request went away before the reply");
                }
            }
        }
    }

    fn dispatch(&mut self, dispatches: Vec<Dispatch>) {
        let mut unreachable = Vec::<ConnectionId>::new();
        for Dispatch { to, event } in dispatches {
            let frame = match serde_json::to_string(&event) {
                Ok(frame) => frame,
                Err(err) => {
                    log::error!("Failed to serialize {:?}: {}", event, err);
                    continue;
                }
            };
            for connection_id in self.connections.broadcast(&to, &frame) {
                if !unreachable.contains(&connection_id) {
                    unreachable.push(connection_id);
                }
            }
        }

        for connection_id in unreachable {
            self.disconnect(&connection_id);
        }
    }

    fn disconnect(&mut self, connection_id: &ConnectionId) {
        if self.connections.remove(connection_id).is_none() {
            log::debug!("Connection {} already left", connection_id);
            return;
        }
        let dispatches = self.server_state.coordinator().leave(connection_id);
        self.dispatch(dispatches);
    }
}

pub fn spawn_server() -> ServerTx {
    let (srv_tx, mut srv_rx) = unbounded_channel::<ServerCommand>();

    tokio::spawn(async move {
        let mut server = Server::new();
        log::info!("server task - started");

        while let Some(command) = srv_rx.recv().await {
            server.handle_command(command);
        }

        log::info!("server task - terminated");
    });

    srv_tx
}
