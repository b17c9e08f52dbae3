use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use actix_web_actors::ws::{CloseCode, CloseReason};

use system::{serde_json, ClientEvent, ConnectionId};

use crate::connection_tx_storage::ConnectionTx;
use crate::server::{ServerCommand, ServerTx};

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect { tx: ConnectionTx },
    /// Sent by a connection that stops before learning its id.
    Abandon { tx: ConnectionTx },
    Disconnect { from: ConnectionId },
    ClientEvent {
        from: ConnectionId,
        event: ClientEvent,
    },
}

#[derive(Debug)]
pub enum ConnectionEvent {
    Connected { connection_id: ConnectionId },
    /// Serialized `ServerEvent`.
    Frame(String),
    /// The server refused the connection.
    Disconnected,
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

enum ConnectionState {
    /// Waiting for an id. Events received meanwhile are kept in order.
    Idle {
        registered: Option<ConnectionTx>,
        pending: Vec<ClientEvent>,
    },
    Connected(ConnectionId),
}

struct ConnectionActor {
    state: ConnectionState,
    srv_tx: ServerTx,
}

impl ConnectionActor {
    fn new(srv_tx: ServerTx) -> Self {
        Self {
            state: ConnectionState::Idle {
                registered: None,
                pending: Vec::new(),
            },
            srv_tx,
        }
    }

    fn send_to_server(&self, command: ConnectionCommand, ctx: &mut ws::WebsocketContext<Self>) {
        if self
            .srv_tx
            .send(ServerCommand::ConnectionCommand(command))
            .is_err()
        {
            log::error!("Server is not running, closing connection");
            ctx.close(Some(CloseReason {
                code: CloseCode::Error,
                description: None,
            }));
            ctx.stop();
        }
    }

    fn forward(&mut self, event: ClientEvent, ctx: &mut ws::WebsocketContext<Self>) {
        match &mut self.state {
            ConnectionState::Idle { pending, .. } => pending.push(event),
            ConnectionState::Connected(from) => {
                let from = *from;
                self.send_to_server(ConnectionCommand::ClientEvent { from, event }, ctx);
            }
        }
    }

    fn close_with(&self, code: CloseCode, description: Option<String>, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.close(Some(CloseReason { code, description }));
        ctx.stop();
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ConnectionEvent>();

        if let ConnectionState::Idle { registered, .. } = &mut self.state {
            *registered = Some(tx.clone());
        }
        self.send_to_server(ConnectionCommand::Connect { tx }, ctx);

        let addr = ctx.address().recipient();

        tokio::spawn(async move {
            log::debug!("connection green thread - started");
            while let Some(event) = rx.recv().await {
                if !addr.connected() {
                    break;
                }
                addr.do_send(ConnectionActorMessage(event));
            }
            log::debug!("connection green thread - terminated");
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        let command = match &mut self.state {
            ConnectionState::Connected(from) => ConnectionCommand::Disconnect { from: *from },
            ConnectionState::Idle { registered, .. } => match registered.take() {
                Some(tx) => ConnectionCommand::Abandon { tx },
                None => return Running::Stop,
            },
        };
        if self
            .srv_tx
            .send(ServerCommand::ConnectionCommand(command))
            .is_err()
        {
            log::warn!("Server is gone before the connection left");
        }

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => {
                log::debug!("Ingress size: {}", text.len());
                match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => self.forward(event, ctx),
                    Err(err) => {
                        log::debug!("Undecodable frame: {}", err);
                        self.close_with(CloseCode::Invalid, Some(err.to_string()), ctx);
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.close_with(CloseCode::Unsupported, None, ctx);
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => (),
            Err(err) => {
                log::warn!("Websocket protocol error: {}", err);
                ctx.stop();
            }
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        match msg.0 {
            ConnectionEvent::Connected { connection_id } => {
                let previous = std::mem::replace(
                    &mut self.state,
                    ConnectionState::Connected(connection_id),
                );
                if let ConnectionState::Idle { pending, .. } = previous {
                    for event in pending {
                        self.forward(event, ctx);
                    }
                }
            }
            ConnectionEvent::Frame(frame) => {
                log::trace!("Egress {}", frame);
                ctx.text(frame);
            }
            ConnectionEvent::Disconnected => {
                self.close_with(CloseCode::Again, None, ctx);
            }
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
) -> Result<HttpResponse, Error> {
    ws::start(ConnectionActor::new(srv_tx.get_ref().clone()), &req, stream)
}
