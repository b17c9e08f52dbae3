use actix_web::{web, App, HttpServer};
use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use server::admin::{AdminCommand, BoardDescription};
use server::config::Config;
use server::handlers::root;
use server::server::{spawn_server, ServerCommand, ServerTx};
use system::serde_json::{self, json, Value};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    srv_tx: ServerTx,
}

impl TestServer {
    fn start() -> Self {
        let srv_tx = spawn_server();
        let data = web::Data::new(srv_tx.clone());
        let config = web::Data::new(Config {
            host: "127.0.0.1".into(),
            port: 0,
            index_file: "index.html".into(),
        });

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .app_data(config.clone())
                .configure(root)
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind");
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        Self { addr, srv_tx }
    }

    async fn connect(&self) -> Client {
        let (client, _) = connect_async(format!("ws://{}/ws/", self.addr))
            .await
            .expect("handshake");
        client
    }

    async fn describe(&self) -> BoardDescription {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.srv_tx
            .send(ServerCommand::AdminCommand(AdminCommand::DescribeBoard {
                tx,
            }))
            .expect("server must be running");
        rx.await.expect("server must reply")
    }
}

async fn next_message(client: &mut Client) -> Message {
    loop {
        let message = timeout(Duration::from_secs(2), client.next())
            .await
            .expect("timed out")
            .expect("stream ended")
            .expect("protocol error");
        match message {
            Message::Ping(_) | Message::Pong(_) => continue,
            message => return message,
        }
    }
}

async fn frame(client: &mut Client) -> Value {
    match next_message(client).await {
        Message::Text(text) => serde_json::from_str(&text).expect("json"),
        message => panic!("unexpected {:?}", message),
    }
}

async fn frames(client: &mut Client, count: usize) -> Vec<Value> {
    let mut result = Vec::new();
    for _ in 0..count {
        result.push(frame(client).await);
    }
    result
}

/// Waits for the close frame, skipping whatever text was queued before it.
async fn close_code(client: &mut Client) -> u16 {
    loop {
        match next_message(client).await {
            Message::Text(_) => continue,
            Message::Close(Some(CloseFrame { code, .. })) => return code.into(),
            message => panic!("unexpected {:?}", message),
        }
    }
}

async fn send(client: &mut Client, value: Value) {
    client
        .send(Message::Text(value.to_string()))
        .await
        .expect("send");
}

#[actix_web::test]
async fn it_keeps_events_sent_before_the_greeting_in_order() {
    let server = TestServer::start();
    let mut client = server.connect().await;

    send(&mut client, json!({ "event": "new-stroke", "data": [{ "x": 1 }] })).await;
    send(&mut client, json!({ "event": "undo" })).await;

    let greeting = frames(&mut client, 4).await;
    assert_eq!(greeting[0]["event"], "user-info");
    assert_eq!(greeting[3]["event"], "history-state");
    assert_eq!(
        frames(&mut client, 3).await,
        vec![
            json!({ "event": "history-state", "data": { "cursor": 1, "total": 1 } }),
            json!({
                "event": "history-replay",
                "data": { "commands": [], "cursor": 0, "total": 1 },
            }),
            json!({ "event": "history-state", "data": { "cursor": 0, "total": 1 } }),
        ]
    );
}

#[actix_web::test]
async fn it_accepts_stroke_without_data() {
    let server = TestServer::start();
    let mut client = server.connect().await;
    frames(&mut client, 4).await;

    send(&mut client, json!({ "event": "new-stroke" })).await;

    assert_eq!(
        frame(&mut client).await,
        json!({ "event": "history-state", "data": { "cursor": 1, "total": 1 } })
    );
}

#[actix_web::test]
async fn it_closes_on_binary_frames() {
    let server = TestServer::start();
    let mut client = server.connect().await;

    client
        .send(Message::Binary(vec![1, 2, 3]))
        .await
        .expect("send");

    assert_eq!(close_code(&mut client).await, 1003);
}

#[actix_web::test]
async fn it_closes_on_undecodable_frames() {
    let server = TestServer::start();
    let mut client = server.connect().await;
    frames(&mut client, 4).await;

    client
        .send(Message::Text("{\"event\":\"explode\"}".into()))
        .await
        .expect("send");

    assert_eq!(close_code(&mut client).await, 1007);
}

#[actix_web::test]
async fn it_announces_a_closed_socket_once() {
    let server = TestServer::start();
    let mut alice = server.connect().await;
    frames(&mut alice, 4).await;
    let mut bob = server.connect().await;
    frames(&mut bob, 4).await;
    assert_eq!(frame(&mut alice).await["event"], "users-update");

    bob.close(None).await.expect("close");

    let left = frame(&mut alice).await;
    assert_eq!(left["event"], "users-update");
    assert_eq!(left["data"].as_array().map(|users| users.len()), Some(1));

    send(&mut alice, json!({ "event": "chat message", "data": "still here" })).await;
    assert_eq!(
        frame(&mut alice).await,
        json!({ "event": "chat message", "data": "User1: still here" })
    );
    assert_eq!(server.describe().await.connections, 1);
}
