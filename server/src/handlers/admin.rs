use crate::admin::{AdminCommand, BoardDescription};
use crate::error::ServerError;
use crate::server::{ServerCommand, ServerTx};
use actix_web::{web, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use system::serde_json::Value;
use system::{ConnectionId, UserDescription};

pub struct AdminUserRow {
    id: ConnectionId,
    name: String,
    color: String,
}

impl From<UserDescription> for AdminUserRow {
    fn from(user: UserDescription) -> Self {
        // colours are client supplied and not always strings
        let color = match user.color {
            Value::String(color) => color,
            other => other.to_string(),
        };
        Self {
            id: user.id,
            name: user.name,
            color,
        }
    }
}

#[derive(Template)]
#[template(path = "admin-index.html")]
pub struct AdminIndexTemplate {
    users: Vec<AdminUserRow>,
    cursor: usize,
    total: usize,
    connections: usize,
}

impl From<BoardDescription> for AdminIndexTemplate {
    fn from(description: BoardDescription) -> Self {
        Self {
            users: description.users.into_iter().map(AdminUserRow::from).collect(),
            cursor: description.history.cursor,
            total: description.history.total,
            connections: description.connections,
        }
    }
}

pub fn configure_admin_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin").service(web::resource("/").route(web::get().to(admin_index))),
    );
}

pub async fn admin_index(srv_tx: web::Data<ServerTx>) -> Result<HttpResponse, ServerError> {
    let (tx, rx) = tokio::sync::oneshot::channel::<BoardDescription>();

    srv_tx
        .send(ServerCommand::AdminCommand(AdminCommand::DescribeBoard {
            tx,
        }))
        .map_err(|_| ServerError::ServerClosed)?;

    let description = rx.await.map_err(|_| ServerError::ReplyDropped)?;

    Ok(AdminIndexTemplate::from(description).to_response())
}
