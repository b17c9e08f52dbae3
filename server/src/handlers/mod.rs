use crate::connection::ws_index;
use crate::handlers::admin::configure_admin_handlers;
use crate::handlers::index::index;
use actix_cors::Cors;
use actix_web::web;

mod admin;
mod index;

pub fn root(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)));
    cfg.service(web::resource("/ws/").route(web::get().to(ws_index)));

    configure_admin_handlers(cfg);
}

pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST"])
}
