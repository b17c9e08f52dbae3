use actix_web::{web, App, HttpServer};
use clap::Parser;

use server::config::Config;
use server::handlers::{cors, root};
use server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    log::debug!("{:?}", config);
    let address = (config.host.clone(), config.port);

    let srv_tx = web::Data::new(spawn_server());
    let config = web::Data::new(config);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors())
            .app_data(srv_tx.clone())
            .app_data(config.clone())
            .configure(root)
    })
    .bind(&address)?;

    log::info!("Server running at http://{}:{}", address.0, address.1);
    server.run().await
}
