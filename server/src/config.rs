use clap::Parser;
use std::path::PathBuf;

/// Shared whiteboard server.
#[derive(Debug, Clone, Parser)]
#[command(name = "whiteboard-server", version)]
pub struct Config {
    /// Interface to listen on.
    #[arg(long, env = "WHITEBOARD_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Client page served at `/`.
    #[arg(long, env = "WHITEBOARD_INDEX_FILE", default_value = "client/index.html")]
    pub index_file: PathBuf,
}
