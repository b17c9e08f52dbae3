use actix_web::http::StatusCode;
use actix_web::ResponseError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("server task is not running")]
    ServerClosed,
    #[error("server task dropped the reply")]
    ReplyDropped,
    #[error("cannot read client page {}: {}", .path.display(), .source)]
    IndexUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::IndexUnavailable { .. } => StatusCode::NOT_FOUND,
            ServerError::ServerClosed | ServerError::ReplyDropped => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
