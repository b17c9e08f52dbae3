use crate::config::Config;
use crate::error::ServerError;
use actix_web::{web, HttpResponse};

pub async fn index(config: web::Data<Config>) -> Result<HttpResponse, ServerError> {
    let path = &config.index_file;
    let body = tokio::fs::read(path)
        .await
        .map_err(|source| ServerError::IndexUnavailable {
            path: path.clone(),
            source,
        })?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}
