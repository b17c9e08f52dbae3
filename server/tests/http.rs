use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use std::io::Write;
use std::path::PathBuf;

use server::config::Config;
use server::handlers::{cors, root};
use server::server::spawn_server;

fn config(index_file: PathBuf) -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        index_file,
    }
}

#[actix_web::test]
async fn it_serves_the_client_page() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "<h1>board</h1>").expect("write");

    let app = test::init_service(
        App::new()
            .wrap(cors())
            .app_data(web::Data::new(spawn_server()))
            .app_data(web::Data::new(config(file.path().to_path_buf())))
            .configure(root),
    )
    .await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = test::read_body(res).await;
    assert_eq!(&body[..], b"<h1>board</h1>");
}

#[actix_web::test]
async fn it_reports_missing_client_page() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(spawn_server()))
            .app_data(web::Data::new(config("does/not/exist.html".into())))
            .configure(root),
    )
    .await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn it_renders_admin_page() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(spawn_server()))
            .app_data(web::Data::new(config("index.html".into())))
            .configure(root),
    )
    .await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/admin/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = test::read_body(res).await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("Connected users"));
    assert!(html.contains("Nobody is drawing."));
}
