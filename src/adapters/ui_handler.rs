use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "ui/dist"]
struct Asset;

pub struct UIHandler;

impl UIHandler {
    /// GET /ui
    pub async fn index() -> Response {
        Self::asset("index.html")
    }

    /// GET /ui/*path
    pub async fn serve(Path(path): Path<String>) -> Response {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return Self::asset("index.html");
        }
        Self::asset(path)
    }

    fn asset(path: &str) -> Response {
        match Asset::get(path) {
            Some(content) => {
                let mime = mime_guess::from_path(path).first_or_octet_stream();
                ([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response()
            }
            None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
        }
    }
}
