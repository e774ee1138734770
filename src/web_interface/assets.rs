//! Static content compiled into the binary from `static/`.

use rust_embed::RustEmbed;
use warp::{http::StatusCode, reply, Reply};

use super::types::ApiError;

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/static/"]
pub struct Assets;

/// Serves one embedded file with a content type guessed from its extension.
pub fn serve_asset(path: &str) -> reply::Response {
    match Assets::get(path) {
        Some(file) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            reply::with_header(file.data.into_owned(), "Content-Type", mime.to_string())
                .into_response()
        }
        None => ApiError::reply(StatusCode::NOT_FOUND, format!("asset {} not found", path)),
    }
}
