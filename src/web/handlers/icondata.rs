//! `GET /icondata?src=<url>`

use axum::{
    body::Body,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::utils::{ImageUtils, UrlUtils};
use crate::web::{AppState, handle_error, message};

#[derive(Debug, Default, Deserialize)]
pub struct IconDataParams {
    pub src: Option<String>,
}

/// Cached bytes of a previously discovered icon. Never fetches anything.
pub async fn get_icon_data(
    State(state): State<AppState>,
    Query(params): Query<IconDataParams>,
) -> Response {
    let Some(src) = params.src.filter(|src| !src.is_empty()) else {
        return message(StatusCode::BAD_REQUEST, "No source icon URL specified");
    };

    match state.icon_store.fetch_data(&src) {
        Ok(data) => {
            let mime_type = ImageUtils::mime_type(&data);
            let disposition = format!("filename={}", UrlUtils::filename(&src));
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                Body::from(data),
            )
                .into_response()
        }
        Err(e) => handle_error(e),
    }
}
