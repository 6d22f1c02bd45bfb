use crate::api::rest::{first_query_value, AppState};
use crate::db::models::NewOpenEvent;
use axum::extract::{ConnectInfo, RawQuery, State};
use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use log::{debug, error};
use std::net::SocketAddr;

/// 1x1 transparent GIF89a
pub const TRANSPARENT_GIF: &[u8; 42] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x01, 0x44, 0x00, 0x3b,
];

const NO_CACHE: &str = "no-cache, no-store, must-revalidate, max-age=0";

/// First `id` value in the query string, empty when absent
fn subject_id(query: Option<&str>) -> String {
    first_query_value(query, "id").unwrap_or_default()
}

fn header_text(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

/// `GET /pixel.gif?id=<subject>`
///
/// Records the fetch and always answers with the pixel. Storage failures are logged and
/// swallowed so the tracked content never shows a broken image.
pub async fn pixel(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let remote_address = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();

    let event = NewOpenEvent::received_now(
        subject_id(query.as_deref()),
        remote_address,
        header_text(&headers, HeaderName::from_static("x-forwarded-for")),
        header_text(&headers, header::USER_AGENT).unwrap_or_default(),
        header_text(&headers, header::REFERER).unwrap_or_default(),
    );

    match state.opens_repo.append(&event).await {
        Ok(stored) => debug!("Pixel fired for {:?} (event {})", stored.subject_id, stored.id),
        Err(e) => error!("Failed to record pixel fetch for {:?}: {}", event.subject_id, e),
    }

    pixel_response()
}

pub fn pixel_response() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/gif"),
            (header::CACHE_CONTROL, NO_CACHE),
            (header::PRAGMA, "no-cache"),
        ],
        &TRANSPARENT_GIF[..],
    )
        .into_response()
}
