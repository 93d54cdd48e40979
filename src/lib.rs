pub mod distance;
pub mod error;
pub mod gpx_export;
pub mod gpx_parse;
pub mod models;
pub mod segment;
pub mod split;
pub mod track;

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tower_http::cors::{Any, CorsLayer};

use crate::error::SplitError;
use crate::gpx_export::{encode_gpx_base64, render_gpx};
use crate::models::{ExportRequest, SplitRequest, SplitResponse, Track, TrackPayload};
use crate::split::split_document;

pub fn create_router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/split", post(split_handler))
        .route("/api/export", post(export_handler))
        .layer(cors)
}

async fn split_handler(
    Json(req): Json<SplitRequest>,
) -> Result<Json<SplitResponse>, (StatusCode, Json<ApiError>)> {
    let bytes = BASE64
        .decode(req.gpx_base64.as_bytes())
        .map_err(|e| bad_request(format!("invalid base64 payload: {e}")))?;
    tracing::info!(bytes = bytes.len(), mode = ?req.mode, "processing uploaded GPX file");

    let outcome = split_document(&bytes, req.mode, &req.config).map_err(api_error)?;

    let mut tracks = Vec::with_capacity(outcome.tracks.len());
    for track in outcome.tracks {
        let Track {
            id,
            name,
            distance_m,
            duration_s,
            point_count,
            start,
            end,
            points,
        } = track;
        let gpx_base64 = encode_gpx_base64(&name, &points).map_err(api_error)?;
        tracks.push(TrackPayload {
            id,
            name,
            distance_m,
            duration_s,
            point_count,
            start,
            end,
            points,
            gpx_base64,
        });
    }

    Ok(Json(SplitResponse {
        tracks,
        warnings: outcome.warnings,
    }))
}

async fn export_handler(
    Json(req): Json<ExportRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiError>)> {
    let bytes = render_gpx(&req.name, &req.points).map_err(api_error)?;
    let headers = [
        (
            header::CONTENT_TYPE,
            "application/gpx+xml; charset=utf-8".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.gpx\"", sanitize_filename(&req.name)),
        ),
    ];
    Ok((headers, bytes))
}

/// Turns a (possibly user-edited) track name into a safe download filename.
fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_underscore = false;
    for c in name.chars() {
        let mapped = match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | ',' | ' ' => '_',
            other => other,
        };
        if mapped == '_' {
            if last_was_underscore {
                continue;
            }
            last_was_underscore = true;
        } else {
            last_was_underscore = false;
        }
        out.push(mapped);
    }
    let trimmed: String = out
        .trim_matches(|c| c == '_' || c == '.')
        .chars()
        .take(240)
        .collect();
    if trimmed.is_empty() {
        "track".to_string()
    } else {
        trimmed
    }
}

#[derive(serde::Serialize)]
struct ApiError {
    message: String,
}

fn api_error(err: SplitError) -> (StatusCode, Json<ApiError>) {
    let status = match err {
        SplitError::MalformedDocument(_)
        | SplitError::NoTracksFound
        | SplitError::InvalidConfiguration(_)
        | SplitError::InvalidCoordinate { .. } => StatusCode::BAD_REQUEST,
        SplitError::EmptyPointSet | SplitError::Gpx(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}

fn bad_request(message: String) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError { message }))
}

#[cfg(test)]
mod tests {
    use super::sanitize_filename;

    #[test]
    fn test_sanitize_replaces_invalid_characters() {
        assert_eq!(
            sanitize_filename("Morning Ride, Loop?"),
            "Morning_Ride_Loop"
        );
        assert_eq!(sanitize_filename("a/b\\c:d"), "a_b_c_d");
    }

    #[test]
    fn test_sanitize_trims_and_falls_back() {
        assert_eq!(sanitize_filename("..__.."), "track");
        assert_eq!(sanitize_filename(""), "track");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_filename(&long).len(), 240);
    }
}
