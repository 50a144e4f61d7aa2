//! Thumbnail routes: generate and list.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use super::current_user_id;
use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    application::use_cases::thumbnail::{GenerateThumbnailInput, ThumbnailProfile},
};

#[derive(Debug, Deserialize)]
struct GenerateThumbnailPayload {
    prompt: Option<String>,
    size: Option<String>,
    model: Option<String>,
    /// Optional reference image (data URL or link).
    image: Option<String>,
}

#[derive(Serialize)]
struct DataResponse<T: Serialize> {
    success: bool,
    data: T,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_thumbnails).post(generate_thumbnail))
}

/// POST /api/thumbnails
async fn generate_thumbnail(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(payload): Json<GenerateThumbnailPayload>,
) -> Response {
    let user_id = match current_user_id(&app_state, &headers, &jar) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };

    let input = GenerateThumbnailInput {
        user_id,
        prompt: payload.prompt.unwrap_or_default(),
        size: payload.size.filter(|s| !s.is_empty()),
        model: payload.model.filter(|m| !m.is_empty()),
        reference_image: payload.image.filter(|i| !i.is_empty()),
    };

    match app_state.thumbnail_use_cases.generate_thumbnail(input).await {
        Ok(data) => Json(DataResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(err) => err.into_response(),
    }
}

/// GET /api/thumbnails
async fn list_thumbnails(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<Json<DataResponse<Vec<ThumbnailProfile>>>> {
    let user_id = current_user_id(&app_state, &headers, &jar)?;
    let data = app_state.thumbnail_use_cases.list_thumbnails(user_id).await?;
    Ok(Json(DataResponse {
        success: true,
        data,
    }))
}
