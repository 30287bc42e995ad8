//! Handlers for UI settings kept in the sealed settings cookie.

use axum::extract::State;
use axum::{Form, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::{ActionResponse, DataResponse};
use crate::session::cookie::{settings_cookie, Settings, Theme, SETTINGS_COOKIE};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ThemeForm {
    pub theme: String,
}

/// Current settings; an absent or unreadable cookie yields the defaults.
fn read_settings(state: &AppState, jar: &CookieJar) -> Settings {
    jar.get(SETTINGS_COOKIE)
        .and_then(|cookie| state.cipher.open_json::<Settings>(cookie.value()).ok())
        .unwrap_or_default()
}

/// GET /api/v1/settings/theme
pub async fn get_theme(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Json<DataResponse<Settings>> {
    Json(DataResponse {
        data: read_settings(&state, &jar),
    })
}

/// PUT /api/v1/settings/theme
pub async fn set_theme(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<ThemeForm>,
) -> AppResult<(CookieJar, Json<ActionResponse<Settings>>)> {
    let theme = Theme::parse(&input.theme).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unknown theme '{}'. Expected: light, dark",
            input.theme
        ))
    })?;

    let mut settings = read_settings(&state, &jar);
    settings.theme = theme;
    let sealed = state.cipher.seal_json(&settings)?;

    Ok((
        jar.add(settings_cookie(sealed, &state.config.session)),
        Json(ActionResponse::ok("Theme updated", settings)),
    ))
}
