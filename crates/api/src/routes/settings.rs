//! Per-browser settings kept in the sealed settings cookie.

use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Routes mounted at `/settings`.
///
/// ```text
/// GET /theme  -> get_theme
/// PUT /theme  -> set_theme
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/theme", get(settings::get_theme).put(settings::set_theme))
}
