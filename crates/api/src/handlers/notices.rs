//! Handler draining the session's notice board.

use axum::extract::State;
use axum::Json;
use rms_core::notice::Notice;

use crate::middleware::auth::AuthSession;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/notices
///
/// Return and clear every queued notice of the caller's session.
pub async fn drain(
    State(state): State<AppState>,
    session: AuthSession,
) -> Json<DataResponse<Vec<Notice>>> {
    let shared = state.sessions.session(&session.claims).await;
    let notices = shared.lock().await.notices.drain();
    Json(DataResponse { data: notices })
}
