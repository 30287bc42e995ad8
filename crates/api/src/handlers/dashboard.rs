//! Handler for the staff dashboard.

use axum::extract::State;
use axum::Json;
use rms_db::models::dashboard::DashboardCounts;
use rms_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::middleware::auth::StaffUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard
pub async fn counts(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> AppResult<Json<DataResponse<DashboardCounts>>> {
    let data = DashboardRepo::counts(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}
