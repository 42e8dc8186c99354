// handlers/elevated/mod.rs - Platform administration (SUPER_ADMIN only)
//
// The gateway admits only SUPER_ADMIN to /api/super-admin/*. These handlers
// report on tenants in aggregate and never return tenant business records.

use axum::extract::State;
use serde::Serialize;

use crate::gateway::TrustedIdentity;
use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct CompanyUsage {
    pub company_id: i64,
    pub meetings: usize,
}

#[derive(Debug, Serialize)]
pub struct PlatformOverview {
    pub companies: Vec<CompanyUsage>,
    pub total_meetings: usize,
}

/// GET /api/super-admin/overview
pub async fn overview(
    identity: TrustedIdentity,
    State(state): State<AppState>,
) -> ApiResult<PlatformOverview> {
    let companies: Vec<CompanyUsage> = state
        .meetings
        .counts_by_company()
        .await
        .into_iter()
        .map(|(company_id, meetings)| CompanyUsage { company_id, meetings })
        .collect();

    tracing::debug!(user_id = identity.user_id(), "platform overview requested");

    let total_meetings = companies.iter().map(|c| c.meetings).sum();
    Ok(ApiResponse::success(PlatformOverview { companies, total_meetings }))
}
