// handlers/protected/auth.rs - GET /api/auth/me and GET /api/profile

use crate::gateway::TrustedIdentity;
use crate::middleware::ApiResponse;

/// Identity the gateway attached to this request.
pub async fn whoami(identity: TrustedIdentity) -> ApiResponse<TrustedIdentity> {
    ApiResponse::success(identity)
}
