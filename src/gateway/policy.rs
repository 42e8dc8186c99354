use axum::http::StatusCode;

use super::identity::TrustedIdentity;
use super::routes::{PathKind, RouteClass};
use crate::auth::Principal;
use crate::error::ApiError;

pub const LOGIN_PAGE: &str = "/login";
pub const DASHBOARD_PAGE: &str = "/dashboard";
pub const SUPER_ADMIN_HOME: &str = "/super-admin";

/// What the caller presented, after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// No token anywhere on the request.
    Absent,
    /// A token was presented but did not decode or verify.
    Invalid,
    Valid(Principal),
}

/// Why an API request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Unauthenticated(&'static str),
    Forbidden(&'static str),
}

impl Rejection {
    pub fn status(self) -> StatusCode {
        match self {
            Rejection::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Rejection::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Rejection::Unauthenticated(message) | Rejection::Forbidden(message) => message,
        }
    }
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Unauthenticated(message) => ApiError::unauthorized(message),
            Rejection::Forbidden(message) => ApiError::forbidden(message),
        }
    }
}

/// Outcome of evaluating one request. Exactly one per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Public route: forward without identity.
    PassThrough,
    /// Forward carrying this identity.
    Allow(TrustedIdentity),
    /// Page request sent elsewhere with a 307.
    RedirectTo(&'static str),
    /// API request refused.
    Reject(Rejection),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::PassThrough | Decision::Allow(_))
    }
}

pub const MSG_UNAUTHORIZED: &str = "Unauthorized";
pub const MSG_INVALID_TOKEN: &str = "Invalid token";
pub const MSG_FORBIDDEN: &str = "Forbidden";
pub const MSG_SUPER_ADMIN_TENANT_DATA: &str = "SUPER_ADMIN cannot access tenant data";
pub const MSG_NO_COMPANY: &str = "No company associated with account";

fn refuse(kind: PathKind, rejection: Rejection, page: &'static str) -> Decision {
    match kind {
        PathKind::Api => Decision::Reject(rejection),
        PathKind::Page => Decision::RedirectTo(page),
    }
}

/// Apply the access rules, in order, to one request. Crate-private: callers
/// go through [`Gateway::evaluate`](super::Gateway::evaluate), which derives
/// the credential from the request itself.
pub(crate) fn evaluate(class: RouteClass, kind: PathKind, credential: Credential) -> Decision {
    if class == RouteClass::Public {
        return Decision::PassThrough;
    }

    let principal = match credential {
        Credential::Absent => {
            return refuse(kind, Rejection::Unauthenticated(MSG_UNAUTHORIZED), LOGIN_PAGE)
        }
        Credential::Invalid => {
            return refuse(kind, Rejection::Unauthenticated(MSG_INVALID_TOKEN), LOGIN_PAGE)
        }
        Credential::Valid(principal) => principal,
    };

    let super_admin = principal.role().is_super_admin();

    if class == RouteClass::PlatformAdminOnly && !super_admin {
        return refuse(kind, Rejection::Forbidden(MSG_FORBIDDEN), DASHBOARD_PAGE);
    }

    // Platform privilege does not extend to tenant business data
    if super_admin && !class.admits_super_admin() {
        return refuse(kind, Rejection::Forbidden(MSG_SUPER_ADMIN_TENANT_DATA), SUPER_ADMIN_HOME);
    }

    // Pages still render for accounts without a tenant; their API calls fail
    if kind == PathKind::Api && !super_admin && class.requires_tenant() && principal.tenant_id().is_none() {
        return Decision::Reject(Rejection::Forbidden(MSG_NO_COMPANY));
    }

    Decision::Allow(TrustedIdentity::from_principal(&principal))
}
