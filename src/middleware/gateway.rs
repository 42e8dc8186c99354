use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Redirect, Response},
    Router,
};

use crate::error::ApiError;
use crate::gateway::identity::{stamp_identity_headers, strip_identity_headers};
use crate::gateway::{Decision, Gateway};

/// Authorization middleware: evaluates the gateway for every request and
/// either answers directly or forwards with trusted identity attached.
pub async fn gateway_middleware(
    State(gateway): State<Arc<Gateway>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    match gateway.evaluate(&path, request.headers()) {
        Decision::PassThrough => {
            strip_identity_headers(request.headers_mut());
            next.run(request).await
        }
        Decision::Allow(identity) => {
            if let Err(e) = stamp_identity_headers(request.headers_mut(), &identity) {
                tracing::error!(path = %path, "failed to build identity headers: {}", e);
                return ApiError::internal_server_error("Failed to propagate identity").into_response();
            }

            tracing::debug!(
                path = %path,
                user_id = identity.user_id(),
                role = %identity.role(),
                company_id = ?identity.company_id(),
                "request authorized"
            );

            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Decision::RedirectTo(location) => {
            tracing::debug!(path = %path, location, "redirecting page request");
            Redirect::temporary(location).into_response()
        }
        Decision::Reject(rejection) => {
            tracing::debug!(
                path = %path,
                status = rejection.status().as_u16(),
                reason = rejection.message(),
                "rejecting API request"
            );
            ApiError::from(rejection).into_response()
        }
    }
}

/// Put `router` behind the gateway. Must be the innermost layer so nothing
/// downstream runs before the decision.
pub fn protect<S>(router: Router<S>, gateway: Arc<Gateway>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(from_fn_with_state(gateway, gateway_middleware))
}
