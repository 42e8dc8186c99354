use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::InvalidHeaderValue, request::Parts, HeaderMap, HeaderName, HeaderValue},
};
use serde::Serialize;

use crate::auth::{Principal, Role};
use crate::error::ApiError;

pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");
pub const USER_ROLE_HEADER: HeaderName = HeaderName::from_static("x-user-role");
pub const COMPANY_ID_HEADER: HeaderName = HeaderName::from_static("x-company-id");

/// Header names only the gateway may write.
pub const IDENTITY_HEADERS: [HeaderName; 3] = [USER_ID_HEADER, USER_ROLE_HEADER, COMPANY_ID_HEADER];

/// Caller identity the gateway has authorized for the current request.
///
/// Fields are private and the constructor is crate-private: handlers can read
/// an identity (via the extractor) but never fabricate one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustedIdentity {
    user_id: i64,
    role: Role,
    company_id: Option<i64>,
}

impl TrustedIdentity {
    pub(crate) fn from_principal(principal: &Principal) -> Self {
        Self {
            user_id: principal.id(),
            role: principal.role().clone(),
            company_id: principal.tenant_id(),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn company_id(&self) -> Option<i64> {
        self.company_id
    }

    /// Tenant the caller's data queries must be scoped to.
    pub fn require_company(&self) -> Result<i64, ApiError> {
        self.company_id
            .ok_or_else(|| ApiError::forbidden("No company associated with account"))
    }

    /// The three trusted headers. A missing tenant is sent as an empty
    /// `x-company-id`, never omitted.
    pub fn header_values(&self) -> Result<[(HeaderName, HeaderValue); 3], InvalidHeaderValue> {
        let company = match self.company_id {
            Some(id) => HeaderValue::from(id),
            None => HeaderValue::from_static(""),
        };

        Ok([
            (USER_ID_HEADER, HeaderValue::from(self.user_id)),
            (USER_ROLE_HEADER, HeaderValue::try_from(self.role.as_str())?),
            (COMPANY_ID_HEADER, company),
        ])
    }
}

/// Drop every caller-supplied value of the identity headers.
pub fn strip_identity_headers(headers: &mut HeaderMap) {
    for name in IDENTITY_HEADERS {
        headers.remove(name);
    }
}

/// Replace whatever identity headers the request carried with `identity`.
pub fn stamp_identity_headers(headers: &mut HeaderMap, identity: &TrustedIdentity) -> Result<(), InvalidHeaderValue> {
    let values = identity.header_values()?;
    strip_identity_headers(headers);
    for (name, value) in values {
        headers.insert(name, value);
    }
    Ok(())
}

#[async_trait]
impl<S> FromRequestParts<S> for TrustedIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TrustedIdentity>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role, company: Option<i64>) -> TrustedIdentity {
        TrustedIdentity::from_principal(&Principal::new(7, role, company))
    }

    #[test]
    fn test_stamps_all_three_headers() {
        let mut headers = HeaderMap::new();
        stamp_identity_headers(&mut headers, &identity(Role::CompanyAdmin, Some(1))).unwrap();

        assert_eq!(headers[&USER_ID_HEADER], "7");
        assert_eq!(headers[&USER_ROLE_HEADER], "COMPANY_ADMIN");
        assert_eq!(headers[&COMPANY_ID_HEADER], "1");
    }

    #[test]
    fn test_null_tenant_is_sent_as_empty_header() {
        let mut headers = HeaderMap::new();
        stamp_identity_headers(&mut headers, &identity(Role::Member, None)).unwrap();

        assert_eq!(headers.get(&COMPANY_ID_HEADER).unwrap(), "");
    }

    #[test]
    fn test_overwrites_spoofed_values_instead_of_merging() {
        let mut headers = HeaderMap::new();
        headers.append(USER_ID_HEADER, HeaderValue::from_static("1"));
        headers.append(COMPANY_ID_HEADER, HeaderValue::from_static("99"));
        headers.append(COMPANY_ID_HEADER, HeaderValue::from_static("100"));
        headers.append(USER_ROLE_HEADER, HeaderValue::from_static("SUPER_ADMIN"));

        stamp_identity_headers(&mut headers, &identity(Role::Member, Some(5))).unwrap();

        let companies: Vec<_> = headers.get_all(&COMPANY_ID_HEADER).iter().collect();
        assert_eq!(companies, vec!["5"]);
        assert_eq!(headers.get_all(&USER_ID_HEADER).iter().count(), 1);
        assert_eq!(headers[&USER_ID_HEADER], "7");
        assert_eq!(headers[&USER_ROLE_HEADER], "MEMBER");
    }

    #[test]
    fn test_strip_leaves_other_headers_alone() {
        let mut headers = HeaderMap::new();
        headers.insert(COMPANY_ID_HEADER, HeaderValue::from_static("99"));
        headers.insert("x-request-id", HeaderValue::from_static("abc"));

        strip_identity_headers(&mut headers);

        assert!(headers.get(&COMPANY_ID_HEADER).is_none());
        assert_eq!(headers["x-request-id"], "abc");
    }

    #[test]
    fn test_require_company() {
        assert_eq!(identity(Role::Member, Some(3)).require_company().unwrap(), 3);
        let err = identity(Role::Member, None).require_company().unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
