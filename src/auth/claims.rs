use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Role carried in the `role` claim of an identity token.
///
/// The three named roles drive policy decisions. Any other non-empty role
/// name from older accounts is preserved as [`Role::Legacy`] and treated as an
/// ordinary tenant role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    SuperAdmin,
    CompanyAdmin,
    Member,
    Legacy(LegacyRole),
}

/// Name of a role outside the named set. Only obtainable through [`Role::parse`],
/// so it never spells one of the named roles and is always header-safe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LegacyRole(String);

impl LegacyRole {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Role {
    pub const SUPER_ADMIN: &'static str = "SUPER_ADMIN";
    pub const COMPANY_ADMIN: &'static str = "COMPANY_ADMIN";
    pub const MEMBER: &'static str = "MEMBER";

    /// Parse a wire role name. Returns `None` for empty names and names with
    /// control characters, which could not be stamped into a header.
    pub fn parse(name: &str) -> Option<Role> {
        match name {
            Self::SUPER_ADMIN => Some(Role::SuperAdmin),
            Self::COMPANY_ADMIN => Some(Role::CompanyAdmin),
            Self::MEMBER => Some(Role::Member),
            other if is_valid_role_name(other) => Some(Role::Legacy(LegacyRole(other.to_string()))),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::SuperAdmin => Self::SUPER_ADMIN,
            Role::CompanyAdmin => Self::COMPANY_ADMIN,
            Role::Member => Self::MEMBER,
            Role::Legacy(legacy) => legacy.as_str(),
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

fn is_valid_role_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_control)
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Role::parse(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid role name '{}'", name)))
    }
}

/// Payload segment of an identity token.
///
/// `company_id` may be absent or `null`; both mean "no tenant". Claims beyond
/// these are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: i64,
    pub role: Role,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Actor derived from a decoded token. Not yet trusted: the policy evaluator
/// decides what it may reach.
///
/// Only the token decoder builds one, so a principal cannot be assembled by
/// hand outside this crate:
///
/// ```compile_fail
/// use tenant_gateway::auth::{Principal, Role};
///
/// let _ = Principal::new(1, Role::SuperAdmin, None);
/// ```
///
/// ```compile_fail
/// use tenant_gateway::auth::{Principal, Role, TokenClaims};
///
/// let claims = TokenClaims { id: 1, role: Role::SuperAdmin, company_id: None, iat: None, exp: None };
/// let _: Principal = claims.into();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    id: i64,
    role: Role,
    tenant_id: Option<i64>,
}

impl Principal {
    /// Build a principal. A platform admin never belongs to a tenant, so any
    /// tenant id supplied alongside [`Role::SuperAdmin`] is discarded.
    ///
    /// Crate-private: outside this crate a principal only comes out of
    /// [`TokenDecoder::decode`](super::TokenDecoder::decode).
    pub(crate) fn new(id: i64, role: Role, tenant_id: Option<i64>) -> Self {
        let tenant_id = if role.is_super_admin() {
            if let Some(forged) = tenant_id {
                tracing::warn!(user_id = id, company_id = forged, "discarding company_id on SUPER_ADMIN token");
            }
            None
        } else {
            tenant_id
        };

        Self { id, role, tenant_id }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn tenant_id(&self) -> Option<i64> {
        self.tenant_id
    }
}
