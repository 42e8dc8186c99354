/// Access category of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// No identity required.
    Public,
    /// Platform administration; `SUPER_ADMIN` only.
    PlatformAdminOnly,
    /// Any authenticated principal, with or without a tenant.
    AlwaysAuthenticated,
    /// User administration shared by platform admins and tenant admins.
    SharedUserAdmin,
    /// Tenant business data. The default.
    TenantScoped,
}

impl RouteClass {
    /// Whether a platform admin may reach routes of this class.
    pub fn admits_super_admin(self) -> bool {
        match self {
            RouteClass::Public
            | RouteClass::PlatformAdminOnly
            | RouteClass::AlwaysAuthenticated
            | RouteClass::SharedUserAdmin => true,
            RouteClass::TenantScoped => false,
        }
    }

    /// Whether a non-platform principal needs a tenant for API calls here.
    pub fn requires_tenant(self) -> bool {
        match self {
            RouteClass::SharedUserAdmin | RouteClass::TenantScoped => true,
            RouteClass::Public | RouteClass::PlatformAdminOnly | RouteClass::AlwaysAuthenticated => false,
        }
    }
}

/// Whether a request targets the JSON API or a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Api,
    Page,
}

impl PathKind {
    pub fn of(path: &str) -> Self {
        if matches_prefix(path, "/api") {
            PathKind::Api
        } else {
            PathKind::Page
        }
    }
}

/// Asset trees served without any identity.
const STATIC_PREFIXES: &[&str] = &["/_next", "/static", "/images", "/favicon.ico", "/robots.txt"];

const PUBLIC_PREFIXES: &[&str] = &[
    "/login",
    "/register",
    "/forgot-password",
    "/reset-password",
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/forgot-password",
    "/api/auth/reset-password",
    "/health",
];

const PLATFORM_ADMIN_PREFIXES: &[&str] = &["/super-admin", "/api/super-admin"];

const ALWAYS_AUTHENTICATED_PREFIXES: &[&str] = &["/api/auth", "/api/profile", "/profile"];

const SHARED_USER_ADMIN_PREFIXES: &[&str] = &["/api/users"];

// Checked top to bottom; the first table with a match decides.
const ROUTE_TABLE: &[(RouteClass, &[&str])] = &[
    (RouteClass::Public, PUBLIC_PREFIXES),
    (RouteClass::PlatformAdminOnly, PLATFORM_ADMIN_PREFIXES),
    (RouteClass::AlwaysAuthenticated, ALWAYS_AUTHENTICATED_PREFIXES),
    (RouteClass::SharedUserAdmin, SHARED_USER_ADMIN_PREFIXES),
];

/// Prefix match on whole path segments: `/login` matches `/login` and
/// `/login/help` but not `/loginx`.
pub fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Site root or a static asset.
pub fn is_static_or_root(path: &str) -> bool {
    path.is_empty() || path == "/" || STATIC_PREFIXES.iter().any(|prefix| matches_prefix(path, prefix))
}

pub fn classify(path: &str) -> RouteClass {
    if is_static_or_root(path) {
        return RouteClass::Public;
    }

    ROUTE_TABLE
        .iter()
        .find(|(_, prefixes)| prefixes.iter().any(|prefix| matches_prefix(path, prefix)))
        .map(|(class, _)| *class)
        .unwrap_or(RouteClass::TenantScoped)
}
