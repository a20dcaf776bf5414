//! Routes that skip authentication.
//!
//! The list is built once at startup. Configured entries are exact paths; an
//! entry ending in `*` matches every path that starts with the part before it.

/// One unauthenticated route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatcher {
    /// Any path starting with this string
    Prefix(String),
    /// Exactly this path
    Exact(String),
}

impl RouteMatcher {
    /// Reads one configured entry, e.g. `/auth/login` or `/public/*`.
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        pattern.strip_suffix('*').map_or_else(
            || Self::Exact(pattern.to_string()),
            |prefix| Self::Prefix(prefix.to_string()),
        )
    }

    /// Whether `path` matches.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Self::Exact(exact) => path == exact,
        }
    }
}

/// Ordered set of routes that bypass the auth filter.
#[derive(Debug, Clone, Default)]
pub struct BypassList {
    matchers: Vec<RouteMatcher>,
}

impl BypassList {
    /// Creates a list from explicit matchers.
    #[must_use]
    pub const fn new(matchers: Vec<RouteMatcher>) -> Self {
        Self { matchers }
    }

    /// Builds the list from configured route entries plus the exact health path.
    #[must_use]
    pub fn from_parts(routes: &[String], health_path: &str) -> Self {
        let mut matchers: Vec<RouteMatcher> =
            routes.iter().map(|r| RouteMatcher::parse(r)).collect();
        matchers.push(RouteMatcher::Exact(health_path.to_string()));
        Self { matchers }
    }

    /// Whether `path` skips authentication.
    #[must_use]
    pub fn is_bypassed(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> BypassList {
        BypassList::from_parts(
            &["/auth/login".to_string(), "/auth/logout".to_string()],
            "/health",
        )
    }

    #[test]
    fn test_login_and_logout_bypassed() {
        let list = defaults();
        assert!(list.is_bypassed("/auth/login"));
        assert!(list.is_bypassed("/auth/logout"));
    }

    #[test]
    fn test_other_auth_paths_need_credentials() {
        let list = defaults();
        assert!(!list.is_bypassed("/auth/admin"));
        assert!(!list.is_bypassed("/auth/login/extra"));
        assert!(!list.is_bypassed("/auth/"));
    }

    #[test]
    fn test_parse_entries() {
        assert_eq!(
            RouteMatcher::parse("/auth/login"),
            RouteMatcher::Exact("/auth/login".to_string())
        );
        assert_eq!(
            RouteMatcher::parse("/public/*"),
            RouteMatcher::Prefix("/public/".to_string())
        );
    }

    #[test]
    fn test_wildcard_entry_is_prefix() {
        let list = BypassList::from_parts(&["/public/*".to_string()], "/health");
        assert!(list.is_bypassed("/public/logo.png"));
        assert!(!list.is_bypassed("/publicity"));
    }

    #[test]
    fn test_health_is_exact() {
        let list = defaults();
        assert!(list.is_bypassed("/health"));
        assert!(!list.is_bypassed("/health/details"));
        assert!(!list.is_bypassed("/healthz"));
    }

    #[test]
    fn test_other_paths_not_bypassed() {
        let list = defaults();
        assert!(!list.is_bypassed("/"));
        assert!(!list.is_bypassed("/auth"));
        assert!(!list.is_bypassed("/api/orders"));
        assert!(!list.is_bypassed("/v1/auth/login"));
    }

    #[test]
    fn test_empty_list_bypasses_nothing() {
        assert!(!BypassList::default().is_bypassed("/health"));
    }
}
