//! Route table and navigation guard.
//!
//! Pure policy: given a path and the current auth state, decide which screen
//! to show or where to redirect. The actual navigation (history, rendering)
//! belongs to the embedding shell.
//!
//! The table is matched in declaration order; `:name` segments capture one
//! path segment each. An unauthenticated visit to a protected route
//! redirects to the login screen; an authenticated visit to the login
//! screen redirects to the dashboard.

use std::collections::HashMap;

/// Canonical login path, used as the unauthenticated redirect target.
pub const LOGIN_PATH: &str = "/admin/login";
/// Canonical dashboard path, used as the post-login redirect target.
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Every screen the application can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteId {
    AdminLogin,
    AdminDashboard,
    AdminProducts,
    AdminAmbassadors,
    AdminArticles,
    AdminSettings,
    Home,
    Storefront,
    Editor,
    NotFound,
}

/// One route table entry.
#[derive(Debug, Clone, Copy)]
pub struct RouteDef {
    pub id: RouteId,
    pub pattern: &'static str,
    pub requires_auth: bool,
}

/// The route table, in match order. The public storefront pattern is last
/// among the real routes so `/admin/...` never falls through to it.
pub const ROUTES: &[RouteDef] = &[
    RouteDef {
        id: RouteId::AdminLogin,
        pattern: "/admin/login",
        requires_auth: false,
    },
    // Bare "/admin" lands on the dashboard, same screen as its canonical
    // path.
    RouteDef {
        id: RouteId::AdminDashboard,
        pattern: "/admin",
        requires_auth: true,
    },
    RouteDef {
        id: RouteId::AdminDashboard,
        pattern: "/admin/dashboard",
        requires_auth: true,
    },
    RouteDef {
        id: RouteId::AdminProducts,
        pattern: "/admin/products",
        requires_auth: true,
    },
    RouteDef {
        id: RouteId::AdminAmbassadors,
        pattern: "/admin/ambassadors",
        requires_auth: true,
    },
    RouteDef {
        id: RouteId::AdminArticles,
        pattern: "/admin/articles",
        requires_auth: true,
    },
    RouteDef {
        id: RouteId::AdminSettings,
        pattern: "/admin/settings",
        requires_auth: true,
    },
    RouteDef {
        id: RouteId::Home,
        pattern: "/",
        requires_auth: false,
    },
    RouteDef {
        id: RouteId::Storefront,
        pattern: "/:ambassador_id",
        requires_auth: false,
    },
    RouteDef {
        id: RouteId::Editor,
        pattern: "/:ambassador_id/editor",
        requires_auth: false,
    },
];

/// A matched route plus its captured `:name` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub id: RouteId,
    pub requires_auth: bool,
    pub params: HashMap<String, String>,
}

/// What the shell should do with a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDecision {
    /// Show the resolved screen.
    Allow,
    /// Protected route, no session: go to [`LOGIN_PATH`].
    RedirectToLogin,
    /// Login screen while signed in: go to [`DASHBOARD_PATH`].
    RedirectToDashboard,
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn match_pattern(pattern: &str, segments: &[&str]) -> Option<HashMap<String, String>> {
    let pattern_segments = split_path(pattern);
    if pattern_segments.len() != segments.len() {
        return None;
    }
    let mut params = HashMap::new();
    for (expected, actual) in pattern_segments.iter().zip(segments) {
        if let Some(name) = expected.strip_prefix(':') {
            params.insert(name.to_owned(), (*actual).to_owned());
        } else if expected != actual {
            return None;
        }
    }
    Some(params)
}

/// Resolve a path against the route table. Unmatched paths resolve to
/// [`RouteId::NotFound`] rather than erroring.
#[must_use]
pub fn resolve(path: &str) -> ResolvedRoute {
    let segments = split_path(path);
    if segments.is_empty() {
        return ResolvedRoute {
            id: RouteId::Home,
            requires_auth: false,
            params: HashMap::new(),
        };
    }
    for route in ROUTES {
        if let Some(params) = match_pattern(route.pattern, &segments) {
            return ResolvedRoute {
                id: route.id,
                requires_auth: route.requires_auth,
                params,
            };
        }
    }
    ResolvedRoute {
        id: RouteId::NotFound,
        requires_auth: false,
        params: HashMap::new(),
    }
}

/// Navigation guard. Pure function of the resolved route and auth state.
#[must_use]
pub fn guard(route: &ResolvedRoute, is_authenticated: bool) -> NavDecision {
    if route.requires_auth && !is_authenticated {
        return NavDecision::RedirectToLogin;
    }
    if route.id == RouteId::AdminLogin && is_authenticated {
        return NavDecision::RedirectToDashboard;
    }
    NavDecision::Allow
}
