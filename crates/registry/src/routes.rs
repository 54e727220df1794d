//! Named route patterns and URL rendering for details/list links.

#![forbid(unsafe_code)]

use std::sync::RwLock;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use vantage_core::{VantageError, VantageResult};

static ROUTES: Lazy<RwLock<FxHashMap<String, String>>> =
    Lazy::new(|| RwLock::new(FxHashMap::default()));

/// Register (or replace) a route pattern like "/configmaps/:namespace/:name".
pub fn register_route(name: &str, pattern: &str) {
    ROUTES
        .write()
        .unwrap()
        .insert(name.to_string(), pattern.to_string());
}

/// Render a registered route, substituting `:namespace` and `:name`.
/// A pattern that needs a namespace fails when none is supplied.
pub fn route_url(route: &str, namespace: Option<&str>, name: &str) -> VantageResult<String> {
    let pattern = ROUTES
        .read()
        .unwrap()
        .get(route)
        .cloned()
        .ok_or_else(|| VantageError::Routing(format!("route not registered: {}", route)))?;
    let mut out = String::with_capacity(pattern.len() + name.len());
    for seg in pattern.split('/') {
        if seg.is_empty() {
            continue;
        }
        out.push('/');
        match seg {
            ":name" => out.push_str(name),
            ":namespace" => match namespace {
                Some(ns) => out.push_str(ns),
                None => {
                    return Err(VantageError::Routing(format!(
                        "route {} needs a namespace",
                        route
                    )))
                }
            },
            other => out.push_str(other),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_namespaced_and_cluster_patterns() {
        register_route("widget", "/widgets/:namespace/:name");
        register_route("blade", "/blades/:name");
        assert_eq!(
            route_url("widget", Some("default"), "w1").unwrap(),
            "/widgets/default/w1"
        );
        assert_eq!(route_url("blade", None, "b1").unwrap(), "/blades/b1");
        // A namespace supplied to a cluster pattern is simply unused.
        assert_eq!(route_url("blade", Some("default"), "b1").unwrap(), "/blades/b1");
    }

    #[test]
    fn missing_namespace_is_a_routing_error() {
        register_route("widget2", "/widgets/:namespace/:name");
        let err = route_url("widget2", None, "w1").unwrap_err();
        assert!(matches!(err, VantageError::Routing(_)));
    }

    #[test]
    fn unknown_route_is_a_routing_error() {
        let err = route_url("never-registered", None, "x").unwrap_err();
        assert!(matches!(err, VantageError::Routing(_)));
    }
}
