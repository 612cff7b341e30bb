//! Route classification.
//!
//! Maps a request path to exactly one cache strategy. The rule tables are
//! build-time constants; classification is a pure function with no side
//! effects. Non-GET requests never reach the classifier, they are filtered
//! upstream by the worker.

/// The three cache strategies a route can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    NetworkFirst,
    CacheFirst,
    StaleWhileRevalidate,
}

/// Path prefixes served network-first (API calls and paper listings).
pub const NETWORK_FIRST_ROUTES: &[&str] = &["/api/", "/papers", "/papers/"];

/// Path prefixes served cache-first (immutable static assets).
pub const CACHE_FIRST_ROUTES: &[&str] = &["/icons/", "/static/", "/fonts/"];

/// Exact paths served stale-while-revalidate (HTML shell pages).
pub const STALE_WHILE_REVALIDATE_ROUTES: &[&str] =
    &["/", "/learn", "/community", "/about", "/blog"];

/// The rule tables, fixed at construction and never mutated at runtime.
#[derive(Debug, Clone)]
pub struct RouteTable {
    swr_exact: Vec<String>,
    cache_first_prefixes: Vec<String>,
    network_first_prefixes: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(NETWORK_FIRST_ROUTES, CACHE_FIRST_ROUTES, STALE_WHILE_REVALIDATE_ROUTES)
    }
}

impl RouteTable {
    /// Build a table from explicit rule sets.
    pub fn new(
        network_first: &[&str],
        cache_first: &[&str],
        stale_while_revalidate: &[&str],
    ) -> Self {
        let owned = |rules: &[&str]| rules.iter().map(|r| (*r).to_string()).collect();
        Self {
            swr_exact: owned(stale_while_revalidate),
            cache_first_prefixes: owned(cache_first),
            network_first_prefixes: owned(network_first),
        }
    }

    /// Classify a request path; first match wins.
    ///
    /// Matching order: exact path in the stale-while-revalidate set, then
    /// prefix in the cache-first set, then prefix in the network-first set,
    /// then the network-first default.
    pub fn classify(&self, path: &str) -> Strategy {
        if self.swr_exact.iter().any(|route| route == path) {
            return Strategy::StaleWhileRevalidate;
        }
        if self.cache_first_prefixes.iter().any(|route| path.starts_with(route)) {
            return Strategy::CacheFirst;
        }
        if self.network_first_prefixes.iter().any(|route| path.starts_with(route)) {
            return Strategy::NetworkFirst;
        }
        Strategy::NetworkFirst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_api_network_first() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/api/papers"), Strategy::NetworkFirst);
        assert_eq!(table.classify("/api/comments/42"), Strategy::NetworkFirst);
        assert_eq!(table.classify("/papers/2408.01234"), Strategy::NetworkFirst);
    }

    #[test]
    fn test_classify_static_cache_first() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/icons/icon-192x192.png"), Strategy::CacheFirst);
        assert_eq!(table.classify("/static/chunks/main.js"), Strategy::CacheFirst);
        assert_eq!(table.classify("/fonts/inter.woff2"), Strategy::CacheFirst);
    }

    #[test]
    fn test_classify_shell_pages_stale_while_revalidate() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/"), Strategy::StaleWhileRevalidate);
        assert_eq!(table.classify("/learn"), Strategy::StaleWhileRevalidate);
        assert_eq!(table.classify("/community"), Strategy::StaleWhileRevalidate);
    }

    #[test]
    fn test_classify_swr_is_exact_match_only() {
        let table = RouteTable::default();
        // "/learn" is exact; "/learn/intro" falls through to the default
        assert_eq!(table.classify("/learn/intro"), Strategy::NetworkFirst);
    }

    #[test]
    fn test_classify_default_network_first() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/some/unknown/page"), Strategy::NetworkFirst);
    }

    #[test]
    fn test_classify_prefix_not_anchored_to_segments() {
        let table = RouteTable::default();
        // startsWith semantics: "/papersearch" still matches the "/papers" prefix
        assert_eq!(table.classify("/papersearch"), Strategy::NetworkFirst);
    }

    #[test]
    fn test_classify_order_swr_beats_prefixes() {
        let table = RouteTable::new(&["/overlap"], &["/overlap"], &["/overlap"]);
        assert_eq!(table.classify("/overlap"), Strategy::StaleWhileRevalidate);
    }

    #[test]
    fn test_classify_order_cache_first_beats_network_first() {
        let table = RouteTable::new(&["/overlap/"], &["/overlap/"], &[]);
        assert_eq!(table.classify("/overlap/app.js"), Strategy::CacheFirst);
    }
}
