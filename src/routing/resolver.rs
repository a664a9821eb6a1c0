//! Per-request directory resolution.
//!
//! # Responsibilities
//! - Find the first rule matching the request host
//! - Compose the directory of each enabled category
//! - Fall back to the shared domain directory for the auto pattern
//! - Report an explicit outcome, including the no-match status
//!
//! # Design Decisions
//! - Rules are immutable after construction (no locking on the hot path)
//! - First matching rule that publishes anything wins; no best-match scoring
//! - The existence cache is owned by the resolver and lives as long as it

use axum::http::StatusCode;

use crate::observability::metrics;
use crate::routing::cache::ExistenceCache;
use crate::routing::matcher::Pattern;
use crate::routing::paths::RootPaths;
use crate::routing::rule::Rule;

/// Outcome of one [`Resolver::resolve`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Directories were published by the rule at this index.
    Matched { rule: usize },
    /// The request was already resolved; nothing was done.
    AlreadyResolved,
    /// No rule published anything. When `status` is set the caller should
    /// answer with it and stop processing the request.
    Unmatched { status: Option<StatusCode> },
}

impl Resolution {
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Matched { .. } => "matched",
            Resolution::AlreadyResolved => "already_resolved",
            Resolution::Unmatched { status: Some(_) } => "rejected",
            Resolution::Unmatched { status: None } => "unmatched",
        }
    }
}

/// Resolves category directories for request hosts.
#[derive(Debug)]
pub struct Resolver {
    rules: Vec<Rule>,
    no_match: Option<StatusCode>,
    cache: ExistenceCache,
}

impl Resolver {
    /// Create a resolver over `rules`, checked in order.
    ///
    /// `no_match` is the status to answer with when no rule applies; `None`
    /// lets the request continue without any directories.
    pub fn new(rules: Vec<Rule>, no_match: Option<StatusCode>) -> Self {
        Self::with_cache(rules, no_match, ExistenceCache::new())
    }

    /// Like [`Resolver::new`], with a caller-supplied existence cache.
    pub fn with_cache(rules: Vec<Rule>, no_match: Option<StatusCode>, cache: ExistenceCache) -> Self {
        Self {
            rules,
            no_match,
            cache,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn no_match_status(&self) -> Option<StatusCode> {
        self.no_match
    }

    pub fn cache(&self) -> &ExistenceCache {
        &self.cache
    }

    /// Resolve directories for `host` (which may carry a `:port`) into `paths`.
    pub fn resolve(&self, host: &str, paths: &mut RootPaths) -> Resolution {
        if paths.resolved {
            return Resolution::AlreadyResolved;
        }

        let host = strip_port(host);

        for (index, rule) in self.rules.iter().enumerate() {
            let Some(prefix) = rule.matches(host) else {
                continue;
            };

            let mut published = false;
            for category in rule.layout().categories.iter() {
                let mut dir = rule.compose(prefix, category);

                if rule.pattern() == Pattern::Auto && !self.cache.exists(&dir) {
                    let fallback = rule.compose_fallback(category);
                    tracing::debug!(
                        host = %host,
                        missing = %dir.display(),
                        fallback = %fallback.display(),
                        "Falling back to shared domain directory"
                    );
                    metrics::record_fallback();
                    dir = fallback;
                }

                paths.publish(category, dir);
                published = true;
            }

            if published {
                paths.resolved = true;
                tracing::debug!(
                    host = %host,
                    rule = index,
                    domain = %rule.domain(),
                    pattern = %rule.pattern(),
                    prefix = %prefix,
                    "Resolved root paths"
                );
                let resolution = Resolution::Matched { rule: index };
                metrics::record_resolution(resolution.label());
                return resolution;
            }
        }

        if let Some(status) = self.no_match {
            tracing::warn!(host = %host, status = %status, "No root path rule matched");
        } else {
            tracing::debug!(host = %host, "No root path rule matched");
        }

        let resolution = Resolution::Unmatched {
            status: self.no_match,
        };
        metrics::record_resolution(resolution.label());
        resolution
    }
}

/// Drop a trailing `:port` from a Host header value.
pub fn strip_port(host: &str) -> &str {
    host.split_once(':').map_or(host, |(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::cache::tests::CountingProbe;
    use crate::routing::rule::{Categories, Category, Layout};
    use std::path::{Path, PathBuf};

    fn static_only() -> Layout {
        Layout::new(Categories::NONE.with(Category::Static))
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("aa.bb:8080"), "aa.bb");
        assert_eq!(strip_port("aa.bb"), "aa.bb");
        assert_eq!(strip_port(""), "");
    }

    #[test]
    fn test_resolves_with_port() {
        let resolver = Resolver::new(
            vec![Rule::with_defaults(Pattern::Exact, "aa.bb", "equal", Layout::default())],
            None,
        );
        let mut paths = RootPaths::default();

        assert_eq!(resolver.resolve("aa.bb:3000", &mut paths), Resolution::Matched { rule: 0 });
        assert!(paths.resolved);
        assert_eq!(paths.get(Category::Static), Some(Path::new("equal/aa.bb/_static")));
        assert_eq!(paths.get(Category::Content), Some(Path::new("equal/aa.bb/_content")));
        assert_eq!(paths.get(Category::Template), Some(Path::new("equal/aa.bb/_template")));
    }

    #[test]
    fn test_first_match_wins() {
        let resolver = Resolver::new(
            vec![
                Rule::with_defaults(Pattern::Shared, "aa.bb", "first", static_only()),
                Rule::with_defaults(Pattern::Isolated, "aa.bb", "second", Layout::default()),
            ],
            None,
        );
        let mut paths = RootPaths::default();

        assert_eq!(resolver.resolve("cc.aa.bb", &mut paths), Resolution::Matched { rule: 0 });
        assert_eq!(paths.get(Category::Static), Some(Path::new("first/aa.bb/_static")));
        assert_eq!(paths.content_dir, None);
        assert_eq!(paths.template_dir, None);
    }

    #[test]
    fn test_rule_without_categories_falls_through() {
        let resolver = Resolver::new(
            vec![
                Rule::with_defaults(Pattern::Shared, "aa.bb", "empty", Layout::new(Categories::NONE)),
                Rule::with_defaults(Pattern::Shared, "aa.bb", "full", static_only()),
            ],
            Some(StatusCode::FORBIDDEN),
        );
        let mut paths = RootPaths::default();

        assert_eq!(resolver.resolve("aa.bb", &mut paths), Resolution::Matched { rule: 1 });
        assert_eq!(paths.get(Category::Static), Some(Path::new("full/aa.bb/_static")));
    }

    #[test]
    fn test_unmatched_reports_status() {
        let resolver = Resolver::new(
            vec![Rule::with_defaults(Pattern::Exact, "aa.bb", "equal", Layout::default())],
            Some(StatusCode::FORBIDDEN),
        );
        let mut paths = RootPaths::default();

        assert_eq!(
            resolver.resolve("cc.aa.bb", &mut paths),
            Resolution::Unmatched { status: Some(StatusCode::FORBIDDEN) }
        );
        assert_eq!(paths, RootPaths::default());
    }

    #[test]
    fn test_unmatched_without_status() {
        let resolver = Resolver::new(Vec::new(), None);
        let mut paths = RootPaths::default();

        assert_eq!(resolver.resolve("aa.bb", &mut paths), Resolution::Unmatched { status: None });
        assert!(paths.is_empty());
        assert!(!paths.resolved);
    }

    #[test]
    fn test_auto_falls_back_when_subdomain_dir_missing() {
        let probe = CountingProbe::new(["r/aa.bb/_static"]);
        let resolver = Resolver::with_cache(
            vec![Rule::with_defaults(Pattern::Auto, "aa.bb", "r", static_only())],
            None,
            ExistenceCache::with_probe(probe.clone()),
        );

        let mut paths = RootPaths::default();
        resolver.resolve("cc.aa.bb", &mut paths);
        assert_eq!(paths.get(Category::Static), Some(Path::new("r/aa.bb/_static")));

        // Cached by the composed, pre-fallback path
        assert_eq!(resolver.cache().get(Path::new("r/cc.aa.bb/_static")), Some(false));
        assert_eq!(probe.calls(), 1);
    }

    #[test]
    fn test_auto_keeps_existing_subdomain_dir() {
        let probe = CountingProbe::new(["r/dd.aa.bb/_static"]);
        let resolver = Resolver::with_cache(
            vec![Rule::with_defaults(Pattern::Auto, "aa.bb", "r", static_only())],
            None,
            ExistenceCache::with_probe(probe.clone()),
        );

        let mut paths = RootPaths::default();
        resolver.resolve("dd.aa.bb", &mut paths);
        assert_eq!(paths.get(Category::Static), Some(Path::new("r/dd.aa.bb/_static")));
    }

    #[test]
    fn test_auto_fallback_respects_skip_domain() {
        let probe = CountingProbe::new(Vec::<PathBuf>::new());
        let resolver = Resolver::with_cache(
            vec![Rule::with_defaults(Pattern::Auto, "aa.bb", "r", static_only().skip_domain_segment())],
            None,
            ExistenceCache::with_probe(probe),
        );

        let mut paths = RootPaths::default();
        resolver.resolve("cc.aa.bb", &mut paths);
        assert_eq!(paths.get(Category::Static), Some(Path::new("r/_static")));
    }

    #[test]
    fn test_only_auto_consults_cache() {
        let probe = CountingProbe::new(Vec::<PathBuf>::new());
        let resolver = Resolver::with_cache(
            vec![Rule::with_defaults(Pattern::Isolated, "aa.bb", "r", Layout::default())],
            None,
            ExistenceCache::with_probe(probe.clone()),
        );

        let mut paths = RootPaths::default();
        resolver.resolve("cc.aa.bb", &mut paths);
        assert_eq!(paths.get(Category::Static), Some(Path::new("r/cc.aa.bb/_static")));
        assert_eq!(probe.calls(), 0);
        assert!(resolver.cache().is_empty());
    }

    #[test]
    fn test_repeated_resolution_probes_once_per_key() {
        let probe = CountingProbe::new(["r/aa.bb/_static"]);
        let resolver = Resolver::with_cache(
            vec![Rule::with_defaults(Pattern::Auto, "aa.bb", "r", Layout::default())],
            None,
            ExistenceCache::with_probe(probe.clone()),
        );

        for _ in 0..5 {
            let mut paths = RootPaths::default();
            resolver.resolve("cc.aa.bb", &mut paths);
            assert_eq!(paths.get(Category::Static), Some(Path::new("r/aa.bb/_static")));
            assert_eq!(paths.get(Category::Content), Some(Path::new("r/aa.bb/_content")));
        }

        assert_eq!(probe.calls(), 3);
        assert_eq!(resolver.cache().len(), 3);
    }

    #[test]
    fn test_already_resolved_is_noop() {
        let probe = CountingProbe::new(Vec::<PathBuf>::new());
        let resolver = Resolver::with_cache(
            vec![Rule::with_defaults(Pattern::Auto, "aa.bb", "r", Layout::default())],
            Some(StatusCode::FORBIDDEN),
            ExistenceCache::with_probe(probe.clone()),
        );

        let mut paths = RootPaths {
            resolved: true,
            ..RootPaths::default()
        };
        assert_eq!(resolver.resolve("cc.aa.bb", &mut paths), Resolution::AlreadyResolved);
        assert!(paths.is_empty());
        assert_eq!(probe.calls(), 0);
    }

    #[test]
    fn test_host_cannot_escape_root() {
        let probe = CountingProbe::new(Vec::<PathBuf>::new());
        let resolver = Resolver::with_cache(
            vec![
                Rule::with_defaults(Pattern::Isolated, "aa.bb", "/srv/sites", static_only()),
                Rule::with_defaults(Pattern::Auto, "cc.dd", "/srv/auto", static_only()),
            ],
            None,
            ExistenceCache::with_probe(probe),
        );

        let mut paths = RootPaths::default();
        resolver.resolve("/tmp/evil.aa.bb", &mut paths);
        assert_eq!(
            paths.get(Category::Static),
            Some(Path::new("/srv/sites/tmp/evil.aa.bb/_static"))
        );

        let mut paths = RootPaths::default();
        resolver.resolve("../../etc.cc.dd", &mut paths);
        assert_eq!(paths.get(Category::Static), Some(Path::new("/srv/auto/cc.dd/_static")));
        assert!(resolver.cache().get(Path::new("/srv/auto/etc.cc.dd/_static")).is_some());
    }

    #[test]
    fn test_chained_resolvers_only_first_acts() {
        let first = Resolver::new(
            vec![Rule::with_defaults(Pattern::Exact, "aa.bb", "first", static_only())],
            None,
        );
        let second = Resolver::new(
            vec![Rule::with_defaults(Pattern::Exact, "aa.bb", "second", Layout::default())],
            None,
        );

        let mut paths = RootPaths::default();
        first.resolve("aa.bb", &mut paths);
        assert_eq!(second.resolve("aa.bb", &mut paths), Resolution::AlreadyResolved);
        assert_eq!(paths.get(Category::Static), Some(Path::new("first/aa.bb/_static")));
        assert_eq!(paths.content_dir, None);
    }
}
