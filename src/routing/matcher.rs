//! Host matching logic.
//!
//! # Responsibilities
//! - Match a request host against a rule's domain suffix
//! - Extract the subdomain prefix for patterns that root per subdomain
//!
//! # Design Decisions
//! - Host must already have its port stripped
//! - Byte-exact suffix comparison, no case folding
//! - No regex, a single suffix check per rule

use std::fmt;
use std::str::FromStr;

/// How a rule's domain is matched against the request host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// `""`: only the bare domain, rooted at `Root/domain`.
    Exact,
    /// `"."`: the domain and any subdomain, all sharing `Root/domain`.
    Shared,
    /// `"*"`: the domain and any subdomain, each rooted at `Root/sub.domain`.
    Isolated,
    /// `"?"`: like `Isolated`, falling back to `Root/domain` when the
    /// per-subdomain directory does not exist.
    Auto,
}

impl Pattern {
    /// Map a configuration token to a pattern. Unknown tokens yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "" => Some(Pattern::Exact),
            "." => Some(Pattern::Shared),
            "*" => Some(Pattern::Isolated),
            "?" => Some(Pattern::Auto),
            _ => None,
        }
    }

    /// The configuration token for this pattern.
    pub fn token(self) -> &'static str {
        match self {
            Pattern::Exact => "",
            Pattern::Shared => ".",
            Pattern::Isolated => "*",
            Pattern::Auto => "?",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.token())
    }
}

/// Error returned when parsing an unknown pattern token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pattern token {0:?} (expected \"\", \".\", \"*\" or \"?\")")]
pub struct UnknownPattern(pub String);

impl FromStr for Pattern {
    type Err = UnknownPattern;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::from_token(s).ok_or_else(|| UnknownPattern(s.to_string()))
    }
}

/// Match `host` against `domain` under `pattern`.
///
/// Returns `None` when the host does not match. On a match, returns the
/// subdomain prefix without its trailing dot, or `""` when the pattern does
/// not root per subdomain or the host is the bare domain.
pub fn match_host<'a>(domain: &str, pattern: Pattern, host: &'a str) -> Option<&'a str> {
    if !host.ends_with(domain) {
        return None;
    }

    let tail = host.len() - domain.len();
    let dotted = tail > 0 && host.as_bytes()[tail - 1] == b'.';

    match pattern {
        Pattern::Exact => (tail == 0).then_some(""),
        Pattern::Shared => (tail == 0 || dotted).then_some(""),
        Pattern::Isolated | Pattern::Auto => {
            if tail > 1 && dotted {
                Some(&host[..tail - 1])
            } else {
                (tail == 0).then_some("")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: &str = "aa.bb";

    #[test]
    fn test_exact_pattern() {
        assert_eq!(match_host(D, Pattern::Exact, "aa.bb"), Some(""));
        assert_eq!(match_host(D, Pattern::Exact, "cc.aa.bb"), None);
        assert_eq!(match_host(D, Pattern::Exact, "xaa.bb"), None);
        assert_eq!(match_host(D, Pattern::Exact, "other.com"), None);
    }

    #[test]
    fn test_shared_pattern_never_yields_prefix() {
        assert_eq!(match_host(D, Pattern::Shared, "aa.bb"), Some(""));
        assert_eq!(match_host(D, Pattern::Shared, "cc.aa.bb"), Some(""));
        assert_eq!(match_host(D, Pattern::Shared, "x.y.aa.bb"), Some(""));
        // Suffix match without a dot boundary is not a subdomain
        assert_eq!(match_host(D, Pattern::Shared, "xaa.bb"), None);
    }

    #[test]
    fn test_isolated_pattern_yields_prefix() {
        assert_eq!(match_host(D, Pattern::Isolated, "aa.bb"), Some(""));
        assert_eq!(match_host(D, Pattern::Isolated, "cc.aa.bb"), Some("cc"));
        assert_eq!(match_host(D, Pattern::Isolated, "x.y.aa.bb"), Some("x.y"));
        assert_eq!(match_host(D, Pattern::Isolated, "xaa.bb"), None);
    }

    #[test]
    fn test_isolated_rejects_lone_dot_prefix() {
        // ".aa.bb" has tail == 1: shared accepts it, isolated does not
        assert_eq!(match_host(D, Pattern::Shared, ".aa.bb"), Some(""));
        assert_eq!(match_host(D, Pattern::Isolated, ".aa.bb"), None);
        assert_eq!(match_host(D, Pattern::Auto, ".aa.bb"), None);
    }

    #[test]
    fn test_auto_matches_like_isolated() {
        for host in ["aa.bb", "cc.aa.bb", "xaa.bb", "bb", "a.b.aa.bb"] {
            assert_eq!(
                match_host(D, Pattern::Auto, host),
                match_host(D, Pattern::Isolated, host),
                "host {host}"
            );
        }
    }

    #[test]
    fn test_host_shorter_than_domain() {
        assert_eq!(match_host(D, Pattern::Shared, "bb"), None);
        assert_eq!(match_host(D, Pattern::Isolated, ""), None);
    }

    #[test]
    fn test_pattern_tokens() {
        assert_eq!("".parse::<Pattern>(), Ok(Pattern::Exact));
        assert_eq!(".".parse::<Pattern>(), Ok(Pattern::Shared));
        assert_eq!("*".parse::<Pattern>(), Ok(Pattern::Isolated));
        assert_eq!("?".parse::<Pattern>(), Ok(Pattern::Auto));
        assert!("**".parse::<Pattern>().is_err());
        assert_eq!(Pattern::from_token("+"), None);

        for p in [Pattern::Exact, Pattern::Shared, Pattern::Isolated, Pattern::Auto] {
            assert_eq!(Pattern::from_token(p.token()), Some(p));
        }
    }
}
