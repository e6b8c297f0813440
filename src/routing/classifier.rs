//! Public/protected route classification.
//!
//! # Responsibilities
//! - Match request paths against an ordered rule set
//! - Support a trailing glob wildcard ("prefix plus any remaining path")
//! - Fail closed: unmatched paths are protected
//!
//! # Design Decisions
//! - Path matching is case-sensitive and exact per segment
//! - `/sign-in/*` matches both `/sign-in` and `/sign-in/anything`
//! - Evaluation is O(rules); the set is small and static

/// Outcome of classifying a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Protected,
}

/// A glob-style path pattern.
///
/// A pattern ending in `/*` matches the bare prefix and any subpath;
/// anything else is an exact match.
#[derive(Clone, Debug)]
pub struct PathPattern {
    prefix: String,
    wildcard: bool,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/*") {
            Some(prefix) => Self {
                prefix: prefix.to_string(),
                wildcard: true,
            },
            None => Self {
                prefix: pattern.to_string(),
                wildcard: false,
            },
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        if !self.wildcard {
            return path == self.prefix;
        }
        match path.strip_prefix(&self.prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// One classification rule: pattern plus the class it grants.
#[derive(Clone, Debug)]
pub struct RouteRule {
    pattern: PathPattern,
    public: bool,
}

impl RouteRule {
    pub fn public(pattern: &str) -> Self {
        Self {
            pattern: PathPattern::parse(pattern),
            public: true,
        }
    }

    pub fn protected(pattern: &str) -> Self {
        Self {
            pattern: PathPattern::parse(pattern),
            public: false,
        }
    }
}

/// Ordered rule set deciding whether a route needs authentication.
#[derive(Clone, Debug)]
pub struct RouteClassifier {
    rules: Vec<RouteRule>,
}

impl RouteClassifier {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// The application's standing allow-list: sign-in/sign-up flows, the
    /// landing and pricing pages, the identity webhook, scheduled-task
    /// endpoints, and the liveness probe.
    pub fn with_default_rules() -> Self {
        Self::new(vec![
            RouteRule::public("/sign-in/*"),
            RouteRule::public("/sign-up/*"),
            RouteRule::public("/"),
            RouteRule::public("/pricing"),
            RouteRule::public("/api/webhooks/identity"),
            RouteRule::public("/api/cron/*"),
            RouteRule::public("/health"),
        ])
    }

    /// First rule whose pattern matches decides; no match means protected.
    pub fn classify(&self, path: &str) -> RouteClass {
        for rule in &self.rules {
            if rule.pattern.matches(path) {
                return if rule.public {
                    RouteClass::Public
                } else {
                    RouteClass::Protected
                };
            }
        }
        RouteClass::Protected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pattern() {
        let pattern = PathPattern::parse("/pricing");
        assert!(pattern.matches("/pricing"));
        assert!(!pattern.matches("/pricing/annual"));
        assert!(!pattern.matches("/pricing2"));
    }

    #[test]
    fn test_wildcard_pattern() {
        let pattern = PathPattern::parse("/sign-in/*");
        assert!(pattern.matches("/sign-in"));
        assert!(pattern.matches("/sign-in/sso"));
        assert!(pattern.matches("/sign-in/sso/callback"));
        assert!(!pattern.matches("/sign-in-help"));
    }

    #[test]
    fn test_root_is_exact() {
        let classifier = RouteClassifier::with_default_rules();
        assert_eq!(classifier.classify("/"), RouteClass::Public);
        assert_eq!(classifier.classify("/dashboard"), RouteClass::Protected);
    }

    #[test]
    fn test_default_public_routes() {
        let classifier = RouteClassifier::with_default_rules();
        for path in [
            "/sign-in",
            "/sign-in/sso",
            "/sign-up/verify",
            "/pricing",
            "/api/webhooks/identity",
            "/api/cron/reset-credits",
            "/health",
        ] {
            assert_eq!(classifier.classify(path), RouteClass::Public, "{path}");
        }
    }

    #[test]
    fn test_unmatched_paths_are_protected() {
        let classifier = RouteClassifier::with_default_rules();
        for path in [
            "/api/generate",
            "/api/user/me",
            "/api/webhooks/other",
            "/dashboard/settings",
            "/anything",
        ] {
            assert_eq!(classifier.classify(path), RouteClass::Protected, "{path}");
        }
    }

    #[test]
    fn test_first_match_wins() {
        let classifier = RouteClassifier::new(vec![
            RouteRule::protected("/api/internal/*"),
            RouteRule::public("/api/*"),
        ]);
        assert_eq!(classifier.classify("/api/internal/x"), RouteClass::Protected);
        assert_eq!(classifier.classify("/api/open"), RouteClass::Public);
    }
}
