//! Namespace resolution for long-term memory categories.

use crate::error::NamespaceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder substituted with the actor id in namespace templates.
const ACTOR_PLACEHOLDER: &str = "{actorId}";
/// Placeholder substituted with the session id in namespace templates.
const SESSION_PLACEHOLDER: &str = "{sessionId}";

/// Category of derived long-term memory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MemoryCategory {
    /// Stated or inferred customer preferences.
    Preferences,
    /// Known problems the customer reported.
    Issues,
    /// Per-session conversation summaries.
    Summaries,
}

impl MemoryCategory {
    /// All categories, in resolution order.
    pub const ALL: [MemoryCategory; 3] = [
        MemoryCategory::Preferences,
        MemoryCategory::Issues,
        MemoryCategory::Summaries,
    ];

    /// Return the category as a lowercase path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryCategory::Preferences => "preferences",
            MemoryCategory::Issues => "issues",
            MemoryCategory::Summaries => "summaries",
        }
    }

    /// Whether namespaces of this category are scoped to one session.
    pub fn is_session_scoped(&self) -> bool {
        matches!(self, MemoryCategory::Summaries)
    }

    /// Store-side namespace template for this category.
    pub fn template(&self) -> &'static str {
        match self {
            MemoryCategory::Preferences => "/preferences/{actorId}",
            MemoryCategory::Issues => "/issues/{actorId}",
            MemoryCategory::Summaries => "/summaries/{actorId}/{sessionId}",
        }
    }
}

impl fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        MemoryCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown memory category: {value}"))
    }
}

/// Builds namespace paths under an optional prefix.
///
/// `resolve` is pure: equal inputs always yield equal namespaces, so two
/// hooks configured alike read and write the same partitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceResolver {
    prefix: String,
}

impl NamespaceResolver {
    /// Create a resolver; surrounding slashes on the prefix are ignored.
    pub fn new(prefix: impl AsRef<str>) -> Self {
        Self {
            prefix: prefix.as_ref().trim_matches('/').to_string(),
        }
    }

    /// Normalized prefix, empty when unset.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolve the namespace of `category` for an actor (and session).
    ///
    /// The session id is only consulted for session-scoped categories.
    pub fn resolve(
        &self,
        category: MemoryCategory,
        actor_id: &str,
        session_id: Option<&str>,
    ) -> Result<String, NamespaceError> {
        if actor_id.is_empty() {
            return Err(NamespaceError::EmptyActor);
        }
        let mut path = category.template().replace(ACTOR_PLACEHOLDER, actor_id);
        if category.is_session_scoped() {
            let session_id = session_id
                .filter(|id| !id.is_empty())
                .ok_or(NamespaceError::MissingSession(category))?;
            path = path.replace(SESSION_PLACEHOLDER, session_id);
        }
        Ok(self.prefixed(path))
    }

    /// Namespace covering every partition of `category` for an actor.
    ///
    /// For session-scoped categories this is the parent of all per-session
    /// namespaces.
    pub fn actor_scope(
        &self,
        category: MemoryCategory,
        actor_id: &str,
    ) -> Result<String, NamespaceError> {
        if actor_id.is_empty() {
            return Err(NamespaceError::EmptyActor);
        }
        Ok(self.prefixed(format!("/{}/{actor_id}", category.as_str())))
    }

    fn prefixed(&self, path: String) -> String {
        if self.prefix.is_empty() {
            path
        } else {
            format!("/{}{path}", self.prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryCategory, NamespaceResolver};
    use crate::error::NamespaceError;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolves_without_prefix() {
        let resolver = NamespaceResolver::default();
        assert_eq!(
            resolver
                .resolve(MemoryCategory::Preferences, "cust_1", None)
                .expect("ns"),
            "/preferences/cust_1"
        );
        assert_eq!(
            resolver
                .resolve(MemoryCategory::Issues, "cust_1", Some("s1"))
                .expect("ns"),
            "/issues/cust_1"
        );
    }

    #[test]
    fn resolves_with_prefix_and_session() {
        let resolver = NamespaceResolver::new("/support/");
        assert_eq!(resolver.prefix(), "support");
        assert_eq!(
            resolver
                .resolve(MemoryCategory::Summaries, "cust_1", Some("s1"))
                .expect("ns"),
            "/support/summaries/cust_1/s1"
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = NamespaceResolver::new("tenant");
        let b = NamespaceResolver::new("tenant");
        for category in MemoryCategory::ALL {
            let first = a.resolve(category, "cust_9", Some("s9")).expect("ns");
            let second = b.resolve(category, "cust_9", Some("s9")).expect("ns");
            assert_eq!(first, second);
            assert_eq!(first, a.resolve(category, "cust_9", Some("s9")).expect("ns"));
        }
    }

    #[test]
    fn rejects_missing_inputs() {
        let resolver = NamespaceResolver::default();
        assert_eq!(
            resolver.resolve(MemoryCategory::Preferences, "", None),
            Err(NamespaceError::EmptyActor)
        );
        assert_eq!(
            resolver.resolve(MemoryCategory::Summaries, "cust_1", None),
            Err(NamespaceError::MissingSession(MemoryCategory::Summaries))
        );
        assert_eq!(
            resolver.resolve(MemoryCategory::Summaries, "cust_1", Some("")),
            Err(NamespaceError::MissingSession(MemoryCategory::Summaries))
        );
    }

    #[test]
    fn actor_scope_covers_sessions() {
        let resolver = NamespaceResolver::new("tenant");
        assert_eq!(
            resolver
                .actor_scope(MemoryCategory::Summaries, "cust_1")
                .expect("scope"),
            "/tenant/summaries/cust_1"
        );
        assert_eq!(
            NamespaceResolver::default()
                .actor_scope(MemoryCategory::Issues, "cust_1")
                .expect("scope"),
            "/issues/cust_1"
        );
    }

    #[test]
    fn parses_category_names() {
        assert_eq!(
            "Issues".parse::<MemoryCategory>().expect("category"),
            MemoryCategory::Issues
        );
        assert!("orders".parse::<MemoryCategory>().is_err());
    }
}
