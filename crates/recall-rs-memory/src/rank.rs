//! Naive namespace matching and token-overlap ranking for the file store.

use crate::model::MemoryRecord;
use std::collections::HashSet;

/// True when `record_namespace` equals `query_namespace` or is nested under it.
pub(crate) fn namespace_matches(record_namespace: &str, query_namespace: &str) -> bool {
    let query = query_namespace.trim_end_matches('/');
    if record_namespace.trim_end_matches('/') == query {
        return true;
    }
    record_namespace
        .strip_prefix(query)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Lowercased alphanumeric tokens of a string.
fn tokens(value: &str) -> HashSet<String> {
    value
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Fraction of query tokens present in the content.
pub(crate) fn overlap_score(query: &str, content: &str) -> f32 {
    let query_tokens = tokens(query);
    if query_tokens.is_empty() {
        return 0.0;
    }
    let content_tokens = tokens(content);
    let hits = query_tokens
        .iter()
        .filter(|token| content_tokens.contains(*token))
        .count();
    hits as f32 / query_tokens.len() as f32
}

/// Score, order (best first, newest on ties) and truncate records.
pub(crate) fn rank_records(
    records: Vec<MemoryRecord>,
    query: &str,
    top_k: usize,
) -> Vec<MemoryRecord> {
    let mut scored = records
        .into_iter()
        .map(|mut record| {
            record.score = Some(overlap_score(query, &record.content));
            record
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| {
        let a_score = a.score.unwrap_or_default();
        let b_score = b.score.unwrap_or_default();
        b_score
            .total_cmp(&a_score)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    scored.truncate(top_k);
    scored
}

#[cfg(test)]
mod tests {
    use super::{namespace_matches, overlap_score, rank_records};
    use crate::MemoryRecord;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn namespace_matches_exact_and_nested() {
        assert!(namespace_matches("/issues/cust_1", "/issues/cust_1"));
        assert!(namespace_matches("/issues/cust_1/products", "/issues/cust_1"));
        assert!(namespace_matches("/issues/cust_1", "/issues/cust_1/"));
        assert!(!namespace_matches("/issues/cust_10", "/issues/cust_1"));
        assert!(!namespace_matches("/preferences/cust_1", "/issues/cust_1"));
    }

    #[test]
    fn overlap_score_is_case_insensitive() {
        assert_eq!(overlap_score("Premium Cover", "likes premium covers"), 0.5);
        assert_eq!(overlap_score("", "anything"), 0.0);
    }

    #[test]
    fn rank_prefers_score_then_recency() {
        let mut old = MemoryRecord::new("/preferences/a", "battery life matters");
        old.created_at = Utc::now() - Duration::hours(1);
        let new = MemoryRecord::new("/preferences/a", "battery life matters");
        let miss = MemoryRecord::new("/preferences/a", "prefers black");

        let ranked = rank_records(vec![old.clone(), miss, new.clone()], "battery", 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, new.id);
        assert_eq!(ranked[1].id, old.id);
        assert_eq!(ranked[0].score, Some(1.0));
    }
}
