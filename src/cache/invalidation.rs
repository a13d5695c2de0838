//! Whole-cache invalidation policy.
//!
//! The ranking API exposes no version or last-modified signal per resource.
//! Every rating and ranking change comes from a newly recorded tournament, so
//! the tournament count of a region stands in for "something changed". Any
//! difference invalidates players, rankings and match history together.

/// Pure comparison of the cached and freshly fetched tournament counts.
pub fn tournament_count_changed(cached_count: u64, fetched_count: u64) -> bool {
    cached_count != fetched_count
}

/// Like [`tournament_count_changed`], treating "never refreshed" as changed.
pub fn needs_refresh(cached_count: Option<u64>, fetched_count: u64) -> bool {
    match cached_count {
        Some(cached) => tournament_count_changed(cached, fetched_count),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_counts_unchanged() {
        for n in [0, 1, 5, 1000, u64::MAX] {
            assert!(!tournament_count_changed(n, n));
        }
    }

    #[test]
    fn test_different_counts_changed() {
        assert!(tournament_count_changed(5, 6));
        assert!(tournament_count_changed(6, 5));
        assert!(tournament_count_changed(0, u64::MAX));
    }

    #[test]
    fn test_no_prior_state_needs_refresh() {
        assert!(needs_refresh(None, 0));
        assert!(needs_refresh(None, 5));
        assert!(!needs_refresh(Some(5), 5));
        assert!(needs_refresh(Some(5), 6));
    }
}
