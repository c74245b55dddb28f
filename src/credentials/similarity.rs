//! Path similarity used to rank credentials against a target URL

/// Score given when either path is empty (root/generic match)
pub const GENERIC_MATCH: f64 = 0.5;

/// Score how well a credential path fits a target path.
///
/// Leading and trailing `/` are ignored. When either side is empty the
/// score is [`GENERIC_MATCH`], so a root credential serves any path.
/// Otherwise both paths are split on `/` and `::` and the score is the
/// number of leading segments they share. Zero means no match.
pub fn similarity(target: &str, candidate: &str) -> f64 {
    let target = target.trim_matches('/');
    let candidate = candidate.trim_matches('/');

    if target.is_empty() || candidate.is_empty() {
        return GENERIC_MATCH;
    }

    segments(target)
        .zip(segments(candidate))
        .take_while(|(a, b)| a == b)
        .count() as f64
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').flat_map(|part| part.split("::"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_paths() {
        assert_eq!(similarity("", ""), GENERIC_MATCH);
        assert_eq!(similarity("/", "/"), GENERIC_MATCH);
        assert_eq!(similarity("a/b", ""), GENERIC_MATCH);
        assert_eq!(similarity("", "a/b"), GENERIC_MATCH);
    }

    #[test]
    fn test_common_prefix_length() {
        assert_eq!(similarity("a/c", "a/b"), 1.0);
        assert_eq!(similarity("a/b/c", "a/b"), 2.0);
        assert_eq!(similarity("/a/b/", "a/b"), 2.0);
    }

    #[test]
    fn test_mismatched_first_segment() {
        assert_eq!(similarity("/otherdb", "/db"), 0.0);
    }

    #[test]
    fn test_double_colon_is_a_segment_boundary() {
        assert_eq!(similarity("/db::table", "/db"), 1.0);
        assert_eq!(similarity("/db::schema::table", "/db::schema"), 2.0);
        assert_eq!(similarity("db::a/b", "db/a::b"), 3.0);
    }

    #[test]
    fn test_prefix_stops_at_first_mismatch() {
        assert_eq!(similarity("a/x/c", "a/b/c"), 1.0);
    }
}
