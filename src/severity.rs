//! Keyword severity heuristic for complaint reports.
//!
//! Buckets are independent and additive; each contributes at most once no
//! matter how many of its keywords occur. The impact bonus comes on top.

const CRITICAL: (&[&str], u32) = (
    &["collapse", "danger", "sewage overflow", "contamination"],
    50,
);
const SERIOUS: (&[&str], u32) = (&["broken", "leakage", "garbage"], 30);
const MINOR: (&[&str], u32) = (&["delay", "slow"], 10);

const HIGH_IMPACT_BONUS: u32 = 20;
const MEDIUM_IMPACT_BONUS: u32 = 10;

/// Score a report from its complaint type, description and estimated impact.
///
/// Pure and deterministic. Matching is case-insensitive substring search over
/// `"{complaint_type} {description}"`.
pub fn score(complaint_type: &str, description: &str, estimated_impact: &str) -> u32 {
    let haystack = format!("{complaint_type} {description}").to_lowercase();

    let keywords: u32 = [CRITICAL, SERIOUS, MINOR]
        .iter()
        .filter(|(words, _)| words.iter().any(|w| haystack.contains(w)))
        .map(|(_, weight)| weight)
        .sum();

    keywords + impact_bonus(estimated_impact)
}

fn impact_bonus(estimated_impact: &str) -> u32 {
    let impact = estimated_impact.to_lowercase();
    if impact.contains("high") {
        HIGH_IMPACT_BONUS
    } else if impact.contains("medium") {
        MEDIUM_IMPACT_BONUS
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serious_bucket_with_medium_impact() {
        assert_eq!(score("broken road", "pothole on Main St", "Medium"), 40);
    }

    #[test]
    fn critical_bucket_counts_once() {
        assert_eq!(
            score("sewage overflow", "contamination reported near school", "High"),
            70
        );
    }

    #[test]
    fn no_bucket_no_bonus() {
        assert_eq!(score("street light", "bulb out", "Low"), 0);
    }

    #[test]
    fn buckets_stack() {
        // collapse (50) + garbage (30) + slow (10) + high (20)
        assert_eq!(
            score("Garbage", "wall COLLAPSE, slow response", "very HIGH"),
            110
        );
    }

    #[test]
    fn high_wins_over_medium() {
        assert_eq!(score("x", "y", "medium-high"), 20);
    }

    #[test]
    fn fields_do_not_merge_across_boundary() {
        // "slo" + "w..." must not read as "slow"
        assert_eq!(score("slo", "wly", "low"), 0);
    }
}
