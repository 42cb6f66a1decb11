//! Rewrite statistics, collected by callers that step through a driver
//! session manually (the CLI's `--chain` and the confluence tester both
//! want step/position counts for diagnostics).

use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStatistics {
    pub positions_tried: usize,
    pub rules_matched: usize,
    pub successors_produced: usize,
}

impl RewriteStatistics {
    pub fn record_position(&mut self) {
        self.positions_tried += 1;
    }

    pub fn record_match(&mut self, successors: usize) {
        self.rules_matched += 1;
        self.successors_produced += successors;
    }

    pub fn merge(&mut self, other: &RewriteStatistics) {
        self.positions_tried += other.positions_tried;
        self.rules_matched += other.rules_matched;
        self.successors_produced += other.successors_produced;
    }
}

impl fmt::Display for RewriteStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} positions tried, {} rules matched, {} successors produced",
            self.positions_tried, self.rules_matched, self.successors_produced
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_position_and_match() {
        let mut stats = RewriteStatistics::default();
        stats.record_position();
        stats.record_position();
        stats.record_match(2);
        assert_eq!(stats.positions_tried, 2);
        assert_eq!(stats.rules_matched, 1);
        assert_eq!(stats.successors_produced, 2);
    }

    #[test]
    fn test_merge_sums_fields() {
        let mut a = RewriteStatistics { positions_tried: 1, rules_matched: 2, successors_produced: 3 };
        let b = RewriteStatistics { positions_tried: 4, rules_matched: 5, successors_produced: 6 };
        a.merge(&b);
        assert_eq!(a, RewriteStatistics { positions_tried: 5, rules_matched: 7, successors_produced: 9 });
    }

    #[test]
    fn test_display_format() {
        let stats = RewriteStatistics { positions_tried: 3, rules_matched: 1, successors_produced: 2 };
        assert_eq!(stats.to_string(), "3 positions tried, 1 rules matched, 2 successors produced");
    }
}
