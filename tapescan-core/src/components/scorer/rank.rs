//! System-wide ranking and truncation.

use crate::domain::Signal;
use std::cmp::Ordering;

/// Score descending, then confidence descending, then risk ascending, then
/// instrument and direction so equal signals always come out in one order.
pub fn compare_signals(a: &Signal, b: &Signal) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.confidence.cmp(&a.confidence))
        .then_with(|| a.risk_percent.total_cmp(&b.risk_percent))
        .then_with(|| a.instrument().cmp(b.instrument()))
        .then_with(|| a.direction().cmp(&b.direction()))
}

/// Sort and keep the best `max_signals` across every instrument.
pub fn rank_signals(mut signals: Vec<Signal>, max_signals: usize) -> Vec<Signal> {
    signals.sort_by(compare_signals);
    signals.truncate(max_signals);
    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::scorer::tests::scored;
    use crate::domain::{Confidence, Direction};

    #[test]
    fn keeps_top_two_by_score() {
        let ranked = rank_signals(
            vec![
                scored("ADA", Direction::Long, 61.0, Confidence::Medium, 2.0),
                scored("BTC", Direction::Long, 88.0, Confidence::High, 2.0),
                scored("ETH", Direction::Short, 79.0, Confidence::High, 2.0),
            ],
            2,
        );
        let names: Vec<&str> = ranked.iter().map(|s| s.instrument()).collect();
        assert_eq!(names, vec!["BTC", "ETH"]);
    }

    #[test]
    fn ties_break_on_tier_then_risk_then_name() {
        let ranked = rank_signals(
            vec![
                scored("SOL", Direction::Long, 75.0, Confidence::High, 3.0),
                scored("ADA", Direction::Long, 75.0, Confidence::High, 3.0),
                scored("ETH", Direction::Long, 75.0, Confidence::High, 1.0),
                scored("BTC", Direction::Long, 75.0, Confidence::Medium, 0.5),
            ],
            4,
        );
        let names: Vec<&str> = ranked.iter().map(|s| s.instrument()).collect();
        assert_eq!(names, vec!["ETH", "ADA", "SOL", "BTC"]);
    }

    #[test]
    fn truncation_is_global() {
        let many: Vec<Signal> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|n| scored(n, Direction::Long, 90.0, Confidence::High, 1.0))
            .collect();
        assert_eq!(rank_signals(many, 2).len(), 2);
        assert!(rank_signals(Vec::new(), 2).is_empty());
    }
}
