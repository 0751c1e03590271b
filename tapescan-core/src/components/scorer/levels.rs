//! Stop, targets and position sizing from ATR.

use crate::config::ScoringParams;
use crate::domain::Direction;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profits: [f64; 3],
    pub risk_percent: f64,
    /// Percent of capital.
    pub position_size: f64,
}

/// Stop distance is `atr × multiplier`, floored at `min_risk_fraction × entry`.
/// Returns `None` when no positive, finite stop distance exists.
pub fn trade_levels(
    entry: f64,
    atr: f64,
    direction: Direction,
    multiplier: f64,
    params: &ScoringParams,
) -> Option<TradeLevels> {
    if !(entry.is_finite() && entry > 0.0) {
        return None;
    }
    let atr_distance = if atr.is_finite() { atr * multiplier } else { 0.0 };
    let distance = atr_distance.max(entry * params.min_risk_fraction);
    if !(distance.is_finite() && distance > 0.0) {
        return None;
    }

    let sign = direction.sign();
    let stop_loss = entry - sign * distance;
    let take_profits = params
        .take_profit_multiples
        .map(|m| entry + sign * distance * m);
    let risk_percent = distance / entry * 100.0;
    let position_size =
        (params.account_risk_percent / risk_percent * 100.0).min(params.max_position_percent);

    Some(TradeLevels {
        entry,
        stop_loss,
        take_profits,
        risk_percent,
        position_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn long_levels_ladder_above_entry() {
        let p = ScoringParams::default();
        let l = trade_levels(100.0, 2.0, Direction::Long, 2.5, &p).unwrap();
        assert_eq!(l.stop_loss, 95.0);
        assert_eq!(l.take_profits, [105.0, 110.0, 115.0]);
        assert_approx(l.risk_percent, 5.0, 1e-12);
        // 1% account risk over a 5% stop.
        assert_approx(l.position_size, 20.0, 1e-12);
    }

    #[test]
    fn short_levels_mirror() {
        let p = ScoringParams::default();
        let l = trade_levels(100.0, 2.0, Direction::Short, 1.5, &p).unwrap();
        assert_eq!(l.stop_loss, 103.0);
        assert_eq!(l.take_profits, [97.0, 94.0, 91.0]);
        assert!(l.stop_loss > l.entry);
    }

    #[test]
    fn tiny_atr_is_floored() {
        let p = ScoringParams::default();
        let l = trade_levels(200.0, 0.01, Direction::Long, 2.5, &p).unwrap();
        // Floor is 0.5% of entry.
        assert_approx(l.stop_loss, 199.0, 1e-9);
        assert_approx(l.risk_percent, 0.5, 1e-9);
        // 1 / 0.5 × 100 = 200, capped.
        assert_eq!(l.position_size, 100.0);
    }

    #[test]
    fn no_distance_no_levels() {
        let p = ScoringParams {
            min_risk_fraction: 0.0,
            ..ScoringParams::default()
        };
        assert!(trade_levels(100.0, 0.0, Direction::Long, 2.5, &p).is_none());
        assert!(trade_levels(0.0, 1.0, Direction::Long, 2.5, &p).is_none());
        assert!(trade_levels(f64::NAN, 1.0, Direction::Long, 2.5, &p).is_none());
    }
}
