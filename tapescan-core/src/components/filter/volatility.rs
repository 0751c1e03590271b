//! Volatility regime from ATR as a fraction of price.

use crate::config::ContextParams;
use crate::domain::VolatilityRegime;

/// `atr / close`, NaN when the close is not positive.
pub fn atr_ratio(atr: f64, close: f64) -> f64 {
    if close > 0.0 {
        atr / close
    } else {
        f64::NAN
    }
}

/// `ratio ≥ high_volatility_ratio` → High, `< low_volatility_ratio` → Low,
/// otherwise Normal. An undefined ratio counts as High.
pub fn classify_volatility(ratio: f64, params: &ContextParams) -> VolatilityRegime {
    if ratio.is_nan() || ratio >= params.high_volatility_ratio {
        VolatilityRegime::High
    } else if ratio < params.low_volatility_ratio {
        VolatilityRegime::Low
    } else {
        VolatilityRegime::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regimes_by_threshold() {
        let p = ContextParams::default();
        assert_eq!(classify_volatility(0.05, &p), VolatilityRegime::High);
        assert_eq!(classify_volatility(0.04, &p), VolatilityRegime::High);
        assert_eq!(classify_volatility(0.02, &p), VolatilityRegime::Normal);
        assert_eq!(classify_volatility(0.005, &p), VolatilityRegime::Normal);
        assert_eq!(classify_volatility(0.001, &p), VolatilityRegime::Low);
        assert_eq!(classify_volatility(f64::NAN, &p), VolatilityRegime::High);
    }

    #[test]
    fn ratio_needs_positive_close() {
        assert_eq!(atr_ratio(2.0, 100.0), 0.02);
        assert!(atr_ratio(2.0, 0.0).is_nan());
    }
}
