//! Engine configuration: every threshold, weight and multiplier in one
//! immutable record, passed explicitly into each stage.
//!
//! All fields are defaulted, so a TOML file only needs the values it changes:
//!
//! ```toml
//! [context]
//! strong_trend_adx = 30.0
//!
//! [scoring.stop_overrides]
//! SOL = 3.0
//! ```

use crate::domain::Timeframe;
use crate::error::ConfigError;
use crate::fingerprint::ConfigHash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub indicators: IndicatorParams,
    pub structure: StructureParams,
    pub context: ContextParams,
    pub setup: SetupParams,
    pub scoring: ScoringParams,
    pub run: RunParams,
}

impl EngineConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Deterministic identity of this configuration.
    pub fn fingerprint(&self) -> ConfigHash {
        ConfigHash::of(self)
    }

    /// Reject values no run could use sensibly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicators.validate()?;
        self.structure.validate()?;
        self.context.validate()?;
        self.setup.validate()?;
        self.scoring.validate()?;

        let required = self.indicators.required_candles();
        if self.run.candle_limit < required {
            return Err(ConfigError::invalid(
                "run.candle_limit",
                format!("must be at least {required} to cover indicator warm-up"),
            ));
        }
        if self.run.trigger_timeframe == self.run.structure_timeframe {
            return Err(ConfigError::invalid(
                "run.trigger_timeframe",
                "must differ from run.structure_timeframe",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub atr_period: usize,
    pub adx_period: usize,
    pub rsi_period: usize,
    /// UTC hour at which the session VWAP resets.
    pub session_start_hour: u32,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast: 20,
            ema_slow: 50,
            atr_period: 14,
            adx_period: 14,
            rsi_period: 14,
            session_start_hour: 0,
        }
    }
}

impl IndicatorParams {
    /// Index of the first candle at which every indicator is defined.
    pub fn warmup(&self) -> usize {
        [
            self.ema_fast.saturating_sub(1),
            self.ema_slow.saturating_sub(1),
            self.atr_period,
            (2 * self.adx_period).saturating_sub(1),
            self.rsi_period,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Minimum window length that leaves at least one fully defined candle.
    pub fn required_candles(&self) -> usize {
        self.warmup() + 1
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("indicators.ema_fast", self.ema_fast),
            ("indicators.ema_slow", self.ema_slow),
            ("indicators.atr_period", self.atr_period),
            ("indicators.adx_period", self.adx_period),
            ("indicators.rsi_period", self.rsi_period),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(field, "period must be >= 1"));
            }
        }
        if self.ema_fast >= self.ema_slow {
            return Err(ConfigError::invalid(
                "indicators.ema_fast",
                "must be shorter than ema_slow",
            ));
        }
        if self.session_start_hour > 23 {
            return Err(ConfigError::invalid(
                "indicators.session_start_hour",
                "must be within 0..=23",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureParams {
    /// Candles on each side a swing point must dominate.
    pub swing_lookback: usize,
    /// Zone merge tolerance as a multiple of the latest ATR.
    pub tolerance_multiplier: f64,
    pub strong_touch_threshold: u32,
    /// Only swings inside this many trailing candles form zones.
    pub zone_window: usize,
}

impl Default for StructureParams {
    fn default() -> Self {
        Self {
            swing_lookback: 3,
            tolerance_multiplier: 0.5,
            strong_touch_threshold: 3,
            zone_window: 100,
        }
    }
}

impl StructureParams {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.swing_lookback == 0 {
            return Err(ConfigError::invalid("structure.swing_lookback", "must be >= 1"));
        }
        if !(self.tolerance_multiplier > 0.0) {
            return Err(ConfigError::invalid(
                "structure.tolerance_multiplier",
                "must be positive",
            ));
        }
        if self.strong_touch_threshold == 0 {
            return Err(ConfigError::invalid(
                "structure.strong_touch_threshold",
                "must be >= 1",
            ));
        }
        if self.zone_window < 2 * self.swing_lookback + 1 {
            return Err(ConfigError::invalid(
                "structure.zone_window",
                "must hold at least one full swing window",
            ));
        }
        Ok(())
    }
}

/// Half-open UTC hour range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start: u32,
    pub end: u32,
}

impl HourWindow {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Windows with `start > end` wrap past midnight.
    pub fn contains(&self, hour: u32) -> bool {
        if self.start <= self.end {
            (self.start..self.end).contains(&hour)
        } else {
            hour >= self.start || hour < self.end
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextParams {
    pub strong_trend_adx: f64,
    pub weak_trend_adx: f64,
    /// ATR / close above this marks the tape unstable regardless of trend.
    pub blowout_ratio: f64,
    pub high_volatility_ratio: f64,
    pub low_volatility_ratio: f64,
    pub high_liquidity_session: HourWindow,
    pub medium_liquidity_session: HourWindow,
}

impl Default for ContextParams {
    fn default() -> Self {
        Self {
            strong_trend_adx: 25.0,
            weak_trend_adx: 20.0,
            blowout_ratio: 0.08,
            high_volatility_ratio: 0.04,
            low_volatility_ratio: 0.005,
            high_liquidity_session: HourWindow::new(13, 17),
            medium_liquidity_session: HourWindow::new(7, 13),
        }
    }
}

impl ContextParams {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.strong_trend_adx) {
            return Err(ConfigError::invalid("context.strong_trend_adx", "must be within 0..=100"));
        }
        if !(0.0..=self.strong_trend_adx).contains(&self.weak_trend_adx) {
            return Err(ConfigError::invalid(
                "context.weak_trend_adx",
                "must be within 0..=strong_trend_adx",
            ));
        }
        if !(self.low_volatility_ratio >= 0.0 && self.low_volatility_ratio < self.high_volatility_ratio)
        {
            return Err(ConfigError::invalid(
                "context.low_volatility_ratio",
                "must be non-negative and below high_volatility_ratio",
            ));
        }
        if !(self.blowout_ratio > 0.0) {
            return Err(ConfigError::invalid("context.blowout_ratio", "must be positive"));
        }
        for (field, window) in [
            ("context.high_liquidity_session", self.high_liquidity_session),
            ("context.medium_liquidity_session", self.medium_liquidity_session),
        ] {
            if window.start > 23 || window.end > 24 {
                return Err(ConfigError::invalid(field, "hours must be within 0..=24"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupParams {
    pub min_participation_adx: f64,
    /// Relative distance within which key levels count as confluent.
    pub confluence_tolerance: f64,
    /// Relative overshoot through a zone that counts as a liquidity sweep.
    pub sweep_fraction: f64,
    /// Engulfing body must exceed the previous body by this factor.
    pub engulfing_body_ratio: f64,
    /// Each of three consecutive candles needs at least this share of the previous volume.
    pub volume_step_ratio: f64,
    pub profile_bins: usize,
    pub value_area: f64,
}

impl Default for SetupParams {
    fn default() -> Self {
        Self {
            min_participation_adx: 20.0,
            confluence_tolerance: 0.005,
            sweep_fraction: 0.002,
            engulfing_body_ratio: 1.05,
            volume_step_ratio: 0.95,
            profile_bins: 20,
            value_area: 0.7,
        }
    }
}

impl SetupParams {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.min_participation_adx) {
            return Err(ConfigError::invalid(
                "setup.min_participation_adx",
                "must be within 0..=100",
            ));
        }
        if !(self.confluence_tolerance >= 0.0) {
            return Err(ConfigError::invalid("setup.confluence_tolerance", "must be >= 0"));
        }
        if !(self.sweep_fraction >= 0.0) {
            return Err(ConfigError::invalid("setup.sweep_fraction", "must be >= 0"));
        }
        if self.profile_bins == 0 {
            return Err(ConfigError::invalid("setup.profile_bins", "must be >= 1"));
        }
        if !(self.value_area > 0.0 && self.value_area <= 1.0) {
            return Err(ConfigError::invalid("setup.value_area", "must be within (0, 1]"));
        }
        Ok(())
    }
}

/// Points awarded to each score component at full strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub trend: f64,
    pub structure: f64,
    pub momentum: f64,
    pub context: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            trend: 30.0,
            structure: 30.0,
            momentum: 20.0,
            context: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    pub weights: ScoreWeights,
    /// ADX at which the trend component saturates.
    pub adx_full_scale: f64,
    /// Bars over which the fast EMA slope is measured.
    pub slope_lookback: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    /// RSI at or above this (below `rsi_overbought`) is the ideal long zone.
    pub rsi_midline: f64,
    pub high_confidence: f64,
    pub medium_confidence: f64,
    /// Candidates scoring below this are discarded.
    pub min_score: f64,
    pub stop_multiplier: f64,
    /// Per-instrument ATR stop multipliers.
    pub stop_overrides: BTreeMap<String, f64>,
    /// Stop distance floor as a fraction of the entry price.
    pub min_risk_fraction: f64,
    /// Targets as multiples of the stop distance.
    pub take_profit_multiples: [f64; 3],
    /// Percent of capital risked per trade.
    pub account_risk_percent: f64,
    /// Cap on the suggested position size, percent of capital.
    pub max_position_percent: f64,
    pub validity_secs: i64,
    pub max_signals: usize,
}

impl Default for ScoringParams {
    fn default() -> Self {
        let mut stop_overrides = BTreeMap::new();
        stop_overrides.insert("BTC".to_string(), 1.5);
        stop_overrides.insert("ETH".to_string(), 2.0);
        Self {
            weights: ScoreWeights::default(),
            adx_full_scale: 50.0,
            slope_lookback: 5,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            rsi_midline: 45.0,
            high_confidence: 75.0,
            medium_confidence: 50.0,
            min_score: 40.0,
            stop_multiplier: 2.5,
            stop_overrides,
            min_risk_fraction: 0.005,
            take_profit_multiples: [1.0, 2.0, 3.0],
            account_risk_percent: 1.0,
            max_position_percent: 100.0,
            validity_secs: 3600,
            max_signals: 2,
        }
    }
}

impl ScoringParams {
    /// ATR stop multiplier for an instrument, falling back to the default.
    pub fn stop_multiplier_for(&self, instrument: &str) -> f64 {
        self.stop_overrides
            .get(instrument)
            .copied()
            .unwrap_or(self.stop_multiplier)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        if [w.trend, w.structure, w.momentum, w.context]
            .iter()
            .any(|v| !(*v >= 0.0))
        {
            return Err(ConfigError::invalid("scoring.weights", "must be non-negative"));
        }
        if !(self.adx_full_scale > 0.0) {
            return Err(ConfigError::invalid("scoring.adx_full_scale", "must be positive"));
        }
        if self.slope_lookback == 0 {
            return Err(ConfigError::invalid("scoring.slope_lookback", "must be >= 1"));
        }
        if !(0.0 <= self.rsi_oversold
            && self.rsi_oversold <= self.rsi_midline
            && self.rsi_midline <= self.rsi_overbought
            && self.rsi_overbought <= 100.0)
        {
            return Err(ConfigError::invalid(
                "scoring.rsi_oversold",
                "expected 0 <= oversold <= midline <= overbought <= 100",
            ));
        }
        if !(0.0 <= self.medium_confidence && self.medium_confidence <= self.high_confidence) {
            return Err(ConfigError::invalid(
                "scoring.medium_confidence",
                "must be within 0..=high_confidence",
            ));
        }
        if !(0.0..=100.0).contains(&self.min_score) {
            return Err(ConfigError::invalid("scoring.min_score", "must be within 0..=100"));
        }
        if !(self.stop_multiplier > 0.0) || self.stop_overrides.values().any(|m| !(*m > 0.0)) {
            return Err(ConfigError::invalid(
                "scoring.stop_multiplier",
                "multipliers must be positive",
            ));
        }
        if !(self.min_risk_fraction >= 0.0 && self.min_risk_fraction < 1.0) {
            return Err(ConfigError::invalid(
                "scoring.min_risk_fraction",
                "must be within [0, 1)",
            ));
        }
        let tp = self.take_profit_multiples;
        if !(tp[0] > 0.0 && tp[0] < tp[1] && tp[1] < tp[2]) {
            return Err(ConfigError::invalid(
                "scoring.take_profit_multiples",
                "must be positive and strictly increasing",
            ));
        }
        if !(self.account_risk_percent > 0.0) || !(self.max_position_percent > 0.0) {
            return Err(ConfigError::invalid(
                "scoring.account_risk_percent",
                "risk and position caps must be positive",
            ));
        }
        if self.validity_secs <= 0 {
            return Err(ConfigError::invalid("scoring.validity_secs", "must be positive"));
        }
        if self.max_signals == 0 {
            return Err(ConfigError::invalid("scoring.max_signals", "must be >= 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParams {
    /// Candles requested per (instrument, timeframe).
    pub candle_limit: usize,
    /// Timeframe driving the context trend and support/resistance zones.
    pub structure_timeframe: Timeframe,
    /// Timeframe on which entries are triggered.
    pub trigger_timeframe: Timeframe,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            candle_limit: 200,
            structure_timeframe: Timeframe::H4,
            trigger_timeframe: Timeframe::H1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn default_warmup_is_ema_slow() {
        let params = IndicatorParams::default();
        assert_eq!(params.warmup(), 49);
        assert_eq!(params.required_candles(), 50);
    }

    #[test]
    fn toml_roundtrip() {
        let config = EngineConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = EngineConfig::from_toml(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = EngineConfig::from_toml(
            r#"
            [context]
            strong_trend_adx = 30.0

            [scoring.stop_overrides]
            SOL = 3.0
            "#,
        )
        .unwrap();
        assert_eq!(config.context.strong_trend_adx, 30.0);
        assert_eq!(config.context.weak_trend_adx, 20.0);
        assert_eq!(config.scoring.stop_multiplier_for("SOL"), 3.0);
        assert_eq!(config.scoring.stop_multiplier_for("DOGE"), 2.5);
        // A table replaces the default overrides wholesale.
        assert_eq!(config.scoring.stop_multiplier_for("BTC"), 2.5);
    }

    #[test]
    fn validation_rejects_inverted_emas() {
        let mut config = EngineConfig::default();
        config.indicators.ema_fast = 60;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("indicators.ema_fast"), "{err}");
    }

    #[test]
    fn validation_rejects_weak_above_strong() {
        let err = EngineConfig::from_toml("[context]\nweak_trend_adx = 40.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "context.weak_trend_adx", .. }));
    }

    #[test]
    fn validation_rejects_short_candle_limit() {
        let mut config = EngineConfig::default();
        config.run.candle_limit = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_unordered_targets() {
        let mut config = EngineConfig::default();
        config.scoring.take_profit_multiples = [2.0, 1.0, 3.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = EngineConfig::from_toml("[context\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn hour_window_wraps_midnight() {
        let w = HourWindow::new(22, 2);
        assert!(w.contains(23));
        assert!(w.contains(1));
        assert!(!w.contains(2));
        assert!(HourWindow::new(13, 17).contains(13));
        assert!(!HourWindow::new(13, 17).contains(17));
    }

    #[test]
    fn fingerprint_tracks_values() {
        let a = EngineConfig::default();
        let mut b = EngineConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.scoring.min_score = 55.0;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
