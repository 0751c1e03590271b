//! Per-pair indicator and structure computation.
//!
//! Pairs share no data, so both stages fan out across the rayon pool and join
//! into `BTreeMap`s; iteration order is the key order, never thread order.

use crate::components::indicator::IndicatorSet;
use crate::config::{IndicatorParams, StructureParams};
use crate::domain::{Candle, MarketStructure, Timeframe};
use crate::structure;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// (instrument, timeframe).
pub type PairKey = (String, Timeframe);

/// Compute every indicator series for every pair.
pub fn precompute_indicators(
    candles: &BTreeMap<PairKey, Vec<Candle>>,
    params: &IndicatorParams,
) -> BTreeMap<PairKey, IndicatorSet> {
    candles
        .par_iter()
        .map(|(key, series)| {
            let set = IndicatorSet::compute(series, params);
            debug_assert_eq!(set.len(), series.len());
            debug!(
                instrument = %key.0,
                timeframe = %key.1,
                candles = series.len(),
                "indicators computed"
            );
            (key.clone(), set)
        })
        .collect()
}

/// Market structure per instrument on `timeframe`, using each pair's latest ATR
/// for the zone tolerance.
pub fn analyze_structures(
    candles: &BTreeMap<PairKey, Vec<Candle>>,
    indicators: &BTreeMap<PairKey, IndicatorSet>,
    timeframe: Timeframe,
    params: &StructureParams,
) -> BTreeMap<String, MarketStructure> {
    candles
        .par_iter()
        .filter(|(key, _)| key.1 == timeframe)
        .map(|(key, series)| {
            let atr = indicators
                .get(key)
                .and_then(IndicatorSet::last_atr)
                .unwrap_or(f64::NAN);
            let market = structure::analyze(series, atr, params);
            debug!(
                instrument = %key.0,
                supports = market.supports.len(),
                resistances = market.resistances.len(),
                bias = %market.bias,
                "structure analysed"
            );
            (key.0.clone(), market)
        })
        .collect()
}
