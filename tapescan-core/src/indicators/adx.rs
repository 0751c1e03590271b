//! ADX: Average Directional Index (Wilder), with the ±DI lines.
//!
//! Steps:
//! 1. +DM and -DM from consecutive candles
//! 2. Wilder-smooth +DM, -DM and TR (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX, clamped to [0, 100]
//!
//! ±DI are defined from index `period`, ADX from index `2 * period - 1`.

use crate::components::indicator::Indicator;
use crate::domain::Candle;
use crate::indicators::atr::{true_range, wilder_smooth};

/// The three aligned output lines of the directional movement system.
#[derive(Debug, Clone, Default)]
pub struct DirectionalLines {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub adx: Vec<f64>,
}

/// Compute +DI, -DI and ADX in one pass.
pub fn directional_movement(candles: &[Candle], period: usize) -> DirectionalLines {
    let n = candles.len();
    let period = period.max(1);

    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];
    for (i, pair) in candles.windows(2).enumerate() {
        let up = pair[1].high - pair[0].high;
        let down = pair[0].low - pair[1].low;
        plus_dm[i + 1] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i + 1] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    let smooth_tr = wilder_smooth(&true_range(candles), period);
    let smooth_plus = wilder_smooth(&plus_dm, period);
    let smooth_minus = wilder_smooth(&minus_dm, period);

    let mut plus_di = vec![f64::NAN; n];
    let mut minus_di = vec![f64::NAN; n];
    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        if smooth_tr[i].is_nan() || smooth_plus[i].is_nan() || smooth_minus[i].is_nan() {
            continue;
        }
        // A zero-range window has no directional movement at all.
        let (p, m) = if smooth_tr[i] > 0.0 {
            (
                100.0 * smooth_plus[i] / smooth_tr[i],
                100.0 * smooth_minus[i] / smooth_tr[i],
            )
        } else {
            (0.0, 0.0)
        };
        plus_di[i] = p;
        minus_di[i] = m;
        let sum = p + m;
        dx[i] = if sum == 0.0 {
            0.0
        } else {
            100.0 * (p - m).abs() / sum
        };
    }

    let adx = wilder_smooth(&dx, period)
        .into_iter()
        .map(|v| if v.is_nan() { v } else { v.clamp(0.0, 100.0) })
        .collect();

    DirectionalLines {
        plus_di,
        minus_di,
        adx,
    }
}

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        directional_movement(candles, self.period).adx
    }
}

/// Which directional line a `DirectionalIndex` exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiLine {
    Plus,
    Minus,
}

/// +DI or -DI as a standalone indicator.
#[derive(Debug, Clone)]
pub struct DirectionalIndex {
    period: usize,
    line: DiLine,
    name: String,
}

impl DirectionalIndex {
    pub fn plus(period: usize) -> Self {
        Self::new(period, DiLine::Plus)
    }

    pub fn minus(period: usize) -> Self {
        Self::new(period, DiLine::Minus)
    }

    fn new(period: usize, line: DiLine) -> Self {
        let period = period.max(1);
        let prefix = match line {
            DiLine::Plus => "plus_di",
            DiLine::Minus => "minus_di",
        };
        Self {
            period,
            line,
            name: format!("{prefix}_{period}"),
        }
    }
}

impl Indicator for DirectionalIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let lines = directional_movement(candles, self.period);
        match self.line {
            DiLine::Plus => lines.plus_di,
            DiLine::Minus => lines.minus_di,
        }
    }
}
